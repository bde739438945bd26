use std::fmt;

use arcstr::ArcStr;
use derive_more::with_trait::{Display, Error};
use fnv::{FnvBuildHasher, FnvHashMap};
use indexmap::{IndexMap, IndexSet};

use crate::{
    ast::{OperationType, Type},
    introspection,
    schema::{
        meta::{Argument, Field, InterfaceMeta, MetaType, ObjectMeta, UnionMeta},
        scalars,
    },
};

/// Metadata for a schema: every type reachable from the root operation
/// types, plus the directives a document may use.
///
/// Frozen once built. Share it between executions behind an
/// [`Arc`](std::sync::Arc).
pub struct Schema {
    types: IndexMap<ArcStr, MetaType, FnvBuildHasher>,
    query_type_name: ArcStr,
    mutation_type_name: Option<ArcStr>,
    subscription_type_name: Option<ArcStr>,
    directives: IndexMap<ArcStr, DirectiveType, FnvBuildHasher>,
    /// Abstract type name to the names of its possible object types.
    possible_types: FnvHashMap<ArcStr, IndexSet<ArcStr, FnvBuildHasher>>,
    typename_field: Field,
    schema_field: Field,
    type_field: Field,
}

static_assertions::assert_impl_all!(Schema: Send, Sync);

/// A directive a document may use.
#[derive(Clone, Debug)]
pub struct DirectiveType {
    /// Name, without the `@`.
    pub name: ArcStr,
    /// Human description.
    pub description: Option<ArcStr>,
    /// Places the directive may appear at.
    pub locations: Vec<DirectiveLocation>,
    /// Accepted arguments.
    pub arguments: IndexMap<ArcStr, Argument>,
}

/// Place a directive may appear at.
#[expect(missing_docs, reason = "self-explanatory")]
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum DirectiveLocation {
    Query,
    Mutation,
    Subscription,
    Field,
    FragmentDefinition,
    FragmentSpread,
    InlineFragment,
    FieldDefinition,
    EnumValue,
}

impl DirectiveLocation {
    /// All locations, in the order introspection lists them.
    pub const ALL: [Self; 9] = [
        Self::Query,
        Self::Mutation,
        Self::Subscription,
        Self::Field,
        Self::FragmentDefinition,
        Self::FragmentSpread,
        Self::InlineFragment,
        Self::FieldDefinition,
        Self::EnumValue,
    ];

    /// Name of this location in the `__DirectiveLocation` enum.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Query => "QUERY",
            Self::Mutation => "MUTATION",
            Self::Subscription => "SUBSCRIPTION",
            Self::Field => "FIELD",
            Self::FragmentDefinition => "FRAGMENT_DEFINITION",
            Self::FragmentSpread => "FRAGMENT_SPREAD",
            Self::InlineFragment => "INLINE_FRAGMENT",
            Self::FieldDefinition => "FIELD_DEFINITION",
            Self::EnumValue => "ENUM_VALUE",
        }
    }
}

impl From<OperationType> for DirectiveLocation {
    fn from(op: OperationType) -> Self {
        match op {
            OperationType::Query => Self::Query,
            OperationType::Mutation => Self::Mutation,
            OperationType::Subscription => Self::Subscription,
        }
    }
}

impl fmt::Display for DirectiveLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Query => "query",
            Self::Mutation => "mutation",
            Self::Subscription => "subscription",
            Self::Field => "field",
            Self::FragmentDefinition => "fragment definition",
            Self::FragmentSpread => "fragment spread",
            Self::InlineFragment => "inline fragment",
            Self::FieldDefinition => "field definition",
            Self::EnumValue => "enum value",
        })
    }
}

impl DirectiveType {
    /// Builds a new [`DirectiveType`] usable at the given `locations`.
    pub fn new(
        name: impl Into<ArcStr>,
        locations: &[DirectiveLocation],
        arguments: impl IntoIterator<Item = Argument>,
    ) -> Self {
        Self {
            name: name.into(),
            description: None,
            locations: locations.to_vec(),
            arguments: arguments.into_iter().map(|a| (a.name.clone(), a)).collect(),
        }
    }

    /// Sets the `description` of this [`DirectiveType`].
    #[must_use]
    pub fn description(mut self, description: impl Into<ArcStr>) -> Self {
        self.description = Some(description.into());
        self
    }

    fn new_skip() -> Self {
        Self::new(
            "skip",
            &[
                DirectiveLocation::Field,
                DirectiveLocation::FragmentSpread,
                DirectiveLocation::InlineFragment,
            ],
            [Argument::new("if", Type::non_null_named("Boolean"))
                .description("Skipped when true.")],
        )
        .description("Directs the executor to skip this field or fragment when the `if` argument is true.")
    }

    fn new_include() -> Self {
        Self::new(
            "include",
            &[
                DirectiveLocation::Field,
                DirectiveLocation::FragmentSpread,
                DirectiveLocation::InlineFragment,
            ],
            [Argument::new("if", Type::non_null_named("Boolean"))
                .description("Included when true.")],
        )
        .description("Directs the executor to include this field or fragment only when the `if` argument is true.")
    }

    fn new_deprecated() -> Self {
        Self::new(
            "deprecated",
            &[DirectiveLocation::FieldDefinition, DirectiveLocation::EnumValue],
            [Argument::new("reason", Type::named("String"))
                .default_value(crate::ast::InputValue::String("No longer supported".into()))],
        )
        .description("Marks an element of a GraphQL schema as no longer supported.")
    }
}

/// Failure to assemble a consistent [`Schema`].
#[derive(Clone, Debug, Display, Eq, Error, PartialEq)]
pub enum SchemaError {
    /// Two types share a name.
    #[display("Schema must contain unique named types but contains multiple types named \"{_0}\".")]
    DuplicateType(#[error(not(source))] ArcStr),

    /// A type references a name no type is registered under.
    #[display("Type \"{referrer}\" references unknown type \"{name}\".")]
    UnknownType {
        /// Name of the referencing type.
        referrer: ArcStr,
        /// Unknown name.
        name: ArcStr,
    },

    /// A root operation type is not registered.
    #[display("Root {operation} type \"{name}\" is not registered.")]
    MissingRootType {
        /// Operation the root serves.
        operation: OperationType,
        /// Name of the root type.
        name: ArcStr,
    },

    /// A root operation type is not an object type.
    #[display("Root {operation} type \"{name}\" must be an object type.")]
    RootNotObject {
        /// Operation the root serves.
        operation: OperationType,
        /// Name of the root type.
        name: ArcStr,
    },

    /// An object implements something that is not an interface.
    #[display("\"{object}\" may only implement interfaces, \"{interface}\" is not one.")]
    InvalidInterface {
        /// Implementing object.
        object: ArcStr,
        /// Implemented type.
        interface: ArcStr,
    },

    /// An object lacks a field of one of its interfaces.
    #[display("\"{interface}\" expects field \"{field}\" but \"{object}\" does not provide it.")]
    MissingInterfaceField {
        /// Interface declaring the field.
        interface: ArcStr,
        /// Field name.
        field: ArcStr,
        /// Implementing object.
        object: ArcStr,
    },

    /// An object field type is not a subtype of the interface field type.
    #[display(
        "{interface}.{field} expects type \"{expected}\" but {object}.{field} provides type \"{found}\"."
    )]
    InterfaceFieldTypeMismatch {
        /// Interface declaring the field.
        interface: ArcStr,
        /// Field name.
        field: ArcStr,
        /// Implementing object.
        object: ArcStr,
        /// Type declared by the interface.
        expected: Type,
        /// Type declared by the object.
        found: Type,
    },

    /// An object field lacks an argument of the interface field.
    #[display(
        "{interface}.{field} expects argument \"{argument}\" but {object}.{field} does not provide it."
    )]
    MissingInterfaceArgument {
        /// Interface declaring the field.
        interface: ArcStr,
        /// Field name.
        field: ArcStr,
        /// Argument name.
        argument: ArcStr,
        /// Implementing object.
        object: ArcStr,
    },

    /// An object field argument type differs from the interface's one.
    #[display(
        "{interface}.{field}({argument}:) expects type \"{expected}\" but {object}.{field}({argument}:) provides type \"{found}\"."
    )]
    InterfaceArgumentTypeMismatch {
        /// Interface declaring the field.
        interface: ArcStr,
        /// Field name.
        field: ArcStr,
        /// Argument name.
        argument: ArcStr,
        /// Implementing object.
        object: ArcStr,
        /// Type declared by the interface.
        expected: Type,
        /// Type declared by the object.
        found: Type,
    },

    /// An object field adds a required argument the interface lacks.
    #[display(
        "{object}.{field}({argument}:) is of required type \"{arg_type}\" but is not also provided by the interface {interface}.{field}."
    )]
    RequiredExtraArgument {
        /// Interface declaring the field.
        interface: ArcStr,
        /// Field name.
        field: ArcStr,
        /// Argument name.
        argument: ArcStr,
        /// Implementing object.
        object: ArcStr,
        /// Type of the argument.
        arg_type: Type,
    },

    /// A union member is not an object type.
    #[display("Union \"{union}\" may only contain object types, \"{member}\" is not one.")]
    InvalidUnionMember {
        /// The union.
        union: ArcStr,
        /// Offending member.
        member: ArcStr,
    },
}

/// Assembles a [`Schema`] out of its types.
#[must_use]
pub struct SchemaBuilder {
    query: ArcStr,
    mutation: Option<ArcStr>,
    subscription: Option<ArcStr>,
    directives: Vec<DirectiveType>,
    types: Vec<MetaType>,
}

impl SchemaBuilder {
    /// Sets the name of the mutation root type.
    pub fn mutation(mut self, name: impl Into<ArcStr>) -> Self {
        self.mutation = Some(name.into());
        self
    }

    /// Sets the name of the subscription root type.
    pub fn subscription(mut self, name: impl Into<ArcStr>) -> Self {
        self.subscription = Some(name.into());
        self
    }

    /// Adds directives besides the built-in `@skip`, `@include` and
    /// `@deprecated`.
    pub fn directives(mut self, directives: impl IntoIterator<Item = DirectiveType>) -> Self {
        self.directives.extend(directives);
        self
    }

    /// Registers a type.
    pub fn register(mut self, t: MetaType) -> Self {
        self.types.push(t);
        self
    }

    /// Registers several types.
    pub fn register_all(mut self, types: impl IntoIterator<Item = MetaType>) -> Self {
        self.types.extend(types);
        self
    }

    /// Checks the types for consistency and freezes them into a [`Schema`].
    ///
    /// # Errors
    ///
    /// See [`SchemaError`].
    pub fn build(self) -> Result<Schema, SchemaError> {
        let mut pool = IndexMap::<ArcStr, MetaType, FnvBuildHasher>::default();
        let builtins = scalars::builtin_scalars()
            .into_iter()
            .chain(introspection::meta_types());
        for t in builtins.chain(self.types) {
            let name = t.name().clone();
            if pool.insert(name.clone(), t).is_some() {
                return Err(SchemaError::DuplicateType(name));
            }
        }

        let roots = [
            (OperationType::Query, Some(&self.query)),
            (OperationType::Mutation, self.mutation.as_ref()),
            (OperationType::Subscription, self.subscription.as_ref()),
        ];
        for (operation, name) in roots {
            let Some(name) = name else { continue };
            match pool.get(name) {
                None => {
                    return Err(SchemaError::MissingRootType {
                        operation,
                        name: name.clone(),
                    });
                }
                Some(MetaType::Object(..)) => {}
                Some(_) => {
                    return Err(SchemaError::RootNotObject {
                        operation,
                        name: name.clone(),
                    });
                }
            }
        }

        // Walk references depth first from the roots, so the type map lists
        // them first.
        let mut order = IndexSet::<ArcStr, FnvBuildHasher>::default();
        let seeds = roots
            .iter()
            .filter_map(|&(_, n)| n.cloned())
            .chain(pool.keys().cloned())
            .collect::<Vec<_>>();
        for seed in seeds {
            let mut queue = vec![seed];
            while let Some(name) = queue.pop() {
                if !order.insert(name.clone()) {
                    continue;
                }
                let Some(t) = pool.get(&name) else {
                    continue;
                };
                for referenced in t.referenced_type_names().into_iter().rev() {
                    if !pool.contains_key(referenced) {
                        return Err(SchemaError::UnknownType {
                            referrer: name.clone(),
                            name: referenced.clone(),
                        });
                    }
                    queue.push(referenced.clone());
                }
            }
        }
        let types = order
            .into_iter()
            .filter_map(|n| pool.swap_remove(&n).map(|t| (n, t)))
            .collect::<IndexMap<_, _, FnvBuildHasher>>();

        let directives = [
            DirectiveType::new_skip(),
            DirectiveType::new_include(),
            DirectiveType::new_deprecated(),
        ]
        .into_iter()
        .chain(self.directives)
        .map(|d| (d.name.clone(), d))
        .collect();

        let mut schema = Schema {
            types,
            query_type_name: self.query,
            mutation_type_name: self.mutation,
            subscription_type_name: self.subscription,
            directives,
            possible_types: FnvHashMap::default(),
            typename_field: introspection::typename_field(),
            schema_field: introspection::schema_field(),
            type_field: introspection::type_field(),
        };
        schema.possible_types = schema.compute_possible_types()?;
        schema.check_interface_implementations()?;

        Ok(schema)
    }
}

impl Schema {
    /// Starts assembling a schema whose query root type is named `query`.
    pub fn builder(query: impl Into<ArcStr>) -> SchemaBuilder {
        SchemaBuilder {
            query: query.into(),
            mutation: None,
            subscription: None,
            directives: vec![],
            types: vec![],
        }
    }

    fn compute_possible_types(
        &self,
    ) -> Result<FnvHashMap<ArcStr, IndexSet<ArcStr, FnvBuildHasher>>, SchemaError> {
        let mut possible = FnvHashMap::<ArcStr, IndexSet<ArcStr, FnvBuildHasher>>::default();

        for t in self.types.values() {
            match t {
                MetaType::Union(UnionMeta {
                    name, of_type_names, ..
                }) => {
                    let members = possible.entry(name.clone()).or_default();
                    for member in of_type_names {
                        if !matches!(self.types.get(member), Some(MetaType::Object(..))) {
                            return Err(SchemaError::InvalidUnionMember {
                                union: name.clone(),
                                member: member.clone(),
                            });
                        }
                        members.insert(member.clone());
                    }
                }
                MetaType::Interface(InterfaceMeta { name, .. }) => {
                    possible.entry(name.clone()).or_default();
                }
                MetaType::Object(ObjectMeta {
                    name,
                    interface_names,
                    ..
                }) => {
                    for iface in interface_names {
                        if !matches!(self.types.get(iface), Some(MetaType::Interface(..))) {
                            return Err(SchemaError::InvalidInterface {
                                object: name.clone(),
                                interface: iface.clone(),
                            });
                        }
                        possible.entry(iface.clone()).or_default().insert(name.clone());
                    }
                }
                MetaType::Scalar(..) | MetaType::Enum(..) | MetaType::InputObject(..) => {}
            }
        }

        Ok(possible)
    }

    fn check_interface_implementations(&self) -> Result<(), SchemaError> {
        for t in self.types.values() {
            let MetaType::Object(ObjectMeta {
                name: object,
                fields: object_fields,
                interface_names,
                ..
            }) = t
            else {
                continue;
            };

            for iface in interface_names {
                let Some(MetaType::Interface(InterfaceMeta { fields, .. })) = self.types.get(iface)
                else {
                    continue;
                };

                for (field_name, iface_field) in fields {
                    let Some(obj_field) = object_fields.get(field_name) else {
                        return Err(SchemaError::MissingInterfaceField {
                            interface: iface.clone(),
                            field: field_name.clone(),
                            object: object.clone(),
                        });
                    };
                    if !self.is_subtype(&obj_field.field_type, &iface_field.field_type) {
                        return Err(SchemaError::InterfaceFieldTypeMismatch {
                            interface: iface.clone(),
                            field: field_name.clone(),
                            object: object.clone(),
                            expected: iface_field.field_type.clone(),
                            found: obj_field.field_type.clone(),
                        });
                    }

                    for (arg_name, iface_arg) in &iface_field.arguments {
                        let Some(obj_arg) = obj_field.arguments.get(arg_name) else {
                            return Err(SchemaError::MissingInterfaceArgument {
                                interface: iface.clone(),
                                field: field_name.clone(),
                                argument: arg_name.clone(),
                                object: object.clone(),
                            });
                        };
                        if obj_arg.arg_type != iface_arg.arg_type {
                            return Err(SchemaError::InterfaceArgumentTypeMismatch {
                                interface: iface.clone(),
                                field: field_name.clone(),
                                argument: arg_name.clone(),
                                object: object.clone(),
                                expected: iface_arg.arg_type.clone(),
                                found: obj_arg.arg_type.clone(),
                            });
                        }
                    }

                    let extra = obj_field
                        .arguments
                        .values()
                        .find(|a| !iface_field.arguments.contains_key(&a.name) && a.arg_type.is_non_null());
                    if let Some(arg) = extra {
                        return Err(SchemaError::RequiredExtraArgument {
                            interface: iface.clone(),
                            field: field_name.clone(),
                            argument: arg.name.clone(),
                            object: object.clone(),
                            arg_type: arg.arg_type.clone(),
                        });
                    }
                }
            }
        }
        Ok(())
    }

    /// Looks up a type by name, as a nullable type literal.
    pub fn type_by_name(&self, name: &str) -> Option<Type> {
        self.types.get_key_value(name).map(|(n, _)| Type::Named(n.clone()))
    }

    /// Looks up a type's metadata by name.
    pub fn concrete_type_by_name(&self, name: &str) -> Option<&MetaType> {
        self.types.get(name)
    }

    /// Looks up the metadata of the innermost named type of a type literal.
    pub fn innermost_concrete_type(&self, t: &Type) -> Option<&MetaType> {
        self.types.get(t.innermost_name())
    }

    /// The query root type.
    pub fn query_type(&self) -> &MetaType {
        // Presence is checked by `SchemaBuilder::build`.
        &self.types[&self.query_type_name]
    }

    /// The mutation root type, if the schema supports mutations.
    pub fn mutation_type(&self) -> Option<&MetaType> {
        self.mutation_type_name.as_ref().and_then(|n| self.types.get(n))
    }

    /// The subscription root type, if the schema supports subscriptions.
    pub fn subscription_type(&self) -> Option<&MetaType> {
        self.subscription_type_name.as_ref().and_then(|n| self.types.get(n))
    }

    /// The root type serving an operation kind, if any.
    pub fn root_type(&self, operation: OperationType) -> Option<&MetaType> {
        match operation {
            OperationType::Query => Some(self.query_type()),
            OperationType::Mutation => self.mutation_type(),
            OperationType::Subscription => self.subscription_type(),
        }
    }

    /// All types of this schema, roots first.
    pub fn type_list(&self) -> impl Iterator<Item = &MetaType> {
        self.types.values()
    }

    /// All directives of this schema.
    pub fn directive_list(&self) -> impl Iterator<Item = &DirectiveType> {
        self.directives.values()
    }

    /// Looks up a directive by name.
    pub fn directive_by_name(&self, name: &str) -> Option<&DirectiveType> {
        self.directives.get(name)
    }

    /// Looks up the field `name` on a composite type, resolving the
    /// meta-fields first: `__typename` exists on every composite type, and
    /// `__schema` and `__type` on the query root.
    pub fn field_def<'a>(&'a self, parent: &'a MetaType, name: &str) -> Option<&'a Field> {
        match name {
            "__typename" if parent.is_composite() => Some(&self.typename_field),
            "__schema" if parent.name() == &self.query_type_name => Some(&self.schema_field),
            "__type" if parent.name() == &self.query_type_name => Some(&self.type_field),
            _ => parent.field_by_name(name),
        }
    }

    /// Names of the object types an abstract type may resolve to at runtime.
    ///
    /// Empty for any other type.
    pub fn possible_type_names(&self, t: &MetaType) -> impl Iterator<Item = &ArcStr> {
        self.possible_types.get(t.name()).into_iter().flatten()
    }

    /// Object types an abstract type may resolve to at runtime.
    ///
    /// Empty for any other type.
    pub fn possible_types(&self, t: &MetaType) -> Vec<&MetaType> {
        self.possible_type_names(t)
            .filter_map(|n| self.types.get(n))
            .collect()
    }

    /// Whether `possible_type` is one of the object types `abstract_type`
    /// may resolve to.
    pub fn is_possible_type(&self, abstract_type: &MetaType, possible_type: &MetaType) -> bool {
        self.possible_types
            .get(abstract_type.name())
            .is_some_and(|set| set.contains(possible_type.name()))
    }

    /// Whether two composite types may be satisfied by a common object type.
    pub fn type_overlap(&self, t1: &MetaType, t2: &MetaType) -> bool {
        if t1.name() == t2.name() {
            return true;
        }

        match (t1.is_abstract(), t2.is_abstract()) {
            (true, true) => self
                .possible_type_names(t1)
                .any(|n| self.possible_types.get(t2.name()).is_some_and(|s| s.contains(n))),
            (true, false) => self.is_possible_type(t1, t2),
            (false, true) => self.is_possible_type(t2, t1),
            (false, false) => false,
        }
    }

    /// Whether a value of type `sub_type` is always acceptable where
    /// `super_type` is expected.
    pub fn is_subtype(&self, sub_type: &Type, super_type: &Type) -> bool {
        use Type::{List, Named, NonNullList, NonNullNamed};

        if super_type == sub_type {
            return true;
        }

        match (super_type, sub_type) {
            (NonNullNamed(super_name), NonNullNamed(sub_name))
            | (Named(super_name), Named(sub_name))
            | (Named(super_name), NonNullNamed(sub_name)) => {
                self.is_named_subtype(sub_name, super_name)
            }
            (NonNullList(super_inner), NonNullList(sub_inner))
            | (List(super_inner), List(sub_inner))
            | (List(super_inner), NonNullList(sub_inner)) => self.is_subtype(sub_inner, super_inner),
            _ => false,
        }
    }

    /// Whether the named type `sub_type_name` is `super_type_name` or one
    /// of its possible types.
    pub fn is_named_subtype(&self, sub_type_name: &str, super_type_name: &str) -> bool {
        if sub_type_name == super_type_name {
            return true;
        }
        match (
            self.concrete_type_by_name(sub_type_name),
            self.concrete_type_by_name(super_type_name),
        ) {
            (Some(sub_type), Some(super_type)) => {
                super_type.is_abstract() && self.is_possible_type(super_type, sub_type)
            }
            _ => false,
        }
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("query", &self.query_type_name)
            .field("mutation", &self.mutation_type_name)
            .field("subscription", &self.subscription_type_name)
            .field("types", &self.types.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}
