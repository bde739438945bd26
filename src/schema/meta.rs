//! Types used to describe a GraphQL schema

use std::{fmt, sync::Arc};

use arcstr::ArcStr;
use indexmap::IndexMap;

use crate::{
    ast::{InputValue, Type},
    executor::{Arguments, FieldValue, Resolution, ResolveInfo},
    value::Value,
};

/// Whether an item is deprecated, with context.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum DeprecationStatus {
    /// The field/variant is not deprecated.
    Current,
    /// The field/variant is deprecated, with an optional reason
    Deprecated(Option<ArcStr>),
}

impl DeprecationStatus {
    /// If this deprecation status indicates the item is deprecated.
    pub fn is_deprecated(&self) -> bool {
        match self {
            Self::Current => false,
            Self::Deprecated(_) => true,
        }
    }

    /// An optional reason for the deprecation, or none if `Current`.
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Current => None,
            Self::Deprecated(rsn) => rsn.as_deref(),
        }
    }
}

/// Turns a value produced by a resolver into a response value, or [`None`]
/// if it cannot be represented by the scalar.
pub type SerializeFn = fn(&Value) -> Option<Value>;

/// Coerces a variable value (e.g. from JSON) into the scalar's internal
/// value, or [`None`] if it is invalid.
pub type ParseValueFn = fn(&Value) -> Option<Value>;

/// Coerces a literal written in a document into the scalar's internal value,
/// or [`None`] if it is invalid. Never given a variable.
pub type ParseLiteralFn = fn(&InputValue) -> Option<Value>;

/// Produces the value of a field, given its parent value.
pub type Resolver = Arc<dyn Fn(&FieldValue, &Arguments, &ResolveInfo) -> Resolution + Send + Sync>;

/// Tells whether a resolved value belongs to an object type.
pub type IsTypeOfFn = Arc<dyn Fn(&FieldValue, &ResolveInfo) -> bool + Send + Sync>;

/// Picks the name of the object type of a value of an abstract type.
pub type ResolveTypeFn = Arc<dyn Fn(&FieldValue, &ResolveInfo) -> Option<ArcStr> + Send + Sync>;

/// Scalar type metadata
pub struct ScalarMeta {
    #[doc(hidden)]
    pub name: ArcStr,
    #[doc(hidden)]
    pub description: Option<ArcStr>,
    pub(crate) serialize: SerializeFn,
    pub(crate) parse_value: ParseValueFn,
    pub(crate) parse_literal: ParseLiteralFn,
}

/// Object type metadata
pub struct ObjectMeta {
    #[doc(hidden)]
    pub name: ArcStr,
    #[doc(hidden)]
    pub description: Option<ArcStr>,
    #[doc(hidden)]
    pub fields: IndexMap<ArcStr, Field>,
    #[doc(hidden)]
    pub interface_names: Vec<ArcStr>,
    pub(crate) is_type_of: Option<IsTypeOfFn>,
}

/// Enum type metadata
pub struct EnumMeta {
    #[doc(hidden)]
    pub name: ArcStr,
    #[doc(hidden)]
    pub description: Option<ArcStr>,
    #[doc(hidden)]
    pub values: IndexMap<ArcStr, EnumValue>,
}

/// Interface type metadata
pub struct InterfaceMeta {
    #[doc(hidden)]
    pub name: ArcStr,
    #[doc(hidden)]
    pub description: Option<ArcStr>,
    #[doc(hidden)]
    pub fields: IndexMap<ArcStr, Field>,
    pub(crate) resolve_type: Option<ResolveTypeFn>,
}

/// Union type metadata
pub struct UnionMeta {
    #[doc(hidden)]
    pub name: ArcStr,
    #[doc(hidden)]
    pub description: Option<ArcStr>,
    #[doc(hidden)]
    pub of_type_names: Vec<ArcStr>,
    pub(crate) resolve_type: Option<ResolveTypeFn>,
}

/// Input object metadata
pub struct InputObjectMeta {
    #[doc(hidden)]
    pub name: ArcStr,
    #[doc(hidden)]
    pub description: Option<ArcStr>,
    #[doc(hidden)]
    pub input_fields: IndexMap<ArcStr, Argument>,
}

/// Generic type metadata
pub enum MetaType {
    #[doc(hidden)]
    Scalar(ScalarMeta),
    #[doc(hidden)]
    Object(ObjectMeta),
    #[doc(hidden)]
    Enum(EnumMeta),
    #[doc(hidden)]
    Interface(InterfaceMeta),
    #[doc(hidden)]
    Union(UnionMeta),
    #[doc(hidden)]
    InputObject(InputObjectMeta),
}

/// Metadata for a field
#[derive(Clone)]
pub struct Field {
    #[doc(hidden)]
    pub name: ArcStr,
    #[doc(hidden)]
    pub description: Option<ArcStr>,
    #[doc(hidden)]
    pub arguments: IndexMap<ArcStr, Argument>,
    #[doc(hidden)]
    pub field_type: Type,
    #[doc(hidden)]
    pub deprecation_status: DeprecationStatus,
    pub(crate) resolver: Option<Resolver>,
}

/// Metadata for an argument to a field, or a field of an input object
#[derive(Clone, Debug, PartialEq)]
pub struct Argument {
    #[doc(hidden)]
    pub name: ArcStr,
    #[doc(hidden)]
    pub description: Option<ArcStr>,
    #[doc(hidden)]
    pub arg_type: Type,
    #[doc(hidden)]
    pub default_value: Option<InputValue>,
}

/// Metadata for a single value in an enum
#[derive(Clone, Debug, PartialEq)]
pub struct EnumValue {
    /// The name of the enum value
    ///
    /// This is the string literal representation of the enum in responses.
    pub name: ArcStr,
    /// The optional description of the enum value.
    pub description: Option<ArcStr>,
    /// Whether the enum value is deprecated or not, with an optional reason.
    pub deprecation_status: DeprecationStatus,
    /// Value resolvers produce and arguments receive for this enum value.
    pub value: Value,
}

/// The kind of a type, as reported by introspection.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum TypeKind {
    /// Leaf value.
    Scalar,
    /// Composite output type with fields.
    Object,
    /// Abstract type declaring fields implemented by objects.
    Interface,
    /// Abstract type listing its member objects.
    Union,
    /// Leaf value out of a fixed set.
    Enum,
    /// Composite input type.
    InputObject,
    /// List wrapper.
    List,
    /// Non-null wrapper.
    NonNull,
}

impl TypeKind {
    /// Name of this kind in the `__TypeKind` enum.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scalar => "SCALAR",
            Self::Object => "OBJECT",
            Self::Interface => "INTERFACE",
            Self::Union => "UNION",
            Self::Enum => "ENUM",
            Self::InputObject => "INPUT_OBJECT",
            Self::List => "LIST",
            Self::NonNull => "NON_NULL",
        }
    }
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ScalarMeta {
    /// Builds a new [`ScalarMeta`] type with the specified `name` and
    /// coercion functions.
    pub fn new(
        name: impl Into<ArcStr>,
        serialize: SerializeFn,
        parse_value: ParseValueFn,
        parse_literal: ParseLiteralFn,
    ) -> Self {
        Self {
            name: name.into(),
            description: None,
            serialize,
            parse_value,
            parse_literal,
        }
    }

    /// Sets the `description` of this [`ScalarMeta`] type.
    ///
    /// Overwrites any previously set description.
    #[must_use]
    pub fn description(mut self, description: impl Into<ArcStr>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Wraps this [`ScalarMeta`] type into a generic [`MetaType`].
    pub fn into_meta(self) -> MetaType {
        MetaType::Scalar(self)
    }
}

impl ObjectMeta {
    /// Builds a new [`ObjectMeta`] type with the specified `name` and no
    /// fields yet.
    pub fn new(name: impl Into<ArcStr>) -> Self {
        Self {
            name: name.into(),
            description: None,
            fields: IndexMap::new(),
            interface_names: vec![],
            is_type_of: None,
        }
    }

    /// Sets the `description` of this [`ObjectMeta`] type.
    ///
    /// Overwrites any previously set description.
    #[must_use]
    pub fn description(mut self, description: impl Into<ArcStr>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Adds a field to this [`ObjectMeta`] type.
    ///
    /// Replaces a previously added field of the same name.
    #[must_use]
    pub fn field(mut self, field: Field) -> Self {
        self.fields.insert(field.name.clone(), field);
        self
    }

    /// Sets the `interfaces` this [`ObjectMeta`] type implements.
    ///
    /// Overwrites any previously set list of interfaces.
    #[must_use]
    pub fn interfaces<I, N>(mut self, interfaces: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<ArcStr>,
    {
        self.interface_names = interfaces.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the check telling whether a value belongs to this type.
    #[must_use]
    pub fn is_type_of<F>(mut self, f: F) -> Self
    where
        F: Fn(&FieldValue, &ResolveInfo) -> bool + Send + Sync + 'static,
    {
        self.is_type_of = Some(Arc::new(f));
        self
    }

    /// Wraps this [`ObjectMeta`] type into a generic [`MetaType`].
    pub fn into_meta(self) -> MetaType {
        MetaType::Object(self)
    }
}

impl EnumMeta {
    /// Builds a new [`EnumMeta`] type with the specified `name` and possible
    /// `values`.
    pub fn new(name: impl Into<ArcStr>, values: impl IntoIterator<Item = EnumValue>) -> Self {
        Self {
            name: name.into(),
            description: None,
            values: values.into_iter().map(|v| (v.name.clone(), v)).collect(),
        }
    }

    /// Sets the `description` of this [`EnumMeta`] type.
    ///
    /// Overwrites any previously set description.
    #[must_use]
    pub fn description(mut self, description: impl Into<ArcStr>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Wraps this [`EnumMeta`] type into a generic [`MetaType`].
    pub fn into_meta(self) -> MetaType {
        MetaType::Enum(self)
    }

    /// Looks up the enum value whose internal value is `value`.
    pub fn value_of(&self, value: &Value) -> Option<&EnumValue> {
        self.values.values().find(|v| &v.value == value)
    }
}

impl InterfaceMeta {
    /// Builds a new [`InterfaceMeta`] type with the specified `name` and no
    /// fields yet.
    pub fn new(name: impl Into<ArcStr>) -> Self {
        Self {
            name: name.into(),
            description: None,
            fields: IndexMap::new(),
            resolve_type: None,
        }
    }

    /// Sets the `description` of this [`InterfaceMeta`] type.
    ///
    /// Overwrites any previously set description.
    #[must_use]
    pub fn description(mut self, description: impl Into<ArcStr>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Adds a field to this [`InterfaceMeta`] type.
    #[must_use]
    pub fn field(mut self, field: Field) -> Self {
        self.fields.insert(field.name.clone(), field);
        self
    }

    /// Sets the function picking the object type of a value of this
    /// interface.
    #[must_use]
    pub fn resolve_type<F>(mut self, f: F) -> Self
    where
        F: Fn(&FieldValue, &ResolveInfo) -> Option<ArcStr> + Send + Sync + 'static,
    {
        self.resolve_type = Some(Arc::new(f));
        self
    }

    /// Wraps this [`InterfaceMeta`] type into a generic [`MetaType`].
    pub fn into_meta(self) -> MetaType {
        MetaType::Interface(self)
    }
}

impl UnionMeta {
    /// Builds a new [`UnionMeta`] type with the specified `name` and
    /// `of_types` being its members.
    pub fn new<I, N>(name: impl Into<ArcStr>, of_types: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<ArcStr>,
    {
        Self {
            name: name.into(),
            description: None,
            of_type_names: of_types.into_iter().map(Into::into).collect(),
            resolve_type: None,
        }
    }

    /// Sets the `description` of this [`UnionMeta`] type.
    ///
    /// Overwrites any previously set description.
    #[must_use]
    pub fn description(mut self, description: impl Into<ArcStr>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the function picking the object type of a value of this union.
    #[must_use]
    pub fn resolve_type<F>(mut self, f: F) -> Self
    where
        F: Fn(&FieldValue, &ResolveInfo) -> Option<ArcStr> + Send + Sync + 'static,
    {
        self.resolve_type = Some(Arc::new(f));
        self
    }

    /// Wraps this [`UnionMeta`] type into a generic [`MetaType`].
    pub fn into_meta(self) -> MetaType {
        MetaType::Union(self)
    }
}

impl InputObjectMeta {
    /// Builds a new [`InputObjectMeta`] type with the specified `name` and
    /// `input_fields`.
    pub fn new(name: impl Into<ArcStr>, input_fields: impl IntoIterator<Item = Argument>) -> Self {
        Self {
            name: name.into(),
            description: None,
            input_fields: input_fields
                .into_iter()
                .map(|f| (f.name.clone(), f))
                .collect(),
        }
    }

    /// Sets the `description` of this [`InputObjectMeta`] type.
    ///
    /// Overwrites any previously set description.
    #[must_use]
    pub fn description(mut self, description: impl Into<ArcStr>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Wraps this [`InputObjectMeta`] type into a generic [`MetaType`].
    pub fn into_meta(self) -> MetaType {
        MetaType::InputObject(self)
    }
}

impl MetaType {
    /// Returns the name of the represented type.
    pub fn name(&self) -> &ArcStr {
        match self {
            Self::Scalar(ScalarMeta { name, .. })
            | Self::Object(ObjectMeta { name, .. })
            | Self::Enum(EnumMeta { name, .. })
            | Self::Interface(InterfaceMeta { name, .. })
            | Self::Union(UnionMeta { name, .. })
            | Self::InputObject(InputObjectMeta { name, .. }) => name,
        }
    }

    /// Returns the description of the represented type, if any.
    pub fn description(&self) -> Option<&ArcStr> {
        match self {
            Self::Scalar(ScalarMeta { description, .. })
            | Self::Object(ObjectMeta { description, .. })
            | Self::Enum(EnumMeta { description, .. })
            | Self::Interface(InterfaceMeta { description, .. })
            | Self::Union(UnionMeta { description, .. })
            | Self::InputObject(InputObjectMeta { description, .. }) => description.as_ref(),
        }
    }

    /// Returns a [`TypeKind`] of this type.
    pub fn type_kind(&self) -> TypeKind {
        match self {
            Self::Scalar(..) => TypeKind::Scalar,
            Self::Object(..) => TypeKind::Object,
            Self::Enum(..) => TypeKind::Enum,
            Self::Interface(..) => TypeKind::Interface,
            Self::Union(..) => TypeKind::Union,
            Self::InputObject(..) => TypeKind::InputObject,
        }
    }

    /// Returns the declared fields of an object or interface type.
    pub fn fields(&self) -> Option<&IndexMap<ArcStr, Field>> {
        match self {
            Self::Object(ObjectMeta { fields, .. }) | Self::Interface(InterfaceMeta { fields, .. }) => {
                Some(fields)
            }
            _ => None,
        }
    }

    /// Accesses a field's metadata given its name.
    ///
    /// Only objects and interfaces have fields. This method always returns
    /// [`None`] for other types. Meta-fields such as `__typename` are not
    /// declared fields; see [`Schema::field_def()`].
    ///
    /// [`Schema::field_def()`]: crate::schema::model::Schema::field_def
    pub fn field_by_name(&self, name: &str) -> Option<&Field> {
        self.fields().and_then(|fields| fields.get(name))
    }

    /// Accesses an input field's metadata given its name.
    ///
    /// Only input objects have input fields. This method always returns
    /// [`None`] for other types.
    pub fn input_field_by_name(&self, name: &str) -> Option<&Argument> {
        match self {
            Self::InputObject(InputObjectMeta { input_fields, .. }) => input_fields.get(name),
            _ => None,
        }
    }

    /// Returns `true` if this type can have fields: objects, interfaces and
    /// unions.
    pub fn is_composite(&self) -> bool {
        matches!(self, Self::Object(..) | Self::Interface(..) | Self::Union(..))
    }

    /// Returns `true` if this type is a leaf: scalars and enums.
    pub fn is_leaf(&self) -> bool {
        matches!(self, Self::Enum(..) | Self::Scalar(..))
    }

    /// Returns `true` if the type is abstract: interfaces and unions.
    pub fn is_abstract(&self) -> bool {
        matches!(self, Self::Interface(..) | Self::Union(..))
    }

    /// Returns `true` if the type can be used in an input position, e.g.
    /// arguments or variables. Only scalars, enums, and input objects are
    /// input types.
    pub fn is_input(&self) -> bool {
        matches!(self, Self::Scalar(..) | Self::Enum(..) | Self::InputObject(..))
    }

    /// Returns `true` if the type can be used as an output type.
    pub fn is_output(&self) -> bool {
        !matches!(self, Self::InputObject(..))
    }

    /// Returns `true` if the type is built in: a standard scalar or an
    /// introspection type.
    pub fn is_builtin(&self) -> bool {
        let name = self.name().as_str();
        name.starts_with("__") || matches!(name, "Boolean" | "String" | "Int" | "Float" | "ID")
    }

    /// Names of all types referenced by this type: field and argument types,
    /// interfaces, union members and input field types.
    pub(crate) fn referenced_type_names(&self) -> Vec<&ArcStr> {
        fn field_refs(fields: &IndexMap<ArcStr, Field>) -> impl Iterator<Item = &ArcStr> {
            fields.values().flat_map(|f| {
                arg_refs(&f.arguments).chain(std::iter::once(f.field_type.innermost_name()))
            })
        }
        fn arg_refs(args: &IndexMap<ArcStr, Argument>) -> impl Iterator<Item = &ArcStr> {
            args.values().map(|a| a.arg_type.innermost_name())
        }

        match self {
            Self::Scalar(..) | Self::Enum(..) => vec![],
            Self::Object(ObjectMeta {
                fields,
                interface_names,
                ..
            }) => field_refs(fields).chain(interface_names).collect(),
            Self::Interface(InterfaceMeta { fields, .. }) => field_refs(fields).collect(),
            Self::Union(UnionMeta { of_type_names, .. }) => of_type_names.iter().collect(),
            Self::InputObject(InputObjectMeta { input_fields, .. }) => arg_refs(input_fields).collect(),
        }
    }
}

impl fmt::Debug for MetaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetaType")
            .field("kind", &self.type_kind())
            .field("name", self.name())
            .finish_non_exhaustive()
    }
}

impl Field {
    /// Builds a new [`Field`] with the specified `name` and `field_type`,
    /// resolved by the default resolver until [`Field::resolver()`] is set.
    pub fn new(name: impl Into<ArcStr>, field_type: Type) -> Self {
        Self {
            name: name.into(),
            description: None,
            arguments: IndexMap::new(),
            field_type,
            deprecation_status: DeprecationStatus::Current,
            resolver: None,
        }
    }

    /// Sets the `description` of this [`Field`].
    ///
    /// Overwrites any previously set description.
    #[must_use]
    pub fn description(mut self, description: impl Into<ArcStr>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Adds an `argument` to this [`Field`].
    #[must_use]
    pub fn argument(mut self, argument: Argument) -> Self {
        self.arguments.insert(argument.name.clone(), argument);
        self
    }

    /// Sets this [`Field`] as deprecated with an optional `reason`.
    ///
    /// Overwrites any previously set deprecation reason.
    #[must_use]
    pub fn deprecated(mut self, reason: Option<&str>) -> Self {
        self.deprecation_status = DeprecationStatus::Deprecated(reason.map(Into::into));
        self
    }

    /// Sets the resolver of this [`Field`].
    #[must_use]
    pub fn resolver<F>(mut self, f: F) -> Self
    where
        F: Fn(&FieldValue, &Arguments, &ResolveInfo) -> Resolution + Send + Sync + 'static,
    {
        self.resolver = Some(Arc::new(f));
        self
    }

    /// Returns `true` if this [`Field`] is a meta-field: its name starts
    /// with `__`.
    pub fn is_builtin(&self) -> bool {
        self.name.starts_with("__")
    }

    /// The resolver of this field, if not the default one.
    pub fn resolver_fn(&self) -> Option<&Resolver> {
        self.resolver.as_ref()
    }
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("arguments", &self.arguments)
            .field("field_type", &self.field_type)
            .field("deprecation_status", &self.deprecation_status)
            .field("resolver", &self.resolver.as_ref().map(|_| ".."))
            .finish()
    }
}

impl Argument {
    /// Builds a new [`Argument`] of the given [`Type`] with the given `name`.
    pub fn new(name: impl Into<ArcStr>, arg_type: Type) -> Self {
        Self {
            name: name.into(),
            description: None,
            arg_type,
            default_value: None,
        }
    }

    /// Sets the `description` of this [`Argument`].
    ///
    /// Overwrites any previously set description.
    #[must_use]
    pub fn description(mut self, description: impl Into<ArcStr>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the default value of this [`Argument`].
    ///
    /// Overwrites any previously set default value.
    #[must_use]
    pub fn default_value(mut self, val: InputValue) -> Self {
        self.default_value = Some(val);
        self
    }
}

impl EnumValue {
    /// Constructs a new [`EnumValue`] with the provided `name`, whose
    /// internal value is the name as a string.
    pub fn new(name: impl Into<ArcStr>) -> Self {
        let name = name.into();
        Self {
            value: Value::scalar(name.as_str()),
            name,
            description: None,
            deprecation_status: DeprecationStatus::Current,
        }
    }

    /// Sets the internal value resolvers produce and arguments receive.
    #[must_use]
    pub fn value(mut self, value: impl Into<Value>) -> Self {
        self.value = value.into();
        self
    }

    /// Sets the `description` of this [`EnumValue`].
    ///
    /// Overwrites any previously set description.
    #[must_use]
    pub fn description(mut self, description: impl Into<ArcStr>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets this [`EnumValue`] as deprecated with an optional `reason`.
    ///
    /// Overwrites any previously set deprecation reason.
    #[must_use]
    pub fn deprecated(mut self, reason: Option<&str>) -> Self {
        self.deprecation_status = DeprecationStatus::Deprecated(reason.map(Into::into));
        self
    }
}
