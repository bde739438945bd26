//! The `__Schema` family of types, and the meta-fields exposing them.
//!
//! Introspection values are small descriptors naming what they describe.
//! Their resolvers look the described item up in [`ResolveInfo::schema`].

use std::any::Any;

use arcstr::ArcStr;

use crate::{
    ast::Type,
    executor::{Arguments, FieldError, FieldValue, Resolution, ResolveInfo},
    schema::{
        meta::{Argument, DeprecationStatus, EnumMeta, EnumValue, Field, MetaType, ObjectMeta, TypeKind},
        model::{DirectiveLocation, Schema},
    },
    value::Value,
};

/// The canonical introspection query, as GraphQL tools send it.
pub const INTROSPECTION_QUERY: &str = include_str!("./query.graphql");

struct SchemaRef;

/// A type literal: named types describe the schema type, wrappers describe
/// themselves.
struct TypeRef(Type);

struct FieldRef {
    parent: ArcStr,
    name: ArcStr,
}

enum InputValueOwner {
    Field { parent: ArcStr, field: ArcStr },
    InputObject(ArcStr),
    Directive(ArcStr),
}

struct InputValueRef {
    owner: InputValueOwner,
    name: ArcStr,
}

struct EnumValueRef {
    enum_name: ArcStr,
    name: ArcStr,
}

struct DirectiveRef(ArcStr);

impl TypeRef {
    fn meta<'s>(&self, schema: &'s Schema) -> Option<&'s MetaType> {
        match &self.0 {
            Type::Named(n) => schema.concrete_type_by_name(n),
            Type::List(_) | Type::NonNullNamed(_) | Type::NonNullList(_) => None,
        }
    }

    fn kind(&self, schema: &Schema) -> Option<TypeKind> {
        match &self.0 {
            Type::Named(_) => self.meta(schema).map(MetaType::type_kind),
            Type::List(_) => Some(TypeKind::List),
            Type::NonNullNamed(_) | Type::NonNullList(_) => Some(TypeKind::NonNull),
        }
    }

    fn of_type(&self) -> Option<Type> {
        match &self.0 {
            Type::Named(_) => None,
            Type::List(l) => Some((**l).clone()),
            nn @ (Type::NonNullNamed(_) | Type::NonNullList(_)) => Some(nn.nullable()),
        }
    }
}

impl InputValueRef {
    fn argument<'s>(&self, schema: &'s Schema) -> Option<&'s Argument> {
        match &self.owner {
            InputValueOwner::Field { parent, field } => schema
                .concrete_type_by_name(parent)?
                .field_by_name(field)?
                .arguments
                .get(&self.name),
            InputValueOwner::InputObject(name) => {
                schema.concrete_type_by_name(name)?.input_field_by_name(&self.name)
            }
            InputValueOwner::Directive(name) => schema.directive_by_name(name)?.arguments.get(&self.name),
        }
    }
}

impl FieldRef {
    fn field<'s>(&self, schema: &'s Schema) -> Option<&'s Field> {
        schema.concrete_type_by_name(&self.parent)?.field_by_name(&self.name)
    }
}

impl EnumValueRef {
    fn value<'s>(&self, schema: &'s Schema) -> Option<&'s EnumValue> {
        match schema.concrete_type_by_name(&self.enum_name)? {
            MetaType::Enum(e) => e.values.get(&self.name),
            _ => None,
        }
    }
}

/// Builds a field whose resolver reads a `T` descriptor.
fn field<T, F>(name: &str, field_type: Type, f: F) -> Field
where
    T: Any,
    F: Fn(&T, &Arguments, &Schema) -> FieldValue + Send + Sync + 'static,
{
    Field::new(name, field_type).resolver(move |source, args, info| {
        let resolved = source.downcast_ref::<T>().map(|s| f(s, args, info.schema()));
        Resolution::ready(resolved.ok_or_else(|| {
            FieldError::from(format!(
                "Introspection field \"{}.{}\" received an unexpected value.",
                info.parent_type(),
                info.field_name(),
            ))
        }))
    })
}

fn string(s: Option<&ArcStr>) -> FieldValue {
    s.map_or(FieldValue::Null, |s| FieldValue::value(s.as_str()))
}

fn type_ref(t: Type) -> FieldValue {
    FieldValue::object(TypeRef(t))
}

fn named(name: &ArcStr) -> FieldValue {
    type_ref(Type::Named(name.clone()))
}

fn non_null_list_of(name: &str) -> Type {
    Type::non_null_list(Type::non_null_named(name))
}

fn list_of(name: &str) -> Type {
    Type::list(Type::non_null_named(name))
}

fn include_deprecated(args: &Arguments) -> bool {
    args.get("includeDeprecated")
        .and_then(Value::as_boolean_value)
        .unwrap_or(false)
}

fn include_deprecated_argument() -> Argument {
    Argument::new("includeDeprecated", Type::named("Boolean"))
        .default_value(crate::ast::InputValue::Boolean(false))
}

fn deprecation_fields<T, F>(status: F) -> [Field; 2]
where
    T: Any,
    F: Fn(&T, &Schema) -> Option<DeprecationStatus> + Clone + Send + Sync + 'static,
{
    let reason = status.clone();
    [
        field("isDeprecated", Type::non_null_named("Boolean"), move |s: &T, _, schema| {
            FieldValue::value(status(s, schema).is_some_and(|d| d.is_deprecated()))
        }),
        field("deprecationReason", Type::named("String"), move |s: &T, _, schema| {
            reason(s, schema)
                .and_then(|d| d.reason().map(|r| FieldValue::value(r)))
                .unwrap_or_default()
        }),
    ]
}

fn schema_type() -> MetaType {
    ObjectMeta::new("__Schema")
        .description(
            "A GraphQL Schema defines the capabilities of a GraphQL server. It exposes all \
             available types and directives on the server, as well as the entry points for \
             query, mutation, and subscription operations.",
        )
        .field(
            field("types", non_null_list_of("__Type"), |_: &SchemaRef, _, schema| {
                FieldValue::list(schema.type_list().map(|t| named(t.name())))
            })
            .description("A list of all types supported by this server."),
        )
        .field(
            field("queryType", Type::non_null_named("__Type"), |_: &SchemaRef, _, schema| {
                named(schema.query_type().name())
            })
            .description("The type that query operations will be rooted at."),
        )
        .field(
            field("mutationType", Type::named("__Type"), |_: &SchemaRef, _, schema| {
                schema.mutation_type().map_or(FieldValue::Null, |t| named(t.name()))
            })
            .description(
                "If this server supports mutation, the type that mutation operations will be \
                 rooted at.",
            ),
        )
        .field(
            field("subscriptionType", Type::named("__Type"), |_: &SchemaRef, _, schema| {
                schema.subscription_type().map_or(FieldValue::Null, |t| named(t.name()))
            })
            .description(
                "If this server support subscription, the type that subscription operations \
                 will be rooted at.",
            ),
        )
        .field(
            field("directives", non_null_list_of("__Directive"), |_: &SchemaRef, _, schema| {
                FieldValue::list(
                    schema
                        .directive_list()
                        .map(|d| FieldValue::object(DirectiveRef(d.name.clone()))),
                )
            })
            .description("A list of all directives supported by this server."),
        )
        .into_meta()
}

fn type_type() -> MetaType {
    ObjectMeta::new("__Type")
        .description(
            "The fundamental unit of any GraphQL Schema is the type. There are many kinds of \
             types in GraphQL as represented by the `__TypeKind` enum.",
        )
        .field(field("kind", Type::non_null_named("__TypeKind"), |t: &TypeRef, _, schema| {
            t.kind(schema)
                .map_or(FieldValue::Null, |k| FieldValue::value(k.as_str()))
        }))
        .field(field("name", Type::named("String"), |t: &TypeRef, _, schema| {
            string(t.meta(schema).map(MetaType::name))
        }))
        .field(field("description", Type::named("String"), |t: &TypeRef, _, schema| {
            string(t.meta(schema).and_then(MetaType::description))
        }))
        .field(
            field("fields", list_of("__Field"), |t: &TypeRef, args, schema| {
                let Some(meta @ (MetaType::Object(_) | MetaType::Interface(_))) = t.meta(schema) else {
                    return FieldValue::Null;
                };
                let include_deprecated = include_deprecated(args);
                FieldValue::list(
                    meta.fields()
                        .into_iter()
                        .flat_map(|fields| fields.values())
                        .filter(|f| !f.is_builtin())
                        .filter(|f| include_deprecated || !f.deprecation_status.is_deprecated())
                        .map(|f| {
                            FieldValue::object(FieldRef {
                                parent: meta.name().clone(),
                                name: f.name.clone(),
                            })
                        }),
                )
            })
            .argument(include_deprecated_argument()),
        )
        .field(field("interfaces", list_of("__Type"), |t: &TypeRef, _, schema| {
            match t.meta(schema) {
                Some(MetaType::Object(o)) => FieldValue::list(o.interface_names.iter().map(named)),
                _ => FieldValue::Null,
            }
        }))
        .field(field("possibleTypes", list_of("__Type"), |t: &TypeRef, _, schema| {
            match t.meta(schema) {
                Some(meta) if meta.is_abstract() => {
                    FieldValue::list(schema.possible_type_names(meta).map(named))
                }
                _ => FieldValue::Null,
            }
        }))
        .field(
            field("enumValues", list_of("__EnumValue"), |t: &TypeRef, args, schema| {
                let Some(MetaType::Enum(EnumMeta { name, values, .. })) = t.meta(schema) else {
                    return FieldValue::Null;
                };
                let include_deprecated = include_deprecated(args);
                FieldValue::list(
                    values
                        .values()
                        .filter(|v| include_deprecated || !v.deprecation_status.is_deprecated())
                        .map(|v| {
                            FieldValue::object(EnumValueRef {
                                enum_name: name.clone(),
                                name: v.name.clone(),
                            })
                        }),
                )
            })
            .argument(include_deprecated_argument()),
        )
        .field(field("inputFields", list_of("__InputValue"), |t: &TypeRef, _, schema| {
            match t.meta(schema) {
                Some(MetaType::InputObject(io)) => FieldValue::list(io.input_fields.keys().map(|n| {
                    FieldValue::object(InputValueRef {
                        owner: InputValueOwner::InputObject(io.name.clone()),
                        name: n.clone(),
                    })
                })),
                _ => FieldValue::Null,
            }
        }))
        .field(field("ofType", Type::named("__Type"), |t: &TypeRef, _, _| {
            t.of_type().map_or(FieldValue::Null, type_ref)
        }))
        .into_meta()
}

fn field_type() -> MetaType {
    let [is_deprecated, deprecation_reason] =
        deprecation_fields(|f: &FieldRef, schema| f.field(schema).map(|f| f.deprecation_status.clone()));

    ObjectMeta::new("__Field")
        .description(
            "Object and Interface types are described by a list of Fields, each of which has \
             a name, potentially a list of arguments, and a return type.",
        )
        .field(field("name", Type::non_null_named("String"), |f: &FieldRef, _, _| {
            FieldValue::value(f.name.as_str())
        }))
        .field(field("description", Type::named("String"), |f: &FieldRef, _, schema| {
            string(f.field(schema).and_then(|f| f.description.as_ref()))
        }))
        .field(field("args", non_null_list_of("__InputValue"), |f: &FieldRef, _, schema| {
            FieldValue::list(f.field(schema).into_iter().flat_map(|def| {
                def.arguments.keys().map(|n| {
                    FieldValue::object(InputValueRef {
                        owner: InputValueOwner::Field {
                            parent: f.parent.clone(),
                            field: f.name.clone(),
                        },
                        name: n.clone(),
                    })
                })
            }))
        }))
        .field(field("type", Type::non_null_named("__Type"), |f: &FieldRef, _, schema| {
            f.field(schema)
                .map_or(FieldValue::Null, |def| type_ref(def.field_type.clone()))
        }))
        .field(is_deprecated)
        .field(deprecation_reason)
        .into_meta()
}

fn input_value_type() -> MetaType {
    ObjectMeta::new("__InputValue")
        .description(
            "Arguments provided to Fields or Directives and the input fields of an \
             InputObject are represented as Input Values which describe their type and \
             optionally a default value.",
        )
        .field(field("name", Type::non_null_named("String"), |v: &InputValueRef, _, _| {
            FieldValue::value(v.name.as_str())
        }))
        .field(field("description", Type::named("String"), |v: &InputValueRef, _, schema| {
            string(v.argument(schema).and_then(|a| a.description.as_ref()))
        }))
        .field(field("type", Type::non_null_named("__Type"), |v: &InputValueRef, _, schema| {
            v.argument(schema)
                .map_or(FieldValue::Null, |a| type_ref(a.arg_type.clone()))
        }))
        .field(
            field("defaultValue", Type::named("String"), |v: &InputValueRef, _, schema| {
                v.argument(schema)
                    .and_then(|a| a.default_value.as_ref())
                    .map_or(FieldValue::Null, |d| FieldValue::value(d.to_string()))
            })
            .description(
                "A GraphQL-formatted string representing the default value for this input value.",
            ),
        )
        .into_meta()
}

fn enum_value_type() -> MetaType {
    let [is_deprecated, deprecation_reason] = deprecation_fields(|v: &EnumValueRef, schema| {
        v.value(schema).map(|v| v.deprecation_status.clone())
    });

    ObjectMeta::new("__EnumValue")
        .description(
            "One possible value for a given Enum. Enum values are unique values, not a \
             placeholder for a string or numeric value.",
        )
        .field(field("name", Type::non_null_named("String"), |v: &EnumValueRef, _, _| {
            FieldValue::value(v.name.as_str())
        }))
        .field(field("description", Type::named("String"), |v: &EnumValueRef, _, schema| {
            string(v.value(schema).and_then(|v| v.description.as_ref()))
        }))
        .field(is_deprecated)
        .field(deprecation_reason)
        .into_meta()
}

fn directive_type() -> MetaType {
    ObjectMeta::new("__Directive")
        .description(
            "A Directive provides a way to describe alternate runtime execution and type \
             validation behavior in a GraphQL document.",
        )
        .field(field("name", Type::non_null_named("String"), |d: &DirectiveRef, _, _| {
            FieldValue::value(d.0.as_str())
        }))
        .field(field("description", Type::named("String"), |d: &DirectiveRef, _, schema| {
            string(schema.directive_by_name(&d.0).and_then(|d| d.description.as_ref()))
        }))
        .field(field(
            "locations",
            non_null_list_of("__DirectiveLocation"),
            |d: &DirectiveRef, _, schema| {
                FieldValue::list(
                    schema
                        .directive_by_name(&d.0)
                        .into_iter()
                        .flat_map(|d| d.locations.iter().map(|l| FieldValue::value(l.as_str()))),
                )
            },
        ))
        .field(field("args", non_null_list_of("__InputValue"), |d: &DirectiveRef, _, schema| {
            FieldValue::list(schema.directive_by_name(&d.0).into_iter().flat_map(|def| {
                def.arguments.keys().map(|n| {
                    FieldValue::object(InputValueRef {
                        owner: InputValueOwner::Directive(d.0.clone()),
                        name: n.clone(),
                    })
                })
            }))
        }))
        .into_meta()
}

fn type_kind_type() -> MetaType {
    let kinds = [
        (TypeKind::Scalar, "Indicates this type is a scalar."),
        (
            TypeKind::Object,
            "Indicates this type is an object. `fields` and `interfaces` are valid fields.",
        ),
        (
            TypeKind::Interface,
            "Indicates this type is an interface. `fields` and `possibleTypes` are valid fields.",
        ),
        (
            TypeKind::Union,
            "Indicates this type is a union. `possibleTypes` is a valid field.",
        ),
        (
            TypeKind::Enum,
            "Indicates this type is an enum. `enumValues` is a valid field.",
        ),
        (
            TypeKind::InputObject,
            "Indicates this type is an input object. `inputFields` is a valid field.",
        ),
        (
            TypeKind::List,
            "Indicates this type is a list. `ofType` is a valid field.",
        ),
        (
            TypeKind::NonNull,
            "Indicates this type is a non-null. `ofType` is a valid field.",
        ),
    ];
    EnumMeta::new(
        "__TypeKind",
        kinds
            .into_iter()
            .map(|(k, description)| EnumValue::new(k.as_str()).description(description)),
    )
    .description("An enum describing what kind of type a given `__Type` is.")
    .into_meta()
}

fn directive_location_type() -> MetaType {
    EnumMeta::new(
        "__DirectiveLocation",
        DirectiveLocation::ALL
            .iter()
            .map(|l| EnumValue::new(l.as_str())),
    )
    .description(
        "A Directive can be adjacent to many parts of the GraphQL language, a \
         __DirectiveLocation describes one such possible adjacencies.",
    )
    .into_meta()
}

/// The introspection types every schema contains.
pub(crate) fn meta_types() -> Vec<MetaType> {
    vec![
        schema_type(),
        type_type(),
        field_type(),
        input_value_type(),
        enum_value_type(),
        directive_type(),
        type_kind_type(),
        directive_location_type(),
    ]
}

/// `__typename`, available on every composite type.
pub(crate) fn typename_field() -> Field {
    Field::new("__typename", Type::non_null_named("String"))
        .description("The name of the current Object type at runtime.")
        .resolver(|_, _, info: &ResolveInfo| Resolution::value(info.parent_type().as_str()))
}

/// `__schema`, available on the query root.
pub(crate) fn schema_field() -> Field {
    Field::new("__schema", Type::non_null_named("__Schema"))
        .description("Access the current type schema of this server.")
        .resolver(|_, _, _| Resolution::ready(Ok(FieldValue::object(SchemaRef))))
}

/// `__type(name:)`, available on the query root.
pub(crate) fn type_field() -> Field {
    Field::new("__type", Type::named("__Type"))
        .description("Request the type information of a single type.")
        .argument(Argument::new("name", Type::non_null_named("String")))
        .resolver(|_, args, info| {
            let found = args
                .get("name")
                .and_then(Value::as_string_value)
                .and_then(|n| info.schema().type_by_name(n));
            Resolution::ready(Ok(found.map_or(FieldValue::Null, type_ref)))
        })
}
