use pretty_assertions::assert_eq;

use crate::{
    Engine, INTROSPECTION_QUERY, Request, Value,
    ast::{InputValue, Type},
    graphql_value,
    schema::{
        meta::{Argument, EnumMeta, EnumValue, Field, InterfaceMeta, ObjectMeta},
        model::Schema,
    },
};

fn schema() -> Schema {
    let episode = EnumMeta::new(
        "Episode",
        [
            EnumValue::new("NEWHOPE").description("Released in 1977."),
            EnumValue::new("EMPIRE"),
            EnumValue::new("JEDI"),
            EnumValue::new("HOLIDAY").deprecated(Some("We don't talk about it.")),
        ],
    )
    .into_meta();
    let character = InterfaceMeta::new("Character")
        .field(Field::new("id", Type::non_null_named("String")))
        .field(Field::new("name", Type::named("String")))
        .into_meta();
    let droid = ObjectMeta::new("Droid")
        .description("A mechanical creature.")
        .field(Field::new("id", Type::non_null_named("String")))
        .field(Field::new("name", Type::named("String")))
        .field(Field::new("friends", Type::non_null_list(Type::non_null_named("Character"))))
        .field(Field::new("primaryFunction", Type::named("String")).deprecated(None))
        .interfaces(["Character"])
        .into_meta();
    let query = ObjectMeta::new("Query")
        .field(
            Field::new("hero", Type::named("Character")).argument(
                Argument::new("episode", Type::named("Episode"))
                    .description("Defaults to the whole saga."),
            ),
        )
        .field(
            Field::new("droids", Type::list(Type::named("Droid")))
                .argument(Argument::new("first", Type::named("Int")).default_value(InputValue::Int("10".into()))),
        )
        .into_meta();

    Schema::builder("Query")
        .register_all([query, character, droid, episode])
        .build()
        .expect("valid schema")
}

async fn run(query: &str) -> Value {
    let res = Engine::new(schema()).execute(Request::new(query)).await;

    assert_eq!(res.errors, []);
    res.data.expect("data is present")
}

#[tokio::test]
async fn root_types() {
    assert_eq!(
        run("{ __schema { queryType { name kind } mutationType { name } subscriptionType { name } } }")
            .await,
        graphql_value!({
            "__schema": {
                "queryType": {"name": "Query", "kind": "OBJECT"},
                "mutationType": null,
                "subscriptionType": null,
            },
        }),
    );
}

#[tokio::test]
async fn object_fields_and_wrapped_types() {
    let data = run(
        r#"{
          __type(name: "Droid") {
            name
            kind
            description
            interfaces { name }
            fields { name type { kind name ofType { kind name ofType { kind name ofType { name } } } } }
          }
        }"#,
    )
    .await;

    assert_eq!(
        data,
        graphql_value!({
            "__type": {
                "name": "Droid",
                "kind": "OBJECT",
                "description": "A mechanical creature.",
                "interfaces": [{"name": "Character"}],
                "fields": [
                    {
                        "name": "id",
                        "type": {
                            "kind": "NON_NULL",
                            "name": null,
                            "ofType": {"kind": "SCALAR", "name": "String", "ofType": null},
                        },
                    },
                    {
                        "name": "name",
                        "type": {"kind": "SCALAR", "name": "String", "ofType": null},
                    },
                    {
                        "name": "friends",
                        "type": {
                            "kind": "NON_NULL",
                            "name": null,
                            "ofType": {
                                "kind": "LIST",
                                "name": null,
                                "ofType": {
                                    "kind": "NON_NULL",
                                    "name": null,
                                    "ofType": {"name": "Character"},
                                },
                            },
                        },
                    },
                ],
            },
        }),
    );
}

#[tokio::test]
async fn deprecated_fields_on_request() {
    let data = run(
        r#"{
          __type(name: "Droid") {
            fields(includeDeprecated: true) { name isDeprecated deprecationReason }
          }
        }"#,
    )
    .await;

    assert_eq!(
        data,
        graphql_value!({
            "__type": {
                "fields": [
                    {"name": "id", "isDeprecated": false, "deprecationReason": null},
                    {"name": "name", "isDeprecated": false, "deprecationReason": null},
                    {"name": "friends", "isDeprecated": false, "deprecationReason": null},
                    {"name": "primaryFunction", "isDeprecated": true, "deprecationReason": null},
                ],
            },
        }),
    );
}

#[tokio::test]
async fn enum_values() {
    let data = run(
        r#"{
          current: __type(name: "Episode") {
            kind
            enumValues { name description }
          }
          all: __type(name: "Episode") {
            enumValues(includeDeprecated: true) { name isDeprecated deprecationReason }
          }
        }"#,
    )
    .await;

    assert_eq!(
        data,
        graphql_value!({
            "current": {
                "kind": "ENUM",
                "enumValues": [
                    {"name": "NEWHOPE", "description": "Released in 1977."},
                    {"name": "EMPIRE", "description": null},
                    {"name": "JEDI", "description": null},
                ],
            },
            "all": {
                "enumValues": [
                    {"name": "NEWHOPE", "isDeprecated": false, "deprecationReason": null},
                    {"name": "EMPIRE", "isDeprecated": false, "deprecationReason": null},
                    {"name": "JEDI", "isDeprecated": false, "deprecationReason": null},
                    {
                        "name": "HOLIDAY",
                        "isDeprecated": true,
                        "deprecationReason": "We don't talk about it.",
                    },
                ],
            },
        }),
    );
}

#[tokio::test]
async fn interfaces_list_possible_types() {
    assert_eq!(
        run(r#"{ __type(name: "Character") { kind possibleTypes { name } fields { name } } }"#)
            .await,
        graphql_value!({
            "__type": {
                "kind": "INTERFACE",
                "possibleTypes": [{"name": "Droid"}],
                "fields": [{"name": "id"}, {"name": "name"}],
            },
        }),
    );
}

#[tokio::test]
async fn arguments_and_default_values() {
    let data = run(
        r#"{
          __type(name: "Query") {
            fields { name args { name description defaultValue type { name } } }
          }
        }"#,
    )
    .await;

    assert_eq!(
        data,
        graphql_value!({
            "__type": {
                "fields": [
                    {
                        "name": "hero",
                        "args": [{
                            "name": "episode",
                            "description": "Defaults to the whole saga.",
                            "defaultValue": null,
                            "type": {"name": "Episode"},
                        }],
                    },
                    {
                        "name": "droids",
                        "args": [{
                            "name": "first",
                            "description": null,
                            "defaultValue": "10",
                            "type": {"name": "Int"},
                        }],
                    },
                ],
            },
        }),
    );
}

#[tokio::test]
async fn unknown_type_is_null() {
    assert_eq!(
        run(r#"{ __type(name: "Wookiee") { name } }"#).await,
        graphql_value!({"__type": null}),
    );
}

#[tokio::test]
async fn typename_of_introspection_types() {
    assert_eq!(
        run("{ __schema { __typename queryType { __typename } } }").await,
        graphql_value!({
            "__schema": {"__typename": "__Schema", "queryType": {"__typename": "__Type"}},
        }),
    );
}

#[tokio::test]
async fn full_introspection_query() {
    let data = run(INTROSPECTION_QUERY).await;

    let schema = data
        .as_object_value()
        .and_then(|o| o.get_field_value("__schema"))
        .and_then(Value::as_object_value)
        .expect("`__schema` is an object");
    let type_names = schema
        .get_field_value("types")
        .and_then(Value::as_list_value)
        .expect("`types` is a list")
        .iter()
        .filter_map(|t| t.as_object_value()?.get_field_value("name")?.as_string_value())
        .collect::<Vec<_>>();

    for name in ["Query", "Droid", "Character", "Episode", "String", "Boolean", "__Schema", "__Type"] {
        assert!(type_names.contains(&name), "missing type {name}");
    }

    let directive_names = schema
        .get_field_value("directives")
        .and_then(Value::as_list_value)
        .expect("`directives` is a list")
        .iter()
        .filter_map(|d| d.as_object_value()?.get_field_value("name")?.as_string_value())
        .collect::<Vec<_>>();

    assert!(directive_names.contains(&"skip"));
    assert!(directive_names.contains(&"include"));
}
