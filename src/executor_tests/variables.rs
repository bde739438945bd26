use pretty_assertions::assert_eq;

use crate::{
    Engine, ExecutionResult, Object, Request, Resolution, SourcePosition, Value,
    ast::{InputValue, Type},
    graphql_value,
    schema::{
        meta::{Argument, EnumMeta, EnumValue, Field, InputObjectMeta, ObjectMeta},
        model::Schema,
    },
};

/// A field echoing its `input` argument, as the [`Value`] display of it.
fn echo(name: &str, input: Argument) -> Field {
    Field::new(name, Type::named("String"))
        .argument(input)
        .resolver(|_, args, _| Resolution::value(args.get("input").map(Value::to_string)))
}

fn schema() -> Schema {
    let input_object = InputObjectMeta::new(
        "TestInputObject",
        [
            Argument::new("a", Type::named("String")),
            Argument::new("b", Type::list(Type::named("String"))),
            Argument::new("c", Type::non_null_named("String")),
        ],
    )
    .into_meta();
    let color = EnumMeta::new(
        "Color",
        [
            EnumValue::new("RED").value(0),
            EnumValue::new("GREEN").value(1),
        ],
    )
    .into_meta();
    let test_type = ObjectMeta::new("TestType")
        .field(echo(
            "fieldWithObjectInput",
            Argument::new("input", Type::named("TestInputObject")),
        ))
        .field(echo(
            "fieldWithNullableStringInput",
            Argument::new("input", Type::named("String")),
        ))
        .field(echo(
            "fieldWithNonNullableStringInput",
            Argument::new("input", Type::non_null_named("String")),
        ))
        .field(echo(
            "fieldWithDefaultArgumentValue",
            Argument::new("input", Type::named("String"))
                .default_value(InputValue::String("Hello World".into())),
        ))
        .field(echo(
            "list",
            Argument::new("input", Type::list(Type::named("String"))),
        ))
        .field(echo(
            "nnList",
            Argument::new("input", Type::non_null_list(Type::named("String"))),
        ))
        .field(echo("colorInput", Argument::new("input", Type::named("Color"))))
        .field(Field::new("green", Type::named("Color")).resolver(|_, _, _| Resolution::value(1)))
        .into_meta();

    Schema::builder("TestType")
        .register_all([test_type, input_object, color])
        .build()
        .expect("valid schema")
}

async fn run(query: &str, vars: Value) -> ExecutionResult {
    let vars = vars.into_object().unwrap_or_else(|| Object::with_capacity(0));
    Engine::new(schema())
        .execute(Request::new(query).variables(vars))
        .await
}

async fn run_query(query: &str) -> Value {
    let res = run(query, graphql_value!(null)).await;

    assert_eq!(res.errors, []);
    res.data.expect("data is present")
}

mod inline_literals {
    use pretty_assertions::assert_eq;

    use crate::graphql_value;

    use super::run_query;

    #[tokio::test]
    async fn complex_input() {
        assert_eq!(
            run_query(r#"{ fieldWithObjectInput(input: {a: "foo", b: ["bar"], c: "baz"}) }"#)
                .await,
            graphql_value!({
                "fieldWithObjectInput": r#"{"a": "foo", "b": ["bar"], "c": "baz"}"#,
            }),
        );
    }

    #[tokio::test]
    async fn single_values_become_lists() {
        assert_eq!(
            run_query(r#"{ fieldWithObjectInput(input: {c: "baz", b: "bar"}) }"#).await,
            graphql_value!({"fieldWithObjectInput": r#"{"b": ["bar"], "c": "baz"}"#}),
        );
    }

    #[tokio::test]
    async fn explicit_null_is_passed() {
        assert_eq!(
            run_query("{ fieldWithNullableStringInput(input: null) }").await,
            graphql_value!({"fieldWithNullableStringInput": "null"}),
        );
    }

    #[tokio::test]
    async fn missing_argument_is_absent() {
        assert_eq!(
            run_query("{ fieldWithNullableStringInput }").await,
            graphql_value!({"fieldWithNullableStringInput": null}),
        );
    }

    #[tokio::test]
    async fn argument_default_value() {
        assert_eq!(
            run_query("{ fieldWithDefaultArgumentValue }").await,
            graphql_value!({"fieldWithDefaultArgumentValue": r#""Hello World""#}),
        );
    }

    #[tokio::test]
    async fn enums_use_internal_values() {
        assert_eq!(
            run_query("{ colorInput(input: GREEN), green }").await,
            graphql_value!({"colorInput": "1", "green": "GREEN"}),
        );
    }
}

mod variable_values {
    use pretty_assertions::assert_eq;

    use crate::{SourcePosition, graphql_value};

    use super::{run, run_query};

    const OBJECT_QUERY: &str =
        "query q($input: TestInputObject) { fieldWithObjectInput(input: $input) }";

    #[tokio::test]
    async fn complex_variable() {
        let res = run(
            OBJECT_QUERY,
            graphql_value!({"input": {"a": "foo", "b": ["bar"], "c": "baz"}}),
        )
        .await;

        assert_eq!(res.errors, []);
        assert_eq!(
            res.data,
            Some(graphql_value!({
                "fieldWithObjectInput": r#"{"a": "foo", "b": ["bar"], "c": "baz"}"#,
            })),
        );
    }

    #[tokio::test]
    async fn missing_required_input_field() {
        let res = run(OBJECT_QUERY, graphql_value!({"input": {"a": "foo", "b": "bar"}})).await;

        assert!(res.invalid);
        assert_eq!(res.data, None);
        assert_eq!(
            res.errors[0].message,
            r#"Variable "$input" got invalid value {"a": "foo", "b": "bar"}; Field "c" of required type "String!" was not provided."#,
        );
        assert_eq!(res.errors[0].locations, [SourcePosition::new(8, 0, 8)]);
    }

    #[tokio::test]
    async fn unknown_input_field() {
        let res = run(
            OBJECT_QUERY,
            graphql_value!({"input": {"a": "foo", "c": "baz", "extra": "dog"}}),
        )
        .await;

        assert!(res.invalid);
        assert_eq!(
            res.errors[0].message,
            r#"Variable "$input" got invalid value {"a": "foo", "c": "baz", "extra": "dog"}; Field "extra" is not defined by type "TestInputObject"."#,
        );
    }

    #[tokio::test]
    async fn required_variable_not_provided() {
        let res = run(
            "query q($value: String!) { fieldWithNonNullableStringInput(input: $value) }",
            graphql_value!({}),
        )
        .await;

        assert!(res.invalid);
        assert_eq!(
            res.errors[0].message,
            r#"Variable "$value" of required type "String!" was not provided."#,
        );
    }

    #[tokio::test]
    async fn required_variable_null() {
        let res = run(
            "query q($value: String!) { fieldWithNonNullableStringInput(input: $value) }",
            graphql_value!({"value": null}),
        )
        .await;

        assert!(res.invalid);
        assert_eq!(
            res.errors[0].message,
            r#"Variable "$value" of non-null type "String!" must not be null."#,
        );
    }

    #[tokio::test]
    async fn variable_default_value() {
        assert_eq!(
            run_query(
                r#"query q($input: String = "Hello") { fieldWithNullableStringInput(input: $input) }"#,
            )
            .await,
            graphql_value!({"fieldWithNullableStringInput": r#""Hello""#}),
        );
    }

    #[tokio::test]
    async fn list_items_are_checked() {
        let res = run(
            "query q($input: [String!]) { list(input: $input) }",
            graphql_value!({"input": ["A", null]}),
        )
        .await;

        assert!(res.invalid);
        assert_eq!(
            res.errors[0].message,
            r#"Variable "$input" got invalid value ["A", null]; In element #1: Expected non-nullable type "String!" not to be null."#,
        );
    }

    #[tokio::test]
    async fn list_variable_with_null_items() {
        let res = run(
            "query q($input: [String]!) { nnList(input: $input) }",
            graphql_value!({"input": ["A", null, "B"]}),
        )
        .await;

        assert_eq!(res.errors, []);
        assert_eq!(
            res.data,
            Some(graphql_value!({"nnList": r#"["A", null, "B"]"#})),
        );
    }

    #[tokio::test]
    async fn single_value_variable_becomes_list() {
        let res = run(
            "query q($input: [String]) { list(input: $input) }",
            graphql_value!({"input": "A"}),
        )
        .await;

        assert_eq!(res.data, Some(graphql_value!({"list": r#"["A"]"#})));
    }

    #[tokio::test]
    async fn enum_variables_are_names() {
        let res = run(
            "query q($color: Color) { colorInput(input: $color) }",
            graphql_value!({"color": "RED"}),
        )
        .await;

        assert_eq!(res.data, Some(graphql_value!({"colorInput": "0"})));

        let res = run(
            "query q($color: Color) { colorInput(input: $color) }",
            graphql_value!({"color": "BLUE"}),
        )
        .await;

        assert!(res.invalid);
        assert_eq!(
            res.errors[0].message,
            r#"Variable "$color" got invalid value "BLUE"; Value "BLUE" does not exist in "Color" enum."#,
        );
    }
}

#[tokio::test]
async fn variables_from_json() {
    let vars: Value = serde_json::from_str(r#"{"input": {"a": "foo", "b": ["bar"], "c": "baz"}}"#)
        .expect("valid JSON");

    let res = run(
        "query q($input: TestInputObject) { fieldWithObjectInput(input: $input) }",
        vars,
    )
    .await;

    assert_eq!(res.errors, []);
    assert_eq!(
        res.data,
        Some(graphql_value!({
            "fieldWithObjectInput": r#"{"a": "foo", "b": ["bar"], "c": "baz"}"#,
        })),
    );
}

#[test]
fn variable_errors_point_at_definitions() {
    let res = futures::executor::block_on(run(
        "query q($a: String!, $b: String!) { \
         x: fieldWithNonNullableStringInput(input: $a) \
         y: fieldWithNonNullableStringInput(input: $b) }",
        graphql_value!({}),
    ));

    assert_eq!(res.errors.len(), 2);
    assert_eq!(res.errors[0].locations, [SourcePosition::new(8, 0, 8)]);
    assert_eq!(res.errors[1].locations, [SourcePosition::new(21, 0, 21)]);
}
