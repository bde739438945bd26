use pretty_assertions::assert_eq;

use crate::{
    Engine, Object, Request, Resolution, Value,
    ast::Type,
    graphql_value,
    schema::{
        meta::{Field, ObjectMeta},
        model::Schema,
    },
};

fn engine() -> Engine {
    let test_type = ObjectMeta::new("TestType")
        .field(Field::new("a", Type::named("String")).resolver(|_, _, _| Resolution::value("a")))
        .field(Field::new("b", Type::named("String")).resolver(|_, _, _| Resolution::value("b")))
        .into_meta();

    Engine::new(
        Schema::builder("TestType")
            .register(test_type)
            .build()
            .expect("valid schema"),
    )
}

async fn run(query: &str, vars: Object) -> Value {
    let res = engine()
        .execute(Request::new(query).variables(vars))
        .await;

    assert_eq!(res.errors, [], "errors in `{query}`");
    res.data.expect("data is present")
}

/// Runs every query, expecting `b` to be selected or not.
async fn expect_b(selected: bool, queries: &[&str]) {
    let expected = if selected {
        graphql_value!({"a": "a", "b": "b"})
    } else {
        graphql_value!({"a": "a"})
    };
    for query in queries {
        assert_eq!(run(query, Object::with_capacity(0)).await, expected, "in `{query}`");
    }
}

#[tokio::test]
async fn on_fields() {
    expect_b(true, &["{ a, b @include(if: true) }", "{ a, b @skip(if: false) }"]).await;
    expect_b(false, &["{ a, b @include(if: false) }", "{ a, b @skip(if: true) }"]).await;
}

#[tokio::test]
async fn on_fragment_spreads() {
    expect_b(
        true,
        &[
            "{ a, ...Frag @include(if: true) } fragment Frag on TestType { b }",
            "{ a, ...Frag @skip(if: false) } fragment Frag on TestType { b }",
        ],
    )
    .await;
    expect_b(
        false,
        &[
            "{ a, ...Frag @include(if: false) } fragment Frag on TestType { b }",
            "{ a, ...Frag @skip(if: true) } fragment Frag on TestType { b }",
        ],
    )
    .await;
}

#[tokio::test]
async fn on_inline_fragments() {
    expect_b(
        true,
        &[
            "{ a, ... on TestType @include(if: true) { b } }",
            "{ a, ... @skip(if: false) { b } }",
        ],
    )
    .await;
    expect_b(
        false,
        &[
            "{ a, ... on TestType @include(if: false) { b } }",
            "{ a, ... @skip(if: true) { b } }",
        ],
    )
    .await;
}

#[tokio::test]
async fn skip_takes_precedence() {
    expect_b(true, &["{ a, b @include(if: true) @skip(if: false) }"]).await;
    expect_b(
        false,
        &[
            "{ a, b @include(if: true) @skip(if: true) }",
            "{ a, b @include(if: false) @skip(if: false) }",
        ],
    )
    .await;
}

#[tokio::test]
async fn conditions_from_variables() {
    let query = "query Q($skipB: Boolean!) { a, b @skip(if: $skipB) }";
    let mut vars = Object::with_capacity(1);
    vars.add_field("skipB", graphql_value!(true));

    assert_eq!(run(query, vars.clone()).await, graphql_value!({"a": "a"}));

    vars.add_field("skipB", graphql_value!(false));

    assert_eq!(run(query, vars).await, graphql_value!({"a": "a", "b": "b"}));
}

#[tokio::test]
async fn field_kept_when_selected_elsewhere() {
    assert_eq!(
        run("{ a @skip(if: true), ... { a } }", Object::with_capacity(0)).await,
        graphql_value!({"a": "a"}),
    );
}
