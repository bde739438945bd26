use arcstr::ArcStr;
use pretty_assertions::assert_eq;

use crate::{
    Engine, ExecutionResult, FieldValue, PathSegment, Request, ResolveInfo, Value,
    ast::Type,
    graphql_value,
    schema::{
        meta::{Field, InterfaceMeta, ObjectMeta, UnionMeta},
        model::Schema,
    },
};

/// How values of the abstract types find their object type.
#[derive(Clone, Copy)]
enum Discovery {
    /// `is_type_of` checks on the object types.
    IsTypeOf,
    /// `resolve_type` functions on the abstract types.
    ResolveType,
    /// A `__typename` key in object values.
    Typename,
}

fn has_field(key: &'static str) -> impl Fn(&FieldValue, &ResolveInfo) -> bool + Send + Sync + 'static {
    move |v, _| {
        v.as_value()
            .and_then(Value::as_object_value)
            .is_some_and(|o| o.contains_field(key))
    }
}

fn type_by_key(v: &FieldValue, _: &ResolveInfo) -> Option<ArcStr> {
    let obj = v.as_value()?.as_object_value()?;
    [("woofs", "Dog"), ("meows", "Cat"), ("iq", "Human")]
        .into_iter()
        .find(|(key, _)| obj.contains_field(key))
        .map(|(_, name)| ArcStr::from(name))
}

fn schema(discovery: Discovery) -> Schema {
    let name = || Field::new("name", Type::named("String"));

    let mut pet = InterfaceMeta::new("Pet").field(name());
    let mut cat_or_dog = UnionMeta::new("CatOrDog", ["Cat", "Dog"]);
    let mut dog = ObjectMeta::new("Dog")
        .field(name())
        .field(Field::new("woofs", Type::named("Boolean")))
        .interfaces(["Pet"]);
    let mut cat = ObjectMeta::new("Cat")
        .field(name())
        .field(Field::new("meows", Type::named("Boolean")))
        .interfaces(["Pet"]);
    match discovery {
        Discovery::IsTypeOf => {
            dog = dog.is_type_of(has_field("woofs"));
            cat = cat.is_type_of(has_field("meows"));
        }
        Discovery::ResolveType => {
            pet = pet.resolve_type(type_by_key);
            cat_or_dog = cat_or_dog.resolve_type(type_by_key);
        }
        Discovery::Typename => {}
    }

    let human = ObjectMeta::new("Human")
        .field(name())
        .field(Field::new("iq", Type::named("Int")))
        .into_meta();
    let query = ObjectMeta::new("Query")
        .field(Field::new("pets", Type::list(Type::named("Pet"))))
        .field(Field::new("catOrDog", Type::list(Type::named("CatOrDog"))))
        .field(Field::new("dog", Type::named("Dog")))
        .into_meta();

    Schema::builder("Query")
        .register_all([
            query,
            pet.into_meta(),
            cat_or_dog.into_meta(),
            dog.into_meta(),
            cat.into_meta(),
            human,
        ])
        .build()
        .expect("valid schema")
}

async fn run(discovery: Discovery, query: &str, root: Value) -> ExecutionResult {
    Engine::new(schema(discovery))
        .execute(Request::new(query).root_value(root))
        .await
}

fn pets_root() -> Value {
    graphql_value!({
        "pets": [
            {"name": "Odie", "woofs": true},
            {"name": "Garfield", "meows": false},
        ],
        "catOrDog": [
            {"name": "Garfield", "meows": false},
            {"name": "Odie", "woofs": true},
        ],
    })
}

const PETS_QUERY: &str = r#"
    {
      pets {
        name
        ... on Dog { woofs }
        ... on Cat { meows }
      }
      catOrDog {
        __typename
        ... on Dog { name woofs }
        ... on Cat { name meows }
      }
    }
"#;

fn pets_result() -> Value {
    graphql_value!({
        "pets": [
            {"name": "Odie", "woofs": true},
            {"name": "Garfield", "meows": false},
        ],
        "catOrDog": [
            {"__typename": "Cat", "name": "Garfield", "meows": false},
            {"__typename": "Dog", "name": "Odie", "woofs": true},
        ],
    })
}

#[tokio::test]
async fn resolves_with_is_type_of() {
    let res = run(Discovery::IsTypeOf, PETS_QUERY, pets_root()).await;

    assert_eq!(res.errors, []);
    assert_eq!(res.data, Some(pets_result()));
}

#[tokio::test]
async fn resolves_with_resolve_type() {
    let res = run(Discovery::ResolveType, PETS_QUERY, pets_root()).await;

    assert_eq!(res.errors, []);
    assert_eq!(res.data, Some(pets_result()));
}

#[tokio::test]
async fn resolves_with_typename_key() {
    let root = graphql_value!({
        "pets": [
            {"__typename": "Dog", "name": "Odie", "woofs": true},
            {"__typename": "Cat", "name": "Garfield", "meows": false},
        ],
        "catOrDog": [
            {"__typename": "Cat", "name": "Garfield", "meows": false},
            {"__typename": "Dog", "name": "Odie", "woofs": true},
        ],
    });

    let res = run(Discovery::Typename, PETS_QUERY, root).await;

    assert_eq!(res.errors, []);
    assert_eq!(res.data, Some(pets_result()));
}

#[tokio::test]
async fn unresolvable_abstract_value_is_an_error() {
    let res = run(
        Discovery::Typename,
        "{ pets { name } }",
        graphql_value!({"pets": [{"name": "Odie"}]}),
    )
    .await;

    assert_eq!(res.data, Some(graphql_value!({"pets": [null]})));
    assert_eq!(res.errors.len(), 1);
    assert_eq!(
        res.errors[0].message,
        "Abstract type Pet must resolve to an Object type at runtime for field Query.pets. \
         Either the Pet type should provide a \"resolve_type\" function or each possible types \
         should provide an \"is_type_of\" function.",
    );
    assert_eq!(
        res.errors[0].path,
        [PathSegment::Field("pets".into()), PathSegment::Index(0)],
    );
}

#[tokio::test]
async fn runtime_type_must_be_possible() {
    let res = run(
        Discovery::ResolveType,
        "{ catOrDog { __typename } }",
        graphql_value!({"catOrDog": [{"name": "Jon", "iq": 100}]}),
    )
    .await;

    assert_eq!(res.data, Some(graphql_value!({"catOrDog": [null]})));
    assert_eq!(
        res.errors[0].message,
        r#"Runtime Object type "Human" is not a possible type for "CatOrDog"."#,
    );
}

#[tokio::test]
async fn object_values_are_checked_with_is_type_of() {
    let res = run(
        Discovery::IsTypeOf,
        "{ dog { name } }",
        graphql_value!({"dog": {"name": "Garfield", "meows": false}}),
    )
    .await;

    assert_eq!(res.data, Some(graphql_value!({"dog": null})));
    assert_eq!(
        res.errors[0].message,
        r#"Expected value of type "Dog" but got: {"name": "Garfield", "meows": false}."#,
    );
}

#[test]
fn possible_types_are_indexed() {
    let schema = schema(Discovery::IsTypeOf);
    let pet = schema.concrete_type_by_name("Pet").expect("Pet exists");
    let names = schema
        .possible_types(pet)
        .into_iter()
        .map(|t| t.name().to_string())
        .collect::<Vec<_>>();

    assert_eq!(names, ["Dog", "Cat"]);
}
