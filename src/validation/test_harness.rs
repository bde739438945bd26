use crate::{
    ast::{InputValue, Type},
    parser::{ParseOptions, parse_document},
    schema::{
        meta::{
            Argument, EnumMeta, EnumValue, Field, InputObjectMeta, InterfaceMeta, MetaType,
            ObjectMeta, UnionMeta,
        },
        model::{DirectiveLocation, DirectiveType, Schema},
    },
    validation::{Rule, RuleError, validate_with_rules},
};

fn name_field() -> Field {
    Field::new("name", Type::named("String"))
        .argument(Argument::new("surname", Type::named("Boolean")))
}

fn interface(name: &str) -> MetaType {
    InterfaceMeta::new(name).field(name_field()).into_meta()
}

fn types() -> Vec<MetaType> {
    vec![
        interface("Being"),
        interface("Pet"),
        interface("Canine"),
        interface("Unpopulated"),
        EnumMeta::new(
            "DogCommand",
            [EnumValue::new("SIT"), EnumValue::new("HEEL"), EnumValue::new("DOWN")],
        )
        .into_meta(),
        ObjectMeta::new("Dog")
            .field(name_field())
            .field(Field::new("nickname", Type::named("String")))
            .field(Field::new("barkVolume", Type::named("Int")))
            .field(Field::new("barks", Type::named("Boolean")))
            .field(
                Field::new("doesKnowCommand", Type::named("Boolean"))
                    .argument(Argument::new("dogCommand", Type::named("DogCommand"))),
            )
            .field(
                Field::new("isHousetrained", Type::named("Boolean")).argument(
                    Argument::new("atOtherHomes", Type::named("Boolean"))
                        .default_value(InputValue::Boolean(true)),
                ),
            )
            .field(
                Field::new("isAtLocation", Type::named("Boolean"))
                    .argument(Argument::new("x", Type::named("Int")))
                    .argument(Argument::new("y", Type::named("Int"))),
            )
            .interfaces(["Being", "Pet", "Canine"])
            .into_meta(),
        EnumMeta::new(
            "FurColor",
            [
                EnumValue::new("BROWN"),
                EnumValue::new("BLACK"),
                EnumValue::new("TAN"),
                EnumValue::new("SPOTTED"),
            ],
        )
        .into_meta(),
        ObjectMeta::new("Cat")
            .field(name_field())
            .field(Field::new("nickname", Type::named("String")))
            .field(Field::new("meows", Type::named("Boolean")))
            .field(Field::new("meowVolume", Type::named("Int")))
            .field(Field::new("furColor", Type::named("FurColor")))
            .interfaces(["Being", "Pet"])
            .into_meta(),
        UnionMeta::new("CatOrDog", ["Cat", "Dog"]).into_meta(),
        InterfaceMeta::new("Intelligent")
            .field(Field::new("iq", Type::named("Int")))
            .into_meta(),
        ObjectMeta::new("Human")
            .field(name_field())
            .field(Field::new("pets", Type::list(Type::named("Pet"))))
            .field(Field::new("relatives", Type::list(Type::non_null_named("Human"))))
            .field(Field::new("iq", Type::named("Int")))
            .interfaces(["Being", "Intelligent"])
            .into_meta(),
        ObjectMeta::new("Alien")
            .field(name_field())
            .field(Field::new("iq", Type::named("Int")))
            .field(Field::new("numEyes", Type::named("Int")))
            .interfaces(["Being", "Intelligent"])
            .into_meta(),
        UnionMeta::new("DogOrHuman", ["Dog", "Human"]).into_meta(),
        UnionMeta::new("HumanOrAlien", ["Human", "Alien"]).into_meta(),
        InputObjectMeta::new(
            "ComplexInput",
            [
                Argument::new("requiredField", Type::non_null_named("Boolean")),
                Argument::new("intField", Type::named("Int")),
                Argument::new("stringField", Type::named("String")),
                Argument::new("booleanField", Type::named("Boolean")),
                Argument::new("stringListField", Type::list(Type::named("String"))),
            ],
        )
        .into_meta(),
        ObjectMeta::new("ComplicatedArgs")
            .field(
                Field::new("intArgField", Type::named("String"))
                    .argument(Argument::new("intArg", Type::named("Int"))),
            )
            .field(
                Field::new("nonNullIntArgField", Type::named("String"))
                    .argument(Argument::new("nonNullIntArg", Type::non_null_named("Int"))),
            )
            .field(
                Field::new("nonNullIntArgFieldWithDefault", Type::named("String")).argument(
                    Argument::new("nonNullIntArg", Type::non_null_named("Int"))
                        .default_value(InputValue::Int("3".into())),
                ),
            )
            .field(
                Field::new("stringArgField", Type::named("String"))
                    .argument(Argument::new("stringArg", Type::named("String"))),
            )
            .field(
                Field::new("booleanArgField", Type::named("String"))
                    .argument(Argument::new("booleanArg", Type::named("Boolean"))),
            )
            .field(
                Field::new("enumArgField", Type::named("String"))
                    .argument(Argument::new("enumArg", Type::named("FurColor"))),
            )
            .field(
                Field::new("floatArgField", Type::named("String"))
                    .argument(Argument::new("floatArg", Type::named("Float"))),
            )
            .field(
                Field::new("idArgField", Type::named("String"))
                    .argument(Argument::new("idArg", Type::named("ID"))),
            )
            .field(
                Field::new("stringListArgField", Type::named("String")).argument(Argument::new(
                    "stringListArg",
                    Type::list(Type::named("String")),
                )),
            )
            .field(
                Field::new("nonNullStringListArgField", Type::named("String")).argument(
                    Argument::new(
                        "nonNullStringListArg",
                        Type::non_null_list(Type::non_null_named("String")),
                    ),
                ),
            )
            .field(
                Field::new("complexArgField", Type::named("String"))
                    .argument(Argument::new("complexArg", Type::named("ComplexInput"))),
            )
            .field(
                Field::new("multipleReqs", Type::named("String"))
                    .argument(Argument::new("req1", Type::non_null_named("Int")))
                    .argument(Argument::new("req2", Type::non_null_named("Int"))),
            )
            .field(
                Field::new("multipleOpts", Type::named("String"))
                    .argument(
                        Argument::new("opt1", Type::named("Int"))
                            .default_value(InputValue::Int("0".into())),
                    )
                    .argument(
                        Argument::new("opt2", Type::named("Int"))
                            .default_value(InputValue::Int("0".into())),
                    ),
            )
            .field(
                Field::new("multipleOptAndReq", Type::named("String"))
                    .argument(Argument::new("req1", Type::non_null_named("Int")))
                    .argument(Argument::new("req2", Type::non_null_named("Int")))
                    .argument(
                        Argument::new("opt1", Type::named("Int"))
                            .default_value(InputValue::Int("0".into())),
                    )
                    .argument(
                        Argument::new("opt2", Type::named("Int"))
                            .default_value(InputValue::Int("0".into())),
                    ),
            )
            .into_meta(),
        ObjectMeta::new("QueryRoot")
            .field(
                Field::new("human", Type::named("Human"))
                    .argument(Argument::new("id", Type::named("ID"))),
            )
            .field(Field::new("alien", Type::named("Alien")))
            .field(Field::new("dog", Type::named("Dog")))
            .field(Field::new("cat", Type::named("Cat")))
            .field(Field::new("pet", Type::named("Pet")))
            .field(Field::new("catOrDog", Type::named("CatOrDog")))
            .field(Field::new("dogOrHuman", Type::named("DogOrHuman")))
            .field(Field::new("humanOrAlien", Type::named("HumanOrAlien")))
            .field(Field::new("complicatedArgs", Type::named("ComplicatedArgs")))
            .into_meta(),
        ObjectMeta::new("MutationRoot")
            .field(
                Field::new("testInput", Type::non_null_named("Int"))
                    .argument(Argument::new("input", Type::named("ComplexInput"))),
            )
            .into_meta(),
        ObjectMeta::new("SubscriptionRoot")
            .field(Field::new("dogs", Type::list(Type::named("Dog"))))
            .into_meta(),
    ]
}

fn directives() -> Vec<DirectiveType> {
    [
        ("onQuery", DirectiveLocation::Query),
        ("onMutation", DirectiveLocation::Mutation),
        ("onSubscription", DirectiveLocation::Subscription),
        ("onField", DirectiveLocation::Field),
        ("onFragmentDefinition", DirectiveLocation::FragmentDefinition),
        ("onFragmentSpread", DirectiveLocation::FragmentSpread),
        ("onInlineFragment", DirectiveLocation::InlineFragment),
    ]
    .into_iter()
    .map(|(name, location)| DirectiveType::new(name, &[location], []))
    .collect()
}

/// The schema rules are tested against.
pub(crate) fn harness_schema() -> Schema {
    Schema::builder("QueryRoot")
        .mutation("MutationRoot")
        .subscription("SubscriptionRoot")
        .register_all(types())
        .directives(directives())
        .build()
        .expect("harness schema is invalid")
}

fn validate<R, F>(schema: &Schema, factory: F, q: &str) -> Vec<RuleError>
where
    R: Rule + 'static,
    F: Fn() -> R,
{
    let doc = parse_document(q, ParseOptions::default())
        .unwrap_or_else(|e| panic!("Parse error on input {q:#?}: {e}"));
    validate_with_rules(schema, &doc, vec![Box::new(factory())])
}

pub(crate) fn expect_passes_rule<R, F>(factory: F, q: &str)
where
    R: Rule + 'static,
    F: Fn() -> R,
{
    expect_passes_rule_with_schema(&harness_schema(), factory, q);
}

pub(crate) fn expect_passes_rule_with_schema<R, F>(schema: &Schema, factory: F, q: &str)
where
    R: Rule + 'static,
    F: Fn() -> R,
{
    let errs = validate(schema, factory, q);

    if !errs.is_empty() {
        print_errors(&errs);
        panic!("Expected rule to pass, but errors found");
    }
}

pub(crate) fn expect_fails_rule<R, F>(factory: F, q: &str, expected_errors: &[RuleError])
where
    R: Rule + 'static,
    F: Fn() -> R,
{
    expect_fails_rule_with_schema(&harness_schema(), factory, q, expected_errors);
}

pub(crate) fn expect_fails_rule_with_schema<R, F>(
    schema: &Schema,
    factory: F,
    q: &str,
    expected_errors: &[RuleError],
) where
    R: Rule + 'static,
    F: Fn() -> R,
{
    let errs = validate(schema, factory, q);

    if errs.is_empty() {
        panic!("Expected rule to fail, but no errors were found");
    } else if errs != expected_errors {
        println!("==> Expected errors:");
        print_errors(expected_errors);

        println!("\n==> Actual errors:");
        print_errors(&errs);

        panic!("Unexpected set of errors found");
    }
}

fn print_errors(errs: &[RuleError]) {
    for err in errs {
        for p in err.locations() {
            print!("[{:>3},{:>3},{:>3}]  ", p.index(), p.line(), p.column());
        }
        println!("{}", err.message());
    }
}
