mod field_execution {
    use pretty_assertions::assert_eq;

    use crate::{
        Engine, Object, Request, Resolution, Value,
        ast::Type,
        graphql_value,
        schema::{
            meta::{Argument, Field, ObjectMeta},
            model::Schema,
        },
    };

    fn schema() -> Schema {
        let data = ObjectMeta::new("DataType")
            .field(Field::new("a", Type::named("String")))
            .field(Field::new("b", Type::named("String")))
            .field(
                Field::new("pic", Type::named("String"))
                    .argument(Argument::new("size", Type::named("Int")))
                    .resolver(|_, args, _| {
                        let size = args.get("size").and_then(Value::as_int_value).unwrap_or(50);
                        Resolution::value(format!("Pic of size: {size}"))
                    }),
            )
            .field(Field::new("deep", Type::named("DeepDataType")))
            .into_meta();
        let deep = ObjectMeta::new("DeepDataType")
            .field(Field::new("a", Type::named("String")))
            .field(Field::new("b", Type::named("String")))
            .field(Field::new("c", Type::list(Type::named("String"))))
            .field(Field::new("deeper", Type::list(Type::named("DataType"))))
            .into_meta();

        Schema::builder("DataType")
            .register_all([data, deep])
            .build()
            .expect("valid schema")
    }

    fn root() -> Value {
        graphql_value!({
            "a": "Apple",
            "b": "Banana",
            "deep": {
                "a": "Already Been Done",
                "b": "Boring",
                "c": ["Contrived", null, "Confusing"],
                "deeper": [{"a": "Apple", "b": "Banana"}, null, {"a": "Avocado"}],
            },
        })
    }

    #[tokio::test]
    async fn resolves_nested_values_with_default_resolver() {
        let mut vars = Object::with_capacity(1);
        vars.add_field("size", graphql_value!(100));

        let res = Engine::new(schema())
            .execute(
                Request::new(
                    r#"
                    query Example($size: Int) {
                        a,
                        b,
                        x: pic(size: $size)
                        ...on DataType {
                            y: pic
                        }
                        deep {
                            a
                            b
                            c
                            deeper {
                                a
                                b
                            }
                        }
                    }
                    "#,
                )
                .variables(vars)
                .root_value(root()),
            )
            .await;

        assert_eq!(res.errors, []);
        assert_eq!(
            res.data,
            Some(graphql_value!({
                "a": "Apple",
                "b": "Banana",
                "x": "Pic of size: 100",
                "y": "Pic of size: 50",
                "deep": {
                    "a": "Already Been Done",
                    "b": "Boring",
                    "c": ["Contrived", null, "Confusing"],
                    "deeper": [
                        {"a": "Apple", "b": "Banana"},
                        null,
                        {"a": "Avocado", "b": null},
                    ],
                },
            })),
        );
    }

    #[tokio::test]
    async fn merges_fields_with_the_same_response_name() {
        let res = Engine::new(schema())
            .execute(Request::new("{ a, ...on DataType { a b }, b, first: a }").root_value(root()))
            .await;

        assert_eq!(res.errors, []);
        assert_eq!(
            res.data,
            Some(graphql_value!({"a": "Apple", "b": "Banana", "first": "Apple"})),
        );
    }

    #[tokio::test]
    async fn resolves_typename() {
        let res = Engine::new(schema())
            .execute(Request::new("{ __typename, deep { __typename } }").root_value(root()))
            .await;

        assert_eq!(res.errors, []);
        assert_eq!(
            res.data,
            Some(graphql_value!({
                "__typename": "DataType",
                "deep": {"__typename": "DeepDataType"},
            })),
        );
    }

    #[tokio::test]
    async fn unknown_fields_contribute_nothing() {
        let res = Engine::new(schema())
            .rules(Vec::new)
            .execute(Request::new("{ a, unknown, deep { nope } }").root_value(root()))
            .await;

        assert_eq!(res.errors, []);
        assert_eq!(res.data, Some(graphql_value!({"a": "Apple", "deep": {}})));
    }
}

mod null_propagation {
    use pretty_assertions::assert_eq;

    use crate::{
        Engine, ExecutionResult, FieldError, FieldValue, PathSegment, Request, Resolution,
        ResponseError, SourcePosition,
        ast::Type,
        graphql_value,
        schema::{
            meta::{Field, ObjectMeta},
            model::Schema,
        },
    };

    fn schema() -> Schema {
        let nest = || Resolution::value(graphql_value!({}));
        let data = ObjectMeta::new("DataType")
            .field(Field::new("sync", Type::named("String")).resolver(|_, _, _| Resolution::value("sync")))
            .field(
                Field::new("syncError", Type::named("String"))
                    .resolver(|_, _, _| Resolution::ready(Err(FieldError::from("syncError")))),
            )
            .field(
                Field::new("syncNonNull", Type::non_null_named("String"))
                    .resolver(|_, _, _| Resolution::ready(Ok(FieldValue::Null))),
            )
            .field(
                Field::new("syncNonNullError", Type::non_null_named("String"))
                    .resolver(|_, _, _| Resolution::ready(Err(FieldError::from("syncNonNullError")))),
            )
            .field(
                Field::new("promise", Type::named("String"))
                    .resolver(|_, _, _| Resolution::pending(async { Ok(FieldValue::value("promise")) })),
            )
            .field(
                Field::new("promiseNonNull", Type::non_null_named("String"))
                    .resolver(|_, _, _| Resolution::pending(async { Ok(FieldValue::Null) })),
            )
            .field(Field::new("nest", Type::named("DataType")).resolver(move |_, _, _| nest()))
            .field(Field::new("nonNullNest", Type::non_null_named("DataType")).resolver(move |_, _, _| nest()))
            .into_meta();

        Schema::builder("DataType")
            .register(data)
            .build()
            .expect("valid schema")
    }

    async fn run(query: &str) -> ExecutionResult {
        Engine::new(schema()).execute(Request::new(query)).await
    }

    fn error(message: &str, location: SourcePosition, path: &[&str]) -> ResponseError {
        ResponseError {
            locations: vec![location],
            path: path.iter().map(|s| PathSegment::Field((*s).into())).collect(),
            ..ResponseError::new(message)
        }
    }

    #[tokio::test]
    async fn nullable_field_errors_become_null() {
        let res = run(
            r#"
            {
              sync
              syncError
              nest {
                sync
                syncError
              }
            }
            "#,
        )
        .await;

        assert_eq!(
            res.data,
            Some(graphql_value!({
                "sync": "sync",
                "syncError": null,
                "nest": {"sync": "sync", "syncError": null},
            })),
        );
        assert_eq!(
            res.errors,
            [
                error("syncError", SourcePosition::new(48, 3, 14), &["syncError"]),
                error(
                    "syncError",
                    SourcePosition::new(116, 6, 16),
                    &["nest", "syncError"],
                ),
            ],
        );
    }

    #[tokio::test]
    async fn non_null_error_nulls_the_parent() {
        let res = run(
            r#"
            {
              sync
              nest {
                syncNonNull
                sync
              }
            }
            "#,
        )
        .await;

        assert_eq!(res.data, Some(graphql_value!({"sync": "sync", "nest": null})));
        assert_eq!(
            res.errors,
            [error(
                "Cannot return null for non-nullable field DataType.syncNonNull.",
                SourcePosition::new(71, 4, 16),
                &["nest", "syncNonNull"],
            )],
        );
    }

    #[tokio::test]
    async fn non_null_chain_reaches_the_root() {
        let res = run(
            r#"
            {
              nonNullNest {
                syncNonNullError
              }
            }
            "#,
        )
        .await;

        assert!(!res.invalid);
        assert_eq!(res.data, None);
        assert_eq!(
            res.errors,
            [error(
                "syncNonNullError",
                SourcePosition::new(59, 3, 16),
                &["nonNullNest", "syncNonNullError"],
            )],
        );
    }

    #[tokio::test]
    async fn pending_values_are_awaited() {
        let res = run(
            r#"
            {
              promise
              nest {
                promise
                promiseNonNull
              }
            }
            "#,
        )
        .await;

        assert_eq!(res.data, Some(graphql_value!({"promise": "promise", "nest": null})));
        assert_eq!(
            res.errors,
            [error(
                "Cannot return null for non-nullable field DataType.promiseNonNull.",
                SourcePosition::new(98, 5, 16),
                &["nest", "promiseNonNull"],
            )],
        );
    }

    #[test]
    fn blocking_execution() {
        let res = Engine::new(schema()).execute_sync(Request::new("{ sync promise }"));

        assert!(res.is_ok());
        assert_eq!(res.data, Some(graphql_value!({"sync": "sync", "promise": "promise"})));
    }
}

mod lists {
    use pretty_assertions::assert_eq;

    use crate::{
        Engine, ExecutionResult, FieldValue, PathSegment, Request, Resolution, Value,
        ast::Type,
        graphql_value,
        schema::{
            meta::{Field, ObjectMeta},
            model::Schema,
        },
    };

    /// Runs `{ list }` where `list` is of type `list_type` and resolves to
    /// `value`.
    async fn run(list_type: Type, value: FieldValue) -> ExecutionResult {
        let query = ObjectMeta::new("DataType")
            .field(Field::new("list", list_type).resolver(move |_, _, _| Resolution::ready(Ok(value.clone()))))
            .into_meta();
        let schema = Schema::builder("DataType")
            .register(query)
            .build()
            .expect("valid schema");

        Engine::new(schema).execute(Request::new("{ list }")).await
    }

    fn items(values: Value) -> FieldValue {
        FieldValue::Value(values)
    }

    #[tokio::test]
    async fn nullable_list_of_nullable_items() {
        let res = run(Type::list(Type::named("Int")), items(graphql_value!([1, null, 2]))).await;

        assert_eq!(res.errors, []);
        assert_eq!(res.data, Some(graphql_value!({"list": [1, null, 2]})));
    }

    #[tokio::test]
    async fn nullable_list_of_non_null_items() {
        let res = run(
            Type::list(Type::non_null_named("Int")),
            items(graphql_value!([1, null, 2])),
        )
        .await;

        assert_eq!(res.data, Some(graphql_value!({"list": null})));
        assert_eq!(res.errors.len(), 1);
        assert_eq!(
            res.errors[0].message,
            "Cannot return null for non-nullable field DataType.list.",
        );
        assert_eq!(
            res.errors[0].path,
            [PathSegment::Field("list".into()), PathSegment::Index(1)],
        );
    }

    #[tokio::test]
    async fn non_null_list_of_nullable_items() {
        let res = run(Type::non_null_list(Type::named("Int")), FieldValue::Null).await;

        assert_eq!(res.data, None);
        assert_eq!(
            res.errors[0].message,
            "Cannot return null for non-nullable field DataType.list.",
        );
    }

    #[tokio::test]
    async fn non_iterable_value_is_an_error() {
        let res = run(Type::list(Type::named("Int")), items(graphql_value!(1))).await;

        assert_eq!(res.data, Some(graphql_value!({"list": null})));
        assert_eq!(
            res.errors[0].message,
            "User Error: expected iterable, but did not find one for field DataType.list.",
        );
    }

    #[tokio::test]
    async fn scalars_that_do_not_serialize_are_errors() {
        let res = run(Type::list(Type::named("Int")), items(graphql_value!(["one"]))).await;

        assert_eq!(res.data, Some(graphql_value!({"list": [null]})));
        assert_eq!(
            res.errors[0].message,
            r#"Expected a value of type "Int" but received: "one""#,
        );
    }
}

mod operations {
    use std::{
        sync::{Arc, Mutex},
        thread,
        time::Duration,
    };

    use pretty_assertions::assert_eq;

    use crate::{
        Engine, GraphQLError, OperationType, Request, Resolution, ThreadStrategy,
        ast::Type,
        executor::get_operation,
        graphql_value,
        parser::{ParseOptions, parse_document},
        schema::{
            meta::{Field, ObjectMeta},
            model::Schema,
        },
    };

    type Log = Arc<Mutex<Vec<i32>>>;

    /// A field that sleeps for `delay_ms`, then records `n` in the context
    /// log and returns it.
    fn logging_field(name: &str, n: i32, delay_ms: u64) -> Field {
        Field::new(name, Type::named("Int")).resolver(move |_, _, info| {
            thread::sleep(Duration::from_millis(delay_ms));
            if let Some(log) = info.context::<Log>() {
                log.lock().unwrap().push(n);
            }
            Resolution::value(n)
        })
    }

    fn schema(with_mutation: bool) -> Schema {
        let query = ObjectMeta::new("Query")
            .field(logging_field("first", 1, 60))
            .field(logging_field("second", 2, 30))
            .field(logging_field("third", 3, 0))
            .into_meta();
        let builder = Schema::builder("Query").register(query);
        if !with_mutation {
            return builder.build().expect("valid schema");
        }

        let mutation = ObjectMeta::new("Mutation")
            .field(logging_field("first", 1, 60))
            .field(logging_field("second", 2, 30))
            .field(logging_field("third", 3, 0))
            .into_meta();
        builder
            .mutation("Mutation")
            .register(mutation)
            .build()
            .expect("valid schema")
    }

    #[tokio::test]
    async fn mutation_fields_run_serially() {
        let log = Log::default();
        let engine = Engine::new(schema(true)).strategy(ThreadStrategy::new());

        let res = engine
            .execute(
                Request::new("mutation { third: first, second, first: third }")
                    .context(Arc::clone(&log)),
            )
            .await;

        assert_eq!(res.errors, []);
        assert_eq!(
            res.data,
            Some(graphql_value!({"third": 1, "second": 2, "first": 3})),
        );
        assert_eq!(*log.lock().unwrap(), [1, 2, 3]);
    }

    #[tokio::test]
    async fn query_fields_keep_document_order() {
        let log = Log::default();
        let engine = Engine::new(schema(false)).strategy(ThreadStrategy::new());

        let res = engine
            .execute(Request::new("{ first second third }").context(Arc::clone(&log)))
            .await;

        assert_eq!(res.data, Some(graphql_value!({"first": 1, "second": 2, "third": 3})));
        assert!(engine.wait_until_finished(Some(Duration::from_secs(5))));
        assert_eq!(log.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn picks_the_named_operation() {
        let res = Engine::new(schema(true))
            .execute(
                Request::new("query Q { first } mutation M { third }").operation_name("M"),
            )
            .await;

        assert_eq!(res.data, Some(graphql_value!({"third": 3})));
    }

    #[tokio::test]
    async fn requires_a_name_with_several_operations() {
        let res = Engine::new(schema(true))
            .execute(Request::new("query Q { first } query R { second }"))
            .await;

        assert!(res.invalid);
        assert_eq!(res.data, None);
        assert_eq!(
            res.errors[0].message,
            "Must provide operation name if query contains multiple operations.",
        );
    }

    #[tokio::test]
    async fn rejects_unknown_operation_names() {
        let res = Engine::new(schema(true))
            .execute(Request::new("query Q { first }").operation_name("R"))
            .await;

        assert!(res.invalid);
        assert_eq!(res.errors[0].message, r#"Unknown operation named "R"."#);
    }

    #[tokio::test]
    async fn rejects_operations_without_a_root() {
        let res = Engine::new(schema(false))
            .rules(Vec::new)
            .execute(Request::new("mutation { first }"))
            .await;

        assert!(res.invalid);
        assert_eq!(res.errors[0].message, "Schema is not configured for mutations.");
    }

    #[test]
    fn document_without_operations() {
        let doc = parse_document("fragment F on Query { first }", ParseOptions::default())
            .expect("parses");

        assert_eq!(get_operation(&doc, None).unwrap_err(), GraphQLError::NoOperationProvided);
        assert_eq!(
            GraphQLError::NotSupported(OperationType::Subscription).to_string(),
            "Schema is not configured for subscriptions.",
        );
    }

    #[tokio::test]
    async fn reports_syntax_errors() {
        let res = Engine::new(schema(false)).execute(Request::new("{ first")).await;

        assert!(res.invalid);
        assert_eq!(res.data, None);
        assert_eq!(res.errors.len(), 1);
        assert_eq!(res.errors[0].locations[0].line(), 0);
    }

    #[tokio::test]
    async fn reports_validation_errors() {
        let res = Engine::new(schema(false)).execute(Request::new("{ zzz }")).await;

        assert!(res.invalid);
        assert_eq!(res.data, None);
        assert!(
            res.errors[0]
                .message
                .starts_with(r#"Cannot query field "zzz" on type "Query"."#),
        );
    }

    #[tokio::test]
    async fn times_out() {
        let res = Engine::new(schema(false))
            .strategy(ThreadStrategy::new())
            .timeout(Duration::from_millis(5))
            .execute(Request::new("{ first }"))
            .await;

        assert!(!res.invalid);
        assert_eq!(res.data, None);
        assert_eq!(res.errors[0].message, "Execution timed out.");
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn finished_executions_leave_no_timer_threads() {
        let threads = || {
            std::fs::read_dir("/proc/self/task")
                .expect("no task list")
                .count()
        };
        let engine = Engine::new(schema(false)).timeout(Duration::from_secs(30));

        let before = threads();
        for _ in 0..200 {
            let res = engine.execute_sync(Request::new("{ third }"));
            assert_eq!(res.data, Some(graphql_value!({"third": 3})));
        }

        assert!(threads() < before + 50, "timer threads outlived their executions");
    }
}
