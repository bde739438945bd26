use std::{thread, time::Duration};

use pretty_assertions::assert_eq;

use crate::{
    Engine, ExecutionResult, FieldError, FieldValue, Request, Resolution, Value,
    ast::Type,
    executor::{
        middleware::{Next, from_fn},
        strategy::{ExecutionStrategy, SyncStrategy, ThreadPoolStrategy, ThreadStrategy},
    },
    graphql_value,
    schema::{
        meta::{Field, ObjectMeta},
        model::Schema,
    },
};

/// Sleeps for the `delay` of the source before returning its `label`.
fn label_after_delay() -> Field {
    Field::new("label", Type::named("String")).resolver(|src, _, _| {
        let Some(obj) = src.as_value().and_then(Value::as_object_value) else {
            return Resolution::ready(Ok(FieldValue::Null));
        };
        let delay = obj
            .get_field_value("delay")
            .and_then(Value::as_int_value)
            .unwrap_or(0);
        let label = obj.get_field_value("label").cloned().unwrap_or(Value::Null);
        thread::sleep(Duration::from_millis(delay as u64));
        Resolution::value(label)
    })
}

fn schema() -> Schema {
    let item = ObjectMeta::new("Item").field(label_after_delay()).into_meta();
    let query = ObjectMeta::new("Query")
        .field(Field::new("items", Type::list(Type::named("Item"))).resolver(|_, _, _| {
            Resolution::value(graphql_value!([
                {"label": "first", "delay": 40},
                {"label": "second", "delay": 20},
                {"label": "third", "delay": 0},
            ]))
        }))
        .field(Field::new("later", Type::named("String")).resolver(|_, _, _| {
            Resolution::pending(async {
                tokio::time::sleep(Duration::from_millis(10)).await;
                Ok(FieldValue::value("done"))
            })
        }))
        .field(Field::new("greeting", Type::named("String")).resolver(|_, _, _| {
            Resolution::value("hello")
        }))
        .field(Field::new("secret", Type::named("String")).resolver(|_, _, _| {
            Resolution::value("hunter2")
        }))
        .into_meta();

    Schema::builder("Query")
        .register_all([query, item])
        .build()
        .expect("valid schema")
}

async fn run(engine: &Engine, query: &str) -> Value {
    let res = engine.execute(Request::new(query)).await;

    assert_eq!(res.errors, []);
    res.data.expect("data is present")
}

fn items_result() -> Value {
    graphql_value!({
        "items": [{"label": "first"}, {"label": "second"}, {"label": "third"}],
    })
}

mod strategies {
    use std::time::Duration;

    use pretty_assertions::assert_eq;

    use super::{
        ExecutionStrategy as _, SyncStrategy, ThreadPoolStrategy, ThreadStrategy, items_result,
        run, schema,
    };
    use crate::{Engine, Request, graphql_value};

    #[tokio::test]
    async fn threads_keep_list_order() {
        let engine = Engine::new(schema()).strategy(ThreadStrategy::new());

        assert_eq!(run(&engine, "{ items { label } }").await, items_result());
        assert!(engine.wait_until_finished(Some(Duration::from_secs(5))));
    }

    #[tokio::test]
    async fn thread_pool_keeps_list_order() {
        let strategy = ThreadPoolStrategy::with_default_pool().expect("pool");
        let engine = Engine::new(schema()).strategy(strategy);

        assert_eq!(run(&engine, "{ items { label } }").await, items_result());
    }

    #[tokio::test]
    async fn pending_resolvers_are_awaited_in_place() {
        let engine = Engine::new(schema()).strategy(SyncStrategy);

        assert_eq!(
            run(&engine, "{ greeting later }").await,
            graphql_value!({"greeting": "hello", "later": "done"}),
        );
    }

    #[tokio::test]
    async fn pending_fields_keep_their_place() {
        let engine = Engine::new(schema()).strategy(SyncStrategy);

        let data = run(&engine, "{ greeting later secret }").await;
        let obj = data.as_object_value().expect("object");
        let fields = obj.iter().map(|(k, v)| (k.as_str(), v)).collect::<Vec<_>>();

        assert_eq!(
            fields,
            [
                ("greeting", &graphql_value!("hello")),
                ("later", &graphql_value!("done")),
                ("secret", &graphql_value!("hunter2")),
            ],
        );
    }

    #[test]
    fn sync_strategy_has_nothing_to_wait_for() {
        assert!(SyncStrategy.wait_until_finished(Some(Duration::ZERO)));
    }

    #[tokio::test]
    async fn abandoned_resolvers_can_be_waited_for() {
        let engine = Engine::new(schema())
            .strategy(ThreadStrategy::new())
            .timeout(Duration::from_millis(5));

        let res = engine.execute(Request::new("{ items { label } }")).await;

        assert!(!res.invalid);
        assert_eq!(res.data, None);
        assert_eq!(res.errors[0].message, "Execution timed out.");
        assert!(engine.wait_until_finished(Some(Duration::from_secs(5))));
    }

    #[cfg(feature = "tokio")]
    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn tokio_spawns_pending_resolvers() {
        use crate::executor::strategy::TokioStrategy;

        let engine = Engine::new(schema()).strategy(TokioStrategy::current());

        assert_eq!(
            run(&engine, "{ later greeting }").await,
            graphql_value!({"later": "done", "greeting": "hello"}),
        );
        assert!(engine.wait_until_finished(Some(Duration::from_secs(5))));
    }
}

/// Appends `suffix` to every string a field resolves to.
fn suffix(suffix: &'static str) -> impl crate::Middleware {
    from_fn(move |next: Next<'_>, src, args, info| {
        let append = move |r: Result<FieldValue, FieldError>| {
            r.map(|v| match v.as_value().and_then(Value::as_string_value) {
                Some(s) => FieldValue::value(format!("{s}{suffix}")),
                None => v,
            })
        };
        match next.run(src, args, info) {
            Resolution::Ready(r) => Resolution::ready(append(r)),
            Resolution::Pending(fut) => Resolution::pending(async move { append(fut.await) }),
        }
    })
}

mod middleware {
    use pretty_assertions::assert_eq;

    use super::{Next, Resolution, from_fn, run, schema, suffix};
    use crate::{Engine, FieldError, Request, graphql_value};

    #[tokio::test]
    async fn post_processes_results() {
        let engine = Engine::new(schema()).middleware(suffix("!"));

        assert_eq!(
            run(&engine, "{ greeting later }").await,
            graphql_value!({"greeting": "hello!", "later": "done!"}),
        );
    }

    #[tokio::test]
    async fn first_added_is_outermost() {
        let engine = Engine::new(schema())
            .middleware(suffix("-outer"))
            .middleware(suffix("-inner"));

        assert_eq!(
            run(&engine, "{ greeting }").await,
            graphql_value!({"greeting": "hello-inner-outer"}),
        );
    }

    #[tokio::test]
    async fn sees_nested_fields() {
        let engine = Engine::new(schema()).middleware(suffix("?"));

        assert_eq!(
            run(&engine, "{ items { label } }").await,
            graphql_value!({
                "items": [{"label": "first?"}, {"label": "second?"}, {"label": "third?"}],
            }),
        );
    }

    #[tokio::test]
    async fn short_circuits_resolvers() {
        let engine = Engine::new(schema()).middleware(from_fn(
            |next: Next<'_>, src, args, info| {
                if info.field_name() == "secret" {
                    Resolution::ready(Err(FieldError::from("Not allowed.")))
                } else {
                    next.run(src, args, info)
                }
            },
        ));

        let res = engine.execute(Request::new("{ greeting secret }")).await;

        assert_eq!(
            res.data,
            Some(graphql_value!({"greeting": "hello", "secret": null})),
        );
        assert_eq!(res.errors.len(), 1);
        assert_eq!(res.errors[0].message, "Not allowed.");
    }
}

#[test]
fn executes_without_a_runtime() {
    let engine = Engine::new(schema()).strategy(ThreadStrategy::new());
    let res: ExecutionResult = engine.execute_sync(Request::new("{ items { label } greeting }"));

    assert_eq!(res.errors, []);
    assert_eq!(
        res.data,
        Some(graphql_value!({
            "items": [{"label": "first"}, {"label": "second"}, {"label": "third"}],
            "greeting": "hello",
        })),
    );
}
