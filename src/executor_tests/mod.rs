mod abstract_types;
mod async_await;
mod directives;
mod executor;
mod introspection;
mod variables;
