//! Wrapping field resolution.
//!
//! A [`Middleware`] sees every field resolution of an execution before the
//! resolver does. It may inspect or replace the arguments, short-circuit the
//! resolver, or post-process what it returns.

use std::sync::Arc;

use crate::{
    executor::{Arguments, FieldValue, Resolution, ResolveInfo},
    schema::meta::Resolver,
};

/// Hook around field resolution.
///
/// Middleware run in registration order: the first registered is the
/// outermost.
pub trait Middleware: Send + Sync {
    /// Resolves a field, usually by calling [`Next::run`].
    fn resolve(
        &self,
        next: Next<'_>,
        source: &FieldValue,
        args: &Arguments,
        info: &ResolveInfo,
    ) -> Resolution;
}

/// The rest of the middleware chain, ending with the field's resolver.
pub struct Next<'a> {
    chain: &'a [Arc<dyn Middleware>],
    resolver: Option<&'a Resolver>,
}

impl<'a> Next<'a> {
    pub(crate) fn new(chain: &'a [Arc<dyn Middleware>], resolver: Option<&'a Resolver>) -> Self {
        Self { chain, resolver }
    }

    /// Runs the rest of the chain.
    pub fn run(self, source: &FieldValue, args: &Arguments, info: &ResolveInfo) -> Resolution {
        match self.chain.split_first() {
            Some((first, rest)) => first.resolve(Next::new(rest, self.resolver), source, args, info),
            None => match self.resolver {
                Some(resolver) => resolver(source, args, info),
                None => default_resolver(source, info),
            },
        }
    }
}

/// Builds a [`Middleware`] from a closure.
pub fn from_fn<F>(f: F) -> impl Middleware
where
    F: Fn(Next<'_>, &FieldValue, &Arguments, &ResolveInfo) -> Resolution + Send + Sync + 'static,
{
    FnMiddleware(f)
}

struct FnMiddleware<F>(F);

impl<F> Middleware for FnMiddleware<F>
where
    F: Fn(Next<'_>, &FieldValue, &Arguments, &ResolveInfo) -> Resolution + Send + Sync + 'static,
{
    fn resolve(
        &self,
        next: Next<'_>,
        source: &FieldValue,
        args: &Arguments,
        info: &ResolveInfo,
    ) -> Resolution {
        (self.0)(next, source, args, info)
    }
}

/// Resolver of fields that declare none: reads the key named after the
/// field from an object value.
pub(crate) fn default_resolver(source: &FieldValue, info: &ResolveInfo) -> Resolution {
    let value = match source {
        FieldValue::Value(v) => v.as_object_value(),
        FieldValue::Object(o) => o.downcast_ref::<crate::Value>().and_then(|v| v.as_object_value()),
        FieldValue::Null | FieldValue::List(_) => None,
    }
    .and_then(|o| o.get_field_value(info.field_name()));

    Resolution::Ready(Ok(value.cloned().map_or(FieldValue::Null, FieldValue::Value)))
}
