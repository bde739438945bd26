use std::{iter, sync::Arc};

use arcstr::ArcStr;
use futures::future::{self, BoxFuture};

use crate::{
    ast::{Field, Type},
    executor::{
        ExecutionContext, ExecutionError, FieldError, FieldResult, FieldValue, PathSegment,
        Resolution, ResolveInfo,
        collect::{self, FieldMap},
        middleware::Next,
        values,
    },
    schema::meta::{MetaType, ObjectMeta},
    value::{Object, Value},
};

/// A completed value, or one that still waits on resolvers.
///
/// `Err` means the value became null where null is not allowed: it
/// propagates to the closest nullable parent, which records it.
pub(crate) enum Completion {
    Ready(Result<Value, ExecutionError>),
    Pending(BoxFuture<'static, Result<Value, ExecutionError>>),
}

impl Completion {
    pub(crate) async fn wait(self) -> Result<Value, ExecutionError> {
        match self {
            Self::Ready(r) => r,
            Self::Pending(fut) => fut.await,
        }
    }

    fn map<F>(self, f: F) -> Self
    where
        F: FnOnce(Result<Value, ExecutionError>) -> Result<Value, ExecutionError> + Send + 'static,
    {
        match self {
            Self::Ready(r) => Self::Ready(f(r)),
            Self::Pending(fut) => Self::Pending(Box::pin(async move { f(fut.await) })),
        }
    }

    /// Joins completions into one, keeping their order. Stays ready unless
    /// some part is pending.
    fn join<F>(parts: Vec<Self>, assemble: F) -> Self
    where
        F: FnOnce(Vec<Value>) -> Value + Send + 'static,
    {
        let mut ready = Vec::with_capacity(parts.len());
        let mut parts = parts.into_iter();
        while let Some(part) = parts.next() {
            match part {
                Self::Ready(r) => ready.push(r),
                Self::Pending(fut) => {
                    let waiting = ready
                        .into_iter()
                        .map(Self::Ready)
                        .chain(iter::once(Self::Pending(fut)))
                        .chain(parts)
                        .map(Self::wait);
                    let waiting = future::join_all(waiting);
                    return Self::Pending(Box::pin(async move {
                        let values = waiting.await;
                        values.into_iter().collect::<Result<Vec<_>, _>>().map(assemble)
                    }));
                }
            }
        }

        Self::Ready(ready.into_iter().collect::<Result<Vec<_>, _>>().map(assemble))
    }
}

/// Resolves the fields of an object concurrently.
pub(crate) fn execute_fields(
    ctx: &Arc<ExecutionContext>,
    parent_type: &ArcStr,
    source: &FieldValue,
    path: &[PathSegment],
    fields: &FieldMap,
) -> Completion {
    let mut names = Vec::with_capacity(fields.len());
    let mut parts = Vec::with_capacity(fields.len());
    for (response_name, asts) in fields {
        if let Some(part) = resolve_field(ctx, parent_type, source, path, response_name, asts) {
            names.push(response_name.clone());
            parts.push(part);
        }
    }

    Completion::join(parts, move |values| {
        Value::Object(
            names
                .into_iter()
                .zip(values)
                .map(|(n, v)| (n.to_string(), v))
                .collect::<Object>(),
        )
    })
}

/// Resolves the fields of an object one after the other: a field's
/// resolver only runs once the previous field is completed.
pub(crate) fn execute_fields_serially(
    ctx: &Arc<ExecutionContext>,
    parent_type: ArcStr,
    source: FieldValue,
    path: Vec<PathSegment>,
    fields: Arc<FieldMap>,
) -> Completion {
    let mut results = Object::with_capacity(fields.len());

    for (i, (response_name, asts)) in fields.iter().enumerate() {
        match resolve_field(ctx, &parent_type, &source, &path, response_name, asts) {
            None => {}
            Some(Completion::Ready(Ok(v))) => {
                results.add_field(response_name.as_str(), v);
            }
            Some(Completion::Ready(Err(e))) => return Completion::Ready(Err(e)),
            Some(Completion::Pending(first)) => {
                let ctx = Arc::clone(ctx);
                let first_name = response_name.clone();
                let rest = Arc::clone(&fields);
                return Completion::Pending(Box::pin(async move {
                    results.add_field(first_name.as_str(), first.await?);
                    for (response_name, asts) in rest.iter().skip(i + 1) {
                        let resolved =
                            resolve_field(&ctx, &parent_type, &source, &path, response_name, asts);
                        if let Some(part) = resolved {
                            results.add_field(response_name.as_str(), part.wait().await?);
                        }
                    }
                    Ok(Value::Object(results))
                }));
            }
        }
    }

    Completion::Ready(Ok(Value::Object(results)))
}

/// Resolves and completes one response key of an object.
///
/// Fields the parent type does not define contribute nothing.
fn resolve_field(
    ctx: &Arc<ExecutionContext>,
    parent_type: &ArcStr,
    source: &FieldValue,
    parent_path: &[PathSegment],
    response_name: &ArcStr,
    asts: &[Arc<Field>],
) -> Option<Completion> {
    let first = asts.first()?;
    let parent = ctx.schema.concrete_type_by_name(parent_type)?;
    let field_def = ctx.schema.field_def(parent, &first.name.item)?;

    let mut path = parent_path.to_vec();
    path.push(PathSegment::Field(response_name.clone()));

    let info = ResolveInfo {
        ctx: Arc::clone(ctx),
        field_name: first.name.item.clone(),
        field_asts: asts.into(),
        return_type: field_def.field_type.clone(),
        parent_type: parent_type.clone(),
        path,
    };

    let resolution =
        match values::argument_values(&ctx.schema, &field_def.arguments, &first.arguments, &ctx.variables) {
            Err(e) => Resolution::Ready(Err(e)),
            Ok(args) => {
                let source = source.clone();
                let resolver = field_def.resolver.clone();
                let middleware = Arc::clone(&ctx.middleware);
                let call_info = info.clone();
                ctx.strategy.execute(Box::new(move || {
                    Next::new(&middleware, resolver.as_ref()).run(&source, &args, &call_info)
                }))
            }
        };

    Some(complete_resolution(ctx, info, resolution))
}

fn complete_resolution(ctx: &Arc<ExecutionContext>, info: ResolveInfo, resolution: Resolution) -> Completion {
    match resolution {
        Resolution::Ready(result) => {
            let path = info.path.clone();
            let return_type = info.return_type.clone();
            complete_value_catching_error(ctx, &return_type, &info, path, result)
        }
        Resolution::Pending(fut) => {
            let ctx = Arc::clone(ctx);
            Completion::Pending(Box::pin(async move {
                let result = fut.await;
                let path = info.path.clone();
                let return_type = info.return_type.clone();
                complete_value_catching_error(&ctx, &return_type, &info, path, result)
                    .wait()
                    .await
            }))
        }
    }
}

/// Completes a value, recording the error and yielding null if completion
/// fails and the type allows null.
fn complete_value_catching_error(
    ctx: &Arc<ExecutionContext>,
    return_type: &Type,
    info: &ResolveInfo,
    path: Vec<PathSegment>,
    result: FieldResult<FieldValue>,
) -> Completion {
    let completion = match result {
        Ok(value) => complete_value(ctx, return_type, info, path, value),
        Err(e) => Completion::Ready(Err(info.error_at(path, e))),
    };

    if return_type.is_non_null() {
        return completion;
    }
    let ctx = Arc::clone(ctx);
    completion.map(move |r| {
        r.or_else(|e| {
            ctx.push_error(e);
            Ok(Value::Null)
        })
    })
}

fn complete_value(
    ctx: &Arc<ExecutionContext>,
    return_type: &Type,
    info: &ResolveInfo,
    path: Vec<PathSegment>,
    value: FieldValue,
) -> Completion {
    if return_type.is_non_null() {
        let message = format!(
            "Cannot return null for non-nullable field {}.{}.",
            info.parent_type, info.field_name,
        );
        let error_path = path.clone();
        let info = info.clone();
        return complete_value(ctx, &return_type.nullable(), &info, path, value).map(move |r| {
            match r {
                Ok(Value::Null) => Err(info.error_at(error_path, FieldError::from(message))),
                other => other,
            }
        });
    }

    if value.is_null() {
        return Completion::Ready(Ok(Value::Null));
    }

    let fail = |message: String| Completion::Ready(Err(info.error_at(path.clone(), FieldError::from(message))));

    if let Some(item_type) = return_type.list_contents() {
        let items = match value {
            FieldValue::List(items) => items,
            FieldValue::Value(Value::List(items)) => items.into_iter().map(FieldValue::Value).collect(),
            _ => {
                return fail(format!(
                    "User Error: expected iterable, but did not find one for field {}.{}.",
                    info.parent_type, info.field_name,
                ));
            }
        };
        let parts = items
            .into_iter()
            .enumerate()
            .map(|(i, item)| {
                let mut item_path = path.clone();
                item_path.push(PathSegment::Index(i));
                complete_value_catching_error(ctx, item_type, info, item_path, Ok(item))
            })
            .collect();
        return Completion::join(parts, Value::List);
    }

    let type_name = return_type.innermost_name();
    let Some(meta) = ctx.schema.concrete_type_by_name(type_name) else {
        return fail(format!("Unknown type \"{type_name}\"."));
    };

    match meta {
        MetaType::Scalar(s) => match value.as_value().and_then(|v| (s.serialize)(v)) {
            Some(v) => Completion::Ready(Ok(v)),
            None => fail(format!("Expected a value of type \"{type_name}\" but received: {value}")),
        },
        MetaType::Enum(e) => match value.as_value().and_then(|v| e.value_of(v)) {
            Some(v) => Completion::Ready(Ok(Value::scalar(v.name.as_str()))),
            None => fail(format!("Expected a value of type \"{type_name}\" but received: {value}")),
        },
        MetaType::Object(o) => complete_object_value(ctx, o, info, path, value),
        MetaType::Interface(_) | MetaType::Union(_) => {
            let runtime_type = match resolve_runtime_type(ctx, meta, info, &value) {
                Ok(t) => t,
                Err(message) => return fail(message),
            };
            complete_object_value(ctx, runtime_type, info, path, value)
        }
        MetaType::InputObject(_) => fail(format!("Type \"{type_name}\" is not an output type.")),
    }
}

fn complete_object_value(
    ctx: &Arc<ExecutionContext>,
    object_type: &ObjectMeta,
    info: &ResolveInfo,
    path: Vec<PathSegment>,
    value: FieldValue,
) -> Completion {
    if let Some(is_type_of) = &object_type.is_type_of {
        if !is_type_of(&value, info) {
            let message = format!("Expected value of type \"{}\" but got: {value}.", object_type.name);
            return Completion::Ready(Err(info.error_at(path, FieldError::from(message))));
        }
    }

    let Some(meta) = ctx.schema.concrete_type_by_name(&object_type.name) else {
        return Completion::Ready(Ok(Value::Null));
    };
    let subfields = collect::collect_subfields(ctx, meta, info.field_asts());
    execute_fields(ctx, &object_type.name, &value, &path, &subfields)
}

/// Picks the object type of a value of an abstract type.
///
/// Asks the abstract type's `resolve_type` function if there is one, then
/// reads a `__typename` key of object values, and finally asks the
/// `is_type_of` check of each possible type.
fn resolve_runtime_type<'s>(
    ctx: &'s ExecutionContext,
    abstract_type: &MetaType,
    info: &ResolveInfo,
    value: &FieldValue,
) -> Result<&'s ObjectMeta, String> {
    let schema = &ctx.schema;
    let resolve_type = match abstract_type {
        MetaType::Interface(i) => i.resolve_type.as_ref(),
        MetaType::Union(u) => u.resolve_type.as_ref(),
        _ => None,
    };

    let name = match resolve_type {
        Some(resolve_type) => resolve_type(value, info),
        None => value
            .as_value()
            .and_then(Value::as_object_value)
            .and_then(|o| o.get_field_value("__typename"))
            .and_then(Value::as_string_value)
            .map(ArcStr::from)
            .or_else(|| {
                schema.possible_types(abstract_type).into_iter().find_map(|t| match t {
                    MetaType::Object(o) if o.is_type_of.as_ref().is_some_and(|f| f(value, info)) => {
                        Some(o.name.clone())
                    }
                    _ => None,
                })
            }),
    };

    let abstract_name = abstract_type.name();
    let Some(name) = name else {
        return Err(format!(
            "Abstract type {abstract_name} must resolve to an Object type at runtime for field \
             {}.{}. Either the {abstract_name} type should provide a \"resolve_type\" function or \
             each possible types should provide an \"is_type_of\" function.",
            info.parent_type, info.field_name,
        ));
    };

    match schema.concrete_type_by_name(&name) {
        Some(runtime @ MetaType::Object(o)) if schema.is_possible_type(abstract_type, runtime) => Ok(o),
        Some(MetaType::Object(_)) => Err(format!(
            "Runtime Object type \"{name}\" is not a possible type for \"{abstract_name}\".",
        )),
        _ => Err(format!(
            "Abstract type {abstract_name} must resolve to an Object type at runtime for field \
             {}.{} with value {value}, received \"{name}\".",
            info.parent_type, info.field_name,
        )),
    }
}
