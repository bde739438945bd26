//! Resolve the document to values

mod collect;
mod complete;
pub mod middleware;
pub mod strategy;
pub(crate) mod values;

use std::{
    any::Any,
    cmp::Ordering,
    fmt::{self, Display},
    future::Future,
    sync::{Arc, Mutex, PoisonError, RwLock},
};

use arcstr::ArcStr;
use fnv::FnvHashMap;
use futures::future::BoxFuture;
use indexmap::IndexMap;
use tracing::Instrument as _;

use crate::{
    GraphQLError,
    ast::{Document, Field, FragmentDefinition, OperationDefinition, OperationType, Type},
    parser::SourcePosition,
    schema::model::Schema,
    value::{Object, Value},
};

use self::{collect::FieldMap, middleware::Middleware, strategy::ExecutionStrategy};

/// Segment of a response path: a field's response name or a list index.
#[derive(Clone, Debug, derive_more::Display, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum PathSegment {
    /// Response name of a field.
    Field(ArcStr),
    /// Position in a list.
    Index(usize),
}

/// Error type for errors that occur during field resolution
///
/// Field errors are represented by a human-readable error message and an
/// optional `Value` structure containing additional information.
///
/// They can be converted to from any type that implements `std::fmt::Display`,
/// which makes error chaining with the `?` operator a breeze:
///
/// ```rust
/// # use graphql_core::FieldError;
/// fn get_string(data: Vec<u8>) -> Result<String, FieldError> {
///     let s = String::from_utf8(data)?;
///     Ok(s)
/// }
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct FieldError {
    message: String,
    extensions: Value,
}

impl<T: Display> From<T> for FieldError {
    fn from(e: T) -> Self {
        Self {
            message: e.to_string(),
            extensions: Value::null(),
        }
    }
}

impl FieldError {
    /// Construct a new [`FieldError`] with additional data.
    ///
    /// You can use the [`graphql_value!`] macro for construction:
    /// ```rust
    /// use graphql_core::{graphql_value, FieldError};
    ///
    /// # let _: FieldError =
    /// FieldError::new(
    ///     "Could not open connection to the database",
    ///     graphql_value!({"internal_error": "Connection refused"}),
    /// );
    /// ```
    ///
    /// The `extensions` parameter will be added to the `"extensions"` field of
    /// the error object in the JSON response:
    /// ```json
    /// {
    ///   "errors": [
    ///     "message": "Could not open connection to the database",
    ///     "locations": [{"line": 2, "column": 4}],
    ///     "extensions": {
    ///       "internal_error": "Connection refused"
    ///     }
    ///   ]
    /// }
    /// ```
    ///
    /// If the argument is [`Value::Null`], then no extra data will be
    /// included.
    ///
    /// [`graphql_value!`]: macro@crate::graphql_value
    #[must_use]
    pub fn new<T: Display>(e: T, extensions: Value) -> Self {
        Self {
            message: e.to_string(),
            extensions,
        }
    }

    /// Returns the `"message"` field of this [`FieldError`].
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the `"extensions"` field of this [`FieldError`].
    ///
    /// If there is no `"extensions"`, then [`Value::Null`] will be returned.
    #[must_use]
    pub fn extensions(&self) -> &Value {
        &self.extensions
    }
}

/// The result of resolving the value of a field of type `T`
pub type FieldResult<T> = Result<T, FieldError>;

/// Error type for errors that occur during query execution
///
/// All execution errors contain the source position in the query of the field
/// that failed to resolve. It also contains the field stack.
#[derive(Clone, Debug, PartialEq)]
pub struct ExecutionError {
    locations: Vec<SourcePosition>,
    path: Vec<PathSegment>,
    error: FieldError,
}

impl Eq for ExecutionError {}

impl PartialOrd for ExecutionError {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ExecutionError {
    fn cmp(&self, other: &Self) -> Ordering {
        (&self.locations, &self.path, &self.error.message).cmp(&(
            &other.locations,
            &other.path,
            &other.error.message,
        ))
    }
}

impl ExecutionError {
    /// Construct a new execution error occurring at the given positions.
    pub fn new(locations: Vec<SourcePosition>, path: Vec<PathSegment>, error: FieldError) -> Self {
        Self {
            locations,
            path,
            error,
        }
    }

    /// The error message
    pub fn error(&self) -> &FieldError {
        &self.error
    }

    /// The source locations of the field that failed to resolve
    pub fn locations(&self) -> &[SourcePosition] {
        &self.locations
    }

    /// The path of response names and list indices leading to the field
    /// that failed to resolve
    pub fn path(&self) -> &[PathSegment] {
        &self.path
    }
}

/// Value produced by a resolver, before completion against the field type.
#[derive(Clone, Default)]
pub enum FieldValue {
    /// No value.
    #[default]
    Null,
    /// A plain value. Objects are resolved field by field by the default
    /// resolver, which looks up keys.
    Value(Value),
    /// A list of values to complete one by one.
    List(Vec<FieldValue>),
    /// An opaque application value, handed over to the resolvers of the
    /// fields selected on it.
    Object(Arc<dyn Any + Send + Sync>),
}

impl FieldValue {
    /// Wraps an application value.
    pub fn object<T: Any + Send + Sync>(v: T) -> Self {
        Self::Object(Arc::new(v))
    }

    /// Wraps a plain value.
    pub fn value(v: impl Into<Value>) -> Self {
        Self::Value(v.into())
    }

    /// Wraps a list of values.
    pub fn list(items: impl IntoIterator<Item = FieldValue>) -> Self {
        Self::List(items.into_iter().collect())
    }

    /// Whether this is null, either [`FieldValue::Null`] or a null
    /// [`Value`].
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null | Self::Value(Value::Null))
    }

    /// Views the plain value, if this is one.
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Self::Value(v) => Some(v),
            _ => None,
        }
    }

    /// Views the application value as a `T`, if it is one.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        match self {
            Self::Object(o) => o.downcast_ref(),
            _ => None,
        }
    }
}

impl From<Value> for FieldValue {
    fn from(v: Value) -> Self {
        Self::Value(v)
    }
}

impl fmt::Debug for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("Null"),
            Self::Value(v) => f.debug_tuple("Value").field(v).finish(),
            Self::List(l) => f.debug_tuple("List").field(l).finish(),
            Self::Object(_) => f.write_str("Object(..)"),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Value(v) => v.fmt(f),
            Self::List(l) => write!(f, "[{}]", itertools::join(l, ", ")),
            Self::Object(_) => f.write_str("<object>"),
        }
    }
}

/// Outcome of calling a resolver: a value now, or one later.
pub enum Resolution {
    /// The resolver is done.
    Ready(FieldResult<FieldValue>),
    /// The resolver will be done once the future completes.
    Pending(BoxFuture<'static, FieldResult<FieldValue>>),
}

impl Resolution {
    /// A ready plain value.
    pub fn value(v: impl Into<Value>) -> Self {
        Self::Ready(Ok(FieldValue::Value(v.into())))
    }

    /// A ready value or error.
    pub fn ready(r: FieldResult<FieldValue>) -> Self {
        Self::Ready(r)
    }

    /// A value computed by `fut`.
    pub fn pending<F>(fut: F) -> Self
    where
        F: Future<Output = FieldResult<FieldValue>> + Send + 'static,
    {
        Self::Pending(Box::pin(fut))
    }

    /// Waits for the value.
    pub async fn resolve(self) -> FieldResult<FieldValue> {
        match self {
            Self::Ready(r) => r,
            Self::Pending(fut) => fut.await,
        }
    }
}

impl From<FieldResult<FieldValue>> for Resolution {
    fn from(r: FieldResult<FieldValue>) -> Self {
        Self::Ready(r)
    }
}

impl From<FieldValue> for Resolution {
    fn from(v: FieldValue) -> Self {
        Self::Ready(Ok(v))
    }
}

impl fmt::Debug for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ready(r) => f.debug_tuple("Ready").field(r).finish(),
            Self::Pending(_) => f.write_str("Pending(..)"),
        }
    }
}

/// Coerced argument values of a field.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Arguments {
    args: IndexMap<ArcStr, Value>,
}

impl Arguments {
    pub(crate) fn new(args: IndexMap<ArcStr, Value>) -> Self {
        Self { args }
    }

    /// Gets the value of an argument, if it was given or has a default.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.args.get(name)
    }

    /// Whether an argument was given or has a default.
    pub fn contains(&self, name: &str) -> bool {
        self.args.contains_key(name)
    }

    /// All arguments, in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&ArcStr, &Value)> {
        self.args.iter()
    }

    /// Number of arguments.
    pub fn len(&self) -> usize {
        self.args.len()
    }

    /// Whether there are no arguments.
    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }
}

/// Per-request state shared by all field resolutions of one execution.
pub(crate) struct ExecutionContext {
    schema: Arc<Schema>,
    fragments: FnvHashMap<ArcStr, Arc<FragmentDefinition>>,
    operation: Arc<OperationDefinition>,
    root_value: FieldValue,
    context: Arc<dyn Any + Send + Sync>,
    variables: Object,
    errors: RwLock<Vec<ExecutionError>>,
    strategy: Arc<dyn ExecutionStrategy>,
    middleware: Arc<[Arc<dyn Middleware>]>,
    /// Collected sub-fields per object type and field ASTs.
    subfields: Mutex<FnvHashMap<(ArcStr, Vec<usize>), Arc<FieldMap>>>,
}

impl ExecutionContext {
    fn push_error(&self, error: ExecutionError) {
        tracing::debug!(
            message = error.error.message(),
            path = %itertools::join(&error.path, "."),
            "field resolution failed",
        );
        self.errors
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(error);
    }

    fn take_errors(&self) -> Vec<ExecutionError> {
        let mut errors = std::mem::take(&mut *self.errors.write().unwrap_or_else(PoisonError::into_inner));
        errors.sort();
        errors
    }
}

/// Read-only view of the field being resolved.
///
/// Handed to resolvers, type checks and middleware. Cheap to clone, and
/// `'static`, so asynchronous resolvers may keep it.
#[derive(Clone)]
pub struct ResolveInfo {
    ctx: Arc<ExecutionContext>,
    field_name: ArcStr,
    field_asts: Arc<[Arc<Field>]>,
    return_type: Type,
    parent_type: ArcStr,
    path: Vec<PathSegment>,
}

impl ResolveInfo {
    /// Name of the field, not its alias.
    pub fn field_name(&self) -> &ArcStr {
        &self.field_name
    }

    /// All occurrences of the field in the document merged under one
    /// response name.
    pub fn field_asts(&self) -> &[Arc<Field>] {
        &self.field_asts
    }

    /// Declared type of the field.
    pub fn return_type(&self) -> &Type {
        &self.return_type
    }

    /// Name of the object type the field is resolved on.
    pub fn parent_type(&self) -> &ArcStr {
        &self.parent_type
    }

    /// Response path of the field.
    pub fn path(&self) -> &[PathSegment] {
        &self.path
    }

    /// The schema being executed against.
    pub fn schema(&self) -> &Schema {
        &self.ctx.schema
    }

    /// Fragments of the document, by name.
    pub fn fragments(&self) -> &FnvHashMap<ArcStr, Arc<FragmentDefinition>> {
        &self.ctx.fragments
    }

    /// Value the operation was started with.
    pub fn root_value(&self) -> &FieldValue {
        &self.ctx.root_value
    }

    /// The operation being executed.
    pub fn operation(&self) -> &OperationDefinition {
        &self.ctx.operation
    }

    /// Coerced variable values.
    pub fn variables(&self) -> &Object {
        &self.ctx.variables
    }

    /// The request context, if it is a `T`.
    pub fn context<T: Any>(&self) -> Option<&T> {
        self.ctx.context.downcast_ref()
    }

    fn error_at(&self, path: Vec<PathSegment>, error: FieldError) -> ExecutionError {
        let locations = self.field_asts.iter().map(|f| f.span.start).collect();
        ExecutionError::new(locations, path, error)
    }
}

impl fmt::Debug for ResolveInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolveInfo")
            .field("field_name", &self.field_name)
            .field("return_type", &self.return_type)
            .field("parent_type", &self.parent_type)
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

/// Everything an execution needs besides the document.
pub(crate) struct ExecutionParams {
    pub schema: Arc<Schema>,
    pub operation_name: Option<String>,
    pub variables: Object,
    pub root_value: FieldValue,
    pub context: Arc<dyn Any + Send + Sync>,
    pub strategy: Arc<dyn ExecutionStrategy>,
    pub middleware: Arc<[Arc<dyn Middleware>]>,
}

/// Picks the operation to run.
pub(crate) fn get_operation(
    document: &Document,
    operation_name: Option<&str>,
) -> Result<Arc<OperationDefinition>, GraphQLError> {
    let mut found = None;
    for op in document.operations() {
        match operation_name {
            Some(name) => {
                if op.name.as_ref().is_some_and(|n| n.item == name) {
                    return Ok(Arc::clone(op));
                }
            }
            None if found.is_some() => return Err(GraphQLError::MultipleOperationsProvided),
            None => found = Some(Arc::clone(op)),
        }
    }
    match operation_name {
        Some(name) => Err(GraphQLError::UnknownOperationName(name.into())),
        None => found.ok_or(GraphQLError::NoOperationProvided),
    }
}

/// Prepares the execution of a validated document.
///
/// The returned future owns everything it needs, and resolves to the `data`
/// of the response (`None` when a non-null error reached the root) and the
/// field errors.
///
/// # Errors
///
/// Fails if no operation can be picked, if the schema has no root for the
/// operation kind, or if the variables do not match their definitions.
pub(crate) fn execute_validated_query(
    document: &Document,
    params: ExecutionParams,
) -> Result<impl Future<Output = (Option<Value>, Vec<ExecutionError>)> + Send + use<>, GraphQLError>
{
    let operation = get_operation(document, params.operation_name.as_deref())?;
    let root_type = params
        .schema
        .root_type(operation.operation)
        .ok_or(GraphQLError::NotSupported(operation.operation))?
        .name()
        .clone();
    let variables = values::coerce_variable_values(
        &params.schema,
        &operation.variable_definitions,
        &params.variables,
    )
    .map_err(GraphQLError::VariableError)?;

    let span = tracing::trace_span!(
        "graphql.execute",
        operation = operation.name.as_ref().map(|n| n.item.as_str()),
        kind = %operation.operation,
    );

    let ctx = Arc::new(ExecutionContext {
        fragments: document
            .fragments()
            .map(|f| (f.name.item.clone(), Arc::clone(f)))
            .collect(),
        root_value: params.root_value,
        context: params.context,
        variables,
        errors: RwLock::new(vec![]),
        strategy: params.strategy,
        middleware: params.middleware,
        subfields: Mutex::new(FnvHashMap::default()),
        schema: params.schema,
        operation,
    });

    let fut = async move {
        let completion = {
            let Some(root) = ctx.schema.concrete_type_by_name(&root_type) else {
                return (None, vec![]);
            };
            let fields = collect::collect_root_fields(&ctx, root);
            let source = ctx.root_value.clone();
            if ctx.operation.operation == OperationType::Mutation {
                complete::execute_fields_serially(&ctx, root_type, source, vec![], fields)
            } else {
                complete::execute_fields(&ctx, &root_type, &source, &[], &fields)
            }
        };
        let data = match completion.wait().await {
            Ok(v) => Some(v),
            Err(e) => {
                ctx.push_error(e);
                None
            }
        };
        (data, ctx.take_errors())
    };

    Ok(fut.instrument(span))
}
