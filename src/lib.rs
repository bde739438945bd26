//! GraphQL query language engine.
//!
//! The crate turns GraphQL text into results in four steps, each usable on
//! its own:
//!
//! 1. [`parser`] reads a [`Document`] out of the source text;
//! 2. [`validation`] checks the document against a [`Schema`];
//! 3. [`executor`] runs one of its operations, calling field resolvers
//!    through an [`ExecutionStrategy`];
//! 4. the [`ExecutionResult`] is serialized with [`serde`].
//!
//! An [`Engine`] strings these together:
//!
//! ```rust
//! use graphql_core::{
//!     Engine, Request, Resolution, graphql_value,
//!     ast::Type,
//!     schema::{meta::{Field, ObjectMeta}, model::Schema},
//! };
//!
//! let query = ObjectMeta::new("Query")
//!     .field(Field::new("hello", Type::non_null_named("String"))
//!         .resolver(|_, _, _| Resolution::value("world")))
//!     .into_meta();
//! let schema = Schema::builder("Query").register(query).build().unwrap();
//!
//! let res = Engine::new(schema).execute_sync(Request::new("{ hello }"));
//!
//! assert_eq!(res.data, Some(graphql_value!({"hello": "world"})));
//! assert!(res.errors.is_empty());
//! ```
#![cfg_attr(docsrs, feature(doc_cfg))]

#[macro_use]
mod macros;
pub mod ast;
pub mod executor;
mod integrations;
pub mod introspection;
pub mod parser;
pub mod schema;
pub mod validation;
pub mod value;
pub mod visitor;

#[cfg(test)]
mod executor_tests;

use std::{any::Any, fmt, future::Future, sync::Arc, time::Duration};

use futures::{
    FutureExt as _,
    future::{self, BoxFuture, Either},
};
use futures_timer::Delay;

use crate::{executor::ExecutionParams, validation::Rule};

#[cfg(feature = "tokio")]
pub use crate::executor::strategy::TokioStrategy;
#[doc(inline)]
pub use crate::{
    ast::{Document, OperationType, Type},
    executor::{
        Arguments, ExecutionError, FieldError, FieldResult, FieldValue, PathSegment, Resolution,
        ResolveInfo,
        middleware::{Middleware, Next},
        strategy::{ExecutionStrategy, SyncStrategy, ThreadPoolStrategy, ThreadStrategy},
    },
    introspection::INTROSPECTION_QUERY,
    parser::{ParseOptions, SourcePosition, SyntaxError, parse_document},
    schema::model::Schema,
    validation::{RuleError, validate},
    value::{Object, ScalarValue, Value},
};

static_assertions::assert_impl_all!(Schema: Send, Sync);
static_assertions::assert_impl_all!(Engine: Send, Sync);

/// An error that prevented a request from executing.
#[expect(missing_docs, reason = "self-explanatory")]
#[derive(Clone, Debug, PartialEq)]
pub enum GraphQLError {
    ParseError(SyntaxError),
    ValidationError(Vec<RuleError>),
    NoOperationProvided,
    MultipleOperationsProvided,
    UnknownOperationName(String),
    /// The schema has no root type for this kind of operation.
    NotSupported(OperationType),
    VariableError(Vec<RuleError>),
    Timeout,
}

impl fmt::Display for GraphQLError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ParseError(e) => write!(f, "{e}"),
            Self::ValidationError(errs) | Self::VariableError(errs) => {
                for e in errs {
                    writeln!(f, "{e}")?;
                }
                Ok(())
            }
            Self::NoOperationProvided => write!(f, "Must provide an operation."),
            Self::MultipleOperationsProvided => write!(
                f,
                "Must provide operation name if query contains multiple operations.",
            ),
            Self::UnknownOperationName(name) => write!(f, r#"Unknown operation named "{name}"."#),
            Self::NotSupported(op) => write!(f, "Schema is not configured for {op}s."),
            Self::Timeout => write!(f, "Execution timed out."),
        }
    }
}

impl std::error::Error for GraphQLError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ParseError(e) => Some(e),
            Self::ValidationError(errs) | Self::VariableError(errs) => Some(errs.first()?),
            Self::NoOperationProvided
            | Self::MultipleOperationsProvided
            | Self::UnknownOperationName(_)
            | Self::NotSupported(_)
            | Self::Timeout => None,
        }
    }
}

impl From<SyntaxError> for GraphQLError {
    fn from(e: SyntaxError) -> Self {
        Self::ParseError(e)
    }
}

/// What to run, and with which inputs.
#[derive(Clone)]
pub struct Request {
    /// GraphQL text of the document.
    pub query: String,
    /// Operation to run, required if the document has several.
    pub operation_name: Option<String>,
    /// Raw variable values, coerced against the operation's definitions.
    pub variables: Object,
    /// Source handed to the root fields' resolvers.
    pub root_value: FieldValue,
    /// Shared request state, reachable through [`ResolveInfo::context()`].
    pub context: Arc<dyn Any + Send + Sync>,
}

impl Request {
    /// Creates a request for `query`, with no variables and a `()` context.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            operation_name: None,
            variables: Object::with_capacity(0),
            root_value: FieldValue::Null,
            context: Arc::new(()),
        }
    }

    /// Selects the operation to run.
    #[must_use]
    pub fn operation_name(mut self, name: impl Into<String>) -> Self {
        self.operation_name = Some(name.into());
        self
    }

    /// Sets the variable values.
    #[must_use]
    pub fn variables(mut self, variables: Object) -> Self {
        self.variables = variables;
        self
    }

    /// Sets the root value.
    #[must_use]
    pub fn root_value(mut self, root: impl Into<FieldValue>) -> Self {
        self.root_value = root.into();
        self
    }

    /// Sets the context.
    #[must_use]
    pub fn context<C: Any + Send + Sync>(mut self, context: C) -> Self {
        self.context = Arc::new(context);
        self
    }
}

impl fmt::Debug for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Request")
            .field("query", &self.query)
            .field("operation_name", &self.operation_name)
            .field("variables", &self.variables)
            .field("root_value", &self.root_value)
            .finish_non_exhaustive()
    }
}

/// An error as reported in an [`ExecutionResult`].
#[derive(Clone, Debug, PartialEq)]
pub struct ResponseError {
    /// Human readable description.
    pub message: String,
    /// Where in the document the error applies. Zero-based.
    pub locations: Vec<SourcePosition>,
    /// Response path of the failed field, for execution errors.
    pub path: Vec<PathSegment>,
    /// Extra data attached by the resolver, [`Value::Null`] when none.
    pub extensions: Value,
}

impl ResponseError {
    /// Creates an error with only a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            locations: vec![],
            path: vec![],
            extensions: Value::Null,
        }
    }
}

impl From<&SyntaxError> for ResponseError {
    fn from(e: &SyntaxError) -> Self {
        Self {
            locations: vec![e.position()],
            ..Self::new(e.message())
        }
    }
}

impl From<&RuleError> for ResponseError {
    fn from(e: &RuleError) -> Self {
        Self {
            locations: e.locations().to_vec(),
            ..Self::new(e.message())
        }
    }
}

impl From<&ExecutionError> for ResponseError {
    fn from(e: &ExecutionError) -> Self {
        Self {
            message: e.error().message().into(),
            locations: e.locations().to_vec(),
            path: e.path().to_vec(),
            extensions: e.error().extensions().clone(),
        }
    }
}

/// Outcome of a request.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExecutionResult {
    /// Result of the operation. `None` if the request never ran, or if a
    /// non-null field error propagated up to the root.
    pub data: Option<Value>,
    /// Everything that went wrong, in document order for request errors and
    /// in location order for field errors.
    pub errors: Vec<ResponseError>,
    /// Free-form response metadata.
    pub extensions: Object,
    /// Whether the request failed before execution started.
    pub invalid: bool,
}

impl ExecutionResult {
    /// Whether no error at all was reported.
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

impl From<GraphQLError> for ExecutionResult {
    fn from(e: GraphQLError) -> Self {
        let errors = match &e {
            GraphQLError::ParseError(e) => vec![e.into()],
            GraphQLError::ValidationError(errs) | GraphQLError::VariableError(errs) => {
                errs.iter().map(Into::into).collect()
            }
            e => vec![ResponseError::new(e.to_string())],
        };
        Self {
            data: None,
            errors,
            extensions: Object::with_capacity(0),
            invalid: !matches!(e, GraphQLError::Timeout),
        }
    }
}

type RuleSet = Arc<dyn Fn() -> Vec<Box<dyn Rule>> + Send + Sync>;

/// Executes requests against a schema.
///
/// Cheap to clone: clones share the schema, strategy and middleware.
#[derive(Clone)]
pub struct Engine {
    schema: Arc<Schema>,
    strategy: Arc<dyn ExecutionStrategy>,
    middleware: Arc<[Arc<dyn Middleware>]>,
    rules: RuleSet,
    timeout: Option<Duration>,
    parse_options: ParseOptions,
}

impl Engine {
    /// Creates an engine running resolvers synchronously, with the default
    /// validation rules and no timeout.
    pub fn new(schema: impl Into<Arc<Schema>>) -> Self {
        Self {
            schema: schema.into(),
            strategy: Arc::new(SyncStrategy),
            middleware: Arc::new([]),
            rules: Arc::new(validation::default_rules),
            timeout: None,
            parse_options: ParseOptions::default(),
        }
    }

    /// Sets the strategy resolver calls are scheduled with.
    #[must_use]
    pub fn strategy(mut self, strategy: impl ExecutionStrategy + 'static) -> Self {
        self.strategy = Arc::new(strategy);
        self
    }

    /// Appends a middleware. The first added is the outermost.
    #[must_use]
    pub fn middleware(mut self, middleware: impl Middleware + 'static) -> Self {
        let mut chain = self.middleware.to_vec();
        chain.push(Arc::new(middleware));
        self.middleware = chain.into();
        self
    }

    /// Replaces the validation rules, built afresh for every request.
    #[must_use]
    pub fn rules<F>(mut self, rules: F) -> Self
    where
        F: Fn() -> Vec<Box<dyn Rule>> + Send + Sync + 'static,
    {
        self.rules = Arc::new(rules);
        self
    }

    /// Bounds how long a request may wait for its result.
    ///
    /// Resolvers still running when it elapses are abandoned.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the options documents are parsed with.
    #[must_use]
    pub fn parse_options(mut self, options: ParseOptions) -> Self {
        self.parse_options = options;
        self
    }

    /// The schema requests run against.
    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Parses `query` with this engine's options.
    ///
    /// # Errors
    ///
    /// Returns the syntax error, if any.
    pub fn parse(&self, query: &str) -> Result<Document, GraphQLError> {
        parse_document(query, self.parse_options).map_err(|e| {
            tracing::debug!(position = %e.position(), "syntax error: {}", e.message());
            e.into()
        })
    }

    /// Checks `document` with this engine's rules.
    pub fn validate(&self, document: &Document) -> Vec<RuleError> {
        validation::validate_with_rules(&self.schema, document, (self.rules)())
    }

    /// Parses, validates and executes `request`.
    ///
    /// Request-level failures are reported in the result, with `invalid`
    /// set.
    pub fn execute(&self, request: Request) -> impl Future<Output = ExecutionResult> + Send + use<> {
        let prepared = self
            .parse(&request.query)
            .and_then(|document| self.prepare(&document, request));
        self.finish(prepared)
    }

    /// Validates and executes an already parsed `document`. The `query` of
    /// the `request` is ignored.
    pub fn execute_document(
        &self,
        document: &Document,
        request: Request,
    ) -> impl Future<Output = ExecutionResult> + Send + use<> {
        let prepared = self.prepare(document, request);
        self.finish(prepared)
    }

    /// Blocking version of [`Engine::execute()`].
    pub fn execute_sync(&self, request: Request) -> ExecutionResult {
        futures::executor::block_on(self.execute(request))
    }

    /// Blocks until every resolver call scheduled by the strategy has
    /// finished, or `timeout` elapses. Returns `false` on timeout.
    pub fn wait_until_finished(&self, timeout: Option<Duration>) -> bool {
        self.strategy.wait_until_finished(timeout)
    }

    fn prepare(
        &self,
        document: &Document,
        request: Request,
    ) -> Result<BoxFuture<'static, ExecutionResult>, GraphQLError> {
        let errors = self.validate(document);
        if !errors.is_empty() {
            return Err(GraphQLError::ValidationError(errors));
        }

        let fut = executor::execute_validated_query(
            document,
            ExecutionParams {
                schema: Arc::clone(&self.schema),
                operation_name: request.operation_name,
                variables: request.variables,
                root_value: request.root_value,
                context: request.context,
                strategy: Arc::clone(&self.strategy),
                middleware: Arc::clone(&self.middleware),
            },
        )?;
        Ok(fut
            .map(|(data, errors)| ExecutionResult {
                data,
                errors: errors.iter().map(Into::into).collect(),
                extensions: Object::with_capacity(0),
                invalid: false,
            })
            .boxed())
    }

    fn finish(
        &self,
        prepared: Result<BoxFuture<'static, ExecutionResult>, GraphQLError>,
    ) -> impl Future<Output = ExecutionResult> + Send + use<> {
        let timeout = self.timeout;
        async move {
            match prepared {
                Ok(fut) => with_timeout(fut, timeout).await,
                Err(e) => {
                    tracing::debug!(error = %e, "request rejected");
                    e.into()
                }
            }
        }
    }
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("middleware", &self.middleware.len())
            .field("timeout", &self.timeout)
            .field("parse_options", &self.parse_options)
            .finish_non_exhaustive()
    }
}

async fn with_timeout(
    fut: BoxFuture<'static, ExecutionResult>,
    timeout: Option<Duration>,
) -> ExecutionResult {
    let Some(timeout) = timeout else {
        return fut.await;
    };

    match future::select(fut, Delay::new(timeout)).await {
        Either::Left((res, _)) => res,
        Either::Right(_) => {
            tracing::debug!(?timeout, "execution timed out");
            GraphQLError::Timeout.into()
        }
    }
}

/// Validates and executes `document` against `schema`, with the default
/// rules and resolvers called synchronously.
///
/// Shorthand for [`Engine::execute_document()`] on a default [`Engine`].
pub fn execute(
    schema: &Arc<Schema>,
    document: &Document,
    request: Request,
) -> impl Future<Output = ExecutionResult> + Send + use<> {
    Engine::new(Arc::clone(schema)).execute_document(document, request)
}
