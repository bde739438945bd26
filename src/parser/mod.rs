//! Query parser and language utilities
#![expect(clippy::module_inception, reason = "`parser::parser` holds the parser state")]

mod document;
mod lexer;
mod parser;
mod utils;
mod value;


use std::{fmt, str::FromStr, sync::Arc};

use crate::ast::{Document, Source, Type, ValueNode};

pub use self::{
    lexer::{decode_string, Lexer, LexerError, ScalarToken, Token},
    parser::{OptionParseResult, ParseError, ParseResult, Parser, UnlocatedParseResult},
    utils::{SourcePosition, Span, Spanning},
};

/// Knobs of [`parse_document()`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ParseOptions {
    /// Do not record source locations: every node gets [`Span::unlocated()`].
    ///
    /// Two documents parsed this way compare equal whenever they are
    /// structurally equal.
    pub no_location: bool,

    /// Do not keep a reference to the [`Source`] in the [`Document`].
    pub no_source: bool,
}

impl ParseOptions {
    /// Options producing location-free, source-free documents.
    pub fn pure() -> Self {
        Self {
            no_location: true,
            no_source: true,
        }
    }
}

/// Syntax error in a GraphQL text, with enough context to point at it.
#[derive(Clone, Debug, PartialEq)]
pub struct SyntaxError {
    /// The error, located at the offending position.
    pub error: Spanning<ParseError>,
    /// Text that failed to parse.
    pub source: Arc<Source>,
}

impl SyntaxError {
    fn new(error: Spanning<ParseError>, source: Arc<Source>) -> Self {
        Self { error, source }
    }

    /// Human description of the error, without location.
    pub fn message(&self) -> String {
        self.error.item.to_string()
    }

    /// Where the error was found.
    pub fn position(&self) -> SourcePosition {
        self.error.start()
    }

    /// The offending source line followed by a caret under the error column.
    pub fn excerpt(&self) -> String {
        let pos = self.position();
        let line = self.source.body.lines().nth(pos.line()).unwrap_or_default();
        let gutter = format!("{}: ", pos.line() + 1);

        format!(
            "{gutter}{line}\n{:width$}^",
            "",
            width = gutter.len() + pos.column(),
        )
    }
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pos = self.position();
        write!(
            f,
            "Syntax Error {} ({}:{}) {}\n\n{}",
            self.source.name,
            pos.line() + 1,
            pos.column() + 1,
            self.error.item,
            self.excerpt(),
        )
    }
}

impl std::error::Error for SyntaxError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error.item)
    }
}

/// Parses a whole GraphQL document: executable definitions and/or type
/// system definitions.
///
/// # Errors
///
/// Fails on the first lexical or grammatical error; no partial document is
/// ever returned.
pub fn parse_document(source: &str, options: ParseOptions) -> Result<Document, SyntaxError> {
    let body = Arc::new(Source::new(source));
    parse_document_source(body, options)
}

/// Parses a [`Source`] (allowing a custom name for error reporting).
///
/// # Errors
///
/// See [`parse_document()`].
pub fn parse_document_source(
    source: Arc<Source>,
    options: ParseOptions,
) -> Result<Document, SyntaxError> {
    let res = Parser::new(Lexer::new(&source.body), options.no_location)
        .and_then(|mut parser| document::parse_document(&mut parser));

    match res {
        Ok(mut document) => {
            if !options.no_source {
                document.source = Some(source);
            }
            Ok(document)
        }
        Err(e) => {
            tracing::debug!(error = %e, "failed to parse GraphQL document");
            Err(SyntaxError::new(e, source))
        }
    }
}

/// Parses a single value literal, e.g. a default value.
///
/// With `is_const` set, variable references are a syntax error.
///
/// # Errors
///
/// Fails if the text is not exactly one value literal.
pub fn parse_value(source: &str, is_const: bool) -> Result<Arc<ValueNode>, SyntaxError> {
    parse_single(source, |p| value::parse_value_literal(p, is_const))
}

/// Parses a type reference, e.g. `[Int!]!`.
///
/// # Errors
///
/// Fails if the text is not exactly one type reference.
pub fn parse_type(source: &str) -> Result<Type, SyntaxError> {
    parse_single(source, |p| document::parse_type(p).map(|t| t.to_type()))
}

fn parse_single<T>(
    source: &str,
    f: impl FnOnce(&mut Parser<'_>) -> UnlocatedParseResult<T>,
) -> Result<T, SyntaxError> {
    let res = Parser::new(Lexer::new(source), false).and_then(|mut parser| {
        let item = f(&mut parser)?;
        if parser.peek().item != Token::EndOfFile {
            return Err(parser.unexpected());
        }
        Ok(item)
    });
    res.map_err(|e| SyntaxError::new(e, Arc::new(Source::new(source))))
}

impl FromStr for Type {
    type Err = SyntaxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_type(s)
    }
}
