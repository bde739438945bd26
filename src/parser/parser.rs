use arcstr::ArcStr;
use derive_more::with_trait::{Display, Error, From};

use crate::parser::{Lexer, LexerError, SourcePosition, Span, Spanning, Token};

/// Error while parsing a GraphQL query
#[derive(Clone, Debug, Display, Eq, Error, From, PartialEq)]
pub enum ParseError {
    /// An unexpected token occurred in the source
    #[display("Unexpected \"{_0}\"")]
    #[from(ignore)]
    UnexpectedToken(#[error(not(source))] String),

    /// The input source abruptly ended
    #[display("Unexpected end of input")]
    #[from(ignore)]
    UnexpectedEndOfFile,

    /// An error during tokenization occurred
    LexerError(LexerError),

    /// A keyword was used where it is reserved, e.g. a fragment named `on`.
    #[display("Unexpected name \"{_0}\"")]
    #[from(ignore)]
    ReservedName(#[error(not(source))] String),
}

impl ParseError {
    /// Creates a [`ParseError::UnexpectedToken`] out of the provided [`Token`].
    #[must_use]
    pub fn unexpected_token(token: Token<'_>) -> Self {
        Self::UnexpectedToken(token.to_string())
    }
}

#[doc(hidden)]
pub type ParseResult<T> = Result<Spanning<T>, Spanning<ParseError>>;

#[doc(hidden)]
pub type UnlocatedParseResult<T> = Result<T, Spanning<ParseError>>;

#[doc(hidden)]
pub type OptionParseResult<T> = Result<Option<Spanning<T>>, Spanning<ParseError>>;

/// Recursive-descent parser state: the lexer and one token of lookahead.
#[doc(hidden)]
#[derive(Debug)]
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Spanning<Token<'a>>,
    last_end: SourcePosition,
    no_location: bool,
}

impl<'a> Parser<'a> {
    #[doc(hidden)]
    pub fn new(mut lexer: Lexer<'a>, no_location: bool) -> Result<Parser<'a>, Spanning<ParseError>> {
        let current = Self::pull(&mut lexer)?;
        Ok(Parser {
            lexer,
            current,
            last_end: SourcePosition::new_origin(),
            no_location,
        })
    }

    fn pull(lexer: &mut Lexer<'a>) -> ParseResult<Token<'a>> {
        match lexer.next() {
            Some(Ok(token)) => Ok(token),
            Some(Err(e)) => Err(e.map(ParseError::LexerError)),
            None => Err(Spanning::zero_width(
                &SourcePosition::new(lexer.source().len(), 0, 0),
                ParseError::UnexpectedEndOfFile,
            )),
        }
    }

    #[doc(hidden)]
    pub fn peek(&self) -> &Spanning<Token<'a>> {
        &self.current
    }

    #[doc(hidden)]
    pub fn next_token(&mut self) -> ParseResult<Token<'a>> {
        if self.current.item == Token::EndOfFile {
            return Err(Spanning::new(
                self.current.span,
                ParseError::UnexpectedEndOfFile,
            ));
        }
        let next = Self::pull(&mut self.lexer)?;
        let token = std::mem::replace(&mut self.current, next);
        self.last_end = token.end();
        Ok(token)
    }

    #[doc(hidden)]
    pub fn expect(&mut self, expected: &Token) -> ParseResult<Token<'a>> {
        if &self.peek().item != expected {
            Err(self.unexpected())
        } else {
            self.next_token()
        }
    }

    #[doc(hidden)]
    pub fn skip(
        &mut self,
        expected: &Token,
    ) -> Result<Option<Spanning<Token<'a>>>, Spanning<ParseError>> {
        if &self.peek().item == expected {
            Ok(Some(self.next_token()?))
        } else if self.peek().item == Token::EndOfFile {
            Err(Spanning::zero_width(
                &self.peek().span.start,
                ParseError::UnexpectedEndOfFile,
            ))
        } else {
            Ok(None)
        }
    }

    /// Error for the current lookahead token, which nothing accepted.
    #[doc(hidden)]
    pub fn unexpected(&self) -> Spanning<ParseError> {
        match self.peek().item {
            Token::EndOfFile => Spanning::new(self.peek().span, ParseError::UnexpectedEndOfFile),
            token => Spanning::new(self.peek().span, ParseError::unexpected_token(token)),
        }
    }

    #[doc(hidden)]
    pub fn delimited_list<T, F>(
        &mut self,
        opening: &Token,
        parser: F,
        closing: &Token,
    ) -> ParseResult<Vec<T>>
    where
        F: Fn(&mut Parser<'a>) -> UnlocatedParseResult<T>,
    {
        let start_pos = self.expect(opening)?.span.start;
        let mut items = Vec::new();

        loop {
            if let Some(Spanning { span, .. }) = self.skip(closing)? {
                return Ok(Spanning::start_end(&start_pos, &span.end, items));
            }

            items.push(parser(self)?);
        }
    }

    #[doc(hidden)]
    pub fn delimited_nonempty_list<T, F>(
        &mut self,
        opening: &Token,
        parser: F,
        closing: &Token,
    ) -> ParseResult<Vec<T>>
    where
        F: Fn(&mut Parser<'a>) -> UnlocatedParseResult<T>,
    {
        let start_pos = self.expect(opening)?.span.start;
        let mut items = Vec::new();

        loop {
            items.push(parser(self)?);

            if let Some(end_spanning) = self.skip(closing)? {
                return Ok(Spanning::start_end(&start_pos, &end_spanning.end(), items));
            }
        }
    }

    #[doc(hidden)]
    pub fn unlocated_delimited_nonempty_list<T, F>(
        &mut self,
        opening: &Token,
        parser: F,
        closing: &Token,
    ) -> UnlocatedParseResult<Vec<T>>
    where
        F: Fn(&mut Parser<'a>) -> UnlocatedParseResult<T>,
    {
        self.expect(opening)?;
        let mut items = Vec::new();

        loop {
            items.push(parser(self)?);

            if self.skip(closing)?.is_some() {
                return Ok(items);
            }
        }
    }

    #[doc(hidden)]
    pub fn expect_name(&mut self) -> ParseResult<&'a str> {
        match self.peek().item {
            Token::Name(name) => {
                let span = self.next_token()?.span;
                Ok(Spanning::new(span, name))
            }
            _ => Err(self.unexpected()),
        }
    }

    /// Parses a name into the form stored in the syntax tree.
    #[doc(hidden)]
    pub fn parse_name(&mut self) -> UnlocatedParseResult<Spanning<ArcStr>> {
        let name = self.expect_name()?;
        Ok(Spanning::new(self.locate(name.span), ArcStr::from(name.item)))
    }

    /// Whether the lookahead is the given keyword.
    #[doc(hidden)]
    pub fn peek_keyword(&self, keyword: &str) -> bool {
        matches!(self.peek().item, Token::Name(name) if name == keyword)
    }

    #[doc(hidden)]
    pub fn expect_keyword(&mut self, keyword: &str) -> ParseResult<Token<'a>> {
        if self.peek_keyword(keyword) {
            self.next_token()
        } else {
            Err(self.unexpected())
        }
    }

    /// The span to store in the syntax tree for the given source range.
    #[doc(hidden)]
    pub fn locate(&self, span: Span) -> Span {
        if self.no_location {
            Span::unlocated()
        } else {
            span
        }
    }

    /// The stored span from `start` up to the end of the last consumed token.
    #[doc(hidden)]
    pub fn span_from(&self, start: SourcePosition) -> Span {
        self.locate(Span::new(start, self.last_end))
    }
}
