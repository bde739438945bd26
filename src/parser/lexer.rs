use std::char;

use derive_more::with_trait::{Display, Error};

use crate::parser::{SourcePosition, Span, Spanning};

/// Tokenizer over a GraphQL source text.
///
/// Scanning is stateless given a position (see [`Lexer::next_token()`]), the
/// [`Iterator`] implementation is a convenience that remembers where the last
/// token ended.
#[doc(hidden)]
#[derive(Debug, Clone)]
pub struct Lexer<'a> {
    source: &'a str,
    position: SourcePosition,
    has_reached_eof: bool,
}

/// Scalar literal as written in the source, tagged with how it was scanned.
#[expect(missing_docs, reason = "self-explanatory")]
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum ScalarToken<'a> {
    /// Raw string literal, quotes and escapes included. See [`decode_string()`].
    String(&'a str),
    Float(&'a str),
    Int(&'a str),
}

/// Token of GraphQL source text.
#[expect(missing_docs, reason = "self-explanatory")]
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum Token<'a> {
    Name(&'a str),
    Scalar(ScalarToken<'a>),
    #[display("!")]
    ExclamationMark,
    #[display("$")]
    Dollar,
    #[display("(")]
    ParenOpen,
    #[display(")")]
    ParenClose,
    #[display("[")]
    BracketOpen,
    #[display("]")]
    BracketClose,
    #[display("{{")]
    CurlyOpen,
    #[display("}}")]
    CurlyClose,
    #[display("...")]
    Ellipsis,
    #[display(":")]
    Colon,
    #[display("=")]
    Equals,
    #[display("@")]
    At,
    #[display("|")]
    Pipe,
    #[display("End of file")]
    EndOfFile,
}

/// Failure to scan a token.
#[derive(Clone, Debug, Display, Eq, Error, PartialEq)]
pub enum LexerError {
    /// A character that has no place in GraphQL, such as `?` or `%`.
    #[display("Unknown character \"{_0}\"")]
    UnknownCharacter(#[error(not(source))] char),

    /// A GraphQL character in a position where no token can start with it,
    /// such as a lone `.`.
    #[display("Unexpected character \"{_0}\"")]
    UnexpectedCharacter(#[error(not(source))] char),

    /// A string literal missing its closing quote before a line break or the
    /// end of the source.
    #[display("Unterminated string literal")]
    UnterminatedString,

    /// A control character inside a string literal.
    #[display("Unknown character \"{}\" in string literal", _0.escape_unicode())]
    UnknownCharacterInString(#[error(not(source))] char),

    /// An escape sequence other than `\" \\ \/ \b \f \n \r \t \uXXXX`.
    #[display("Unknown escape sequence \"{_0}\" in string")]
    UnknownEscapeSequence(#[error(not(source))] String),

    /// The source ended in the middle of a token, as in `"1."`.
    #[display("Unexpected end of input")]
    UnexpectedEndOfFile,

    /// A leading zero followed by a digit (`012`), or a name character
    /// glued to a number (`12abc`).
    #[display("Invalid number literal")]
    InvalidNumber,
}

pub type LexerResult<'a> = Result<Spanning<Token<'a>>, Spanning<LexerError>>;

impl<'a> Lexer<'a> {
    #[doc(hidden)]
    pub fn new(source: &'a str) -> Lexer<'a> {
        Lexer {
            source,
            position: SourcePosition::new_origin(),
            has_reached_eof: false,
        }
    }

    /// Source text this [`Lexer`] scans.
    pub fn source(&self) -> &'a str {
        self.source
    }

    /// Scans the token starting at (or after the ignored characters following)
    /// the given `position`.
    ///
    /// The returned token's end position is where the next token should be
    /// scanned from.
    pub fn next_token(&self, position: SourcePosition) -> LexerResult<'a> {
        let mut cursor = Cursor {
            source: self.source,
            position,
        };
        cursor.scan_over_whitespace();

        let Some(ch) = cursor.peek_char() else {
            return Ok(Spanning::zero_width(&cursor.position, Token::EndOfFile));
        };

        match ch {
            '!' => Ok(cursor.emit_single_char(Token::ExclamationMark)),
            '$' => Ok(cursor.emit_single_char(Token::Dollar)),
            '(' => Ok(cursor.emit_single_char(Token::ParenOpen)),
            ')' => Ok(cursor.emit_single_char(Token::ParenClose)),
            '[' => Ok(cursor.emit_single_char(Token::BracketOpen)),
            ']' => Ok(cursor.emit_single_char(Token::BracketClose)),
            '{' => Ok(cursor.emit_single_char(Token::CurlyOpen)),
            '}' => Ok(cursor.emit_single_char(Token::CurlyClose)),
            ':' => Ok(cursor.emit_single_char(Token::Colon)),
            '=' => Ok(cursor.emit_single_char(Token::Equals)),
            '@' => Ok(cursor.emit_single_char(Token::At)),
            '|' => Ok(cursor.emit_single_char(Token::Pipe)),
            '.' => cursor.scan_ellipsis(),
            '"' => cursor.scan_string(),
            ch if is_number_start(ch) => cursor.scan_number(),
            ch if is_name_start(ch) => cursor.scan_name(),
            ch => Err(Spanning::zero_width(
                &cursor.position,
                LexerError::UnknownCharacter(ch),
            )),
        }
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = LexerResult<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.has_reached_eof {
            return None;
        }

        let res = self.next_token(self.position);
        match &res {
            Ok(token) => {
                self.position = token.end();
                if token.item == Token::EndOfFile {
                    self.has_reached_eof = true;
                }
            }
            // Scanning would restart at the same offset forever.
            Err(_) => self.has_reached_eof = true,
        }
        Some(res)
    }
}

struct Cursor<'a> {
    source: &'a str,
    position: SourcePosition,
}

impl<'a> Cursor<'a> {
    fn rest(&self) -> &'a str {
        self.source.get(self.position.index()..).unwrap_or_default()
    }

    fn peek_char(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn next_char(&mut self) -> Option<char> {
        let ch = self.peek_char()?;
        self.position.advance(ch);
        Some(ch)
    }

    fn unexpected_here(&self) -> Spanning<LexerError> {
        match self.peek_char() {
            Some(ch) => Spanning::zero_width(&self.position, LexerError::UnexpectedCharacter(ch)),
            None => Spanning::zero_width(&self.position, LexerError::UnexpectedEndOfFile),
        }
    }

    fn emit_single_char(&mut self, t: Token<'a>) -> Spanning<Token<'a>> {
        let start_pos = self.position;
        match self.next_char() {
            Some(ch) => Spanning::new(Span::single_width(start_pos, ch), t),
            None => Spanning::zero_width(&start_pos, t),
        }
    }

    fn scan_over_whitespace(&mut self) {
        while let Some(ch) = self.peek_char() {
            if ch == '\t' || ch == ' ' || ch == '\n' || ch == '\r' || ch == ',' || ch == '\u{feff}'
            {
                self.next_char();
            } else if ch == '#' {
                self.next_char();

                while let Some(ch) = self.peek_char() {
                    if ch == '\n' || ch == '\r' || !is_source_char(ch) {
                        break;
                    }
                    self.next_char();
                }
            } else {
                break;
            }
        }
    }

    fn scan_ellipsis(&mut self) -> LexerResult<'a> {
        let start_pos = self.position;

        for _ in 0..3 {
            match self.next_char() {
                Some('.') => {}
                Some(_) => {
                    return Err(Spanning::zero_width(
                        &start_pos,
                        LexerError::UnexpectedCharacter('.'),
                    ));
                }
                None => {
                    return Err(Spanning::zero_width(
                        &self.position,
                        LexerError::UnexpectedEndOfFile,
                    ));
                }
            }
        }

        Ok(Spanning::start_end(
            &start_pos,
            &self.position,
            Token::Ellipsis,
        ))
    }

    fn scan_name(&mut self) -> LexerResult<'a> {
        let start_pos = self.position;
        self.next_char();

        while let Some(ch) = self.peek_char() {
            if !is_name_cont(ch) {
                break;
            }
            self.next_char();
        }

        Ok(Spanning::start_end(
            &start_pos,
            &self.position,
            Token::Name(&self.source[start_pos.index()..self.position.index()]),
        ))
    }

    fn scan_string(&mut self) -> LexerResult<'a> {
        let start_pos = self.position;
        self.next_char();

        let mut escaped = false;
        let mut old_pos = self.position;
        while let Some(ch) = self.next_char() {
            match ch {
                'b' | 'f' | 'n' | 'r' | 't' | '\\' | '/' | '"' if escaped => {
                    escaped = false;
                }
                'u' if escaped => {
                    self.scan_escaped_unicode(&old_pos)?;
                    escaped = false;
                }
                c if escaped => {
                    return Err(Spanning::zero_width(
                        &old_pos,
                        LexerError::UnknownEscapeSequence(format!("\\{c}")),
                    ));
                }
                '\\' => escaped = true,
                '"' => {
                    return Ok(Spanning::start_end(
                        &start_pos,
                        &self.position,
                        Token::Scalar(ScalarToken::String(
                            &self.source[start_pos.index()..self.position.index()],
                        )),
                    ));
                }
                '\n' | '\r' => {
                    return Err(Spanning::zero_width(
                        &old_pos,
                        LexerError::UnterminatedString,
                    ));
                }
                c if !is_source_char(c) => {
                    return Err(Spanning::zero_width(
                        &old_pos,
                        LexerError::UnknownCharacterInString(c),
                    ));
                }
                _ => {}
            }
            old_pos = self.position;
        }

        Err(Spanning::zero_width(
            &self.position,
            LexerError::UnterminatedString,
        ))
    }

    fn scan_escaped_unicode(&mut self, start_pos: &SourcePosition) -> Result<(), Spanning<LexerError>> {
        let digits: String = self.rest().chars().take(4).collect();
        let invalid = || {
            Spanning::zero_width(
                start_pos,
                LexerError::UnknownEscapeSequence(format!("\\u{digits}")),
            )
        };

        if digits.chars().count() < 4 {
            return Err(Spanning::zero_width(
                &self.position,
                LexerError::UnterminatedString,
            ));
        }
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        let code_point = u32::from_str_radix(&digits, 16).map_err(|_| invalid())?;
        char::from_u32(code_point).ok_or_else(invalid)?;

        for _ in 0..4 {
            self.next_char();
        }
        Ok(())
    }

    fn scan_digits(&mut self) {
        while let Some(ch) = self.peek_char() {
            if !ch.is_ascii_digit() {
                break;
            }
            self.next_char();
        }
    }

    /// Consumes one or more digits.
    fn expect_digits(&mut self) -> Result<(), Spanning<LexerError>> {
        match self.peek_char() {
            Some(ch) if ch.is_ascii_digit() => {
                self.scan_digits();
                Ok(())
            }
            _ => Err(self.unexpected_here()),
        }
    }

    fn scan_number(&mut self) -> LexerResult<'a> {
        let start_pos = self.position;

        if self.peek_char() == Some('-') {
            self.next_char();
        }

        match self.peek_char() {
            Some('0') => {
                self.next_char();
                if matches!(self.peek_char(), Some(ch) if ch.is_ascii_digit()) {
                    return Err(Spanning::zero_width(
                        &self.position,
                        LexerError::InvalidNumber,
                    ));
                }
            }
            _ => self.expect_digits()?,
        }

        let mut is_float = false;

        if self.peek_char() == Some('.') {
            is_float = true;
            self.next_char();
            self.expect_digits()?;
        }

        if matches!(self.peek_char(), Some('e' | 'E')) {
            is_float = true;
            self.next_char();
            if matches!(self.peek_char(), Some('+' | '-')) {
                self.next_char();
            }
            self.expect_digits()?;
        }

        if matches!(self.peek_char(), Some(ch) if ch == '.' || is_name_start(ch)) {
            return Err(Spanning::zero_width(
                &self.position,
                LexerError::InvalidNumber,
            ));
        }

        let number = &self.source[start_pos.index()..self.position.index()];
        let token = if is_float {
            Token::Scalar(ScalarToken::Float(number))
        } else {
            Token::Scalar(ScalarToken::Int(number))
        };

        Ok(Spanning::start_end(&start_pos, &self.position, token))
    }
}

/// Decodes a raw string literal (as produced by the [`Lexer`], surrounding
/// quotes included) into its value.
///
/// Escape sequences are expected to be already validated by the [`Lexer`];
/// an invalid `\u` sequence decodes into [`char::REPLACEMENT_CHARACTER`].
pub fn decode_string(raw: &str) -> String {
    let inner = raw
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(raw);

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('b') => out.push('\u{0008}'),
            Some('f') => out.push('\u{000c}'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('u') => {
                let digits: String = chars.by_ref().take(4).collect();
                let decoded = u32::from_str_radix(&digits, 16)
                    .ok()
                    .and_then(char::from_u32)
                    .unwrap_or(char::REPLACEMENT_CHARACTER);
                out.push(decoded);
            }
            Some(c) => out.push(c),
            None => out.push('\\'),
        }
    }
    out
}

fn is_source_char(c: char) -> bool {
    c == '\t' || c == '\n' || c == '\r' || c >= ' '
}

fn is_name_start(c: char) -> bool {
    c == '_' || c.is_ascii_alphabetic()
}

fn is_name_cont(c: char) -> bool {
    is_name_start(c) || c.is_ascii_digit()
}

fn is_number_start(c: char) -> bool {
    c == '-' || c.is_ascii_digit()
}
