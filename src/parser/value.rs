use std::sync::Arc;

use arcstr::ArcStr;

use crate::{
    ast::{InputValue, ObjectField, ValueNode},
    parser::{lexer::decode_string, Parser, ScalarToken, Spanning, Token, UnlocatedParseResult},
};

/// Parses a value literal. With `is_const` set, variable references are rejected.
pub fn parse_value_literal(
    parser: &mut Parser<'_>,
    is_const: bool,
) -> UnlocatedParseResult<Arc<ValueNode>> {
    let start = parser.peek().span.start;
    let value = match parser.peek().item {
        Token::BracketOpen => parse_list_literal(parser, is_const)?,
        Token::CurlyOpen => parse_object_literal(parser, is_const)?,
        Token::Dollar if !is_const => {
            parser.next_token()?;
            InputValue::Variable(ArcStr::from(parser.expect_name()?.item))
        }
        Token::Scalar(scalar) => {
            parser.next_token()?;
            match scalar {
                ScalarToken::Int(raw) => InputValue::Int(ArcStr::from(raw)),
                ScalarToken::Float(raw) => InputValue::Float(ArcStr::from(raw)),
                ScalarToken::String(raw) => InputValue::String(decode_string(raw)),
            }
        }
        Token::Name(name) => {
            parser.next_token()?;
            match name {
                "true" => InputValue::Boolean(true),
                "false" => InputValue::Boolean(false),
                "null" => InputValue::Null,
                name => InputValue::Enum(ArcStr::from(name)),
            }
        }
        _ => return Err(parser.unexpected()),
    };

    Ok(Arc::new(Spanning::new(parser.span_from(start), value)))
}

fn parse_list_literal(parser: &mut Parser<'_>, is_const: bool) -> UnlocatedParseResult<InputValue> {
    Ok(InputValue::List(
        parser
            .delimited_list(
                &Token::BracketOpen,
                |p| parse_value_literal(p, is_const),
                &Token::BracketClose,
            )?
            .item,
    ))
}

fn parse_object_literal(parser: &mut Parser<'_>, is_const: bool) -> UnlocatedParseResult<InputValue> {
    Ok(InputValue::Object(
        parser
            .delimited_list(
                &Token::CurlyOpen,
                |p| parse_object_field(p, is_const),
                &Token::CurlyClose,
            )?
            .item,
    ))
}

fn parse_object_field(parser: &mut Parser<'_>, is_const: bool) -> UnlocatedParseResult<Arc<ObjectField>> {
    let start = parser.peek().span.start;
    let name = parser.parse_name()?;

    parser.expect(&Token::Colon)?;

    let value = parse_value_literal(parser, is_const)?;

    Ok(Arc::new(ObjectField {
        name,
        value,
        span: parser.span_from(start),
    }))
}
