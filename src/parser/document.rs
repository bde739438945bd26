use std::sync::Arc;

use arcstr::ArcStr;

use crate::{
    ast::{
        Argument, Definition, Directive, DirectiveDefinition, Document, EnumTypeDefinition,
        EnumValueDefinition, Field, FieldDefinition, FragmentDefinition, FragmentSpread,
        InlineFragment, InputObjectTypeDefinition, InputValueDefinition, InterfaceTypeDefinition,
        ListType, NamedType, NonNullType, ObjectTypeDefinition, OperationDefinition,
        OperationType, OperationTypeDefinition, ScalarTypeDefinition, SchemaDefinition, Selection,
        SelectionSet, TypeExtensionDefinition, TypeNode, UnionTypeDefinition, VariableDefinition,
    },
    parser::{
        value::parse_value_literal, ParseError, Parser, Spanning, Token, UnlocatedParseResult,
    },
};

pub(super) fn parse_document(parser: &mut Parser<'_>) -> UnlocatedParseResult<Document> {
    let start = parser.peek().span.start;
    let mut definitions = Vec::new();

    loop {
        definitions.push(parse_definition(parser)?);

        if parser.peek().item == Token::EndOfFile {
            return Ok(Document {
                definitions,
                span: parser.span_from(start),
                source: None,
            });
        }
    }
}

fn parse_definition(parser: &mut Parser<'_>) -> UnlocatedParseResult<Definition> {
    match parser.peek().item {
        Token::CurlyOpen
        | Token::Name("query")
        | Token::Name("mutation")
        | Token::Name("subscription") => {
            Ok(Definition::Operation(parse_operation_definition(parser)?))
        }
        Token::Name("fragment") => Ok(Definition::Fragment(parse_fragment_definition(parser)?)),
        Token::Name("schema") => Ok(Definition::Schema(parse_schema_definition(parser)?)),
        Token::Name("scalar") => Ok(Definition::Scalar(parse_scalar_type_definition(parser)?)),
        Token::Name("type") => Ok(Definition::Object(parse_object_type_definition(parser)?)),
        Token::Name("interface") => Ok(Definition::Interface(
            parse_interface_type_definition(parser)?,
        )),
        Token::Name("union") => Ok(Definition::Union(parse_union_type_definition(parser)?)),
        Token::Name("enum") => Ok(Definition::Enum(parse_enum_type_definition(parser)?)),
        Token::Name("input") => Ok(Definition::InputObject(
            parse_input_object_type_definition(parser)?,
        )),
        Token::Name("extend") => Ok(Definition::TypeExtension(
            parse_type_extension_definition(parser)?,
        )),
        Token::Name("directive") => Ok(Definition::Directive(
            parse_directive_definition(parser)?,
        )),
        _ => Err(parser.unexpected()),
    }
}

fn parse_operation_definition(
    parser: &mut Parser<'_>,
) -> UnlocatedParseResult<Arc<OperationDefinition>> {
    let start = parser.peek().span.start;

    if parser.peek().item == Token::CurlyOpen {
        let selection_set = parse_selection_set(parser)?;

        Ok(Arc::new(OperationDefinition {
            operation: OperationType::Query,
            name: None,
            variable_definitions: Vec::new(),
            directives: Vec::new(),
            selection_set,
            span: parser.span_from(start),
        }))
    } else {
        let operation = parse_operation_type(parser)?.item;
        let name = match parser.peek().item {
            Token::Name(_) => Some(parser.parse_name()?),
            _ => None,
        };
        let variable_definitions = parse_variable_definitions(parser)?;
        let directives = parse_directives(parser)?;
        let selection_set = parse_selection_set(parser)?;

        Ok(Arc::new(OperationDefinition {
            operation,
            name,
            variable_definitions,
            directives,
            selection_set,
            span: parser.span_from(start),
        }))
    }
}

fn parse_fragment_definition(
    parser: &mut Parser<'_>,
) -> UnlocatedParseResult<Arc<FragmentDefinition>> {
    let start = parser.expect_keyword("fragment")?.span.start;
    let name = parse_fragment_name(parser)?;

    parser.expect_keyword("on")?;
    let type_condition = parse_named_type(parser)?;
    let directives = parse_directives(parser)?;
    let selection_set = parse_selection_set(parser)?;

    Ok(Arc::new(FragmentDefinition {
        name,
        type_condition,
        directives,
        selection_set,
        span: parser.span_from(start),
    }))
}

fn parse_fragment_name(parser: &mut Parser<'_>) -> UnlocatedParseResult<Spanning<ArcStr>> {
    if parser.peek_keyword("on") {
        return Err(Spanning::new(
            parser.peek().span,
            ParseError::ReservedName("on".into()),
        ));
    }
    parser.parse_name()
}

fn parse_optional_selection_set(
    parser: &mut Parser<'_>,
) -> UnlocatedParseResult<Option<Arc<SelectionSet>>> {
    if parser.peek().item == Token::CurlyOpen {
        Ok(Some(parse_selection_set(parser)?))
    } else {
        Ok(None)
    }
}

fn parse_selection_set(parser: &mut Parser<'_>) -> UnlocatedParseResult<Arc<SelectionSet>> {
    let selections =
        parser.delimited_nonempty_list(&Token::CurlyOpen, parse_selection, &Token::CurlyClose)?;

    Ok(Arc::new(SelectionSet {
        span: parser.locate(selections.span),
        selections: selections.item,
    }))
}

fn parse_selection(parser: &mut Parser<'_>) -> UnlocatedParseResult<Selection> {
    match parser.peek().item {
        Token::Ellipsis => parse_fragment(parser),
        _ => parse_field(parser).map(Selection::Field),
    }
}

fn parse_fragment(parser: &mut Parser<'_>) -> UnlocatedParseResult<Selection> {
    let start = parser.expect(&Token::Ellipsis)?.span.start;

    match parser.peek().item {
        Token::Name(name) if name != "on" => {
            let name = parser.parse_name()?;
            let directives = parse_directives(parser)?;

            Ok(Selection::FragmentSpread(Arc::new(FragmentSpread {
                name,
                directives,
                span: parser.span_from(start),
            })))
        }
        _ => {
            let type_condition = if parser.peek_keyword("on") {
                parser.next_token()?;
                Some(parse_named_type(parser)?)
            } else {
                None
            };
            let directives = parse_directives(parser)?;
            let selection_set = parse_selection_set(parser)?;

            Ok(Selection::InlineFragment(Arc::new(InlineFragment {
                type_condition,
                directives,
                selection_set,
                span: parser.span_from(start),
            })))
        }
    }
}

fn parse_field(parser: &mut Parser<'_>) -> UnlocatedParseResult<Arc<Field>> {
    let start = parser.peek().span.start;
    let mut alias = Some(parser.parse_name()?);

    let name = if parser.skip(&Token::Colon)?.is_some() {
        parser.parse_name()?
    } else {
        alias.take().ok_or_else(|| parser.unexpected())?
    };

    let arguments = parse_arguments(parser, false)?;
    let directives = parse_directives(parser)?;
    let selection_set = parse_optional_selection_set(parser)?;

    Ok(Arc::new(Field {
        alias,
        name,
        arguments,
        directives,
        selection_set,
        span: parser.span_from(start),
    }))
}

fn parse_arguments(parser: &mut Parser<'_>, is_const: bool) -> UnlocatedParseResult<Vec<Arc<Argument>>> {
    if parser.peek().item != Token::ParenOpen {
        return Ok(Vec::new());
    }

    parser.unlocated_delimited_nonempty_list(
        &Token::ParenOpen,
        |p| parse_argument(p, is_const),
        &Token::ParenClose,
    )
}

fn parse_argument(parser: &mut Parser<'_>, is_const: bool) -> UnlocatedParseResult<Arc<Argument>> {
    let start = parser.peek().span.start;
    let name = parser.parse_name()?;
    parser.expect(&Token::Colon)?;
    let value = parse_value_literal(parser, is_const)?;

    Ok(Arc::new(Argument {
        name,
        value,
        span: parser.span_from(start),
    }))
}

fn parse_operation_type(parser: &mut Parser<'_>) -> UnlocatedParseResult<Spanning<OperationType>> {
    match parser.peek().item {
        Token::Name("query") => Ok(parser.next_token()?.map(|_| OperationType::Query)),
        Token::Name("mutation") => Ok(parser.next_token()?.map(|_| OperationType::Mutation)),
        Token::Name("subscription") => {
            Ok(parser.next_token()?.map(|_| OperationType::Subscription))
        }
        _ => Err(parser.unexpected()),
    }
}

fn parse_variable_definitions(
    parser: &mut Parser<'_>,
) -> UnlocatedParseResult<Vec<Arc<VariableDefinition>>> {
    if parser.peek().item != Token::ParenOpen {
        return Ok(Vec::new());
    }

    parser.unlocated_delimited_nonempty_list(
        &Token::ParenOpen,
        parse_variable_definition,
        &Token::ParenClose,
    )
}

fn parse_variable_definition(
    parser: &mut Parser<'_>,
) -> UnlocatedParseResult<Arc<VariableDefinition>> {
    let start = parser.expect(&Token::Dollar)?.span.start;
    let name = parser.expect_name()?;
    let variable = Spanning::new(
        parser.span_from(start),
        ArcStr::from(name.item),
    );
    parser.expect(&Token::Colon)?;
    let var_type = parse_type(parser)?;

    let default_value = if parser.skip(&Token::Equals)?.is_some() {
        Some(parse_value_literal(parser, true)?)
    } else {
        None
    };

    Ok(Arc::new(VariableDefinition {
        variable,
        var_type,
        default_value,
        span: parser.span_from(start),
    }))
}

fn parse_directives(parser: &mut Parser<'_>) -> UnlocatedParseResult<Vec<Arc<Directive>>> {
    let mut items = Vec::new();
    while parser.peek().item == Token::At {
        items.push(parse_directive(parser)?);
    }
    Ok(items)
}

fn parse_directive(parser: &mut Parser<'_>) -> UnlocatedParseResult<Arc<Directive>> {
    let start = parser.expect(&Token::At)?.span.start;
    let name = parser.parse_name()?;
    let arguments = parse_arguments(parser, false)?;

    Ok(Arc::new(Directive {
        name,
        arguments,
        span: parser.span_from(start),
    }))
}

pub(super) fn parse_named_type(parser: &mut Parser<'_>) -> UnlocatedParseResult<Arc<NamedType>> {
    Ok(Arc::new(NamedType {
        name: parser.parse_name()?,
    }))
}

pub(super) fn parse_type(parser: &mut Parser<'_>) -> UnlocatedParseResult<TypeNode> {
    let start = parser.peek().span.start;

    let inner = if parser.skip(&Token::BracketOpen)?.is_some() {
        let of_type = parse_type(parser)?;
        parser.expect(&Token::BracketClose)?;
        TypeNode::List(Arc::new(ListType {
            of_type,
            span: parser.span_from(start),
        }))
    } else {
        TypeNode::Named(parse_named_type(parser)?)
    };

    if parser.peek().item == Token::ExclamationMark {
        parser.next_token()?;
        Ok(TypeNode::NonNull(Arc::new(NonNullType {
            of_type: inner,
            span: parser.span_from(start),
        })))
    } else {
        Ok(inner)
    }
}

fn parse_schema_definition(parser: &mut Parser<'_>) -> UnlocatedParseResult<Arc<SchemaDefinition>> {
    let start = parser.expect_keyword("schema")?.span.start;
    let directives = parse_directives(parser)?;
    let operation_types = parser
        .delimited_nonempty_list(
            &Token::CurlyOpen,
            parse_operation_type_definition,
            &Token::CurlyClose,
        )?
        .item;

    Ok(Arc::new(SchemaDefinition {
        directives,
        operation_types,
        span: parser.span_from(start),
    }))
}

fn parse_operation_type_definition(
    parser: &mut Parser<'_>,
) -> UnlocatedParseResult<Arc<OperationTypeDefinition>> {
    let start = parser.peek().span.start;
    let operation = parse_operation_type(parser)?.item;
    parser.expect(&Token::Colon)?;
    let type_name = parse_named_type(parser)?;

    Ok(Arc::new(OperationTypeDefinition {
        operation,
        type_name,
        span: parser.span_from(start),
    }))
}

fn parse_scalar_type_definition(
    parser: &mut Parser<'_>,
) -> UnlocatedParseResult<Arc<ScalarTypeDefinition>> {
    let start = parser.expect_keyword("scalar")?.span.start;
    let name = parser.parse_name()?;
    let directives = parse_directives(parser)?;

    Ok(Arc::new(ScalarTypeDefinition {
        name,
        directives,
        span: parser.span_from(start),
    }))
}

fn parse_object_type_definition(
    parser: &mut Parser<'_>,
) -> UnlocatedParseResult<Arc<ObjectTypeDefinition>> {
    let start = parser.expect_keyword("type")?.span.start;
    let name = parser.parse_name()?;

    let mut interfaces = Vec::new();
    if parser.peek_keyword("implements") {
        parser.next_token()?;
        loop {
            interfaces.push(parse_named_type(parser)?);
            if !matches!(parser.peek().item, Token::Name(_)) {
                break;
            }
        }
    }

    let directives = parse_directives(parser)?;
    let fields = parser
        .delimited_list(&Token::CurlyOpen, parse_field_definition, &Token::CurlyClose)?
        .item;

    Ok(Arc::new(ObjectTypeDefinition {
        name,
        interfaces,
        directives,
        fields,
        span: parser.span_from(start),
    }))
}

fn parse_field_definition(parser: &mut Parser<'_>) -> UnlocatedParseResult<Arc<FieldDefinition>> {
    let start = parser.peek().span.start;
    let name = parser.parse_name()?;
    let arguments = parse_argument_definitions(parser)?;
    parser.expect(&Token::Colon)?;
    let field_type = parse_type(parser)?;
    let directives = parse_directives(parser)?;

    Ok(Arc::new(FieldDefinition {
        name,
        arguments,
        field_type,
        directives,
        span: parser.span_from(start),
    }))
}

fn parse_argument_definitions(
    parser: &mut Parser<'_>,
) -> UnlocatedParseResult<Vec<Arc<InputValueDefinition>>> {
    if parser.peek().item != Token::ParenOpen {
        return Ok(Vec::new());
    }

    Ok(parser
        .delimited_nonempty_list(
            &Token::ParenOpen,
            parse_input_value_definition,
            &Token::ParenClose,
        )?
        .item)
}

fn parse_input_value_definition(
    parser: &mut Parser<'_>,
) -> UnlocatedParseResult<Arc<InputValueDefinition>> {
    let start = parser.peek().span.start;
    let name = parser.parse_name()?;
    parser.expect(&Token::Colon)?;
    let value_type = parse_type(parser)?;
    let default_value = if parser.skip(&Token::Equals)?.is_some() {
        Some(parse_value_literal(parser, true)?)
    } else {
        None
    };
    let directives = parse_directives(parser)?;

    Ok(Arc::new(InputValueDefinition {
        name,
        value_type,
        default_value,
        directives,
        span: parser.span_from(start),
    }))
}

fn parse_interface_type_definition(
    parser: &mut Parser<'_>,
) -> UnlocatedParseResult<Arc<InterfaceTypeDefinition>> {
    let start = parser.expect_keyword("interface")?.span.start;
    let name = parser.parse_name()?;
    let directives = parse_directives(parser)?;
    let fields = parser
        .delimited_list(&Token::CurlyOpen, parse_field_definition, &Token::CurlyClose)?
        .item;

    Ok(Arc::new(InterfaceTypeDefinition {
        name,
        directives,
        fields,
        span: parser.span_from(start),
    }))
}

fn parse_union_type_definition(
    parser: &mut Parser<'_>,
) -> UnlocatedParseResult<Arc<UnionTypeDefinition>> {
    let start = parser.expect_keyword("union")?.span.start;
    let name = parser.parse_name()?;
    let directives = parse_directives(parser)?;
    parser.expect(&Token::Equals)?;

    let mut types = vec![parse_named_type(parser)?];
    while parser.peek().item == Token::Pipe {
        parser.next_token()?;
        types.push(parse_named_type(parser)?);
    }

    Ok(Arc::new(UnionTypeDefinition {
        name,
        directives,
        types,
        span: parser.span_from(start),
    }))
}

fn parse_enum_type_definition(
    parser: &mut Parser<'_>,
) -> UnlocatedParseResult<Arc<EnumTypeDefinition>> {
    let start = parser.expect_keyword("enum")?.span.start;
    let name = parser.parse_name()?;
    let directives = parse_directives(parser)?;
    let values = parser
        .delimited_nonempty_list(
            &Token::CurlyOpen,
            parse_enum_value_definition,
            &Token::CurlyClose,
        )?
        .item;

    Ok(Arc::new(EnumTypeDefinition {
        name,
        directives,
        values,
        span: parser.span_from(start),
    }))
}

fn parse_enum_value_definition(
    parser: &mut Parser<'_>,
) -> UnlocatedParseResult<Arc<EnumValueDefinition>> {
    let start = parser.peek().span.start;
    let name = parser.parse_name()?;
    let directives = parse_directives(parser)?;

    Ok(Arc::new(EnumValueDefinition {
        name,
        directives,
        span: parser.span_from(start),
    }))
}

fn parse_input_object_type_definition(
    parser: &mut Parser<'_>,
) -> UnlocatedParseResult<Arc<InputObjectTypeDefinition>> {
    let start = parser.expect_keyword("input")?.span.start;
    let name = parser.parse_name()?;
    let directives = parse_directives(parser)?;
    let fields = parser
        .delimited_list(
            &Token::CurlyOpen,
            parse_input_value_definition,
            &Token::CurlyClose,
        )?
        .item;

    Ok(Arc::new(InputObjectTypeDefinition {
        name,
        directives,
        fields,
        span: parser.span_from(start),
    }))
}

fn parse_type_extension_definition(
    parser: &mut Parser<'_>,
) -> UnlocatedParseResult<Arc<TypeExtensionDefinition>> {
    let start = parser.expect_keyword("extend")?.span.start;
    let definition = parse_object_type_definition(parser)?;

    Ok(Arc::new(TypeExtensionDefinition {
        definition,
        span: parser.span_from(start),
    }))
}

fn parse_directive_definition(
    parser: &mut Parser<'_>,
) -> UnlocatedParseResult<Arc<DirectiveDefinition>> {
    let start = parser.expect_keyword("directive")?.span.start;
    parser.expect(&Token::At)?;
    let name = parser.parse_name()?;
    let arguments = parse_argument_definitions(parser)?;
    parser.expect_keyword("on")?;

    let mut locations = vec![parser.parse_name()?];
    while parser.peek().item == Token::Pipe {
        parser.next_token()?;
        locations.push(parser.parse_name()?);
    }

    Ok(Arc::new(DirectiveDefinition {
        name,
        arguments,
        locations,
        span: parser.span_from(start),
    }))
}
