//! Renders syntax trees back into GraphQL text.
//!
//! Output is canonical: two-space indentation, one selection per line and
//! no comments. Printing a parsed document and parsing the result again
//! yields a structurally equal tree.

use std::{fmt, fmt::Write as _, sync::Arc};

use itertools::Itertools as _;

use crate::ast::{
    Argument, Definition, Directive, DirectiveDefinition, Document, EnumTypeDefinition,
    EnumValueDefinition, Field, FieldDefinition, FragmentDefinition, FragmentSpread,
    InlineFragment, InputObjectTypeDefinition, InputValue, InputValueDefinition,
    InterfaceTypeDefinition, Node, ObjectField, ObjectTypeDefinition, OperationDefinition,
    OperationType, OperationTypeDefinition, ScalarTypeDefinition, SchemaDefinition, Selection,
    SelectionSet, TypeExtensionDefinition, TypeNode, UnionTypeDefinition, ValueNode,
    VariableDefinition,
};

fn indent(s: &str) -> String {
    format!("  {}", s.replace('\n', "\n  "))
}

fn block<I: IntoIterator<Item = String>>(lines: I) -> String {
    let body = lines.into_iter().join("\n");
    if body.is_empty() {
        "{}".into()
    } else {
        format!("{{\n{}\n}}", indent(&body))
    }
}

/// Concatenates the non-empty parts with `sep`.
fn join_parts<'a, I: IntoIterator<Item = &'a str>>(parts: I, sep: &str) -> String {
    parts.into_iter().filter(|p| !p.is_empty()).join(sep)
}

/// `start` + `s` + `end` if `s` is not empty, nothing otherwise.
fn wrap(start: &str, s: &str, end: &str) -> String {
    if s.is_empty() {
        String::new()
    } else {
        format!("{start}{s}{end}")
    }
}

fn directives(dirs: &[Arc<Directive>]) -> String {
    dirs.iter().map(|d| directive(d)).join(" ")
}

fn directive(d: &Directive) -> String {
    format!(
        "@{}{}",
        d.name.item,
        wrap("(", &d.arguments.iter().map(|a| argument(a)).join(", "), ")"),
    )
}

fn argument(a: &Argument) -> String {
    format!("{}: {}", a.name.item, value(&a.value))
}

fn value(v: &ValueNode) -> String {
    v.item.to_string()
}

fn object_field(f: &ObjectField) -> String {
    format!("{}: {}", f.name.item, value(&f.value))
}

fn type_node(t: &TypeNode) -> String {
    match t {
        TypeNode::Named(n) => n.name.item.to_string(),
        TypeNode::List(l) => format!("[{}]", type_node(&l.of_type)),
        TypeNode::NonNull(nn) => format!("{}!", type_node(&nn.of_type)),
    }
}

fn operation(op: &OperationDefinition) -> String {
    let name = op.name.as_ref().map(|n| n.item.as_str()).unwrap_or_default();
    let vars = wrap(
        "(",
        &op.variable_definitions
            .iter()
            .map(|v| variable_definition(v))
            .join(", "),
        ")",
    );
    let dirs = directives(&op.directives);
    let set = selection_set(&op.selection_set);

    if name.is_empty() && vars.is_empty() && dirs.is_empty() && op.operation == OperationType::Query {
        set
    } else {
        let head = format!("{}{vars}", join_parts([&*op.operation.to_string(), name], " "));
        join_parts([head.as_str(), &dirs, &set], " ")
    }
}

fn variable_definition(v: &VariableDefinition) -> String {
    format!(
        "${}: {}{}",
        v.variable.item,
        type_node(&v.var_type),
        v.default_value
            .as_ref()
            .map(|d| format!(" = {}", value(d)))
            .unwrap_or_default(),
    )
}

fn selection_set(set: &SelectionSet) -> String {
    block(set.selections.iter().map(selection))
}

fn selection(s: &Selection) -> String {
    match s {
        Selection::Field(f) => field(f),
        Selection::FragmentSpread(s) => fragment_spread(s),
        Selection::InlineFragment(i) => inline_fragment(i),
    }
}

fn field(f: &Field) -> String {
    let head = format!(
        "{}{}{}",
        wrap("", f.alias.as_ref().map(|a| a.item.as_str()).unwrap_or_default(), ": "),
        f.name.item,
        wrap("(", &f.arguments.iter().map(|a| argument(a)).join(", "), ")"),
    );
    let set = f.selection_set.as_ref().map(|s| selection_set(s)).unwrap_or_default();
    join_parts([head.as_str(), &directives(&f.directives), &set], " ")
}

fn fragment_spread(s: &FragmentSpread) -> String {
    format!("...{}{}", s.name.item, wrap(" ", &directives(&s.directives), ""))
}

fn inline_fragment(i: &InlineFragment) -> String {
    let cond = i
        .type_condition
        .as_ref()
        .map(|t| format!("on {}", t.name.item))
        .unwrap_or_default();
    join_parts(
        ["...", &cond, &directives(&i.directives), &selection_set(&i.selection_set)],
        " ",
    )
}

fn fragment_definition(f: &FragmentDefinition) -> String {
    join_parts(
        [
            &*format!("fragment {} on {}", f.name.item, f.type_condition.name.item),
            &directives(&f.directives),
            &selection_set(&f.selection_set),
        ],
        " ",
    )
}

fn schema_definition(s: &SchemaDefinition) -> String {
    join_parts(
        [
            "schema",
            &directives(&s.directives),
            &block(s.operation_types.iter().map(|o| operation_type_definition(o))),
        ],
        " ",
    )
}

fn operation_type_definition(o: &OperationTypeDefinition) -> String {
    format!("{}: {}", o.operation, o.type_name.name.item)
}

fn scalar_definition(s: &ScalarTypeDefinition) -> String {
    join_parts(["scalar", &s.name.item, &directives(&s.directives)], " ")
}

fn object_definition(o: &ObjectTypeDefinition) -> String {
    join_parts(
        [
            "type",
            &o.name.item,
            &wrap(
                "implements ",
                &o.interfaces.iter().map(|i| i.name.item.as_str()).join(", "),
                "",
            ),
            &directives(&o.directives),
            &block(o.fields.iter().map(|f| field_definition(f))),
        ],
        " ",
    )
}

fn field_definition(f: &FieldDefinition) -> String {
    format!(
        "{}{}: {}{}",
        f.name.item,
        wrap(
            "(",
            &f.arguments.iter().map(|a| input_value_definition(a)).join(", "),
            ")",
        ),
        type_node(&f.field_type),
        wrap(" ", &directives(&f.directives), ""),
    )
}

fn input_value_definition(i: &InputValueDefinition) -> String {
    join_parts(
        [
            &*format!("{}: {}", i.name.item, type_node(&i.value_type)),
            &i.default_value
                .as_ref()
                .map(|d| format!("= {}", value(d)))
                .unwrap_or_default(),
            &directives(&i.directives),
        ],
        " ",
    )
}

fn interface_definition(i: &InterfaceTypeDefinition) -> String {
    join_parts(
        [
            "interface",
            &i.name.item,
            &directives(&i.directives),
            &block(i.fields.iter().map(|f| field_definition(f))),
        ],
        " ",
    )
}

fn union_definition(u: &UnionTypeDefinition) -> String {
    join_parts(
        [
            "union",
            &u.name.item,
            &directives(&u.directives),
            &wrap("= ", &u.types.iter().map(|t| t.name.item.as_str()).join(" | "), ""),
        ],
        " ",
    )
}

fn enum_definition(e: &EnumTypeDefinition) -> String {
    join_parts(
        [
            "enum",
            &e.name.item,
            &directives(&e.directives),
            &block(e.values.iter().map(|v| enum_value_definition(v))),
        ],
        " ",
    )
}

fn enum_value_definition(e: &EnumValueDefinition) -> String {
    join_parts([&*e.name.item, &directives(&e.directives)], " ")
}

fn input_object_definition(i: &InputObjectTypeDefinition) -> String {
    join_parts(
        [
            "input",
            &i.name.item,
            &directives(&i.directives),
            &block(i.fields.iter().map(|f| input_value_definition(f))),
        ],
        " ",
    )
}

fn type_extension(t: &TypeExtensionDefinition) -> String {
    format!("extend {}", object_definition(&t.definition))
}

fn directive_definition(d: &DirectiveDefinition) -> String {
    format!(
        "directive @{}{} on {}",
        d.name.item,
        wrap(
            "(",
            &d.arguments.iter().map(|a| input_value_definition(a)).join(", "),
            ")",
        ),
        d.locations.iter().map(|l| l.item.as_str()).join(" | "),
    )
}

fn definition(d: &Definition) -> String {
    match d {
        Definition::Operation(d) => operation(d),
        Definition::Fragment(d) => fragment_definition(d),
        Definition::Schema(d) => schema_definition(d),
        Definition::Scalar(d) => scalar_definition(d),
        Definition::Object(d) => object_definition(d),
        Definition::Interface(d) => interface_definition(d),
        Definition::Union(d) => union_definition(d),
        Definition::Enum(d) => enum_definition(d),
        Definition::InputObject(d) => input_object_definition(d),
        Definition::TypeExtension(d) => type_extension(d),
        Definition::Directive(d) => directive_definition(d),
    }
}

fn escape_string(s: &str, out: &mut fmt::Formatter<'_>) -> fmt::Result {
    out.write_char('"')?;
    for c in s.chars() {
        match c {
            '"' => out.write_str("\\\"")?,
            '\\' => out.write_str("\\\\")?,
            '\n' => out.write_str("\\n")?,
            '\r' => out.write_str("\\r")?,
            '\t' => out.write_str("\\t")?,
            '\u{0008}' => out.write_str("\\b")?,
            '\u{000c}' => out.write_str("\\f")?,
            c if u32::from(c) < 0x20 => write!(out, "\\u{:04x}", u32::from(c))?,
            c => out.write_char(c)?,
        }
    }
    out.write_char('"')
}

impl fmt::Display for InputValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Int(raw) | Self::Float(raw) => f.write_str(raw),
            Self::String(s) => escape_string(s, f),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Enum(e) => f.write_str(e),
            Self::Variable(v) => write!(f, "${v}"),
            Self::List(items) => write!(f, "[{}]", items.iter().map(|v| value(v)).join(", ")),
            Self::Object(fields) => {
                write!(f, "{{{}}}", fields.iter().map(|o| object_field(o)).join(", "))
            }
        }
    }
}

impl fmt::Display for TypeNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&type_node(self))
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&selection(self))
    }
}

impl fmt::Display for Definition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&definition(self))
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let body = self.definitions.iter().map(definition).join("\n\n");
        if body.is_empty() {
            Ok(())
        } else {
            writeln!(f, "{body}")
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let out = match self {
            Self::Document(d) => return d.fmt(f),
            Self::OperationDefinition(n) => operation(n),
            Self::VariableDefinition(n) => variable_definition(n),
            Self::SelectionSet(n) => selection_set(n),
            Self::Field(n) => field(n),
            Self::Argument(n) => argument(n),
            Self::FragmentSpread(n) => fragment_spread(n),
            Self::InlineFragment(n) => inline_fragment(n),
            Self::FragmentDefinition(n) => fragment_definition(n),
            Self::Value(n) => value(n),
            Self::ObjectField(n) => object_field(n),
            Self::Directive(n) => directive(n),
            Self::NamedType(n) => n.name.item.to_string(),
            Self::ListType(n) => format!("[{}]", type_node(&n.of_type)),
            Self::NonNullType(n) => format!("{}!", type_node(&n.of_type)),
            Self::SchemaDefinition(n) => schema_definition(n),
            Self::OperationTypeDefinition(n) => operation_type_definition(n),
            Self::ScalarTypeDefinition(n) => scalar_definition(n),
            Self::ObjectTypeDefinition(n) => object_definition(n),
            Self::FieldDefinition(n) => field_definition(n),
            Self::InputValueDefinition(n) => input_value_definition(n),
            Self::InterfaceTypeDefinition(n) => interface_definition(n),
            Self::UnionTypeDefinition(n) => union_definition(n),
            Self::EnumTypeDefinition(n) => enum_definition(n),
            Self::EnumValueDefinition(n) => enum_value_definition(n),
            Self::InputObjectTypeDefinition(n) => input_object_definition(n),
            Self::TypeExtensionDefinition(n) => type_extension(n),
            Self::DirectiveDefinition(n) => directive_definition(n),
        };
        f.write_str(&out)
    }
}
