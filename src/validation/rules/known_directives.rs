use std::sync::Arc;

use crate::{
    ast::{Directive, Node},
    schema::model::DirectiveLocation,
    validation::ValidatorContext,
    visitor::{VisitAction, VisitInfo, Visitor},
};

/// Directives must be defined by the schema and used where they are allowed.
#[derive(Debug, Default)]
pub struct KnownDirectives;

pub fn factory() -> KnownDirectives {
    KnownDirectives
}

fn location_of(node: &Node) -> Option<DirectiveLocation> {
    Some(match node {
        Node::OperationDefinition(op) => op.operation.into(),
        Node::Field(_) => DirectiveLocation::Field,
        Node::FragmentSpread(_) => DirectiveLocation::FragmentSpread,
        Node::InlineFragment(_) => DirectiveLocation::InlineFragment,
        Node::FragmentDefinition(_) => DirectiveLocation::FragmentDefinition,
        Node::FieldDefinition(_) => DirectiveLocation::FieldDefinition,
        Node::EnumValueDefinition(_) => DirectiveLocation::EnumValue,
        _ => return None,
    })
}

impl<'a> Visitor<ValidatorContext<'a>> for KnownDirectives {
    fn enter_directive(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        directive: &Arc<Directive>,
        info: &VisitInfo<'_>,
    ) -> VisitAction {
        let name = &directive.name.item;
        match ctx.schema.directive_by_name(name) {
            None => {
                ctx.report_error(&unknown_error_message(name), &[directive.span.start]);
            }
            Some(def) => {
                if let Some(location) = info.parent().and_then(location_of) {
                    if !def.locations.contains(&location) {
                        ctx.report_error(
                            &misplaced_error_message(name, location),
                            &[directive.span.start],
                        );
                    }
                }
            }
        }
        VisitAction::Skip
    }
}

fn unknown_error_message(directive_name: &str) -> String {
    format!(r#"Unknown directive "{directive_name}"."#)
}

fn misplaced_error_message(directive_name: &str, location: DirectiveLocation) -> String {
    format!(
        r#"Directive "{directive_name}" may not be used on {}."#,
        location.as_str(),
    )
}
