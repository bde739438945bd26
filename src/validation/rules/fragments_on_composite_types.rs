use std::sync::Arc;

use crate::{
    ast::{FragmentDefinition, InlineFragment, NamedType},
    validation::ValidatorContext,
    visitor::{VisitAction, VisitInfo, Visitor},
};

/// Fragments may only condition on object, interface or union types.
#[derive(Debug, Default)]
pub struct FragmentsOnCompositeTypes;

pub fn factory() -> FragmentsOnCompositeTypes {
    FragmentsOnCompositeTypes
}

fn is_non_composite(ctx: &ValidatorContext<'_>, condition: &NamedType) -> bool {
    ctx.schema
        .concrete_type_by_name(&condition.name.item)
        .is_some_and(|t| !t.is_composite())
}

impl<'a> Visitor<ValidatorContext<'a>> for FragmentsOnCompositeTypes {
    fn enter_fragment_definition(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        frag: &Arc<FragmentDefinition>,
        _: &VisitInfo<'_>,
    ) -> VisitAction {
        let condition = &frag.type_condition;
        if is_non_composite(ctx, condition) {
            ctx.report_error(
                &error_message(Some(&frag.name.item), &condition.name.item),
                &[condition.name.span.start],
            );
        }
        VisitAction::Continue
    }

    fn enter_inline_fragment(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        frag: &Arc<InlineFragment>,
        _: &VisitInfo<'_>,
    ) -> VisitAction {
        if let Some(condition) = &frag.type_condition {
            if is_non_composite(ctx, condition) {
                ctx.report_error(
                    &error_message(None, &condition.name.item),
                    &[condition.name.span.start],
                );
            }
        }
        VisitAction::Continue
    }
}

fn error_message(fragment_name: Option<&str>, on_type: &str) -> String {
    match fragment_name {
        Some(name) => {
            format!(r#"Fragment "{name}" cannot condition on non composite type "{on_type}"."#)
        }
        None => format!(r#"Fragment cannot condition on non composite type "{on_type}"."#),
    }
}
