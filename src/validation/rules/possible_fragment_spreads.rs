use std::sync::Arc;

use crate::{
    ast::{FragmentSpread, InlineFragment},
    validation::ValidatorContext,
    visitor::{VisitAction, VisitInfo, Visitor},
};

/// A fragment may only be spread where some object type could satisfy both
/// the fragment's type condition and the surrounding type.
#[derive(Debug, Default)]
pub struct PossibleFragmentSpreads;

pub fn factory() -> PossibleFragmentSpreads {
    PossibleFragmentSpreads
}

impl<'a> Visitor<ValidatorContext<'a>> for PossibleFragmentSpreads {
    fn enter_inline_fragment(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        frag: &Arc<InlineFragment>,
        _: &VisitInfo<'_>,
    ) -> VisitAction {
        let schema = ctx.schema;
        let frag_type = ctx
            .type_info()
            .current_type()
            .and_then(|t| schema.innermost_concrete_type(t))
            .filter(|t| t.is_composite());
        let parent_type = ctx.type_info().parent_type();

        if let (Some(frag_type), Some(parent_type)) = (frag_type, parent_type) {
            if !schema.type_overlap(frag_type, parent_type) {
                ctx.report_error(
                    &error_message(None, parent_type.name(), frag_type.name()),
                    &[frag.span.start],
                );
            }
        }
        VisitAction::Continue
    }

    fn enter_fragment_spread(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        spread: &Arc<FragmentSpread>,
        _: &VisitInfo<'_>,
    ) -> VisitAction {
        let schema = ctx.schema;
        let frag_type = ctx
            .fragment(&spread.name.item)
            .and_then(|f| schema.concrete_type_by_name(&f.type_condition.name.item))
            .filter(|t| t.is_composite());
        let parent_type = ctx.type_info().parent_type();

        if let (Some(frag_type), Some(parent_type)) = (frag_type, parent_type) {
            if !schema.type_overlap(frag_type, parent_type) {
                ctx.report_error(
                    &error_message(Some(&spread.name.item), parent_type.name(), frag_type.name()),
                    &[spread.span.start],
                );
            }
        }
        VisitAction::Continue
    }
}

fn error_message(frag_name: Option<&str>, parent_type: &str, frag_type: &str) -> String {
    match frag_name {
        Some(frag_name) => format!(
            "Fragment \"{frag_name}\" cannot be spread here as objects of type \
             \"{parent_type}\" can never be of type \"{frag_type}\".",
        ),
        None => format!(
            "Fragment cannot be spread here as objects of type \"{parent_type}\" \
             can never be of type \"{frag_type}\".",
        ),
    }
}
