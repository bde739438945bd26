use std::sync::Arc;

use itertools::Itertools as _;

use crate::{
    ast::FragmentSpread,
    validation::{
        ValidatorContext,
        suggestions::{did_you_mean, suggestion_list},
    },
    visitor::{VisitAction, VisitInfo, Visitor},
};

/// Spread fragments must be defined in the document.
#[derive(Debug, Default)]
pub struct KnownFragmentNames;

pub fn factory() -> KnownFragmentNames {
    KnownFragmentNames
}

impl<'a> Visitor<ValidatorContext<'a>> for KnownFragmentNames {
    fn enter_fragment_spread(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        spread: &Arc<FragmentSpread>,
        _: &VisitInfo<'_>,
    ) -> VisitAction {
        let name = &spread.name;
        if ctx.fragment(&name.item).is_none() {
            let document = ctx.document;
            let suggestions = suggestion_list(
                &name.item,
                document.fragments().map(|f| f.name.item.as_str()).unique(),
            );
            ctx.report_error(
                &error_message(&name.item, &suggestions),
                &[name.span.start],
            );
        }
        VisitAction::Continue
    }
}

fn error_message(frag_name: &str, suggestions: &[&str]) -> String {
    format!(r#"Unknown fragment "{frag_name}".{}"#, did_you_mean(suggestions))
}
