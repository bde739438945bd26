use std::sync::Arc;

use arcstr::ArcStr;
use fnv::FnvHashSet;

use crate::{
    ast::{Document, FragmentDefinition, OperationDefinition},
    validation::ValidatorContext,
    visitor::{VisitAction, VisitInfo, Visitor},
};

/// Every fragment must be spread, directly or transitively, by some
/// operation.
#[derive(Debug, Default)]
pub struct NoUnusedFragments {
    operations: Vec<Arc<OperationDefinition>>,
    fragments: Vec<Arc<FragmentDefinition>>,
}

pub fn factory() -> NoUnusedFragments {
    NoUnusedFragments::default()
}

impl<'a> Visitor<ValidatorContext<'a>> for NoUnusedFragments {
    fn enter_operation_definition(
        &mut self,
        _: &mut ValidatorContext<'a>,
        op: &Arc<OperationDefinition>,
        _: &VisitInfo<'_>,
    ) -> VisitAction {
        self.operations.push(Arc::clone(op));
        VisitAction::Skip
    }

    fn enter_fragment_definition(
        &mut self,
        _: &mut ValidatorContext<'a>,
        frag: &Arc<FragmentDefinition>,
        _: &VisitInfo<'_>,
    ) -> VisitAction {
        self.fragments.push(Arc::clone(frag));
        VisitAction::Skip
    }

    fn leave_document(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        _: &Arc<Document>,
        _: &VisitInfo<'_>,
    ) -> VisitAction {
        let mut used = FnvHashSet::<ArcStr>::default();
        for op in &self.operations {
            used.extend(
                ctx.recursively_referenced_fragments(op)
                    .iter()
                    .map(|f| f.name.item.clone()),
            );
        }

        for frag in &self.fragments {
            if !used.contains(&frag.name.item) {
                ctx.report_error(&error_message(&frag.name.item), &[frag.span.start]);
            }
        }
        VisitAction::Continue
    }
}

fn error_message(frag_name: &str) -> String {
    format!(r#"Fragment "{frag_name}" is never used."#)
}
