use std::sync::Arc;

use crate::{
    ast::{Document, OperationDefinition},
    validation::ValidatorContext,
    visitor::{VisitAction, VisitInfo, Visitor},
};

/// An anonymous operation must be the only operation of its document.
#[derive(Debug, Default)]
pub struct LoneAnonymousOperation {
    operation_count: usize,
}

pub fn factory() -> LoneAnonymousOperation {
    LoneAnonymousOperation::default()
}

impl<'a> Visitor<ValidatorContext<'a>> for LoneAnonymousOperation {
    fn enter_document(
        &mut self,
        _: &mut ValidatorContext<'a>,
        doc: &Arc<Document>,
        _: &VisitInfo<'_>,
    ) -> VisitAction {
        self.operation_count = doc.operations().count();
        VisitAction::Continue
    }

    fn enter_operation_definition(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        op: &Arc<OperationDefinition>,
        _: &VisitInfo<'_>,
    ) -> VisitAction {
        if op.name.is_none() && self.operation_count > 1 {
            ctx.report_error(error_message(), &[op.span.start]);
        }
        VisitAction::Skip
    }
}

fn error_message() -> &'static str {
    "This anonymous operation must be the only defined operation."
}
