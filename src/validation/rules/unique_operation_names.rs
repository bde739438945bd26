use std::sync::Arc;

use arcstr::ArcStr;
use fnv::FnvHashMap;

use crate::{
    ast::{FragmentDefinition, OperationDefinition},
    parser::SourcePosition,
    validation::ValidatorContext,
    visitor::{VisitAction, VisitInfo, Visitor},
};

/// Named operations must have distinct names, whatever their kind.
#[derive(Debug, Default)]
pub struct UniqueOperationNames {
    names: FnvHashMap<ArcStr, SourcePosition>,
}

pub fn factory() -> UniqueOperationNames {
    UniqueOperationNames::default()
}

impl<'a> Visitor<ValidatorContext<'a>> for UniqueOperationNames {
    fn enter_operation_definition(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        op: &Arc<OperationDefinition>,
        _: &VisitInfo<'_>,
    ) -> VisitAction {
        if let Some(name) = &op.name {
            match self.names.get(&name.item) {
                Some(&first) => {
                    ctx.report_error(&error_message(&name.item), &[first, name.span.start]);
                }
                None => {
                    self.names.insert(name.item.clone(), name.span.start);
                }
            }
        }
        VisitAction::Skip
    }

    fn enter_fragment_definition(
        &mut self,
        _: &mut ValidatorContext<'a>,
        _: &Arc<FragmentDefinition>,
        _: &VisitInfo<'_>,
    ) -> VisitAction {
        VisitAction::Skip
    }
}

fn error_message(op_name: &str) -> String {
    format!(r#"There can only be one operation named "{op_name}"."#)
}
