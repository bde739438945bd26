use std::sync::Arc;

use arcstr::ArcStr;
use fnv::FnvHashMap;

use crate::{
    ast::{OperationDefinition, VariableDefinition},
    parser::SourcePosition,
    validation::ValidatorContext,
    visitor::{VisitAction, VisitInfo, Visitor},
};

/// An operation must not define the same variable twice.
#[derive(Debug, Default)]
pub struct UniqueVariableNames {
    names: FnvHashMap<ArcStr, SourcePosition>,
}

pub fn factory() -> UniqueVariableNames {
    UniqueVariableNames::default()
}

impl<'a> Visitor<ValidatorContext<'a>> for UniqueVariableNames {
    fn enter_operation_definition(
        &mut self,
        _: &mut ValidatorContext<'a>,
        _: &Arc<OperationDefinition>,
        _: &VisitInfo<'_>,
    ) -> VisitAction {
        self.names.clear();
        VisitAction::Continue
    }

    fn enter_variable_definition(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        def: &Arc<VariableDefinition>,
        _: &VisitInfo<'_>,
    ) -> VisitAction {
        let var = &def.variable;
        match self.names.get(&var.item) {
            Some(&first) => {
                ctx.report_error(&error_message(&var.item), &[first, var.span.start]);
            }
            None => {
                self.names.insert(var.item.clone(), var.span.start);
            }
        }
        VisitAction::Skip
    }
}

fn error_message(var_name: &str) -> String {
    format!(r#"There can only be one variable named "${var_name}"."#)
}
