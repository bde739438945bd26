use std::sync::Arc;

use arcstr::ArcStr;
use fnv::FnvHashSet;

use crate::{
    ast::{OperationDefinition, VariableDefinition},
    validation::ValidatorContext,
    visitor::{VisitAction, VisitInfo, Visitor},
};

/// Variables used by an operation, directly or in the fragments it spreads,
/// must be defined by that operation.
#[derive(Debug, Default)]
pub struct NoUndefinedVariables {
    defined: FnvHashSet<ArcStr>,
}

pub fn factory() -> NoUndefinedVariables {
    NoUndefinedVariables::default()
}

impl<'a> Visitor<ValidatorContext<'a>> for NoUndefinedVariables {
    fn enter_operation_definition(
        &mut self,
        _: &mut ValidatorContext<'a>,
        _: &Arc<OperationDefinition>,
        _: &VisitInfo<'_>,
    ) -> VisitAction {
        self.defined.clear();
        VisitAction::Continue
    }

    fn leave_operation_definition(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        op: &Arc<OperationDefinition>,
        _: &VisitInfo<'_>,
    ) -> VisitAction {
        let op_name = op.name.as_ref().map(|n| n.item.as_str());
        for usage in ctx.recursive_variable_usages(op) {
            if !self.defined.contains(&usage.name) {
                ctx.report_error(
                    &error_message(&usage.name, op_name),
                    &[usage.position, op.span.start],
                );
            }
        }
        VisitAction::Continue
    }

    fn enter_variable_definition(
        &mut self,
        _: &mut ValidatorContext<'a>,
        def: &Arc<VariableDefinition>,
        _: &VisitInfo<'_>,
    ) -> VisitAction {
        self.defined.insert(def.variable.item.clone());
        VisitAction::Skip
    }
}

fn error_message(var_name: &str, op_name: Option<&str>) -> String {
    match op_name {
        Some(op_name) => {
            format!(r#"Variable "${var_name}" is not defined by operation "{op_name}"."#)
        }
        None => format!(r#"Variable "${var_name}" is not defined."#),
    }
}
