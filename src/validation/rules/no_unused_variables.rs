use std::sync::Arc;

use fnv::FnvHashSet;

use crate::{
    ast::{OperationDefinition, VariableDefinition},
    validation::ValidatorContext,
    visitor::{VisitAction, VisitInfo, Visitor},
};

/// Variables defined by an operation must be used by it, directly or in the
/// fragments it spreads.
#[derive(Debug, Default)]
pub struct NoUnusedVariables {
    defined: Vec<Arc<VariableDefinition>>,
}

pub fn factory() -> NoUnusedVariables {
    NoUnusedVariables::default()
}

impl<'a> Visitor<ValidatorContext<'a>> for NoUnusedVariables {
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
        let used = ctx
            .recursive_variable_usages(op)
            .into_iter()
            .map(|u| u.name)
            .collect::<FnvHashSet<_>>();
        let op_name = op.name.as_ref().map(|n| n.item.as_str());

        for def in self.defined.drain(..) {
            if !used.contains(&def.variable.item) {
                ctx.report_error(&error_message(&def.variable.item, op_name), &[def.span.start]);
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
        self.defined.push(Arc::clone(def));
        VisitAction::Skip
    }
}

fn error_message(var_name: &str, op_name: Option<&str>) -> String {
    match op_name {
        Some(op_name) => {
            format!(r#"Variable "${var_name}" is never used in operation "{op_name}"."#)
        }
        None => format!(r#"Variable "${var_name}" is never used."#),
    }
}
