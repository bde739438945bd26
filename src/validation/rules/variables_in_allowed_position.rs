use std::sync::Arc;

use arcstr::ArcStr;
use fnv::FnvHashMap;

use crate::{
    ast::{OperationDefinition, VariableDefinition},
    validation::ValidatorContext,
    visitor::{VisitAction, VisitInfo, Visitor},
};

/// Each use of a variable must accept the variable's type.
///
/// A nullable variable with a default value counts as non-null, since the
/// default stands in for a missing value.
#[derive(Debug, Default)]
pub struct VariablesInAllowedPosition {
    var_defs: FnvHashMap<ArcStr, Arc<VariableDefinition>>,
}

pub fn factory() -> VariablesInAllowedPosition {
    VariablesInAllowedPosition::default()
}

impl<'a> Visitor<ValidatorContext<'a>> for VariablesInAllowedPosition {
    fn enter_operation_definition(
        &mut self,
        _: &mut ValidatorContext<'a>,
        _: &Arc<OperationDefinition>,
        _: &VisitInfo<'_>,
    ) -> VisitAction {
        self.var_defs.clear();
        VisitAction::Continue
    }

    fn enter_variable_definition(
        &mut self,
        _: &mut ValidatorContext<'a>,
        def: &Arc<VariableDefinition>,
        _: &VisitInfo<'_>,
    ) -> VisitAction {
        self.var_defs
            .entry(def.variable.item.clone())
            .or_insert_with(|| Arc::clone(def));
        VisitAction::Skip
    }

    fn leave_operation_definition(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        op: &Arc<OperationDefinition>,
        _: &VisitInfo<'_>,
    ) -> VisitAction {
        let schema = ctx.schema;
        for usage in ctx.recursive_variable_usages(op) {
            let (Some(def), Some(expected)) = (self.var_defs.get(&usage.name), &usage.input_type)
            else {
                continue;
            };
            let var_type = def.var_type.to_type();
            if schema.innermost_concrete_type(&var_type).is_none() {
                continue;
            }

            let effective = if def.default_value.is_some() && !var_type.is_non_null() {
                var_type.non_null()
            } else {
                var_type.clone()
            };
            if !schema.is_subtype(&effective, expected) {
                ctx.report_error(
                    &error_message(&usage.name, &var_type.to_string(), &expected.to_string()),
                    &[def.span.start, usage.position],
                );
            }
        }
        VisitAction::Continue
    }
}

fn error_message(var_name: &str, type_name: &str, expected_type_name: &str) -> String {
    format!(
        r#"Variable "${var_name}" of type "{type_name}" used in position expecting type "{expected_type_name}"."#,
    )
}
