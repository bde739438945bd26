use std::sync::Arc;

use crate::{
    ast::{InputValue, SelectionSet, Type, VariableDefinition},
    validation::{ValidatorContext, input_value::literal_value_errors},
    visitor::{VisitAction, VisitInfo, Visitor},
};

/// Variable default values must be valid for the variable's type, and only
/// nullable variables may have one.
#[derive(Debug, Default)]
pub struct DefaultValuesOfCorrectType;

pub fn factory() -> DefaultValuesOfCorrectType {
    DefaultValuesOfCorrectType
}

impl<'a> Visitor<ValidatorContext<'a>> for DefaultValuesOfCorrectType {
    fn enter_variable_definition(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        def: &Arc<VariableDefinition>,
        _: &VisitInfo<'_>,
    ) -> VisitAction {
        let (Some(default), Some(var_type)) =
            (&def.default_value, ctx.type_info().input_type().cloned())
        else {
            return VisitAction::Skip;
        };

        if var_type.is_non_null() {
            ctx.report_error(
                &non_null_error_message(&def.variable.item, &var_type),
                &[default.span.start],
            );
        } else {
            let errors = literal_value_errors(ctx.schema, &var_type, &default.item);
            if !errors.is_empty() {
                ctx.report_error(
                    &type_error_message(&def.variable.item, &var_type, &default.item, &errors),
                    &[default.span.start],
                );
            }
        }
        VisitAction::Skip
    }

    fn enter_selection_set(
        &mut self,
        _: &mut ValidatorContext<'a>,
        _: &Arc<SelectionSet>,
        _: &VisitInfo<'_>,
    ) -> VisitAction {
        VisitAction::Skip
    }
}

fn non_null_error_message(var_name: &str, var_type: &Type) -> String {
    format!(
        "Variable \"${var_name}\" of type \"{var_type}\" is required and will not use the \
         default value. Perhaps you meant to use type \"{}\".",
        var_type.nullable(),
    )
}

fn type_error_message(
    var_name: &str,
    var_type: &Type,
    value: &InputValue,
    errors: &[String],
) -> String {
    format!(
        "Variable \"${var_name}\" of type \"{var_type}\" has invalid default value {value}.\n{}",
        errors.join("\n"),
    )
}
