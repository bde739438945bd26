use std::sync::Arc;

use crate::{
    ast::VariableDefinition,
    validation::ValidatorContext,
    visitor::{VisitAction, VisitInfo, Visitor},
};

/// Variables can only be of input types: scalars, enums and input objects,
/// possibly wrapped.
#[derive(Debug, Default)]
pub struct VariablesAreInputTypes;

pub fn factory() -> VariablesAreInputTypes {
    VariablesAreInputTypes
}

impl<'a> Visitor<ValidatorContext<'a>> for VariablesAreInputTypes {
    fn enter_variable_definition(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        def: &Arc<VariableDefinition>,
        _: &VisitInfo<'_>,
    ) -> VisitAction {
        let var_type = def.var_type.to_type();
        // Unknown types are reported elsewhere.
        if let Some(meta_type) = ctx.schema.innermost_concrete_type(&var_type) {
            if !meta_type.is_input() {
                ctx.report_error(
                    &error_message(&def.variable.item, &var_type.to_string()),
                    &[def.var_type.span().start],
                );
            }
        }
        VisitAction::Skip
    }
}

fn error_message(var_name: &str, type_name: &str) -> String {
    format!(r#"Variable "${var_name}" cannot be non-input type "{type_name}"."#)
}

#[cfg(test)]
mod tests {
    use super::{error_message, factory};

    use crate::{
        parser::SourcePosition,
        validation::{RuleError, expect_fails_rule, expect_passes_rule},
    };

    #[test]
    fn input_types_are_valid() {
        expect_passes_rule(
            factory,
            r#"
          query Foo($a: String, $b: [Boolean!]!, $c: ComplexInput) {
            field(a: $a, b: $b, c: $c)
          }
        "#,
        );
    }

    #[test]
    fn unknown_types_are_ignored() {
        expect_passes_rule(
            factory,
            r#"
          query Foo($a: Unknown, $b: [Missing]) {
            field(a: $a, b: $b)
          }
        "#,
        );
    }

    #[test]
    fn output_types_are_invalid() {
        expect_fails_rule(
            factory,
            r#"
          query Foo($a: Dog, $b: [[CatOrDog!]]!, $c: Pet) {
            field(a: $a, b: $b, c: $c)
          }
        "#,
            &[
                RuleError::new(&error_message("a", "Dog"), &[SourcePosition::new(25, 1, 24)]),
                RuleError::new(
                    &error_message("b", "[[CatOrDog!]]!"),
                    &[SourcePosition::new(34, 1, 33)],
                ),
                RuleError::new(&error_message("c", "Pet"), &[SourcePosition::new(54, 1, 53)]),
            ],
        );
    }
}
