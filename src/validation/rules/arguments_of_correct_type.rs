use std::sync::Arc;

use crate::{
    ast::{Argument, InputValue},
    validation::{ValidatorContext, input_value::literal_value_errors},
    visitor::{VisitAction, VisitInfo, Visitor},
};

/// Argument literals must be valid values of the argument's type.
#[derive(Debug, Default)]
pub struct ArgumentsOfCorrectType;

pub fn factory() -> ArgumentsOfCorrectType {
    ArgumentsOfCorrectType
}

impl<'a> Visitor<ValidatorContext<'a>> for ArgumentsOfCorrectType {
    fn enter_argument(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        arg: &Arc<Argument>,
        _: &VisitInfo<'_>,
    ) -> VisitAction {
        if let Some(def) = ctx.type_info().argument() {
            let errors = literal_value_errors(ctx.schema, &def.arg_type, &arg.value.item);
            if !errors.is_empty() {
                ctx.report_error(
                    &error_message(&arg.name.item, &arg.value.item, &errors),
                    &[arg.value.span.start],
                );
            }
        }
        VisitAction::Skip
    }
}

fn error_message(arg_name: &str, value: &InputValue, errors: &[String]) -> String {
    format!(
        "Argument \"{arg_name}\" has invalid value {value}.\n{}",
        errors.join("\n"),
    )
}

#[cfg(test)]
mod tests {
    use super::{error_message, factory};

    use crate::{
        ast::InputValue,
        parser::SourcePosition,
        validation::{RuleError, expect_fails_rule, expect_passes_rule},
    };

    fn invalid(arg: &str, value: InputValue, errors: &[&str]) -> String {
        let errors = errors.iter().map(|e| e.to_string()).collect::<Vec<_>>();
        error_message(arg, &value, &errors)
    }

    #[test]
    fn good_scalar_values() {
        expect_passes_rule(
            factory,
            r#"
          {
            complicatedArgs {
              intArgField(intArg: 2)
              floatArgField(floatArg: 1)
              stringArgField(stringArg: "foo")
              booleanArgField(booleanArg: true)
              idArgField(idArg: 1)
              enumArgField(enumArg: BROWN)
            }
          }
        "#,
        );
    }

    #[test]
    fn null_and_variables_are_accepted() {
        expect_passes_rule(
            factory,
            r#"
          query Q($i: Int) {
            complicatedArgs {
              intArgField(intArg: null)
              nonNullIntArgField(nonNullIntArg: $i)
            }
          }
        "#,
        );
    }

    #[test]
    fn unknown_arguments_are_ignored() {
        expect_passes_rule(
            factory,
            r#"
          {
            dog { isHousetrained(unknown: "x") }
          }
        "#,
        );
    }

    #[test]
    fn wrong_scalar_kinds() {
        expect_fails_rule(
            factory,
            r#"
          {
            complicatedArgs {
              intArgField(intArg: "3")
              booleanArgField(booleanArg: 2)
              idArgField(idArg: 1.5)
            }
          }
        "#,
            &[
                RuleError::new(
                    &invalid(
                        "intArg",
                        InputValue::String("3".into()),
                        &[r#"Expected type "Int", found "3"."#],
                    ),
                    &[SourcePosition::new(77, 3, 34)],
                ),
                RuleError::new(
                    &invalid(
                        "booleanArg",
                        InputValue::Int("2".into()),
                        &[r#"Expected type "Boolean", found 2."#],
                    ),
                    &[SourcePosition::new(124, 4, 42)],
                ),
                RuleError::new(
                    &invalid(
                        "idArg",
                        InputValue::Float("1.5".into()),
                        &[r#"Expected type "ID", found 1.5."#],
                    ),
                    &[SourcePosition::new(159, 5, 32)],
                ),
            ],
        );
    }

    #[test]
    fn null_for_non_null_argument() {
        expect_fails_rule(
            factory,
            r#"
          {
            complicatedArgs {
              nonNullIntArgField(nonNullIntArg: null)
            }
          }
        "#,
            &[RuleError::new(
                &invalid(
                    "nonNullIntArg",
                    InputValue::Null,
                    &[r#"Expected "Int!", found null."#],
                ),
                &[SourcePosition::new(91, 3, 48)],
            )],
        );
    }

    #[test]
    fn unknown_enum_value() {
        expect_fails_rule(
            factory,
            r#"
          {
            complicatedArgs {
              enumArgField(enumArg: PURPLE)
            }
          }
        "#,
            &[RuleError::new(
                &invalid(
                    "enumArg",
                    InputValue::Enum("PURPLE".into()),
                    &[r#"Expected type "FurColor", found PURPLE."#],
                ),
                &[SourcePosition::new(79, 3, 36)],
            )],
        );
    }

    #[test]
    fn bad_list_items_and_input_fields() {
        expect_fails_rule(
            factory,
            r#"
          {
            complicatedArgs {
              stringListArgField(stringListArg: ["one", 2])
              complexArgField(complexArg: { intField: 4 })
            }
          }
        "#,
            &[
                RuleError::new(
                    &error_message(
                        "stringListArg",
                        &crate::parser::parse_value(r#"["one", 2]"#, false)
                            .expect("parse failed")
                            .item,
                        &[r#"In element #1: Expected type "String", found 2."#.into()],
                    ),
                    &[SourcePosition::new(91, 3, 48)],
                ),
                RuleError::new(
                    &error_message(
                        "complexArg",
                        &crate::parser::parse_value("{ intField: 4 }", false)
                            .expect("parse failed")
                            .item,
                        &[r#"In field "requiredField": Expected "Boolean!", found null."#.into()],
                    ),
                    &[SourcePosition::new(145, 4, 42)],
                ),
            ],
        );
    }

    #[test]
    fn directive_arguments() {
        expect_fails_rule(
            factory,
            r#"
          {
            dog @include(if: "yes") { name }
          }
        "#,
            &[RuleError::new(
                &invalid(
                    "if",
                    InputValue::String("yes".into()),
                    &[r#"Expected type "Boolean", found "yes"."#],
                ),
                &[SourcePosition::new(42, 2, 29)],
            )],
        );
    }
}
