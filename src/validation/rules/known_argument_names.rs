use std::sync::Arc;

use arcstr::ArcStr;

use crate::{
    ast::{Argument, Node},
    validation::{
        ValidatorContext,
        suggestions::{did_you_mean, suggestion_list},
    },
    visitor::{VisitAction, VisitInfo, Visitor},
};

/// Arguments must be defined by the field or directive they are given to.
#[derive(Debug, Default)]
pub struct KnownArgumentNames;

pub fn factory() -> KnownArgumentNames {
    KnownArgumentNames
}

impl<'a> Visitor<ValidatorContext<'a>> for KnownArgumentNames {
    fn enter_argument(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        arg: &Arc<Argument>,
        info: &VisitInfo<'_>,
    ) -> VisitAction {
        let arg_name = &arg.name.item;
        let message = match info.parent() {
            Some(Node::Field(field)) => {
                let (Some(field_def), Some(parent_type)) =
                    (ctx.type_info().field_def(), ctx.type_info().parent_type())
                else {
                    return VisitAction::Skip;
                };
                if field_def.arguments.contains_key(arg_name) {
                    return VisitAction::Skip;
                }
                let suggestions =
                    suggestion_list(arg_name, field_def.arguments.keys().map(ArcStr::as_str));
                field_error_message(arg_name, &field.name.item, parent_type.name(), &suggestions)
            }
            Some(Node::Directive(directive)) => {
                let Some(directive_def) = ctx.type_info().directive() else {
                    return VisitAction::Skip;
                };
                if directive_def.arguments.contains_key(arg_name) {
                    return VisitAction::Skip;
                }
                let suggestions =
                    suggestion_list(arg_name, directive_def.arguments.keys().map(ArcStr::as_str));
                directive_error_message(arg_name, &directive.name.item, &suggestions)
            }
            _ => return VisitAction::Skip,
        };

        ctx.report_error(&message, &[arg.span.start]);
        VisitAction::Skip
    }
}

fn field_error_message(
    arg_name: &str,
    field_name: &str,
    type_name: &str,
    suggestions: &[&str],
) -> String {
    format!(
        r#"Unknown argument "{arg_name}" on field "{field_name}" of type "{type_name}".{}"#,
        did_you_mean(suggestions),
    )
}

fn directive_error_message(arg_name: &str, directive_name: &str, suggestions: &[&str]) -> String {
    format!(
        r#"Unknown argument "{arg_name}" on directive "@{directive_name}".{}"#,
        did_you_mean(suggestions),
    )
}

#[cfg(test)]
mod tests {
    use super::{directive_error_message, factory, field_error_message};

    use crate::{
        parser::SourcePosition,
        validation::{RuleError, expect_fails_rule, expect_passes_rule},
    };

    #[test]
    fn known_field_and_directive_arguments() {
        expect_passes_rule(
            factory,
            r#"
          {
            dog {
              doesKnowCommand(dogCommand: SIT)
              isAtLocation(y: 1, x: 2) @skip(if: false)
            }
            complicatedArgs { multipleOpts(opt2: 1) }
          }
        "#,
        );
    }

    #[test]
    fn arguments_of_unknown_fields_and_directives_are_ignored() {
        expect_passes_rule(
            factory,
            r#"
          {
            dog {
              unknownField(unknownArg: SIT)
              name @unknown(unknownArg: true)
            }
          }
        "#,
        );
    }

    #[test]
    fn unknown_field_arguments() {
        expect_fails_rule(
            factory,
            r#"
          {
            dog {
              doesKnowCommand(command: SIT)
              isHousetrained(unknown: true, atOtherHomes: true)
            }
          }
        "#,
            &[
                RuleError::new(
                    &field_error_message("command", "doesKnowCommand", "Dog", &["dogCommand"]),
                    &[SourcePosition::new(61, 3, 30)],
                ),
                RuleError::new(
                    &field_error_message("unknown", "isHousetrained", "Dog", &[]),
                    &[SourcePosition::new(104, 4, 29)],
                ),
            ],
        );
    }

    #[test]
    fn unknown_directive_arguments() {
        expect_fails_rule(
            factory,
            r#"
          {
            dog @skip(unless: true) @include(iff: true) { name }
          }
        "#,
            &[
                RuleError::new(
                    &directive_error_message("unless", "skip", &[]),
                    &[SourcePosition::new(35, 2, 22)],
                ),
                RuleError::new(
                    &directive_error_message("iff", "include", &["if"]),
                    &[SourcePosition::new(58, 2, 45)],
                ),
            ],
        );
    }

    #[test]
    fn arguments_are_checked_against_the_innermost_owner() {
        expect_fails_rule(
            factory,
            r#"
          {
            dog {
              isHousetrained(atOtherHomes: true) @include(atOtherHomes: true)
            }
          }
        "#,
            &[RuleError::new(
                &directive_error_message("atOtherHomes", "include", &[]),
                &[SourcePosition::new(89, 3, 58)],
            )],
        );
    }
}
