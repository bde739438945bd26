use std::sync::Arc;

use arcstr::ArcStr;
use indexmap::IndexMap;

use crate::{
    ast::{Argument, Directive, Field},
    parser::SourcePosition,
    schema::meta,
    validation::ValidatorContext,
    visitor::{VisitAction, VisitInfo, Visitor},
};

/// Non-null arguments without a default value must be provided, on fields
/// and directives alike.
#[derive(Debug, Default)]
pub struct ProvidedNonNullArguments;

pub fn factory() -> ProvidedNonNullArguments {
    ProvidedNonNullArguments
}

fn missing_arguments<'s>(
    defined: &'s IndexMap<ArcStr, meta::Argument>,
    provided: &[Arc<Argument>],
) -> impl Iterator<Item = &'s meta::Argument> {
    defined.values().filter(|def| {
        def.arg_type.is_non_null()
            && def.default_value.is_none()
            && !provided.iter().any(|a| a.name.item == def.name)
    })
}

impl<'a> Visitor<ValidatorContext<'a>> for ProvidedNonNullArguments {
    fn leave_field(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        field: &Arc<Field>,
        _: &VisitInfo<'_>,
    ) -> VisitAction {
        // Unknown fields are reported elsewhere.
        let Some(def) = ctx.type_info().field_def() else {
            return VisitAction::Continue;
        };

        report_missing(
            ctx,
            missing_arguments(&def.arguments, &field.arguments),
            field.span.start,
            |arg| field_error_message(&field.name.item, &arg.name, &arg.arg_type.to_string()),
        );
        VisitAction::Continue
    }

    fn leave_directive(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        directive: &Arc<Directive>,
        _: &VisitInfo<'_>,
    ) -> VisitAction {
        let Some(def) = ctx.type_info().directive() else {
            return VisitAction::Continue;
        };

        report_missing(
            ctx,
            missing_arguments(&def.arguments, &directive.arguments),
            directive.span.start,
            |arg| {
                directive_error_message(&directive.name.item, &arg.name, &arg.arg_type.to_string())
            },
        );
        VisitAction::Continue
    }
}

fn report_missing<'s>(
    ctx: &mut ValidatorContext<'_>,
    missing: impl Iterator<Item = &'s meta::Argument>,
    position: SourcePosition,
    message: impl Fn(&meta::Argument) -> String,
) {
    for arg in missing {
        ctx.report_error(&message(arg), &[position]);
    }
}

fn field_error_message(field_name: &str, arg_name: &str, type_name: &str) -> String {
    format!(
        r#"Field "{field_name}" argument "{arg_name}" of type "{type_name}" is required but not provided."#,
    )
}

fn directive_error_message(directive_name: &str, arg_name: &str, type_name: &str) -> String {
    format!(
        r#"Directive "@{directive_name}" argument "{arg_name}" of type "{type_name}" is required but not provided."#,
    )
}
