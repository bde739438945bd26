use std::sync::Arc;

use crate::{
    ast::Field,
    validation::ValidatorContext,
    visitor::{VisitAction, VisitInfo, Visitor},
};

/// Fields of leaf types must not have a selection, and fields of composite
/// types must have one.
#[derive(Debug, Default)]
pub struct ScalarLeafs;

pub fn factory() -> ScalarLeafs {
    ScalarLeafs
}

impl<'a> Visitor<ValidatorContext<'a>> for ScalarLeafs {
    fn enter_field(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        field: &Arc<Field>,
        _: &VisitInfo<'_>,
    ) -> VisitAction {
        let schema = ctx.schema;
        let Some(field_type) = ctx.type_info().current_type().cloned() else {
            return VisitAction::Continue;
        };
        let Some(meta_type) = schema.innermost_concrete_type(&field_type) else {
            return VisitAction::Continue;
        };

        let name = &field.name.item;
        match (meta_type.is_leaf(), &field.selection_set) {
            (true, Some(set)) => {
                ctx.report_error(
                    &no_allowed_error_message(name, &field_type.to_string()),
                    &[set.span.start],
                );
            }
            (false, None) => {
                ctx.report_error(
                    &required_error_message(name, &field_type.to_string()),
                    &[field.span.start],
                );
            }
            _ => {}
        }
        VisitAction::Continue
    }
}

fn no_allowed_error_message(field_name: &str, type_name: &str) -> String {
    format!(
        r#"Field "{field_name}" must not have a selection since type "{type_name}" has no subfields."#,
    )
}

fn required_error_message(field_name: &str, type_name: &str) -> String {
    format!(
        r#"Field "{field_name}" of type "{type_name}" must have a selection of subfields. Did you mean "{field_name} {{ ... }}"?"#,
    )
}
