use std::sync::Arc;

use arcstr::ArcStr;
use fnv::FnvHashMap;

use crate::{
    ast::{InputValue, ObjectField, ValueNode},
    parser::SourcePosition,
    validation::ValidatorContext,
    visitor::{VisitAction, VisitInfo, Visitor},
};

/// Input object literals must not set the same field twice.
#[derive(Debug, Default)]
pub struct UniqueInputFieldNames {
    known_name_stack: Vec<FnvHashMap<ArcStr, SourcePosition>>,
}

pub fn factory() -> UniqueInputFieldNames {
    UniqueInputFieldNames::default()
}

impl<'a> Visitor<ValidatorContext<'a>> for UniqueInputFieldNames {
    fn enter_value(
        &mut self,
        _: &mut ValidatorContext<'a>,
        value: &Arc<ValueNode>,
        _: &VisitInfo<'_>,
    ) -> VisitAction {
        if let InputValue::Object(_) = value.item {
            self.known_name_stack.push(FnvHashMap::default());
        }
        VisitAction::Continue
    }

    fn leave_value(
        &mut self,
        _: &mut ValidatorContext<'a>,
        value: &Arc<ValueNode>,
        _: &VisitInfo<'_>,
    ) -> VisitAction {
        if let InputValue::Object(_) = value.item {
            self.known_name_stack.pop();
        }
        VisitAction::Continue
    }

    fn enter_object_field(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        field: &Arc<ObjectField>,
        _: &VisitInfo<'_>,
    ) -> VisitAction {
        let Some(known_names) = self.known_name_stack.last_mut() else {
            return VisitAction::Continue;
        };

        let name = &field.name;
        match known_names.get(&name.item) {
            Some(&first) => {
                ctx.report_error(&error_message(&name.item), &[first, name.span.start]);
            }
            None => {
                known_names.insert(name.item.clone(), name.span.start);
            }
        }
        VisitAction::Continue
    }
}

fn error_message(field_name: &str) -> String {
    format!(r#"There can only be one input field named "{field_name}"."#)
}
