use std::sync::Arc;

use crate::{
    ast::{
        InputObjectTypeDefinition, InterfaceTypeDefinition, NamedType, ObjectTypeDefinition,
        UnionTypeDefinition,
    },
    validation::{
        ValidatorContext,
        suggestions::{did_you_mean, suggestion_list},
    },
    visitor::{VisitAction, VisitInfo, Visitor},
};

/// Type names referenced by variables and fragments must exist in the schema.
///
/// Type definitions written in the document are not checked.
#[derive(Debug, Default)]
pub struct KnownTypeNames;

pub fn factory() -> KnownTypeNames {
    KnownTypeNames
}

impl<'a> Visitor<ValidatorContext<'a>> for KnownTypeNames {
    fn enter_named_type(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        named: &Arc<NamedType>,
        _: &VisitInfo<'_>,
    ) -> VisitAction {
        let name = &named.name;
        if ctx.schema.concrete_type_by_name(&name.item).is_none() {
            let suggestions = suggestion_list(
                &name.item,
                ctx.schema.type_list().map(|t| t.name().as_str()),
            );
            ctx.report_error(
                &error_message(&name.item, &suggestions),
                &[name.span.start],
            );
        }
        VisitAction::Continue
    }

    fn enter_object_type_definition(
        &mut self,
        _: &mut ValidatorContext<'a>,
        _: &Arc<ObjectTypeDefinition>,
        _: &VisitInfo<'_>,
    ) -> VisitAction {
        VisitAction::Skip
    }

    fn enter_interface_type_definition(
        &mut self,
        _: &mut ValidatorContext<'a>,
        _: &Arc<InterfaceTypeDefinition>,
        _: &VisitInfo<'_>,
    ) -> VisitAction {
        VisitAction::Skip
    }

    fn enter_union_type_definition(
        &mut self,
        _: &mut ValidatorContext<'a>,
        _: &Arc<UnionTypeDefinition>,
        _: &VisitInfo<'_>,
    ) -> VisitAction {
        VisitAction::Skip
    }

    fn enter_input_object_type_definition(
        &mut self,
        _: &mut ValidatorContext<'a>,
        _: &Arc<InputObjectTypeDefinition>,
        _: &VisitInfo<'_>,
    ) -> VisitAction {
        VisitAction::Skip
    }
}

fn error_message(type_name: &str, suggestions: &[&str]) -> String {
    format!(r#"Unknown type "{type_name}".{}"#, did_you_mean(suggestions))
}
