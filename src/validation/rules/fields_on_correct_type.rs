use std::sync::Arc;

use arcstr::ArcStr;
use indexmap::IndexMap;
use itertools::Itertools as _;

use crate::{
    ast::Field,
    schema::{meta::MetaType, model::Schema},
    validation::{
        ValidatorContext,
        suggestions::{did_you_mean, quoted_or_list, suggestion_list},
    },
    visitor::{VisitAction, VisitInfo, Visitor},
};

/// Every selected field must be defined on the type it is selected on.
#[derive(Debug, Default)]
pub struct FieldsOnCorrectType;

pub fn factory() -> FieldsOnCorrectType {
    FieldsOnCorrectType
}

impl<'a> Visitor<ValidatorContext<'a>> for FieldsOnCorrectType {
    fn enter_field(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        field: &Arc<Field>,
        _: &VisitInfo<'_>,
    ) -> VisitAction {
        let Some(parent_type) = ctx.type_info().parent_type() else {
            return VisitAction::Continue;
        };
        if ctx.type_info().field_def().is_some() {
            return VisitAction::Continue;
        }

        let field_name = &field.name.item;
        let type_names = suggested_type_names(ctx.schema, parent_type, field_name);
        let field_names = if type_names.is_empty() {
            suggested_field_names(parent_type, field_name)
        } else {
            vec![]
        };
        ctx.report_error(
            &error_message(field_name, parent_type.name(), &type_names, &field_names),
            &[field.span.start],
        );
        VisitAction::Continue
    }
}

/// For an abstract parent, the types on which the field does exist:
/// interfaces first, most used first, then object types.
fn suggested_type_names<'s>(
    schema: &'s Schema,
    parent_type: &'s MetaType,
    field_name: &str,
) -> Vec<&'s str> {
    if !parent_type.is_abstract() {
        return vec![];
    }

    let mut interface_usage = IndexMap::<&ArcStr, usize>::new();
    let mut object_names = vec![];
    for possible in schema.possible_types(parent_type) {
        if possible.field_by_name(field_name).is_none() {
            continue;
        }
        object_names.push(possible.name().as_str());

        if let MetaType::Object(object) = possible {
            for iface_name in &object.interface_names {
                let has_field = schema
                    .concrete_type_by_name(iface_name)
                    .is_some_and(|iface| iface.field_by_name(field_name).is_some());
                if has_field {
                    *interface_usage.entry(iface_name).or_default() += 1;
                }
            }
        }
    }

    interface_usage
        .into_iter()
        .sorted_by(|(_, a), (_, b)| b.cmp(a))
        .map(|(name, _)| name.as_str())
        .chain(object_names)
        .collect()
}

fn suggested_field_names<'s>(parent_type: &'s MetaType, field_name: &str) -> Vec<&'s str> {
    match parent_type.fields() {
        Some(fields) => suggestion_list(field_name, fields.keys().map(ArcStr::as_str)),
        None => vec![],
    }
}

fn error_message(
    field_name: &str,
    type_name: &str,
    suggested_types: &[&str],
    suggested_fields: &[&str],
) -> String {
    let hint = if suggested_types.is_empty() {
        did_you_mean(suggested_fields)
    } else {
        format!(
            " Did you mean to use an inline fragment on {}?",
            quoted_or_list(suggested_types),
        )
    };
    format!(r#"Cannot query field "{field_name}" on type "{type_name}".{hint}"#)
}
