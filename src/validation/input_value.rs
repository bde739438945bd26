use fnv::FnvHashSet;

use crate::{
    ast::{InputValue, Type},
    schema::{meta::MetaType, model::Schema},
};

/// Reasons why a literal is not a valid value of type `ty`, empty when it is.
///
/// Variables are accepted anywhere: their usage is checked against their
/// declared type by another rule.
pub(crate) fn literal_value_errors(schema: &Schema, ty: &Type, value: &InputValue) -> Vec<String> {
    if ty.is_non_null() && matches!(value, InputValue::Null) {
        return vec![format!(r#"Expected "{ty}", found null."#)];
    }

    match value {
        InputValue::Null | InputValue::Variable(_) => return vec![],
        _ => {}
    }

    if let Some(item_type) = ty.list_contents() {
        return match value {
            InputValue::List(items) => items
                .iter()
                .enumerate()
                .flat_map(|(i, item)| {
                    literal_value_errors(schema, item_type, &item.item)
                        .into_iter()
                        .map(move |e| format!("In element #{i}: {e}"))
                })
                .collect(),
            v => literal_value_errors(schema, item_type, v),
        };
    }

    let Some(meta) = schema.innermost_concrete_type(ty) else {
        return vec![format!(r#"Unknown type "{}"."#, ty.innermost_name())];
    };

    match meta {
        MetaType::InputObject(io) => {
            let InputValue::Object(fields) = value else {
                return vec![format!(r#"Expected "{}", found not an object."#, io.name)];
            };

            let mut errors = vec![];
            let mut provided = FnvHashSet::default();
            for field in fields {
                provided.insert(&field.name.item);
                if !io.input_fields.contains_key(&field.name.item) {
                    errors.push(format!(r#"In field "{}": Unknown field."#, field.name.item));
                }
            }
            for (name, def) in &io.input_fields {
                let field_value = fields
                    .iter()
                    .find(|f| &f.name.item == name)
                    .map_or(&InputValue::Null, |f| &f.value.item);
                if !provided.contains(name) && def.default_value.is_some() {
                    continue;
                }
                errors.extend(
                    literal_value_errors(schema, &def.arg_type, field_value)
                        .into_iter()
                        .map(|e| format!(r#"In field "{name}": {e}"#)),
                );
            }
            errors
        }
        MetaType::Enum(e) => match value {
            InputValue::Enum(name) if e.values.contains_key(name) => vec![],
            v => vec![format!(r#"Expected type "{}", found {v}."#, e.name)],
        },
        MetaType::Scalar(s) => match (s.parse_literal)(value) {
            Some(_) => vec![],
            None => vec![format!(r#"Expected type "{}", found {value}."#, s.name)],
        },
        other => vec![format!(r#"Expected input type, found "{}"."#, other.name())],
    }
}
