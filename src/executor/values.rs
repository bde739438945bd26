use std::sync::Arc;

use arcstr::ArcStr;
use indexmap::IndexMap;

use crate::{
    ast::{self, InputValue, Type, VariableDefinition},
    executor::{Arguments, FieldError, FieldResult},
    schema::{
        meta::{Argument, MetaType},
        model::Schema,
    },
    validation::RuleError,
    value::{Object, Value},
};

/// Coerces the variable values of a request against the operation's
/// variable definitions.
///
/// Variables with neither a value nor a default are left out of the result.
pub(crate) fn coerce_variable_values(
    schema: &Schema,
    definitions: &[Arc<VariableDefinition>],
    inputs: &Object,
) -> Result<Object, Vec<RuleError>> {
    let mut coerced = Object::with_capacity(definitions.len());
    let mut errors = vec![];

    for def in definitions {
        let name = &def.variable.item;
        let var_type = def.var_type.to_type();
        let locations = [def.span.start];

        if !schema
            .innermost_concrete_type(&var_type)
            .is_some_and(MetaType::is_input)
        {
            errors.push(RuleError::new(
                &format!(
                    "Variable \"${name}\" expected value of type \"{var_type}\" which cannot be \
                     used as an input type.",
                ),
                &locations,
            ));
            continue;
        }

        let Some(value) = inputs.get_field_value(name) else {
            if let Some(default) = &def.default_value {
                if let Some(v) = coerce_literal(schema, &default.item, &var_type, None) {
                    coerced.add_field(name.as_str(), v);
                }
            } else if var_type.is_non_null() {
                errors.push(RuleError::new(
                    &format!(
                        "Variable \"${name}\" of required type \"{var_type}\" was not provided.",
                    ),
                    &locations,
                ));
            }
            continue;
        };

        if value.is_null() && var_type.is_non_null() {
            errors.push(RuleError::new(
                &format!("Variable \"${name}\" of non-null type \"{var_type}\" must not be null."),
                &locations,
            ));
            continue;
        }

        match coerce_input_value(schema, value, &var_type) {
            Ok(v) => {
                coerced.add_field(name.as_str(), v);
            }
            Err(reason) => errors.push(RuleError::new(
                &format!("Variable \"${name}\" got invalid value {value}; {reason}"),
                &locations,
            )),
        }
    }

    if errors.is_empty() {
        Ok(coerced)
    } else {
        Err(errors)
    }
}

/// Coerces a runtime input value, such as a variable value, to `ty`.
///
/// The error is the reason the value is rejected.
pub(crate) fn coerce_input_value(schema: &Schema, value: &Value, ty: &Type) -> Result<Value, String> {
    if value.is_null() {
        return if ty.is_non_null() {
            Err(format!("Expected non-nullable type \"{ty}\" not to be null."))
        } else {
            Ok(Value::Null)
        };
    }

    if let Some(item_type) = ty.list_contents() {
        return match value {
            Value::List(items) => items
                .iter()
                .enumerate()
                .map(|(i, item)| {
                    coerce_input_value(schema, item, item_type)
                        .map_err(|reason| format!("In element #{i}: {reason}"))
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Value::List),
            single => coerce_input_value(schema, single, item_type).map(|v| Value::list(vec![v])),
        };
    }

    let name = ty.innermost_name();
    let Some(meta) = schema.concrete_type_by_name(name) else {
        return Err(format!("Unknown type \"{name}\"."));
    };

    match meta {
        MetaType::Scalar(s) => (s.parse_value)(value).ok_or_else(|| format!("Expected type \"{name}\".")),
        MetaType::Enum(e) => value
            .as_string_value()
            .and_then(|s| e.values.get(s))
            .map(|v| v.value.clone())
            .ok_or_else(|| format!("Value {value} does not exist in \"{name}\" enum.")),
        MetaType::InputObject(io) => {
            let Some(obj) = value.as_object_value() else {
                return Err(format!("Expected type \"{name}\" to be an object."));
            };
            if let Some((unknown, _)) = obj.iter().find(|(k, _)| !io.input_fields.contains_key(k.as_str())) {
                return Err(format!("Field \"{unknown}\" is not defined by type \"{name}\"."));
            }

            let mut fields = Object::with_capacity(io.input_fields.len());
            for (field_name, field) in &io.input_fields {
                match obj.get_field_value(field_name) {
                    Some(v) => {
                        let v = coerce_input_value(schema, v, &field.arg_type)
                            .map_err(|reason| format!("In field \"{field_name}\": {reason}"))?;
                        fields.add_field(field_name.as_str(), v);
                    }
                    None => {
                        if let Some(default) = &field.default_value {
                            if let Some(v) = coerce_literal(schema, default, &field.arg_type, None) {
                                fields.add_field(field_name.as_str(), v);
                            }
                        } else if field.arg_type.is_non_null() {
                            return Err(format!(
                                "Field \"{field_name}\" of required type \"{}\" was not provided.",
                                field.arg_type,
                            ));
                        }
                    }
                }
            }
            Ok(Value::Object(fields))
        }
        MetaType::Object(_) | MetaType::Interface(_) | MetaType::Union(_) => {
            Err(format!("Type \"{name}\" is not an input type."))
        }
    }
}

/// Coerces a literal from the document to `ty`, substituting variables from
/// `variables`.
///
/// Returns `None` when the literal is invalid, or when it refers to a
/// variable that has no value.
pub(crate) fn coerce_literal(
    schema: &Schema,
    literal: &InputValue,
    ty: &Type,
    variables: Option<&Object>,
) -> Option<Value> {
    if let InputValue::Variable(name) = literal {
        let value = variables?.get_field_value(name)?;
        return (!(value.is_null() && ty.is_non_null())).then(|| value.clone());
    }

    if matches!(literal, InputValue::Null) {
        return (!ty.is_non_null()).then_some(Value::Null);
    }

    if let Some(item_type) = ty.list_contents() {
        let InputValue::List(items) = literal else {
            return coerce_literal(schema, literal, item_type, variables).map(|v| Value::list(vec![v]));
        };
        let mut coerced = Vec::with_capacity(items.len());
        for item in items {
            if is_missing_variable(&item.item, variables) {
                if item_type.is_non_null() {
                    return None;
                }
                coerced.push(Value::Null);
            } else {
                coerced.push(coerce_literal(schema, &item.item, item_type, variables)?);
            }
        }
        return Some(Value::List(coerced));
    }

    match schema.innermost_concrete_type(ty)? {
        MetaType::Scalar(s) => (s.parse_literal)(literal),
        MetaType::Enum(e) => match literal {
            InputValue::Enum(name) => e.values.get(name.as_str()).map(|v| v.value.clone()),
            _ => None,
        },
        MetaType::InputObject(io) => {
            let InputValue::Object(fields) = literal else {
                return None;
            };
            let mut coerced = Object::with_capacity(io.input_fields.len());
            for (field_name, field) in &io.input_fields {
                let given = fields
                    .iter()
                    .find(|f| &f.name.item == field_name)
                    .filter(|f| !is_missing_variable(&f.value.item, variables));
                match given {
                    Some(f) => {
                        let v = coerce_literal(schema, &f.value.item, &field.arg_type, variables)?;
                        coerced.add_field(field_name.as_str(), v);
                    }
                    None => {
                        if let Some(default) = &field.default_value {
                            let v = coerce_literal(schema, default, &field.arg_type, None)?;
                            coerced.add_field(field_name.as_str(), v);
                        } else if field.arg_type.is_non_null() {
                            return None;
                        }
                    }
                }
            }
            Some(Value::Object(coerced))
        }
        MetaType::Object(_) | MetaType::Interface(_) | MetaType::Union(_) => None,
    }
}

fn is_missing_variable(literal: &InputValue, variables: Option<&Object>) -> bool {
    match literal {
        InputValue::Variable(name) => variables.is_none_or(|vars| !vars.contains_field(name)),
        _ => false,
    }
}

/// Coerces the arguments given to a field or directive against their
/// definitions.
///
/// # Errors
///
/// Fails on the first required argument that has no value, or on the first
/// argument whose value does not coerce.
pub(crate) fn argument_values(
    schema: &Schema,
    definitions: &IndexMap<ArcStr, Argument>,
    arguments: &[Arc<ast::Argument>],
    variables: &Object,
) -> FieldResult<Arguments> {
    let mut coerced = IndexMap::with_capacity(definitions.len());

    for (name, def) in definitions {
        let arg_type = &def.arg_type;
        let Some(arg) = arguments.iter().find(|a| &a.name.item == name) else {
            if let Some(default) = &def.default_value {
                coerced.insert(name.clone(), default_value(schema, default, def)?);
            } else if arg_type.is_non_null() {
                return Err(FieldError::from(format!(
                    "Argument \"{name}\" of required type \"{arg_type}\" was not provided.",
                )));
            }
            continue;
        };

        let literal = &arg.value.item;
        let is_null = match literal {
            InputValue::Variable(var) => match variables.get_field_value(var) {
                Some(v) => v.is_null(),
                None => {
                    if let Some(default) = &def.default_value {
                        coerced.insert(name.clone(), default_value(schema, default, def)?);
                    } else if arg_type.is_non_null() {
                        return Err(FieldError::from(format!(
                            "Argument \"{name}\" of required type \"{arg_type}\" was provided the \
                             variable \"${var}\" which was not provided a runtime value.",
                        )));
                    }
                    continue;
                }
            },
            InputValue::Null => true,
            _ => false,
        };

        if is_null && arg_type.is_non_null() {
            return Err(FieldError::from(format!(
                "Argument \"{name}\" of non-null type \"{arg_type}\" must not be null.",
            )));
        }

        let value = coerce_literal(schema, literal, arg_type, Some(variables))
            .ok_or_else(|| FieldError::from(format!("Argument \"{name}\" has invalid value {literal}.")))?;
        coerced.insert(name.clone(), value);
    }

    Ok(Arguments::new(coerced))
}

fn default_value(schema: &Schema, default: &InputValue, def: &Argument) -> FieldResult<Value> {
    coerce_literal(schema, default, &def.arg_type, None).ok_or_else(|| {
        FieldError::from(format!(
            "Argument \"{}\" has invalid default value {default}.",
            def.name,
        ))
    })
}
