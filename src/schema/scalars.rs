use crate::{
    ast::InputValue,
    schema::meta::{MetaType, ScalarMeta},
    value::{ScalarValue, Value},
};

/// `Int`, `Float`, `String`, `Boolean` and `ID`.
pub(crate) fn builtin_scalars() -> Vec<MetaType> {
    vec![
        ScalarMeta::new("Int", serialize_int, parse_int_value, parse_int_literal)
            .description(
                "The `Int` scalar type represents non-fractional signed whole numeric values. \
                 Int can represent values between -(2^31) and 2^31 - 1.",
            )
            .into_meta(),
        ScalarMeta::new("Float", serialize_float, parse_float_value, parse_float_literal)
            .description(
                "The `Float` scalar type represents signed double-precision fractional values \
                 as specified by IEEE 754.",
            )
            .into_meta(),
        ScalarMeta::new("String", serialize_string, parse_string_value, parse_string_literal)
            .description(
                "The `String` scalar type represents textual data, represented as UTF-8 \
                 character sequences.",
            )
            .into_meta(),
        ScalarMeta::new(
            "Boolean",
            serialize_boolean,
            parse_boolean_value,
            parse_boolean_literal,
        )
        .description("The `Boolean` scalar type represents `true` or `false`.")
        .into_meta(),
        ScalarMeta::new("ID", serialize_id, parse_id_value, parse_id_literal)
            .description(
                "The `ID` scalar type represents a unique identifier. It is serialized as a \
                 string, and accepts both string and integer inputs.",
            )
            .into_meta(),
    ]
}

fn int_from_float(f: f64) -> Option<i32> {
    // Rejects fractions, NaN and out-of-range values.
    (f.fract() == 0.0 && f >= f64::from(i32::MIN) && f <= f64::from(i32::MAX)).then(|| f as i32)
}

fn serialize_int(v: &Value) -> Option<Value> {
    let i = match v.as_scalar()? {
        ScalarValue::Int(i) => *i,
        ScalarValue::Float(f) => int_from_float(*f)?,
        ScalarValue::String(s) => s.trim().parse().ok()?,
        ScalarValue::Boolean(b) => i32::from(*b),
    };
    Some(Value::scalar(i))
}

fn parse_int_value(v: &Value) -> Option<Value> {
    match v.as_scalar()? {
        ScalarValue::Int(i) => Some(Value::scalar(*i)),
        ScalarValue::Float(f) => int_from_float(*f).map(Value::scalar),
        ScalarValue::String(_) | ScalarValue::Boolean(_) => None,
    }
}

fn parse_int_literal(v: &InputValue) -> Option<Value> {
    match v {
        InputValue::Int(raw) => raw.parse::<i32>().ok().map(Value::scalar),
        _ => None,
    }
}

fn serialize_float(v: &Value) -> Option<Value> {
    let f = match v.as_scalar()? {
        ScalarValue::Int(i) => f64::from(*i),
        ScalarValue::Float(f) => *f,
        ScalarValue::String(s) => s.trim().parse().ok()?,
        ScalarValue::Boolean(b) => f64::from(u8::from(*b)),
    };
    f.is_finite().then(|| Value::scalar(f))
}

fn parse_float_value(v: &Value) -> Option<Value> {
    v.as_float_value().map(Value::scalar)
}

fn parse_float_literal(v: &InputValue) -> Option<Value> {
    match v {
        InputValue::Int(raw) | InputValue::Float(raw) => {
            raw.parse::<f64>().ok().filter(|f| f.is_finite()).map(Value::scalar)
        }
        _ => None,
    }
}

fn serialize_string(v: &Value) -> Option<Value> {
    let s = match v.as_scalar()? {
        ScalarValue::String(s) => s.clone(),
        other @ (ScalarValue::Int(_) | ScalarValue::Float(_)) => other.to_string(),
        ScalarValue::Boolean(b) => b.to_string(),
    };
    Some(Value::scalar(s))
}

fn parse_string_value(v: &Value) -> Option<Value> {
    v.as_string_value().map(Value::scalar)
}

fn parse_string_literal(v: &InputValue) -> Option<Value> {
    match v {
        InputValue::String(s) => Some(Value::scalar(s.as_str())),
        _ => None,
    }
}

fn serialize_boolean(v: &Value) -> Option<Value> {
    let b = match v.as_scalar()? {
        ScalarValue::Boolean(b) => *b,
        ScalarValue::Int(i) => *i != 0,
        ScalarValue::Float(f) => *f != 0.0,
        ScalarValue::String(_) => return None,
    };
    Some(Value::scalar(b))
}

fn parse_boolean_value(v: &Value) -> Option<Value> {
    v.as_boolean_value().map(Value::scalar)
}

fn parse_boolean_literal(v: &InputValue) -> Option<Value> {
    match v {
        InputValue::Boolean(b) => Some(Value::scalar(*b)),
        _ => None,
    }
}

fn serialize_id(v: &Value) -> Option<Value> {
    match v.as_scalar()? {
        ScalarValue::String(s) => Some(Value::scalar(s.as_str())),
        ScalarValue::Int(i) => Some(Value::scalar(i.to_string())),
        ScalarValue::Float(_) | ScalarValue::Boolean(_) => None,
    }
}

fn parse_id_value(v: &Value) -> Option<Value> {
    serialize_id(v)
}

fn parse_id_literal(v: &InputValue) -> Option<Value> {
    match v {
        InputValue::String(s) => Some(Value::scalar(s.as_str())),
        InputValue::Int(raw) => Some(Value::scalar(raw.as_str())),
        _ => None,
    }
}
