use num_traits::ToPrimitive;
use serde_json::Value as JsonValue;
use thiserror::Error;

use crate::value::{Object, Value};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValueError {
    #[error("Unsupported value type for JSON: {0}")]
    UnsupportedValue(String),

    #[error("Invalid number: cannot represent {0} as JSON number")]
    NonFiniteNumber(String),

    #[error("BigInt {0} is out of range for a JSON number")]
    BigIntOutOfRange(String),

    #[error("Invalid date cannot be represented in JSON")]
    InvalidDate,
}

impl From<JsonValue> for Value {
    fn from(json: JsonValue) -> Self {
        match json {
            JsonValue::Null => Value::Null,
            JsonValue::Bool(b) => Value::Bool(b),
            JsonValue::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            JsonValue::String(s) => Value::String(s),
            JsonValue::Array(items) => Value::Array(items.into_iter().map(Value::from).collect()),
            JsonValue::Object(map) => Value::Object(
                map.into_iter()
                    .map(|(key, value)| (key, Value::from(value)))
                    .collect(),
            ),
        }
    }
}

impl Value {
    /// Converts to JSON. Undefined object members are dropped and undefined
    /// array elements become `null`; dates become RFC 3339 strings.
    pub fn to_json(&self) -> Result<JsonValue, ValueError> {
        match self {
            Value::Undefined => Err(ValueError::UnsupportedValue("undefined".to_string())),
            Value::Null => Ok(JsonValue::Null),
            Value::Bool(b) => Ok(JsonValue::Bool(*b)),
            Value::Number(n) => number_to_json(*n),
            Value::BigInt(n) => {
                if let Some(i) = n.to_i64() {
                    return Ok(JsonValue::Number(i.into()));
                }
                if let Some(u) = n.to_u64() {
                    return Ok(JsonValue::Number(u.into()));
                }
                Err(ValueError::BigIntOutOfRange(n.to_string()))
            }
            Value::String(s) => Ok(JsonValue::String(s.clone())),
            Value::Date(d) if d.is_valid() => Ok(JsonValue::String(d.to_string())),
            Value::Date(_) => Err(ValueError::InvalidDate),
            Value::Array(items) => items
                .iter()
                .map(|item| match item {
                    Value::Undefined => Ok(JsonValue::Null),
                    other => other.to_json(),
                })
                .collect::<Result<Vec<_>, _>>()
                .map(JsonValue::Array),
            Value::Object(object) => object_to_json(object),
            Value::Symbol(_) | Value::Map(_) | Value::Set(_) => {
                Err(ValueError::UnsupportedValue(self.value_type().to_string()))
            }
        }
    }
}

fn number_to_json(n: f64) -> Result<JsonValue, ValueError> {
    if n.fract() == 0.0 && n.abs() < 9_007_199_254_740_992.0 {
        return Ok(JsonValue::Number((n as i64).into()));
    }
    serde_json::Number::from_f64(n)
        .map(JsonValue::Number)
        .ok_or_else(|| ValueError::NonFiniteNumber(crate::value::format_number(n)))
}

fn object_to_json(object: &Object) -> Result<JsonValue, ValueError> {
    let mut result = serde_json::Map::new();
    for (key, value) in object {
        if value.is_undefined() {
            continue;
        }
        result.insert(key.clone(), value.to_json()?);
    }
    Ok(JsonValue::Object(result))
}

impl TryFrom<&Value> for JsonValue {
    type Error = ValueError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        value.to_json()
    }
}
