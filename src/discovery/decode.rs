use serde_json::Value;

use crate::types::ValueType;

/// Outcome of classifying one raw cell value.
///
/// Parse failure is an expected branch, not an error: the raw text is carried
/// through unchanged as opaque bytes.
#[derive(Clone, Debug, PartialEq)]
pub enum DecodedValue {
    Decoded(Value, ValueType),
    Opaque(String),
}

impl DecodedValue {
    /// The value as it lands in a document observation.
    pub fn into_value(self) -> Value {
        match self {
            DecodedValue::Decoded(value, _) => value,
            DecodedValue::Opaque(raw) => Value::String(raw),
        }
    }

    pub fn value_type(&self) -> ValueType {
        match self {
            DecodedValue::Decoded(_, value_type) => *value_type,
            DecodedValue::Opaque(_) => ValueType::Byte,
        }
    }
}

/// Attempts a structured parse of a raw cell value and classifies the result.
///
/// Stickiness across repeated sightings of the same qualifier is the
/// reconciler's concern, not this function's; each call is independent.
pub fn decode_value(raw: &str) -> DecodedValue {
    match serde_json::from_str::<Value>(raw) {
        Ok(value) => {
            let value_type = classify(&value);
            DecodedValue::Decoded(value, value_type)
        }
        Err(_) => DecodedValue::Opaque(raw.to_owned()),
    }
}

fn classify(value: &Value) -> ValueType {
    match value {
        Value::Null => ValueType::Null,
        Value::Bool(_) => ValueType::Boolean,
        Value::Number(_) => ValueType::Number,
        Value::String(_) => ValueType::String,
        Value::Array(_) => ValueType::Array,
        Value::Object(_) => ValueType::Object,
    }
}
