use serde::Serialize;

mod document;
mod schema;

pub use document::{Document, Observation};
pub use schema::{FamilySchema, QualifierSchema, RowKeySchema, TableSchema};

/// Name of the synthetic primary-key field every document carries.
pub const ROW_KEY_FIELD: &str = "Row Key";

/// Inferred type tag for a cell value.
///
/// A value that parses as JSON is classified by its structural kind; anything
/// that does not parse is opaque bytes. `Byte` is sticky per qualifier: once a
/// qualifier has seen one undecodable value it stays `Byte` for the rest of
/// the table (see the reconciler).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    Null,
    Boolean,
    Number,
    String,
    Array,
    Object,
    Byte,
}

impl std::fmt::Display for ValueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Boolean => write!(f, "boolean"),
            Self::Number => write!(f, "number"),
            Self::String => write!(f, "string"),
            Self::Array => write!(f, "array"),
            Self::Object => write!(f, "object"),
            Self::Byte => write!(f, "byte"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_type_serializes_lowercase() {
        let tag = serde_json::to_value(ValueType::Byte).unwrap();
        assert_eq!(tag, serde_json::json!("byte"));

        let tag = serde_json::to_value(ValueType::Boolean).unwrap();
        assert_eq!(tag, serde_json::json!("boolean"));
    }
}
