use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;

use crate::types::{ROW_KEY_FIELD, ValueType};

const ROW_KEY_PATTERN: &str = "^[a-zA-Z0-9_.-]*$";
const TIMESTAMP_PATTERN: &str = "^[0-9]+$";

/// Descriptor for the synthetic primary-key field.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RowKeySchema;

impl Serialize for RowKeySchema {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(3))?;
        map.serialize_entry("type", "string")?;
        map.serialize_entry("key", &true)?;
        map.serialize_entry("pattern", ROW_KEY_PATTERN)?;
        map.end()
    }
}

/// Inferred type information for one column qualifier.
///
/// The value type is fixed at first sight and only ever moves to [`ValueType::Byte`]
/// when a later observation fails structured decoding. The degradation is
/// sticky: it never reverts, even if subsequent raw values are valid JSON.
#[derive(Clone, Debug, PartialEq)]
pub struct QualifierSchema {
    pub value_type: ValueType,
}

impl QualifierSchema {
    pub fn new(value_type: ValueType) -> QualifierSchema {
        QualifierSchema { value_type }
    }

    pub fn is_opaque(&self) -> bool {
        self.value_type == ValueType::Byte
    }

    pub fn degrade(&mut self) {
        self.value_type = ValueType::Byte;
    }
}

impl Serialize for QualifierSchema {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let items = serde_json::json!({
            "type": "object",
            "properties": {
                "timestamp": {"type": "string", "pattern": TIMESTAMP_PATTERN},
                "value": {"type": self.value_type},
            }
        });

        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("type", "colQual")?;
        map.serialize_entry("items", &items)?;
        map.end()
    }
}

/// Schema node for one column family: sampled qualifiers plus family-level
/// configuration written by the enricher.
///
/// Qualifier properties only ever accumulate; nothing is removed once seen.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FamilySchema {
    pub properties: IndexMap<String, QualifierSchema>,
    pub config: IndexMap<String, Value>,
}

impl Serialize for FamilySchema {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let qualifiers = usize::from(!self.properties.is_empty());
        let mut map = serializer.serialize_map(Some(1 + qualifiers + self.config.len()))?;
        map.serialize_entry("type", "colFam")?;
        if !self.properties.is_empty() {
            map.serialize_entry("properties", &self.properties)?;
        }
        for (keyword, value) in &self.config {
            map.serialize_entry(keyword, value)?;
        }
        map.end()
    }
}

/// The merged, incrementally-refined schema for one table.
///
/// Shared between the row aggregator (during the fold) and the column-family
/// enricher (after sampling); processing is single-threaded per table.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TableSchema {
    pub row_key: RowKeySchema,
    pub families: IndexMap<String, FamilySchema>,
}

impl TableSchema {
    pub fn new() -> TableSchema {
        TableSchema::default()
    }

    /// Returns the family node, creating a bare one on first sight.
    pub fn family_mut(&mut self, family: &str) -> &mut FamilySchema {
        self.families.entry(family.to_owned()).or_default()
    }

    pub fn qualifier(&self, family: &str, qualifier: &str) -> Option<&QualifierSchema> {
        self.families
            .get(family)
            .and_then(|f| f.properties.get(qualifier))
    }
}

impl Serialize for TableSchema {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut properties = IndexMap::new();
        properties.insert(
            ROW_KEY_FIELD.to_owned(),
            serde_json::to_value(&self.row_key).map_err(serde::ser::Error::custom)?,
        );
        for (name, family) in &self.families {
            properties.insert(
                name.clone(),
                serde_json::to_value(family).map_err(serde::ser::Error::custom)?,
            );
        }

        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry("properties", &properties)?;
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_qualifier_degradation_is_one_way() {
        let mut qualifier = QualifierSchema::new(ValueType::Number);
        assert!(!qualifier.is_opaque());

        qualifier.degrade();
        assert!(qualifier.is_opaque());
        assert_eq!(qualifier.value_type, ValueType::Byte);
    }

    #[test]
    fn test_schema_serialization_shape() {
        let mut schema = TableSchema::new();
        schema
            .family_mut("cf")
            .properties
            .insert("a".into(), QualifierSchema::new(ValueType::Number));
        schema.family_mut("cf").config.insert("ttl".into(), json!(3600));

        let serialized = serde_json::to_value(&schema).unwrap();
        assert_eq!(
            serialized,
            json!({
                "properties": {
                    "Row Key": {
                        "type": "string",
                        "key": true,
                        "pattern": "^[a-zA-Z0-9_.-]*$"
                    },
                    "cf": {
                        "type": "colFam",
                        "properties": {
                            "a": {
                                "type": "colQual",
                                "items": {
                                    "type": "object",
                                    "properties": {
                                        "timestamp": {"type": "string", "pattern": "^[0-9]+$"},
                                        "value": {"type": "number"}
                                    }
                                }
                            }
                        },
                        "ttl": 3600
                    }
                }
            })
        );
    }

    #[test]
    fn test_unsampled_family_serializes_bare() {
        let mut schema = TableSchema::new();
        schema.family_mut("empty");

        let serialized = serde_json::to_value(&schema).unwrap();
        assert_eq!(serialized["properties"]["empty"], json!({"type": "colFam"}));
    }
}
