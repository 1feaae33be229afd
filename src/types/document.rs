use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;

use crate::types::ROW_KEY_FIELD;

/// One timestamped sighting of a qualifier's value within a row.
///
/// Timestamps travel as strings for host compatibility; the schema constrains
/// them to digit-only patterns.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct Observation {
    pub timestamp: String,
    pub value: Value,
}

/// A reconstructed row: the primary-key field plus one map per column family,
/// each family mapping qualifier name to its observation list.
///
/// Exactly one document exists per distinct row key for the duration of one
/// table's processing. Families and qualifiers keep first-sighting order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Document {
    pub row_key: String,
    pub families: IndexMap<String, IndexMap<String, Vec<Observation>>>,
}

impl Document {
    pub fn new(row_key: impl Into<String>) -> Document {
        Document {
            row_key: row_key.into(),
            families: IndexMap::new(),
        }
    }

    /// Appends a sighting to the qualifier's observation list, creating the
    /// family and qualifier nodes on first sight.
    pub fn push_observation(&mut self, family: &str, qualifier: &str, observation: Observation) {
        self.families
            .entry(family.to_owned())
            .or_default()
            .entry(qualifier.to_owned())
            .or_default()
            .push(observation);
    }

    pub fn observations(&self, family: &str, qualifier: &str) -> Option<&[Observation]> {
        self.families
            .get(family)
            .and_then(|f| f.get(qualifier))
            .map(Vec::as_slice)
    }
}

impl Serialize for Document {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.families.len() + 1))?;
        map.serialize_entry(ROW_KEY_FIELD, &self.row_key)?;
        for (family, qualifiers) in &self.families {
            map.serialize_entry(family, qualifiers)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_push_observation_creates_nodes() {
        let mut doc = Document::new("r1");

        doc.push_observation(
            "cf",
            "a",
            Observation {
                timestamp: "1".into(),
                value: json!(5),
            },
        );
        doc.push_observation(
            "cf",
            "a",
            Observation {
                timestamp: "2".into(),
                value: json!("raw"),
            },
        );

        assert_eq!(doc.observations("cf", "a").unwrap().len(), 2);
        assert!(doc.observations("cf", "b").is_none());
    }

    #[test]
    fn test_document_serializes_with_row_key_first() {
        let mut doc = Document::new("user#42");
        doc.push_observation(
            "profile",
            "name",
            Observation {
                timestamp: "1700000000000".into(),
                value: json!("Ada"),
            },
        );

        let serialized = serde_json::to_value(&doc).unwrap();
        assert_eq!(
            serialized,
            json!({
                "Row Key": "user#42",
                "profile": {
                    "name": [{"timestamp": "1700000000000", "value": "Ada"}]
                }
            })
        );
    }
}
