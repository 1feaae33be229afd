use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;

use crate::types::TableSchema;

/// Canonical "true" token used by the gateway for boolean family attributes.
const TRUE_TOKEN: &str = "TRUE";

/// Target type for a mapped column-family property.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PropertyKind {
    Number,
    Boolean,
    String,
}

/// One entry of the declarative descriptor-to-schema mapping: which raw
/// descriptor field feeds which schema keyword, and how it converts.
#[derive(Clone, Copy, Debug)]
pub struct PropertyMapping {
    pub property_keyword: &'static str,
    pub schema_keyword: &'static str,
    pub kind: PropertyKind,
}

/// Ordered mapping from raw descriptor fields to family schema properties.
///
/// Application order is fixed; entries sharing a `property_keyword` are
/// applied unconditionally in list order, so the later one wins. `ttl` is
/// listed twice on purpose: the `TTL` source overrides the `VERSIONS` one.
pub const COLUMN_FAMILY_MAPPINGS: [PropertyMapping; 11] = [
    PropertyMapping {
        property_keyword: "dataBlockEncoding",
        schema_keyword: "DATA_BLOCK_ENCODING",
        kind: PropertyKind::String,
    },
    PropertyMapping {
        property_keyword: "bloomfilter",
        schema_keyword: "BLOOMFILTER",
        kind: PropertyKind::String,
    },
    PropertyMapping {
        property_keyword: "replicationScope",
        schema_keyword: "REPLICATION_SCOPE",
        kind: PropertyKind::String,
    },
    PropertyMapping {
        property_keyword: "ttl",
        schema_keyword: "VERSIONS",
        kind: PropertyKind::Number,
    },
    PropertyMapping {
        property_keyword: "compression",
        schema_keyword: "COMPRESSION",
        kind: PropertyKind::String,
    },
    PropertyMapping {
        property_keyword: "ttl",
        schema_keyword: "TTL",
        kind: PropertyKind::Number,
    },
    PropertyMapping {
        property_keyword: "minVersions",
        schema_keyword: "MIN_VERSIONS",
        kind: PropertyKind::Number,
    },
    PropertyMapping {
        property_keyword: "keepDeletedCells",
        schema_keyword: "KEEP_DELETED_CELLS",
        kind: PropertyKind::Boolean,
    },
    PropertyMapping {
        property_keyword: "blocksize",
        schema_keyword: "BLOCKSIZE",
        kind: PropertyKind::Number,
    },
    PropertyMapping {
        property_keyword: "inMemory",
        schema_keyword: "IN_MEMORY",
        kind: PropertyKind::Boolean,
    },
    PropertyMapping {
        property_keyword: "blockcache",
        schema_keyword: "BLOCKCACHE",
        kind: PropertyKind::Boolean,
    },
];

/// Table descriptor fetched once per table from the schema endpoint.
///
/// Read-only input to the enricher. Family attributes arrive as raw
/// string-valued fields alongside the family name.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct TableDescriptor {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "ColumnSchema", default)]
    pub column_schema: Vec<ColumnFamilyRecord>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ColumnFamilyRecord {
    pub name: String,
    #[serde(flatten)]
    pub attributes: IndexMap<String, Value>,
}

impl ColumnFamilyRecord {
    /// Raw attribute text; gateway descriptors are string-valued but numeric
    /// JSON is tolerated.
    fn attribute(&self, keyword: &str) -> Option<String> {
        match self.attributes.get(keyword)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }
}

/// Merges family-level metadata from the table descriptor into the inferred
/// schema.
///
/// Every family named by the descriptor ends up in the schema, including
/// families with zero sampled cells, which surface as bare `colFam` nodes
/// carrying only metadata. Attributes the descriptor does not carry (or
/// carries unparsable) leave no key. Application is idempotent.
pub fn enrich_schema(schema: &mut TableSchema, descriptor: &TableDescriptor) {
    for record in &descriptor.column_schema {
        let family = schema.family_mut(&record.name);

        for mapping in &COLUMN_FAMILY_MAPPINGS {
            let Some(raw) = record.attribute(mapping.schema_keyword) else {
                continue;
            };

            let converted = match mapping.kind {
                PropertyKind::Number => match parse_number(&raw) {
                    Some(value) => value,
                    None => continue,
                },
                PropertyKind::Boolean => Value::Bool(raw == TRUE_TOKEN),
                PropertyKind::String => Value::String(raw),
            };

            family
                .config
                .insert(mapping.property_keyword.to_owned(), converted);
        }
    }
}

fn parse_number(raw: &str) -> Option<Value> {
    if let Ok(integer) = raw.trim().parse::<i64>() {
        return Some(Value::from(integer));
    }

    raw.trim()
        .parse::<f64>()
        .ok()
        .and_then(serde_json::Number::from_f64)
        .map(Value::Number)
}
