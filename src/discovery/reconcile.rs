use std::collections::HashMap;

use serde_json::Value;

use crate::{
    discovery::decode::{DecodedValue, decode_value},
    types::{Document, Observation, QualifierSchema, TableSchema, ValueType},
};

/// One unit from a scan result, already base64-decoded by the wire layer.
#[derive(Clone, Debug, PartialEq)]
pub struct Cell {
    pub row_key: String,
    /// Encoded as `"family:qualifier"`.
    pub column: String,
    pub timestamp: i64,
    pub raw_value: String,
}

impl Cell {
    /// Splits the column on the first `:` into family and qualifier.
    ///
    /// A column without a separator is a data-quality fault in the source;
    /// the whole string is treated as the family with an empty qualifier so a
    /// single bad cell cannot fail the scan.
    pub fn split_column(&self) -> (&str, &str) {
        match self.column.split_once(':') {
            Some((family, qualifier)) => (family, qualifier),
            None => (self.column.as_str(), ""),
        }
    }
}

/// Folds one cell into the accumulating (document, schema) pair for its row.
///
/// Mutates both in place; no I/O. The qualifier's inferred type is fixed at
/// first sight. Once any observation of a qualifier fails structured
/// decoding, the type degrades to opaque and later values for that qualifier
/// are stored raw without attempting a decode.
pub fn reconcile_cell(cell: &Cell, schema: &mut TableSchema, document: &mut Document) {
    let (family, qualifier) = cell.split_column();

    let family_schema = schema.family_mut(family);
    let value: Value = match family_schema.properties.get_mut(qualifier) {
        Some(qualifier_schema) if qualifier_schema.is_opaque() => {
            Value::String(cell.raw_value.clone())
        }
        Some(qualifier_schema) => match decode_value(&cell.raw_value) {
            DecodedValue::Decoded(value, _) => value,
            DecodedValue::Opaque(raw) => {
                qualifier_schema.degrade();
                Value::String(raw)
            }
        },
        None => {
            let decoded = decode_value(&cell.raw_value);
            family_schema.properties.insert(
                qualifier.to_owned(),
                QualifierSchema::new(decoded.value_type()),
            );
            decoded.into_value()
        }
    };

    document.push_observation(
        family,
        qualifier,
        Observation {
            timestamp: cell.timestamp.to_string(),
            value,
        },
    );
}

/// The final output of one table's fold: documents in first-sighting order of
/// their row keys, plus the merged schema fragment.
#[derive(Clone, Debug, Default)]
pub struct SampleSet {
    pub documents: Vec<Document>,
    pub schema: TableSchema,
}

/// Drives the reconciler over an ordered cell stream, deduplicating by row
/// key.
///
/// Complexity is O(cells); memory is bounded by the number of distinct rows
/// and their attributes. An empty stream yields no documents and an untouched
/// schema.
#[derive(Debug, Default)]
pub struct RowAggregator {
    documents: Vec<Document>,
    schema: TableSchema,
    seen: HashMap<String, usize>,
}

impl RowAggregator {
    pub fn new() -> RowAggregator {
        RowAggregator::default()
    }

    pub fn fold(&mut self, cell: &Cell) {
        let index = match self.seen.get(&cell.row_key) {
            Some(index) => *index,
            None => {
                self.documents.push(Document::new(cell.row_key.clone()));
                let index = self.documents.len() - 1;
                self.seen.insert(cell.row_key.clone(), index);
                index
            }
        };

        reconcile_cell(cell, &mut self.schema, &mut self.documents[index]);
    }

    pub fn extend<I: IntoIterator<Item = Cell>>(&mut self, cells: I) {
        for cell in cells {
            self.fold(&cell);
        }
    }

    pub fn finish(self) -> SampleSet {
        SampleSet {
            documents: self.documents,
            schema: self.schema,
        }
    }
}
