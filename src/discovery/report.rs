use serde::Serialize;

use crate::types::{Document, TableSchema};

/// Namespace/table names discovered up front, before any sampling.
#[derive(Clone, Debug, Serialize)]
pub struct NamespaceTables {
    pub namespace: String,
    pub tables: Vec<String>,
}

/// One table's survey output: sampled documents plus the inferred,
/// descriptor-enriched schema.
///
/// A table with column families but no sampled rows carries an empty
/// document list and a schema-only model. `schema` is absent only when the
/// table had neither rows nor families and empty tables were requested
/// anyway.
#[derive(Clone, Debug, Serialize)]
pub struct TablePackage {
    pub namespace: String,
    pub table: String,
    pub documents: Vec<Document>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<TableSchema>,
    /// First sampled document, exposed when template inference is enabled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<Document>,
}

/// All surveyed tables of one namespace.
///
/// Tables that failed to sample are absent; `empty_bucket` marks a namespace
/// that produced no packages at all.
#[derive(Clone, Debug, Serialize)]
pub struct NamespacePackage {
    pub namespace: String,
    pub empty_bucket: bool,
    pub tables: Vec<TablePackage>,
}

/// The full result of one survey run.
#[derive(Clone, Debug, Serialize)]
pub struct SurveyReport {
    pub survey_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cluster_version: Option<String>,
    /// The known version pattern the live cluster resolved to, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_version: Option<String>,
    pub namespaces: Vec<NamespacePackage>,
}

impl SurveyReport {
    pub fn table(&self, namespace: &str, table: &str) -> Option<&TablePackage> {
        self.namespaces
            .iter()
            .find(|n| n.namespace == namespace)?
            .tables
            .iter()
            .find(|t| t.table == table)
    }
}
