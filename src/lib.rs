#![doc = include_str!("../README.md")]

mod discovery;
mod error;
mod types;

pub use discovery::auth::{AuthMode, CredentialExchange, ServicePrincipal};
pub use discovery::catalog::{
    DEFAULT_NAMESPACE, KNOWN_GATEWAY_VERSIONS, SYSTEM_NAMESPACE, cluster_version, list_namespaces,
    list_tables, match_version,
};
pub use discovery::decode::{DecodedValue, decode_value};
pub use discovery::enrich::{
    COLUMN_FAMILY_MAPPINGS, ColumnFamilyRecord, PropertyKind, PropertyMapping, TableDescriptor,
    enrich_schema,
};
pub use discovery::probe::{SchemaSurveyor, SurveyOptions};
pub use discovery::reconcile::{Cell, RowAggregator, SampleSet, reconcile_cell};
pub use discovery::report::{NamespacePackage, NamespaceTables, SurveyReport, TablePackage};
pub use discovery::session::{Session, SessionBuilder};
pub use discovery::transport::{
    ASSUMED_TOTAL_ROWS, DEFAULT_SCAN_BATCH, RawCell, RawRow, RestTransport, SamplingMode,
    ScanPage, ScannerSpec, decode_rows,
};
pub use error::NabuError;
pub use types::{
    Document, FamilySchema, Observation, QualifierSchema, ROW_KEY_FIELD, RowKeySchema,
    TableSchema, ValueType,
};
