//! Core implementations for discovering the shape of a wide-column store
//! behind an HTTP REST gateway.
//!
//! The flow is: catalog enumerates namespaces and tables, the transport
//! collaborator streams scan pages, the row aggregator folds the decoded cell
//! stream into documents and a schema fragment, and the enricher merges
//! descriptor metadata into that schema.
//!
//! Overview
//! - [`decode::decode_value`]: classifies one raw cell value.
//! - [`reconcile::RowAggregator`]: deduplicating fold of the cell stream.
//! - [`enrich::enrich_schema`]: descriptor-driven family metadata merge.
//! - [`catalog`]: namespace/table enumeration with the flat-listing fallback.
//! - [`transport::RestTransport`]: narrow seam to the host's REST plumbing.
//! - [`auth::CredentialExchange`]: narrow seam to the host's token handshake.
//! - [`session::Session`]: explicit per-connection context.
//! - [`probe::SchemaSurveyor`]: the per-table pipeline and namespace fan-out.

pub mod auth;
pub mod catalog;
pub mod decode;
pub mod enrich;
pub mod probe;
pub mod reconcile;
pub mod report;
pub mod session;
pub mod transport;
