use serde::Deserialize;

use crate::{
    discovery::{session::Session, transport::RestTransport},
    error::NabuError,
};

/// Reserved namespace of the store's own bookkeeping tables; never surfaced.
pub const SYSTEM_NAMESPACE: &str = "hbase";

/// Bucket for tables whose qualified name carries no namespace prefix.
pub const DEFAULT_NAMESPACE: &str = "default";

/// Gateway versions this crate has been exercised against; `x` matches any
/// character at its position.
pub const KNOWN_GATEWAY_VERSIONS: &[&str] = &["1.x.x", "2.x.x", "3.x.x"];

#[derive(Debug, Deserialize)]
struct NamespaceListing {
    #[serde(rename = "Namespace", default)]
    namespaces: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct TableListing {
    #[serde(default)]
    table: Vec<TableName>,
}

#[derive(Debug, Deserialize)]
struct TableName {
    name: String,
}

/// Enumerates namespaces, excluding the system-reserved one.
///
/// Gateways that do not expose the namespace endpoint answer with a
/// not-found/not-supported status; in that case namespaces are derived from
/// the flat table listing by splitting each qualified name on `:`. The
/// fallback is transparent: callers cannot tell which path produced the list.
pub async fn list_namespaces<T: RestTransport + ?Sized>(
    session: &Session,
    transport: &T,
) -> Result<Vec<String>, NabuError> {
    let headers = session.request_headers().await?;

    match transport
        .fetch_json(&session.endpoint("/namespaces"), &headers)
        .await
    {
        Ok(body) => {
            let listing: NamespaceListing = serde_json::from_value(body)?;
            Ok(listing
                .namespaces
                .into_iter()
                .filter(|namespace| namespace != SYSTEM_NAMESPACE)
                .collect())
        }
        Err(fault) if fault.is_unsupported_endpoint() => {
            tracing::debug!(
                session = session.session_id(),
                "namespace endpoint unavailable, deriving namespaces from flat table listing"
            );
            let tables = list_all_tables(session, transport).await?;
            Ok(derive_namespaces(&tables))
        }
        Err(fault) => Err(fault),
    }
}

/// Enumerates the tables of one namespace.
///
/// Falls back to prefix-filtering the flat table listing when the
/// per-namespace endpoint reports not found.
pub async fn list_tables<T: RestTransport + ?Sized>(
    session: &Session,
    transport: &T,
    namespace: &str,
) -> Result<Vec<String>, NabuError> {
    let headers = session.request_headers().await?;
    let path = format!("/namespaces/{namespace}/tables");

    match transport.fetch_json(&session.endpoint(&path), &headers).await {
        Ok(body) => {
            let listing: TableListing = serde_json::from_value(body)?;
            Ok(listing.table.into_iter().map(|t| t.name).collect())
        }
        Err(fault) if fault.is_unsupported_endpoint() => {
            tracing::debug!(
                session = session.session_id(),
                namespace,
                "table endpoint unavailable, filtering flat table listing"
            );
            let tables = list_all_tables(session, transport).await?;
            Ok(filter_namespace_tables(&tables, namespace))
        }
        Err(fault) => Err(fault),
    }
}

/// The cluster software version reported by the gateway.
pub async fn cluster_version<T: RestTransport + ?Sized>(
    session: &Session,
    transport: &T,
) -> Result<String, NabuError> {
    let headers = session.request_headers().await?;
    let body = transport
        .fetch_json(&session.endpoint("/version/cluster"), &headers)
        .await?;

    match body.as_str() {
        Some(version) => Ok(version.to_owned()),
        None => Err(NabuError::Invalid(
            "Cluster version endpoint returned a non-string body".into(),
        )),
    }
}

/// Resolves a live cluster version against known `x`-wildcard patterns.
pub fn match_version<'a>(version: &str, known: &[&'a str]) -> Option<&'a str> {
    known
        .iter()
        .find(|pattern| version_matches(version, pattern))
        .copied()
}

fn version_matches(version: &str, pattern: &str) -> bool {
    if version.chars().count() != pattern.chars().count() {
        return false;
    }

    pattern
        .chars()
        .zip(version.chars())
        .all(|(p, v)| p == 'x' || p == v)
}

async fn list_all_tables<T: RestTransport + ?Sized>(
    session: &Session,
    transport: &T,
) -> Result<Vec<String>, NabuError> {
    let headers = session.request_headers().await?;
    let body = transport.fetch_json(&session.endpoint("/"), &headers).await?;

    let listing: TableListing = serde_json::from_value(body)?;
    Ok(listing.table.into_iter().map(|t| t.name).collect())
}

fn derive_namespaces(tables: &[String]) -> Vec<String> {
    let mut namespaces: Vec<String> = Vec::new();

    for table in tables {
        let namespace = match table.split_once(':') {
            Some((namespace, _)) => namespace,
            None => DEFAULT_NAMESPACE,
        };

        if namespace == SYSTEM_NAMESPACE {
            continue;
        }

        if !namespaces.iter().any(|n| n == namespace) {
            namespaces.push(namespace.to_owned());
        }
    }

    namespaces
}

fn filter_namespace_tables(tables: &[String], namespace: &str) -> Vec<String> {
    tables
        .iter()
        .filter_map(|table| match table.split_once(':') {
            Some((prefix, name)) if prefix == namespace => Some(name.to_owned()),
            None if namespace == DEFAULT_NAMESPACE => Some(table.clone()),
            _ => None,
        })
        .collect()
}
