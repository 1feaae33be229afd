use futures::StreamExt;
use uuid::Uuid;

use crate::{
    discovery::{
        catalog::{self, DEFAULT_NAMESPACE, KNOWN_GATEWAY_VERSIONS},
        enrich::{TableDescriptor, enrich_schema},
        reconcile::{RowAggregator, SampleSet},
        report::{NamespacePackage, NamespaceTables, SurveyReport, TablePackage},
        session::Session,
        transport::{RestTransport, SamplingMode, ScannerSpec, decode_rows},
    },
    error::NabuError,
};

/// Bounded concurrent fan-out across namespaces; tables within a namespace
/// are always processed sequentially.
const DEFAULT_NAMESPACE_FANOUT: usize = 4;

#[derive(Clone, Copy, Debug)]
pub struct SurveyOptions {
    pub sampling: SamplingMode,
    pub scan_batch: u32,
    /// Keep packages for tables that had neither rows nor column families.
    pub include_empty_tables: bool,
    /// Expose the first sampled document of each table as a template.
    pub infer_template: bool,
    pub namespace_fanout: usize,
}

impl Default for SurveyOptions {
    fn default() -> Self {
        SurveyOptions {
            sampling: SamplingMode::default(),
            scan_batch: crate::discovery::transport::DEFAULT_SCAN_BATCH,
            include_empty_tables: false,
            infer_template: false,
            namespace_fanout: DEFAULT_NAMESPACE_FANOUT,
        }
    }
}

/// Drives the full discovery pipeline against one gateway session: enumerate
/// namespaces and tables, then per table fetch the descriptor, sample rows,
/// reconcile them into documents, and enrich the inferred schema.
///
/// Each table owns disjoint document/schema state, so namespaces are surveyed
/// with bounded concurrent fan-out while every table's internal fold stays
/// strictly ordered. A failing table degrades to an absent package; it never
/// aborts the run.
pub struct SchemaSurveyor<T: RestTransport> {
    session: Session,
    transport: T,
    options: SurveyOptions,
}

impl<T: RestTransport> std::fmt::Debug for SchemaSurveyor<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaSurveyor")
            .field("session", &self.session)
            .field("options", &self.options)
            .finish()
    }
}

impl<T: RestTransport> SchemaSurveyor<T> {
    pub fn new(session: Session, transport: T) -> SchemaSurveyor<T> {
        SchemaSurveyor {
            session,
            transport,
            options: SurveyOptions::default(),
        }
    }

    pub fn with_options(mut self, options: SurveyOptions) -> Self {
        self.options = options;
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Verifies the connection end to end by asking the gateway for its
    /// cluster version. Auth faults surface immediately.
    pub async fn test_connection(&self) -> Result<String, NabuError> {
        catalog::cluster_version(&self.session, &self.transport).await
    }

    /// Namespace and table names only, without sampling anything.
    pub async fn list_collections(&self) -> Result<Vec<NamespaceTables>, NabuError> {
        let namespaces = catalog::list_namespaces(&self.session, &self.transport).await?;

        let mut collections = Vec::with_capacity(namespaces.len());
        for namespace in namespaces {
            let tables = catalog::list_tables(&self.session, &self.transport, &namespace).await?;
            collections.push(NamespaceTables { namespace, tables });
        }

        Ok(collections)
    }

    /// Runs the whole survey: version probe, discovery, and per-table
    /// sampling under the configured fan-out.
    ///
    /// Dropping the returned future cancels all in-flight table work. Callers
    /// that need completed tables to survive cancellation should drive
    /// [`Self::survey_namespace`] or [`Self::survey_table`] themselves and
    /// keep each package as it finishes.
    pub async fn survey(&self) -> Result<SurveyReport, NabuError> {
        let survey_id = format!("{}-{}", self.session.host(), Uuid::now_v7());

        let cluster_version = match catalog::cluster_version(&self.session, &self.transport).await {
            Ok(version) => Some(version),
            Err(fault) => {
                tracing::warn!(survey = survey_id, error = %fault, "cluster version probe failed");
                None
            }
        };
        let matched_version = cluster_version
            .as_deref()
            .and_then(|v| catalog::match_version(v, KNOWN_GATEWAY_VERSIONS))
            .map(str::to_owned);

        let namespaces = catalog::list_namespaces(&self.session, &self.transport).await?;
        tracing::info!(
            survey = survey_id,
            namespaces = namespaces.len(),
            "starting survey"
        );

        let packages = futures::stream::iter(namespaces)
            .map(|namespace| self.survey_namespace(namespace))
            .buffered(self.options.namespace_fanout.max(1))
            .collect::<Vec<NamespacePackage>>()
            .await;

        Ok(SurveyReport {
            survey_id,
            cluster_version,
            matched_version,
            namespaces: packages,
        })
    }

    /// Surveys every table of one namespace, sequentially.
    ///
    /// Per-table failures are logged and isolated; the namespace package
    /// simply omits the failed table.
    pub async fn survey_namespace(&self, namespace: String) -> NamespacePackage {
        let tables = match catalog::list_tables(&self.session, &self.transport, &namespace).await {
            Ok(tables) => tables,
            Err(fault) => {
                tracing::warn!(namespace, error = %fault, "table listing failed");
                return NamespacePackage {
                    namespace,
                    empty_bucket: true,
                    tables: Vec::new(),
                };
            }
        };

        let mut packages = Vec::with_capacity(tables.len());
        for table in &tables {
            match self.survey_table(&namespace, table).await {
                Ok(Some(package)) => packages.push(package),
                Ok(None) => {}
                Err(fault) => {
                    tracing::warn!(
                        namespace,
                        table,
                        error = %fault,
                        "table sampling failed, reporting table as absent"
                    );
                }
            }
        }

        NamespacePackage {
            empty_bucket: packages.is_empty(),
            namespace,
            tables: packages,
        }
    }

    /// The full pipeline for one table: descriptor fetch, scan, fold, enrich.
    ///
    /// Returns `Ok(None)` when the table produced neither documents nor
    /// column families and empty tables were not requested.
    pub async fn survey_table(
        &self,
        namespace: &str,
        table: &str,
    ) -> Result<Option<TablePackage>, NabuError> {
        let qualified = qualified_table(namespace, table);
        let headers = self.session.request_headers().await?;

        tracing::info!(namespace, table, "fetching table descriptor");
        let descriptor_body = self
            .transport
            .fetch_json(&self.session.endpoint(&format!("/{qualified}/schema")), &headers)
            .await?;
        let descriptor: TableDescriptor = serde_json::from_value(descriptor_body)?;

        tracing::info!(namespace, table, "sampling rows");
        let scanner = ScannerSpec {
            batch: self.options.scan_batch,
            sampling: self.options.sampling,
        };
        let rows = self
            .transport
            .fetch_scan(
                &self.session.endpoint(&format!("/{qualified}/scanner")),
                &scanner.body(),
                &headers,
            )
            .await?;

        let cells = decode_rows(rows)?;

        let mut aggregator = RowAggregator::new();
        aggregator.extend(cells);
        let SampleSet {
            documents,
            mut schema,
        } = aggregator.finish();

        enrich_schema(&mut schema, &descriptor);

        tracing::info!(
            namespace,
            table,
            documents = documents.len(),
            families = schema.families.len(),
            "table surveyed"
        );

        if documents.is_empty() && schema.families.is_empty() {
            if !self.options.include_empty_tables {
                return Ok(None);
            }

            return Ok(Some(TablePackage {
                namespace: namespace.to_owned(),
                table: table.to_owned(),
                documents,
                schema: None,
                template: None,
            }));
        }

        let template = self
            .options
            .infer_template
            .then(|| documents.first().cloned())
            .flatten();

        Ok(Some(TablePackage {
            namespace: namespace.to_owned(),
            table: table.to_owned(),
            documents,
            schema: Some(schema),
            template,
        }))
    }
}

/// Qualified table path segment; tables in the default namespace are
/// addressed by bare name.
fn qualified_table(namespace: &str, table: &str) -> String {
    if namespace == DEFAULT_NAMESPACE {
        table.to_owned()
    } else {
        format!("{namespace}:{table}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::testkit::{FixtureTransport, scan_row, test_session};
    use crate::types::ValueType;
    use serde_json::json;

    fn descriptor_body() -> serde_json::Value {
        json!({
            "name": "sales:orders",
            "ColumnSchema": [
                {"name": "cf", "TTL": "3600", "COMPRESSION": "SNAPPY"},
                {"name": "meta", "IN_MEMORY": "TRUE"}
            ]
        })
    }

    #[test]
    fn test_qualified_table_names() {
        assert_eq!(qualified_table("sales", "orders"), "sales:orders");
        assert_eq!(qualified_table(DEFAULT_NAMESPACE, "orders"), "orders");
    }

    #[tokio::test]
    async fn test_survey_table_pipeline() {
        let session = test_session();
        let transport = FixtureTransport::new()
            .with_json(session.endpoint("/sales:orders/schema"), descriptor_body())
            .with_scan(
                session.endpoint("/sales:orders/scanner"),
                vec![
                    scan_row("r1", &[("cf:total", 1, "19.5"), ("cf:note", 1, "gift wrap")]),
                    scan_row("r2", &[("cf:total", 1, "7")]),
                ],
            );

        let surveyor = SchemaSurveyor::new(session, transport);
        let package = surveyor
            .survey_table("sales", "orders")
            .await
            .unwrap()
            .unwrap();

        assert_eq!(package.documents.len(), 2);
        assert_eq!(package.documents[0].row_key, "r1");

        let schema = package.schema.unwrap();
        assert_eq!(
            schema.qualifier("cf", "total").unwrap().value_type,
            ValueType::Number
        );
        // "gift wrap" does not parse as JSON.
        assert_eq!(
            schema.qualifier("cf", "note").unwrap().value_type,
            ValueType::Byte
        );
        // Family metadata from the descriptor, including the unsampled one.
        assert_eq!(schema.families["cf"].config["ttl"], json!(3600));
        assert_eq!(schema.families["meta"].config["inMemory"], json!(true));
        assert!(schema.families["meta"].properties.is_empty());
    }

    #[tokio::test]
    async fn test_empty_scan_still_yields_schema_only_package() {
        let session = test_session();
        let transport = FixtureTransport::new()
            .with_json(session.endpoint("/sales:orders/schema"), descriptor_body())
            .with_scan(session.endpoint("/sales:orders/scanner"), Vec::new());

        let surveyor = SchemaSurveyor::new(session, transport);
        let package = surveyor
            .survey_table("sales", "orders")
            .await
            .unwrap()
            .unwrap();

        assert!(package.documents.is_empty());
        let schema = package.schema.unwrap();
        assert_eq!(schema.families.len(), 2);
        assert_eq!(schema.families["cf"].config["compression"], json!("SNAPPY"));
    }

    #[tokio::test]
    async fn test_table_with_nothing_is_absent_by_default() {
        let session = test_session();
        let transport = FixtureTransport::new()
            .with_json(
                session.endpoint("/sales:orders/schema"),
                json!({"name": "sales:orders", "ColumnSchema": []}),
            )
            .with_scan(session.endpoint("/sales:orders/scanner"), Vec::new());

        let surveyor = SchemaSurveyor::new(session, transport);
        assert!(surveyor
            .survey_table("sales", "orders")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_table_with_nothing_kept_when_requested() {
        let session = test_session();
        let transport = FixtureTransport::new()
            .with_json(
                session.endpoint("/sales:orders/schema"),
                json!({"name": "sales:orders", "ColumnSchema": []}),
            )
            .with_scan(session.endpoint("/sales:orders/scanner"), Vec::new());

        let surveyor = SchemaSurveyor::new(session, transport).with_options(SurveyOptions {
            include_empty_tables: true,
            ..SurveyOptions::default()
        });

        let package = surveyor
            .survey_table("sales", "orders")
            .await
            .unwrap()
            .unwrap();
        assert!(package.documents.is_empty());
        assert!(package.schema.is_none());
    }

    #[tokio::test]
    async fn test_template_inference_uses_first_document() {
        let session = test_session();
        let transport = FixtureTransport::new()
            .with_json(session.endpoint("/sales:orders/schema"), descriptor_body())
            .with_scan(
                session.endpoint("/sales:orders/scanner"),
                vec![
                    scan_row("r9", &[("cf:total", 1, "1")]),
                    scan_row("r2", &[("cf:total", 1, "2")]),
                ],
            );

        let surveyor = SchemaSurveyor::new(session, transport).with_options(SurveyOptions {
            infer_template: true,
            ..SurveyOptions::default()
        });

        let package = surveyor
            .survey_table("sales", "orders")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(package.template.unwrap().row_key, "r9");
    }

    #[tokio::test]
    async fn test_failed_table_is_isolated() {
        let session = test_session();
        let transport = FixtureTransport::new()
            .with_json(
                session.endpoint("/namespaces/sales/tables"),
                json!({"table": [{"name": "orders"}, {"name": "broken"}]}),
            )
            .with_json(session.endpoint("/sales:orders/schema"), descriptor_body())
            .with_scan(
                session.endpoint("/sales:orders/scanner"),
                vec![scan_row("r1", &[("cf:total", 1, "5")])],
            )
            .with_fault(session.endpoint("/sales:broken/schema"), 500, "boom");

        let surveyor = SchemaSurveyor::new(session, transport);
        let package = surveyor.survey_namespace("sales".into()).await;

        assert!(!package.empty_bucket);
        assert_eq!(package.tables.len(), 1);
        assert_eq!(package.tables[0].table, "orders");
    }

    #[tokio::test]
    async fn test_namespace_listing_failure_becomes_empty_bucket() {
        let session = test_session();
        let transport = FixtureTransport::new()
            .with_fault(session.endpoint("/namespaces/sales/tables"), 500, "boom")
            .with_fault(session.endpoint("/"), 500, "boom");

        let surveyor = SchemaSurveyor::new(session, transport);
        let package = surveyor.survey_namespace("sales".into()).await;

        assert!(package.empty_bucket);
        assert!(package.tables.is_empty());
    }
}
