//! Surveys a canned in-memory gateway and prints the resulting report.
//!
//! The transport here answers from fixtures so the example runs anywhere; a
//! real deployment implements [`nabu::RestTransport`] over its HTTP client of
//! choice and points the session at a live gateway.

use std::collections::HashMap;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde_json::{Value, json};

use nabu::{
    NabuError, RawCell, RawRow, RestTransport, SchemaSurveyor, Session, SurveyOptions,
};

struct CannedGateway {
    json: HashMap<String, Value>,
    scans: HashMap<String, Vec<RawRow>>,
}

#[async_trait]
impl RestTransport for CannedGateway {
    async fn fetch_json(
        &self,
        url: &str,
        _headers: &[(String, String)],
    ) -> Result<Value, NabuError> {
        self.json
            .get(url)
            .cloned()
            .ok_or_else(|| NabuError::transport(404, "Not Found", ""))
    }

    async fn fetch_scan(
        &self,
        url: &str,
        _scanner_body: &str,
        _headers: &[(String, String)],
    ) -> Result<Vec<RawRow>, NabuError> {
        self.scans
            .get(url)
            .cloned()
            .ok_or_else(|| NabuError::transport(404, "Not Found", ""))
    }
}

fn row(key: &str, cells: &[(&str, i64, &str)]) -> RawRow {
    RawRow {
        key: BASE64.encode(key),
        cells: cells
            .iter()
            .map(|(column, timestamp, value)| RawCell {
                column: BASE64.encode(column),
                timestamp: *timestamp,
                value: BASE64.encode(value),
            })
            .collect(),
    }
}

fn canned_gateway(session: &Session) -> CannedGateway {
    let mut json = HashMap::new();
    json.insert(session.endpoint("/version/cluster"), json!("2.4.17"));
    json.insert(
        session.endpoint("/namespaces"),
        json!({"Namespace": ["hbase", "sales"]}),
    );
    json.insert(
        session.endpoint("/namespaces/sales/tables"),
        json!({"table": [{"name": "orders"}]}),
    );
    json.insert(
        session.endpoint("/sales:orders/schema"),
        json!({
            "name": "sales:orders",
            "ColumnSchema": [
                {"name": "cf", "TTL": "86400", "COMPRESSION": "SNAPPY", "IN_MEMORY": "FALSE"}
            ]
        }),
    );

    let mut scans = HashMap::new();
    scans.insert(
        session.endpoint("/sales:orders/scanner"),
        vec![
            row(
                "order-1001",
                &[
                    ("cf:total", 1700000000000, "42.5"),
                    ("cf:items", 1700000000000, "[\"keyboard\",\"mouse\"]"),
                    ("cf:memo", 1700000000000, "leave at reception"),
                ],
            ),
            row(
                "order-1002",
                &[
                    ("cf:total", 1700000500000, "7"),
                    ("cf:total", 1700000400000, "6"),
                ],
            ),
        ],
    );

    CannedGateway { json, scans }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let session = Session::builder().host("gateway").port(8080).build()?;
    let transport = canned_gateway(&session);

    let surveyor = SchemaSurveyor::new(session, transport).with_options(SurveyOptions {
        infer_template: true,
        ..SurveyOptions::default()
    });

    let version = surveyor.test_connection().await?;
    println!("connected, cluster version {version}");

    let report = surveyor.survey().await?;
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
