use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::Deserialize;
use serde_json::Value;

use crate::{discovery::reconcile::Cell, error::NabuError};

pub const DEFAULT_SCAN_BATCH: u32 = 1000;

/// Assumed table size for relative sampling; the cap is a percentage of this.
/// Legacy semantics carried for host compatibility, not depended upon by the
/// reconciliation core.
pub const ASSUMED_TOTAL_ROWS: u32 = 10_000;

/// How many rows to sample per table.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SamplingMode {
    /// Hard row cap, passed to the gateway as a page filter.
    Absolute { count: u32 },
    /// Percentage of [`ASSUMED_TOTAL_ROWS`].
    Relative { percent: f32 },
}

impl SamplingMode {
    pub fn row_cap(&self) -> u32 {
        match self {
            SamplingMode::Absolute { count } => *count,
            SamplingMode::Relative { percent } => {
                ((ASSUMED_TOTAL_ROWS as f32) * percent / 100.0).round() as u32
            }
        }
    }
}

impl Default for SamplingMode {
    fn default() -> Self {
        SamplingMode::Absolute {
            count: DEFAULT_SCAN_BATCH,
        }
    }
}

/// Scanner creation directive: batch size plus the sampling cap, rendered as
/// the XML body the gateway expects when a scanner is opened.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScannerSpec {
    pub batch: u32,
    pub sampling: SamplingMode,
}

impl Default for ScannerSpec {
    fn default() -> Self {
        ScannerSpec {
            batch: DEFAULT_SCAN_BATCH,
            sampling: SamplingMode::default(),
        }
    }
}

impl ScannerSpec {
    pub fn new(sampling: SamplingMode) -> ScannerSpec {
        ScannerSpec {
            batch: DEFAULT_SCAN_BATCH,
            sampling,
        }
    }

    /// The scanner body, carrying a `PageFilter` with the row cap.
    pub fn body(&self) -> String {
        let filter = serde_json::json!({
            "type": "PageFilter",
            "value": self.sampling.row_cap(),
        });

        format!(
            "<Scanner batch=\"{}\"><filter>{}</filter></Scanner>",
            self.batch, filter
        )
    }
}

/// One row of a scan page as it arrives on the wire: base64-encoded key and
/// cells.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct RawRow {
    pub key: String,
    #[serde(rename = "Cell", default)]
    pub cells: Vec<RawCell>,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct RawCell {
    pub column: String,
    pub timestamp: i64,
    #[serde(rename = "$")]
    pub value: String,
}

/// A single scan result page; the gateway signals exhaustion with a
/// no-content status rather than an empty page.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ScanPage {
    #[serde(rename = "Row", default)]
    pub rows: Vec<RawRow>,
}

/// Flattens raw scan rows into the cell stream the aggregator consumes,
/// base64-decoding row key, column, and value.
///
/// Values are decoded lossily: a cell holding non-UTF-8 bytes still yields a
/// usable (opaque) string rather than failing the table.
pub fn decode_rows(rows: Vec<RawRow>) -> Result<Vec<Cell>, NabuError> {
    let mut cells = Vec::new();

    for row in rows {
        let row_key = decode_field(&row.key)?;
        for cell in row.cells {
            cells.push(Cell {
                row_key: row_key.clone(),
                column: decode_field(&cell.column)?,
                timestamp: cell.timestamp,
                raw_value: decode_field(&cell.value)?,
            });
        }
    }

    Ok(cells)
}

fn decode_field(encoded: &str) -> Result<String, NabuError> {
    let bytes = BASE64.decode(encoded)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Narrow interface to the host's REST plumbing.
///
/// Implementations own fetch/retry mechanics and the scanner pagination loop:
/// follow the creation response's location header and collect pages, each
/// deserializing as a [`ScanPage`], until the gateway reports no more data.
/// Faults surface as [`NabuError::Transport`] carrying the status, message,
/// and body.
#[async_trait]
pub trait RestTransport: Send + Sync {
    /// GET a JSON resource.
    async fn fetch_json(
        &self,
        url: &str,
        headers: &[(String, String)],
    ) -> Result<Value, NabuError>;

    /// Open a scanner with the given body and drain every page of it.
    async fn fetch_scan(
        &self,
        url: &str,
        scanner_body: &str,
        headers: &[(String, String)],
    ) -> Result<Vec<RawRow>, NabuError>;
}
