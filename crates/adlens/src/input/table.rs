//! Typed campaign table and source metadata.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::transform::InputFormat;

/// Columns every campaign export must provide (after normalization).
pub const REQUIRED_COLUMNS: [&str; 8] = [
    "campaign_name",
    "impressions",
    "clicks",
    "ctr",
    "conversions",
    "cost",
    "cpa",
    "channel",
];

/// Columns the loader attempts to coerce to numbers.
pub(crate) const NUMERIC_COLUMNS: [&str; 6] =
    ["impressions", "clicks", "ctr", "conversions", "cost", "cpa"];

/// One campaign-channel observation.
///
/// `None` in a numeric field records a missing cell or a failed coercion;
/// the validator turns these into errors, so the metrics engine never sees
/// an incomplete row. Rows are never mutated after validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignRow {
    pub campaign_name: String,
    pub channel: String,
    pub impressions: Option<i64>,
    pub clicks: Option<i64>,
    pub ctr: Option<f64>,
    pub conversions: Option<i64>,
    pub cost: Option<f64>,
    pub cpa: Option<f64>,
}

impl CampaignRow {
    /// Whether every numeric field carries a value.
    pub fn is_complete(&self) -> bool {
        self.impressions.is_some()
            && self.clicks.is_some()
            && self.ctr.is_some()
            && self.conversions.is_some()
            && self.cost.is_some()
            && self.cpa.is_some()
    }
}

/// A cell the loader could not coerce to a number.
///
/// Recorded instead of raised so the validator can report the failure with
/// full row context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParseAnomaly {
    /// Zero-based data row index.
    pub row: usize,
    /// Column name.
    pub column: String,
    /// The raw cell content that failed coercion.
    pub value: String,
}

/// Metadata about the parsed source bytes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceMetadata {
    /// SHA-256 hash of the input bytes.
    pub hash: String,
    /// Input size in bytes.
    pub size_bytes: usize,
    /// Detected delimiter format (csv, tsv, ...).
    pub format: String,
    /// Number of data rows (excluding header).
    pub row_count: usize,
    /// Number of columns.
    pub column_count: usize,
    /// When the input was loaded.
    pub loaded_at: DateTime<Utc>,
}

/// Parsed, typed campaign data for one analysis request.
///
/// Owned exclusively by the pipeline invocation that created it and
/// discarded once the report is produced.
#[derive(Debug, Clone)]
pub struct CampaignTable {
    /// Normalized column headers, in file order.
    pub headers: Vec<String>,
    /// Typed rows, in file order.
    pub rows: Vec<CampaignRow>,
    /// Coercion failures recorded during loading.
    pub anomalies: Vec<ParseAnomaly>,
    /// Detected input format.
    pub format: InputFormat,
    /// Source metadata.
    pub source: SourceMetadata,
}

impl CampaignTable {
    /// Number of data rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Whether a named column was present in the input.
    pub fn has_column(&self, name: &str) -> bool {
        self.headers.iter().any(|h| h == name)
    }

    /// Required columns absent from the input, in canonical order.
    pub fn missing_required_columns(&self) -> Vec<&'static str> {
        REQUIRED_COLUMNS
            .iter()
            .filter(|col| !self.has_column(col))
            .copied()
            .collect()
    }

    /// Iterator over campaign names in row order.
    pub fn campaign_names(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().map(|r| r.campaign_name.as_str())
    }

    /// 1-based CSV line number for a data row index (header is line 1).
    pub fn csv_line(row_index: usize) -> usize {
        row_index + 2
    }
}
