//! Input-format detection and Meta Ads transformation.
//!
//! Two export shapes are recognized: the native schema and Meta Business
//! Suite exports (Portuguese column names). Meta exports are rewritten into
//! the native schema here; anything else passes through untouched and fails
//! column validation downstream.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::parser::{RawTable, coerce_float, coerce_int};
use super::table::{CampaignRow, ParseAnomaly, REQUIRED_COLUMNS};

/// Detected shape of the input file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputFormat {
    /// Canonical schema (campaign_name, impressions, ... channel).
    Native,
    /// Meta Business Suite export (Portuguese columns).
    MetaAds,
    /// Neither; left as-is for the validator to reject.
    Unknown,
}

impl InputFormat {
    /// Short name used in logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            InputFormat::Native => "native",
            InputFormat::MetaAds => "meta_ads",
            InputFormat::Unknown => "unknown",
        }
    }
}

// Meta export column names, post header-normalization.
const META_CAMPAIGN: &str = "nome_da_campanha";
const META_IMPRESSIONS: &str = "impressões";
const META_COST: &str = "valor_usado_(eur)";
const META_CONVERSIONS: &str = "resultados";
const META_CPA: &str = "custo_por_resultado";
const META_CPC: &str = "cpc_(custo_por_clique_no_link)";

/// Columns that identify a Meta Ads export.
const META_MARKER_COLUMNS: [&str; 3] = [META_CAMPAIGN, META_IMPRESSIONS, META_COST];

/// Result of format detection and transformation.
pub(crate) struct TransformOutcome {
    pub(crate) format: InputFormat,
    pub(crate) headers: Vec<String>,
    pub(crate) rows: Vec<CampaignRow>,
    pub(crate) anomalies: Vec<ParseAnomaly>,
}

/// Detect the input format from normalized headers.
pub(crate) fn detect_format(headers: &[String]) -> InputFormat {
    let has = |name: &str| headers.iter().any(|h| h == name);

    if REQUIRED_COLUMNS.iter().all(|c| has(c)) {
        return InputFormat::Native;
    }
    if META_MARKER_COLUMNS.iter().all(|c| has(c)) {
        return InputFormat::MetaAds;
    }
    InputFormat::Unknown
}

/// Detect the format and build typed rows.
pub(crate) fn detect_and_transform(raw: RawTable) -> TransformOutcome {
    let format = detect_format(&raw.headers);

    match format {
        InputFormat::Native => {
            let (rows, anomalies) = build_rows(&raw);
            TransformOutcome {
                format,
                headers: raw.headers,
                rows,
                anomalies,
            }
        }
        InputFormat::MetaAds => {
            info!(rows = raw.records.len(), "transforming Meta Ads export");
            let rows = transform_meta_ads(&raw);
            TransformOutcome {
                format,
                headers: REQUIRED_COLUMNS.iter().map(|s| s.to_string()).collect(),
                rows,
                anomalies: Vec::new(),
            }
        }
        InputFormat::Unknown => {
            warn!(headers = ?raw.headers, "unrecognized column set");
            let (rows, anomalies) = build_rows(&raw);
            TransformOutcome {
                format,
                headers: raw.headers,
                rows,
                anomalies,
            }
        }
    }
}

/// Build typed rows from a grid already in (or close to) the native schema.
///
/// Absent columns yield `None`/empty fields without an anomaly; the
/// validator reports the missing column itself. A present cell that fails
/// coercion yields `None` plus an anomaly carrying the raw value.
fn build_rows(raw: &RawTable) -> (Vec<CampaignRow>, Vec<ParseAnomaly>) {
    let mut rows = Vec::with_capacity(raw.records.len());
    let mut anomalies = Vec::new();

    for (row_idx, record) in raw.records.iter().enumerate() {
        let text = |name: &str| {
            raw.cell(record, name)
                .map(|s| s.to_string())
                .unwrap_or_default()
        };

        // Empty cells are missing data, not coercion failures; only a
        // non-empty cell that fails to parse earns an anomaly.
        let mut coerced_int = |name: &str| -> Option<i64> {
            let cell = raw.cell(record, name)?;
            if cell.trim().is_empty() {
                return None;
            }
            match coerce_int(cell) {
                Some(v) => Some(v),
                None => {
                    anomalies.push(ParseAnomaly {
                        row: row_idx,
                        column: name.to_string(),
                        value: cell.to_string(),
                    });
                    None
                }
            }
        };

        let impressions = coerced_int("impressions");
        let clicks = coerced_int("clicks");
        let conversions = coerced_int("conversions");

        let mut coerced_float = |name: &str| -> Option<f64> {
            let cell = raw.cell(record, name)?;
            if cell.trim().is_empty() {
                return None;
            }
            match coerce_float(cell) {
                Some(v) => Some(v),
                None => {
                    anomalies.push(ParseAnomaly {
                        row: row_idx,
                        column: name.to_string(),
                        value: cell.to_string(),
                    });
                    None
                }
            }
        };

        let ctr = coerced_float("ctr");
        let cost = coerced_float("cost");
        let cpa = coerced_float("cpa");

        rows.push(CampaignRow {
            campaign_name: text("campaign_name"),
            channel: text("channel"),
            impressions,
            clicks,
            ctr,
            conversions,
            cost,
            cpa,
        });
    }

    (rows, anomalies)
}

/// Rewrite a Meta Ads export into the native schema.
///
/// Meta exports carry no clicks or CTR columns; clicks are derived from
/// cost/CPC, CTR from clicks/impressions, and CPA from cost/conversions
/// when the export omits it. Unparseable cells become zero, matching how
/// the exports themselves leave inactive campaigns blank.
fn transform_meta_ads(raw: &RawTable) -> Vec<CampaignRow> {
    let has_cpa = raw.column_index(META_CPA).is_some();
    let has_cpc = raw.column_index(META_CPC).is_some();

    raw.records
        .iter()
        .map(|record| {
            let int_or_zero =
                |name: &str| raw.cell(record, name).and_then(coerce_int).unwrap_or(0);
            let float_or_zero =
                |name: &str| raw.cell(record, name).and_then(coerce_float).unwrap_or(0.0);

            let campaign_name = raw
                .cell(record, META_CAMPAIGN)
                .unwrap_or_default()
                .to_string();
            let impressions = int_or_zero(META_IMPRESSIONS);
            let cost = float_or_zero(META_COST);
            let conversions = int_or_zero(META_CONVERSIONS);

            let cpa = if has_cpa {
                float_or_zero(META_CPA)
            } else if conversions > 0 {
                cost / conversions as f64
            } else {
                0.0
            };

            let clicks = if has_cpc {
                let cpc = float_or_zero(META_CPC);
                if cpc > 0.0 {
                    (cost / cpc).round() as i64
                } else {
                    0
                }
            } else {
                0
            };

            let ctr = if impressions > 0 {
                clicks as f64 / impressions as f64 * 100.0
            } else {
                0.0
            };

            CampaignRow {
                campaign_name,
                channel: "Meta Ads".to_string(),
                impressions: Some(impressions),
                clicks: Some(clicks),
                ctr: Some(ctr),
                conversions: Some(conversions),
                cost: Some(cost),
                cpa: Some(cpa),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Loader;

    #[test]
    fn test_detect_native_format() {
        let headers: Vec<String> = REQUIRED_COLUMNS.iter().map(|s| s.to_string()).collect();
        assert_eq!(detect_format(&headers), InputFormat::Native);
    }

    #[test]
    fn test_detect_unknown_format() {
        let headers = vec!["foo".to_string(), "bar".to_string()];
        assert_eq!(detect_format(&headers), InputFormat::Unknown);
    }

    #[test]
    fn test_meta_ads_end_to_end() {
        // Headers as Meta Business Suite exports them, pre-normalization.
        let data = "Nome da campanha,Impressões,Valor usado (EUR),Resultados,CPC (custo por clique no link)\n\
                    Campanha Verão,10000,200.0,8,2.0\n";

        let table = Loader::new().parse_bytes(data.as_bytes()).unwrap();

        assert_eq!(table.format, InputFormat::MetaAds);
        let row = &table.rows[0];
        assert_eq!(row.campaign_name, "Campanha Verão");
        assert_eq!(row.channel, "Meta Ads");
        assert_eq!(row.impressions, Some(10000));
        // clicks = cost / cpc = 200 / 2 = 100
        assert_eq!(row.clicks, Some(100));
        // ctr = 100 / 10000 * 100 = 1.0
        assert_eq!(row.ctr, Some(1.0));
        // cpa derived: cost / conversions = 25.0
        assert_eq!(row.cpa, Some(25.0));
        assert!(table.missing_required_columns().is_empty());
    }

    #[test]
    fn test_meta_ads_blank_cells_become_zero() {
        let data = "Nome da campanha,Impressões,Valor usado (EUR),Resultados\n\
                    Campanha Parada,,,\n";

        let table = Loader::new().parse_bytes(data.as_bytes()).unwrap();
        let row = &table.rows[0];

        assert_eq!(row.impressions, Some(0));
        assert_eq!(row.clicks, Some(0));
        assert_eq!(row.conversions, Some(0));
        assert_eq!(row.cost, Some(0.0));
        assert_eq!(row.cpa, Some(0.0));
        assert!(table.anomalies.is_empty());
    }
}
