//! Semantic validation of parsed campaign tables.
//!
//! Checks run in a fixed order: required columns (short-circuits everything
//! else), per-row nulls and ranges, cross-field consistency, then
//! statistical outliers. Outliers are warnings only — they are legitimate
//! analysis targets, not malformed data. The validator never mutates the
//! table.

use std::collections::HashMap;

use tracing::info;

use super::issue::{ValidationIssue, ValidationResult};
use crate::config::Thresholds;
use crate::input::{CampaignRow, CampaignTable, NUMERIC_COLUMNS};

/// Row-specific null issues reported per column before summarizing.
const NULL_REPORT_CAP: usize = 5;

/// Row-specific range/consistency issues reported per rule.
const VALUE_REPORT_CAP: usize = 3;

/// Columns checked for statistical outliers.
const OUTLIER_COLUMNS: [&str; 3] = ["ctr", "cpa", "cost"];

/// Minimum non-null values before quartiles mean anything.
const MIN_OUTLIER_SAMPLE: usize = 4;

/// Validates campaign tables against the schema invariants.
pub struct Validator {
    thresholds: Thresholds,
}

impl Validator {
    /// Create a validator with default thresholds.
    pub fn new() -> Self {
        Self {
            thresholds: Thresholds::default(),
        }
    }

    /// Create a validator with custom thresholds.
    pub fn with_thresholds(thresholds: Thresholds) -> Self {
        Self { thresholds }
    }

    /// Run all checks and collect issues in detection order.
    pub fn validate(&self, table: &CampaignTable) -> ValidationResult {
        let mut issues = Vec::new();

        self.check_required_columns(table, &mut issues);

        // Row-level checks are meaningless without the full column set.
        if issues.is_empty() {
            if table.row_count() == 0 {
                issues.push(ValidationIssue::error(
                    "rows",
                    "No data rows found after the header",
                ));
            } else {
                self.check_missing_values(table, &mut issues);
                self.check_value_ranges(table, &mut issues);
                self.check_cross_field(table, &mut issues);
                self.detect_outliers(table, &mut issues);
            }
        }

        let result = ValidationResult::from_issues(issues, table.row_count());
        info!(
            is_valid = result.is_valid,
            errors = result.errors().count(),
            warnings = result.warnings().count(),
            rows = result.rows_processed,
            "validation complete"
        );
        result
    }

    fn check_required_columns(&self, table: &CampaignTable, issues: &mut Vec<ValidationIssue>) {
        for col in table.missing_required_columns() {
            issues.push(ValidationIssue::error(
                col,
                format!("Required column '{col}' is missing"),
            ));
        }
    }

    /// Nulls: missing cells and failed coercions, reported per column with
    /// the raw value attached when the loader recorded one.
    fn check_missing_values(&self, table: &CampaignTable, issues: &mut Vec<ValidationIssue>) {
        let anomaly_values: HashMap<(usize, &str), &str> = table
            .anomalies
            .iter()
            .map(|a| ((a.row, a.column.as_str()), a.value.as_str()))
            .collect();

        for col in NUMERIC_COLUMNS {
            let null_rows: Vec<usize> = table
                .rows
                .iter()
                .enumerate()
                .filter(|(_, row)| field_is_null(row, col))
                .map(|(idx, _)| idx)
                .collect();

            for &idx in null_rows.iter().take(NULL_REPORT_CAP) {
                let mut issue = ValidationIssue::error(
                    col,
                    format!("Null value found in column '{col}'"),
                )
                .at_line(CampaignTable::csv_line(idx));
                if let Some(value) = anomaly_values.get(&(idx, col)) {
                    issue = issue.with_value(*value);
                }
                issues.push(issue);
            }

            if null_rows.len() > NULL_REPORT_CAP {
                issues.push(ValidationIssue::error(
                    col,
                    format!(
                        "... and {} more null values in '{col}'",
                        null_rows.len() - NULL_REPORT_CAP
                    ),
                ));
            }
        }
    }

    /// Per-row type/range invariants from the schema.
    fn check_value_ranges(&self, table: &CampaignTable, issues: &mut Vec<ValidationIssue>) {
        let mut empty_names = 0;
        for (idx, row) in table.rows.iter().enumerate() {
            if row.campaign_name.trim().is_empty() {
                empty_names += 1;
                if empty_names <= VALUE_REPORT_CAP {
                    issues.push(
                        ValidationIssue::error(
                            "campaign_name",
                            "Campaign name must not be empty",
                        )
                        .at_line(CampaignTable::csv_line(idx)),
                    );
                }
            }
        }

        for col in ["impressions", "clicks", "conversions", "cost", "cpa"] {
            let mut reported = 0;
            for (idx, row) in table.rows.iter().enumerate() {
                let Some(value) = signed_field(row, col) else {
                    continue;
                };
                if value < 0.0 {
                    reported += 1;
                    if reported > VALUE_REPORT_CAP {
                        break;
                    }
                    issues.push(
                        ValidationIssue::error(
                            col,
                            format!("Negative value not allowed in '{col}'"),
                        )
                        .at_line(CampaignTable::csv_line(idx))
                        .with_value(format_number(value)),
                    );
                }
            }
        }

        let mut reported = 0;
        for (idx, row) in table.rows.iter().enumerate() {
            let Some(ctr) = row.ctr else { continue };
            if !(0.0..=100.0).contains(&ctr) {
                reported += 1;
                if reported > VALUE_REPORT_CAP {
                    break;
                }
                issues.push(
                    ValidationIssue::error("ctr", "CTR must be between 0 and 100%")
                        .at_line(CampaignTable::csv_line(idx))
                        .with_value(format_number(ctr)),
                );
            }
        }
    }

    /// Cross-field consistency: clicks vs impressions, conversions vs clicks.
    fn check_cross_field(&self, table: &CampaignTable, issues: &mut Vec<ValidationIssue>) {
        let mut click_reports = 0;
        let mut conversion_reports = 0;

        for (idx, row) in table.rows.iter().enumerate() {
            if let (Some(clicks), Some(impressions)) = (row.clicks, row.impressions) {
                if clicks > impressions && click_reports < VALUE_REPORT_CAP {
                    click_reports += 1;
                    issues.push(
                        ValidationIssue::error("clicks", "Clicks cannot exceed impressions")
                            .at_line(CampaignTable::csv_line(idx))
                            .with_value(format!(
                                "clicks={clicks}, impressions={impressions}"
                            )),
                    );
                }
            }

            if let (Some(conversions), Some(clicks)) = (row.conversions, row.clicks) {
                if conversions > clicks && conversion_reports < VALUE_REPORT_CAP {
                    conversion_reports += 1;
                    issues.push(
                        ValidationIssue::error(
                            "conversions",
                            "Conversions cannot exceed clicks",
                        )
                        .at_line(CampaignTable::csv_line(idx))
                        .with_value(format!("conversions={conversions}, clicks={clicks}")),
                    );
                }
            }
        }
    }

    /// IQR outlier detection on rate/cost columns. Warnings only.
    fn detect_outliers(&self, table: &CampaignTable, issues: &mut Vec<ValidationIssue>) {
        for col in OUTLIER_COLUMNS {
            let values: Vec<(usize, f64)> = table
                .rows
                .iter()
                .enumerate()
                .filter_map(|(idx, row)| float_field(row, col).map(|v| (idx, v)))
                .collect();

            if values.len() < MIN_OUTLIER_SAMPLE {
                continue;
            }

            let mut sorted: Vec<f64> = values.iter().map(|(_, v)| *v).collect();
            sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

            let q1 = quantile(&sorted, 0.25);
            let q3 = quantile(&sorted, 0.75);
            let iqr = q3 - q1;
            let lower = q1 - self.thresholds.outlier_iqr_multiplier * iqr;
            let upper = q3 + self.thresholds.outlier_iqr_multiplier * iqr;

            let outliers: Vec<&(usize, f64)> = values
                .iter()
                .filter(|(_, v)| *v < lower || *v > upper)
                .collect();

            for (idx, value) in outliers.iter().take(VALUE_REPORT_CAP) {
                let campaign = &table.rows[*idx].campaign_name;
                issues.push(
                    ValidationIssue::warning(
                        col,
                        format!("Outlier detected in '{col}' for campaign '{campaign}'"),
                    )
                    .at_line(CampaignTable::csv_line(*idx))
                    .with_value(format_number(*value)),
                );
            }
        }
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

/// Whether the named numeric field is null on this row.
fn field_is_null(row: &CampaignRow, column: &str) -> bool {
    match column {
        "impressions" => row.impressions.is_none(),
        "clicks" => row.clicks.is_none(),
        "ctr" => row.ctr.is_none(),
        "conversions" => row.conversions.is_none(),
        "cost" => row.cost.is_none(),
        "cpa" => row.cpa.is_none(),
        _ => false,
    }
}

/// The named numeric field as a float, for sign checks.
fn signed_field(row: &CampaignRow, column: &str) -> Option<f64> {
    match column {
        "impressions" => row.impressions.map(|v| v as f64),
        "clicks" => row.clicks.map(|v| v as f64),
        "conversions" => row.conversions.map(|v| v as f64),
        "cost" => row.cost,
        "cpa" => row.cpa,
        _ => None,
    }
}

/// The named float-typed field, for outlier detection.
fn float_field(row: &CampaignRow, column: &str) -> Option<f64> {
    match column {
        "ctr" => row.ctr,
        "cpa" => row.cpa,
        "cost" => row.cost,
        _ => None,
    }
}

/// Linear-interpolated quantile over a sorted slice.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    if lo == hi {
        sorted[lo]
    } else {
        sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
    }
}

/// Format a number the way it appeared numerically, without trailing noise.
fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Loader;
    use crate::validation::IssueSeverity;

    const HEADER: &str = "campaign_name,impressions,clicks,ctr,conversions,cost,cpa,channel";

    fn parse(body: &str) -> CampaignTable {
        let data = format!("{HEADER}\n{body}");
        Loader::new().parse_bytes(data.as_bytes()).unwrap()
    }

    #[test]
    fn test_valid_single_row() {
        let table = parse("A,1000,50,5.0,2,100.0,50.0,Google Ads\n");
        let result = Validator::new().validate(&table);

        assert!(result.is_valid);
        assert!(result.issues.is_empty());
        assert_eq!(result.rows_processed, 1);
    }

    #[test]
    fn test_missing_column_short_circuits() {
        let data = "campaign_name,impressions\nA,1000\n";
        let table = Loader::new().parse_bytes(data.as_bytes()).unwrap();
        let result = Validator::new().validate(&table);

        assert!(!result.is_valid);
        // Only missing-column errors; no row-level noise.
        assert!(result.issues.iter().all(|i| i.message.contains("is missing")));
        assert_eq!(result.errors().count(), 6);
    }

    #[test]
    fn test_zero_rows_is_an_error() {
        let table = parse("");
        let result = Validator::new().validate(&table);

        assert!(!result.is_valid);
        assert_eq!(result.issues.len(), 1);
        assert_eq!(result.issues[0].field, "rows");
    }

    #[test]
    fn test_clicks_exceeding_impressions() {
        let table = parse("A,10,50,5.0,2,100.0,50.0,Google Ads\n");
        let result = Validator::new().validate(&table);

        assert!(!result.is_valid);
        let issue = result.errors().next().unwrap();
        assert_eq!(issue.field, "clicks");
        assert_eq!(issue.row, Some(2));
        assert!(issue.message.contains("exceed impressions"));
    }

    #[test]
    fn test_conversions_exceeding_clicks() {
        let table = parse("A,1000,50,5.0,80,100.0,50.0,Google Ads\n");
        let result = Validator::new().validate(&table);

        assert!(!result.is_valid);
        assert!(result.errors().any(|i| i.field == "conversions"));
    }

    #[test]
    fn test_ctr_out_of_bounds() {
        let table = parse("A,1000,50,150.0,2,100.0,50.0,Google Ads\n");
        let result = Validator::new().validate(&table);

        assert!(!result.is_valid);
        let issue = result.errors().find(|i| i.field == "ctr").unwrap();
        assert_eq!(issue.value.as_deref(), Some("150"));
    }

    #[test]
    fn test_negative_cost() {
        let table = parse("A,1000,50,5.0,2,-100.0,50.0,Google Ads\n");
        let result = Validator::new().validate(&table);

        assert!(!result.is_valid);
        assert!(result.errors().any(|i| i.field == "cost"));
    }

    #[test]
    fn test_empty_campaign_name() {
        let table = parse(",1000,50,5.0,2,100.0,50.0,Google Ads\n");
        let result = Validator::new().validate(&table);

        assert!(!result.is_valid);
        assert!(result.errors().any(|i| i.field == "campaign_name"));
    }

    #[test]
    fn test_coercion_failure_reported_with_value() {
        let table = parse("A,lots,50,5.0,2,100.0,50.0,Google Ads\n");
        let result = Validator::new().validate(&table);

        assert!(!result.is_valid);
        let issue = result.errors().find(|i| i.field == "impressions").unwrap();
        assert!(issue.message.contains("Null value"));
        assert_eq!(issue.value.as_deref(), Some("lots"));
        assert_eq!(issue.row, Some(2));
    }

    #[test]
    fn test_null_cap_and_summary() {
        let body: String = (0..8)
            .map(|i| format!("C{i},1000,50,5.0,2,100.0,,Google Ads\n"))
            .collect();
        let table = parse(&body);
        let result = Validator::new().validate(&table);

        let cpa_issues: Vec<_> = result.issues.iter().filter(|i| i.field == "cpa").collect();
        // 5 row-specific issues plus one summary line.
        assert_eq!(cpa_issues.len(), 6);
        assert!(cpa_issues[5].message.contains("3 more null values"));
    }

    #[test]
    fn test_outlier_is_warning_not_error() {
        let mut body = String::new();
        for i in 0..7 {
            body.push_str(&format!("C{i},1000,50,5.0,2,100.0,10.0,Google Ads\n"));
        }
        body.push_str("Spike,1000,50,5.0,2,100.0,500.0,Google Ads\n");

        let table = parse(&body);
        let result = Validator::new().validate(&table);

        assert!(result.is_valid);
        let warning = result.warnings().find(|i| i.field == "cpa").unwrap();
        assert!(warning.message.contains("Spike"));
        assert_eq!(warning.severity, IssueSeverity::Warning);
    }

    #[test]
    fn test_quantile_interpolation() {
        let sorted = [10.0, 20.0, 30.0, 40.0];
        assert_eq!(quantile(&sorted, 0.5), 25.0);
        assert_eq!(quantile(&sorted, 0.25), 17.5);
        assert_eq!(quantile(&sorted, 0.0), 10.0);
        assert_eq!(quantile(&sorted, 1.0), 40.0);
    }
}
