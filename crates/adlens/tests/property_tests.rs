//! Property-based tests for the pipeline invariants.
//!
//! These verify, over generated inputs:
//! 1. No panics: the loader accepts arbitrary bytes without crashing.
//! 2. Determinism: the same input always produces the same report.
//! 3. Invariants: validity/severity coupling and channel-bucket arithmetic
//!    hold for every table.

use proptest::prelude::*;

use adlens::{AnalysisOutcome, Analyst, IssueSeverity, Loader, Validator};

/// One well-formed campaign observation.
#[derive(Debug, Clone)]
struct GenRow {
    impressions: u32,
    clicks: u32,
    conversions: u32,
    cost: f64,
    channel: usize,
}

const CHANNELS: [&str; 3] = ["Google Ads", "Meta Ads", "Email"];

/// Rows that satisfy every schema invariant by construction.
fn valid_row() -> impl Strategy<Value = GenRow> {
    (1u32..100_000, 0.0f64..5_000.0, 0usize..CHANNELS.len()).prop_flat_map(
        |(impressions, cost, channel)| {
            (0..=impressions).prop_flat_map(move |clicks| {
                (0..=clicks).prop_map(move |conversions| GenRow {
                    impressions,
                    clicks,
                    conversions,
                    cost,
                    channel,
                })
            })
        },
    )
}

/// Render generated rows as a native-format CSV.
fn to_csv(rows: &[GenRow]) -> Vec<u8> {
    let mut out =
        String::from("campaign_name,impressions,clicks,ctr,conversions,cost,cpa,channel\n");
    for (i, row) in rows.iter().enumerate() {
        let ctr = if row.impressions > 0 {
            row.clicks as f64 / row.impressions as f64 * 100.0
        } else {
            0.0
        };
        let cpa = if row.conversions > 0 {
            row.cost / row.conversions as f64
        } else {
            0.0
        };
        out.push_str(&format!(
            "C{i},{},{},{ctr:.6},{},{:.2},{cpa:.6},{}\n",
            row.impressions, row.clicks, row.conversions, row.cost, CHANNELS[row.channel]
        ));
    }
    out.into_bytes()
}

proptest! {
    /// The loader never panics, whatever the bytes.
    #[test]
    fn loader_never_panics(bytes in proptest::collection::vec(any::<u8>(), 0..512)) {
        let _ = Loader::new().parse_bytes(&bytes);
    }

    /// `is_valid` is false exactly when an error-severity issue exists.
    #[test]
    fn validity_matches_error_presence(rows in proptest::collection::vec(valid_row(), 0..12)) {
        let table = Loader::new().parse_bytes(&to_csv(&rows)).unwrap();
        let result = Validator::new().validate(&table);

        let has_errors = result
            .issues
            .iter()
            .any(|i| i.severity == IssueSeverity::Error);
        prop_assert_eq!(result.is_valid, !has_errors);
    }

    /// Valid-by-construction tables always produce a verified report, and
    /// every channel bucket satisfies the funnel arithmetic.
    #[test]
    fn valid_tables_produce_consistent_reports(
        rows in proptest::collection::vec(valid_row(), 1..12)
    ) {
        let data = to_csv(&rows);
        let outcome = Analyst::new().analyze_bytes(&data).unwrap();

        match outcome {
            AnalysisOutcome::Report(report) => {
                let metrics = &report.metrics_summary;
                prop_assert_eq!(metrics.total_campaigns, rows.len());

                let mut bucketed = 0;
                for channel in &metrics.by_channel {
                    prop_assert!(channel.total_clicks <= channel.total_impressions);
                    prop_assert!(channel.total_conversions <= channel.total_clicks);
                    prop_assert!(channel.campaign_count > 0);
                    bucketed += channel.campaign_count;
                }
                prop_assert_eq!(bucketed, rows.len());

                let n = 3.min(rows.len());
                prop_assert_eq!(metrics.top_performers.len(), n);
                prop_assert_eq!(metrics.bottom_performers.len(), n);
            }
            AnalysisOutcome::Rejected(result) => {
                prop_assert!(false, "valid table was rejected: {:?}", result.issues);
            }
        }
    }

    /// The full pipeline is idempotent with the deterministic fallback.
    #[test]
    fn pipeline_is_deterministic(rows in proptest::collection::vec(valid_row(), 1..8)) {
        let data = to_csv(&rows);
        let analyst = Analyst::new();

        let first = analyst.analyze_bytes(&data).unwrap();
        let second = analyst.analyze_bytes(&data).unwrap();

        match (first, second) {
            (AnalysisOutcome::Report(a), AnalysisOutcome::Report(mut b)) => {
                b.generated_at = a.generated_at;
                prop_assert_eq!(a, b);
            }
            _ => {
                prop_assert!(false, "expected two reports");
            }
        }
    }

    /// A single cross-field violation flips the table to invalid.
    #[test]
    fn cross_field_violation_rejects(
        rows in proptest::collection::vec(valid_row(), 1..8),
        extra_clicks in 1u32..1000,
    ) {
        let mut data = String::from_utf8(to_csv(&rows)).unwrap();
        // Append a row whose clicks exceed its impressions.
        data.push_str(&format!(
            "Broken,10,{},50.0,0,10.0,0.0,Google Ads\n",
            10 + extra_clicks
        ));

        let outcome = Analyst::new().analyze_bytes(data.as_bytes()).unwrap();
        match outcome {
            AnalysisOutcome::Rejected(result) => {
                prop_assert!(result.errors().any(|i| i.field == "clicks"));
            }
            AnalysisOutcome::Report(_) => {
                prop_assert!(false, "expected rejection");
            }
        }
    }
}
