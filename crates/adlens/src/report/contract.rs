//! End-of-pipeline report verification.
//!
//! Enum membership is already enforced by the type system; this gate checks
//! what types cannot: cross-references into the analyzed table and numeric
//! consistency of the embedded metrics. A failure here is an internal
//! defect in the metrics or insight engine, never a user-input problem.

use std::collections::HashSet;

use tracing::error;

use super::Report;
use crate::error::{AdlensError, Result};
use crate::input::CampaignTable;

/// Verify a report against the table it was derived from.
pub fn verify_report(report: &Report, table: &CampaignTable) -> Result<()> {
    if let Err(message) = check(report, table) {
        error!(%message, "report contract violated");
        return Err(AdlensError::Contract(message));
    }
    Ok(())
}

fn check(report: &Report, table: &CampaignTable) -> std::result::Result<(), String> {
    if report.executive_summary.trim().is_empty() {
        return Err("executive summary is empty".to_string());
    }

    let metrics = &report.metrics_summary;
    if metrics.total_campaigns != table.row_count() {
        return Err(format!(
            "metrics cover {} campaigns but the table has {}",
            metrics.total_campaigns,
            table.row_count()
        ));
    }

    let known: HashSet<&str> = table.campaign_names().collect();

    for issue in &report.key_issues {
        for campaign in &issue.affected_campaigns {
            if !known.contains(campaign.as_str()) {
                return Err(format!(
                    "issue '{}' references unknown campaign '{campaign}'",
                    issue.title
                ));
            }
        }
    }

    for name in metrics
        .top_performers
        .iter()
        .chain(&metrics.bottom_performers)
    {
        if !known.contains(name.as_str()) {
            return Err(format!("performer ranking references unknown campaign '{name}'"));
        }
    }

    let mut bucketed = 0;
    for channel in &metrics.by_channel {
        if channel.total_clicks > channel.total_impressions {
            return Err(format!(
                "channel '{}' has more clicks than impressions",
                channel.channel
            ));
        }
        if channel.total_conversions > channel.total_clicks {
            return Err(format!(
                "channel '{}' has more conversions than clicks",
                channel.channel
            ));
        }
        if channel.campaign_count == 0 {
            return Err(format!("channel '{}' bucket is empty", channel.channel));
        }
        bucketed += channel.campaign_count;
    }

    if bucketed != metrics.total_campaigns {
        return Err(format!(
            "channel buckets cover {bucketed} campaigns, expected {}",
            metrics.total_campaigns
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Thresholds;
    use crate::input::Loader;
    use crate::insight::InsightEngine;
    use crate::metrics::MetricsEngine;

    fn table() -> CampaignTable {
        let data = "campaign_name,impressions,clicks,ctr,conversions,cost,cpa,channel\n\
                    A,1000,50,5.0,2,100.0,50.0,Google Ads\n\
                    B,2000,100,5.0,4,200.0,50.0,Meta Ads\n";
        Loader::new().parse_bytes(data.as_bytes()).unwrap()
    }

    fn report(table: &CampaignTable) -> Report {
        let analysis = MetricsEngine::new().analyze(table).unwrap();
        InsightEngine::fallback_only(Thresholds::default()).generate(table, &analysis)
    }

    #[test]
    fn test_fallback_report_passes() {
        let table = table();
        let report = report(&table);
        assert!(verify_report(&report, &table).is_ok());
    }

    #[test]
    fn test_unknown_campaign_is_a_violation() {
        let table = table();
        let mut report = report(&table);
        report.key_issues.push(crate::report::KeyIssue {
            title: "Phantom".to_string(),
            description: "x".to_string(),
            affected_campaigns: vec!["Nope".to_string()],
            severity: crate::report::Severity::Low,
            potential_impact: "x".to_string(),
        });

        assert!(matches!(
            verify_report(&report, &table),
            Err(AdlensError::Contract(_))
        ));
    }

    #[test]
    fn test_empty_summary_is_a_violation() {
        let table = table();
        let mut report = report(&table);
        report.executive_summary = "  ".to_string();

        assert!(verify_report(&report, &table).is_err());
    }

    #[test]
    fn test_inconsistent_channel_bucket_is_a_violation() {
        let table = table();
        let mut report = report(&table);
        report.metrics_summary.by_channel[0].total_clicks =
            report.metrics_summary.by_channel[0].total_impressions + 1;

        assert!(verify_report(&report, &table).is_err());
    }
}
