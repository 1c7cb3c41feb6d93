//! Deterministic rule-based narrative generation.
//!
//! Derives the same four narrative sections as a generation backend, purely
//! from the computed metrics. This keeps the pipeline fully available when
//! no backend is configured or a backend call fails.

use tracing::info;

use super::engine::NarrativeSections;
use crate::config::Thresholds;
use crate::metrics::{MetricsAnalysis, PatternKind};
use crate::report::{KeyIssue, Priority, Recommendation, RiskAlert, Severity};

/// Campaigns named per issue before truncating.
const ISSUE_CAMPAIGN_CAP: usize = 5;

/// Build all four narrative sections from the metrics.
pub(crate) fn narrative_sections(
    analysis: &MetricsAnalysis,
    thresholds: &Thresholds,
) -> NarrativeSections {
    info!("generating deterministic fallback insights");

    NarrativeSections {
        executive_summary: executive_summary(analysis),
        key_issues: key_issues(analysis),
        recommendations: recommendations(analysis),
        risk_alerts: risk_alerts(analysis, thresholds),
    }
}

fn executive_summary(analysis: &MetricsAnalysis) -> String {
    let critical = count_by_severity(analysis, Severity::Critical);
    let high = count_by_severity(analysis, Severity::High);

    let mut issues_summary = String::new();
    if critical > 0 {
        issues_summary.push_str(&format!(
            "ATTENTION: {critical} critical problem(s) detected. "
        ));
    }
    if high > 0 {
        issues_summary.push_str(&format!("{high} high-severity problem(s) identified. "));
    }

    format!(
        "Analyzed {} campaigns with a total spend of ${:.2} and {} conversions. \
         {}Average CPA: ${:.2}.",
        analysis.total_campaigns,
        analysis.total_spend,
        analysis.total_conversions,
        issues_summary,
        analysis.cpa_summary.mean
    )
}

fn count_by_severity(analysis: &MetricsAnalysis, severity: Severity) -> usize {
    analysis
        .patterns_detected
        .iter()
        .filter(|p| p.severity == severity)
        .count()
}

/// One key issue per detected pattern, severity carried over.
fn key_issues(analysis: &MetricsAnalysis) -> Vec<KeyIssue> {
    analysis
        .patterns_detected
        .iter()
        .map(|p| KeyIssue {
            title: p.kind.label().to_string(),
            description: p.description.clone(),
            affected_campaigns: p.campaigns.iter().take(ISSUE_CAMPAIGN_CAP).cloned().collect(),
            severity: p.severity,
            potential_impact: "Requires a detailed review to estimate the financial impact."
                .to_string(),
        })
        .collect()
}

/// Templated recommendations, one per detected pattern category, with a
/// monitoring recommendation when nothing was flagged.
fn recommendations(analysis: &MetricsAnalysis) -> Vec<Recommendation> {
    let detected =
        |kind: PatternKind| analysis.patterns_detected.iter().any(|p| p.kind == kind);

    let mut recommendations = Vec::new();

    if detected(PatternKind::HighCpa) {
        recommendations.push(Recommendation {
            title: "Optimize high-CPA campaigns".to_string(),
            description: "Review targeting, creatives, and landing pages for the flagged \
                          campaigns."
                .to_string(),
            rationale: "Above-average CPA drags down the overall return on spend.".to_string(),
            priority: Priority::High,
            expected_outcome: "A 20-30% reduction in average CPA.".to_string(),
        });
    }

    if detected(PatternKind::ZeroConversionsHighSpend) {
        recommendations.push(Recommendation {
            title: "Pause or rework campaigns without conversions".to_string(),
            description: "Decide whether campaigns with zero conversions should be paused \
                          immediately."
                .to_string(),
            rationale: "Budget is being spent without measurable return.".to_string(),
            priority: Priority::High,
            expected_outcome: "Immediate budget savings.".to_string(),
        });
    }

    if detected(PatternKind::HighCtrLowConversion) {
        recommendations.push(Recommendation {
            title: "Review landing pages".to_string(),
            description: "Examine the post-click experience of campaigns with high CTR but \
                          low conversion."
                .to_string(),
            rationale: "Strong engagement is not translating into conversions.".to_string(),
            priority: Priority::Medium,
            expected_outcome: "A 10-20% lift in conversion rate.".to_string(),
        });
    }

    if recommendations.is_empty() {
        recommendations.push(Recommendation {
            title: "Keep monitoring actively".to_string(),
            description: "Continue tracking metrics and comparing them against sector \
                          benchmarks."
                .to_string(),
            rationale: "Campaigns are performing within expected parameters.".to_string(),
            priority: Priority::Low,
            expected_outcome: "Early detection of emerging problems.".to_string(),
        });
    }

    recommendations
}

/// One alert per critical/high pattern, plus a confidence alert when the
/// sample is too small to trust the statistics.
fn risk_alerts(analysis: &MetricsAnalysis, thresholds: &Thresholds) -> Vec<RiskAlert> {
    let mut alerts: Vec<RiskAlert> = analysis
        .patterns_detected
        .iter()
        .filter(|p| matches!(p.severity, Severity::Critical | Severity::High))
        .map(|p| RiskAlert {
            title: format!("Risk: {}", p.kind.label()),
            description: p.description.clone(),
            severity: p.severity,
            mitigation: "Review the affected campaign(s) immediately and consider pausing \
                         them."
                .to_string(),
        })
        .collect();

    if analysis.total_campaigns < thresholds.min_sample_size {
        alerts.push(RiskAlert {
            title: "Limited sample size".to_string(),
            description: format!(
                "Only {} campaign(s) were analyzed, below the minimum of {} for \
                 statistically confident conclusions.",
                analysis.total_campaigns, thresholds.min_sample_size
            ),
            severity: Severity::Low,
            mitigation: "Collect more data before acting on these findings.".to_string(),
        });
    }

    alerts
}
