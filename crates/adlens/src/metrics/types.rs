//! Metrics analysis result types.

use serde::{Deserialize, Serialize};

use crate::report::Severity;

/// Five-number summary for one metric column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSummary {
    pub mean: f64,
    pub median: f64,
    /// Sample standard deviation; 0.0 for a single value.
    pub std: f64,
    pub min: f64,
    pub max: f64,
}

/// Aggregated metrics for one channel.
///
/// Totals are exact sums; `avg_ctr`/`avg_cpa` are arithmetic means over the
/// channel's campaigns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelMetrics {
    pub channel: String,
    pub total_impressions: i64,
    pub total_clicks: i64,
    pub total_conversions: i64,
    pub total_cost: f64,
    pub avg_ctr: f64,
    pub avg_cpa: f64,
    pub campaign_count: usize,
}

/// Category of a detected performance pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternKind {
    /// High engagement that fails to convert.
    HighCtrLowConversion,
    /// Acquisition cost well above the table average.
    HighCpa,
    /// Too few impressions for statistical significance.
    LowVolume,
    /// Budget spent with nothing to show for it.
    ZeroConversionsHighSpend,
}

impl PatternKind {
    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            PatternKind::HighCtrLowConversion => "High CTR, Low Conversion",
            PatternKind::HighCpa => "High CPA",
            PatternKind::LowVolume => "Low Volume",
            PatternKind::ZeroConversionsHighSpend => "Zero Conversions, High Spend",
        }
    }
}

/// A problematic pattern detected in the campaign data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternDetection {
    pub kind: PatternKind,
    /// Affected campaign names, in row order.
    pub campaigns: Vec<String>,
    pub description: String,
    pub severity: Severity,
}

/// Complete deterministic analysis of one campaign table.
///
/// A pure function of the input rows: the same table always produces a
/// bit-identical analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsAnalysis {
    pub total_campaigns: usize,
    pub total_spend: f64,
    pub total_conversions: i64,

    /// CTR derived from totals (total clicks / total impressions, as a
    /// percentage) — not the mean of per-row CTRs.
    pub overall_ctr: f64,

    pub impressions_summary: MetricSummary,
    pub ctr_summary: MetricSummary,
    pub cpa_summary: MetricSummary,
    pub conversions_summary: MetricSummary,

    /// Per-channel breakdown, one entry per distinct channel value, in
    /// first-seen order.
    pub by_channel: Vec<ChannelMetrics>,

    #[serde(default)]
    pub patterns_detected: Vec<PatternDetection>,

    /// Campaign names ranked best-first by efficiency.
    pub top_performers: Vec<String>,
    /// Campaign names ranked worst-last by efficiency.
    pub bottom_performers: Vec<String>,
}
