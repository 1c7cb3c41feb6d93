//! Deterministic metrics computation over validated tables.

use indexmap::IndexMap;
use tracing::info;

use super::types::{
    ChannelMetrics, MetricSummary, MetricsAnalysis, PatternDetection, PatternKind,
};
use crate::config::Thresholds;
use crate::error::{AdlensError, Result};
use crate::input::{CampaignRow, CampaignTable};
use crate::report::Severity;

/// A fully-resolved row. Construction fails on any null field, which is the
/// metrics engine's precondition check.
struct NumericRow<'a> {
    name: &'a str,
    channel: &'a str,
    impressions: i64,
    clicks: i64,
    ctr: f64,
    conversions: i64,
    cost: f64,
    cpa: f64,
}

impl<'a> NumericRow<'a> {
    fn from_row(index: usize, row: &'a CampaignRow) -> Result<Self> {
        if !row.is_complete() {
            return Err(AdlensError::Precondition(format!(
                "row {index} has unresolved null fields; the table was not validated"
            )));
        }
        Ok(Self {
            name: &row.campaign_name,
            channel: &row.channel,
            impressions: row.impressions.unwrap_or_default(),
            clicks: row.clicks.unwrap_or_default(),
            ctr: row.ctr.unwrap_or_default(),
            conversions: row.conversions.unwrap_or_default(),
            cost: row.cost.unwrap_or_default(),
            cpa: row.cpa.unwrap_or_default(),
        })
    }

    /// Conversions per dollar spent; zero when nothing was spent.
    fn efficiency(&self) -> f64 {
        if self.cost > 0.0 {
            self.conversions as f64 / self.cost
        } else {
            0.0
        }
    }

    /// Conversions per click, as a percentage; zero when there are no clicks.
    fn conversion_rate(&self) -> f64 {
        if self.clicks > 0 {
            self.conversions as f64 / self.clicks as f64 * 100.0
        } else {
            0.0
        }
    }
}

/// Computes deterministic aggregate statistics from a validated table.
///
/// A pure function of the input rows: no randomness, no wall clock.
/// Assumes validation already passed; an incomplete row or an empty table
/// is a precondition violation, unreachable through the normal pipeline.
pub struct MetricsEngine {
    thresholds: Thresholds,
}

impl MetricsEngine {
    /// Create an engine with default thresholds.
    pub fn new() -> Self {
        Self {
            thresholds: Thresholds::default(),
        }
    }

    /// Create an engine with custom thresholds.
    pub fn with_thresholds(thresholds: Thresholds) -> Self {
        Self { thresholds }
    }

    /// Compute the full metrics analysis.
    pub fn analyze(&self, table: &CampaignTable) -> Result<MetricsAnalysis> {
        if table.row_count() == 0 {
            return Err(AdlensError::Precondition(
                "table has no rows; validation must reject empty tables".to_string(),
            ));
        }

        let rows: Vec<NumericRow> = table
            .rows
            .iter()
            .enumerate()
            .map(|(idx, row)| NumericRow::from_row(idx, row))
            .collect::<Result<_>>()?;

        let total_spend: f64 = rows.iter().map(|r| r.cost).sum();
        let total_conversions: i64 = rows.iter().map(|r| r.conversions).sum();
        let total_impressions: i64 = rows.iter().map(|r| r.impressions).sum();
        let total_clicks: i64 = rows.iter().map(|r| r.clicks).sum();

        let overall_ctr = if total_impressions > 0 {
            total_clicks as f64 / total_impressions as f64 * 100.0
        } else {
            0.0
        };

        let mut patterns = Vec::new();
        patterns.extend(self.detect_high_ctr_low_conversion(&rows));
        patterns.extend(self.detect_high_cpa(&rows));
        patterns.extend(self.detect_low_volume(&rows));
        patterns.extend(self.detect_zero_conversions_high_spend(&rows));

        let (top_performers, bottom_performers) = self.rank_campaigns(&rows);

        let analysis = MetricsAnalysis {
            total_campaigns: rows.len(),
            total_spend,
            total_conversions,
            overall_ctr,
            impressions_summary: summarize(rows.iter().map(|r| r.impressions as f64)),
            ctr_summary: summarize(rows.iter().map(|r| r.ctr)),
            cpa_summary: summarize(rows.iter().map(|r| r.cpa)),
            conversions_summary: summarize(rows.iter().map(|r| r.conversions as f64)),
            by_channel: group_by_channel(&rows),
            patterns_detected: patterns,
            top_performers,
            bottom_performers,
        };

        info!(
            campaigns = analysis.total_campaigns,
            total_spend = analysis.total_spend,
            total_conversions = analysis.total_conversions,
            patterns = analysis.patterns_detected.len(),
            "metrics analysis complete"
        );

        Ok(analysis)
    }

    /// High engagement that fails to convert: often misleading ad copy,
    /// landing page issues, or wrong audience targeting.
    fn detect_high_ctr_low_conversion(&self, rows: &[NumericRow]) -> Option<PatternDetection> {
        let affected: Vec<String> = rows
            .iter()
            .filter(|r| {
                r.ctr > self.thresholds.high_ctr_pct
                    && r.conversion_rate() < self.thresholds.low_conversion_rate_pct
            })
            .map(|r| r.name.to_string())
            .collect();

        if affected.is_empty() {
            return None;
        }

        Some(PatternDetection {
            kind: PatternKind::HighCtrLowConversion,
            description: format!(
                "Found {} campaign(s) with CTR above {}% but conversion rate below {}%. \
                 This may indicate landing page issues or misleading ad copy.",
                affected.len(),
                self.thresholds.high_ctr_pct,
                self.thresholds.low_conversion_rate_pct
            ),
            campaigns: affected,
            severity: Severity::High,
        })
    }

    fn detect_high_cpa(&self, rows: &[NumericRow]) -> Option<PatternDetection> {
        let avg_cpa = rows.iter().map(|r| r.cpa).sum::<f64>() / rows.len() as f64;
        let threshold = avg_cpa * self.thresholds.high_cpa_multiplier;

        let flagged: Vec<&NumericRow> = rows.iter().filter(|r| r.cpa > threshold).collect();
        if flagged.is_empty() {
            return None;
        }

        let flagged_avg = flagged.iter().map(|r| r.cpa).sum::<f64>() / flagged.len() as f64;

        Some(PatternDetection {
            kind: PatternKind::HighCpa,
            description: format!(
                "Found {} campaign(s) with CPA above {}x the average (${avg_cpa:.2}). \
                 These campaigns are spending ${flagged_avg:.2} per acquisition.",
                flagged.len(),
                self.thresholds.high_cpa_multiplier
            ),
            campaigns: flagged.iter().map(|r| r.name.to_string()).collect(),
            severity: Severity::High,
        })
    }

    fn detect_low_volume(&self, rows: &[NumericRow]) -> Option<PatternDetection> {
        let affected: Vec<String> = rows
            .iter()
            .filter(|r| r.impressions < self.thresholds.min_impressions)
            .map(|r| r.name.to_string())
            .collect();

        if affected.is_empty() {
            return None;
        }

        Some(PatternDetection {
            kind: PatternKind::LowVolume,
            description: format!(
                "Found {} campaign(s) with less than {} impressions. \
                 Results may not be statistically significant.",
                affected.len(),
                self.thresholds.min_impressions
            ),
            campaigns: affected,
            severity: Severity::Medium,
        })
    }

    fn detect_zero_conversions_high_spend(&self, rows: &[NumericRow]) -> Option<PatternDetection> {
        let avg_cost = rows.iter().map(|r| r.cost).sum::<f64>() / rows.len() as f64;

        let flagged: Vec<&NumericRow> = rows
            .iter()
            .filter(|r| r.conversions == 0 && r.cost > avg_cost)
            .collect();
        if flagged.is_empty() {
            return None;
        }

        let wasted: f64 = flagged.iter().map(|r| r.cost).sum();

        Some(PatternDetection {
            kind: PatternKind::ZeroConversionsHighSpend,
            description: format!(
                "Found {} campaign(s) with zero conversions but above-average spend. \
                 Total at-risk budget: ${wasted:.2}",
                flagged.len()
            ),
            campaigns: flagged.iter().map(|r| r.name.to_string()).collect(),
            severity: Severity::Critical,
        })
    }

    /// Rank campaigns by efficiency. Stable descending sort: ties keep
    /// original row order, and top/bottom are head/tail of one ranking so
    /// they cannot overlap when N is at most half the table.
    fn rank_campaigns(&self, rows: &[NumericRow]) -> (Vec<String>, Vec<String>) {
        let mut ranked: Vec<&NumericRow> = rows.iter().collect();
        ranked.sort_by(|a, b| {
            b.efficiency()
                .partial_cmp(&a.efficiency())
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let n = self.thresholds.top_n.min(ranked.len());
        let top = ranked[..n].iter().map(|r| r.name.to_string()).collect();
        let bottom = ranked[ranked.len() - n..]
            .iter()
            .map(|r| r.name.to_string())
            .collect();

        (top, bottom)
    }
}

impl Default for MetricsEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Five-number summary: arithmetic mean, sort-based median, sample standard
/// deviation (0.0 for a single value).
fn summarize(values: impl Iterator<Item = f64>) -> MetricSummary {
    let values: Vec<f64> = values.collect();
    let n = values.len();
    debug_assert!(n > 0, "summarize requires at least one value");

    let mean = values.iter().sum::<f64>() / n as f64;

    let mut sorted = values.clone();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let median = if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    };

    let std = if n > 1 {
        let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
        var.sqrt()
    } else {
        0.0
    };

    MetricSummary {
        mean,
        median,
        std,
        min: sorted[0],
        max: sorted[n - 1],
    }
}

/// Group rows by exact channel string, preserving first-seen order.
fn group_by_channel(rows: &[NumericRow]) -> Vec<ChannelMetrics> {
    let mut buckets: IndexMap<&str, Vec<&NumericRow>> = IndexMap::new();
    for row in rows {
        buckets.entry(row.channel).or_default().push(row);
    }

    buckets
        .into_iter()
        .map(|(channel, members)| {
            let count = members.len();
            ChannelMetrics {
                channel: channel.to_string(),
                total_impressions: members.iter().map(|r| r.impressions).sum(),
                total_clicks: members.iter().map(|r| r.clicks).sum(),
                total_conversions: members.iter().map(|r| r.conversions).sum(),
                total_cost: members.iter().map(|r| r.cost).sum(),
                avg_ctr: members.iter().map(|r| r.ctr).sum::<f64>() / count as f64,
                avg_cpa: members.iter().map(|r| r.cpa).sum::<f64>() / count as f64,
                campaign_count: count,
            }
        })
        .collect()
}
