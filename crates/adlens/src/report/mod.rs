//! The shared output contract: report types and the final verification gate.
//!
//! Both the metrics engine's numeric summary and the insight engine's
//! narrative sections conform to these types. Serde enums keep the severity
//! and priority vocabularies closed, so malformed backend output fails at
//! parse time rather than leaking into a report.

mod contract;

pub use contract::verify_report;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::metrics::MetricsAnalysis;

/// Severity for issues and risk alerts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// Get a human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Low => "Low",
            Severity::Medium => "Medium",
            Severity::High => "High",
            Severity::Critical => "Critical",
        }
    }
}

/// Priority for recommendations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

/// A key issue identified in the campaign data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyIssue {
    pub title: String,
    pub description: String,
    /// Campaign names this issue applies to; every entry must exist in the
    /// analyzed table.
    #[serde(default)]
    pub affected_campaigns: Vec<String>,
    pub severity: Severity,
    pub potential_impact: String,
}

/// An actionable recommendation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub title: String,
    pub description: String,
    pub rationale: String,
    pub priority: Priority,
    pub expected_outcome: String,
}

/// A risk requiring attention.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAlert {
    pub title: String,
    pub description: String,
    pub severity: Severity,
    pub mitigation: String,
}

/// The complete diagnostic report for one analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// Two-to-three sentence overview.
    pub executive_summary: String,
    pub key_issues: Vec<KeyIssue>,
    pub recommendations: Vec<Recommendation>,
    pub risk_alerts: Vec<RiskAlert>,
    pub metrics_summary: MetricsAnalysis,
    /// The report's only wall-clock field; everything else is a pure
    /// function of the input.
    pub generated_at: DateTime<Utc>,
}
