//! Insight engine: narrative synthesis with a deterministic fallback.
//!
//! One invocation moves through: backend selected → prompting → parsed ok →
//! done; a generation failure, a parse failure, or a failed campaign
//! cross-check branches to the fallback instead. There are no retries and
//! at most one fallback substitution per invocation — the fallback itself
//! cannot fail, being a pure function of already-validated metrics.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use tracing::{info, warn};

use super::fallback;
use super::prompts;
use crate::config::Thresholds;
use crate::error::{AdlensError, Result};
use crate::input::CampaignTable;
use crate::llm::GenerationBackend;
use crate::metrics::MetricsAnalysis;
use crate::report::{KeyIssue, Recommendation, Report, RiskAlert};

/// The four narrative sections, as parsed from a backend response or built
/// by the fallback generator.
#[derive(Debug, Deserialize)]
pub(crate) struct NarrativeSections {
    pub(crate) executive_summary: String,
    #[serde(default)]
    pub(crate) key_issues: Vec<KeyIssue>,
    #[serde(default)]
    pub(crate) recommendations: Vec<Recommendation>,
    #[serde(default)]
    pub(crate) risk_alerts: Vec<RiskAlert>,
}

/// Produces the narrative report from a table and its metrics.
pub struct InsightEngine {
    backend: Option<Arc<dyn GenerationBackend>>,
    thresholds: Thresholds,
}

impl InsightEngine {
    /// An engine that always uses the deterministic generator.
    pub fn fallback_only(thresholds: Thresholds) -> Self {
        Self {
            backend: None,
            thresholds,
        }
    }

    /// An engine delegating to the given backend, with the fallback behind it.
    pub fn with_backend(thresholds: Thresholds, backend: Arc<dyn GenerationBackend>) -> Self {
        Self {
            backend: Some(backend),
            thresholds,
        }
    }

    /// Generate the report. Never fails: any backend problem is absorbed by
    /// the deterministic fallback.
    pub fn generate(&self, table: &CampaignTable, analysis: &MetricsAnalysis) -> Report {
        let sections = match &self.backend {
            Some(backend) => match self.try_backend(backend.as_ref(), table, analysis) {
                Ok(sections) => {
                    info!(
                        backend = backend.name(),
                        issues = sections.key_issues.len(),
                        "backend insights accepted"
                    );
                    sections
                }
                Err(e) => {
                    warn!(
                        backend = backend.name(),
                        error = %e,
                        "generation failed, substituting deterministic fallback"
                    );
                    fallback::narrative_sections(analysis, &self.thresholds)
                }
            },
            None => fallback::narrative_sections(analysis, &self.thresholds),
        };

        Report {
            executive_summary: sections.executive_summary,
            key_issues: sections.key_issues,
            recommendations: sections.recommendations,
            risk_alerts: sections.risk_alerts,
            metrics_summary: analysis.clone(),
            generated_at: Utc::now(),
        }
    }

    /// One backend attempt: prompt, call, parse, cross-check.
    fn try_backend(
        &self,
        backend: &dyn GenerationBackend,
        table: &CampaignTable,
        analysis: &MetricsAnalysis,
    ) -> Result<NarrativeSections> {
        let prompt = prompts::insight_prompt(analysis)?;
        let raw = backend.generate(&prompt)?;
        let sections = parse_sections(&raw)?;
        check_sections(&sections, table)?;
        Ok(sections)
    }
}

/// Parse a raw backend response into narrative sections.
///
/// The response is untrusted input: markdown fences are stripped, and the
/// strict section types reject unknown severities and priorities.
pub(crate) fn parse_sections(raw: &str) -> Result<NarrativeSections> {
    let json_str = strip_code_fences(raw);
    serde_json::from_str(json_str)
        .map_err(|e| AdlensError::Generation(format!("response failed schema parsing: {e}")))
}

/// Validate narrative sections against the analyzed table.
fn check_sections(sections: &NarrativeSections, table: &CampaignTable) -> Result<()> {
    if sections.executive_summary.trim().is_empty() {
        return Err(AdlensError::Generation(
            "response has an empty executive summary".to_string(),
        ));
    }

    let known: HashSet<&str> = table.campaign_names().collect();
    for issue in &sections.key_issues {
        for campaign in &issue.affected_campaigns {
            if !known.contains(campaign.as_str()) {
                return Err(AdlensError::Generation(format!(
                    "response references unknown campaign '{campaign}'"
                )));
            }
        }
    }

    Ok(())
}

/// Extract JSON from a response that may wrap it in markdown code fences.
fn strip_code_fences(response: &str) -> &str {
    if response.contains("```json") {
        response
            .split("```json")
            .nth(1)
            .and_then(|s| s.split("```").next())
            .map(|s| s.trim())
            .unwrap_or(response)
    } else if response.contains("```") {
        response
            .split("```")
            .nth(1)
            .map(|s| s.trim())
            .unwrap_or(response)
    } else {
        response.trim()
    }
}
