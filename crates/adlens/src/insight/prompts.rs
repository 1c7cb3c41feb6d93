//! Prompt construction for narrative generation.

use serde_json::{Value, json};

use crate::error::Result;
use crate::metrics::MetricsAnalysis;

/// Condense the analysis into a bounded context object.
///
/// Only aggregates go into the prompt — never raw rows — so prompt size is
/// independent of input size.
pub(crate) fn analysis_context(analysis: &MetricsAnalysis) -> Value {
    json!({
        "overview": {
            "total_campaigns": analysis.total_campaigns,
            "total_spend": format!("${:.2}", analysis.total_spend),
            "total_conversions": analysis.total_conversions,
            "avg_cpa": format!("${:.2}", analysis.cpa_summary.mean),
            "avg_ctr": format!("{:.2}%", analysis.ctr_summary.mean),
            "overall_ctr": format!("{:.2}%", analysis.overall_ctr),
        },
        "top_performers": analysis.top_performers,
        "bottom_performers": analysis.bottom_performers,
        "channels": analysis.by_channel.iter().map(|ch| {
            json!({
                "name": ch.channel,
                "campaigns": ch.campaign_count,
                "spend": format!("${:.2}", ch.total_cost),
                "conversions": ch.total_conversions,
                "avg_cpa": format!("${:.2}", ch.avg_cpa),
            })
        }).collect::<Vec<_>>(),
        "issues": analysis.patterns_detected.iter().map(|p| {
            json!({
                "type": p.kind,
                "severity": p.severity,
                "campaigns": p.campaigns,
                "description": p.description,
            })
        }).collect::<Vec<_>>(),
    })
}

/// Build the full prompt for one generation call.
pub(crate) fn insight_prompt(analysis: &MetricsAnalysis) -> Result<String> {
    let context = serde_json::to_string_pretty(&analysis_context(analysis))?;

    Ok(format!(
        r#"You are a senior digital-marketing analyst. Analyze the campaign
performance data below and produce a structured diagnostic.

## ANALYSIS DATA
{context}

## RULES
- Only reference campaign names that appear in the analysis data.
- Base every statement on the numbers provided; never invent figures.
- Severity values are limited to: "low", "medium", "high", "critical".
- Priority values are limited to: "low", "medium", "high".
- Keep the executive summary to 2-3 sentences.
- Respond with a single valid JSON object and nothing else.

## RESPONSE FORMAT
{{
  "executive_summary": "string",
  "key_issues": [
    {{
      "title": "string",
      "description": "string",
      "affected_campaigns": ["campaign name", "..."],
      "severity": "low|medium|high|critical",
      "potential_impact": "string"
    }}
  ],
  "recommendations": [
    {{
      "title": "string",
      "description": "string",
      "rationale": "string",
      "priority": "low|medium|high",
      "expected_outcome": "string"
    }}
  ],
  "risk_alerts": [
    {{
      "title": "string",
      "description": "string",
      "severity": "low|medium|high|critical",
      "mitigation": "string"
    }}
  ]
}}"#
    ))
}
