//! Adlens: diagnostic analysis of marketing-campaign exports.
//!
//! Adlens ingests a delimited export of campaign performance data and
//! produces a structured report: deterministic statistics, flagged
//! anomalies, and narrative insights generated by a pluggable LLM backend
//! with a rule-based fallback behind it.
//!
//! # Pipeline
//!
//! bytes → [`Loader`] → table → [`Validator`] → [`MetricsEngine`] →
//! [`InsightEngine`] → verified [`Report`]
//!
//! Validation errors reject the input with a full issue list; a backend
//! failure never does — the deterministic fallback keeps the pipeline
//! available without any external dependency.
//!
//! # Example
//!
//! ```no_run
//! use adlens::{Analyst, AnalysisOutcome};
//!
//! let analyst = Analyst::new();
//! match analyst.analyze_file("campaigns.csv").unwrap() {
//!     AnalysisOutcome::Report(report) => {
//!         println!("{}", report.executive_summary);
//!     }
//!     AnalysisOutcome::Rejected(result) => {
//!         for issue in &result.issues {
//!             eprintln!("{}: {}", issue.field, issue.message);
//!         }
//!     }
//! }
//! ```

pub mod config;
pub mod error;
pub mod input;
pub mod insight;
pub mod llm;
pub mod metrics;
pub mod report;
pub mod validation;

mod pipeline;

pub use config::{AnalystConfig, BackendKind, Thresholds};
pub use error::{AdlensError, Result};
pub use input::{CampaignRow, CampaignTable, InputFormat, Loader};
pub use insight::InsightEngine;
pub use llm::{
    AnthropicBackend, GeminiBackend, GenerationBackend, GenerationConfig, MockBackend,
    OpenAiBackend,
};
pub use metrics::{MetricsAnalysis, MetricsEngine};
pub use pipeline::{AnalysisOutcome, Analyst};
pub use report::{Priority, Report, Severity};
pub use validation::{IssueSeverity, ValidationIssue, ValidationResult, Validator};
