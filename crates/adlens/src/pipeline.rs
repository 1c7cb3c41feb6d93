//! Pipeline facade tying the stages together.

use std::path::Path;
use std::sync::Arc;

use tracing::info;

use crate::config::{AnalystConfig, BackendKind};
use crate::error::Result;
use crate::input::Loader;
use crate::insight::InsightEngine;
use crate::llm::GenerationBackend;
use crate::metrics::MetricsEngine;
use crate::report::{Report, verify_report};
use crate::validation::{ValidationResult, Validator};

/// Outcome of one pipeline invocation.
#[derive(Debug)]
pub enum AnalysisOutcome {
    /// Validation found errors; the full issue list goes back to the caller.
    Rejected(ValidationResult),
    /// Analysis completed and the report passed the output contract.
    Report(Box<Report>),
}

/// The campaign analysis pipeline: bytes → table → validation → metrics →
/// insights → verified report.
///
/// Stateless across invocations: each call builds its own table and report
/// and shares nothing mutable, so one `Analyst` is safe to use from
/// concurrent contexts.
pub struct Analyst {
    config: AnalystConfig,
    loader: Loader,
    validator: Validator,
    metrics: MetricsEngine,
    insight: InsightEngine,
}

impl Analyst {
    /// Create an analyst with default configuration (deterministic fallback
    /// insights only).
    pub fn new() -> Self {
        Self::with_config(AnalystConfig::default())
    }

    /// Create an analyst from a configuration, without a network backend.
    ///
    /// Use [`Analyst::with_backend`] to attach one; `config.backend` only
    /// records the selection for logging and CLI wiring.
    pub fn with_config(config: AnalystConfig) -> Self {
        let validator = Validator::with_thresholds(config.thresholds.clone());
        let metrics = MetricsEngine::with_thresholds(config.thresholds.clone());
        let insight = InsightEngine::fallback_only(config.thresholds.clone());

        Self {
            config,
            loader: Loader::new(),
            validator,
            metrics,
            insight,
        }
    }

    /// Attach a generation backend for the insight stage.
    pub fn with_backend(mut self, backend: impl GenerationBackend + 'static) -> Self {
        self.insight = InsightEngine::with_backend(
            self.config.thresholds.clone(),
            Arc::new(backend),
        );
        self
    }

    /// Attach an already-shared generation backend.
    pub fn with_shared_backend(mut self, backend: Arc<dyn GenerationBackend>) -> Self {
        self.insight = InsightEngine::with_backend(self.config.thresholds.clone(), backend);
        self
    }

    /// The selected backend kind, for logging and display.
    pub fn backend_kind(&self) -> BackendKind {
        self.config.backend
    }

    /// Run the full pipeline over raw bytes.
    ///
    /// Fails only on parse errors (malformed input) or a contract violation
    /// (an internal defect). Validation failures are a normal outcome, not
    /// an error; generation failures never escape the insight stage.
    pub fn analyze_bytes(&self, bytes: &[u8]) -> Result<AnalysisOutcome> {
        let table = self.loader.parse_bytes(bytes)?;

        let validation = self.validator.validate(&table);
        if !validation.is_valid {
            info!(
                errors = validation.errors().count(),
                "analysis rejected by validation"
            );
            return Ok(AnalysisOutcome::Rejected(validation));
        }

        let analysis = self.metrics.analyze(&table)?;
        let report = self.insight.generate(&table, &analysis);
        verify_report(&report, &table)?;

        info!(
            campaigns = analysis.total_campaigns,
            issues = report.key_issues.len(),
            recommendations = report.recommendations.len(),
            "analysis complete"
        );

        Ok(AnalysisOutcome::Report(Box::new(report)))
    }

    /// Run the full pipeline over a file on disk.
    pub fn analyze_file(&self, path: impl AsRef<Path>) -> Result<AnalysisOutcome> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| crate::error::AdlensError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        self.analyze_bytes(&bytes)
    }
}

impl Default for Analyst {
    fn default() -> Self {
        Self::new()
    }
}
