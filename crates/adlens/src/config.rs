//! Pipeline configuration.
//!
//! Configuration is a plain value constructed once at process start and
//! passed into [`crate::Analyst`]. Engine code never reads the environment
//! directly; the `from_env` constructors on the backend providers are the
//! only place environment variables are consulted.

/// Which generation backend drives the narrative sections of the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// OpenAI-compatible chat completions API.
    OpenAi,
    /// Anthropic messages API.
    Anthropic,
    /// Google Gemini generateContent API.
    Gemini,
    /// No network backend; the deterministic generator produces everything.
    Fallback,
}

impl BackendKind {
    /// Short name used in logs and CLI output.
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::OpenAi => "openai",
            BackendKind::Anthropic => "anthropic",
            BackendKind::Gemini => "gemini",
            BackendKind::Fallback => "fallback",
        }
    }
}

/// Thresholds steering outlier warnings, pattern detection, and ranking.
#[derive(Debug, Clone)]
pub struct Thresholds {
    /// IQR multiplier for outlier detection (1.5 = mild, 3.0 = extreme).
    pub outlier_iqr_multiplier: f64,

    /// Campaigns below this many impressions are flagged as low volume.
    pub min_impressions: i64,

    /// CTR (%) above which a campaign counts as high-engagement.
    pub high_ctr_pct: f64,

    /// Conversion rate (%) below which a campaign counts as non-converting.
    pub low_conversion_rate_pct: f64,

    /// A campaign's CPA above this multiple of the mean CPA is flagged.
    pub high_cpa_multiplier: f64,

    /// How many top and bottom performers to rank.
    pub top_n: usize,

    /// Below this many campaigns, the fallback report carries a
    /// low-severity alert about statistical confidence.
    pub min_sample_size: usize,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            outlier_iqr_multiplier: 1.5,
            min_impressions: 1000,
            high_ctr_pct: 5.0,
            low_conversion_rate_pct: 1.0,
            high_cpa_multiplier: 2.0,
            top_n: 3,
            min_sample_size: 4,
        }
    }
}

/// Full configuration for one [`crate::Analyst`] instance.
///
/// Backend credentials and generation parameters live with the backend
/// itself ([`crate::GenerationConfig`]); this value records the selection
/// and the analysis thresholds.
#[derive(Debug, Clone)]
pub struct AnalystConfig {
    /// Selected generation backend.
    pub backend: BackendKind,

    /// Analysis thresholds.
    pub thresholds: Thresholds,
}

impl Default for AnalystConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::Fallback,
            thresholds: Thresholds::default(),
        }
    }
}

impl AnalystConfig {
    /// Create a configuration with defaults (deterministic fallback only).
    pub fn new() -> Self {
        Self::default()
    }

    /// Select the generation backend.
    pub fn with_backend(mut self, backend: BackendKind) -> Self {
        self.backend = backend;
        self
    }

    /// Override the analysis thresholds.
    pub fn with_thresholds(mut self, thresholds: Thresholds) -> Self {
        self.thresholds = thresholds;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_thresholds() {
        let t = Thresholds::default();
        assert_eq!(t.outlier_iqr_multiplier, 1.5);
        assert_eq!(t.min_impressions, 1000);
        assert_eq!(t.high_cpa_multiplier, 2.0);
        assert_eq!(t.top_n, 3);
    }

    #[test]
    fn test_builder_chain() {
        let config = AnalystConfig::new()
            .with_backend(BackendKind::Anthropic)
            .with_thresholds(Thresholds {
                top_n: 5,
                ..Thresholds::default()
            });

        assert_eq!(config.backend, BackendKind::Anthropic);
        assert_eq!(config.thresholds.top_n, 5);
    }
}
