//! Generation backend trait and shared configuration.

use crate::error::Result;

/// Configuration shared by all generation backends.
#[derive(Debug, Clone)]
pub struct GenerationConfig {
    /// Model identifier, provider-specific.
    pub model: String,

    /// Maximum tokens in the response.
    pub max_tokens: usize,

    /// Sampling temperature (0.0-1.0). Kept low: the output must survive
    /// strict schema parsing.
    pub temperature: f64,

    /// Hard timeout for one backend call, in seconds. A call is never left
    /// unbounded; hitting the timeout surfaces as a generation error and is
    /// handled by the fallback path.
    pub timeout_secs: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            model: "claude-3-5-sonnet-20241022".to_string(),
            max_tokens: 2048,
            temperature: 0.3,
            timeout_secs: 30,
        }
    }
}

/// A pluggable narrative generator.
///
/// Exactly one implementation is active per deployment, selected by
/// configuration. Implementations must be `Send + Sync`; a shared instance
/// is safe across concurrent analyses because each call carries its own
/// prompt and receives its own response.
pub trait GenerationBackend: Send + Sync {
    /// Turn a prompt into raw text.
    ///
    /// Fails with [`crate::AdlensError::Generation`] on network, auth, or
    /// timeout problems. Callers must treat the returned text as untrusted
    /// input requiring schema validation.
    fn generate(&self, prompt: &str) -> Result<String>;

    /// Get the configuration for this backend.
    fn config(&self) -> &GenerationConfig;

    /// Get the name of this backend (for logging).
    fn name(&self) -> &str;
}
