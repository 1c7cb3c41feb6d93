//! Mock backend for tests and offline runs.

use super::backend::{GenerationBackend, GenerationConfig};
use crate::error::{AdlensError, Result};

/// What the mock returns for every call.
enum Script {
    /// A minimal, schema-valid narrative.
    Canned,
    /// A fixed response body.
    Text(String),
    /// Fail every call with a generation error.
    Fail(String),
}

/// Mock backend that returns predictable responses.
pub struct MockBackend {
    config: GenerationConfig,
    script: Script,
}

impl MockBackend {
    /// A backend returning a minimal valid narrative on every call.
    pub fn new() -> Self {
        Self {
            config: GenerationConfig {
                model: "mock".to_string(),
                ..GenerationConfig::default()
            },
            script: Script::Canned,
        }
    }

    /// A backend returning the given text on every call.
    pub fn with_response(text: impl Into<String>) -> Self {
        Self {
            script: Script::Text(text.into()),
            ..Self::new()
        }
    }

    /// A backend failing every call with the given message.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            script: Script::Fail(message.into()),
            ..Self::new()
        }
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl GenerationBackend for MockBackend {
    fn generate(&self, _prompt: &str) -> Result<String> {
        match &self.script {
            Script::Canned => Ok(r#"{
                "executive_summary": "Campaign performance is within expected parameters. No structural problems were identified in this run.",
                "key_issues": [],
                "recommendations": [],
                "risk_alerts": []
            }"#
            .to_string()),
            Script::Text(text) => Ok(text.clone()),
            Script::Fail(message) => Err(AdlensError::Generation(message.clone())),
        }
    }

    fn config(&self) -> &GenerationConfig {
        &self.config
    }

    fn name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canned_is_valid_json() {
        let backend = MockBackend::new();
        let raw = backend.generate("ignored").unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert!(value["executive_summary"].is_string());
    }

    #[test]
    fn test_failing_backend() {
        let backend = MockBackend::failing("connection refused");
        assert!(matches!(
            backend.generate("ignored"),
            Err(AdlensError::Generation(_))
        ));
    }
}
