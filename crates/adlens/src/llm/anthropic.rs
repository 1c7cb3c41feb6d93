//! Anthropic messages API backend.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::Deserialize;
use serde_json::json;

use super::backend::{GenerationBackend, GenerationConfig};
use crate::error::{AdlensError, Result};

/// Anthropic API endpoint.
const API_URL: &str = "https://api.anthropic.com/v1/messages";

/// Anthropic API version.
const API_VERSION: &str = "2023-06-01";

/// Anthropic Claude backend.
pub struct AnthropicBackend {
    client: Client,
    api_url: String,
    api_key: String,
    config: GenerationConfig,
}

impl AnthropicBackend {
    /// Create a backend with the given API key and default configuration.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_config(api_key, GenerationConfig::default())
    }

    /// Create a backend with custom configuration.
    pub fn with_config(api_key: impl Into<String>, config: GenerationConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AdlensError::Config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_url: API_URL.to_string(),
            api_key: api_key.into(),
            config,
        })
    }

    /// Create from the `ANTHROPIC_API_KEY` environment variable.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("ANTHROPIC_API_KEY").map_err(|_| {
            AdlensError::Config("ANTHROPIC_API_KEY environment variable not set".to_string())
        })?;
        Self::new(api_key)
    }

    /// Override the API endpoint.
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    fn build_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            "x-api-key",
            HeaderValue::from_str(&self.api_key)
                .map_err(|e| AdlensError::Config(format!("Invalid API key: {e}")))?,
        );
        headers.insert("anthropic-version", HeaderValue::from_static(API_VERSION));
        Ok(headers)
    }
}

impl GenerationBackend for AnthropicBackend {
    fn generate(&self, prompt: &str) -> Result<String> {
        let body = json!({
            "model": self.config.model,
            "max_tokens": self.config.max_tokens,
            "temperature": self.config.temperature,
            "messages": [
                {
                    "role": "user",
                    "content": prompt
                }
            ]
        });

        let response = self
            .client
            .post(&self.api_url)
            .headers(self.build_headers()?)
            .json(&body)
            .send()
            .map_err(|e| AdlensError::Generation(format!("API request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().unwrap_or_default();
            return Err(AdlensError::Generation(format!(
                "API error ({status}): {error_text}"
            )));
        }

        let api_response: ApiResponse = response
            .json()
            .map_err(|e| AdlensError::Generation(format!("Failed to parse API response: {e}")))?;

        api_response
            .content
            .into_iter()
            .find_map(|block| (block.content_type == "text").then_some(block.text))
            .ok_or_else(|| AdlensError::Generation("No text in API response".to_string()))
    }

    fn config(&self) -> &GenerationConfig {
        &self.config
    }

    fn name(&self) -> &str {
        "anthropic"
    }
}

/// Anthropic API response structure.
#[derive(Debug, Deserialize)]
struct ApiResponse {
    content: Vec<ContentBlock>,
}

/// Content block in API response.
#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    content_type: String,
    #[serde(default)]
    text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_extraction() {
        let raw = r#"{
            "content": [
                {"type": "thinking", "thinking": "..."},
                {"type": "text", "text": "hello"}
            ]
        }"#;
        let parsed: ApiResponse = serde_json::from_str(raw).unwrap();
        let text = parsed
            .content
            .into_iter()
            .find_map(|b| (b.content_type == "text").then_some(b.text));
        assert_eq!(text.as_deref(), Some("hello"));
    }

    #[test]
    fn test_missing_key_is_config_error() {
        // SAFETY: test-only mutation of this process's environment.
        unsafe { std::env::remove_var("ANTHROPIC_API_KEY") };
        assert!(matches!(
            AnthropicBackend::from_env(),
            Err(AdlensError::Config(_))
        ));
    }
}
