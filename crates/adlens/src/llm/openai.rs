//! OpenAI chat completions backend.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::Deserialize;
use serde_json::json;

use super::backend::{GenerationBackend, GenerationConfig};
use crate::error::{AdlensError, Result};

/// OpenAI API endpoint.
const API_URL: &str = "https://api.openai.com/v1/chat/completions";

/// OpenAI GPT backend.
pub struct OpenAiBackend {
    client: Client,
    api_url: String,
    api_key: String,
    config: GenerationConfig,
}

impl OpenAiBackend {
    /// Create a backend with the given API key and the default GPT model.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let config = GenerationConfig {
            model: "gpt-4o-mini".to_string(),
            ..GenerationConfig::default()
        };
        Self::with_config(api_key, config)
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

    /// Create from the `OPENAI_API_KEY` environment variable.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY").map_err(|_| {
            AdlensError::Config("OPENAI_API_KEY environment variable not set".to_string())
        })?;
        Self::new(api_key)
    }

    /// Override the API endpoint (for OpenAI-compatible servers).
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    fn build_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.api_key))
                .map_err(|e| AdlensError::Config(format!("Invalid API key: {e}")))?,
        );
        Ok(headers)
    }
}

impl GenerationBackend for OpenAiBackend {
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
                "OpenAI API error ({status}): {error_text}"
            )));
        }

        let api_response: OpenAiResponse = response
            .json()
            .map_err(|e| AdlensError::Generation(format!("Failed to parse API response: {e}")))?;

        api_response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| AdlensError::Generation("No response from OpenAI".to_string()))
    }

    fn config(&self) -> &GenerationConfig {
        &self.config
    }

    fn name(&self) -> &str {
        "openai"
    }
}

/// OpenAI API response structure.
#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Debug, Deserialize)]
struct Message {
    content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_extraction() {
        let raw = r#"{"choices": [{"message": {"role": "assistant", "content": "hi"}}]}"#;
        let parsed: OpenAiResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.choices[0].message.content, "hi");
    }
}
