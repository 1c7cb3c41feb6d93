//! Google Gemini generateContent backend.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::Deserialize;
use serde_json::json;

use super::backend::{GenerationBackend, GenerationConfig};
use crate::error::{AdlensError, Result};

/// Google Generative Language API base.
const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Google Gemini backend.
pub struct GeminiBackend {
    client: Client,
    api_base: String,
    api_key: String,
    config: GenerationConfig,
}

impl GeminiBackend {
    /// Create a backend with the given API key and the default Gemini model.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let config = GenerationConfig {
            model: "gemini-2.0-flash".to_string(),
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
            api_base: API_BASE.to_string(),
            api_key: api_key.into(),
            config,
        })
    }

    /// Create from the `GOOGLE_API_KEY` environment variable.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("GOOGLE_API_KEY").map_err(|_| {
            AdlensError::Config("GOOGLE_API_KEY environment variable not set".to_string())
        })?;
        Self::new(api_key)
    }

    /// Override the API base URL.
    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into();
        self
    }

    fn build_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers
    }
}

impl GenerationBackend for GeminiBackend {
    fn generate(&self, prompt: &str) -> Result<String> {
        let url = format!(
            "{}/{}:generateContent?key={}",
            self.api_base, self.config.model, self.api_key
        );

        let body = json!({
            "contents": [
                {
                    "parts": [
                        {"text": prompt}
                    ]
                }
            ],
            "generationConfig": {
                "temperature": self.config.temperature,
                "maxOutputTokens": self.config.max_tokens
            }
        });

        let response = self
            .client
            .post(&url)
            .headers(self.build_headers())
            .json(&body)
            .send()
            .map_err(|e| AdlensError::Generation(format!("API request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().unwrap_or_default();
            return Err(AdlensError::Generation(format!(
                "Gemini API error ({status}): {error_text}"
            )));
        }

        let api_response: GeminiResponse = response
            .json()
            .map_err(|e| AdlensError::Generation(format!("Failed to parse API response: {e}")))?;

        let text: String = api_response
            .candidates
            .into_iter()
            .next()
            .map(|c| {
                c.content
                    .parts
                    .into_iter()
                    .map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.is_empty() {
            return Err(AdlensError::Generation(
                "No text in Gemini response".to_string(),
            ));
        }
        Ok(text)
    }

    fn config(&self) -> &GenerationConfig {
        &self.config
    }

    fn name(&self) -> &str {
        "gemini"
    }
}

/// Gemini API response structure.
#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Content,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}
