//! # Gemini Text Generator
//!
//! [`TextGenerator`] implementation backed by Google's Gemini `generateContent` API.
//!
//! ## Overview
//!
//! - The prompt is sent as the only text part of a single content entry.
//! - The reply text is read from `candidates[0].content.parts[0].text`.
//! - A response without that text, a non-success status, or a transport failure is
//!   reported as [`MarkerError::Backend`].
//!
//! ## Environment
//!
//! - `GEMINI_API_KEY` authenticates requests (passed as the `key` query parameter).
//! - `GEMINI_API_URL` overrides the model endpoint.

use crate::error::MarkerError;
use crate::traits::generator::TextGenerator;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;
use util::config;

/// Request body for the Gemini API.
#[derive(Serialize)]
struct GeminiRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

/// Optional configuration for the LLM generation process.
#[derive(Serialize)]
struct GenerationConfig {
    thinking_config: ThinkingConfig,
}

#[derive(Serialize)]
struct ThinkingConfig {
    /// Set to 0 to disable thinking for faster requests.
    thinking_budget: u32,
}

/// Response from the Gemini API.
#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<ContentResponse>,
}

#[derive(Deserialize)]
struct ContentResponse {
    #[serde(default)]
    parts: Vec<PartResponse>,
}

#[derive(Deserialize)]
struct PartResponse {
    text: Option<String>,
}

/// Calls Gemini over HTTPS with a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct GeminiGenerator {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    thinking_budget: Option<u32>,
}

impl GeminiGenerator {
    pub fn new(api_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: api_url.into(),
            api_key: api_key.into(),
            thinking_budget: None,
        }
    }

    /// Builds a generator from `GEMINI_API_URL` / `GEMINI_API_KEY`.
    ///
    /// # Errors
    ///
    /// Returns [`MarkerError::Backend`] when no API key is configured.
    pub fn from_config() -> Result<Self, MarkerError> {
        let api_key = config::gemini_api_key();
        if api_key.trim().is_empty() {
            return Err(MarkerError::Backend("GEMINI_API_KEY is not set".to_string()));
        }
        Ok(Self::new(config::gemini_api_url(), api_key))
    }

    /// Caps the model's thinking budget (`0` disables thinking).
    pub fn with_thinking_budget(mut self, budget: u32) -> Self {
        self.thinking_budget = Some(budget);
        self
    }

    fn request_body(&self, prompt: &str) -> GeminiRequest {
        GeminiRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: self.thinking_budget.map(|thinking_budget| GenerationConfig {
                thinking_config: ThinkingConfig { thinking_budget },
            }),
        }
    }
}

/// Pulls the first candidate's first text part out of a raw response body.
fn extract_text(body: &str) -> Result<String, MarkerError> {
    let response = serde_json::from_str::<GeminiResponse>(body).map_err(|e| {
        MarkerError::Backend(format!(
            "error decoding response body: {e}. Full response: {body}"
        ))
    })?;

    response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .and_then(|c| c.parts.into_iter().next())
        .and_then(|p| p.text)
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| MarkerError::Backend("response contained no candidate text".to_string()))
}

#[async_trait]
impl TextGenerator for GeminiGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, MarkerError> {
        debug!(prompt_chars = prompt.chars().count(), "Sending prompt to Gemini");

        let response = self
            .client
            .post(&self.api_url)
            .query(&[("key", self.api_key.as_str())])
            .json(&self.request_body(prompt))
            .send()
            .await
            .map_err(|e| MarkerError::Backend(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| MarkerError::Backend(e.to_string()))?;
        if !status.is_success() {
            return Err(MarkerError::Backend(format!(
                "Gemini returned {status}: {body}"
            )));
        }

        extract_text(&body)
    }
}
