//! Query enhancement through an AI completion service.
//!
//! A [`CompletionBackend`] performs one grounded completion round-trip.
//! [`QueryEnhancer`] wraps a backend and turns every outcome into an
//! [`EnhancementResult`]: errors and empty completions fall back to the
//! line's own text, so callers never handle failures.
//!
//! # Implementing a Backend
//!
//! 1. Create a struct that implements `CompletionBackend`
//! 2. Return the completion text and any grounding citations, in rank order
//! 3. Hand it to [`QueryEnhancer::new`]

mod gemini;
pub mod mock;

pub use gemini::{GeminiBackend, GEMINI_API_BASE};
pub use mock::MockBackend;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::models::{trim_text, EnhancementResult};

/// Model used when none is configured
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// A completion request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// Model identifier
    pub model: String,

    /// The full prompt text
    pub prompt: String,

    /// Whether the service should ground the answer in a web search
    pub web_grounding: bool,
}

/// A grounding citation returned with a completion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    /// Cited page
    pub url: String,

    /// Page title, when the service provides one
    pub title: Option<String>,
}

/// A completion response
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CompletionResponse {
    /// Completion text (may be empty)
    pub text: String,

    /// Grounding citations in service order, one per grounding chunk.
    /// Chunks without a web URL keep their place with an empty `url`.
    pub citations: Vec<Citation>,
}

impl CompletionResponse {
    /// Create a response with text and citation URLs
    pub fn new(text: impl Into<String>, urls: &[&str]) -> Self {
        Self {
            text: text.into(),
            citations: urls
                .iter()
                .map(|url| Citation {
                    url: url.to_string(),
                    title: None,
                })
                .collect(),
        }
    }

    /// URL of the first citation, if it has one. Later citations are never
    /// promoted in its place.
    pub fn top_url(&self) -> Option<&str> {
        self.citations
            .first()
            .map(|c| c.url.trim())
            .filter(|url| !url.is_empty())
    }
}

/// Errors that can occur when calling a completion service
#[derive(Debug, thiserror::Error)]
pub enum CompletionError {
    /// No credential configured for the service
    #[error("API key not configured")]
    MissingApiKey,

    /// Network or HTTP error
    #[error("Network error: {0}")]
    Network(String),

    /// Response body could not be decoded
    #[error("Parse error: {0}")]
    Parse(String),

    /// The service answered with an error status
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The service answered without any candidate
    #[error("Empty response")]
    EmptyResponse,

    /// Other error
    #[error("Error: {0}")]
    Other(String),
}

impl From<reqwest::Error> for CompletionError {
    fn from(err: reqwest::Error) -> Self {
        CompletionError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for CompletionError {
    fn from(err: serde_json::Error) -> Self {
        CompletionError::Parse(format!("JSON: {}", err))
    }
}

/// A text-completion service able to ground its answer in web search.
#[async_trait]
pub trait CompletionBackend: Send + Sync + std::fmt::Debug {
    /// Identifier used in logs (e.g. "gemini")
    fn id(&self) -> &str;

    /// Run one completion
    async fn complete(
        &self,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse, CompletionError>;
}

/// Build the prompt asking for a professional search query
pub fn build_prompt(trimmed: &str) -> String {
    format!(
        "Based on Google search results for the text below, create an optimized, professional Google search query that best summarizes the user's intent. Only return the query itself, with no extra text or explanation.\n\n      Text: \"{}\"",
        trimmed
    )
}

/// Turns a line into a professional query and optional top result.
///
/// `enhance` never fails: any backend error, or an empty completion, yields
/// the trimmed input as the query. The top result URL is only reported when
/// the backend call succeeded.
#[derive(Debug, Clone)]
pub struct QueryEnhancer {
    backend: Arc<dyn CompletionBackend>,
    model: String,
}

impl QueryEnhancer {
    /// Create an enhancer using [`DEFAULT_MODEL`]
    pub fn new(backend: Arc<dyn CompletionBackend>) -> Self {
        Self::with_model(backend, DEFAULT_MODEL)
    }

    /// Create an enhancer for a specific model
    pub fn with_model(backend: Arc<dyn CompletionBackend>, model: impl Into<String>) -> Self {
        Self {
            backend,
            model: model.into(),
        }
    }

    /// Model identifier sent with each request
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Enhance a line of text. Blank input returns an empty result without
    /// calling the backend.
    pub async fn enhance(&self, text: &str) -> EnhancementResult {
        let trimmed = trim_text(text);
        if trimmed.is_empty() {
            return EnhancementResult::empty();
        }

        let request = CompletionRequest {
            model: self.model.clone(),
            prompt: build_prompt(trimmed),
            web_grounding: true,
        };

        tracing::debug!(backend = self.backend.id(), query = trimmed, "Requesting enhancement");

        match self.backend.complete(&request).await {
            Ok(response) => {
                let completion = trim_text(&response.text);
                let professional_query = if completion.is_empty() {
                    trimmed.to_string()
                } else {
                    completion.to_string()
                };
                EnhancementResult::new(professional_query, response.top_url().map(String::from))
            }
            Err(e) => {
                tracing::error!("Error generating enhanced search result: {}", e);
                EnhancementResult::fallback(trimmed)
            }
        }
    }
}
