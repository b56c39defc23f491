//! Google Gemini completion backend.
//!
//! Uses the Generative Language REST API with the Google Search tool enabled,
//! which grounds the answer and returns the pages it relied on.
//! API documentation: <https://ai.google.dev/api/generate-content>

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::enhance::{
    Citation, CompletionBackend, CompletionError, CompletionRequest, CompletionResponse,
};
use crate::utils::HttpClient;

/// Default Generative Language API base
pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Gemini backend
#[derive(Debug, Clone)]
pub struct GeminiBackend {
    client: Arc<HttpClient>,
    api_key: Option<String>,
    base_url: String,
}

impl GeminiBackend {
    /// Create a backend against the public API
    pub fn new(api_key: Option<String>) -> Result<Self, CompletionError> {
        Self::with_base_url(api_key, GEMINI_API_BASE)
    }

    /// Create a backend against a custom endpoint (proxies, tests)
    pub fn with_base_url(
        api_key: Option<String>,
        base_url: impl Into<String>,
    ) -> Result<Self, CompletionError> {
        let api_key = api_key.filter(|key| !key.trim().is_empty());
        if api_key.is_none() {
            tracing::warn!("GEMINI_API_KEY not set - enhancement will fall back to plain searches");
        }
        Ok(Self {
            client: Arc::new(HttpClient::new()?),
            api_key,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Whether an API key is configured
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.base_url, model)
    }

    fn build_body(request: &CompletionRequest) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: Some(request.prompt.clone()),
                }],
            }],
            tools: if request.web_grounding {
                vec![Tool {
                    google_search: GoogleSearch {},
                }]
            } else {
                Vec::new()
            },
        }
    }

    fn parse_response(response: GenerateContentResponse) -> Result<CompletionResponse, CompletionError> {
        let candidate = response
            .candidates
            .into_iter()
            .next()
            .ok_or(CompletionError::EmptyResponse)?;

        let text: String = candidate
            .content
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|part| part.text)
                    .collect()
            })
            .unwrap_or_default();

        let citations = candidate
            .grounding_metadata
            .map(|metadata| {
                metadata
                    .grounding_chunks
                    .into_iter()
                    .map(|chunk| {
                        let web = chunk.web.unwrap_or_default();
                        Citation {
                            url: web.uri.unwrap_or_default(),
                            title: web.title,
                        }
                    })
                    .collect()
            })
            .unwrap_or_default();

        Ok(CompletionResponse { text, citations })
    }
}

#[async_trait]
impl CompletionBackend for GeminiBackend {
    fn id(&self) -> &str {
        "gemini"
    }

    async fn complete(
        &self,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse, CompletionError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(CompletionError::MissingApiKey)?;

        let url = self.endpoint(&request.model);
        tracing::debug!("POST {}", url);

        let response = self
            .client
            .client()
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&Self::build_body(request))
            .send()
            .await
            .map_err(|e| CompletionError::Network(format!("Failed to reach Gemini API: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(CompletionError::Api { status, message });
        }

        let body: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| CompletionError::Parse(format!("Failed to parse Gemini response: {}", e)))?;

        Self::parse_response(body)
    }
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Tool>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
struct Tool {
    google_search: GoogleSearch,
}

#[derive(Debug, Serialize)]
struct GoogleSearch {}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroundingMetadata {
    #[serde(default)]
    grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Debug, Deserialize)]
struct GroundingChunk {
    web: Option<WebChunk>,
}

#[derive(Debug, Default, Deserialize)]
struct WebChunk {
    uri: Option<String>,
    title: Option<String>,
}
