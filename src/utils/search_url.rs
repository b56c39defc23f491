//! Search URL construction.

use serde::{Deserialize, Serialize};

/// Default search endpoint; the query is appended as `?q=<encoded>`.
pub const DEFAULT_SEARCH_BASE: &str = "https://www.google.com/search";

/// A search engine query endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchEngine {
    base_url: String,
}

impl SearchEngine {
    /// Create a search engine from its query endpoint (without the `?q=` part)
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    /// The query endpoint
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build the search URL for a query.
    ///
    /// The query is percent-encoded the way `encodeURIComponent` does it for
    /// whitespace and reserved characters (space becomes `%20`).
    pub fn search_url(&self, query: &str) -> String {
        format!("{}?q={}", self.base_url, urlencoding::encode(query))
    }

    /// Check that the endpoint parses as an absolute http(s) URL
    pub fn validate(&self) -> Result<(), String> {
        let parsed = url::Url::parse(&self.base_url)
            .map_err(|e| format!("invalid search URL '{}': {}", self.base_url, e))?;
        match parsed.scheme() {
            "http" | "https" => Ok(()),
            other => Err(format!("unsupported search URL scheme: {}", other)),
        }
    }
}

impl Default for SearchEngine {
    fn default() -> Self {
        Self::new(DEFAULT_SEARCH_BASE)
    }
}
