//! Result of enhancing a line into a search.

use serde::{Deserialize, Serialize};

/// A refined search query plus an optional top result.
///
/// Produced per click; never cached or persisted.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnhancementResult {
    /// Query to search for (never empty when the input was non-blank)
    pub professional_query: String,

    /// First grounding citation returned by the completion service
    pub top_result_url: Option<String>,
}

impl EnhancementResult {
    /// Create a result with a query and optional URL
    pub fn new(professional_query: impl Into<String>, top_result_url: Option<String>) -> Self {
        Self {
            professional_query: professional_query.into(),
            top_result_url,
        }
    }

    /// The result used when enhancement is not possible: the input itself, no URL
    pub fn fallback(trimmed: impl Into<String>) -> Self {
        Self::new(trimmed, None)
    }

    /// The result for blank input
    pub fn empty() -> Self {
        Self::default()
    }
}
