//! Utility modules shared by the editor, enhancer and exporter.
//!
//! - [`HttpClient`]: HTTP client with shared connection pool
//! - [`SearchEngine`]: Builds `?q=` search URLs from line text
//!
//! # Search URLs
//!
//! ```rust
//! use hyperdoc::utils::SearchEngine;
//!
//! let engine = SearchEngine::default();
//! assert_eq!(
//!     engine.search_url("cat dog"),
//!     "https://www.google.com/search?q=cat%20dog"
//! );
//! ```

mod http;
mod search_url;

pub use http::HttpClient;
pub use search_url::{SearchEngine, DEFAULT_SEARCH_BASE};
