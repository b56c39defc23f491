//! # hyperdoc
//!
//! A line-oriented hyperlink document. Every non-blank line is a search:
//! clicking it asks an AI completion service for a better query and the top
//! result, then opens the search page and that result.
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`models`]: Core data structures (Line, EnhancementResult)
//! - [`editor`]: Document text and its persistence
//! - [`enhance`]: Query enhancement over a pluggable completion backend
//! - [`controller`]: Click handling and the Idle/Busy state machine
//! - [`export`]: Word document generation
//! - [`ui`]: Terminal preview, status output and spinners
//! - [`utils`]: HTTP client and search URL construction
//! - [`config`]: Configuration management

pub mod config;
pub mod controller;
pub mod editor;
pub mod enhance;
pub mod export;
pub mod models;
pub mod ui;
pub mod utils;

// Re-export commonly used types
pub use controller::{InteractionController, InteractionState};
pub use editor::EditorState;
pub use enhance::QueryEnhancer;
pub use models::{segment, EnhancementResult, Line};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
