//! Core data models for documents, lines and enhancement results.

mod enhancement;
mod line;

pub use enhancement::EnhancementResult;
pub use line::{join_lines, segment, trim_text, Line};
