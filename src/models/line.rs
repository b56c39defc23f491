//! Line model and segmentation of document text.

use serde::{Deserialize, Serialize};

/// A single line of the document.
///
/// Lines are a derived view over the document text: they are recomputed on
/// every change and never stored on their own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Line {
    /// Position of the line in the document (0-based)
    pub index: usize,

    /// Original text, untrimmed, used for display and export
    pub raw: String,

    /// Text with surrounding whitespace removed, used for classification and queries
    pub trimmed: String,

    /// Whether the line can be clicked (trimmed text is non-empty)
    pub actionable: bool,
}

impl Line {
    /// Create a line from its index and raw text
    pub fn new(index: usize, raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let trimmed = trim_text(&raw).to_string();
        let actionable = !trimmed.is_empty();
        Self {
            index,
            raw,
            trimmed,
            actionable,
        }
    }

    /// Whether the line is blank (the inverse of [`Line::actionable`])
    pub fn is_inert(&self) -> bool {
        !self.actionable
    }
}

/// Strip surrounding whitespace, including the byte order mark (U+FEFF).
pub fn trim_text(text: &str) -> &str {
    text.trim_matches(|c: char| c.is_whitespace() || c == '\u{feff}')
}

/// Split document text into ordered lines.
///
/// Splits on `'\n'` only, so a trailing `'\r'` stays part of the raw text and
/// is removed by trimming. The result always has `count('\n') + 1` entries.
pub fn segment(text: &str) -> Vec<Line> {
    text.split('\n')
        .enumerate()
        .map(|(index, raw)| Line::new(index, raw))
        .collect()
}

/// Re-join raw line texts with `'\n'`, the inverse of [`segment`].
pub fn join_lines(lines: &[Line]) -> String {
    lines
        .iter()
        .map(|line| line.raw.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}
