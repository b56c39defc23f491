//! The document text and its persistence contract.

use std::sync::Arc;

use crate::editor::store::KeyValueStore;
use crate::models::{join_lines, segment, Line};

/// Storage key holding the full document text
pub const DOCUMENT_KEY: &str = "interactive-hyperlink-document-content";

/// Content shown when nothing has been saved yet
pub const DEFAULT_CONTENT: &str = "Start typing here.

Every line you write will become a clickable Google search link.
To search for a single word, just put it on its own line.";

/// Errors from line-level edits
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditorError {
    /// The line index does not exist in the document
    #[error("Line {index} does not exist (document has {len} lines)")]
    LineOutOfRange { index: usize, len: usize },
}

/// Editable document text backed by a key-value store.
///
/// Every mutation is saved immediately. Read and write failures are logged
/// and never returned: a failing store leaves the editor working in memory.
#[derive(Debug, Clone)]
pub struct EditorState {
    text: String,
    store: Arc<dyn KeyValueStore>,
    key: String,
}

impl EditorState {
    /// Load the last saved text, or [`DEFAULT_CONTENT`] if there is none or
    /// the store cannot be read.
    pub fn load(store: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        let key = key.into();
        let text = match store.get(&key) {
            Ok(Some(saved)) => saved,
            Ok(None) => DEFAULT_CONTENT.to_string(),
            Err(e) => {
                tracing::error!("Could not read saved document: {}", e);
                DEFAULT_CONTENT.to_string()
            }
        };
        Self { text, store, key }
    }

    /// Current document text
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Segmented view of the current text
    pub fn lines(&self) -> Vec<Line> {
        segment(&self.text)
    }

    /// Line at `index`, if it exists
    pub fn line(&self, index: usize) -> Option<Line> {
        self.lines().into_iter().nth(index)
    }

    /// Persist the current text. Failures are logged only.
    pub fn save(&self) {
        if let Err(e) = self.store.set(&self.key, &self.text) {
            tracing::error!("Could not save document: {}", e);
        }
    }

    /// Replace the whole document and save it
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.save();
    }

    /// Append a line at the end of the document.
    ///
    /// An empty document becomes the line itself rather than a blank line
    /// followed by it.
    pub fn append_line(&mut self, line: &str) {
        let text = if self.text.is_empty() {
            line.to_string()
        } else {
            format!("{}\n{}", self.text, line)
        };
        self.set_text(text);
    }

    /// Replace the raw text of one line
    pub fn replace_line(&mut self, index: usize, line: &str) -> Result<(), EditorError> {
        let mut lines = self.lines();
        let len = lines.len();
        let target = lines
            .get_mut(index)
            .ok_or(EditorError::LineOutOfRange { index, len })?;
        *target = Line::new(index, line);
        self.set_text(join_lines(&lines));
        Ok(())
    }

    /// Remove one line
    pub fn remove_line(&mut self, index: usize) -> Result<(), EditorError> {
        let mut lines = self.lines();
        if index >= lines.len() {
            return Err(EditorError::LineOutOfRange {
                index,
                len: lines.len(),
            });
        }
        lines.remove(index);
        self.set_text(join_lines(&lines));
        Ok(())
    }

    /// Restore [`DEFAULT_CONTENT`]
    pub fn reset(&mut self) {
        self.set_text(DEFAULT_CONTENT);
    }
}
