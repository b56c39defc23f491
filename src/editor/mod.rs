//! Persisted editor state.
//!
//! The document text lives in [`EditorState`] and is written to a
//! [`KeyValueStore`] after every mutation. Storage failures are logged and
//! swallowed so that editing keeps working in memory.
//!
//! ```rust
//! use hyperdoc::editor::{EditorState, MemoryStore, DOCUMENT_KEY};
//! use std::sync::Arc;
//!
//! let store = Arc::new(MemoryStore::new());
//! let mut editor = EditorState::load(store.clone(), DOCUMENT_KEY);
//! editor.set_text("rust async runtimes");
//!
//! let reloaded = EditorState::load(store, DOCUMENT_KEY);
//! assert_eq!(reloaded.text(), "rust async runtimes");
//! ```

mod state;
mod store;

pub use state::{EditorError, EditorState, DEFAULT_CONTENT, DOCUMENT_KEY};
pub use store::{FileStore, KeyValueStore, MemoryStore, StoreError, UnavailableStore};
