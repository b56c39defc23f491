//! Mock completion backend for testing purposes.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::enhance::{CompletionBackend, CompletionError, CompletionRequest, CompletionResponse};

/// A mock backend that returns a predefined response or error.
#[derive(Debug, Default)]
pub struct MockBackend {
    response: Mutex<Option<CompletionResponse>>,
    error: Mutex<Option<String>>,
    last_request: Mutex<Option<CompletionRequest>>,
    calls: AtomicUsize,
}

impl MockBackend {
    /// Create a mock that answers with an empty completion.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock whose every call fails with a network error.
    pub fn failing(message: &str) -> Self {
        let mock = Self::new();
        mock.set_error(message);
        mock
    }

    /// Set the response to return.
    pub fn set_response(&self, response: CompletionResponse) {
        let mut guard = self.response.lock().unwrap();
        *guard = Some(response);
    }

    /// Make every subsequent call fail.
    pub fn set_error(&self, message: &str) {
        let mut guard = self.error.lock().unwrap();
        *guard = Some(message.to_string());
    }

    /// Number of completed calls.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// The most recent request.
    pub fn last_request(&self) -> Option<CompletionRequest> {
        self.last_request.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionBackend for MockBackend {
    fn id(&self) -> &str {
        "mock"
    }

    async fn complete(
        &self,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse, CompletionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some(request.clone());

        if let Some(message) = self.error.lock().unwrap().clone() {
            return Err(CompletionError::Network(message));
        }
        let guard = self.response.lock().unwrap();
        Ok(guard.clone().unwrap_or_default())
    }
}
