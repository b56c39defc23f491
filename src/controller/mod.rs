//! Line click handling.
//!
//! The controller is a two-state machine:
//!
//! ```text
//!   Idle --click(i, actionable)--> Busy(i)
//!   Busy(i) --enhancement settles--> Idle
//! ```
//!
//! Clicks while `Busy` are dropped, not queued. The way back to `Idle` is a
//! [`BusyGuard`] dropped when the click settles, so it also runs when opening
//! a tab fails or the in-flight future is dropped.
//!
//! On settlement the search tab for the professional query opens first, then
//! the top result (if any).

mod opener;

pub use opener::{check_url, BrowserOpener, OpenError, PrintOpener, RecordingOpener, TabOpener};

use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

use crate::enhance::QueryEnhancer;
use crate::models::Line;
use crate::utils::SearchEngine;

/// Whether an enhancement is in flight, and for which line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum InteractionState {
    /// No line is busy
    #[default]
    Idle,
    /// An enhancement for the line at this index is in flight
    Busy(usize),
}

impl InteractionState {
    /// Whether any line is busy
    pub fn is_busy(&self) -> bool {
        matches!(self, InteractionState::Busy(_))
    }

    /// Index of the busy line
    pub fn busy_index(&self) -> Option<usize> {
        match self {
            InteractionState::Busy(index) => Some(*index),
            InteractionState::Idle => None,
        }
    }
}

/// Why a click did not start an enhancement
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ClickRejected {
    /// Another click is in flight
    #[error("Line {0} is still being processed")]
    Busy(usize),

    /// The line is blank
    #[error("Blank lines are not searchable")]
    Inert,
}

/// Result of a click
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClickOutcome {
    /// Tabs were requested for the search and, optionally, the top result
    Opened {
        search_url: String,
        top_result_url: Option<String>,
    },
    /// Ignored because the given line was busy
    IgnoredBusy(usize),
    /// Ignored because the line is blank
    IgnoredInert,
}

impl From<ClickRejected> for ClickOutcome {
    fn from(rejected: ClickRejected) -> Self {
        match rejected {
            ClickRejected::Busy(index) => ClickOutcome::IgnoredBusy(index),
            ClickRejected::Inert => ClickOutcome::IgnoredInert,
        }
    }
}

/// Holds the controller in `Busy` until dropped.
#[derive(Debug)]
pub struct BusyGuard {
    state: Arc<Mutex<InteractionState>>,
    index: usize,
}

impl BusyGuard {
    /// Index of the line this guard keeps busy
    pub fn index(&self) -> usize {
        self.index
    }
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        *state = InteractionState::Idle;
    }
}

/// Enhances clicked lines and opens the resulting tabs.
///
/// Cheap to clone; clones share the same busy state.
#[derive(Debug, Clone)]
pub struct InteractionController {
    state: Arc<Mutex<InteractionState>>,
    enhancer: QueryEnhancer,
    opener: Arc<dyn TabOpener>,
    engine: SearchEngine,
}

impl InteractionController {
    /// Create an idle controller
    pub fn new(enhancer: QueryEnhancer, opener: Arc<dyn TabOpener>, engine: SearchEngine) -> Self {
        Self {
            state: Arc::new(Mutex::new(InteractionState::Idle)),
            enhancer,
            opener,
            engine,
        }
    }

    /// Current state
    pub fn state(&self) -> InteractionState {
        *self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Whether clicking `line` would currently be ignored
    pub fn is_line_disabled(&self, line: &Line) -> bool {
        !line.actionable || self.state().is_busy()
    }

    /// Move to `Busy(line.index)` if the line is actionable and nothing is in
    /// flight. The check and the transition happen under one lock.
    pub fn try_begin(&self, line: &Line) -> Result<BusyGuard, ClickRejected> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if let InteractionState::Busy(index) = *state {
            return Err(ClickRejected::Busy(index));
        }
        if !line.actionable {
            return Err(ClickRejected::Inert);
        }
        *state = InteractionState::Busy(line.index);
        Ok(BusyGuard {
            state: Arc::clone(&self.state),
            index: line.index,
        })
    }

    /// Enhance the line and open its tabs, then release `guard`.
    pub async fn settle(&self, guard: BusyGuard, line: &Line) -> ClickOutcome {
        let result = self.enhancer.enhance(&line.trimmed).await;
        let search_url = self.engine.search_url(&result.professional_query);

        if let Err(e) = self.opener.open_tab(&search_url) {
            tracing::error!("Failed to open search tab: {}", e);
        }
        if let Some(ref top) = result.top_result_url {
            if let Err(e) = self.opener.open_tab(top) {
                tracing::error!("Failed to open top result tab: {}", e);
            }
        }

        drop(guard);
        ClickOutcome::Opened {
            search_url,
            top_result_url: result.top_result_url,
        }
    }

    /// Handle a click on `line`: [`try_begin`](Self::try_begin) followed by
    /// [`settle`](Self::settle).
    pub async fn click(&self, line: &Line) -> ClickOutcome {
        match self.try_begin(line) {
            Ok(guard) => self.settle(guard, line).await,
            Err(rejected) => {
                tracing::debug!(line = line.index, "Click ignored: {}", rejected);
                rejected.into()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enhance::{
        CompletionBackend, CompletionError, CompletionRequest, CompletionResponse, MockBackend,
    };
    use crate::models::segment;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Semaphore;

    /// Backend that blocks each call until a permit is released
    #[derive(Debug)]
    struct GatedBackend {
        gate: Semaphore,
        calls: AtomicUsize,
        response: CompletionResponse,
    }

    impl GatedBackend {
        fn new(response: CompletionResponse) -> Self {
            Self {
                gate: Semaphore::new(0),
                calls: AtomicUsize::new(0),
                response,
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl CompletionBackend for GatedBackend {
        fn id(&self) -> &str {
            "gated"
        }

        async fn complete(
            &self,
            _request: &CompletionRequest,
        ) -> Result<CompletionResponse, CompletionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let _permit = self
                .gate
                .acquire()
                .await
                .map_err(|e| CompletionError::Other(e.to_string()))?;
            Ok(self.response.clone())
        }
    }

    fn controller(
        backend: Arc<dyn CompletionBackend>,
    ) -> (InteractionController, Arc<RecordingOpener>) {
        let opener = Arc::new(RecordingOpener::new());
        let controller = InteractionController::new(
            QueryEnhancer::new(backend),
            opener.clone(),
            SearchEngine::default(),
        );
        (controller, opener)
    }

    #[tokio::test]
    async fn test_opens_search_before_top_result() {
        let mock = Arc::new(MockBackend::new());
        mock.set_response(CompletionResponse::new(
            "professional cats",
            &["https://cats.example/top"],
        ));
        let (controller, opener) = controller(mock);
        let lines = segment("cats");

        let outcome = controller.click(&lines[0]).await;

        assert_eq!(
            opener.opened(),
            vec![
                "https://www.google.com/search?q=professional%20cats".to_string(),
                "https://cats.example/top".to_string(),
            ]
        );
        assert_eq!(
            outcome,
            ClickOutcome::Opened {
                search_url: "https://www.google.com/search?q=professional%20cats".to_string(),
                top_result_url: Some("https://cats.example/top".to_string()),
            }
        );
        assert_eq!(controller.state(), InteractionState::Idle);
    }

    #[tokio::test]
    async fn test_failure_opens_single_fallback_tab() {
        let (controller, opener) = controller(Arc::new(MockBackend::failing("offline")));
        let lines = segment("  foo bar  ");

        controller.click(&lines[0]).await;

        assert_eq!(
            opener.opened(),
            vec!["https://www.google.com/search?q=foo%20bar".to_string()]
        );
        assert_eq!(controller.state(), InteractionState::Idle);
    }

    #[tokio::test]
    async fn test_inert_click_is_ignored() {
        let mock = Arc::new(MockBackend::new());
        let (controller, opener) = controller(mock.clone());
        let lines = segment("a\n   \nb");

        assert_eq!(controller.click(&lines[1]).await, ClickOutcome::IgnoredInert);
        assert_eq!(mock.call_count(), 0);
        assert!(opener.opened().is_empty());
        assert!(controller.is_line_disabled(&lines[1]));
        assert!(!controller.is_line_disabled(&lines[0]));
    }

    #[tokio::test]
    async fn test_clicks_while_busy_are_dropped() {
        let backend = Arc::new(GatedBackend::new(CompletionResponse::new("first", &[])));
        let (controller, opener) = controller(backend.clone());
        let lines = segment("first\n\nsecond");

        let in_flight = {
            let controller = controller.clone();
            let line = lines[0].clone();
            tokio::spawn(async move { controller.click(&line).await })
        };
        while backend.calls() == 0 {
            tokio::task::yield_now().await;
        }

        assert_eq!(controller.state(), InteractionState::Busy(0));
        assert!(controller.is_line_disabled(&lines[2]));
        assert_eq!(controller.click(&lines[0]).await, ClickOutcome::IgnoredBusy(0));
        assert_eq!(controller.click(&lines[2]).await, ClickOutcome::IgnoredBusy(0));
        assert_eq!(controller.click(&lines[1]).await, ClickOutcome::IgnoredBusy(0));
        assert_eq!(backend.calls(), 1);
        assert_eq!(controller.state(), InteractionState::Busy(0));

        backend.gate.add_permits(1);
        in_flight.await.unwrap();

        assert_eq!(controller.state(), InteractionState::Idle);
        assert_eq!(opener.opened().len(), 1);

        // Accepts a new click once idle
        backend.gate.add_permits(1);
        let outcome = controller.click(&lines[2]).await;
        assert!(matches!(outcome, ClickOutcome::Opened { .. }));
        assert_eq!(backend.calls(), 2);
    }

    #[tokio::test]
    async fn test_tab_failure_still_returns_to_idle() {
        let mock = Arc::new(MockBackend::new());
        mock.set_response(CompletionResponse::new("q", &["https://top.example"]));
        let (controller, opener) = controller(mock);
        opener.fail_on("https://www.google.com/search?q=q");

        controller.click(&segment("q")[0]).await;

        assert_eq!(opener.opened().len(), 2);
        assert_eq!(controller.state(), InteractionState::Idle);
    }

    #[tokio::test]
    async fn test_dropped_future_releases_busy_state() {
        let backend = Arc::new(GatedBackend::new(CompletionResponse::default()));
        let (controller, opener) = controller(backend.clone());
        let line = segment("never finishes")[0].clone();

        let task = {
            let controller = controller.clone();
            tokio::spawn(async move { controller.click(&line).await })
        };
        while backend.calls() == 0 {
            tokio::task::yield_now().await;
        }
        assert!(controller.state().is_busy());

        task.abort();
        let _ = task.await;

        assert_eq!(controller.state(), InteractionState::Idle);
        assert!(opener.opened().is_empty());
    }

    #[test]
    fn test_try_begin_transitions() {
        let (controller, _) = controller(Arc::new(MockBackend::new()));
        let lines = segment("a\nb");

        let guard = controller.try_begin(&lines[1]).unwrap();
        assert_eq!(guard.index(), 1);
        assert_eq!(controller.state().busy_index(), Some(1));
        assert_eq!(
            controller.try_begin(&lines[0]).unwrap_err(),
            ClickRejected::Busy(1)
        );

        drop(guard);
        assert_eq!(controller.state(), InteractionState::Idle);
        assert!(controller.try_begin(&lines[0]).is_ok());
    }
}
