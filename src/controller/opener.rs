//! Opening URLs in new browser tabs.

use std::sync::Mutex;

/// Error opening a URL
#[derive(Debug, thiserror::Error)]
pub enum OpenError {
    /// The URL is not an absolute http(s) URL
    #[error("Refusing to open '{0}': not an http(s) URL")]
    InvalidUrl(String),

    /// The system browser could not be launched
    #[error("Could not open browser: {0}")]
    Launch(#[from] std::io::Error),
}

/// Something that can open a URL in a new browser tab.
pub trait TabOpener: Send + Sync + std::fmt::Debug {
    /// Open `url` in a new tab or window
    fn open_tab(&self, url: &str) -> Result<(), OpenError>;
}

/// Only absolute http(s) URLs are ever handed to the browser.
pub fn check_url(url: &str) -> Result<(), OpenError> {
    match url::Url::parse(url) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => Ok(()),
        _ => Err(OpenError::InvalidUrl(url.to_string())),
    }
}

/// Opens URLs with the operating system's default browser.
///
/// Each URL is a fresh top-level navigation started by the OS, so the page
/// receives neither a referrer nor a handle back to this process.
#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserOpener;

impl TabOpener for BrowserOpener {
    fn open_tab(&self, url: &str) -> Result<(), OpenError> {
        check_url(url)?;
        tracing::debug!("Opening {}", url);
        open::that_detached(url)?;
        Ok(())
    }
}

/// Prints URLs instead of opening them (headless sessions, `--no-browser`)
#[derive(Debug, Default, Clone, Copy)]
pub struct PrintOpener;

impl TabOpener for PrintOpener {
    fn open_tab(&self, url: &str) -> Result<(), OpenError> {
        check_url(url)?;
        println!("{}", url);
        Ok(())
    }
}

/// Records opened URLs in order; used in tests.
#[derive(Debug, Default)]
pub struct RecordingOpener {
    opened: Mutex<Vec<String>>,
    fail_on: Mutex<Option<String>>,
}

impl RecordingOpener {
    /// Create an empty recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail whenever `url` is opened
    pub fn fail_on(&self, url: &str) {
        *self.fail_on.lock().unwrap_or_else(|e| e.into_inner()) = Some(url.to_string());
    }

    /// URLs opened so far, in order
    pub fn opened(&self) -> Vec<String> {
        self.opened.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl TabOpener for RecordingOpener {
    fn open_tab(&self, url: &str) -> Result<(), OpenError> {
        self.opened
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(url.to_string());
        let fail_on = self.fail_on.lock().unwrap_or_else(|e| e.into_inner());
        if fail_on.as_deref() == Some(url) {
            return Err(OpenError::Launch(std::io::Error::other("simulated failure")));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_url() {
        assert!(check_url("https://www.google.com/search?q=x").is_ok());
        assert!(check_url("http://example.com").is_ok());
        assert!(check_url("javascript:alert(1)").is_err());
        assert!(check_url("file:///etc/passwd").is_err());
        assert!(check_url("relative/path").is_err());
    }

    #[test]
    fn test_recording_opener_keeps_order() {
        let opener = RecordingOpener::new();
        opener.open_tab("https://a.example").unwrap();
        opener.open_tab("https://b.example").unwrap();
        assert_eq!(opener.opened(), vec!["https://a.example", "https://b.example"]);
    }

    #[test]
    fn test_recording_opener_failure() {
        let opener = RecordingOpener::new();
        opener.fail_on("https://bad.example");
        assert!(opener.open_tab("https://bad.example").is_err());
        assert_eq!(opener.opened().len(), 1);
    }
}
