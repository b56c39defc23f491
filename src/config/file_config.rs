//! Configuration file support.
//!
//! # Configuration File Format
//!
//! ```toml
//! [enhancement]
//! api_key = "your-gemini-key"
//! model = "gemini-2.5-flash"
//! endpoint = "https://generativelanguage.googleapis.com/v1beta"
//!
//! [search]
//! base_url = "https://www.google.com/search"
//!
//! [storage]
//! path = "~/.local/share/hyperdoc/storage.json"
//! key = "interactive-hyperlink-document-content"
//!
//! [export]
//! file_name = "interactive-document.docx"
//! output_dir = "."
//!
//! [logging]
//! level = "warn"
//! format = "text"
//! ```

use std::fs;
use std::path::Path;

use super::Config;

/// Configuration file errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigFileError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Serialize error: {0}")]
    Serialize(String),
}

/// Load configuration from a TOML file (no environment overrides)
pub fn load_file(path: &Path) -> Result<Config, ConfigFileError> {
    let content = fs::read_to_string(path).map_err(|e| ConfigFileError::Io(e.to_string()))?;

    toml::from_str(&content).map_err(|e| ConfigFileError::Parse(e.to_string()))
}

/// Save configuration to a TOML file, creating parent directories
pub fn save_file(config: &Config, path: &Path) -> Result<(), ConfigFileError> {
    let content =
        toml::to_string_pretty(config).map_err(|e| ConfigFileError::Serialize(e.to_string()))?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| ConfigFileError::Io(e.to_string()))?;
    }
    fs::write(path, content).map_err(|e| ConfigFileError::Io(e.to_string()))
}

/// Starter configuration written by `hyperdoc config init`.
///
/// The API key is left out so it is never written to disk by accident.
pub fn starter_config() -> Result<String, ConfigFileError> {
    let mut config = Config::default();
    config.enhancement.api_key = None;
    let body =
        toml::to_string_pretty(&config).map_err(|e| ConfigFileError::Serialize(e.to_string()))?;
    Ok(format!(
        "# hyperdoc configuration\n# The API key is read from GEMINI_API_KEY unless set under [enhancement].\n\n{}",
        body
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::tempdir;

    #[test]
    fn test_config_file_save_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.enhancement.model = "gemini-2.0-flash".to_string();
        config.export.output_dir = PathBuf::from("/tmp/out");

        save_file(&config, &path).unwrap();

        let loaded = load_file(&path).unwrap();
        assert_eq!(loaded.enhancement.model, "gemini-2.0-flash");
        assert_eq!(loaded.export.output_dir, PathBuf::from("/tmp/out"));
    }

    #[test]
    fn test_config_file_nonexistent() {
        let result = load_file(Path::new("/nonexistent/config.toml"));
        assert!(matches!(result, Err(ConfigFileError::Io(_))));
    }

    #[test]
    fn test_config_file_invalid_toml() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("invalid.toml");

        std::fs::write(&path, "invalid = toml = content").unwrap();

        assert!(matches!(load_file(&path), Err(ConfigFileError::Parse(_))));
    }

    #[test]
    fn test_starter_config_parses() {
        let text = starter_config().unwrap();
        assert!(!text.contains("api_key"));
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed.search.base_url, "https://www.google.com/search");
    }
}
