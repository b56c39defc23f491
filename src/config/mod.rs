//! Configuration management.

mod file_config;

pub use file_config::{load_file, save_file, starter_config, ConfigFileError};

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::editor::{FileStore, DOCUMENT_KEY};
use crate::enhance::{DEFAULT_MODEL, GEMINI_API_BASE};
use crate::export::DEFAULT_FILE_NAME;
use crate::utils::DEFAULT_SEARCH_BASE;

/// Environment variable prefix for overrides (`HYPERDOC_SECTION__FIELD`)
pub const ENV_PREFIX: &str = "HYPERDOC";

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// AI completion settings
    pub enhancement: EnhancementConfig,

    /// Search engine settings
    pub search: SearchConfig,

    /// Document storage settings
    pub storage: StorageConfig,

    /// Word export settings
    pub export: ExportConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

/// AI completion settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnhancementConfig {
    /// API key for the completion service
    #[serde(default = "default_api_key", skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Model identifier
    #[serde(default = "default_model")]
    pub model: String,

    /// API base URL
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
}

impl Default for EnhancementConfig {
    fn default() -> Self {
        Self {
            api_key: default_api_key(),
            model: default_model(),
            endpoint: default_endpoint(),
        }
    }
}

fn default_api_key() -> Option<String> {
    std::env::var("GEMINI_API_KEY")
        .or_else(|_| std::env::var("API_KEY"))
        .ok()
        .filter(|key| !key.trim().is_empty())
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_endpoint() -> String {
    GEMINI_API_BASE.to_string()
}

/// Search engine settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Query endpoint; `?q=<query>` is appended
    #[serde(default = "default_search_base")]
    pub base_url: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            base_url: default_search_base(),
        }
    }
}

fn default_search_base() -> String {
    DEFAULT_SEARCH_BASE.to_string()
}

/// Document storage settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Store file (default: `<data dir>/hyperdoc/storage.json`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,

    /// Key the document is stored under
    #[serde(default = "default_storage_key")]
    pub key: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: None,
            key: default_storage_key(),
        }
    }
}

impl StorageConfig {
    /// Configured store path, or the platform default
    pub fn resolved_path(&self) -> PathBuf {
        self.path.clone().unwrap_or_else(FileStore::default_path)
    }
}

fn default_storage_key() -> String {
    DOCUMENT_KEY.to_string()
}

/// Word export settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Output file name
    #[serde(default = "default_file_name")]
    pub file_name: String,

    /// Output directory
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            file_name: default_file_name(),
            output_dir: default_output_dir(),
        }
    }
}

fn default_file_name() -> String {
    DEFAULT_FILE_NAME.to_string()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default level when `RUST_LOG` is not set
    #[serde(default = "default_log_level")]
    pub level: String,

    /// `text` or `json`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: None,
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

/// Load configuration from a file, with environment overrides
pub fn load_config(path: &Path) -> Result<Config, config::ConfigError> {
    let settings = config::Config::builder()
        .add_source(config::File::from(path))
        .add_source(env_source())
        .build()?;

    settings.try_deserialize()
}

/// Configuration from defaults and environment overrides only
pub fn get_config() -> Result<Config, config::ConfigError> {
    config::Config::builder()
        .add_source(env_source())
        .build()?
        .try_deserialize()
}

fn env_source() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
}

/// Find a configuration file in the default locations
///
/// Checks `./hyperdoc.toml`, then `<config dir>/hyperdoc/config.toml`.
pub fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from("hyperdoc.toml");
    if local.is_file() {
        return Some(local);
    }
    let user = default_config_path()?;
    user.is_file().then_some(user)
}

/// Per-user configuration file location
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("hyperdoc").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.enhancement.model, "gemini-2.5-flash");
        assert_eq!(config.search.base_url, "https://www.google.com/search");
        assert_eq!(config.storage.key, "interactive-hyperlink-document-content");
        assert_eq!(config.export.file_name, "interactive-document.docx");
    }

    #[test]
    fn test_load_config_partial_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("hyperdoc.toml");
        std::fs::write(
            &path,
            r#"
[search]
base_url = "https://duckduckgo.com/"

[export]
output_dir = "/tmp/exports"
"#,
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.search.base_url, "https://duckduckgo.com/");
        assert_eq!(config.export.output_dir, PathBuf::from("/tmp/exports"));
        assert_eq!(config.export.file_name, "interactive-document.docx");
        assert_eq!(config.enhancement.model, "gemini-2.5-flash");
    }

    #[test]
    fn test_resolved_storage_path() {
        let mut storage = StorageConfig::default();
        assert!(storage.resolved_path().ends_with("storage.json"));
        storage.path = Some(PathBuf::from("/tmp/doc.json"));
        assert_eq!(storage.resolved_path(), PathBuf::from("/tmp/doc.json"));
    }
}
