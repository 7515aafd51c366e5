//! Client configuration
//!
//! Loaded from a JSON file. Every field is optional and falls back to the
//! stock endpoint layout:
//!
//! ```json
//! {
//!   "base_url": "http://localhost:8080",
//!   "fetch_path": "/dynamic/fetch",
//!   "download_path": "/dynamic/download",
//!   "default_page_size": 10,
//!   "export_page_size": 1000,
//!   "max_subquery_depth": 8,
//!   "log_level": "WARN",
//!   "catalog": {"Employee": ["id", "name"]}
//! }
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::FieldCatalog;
use crate::filter::DEFAULT_MAX_SUBQUERY_DEPTH;
use crate::observability::{log_event_with_fields, Event, Severity};

/// Result type for configuration loading
pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

impl ConfigError {
    pub fn code(&self) -> &'static str {
        match self {
            ConfigError::Read { .. } => "DYNQ_CONFIG_READ",
            ConfigError::Parse(_) => "DYNQ_CONFIG_PARSE",
            ConfigError::Invalid(_) => "DYNQ_CONFIG_INVALID",
        }
    }
}

/// Query client configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Scheme, host and port of the execution service
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Path of the query execution endpoint (POST)
    #[serde(default = "default_fetch_path")]
    pub fetch_path: String,

    /// Path of the export download endpoint (GET)
    #[serde(default = "default_download_path")]
    pub download_path: String,

    /// Page size for new sessions
    #[serde(default = "default_page_size")]
    pub default_page_size: u32,

    /// Page size sent with export requests unless overridden
    #[serde(default = "default_export_page_size")]
    pub export_page_size: u32,

    /// Deepest allowed subquery nesting
    #[serde(default = "default_max_subquery_depth")]
    pub max_subquery_depth: usize,

    /// Minimum severity written to the log
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Replaces the built-in field catalog when present
    #[serde(default)]
    pub catalog: Option<BTreeMap<String, Vec<String>>>,
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}
fn default_fetch_path() -> String {
    "/dynamic/fetch".to_string()
}
fn default_download_path() -> String {
    "/dynamic/download".to_string()
}
fn default_page_size() -> u32 {
    10
}
fn default_export_page_size() -> u32 {
    1000
}
fn default_max_subquery_depth() -> usize {
    DEFAULT_MAX_SUBQUERY_DEPTH
}
fn default_log_level() -> String {
    "WARN".to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            fetch_path: default_fetch_path(),
            download_path: default_download_path(),
            default_page_size: default_page_size(),
            export_page_size: default_export_page_size(),
            max_subquery_depth: default_max_subquery_depth(),
            log_level: default_log_level(),
            catalog: None,
        }
    }
}

impl ClientConfig {
    /// Load and validate configuration from file
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;

        let config: ClientConfig = serde_json::from_str(&content)?;
        config.validate()?;

        let shown = path.display().to_string();
        log_event_with_fields(
            Event::ConfigLoaded,
            &[("path", shown.as_str()), ("base_url", config.base_url.as_str())],
        );

        Ok(config)
    }

    /// Load `path` if it exists, else defaults. A path the user named
    /// explicitly must exist.
    pub fn load_or_default(path: &Path, explicit: bool) -> ConfigResult<Self> {
        if !explicit && !path.exists() {
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Config pointing at `base_url` with every other field defaulted
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid("base_url must not be empty".into()));
        }
        if self.default_page_size == 0 {
            return Err(ConfigError::Invalid("default_page_size must be > 0".into()));
        }
        if self.export_page_size == 0 {
            return Err(ConfigError::Invalid("export_page_size must be > 0".into()));
        }
        if self.max_subquery_depth == 0 {
            return Err(ConfigError::Invalid("max_subquery_depth must be >= 1".into()));
        }
        self.severity()?;

        if let Some(catalog) = &self.catalog {
            if let Some((entity, _)) = catalog.iter().find(|(_, fields)| fields.is_empty()) {
                return Err(ConfigError::Invalid(format!(
                    "catalog entry '{}' has no fields",
                    entity
                )));
            }
        }

        Ok(())
    }

    /// Parsed `log_level`
    pub fn severity(&self) -> ConfigResult<Severity> {
        self.log_level.parse().map_err(ConfigError::Invalid)
    }

    /// Catalog override, or the built-in catalog
    pub fn field_catalog(&self) -> FieldCatalog {
        match &self.catalog {
            Some(entries) => FieldCatalog::from_entries(entries.clone()),
            None => FieldCatalog::builtin(),
        }
    }

    pub fn fetch_url(&self) -> String {
        join_url(&self.base_url, &self.fetch_path)
    }

    pub fn download_url(&self) -> String {
        join_url(&self.base_url, &self.download_path)
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}
