//! Application configuration.
//!
//! Settings come from an optional JSON file, then environment overrides,
//! and are handed to the database, the ingestion pipeline and the server
//! explicitly. Nothing reads them from globals afterwards.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Environment variable naming the JSON config file.
pub const ENV_CONFIG: &str = "OSMANAGER_CONFIG";
/// Environment variable overriding the database path.
pub const ENV_DATABASE: &str = "OSMANAGER_DB";
/// Environment variable overriding the upload staging directory.
pub const ENV_UPLOAD_DIR: &str = "OSMANAGER_UPLOAD_DIR";
/// Environment variable overriding the bind address.
pub const ENV_BIND: &str = "OSMANAGER_BIND";

/// Default upload cap: 50 MiB.
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 50 * 1024 * 1024;
/// Default row cap for the listing endpoint.
pub const DEFAULT_QUERY_LIMIT: u64 = 1000;
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:5000";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppConfig {
    pub database_path: PathBuf,
    pub upload_directory: PathBuf,
    pub max_upload_bytes: u64,
    pub bind_address: String,
    pub query_limit: u64,
    /// Directory with the dashboard's static assets, served at `/`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub static_directory: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_path: crate::db::default_database_path()
                .unwrap_or_else(|| PathBuf::from("ordens_servico_completo.db")),
            upload_directory: default_upload_directory()
                .unwrap_or_else(|| PathBuf::from("uploads")),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            query_limit: DEFAULT_QUERY_LIMIT,
            static_directory: None,
        }
    }
}

impl AppConfig {
    /// Applies overrides from a variable lookup (normally `std::env::var`).
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        if let Some(path) = non_blank(ENV_DATABASE) {
            self.database_path = PathBuf::from(path);
        }
        if let Some(dir) = non_blank(ENV_UPLOAD_DIR) {
            self.upload_directory = PathBuf::from(dir);
        }
        if let Some(bind) = non_blank(ENV_BIND) {
            self.bind_address = bind;
        }
        self
    }

    /// Loads the file named by `OSMANAGER_CONFIG` (defaults when unset),
    /// applies environment overrides and validates the result.
    pub fn from_env() -> Result<Self, ConfigError> {
        let base = match std::env::var(ENV_CONFIG) {
            Ok(path) if !path.trim().is_empty() => load_config(path)?,
            _ => AppConfig::default(),
        };
        let config = base.with_overrides(|name| std::env::var(name).ok());
        validate_config(&config)?;
        Ok(config)
    }
}

/// Returns the canonical staging directory: `~/.osmanager/uploads`.
pub fn default_upload_directory() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".osmanager").join("uploads"))
}

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    load_config_from_str(&content)
}

pub fn load_config_from_str(content: &str) -> Result<AppConfig, ConfigError> {
    let config: AppConfig = serde_json::from_str(content)?;
    validate_config(&config)?;
    Ok(config)
}

fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.database_path.as_os_str().is_empty() {
        return Err(ConfigError::Validation {
            message: "databasePath must not be empty".to_string(),
        });
    }
    if config.upload_directory.as_os_str().is_empty() {
        return Err(ConfigError::Validation {
            message: "uploadDirectory must not be empty".to_string(),
        });
    }
    if config.max_upload_bytes == 0 {
        return Err(ConfigError::Validation {
            message: "maxUploadBytes must be greater than zero".to_string(),
        });
    }
    if config.query_limit == 0 {
        return Err(ConfigError::Validation {
            message: "queryLimit must be greater than zero".to_string(),
        });
    }
    if config.bind_address.trim().is_empty() {
        return Err(ConfigError::Validation {
            message: "bindAddress must not be empty".to_string(),
        });
    }
    Ok(())
}
