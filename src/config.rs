//! Configuration module
//!
//! Loaded from a TOML file (`~/.config/ev-support/config.toml` by default).
//! Every section has defaults, so a partial or missing file is fine.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::application::WorkflowPolicy;
use crate::infrastructure::DatabaseConfig;
use crate::notifications::AuditTrail;

/// Environment variable overriding the config file location
pub const CONFIG_ENV: &str = "EV_SUPPORT_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Cannot render config: {0}")]
    Render(#[from] toml::ser::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Memory,
    #[default]
    Sqlite,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub sqlite_path: String,
    pub max_connections: u32,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Sqlite,
            sqlite_path: "./ev-support.db".to_string(),
            max_connections: 5,
        }
    }
}

impl StorageConfig {
    pub fn database_config(&self) -> DatabaseConfig {
        DatabaseConfig {
            max_connections: self.max_connections,
            ..DatabaseConfig::sqlite(&self.sqlite_path)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. `info` or `ev_support=debug`
    pub level: String,
    /// `pretty` or `json`
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Station register CSV; no seeding when unset
    pub path: Option<PathBuf>,
    pub region: String,
    pub seed_on_startup: bool,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            path: None,
            region: "Berlin".to_string(),
            seed_on_startup: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    pub reject_reprocessing: bool,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            reject_reprocessing: WorkflowPolicy::default().reject_reprocessing,
        }
    }
}

impl From<&WorkflowConfig> for WorkflowPolicy {
    fn from(cfg: &WorkflowConfig) -> Self {
        WorkflowPolicy {
            reject_reprocessing: cfg.reject_reprocessing,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    /// JSON-lines file receiving every workflow event; log only when unset
    pub path: Option<PathBuf>,
}

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
    pub catalog: CatalogConfig,
    pub workflow: WorkflowConfig,
    pub audit: AuditConfig,
}

impl AppConfig {
    /// Read and validate a config file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storage.max_connections == 0 {
            return Err(ConfigError::Invalid(
                "storage.max_connections must be at least 1".into(),
            ));
        }
        if self.storage.backend == StorageBackend::Sqlite
            && self.storage.sqlite_path.trim().is_empty()
        {
            return Err(ConfigError::Invalid("storage.sqlite_path is empty".into()));
        }
        match self.logging.format.to_lowercase().as_str() {
            "pretty" | "json" => {}
            other => {
                return Err(ConfigError::Invalid(format!(
                    "logging.format must be \"pretty\" or \"json\", got \"{}\"",
                    other
                )))
            }
        }
        if self.catalog.region.trim().is_empty() {
            return Err(ConfigError::Invalid("catalog.region is empty".into()));
        }
        if matches!(&self.audit.path, Some(p) if p.as_os_str().is_empty()) {
            return Err(ConfigError::Invalid("audit.path is empty".into()));
        }
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn workflow_policy(&self) -> WorkflowPolicy {
        WorkflowPolicy::from(&self.workflow)
    }

    pub fn audit_trail(&self) -> AuditTrail {
        match &self.audit.path {
            Some(path) => AuditTrail::with_file(path),
            None => AuditTrail::new(),
        }
    }
}

/// `$EV_SUPPORT_CONFIG`, or `<config dir>/ev-support/config.toml`.
pub fn default_config_path() -> PathBuf {
    if let Ok(path) = std::env::var(CONFIG_ENV) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }
    dirs_next::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ev-support")
        .join("config.toml")
}
