//! # Engine Configuration
//!
//! Loaded once at startup and read-only afterwards.
//!
//! ## Configuration Sources (Priority Order)
//! 1. Environment variables (`RXLEDGER_*`)
//! 2. Config file (`rxledger.toml`)
//! 3. Defaults (this file)
//!
//! ## Default Config Location
//! - **Linux**: `~/.config/rxledger/rxledger.toml`
//! - **macOS**: `~/Library/Application Support/com.rxledger.rxledger/rxledger.toml`
//! - **Windows**: `%APPDATA%\rxledger\rxledger\config\rxledger.toml`
//!
//! ## Example Config File
//! ```toml
//! [database]
//! path = "/var/lib/rxledger/ledger.db"
//! max_connections = 8
//!
//! [documents]
//! purchase_prefix = "PO"
//! sale_prefix = "INV"
//! default_list_limit = 100
//!
//! [logging]
//! filter = "info,rxledger=debug,sqlx=warn"
//! ```

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use rxledger_core::numbering::{DEFAULT_PURCHASE_PREFIX, DEFAULT_SALE_PREFIX};
use rxledger_db::DbConfig;

/// Default tracing filter when neither `RUST_LOG` nor config sets one.
pub const DEFAULT_LOG_FILTER: &str = "info,rxledger=debug,sqlx=warn";

/// Errors while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

// =============================================================================
// Sections
// =============================================================================

/// `[database]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    /// SQLite file path. Defaults to the platform data directory.
    pub path: PathBuf,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout_secs: u64,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        DatabaseSettings {
            path: default_database_path(),
            max_connections: 5,
            min_connections: 1,
            connect_timeout_secs: 30,
        }
    }
}

/// `[documents]` section: numbering and listing defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentSettings {
    /// Prefix for purchase order numbers, e.g. `PO` → `PO2610-048213`.
    pub purchase_prefix: String,
    /// Prefix for sale numbers, e.g. `SALE` → `SALE261019143005-004213`.
    pub sale_prefix: String,
    /// Row limit for list queries that don't set their own.
    pub default_list_limit: u32,
}

impl Default for DocumentSettings {
    fn default() -> Self {
        DocumentSettings {
            purchase_prefix: DEFAULT_PURCHASE_PREFIX.to_string(),
            sale_prefix: DEFAULT_SALE_PREFIX.to_string(),
            default_list_limit: 50,
        }
    }
}

/// `[logging]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub filter: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        LoggingSettings {
            filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

// =============================================================================
// Engine Configuration
// =============================================================================

/// Complete engine configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub database: DatabaseSettings,

    #[serde(default)]
    pub documents: DocumentSettings,

    #[serde(default)]
    pub logging: LoggingSettings,
}

impl EngineConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (`config_path`, or the platform default)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> ConfigResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading engine config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = Self::from_toml(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Parses a TOML document; missing sections and keys take defaults.
    pub fn from_toml(contents: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(contents)?)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.documents.purchase_prefix.trim().is_empty() {
            return Err(ConfigError::Invalid("documents.purchase_prefix is empty".into()));
        }
        if self.documents.sale_prefix.trim().is_empty() {
            return Err(ConfigError::Invalid("documents.sale_prefix is empty".into()));
        }
        if self.documents.default_list_limit == 0 {
            return Err(ConfigError::Invalid(
                "documents.default_list_limit must be greater than 0".into(),
            ));
        }
        if self.database.max_connections == 0
            || self.database.min_connections > self.database.max_connections
        {
            return Err(ConfigError::Invalid(format!(
                "database connections: min {} / max {}",
                self.database.min_connections, self.database.max_connections
            )));
        }
        Ok(())
    }

    /// Applies `RXLEDGER_*` environment variable overrides.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(path) = var("RXLEDGER_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.database.path = PathBuf::from(path);
        }

        if let Some(filter) = var("RXLEDGER_LOG") {
            self.logging.filter = filter;
        }

        if let Some(prefix) = var("RXLEDGER_PURCHASE_PREFIX") {
            if prefix.trim().is_empty() {
                warn!("Ignoring empty RXLEDGER_PURCHASE_PREFIX");
            } else {
                self.documents.purchase_prefix = prefix;
            }
        }

        if let Some(prefix) = var("RXLEDGER_SALE_PREFIX") {
            if prefix.trim().is_empty() {
                warn!("Ignoring empty RXLEDGER_SALE_PREFIX");
            } else {
                self.documents.sale_prefix = prefix;
            }
        }
    }

    /// Pool settings for [`rxledger_db::Database::new`].
    pub fn to_db_config(&self) -> DbConfig {
        DbConfig::new(&self.database.path)
            .max_connections(self.database.max_connections)
            .min_connections(self.database.min_connections)
            .connect_timeout(Duration::from_secs(self.database.connect_timeout_secs))
    }

    fn default_config_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join("rxledger.toml"))
    }
}

fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("com", "rxledger", "rxledger")
}

/// Platform data directory, or the working directory when there is none.
fn default_database_path() -> PathBuf {
    project_dirs()
        .map(|dirs| dirs.data_dir().join("rxledger.db"))
        .unwrap_or_else(|| PathBuf::from("./rxledger.db"))
}
