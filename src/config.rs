//! Application configuration
//!
//! Loaded from `~/.memocalc/config.toml` when present; every field has a
//! default so an absent file means a fully default config. CLI flags are
//! applied on top by the command layer.
//!
//! ```toml
//! log_level = "info"
//!
//! [server]
//! host = "127.0.0.1"
//! port = 8080
//! # socket = "/run/memocalc/memocalc.sock"
//!
//! [database]
//! path = "/var/lib/memocalc/results.db"
//! ```

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::paths;

/// Top-level configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Log filter used when RUST_LOG is unset (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub database: DatabaseConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Serve on a Unix domain socket instead of TCP
    pub socket: Option<PathBuf>,
}

/// Results database configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to database file
    #[serde(default = "paths::database_path")]
    pub path: PathBuf,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            socket: None,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: paths::database_path(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;

        Self::load_from_str(&content)
            .with_context(|| format!("Invalid config file: {:?}", path.as_ref()))
    }

    /// Load configuration from string
    pub fn load_from_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).context("Failed to parse configuration")?;

        config.validate()?;
        Ok(config)
    }

    /// Load an explicit config file, or the default one if it exists, or defaults.
    pub fn load_or_default(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load_from_file(path);
        }

        let default_path = paths::config_path();
        if default_path.exists() {
            Self::load_from_file(&default_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.log_level.parse::<log::LevelFilter>().is_err() {
            bail!("Unknown log_level '{}'", self.log_level);
        }

        if self.server.socket.is_none() {
            if self.server.host.trim().is_empty() {
                bail!("server.host must not be empty");
            }
            if self.server.port == 0 {
                bail!("server.port must be non-zero");
            }
        }

        if self.database.path.as_os_str().is_empty() {
            bail!("database.path must not be empty");
        }

        Ok(())
    }
}
