//! Single source of truth for memocalc filesystem layout.
//!
//! This module defines WHERE data lives. It has no I/O, no validation,
//! no business logic.
//!
//! ```text
//! ~/.memocalc/
//! ├── config.toml              # Optional config
//! └── data/
//!     └── results.db           # Memoized results (SQLite)
//! ```

use std::path::PathBuf;

/// User's memocalc home directory: `~/.memocalc/`
pub fn memocalc_home() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".memocalc")
}

/// Config file: `~/.memocalc/config.toml`
pub fn config_path() -> PathBuf {
    memocalc_home().join("config.toml")
}

/// Data directory: `~/.memocalc/data/`
pub fn data_dir() -> PathBuf {
    memocalc_home().join("data")
}

/// Results database: `~/.memocalc/data/results.db`
pub fn database_path() -> PathBuf {
    data_dir().join("results.db")
}
