//! HTTP server for memocalc
//!
//! Exposes the calculator over HTTP:
//! - `POST /addition`, `/subtraction`, `/multiplication`, `/division`
//! - `GET /existingresult/{id}`
//! - `GET /existingresult/{numbers}/{operation}`
//!
//! Design: Blocking HTTP microserver (no async/tokio)
//!
//! Transport model:
//! - Default: TCP at --host/--port
//! - Opt-in: Unix domain socket at --socket

mod internal;
pub(crate) mod microserver;

use anyhow::Result;
use std::path::PathBuf;

#[cfg(unix)]
use anyhow::{bail, Context};
#[cfg(unix)]
use std::os::unix::fs::{FileTypeExt, PermissionsExt};
#[cfg(unix)]
use std::path::Path;

use memocalc::AppConfig;

/// Options for the serve command
pub struct ServeOptions {
    /// Host to bind to
    pub host: String,
    /// Port to bind to (default: 8080)
    pub port: u16,
    /// Unix domain socket to serve on instead of TCP
    pub socket: Option<PathBuf>,
    /// Results database file
    pub db_path: PathBuf,
}

impl ServeOptions {
    /// Options from config, with CLI overrides applied on top
    pub fn from_config(
        config: &AppConfig,
        host: Option<String>,
        port: Option<u16>,
        socket: Option<PathBuf>,
    ) -> Self {
        Self {
            host: host.unwrap_or_else(|| config.server.host.clone()),
            port: port.unwrap_or(config.server.port),
            socket: socket.or_else(|| config.server.socket.clone()),
            db_path: config.database.path.clone(),
        }
    }
}

/// Ensure the socket's directory exists.
///
/// Creates it with 0o700 when missing; an existing directory is left as is.
#[cfg(unix)]
fn ensure_socket_dir(socket_path: &Path) -> Result<()> {
    let Some(dir) = socket_path.parent().filter(|p| !p.as_os_str().is_empty()) else {
        return Ok(());
    };

    if !dir.exists() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
        std::fs::set_permissions(dir, std::fs::Permissions::from_mode(0o700))
            .with_context(|| format!("Failed to set permissions on {}", dir.display()))?;
    }

    Ok(())
}

/// Remove a stale socket file safely.
///
/// Only unlinks if the path is a socket AND owned by the current user.
/// Refuses to remove non-socket files or files owned by other users.
#[cfg(unix)]
fn cleanup_stale_socket(socket_path: &Path) -> Result<()> {
    if !socket_path.exists() {
        return Ok(());
    }

    let meta = std::fs::symlink_metadata(socket_path)
        .with_context(|| format!("Failed to stat {}", socket_path.display()))?;

    // Must be a socket (not a regular file, symlink, etc)
    if !meta.file_type().is_socket() {
        bail!(
            "Refusing to start: {} exists but is not a socket.\n  \
             Remove manually if safe: rm {}",
            socket_path.display(),
            socket_path.display()
        );
    }

    // Must be owned by current user
    use std::os::unix::fs::MetadataExt;
    let file_uid = meta.uid();
    let my_uid = unsafe { libc::getuid() };
    if file_uid != my_uid {
        bail!(
            "Refusing to start: {} is owned by uid {} (you are {}).",
            socket_path.display(),
            file_uid,
            my_uid
        );
    }

    std::fs::remove_file(socket_path)
        .with_context(|| format!("Failed to remove stale socket {}", socket_path.display()))?;

    Ok(())
}

/// Set up the Unix domain socket for serving.
///
/// 1. Ensure the socket directory exists
/// 2. Clean up stale socket (safe unlink)
/// 3. Bind UnixListener
/// 4. Set socket to 0o600
#[cfg(unix)]
pub fn setup_unix_listener(socket_path: &Path) -> Result<std::os::unix::net::UnixListener> {
    use std::os::unix::net::UnixListener;

    ensure_socket_dir(socket_path)?;
    cleanup_stale_socket(socket_path)?;

    let listener = UnixListener::bind(socket_path)
        .with_context(|| format!("Failed to bind {}", socket_path.display()))?;

    // Socket permissions: 0o600 (owner read/write only)
    std::fs::set_permissions(socket_path, std::fs::Permissions::from_mode(0o600))
        .with_context(|| format!("Failed to set permissions on {}", socket_path.display()))?;

    Ok(listener)
}

/// Remove the socket file on clean shutdown.
#[cfg(unix)]
pub fn cleanup_socket(socket_path: &Path) {
    if socket_path.exists() {
        let _ = std::fs::remove_file(socket_path);
    }
}

/// Start the server
pub fn execute(options: ServeOptions) -> Result<()> {
    internal::run_server(options)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn test_options_prefer_cli_overrides() {
        let config = AppConfig::default();
        let options = ServeOptions::from_config(&config, Some("0.0.0.0".into()), None, None);
        assert_eq!(options.host, "0.0.0.0");
        assert_eq!(options.port, config.server.port);
        assert!(options.socket.is_none());
    }

    #[test]
    fn test_stale_socket_cleanup_refuses_regular_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("memocalc.sock");
        std::fs::write(&path, b"not a socket").unwrap();

        let err = cleanup_stale_socket(&path).unwrap_err();
        assert!(err.to_string().contains("not a socket"));
        assert!(path.exists());
    }

    #[test]
    fn test_setup_replaces_stale_socket() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run").join("memocalc.sock");

        let first = setup_unix_listener(&path).unwrap();
        drop(first);
        // Socket file is left behind after drop; setup must reclaim it
        let second = setup_unix_listener(&path).unwrap();
        drop(second);

        let mode = std::fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600);
        cleanup_socket(&path);
        assert!(!path.exists());
    }
}
