//! Home-based storage paths for slfsrv persistence.
//!
//! Everything lives under `~/.slfsrv/`:
//! - `settings.yaml` - Server settings (port, secret placement, keepalive window)
//! - `store.json` - Key/value store exposed to served pages through RPC

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

/// The name of the slfsrv home directory.
const SLFSRV_DIR: &str = ".slfsrv";

/// Returns the home-based slfsrv directory: `~/.slfsrv/`
///
/// Creates the directory if it doesn't exist.
///
/// # Errors
///
/// Returns an error if:
/// - Home directory cannot be determined
/// - Directory creation fails
pub fn slfsrv_home_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory for slfsrv storage")?;
    let dir = home.join(SLFSRV_DIR);
    fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create slfsrv directory: {}", dir.display()))?;
    Ok(dir)
}

/// Returns the default settings file path: `~/.slfsrv/settings.yaml`
pub fn settings_path() -> Result<PathBuf> {
    Ok(slfsrv_home_dir()?.join("settings.yaml"))
}

/// Returns the default store file path: `~/.slfsrv/store.json`
pub fn store_path() -> Result<PathBuf> {
    Ok(slfsrv_home_dir()?.join("store.json"))
}
