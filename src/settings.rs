use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Default keepalive window when the settings file does not name one.
const DEFAULT_KEEP_ALIVE_SECONDS: i64 = 30;

/// Environment variable overriding the listening port.
pub const PORT_ENV: &str = "SLFSRV_PORT";

/// Environment variable overriding the keepalive window (seconds).
pub const KEEPALIVE_ENV: &str = "SLFSRV_KEEPALIVE_SECS";

/// Startup settings read from `settings.yaml`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Settings {
    /// Fixed listening port. `0` means probe for a free one.
    #[serde(default)]
    pub port: u16,
    /// Whether the secret token must appear as the first URL path segment.
    #[serde(default = "default_secret_key_in_path")]
    pub secret_key_in_path: bool,
    /// Seconds without a client call before the server exits.
    #[serde(default = "default_keep_alive_seconds")]
    pub keep_alive_seconds: i64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            port: 0,
            secret_key_in_path: default_secret_key_in_path(),
            keep_alive_seconds: default_keep_alive_seconds(),
        }
    }
}

fn default_secret_key_in_path() -> bool {
    true
}

fn default_keep_alive_seconds() -> i64 {
    DEFAULT_KEEP_ALIVE_SECONDS
}

impl Settings {
    /// Loads settings from `path`, falling back to defaults when the file is absent.
    ///
    /// Environment overrides are applied after the file and the result is validated.
    pub fn load(path: &Path) -> Result<Self> {
        let mut settings = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read settings file: {}", path.display()))?;
            Self::parse(&content)
                .with_context(|| format!("Failed to parse settings file as YAML: {}", path.display()))?
        } else {
            Self::default()
        };
        settings.apply_env_overrides()?;
        settings.validate()?;
        Ok(settings)
    }

    fn parse(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(raw) = std::env::var(PORT_ENV) {
            self.port = raw
                .trim()
                .parse()
                .with_context(|| format!("{} must be a port number, got '{}'", PORT_ENV, raw))?;
        }
        if let Ok(raw) = std::env::var(KEEPALIVE_ENV) {
            self.keep_alive_seconds = raw
                .trim()
                .parse()
                .with_context(|| format!("{} must be an integer, got '{}'", KEEPALIVE_ENV, raw))?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.keep_alive_seconds <= 0 {
            anyhow::bail!(
                "keep_alive_seconds must be positive, got {}",
                self.keep_alive_seconds
            );
        }
        Ok(())
    }

    /// The configured port, or `None` when the port should be probed.
    pub fn explicit_port(&self) -> Option<u16> {
        (self.port != 0).then_some(self.port)
    }

    pub fn keep_alive_window(&self) -> Duration {
        Duration::from_secs(self.keep_alive_seconds.unsigned_abs())
    }
}

#[cfg(test)]
#[path = "tests/settings_tests.rs"]
mod tests;
