//! Per-process session configuration shared by every request handler.

use crate::content::ContentSource;
use crate::keepalive::ExitSender;
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Length of the generated secret token.
const SECRET_KEY_LEN: usize = 32;

/// Immutable configuration for the single client session this process serves.
#[derive(Debug, Clone)]
pub struct ServerSession {
    /// Opaque token gating every request when `secret_key_in_path` is set.
    pub secret_key: String,
    pub secret_key_in_path: bool,
    pub verbose: bool,
    pub content: ContentSource,
    /// Full path of the served directory or bundle, reported to the page.
    pub root_path: PathBuf,
    /// Resource opened first in the browser, relative to the root.
    pub init_file: String,
}

impl ServerSession {
    /// The secret as it appears in URLs, or `None` when routes carry no token.
    pub fn path_secret(&self) -> Option<&str> {
        self.secret_key_in_path.then_some(self.secret_key.as_str())
    }
}

/// Generates a fresh alphanumeric secret token.
pub fn generate_secret_key() -> String {
    rand::Rng::sample_iter(rand::thread_rng(), &rand::distributions::Alphanumeric)
        .take(SECRET_KEY_LEN)
        .map(char::from)
        .collect()
}

/// Runtime context handed to RPC functions alongside each call.
#[derive(Debug, Clone)]
pub struct ServerContext {
    pub session: Arc<ServerSession>,
    pub port: u16,
    pub keep_alive: Duration,
    /// Path of the running executable.
    pub executable: PathBuf,
    pub started_at: DateTime<Utc>,
    pub started: Instant,
    pub exit: ExitSender,
}

impl ServerContext {
    pub fn new(
        session: Arc<ServerSession>,
        port: u16,
        keep_alive: Duration,
        exit: ExitSender,
    ) -> Self {
        Self {
            session,
            port,
            keep_alive,
            executable: std::env::current_exe().unwrap_or_default(),
            started_at: Utc::now(),
            started: Instant::now(),
            exit,
        }
    }

    /// A context serving `content` with secret `abc123`, plus the exit receiver.
    #[cfg(test)]
    pub(crate) fn for_tests(
        content: ContentSource,
    ) -> (Self, tokio::sync::mpsc::UnboundedReceiver<crate::keepalive::ExitRequest>) {
        let session = ServerSession {
            secret_key: "abc123".to_string(),
            secret_key_in_path: true,
            verbose: true,
            content,
            root_path: PathBuf::from("/srv/app"),
            init_file: "index.html".to_string(),
        };
        let (exit_tx, exit_rx) = tokio::sync::mpsc::unbounded_channel();
        let context = Self::new(Arc::new(session), 8123, Duration::from_secs(30), exit_tx);
        (context, exit_rx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::SearchPath;

    #[test]
    fn test_secret_key_shape() {
        let key = generate_secret_key();
        assert_eq!(key.len(), SECRET_KEY_LEN);
        assert!(key.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(key, generate_secret_key());
    }

    #[test]
    fn test_path_secret() {
        let mut session = ServerSession {
            secret_key: "abc123".to_string(),
            secret_key_in_path: true,
            verbose: false,
            content: ContentSource::Filesystem(SearchPath::new(vec![])),
            root_path: PathBuf::from("/srv"),
            init_file: String::new(),
        };
        assert_eq!(session.path_secret(), Some("abc123"));

        session.secret_key_in_path = false;
        assert_eq!(session.path_secret(), None);
    }
}
