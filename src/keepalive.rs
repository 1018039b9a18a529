//! Idle-shutdown watchdog.
//!
//! The served page proves it is still open by making RPC calls. Each call posts a
//! liveness signal into a single-slot mailbox; the watchdog resets its timer on
//! every signal it receives and requests process exit once a full window passes
//! without one.

use std::fmt;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Why the process should stop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExitRequest {
    /// No client call arrived within the keepalive window.
    KeepaliveExpired { window: Duration },
    /// The served page asked the host to exit.
    Requested { code: i32 },
}

impl ExitRequest {
    pub fn exit_code(&self) -> i32 {
        match self {
            ExitRequest::KeepaliveExpired { .. } => 1,
            ExitRequest::Requested { code } => *code,
        }
    }
}

impl fmt::Display for ExitRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitRequest::KeepaliveExpired { window } => {
                write!(f, "no keepalive received within {}s", window.as_secs())
            }
            ExitRequest::Requested { code } => write!(f, "exit requested with code {}", code),
        }
    }
}

pub type ExitSender = mpsc::UnboundedSender<ExitRequest>;

/// Sending half of the liveness mailbox.
#[derive(Debug, Clone)]
pub struct KeepaliveHandle {
    tx: mpsc::Sender<()>,
}

impl KeepaliveHandle {
    /// Posts a liveness signal without waiting.
    ///
    /// A signal that finds the slot already occupied is dropped: the pending one
    /// resets the timer just the same.
    pub fn tickle(&self) {
        let _ = self.tx.try_send(());
    }
}

/// Receiving half of the liveness mailbox, consumed by [`spawn_watchdog`].
#[derive(Debug)]
pub struct KeepaliveSignals {
    rx: mpsc::Receiver<()>,
}

/// Creates the single-slot liveness mailbox.
pub fn channel() -> (KeepaliveHandle, KeepaliveSignals) {
    let (tx, rx) = mpsc::channel(1);
    (KeepaliveHandle { tx }, KeepaliveSignals { rx })
}

/// Starts the watchdog task. It sends exactly one [`ExitRequest::KeepaliveExpired`]
/// when the window elapses without a signal, then stops.
pub fn spawn_watchdog(
    signals: KeepaliveSignals,
    window: Duration,
    exit_tx: ExitSender,
) -> JoinHandle<()> {
    tokio::spawn(run_watchdog(signals, window, exit_tx))
}

async fn run_watchdog(mut signals: KeepaliveSignals, window: Duration, exit_tx: ExitSender) {
    loop {
        match tokio::time::timeout(window, signals.rx.recv()).await {
            Ok(Some(())) => {
                debug!("keepalive received, watchdog reset");
            }
            Ok(None) => {
                // Every handle is gone, so no signal can ever arrive again.
                tokio::time::sleep(window).await;
                break;
            }
            Err(_) => break,
        }
    }
    warn!(window_secs = window.as_secs(), "keepalive window elapsed");
    let _ = exit_tx.send(ExitRequest::KeepaliveExpired { window });
}

#[cfg(test)]
#[path = "tests/keepalive_tests.rs"]
mod tests;
