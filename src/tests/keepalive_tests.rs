use super::*;
use tokio::sync::mpsc::error::TryRecvError;

const WINDOW: Duration = Duration::from_secs(5);

/// Lets spawned tasks observe the current (paused) clock.
async fn settle() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
}

async fn advance(duration: Duration) {
    tokio::time::advance(duration).await;
    settle().await;
}

#[tokio::test(start_paused = true)]
async fn test_expires_without_signal() {
    let (_handle, signals) = channel();
    let (exit_tx, mut exit_rx) = mpsc::unbounded_channel();
    let watchdog = spawn_watchdog(signals, WINDOW, exit_tx);
    settle().await;

    advance(WINDOW - Duration::from_millis(10)).await;
    assert!(matches!(exit_rx.try_recv(), Err(TryRecvError::Empty)));

    advance(Duration::from_millis(20)).await;
    assert_eq!(
        exit_rx.try_recv(),
        Ok(ExitRequest::KeepaliveExpired { window: WINDOW })
    );

    watchdog.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_signal_extends_deadline() {
    let (handle, signals) = channel();
    let (exit_tx, mut exit_rx) = mpsc::unbounded_channel();
    let _watchdog = spawn_watchdog(signals, WINDOW, exit_tx);
    settle().await;

    // Signal at t=4s; the earliest expiry is now t=9s.
    advance(Duration::from_secs(4)).await;
    handle.tickle();
    settle().await;

    advance(Duration::from_millis(4_900)).await;
    assert!(matches!(exit_rx.try_recv(), Err(TryRecvError::Empty)));

    advance(Duration::from_millis(200)).await;
    assert!(matches!(
        exit_rx.try_recv(),
        Ok(ExitRequest::KeepaliveExpired { .. })
    ));
}

#[tokio::test(start_paused = true)]
async fn test_repeated_signals_keep_alive() {
    let (handle, signals) = channel();
    let (exit_tx, mut exit_rx) = mpsc::unbounded_channel();
    let _watchdog = spawn_watchdog(signals, WINDOW, exit_tx);
    settle().await;

    for _ in 0..10 {
        advance(Duration::from_secs(3)).await;
        handle.tickle();
        settle().await;
    }
    assert!(matches!(exit_rx.try_recv(), Err(TryRecvError::Empty)));
}

#[tokio::test(start_paused = true)]
async fn test_burst_of_signals_resets_once() {
    let (handle, signals) = channel();
    let (exit_tx, mut exit_rx) = mpsc::unbounded_channel();
    let _watchdog = spawn_watchdog(signals, WINDOW, exit_tx);
    settle().await;

    advance(Duration::from_secs(2)).await;
    // Only one fits in the mailbox; the rest are dropped.
    for _ in 0..5 {
        handle.tickle();
    }
    settle().await;

    advance(Duration::from_millis(5_100)).await;
    assert!(matches!(
        exit_rx.try_recv(),
        Ok(ExitRequest::KeepaliveExpired { .. })
    ));
}

#[tokio::test(start_paused = true)]
async fn test_terminating_sends_single_notification() {
    let (_handle, signals) = channel();
    let (exit_tx, mut exit_rx) = mpsc::unbounded_channel();
    let watchdog = spawn_watchdog(signals, WINDOW, exit_tx);

    advance(WINDOW * 3).await;
    watchdog.await.unwrap();

    assert!(exit_rx.try_recv().is_ok());
    assert!(matches!(
        exit_rx.try_recv(),
        Err(TryRecvError::Disconnected)
    ));
}

#[tokio::test(start_paused = true)]
async fn test_dropped_handles_still_expire() {
    let (handle, signals) = channel();
    let (exit_tx, mut exit_rx) = mpsc::unbounded_channel();
    let _watchdog = spawn_watchdog(signals, WINDOW, exit_tx);
    drop(handle);
    settle().await;

    advance(WINDOW + Duration::from_millis(10)).await;
    assert!(exit_rx.try_recv().is_ok());
}

#[test]
fn test_exit_codes() {
    assert_eq!(
        ExitRequest::KeepaliveExpired { window: WINDOW }.exit_code(),
        1
    );
    assert_eq!(ExitRequest::Requested { code: 0 }.exit_code(), 0);
    assert_eq!(ExitRequest::Requested { code: 3 }.exit_code(), 3);
}
