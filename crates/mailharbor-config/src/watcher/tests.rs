//! Tests for the definitions watcher and its debounce behavior.

use std::path::PathBuf;
use std::time::Duration;

use tokio::sync::mpsc;

use super::*;

const WINDOW: Duration = Duration::from_millis(50);

#[test]
fn watcher_new_with_nonexistent_dir_succeeds() {
    // The directory may be created after the daemon starts.
    let _watcher = DefinitionWatcher::new(
        PathBuf::from("/tmp/nonexistent_mailharbor_test_dir"),
        WINDOW,
    );
}

#[tokio::test]
async fn burst_of_raw_events_collapses_to_one_logical_event() {
    let (raw_tx, raw_rx) = mpsc::channel(16);
    let (tx, mut rx) = mpsc::channel(16);
    tokio::spawn(debounce_events(raw_rx, WINDOW, tx));

    for _ in 0..10 {
        raw_tx.send(()).await.unwrap();
    }

    assert!(rx.recv().await.is_some());

    // No second logical event without further raw events.
    let followup = tokio::time::timeout(WINDOW * 4, rx.recv()).await;
    assert!(followup.is_err(), "unexpected extra logical event");
}

#[tokio::test]
async fn separate_bursts_emit_separate_logical_events() {
    let (raw_tx, raw_rx) = mpsc::channel(16);
    let (tx, mut rx) = mpsc::channel(16);
    tokio::spawn(debounce_events(raw_rx, WINDOW, tx));

    raw_tx.send(()).await.unwrap();
    assert!(rx.recv().await.is_some());

    tokio::time::sleep(WINDOW * 2).await;

    raw_tx.send(()).await.unwrap();
    raw_tx.send(()).await.unwrap();
    assert!(rx.recv().await.is_some());

    let followup = tokio::time::timeout(WINDOW * 4, rx.recv()).await;
    assert!(followup.is_err());
}

#[tokio::test]
async fn pending_burst_is_emitted_when_source_closes() {
    let (raw_tx, raw_rx) = mpsc::channel(16);
    let (tx, mut rx) = mpsc::channel(16);
    tokio::spawn(debounce_events(raw_rx, Duration::from_secs(30), tx));

    raw_tx.send(()).await.unwrap();
    drop(raw_tx);

    let event = tokio::time::timeout(Duration::from_secs(5), rx.recv()).await;
    assert!(event.unwrap().is_some());
}

#[tokio::test]
async fn watch_emits_synthetic_startup_event() {
    let dir = tempfile::tempdir().unwrap();
    let watcher = DefinitionWatcher::new(dir.path().to_path_buf(), WINDOW);

    let (tx, mut rx) = mpsc::channel(16);
    let task = tokio::spawn(async move { watcher.watch(tx).await });

    let first = tokio::time::timeout(Duration::from_secs(5), rx.recv()).await;
    assert!(first.unwrap().is_some(), "no synthetic startup event");

    drop(rx);
    task.abort();
}
