//! Core definitions watcher implementation.
//!
//! Monitors the definitions directory recursively using the `notify`
//! crate, with debounced logical events: editors produce several raw
//! events per logical save, and a burst of file edits should trigger one
//! render cycle, not one per event.

use std::path::{Path, PathBuf};
use std::time::Duration;

use mailharbor_common::CycleError;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Watches the definitions directory and emits logical "definitions
/// changed" events.
pub struct DefinitionWatcher {
    dir: PathBuf,
    debounce: Duration,
}

impl DefinitionWatcher {
    pub fn new(dir: PathBuf, debounce: Duration) -> Self {
        if !dir.exists() {
            warn!(
                "definitions directory {} does not exist yet, will watch for creation",
                dir.display()
            );
        }
        Self { dir, debounce }
    }

    /// Watch for changes, sending one `()` per logical event on `tx`.
    ///
    /// A synthetic event is sent immediately so the first render happens
    /// without waiting for a filesystem change. Runs until the receiver
    /// is dropped.
    pub async fn watch(&self, tx: mpsc::Sender<()>) -> Result<(), CycleError> {
        info!("watching definitions under {}", self.dir.display());

        // Bridge the sync notify callback into async.
        let (raw_tx, raw_rx) = mpsc::channel::<()>(16);

        let mut watcher = RecommendedWatcher::new(
            move |result: Result<Event, notify::Error>| match result {
                Ok(event) => {
                    if is_definition_event(&event) {
                        debug!("definition change detected");
                        let _ = raw_tx.try_send(());
                    }
                }
                Err(e) => {
                    error!("file watcher error: {e}");
                }
            },
            notify::Config::default(),
        )
        .map_err(|e| CycleError::Watch(format!("failed to create watcher: {e}")))?;

        watcher
            .watch(&self.dir, RecursiveMode::Recursive)
            .map_err(|e| {
                CycleError::Watch(format!("failed to watch {}: {e}", self.dir.display()))
            })?;

        // Startup-time synthetic event: render once before any change.
        if tx.send(()).await.is_err() {
            return Ok(());
        }

        // The watcher must stay alive for the lifetime of the loop.
        debounce_events(raw_rx, self.debounce, tx).await;
        drop(watcher);
        Ok(())
    }
}

/// True for create/modify/remove/rename events touching a YAML document.
fn is_definition_event(event: &Event) -> bool {
    let relevant = matches!(
        event.kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
    );
    relevant && event.paths.iter().any(|p| is_yaml(p))
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    )
}

/// Collapse bursts of raw events into single logical events.
///
/// After the first raw event, further events within the debounce window are
/// swallowed; when the window elapses one logical event is emitted. Runs
/// until either channel closes.
pub(crate) async fn debounce_events(
    mut raw: mpsc::Receiver<()>,
    window: Duration,
    tx: mpsc::Sender<()>,
) {
    loop {
        if raw.recv().await.is_none() {
            break;
        }

        let quiet = tokio::time::sleep(window);
        tokio::pin!(quiet);
        loop {
            tokio::select! {
                _ = &mut quiet => break,
                msg = raw.recv() => {
                    if msg.is_none() {
                        // Source closed mid-burst; still emit the pending event.
                        let _ = tx.send(()).await;
                        return;
                    }
                }
            }
        }

        debug!("definitions changed, emitting logical event");
        if tx.send(()).await.is_err() {
            break;
        }
    }
}
