// src/watch/watcher.rs

use std::path::{Path, PathBuf};

use globset::GlobSet;
use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::errors::Result;
use crate::watch::supervisor::SupervisorEvent;

/// Handle for the filesystem watcher.
///
/// This exists mainly so the underlying `RecommendedWatcher` is kept alive
/// for as long as needed. Dropping this handle will stop file watching.
pub struct WatcherHandle {
    _inner: RecommendedWatcher,
}

impl std::fmt::Debug for WatcherHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatcherHandle").finish()
    }
}

/// Spawn a filesystem watcher that observes `root` recursively and sends
/// `SupervisorEvent::SourcesChanged` whenever a changed path matches the
/// source pattern.
///
/// - `matcher` is the compiled source glob, evaluated against root-relative
///   paths.
/// - `output_dir` is excluded so artifact writes never re-trigger a build.
pub fn spawn_watcher(
    root: impl Into<PathBuf>,
    matcher: GlobSet,
    output_dir: PathBuf,
    events_tx: mpsc::Sender<SupervisorEvent>,
) -> Result<WatcherHandle> {
    let root = root.into();
    let root = root.canonicalize().unwrap_or_else(|_| root.clone()); // best-effort
    let output_dir = output_dir
        .canonicalize()
        .unwrap_or_else(|_| output_dir.clone());

    // Channel from the blocking notify callback into the async world.
    let (event_tx, mut event_rx) = tokio::sync::mpsc::unbounded_channel::<Event>();

    // Closure called synchronously by notify whenever an event arrives.
    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| {
            match res {
                Ok(event) => {
                    if let Err(err) = event_tx.send(event) {
                        // We can't log via tracing here easily, so fallback to stderr.
                        eprintln!("stylepipe: failed to forward notify event: {err}");
                    }
                }
                Err(err) => {
                    eprintln!("stylepipe: file watch error: {err}");
                }
            }
        },
        Config::default(),
    )?;

    watcher.watch(&root, RecursiveMode::Recursive)?;

    info!("file watcher started on {:?}", root);

    // Async task that consumes notify events and forwards rebuild triggers
    // to the supervisor.
    tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            debug!("received notify event: {:?}", event);

            for path in &event.paths {
                if path.starts_with(&output_dir) {
                    continue;
                }
                let Some(rel_str) = relative_str(&root, path) else {
                    continue;
                };
                if !matcher.is_match(&rel_str) {
                    continue;
                }
                debug!(path = %rel_str, "source change -> rebuild trigger");
                if let Err(err) = events_tx
                    .send(SupervisorEvent::SourcesChanged { path: rel_str })
                    .await
                {
                    warn!("failed to send SourcesChanged: {err}");
                    // If the supervisor channel is closed, there's no point
                    // keeping the watcher loop alive.
                    return;
                }
            }
        }

        debug!("file watcher loop ended");
    });

    Ok(WatcherHandle { _inner: watcher })
}

/// Convert a path into a string relative to `root`, with forward slashes.
///
/// Returns `None` if the path is not under `root` and cannot be relativized.
fn relative_str(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    Some(rel.to_string_lossy().replace('\\', "/"))
}
