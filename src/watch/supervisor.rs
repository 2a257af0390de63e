// src/watch/supervisor.rs

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

use crate::pipeline::{self, BuildContext};

/// Events consumed by the supervisor loop.
///
/// - the watcher sends `SourcesChanged`
/// - the build runner sends `BuildFinished`
/// - Ctrl-C handling sends `ShutdownRequested`
#[derive(Debug, Clone)]
pub enum SupervisorEvent {
    SourcesChanged { path: String },
    BuildFinished { ok: bool },
    ShutdownRequested,
}

/// Seam between the supervisor and the pipeline, so the loop can be tested
/// with a fake runner. Implementations spawn the build and report back with
/// `SupervisorEvent::BuildFinished` on the given channel.
pub trait BuildRunner: Send + Sync + 'static {
    fn spawn_build(&self, events_tx: mpsc::Sender<SupervisorEvent>);
}

/// Production runner: executes the real pipeline in a spawned task. Build
/// failures are logged and reported; they never take the supervisor down.
pub struct PipelineRunner {
    ctx: Arc<BuildContext>,
}

impl PipelineRunner {
    pub fn new(ctx: Arc<BuildContext>) -> Self {
        Self { ctx }
    }
}

impl BuildRunner for PipelineRunner {
    fn spawn_build(&self, events_tx: mpsc::Sender<SupervisorEvent>) {
        let ctx = Arc::clone(&self.ctx);
        tokio::spawn(async move {
            let ok = match pipeline::run_build(&ctx).await {
                Ok(report) => {
                    debug!(sources = report.source_count, "rebuild complete");
                    true
                }
                Err(err) => {
                    error!(error = %err, "rebuild failed");
                    false
                }
            };
            let _ = events_tx.send(SupervisorEvent::BuildFinished { ok }).await;
        });
    }
}

/// The watch supervisor.
///
/// Responsibilities:
/// - Coalesce bursts of change events into one rebuild per batch.
/// - Serialize builds: if events land while a build is in flight, remember at
///   most one pending rerun and start it when the build completes, so two
///   invocations never write the artifact concurrently.
/// - Keep observing after failed builds.
pub struct Supervisor<R: BuildRunner> {
    runner: R,
    debounce: Duration,
    events_rx: mpsc::Receiver<SupervisorEvent>,
    events_tx: mpsc::Sender<SupervisorEvent>,
    building: bool,
    pending: bool,
}

impl<R: BuildRunner> Supervisor<R> {
    pub fn new(
        runner: R,
        debounce: Duration,
        events_rx: mpsc::Receiver<SupervisorEvent>,
        events_tx: mpsc::Sender<SupervisorEvent>,
    ) -> Self {
        Self {
            runner,
            debounce,
            events_rx,
            events_tx,
            building: false,
            pending: false,
        }
    }

    /// Main event loop. Runs until shutdown is requested or every sender is
    /// dropped.
    pub async fn run(mut self) -> anyhow::Result<()> {
        info!("watch supervisor started");

        while let Some(event) = self.events_rx.recv().await {
            match event {
                SupervisorEvent::SourcesChanged { path } => {
                    debug!(%path, "source change batch opened");
                    if !self.coalesce().await {
                        break;
                    }
                    self.request_build();
                }
                SupervisorEvent::BuildFinished { ok } => self.handle_build_finished(ok),
                SupervisorEvent::ShutdownRequested => {
                    info!("shutdown requested, stopping supervisor");
                    break;
                }
            }
        }

        info!("watch supervisor exiting");
        Ok(())
    }

    /// Swallow further change events until the debounce window passes with no
    /// new ones. Returns false if shutdown was requested meanwhile.
    async fn coalesce(&mut self) -> bool {
        loop {
            match timeout(self.debounce, self.events_rx.recv()).await {
                Err(_) => return true, // window elapsed, batch closed
                Ok(None) => return true,
                Ok(Some(SupervisorEvent::SourcesChanged { path })) => {
                    debug!(%path, "change coalesced into batch");
                }
                Ok(Some(SupervisorEvent::BuildFinished { ok })) => {
                    self.handle_build_finished(ok);
                }
                Ok(Some(SupervisorEvent::ShutdownRequested)) => return false,
            }
        }
    }

    /// Start a build, or remember one pending rerun if a build is in flight.
    fn request_build(&mut self) {
        if self.building {
            if self.pending {
                debug!("rerun already pending, dropping trigger");
            } else {
                self.pending = true;
                debug!("build in flight, queued one rerun");
            }
            return;
        }
        self.building = true;
        self.runner.spawn_build(self.events_tx.clone());
    }

    fn handle_build_finished(&mut self, ok: bool) {
        if !ok {
            warn!("build failed, continuing to watch");
        }
        if self.pending {
            self.pending = false;
            self.runner.spawn_build(self.events_tx.clone());
        } else {
            self.building = false;
        }
    }
}
