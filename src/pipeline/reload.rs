// src/pipeline/reload.rs

//! Live-reload notification hook. The seam exists so a browser-notification
//! transport can be plugged in; it is disabled in the reference
//! configuration, and the built-in hook only logs.

use tracing::info;

use super::BuildReport;

/// Invoked after a successful artifact write when `[steps].live_reload` is
/// enabled.
pub trait ReloadHook: Send + Sync {
    fn artifact_written(&self, report: &BuildReport);
}

/// Default hook: log that the artifact changed. No network effects.
#[derive(Debug, Default)]
pub struct LogReloadHook;

impl ReloadHook for LogReloadHook {
    fn artifact_written(&self, report: &BuildReport) {
        info!(css = ?report.css_path, "artifact changed, reload requested");
    }
}
