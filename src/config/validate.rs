// src/config/validate.rs

use globset::Glob;
use tracing::warn;

use crate::config::model::ConfigFile;
use crate::errors::{BuildError, Result};

/// Run basic semantic validation against a loaded configuration.
///
/// This checks:
/// - `source.pattern` is non-empty and compiles as a glob
/// - `output.file` is a bare file name (no path separators)
/// - `output.dir` is non-empty
/// - `watch.debounce_ms >= 1`
///
/// Failures here are fatal: the process refuses to run any task with a
/// malformed configuration rather than silently producing nothing.
pub fn validate_config(cfg: &ConfigFile) -> Result<()> {
    validate_source(cfg)?;
    validate_output(cfg)?;
    validate_watch(cfg)?;
    warn_deprecated(cfg);
    Ok(())
}

fn validate_source(cfg: &ConfigFile) -> Result<()> {
    if cfg.source.pattern.trim().is_empty() {
        return Err(BuildError::Config(
            "[source].pattern must not be empty".to_string(),
        ));
    }

    // Fail loudly on a malformed pattern instead of matching nothing.
    Glob::new(&cfg.source.pattern)?;
    Ok(())
}

fn validate_output(cfg: &ConfigFile) -> Result<()> {
    if cfg.output.file.trim().is_empty() {
        return Err(BuildError::Config(
            "[output].file must not be empty".to_string(),
        ));
    }
    if cfg.output.file.contains('/') || cfg.output.file.contains('\\') {
        return Err(BuildError::Config(format!(
            "[output].file must be a bare file name, got '{}'",
            cfg.output.file
        )));
    }
    if cfg.output.dir.trim().is_empty() {
        return Err(BuildError::Config(
            "[output].dir must not be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_watch(cfg: &ConfigFile) -> Result<()> {
    if cfg.watch.debounce_ms == 0 {
        return Err(BuildError::Config(
            "[watch].debounce_ms must be >= 1 (got 0)".to_string(),
        ));
    }
    Ok(())
}

fn warn_deprecated(cfg: &ConfigFile) {
    if cfg.output.path_file.is_some() {
        warn!("[output].path_file is deprecated and ignored");
    }
    if cfg.output.path_file_css.is_some() {
        warn!("[output].path_file_css is deprecated and ignored");
    }
}
