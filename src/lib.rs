// src/lib.rs

pub mod cli;
pub mod config;
pub mod css;
pub mod errors;
pub mod less;
pub mod logging;
pub mod pipeline;
pub mod srcmap;
pub mod watch;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::info;

use crate::cli::CliArgs;
use crate::config::load_and_validate;
use crate::pipeline::{BuildContext, PostStep, StepKind};
use crate::watch::{PipelineRunner, Supervisor, SupervisorEvent};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - the build pipeline (default task: build once)
/// - the watch supervisor (`--watch`)
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let config_path = PathBuf::from(&args.config);
    let cfg = load_and_validate(&config_path)?;

    let root = config_root_dir(&config_path);
    let ctx = BuildContext::new(root, cfg)?;

    if args.dry_run {
        print_dry_run(&ctx)?;
        return Ok(());
    }

    if !args.watch {
        // Default task: one build, surfaced to the invoker on failure.
        pipeline::run_build(&ctx).await?;
        return Ok(());
    }

    // Watch task: runs until the process is terminated. Build failures are
    // logged by the runner and never stop the supervisor.
    let debounce = Duration::from_millis(ctx.config.watch.debounce_ms);
    let (events_tx, events_rx) = mpsc::channel::<SupervisorEvent>(64);

    let _watcher_handle = watch::spawn_watcher(
        ctx.root.clone(),
        ctx.matcher.clone(),
        ctx.output_dir(),
        events_tx.clone(),
    )?;

    // Ctrl-C -> graceful shutdown.
    {
        let tx = events_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            let _ = tx.send(SupervisorEvent::ShutdownRequested).await;
        });
    }

    info!(pattern = %ctx.config.source.pattern, "watching for changes");

    let runner = PipelineRunner::new(Arc::new(ctx));
    Supervisor::new(runner, debounce, events_rx, events_tx)
        .run()
        .await
}

/// Figure out a sensible project root.
/// Currently: directory containing the config file, or `.`.
fn config_root_dir(config_path: &Path) -> PathBuf {
    config_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Simple dry-run output: print the resolved configuration and source set.
fn print_dry_run(ctx: &BuildContext) -> Result<()> {
    println!("stylepipe dry-run");
    println!("  source.pattern = {}", ctx.config.source.pattern);
    println!("  output.file = {}", ctx.config.output.file);
    println!("  output.dir = {}", ctx.config.output.dir);
    for PostStep { kind, enabled } in &ctx.steps {
        let name = match kind {
            StepKind::Minify => "minify",
            StepKind::LiveReload => "live_reload",
        };
        println!("  steps.{name} = {enabled}");
    }
    println!();

    let files = pipeline::resolve_sources(&ctx.root, &ctx.matcher)?;
    println!("sources ({}):", files.len());
    for file in &files {
        println!("  - {}", file.display());
    }

    Ok(())
}
