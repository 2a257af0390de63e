// src/pipeline/mod.rs

//! The build pipeline.
//!
//! One invocation runs the steps in fixed order: resolve sources, compile,
//! concatenate, vendor-prefix, minify (if enabled), finalize the source map
//! and write the artifact. All transforms happen in memory and the
//! filesystem write is the final step, so a failed run never leaves a
//! partial artifact and never clobbers a prior good one.

pub mod minify;
pub mod reload;
pub mod sources;

pub use reload::{LogReloadHook, ReloadHook};
pub use sources::resolve_sources;

use std::path::PathBuf;
use std::sync::Arc;

use globset::{Glob, GlobSet, GlobSetBuilder};
use tracing::{debug, info};

use crate::config::ConfigFile;
use crate::css::{self, MappedLine};
use crate::errors::{BuildError, Result};
use crate::less;
use crate::srcmap::{self, SourceMap};

/// Toggleable pipeline steps, in the order they apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    Minify,
    LiveReload,
}

/// One optional step with its explicit on/off flag, so toggling behaviour is
/// configuration rather than source edits.
#[derive(Debug, Clone, Copy)]
pub struct PostStep {
    pub kind: StepKind,
    pub enabled: bool,
}

/// Everything a build invocation needs. Constructed once at startup from the
/// validated configuration and never mutated.
pub struct BuildContext {
    /// Project root: the directory containing the config file. Source
    /// patterns and the output directory are resolved against it.
    pub root: PathBuf,
    pub config: ConfigFile,
    /// Compiled `source.pattern`.
    pub matcher: GlobSet,
    /// Optional steps in application order.
    pub steps: Vec<PostStep>,
    reload: Arc<dyn ReloadHook>,
}

impl BuildContext {
    pub fn new(root: impl Into<PathBuf>, config: ConfigFile) -> Result<Self> {
        let mut builder = GlobSetBuilder::new();
        builder.add(Glob::new(&config.source.pattern)?);
        let matcher = builder.build()?;

        let steps = vec![
            PostStep {
                kind: StepKind::Minify,
                enabled: config.steps.minify,
            },
            PostStep {
                kind: StepKind::LiveReload,
                enabled: config.steps.live_reload,
            },
        ];

        Ok(Self {
            root: root.into(),
            config,
            matcher,
            steps,
            reload: Arc::new(LogReloadHook),
        })
    }

    /// Replace the live-reload hook (tests, alternative transports).
    pub fn with_reload_hook(mut self, hook: Arc<dyn ReloadHook>) -> Self {
        self.reload = hook;
        self
    }

    pub fn step_enabled(&self, kind: StepKind) -> bool {
        self.steps
            .iter()
            .any(|step| step.kind == kind && step.enabled)
    }

    pub fn output_dir(&self) -> PathBuf {
        self.root.join(&self.config.output.dir)
    }
}

/// One source file's root-relative name (forward slashes) and contents.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub name: String,
    pub contents: String,
}

/// In-memory build product, before the write step.
#[derive(Debug, Clone)]
pub struct Artifact {
    pub css: String,
    pub map: SourceMap,
}

/// Outcome of a successful build, for logging and the watch loop.
#[derive(Debug, Clone)]
pub struct BuildReport {
    pub source_count: usize,
    pub css_path: PathBuf,
    pub map_path: PathBuf,
}

/// Pure core of the pipeline: compile, concatenate, prefix, optionally
/// minify, and finalize the source map. No filesystem access.
pub fn compile_sources(files: &[SourceFile], merged_name: &str, minify_on: bool) -> Result<Artifact> {
    let mut lines: Vec<MappedLine> = Vec::new();

    for (index, file) in files.iter().enumerate() {
        let mut doc = less::compile(&file.name, &file.contents)?;
        css::prefix_document(&mut doc);
        css::render(&doc, index, &mut lines);
    }

    if minify_on {
        lines = minify::collapse(lines);
    }

    let map = srcmap::build(
        merged_name,
        files.iter().map(|f| f.name.clone()).collect(),
        files.iter().map(|f| f.contents.clone()).collect(),
        &lines,
    );

    let mut text = String::new();
    for line in &lines {
        text.push_str(&line.text);
        text.push('\n');
    }
    text.push_str(&format!("/*# sourceMappingURL={merged_name}.map */\n"));

    Ok(Artifact { css: text, map })
}

/// Run the whole pipeline once: produce exactly one build artifact or fail.
pub async fn run_build(ctx: &BuildContext) -> Result<BuildReport> {
    let rel_paths = resolve_sources(&ctx.root, &ctx.matcher)?;

    let mut files = Vec::with_capacity(rel_paths.len());
    for rel in &rel_paths {
        let abs = ctx.root.join(rel);
        let contents = tokio::fs::read_to_string(&abs)
            .await
            .map_err(|e| BuildError::fs(&abs, e))?;
        files.push(SourceFile {
            name: rel.to_string_lossy().replace('\\', "/"),
            contents,
        });
    }

    let merged_name = ctx.config.output.file.as_str();
    let artifact = compile_sources(&files, merged_name, ctx.step_enabled(StepKind::Minify))?;
    let map_json = serde_json::to_string(&artifact.map)?;

    let out_dir = ctx.output_dir();
    tokio::fs::create_dir_all(&out_dir)
        .await
        .map_err(|e| BuildError::fs(&out_dir, e))?;

    let css_path = out_dir.join(merged_name);
    let map_path = out_dir.join(format!("{merged_name}.map"));
    tokio::fs::write(&css_path, artifact.css.as_bytes())
        .await
        .map_err(|e| BuildError::fs(&css_path, e))?;
    tokio::fs::write(&map_path, map_json.as_bytes())
        .await
        .map_err(|e| BuildError::fs(&map_path, e))?;

    let report = BuildReport {
        source_count: files.len(),
        css_path,
        map_path,
    };
    info!(
        sources = report.source_count,
        css = ?report.css_path,
        "build complete"
    );

    if ctx.step_enabled(StepKind::LiveReload) {
        debug!("live-reload step enabled, invoking hook");
        ctx.reload.artifact_written(&report);
    }

    Ok(report)
}
