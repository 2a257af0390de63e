// src/watch/mod.rs

//! File watching and rebuild supervision.
//!
//! This module is responsible for:
//! - Wiring up a cross-platform filesystem watcher (`notify`).
//! - Turning change events on matching paths into rebuild triggers.
//! - Debouncing event bursts and serializing builds so at most one build
//!   writes the artifact at any instant, with at most one pending rerun.
//!
//! It does **not** know how a build works; it drives a [`BuildRunner`].

pub mod supervisor;
pub mod watcher;

pub use supervisor::{BuildRunner, PipelineRunner, Supervisor, SupervisorEvent};
pub use watcher::{spawn_watcher, WatcherHandle};
