// src/config/mod.rs

//! Configuration loading and validation.
//!
//! The configuration is read once at startup from a TOML file and is
//! immutable for the process lifetime. See [`model::ConfigFile`] for the
//! schema.

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_from_path};
pub use model::{ConfigFile, OutputSection, SourceSection, StepsSection, WatchSection};
pub use validate::validate_config;
