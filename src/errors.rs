// src/errors.rs

//! Crate-wide error taxonomy.
//!
//! Build-time errors (`Compile`, `Filesystem`) abort the current pipeline run
//! only; configuration errors (`Config`, `Glob`, `Toml`) are fatal at startup
//! and prevent any task from running.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BuildError {
    /// Malformed style-language input. Carries the source location.
    #[error("{file}:{line}:{column}: {message}")]
    Compile {
        file: String,
        line: u32,
        column: u32,
        message: String,
    },

    /// Unreadable source or unwritable destination.
    #[error("filesystem error at {path}: {source}")]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Invalid configuration supplied at startup.
    #[error("configuration error: {0}")]
    Config(String),

    /// Malformed glob pattern.
    #[error("invalid glob pattern: {0}")]
    Glob(#[from] globset::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("file watcher error: {0}")]
    Watch(#[from] notify::Error),

    #[error("source map serialization error: {0}")]
    SourceMap(#[from] serde_json::Error),
}

impl BuildError {
    /// Build a `Compile` error from a 1-based line and 0-based column.
    pub fn compile(file: &str, line: u32, column: u32, message: impl Into<String>) -> Self {
        BuildError::Compile {
            file: file.to_string(),
            line,
            column,
            message: message.into(),
        }
    }

    pub fn fs(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        BuildError::Filesystem {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, BuildError>;
