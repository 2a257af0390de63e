// src/less/mod.rs

//! Style-language compilation.
//!
//! This module compiles the LESS subset the pipeline accepts into plain
//! stylesheet rules:
//! - `//` and `/* */` comments
//! - `@name: value;` variable declarations with lexical scoping
//! - `@name` / `@{name}` references in values and at-rule parameters
//! - nested rules with selector combination and `&` parent references
//! - at-rules with blocks (`@media`, `@supports`, ...) containing rules
//! - statement at-rules (`@charset`, `@import`, ...) passed through verbatim
//!
//! `@import` is *not* resolved; it is emitted as-is. Compilation is the only
//! pipeline step expected to reject malformed input, and it does so with
//! `BuildError::Compile` carrying file, line and column.

pub mod ast;
pub mod eval;
pub mod parser;

pub use ast::{Node, Pos};
pub use eval::eval;
pub use parser::parse;

use crate::css::CssDocument;
use crate::errors::Result;

/// Compile one source file into a flat stylesheet document.
pub fn compile(file: &str, contents: &str) -> Result<CssDocument> {
    let nodes = parse(contents, file)?;
    eval(&nodes, file)
}
