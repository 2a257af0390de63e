// src/pipeline/minify.rs

//! Whitespace-stripping step. Present but disabled in the reference
//! configuration; toggled via `[steps].minify`.

use crate::css::{MappedLine, Segment};

/// Collapse the rendered lines into a single output line, dropping
/// indentation and re-basing every source-map segment onto its new column.
pub fn collapse(lines: Vec<MappedLine>) -> Vec<MappedLine> {
    let mut text = String::new();
    let mut segments: Vec<Segment> = Vec::new();

    for line in &lines {
        let trimmed = line.text.trim_start();
        let removed = (line.text.len() - trimmed.len()) as u32;
        let base = text.len() as u32;
        for seg in &line.segments {
            segments.push(Segment {
                gen_column: base + seg.gen_column.saturating_sub(removed),
                origin: seg.origin,
            });
        }
        text.push_str(trimmed);
    }

    vec![MappedLine { text, segments }]
}
