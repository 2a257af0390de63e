// src/css/mod.rs

//! Plain stylesheet document model and rendering.
//!
//! Compiled documents keep a source position on every rule and declaration
//! so the renderer can thread origin information through to the source map.

pub mod prefix;

pub use prefix::prefix_document;

use crate::less::ast::Pos;

/// A flat stylesheet document, as produced by compilation.
#[derive(Debug, Clone, Default)]
pub struct CssDocument {
    pub items: Vec<CssItem>,
}

#[derive(Debug, Clone)]
pub enum CssItem {
    Rule(CssRule),
    /// `@media`, `@supports`, ... with nested items.
    AtRule {
        name: String,
        params: String,
        items: Vec<CssItem>,
        pos: Pos,
    },
    /// Statement at-rule passed through verbatim, e.g. `@charset "utf-8";`.
    Statement { text: String, pos: Pos },
}

#[derive(Debug, Clone)]
pub struct CssRule {
    pub selectors: Vec<String>,
    pub decls: Vec<CssDecl>,
    pub pos: Pos,
}

#[derive(Debug, Clone)]
pub struct CssDecl {
    pub prop: String,
    pub value: String,
    pub pos: Pos,
}

/// Where a generated chunk came from: source index into the merged source
/// list, 0-based line, 0-based column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Origin {
    pub source: usize,
    pub line: u32,
    pub column: u32,
}

/// One generated output line plus its source-map segments, ordered by
/// generated column.
#[derive(Debug, Clone)]
pub struct MappedLine {
    pub text: String,
    pub segments: Vec<Segment>,
}

#[derive(Debug, Clone, Copy)]
pub struct Segment {
    pub gen_column: u32,
    pub origin: Origin,
}

/// Render a document into mapped output lines, appending to `out`.
///
/// `source` is the index of this document's file in the merged source list;
/// concatenation is just successive calls with increasing indices.
pub fn render(doc: &CssDocument, source: usize, out: &mut Vec<MappedLine>) {
    for item in &doc.items {
        render_item(item, source, 0, out);
    }
}

fn render_item(item: &CssItem, source: usize, indent: usize, out: &mut Vec<MappedLine>) {
    let pad = "  ".repeat(indent);
    match item {
        CssItem::Statement { text, pos } => {
            out.push(mapped_line(format!("{pad}{text}"), pad.len(), source, *pos));
        }
        CssItem::Rule(rule) => {
            let last = rule.selectors.len().saturating_sub(1);
            for (i, sel) in rule.selectors.iter().enumerate() {
                let suffix = if i == last { " {" } else { "," };
                out.push(mapped_line(
                    format!("{pad}{sel}{suffix}"),
                    pad.len(),
                    source,
                    rule.pos,
                ));
            }
            for decl in &rule.decls {
                out.push(mapped_line(
                    format!("{pad}  {}: {};", decl.prop, decl.value),
                    pad.len() + 2,
                    source,
                    decl.pos,
                ));
            }
            out.push(mapped_line(format!("{pad}}}"), pad.len(), source, rule.pos));
        }
        CssItem::AtRule {
            name,
            params,
            items,
            pos,
        } => {
            let header = if params.is_empty() {
                format!("{pad}@{name} {{")
            } else {
                format!("{pad}@{name} {params} {{")
            };
            out.push(mapped_line(header, pad.len(), source, *pos));
            for inner in items {
                render_item(inner, source, indent + 1, out);
            }
            out.push(mapped_line(format!("{pad}}}"), pad.len(), source, *pos));
        }
    }
}

fn mapped_line(text: String, gen_column: usize, source: usize, pos: Pos) -> MappedLine {
    MappedLine {
        text,
        segments: vec![Segment {
            gen_column: gen_column as u32,
            origin: Origin {
                source,
                // Pos lines are 1-based; source maps are 0-based.
                line: pos.line.saturating_sub(1),
                column: pos.column,
            },
        }],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::less;

    fn render_to_text(src: &str) -> String {
        let doc = less::compile("a.less", src).unwrap();
        let mut lines = Vec::new();
        render(&doc, 0, &mut lines);
        lines
            .iter()
            .map(|l| l.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn rules_render_with_two_space_indent() {
        let text = render_to_text(".a { color: red; }");
        assert_eq!(text, ".a {\n  color: red;\n}");
    }

    #[test]
    fn selector_lists_render_one_per_line() {
        let text = render_to_text(".a, .b { color: red; }");
        assert_eq!(text, ".a,\n.b {\n  color: red;\n}");
    }

    #[test]
    fn at_rules_indent_nested_rules() {
        let text = render_to_text("@media print { .a { color: black; } }");
        assert_eq!(text, "@media print {\n  .a {\n    color: black;\n  }\n}");
    }

    #[test]
    fn every_line_carries_an_origin() {
        let doc = less::compile("a.less", ".a { color: red; }").unwrap();
        let mut lines = Vec::new();
        render(&doc, 3, &mut lines);
        assert!(lines.iter().all(|l| !l.segments.is_empty()));
        assert!(lines.iter().all(|l| l.segments[0].origin.source == 3));
    }
}
