// src/less/eval.rs

//! Flattens parsed nodes into plain stylesheet items: nesting is combined
//! into full selectors, `&` is replaced by the parent selector and variable
//! references are resolved against lexical scopes.

use std::collections::HashMap;

use crate::css::{CssDecl, CssDocument, CssItem, CssRule};
use crate::errors::{BuildError, Result};

use super::ast::{Node, Pos};

/// Evaluate the top-level nodes of one source file.
pub fn eval(nodes: &[Node], file: &str) -> Result<CssDocument> {
    let mut scope = Scope::new();
    let (loose, items) = eval_items(nodes, &[], &mut scope, file)?;
    if let Some(decl) = loose.first() {
        return Err(BuildError::compile(
            file,
            decl.pos.line,
            decl.pos.column,
            format!("property '{}' declared outside of a rule", decl.prop),
        ));
    }
    Ok(CssDocument { items })
}

/// Lexical variable scopes. Inner frames shadow outer ones; definitions are
/// visible to items that follow them, in source order.
struct Scope {
    frames: Vec<HashMap<String, String>>,
}

impl Scope {
    fn new() -> Self {
        Self {
            frames: vec![HashMap::new()],
        }
    }

    fn push(&mut self) {
        self.frames.push(HashMap::new());
    }

    fn pop(&mut self) {
        self.frames.pop();
    }

    fn define(&mut self, name: &str, value: String) {
        if let Some(frame) = self.frames.last_mut() {
            frame.insert(name.to_string(), value);
        }
    }

    fn lookup(&self, name: &str) -> Option<&str> {
        self.frames
            .iter()
            .rev()
            .find_map(|frame| frame.get(name).map(|v| v.as_str()))
    }
}

/// Evaluate a block body. Returns the loose declarations found directly in
/// the block plus the flattened items produced by nested rules/at-rules.
fn eval_items(
    nodes: &[Node],
    parents: &[String],
    scope: &mut Scope,
    file: &str,
) -> Result<(Vec<CssDecl>, Vec<CssItem>)> {
    scope.push();
    let mut decls = Vec::new();
    let mut items = Vec::new();

    for node in nodes {
        match node {
            Node::VarDecl { name, value, pos } => {
                let value = substitute(value, scope, file, *pos)?;
                scope.define(name, value);
            }
            Node::Decl { prop, value, pos } => {
                decls.push(CssDecl {
                    prop: prop.clone(),
                    value: substitute(value, scope, file, *pos)?,
                    pos: *pos,
                });
            }
            Node::Rule {
                selectors,
                body,
                pos,
            } => {
                let combined = combine_selectors(parents, selectors, file, *pos)?;
                let (rule_decls, nested) = eval_items(body, &combined, scope, file)?;
                // Parent rule first, then its nested rules; empty rules
                // are dropped, as the reference compiler does.
                if !rule_decls.is_empty() {
                    items.push(CssItem::Rule(CssRule {
                        selectors: combined,
                        decls: rule_decls,
                        pos: *pos,
                    }));
                }
                items.extend(nested);
            }
            Node::AtRule {
                name,
                params,
                body: Some(body),
                pos,
            } => {
                let params = substitute(params, scope, file, *pos)?;
                let (loose, inner) = eval_items(body, parents, scope, file)?;
                let mut at_items = Vec::new();
                if !loose.is_empty() {
                    if parents.is_empty() {
                        let p = loose[0].pos;
                        return Err(BuildError::compile(
                            file,
                            p.line,
                            p.column,
                            format!("declaration inside '@{name}' must be wrapped in a rule"),
                        ));
                    }
                    at_items.push(CssItem::Rule(CssRule {
                        selectors: parents.to_vec(),
                        decls: loose,
                        pos: *pos,
                    }));
                }
                at_items.extend(inner);
                items.push(CssItem::AtRule {
                    name: name.clone(),
                    params,
                    items: at_items,
                    pos: *pos,
                });
            }
            Node::AtRule {
                name,
                params,
                body: None,
                pos,
            } => {
                let params = substitute(params, scope, file, *pos)?;
                let text = if params.is_empty() {
                    format!("@{name};")
                } else {
                    format!("@{name} {params};")
                };
                items.push(CssItem::Statement { text, pos: *pos });
            }
        }
    }

    scope.pop();
    Ok((decls, items))
}

/// Combine nested selectors with their parent selectors: `&` splices the
/// parent in place, otherwise the parent is prepended as an ancestor.
fn combine_selectors(
    parents: &[String],
    children: &[String],
    file: &str,
    pos: Pos,
) -> Result<Vec<String>> {
    if parents.is_empty() {
        for child in children {
            if child.contains('&') {
                return Err(BuildError::compile(
                    file,
                    pos.line,
                    pos.column,
                    "'&' has no parent selector at the top level",
                ));
            }
        }
        return Ok(children.to_vec());
    }

    let mut out = Vec::with_capacity(parents.len() * children.len());
    for parent in parents {
        for child in children {
            if child.contains('&') {
                out.push(child.replace('&', parent));
            } else {
                out.push(format!("{parent} {child}"));
            }
        }
    }
    Ok(out)
}

/// Replace `@name` and `@{name}` references with their scoped values.
/// Quoted segments are copied verbatim.
fn substitute(input: &str, scope: &Scope, file: &str, pos: Pos) -> Result<String> {
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len());
    let mut quote: Option<char> = None;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if let Some(q) = quote {
            out.push(c);
            if c == '\\' {
                if let Some(&escaped) = chars.get(i + 1) {
                    out.push(escaped);
                    i += 2;
                    continue;
                }
            } else if c == q {
                quote = None;
            }
            i += 1;
            continue;
        }
        match c {
            '"' | '\'' => {
                quote = Some(c);
                out.push(c);
                i += 1;
            }
            '@' if chars.get(i + 1) == Some(&'{') => {
                let mut j = i + 2;
                let mut name = String::new();
                while j < chars.len() && chars[j] != '}' {
                    name.push(chars[j]);
                    j += 1;
                }
                if j >= chars.len() {
                    return Err(BuildError::compile(
                        file,
                        pos.line,
                        pos.column,
                        "unclosed '@{' interpolation",
                    ));
                }
                out.push_str(lookup(scope, name.trim(), file, pos)?);
                i = j + 1;
            }
            '@' if chars.get(i + 1).is_some_and(|c| c.is_alphabetic() || *c == '_') => {
                let mut j = i + 1;
                let mut name = String::new();
                while j < chars.len()
                    && (chars[j].is_alphanumeric() || chars[j] == '-' || chars[j] == '_')
                {
                    name.push(chars[j]);
                    j += 1;
                }
                out.push_str(lookup(scope, &name, file, pos)?);
                i = j;
            }
            _ => {
                out.push(c);
                i += 1;
            }
        }
    }
    Ok(out)
}

fn lookup<'a>(scope: &'a Scope, name: &str, file: &str, pos: Pos) -> Result<&'a str> {
    scope.lookup(name).ok_or_else(|| {
        BuildError::compile(
            file,
            pos.line,
            pos.column,
            format!("variable '@{name}' is undefined"),
        )
    })
}

#[cfg(test)]
mod tests {
    use crate::css::CssItem;
    use crate::less;

    fn rule_selectors(item: &CssItem) -> Vec<String> {
        match item {
            CssItem::Rule(rule) => rule.selectors.clone(),
            other => panic!("expected rule, got {other:?}"),
        }
    }

    #[test]
    fn variables_resolve_with_shadowing() {
        let doc = less::compile(
            "a.less",
            "@c: red;\n.a { color: @c; }\n.b { @c: blue; color: @c; }",
        )
        .unwrap();
        match (&doc.items[0], &doc.items[1]) {
            (CssItem::Rule(a), CssItem::Rule(b)) => {
                assert_eq!(a.decls[0].value, "red");
                assert_eq!(b.decls[0].value, "blue");
            }
            other => panic!("expected two rules, got {other:?}"),
        }
    }

    #[test]
    fn undefined_variable_is_a_compile_error() {
        let err = less::compile("a.less", ".a { color: @missing; }").unwrap_err();
        assert!(err.to_string().contains("'@missing' is undefined"));
    }

    #[test]
    fn nesting_flattens_with_parent_prepended() {
        let doc = less::compile("a.less", ".nav { color: red; .item { color: blue; } }").unwrap();
        assert_eq!(rule_selectors(&doc.items[0]), vec![".nav"]);
        assert_eq!(rule_selectors(&doc.items[1]), vec![".nav .item"]);
    }

    #[test]
    fn ampersand_splices_parent_selector() {
        let doc = less::compile("a.less", ".btn { &:hover { color: blue; } }").unwrap();
        assert_eq!(rule_selectors(&doc.items[0]), vec![".btn:hover"]);
    }

    #[test]
    fn selector_lists_multiply_out() {
        let doc = less::compile("a.less", ".x, .y { .z { color: red; } }").unwrap();
        assert_eq!(rule_selectors(&doc.items[0]), vec![".x .z", ".y .z"]);
    }

    #[test]
    fn media_block_keeps_rules_nested() {
        let doc = less::compile(
            "a.less",
            "@media (min-width: 700px) { .a { color: red; } }",
        )
        .unwrap();
        match &doc.items[0] {
            CssItem::AtRule {
                name,
                params,
                items,
                ..
            } => {
                assert_eq!(name, "media");
                assert_eq!(params, "(min-width: 700px)");
                assert_eq!(items.len(), 1);
            }
            other => panic!("expected at-rule, got {other:?}"),
        }
    }

    #[test]
    fn media_nested_in_rule_wraps_loose_declarations() {
        let doc = less::compile("a.less", ".a { @media print { color: black; } }").unwrap();
        match &doc.items[0] {
            CssItem::AtRule { items, .. } => {
                assert_eq!(rule_selectors(&items[0]), vec![".a"]);
            }
            other => panic!("expected at-rule, got {other:?}"),
        }
    }

    #[test]
    fn declaration_at_top_level_is_a_compile_error() {
        let err = less::compile("a.less", "color: red;").unwrap_err();
        assert!(err.to_string().contains("outside of a rule"));
    }

    #[test]
    fn empty_rules_are_dropped() {
        let doc = less::compile("a.less", ".a { }\n.b { color: red; }").unwrap();
        assert_eq!(doc.items.len(), 1);
        assert_eq!(rule_selectors(&doc.items[0]), vec![".b"]);
    }
}
