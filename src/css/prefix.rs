// src/css/prefix.rs

//! Vendor prefixing against a static compatibility table.
//!
//! Prefixed declarations are inserted immediately before the unprefixed one,
//! in the same rule block, carrying the same source position. Rule ordering
//! never changes, and input that is already prefixed is left alone.

use super::{CssDecl, CssDocument, CssItem, CssRule};

/// Properties that need vendor-prefixed property names.
const PROPERTY_PREFIXES: &[(&str, &[&str])] = &[
    ("appearance", &["-webkit-", "-moz-"]),
    ("backdrop-filter", &["-webkit-"]),
    ("box-decoration-break", &["-webkit-"]),
    ("clip-path", &["-webkit-"]),
    ("mask", &["-webkit-"]),
    ("tab-size", &["-moz-"]),
    ("text-size-adjust", &["-webkit-", "-moz-", "-ms-"]),
    ("user-select", &["-webkit-", "-moz-", "-ms-"]),
];

/// Values that need vendor-prefixed variants for a given property.
const VALUE_PREFIXES: &[(&str, &str, &[&str])] = &[
    ("display", "flex", &["-webkit-flex", "-ms-flexbox"]),
    (
        "display",
        "inline-flex",
        &["-webkit-inline-flex", "-ms-inline-flexbox"],
    ),
    ("position", "sticky", &["-webkit-sticky"]),
    ("width", "fit-content", &["-moz-fit-content"]),
    ("width", "max-content", &["-moz-max-content"]),
    ("width", "min-content", &["-moz-min-content"]),
];

/// Rewrite all rules in the document, recursing into at-rules.
pub fn prefix_document(doc: &mut CssDocument) {
    for item in &mut doc.items {
        prefix_item(item);
    }
}

fn prefix_item(item: &mut CssItem) {
    match item {
        CssItem::Rule(rule) => prefix_rule(rule),
        CssItem::AtRule { items, .. } => {
            for inner in items {
                prefix_item(inner);
            }
        }
        CssItem::Statement { .. } => {}
    }
}

fn prefix_rule(rule: &mut CssRule) {
    // Hand-written prefixed declarations anywhere in the rule suppress the
    // matching generated variant.
    let existing_props: Vec<String> = rule.decls.iter().map(|d| d.prop.clone()).collect();
    let existing_pairs: Vec<(String, String)> = rule
        .decls
        .iter()
        .map(|d| (d.prop.clone(), d.value.clone()))
        .collect();

    let mut out = Vec::with_capacity(rule.decls.len());
    for decl in rule.decls.drain(..) {
        if !decl.prop.starts_with('-') && !decl.value.starts_with('-') {
            for prefixed in property_variants(&decl) {
                if !existing_props.iter().any(|p| *p == prefixed.prop) {
                    out.push(prefixed);
                }
            }
            for prefixed in value_variants(&decl) {
                if !existing_pairs
                    .iter()
                    .any(|(p, v)| *p == prefixed.prop && *v == prefixed.value)
                {
                    out.push(prefixed);
                }
            }
        }
        out.push(decl);
    }
    rule.decls = out;
}

fn property_variants(decl: &CssDecl) -> Vec<CssDecl> {
    PROPERTY_PREFIXES
        .iter()
        .find(|(prop, _)| *prop == decl.prop)
        .map(|(_, prefixes)| {
            prefixes
                .iter()
                .map(|pre| CssDecl {
                    prop: format!("{pre}{}", decl.prop),
                    value: decl.value.clone(),
                    pos: decl.pos,
                })
                .collect()
        })
        .unwrap_or_default()
}

fn value_variants(decl: &CssDecl) -> Vec<CssDecl> {
    VALUE_PREFIXES
        .iter()
        .find(|(prop, value, _)| *prop == decl.prop && *value == decl.value)
        .map(|(_, _, values)| {
            values
                .iter()
                .map(|value| CssDecl {
                    prop: decl.prop.clone(),
                    value: value.to_string(),
                    pos: decl.pos,
                })
                .collect()
        })
        .unwrap_or_default()
}
