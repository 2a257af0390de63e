// src/less/parser.rs

use crate::errors::{BuildError, Result};

use super::ast::{Node, Pos};

/// Parse one source file into a list of top-level nodes.
pub fn parse(source: &str, file: &str) -> Result<Vec<Node>> {
    let mut s = Scanner::new(source);
    parse_block(&mut s, file, true)
}

/// Character scanner with 1-based line / 0-based column tracking.
struct Scanner {
    chars: Vec<char>,
    idx: usize,
    line: u32,
    column: u32,
}

impl Scanner {
    fn new(src: &str) -> Self {
        Self {
            chars: src.chars().collect(),
            idx: 0,
            line: 1,
            column: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.idx).copied()
    }

    fn peek2(&self) -> Option<char> {
        self.chars.get(self.idx + 1).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.idx += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 0;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn pos(&self) -> Pos {
        Pos {
            line: self.line,
            column: self.column,
        }
    }
}

/// What ended a prelude.
enum Term {
    /// `{` — consumed.
    OpenBrace,
    /// `;` — consumed.
    Semicolon,
    /// `}` — left in place for `parse_block` to consume.
    BlockEnd,
    Eof,
}

fn parse_block(s: &mut Scanner, file: &str, top_level: bool) -> Result<Vec<Node>> {
    let mut nodes = Vec::new();
    loop {
        skip_trivia(s, file)?;
        match s.peek() {
            None if top_level => return Ok(nodes),
            None => {
                let p = s.pos();
                return Err(BuildError::compile(
                    file,
                    p.line,
                    p.column,
                    "unexpected end of input, expected '}'",
                ));
            }
            Some('}') if top_level => {
                let p = s.pos();
                return Err(BuildError::compile(file, p.line, p.column, "unexpected '}'"));
            }
            Some('}') => {
                s.bump();
                return Ok(nodes);
            }
            Some(_) => {
                if let Some(node) = parse_item(s, file)? {
                    nodes.push(node);
                }
            }
        }
    }
}

fn parse_item(s: &mut Scanner, file: &str) -> Result<Option<Node>> {
    let pos = s.pos();
    let (prelude, term) = read_prelude(s, file)?;
    let text = collapse_ws(prelude.trim());

    match term {
        Term::OpenBrace => {
            let body = parse_block(s, file, false)?;
            if let Some(rest) = text.strip_prefix('@') {
                let (name, params) = split_at_ident(rest);
                if name.is_empty() {
                    return Err(BuildError::compile(
                        file,
                        pos.line,
                        pos.column,
                        "expected at-rule name after '@'",
                    ));
                }
                return Ok(Some(Node::AtRule {
                    name: name.to_string(),
                    params: params.trim().to_string(),
                    body: Some(body),
                    pos,
                }));
            }

            let selectors: Vec<String> = split_top_level(&text, ',')
                .into_iter()
                .map(|sel| sel.trim().to_string())
                .collect();
            if text.is_empty() || selectors.iter().any(|sel| sel.is_empty()) {
                return Err(BuildError::compile(
                    file,
                    pos.line,
                    pos.column,
                    "empty selector before '{'",
                ));
            }
            Ok(Some(Node::Rule {
                selectors,
                body,
                pos,
            }))
        }
        Term::Semicolon | Term::BlockEnd => {
            if text.is_empty() {
                // Stray ';' — tolerated, matches reference compilers.
                return Ok(None);
            }
            parse_statement(&text, pos, file).map(Some)
        }
        Term::Eof => {
            if text.is_empty() {
                return Ok(None);
            }
            Err(BuildError::compile(
                file,
                pos.line,
                pos.column,
                "unexpected end of input, expected ';' or '{'",
            ))
        }
    }
}

/// Parse a `;`-terminated item: variable declaration, statement at-rule or
/// property declaration.
fn parse_statement(text: &str, pos: Pos, file: &str) -> Result<Node> {
    if let Some(rest) = text.strip_prefix('@') {
        let (name, after) = split_at_ident(rest);
        if name.is_empty() {
            return Err(BuildError::compile(
                file,
                pos.line,
                pos.column,
                "expected name after '@'",
            ));
        }
        if let Some(value) = after.trim_start().strip_prefix(':') {
            let value = value.trim();
            if value.is_empty() {
                return Err(BuildError::compile(
                    file,
                    pos.line,
                    pos.column,
                    format!("variable '@{name}' has an empty value"),
                ));
            }
            return Ok(Node::VarDecl {
                name: name.to_string(),
                value: value.to_string(),
                pos,
            });
        }
        return Ok(Node::AtRule {
            name: name.to_string(),
            params: after.trim().to_string(),
            body: None,
            pos,
        });
    }

    let Some(colon) = find_top_level(text, ':') else {
        return Err(BuildError::compile(
            file,
            pos.line,
            pos.column,
            format!("expected ':' in declaration '{text}'"),
        ));
    };
    let prop = text[..colon].trim();
    let value = text[colon + 1..].trim();
    if prop.is_empty() {
        return Err(BuildError::compile(
            file,
            pos.line,
            pos.column,
            "missing property name before ':'",
        ));
    }
    if value.is_empty() {
        return Err(BuildError::compile(
            file,
            pos.line,
            pos.column,
            format!("missing value for property '{prop}'"),
        ));
    }
    Ok(Node::Decl {
        prop: prop.to_string(),
        value: value.to_string(),
        pos,
    })
}

/// Read raw text until a top-level `{`, `;`, `}` or end of input, skipping
/// comments and keeping strings intact. Parentheses guard the terminators so
/// `url(a;b)` and `//` inside URLs don't cut the prelude short.
fn read_prelude(s: &mut Scanner, file: &str) -> Result<(String, Term)> {
    let mut out = String::new();
    let mut depth = 0usize;

    loop {
        let Some(c) = s.peek() else {
            return Ok((out, Term::Eof));
        };
        match c {
            '{' if depth == 0 => {
                s.bump();
                return Ok((out, Term::OpenBrace));
            }
            ';' if depth == 0 => {
                s.bump();
                return Ok((out, Term::Semicolon));
            }
            '}' if depth == 0 => return Ok((out, Term::BlockEnd)),
            '(' => {
                depth += 1;
                out.push(c);
                s.bump();
            }
            ')' => {
                depth = depth.saturating_sub(1);
                out.push(c);
                s.bump();
            }
            '"' | '\'' => read_string(s, file, &mut out)?,
            '/' if depth == 0 && s.peek2() == Some('*') => {
                skip_block_comment(s, file)?;
                out.push(' ');
            }
            '/' if depth == 0 && s.peek2() == Some('/') => {
                skip_line_comment(s);
            }
            _ => {
                out.push(c);
                s.bump();
            }
        }
    }
}

fn read_string(s: &mut Scanner, file: &str, out: &mut String) -> Result<()> {
    let start = s.pos();
    let quote = match s.bump() {
        Some(q) => q,
        None => return Ok(()),
    };
    out.push(quote);
    loop {
        match s.bump() {
            None | Some('\n') => {
                return Err(BuildError::compile(
                    file,
                    start.line,
                    start.column,
                    "unterminated string",
                ));
            }
            Some('\\') => {
                out.push('\\');
                if let Some(escaped) = s.bump() {
                    out.push(escaped);
                }
            }
            Some(c) => {
                out.push(c);
                if c == quote {
                    return Ok(());
                }
            }
        }
    }
}

/// Skip whitespace and comments between items.
fn skip_trivia(s: &mut Scanner, file: &str) -> Result<()> {
    loop {
        match s.peek() {
            Some(c) if c.is_whitespace() => {
                s.bump();
            }
            Some('/') if s.peek2() == Some('*') => skip_block_comment(s, file)?,
            Some('/') if s.peek2() == Some('/') => skip_line_comment(s),
            _ => return Ok(()),
        }
    }
}

fn skip_block_comment(s: &mut Scanner, file: &str) -> Result<()> {
    let start = s.pos();
    s.bump(); // '/'
    s.bump(); // '*'
    loop {
        match s.bump() {
            None => {
                return Err(BuildError::compile(
                    file,
                    start.line,
                    start.column,
                    "unclosed comment",
                ));
            }
            Some('*') if s.peek() == Some('/') => {
                s.bump();
                return Ok(());
            }
            Some(_) => {}
        }
    }
}

fn skip_line_comment(s: &mut Scanner) {
    while let Some(c) = s.peek() {
        if c == '\n' {
            return;
        }
        s.bump();
    }
}

/// Collapse whitespace runs outside of strings into single spaces.
fn collapse_ws(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut quote: Option<char> = None;
    let mut in_ws = false;
    for c in text.chars() {
        if let Some(q) = quote {
            out.push(c);
            if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => {
                quote = Some(c);
                in_ws = false;
                out.push(c);
            }
            c if c.is_whitespace() => {
                if !in_ws {
                    out.push(' ');
                    in_ws = true;
                }
            }
            c => {
                in_ws = false;
                out.push(c);
            }
        }
    }
    out
}

/// Split `text` on `sep` occurrences outside parentheses and strings.
fn split_top_level(text: &str, sep: char) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    for c in text.chars() {
        if let Some(q) = quote {
            current.push(c);
            if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => {
                quote = Some(c);
                current.push(c);
            }
            '(' => {
                depth += 1;
                current.push(c);
            }
            ')' => {
                depth = depth.saturating_sub(1);
                current.push(c);
            }
            c if c == sep && depth == 0 => {
                parts.push(std::mem::take(&mut current));
            }
            c => current.push(c),
        }
    }
    parts.push(current);
    parts
}

/// Index of the first `target` outside parentheses and strings, if any.
fn find_top_level(text: &str, target: char) -> Option<usize> {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    for (i, c) in text.char_indices() {
        if let Some(q) = quote {
            if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => quote = Some(c),
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            c if c == target && depth == 0 => return Some(i),
            _ => {}
        }
    }
    None
}

/// Split an at-rule ident off the front of `rest` (text after the `@`).
fn split_at_ident(rest: &str) -> (&str, &str) {
    let end = rest
        .char_indices()
        .find(|(_, c)| !(c.is_alphanumeric() || *c == '-' || *c == '_'))
        .map(|(i, _)| i)
        .unwrap_or(rest.len());
    (&rest[..end], &rest[end..])
}
