// src/less/ast.rs

/// Position in a source file: 1-based line, 0-based column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pos {
    pub line: u32,
    pub column: u32,
}

/// One parsed item of a source file or rule body.
#[derive(Debug, Clone)]
pub enum Node {
    /// `@name: value;`
    VarDecl {
        name: String,
        value: String,
        pos: Pos,
    },

    /// `prop: value;`
    Decl {
        prop: String,
        value: String,
        pos: Pos,
    },

    /// `selector, selector { ... }` with a possibly nested body.
    Rule {
        selectors: Vec<String>,
        body: Vec<Node>,
        pos: Pos,
    },

    /// `@name params { ... }` (body `Some`) or `@name params;` (body `None`).
    AtRule {
        name: String,
        params: String,
        body: Option<Vec<Node>>,
        pos: Pos,
    },
}
