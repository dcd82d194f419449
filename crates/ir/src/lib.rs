//! Syntax tree types consumed by the indexer and the analysis engine.
//!
//! The parser collaborator produces one [`FileSyntax`] per source file,
//! tagged with its [`FileRole`]. Nodes are immutable once built; every
//! analysis pass annotates them through side tables keyed by node id
//! instead of mutating the tree.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Role of a file within the application, as reported by the parser.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum FileRole {
    Controller,
    Model,
    Template,
    Routes,
    Config,
    Mixin,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Tagged node within a file's syntax tree.
pub struct SyntaxNode {
    /// Unique identifier of the node within its file, assigned in
    /// pre-order by [`FileSyntax::assign_ids`].
    #[serde(default)]
    pub id: usize,
    /// Logical tag of the node: "call", "lasgn", "dstr", etc.
    pub tag: String,
    /// Value associated with the node (identifier, literal, route data).
    pub value: JsonValue,
    /// Ordered children.
    pub children: Vec<SyntaxNode>,
    /// Source line the node starts on.
    pub line: usize,
}

impl SyntaxNode {
    pub fn new(
        tag: impl Into<String>,
        value: JsonValue,
        children: Vec<SyntaxNode>,
        line: usize,
    ) -> Self {
        Self {
            id: 0,
            tag: tag.into(),
            value,
            children,
            line,
        }
    }

    /// Node without children.
    pub fn leaf(tag: impl Into<String>, value: JsonValue, line: usize) -> Self {
        Self::new(tag, value, Vec::new(), line)
    }

    /// The node value as a string, if it is one.
    pub fn as_str(&self) -> Option<&str> {
        self.value.as_str()
    }

    pub fn child(&self, idx: usize) -> Option<&SyntaxNode> {
        self.children.get(idx)
    }

    /// Depth-first visit of the node and all descendants. The callback
    /// receives references tied to the tree, so visitors may collect them.
    pub fn walk<'a, F: FnMut(&'a SyntaxNode)>(&'a self, f: &mut F) {
        f(self);
        for c in &self.children {
            c.walk(f);
        }
    }

    /// Canonical single-line rendering, used in messages and excerpts.
    pub fn render(&self) -> String {
        self.render_with(false)
    }

    /// Rendering with string and numeric literals elided, used for the
    /// structural part of warning fingerprints so that fingerprints
    /// survive literal edits that do not change the expression shape.
    pub fn skeleton(&self) -> String {
        self.render_with(true)
    }

    fn render_with(&self, elide: bool) -> String {
        let val = || self.value.as_str().unwrap_or("").to_string();
        match self.tag.as_str() {
            "str" => {
                if elide {
                    "\"\"".into()
                } else {
                    format!("\"{}\"", val())
                }
            }
            "dstr" => {
                let parts: Vec<String> = self
                    .children
                    .iter()
                    .map(|c| {
                        if c.tag == "str" {
                            if elide {
                                String::new()
                            } else {
                                c.as_str().unwrap_or("").to_string()
                            }
                        } else {
                            format!("#{{{}}}", c.render_with(elide))
                        }
                    })
                    .collect();
                format!("\"{}\"", parts.join(""))
            }
            "lvar" | "const" | "self" => val(),
            "params" | "cookies" | "session" | "request_env" => match self.value.as_str() {
                Some(key) => format!("{}[:{}]", self.tag, key),
                None => self.tag.clone(),
            },
            "attr" => format!(".{}", val()),
            "lasgn" => {
                let rhs = self
                    .children
                    .first()
                    .map(|c| c.render_with(elide))
                    .unwrap_or_default();
                format!("{} = {}", val(), rhs)
            }
            "call" => {
                let recv = self.children.first();
                let args: Vec<String> = self
                    .children
                    .iter()
                    .skip(1)
                    .map(|c| c.render_with(elide))
                    .collect();
                let head = match recv {
                    Some(r) if r.tag != "self" => format!("{}.{}", r.render_with(elide), val()),
                    _ => val(),
                };
                format!("{}({})", head, args.join(", "))
            }
            "output" => {
                let inner = self
                    .children
                    .first()
                    .map(|c| c.render_with(elide))
                    .unwrap_or_default();
                format!("<%= {} %>", inner)
            }
            "render" => match self.children.first() {
                // Dynamic render path: the expression child is the path.
                Some(c) => format!("render({})", c.render_with(elide)),
                None => format!("render(\"{}\")", val()),
            },
            "return" => match self.children.first() {
                Some(c) => format!("return {}", c.render_with(elide)),
                None => "return".into(),
            },
            "if" | "case" | "block" => {
                let parts: Vec<String> = self
                    .children
                    .iter()
                    .map(|c| c.render_with(elide))
                    .collect();
                format!("{}({})", self.tag, parts.join("; "))
            }
            _ => {
                if elide && !self.value.is_string() && !self.value.is_null() {
                    self.tag.clone()
                } else if self.children.is_empty() {
                    val()
                } else {
                    let parts: Vec<String> = self
                        .children
                        .iter()
                        .map(|c| c.render_with(elide))
                        .collect();
                    format!("{}({})", self.tag, parts.join(", "))
                }
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Syntax tree of one source file together with its role.
pub struct FileSyntax {
    pub path: String,
    pub role: FileRole,
    /// Root nodes of the file.
    pub nodes: Vec<SyntaxNode>,
}

impl FileSyntax {
    pub fn new(path: impl Into<String>, role: FileRole) -> Self {
        Self {
            path: path.into(),
            role,
            nodes: Vec::new(),
        }
    }

    pub fn push(&mut self, node: SyntaxNode) {
        self.nodes.push(node);
    }

    /// Number every node in pre-order. Ids are unique per file; analysis
    /// side tables are keyed by them.
    pub fn assign_ids(&mut self) {
        let mut next = 0usize;
        for n in &mut self.nodes {
            assign(n, &mut next);
        }
        fn assign(node: &mut SyntaxNode, next: &mut usize) {
            node.id = *next;
            *next += 1;
            for c in &mut node.children {
                assign(c, next);
            }
        }
    }

    /// Depth-first visit over every node in the file.
    pub fn walk<'a, F: FnMut(&'a SyntaxNode)>(&'a self, f: &mut F) {
        for n in &self.nodes {
            n.walk(f);
        }
    }
}

#[cfg(test)]
mod tests;
