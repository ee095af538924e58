//! IR node, mark, and attribute types.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::schema::{AttributeDescriptor, NodeDefinition};

/// Attributes present on a node or mark, keyed by descriptor name.
///
/// Only attributes that were actually supplied are stored. Defaults are applied
/// lazily by the encoders (see [`Node::attr_or_default`]).
pub type Attrs = BTreeMap<String, AttrValue>;

/// The value of one attribute.
///
/// Reactive attributes may be bound to an expression instead of a literal.
/// The two forms are mutually exclusive by construction.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    /// A literal value (`value: "50"`).
    Literal(Value),
    /// An expression reference (`valueFunction: "x * 2"`).
    Function(String),
}

impl AttrValue {
    /// Create a literal value.
    pub fn literal(value: impl Into<Value>) -> Self {
        AttrValue::Literal(value.into())
    }

    /// Create an expression reference.
    pub fn function(expr: impl Into<String>) -> Self {
        AttrValue::Function(expr.into())
    }

    /// The literal value, if this is not a function reference.
    pub fn as_literal(&self) -> Option<&Value> {
        match self {
            AttrValue::Literal(v) => Some(v),
            AttrValue::Function(_) => None,
        }
    }

    /// The expression, if this is a function reference.
    pub fn as_function(&self) -> Option<&str> {
        match self {
            AttrValue::Literal(_) => None,
            AttrValue::Function(expr) => Some(expr),
        }
    }
}

/// An inline formatting mark (emphasis, link, ...).
#[derive(Debug, Clone, PartialEq)]
pub struct Mark {
    /// Mark type name (`em`, `link`, ...).
    pub kind: String,
    /// Mark attributes (`href` for links).
    pub attrs: Attrs,
}

impl Mark {
    /// Create a mark without attributes.
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            attrs: Attrs::new(),
        }
    }

    /// Add a literal attribute.
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attrs.insert(name.into(), AttrValue::literal(value));
        self
    }
}

/// A node in the IR tree.
///
/// Both decoders produce this shape and both encoders consume it. Children
/// order is significant and preserved by every conversion.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Node {
    /// Node type name; references a [`NodeDefinition`].
    pub kind: String,
    /// Attributes that were explicitly supplied.
    pub attrs: Attrs,
    /// Child nodes.
    pub content: Vec<Node>,
    /// Marks, sorted by mark rank. Only inline nodes carry marks.
    pub marks: Vec<Mark>,
    /// Text content (text leaves only).
    pub text: Option<String>,
}

impl Node {
    /// Type name of text leaves.
    pub const TEXT: &'static str = "text";

    /// Create an empty node of the given type.
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            ..Default::default()
        }
    }

    /// Create a text leaf.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            kind: Self::TEXT.to_string(),
            text: Some(text.into()),
            ..Default::default()
        }
    }

    /// Set a literal attribute.
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attrs.insert(name.into(), AttrValue::literal(value));
        self
    }

    /// Bind an attribute to an expression.
    pub fn with_function(mut self, name: impl Into<String>, expr: impl Into<String>) -> Self {
        self.attrs.insert(name.into(), AttrValue::function(expr));
        self
    }

    /// Replace the children.
    pub fn with_content(mut self, content: Vec<Node>) -> Self {
        self.content = content;
        self
    }

    /// Append a child.
    pub fn with_child(mut self, child: Node) -> Self {
        self.content.push(child);
        self
    }

    /// Add a mark. Callers are responsible for rank order.
    pub fn with_mark(mut self, mark: Mark) -> Self {
        self.marks.push(mark);
        self
    }

    /// Check if this is a text leaf.
    pub fn is_text(&self) -> bool {
        self.kind == Self::TEXT
    }

    /// Get an attribute as supplied (no default applied).
    pub fn attr(&self, name: &str) -> Option<&AttrValue> {
        self.attrs.get(name)
    }

    /// Get a literal attribute as supplied.
    pub fn literal(&self, name: &str) -> Option<&Value> {
        self.attrs.get(name).and_then(AttrValue::as_literal)
    }

    /// Get an attribute, falling back to the descriptor's default.
    pub fn attr_or_default(&self, def: &NodeDefinition, name: &str) -> Option<AttrValue> {
        if let Some(value) = self.attrs.get(name) {
            return Some(value.clone());
        }
        def.attribute(name)
            .and_then(AttributeDescriptor::default_value)
            .map(|v| AttrValue::Literal(v.clone()))
    }

    /// Concatenated text of all descendant text leaves.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        for node in self.iter_dfs() {
            if let Some(text) = &node.text {
                out.push_str(text);
            }
        }
        out
    }

    /// Iterate over this node and all descendants in depth-first order.
    pub fn iter_dfs(&self) -> DfsIter<'_> {
        DfsIter { stack: vec![self] }
    }
}

/// Depth-first iterator over a node and its descendants.
pub struct DfsIter<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Iterator for DfsIter<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.stack.pop()?;
        // Push children in reverse order so they're visited left-to-right
        self.stack.extend(current.content.iter().rev());
        Some(current)
    }
}
