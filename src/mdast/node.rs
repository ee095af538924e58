//! Typed mdast tree (with the MyST extensions used by curvenote).
//!
//! Serializes to the usual JSON shape: an object with a `type` discriminator,
//! optional fields omitted, and `children` on parents.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::ir::NodePath;
use crate::schema::{MarkCodec, MdastKey};

/// Children of a plain container node.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Parent {
    #[serde(default)]
    pub children: Vec<Node>,
}

/// A node carrying a string value.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Literal {
    pub value: String,
}

/// An mdast node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Node {
    Root(Parent),
    Paragraph(Parent),
    Heading {
        depth: u8,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        enumerated: Option<bool>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        identifier: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        label: Option<String>,
        #[serde(default)]
        children: Vec<Node>,
    },
    Text(Literal),

    // Phrasing wrappers
    Emphasis(Parent),
    Strong(Parent),
    Underline(Parent),
    Delete(Parent),
    Superscript(Parent),
    Subscript(Parent),
    Abbreviation {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
        #[serde(default)]
        children: Vec<Node>,
    },
    Link {
        url: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
        #[serde(default)]
        children: Vec<Node>,
    },
    InlineCode(Literal),
    Break,

    // Blocks
    Blockquote(Parent),
    ThematicBreak,
    Code {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        lang: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        identifier: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        label: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        enumerated: Option<bool>,
        #[serde(
            default,
            rename = "showLineNumbers",
            skip_serializing_if = "Option::is_none"
        )]
        show_line_numbers: Option<bool>,
        value: String,
    },
    List {
        ordered: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        start: Option<i64>,
        #[serde(default)]
        children: Vec<Node>,
    },
    ListItem(Parent),
    Image {
        url: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        alt: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        align: Option<String>,
        /// Percentage of the page width, such as `"70%"`.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        width: Option<String>,
    },
    Iframe {
        src: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        align: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        width: Option<String>,
    },
    InlineMath(Literal),
    Math {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        identifier: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        label: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        enumerated: Option<bool>,
        value: String,
    },

    // Tables
    Table(Parent),
    TableRow(Parent),
    TableCell {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        header: Option<bool>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        align: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        colspan: Option<i64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        rowspan: Option<i64>,
        #[serde(default)]
        children: Vec<Node>,
    },

    // Footnotes
    FootnoteReference {
        identifier: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        label: Option<String>,
    },
    FootnoteDefinition {
        identifier: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        label: Option<String>,
        #[serde(default)]
        children: Vec<Node>,
    },

    // MyST
    Aside(Parent),
    Admonition {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        kind: Option<String>,
        #[serde(default)]
        children: Vec<Node>,
    },
    Cite {
        label: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        kind: Option<String>,
    },
    CiteGroup {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        kind: Option<String>,
        #[serde(default)]
        children: Vec<Node>,
    },
    MystRole {
        name: String,
        #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
        args: BTreeMap<String, String>,
    },
    MystDirective {
        name: String,
        #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
        args: BTreeMap<String, String>,
    },

    /// Raw HTML. Parsed but not claimed by any definition.
    Html(Literal),
}

/// Every `type` value the model understands.
const KNOWN_TYPES: &[&str] = &[
    "root",
    "paragraph",
    "heading",
    "text",
    "emphasis",
    "strong",
    "underline",
    "delete",
    "superscript",
    "subscript",
    "abbreviation",
    "link",
    "inlineCode",
    "break",
    "blockquote",
    "thematicBreak",
    "code",
    "list",
    "listItem",
    "image",
    "iframe",
    "inlineMath",
    "math",
    "table",
    "tableRow",
    "tableCell",
    "footnoteReference",
    "footnoteDefinition",
    "aside",
    "admonition",
    "cite",
    "citeGroup",
    "mystRole",
    "mystDirective",
    "html",
];

impl Node {
    pub fn root(children: Vec<Node>) -> Node {
        Node::Root(Parent { children })
    }

    pub fn paragraph(children: Vec<Node>) -> Node {
        Node::Paragraph(Parent { children })
    }

    pub fn text(value: impl Into<String>) -> Node {
        Node::Text(Literal {
            value: value.into(),
        })
    }

    /// Parse a JSON value into a typed tree.
    ///
    /// Unlike plain deserialization, an unknown `type` is reported as
    /// [`Error::UnrecognizedMdastNode`] with the path of the offending node.
    pub fn from_value(value: Value) -> Result<Node> {
        let mut path = NodePath::default();
        check_types(&value, &mut path)?;
        Ok(serde_json::from_value(value)?)
    }

    /// The mdast `type` string.
    pub fn type_name(&self) -> &'static str {
        match self {
            Node::Root(_) => "root",
            Node::Paragraph(_) => "paragraph",
            Node::Heading { .. } => "heading",
            Node::Text(_) => "text",
            Node::Emphasis(_) => "emphasis",
            Node::Strong(_) => "strong",
            Node::Underline(_) => "underline",
            Node::Delete(_) => "delete",
            Node::Superscript(_) => "superscript",
            Node::Subscript(_) => "subscript",
            Node::Abbreviation { .. } => "abbreviation",
            Node::Link { .. } => "link",
            Node::InlineCode(_) => "inlineCode",
            Node::Break => "break",
            Node::Blockquote(_) => "blockquote",
            Node::ThematicBreak => "thematicBreak",
            Node::Code { .. } => "code",
            Node::List { .. } => "list",
            Node::ListItem(_) => "listItem",
            Node::Image { .. } => "image",
            Node::Iframe { .. } => "iframe",
            Node::InlineMath(_) => "inlineMath",
            Node::Math { .. } => "math",
            Node::Table(_) => "table",
            Node::TableRow(_) => "tableRow",
            Node::TableCell { .. } => "tableCell",
            Node::FootnoteReference { .. } => "footnoteReference",
            Node::FootnoteDefinition { .. } => "footnoteDefinition",
            Node::Aside(_) => "aside",
            Node::Admonition { .. } => "admonition",
            Node::Cite { .. } => "cite",
            Node::CiteGroup { .. } => "citeGroup",
            Node::MystRole { .. } => "mystRole",
            Node::MystDirective { .. } => "mystDirective",
            Node::Html(_) => "html",
        }
    }

    /// Children, for parent nodes.
    pub fn children(&self) -> Option<&[Node]> {
        match self {
            Node::Root(p)
            | Node::Paragraph(p)
            | Node::Emphasis(p)
            | Node::Strong(p)
            | Node::Underline(p)
            | Node::Delete(p)
            | Node::Superscript(p)
            | Node::Subscript(p)
            | Node::Blockquote(p)
            | Node::ListItem(p)
            | Node::Table(p)
            | Node::TableRow(p)
            | Node::Aside(p) => Some(&p.children),
            Node::Heading { children, .. }
            | Node::Abbreviation { children, .. }
            | Node::Link { children, .. }
            | Node::List { children, .. }
            | Node::TableCell { children, .. }
            | Node::FootnoteDefinition { children, .. }
            | Node::Admonition { children, .. }
            | Node::CiteGroup { children, .. } => Some(children),
            _ => None,
        }
    }

    /// Mutable children, for parent nodes.
    pub fn children_mut(&mut self) -> Option<&mut Vec<Node>> {
        match self {
            Node::Root(p)
            | Node::Paragraph(p)
            | Node::Emphasis(p)
            | Node::Strong(p)
            | Node::Underline(p)
            | Node::Delete(p)
            | Node::Superscript(p)
            | Node::Subscript(p)
            | Node::Blockquote(p)
            | Node::ListItem(p)
            | Node::Table(p)
            | Node::TableRow(p)
            | Node::Aside(p) => Some(&mut p.children),
            Node::Heading { children, .. }
            | Node::Abbreviation { children, .. }
            | Node::Link { children, .. }
            | Node::List { children, .. }
            | Node::TableCell { children, .. }
            | Node::FootnoteDefinition { children, .. }
            | Node::Admonition { children, .. }
            | Node::CiteGroup { children, .. } => Some(children),
            _ => None,
        }
    }

    /// The mark carried by a phrasing wrapper (or `inlineCode`).
    pub fn mark_codec(&self) -> Option<MarkCodec> {
        Some(match self {
            Node::Link { .. } => MarkCodec::Link,
            Node::Abbreviation { .. } => MarkCodec::Abbreviation,
            Node::Emphasis(_) => MarkCodec::Emphasis,
            Node::Strong(_) => MarkCodec::Strong,
            Node::Underline(_) => MarkCodec::Underline,
            Node::Delete(_) => MarkCodec::Delete,
            Node::Superscript(_) => MarkCodec::Superscript,
            Node::Subscript(_) => MarkCodec::Subscript,
            Node::InlineCode(_) => MarkCodec::InlineCode,
            _ => return None,
        })
    }

    /// The registry key this node is matched by. `None` for marks, text,
    /// footnote definitions, and nodes no definition can claim.
    pub fn key(&self) -> Option<MdastKey> {
        match self {
            Node::List { ordered, .. } => Some(MdastKey::List { ordered: *ordered }),
            Node::TableCell { header, .. } => Some(MdastKey::TableCell {
                header: header.unwrap_or(false),
            }),
            Node::MystRole { name, .. } => Some(MdastKey::Role(name.clone())),
            Node::MystDirective { name, .. } => Some(MdastKey::Directive(name.clone())),
            Node::FootnoteDefinition { .. } | Node::Html(_) => None,
            node if node.mark_codec().is_some() => None,
            node => Some(MdastKey::Type(node.type_name())),
        }
    }

    /// Visit this node and its descendants in pre-order.
    pub fn walk<'t>(&'t self, visit: &mut impl FnMut(&'t Node)) {
        visit(self);
        if let Some(children) = self.children() {
            for child in children {
                child.walk(visit);
            }
        }
    }

    /// Visit this node and its descendants in pre-order, mutably.
    pub fn walk_mut(&mut self, visit: &mut impl FnMut(&mut Node)) {
        visit(self);
        if let Some(children) = self.children_mut() {
            for child in children {
                child.walk_mut(visit);
            }
        }
    }
}

fn check_types(value: &Value, path: &mut NodePath) -> Result<()> {
    let Some(obj) = value.as_object() else {
        return Err(Error::malformed(path, "mdast node must be an object"));
    };
    let Some(node_type) = obj.get("type").and_then(Value::as_str) else {
        return Err(Error::malformed(path, "mdast node has no `type`"));
    };
    if !KNOWN_TYPES.contains(&node_type) {
        return Err(Error::UnrecognizedMdastNode {
            node_type: node_type.to_string(),
            path: path.clone(),
        });
    }

    if path.depth() == 0 {
        *path = NodePath::root(node_type);
    }
    if let Some(children) = obj.get("children").and_then(Value::as_array) {
        for (i, child) in children.iter().enumerate() {
            let kind = child
                .get("type")
                .and_then(Value::as_str)
                .unwrap_or("?")
                .to_string();
            path.push(kind, i);
            check_types(child, path)?;
            path.pop();
        }
    }
    Ok(())
}
