//! IR → mdast.
//!
//! Each node is encoded by interpreting its definition's [`MdastCodec`].
//! Inline children are encoded as runs so that shared marks become nested
//! wrappers. Footnotes are numbered by first occurrence and their definitions
//! are appended to the root.

use serde_json::{Map, Value};
use tracing::{debug, instrument, trace};

use super::inline::{MarkStack, split_code};
use super::node::{Literal, Node as MdNode, Parent};
use crate::error::{Error, Result};
use crate::ir::{Node, NodePath};
use crate::schema::{
    AttrKind, MdastCodec, NodeDefinition, PresetId, Registry, SchemaPreset, Target, registry,
    serialize_attrs,
};

/// Options for [`to_mdast`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EncodeOptions {
    /// Preset the tree is checked against (default `full`).
    pub preset: PresetId,
}

impl EncodeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_preset(mut self, preset: impl Into<PresetId>) -> Self {
        self.preset = preset.into();
        self
    }
}

/// Encode a tree to mdast using the built-in registry.
pub fn to_mdast(tree: &Node, options: &EncodeOptions) -> Result<MdNode> {
    to_mdast_with(registry(), tree, options)
}

/// Encode a tree to mdast.
#[instrument(skip(registry, tree), fields(root = %tree.kind, preset = %options.preset))]
pub fn to_mdast_with(registry: &Registry, tree: &Node, options: &EncodeOptions) -> Result<MdNode> {
    let preset = registry.resolve_preset(&options.preset)?;
    let mut encoder = Encoder {
        registry,
        preset: &preset,
        path: NodePath::root(tree.kind.as_str()),
        footnotes: Vec::new(),
        definitions: Vec::new(),
    };

    let mut out = encoder.encode_node(tree)?;
    if !encoder.definitions.is_empty() {
        let MdNode::Root(root) = &mut out else {
            return Err(Error::content(
                &encoder.path,
                "footnotes can only be encoded under a document root",
            ));
        };
        root.children.append(&mut encoder.definitions);
    }

    debug!(footnotes = encoder.footnotes.len(), "encoded mdast tree");
    Ok(out)
}

/// A footnote already assigned an identifier.
struct Footnote {
    content: Vec<Node>,
    identifier: String,
}

/// Per-call encoder state. Never shared between calls.
struct Encoder<'a> {
    registry: &'a Registry,
    preset: &'a SchemaPreset,
    path: NodePath,
    footnotes: Vec<Footnote>,
    definitions: Vec<MdNode>,
}

/// Serialized attributes with typed accessors.
struct Fields(Map<String, Value>);

impl Fields {
    fn str(&self, key: &str) -> Option<String> {
        self.0.get(key).and_then(Value::as_str).map(str::to_string)
    }

    fn int(&self, key: &str) -> Option<i64> {
        self.0.get(key).and_then(Value::as_i64)
    }

    fn bool(&self, key: &str) -> Option<bool> {
        self.0.get(key).and_then(Value::as_bool)
    }

    /// Width as an mdast percentage string.
    fn percent(&self, key: &str) -> Option<String> {
        self.int(key).map(|w| format!("{w}%"))
    }

    /// All fields as role/directive arguments.
    fn args(&self) -> std::collections::BTreeMap<String, String> {
        self.0
            .iter()
            .map(|(k, v)| (k.clone(), AttrKind::render(v)))
            .collect()
    }
}

impl Encoder<'_> {
    fn encode_node(&mut self, node: &Node) -> Result<MdNode> {
        let Some(def) = self.registry.get(&node.kind) else {
            return Err(Error::NoSerializerForNode {
                node: node.kind.clone(),
                path: self.path.clone(),
            });
        };
        self.preset.check_node(&def.name, &self.path)?;
        trace!(node = %def.name, path = %self.path, "encode");

        let f = Fields(serialize_attrs(&def.attributes, &node.attrs, Target::Mdast));
        let out = match def.codec {
            MdastCodec::Root => MdNode::root(self.encode_children(node)?),
            MdastCodec::Paragraph => MdNode::paragraph(self.encode_children(node)?),
            MdastCodec::Text => MdNode::text(node.text.clone().unwrap_or_default()),
            MdastCodec::Heading => MdNode::Heading {
                depth: self.heading_depth(def, &f)?,
                enumerated: f.bool("numbered"),
                identifier: f.str("id"),
                label: f.str("label"),
                children: self.encode_children(node)?,
            },
            MdastCodec::Blockquote => MdNode::Blockquote(self.parent(node)?),
            MdastCodec::ThematicBreak => MdNode::ThematicBreak,
            MdastCodec::Break => MdNode::Break,
            MdastCodec::Code => MdNode::Code {
                lang: f.str("language"),
                title: f.str("title"),
                identifier: f.str("id"),
                label: f.str("label"),
                enumerated: f.bool("numbered"),
                show_line_numbers: f.bool("linenumbers"),
                value: node.text_content(),
            },
            MdastCodec::List { ordered } => MdNode::List {
                ordered,
                start: if ordered { f.int("order") } else { None },
                children: self.encode_children(node)?,
            },
            MdastCodec::ListItem => MdNode::ListItem(self.parent(node)?),
            MdastCodec::Image => MdNode::Image {
                url: f.str("src").unwrap_or_default(),
                alt: f.str("alt"),
                title: f.str("title"),
                align: f.str("align"),
                width: f.percent("width"),
            },
            MdastCodec::Iframe => MdNode::Iframe {
                src: f.str("src").unwrap_or_default(),
                align: f.str("align"),
                width: f.percent("width"),
            },
            MdastCodec::InlineMath => MdNode::InlineMath(Literal {
                value: node.text_content(),
            }),
            MdastCodec::Math => MdNode::Math {
                identifier: f.str("id"),
                label: f.str("label"),
                enumerated: f.bool("numbered"),
                value: node.text_content(),
            },
            MdastCodec::Table => MdNode::Table(self.parent(node)?),
            MdastCodec::TableRow => MdNode::TableRow(self.parent(node)?),
            MdastCodec::TableCell { header } => MdNode::TableCell {
                header: header.then_some(true),
                align: f.str("align"),
                colspan: f.int("colspan"),
                rowspan: f.int("rowspan"),
                children: self.encode_children(node)?,
            },
            MdastCodec::Footnote => {
                let identifier = self.footnote(node)?;
                MdNode::FootnoteReference {
                    label: Some(identifier.clone()),
                    identifier,
                }
            }
            MdastCodec::Aside => MdNode::Aside(self.parent(node)?),
            MdastCodec::Admonition => MdNode::Admonition {
                kind: f.str("kind"),
                children: self.encode_children(node)?,
            },
            MdastCodec::Cite => MdNode::Cite {
                label: f.str("key").unwrap_or_default(),
                kind: f.str("kind"),
            },
            MdastCodec::CiteGroup => MdNode::CiteGroup {
                kind: f.str("kind"),
                children: self.encode_children(node)?,
            },
            MdastCodec::Role => MdNode::MystRole {
                name: def.tag.clone(),
                args: f.args(),
            },
            MdastCodec::Directive => MdNode::MystDirective {
                name: def.tag.clone(),
                args: f.args(),
            },
        };
        Ok(out)
    }

    fn parent(&mut self, node: &Node) -> Result<Parent> {
        Ok(Parent {
            children: self.encode_children(node)?,
        })
    }

    /// Encode children, grouping marked inline runs under wrappers.
    fn encode_children(&mut self, node: &Node) -> Result<Vec<MdNode>> {
        let mut stack = MarkStack::new(self.registry);
        for (i, child) in node.content.iter().enumerate() {
            self.path.push(child.kind.as_str(), i);
            if child.is_text() {
                self.preset.check_node(&child.kind, &self.path)?;
            }
            for mark in &child.marks {
                self.preset.check_mark(&mark.kind, &self.path)?;
            }

            let (wrappers, code) = split_code(self.registry, &child.marks);
            let leaf = match &child.text {
                Some(value) if child.is_text() && code => MdNode::InlineCode(Literal {
                    value: value.clone(),
                }),
                Some(value) if child.is_text() => MdNode::text(value.clone()),
                _ => self.encode_node(child)?,
            };
            stack.push(&wrappers, leaf, &self.path)?;
            self.path.pop();
        }
        stack.finish(&self.path)
    }

    fn heading_depth(&self, def: &NodeDefinition, f: &Fields) -> Result<u8> {
        let Some(level) = f.int("level") else {
            return Err(Error::MissingRequiredAttribute {
                node: def.name.clone(),
                attr: "level".to_string(),
                path: self.path.clone(),
            });
        };
        u8::try_from(level)
            .ok()
            .filter(|depth| (1..=6).contains(depth))
            .ok_or_else(|| Error::malformed(&self.path, format!("heading level {level} out of range")))
    }

    /// Identifier for a footnote, emitting its definition on first use.
    ///
    /// Footnotes with identical content share one definition.
    fn footnote(&mut self, node: &Node) -> Result<String> {
        if let Some(existing) = self.footnotes.iter().find(|f| f.content == node.content) {
            return Ok(existing.identifier.clone());
        }

        let identifier = (self.footnotes.len() + 1).to_string();
        self.footnotes.push(Footnote {
            content: node.content.clone(),
            identifier: identifier.clone(),
        });

        // Reserve the slot so nested footnotes are defined after this one
        let slot = self.definitions.len();
        self.definitions.push(MdNode::FootnoteDefinition {
            identifier: identifier.clone(),
            label: Some(identifier.clone()),
            children: Vec::new(),
        });
        let content = self.encode_children(node)?;
        if let MdNode::FootnoteDefinition { children, .. } = &mut self.definitions[slot] {
            *children = vec![MdNode::paragraph(content)];
        }
        Ok(identifier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::Mark;
    use std::collections::BTreeMap;

    fn doc(children: Vec<Node>) -> Node {
        Node::new("doc").with_content(children)
    }

    fn para(children: Vec<Node>) -> Node {
        Node::new("paragraph").with_content(children)
    }

    #[test]
    fn test_heading_omits_default() {
        let tree = doc(vec![
            Node::new("heading")
                .with_attr("level", 2)
                .with_attr("numbered", false)
                .with_child(Node::text("Title")),
        ]);
        let out = to_mdast(&tree, &EncodeOptions::new()).unwrap();
        assert_eq!(
            out,
            MdNode::root(vec![MdNode::Heading {
                depth: 2,
                enumerated: None,
                identifier: None,
                label: None,
                children: vec![MdNode::text("Title")],
            }])
        );
    }

    #[test]
    fn test_range_role_args() {
        let tree = doc(vec![para(vec![
            Node::new("range")
                .with_attr("value", "50")
                .with_attr("min", "0")
                .with_function("change", "{x: value}"),
        ])]);
        let out = to_mdast(&tree, &EncodeOptions::new()).unwrap();

        let mut args = BTreeMap::new();
        args.insert("value".to_string(), "50".to_string());
        args.insert("changeFunction".to_string(), "{x: value}".to_string());
        assert_eq!(
            out,
            MdNode::root(vec![MdNode::paragraph(vec![MdNode::MystRole {
                name: "r-range".to_string(),
                args,
            }])])
        );
    }

    #[test]
    fn test_inline_code_inside_emphasis() {
        let tree = doc(vec![para(vec![
            Node::text("x")
                .with_mark(Mark::new("em"))
                .with_mark(Mark::new("code")),
        ])]);
        let out = to_mdast(&tree, &EncodeOptions::new()).unwrap();
        assert_eq!(
            out,
            MdNode::root(vec![MdNode::paragraph(vec![MdNode::Emphasis(Parent {
                children: vec![MdNode::InlineCode(Literal {
                    value: "x".to_string()
                })],
            })])])
        );
    }

    #[test]
    fn test_footnotes_numbered_and_shared() {
        let note = |text: &str| Node::new("footnote").with_child(Node::text(text));
        let tree = doc(vec![para(vec![
            Node::text("a"),
            note("first"),
            note("first"),
            note("second"),
        ])]);
        let out = to_mdast(&tree, &EncodeOptions::new()).unwrap();

        let children = out.children().unwrap();
        let refs: Vec<_> = children[0]
            .children()
            .unwrap()
            .iter()
            .filter_map(|n| match n {
                MdNode::FootnoteReference { identifier, .. } => Some(identifier.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(refs, vec!["1", "1", "2"]);

        assert_eq!(children.len(), 3);
        assert_eq!(
            children[1],
            MdNode::FootnoteDefinition {
                identifier: "1".to_string(),
                label: Some("1".to_string()),
                children: vec![MdNode::paragraph(vec![MdNode::text("first")])],
            }
        );
    }

    #[test]
    fn test_footnote_without_root() {
        let tree = para(vec![Node::new("footnote").with_child(Node::text("n"))]);
        let err = to_mdast(&tree, &EncodeOptions::new()).unwrap_err();
        assert!(matches!(err, Error::ContentViolation { .. }));
    }

    #[test]
    fn test_preset_checked() {
        let tree = doc(vec![Node::new("heading").with_attr("level", 1)]);
        let err = to_mdast(&tree, &EncodeOptions::new().with_preset("comment")).unwrap_err();
        assert!(matches!(err, Error::NodeNotAllowedInSchema { ref node, .. } if node == "heading"));
    }

    #[test]
    fn test_unknown_node() {
        let tree = doc(vec![Node::new("marquee")]);
        let err = to_mdast(&tree, &EncodeOptions::new()).unwrap_err();
        match err {
            Error::NoSerializerForNode { node, path } => {
                assert_eq!(node, "marquee");
                assert_eq!(path.to_string(), "doc/marquee[0]");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_image_width_percent() {
        let tree = doc(vec![
            Node::new("image")
                .with_attr("src", "fig.png")
                .with_attr("width", 50),
        ]);
        let out = to_mdast(&tree, &EncodeOptions::new()).unwrap();
        assert!(matches!(
            &out.children().unwrap()[0],
            MdNode::Image { width: Some(w), align: None, .. } if w == "50%"
        ));
    }

    #[test]
    fn test_preset_checks_text() {
        let preset = crate::schema::SchemaPreset {
            name: "bare".to_string(),
            nodes: ["doc", "paragraph"].iter().map(|n| n.to_string()).collect(),
            marks: Default::default(),
            top: Default::default(),
        };
        let tree = doc(vec![para(vec![Node::text("hi")])]);
        let err = to_mdast(&tree, &EncodeOptions::new().with_preset(preset)).unwrap_err();
        assert!(matches!(err, Error::NodeNotAllowedInSchema { ref node, .. } if node == "text"));
    }

    #[test]
    fn test_equal_footnotes_share_definition() {
        let note = || Node::new("footnote").with_child(Node::text("same"));
        let tree = doc(vec![para(vec![note(), note()])]);
        let out = to_mdast(&tree, &EncodeOptions::new()).unwrap();

        let children = out.children().unwrap();
        assert_eq!(children.len(), 2);
        assert!(matches!(
            &children[0].children().unwrap()[..],
            [
                MdNode::FootnoteReference { identifier: a, .. },
                MdNode::FootnoteReference { identifier: b, .. },
            ] if a == "1" && b == "1"
        ));
    }
}
