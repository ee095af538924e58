//! mdast → IR.
//!
//! Footnote definitions are collected from the whole tree first, so a
//! reference may appear before its definition. Phrasing wrappers are
//! flattened into marks on the nodes they contain.

use std::collections::{HashMap, HashSet};

use serde_json::{Map, Value};
use tracing::{debug, instrument, trace};

use super::inline::unwrap;
use super::node::Node as MdNode;
use crate::error::{Error, Result};
use crate::ir::{Mark, Node, NodePath};
use crate::schema::{
    Content, MdastCodec, NodeDefinition, PresetId, Registry, SchemaPreset, registry, resolve_attrs,
};

/// Decode an mdast tree using the built-in registry.
pub fn from_mdast(tree: &MdNode, preset: impl Into<PresetId>) -> Result<Node> {
    from_mdast_with(registry(), tree, preset)
}

/// Decode an mdast tree.
#[instrument(skip(registry, tree, preset), fields(root = tree.type_name()))]
pub fn from_mdast_with(
    registry: &Registry,
    tree: &MdNode,
    preset: impl Into<PresetId>,
) -> Result<Node> {
    let preset = registry.resolve_preset(preset)?;

    let mut definitions = HashMap::new();
    tree.walk(&mut |node| {
        if let MdNode::FootnoteDefinition {
            identifier,
            children,
            ..
        } = node
        {
            definitions.entry(identifier.clone()).or_insert(children.as_slice());
        }
    });

    let mut decoder = Decoder {
        registry,
        preset: &preset,
        path: NodePath::root(tree.type_name()),
        definitions,
        open_footnotes: HashSet::new(),
    };
    let node = decoder.decode_node(tree)?;
    debug!(preset = %preset.name, footnotes = decoder.definitions.len(), "decoded mdast tree");
    Ok(node)
}

/// Per-call decoder state.
struct Decoder<'a> {
    registry: &'a Registry,
    preset: &'a SchemaPreset,
    path: NodePath,
    /// Footnote definition children by identifier
    definitions: HashMap<String, &'a [MdNode]>,
    /// Footnotes whose content is being decoded
    open_footnotes: HashSet<String>,
}

fn put(raw: &mut Map<String, Value>, key: &str, value: Option<impl Into<Value>>) {
    if let Some(value) = value {
        raw.insert(key.to_string(), value.into());
    }
}

impl<'a> Decoder<'a> {
    /// Decode a node claimed by a definition.
    fn decode_node(&mut self, node: &'a MdNode) -> Result<Node> {
        let registry = self.registry;
        let def = node
            .key()
            .and_then(|key| registry.match_mdast(&key))
            .ok_or_else(|| Error::UnrecognizedMdastNode {
                node_type: node.type_name().to_string(),
                path: self.path.clone(),
            })?;
        self.path.set_kind(def.name.as_str());
        self.preset.check_node(&def.name, &self.path)?;
        trace!(node = %def.name, path = %self.path, "decode");

        let mut raw = Map::new();
        let mut children: &'a [MdNode] = &[];
        let mut value: Option<&'a str> = None;
        let mut footnote: Option<&'a str> = None;

        match node {
            MdNode::Heading {
                depth,
                enumerated,
                identifier,
                label,
                children: c,
            } => {
                put(&mut raw, "id", identifier.clone());
                put(&mut raw, "label", label.clone());
                put(&mut raw, "numbered", *enumerated);
                raw.insert("level".to_string(), Value::from(*depth));
                children = c;
            }
            MdNode::Text(t) => value = Some(t.value.as_str()),
            MdNode::Code {
                lang,
                title,
                identifier,
                label,
                enumerated,
                show_line_numbers,
                value: v,
            } => {
                put(&mut raw, "id", identifier.clone());
                put(&mut raw, "label", label.clone());
                put(&mut raw, "numbered", *enumerated);
                put(&mut raw, "language", lang.clone());
                put(&mut raw, "title", title.clone());
                put(&mut raw, "linenumbers", *show_line_numbers);
                value = Some(v.as_str());
            }
            MdNode::List {
                ordered,
                start,
                children: c,
            } => {
                if *ordered {
                    put(&mut raw, "order", *start);
                }
                children = c;
            }
            MdNode::Image {
                url,
                alt,
                title,
                align,
                width,
            } => {
                raw.insert("src".to_string(), Value::String(url.clone()));
                put(&mut raw, "align", align.clone());
                put(&mut raw, "width", self.percent(width.as_deref())?);
                put(&mut raw, "alt", alt.clone());
                put(&mut raw, "title", title.clone());
            }
            MdNode::Iframe { src, align, width } => {
                raw.insert("src".to_string(), Value::String(src.clone()));
                put(&mut raw, "align", align.clone());
                put(&mut raw, "width", self.percent(width.as_deref())?);
            }
            MdNode::InlineMath(m) => value = Some(m.value.as_str()),
            MdNode::Math {
                identifier,
                label,
                enumerated,
                value: v,
            } => {
                put(&mut raw, "id", identifier.clone());
                put(&mut raw, "label", label.clone());
                put(&mut raw, "numbered", *enumerated);
                value = Some(v.as_str());
            }
            MdNode::TableCell {
                align,
                colspan,
                rowspan,
                children: c,
                ..
            } => {
                put(&mut raw, "align", align.clone());
                put(&mut raw, "colspan", *colspan);
                put(&mut raw, "rowspan", *rowspan);
                children = c;
            }
            MdNode::FootnoteReference { identifier, .. } => {
                children = self.footnote_content(identifier)?;
                if !self.open_footnotes.insert(identifier.clone()) {
                    return Err(Error::content(
                        &self.path,
                        format!("footnote `{identifier}` refers to itself"),
                    ));
                }
                footnote = Some(identifier.as_str());
            }
            MdNode::Admonition { kind, children: c } => {
                put(&mut raw, "kind", kind.clone());
                children = c;
            }
            MdNode::Cite { label, kind } => {
                raw.insert("key".to_string(), Value::String(label.clone()));
                put(&mut raw, "kind", kind.clone());
            }
            MdNode::CiteGroup { kind, children: c } => {
                put(&mut raw, "kind", kind.clone());
                children = c;
            }
            MdNode::MystRole { args, .. } | MdNode::MystDirective { args, .. } => {
                raw = self.parse_args(def, args)?;
            }
            other => {
                if let Some(c) = other.children() {
                    children = c;
                }
            }
        }

        let mut out = Node::new(def.name.as_str());
        out.attrs = resolve_attrs(&def.name, &def.attributes, &raw, &self.path)?;

        match def.content {
            Content::Empty if def.codec == MdastCodec::Text => {
                out.text = value.map(str::to_string);
            }
            Content::Empty => {
                if !children.is_empty() {
                    return Err(Error::content(
                        &self.path,
                        format!("`{}` cannot have children", def.name),
                    ));
                }
            }
            Content::Text => {
                let text = value.unwrap_or_default();
                if !text.is_empty() {
                    self.preset.check_node(Node::TEXT, &self.path)?;
                    out.content.push(Node::text(text));
                }
            }
            _ => out.content = self.decode_children(def, children)?,
        }
        if let Some(identifier) = footnote {
            self.open_footnotes.remove(identifier);
        }
        Ok(out)
    }

    /// Decode children, flattening wrappers into marks.
    fn decode_children(&mut self, parent: &NodeDefinition, children: &'a [MdNode]) -> Result<Vec<Node>> {
        let mut out = Vec::new();
        let mut marks = Vec::new();
        self.decode_into(children, &mut marks, &mut out)?;
        merge_text(&mut out);

        if parent.content != Content::Inline && out.iter().any(|n| !n.marks.is_empty()) {
            return Err(Error::malformed(
                &self.path,
                format!("marks are only allowed inside inline content, not `{}`", parent.name),
            ));
        }
        self.preset
            .check_content(self.registry, parent, &out, &self.path)?;
        Ok(out)
    }

    fn decode_into(
        &mut self,
        children: &'a [MdNode],
        marks: &mut Vec<Mark>,
        out: &mut Vec<Node>,
    ) -> Result<()> {
        for (i, child) in children.iter().enumerate() {
            self.path.push(child.type_name(), i);
            match (child, child.mark_codec()) {
                // Consumed through references
                (MdNode::FootnoteDefinition { .. }, _) => {}
                (MdNode::Text(t), _) => {
                    if !t.value.is_empty() {
                        out.push(self.leaf(&t.value, marks)?);
                    }
                }
                (MdNode::InlineCode(t), _) if t.value.is_empty() => {}
                (MdNode::InlineCode(t), Some(codec)) => {
                    let code = unwrap(self.registry, self.preset, child, codec, &self.path)?;
                    marks.push(code);
                    out.push(self.leaf(&t.value, marks)?);
                    marks.pop();
                }
                (wrapper, Some(codec)) => {
                    let mark = unwrap(self.registry, self.preset, wrapper, codec, &self.path)?;
                    marks.push(mark);
                    self.decode_into(wrapper.children().unwrap_or_default(), marks, out)?;
                    marks.pop();
                }
                (node, None) => {
                    let mut decoded = self.decode_node(node)?;
                    if !marks.is_empty() {
                        decoded.marks = self.sorted(marks);
                    }
                    out.push(decoded);
                }
            }
            self.path.pop();
        }
        Ok(())
    }

    fn leaf(&self, text: &str, marks: &[Mark]) -> Result<Node> {
        self.preset.check_node(Node::TEXT, &self.path)?;
        let mut node = Node::text(text);
        node.marks = self.sorted(marks);
        Ok(node)
    }

    fn sorted(&self, marks: &[Mark]) -> Vec<Mark> {
        let mut marks = marks.to_vec();
        self.registry.normalize_marks(&mut marks);
        marks
    }

    /// Inline content of a footnote definition.
    fn footnote_content(&self, identifier: &str) -> Result<&'a [MdNode]> {
        let Some(&children) = self.definitions.get(identifier) else {
            return Err(Error::UndefinedFootnote {
                identifier: identifier.to_string(),
                path: self.path.clone(),
            });
        };
        match children {
            [MdNode::Paragraph(p)] => Ok(&p.children),
            _ => Err(Error::content(
                &self.path,
                format!("footnote `{identifier}` must contain exactly one paragraph"),
            )),
        }
    }

    /// Parse `"70%"` into `70`.
    fn percent(&self, width: Option<&str>) -> Result<Option<i64>> {
        let Some(width) = width else {
            return Ok(None);
        };
        width
            .trim()
            .trim_end_matches('%')
            .parse()
            .map(Some)
            .map_err(|_| Error::malformed(&self.path, format!("invalid width `{width}`")))
    }

    /// Turn role/directive arguments back into typed attributes.
    fn parse_args(
        &self,
        def: &NodeDefinition,
        args: &std::collections::BTreeMap<String, String>,
    ) -> Result<Map<String, Value>> {
        let mut raw = Map::new();
        for (key, text) in args {
            if let Some(desc) = def.attribute(key) {
                let value = desc.kind.parse(text).ok_or_else(|| {
                    Error::malformed(
                        &self.path,
                        format!("`{}.{key}` must be {:?}, got `{text}`", def.name, desc.kind),
                    )
                })?;
                raw.insert(key.clone(), value);
            } else {
                // Function keys and unknown keys are checked by resolve_attrs
                raw.insert(key.clone(), Value::String(text.clone()));
            }
        }
        Ok(raw)
    }
}

/// Merge adjacent text leaves with identical marks.
fn merge_text(nodes: &mut Vec<Node>) {
    let mut merged: Vec<Node> = Vec::with_capacity(nodes.len());
    for node in nodes.drain(..) {
        if let Some(last) = merged.last_mut()
            && last.is_text()
            && node.is_text()
            && last.marks == node.marks
            && let (Some(text), Some(more)) = (last.text.as_mut(), node.text.as_deref())
        {
            text.push_str(more);
            continue;
        }
        merged.push(node);
    }
    *nodes = merged;
}
