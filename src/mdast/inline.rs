//! Marks ↔ mdast phrasing wrappers.
//!
//! In the IR a mark is a flat attribute of each inline node; in mdast it is a
//! wrapper node around a run of children. Encoding groups consecutive leaves
//! that share a mark prefix under one wrapper, so `[em]a [em,strong]b [em]c`
//! becomes `emphasis(a, strong(b), c)`.

use serde_json::{Map, Value};

use super::node::{Node as MdNode, Parent};
use crate::error::{Error, Result};
use crate::ir::{Mark, NodePath};
use crate::schema::{MarkCodec, Registry, SchemaPreset, Target, resolve_attrs, serialize_attrs};

/// Builds nested wrappers from a run of leaves with rank-sorted marks.
pub(crate) struct MarkStack<'r> {
    registry: &'r Registry,
    root: Vec<MdNode>,
    open: Vec<(Mark, Vec<MdNode>)>,
}

impl<'r> MarkStack<'r> {
    pub fn new(registry: &'r Registry) -> Self {
        Self {
            registry,
            root: Vec::new(),
            open: Vec::new(),
        }
    }

    /// Add a leaf carrying `marks` (wrapper marks only, outermost first).
    pub fn push(&mut self, marks: &[Mark], leaf: MdNode, path: &NodePath) -> Result<()> {
        let shared = self
            .open
            .iter()
            .zip(marks)
            .take_while(|((open, _), mark)| open == *mark)
            .count();
        while self.open.len() > shared {
            self.close(path)?;
        }
        for mark in &marks[shared..] {
            self.open.push((mark.clone(), Vec::new()));
        }
        self.top().push(leaf);
        Ok(())
    }

    /// Close every open wrapper and return the encoded run.
    pub fn finish(mut self, path: &NodePath) -> Result<Vec<MdNode>> {
        while !self.open.is_empty() {
            self.close(path)?;
        }
        Ok(self.root)
    }

    fn top(&mut self) -> &mut Vec<MdNode> {
        match self.open.last_mut() {
            Some((_, children)) => children,
            None => &mut self.root,
        }
    }

    fn close(&mut self, path: &NodePath) -> Result<()> {
        let Some((mark, children)) = self.open.pop() else {
            return Ok(());
        };
        let wrapper = wrap(self.registry, &mark, children, path)?;
        self.top().push(wrapper);
        Ok(())
    }
}

/// Wrap children in the mdast node for `mark`.
fn wrap(registry: &Registry, mark: &Mark, children: Vec<MdNode>, path: &NodePath) -> Result<MdNode> {
    let def = registry.lookup_mark(&mark.kind)?;
    let attrs = serialize_attrs(&def.attributes, &mark.attrs, Target::Mdast);
    let text = |key: &str| attrs.get(key).and_then(Value::as_str).map(str::to_string);

    Ok(match def.codec {
        MarkCodec::Link => MdNode::Link {
            url: text("href").unwrap_or_default(),
            title: text("title"),
            children,
        },
        MarkCodec::Abbreviation => MdNode::Abbreviation {
            title: text("title"),
            children,
        },
        MarkCodec::Emphasis => MdNode::Emphasis(Parent { children }),
        MarkCodec::Strong => MdNode::Strong(Parent { children }),
        MarkCodec::Underline => MdNode::Underline(Parent { children }),
        MarkCodec::Delete => MdNode::Delete(Parent { children }),
        MarkCodec::Superscript => MdNode::Superscript(Parent { children }),
        MarkCodec::Subscript => MdNode::Subscript(Parent { children }),
        MarkCodec::InlineCode => {
            return Err(Error::NoSerializerForNode {
                node: mark.kind.clone(),
                path: path.clone(),
            });
        }
    })
}

/// Split a node's marks into wrapper marks and whether `code` is among them.
pub(crate) fn split_code(registry: &Registry, marks: &[Mark]) -> (Vec<Mark>, bool) {
    let is_code = |m: &Mark| {
        registry
            .get_mark(&m.kind)
            .is_some_and(|d| d.codec == MarkCodec::InlineCode)
    };
    let code = marks.iter().any(is_code);
    let wrappers = marks.iter().filter(|m| !is_code(m)).cloned().collect();
    (wrappers, code)
}

/// Read the mark carried by a wrapper (or `inlineCode`) node.
pub(crate) fn unwrap(
    registry: &Registry,
    preset: &SchemaPreset,
    node: &MdNode,
    codec: MarkCodec,
    path: &NodePath,
) -> Result<Mark> {
    let Some(def) = registry.mark_for_codec(codec) else {
        return Err(Error::UnrecognizedMdastNode {
            node_type: node.type_name().to_string(),
            path: path.clone(),
        });
    };
    preset.check_mark(&def.name, path)?;

    let mut raw = Map::new();
    match node {
        MdNode::Link { url, title, .. } => {
            raw.insert("href".to_string(), Value::String(url.clone()));
            if let Some(title) = title {
                raw.insert("title".to_string(), Value::String(title.clone()));
            }
        }
        MdNode::Abbreviation { title: Some(title), .. } => {
            raw.insert("title".to_string(), Value::String(title.clone()));
        }
        _ => {}
    }

    Ok(Mark {
        kind: def.name.clone(),
        attrs: resolve_attrs(&def.name, &def.attributes, &raw, path)?,
    })
}
