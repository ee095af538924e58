//! Definition registry with lookup tables for every direction.
//!
//! ```text
//!               ┌────────────────── Registry ──────────────────┐
//!  from_json ──►│ by_name / by_tag      (name, tag → node)     │
//!  from_mdast ─►│ by_mdast              (mdast shape → node)   │
//!               │ marks_by_codec        (wrapper → mark)       │
//!  to_mdast ───►│ nodes[i].codec, marks[i].codec               │
//!               └──────────────────────────────────────────────┘
//! ```
//!
//! Registration is the only mutation. After construction a registry is shared
//! read-only; conversions never write to it.

use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

use super::catalog;
use super::definition::{MarkCodec, MarkDefinition, MdastCodec, NodeDefinition};
use super::preset::{self, PresetId, SchemaPreset};
use crate::error::{Error, Result};
use crate::ir::Mark;

// ============================================================================
// mdast matching keys
// ============================================================================

/// The mdast shape a definition claims when decoding.
///
/// Most codecs claim an mdast type outright. Lists and table cells are split
/// on a discriminating field, and roles and directives on their name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MdastKey {
    Type(&'static str),
    List { ordered: bool },
    TableCell { header: bool },
    Role(String),
    Directive(String),
}

impl MdastKey {
    /// Key claimed by a definition.
    pub fn for_definition(def: &NodeDefinition) -> MdastKey {
        match def.codec {
            MdastCodec::Root => MdastKey::Type("root"),
            MdastCodec::Paragraph => MdastKey::Type("paragraph"),
            MdastCodec::Text => MdastKey::Type("text"),
            MdastCodec::Heading => MdastKey::Type("heading"),
            MdastCodec::Blockquote => MdastKey::Type("blockquote"),
            MdastCodec::ThematicBreak => MdastKey::Type("thematicBreak"),
            MdastCodec::Break => MdastKey::Type("break"),
            MdastCodec::Code => MdastKey::Type("code"),
            MdastCodec::List { ordered } => MdastKey::List { ordered },
            MdastCodec::ListItem => MdastKey::Type("listItem"),
            MdastCodec::Image => MdastKey::Type("image"),
            MdastCodec::Iframe => MdastKey::Type("iframe"),
            MdastCodec::InlineMath => MdastKey::Type("inlineMath"),
            MdastCodec::Math => MdastKey::Type("math"),
            MdastCodec::Table => MdastKey::Type("table"),
            MdastCodec::TableRow => MdastKey::Type("tableRow"),
            MdastCodec::TableCell { header } => MdastKey::TableCell { header },
            MdastCodec::Footnote => MdastKey::Type("footnoteReference"),
            MdastCodec::Aside => MdastKey::Type("aside"),
            MdastCodec::Admonition => MdastKey::Type("admonition"),
            MdastCodec::Cite => MdastKey::Type("cite"),
            MdastCodec::CiteGroup => MdastKey::Type("citeGroup"),
            MdastCodec::Role => MdastKey::Role(def.tag.clone()),
            MdastCodec::Directive => MdastKey::Directive(def.tag.clone()),
        }
    }
}

impl fmt::Display for MdastKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MdastKey::Type(t) => f.write_str(t),
            MdastKey::List { ordered } => write!(f, "list(ordered={ordered})"),
            MdastKey::TableCell { header } => write!(f, "tableCell(header={header})"),
            MdastKey::Role(name) => write!(f, "mystRole({name})"),
            MdastKey::Directive(name) => write!(f, "mystDirective({name})"),
        }
    }
}

// ============================================================================
// Registry
// ============================================================================

/// Node and mark definitions with bidirectional lookup tables.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    /// Node definitions in registration order
    nodes: Vec<NodeDefinition>,
    by_name: HashMap<String, usize>,
    by_tag: HashMap<String, usize>,
    by_mdast: HashMap<MdastKey, usize>,
    /// Mark definitions; index is mark rank
    marks: Vec<MarkDefinition>,
    marks_by_name: HashMap<String, usize>,
    marks_by_codec: HashMap<MarkCodec, usize>,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the built-in catalog.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for def in catalog::nodes() {
            registry
                .register(def)
                .expect("built-in node catalog is conflict-free");
        }
        for def in catalog::marks() {
            registry
                .register_mark(def)
                .expect("built-in mark catalog is conflict-free");
        }
        registry
    }

    /// Add a node definition.
    pub fn register(&mut self, def: NodeDefinition) -> Result<()> {
        if self.by_name.contains_key(&def.name) {
            return Err(Error::DuplicateNodeName { name: def.name });
        }
        if self.by_tag.contains_key(&def.tag) {
            return Err(Error::DuplicateTag { tag: def.tag });
        }
        let key = MdastKey::for_definition(&def);
        if let Some(&existing) = self.by_mdast.get(&key) {
            return Err(Error::DuplicateMatcher {
                key: key.to_string(),
                existing: self.nodes[existing].name.clone(),
            });
        }

        let index = self.nodes.len();
        self.by_name.insert(def.name.clone(), index);
        self.by_tag.insert(def.tag.clone(), index);
        self.by_mdast.insert(key, index);
        self.nodes.push(def);
        Ok(())
    }

    /// Add a mark definition. Marks registered later nest inside earlier ones.
    pub fn register_mark(&mut self, def: MarkDefinition) -> Result<()> {
        if self.marks_by_name.contains_key(&def.name) {
            return Err(Error::DuplicateMarkName { name: def.name });
        }
        if let Some(&existing) = self.marks_by_codec.get(&def.codec) {
            return Err(Error::DuplicateMatcher {
                key: format!("{:?}", def.codec),
                existing: self.marks[existing].name.clone(),
            });
        }

        let index = self.marks.len();
        self.marks_by_name.insert(def.name.clone(), index);
        self.marks_by_codec.insert(def.codec, index);
        self.marks.push(def);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&NodeDefinition> {
        self.by_name.get(name).map(|&i| &self.nodes[i])
    }

    /// Look up a node definition by name.
    pub fn lookup(&self, name: &str) -> Result<&NodeDefinition> {
        self.get(name).ok_or_else(|| Error::UnknownNodeType {
            name: name.to_string(),
        })
    }

    /// Look up a node definition by tag.
    pub fn lookup_by_tag(&self, tag: &str) -> Result<&NodeDefinition> {
        self.by_tag
            .get(tag)
            .map(|&i| &self.nodes[i])
            .ok_or_else(|| Error::UnknownTag {
                tag: tag.to_string(),
            })
    }

    pub fn get_mark(&self, name: &str) -> Option<&MarkDefinition> {
        self.marks_by_name.get(name).map(|&i| &self.marks[i])
    }

    /// Look up a mark definition by name.
    pub fn lookup_mark(&self, name: &str) -> Result<&MarkDefinition> {
        self.get_mark(name).ok_or_else(|| Error::UnknownMarkType {
            name: name.to_string(),
        })
    }

    /// Find the node definition claiming an mdast shape.
    pub fn match_mdast(&self, key: &MdastKey) -> Option<&NodeDefinition> {
        self.by_mdast.get(key).map(|&i| &self.nodes[i])
    }

    /// Find the mark carried by an mdast wrapper.
    pub fn mark_for_codec(&self, codec: MarkCodec) -> Option<&MarkDefinition> {
        self.marks_by_codec.get(&codec).map(|&i| &self.marks[i])
    }

    /// Node definitions in registration order.
    pub fn nodes(&self) -> impl Iterator<Item = &NodeDefinition> {
        self.nodes.iter()
    }

    /// Mark definitions in rank order.
    pub fn marks(&self) -> impl Iterator<Item = &MarkDefinition> {
        self.marks.iter()
    }

    /// Rank of a mark; unknown marks sort last.
    pub fn mark_rank(&self, name: &str) -> usize {
        self.marks_by_name.get(name).copied().unwrap_or(usize::MAX)
    }

    /// Sort marks by rank, dropping repeats of the same mark type.
    pub fn normalize_marks(&self, marks: &mut Vec<Mark>) {
        marks.sort_by_key(|m| self.mark_rank(&m.kind));
        marks.dedup_by(|a, b| a.kind == b.kind);
    }

    /// Resolve a preset against this registry.
    pub fn resolve_preset(&self, id: impl Into<PresetId>) -> Result<SchemaPreset> {
        preset::resolve(self, &id.into())
    }
}

// ============================================================================
// Global Registry Instance
// ============================================================================

static REGISTRY: OnceLock<Registry> = OnceLock::new();

/// Get the process-wide built-in registry.
pub fn registry() -> &'static Registry {
    REGISTRY.get_or_init(Registry::builtin)
}

// ============================================================================
// Tests
// ============================================================================
