//! Schema presets: named subsets of the registry.
//!
//! A preset restricts which nodes and marks a conversion accepts. Presets are
//! derived from the registry on every call, so a definition registered later
//! is picked up by `full` (and by `paragraph` if it is inline).

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::definition::{Content, NodeDefinition, NodeGroup};
use super::registry::Registry;
use crate::error::{Error, Result};
use crate::ir::{Node, NodePath};

/// Every registered node and mark.
pub const FULL: &str = "full";
/// Rich text suitable for comments: no headings, tables, or widgets.
pub const COMMENT: &str = "comment";
/// A single paragraph of inline content.
pub const PARAGRAPH: &str = "paragraph";

const COMMENT_NODES: &[&str] = &[
    "doc",
    "paragraph",
    "text",
    "hard_break",
    "blockquote",
    "code_block",
    "ordered_list",
    "bullet_list",
    "list_item",
    "horizontal_rule",
    "image",
    "math",
    "equation",
    "mention",
    "cite",
    "footnote",
];

/// What the document root may contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TopContent {
    /// Any sequence of blocks.
    #[default]
    Blocks,
    /// Exactly one paragraph.
    SingleParagraph,
}

/// A resolved preset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaPreset {
    pub name: String,
    pub nodes: BTreeSet<String>,
    pub marks: BTreeSet<String>,
    #[serde(default)]
    pub top: TopContent,
}

impl SchemaPreset {
    pub fn allows_node(&self, name: &str) -> bool {
        self.nodes.contains(name)
    }

    pub fn allows_mark(&self, name: &str) -> bool {
        self.marks.contains(name)
    }

    /// Fail with `NodeNotAllowedInSchema` unless `name` is in the preset.
    pub fn check_node(&self, name: &str, path: &NodePath) -> Result<()> {
        if self.allows_node(name) {
            return Ok(());
        }
        Err(Error::NodeNotAllowedInSchema {
            node: name.to_string(),
            preset: self.name.clone(),
            path: path.clone(),
        })
    }

    /// Fail with `MarkNotAllowedInSchema` unless `name` is in the preset.
    pub fn check_mark(&self, name: &str, path: &NodePath) -> Result<()> {
        if self.allows_mark(name) {
            return Ok(());
        }
        Err(Error::MarkNotAllowedInSchema {
            mark: name.to_string(),
            preset: self.name.clone(),
            path: path.clone(),
        })
    }

    /// Check decoded children against the parent's content rule.
    ///
    /// Children must already be valid nodes; only their placement is checked.
    pub fn check_content(
        &self,
        registry: &Registry,
        parent: &NodeDefinition,
        children: &[Node],
        path: &NodePath,
    ) -> Result<()> {
        for child in children {
            let def = registry.lookup(&child.kind)?;
            if !parent.content.accepts(def.group) {
                return Err(Error::content(
                    path,
                    format!("`{}` is not allowed inside `{}`", child.kind, parent.name),
                ));
            }
            if parent.content == Content::Text && (!child.is_text() || !child.marks.is_empty()) {
                return Err(Error::content(
                    path,
                    format!("`{}` holds plain text only", parent.name),
                ));
            }
        }

        if parent.group == NodeGroup::Top && self.top == TopContent::SingleParagraph {
            let single = matches!(children, [only] if only.kind == "paragraph");
            if !single {
                return Err(Error::content(
                    path,
                    format!("the `{}` schema holds exactly one paragraph", self.name),
                ));
            }
        }
        Ok(())
    }
}

/// A preset given by name or supplied directly.
#[derive(Debug, Clone, PartialEq)]
pub enum PresetId {
    Name(String),
    Preset(SchemaPreset),
}

impl Default for PresetId {
    fn default() -> Self {
        PresetId::Name(FULL.to_string())
    }
}

impl fmt::Display for PresetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PresetId::Name(name) => f.write_str(name),
            PresetId::Preset(preset) => f.write_str(&preset.name),
        }
    }
}

impl From<&str> for PresetId {
    fn from(name: &str) -> Self {
        PresetId::Name(name.to_string())
    }
}

impl From<String> for PresetId {
    fn from(name: String) -> Self {
        PresetId::Name(name)
    }
}

impl From<SchemaPreset> for PresetId {
    fn from(preset: SchemaPreset) -> Self {
        PresetId::Preset(preset)
    }
}

impl From<&SchemaPreset> for PresetId {
    fn from(preset: &SchemaPreset) -> Self {
        PresetId::Preset(preset.clone())
    }
}

impl From<&PresetId> for PresetId {
    fn from(id: &PresetId) -> Self {
        id.clone()
    }
}

/// Resolve a preset against the registry's current contents.
pub fn resolve(registry: &Registry, id: &PresetId) -> Result<SchemaPreset> {
    let name = match id {
        PresetId::Preset(preset) => return Ok(preset.clone()),
        PresetId::Name(name) => name.as_str(),
    };

    let all_marks = || registry.marks().map(|m| m.name.clone()).collect();
    match name {
        FULL => Ok(SchemaPreset {
            name: FULL.to_string(),
            nodes: registry.nodes().map(|n| n.name.clone()).collect(),
            marks: all_marks(),
            top: TopContent::Blocks,
        }),
        COMMENT => Ok(SchemaPreset {
            name: COMMENT.to_string(),
            nodes: COMMENT_NODES
                .iter()
                .filter(|name| registry.get(name).is_some())
                .map(|name| name.to_string())
                .collect(),
            marks: all_marks(),
            top: TopContent::Blocks,
        }),
        PARAGRAPH => Ok(SchemaPreset {
            name: PARAGRAPH.to_string(),
            nodes: registry
                .nodes()
                .filter(|n| n.inline() || n.name == "doc" || n.name == "paragraph")
                .map(|n| n.name.clone())
                .collect(),
            marks: all_marks(),
            top: TopContent::SingleParagraph,
        }),
        other => Err(Error::UnknownPreset {
            name: other.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_contains_everything() {
        let registry = Registry::builtin();
        let full = resolve(&registry, &PresetId::from(FULL)).unwrap();
        assert_eq!(full.nodes.len(), registry.nodes().count());
        assert!(full.allows_node("range"));
        assert!(full.allows_mark("abbr"));
    }

    #[test]
    fn test_comment_subset() {
        let registry = Registry::builtin();
        let comment = resolve(&registry, &PresetId::from(COMMENT)).unwrap();
        assert!(comment.allows_node("paragraph"));
        assert!(comment.allows_node("footnote"));
        assert!(!comment.allows_node("heading"));
        assert!(!comment.allows_node("table"));
        assert!(!comment.allows_node("range"));
        assert!(comment.allows_mark("link"));
    }

    #[test]
    fn test_paragraph_is_inline_only() {
        let registry = Registry::builtin();
        let preset = resolve(&registry, &PresetId::from(PARAGRAPH)).unwrap();
        assert_eq!(preset.top, TopContent::SingleParagraph);
        assert!(preset.allows_node("range"));
        assert!(preset.allows_node("math"));
        assert!(!preset.allows_node("heading"));
        assert!(!preset.allows_node("blockquote"));
    }

    #[test]
    fn test_unknown_preset() {
        let registry = Registry::builtin();
        let err = resolve(&registry, &PresetId::from("fancy")).unwrap_err();
        assert!(matches!(err, Error::UnknownPreset { ref name } if name == "fancy"));
    }

    #[test]
    fn test_custom_preset_from_json() {
        let preset: SchemaPreset = serde_json::from_str(
            r#"{"name": "notes", "nodes": ["doc", "paragraph", "text"], "marks": ["em"]}"#,
        )
        .unwrap();
        assert_eq!(preset.top, TopContent::Blocks);

        let registry = Registry::builtin();
        let resolved = resolve(&registry, &PresetId::from(&preset)).unwrap();
        assert_eq!(resolved, preset);
    }

    #[test]
    fn test_single_paragraph_rule() {
        let registry = Registry::builtin();
        let preset = resolve(&registry, &PresetId::from(PARAGRAPH)).unwrap();
        let doc = registry.lookup("doc").unwrap();
        let path = NodePath::root("doc");

        let one = vec![Node::new("paragraph")];
        assert!(preset.check_content(&registry, doc, &one, &path).is_ok());

        let two = vec![Node::new("paragraph"), Node::new("paragraph")];
        let err = preset.check_content(&registry, doc, &two, &path).unwrap_err();
        assert!(matches!(err, Error::ContentViolation { .. }));
    }

    #[test]
    fn test_content_rule_violation() {
        let registry = Registry::builtin();
        let preset = resolve(&registry, &PresetId::default()).unwrap();
        let doc = registry.lookup("doc").unwrap();

        let err = preset
            .check_content(&registry, doc, &[Node::text("loose")], &NodePath::root("doc"))
            .unwrap_err();
        assert!(matches!(err, Error::ContentViolation { .. }));
    }
}
