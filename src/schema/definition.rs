//! Node and mark definitions.
//!
//! A definition is plain data: its name, tag, attribute descriptors, content
//! rule, and a codec strategy naming how it maps onto mdast. The converters
//! interpret the strategy generically, the same way for every definition.

use super::attr::AttributeDescriptor;

/// Grouping a node belongs to, matched against a parent's [`Content`] rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeGroup {
    /// The document root; never a child.
    Top,
    Block,
    Inline,
    ListItem,
    TableRow,
    TableCell,
}

/// What a node may contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Content {
    /// A leaf.
    Empty,
    /// Unmarked text leaves only (code, math).
    Text,
    /// Inline nodes.
    Inline,
    /// Block nodes.
    Block,
    /// Nodes of one specific group.
    Group(NodeGroup),
}

impl Content {
    /// Check whether a child in `group` is allowed.
    pub fn accepts(self, group: NodeGroup) -> bool {
        match self {
            Content::Empty => false,
            Content::Text | Content::Inline => group == NodeGroup::Inline,
            Content::Block => group == NodeGroup::Block,
            Content::Group(g) => g == group,
        }
    }
}

/// How a node maps onto mdast.
///
/// Native variants correspond to a standard mdast (or MyST) node type. `Role`
/// and `Directive` carry the node as a `mystRole` / `mystDirective` named by
/// the definition's tag, with attributes passed as string arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MdastCodec {
    Root,
    Paragraph,
    Text,
    Heading,
    Blockquote,
    ThematicBreak,
    Break,
    Code,
    List { ordered: bool },
    ListItem,
    Image,
    Iframe,
    InlineMath,
    Math,
    Table,
    TableRow,
    TableCell { header: bool },
    /// `footnoteReference` plus a `footnoteDefinition` on the root.
    Footnote,
    Aside,
    Admonition,
    Cite,
    CiteGroup,
    /// Inline extension carried as `mystRole`.
    Role,
    /// Block extension carried as `mystDirective`.
    Directive,
}

/// How a mark maps onto mdast. All but `InlineCode` are wrapper nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkCodec {
    Link,
    Abbreviation,
    Emphasis,
    Strong,
    Underline,
    Delete,
    Superscript,
    Subscript,
    /// Turns a text leaf into `inlineCode`.
    InlineCode,
}

/// Definition of one node type.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeDefinition {
    /// Type name used in curvenote JSON (`heading`).
    pub name: String,
    /// Alternate lookup key, unique across the registry (`h`, `r-range`).
    pub tag: String,
    /// Attribute descriptors in emission order.
    pub attributes: Vec<AttributeDescriptor>,
    pub group: NodeGroup,
    pub content: Content,
    pub codec: MdastCodec,
}

impl NodeDefinition {
    pub fn new(name: &str, tag: &str, group: NodeGroup, content: Content, codec: MdastCodec) -> Self {
        Self {
            name: name.to_string(),
            tag: tag.to_string(),
            attributes: Vec::new(),
            group,
            content,
            codec,
        }
    }

    /// Set the attribute descriptors.
    pub fn with_attrs(mut self, attributes: Vec<AttributeDescriptor>) -> Self {
        self.attributes = attributes;
        self
    }

    /// Inline nodes live inside paragraphs and may carry marks.
    pub fn inline(&self) -> bool {
        self.group == NodeGroup::Inline
    }

    pub fn attribute(&self, name: &str) -> Option<&AttributeDescriptor> {
        self.attributes.iter().find(|a| a.name == name)
    }
}

/// Definition of one mark type.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkDefinition {
    pub name: String,
    pub attributes: Vec<AttributeDescriptor>,
    pub codec: MarkCodec,
}

impl MarkDefinition {
    pub fn new(name: &str, codec: MarkCodec) -> Self {
        Self {
            name: name.to_string(),
            attributes: Vec::new(),
            codec,
        }
    }

    pub fn with_attrs(mut self, attributes: Vec<AttributeDescriptor>) -> Self {
        self.attributes = attributes;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::attr;

    #[test]
    fn test_content_accepts() {
        assert!(Content::Block.accepts(NodeGroup::Block));
        assert!(!Content::Block.accepts(NodeGroup::Inline));
        assert!(Content::Inline.accepts(NodeGroup::Inline));
        assert!(Content::Group(NodeGroup::ListItem).accepts(NodeGroup::ListItem));
        assert!(!Content::Group(NodeGroup::ListItem).accepts(NodeGroup::Block));
        assert!(!Content::Empty.accepts(NodeGroup::Inline));
        assert!(!Content::Block.accepts(NodeGroup::Top));
    }

    #[test]
    fn test_attribute_lookup() {
        let def = NodeDefinition::new(
            "heading",
            "h",
            NodeGroup::Block,
            Content::Inline,
            MdastCodec::Heading,
        )
        .with_attrs(vec![attr("id"), attr("label")]);

        assert!(!def.inline());
        assert!(def.attribute("label").is_some());
        assert!(def.attribute("level").is_none());
    }
}
