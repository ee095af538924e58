//! Built-in node and mark catalog.
//!
//! Registration order matters for marks: it defines mark rank, and so the
//! nesting of wrapper nodes in mdast (first registered is outermost).

use super::attr::{AttrKind, AttributeDescriptor, attr};
use super::definition::{Content, MarkCodec, MarkDefinition, MdastCodec, NodeDefinition, NodeGroup};

// ============================================================================
// Shared attribute sets
// ============================================================================

/// Attributes of nodes that can be numbered and cross-referenced.
fn numbered() -> Vec<AttributeDescriptor> {
    vec![
        attr("id"),
        attr("label"),
        attr("numbered").kind(AttrKind::Boolean).with_default(false),
    ]
}

/// Attributes of sliders (`range`, `dynamic`).
fn slider() -> Vec<AttributeDescriptor> {
    vec![
        attr("value").with_function(),
        attr("change").function_only(),
        attr("format"),
        attr("min").with_function().with_default("0"),
        attr("max").with_function().with_default("100"),
        attr("step").with_function().with_default("1"),
    ]
}

/// Attributes of toggles (`switch`, `checkbox`).
fn toggle() -> Vec<AttributeDescriptor> {
    vec![
        attr("value").with_function(),
        attr("change").function_only(),
        attr("label"),
    ]
}

fn figure(src: AttributeDescriptor) -> Vec<AttributeDescriptor> {
    vec![
        src,
        attr("align").with_default("center"),
        attr("width").kind(AttrKind::Integer).with_default(70),
    ]
}

fn cell() -> Vec<AttributeDescriptor> {
    vec![
        attr("align"),
        attr("colspan").kind(AttrKind::Integer).with_default(1),
        attr("rowspan").kind(AttrKind::Integer).with_default(1),
    ]
}

// ============================================================================
// Nodes
// ============================================================================

/// Built-in node definitions, in registration order.
pub(crate) fn nodes() -> Vec<NodeDefinition> {
    use Content as C;
    use MdastCodec as M;
    use NodeGroup as G;

    let mut heading = numbered();
    heading.push(
        attr("level")
            .required()
            .kind(AttrKind::Integer)
            .range(1, 6)
            .always_emit(),
    );

    let mut code_block = numbered();
    code_block.extend([
        attr("language"),
        attr("title"),
        attr("linenumbers").kind(AttrKind::Boolean).with_default(false),
    ]);

    let mut image = figure(attr("src").required());
    image.extend([attr("alt"), attr("title")]);

    vec![
        // Structure
        NodeDefinition::new("doc", "doc", G::Top, C::Block, M::Root),
        NodeDefinition::new("paragraph", "p", G::Block, C::Inline, M::Paragraph),
        NodeDefinition::new("text", "#text", G::Inline, C::Empty, M::Text),
        NodeDefinition::new("heading", "h", G::Block, C::Inline, M::Heading).with_attrs(heading),
        NodeDefinition::new("blockquote", "blockquote", G::Block, C::Block, M::Blockquote),
        NodeDefinition::new("horizontal_rule", "hr", G::Block, C::Empty, M::ThematicBreak),
        NodeDefinition::new("hard_break", "br", G::Inline, C::Empty, M::Break),
        NodeDefinition::new("code_block", "pre", G::Block, C::Text, M::Code)
            .with_attrs(code_block),
        // Lists
        NodeDefinition::new(
            "ordered_list",
            "ol",
            G::Block,
            C::Group(G::ListItem),
            M::List { ordered: true },
        )
        .with_attrs(vec![
            attr("order").kind(AttrKind::Integer).with_default(1).always_emit(),
        ]),
        NodeDefinition::new(
            "bullet_list",
            "ul",
            G::Block,
            C::Group(G::ListItem),
            M::List { ordered: false },
        ),
        NodeDefinition::new("list_item", "li", G::ListItem, C::Block, M::ListItem),
        // Media
        NodeDefinition::new("image", "img", G::Block, C::Empty, M::Image).with_attrs(image),
        NodeDefinition::new("iframe", "iframe", G::Block, C::Empty, M::Iframe)
            .with_attrs(figure(attr("src").required())),
        // Math
        NodeDefinition::new("math", "r-math", G::Inline, C::Text, M::InlineMath),
        NodeDefinition::new("equation", "r-equation", G::Block, C::Text, M::Math)
            .with_attrs(numbered()),
        // Tables
        NodeDefinition::new("table", "table", G::Block, C::Group(G::TableRow), M::Table),
        NodeDefinition::new(
            "table_row",
            "tr",
            G::TableRow,
            C::Group(G::TableCell),
            M::TableRow,
        ),
        NodeDefinition::new(
            "table_cell",
            "td",
            G::TableCell,
            C::Inline,
            M::TableCell { header: false },
        )
        .with_attrs(cell()),
        NodeDefinition::new(
            "table_header",
            "th",
            G::TableCell,
            C::Inline,
            M::TableCell { header: true },
        )
        .with_attrs(cell()),
        // Annotations
        NodeDefinition::new("footnote", "footnote", G::Inline, C::Inline, M::Footnote),
        NodeDefinition::new("aside", "aside", G::Block, C::Block, M::Aside),
        NodeDefinition::new("callout", "callout", G::Block, C::Block, M::Admonition)
            .with_attrs(vec![attr("kind").with_default("info").always_emit()]),
        NodeDefinition::new("cite", "cite", G::Inline, C::Empty, M::Cite)
            .with_attrs(vec![attr("key").required(), attr("kind")]),
        NodeDefinition::new("cite_group", "cite-group", G::Inline, C::Inline, M::CiteGroup)
            .with_attrs(vec![attr("kind")]),
        NodeDefinition::new("mention", "mention", G::Inline, C::Empty, M::Role)
            .with_attrs(vec![attr("user").required(), attr("label")]),
        // Reactive
        NodeDefinition::new("variable", "r-var", G::Block, C::Empty, M::Directive).with_attrs(
            vec![
                attr("name").required(),
                attr("value").with_function(),
                attr("format"),
            ],
        ),
        NodeDefinition::new("display", "r-display", G::Inline, C::Empty, M::Role)
            .with_attrs(vec![attr("value").with_function(), attr("format")]),
        NodeDefinition::new("dynamic", "r-dynamic", G::Inline, C::Empty, M::Role)
            .with_attrs(slider()),
        NodeDefinition::new("range", "r-range", G::Inline, C::Empty, M::Role)
            .with_attrs(slider()),
        NodeDefinition::new("switch", "r-switch", G::Inline, C::Empty, M::Role)
            .with_attrs(toggle()),
        NodeDefinition::new("checkbox", "r-checkbox", G::Inline, C::Empty, M::Role)
            .with_attrs(toggle()),
        NodeDefinition::new("button", "r-button", G::Inline, C::Empty, M::Role).with_attrs(vec![
            attr("label").with_function(),
            attr("disabled").with_function().with_default("false"),
            attr("click").function_only(),
        ]),
    ]
}

// ============================================================================
// Marks
// ============================================================================

/// Built-in mark definitions, outermost first.
pub(crate) fn marks() -> Vec<MarkDefinition> {
    vec![
        MarkDefinition::new("link", MarkCodec::Link)
            .with_attrs(vec![attr("href").required(), attr("title")]),
        MarkDefinition::new("abbr", MarkCodec::Abbreviation).with_attrs(vec![attr("title")]),
        MarkDefinition::new("em", MarkCodec::Emphasis),
        MarkDefinition::new("strong", MarkCodec::Strong),
        MarkDefinition::new("underline", MarkCodec::Underline),
        MarkDefinition::new("strikethrough", MarkCodec::Delete),
        MarkDefinition::new("superscript", MarkCodec::Superscript),
        MarkDefinition::new("subscript", MarkCodec::Subscript),
        MarkDefinition::new("code", MarkCodec::InlineCode),
    ]
}
