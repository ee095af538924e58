//! Canonical footnote numbering.
//!
//! Renumbers footnote identifiers to `1, 2, 3, …` by first reference in
//! document order, so that trees from different producers compare equal. The
//! pass is a pure function of its input and running it twice changes nothing.

use std::collections::HashMap;

use tracing::debug;

use super::node::Node;

/// Old identifier → canonical ordinal.
#[derive(Default)]
struct Numbering {
    ordinals: HashMap<String, String>,
}

impl Numbering {
    fn assign(&mut self, identifier: &str) {
        if !self.ordinals.contains_key(identifier) {
            let next = (self.ordinals.len() + 1).to_string();
            self.ordinals.insert(identifier.to_string(), next);
        }
    }

    fn get(&self, identifier: &str) -> Option<&String> {
        self.ordinals.get(identifier)
    }
}

/// Renumber footnote references and definitions in place order.
///
/// - Each distinct reference identifier gets its first-occurrence ordinal;
///   repeated references keep the ordinal of their first occurrence
/// - Definitions follow their reference's new identifier
/// - Definitions nothing refers to are numbered after all referenced ones,
///   in document order
/// - Labels are rewritten alongside identifiers
///
/// No nodes are added, removed, or reordered.
pub fn normalize_footnotes(mut tree: Node) -> Node {
    let mut numbering = Numbering::default();
    tree.walk(&mut |node| {
        if let Node::FootnoteReference { identifier, .. } = node {
            numbering.assign(identifier);
        }
    });
    let referenced = numbering.ordinals.len();
    tree.walk(&mut |node| {
        if let Node::FootnoteDefinition { identifier, .. } = node {
            numbering.assign(identifier);
        }
    });

    tree.walk_mut(&mut |node| match node {
        Node::FootnoteReference { identifier, label }
        | Node::FootnoteDefinition {
            identifier, label, ..
        } => {
            if let Some(ordinal) = numbering.get(identifier) {
                *identifier = ordinal.clone();
                if label.is_some() {
                    *label = Some(ordinal.clone());
                }
            }
        }
        _ => {}
    });

    debug!(
        referenced,
        orphans = numbering.ordinals.len() - referenced,
        "normalized footnotes"
    );
    tree
}
