//! mdast support: the typed tree and both conversion directions.
//!
//! - [`to_mdast`] encodes an IR tree (curvenote → mdast)
//! - [`from_mdast`] decodes an mdast tree (mdast → curvenote)
//! - [`normalize_footnotes`] renumbers footnotes canonically
//!
//! # Example
//!
//! ```
//! use curvenote_schema::ir::Node;
//! use curvenote_schema::mdast::{self, EncodeOptions};
//!
//! let doc = Node::new("doc").with_child(
//!     Node::new("heading").with_attr("level", 1).with_child(Node::text("Intro")),
//! );
//! let tree = mdast::to_mdast(&doc, &EncodeOptions::new()).unwrap();
//! let back = mdast::from_mdast(&tree, "full").unwrap();
//! assert_eq!(back, doc);
//! ```

mod decode;
mod encode;
mod footnotes;
mod inline;
mod node;

pub use decode::{from_mdast, from_mdast_with};
pub use encode::{EncodeOptions, to_mdast, to_mdast_with};
pub use footnotes::normalize_footnotes;
pub use node::{Literal, Node, Parent};
