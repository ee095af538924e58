//! Intermediate Representation (IR) shared by every conversion.
//!
//! Both decoders (`from_json`, `from_mdast`) produce the same tree shape and
//! both encoders (`to_mdast`, `to_json`) consume it:
//! - A [`Node`] has a type name, sparse attributes, children, marks, and text
//! - [`AttrValue`] is either a literal or an expression reference
//! - [`NodePath`] locates a node for error messages
//!
//! # Example
//!
//! ```
//! use curvenote_schema::ir::{Mark, Node};
//!
//! let doc = Node::new("doc").with_child(
//!     Node::new("paragraph").with_child(Node::text("Hello").with_mark(Mark::new("em"))),
//! );
//! assert_eq!(doc.text_content(), "Hello");
//! assert_eq!(doc.iter_dfs().count(), 3);
//! ```

mod node;
mod path;

pub use node::{AttrValue, Attrs, DfsIter, Mark, Node};
pub use path::NodePath;
