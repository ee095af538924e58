//! # curvenote-schema
//!
//! Node schema and bidirectional conversion between curvenote documents
//! (ProseMirror JSON) and mdast.
//!
//! ## Features
//!
//! - One declarative [`Registry`](schema::Registry) of node and mark
//!   definitions drives every conversion
//! - Schema presets (`full`, `comment`, `paragraph`) restrict what a document
//!   may contain
//! - Reactive widgets (`range`, `switch`, `button`, ...) round-trip through
//!   MyST roles, including expression-bound attributes
//! - Footnotes are numbered canonically so trees from different producers
//!   compare equal
//!
//! ## Quick Start
//!
//! ```
//! use curvenote_schema::{EncodeOptions, from_json, from_mdast, to_json, to_mdast};
//! use serde_json::json;
//!
//! let doc = json!({
//!     "type": "doc",
//!     "content": [{"type": "heading", "attrs": {"level": 2}, "content": [
//!         {"type": "text", "text": "Results"}
//!     ]}]
//! });
//!
//! let tree = from_json(&doc, "full").unwrap();
//! let mdast = to_mdast(&tree, &EncodeOptions::new()).unwrap();
//! let back = from_mdast(&mdast, "full").unwrap();
//!
//! assert_eq!(to_json(&back)["content"][0]["attrs"]["numbered"], json!(false));
//! ```

pub mod curvenote;
pub mod error;
pub mod ir;
pub mod mdast;
pub mod schema;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use curvenote::{from_json, from_json_with, to_json, to_json_with};
#[cfg(feature = "yaml")]
pub use curvenote::{to_yaml, to_yaml_with};
pub use error::{Error, ErrorCategory, Result};
pub use ir::{AttrValue, Mark, Node, NodePath};
pub use mdast::{
    EncodeOptions, from_mdast, from_mdast_with, normalize_footnotes, to_mdast, to_mdast_with,
};
pub use schema::{PresetId, Registry, SchemaPreset, registry};
