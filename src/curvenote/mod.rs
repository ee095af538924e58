//! Curvenote document format (ProseMirror JSON).
//!
//! A document is a tree of `{type, attrs, content, marks, text}` objects.
//! [`from_json`] validates one against a preset and builds the IR;
//! [`to_json`] and [`to_yaml`] write it back out with every defaulted
//! attribute filled in.

mod decode;
mod encode;

pub use decode::{from_json, from_json_with};
pub use encode::{to_json, to_json_with};
#[cfg(feature = "yaml")]
pub use encode::{to_yaml, to_yaml_with};
