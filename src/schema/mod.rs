//! Schema: the single source of truth for every conversion.
//!
//! Each node type is declared once as a [`NodeDefinition`] (attributes,
//! grouping, content rule, mdast codec) and each mark as a
//! [`MarkDefinition`]. The converters only interpret these definitions; no
//! converter knows about a specific node type.
//!
//! - [`Registry`] holds definitions and lookup tables for every direction
//! - [`AttributeDescriptor`] drives attribute validation and defaulting
//! - [`SchemaPreset`] restricts a conversion to a subset of the registry

mod attr;
mod catalog;
mod definition;
mod preset;
mod registry;

pub use attr::{
    AttrKind, AttributeDescriptor, FunctionVariant, OmitPolicy, Target, attr, resolve_attrs,
    serialize_attrs,
};
pub use definition::{Content, MarkCodec, MarkDefinition, MdastCodec, NodeDefinition, NodeGroup};
pub use preset::{COMMENT, FULL, PARAGRAPH, PresetId, SchemaPreset, TopContent};
pub use registry::{MdastKey, Registry, registry};
