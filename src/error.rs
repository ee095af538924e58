//! Error types for schema and conversion operations.

use thiserror::Error;

use crate::ir::NodePath;

/// Errors that can occur while registering definitions or converting documents.
#[derive(Error, Debug)]
pub enum Error {
    // --- Registry ---
    #[error("node type `{name}` is already registered")]
    DuplicateNodeName { name: String },

    #[error("mark type `{name}` is already registered")]
    DuplicateMarkName { name: String },

    #[error("tag `{tag}` is already registered")]
    DuplicateTag { tag: String },

    #[error("mdast shape {key} is already claimed by `{existing}`")]
    DuplicateMatcher { key: String, existing: String },

    #[error("unknown node type `{name}`")]
    UnknownNodeType { name: String },

    #[error("unknown mark type `{name}`")]
    UnknownMarkType { name: String },

    #[error("no node definition has tag `{tag}`")]
    UnknownTag { tag: String },

    // --- Schema ---
    #[error("unknown schema preset `{name}`")]
    UnknownPreset { name: String },

    #[error("node `{node}` is not allowed in the `{preset}` schema (at {path})")]
    NodeNotAllowedInSchema {
        node: String,
        preset: String,
        path: NodePath,
    },

    #[error("mark `{mark}` is not allowed in the `{preset}` schema (at {path})")]
    MarkNotAllowedInSchema {
        mark: String,
        preset: String,
        path: NodePath,
    },

    // --- Structure ---
    #[error("malformed document at {path}: {message}")]
    MalformedDocument { path: NodePath, message: String },

    #[error("`{node}` is missing required attribute `{attr}` (at {path})")]
    MissingRequiredAttribute {
        node: String,
        attr: String,
        path: NodePath,
    },

    #[error("`{node}` has no attribute `{attr}` (at {path})")]
    UnknownAttribute {
        node: String,
        attr: String,
        path: NodePath,
    },

    #[error("`{node}` sets both `{attr}` and `{attr}Function` (at {path})")]
    ConflictingAttribute {
        node: String,
        attr: String,
        path: NodePath,
    },

    #[error("invalid content at {path}: {message}")]
    ContentViolation { path: NodePath, message: String },

    #[error("footnote `{identifier}` has no definition (at {path})")]
    UndefinedFootnote { identifier: String, path: NodePath },

    // --- Serialization ---
    #[error("no mdast serializer for node `{node}` (at {path})")]
    NoSerializerForNode { node: String, path: NodePath },

    #[error("no node definition matches mdast `{node_type}` (at {path})")]
    UnrecognizedMdastNode { node_type: String, path: NodePath },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[cfg(feature = "yaml")]
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Broad classes of failure, for callers that decide how to surface an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// A definition conflicts with one already in the registry.
    Registry,
    /// Content is legal in some preset but not the active one. Caller-correctable.
    Schema,
    /// The document itself is corrupt or hand-edited.
    Structure,
    /// The catalog cannot express content that is actually present.
    Serialization,
}

impl Error {
    /// Classify this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::DuplicateNodeName { .. }
            | Error::DuplicateMarkName { .. }
            | Error::DuplicateTag { .. }
            | Error::DuplicateMatcher { .. } => ErrorCategory::Registry,

            Error::UnknownPreset { .. }
            | Error::NodeNotAllowedInSchema { .. }
            | Error::MarkNotAllowedInSchema { .. } => ErrorCategory::Schema,

            Error::UnknownNodeType { .. }
            | Error::UnknownMarkType { .. }
            | Error::UnknownTag { .. }
            | Error::MalformedDocument { .. }
            | Error::MissingRequiredAttribute { .. }
            | Error::UnknownAttribute { .. }
            | Error::ConflictingAttribute { .. }
            | Error::ContentViolation { .. }
            | Error::UndefinedFootnote { .. } => ErrorCategory::Structure,

            Error::NoSerializerForNode { .. } | Error::UnrecognizedMdastNode { .. } => {
                ErrorCategory::Serialization
            }
            Error::Json(_) => ErrorCategory::Serialization,
            #[cfg(feature = "yaml")]
            Error::Yaml(_) => ErrorCategory::Serialization,
        }
    }

    pub(crate) fn malformed(path: &NodePath, message: impl Into<String>) -> Self {
        Error::MalformedDocument {
            path: path.clone(),
            message: message.into(),
        }
    }

    pub(crate) fn content(path: &NodePath, message: impl Into<String>) -> Self {
        Error::ContentViolation {
            path: path.clone(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_schema() {
        let err = Error::NodeNotAllowedInSchema {
            node: "table".to_string(),
            preset: "comment".to_string(),
            path: NodePath::root("doc"),
        };
        assert_eq!(err.category(), ErrorCategory::Schema);
        assert_eq!(
            err.to_string(),
            "node `table` is not allowed in the `comment` schema (at doc)"
        );
    }

    #[test]
    fn test_category_serialization() {
        let err = Error::UnrecognizedMdastNode {
            node_type: "html".to_string(),
            path: NodePath::root("root"),
        };
        assert_eq!(err.category(), ErrorCategory::Serialization);
    }

    #[test]
    fn test_conflicting_attribute_message() {
        let err = Error::ConflictingAttribute {
            node: "range".to_string(),
            attr: "value".to_string(),
            path: NodePath::root("doc"),
        };
        assert!(err.to_string().contains("`value` and `valueFunction`"));
    }
}
