//! Location of a node within a tree, for error reporting.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Segment {
    kind: String,
    index: Option<usize>,
}

/// Path from the root to a node, rendered as `doc/paragraph[1]/text[0]`.
///
/// Decoders keep one path per call and push/pop while walking; errors take a
/// clone so the offending node can be located in the original document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodePath {
    segments: Vec<Segment>,
}

impl NodePath {
    /// Create a path consisting of the root node only.
    pub fn root(kind: impl Into<String>) -> Self {
        Self {
            segments: vec![Segment {
                kind: kind.into(),
                index: None,
            }],
        }
    }

    /// Descend into the child at `index`.
    pub fn push(&mut self, kind: impl Into<String>, index: usize) {
        self.segments.push(Segment {
            kind: kind.into(),
            index: Some(index),
        });
    }

    /// Return to the parent.
    pub fn pop(&mut self) {
        self.segments.pop();
    }

    /// Rename the last segment once its type is known.
    pub fn set_kind(&mut self, kind: impl Into<String>) {
        if let Some(last) = self.segments.last_mut() {
            last.kind = kind.into();
        }
    }

    /// Number of segments.
    pub fn depth(&self) -> usize {
        self.segments.len()
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return f.write_str("<root>");
        }
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            f.write_str(&segment.kind)?;
            if let Some(index) = segment.index {
                write!(f, "[{index}]")?;
            }
        }
        Ok(())
    }
}
