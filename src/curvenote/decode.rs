//! Curvenote JSON → IR.

use serde_json::{Map, Value};
use tracing::{debug, instrument, trace};

use crate::error::{Error, Result};
use crate::ir::{Mark, Node, NodePath};
use crate::schema::{
    Content, MarkCodec, PresetId, Registry, SchemaPreset, registry, resolve_attrs,
};

/// Decode a curvenote document using the built-in registry.
pub fn from_json(doc: &Value, preset: impl Into<PresetId>) -> Result<Node> {
    from_json_with(registry(), doc, preset)
}

/// Decode a curvenote document.
///
/// Node types are looked up by name, then by tag. Children may be given under
/// `content` or, in older documents, `children`.
#[instrument(skip(registry, doc, preset))]
pub fn from_json_with(registry: &Registry, doc: &Value, preset: impl Into<PresetId>) -> Result<Node> {
    let preset = registry.resolve_preset(preset)?;
    let mut decoder = Decoder {
        registry,
        preset: &preset,
        path: NodePath::root("?"),
        count: 0,
    };
    let node = decoder.decode(doc)?;
    debug!(preset = %preset.name, nodes = decoder.count, "decoded curvenote document");
    Ok(node)
}

struct Decoder<'a> {
    registry: &'a Registry,
    preset: &'a SchemaPreset,
    path: NodePath,
    count: usize,
}

impl Decoder<'_> {
    fn decode(&mut self, value: &Value) -> Result<Node> {
        let Some(obj) = value.as_object() else {
            return Err(Error::malformed(&self.path, "node must be an object"));
        };
        let Some(kind) = obj.get("type").and_then(Value::as_str) else {
            return Err(Error::malformed(&self.path, "node has no `type`"));
        };

        let registry = self.registry;
        let def = match registry.lookup(kind) {
            Ok(def) => def,
            Err(err) => registry.lookup_by_tag(kind).map_err(|_| err)?,
        };
        self.path.set_kind(def.name.as_str());
        self.preset.check_node(&def.name, &self.path)?;
        trace!(node = %def.name, path = %self.path, "decode");
        self.count += 1;

        let empty = Map::new();
        let raw = match obj.get("attrs") {
            None | Some(Value::Null) => &empty,
            Some(Value::Object(attrs)) => attrs,
            Some(_) => return Err(Error::malformed(&self.path, "`attrs` must be an object")),
        };

        let mut node = Node::new(def.name.as_str());
        node.attrs = resolve_attrs(&def.name, &def.attributes, raw, &self.path)?;

        if node.is_text() {
            let text = obj.get("text").and_then(Value::as_str).unwrap_or_default();
            if text.is_empty() {
                return Err(Error::malformed(&self.path, "text nodes need non-empty `text`"));
            }
            node.text = Some(text.to_string());
        }

        if let Some(marks) = obj.get("marks") {
            node.marks = self.decode_marks(marks)?;
            if !node.marks.is_empty() && !def.inline() {
                return Err(Error::malformed(
                    &self.path,
                    format!("`{}` is not inline and cannot carry marks", def.name),
                ));
            }
            check_code_marks(self.registry, &node, &self.path)?;
        }

        let children = match obj.get("content").or_else(|| obj.get("children")) {
            None | Some(Value::Null) => &[][..],
            Some(Value::Array(children)) => children.as_slice(),
            Some(_) => return Err(Error::malformed(&self.path, "`content` must be an array")),
        };
        if def.content == Content::Empty && !children.is_empty() {
            return Err(Error::content(
                &self.path,
                format!("`{}` cannot have children", def.name),
            ));
        }
        for (i, child) in children.iter().enumerate() {
            self.path.push("?", i);
            node.content.push(self.decode(child)?);
            self.path.pop();
        }
        self.preset
            .check_content(self.registry, def, &node.content, &self.path)?;

        Ok(node)
    }

    fn decode_marks(&self, value: &Value) -> Result<Vec<Mark>> {
        let Some(items) = value.as_array() else {
            return Err(Error::malformed(&self.path, "`marks` must be an array"));
        };

        let mut marks = Vec::with_capacity(items.len());
        for item in items {
            let Some(kind) = item.get("type").and_then(Value::as_str) else {
                return Err(Error::malformed(&self.path, "mark has no `type`"));
            };
            let def = self.registry.lookup_mark(kind)?;
            self.preset.check_mark(&def.name, &self.path)?;

            let empty = Map::new();
            let raw = item.get("attrs").and_then(Value::as_object).unwrap_or(&empty);
            marks.push(Mark {
                kind: def.name.clone(),
                attrs: resolve_attrs(&def.name, &def.attributes, raw, &self.path)?,
            });
        }

        self.registry.normalize_marks(&mut marks);
        Ok(marks)
    }
}

/// Check that `code` marks only sit on text leaves.
fn check_code_marks(registry: &Registry, node: &Node, path: &NodePath) -> Result<()> {
    let has_code = node.marks.iter().any(|m| {
        registry
            .get_mark(&m.kind)
            .is_some_and(|d| d.codec == MarkCodec::InlineCode)
    });
    if has_code && !node.is_text() {
        return Err(Error::malformed(
            path,
            format!("`{}` cannot carry the code mark", node.kind),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::AttrValue;
    use serde_json::json;

    #[test]
    fn test_decode_paragraph() {
        let doc = json!({
            "type": "doc",
            "content": [{"type": "paragraph", "content": [
                {"type": "text", "text": "Hi ", "marks": [{"type": "strong"}, {"type": "em"}]},
                {"type": "text", "text": "there"}
            ]}]
        });
        let node = from_json(&doc, "full").unwrap();
        let text = &node.content[0].content[0];
        let kinds: Vec<_> = text.marks.iter().map(|m| m.kind.as_str()).collect();
        assert_eq!(kinds, vec!["em", "strong"]);
    }

    #[test]
    fn test_tag_fallback_and_legacy_children() {
        let doc = json!({
            "type": "doc",
            "children": [{"type": "p", "children": [{"type": "r-range", "attrs": {"value": "3"}}]}]
        });
        let node = from_json(&doc, "full").unwrap();
        let range = &node.content[0].content[0];
        assert_eq!(range.kind, "range");
        assert_eq!(range.attr("value"), Some(&AttrValue::literal("3")));
    }

    #[test]
    fn test_defaults_not_stored() {
        let doc = json!({
            "type": "doc",
            "content": [{"type": "heading", "attrs": {"level": 2}}]
        });
        let node = from_json(&doc, "full").unwrap();
        assert_eq!(node.content[0].attrs.len(), 1);
    }

    #[test]
    fn test_comment_preset_rejects_heading() {
        let doc = json!({
            "type": "doc",
            "content": [{"type": "heading", "attrs": {"level": 1}}]
        });
        let err = from_json(&doc, "comment").unwrap_err();
        match err {
            Error::NodeNotAllowedInSchema { node, preset, path } => {
                assert_eq!(node, "heading");
                assert_eq!(preset, "comment");
                assert_eq!(path.to_string(), "doc/heading[0]");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unknown_type() {
        let doc = json!({"type": "doc", "content": [{"type": "marquee"}]});
        let err = from_json(&doc, "full").unwrap_err();
        assert!(matches!(err, Error::UnknownNodeType { ref name } if name == "marquee"));
    }

    #[test]
    fn test_missing_level() {
        let doc = json!({"type": "doc", "content": [{"type": "heading"}]});
        let err = from_json(&doc, "full").unwrap_err();
        assert!(matches!(err, Error::MissingRequiredAttribute { ref attr, .. } if attr == "level"));
    }

    #[test]
    fn test_heading_level_out_of_range() {
        let doc = json!({"type": "doc", "content": [{"type": "heading", "attrs": {"level": 9}}]});
        let err = from_json(&doc, "full").unwrap_err();
        match err {
            Error::MalformedDocument { path, .. } => assert_eq!(path.to_string(), "doc/heading[0]"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_marks_on_block() {
        let doc = json!({
            "type": "doc",
            "content": [{"type": "paragraph", "marks": [{"type": "em"}]}]
        });
        let err = from_json(&doc, "full").unwrap_err();
        assert!(matches!(err, Error::MalformedDocument { .. }));
    }

    #[test]
    fn test_code_mark_on_math() {
        let doc = json!({
            "type": "doc",
            "content": [{"type": "paragraph", "content": [
                {"type": "math", "marks": [{"type": "code"}], "content": [{"type": "text", "text": "x"}]}
            ]}]
        });
        let err = from_json(&doc, "full").unwrap_err();
        assert!(matches!(err, Error::MalformedDocument { .. }));
    }

    #[test]
    fn test_paragraph_preset_single_paragraph() {
        let two = json!({
            "type": "doc",
            "content": [{"type": "paragraph"}, {"type": "paragraph"}]
        });
        let err = from_json(&two, "paragraph").unwrap_err();
        assert!(matches!(err, Error::ContentViolation { .. }));

        let one = json!({"type": "doc", "content": [{"type": "paragraph"}]});
        assert!(from_json(&one, "paragraph").is_ok());
    }

    #[test]
    fn test_empty_text_rejected() {
        let doc = json!({
            "type": "doc",
            "content": [{"type": "paragraph", "content": [{"type": "text", "text": ""}]}]
        });
        assert!(matches!(
            from_json(&doc, "full"),
            Err(Error::MalformedDocument { .. })
        ));
    }
}
