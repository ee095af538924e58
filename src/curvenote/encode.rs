//! IR → curvenote JSON / YAML.
//!
//! Output is deterministic: keys are written as `type`, `attrs`, `content`,
//! `marks`, `text`; attributes follow descriptor order with every defaulted
//! attribute filled in. Two equal trees always produce identical text.

use serde_json::{Map, Value};

use crate::ir::{AttrValue, Attrs, Mark, Node};
use crate::schema::{AttributeDescriptor, Registry, Target, registry, serialize_attrs};

/// Encode a tree as curvenote JSON using the built-in registry.
pub fn to_json(tree: &Node) -> Value {
    to_json_with(registry(), tree)
}

/// Encode a tree as curvenote JSON.
///
/// Total: nodes and marks the registry does not know are written with their
/// attributes in name order.
pub fn to_json_with(registry: &Registry, tree: &Node) -> Value {
    let mut obj = Map::new();
    obj.insert("type".to_string(), Value::String(tree.kind.clone()));

    let attrs = encode_attrs(
        registry.get(&tree.kind).map(|d| d.attributes.as_slice()),
        &tree.attrs,
    );
    if !attrs.is_empty() {
        obj.insert("attrs".to_string(), Value::Object(attrs));
    }
    if !tree.content.is_empty() {
        let content = tree.content.iter().map(|c| to_json_with(registry, c)).collect();
        obj.insert("content".to_string(), Value::Array(content));
    }
    if !tree.marks.is_empty() {
        let marks = tree.marks.iter().map(|m| encode_mark(registry, m)).collect();
        obj.insert("marks".to_string(), Value::Array(marks));
    }
    if let Some(text) = &tree.text {
        obj.insert("text".to_string(), Value::String(text.clone()));
    }
    Value::Object(obj)
}

/// Encode a tree as curvenote YAML using the built-in registry.
#[cfg(feature = "yaml")]
pub fn to_yaml(tree: &Node) -> crate::Result<String> {
    to_yaml_with(registry(), tree)
}

/// Encode a tree as curvenote YAML.
#[cfg(feature = "yaml")]
pub fn to_yaml_with(registry: &Registry, tree: &Node) -> crate::Result<String> {
    Ok(serde_yaml::to_string(&to_json_with(registry, tree))?)
}

fn encode_mark(registry: &Registry, mark: &Mark) -> Value {
    let mut obj = Map::new();
    obj.insert("type".to_string(), Value::String(mark.kind.clone()));
    let attrs = encode_attrs(
        registry.get_mark(&mark.kind).map(|d| d.attributes.as_slice()),
        &mark.attrs,
    );
    if !attrs.is_empty() {
        obj.insert("attrs".to_string(), Value::Object(attrs));
    }
    Value::Object(obj)
}

fn encode_attrs(descriptors: Option<&[AttributeDescriptor]>, attrs: &Attrs) -> Map<String, Value> {
    match descriptors {
        Some(descriptors) => serialize_attrs(descriptors, attrs, Target::Curvenote),
        None => attrs
            .iter()
            .map(|(name, value)| match value {
                AttrValue::Literal(v) => (name.clone(), v.clone()),
                AttrValue::Function(expr) => (format!("{name}Function"), Value::String(expr.clone())),
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_key_order() {
        let node = Node::text("hi").with_mark(Mark::new("em"));
        let value = to_json(&node);
        let keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["type", "marks", "text"]);
    }

    #[test]
    fn test_defaults_filled() {
        let node = Node::new("range").with_attr("value", "50");
        assert_eq!(
            to_json(&node),
            json!({
                "type": "range",
                "attrs": {"value": "50", "min": "0", "max": "100", "step": "1"}
            })
        );
    }

    #[test]
    fn test_function_attrs() {
        let node = Node::new("display").with_function("value", "x * 2");
        assert_eq!(
            to_json(&node),
            json!({"type": "display", "attrs": {"valueFunction": "x * 2"}})
        );
    }

    #[test]
    fn test_unknown_node_is_total() {
        let node = Node::new("marquee")
            .with_attr("speed", 3)
            .with_attr("direction", "left");
        assert_eq!(
            to_json(&node),
            json!({"type": "marquee", "attrs": {"direction": "left", "speed": 3}})
        );
    }

    #[cfg(feature = "yaml")]
    #[test]
    fn test_yaml_stable() {
        let node = Node::new("doc").with_child(
            Node::new("heading")
                .with_attr("level", 2)
                .with_child(Node::text("Title")),
        );
        let first = to_yaml(&node).unwrap();
        let second = to_yaml(&node.clone()).unwrap();
        assert_eq!(first, second);
        assert!(first.starts_with("type: doc\ncontent:\n"));
        assert!(first.contains("numbered: false"));
    }
}
