//! Attribute descriptors and the rules for reading and writing attributes.
//!
//! A descriptor declares one attribute of a node or mark. The same descriptor
//! drives both directions:
//!
//! - **Import**: [`resolve_attrs`] validates a raw key/value map (curvenote
//!   `attrs`, mdast properties, or role arguments) and keeps only what was
//!   actually supplied
//! - **Export**: [`serialize_attrs`] writes attributes back out, applying
//!   defaults and omission rules for the chosen [`Target`]
//!
//! Reactive attributes can be bound to an expression. The literal is written
//! under `<name>` and the expression under `<name>Function`; a node never
//! carries both.

use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::ir::{AttrValue, Attrs, NodePath};

/// Whether an attribute accepts an expression reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FunctionVariant {
    /// Literal values only.
    #[default]
    None,
    /// Either a literal or an expression.
    Optional,
    /// Expression only (event handlers such as `changeFunction`).
    Only,
}

/// When an attribute is written to mdast output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OmitPolicy {
    /// Always written; the default fills in when the attribute is absent.
    AlwaysEmit,
    /// Skipped in mdast when equal to its default.
    OmitIfDefault,
    /// Written only when a value is present on the node.
    #[default]
    OmitIfAbsent,
}

/// Value type of a literal attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AttrKind {
    #[default]
    String,
    Integer,
    Boolean,
}

impl AttrKind {
    /// Check whether a JSON value has this kind.
    pub fn accepts(self, value: &Value) -> bool {
        match self {
            AttrKind::String => value.is_string(),
            AttrKind::Integer => value.is_i64() || value.is_u64(),
            AttrKind::Boolean => value.is_boolean(),
        }
    }

    /// Parse a textual role argument into a value of this kind.
    pub fn parse(self, raw: &str) -> Option<Value> {
        match self {
            AttrKind::String => Some(Value::String(raw.to_string())),
            AttrKind::Integer => raw.trim().parse::<i64>().ok().map(Value::from),
            AttrKind::Boolean => match raw.trim() {
                "true" => Some(Value::Bool(true)),
                "false" => Some(Value::Bool(false)),
                _ => None,
            },
        }
    }

    /// Render a value as a textual role argument.
    pub fn render(value: &Value) -> String {
        match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

/// Which output an attribute map is being written for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// Curvenote JSON: every defaulted attribute is written.
    Curvenote,
    /// mdast: omission policies apply.
    Mdast,
}

/// Declaration of one attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeDescriptor {
    /// Attribute name (also the literal key).
    pub name: String,
    /// Decoding fails when a required attribute is absent.
    pub required: bool,
    /// Expression-reference support.
    pub function: FunctionVariant,
    /// Value applied lazily by encoders when the attribute is absent.
    pub default: Option<Value>,
    /// Omission rule for mdast output.
    pub omit: OmitPolicy,
    /// Literal value type.
    pub kind: AttrKind,
    /// Inclusive bounds for integer literals.
    pub range: Option<(i64, i64)>,
}

/// Shorthand for [`AttributeDescriptor::new`].
pub fn attr(name: &str) -> AttributeDescriptor {
    AttributeDescriptor::new(name)
}

impl AttributeDescriptor {
    /// Create an optional string attribute without a default.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            required: false,
            function: FunctionVariant::None,
            default: None,
            omit: OmitPolicy::OmitIfAbsent,
            kind: AttrKind::String,
            range: None,
        }
    }

    /// Mark the attribute as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Accept an expression as an alternative to the literal.
    pub fn with_function(mut self) -> Self {
        self.function = FunctionVariant::Optional;
        self
    }

    /// Accept only an expression.
    pub fn function_only(mut self) -> Self {
        self.function = FunctionVariant::Only;
        self
    }

    /// Set the default. Unless [`always_emit`](Self::always_emit) is also set,
    /// a value equal to the default is left out of mdast output.
    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        if self.omit == OmitPolicy::OmitIfAbsent {
            self.omit = OmitPolicy::OmitIfDefault;
        }
        self
    }

    /// Always write the attribute, filling in the default when absent.
    pub fn always_emit(mut self) -> Self {
        self.omit = OmitPolicy::AlwaysEmit;
        self
    }

    /// Set the literal value type.
    pub fn kind(mut self, kind: AttrKind) -> Self {
        self.kind = kind;
        self
    }

    /// Restrict integer literals to `min..=max`.
    pub fn range(mut self, min: i64, max: i64) -> Self {
        self.range = Some((min, max));
        self
    }

    /// Check a literal against [`range`](Self::range).
    fn in_range(&self, value: &Value) -> bool {
        match self.range {
            Some((min, max)) => value.as_i64().is_some_and(|n| (min..=max).contains(&n)),
            None => true,
        }
    }

    /// Key under which the expression form is written.
    pub fn function_key(&self) -> String {
        format!("{}Function", self.name)
    }

    pub fn has_function_variant(&self) -> bool {
        self.function != FunctionVariant::None
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    /// Check whether `key` names this attribute in either form.
    fn claims(&self, key: &str) -> bool {
        key == self.name
            || (self.has_function_variant()
                && key.len() == self.name.len() + "Function".len()
                && key.starts_with(self.name.as_str())
                && key.ends_with("Function"))
    }

    /// Whether a present literal is written for `target`.
    fn emits(&self, value: &Value, target: Target) -> bool {
        match (target, self.omit) {
            (Target::Mdast, OmitPolicy::OmitIfDefault) => self.default.as_ref() != Some(value),
            _ => true,
        }
    }

    /// The value written for `target` when the attribute is absent.
    fn fill(&self, target: Target) -> Option<&Value> {
        match (target, self.omit) {
            (_, OmitPolicy::OmitIfAbsent) => None,
            (Target::Mdast, OmitPolicy::OmitIfDefault) => None,
            _ => self.default.as_ref(),
        }
    }
}

fn is_absent(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

/// Validate raw attributes against descriptors.
///
/// `owner` is the node or mark type name, used in errors. Only attributes that
/// are present in `raw` end up in the result; defaults are never stored.
pub fn resolve_attrs(
    owner: &str,
    descriptors: &[AttributeDescriptor],
    raw: &Map<String, Value>,
    path: &NodePath,
) -> Result<Attrs> {
    if let Some(key) = raw
        .keys()
        .find(|key| !descriptors.iter().any(|d| d.claims(key)))
    {
        return Err(Error::UnknownAttribute {
            node: owner.to_string(),
            attr: key.clone(),
            path: path.clone(),
        });
    }

    let mut attrs = Attrs::new();
    for desc in descriptors {
        let literal = raw.get(&desc.name).filter(|v| !v.is_null());
        let function = if desc.has_function_variant() {
            raw.get(&desc.function_key()).filter(|v| !is_absent(v))
        } else {
            None
        };

        match (literal, function) {
            // An empty literal next to an expression is how editors clear the literal
            (Some(lit), Some(_)) if !is_absent(lit) => {
                return Err(Error::ConflictingAttribute {
                    node: owner.to_string(),
                    attr: desc.name.clone(),
                    path: path.clone(),
                });
            }
            (_, Some(function)) => {
                let Some(expr) = function.as_str() else {
                    return Err(Error::malformed(
                        path,
                        format!("`{}.{}` must be a string", owner, desc.function_key()),
                    ));
                };
                attrs.insert(desc.name.clone(), AttrValue::function(expr));
            }
            (Some(value), None) => {
                if desc.function == FunctionVariant::Only {
                    return Err(Error::UnknownAttribute {
                        node: owner.to_string(),
                        attr: desc.name.clone(),
                        path: path.clone(),
                    });
                }
                if !desc.kind.accepts(value) {
                    return Err(Error::malformed(
                        path,
                        format!("`{}.{}` must be {:?}, got {value}", owner, desc.name, desc.kind),
                    ));
                }
                if !desc.in_range(value) {
                    return Err(Error::malformed(
                        path,
                        format!("`{}.{}` out of range: {value}", owner, desc.name),
                    ));
                }
                attrs.insert(desc.name.clone(), AttrValue::Literal(value.clone()));
            }
            (None, None) => {
                if desc.required {
                    return Err(Error::MissingRequiredAttribute {
                        node: owner.to_string(),
                        attr: desc.name.clone(),
                        path: path.clone(),
                    });
                }
            }
        }
    }

    Ok(attrs)
}

/// Write attributes for `target`, in descriptor order.
///
/// Attributes on the node that have no descriptor are ignored; trees produced
/// by the decoders never contain them.
pub fn serialize_attrs(
    descriptors: &[AttributeDescriptor],
    attrs: &Attrs,
    target: Target,
) -> Map<String, Value> {
    let mut out = Map::new();
    for desc in descriptors {
        match attrs.get(&desc.name) {
            Some(AttrValue::Function(expr)) => {
                out.insert(desc.function_key(), Value::String(expr.clone()));
            }
            Some(AttrValue::Literal(value)) => {
                if desc.emits(value, target) {
                    out.insert(desc.name.clone(), value.clone());
                }
            }
            None => {
                if let Some(default) = desc.fill(target) {
                    out.insert(desc.name.clone(), default.clone());
                }
            }
        }
    }
    out
}
