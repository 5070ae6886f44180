//! JSON schema walking for example payloads.

use serde_json::{Map, Value};

/// Past this depth a schema samples as `{}`. Keeps self-referencing `$ref`s
/// finite.
pub const MAX_SAMPLE_DEPTH: usize = 8;

#[derive(Debug, Clone, PartialEq)]
pub enum PrimitiveKind {
    String { first_enum: Option<Value> },
    Number,
    Integer,
    Boolean,
    Null,
}

impl PrimitiveKind {
    fn sample(&self) -> Value {
        match self {
            PrimitiveKind::String { first_enum } => first_enum
                .clone()
                .unwrap_or_else(|| Value::String("string".into())),
            PrimitiveKind::Number | PrimitiveKind::Integer => Value::from(0),
            PrimitiveKind::Boolean => Value::Bool(false),
            PrimitiveKind::Null => Value::Null,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SchemaNode {
    /// A literal `example` given by the schema.
    Example(Value),
    Object { properties: Vec<(String, SchemaNode)> },
    Array { items: Option<Box<SchemaNode>> },
    Primitive(PrimitiveKind),
    /// A `$ref` pointer, resolved when sampling.
    Ref(String),
    /// `allOf`: object samples are merged.
    AllOf(Vec<SchemaNode>),
    Any,
}

fn empty_object() -> Value {
    Value::Object(Map::new())
}

impl SchemaNode {
    pub fn from_value(schema: &Value) -> Self {
        let Some(obj) = schema.as_object() else {
            return SchemaNode::Any;
        };

        if let Some(example) = obj.get("example").filter(|e| !e.is_null()) {
            return SchemaNode::Example(example.clone());
        }
        if let Some(pointer) = obj.get("$ref").and_then(Value::as_str) {
            return SchemaNode::Ref(pointer.to_string());
        }
        if let Some(parts) = obj.get("allOf").and_then(Value::as_array) {
            return SchemaNode::AllOf(parts.iter().map(SchemaNode::from_value).collect());
        }
        for key in ["oneOf", "anyOf"] {
            if let Some(first) = obj.get(key).and_then(Value::as_array).and_then(|v| v.first()) {
                return SchemaNode::from_value(first);
            }
        }

        let ty = obj.get("type").and_then(Value::as_str);
        let properties = obj.get("properties").and_then(Value::as_object);
        if ty == Some("object") || properties.is_some() {
            let properties = properties
                .map(|props| {
                    props
                        .iter()
                        .map(|(key, prop)| (key.clone(), SchemaNode::from_value(prop)))
                        .collect()
                })
                .unwrap_or_default();
            return SchemaNode::Object { properties };
        }

        let items = obj.get("items");
        if ty == Some("array") || items.is_some() {
            return SchemaNode::Array {
                items: items.map(|i| Box::new(SchemaNode::from_value(i))),
            };
        }

        match ty {
            Some("string") => SchemaNode::Primitive(PrimitiveKind::String {
                first_enum: obj
                    .get("enum")
                    .and_then(Value::as_array)
                    .and_then(|values| values.first())
                    .cloned(),
            }),
            Some("number") => SchemaNode::Primitive(PrimitiveKind::Number),
            Some("integer") => SchemaNode::Primitive(PrimitiveKind::Integer),
            Some("boolean") => SchemaNode::Primitive(PrimitiveKind::Boolean),
            Some("null") => SchemaNode::Primitive(PrimitiveKind::Null),
            _ => SchemaNode::Any,
        }
    }

    /// An example value shaped like the schema.
    pub fn sample(&self, root: &Value) -> Value {
        self.sample_at(root, 0)
    }

    fn sample_at(&self, root: &Value, depth: usize) -> Value {
        if depth > MAX_SAMPLE_DEPTH {
            return empty_object();
        }

        match self {
            SchemaNode::Example(example) => example.clone(),
            SchemaNode::Object { properties } => Value::Object(
                properties
                    .iter()
                    .map(|(key, node)| (key.clone(), node.sample_at(root, depth + 1)))
                    .collect(),
            ),
            SchemaNode::Array { items } => {
                let item = match items {
                    Some(node) => node.sample_at(root, depth + 1),
                    None => empty_object(),
                };
                Value::Array(vec![item])
            }
            SchemaNode::Primitive(kind) => kind.sample(),
            SchemaNode::Ref(pointer) => match resolve_ref(root, pointer) {
                Some(target) => SchemaNode::from_value(target).sample_at(root, depth + 1),
                None => empty_object(),
            },
            SchemaNode::AllOf(parts) => {
                let mut merged = Map::new();
                for part in parts {
                    match part.sample_at(root, depth + 1) {
                        Value::Object(object) => merged.extend(object),
                        other if merged.is_empty() => return other,
                        _ => {}
                    }
                }
                Value::Object(merged)
            }
            SchemaNode::Any => empty_object(),
        }
    }
}

/// Resolve a local `#/...` pointer against the whole document.
pub fn resolve_ref<'a>(root: &'a Value, pointer: &str) -> Option<&'a Value> {
    let local = pointer.strip_prefix('#')?;
    root.pointer(local)
}
