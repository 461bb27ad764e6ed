//! Schema descriptor tree and its wire-format serialization.

use serde_json::Value;

/// JSON Schema type of a descriptor node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonType {
    String,
    Integer,
    Number,
    Boolean,
    Object,
    Array,
}

impl JsonType {
    pub fn as_str(&self) -> &'static str {
        match self {
            JsonType::String => "string",
            JsonType::Integer => "integer",
            JsonType::Number => "number",
            JsonType::Boolean => "boolean",
            JsonType::Object => "object",
            JsonType::Array => "array",
        }
    }
}

impl std::fmt::Display for JsonType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A node in a schema descriptor tree.
///
/// Descriptors are transient: built per engine invocation, serialized with
/// [`SchemaNode::to_value`], and discarded. Properties keep declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaNode {
    pub json_type: JsonType,
    pub description: String,
    /// Permitted literal values, when the field is an enumeration.
    pub enum_values: Vec<Value>,
    pub required: Vec<String>,
    pub properties: Vec<(String, SchemaNode)>,
    pub items: Option<Box<SchemaNode>>,
}

impl SchemaNode {
    /// Create a leaf node of the given type.
    pub fn primitive(json_type: JsonType, description: impl Into<String>) -> Self {
        Self {
            json_type,
            description: description.into(),
            enum_values: Vec::new(),
            required: Vec::new(),
            properties: Vec::new(),
            items: None,
        }
    }

    /// Create a string node restricted to an enumerated value set.
    pub fn string_enum(description: impl Into<String>, values: &[&str]) -> Self {
        Self {
            enum_values: values.iter().map(|v| Value::String((*v).to_string())).collect(),
            ..Self::primitive(JsonType::String, description)
        }
    }

    /// Create an array node wrapping an element schema.
    pub fn array(items: SchemaNode, description: impl Into<String>) -> Self {
        Self {
            items: Some(Box::new(items)),
            ..Self::primitive(JsonType::Array, description)
        }
    }

    /// Create an empty object node.
    pub fn object(description: impl Into<String>) -> Self {
        Self::primitive(JsonType::Object, description)
    }

    /// Replace the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Serialize to the wire-format JSON Schema value.
    ///
    /// Object and array nodes are always closed-world: `additionalProperties:
    /// false` plus a `strict: true` marker, which providers with strict
    /// structured output require. `required` and `properties` stay
    /// object-only.
    pub fn to_value(&self) -> Value {
        let mut obj = serde_json::Map::new();
        obj.insert("type".into(), Value::String(self.json_type.as_str().into()));
        if !self.description.is_empty() {
            obj.insert("description".into(), Value::String(self.description.clone()));
        }
        if !self.enum_values.is_empty() {
            obj.insert("enum".into(), Value::Array(self.enum_values.clone()));
        }
        if self.json_type == JsonType::Object {
            obj.insert(
                "required".into(),
                Value::Array(
                    self.required
                        .iter()
                        .map(|r| Value::String(r.clone()))
                        .collect(),
                ),
            );
            let mut props = serde_json::Map::new();
            for (name, node) in &self.properties {
                props.insert(name.clone(), node.to_value());
            }
            obj.insert("properties".into(), Value::Object(props));
        }
        if let Some(ref items) = self.items {
            obj.insert("items".into(), items.to_value());
        }
        if matches!(self.json_type, JsonType::Object | JsonType::Array) {
            obj.insert("additionalProperties".into(), Value::Bool(false));
            obj.insert("strict".into(), Value::Bool(true));
        }
        Value::Object(obj)
    }
}
