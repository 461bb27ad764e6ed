//! The `Schematic` trait: types describe their own JSON Schema shape.

use serde::de::DeserializeOwned;

use super::node::{JsonType, SchemaNode};
use super::MAX_SCHEMA_DEPTH;

/// A type that can describe its own schema.
///
/// `depth` is the remaining nesting budget. Object and array impls consume
/// one level and return `None` once the budget is exhausted, which bounds
/// recursion on self-referential type graphs. Primitives ignore the budget.
pub trait Schematic {
    /// Whether a field of this type may be absent or null.
    const NULLABLE: bool = false;

    fn schema(depth: usize) -> Option<SchemaNode>;
}

macro_rules! impl_schematic_primitive {
    ($json_type:expr => $($ty:ty),+) => {
        $(impl Schematic for $ty {
            fn schema(_depth: usize) -> Option<SchemaNode> {
                Some(SchemaNode::primitive($json_type, String::new()))
            }
        })+
    };
}

impl_schematic_primitive!(JsonType::String => String);
impl_schematic_primitive!(JsonType::Integer => i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);
impl_schematic_primitive!(JsonType::Number => f32, f64);
impl_schematic_primitive!(JsonType::Boolean => bool);

// Unconstrained JSON degrades to a bare object schema.
impl Schematic for serde_json::Value {
    fn schema(_depth: usize) -> Option<SchemaNode> {
        Some(SchemaNode::object(String::new()))
    }
}

impl<T: Schematic> Schematic for Vec<T> {
    fn schema(depth: usize) -> Option<SchemaNode> {
        if depth == 0 {
            return None;
        }
        let items = T::schema(depth - 1)?;
        Some(SchemaNode::array(items, String::new()))
    }
}

impl<T: Schematic> Schematic for Option<T> {
    const NULLABLE: bool = true;

    fn schema(depth: usize) -> Option<SchemaNode> {
        T::schema(depth)
    }
}

impl<T: Schematic> Schematic for Box<T> {
    const NULLABLE: bool = T::NULLABLE;

    fn schema(depth: usize) -> Option<SchemaNode> {
        T::schema(depth)
    }
}

/// A target type for structured output.
///
/// Implementors supply a name and a root schema; the engine uses both to
/// populate the provider's `json_schema` response format and then parses
/// the model's final content back into the type.
pub trait StructuredOutput: Schematic + DeserializeOwned {
    const NAME: &'static str;

    fn description() -> String {
        format!("Structured response of type `{}`", Self::NAME)
    }

    /// Root schema at the full depth budget. Degrades to a bare object
    /// rather than failing: schema generation must never abort a send.
    fn response_schema() -> SchemaNode {
        Self::schema(MAX_SCHEMA_DEPTH)
            .unwrap_or_else(|| SchemaNode::object(Self::description()))
    }
}

/// Builder for object schemas, tracking the remaining depth budget.
///
/// Fields whose nested schema cannot be built within the budget are
/// silently dropped from both `properties` and `required` (defined
/// degradation, not an error).
pub struct ObjectBuilder {
    depth: usize,
    description: String,
    properties: Vec<(String, SchemaNode)>,
    required: Vec<String>,
}

impl ObjectBuilder {
    /// Create a builder with `depth` budget remaining for nested fields.
    pub fn new(depth: usize) -> Self {
        Self {
            depth,
            description: String::new(),
            properties: Vec::new(),
            required: Vec::new(),
        }
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Add a field typed by a `Schematic` impl. Required iff non-nullable.
    /// An empty description synthesizes the default form.
    pub fn field<T: Schematic>(mut self, name: impl Into<String>, description: impl Into<String>) -> Self {
        let name = name.into();
        let Some(mut node) = T::schema(self.depth) else {
            return self;
        };
        node.description = synthesized_description(&name, node.json_type, description.into());
        self.properties.push((name.clone(), node));
        if !T::NULLABLE {
            self.required.push(name);
        }
        self
    }

    /// Add a required string field restricted to enumerated values.
    pub fn enum_field(
        mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        values: &[&str],
    ) -> Self {
        let name = name.into();
        let node = SchemaNode::string_enum(
            synthesized_description(&name, JsonType::String, description.into()),
            values,
        );
        self.properties.push((name.clone(), node));
        self.required.push(name);
        self
    }

    /// Add a required field with a hand-built descriptor.
    pub fn field_node(mut self, name: impl Into<String>, node: SchemaNode) -> Self {
        let name = name.into();
        self.properties.push((name.clone(), node));
        self.required.push(name);
        self
    }

    pub fn build(self) -> SchemaNode {
        SchemaNode {
            json_type: JsonType::Object,
            description: self.description,
            enum_values: Vec::new(),
            required: self.required,
            properties: self.properties,
            items: None,
        }
    }
}

/// Default description: an explicit annotation wins, otherwise
/// "`<name>` of type `<jsonType>`".
pub(crate) fn synthesized_description(name: &str, json_type: JsonType, explicit: String) -> String {
    if explicit.is_empty() {
        format!("`{name}` of type `{json_type}`")
    } else {
        explicit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn nullable_fields_are_optional() {
        let node = ObjectBuilder::new(MAX_SCHEMA_DEPTH)
            .field::<String>("city", "")
            .field::<Option<f64>>("latitude", "")
            .build();
        assert_eq!(node.required, vec!["city".to_string()]);
        assert_eq!(node.properties.len(), 2);
    }

    #[test]
    fn field_descriptions_are_synthesized_when_absent() {
        let node = ObjectBuilder::new(MAX_SCHEMA_DEPTH)
            .field::<u32>("count", "")
            .field::<String>("label", "Display label")
            .build();
        assert_eq!(node.properties[0].1.description, "`count` of type `integer`");
        assert_eq!(node.properties[1].1.description, "Display label");
    }

    #[test]
    fn exhausted_budget_drops_the_field() {
        let node = ObjectBuilder::new(0)
            .field::<Vec<String>>("names", "")
            .field::<bool>("flag", "")
            .build();
        // The array needs one level of budget; the primitive does not.
        assert_eq!(node.properties.len(), 1);
        assert_eq!(node.properties[0].0, "flag");
        assert_eq!(node.required, vec!["flag".to_string()]);
    }
}
