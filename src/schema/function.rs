//! Function parameter schemas for tool declarations.

use super::describe::{synthesized_description, Schematic};
use super::node::{JsonType, SchemaNode};
use super::MAX_SCHEMA_DEPTH;

/// A declared parameter of an exposed function.
#[derive(Debug, Clone)]
pub struct ParamSpec {
    pub name: String,
    pub description: String,
    pub node: SchemaNode,
}

impl ParamSpec {
    /// Declare a parameter typed by a `Schematic` impl. An unbuildable
    /// schema degrades to a bare object rather than failing.
    pub fn new<T: Schematic>(name: impl Into<String>, description: impl Into<String>) -> Self {
        let node = T::schema(MAX_SCHEMA_DEPTH).unwrap_or_else(|| SchemaNode::object(String::new()));
        Self::with_node(name, description, node)
    }

    /// Declare a parameter with a hand-built descriptor (e.g. an enum).
    pub fn with_node(
        name: impl Into<String>,
        description: impl Into<String>,
        mut node: SchemaNode,
    ) -> Self {
        let name = name.into();
        node.description = synthesized_description(&name, node.json_type, description.into());
        Self {
            description: node.description.clone(),
            name,
            node,
        }
    }
}

/// Build the parameters-object schema for a function.
///
/// Every parameter is marked required, regardless of whether the handler
/// treats it as defaultable. This intentionally differs from the
/// object-schema rule, which exempts nullable fields; callers relying on
/// optional parameters must model them as nullable in the handler.
pub fn function_schema(params: &[ParamSpec]) -> SchemaNode {
    SchemaNode {
        json_type: JsonType::Object,
        description: String::new(),
        enum_values: Vec::new(),
        required: params.iter().map(|p| p.name.clone()).collect(),
        properties: params
            .iter()
            .map(|p| (p.name.clone(), p.node.clone()))
            .collect(),
        items: None,
    }
}

/// Default description for a function lacking one: "Method `<name>`".
pub fn function_description(name: &str, explicit: &str) -> String {
    if explicit.is_empty() {
        format!("Method `{name}`")
    } else {
        explicit.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_parameter_is_required() {
        let params = vec![
            ParamSpec::new::<String>("city", "City name"),
            ParamSpec::new::<Option<String>>("unit", "Temperature unit"),
        ];
        let node = function_schema(&params);
        // Defaultable parameters are still required (documented quirk).
        assert_eq!(node.required, vec!["city".to_string(), "unit".to_string()]);
    }

    #[test]
    fn function_description_synthesized_when_absent() {
        assert_eq!(function_description("get_weather", ""), "Method `get_weather`");
        assert_eq!(function_description("get_weather", "Look up weather"), "Look up weather");
    }
}
