//! Type schema builder: turns result types and function signatures into
//! JSON Schema descriptors for structured output and tool declarations.
//!
//! The builder never errors. Inputs it cannot classify degrade to `object`,
//! and branches that exceed the depth budget are dropped, because schema
//! generation must never abort an in-flight conversation.

pub mod describe;
pub mod function;
pub mod node;

pub use describe::{ObjectBuilder, Schematic, StructuredOutput};
pub use function::{function_description, function_schema, ParamSpec};
pub use node::{JsonType, SchemaNode};

/// Default nesting budget for schema generation.
pub const MAX_SCHEMA_DEPTH: usize = 15;
