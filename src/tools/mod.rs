//! Tools: local functions exposed to the model as callable capabilities.

pub mod arguments;
pub mod tool;

pub use arguments::ToolArguments;
pub use tool::{FunctionTool, Tool};
