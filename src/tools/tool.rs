//! Tool trait and closure-based tool wrapper.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;

use super::arguments::ToolArguments;
use crate::error::ParlanceError;
use crate::schema::{function_description, function_schema, ParamSpec, SchemaNode};

/// Core tool trait — a named local capability the model may invoke.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Tool name (must match what the model calls).
    fn name(&self) -> &str;

    /// Human-readable description.
    fn description(&self) -> &str;

    /// Parameter schema descriptor.
    fn parameters(&self) -> &SchemaNode;

    /// Execute the tool with parsed arguments.
    async fn execute(&self, args: &ToolArguments) -> Result<serde_json::Value, ParlanceError>;
}

/// Type alias for the tool handler function.
type ToolHandler = dyn Fn(ToolArguments) -> Pin<Box<dyn Future<Output = Result<serde_json::Value, ParlanceError>> + Send>>
    + Send
    + Sync;

/// Closure-based tool for registering a function as a callable capability.
pub struct FunctionTool {
    name: String,
    description: String,
    parameters: SchemaNode,
    handler: Arc<ToolHandler>,
}

impl FunctionTool {
    /// Create a tool from a parameter list and a closure.
    ///
    /// An empty description synthesizes "Method `<name>`". The parameter
    /// schema marks every declared parameter required.
    pub fn new<F, Fut>(
        name: impl Into<String>,
        description: impl Into<String>,
        params: Vec<ParamSpec>,
        handler: F,
    ) -> Self
    where
        F: Fn(ToolArguments) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<serde_json::Value, ParlanceError>> + Send + 'static,
    {
        let name = name.into();
        Self {
            description: function_description(&name, &description.into()),
            parameters: function_schema(&params),
            name,
            handler: Arc::new(move |args| Box::pin(handler(args))),
        }
    }
}

#[async_trait]
impl Tool for FunctionTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn parameters(&self) -> &SchemaNode {
        &self.parameters
    }

    async fn execute(&self, args: &ToolArguments) -> Result<serde_json::Value, ParlanceError> {
        (self.handler)(args.clone()).await
    }
}

impl std::fmt::Debug for FunctionTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FunctionTool")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish()
    }
}
