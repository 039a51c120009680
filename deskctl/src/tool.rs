//! Tool abstraction and name-based dispatch.
//!
//! The registry is the only seam the session layer sees: it hands out
//! schemas for the API request and routes tool calls back by name. It
//! performs no validation and no I/O of its own.

use serde::Serialize;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::result::ActionResult;

/// Tool metadata for LLM tool-calling APIs.
///
/// `display_width`/`display_height` are the agent-space dimensions the
/// tool accepts; the session layer uses them for its system prompt, the
/// wire request carries only name, description, and schema.
#[derive(Debug, Clone, Serialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
    pub display_width: u32,
    pub display_height: u32,
    pub display_index: Option<u32>,
}

/// A capability the model may invoke.
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;
    fn definition(&self) -> ToolDefinition;
    fn execute(&self, args: &Value) -> Result<ActionResult>;
}

/// Ordered name-to-tool table.
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<Box<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        ToolRegistry::default()
    }

    /// Adds a tool. Names are unique; a duplicate is rejected rather than
    /// silently shadowed.
    pub fn register(&mut self, tool: Box<dyn Tool>) -> Result<()> {
        let name = tool.name().to_string();
        if self.tools.iter().any(|t| t.name() == name) {
            return Err(Error::InvalidArgument(format!(
                "a tool named {name} is already registered"
            )));
        }
        self.tools.push(tool);
        Ok(())
    }

    /// Definitions in registration order.
    pub fn schemas(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(|tool| tool.definition()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Routes one tool call. The tool's own validation and execution
    /// errors pass through untouched.
    pub fn dispatch(&self, name: &str, args: &Value) -> Result<ActionResult> {
        let tool = self
            .tools
            .iter()
            .find(|tool| tool.name() == name)
            .ok_or_else(|| Error::UnknownTool(name.to_string()))?;
        tool.execute(args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StubTool {
        name: &'static str,
    }

    impl Tool for StubTool {
        fn name(&self) -> &str {
            self.name
        }

        fn definition(&self) -> ToolDefinition {
            ToolDefinition {
                name: self.name.to_string(),
                description: String::new(),
                input_schema: serde_json::json!({"type": "object"}),
                display_width: 0,
                display_height: 0,
                display_index: None,
            }
        }

        fn execute(&self, _args: &Value) -> Result<ActionResult> {
            Ok(ActionResult::text(self.name))
        }
    }

    #[test]
    fn schemas_preserve_registration_order() {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(StubTool { name: "beta" })).unwrap();
        registry.register(Box::new(StubTool { name: "alpha" })).unwrap();
        let names: Vec<String> = registry.schemas().into_iter().map(|d| d.name).collect();
        assert_eq!(names, vec!["beta", "alpha"]);
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(StubTool { name: "computer" })).unwrap();
        let err = registry
            .register(Box::new(StubTool { name: "computer" }))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn dispatch_rejects_unknown_names() {
        let registry = ToolRegistry::new();
        let err = registry
            .dispatch("computer", &serde_json::json!({}))
            .unwrap_err();
        assert_eq!(err.to_string(), "Unknown tool: computer");
    }

    #[test]
    fn dispatch_routes_by_name() {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(StubTool { name: "probe" })).unwrap();
        let result = registry.dispatch("probe", &serde_json::json!({})).unwrap();
        assert_eq!(result.output.as_deref(), Some("probe"));
    }
}
