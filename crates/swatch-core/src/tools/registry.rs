//! Tool registry -- a named collection of agent-callable tools.

use std::collections::BTreeMap;
use std::fmt;

use serde_json::Value;
use tracing::debug;

use crate::workspace::TurnSnapshot;

use super::trait_def::Tool;
use super::types::{ToolDefinition, ToolOutput};

/// A collection of registered [`Tool`] implementations, keyed by name.
///
/// Iteration is in name order, so published definitions are stable.
#[derive(Default)]
pub struct ToolRegistry {
    tools: BTreeMap<String, Box<dyn Tool>>,
}

impl fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.list())
            .finish()
    }
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool under [`Tool::name`], returning any tool it replaces.
    pub fn register(&mut self, tool: impl Tool + 'static) -> Option<Box<dyn Tool>> {
        let name = tool.name().to_string();
        self.tools.insert(name, Box::new(tool))
    }

    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.tools.get(name).map(|b| b.as_ref())
    }

    pub fn list(&self) -> Vec<&str> {
        self.tools.keys().map(|s| s.as_str()).collect()
    }

    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.values().map(|t| t.definition()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Call the tool named `name`; an unknown name is an `invalid_argument`
    /// output.
    pub fn invoke(&self, turn: &mut TurnSnapshot, name: &str, params: Value) -> ToolOutput {
        let Some(tool) = self.get(name) else {
            debug!(tool = name, "unknown tool requested");
            return ToolOutput::invalid_argument(format!(
                "Unknown tool '{name}'. Available tools: {}",
                self.list().join(", ")
            ));
        };
        let output = tool.call(turn, params);
        debug!(tool = name, success = output.success, "tool call finished");
        output
    }
}
