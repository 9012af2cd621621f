//! The `Tool` trait -- the interface every agent-callable operation
//! implements.
//!
//! Tools are synchronous: they read and write a [`TurnSnapshot`] that the
//! caller owns for the duration of a turn. The trait is object-safe so
//! tools can be stored as `Box<dyn Tool>` in the [`super::ToolRegistry`].

use serde_json::Value;

use crate::workspace::TurnSnapshot;

use super::types::{ToolDefinition, ToolOutput};

/// An agent-callable operation over a turn snapshot.
pub trait Tool: Send + Sync {
    /// The name agents call this tool by.
    fn name(&self) -> &str;

    /// Description and parameter schema published to agent providers.
    fn definition(&self) -> ToolDefinition;

    /// Run the tool with JSON arguments.
    ///
    /// Bad arguments are reported as an `invalid_argument` output; a tool
    /// never panics on agent input.
    fn call(&self, turn: &mut TurnSnapshot, params: Value) -> ToolOutput;
}

// Compile-time assertion: Tool must be object-safe.
const _: () = {
    fn _assert_object_safe(_: &dyn Tool) {}
};
