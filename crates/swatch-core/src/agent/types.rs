//! Messages exchanged between the runner and an agent provider.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::tools::{ToolDefinition, ToolOutput};

/// One tool invocation requested by the agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub name: String,
    #[serde(default)]
    pub arguments: Value,
}

/// One agent turn: optional text plus the tool calls to run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentTurn {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default)]
    pub tool_calls: Vec<ToolCall>,
}

/// A tool call paired with what it returned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallResult {
    pub call: ToolCall,
    pub output: ToolOutput,
}

/// Everything a provider needs to produce its next turn.
#[derive(Debug, Clone, Serialize)]
pub struct TurnRequest {
    pub system_prompt: String,
    pub user_message: String,
    pub tools: Vec<ToolDefinition>,
    /// Results of the previous turn's tool calls; empty on the first turn.
    pub previous_results: Vec<ToolCallResult>,
    /// Zero-based turn counter.
    pub turn: usize,
}
