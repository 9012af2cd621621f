//! Agent-callable tool facade.
//!
//! Wraps the mutation engine and the read side as named operations an LLM
//! can call with JSON arguments. Every tool reads and writes a
//! [`TurnSnapshot`]; live state only changes when the caller commits the
//! turn.
//!
//! ```text
//! Workspace::begin_turn() --> TurnSnapshot
//!                                  |
//! ToolRegistry::invoke(&mut snapshot, "assign_by_name", {...})
//!                                  |
//!                          Tool::call --> ToolOutput {success, message, ...}
//!                                  |
//! Workspace::commit_turn(snapshot)
//! ```

pub mod builtin;
pub mod registry;
pub mod trait_def;
pub mod types;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::engine::ErrorKind;
use crate::model::MonthKey;
use crate::workspace::TurnSnapshot;

pub use registry::ToolRegistry;
pub use trait_def::Tool;
pub use types::{PropertySchema, ToolDefinition, ToolInputSchema, ToolOutput};

/// A registry holding every built-in tool.
pub fn default_registry() -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(builtin::ListItemsTool::new());
    registry.register(builtin::SearchItemsTool::new());
    registry.register(builtin::GetMonthAssignmentsTool::new());
    registry.register(builtin::AssignByNameTool::new());
    registry.register(builtin::BulkAssignMonthTool::new());
    registry.register(builtin::UnassignByDateTool::new());
    registry.register(builtin::ClearMonthTool::new());
    registry.register(builtin::SummarizeYearTool::new());
    registry.register(builtin::FindCandidatesTool::new());
    registry.register(builtin::SetMonthThemeTool::new());
    registry.register(builtin::GetMonthThemeTool::new());
    registry.register(builtin::ClearMonthThemeTool::new());
    registry
}

/// Decode tool arguments; `null` counts as an empty object.
pub(crate) fn parse_params<T: DeserializeOwned>(params: Value) -> Result<T, ToolOutput> {
    let params = if params.is_null() {
        Value::Object(Default::default())
    } else {
        params
    };
    serde_json::from_value(params)
        .map_err(|e| ToolOutput::invalid_argument(format!("Invalid parameters: {e}")))
}

/// Validate a month argument, defaulting the year to the snapshot's.
pub(crate) fn month_key(
    turn: &TurnSnapshot,
    month: i64,
    year: Option<i32>,
) -> Result<MonthKey, ToolOutput> {
    let month = u32::try_from(month)
        .ok()
        .filter(|m| (1..=12).contains(m))
        .ok_or_else(|| {
            ToolOutput::invalid_argument(format!("Invalid month: {month}. Must be 1-12."))
        })?;
    let year = year.unwrap_or(turn.year());
    MonthKey::new(year, month)
        .ok_or_else(|| ToolOutput::invalid_argument(format!("Invalid year: {year}.")))
}

/// Refuse to run against an empty collection.
pub(crate) fn require_items(turn: &TurnSnapshot) -> Result<(), ToolOutput> {
    if turn.items().is_empty() {
        return Err(ToolOutput::failure(
            ErrorKind::NotFound,
            "No items available in the collection",
        ));
    }
    Ok(())
}

/// Unwrap a step that short-circuits with a [`ToolOutput`].
macro_rules! try_output {
    ($expr:expr) => {
        match $expr {
            Ok(value) => value,
            Err(output) => return output,
        }
    };
}
pub(crate) use try_output;
