//! Single-date edits: `assign_by_name` and `unassign_by_date`.

use serde::Deserialize;
use serde_json::Value;

use crate::engine::ErrorKind;
use crate::store;
use crate::tools::trait_def::Tool;
use crate::tools::types::{PropertySchema, ToolDefinition, ToolInputSchema, ToolOutput};
use crate::tools::{parse_params, require_items, try_output};
use crate::workspace::TurnSnapshot;

use super::SESSION_NOTE;

// ---------------------------------------------------------------------------
// assign_by_name
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct AssignParams {
    item: String,
    date: String,
}

pub struct AssignByNameTool {
    definition: ToolDefinition,
}

impl AssignByNameTool {
    pub fn new() -> Self {
        Self {
            definition: ToolDefinition {
                name: "assign_by_name".to_string(),
                description: "Assign an item to a date in the session. The item is found by \
                              name or \"brand name\". Dates with persisted assignments are \
                              protected and cannot be changed."
                    .to_string(),
                input_schema: ToolInputSchema::object()
                    .required_property(
                        "item",
                        PropertySchema::string(
                            "Item name or brand plus name, e.g. \"Diamine Oxblood\"",
                        ),
                    )
                    .required_property("date", PropertySchema::string("Date as YYYY-MM-DD")),
            },
        }
    }
}

impl Default for AssignByNameTool {
    fn default() -> Self {
        Self::new()
    }
}

impl Tool for AssignByNameTool {
    fn name(&self) -> &str {
        &self.definition.name
    }

    fn definition(&self) -> ToolDefinition {
        self.definition.clone()
    }

    fn call(&self, turn: &mut TurnSnapshot, params: Value) -> ToolOutput {
        let params: AssignParams = try_output!(parse_params(params));
        try_output!(require_items(turn));

        let Some((index, _)) = store::find_by_name(&params.item, turn.items()) else {
            return ToolOutput::failure(
                ErrorKind::NotFound,
                format!(
                    "Could not find an item matching '{}'. Use search_items to look up the exact name.",
                    params.item
                ),
            );
        };

        let result = turn.move_assignment(None, Some(&params.date), Some(index));
        let output = ToolOutput::from_mutation(&result);
        if result.success {
            output.with("note", SESSION_NOTE)
        } else {
            output
        }
    }
}

// ---------------------------------------------------------------------------
// unassign_by_date
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct UnassignParams {
    date: String,
}

pub struct UnassignByDateTool {
    definition: ToolDefinition,
}

impl UnassignByDateTool {
    pub fn new() -> Self {
        Self {
            definition: ToolDefinition {
                name: "unassign_by_date".to_string(),
                description: "Remove the session assignment on a date. Persisted assignments \
                              are protected and cannot be removed."
                    .to_string(),
                input_schema: ToolInputSchema::object()
                    .required_property("date", PropertySchema::string("Date as YYYY-MM-DD")),
            },
        }
    }
}

impl Default for UnassignByDateTool {
    fn default() -> Self {
        Self::new()
    }
}

impl Tool for UnassignByDateTool {
    fn name(&self) -> &str {
        &self.definition.name
    }

    fn definition(&self) -> ToolDefinition {
        self.definition.clone()
    }

    fn call(&self, turn: &mut TurnSnapshot, params: Value) -> ToolOutput {
        let params: UnassignParams = try_output!(parse_params(params));
        let result = turn.move_assignment(Some(&params.date), None, None);
        ToolOutput::from_mutation(&result)
    }
}
