//! Month theme tools: `set_month_theme`, `get_month_theme` and
//! `clear_month_theme`.

use serde::Deserialize;
use serde_json::Value;

use crate::tools::trait_def::Tool;
use crate::tools::types::{PropertySchema, ToolDefinition, ToolInputSchema, ToolOutput};
use crate::tools::{month_key, parse_params, try_output};
use crate::workspace::TurnSnapshot;

use super::{MonthParams, SESSION_NOTE};

fn month_schema() -> ToolInputSchema {
    ToolInputSchema::object()
        .required_property("month", PropertySchema::month())
        .property("year", PropertySchema::year())
}

#[derive(Debug, Deserialize)]
struct SetThemeParams {
    month: i64,
    theme: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    year: Option<i32>,
}

pub struct SetMonthThemeTool {
    definition: ToolDefinition,
}

impl SetMonthThemeTool {
    pub fn new() -> Self {
        Self {
            definition: ToolDefinition {
                name: "set_month_theme".to_string(),
                description: "Give a month a short theme name and a longer description that \
                              ties its items together."
                    .to_string(),
                input_schema: month_schema()
                    .required_property(
                        "theme",
                        PropertySchema::string("Short theme name, e.g. \"Winter Blues\""),
                    )
                    .property(
                        "description",
                        PropertySchema::string("Longer description of the theme"),
                    ),
            },
        }
    }
}

impl Default for SetMonthThemeTool {
    fn default() -> Self {
        Self::new()
    }
}

impl Tool for SetMonthThemeTool {
    fn name(&self) -> &str {
        &self.definition.name
    }

    fn definition(&self) -> ToolDefinition {
        self.definition.clone()
    }

    fn call(&self, turn: &mut TurnSnapshot, params: Value) -> ToolOutput {
        let params: SetThemeParams = try_output!(parse_params(params));
        let key = try_output!(month_key(turn, params.month, params.year));

        match turn.set_theme(key, &params.theme, &params.description) {
            Ok(record) => ToolOutput::success(format!(
                "Set theme for {} {}",
                key.month_name(),
                key.year()
            ))
            .with("month", key.month())
            .with("month_name", key.month_name())
            .with("year", key.year())
            .with("theme", record.theme)
            .with("description", record.description)
            .with("note", SESSION_NOTE),
            Err(_) => ToolOutput::invalid_argument("Theme name cannot be empty"),
        }
    }
}

pub struct GetMonthThemeTool {
    definition: ToolDefinition,
}

impl GetMonthThemeTool {
    pub fn new() -> Self {
        Self {
            definition: ToolDefinition {
                name: "get_month_theme".to_string(),
                description: "Get a month's theme: the session theme if set, otherwise the \
                              theme saved with the item on the first day of the month."
                    .to_string(),
                input_schema: month_schema(),
            },
        }
    }
}

impl Default for GetMonthThemeTool {
    fn default() -> Self {
        Self::new()
    }
}

impl Tool for GetMonthThemeTool {
    fn name(&self) -> &str {
        &self.definition.name
    }

    fn definition(&self) -> ToolDefinition {
        self.definition.clone()
    }

    fn call(&self, turn: &mut TurnSnapshot, params: Value) -> ToolOutput {
        let params: MonthParams = try_output!(parse_params(params));
        let key = try_output!(month_key(turn, params.month, params.year));
        let label = format!("{} {}", key.month_name(), key.year());

        let output = match turn.resolve_theme(key) {
            Some(resolved) => ToolOutput::success(format!("Theme for {label}: {}", resolved.theme))
                .with("theme", resolved.theme)
                .with("description", resolved.description)
                .with("source", resolved.source),
            None => ToolOutput::success(format!("No theme set for {label}"))
                .with("theme", Value::Null)
                .with("description", Value::Null),
        };
        output
            .with("month", key.month())
            .with("month_name", key.month_name())
            .with("year", key.year())
    }
}

pub struct ClearMonthThemeTool {
    definition: ToolDefinition,
}

impl ClearMonthThemeTool {
    pub fn new() -> Self {
        Self {
            definition: ToolDefinition {
                name: "clear_month_theme".to_string(),
                description: "Remove a month's session theme.".to_string(),
                input_schema: month_schema(),
            },
        }
    }
}

impl Default for ClearMonthThemeTool {
    fn default() -> Self {
        Self::new()
    }
}

impl Tool for ClearMonthThemeTool {
    fn name(&self) -> &str {
        &self.definition.name
    }

    fn definition(&self) -> ToolDefinition {
        self.definition.clone()
    }

    fn call(&self, turn: &mut TurnSnapshot, params: Value) -> ToolOutput {
        let params: MonthParams = try_output!(parse_params(params));
        let key = try_output!(month_key(turn, params.month, params.year));
        let label = format!("{} {}", key.month_name(), key.year());

        let message = match turn.clear_theme(key) {
            Some(_) => format!("Cleared theme for {label}"),
            None => format!("No theme was set for {label}"),
        };
        ToolOutput::success(message)
            .with("month", key.month())
            .with("month_name", key.month_name())
            .with("year", key.year())
    }
}
