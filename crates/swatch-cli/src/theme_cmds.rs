//! CLI handlers for `swatch theme` subcommands.

use anyhow::Result;
use serde_json::json;

use crate::ThemeCommands;
use crate::app::App;
use crate::output;

/// Dispatch a `ThemeCommands` variant to the appropriate handler.
pub fn run_theme_command(command: ThemeCommands, app: &mut App, json: bool) -> Result<()> {
    let (name, params) = match command {
        ThemeCommands::Set {
            month,
            theme,
            description,
        } => (
            "set_month_theme",
            json!({ "month": month, "theme": theme, "description": description }),
        ),
        ThemeCommands::Get { month } => ("get_month_theme", json!({ "month": month })),
        ThemeCommands::Clear { month } => ("clear_month_theme", json!({ "month": month })),
    };

    let (out, changed) = app.run_tool(name, params);
    if changed {
        app.save_session()?;
    }
    if !json && out.success {
        if let Some(description) = out
            .get("description")
            .and_then(|d| d.as_str())
            .filter(|d| !d.is_empty())
        {
            println!("{description}");
        }
    }
    output::finish_tool(&out, json)
}
