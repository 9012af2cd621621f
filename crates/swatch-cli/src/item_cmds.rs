//! CLI handlers for `swatch items` subcommands and `swatch candidates`.

use anyhow::{Context, Result};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use swatch_core::store::ItemInfo;
use swatch_core::tools::ToolOutput;

use crate::ItemsCommands;
use crate::app::App;
use crate::output::{self, column_width};

/// Dispatch an `ItemsCommands` variant to the appropriate handler.
pub fn run_items_command(command: ItemsCommands, app: &mut App, json: bool) -> Result<()> {
    match command {
        ItemsCommands::List => {
            let (out, _) = app.run_tool("list_items", json!({}));
            print_items(&out, "items", json)
        }
        ItemsCommands::Search {
            query,
            color,
            brand,
        } => {
            let (out, _) = app.run_tool(
                "search_items",
                json!({ "query": query, "color": color, "brand": brand }),
            );
            print_items(&out, "matches", json)
        }
    }
}

fn rows<T: DeserializeOwned>(out: &ToolOutput, key: &str) -> Result<Vec<T>> {
    let value = out.get(key).cloned().unwrap_or(Value::Array(Vec::new()));
    serde_json::from_value(value).with_context(|| format!("unexpected `{key}` in tool output"))
}

fn print_items(out: &ToolOutput, key: &str, json: bool) -> Result<()> {
    if json || !out.success {
        return output::finish_tool(out, json);
    }

    let items: Vec<ItemInfo> = rows(out, key)?;
    if items.is_empty() {
        println!("No items found.");
        return Ok(());
    }

    let brand_w = column_width(items.iter().map(|i| i.brand.as_str()), 5);
    let name_w = column_width(items.iter().map(|i| i.name.as_str()), 4);
    println!("{:>4}  {:<brand_w$}  {:<name_w$}  {:<8}  TAGS", "#", "BRAND", "NAME", "ASSIGNED");
    for item in &items {
        println!(
            "{:>4}  {:<brand_w$}  {:<name_w$}  {:<8}  {}",
            item.index,
            item.brand,
            item.name,
            if item.already_assigned { "yes" } else { "" },
            item.tags.join(", "),
        );
    }
    Ok(())
}

// -----------------------------------------------------------------------
// swatch candidates
// -----------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct CandidateRow {
    #[serde(flatten)]
    info: ItemInfo,
    #[serde(default)]
    current_date: Option<String>,
}

pub struct CandidateArgs {
    pub query: Option<String>,
    pub color: Option<String>,
    pub brand: Option<String>,
    pub unassigned_only: bool,
    pub limit: usize,
}

pub fn cmd_candidates(app: &mut App, args: CandidateArgs, json: bool) -> Result<()> {
    let (out, _) = app.run_tool(
        "find_candidates_for_theme",
        json!({
            "query": args.query,
            "color": args.color,
            "brand": args.brand,
            "include_session_assigned": !args.unassigned_only,
            "limit": args.limit,
        }),
    );
    if json || !out.success {
        return output::finish_tool(&out, json);
    }

    let candidates: Vec<CandidateRow> = rows(&out, "candidates")?;
    println!("{}", out.message);
    for row in &candidates {
        let placed = row
            .current_date
            .as_deref()
            .map(|d| format!("  (session: {d})"))
            .unwrap_or_default();
        println!(
            "  #{:<4} {} {}  [{}]{placed}",
            row.info.index,
            row.info.brand,
            row.info.name,
            row.info.tags.join(", ")
        );
    }
    Ok(())
}
