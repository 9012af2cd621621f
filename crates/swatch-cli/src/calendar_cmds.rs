//! CLI handlers for calendar edits and views.
//!
//! Implements:
//! - `swatch month <m>`             -- day-by-day view of one month
//! - `swatch assign <item> <date>`  -- bind an item (by name) to a date
//! - `swatch unassign <date>`       -- remove a session binding
//! - `swatch move <from> <to>`      -- move a session binding
//! - `swatch swap <d1> <d2>`        -- exchange two session bindings
//! - `swatch bulk <m> <items>...`   -- fill a month's free days in order
//! - `swatch clear-month <m>`       -- drop a month's session bindings
//! - `swatch summary`               -- per-month overview of the year

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::json;

use swatch_core::MonthKey;

use crate::app::App;
use crate::output::{self, column_width};

// -----------------------------------------------------------------------
// swatch month
// -----------------------------------------------------------------------

pub fn cmd_month(app: &mut App, month: u32, json: bool) -> Result<()> {
    if json {
        let (out, _) = app.run_tool("get_month_assignments", json!({ "month": month }));
        return output::finish_tool(&out, true);
    }

    let key = MonthKey::new(app.workspace.year(), month)
        .with_context(|| format!("Invalid month: {month}. Must be 1-12."))?;
    let cells = app.workspace.month_cells(key);

    print!("{} {}", key.month_name(), key.year());
    match app.workspace.resolve_theme(key) {
        Some(theme) if theme.description.is_empty() => println!("  (theme: {})", theme.theme),
        Some(theme) => println!("  (theme: {}: {})", theme.theme, theme.description),
        None => println!(),
    }
    println!();

    let mut assigned = 0;
    for cell in &cells {
        match &cell.item {
            Some(item) => {
                assigned += 1;
                let marker = if cell.protected { "persisted" } else { "session" };
                println!(
                    "  {:>2}  {} {}  [{marker}] #{}",
                    cell.day, item.brand, item.name, item.index
                );
            }
            None => println!("  {:>2}  -", cell.day),
        }
    }
    println!();
    println!("{assigned} of {} days assigned", cells.len());
    Ok(())
}

// -----------------------------------------------------------------------
// swatch assign / unassign / move / swap
// -----------------------------------------------------------------------

pub fn cmd_assign(app: &mut App, item: &str, date: &str, json: bool) -> Result<()> {
    let (out, changed) = app.run_tool("assign_by_name", json!({ "item": item, "date": date }));
    if changed {
        app.save_session()?;
    }
    output::finish_tool(&out, json)
}

pub fn cmd_unassign(app: &mut App, date: &str, json: bool) -> Result<()> {
    let (out, changed) = app.run_tool("unassign_by_date", json!({ "date": date }));
    if changed {
        app.save_session()?;
    }
    output::finish_tool(&out, json)
}

pub fn cmd_move(app: &mut App, from: &str, to: &str, json: bool) -> Result<()> {
    let result = app.workspace.move_assignment(Some(from), Some(to), None);
    if result.success {
        app.save_session()?;
    }
    output::finish_mutation(&result, json)
}

pub fn cmd_swap(app: &mut App, date1: &str, date2: &str, json: bool) -> Result<()> {
    let result = app.workspace.swap(date1, date2);
    if result.success {
        app.save_session()?;
    }
    output::finish_mutation(&result, json)
}

// -----------------------------------------------------------------------
// swatch bulk / clear-month
// -----------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct BulkRow {
    item_identifier: String,
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    reason: Option<String>,
    #[serde(default)]
    assigned_date: Option<String>,
}

pub fn cmd_bulk(app: &mut App, month: u32, items: &[String], json: bool) -> Result<()> {
    let (out, changed) = app.run_tool(
        "bulk_assign_month",
        json!({ "month": month, "items": items }),
    );
    if changed {
        app.save_session()?;
    }
    if !json && out.success {
        let rows = |key: &str| -> Vec<BulkRow> {
            out.get(key)
                .cloned()
                .and_then(|v| serde_json::from_value(v).ok())
                .unwrap_or_default()
        };
        for row in rows("successful") {
            println!("  + {} -> {}", row.item_identifier, row.date.unwrap_or_default());
        }
        for row in rows("already_assigned") {
            println!(
                "  = {} already on {}",
                row.item_identifier,
                row.assigned_date.unwrap_or_default()
            );
        }
        for row in rows("failed") {
            println!("  ! {}: {}", row.item_identifier, row.reason.unwrap_or_default());
        }
    }
    output::finish_tool(&out, json)
}

pub fn cmd_clear_month(app: &mut App, month: u32, json: bool) -> Result<()> {
    let (out, changed) = app.run_tool("clear_month", json!({ "month": month }));
    if changed {
        app.save_session()?;
    }
    output::finish_tool(&out, json)
}

// -----------------------------------------------------------------------
// swatch summary
// -----------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct SummaryRow {
    month_name: String,
    days_in_month: u32,
    persisted_assignments: u32,
    session_assignments: u32,
    unassigned_days: u32,
    #[serde(default)]
    theme: Option<String>,
}

pub fn cmd_summary(app: &mut App, json: bool) -> Result<()> {
    let (out, _) = app.run_tool("summarize_year", json!({}));
    if json || !out.success {
        return output::finish_tool(&out, json);
    }

    let rows: Vec<SummaryRow> = out
        .get("monthly_summary")
        .cloned()
        .map(serde_json::from_value)
        .transpose()
        .context("unexpected summarize_year output")?
        .unwrap_or_default();

    let month_w = column_width(rows.iter().map(|r| r.month_name.as_str()), 5);
    println!(
        "{:<month_w$}  {:>4}  {:>9}  {:>7}  {:>4}  THEME",
        "MONTH", "DAYS", "PERSISTED", "SESSION", "FREE"
    );
    for row in &rows {
        println!(
            "{:<month_w$}  {:>4}  {:>9}  {:>7}  {:>4}  {}",
            row.month_name,
            row.days_in_month,
            row.persisted_assignments,
            row.session_assignments,
            row.unassigned_days,
            row.theme.as_deref().unwrap_or("-"),
        );
    }
    println!();
    println!("{}", out.message);
    Ok(())
}
