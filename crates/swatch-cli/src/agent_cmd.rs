//! `swatch agent` and `swatch tools`.
//!
//! `agent` drives the tool registry with an [`AgentProvider`]; the CLI ships
//! the scripted provider, which replays a JSON file of tool-call turns.
//! Committed turns are written to the session file when the run ends.

use std::path::Path;

use anyhow::Result;
use tracing::info;

use swatch_core::agent::{AgentProvider, AgentRunner, RunReport, ScriptedProvider};

use crate::app::App;
use crate::output;

/// Print every tool definition as a JSON array.
pub fn cmd_tools(app: &App) -> Result<()> {
    output::print_json(&app.registry().definitions())
}

pub async fn run_agent(
    app: &mut App,
    script: &Path,
    message: &str,
    max_turns: usize,
    json: bool,
) -> Result<()> {
    let mut provider = ScriptedProvider::load(script)?;
    let report = drive(app, &mut provider, message, max_turns).await?;

    if json {
        return output::print_json(&report);
    }
    print_report(&report);
    Ok(())
}

async fn drive(
    app: &mut App,
    provider: &mut dyn AgentProvider,
    message: &str,
    max_turns: usize,
) -> Result<RunReport> {
    let runner = AgentRunner::new(swatch_core::tools::default_registry()).with_max_turns(max_turns);
    let report = runner.run(&mut app.workspace, provider, message).await?;

    if report.turns.iter().any(|t| t.committed) {
        app.save_session()?;
    }
    info!(
        turns = report.turns.len(),
        calls = report.tool_calls(),
        failed = report.failed_calls(),
        "agent run complete"
    );
    Ok(report)
}

fn print_report(report: &RunReport) {
    for (n, turn) in report.turns.iter().enumerate() {
        println!("Turn {}{}", n + 1, if turn.committed { "" } else { " (no changes)" });
        if let Some(message) = &turn.message {
            println!("  {message}");
        }
        for result in &turn.results {
            let mark = if result.output.success { "ok" } else { "refused" };
            println!("  {} [{mark}] {}", result.call.name, result.output.message);
        }
    }
    println!();
    println!(
        "{} tool calls, {} refused{}",
        report.tool_calls(),
        report.failed_calls(),
        if report.truncated { "; stopped at the turn limit" } else { "" }
    );
}
