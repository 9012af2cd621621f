//! Printing tool outputs and mutation results.
//!
//! With `--json` every command prints the raw structured result. Otherwise a
//! command prints the result message, plus a table where it has one. A
//! refused operation becomes a non-zero exit either way.

use anyhow::{Result, bail};
use serde::Serialize;

use swatch_core::MutationResult;
use swatch_core::tools::ToolOutput;

pub fn print_json(value: &impl Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print a tool output and turn a refusal into an error.
pub fn finish_tool(output: &ToolOutput, json: bool) -> Result<()> {
    if json {
        print_json(&output.to_value())?;
    } else if output.success {
        println!("{}", output.message);
    }
    refuse_unless(output.success, &output.message)
}

/// Print a mutation result and turn a refusal into an error.
pub fn finish_mutation(result: &MutationResult, json: bool) -> Result<()> {
    if json {
        print_json(result)?;
    } else if result.success {
        println!("{}", result.message);
    }
    refuse_unless(result.success, &result.message)
}

fn refuse_unless(success: bool, message: &str) -> Result<()> {
    if !success {
        bail!("{message}");
    }
    Ok(())
}

/// Width of the widest string in `cells`, at least `min`.
pub fn column_width<'a>(cells: impl IntoIterator<Item = &'a str>, min: usize) -> usize {
    cells
        .into_iter()
        .map(|c| c.chars().count())
        .max()
        .unwrap_or(0)
        .max(min)
}
