//! Month-scoped tools: `get_month_assignments`, `bulk_assign_month`,
//! `clear_month` and `summarize_year`.

use chrono::Datelike;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::engine::{ErrorKind, Operation};
use crate::model::{ItemIndex, ItemRef, MonthKey, format_date};
use crate::store::{self, days_in_month, month_dates};
use crate::tools::trait_def::Tool;
use crate::tools::types::{PropertySchema, ToolDefinition, ToolInputSchema, ToolOutput};
use crate::tools::{month_key, parse_params, require_items, try_output};
use crate::workspace::TurnSnapshot;

use super::{MonthParams, SESSION_NOTE};

/// Base output for a month: `month`, `month_name`, `year`.
fn month_output(output: ToolOutput, key: MonthKey) -> ToolOutput {
    output
        .with("month", key.month())
        .with("month_name", key.month_name())
        .with("year", key.year())
}

fn month_params_schema() -> ToolInputSchema {
    ToolInputSchema::object()
        .required_property("month", PropertySchema::month())
        .property("year", PropertySchema::year())
}

// ---------------------------------------------------------------------------
// get_month_assignments
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct DayAssignment {
    date: String,
    day: u32,
    item_index: ItemIndex,
    brand: String,
    name: String,
    protected: bool,
}

pub struct GetMonthAssignmentsTool {
    definition: ToolDefinition,
}

impl GetMonthAssignmentsTool {
    pub fn new() -> Self {
        Self {
            definition: ToolDefinition {
                name: "get_month_assignments".to_string(),
                description: "Show which items are assigned to which days of a month, marking \
                              protected (persisted) days."
                    .to_string(),
                input_schema: month_params_schema(),
            },
        }
    }
}

impl Default for GetMonthAssignmentsTool {
    fn default() -> Self {
        Self::new()
    }
}

impl Tool for GetMonthAssignmentsTool {
    fn name(&self) -> &str {
        &self.definition.name
    }

    fn definition(&self) -> ToolDefinition {
        self.definition.clone()
    }

    fn call(&self, turn: &mut TurnSnapshot, params: Value) -> ToolOutput {
        let params: MonthParams = try_output!(parse_params(params));
        let key = try_output!(month_key(turn, params.month, params.year));
        try_output!(require_items(turn));

        let assignments: Vec<DayAssignment> =
            store::month_cells(key, turn.items(), turn.session(), turn.persisted())
                .into_iter()
                .filter_map(|cell| {
                    let item = cell.item?;
                    Some(DayAssignment {
                        date: cell.date,
                        day: cell.day,
                        item_index: item.index,
                        brand: item.brand,
                        name: item.name,
                        protected: cell.protected,
                    })
                })
                .collect();

        let total = days_in_month(key);
        let assigned = assignments.len() as u32;
        let theme = turn.resolve_theme(key).map(|t| t.theme);
        month_output(
            ToolOutput::success(format!(
                "{} of {total} days assigned in {} {}",
                assigned,
                key.month_name(),
                key.year()
            )),
            key,
        )
        .with("days_in_month", total)
        .with("assigned_days", assigned)
        .with("unassigned_days", total - assigned)
        .with("theme", theme)
        .with("assignments", assignments)
    }
}

// ---------------------------------------------------------------------------
// bulk_assign_month
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct BulkParams {
    items: Vec<String>,
    month: i64,
    #[serde(default)]
    year: Option<i32>,
}

#[derive(Debug, Serialize)]
struct BulkSuccess {
    item_identifier: String,
    item: Option<ItemRef>,
    date: String,
    day: u32,
}

#[derive(Debug, Serialize)]
struct BulkFailure {
    item_identifier: String,
    reason: String,
}

#[derive(Debug, Serialize)]
struct BulkAlreadyAssigned {
    item_identifier: String,
    item: Option<ItemRef>,
    assigned_date: Option<String>,
}

pub struct BulkAssignMonthTool {
    definition: ToolDefinition,
}

impl BulkAssignMonthTool {
    pub fn new() -> Self {
        Self {
            definition: ToolDefinition {
                name: "bulk_assign_month".to_string(),
                description: "Assign several items to the free days of a month, in order. \
                              Fails without changing anything if there are more items than \
                              free days. Protected days are never touched."
                    .to_string(),
                input_schema: month_params_schema().required_property(
                    "items",
                    PropertySchema::string_array("Item names, in the order they should appear"),
                ),
            },
        }
    }
}

impl Default for BulkAssignMonthTool {
    fn default() -> Self {
        Self::new()
    }
}

impl Tool for BulkAssignMonthTool {
    fn name(&self) -> &str {
        &self.definition.name
    }

    fn definition(&self) -> ToolDefinition {
        self.definition.clone()
    }

    fn call(&self, turn: &mut TurnSnapshot, params: Value) -> ToolOutput {
        let params: BulkParams = try_output!(parse_params(params));
        let key = try_output!(month_key(turn, params.month, params.year));
        try_output!(require_items(turn));

        let merged = turn.merged();
        let free_days: Vec<_> = month_dates(key)
            .into_iter()
            .filter(|date| !merged.contains_key(date))
            .collect();

        if params.items.len() > free_days.len() {
            return ToolOutput::invalid_argument(format!(
                "Not enough days. Need {}, only {} available.",
                params.items.len(),
                free_days.len()
            ))
            .with("needed_days", params.items.len())
            .with("available_days", free_days.len());
        }

        let mut successful = Vec::new();
        let mut failed = Vec::new();
        let mut already_assigned = Vec::new();

        // Identifiers map positionally onto free days; a skipped identifier
        // leaves its day empty.
        for (identifier, date) in params.items.into_iter().zip(free_days) {
            let Some((index, _)) = store::find_by_name(&identifier, turn.items()) else {
                failed.push(BulkFailure {
                    item_identifier: identifier,
                    reason: "Item not found".to_string(),
                });
                continue;
            };

            let result = turn.apply(Operation::Assign { to: date, item: index });
            if result.success {
                successful.push(BulkSuccess {
                    item_identifier: identifier,
                    item: result.details.item,
                    date: format_date(date),
                    day: date.day(),
                });
            } else if result.reason == Some(ErrorKind::Conflict) {
                already_assigned.push(BulkAlreadyAssigned {
                    item_identifier: identifier,
                    item: result.details.item,
                    assigned_date: result.details.assigned_date,
                });
            } else {
                failed.push(BulkFailure {
                    item_identifier: identifier,
                    reason: result.message,
                });
            }
        }

        let label = format!("{} {}", key.month_name(), key.year());
        let output = if successful.is_empty() {
            let reason = if already_assigned.is_empty() {
                ErrorKind::NotFound
            } else {
                ErrorKind::Conflict
            };
            ToolOutput::failure(reason, format!("No items were assigned in {label}"))
        } else {
            ToolOutput::success(format!("Assigned {} items in {label}", successful.len()))
        };

        month_output(output, key)
            .with("successful_assignments", successful.len())
            .with("failed_assignments", failed.len())
            .with("already_assigned_items", already_assigned.len())
            .with("successful", successful)
            .with("failed", failed)
            .with("already_assigned", already_assigned)
            .with("note", SESSION_NOTE)
    }
}

// ---------------------------------------------------------------------------
// clear_month
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct ClearedDay {
    date: String,
    day: u32,
    item: Option<ItemRef>,
}

pub struct ClearMonthTool {
    definition: ToolDefinition,
}

impl ClearMonthTool {
    pub fn new() -> Self {
        Self {
            definition: ToolDefinition {
                name: "clear_month".to_string(),
                description: "Remove every session assignment in a month. Persisted \
                              assignments are protected and stay in place."
                    .to_string(),
                input_schema: month_params_schema(),
            },
        }
    }
}

impl Default for ClearMonthTool {
    fn default() -> Self {
        Self::new()
    }
}

impl Tool for ClearMonthTool {
    fn name(&self) -> &str {
        &self.definition.name
    }

    fn definition(&self) -> ToolDefinition {
        self.definition.clone()
    }

    fn call(&self, turn: &mut TurnSnapshot, params: Value) -> ToolOutput {
        let params: MonthParams = try_output!(parse_params(params));
        let key = try_output!(month_key(turn, params.month, params.year));

        let describe = |(date, index): (&chrono::NaiveDate, &ItemIndex)| ClearedDay {
            date: format_date(*date),
            day: date.day(),
            item: ItemRef::lookup(turn.items(), *index),
        };

        let protected: Vec<ClearedDay> = turn
            .persisted()
            .iter()
            .filter(|(date, _)| key.contains(**date))
            .map(describe)
            .collect();
        let removed: Vec<ClearedDay> = turn
            .session()
            .iter()
            .filter(|(date, _)| key.contains(**date))
            .map(describe)
            .collect();

        if !removed.is_empty() {
            let mut session = turn.session().clone();
            session.retain(|date, _| !key.contains(*date));
            turn.replace_session(session);
        }

        let label = format!("{} {}", key.month_name(), key.year());
        let output = if !removed.is_empty() || protected.is_empty() {
            ToolOutput::success(format!(
                "Cleared {} session assignments for {label}",
                removed.len()
            ))
        } else {
            ToolOutput::failure(
                ErrorKind::Protected,
                format!(
                    "Nothing cleared for {label}: all {} assignments are protected",
                    protected.len()
                ),
            )
        };

        month_output(output, key)
            .with("removed_count", removed.len())
            .with("protected_count", protected.len())
            .with("removed", removed)
            .with("protected", protected)
    }
}

// ---------------------------------------------------------------------------
// summarize_year
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct YearParams {
    #[serde(default)]
    year: Option<i32>,
}

#[derive(Debug, Serialize)]
struct MonthSummary {
    month: u32,
    month_name: &'static str,
    days_in_month: u32,
    assigned_days: u32,
    persisted_assignments: u32,
    session_assignments: u32,
    unassigned_days: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    theme: Option<String>,
}

pub struct SummarizeYearTool {
    definition: ToolDefinition,
}

impl SummarizeYearTool {
    pub fn new() -> Self {
        Self {
            definition: ToolDefinition {
                name: "summarize_year".to_string(),
                description: "Overview of the year: assigned, persisted and session days per \
                              month, with month themes."
                    .to_string(),
                input_schema: ToolInputSchema::object().property("year", PropertySchema::year()),
            },
        }
    }
}

impl Default for SummarizeYearTool {
    fn default() -> Self {
        Self::new()
    }
}

impl Tool for SummarizeYearTool {
    fn name(&self) -> &str {
        &self.definition.name
    }

    fn definition(&self) -> ToolDefinition {
        self.definition.clone()
    }

    fn call(&self, turn: &mut TurnSnapshot, params: Value) -> ToolOutput {
        let params: YearParams = try_output!(parse_params(params));
        try_output!(require_items(turn));
        let year = try_output!(month_key(turn, 1, params.year)).year();

        let merged = turn.merged();
        let months: Vec<MonthSummary> = (1..=12)
            .filter_map(|m| MonthKey::new(year, m))
            .map(|key| {
                let mut persisted = 0;
                let mut session = 0;
                for date in merged.keys().filter(|d| key.contains(**d)) {
                    if turn.persisted().contains_key(date) {
                        persisted += 1;
                    } else {
                        session += 1;
                    }
                }
                let days = days_in_month(key);
                MonthSummary {
                    month: key.month(),
                    month_name: key.month_name(),
                    days_in_month: days,
                    assigned_days: persisted + session,
                    persisted_assignments: persisted,
                    session_assignments: session,
                    unassigned_days: days - persisted - session,
                    theme: turn.resolve_theme(key).map(|t| t.theme),
                }
            })
            .collect();

        let total_days: u32 = months.iter().map(|m| m.days_in_month).sum();
        let assigned: u32 = months.iter().map(|m| m.assigned_days).sum();

        ToolOutput::success(format!("{assigned} of {total_days} days assigned in {year}"))
            .with("year", year)
            .with("total_items", turn.items().len())
            .with("total_days_in_year", total_days)
            .with("total_assigned_days", assigned)
            .with("total_unassigned_days", total_days - assigned)
            .with("monthly_summary", months)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Item, parse_date};
    use crate::workspace::Workspace;
    use serde_json::json;

    fn items(n: usize) -> Vec<Item> {
        (0..n).map(|i| Item::new("Brand", format!("Ink {i:02}"))).collect()
    }

    fn persisted(item: &mut Item, date: &str) {
        item.private_comment = format!(r#"{{"swatch2026":{{"date":"{date}"}}}}"#);
    }

    #[test]
    fn month_assignments_mark_protected_days() {
        let mut list = items(3);
        persisted(&mut list[0], "2026-03-02");
        let mut ws = Workspace::new(list, 2026);
        ws.move_assignment(None, Some("2026-03-10"), Some(1));

        let mut turn = ws.begin_turn();
        let out = GetMonthAssignmentsTool::new().call(&mut turn, json!({"month": 3}));
        assert!(out.success);
        assert_eq!(out.get("month_name"), Some(&json!("March")));
        assert_eq!(out.get("assigned_days"), Some(&json!(2)));
        assert_eq!(out.get("unassigned_days"), Some(&json!(29)));
        let days = out.get("assignments").unwrap().as_array().unwrap();
        assert_eq!(days[0]["day"], 2);
        assert_eq!(days[0]["protected"], true);
        assert_eq!(days[1]["date"], "2026-03-10");
        assert_eq!(days[1]["protected"], false);
    }

    #[test]
    fn invalid_month_is_rejected() {
        let mut turn = Workspace::new(items(1), 2026).begin_turn();
        let out = GetMonthAssignmentsTool::new().call(&mut turn, json!({"month": 13}));
        assert_eq!(out.reason, Some(ErrorKind::InvalidArgument));
        assert_eq!(out.message, "Invalid month: 13. Must be 1-12.");
    }

    #[test]
    fn unrepresentable_year_is_rejected_without_writing() {
        let mut turn = Workspace::new(items(2), 2026).begin_turn();
        let out = BulkAssignMonthTool::new().call(
            &mut turn,
            json!({"items": ["Ink 00"], "month": 3, "year": 300000}),
        );
        assert_eq!(out.reason, Some(ErrorKind::InvalidArgument));
        assert_eq!(out.message, "Invalid year: 300000.");
        assert!(!turn.is_dirty());

        let summary = SummarizeYearTool::new().call(&mut turn, json!({"year": 300000}));
        assert_eq!(summary.reason, Some(ErrorKind::InvalidArgument));
    }

    #[test]
    fn bulk_assign_fills_free_days_in_order() {
        let mut list = items(4);
        persisted(&mut list[0], "2026-02-01");
        let mut turn = Workspace::new(list, 2026).begin_turn();

        let out = BulkAssignMonthTool::new().call(
            &mut turn,
            json!({"items": ["Ink 01", "Ink 02"], "month": 2}),
        );
        assert!(out.success, "{}", out.message);
        assert_eq!(out.get("successful_assignments"), Some(&json!(2)));
        let successful = out.get("successful").unwrap().as_array().unwrap();
        assert_eq!(successful[0]["date"], "2026-02-02");
        assert_eq!(successful[0]["day"], 2);
        assert_eq!(successful[1]["date"], "2026-02-03");
        assert_eq!(turn.session().len(), 2);
    }

    #[test]
    fn bulk_assign_buckets_failures() {
        let mut list = items(3);
        persisted(&mut list[0], "2026-05-20");
        let mut turn = Workspace::new(list, 2026).begin_turn();

        let out = BulkAssignMonthTool::new().call(
            &mut turn,
            json!({"items": ["Ink 01", "Nope", "Ink 00", "Ink 01"], "month": 5}),
        );
        assert!(out.success);
        assert_eq!(out.get("successful_assignments"), Some(&json!(1)));
        assert_eq!(out.get("failed_assignments"), Some(&json!(1)));
        assert_eq!(out.get("already_assigned_items"), Some(&json!(2)));
        let already = out.get("already_assigned").unwrap().as_array().unwrap();
        assert_eq!(already[0]["assigned_date"], "2026-05-20");
        assert_eq!(already[1]["assigned_date"], "2026-05-01");
    }

    #[test]
    fn bulk_assign_with_nothing_assigned_fails() {
        let mut turn = Workspace::new(items(1), 2026).begin_turn();
        let out = BulkAssignMonthTool::new().call(&mut turn, json!({"items": ["Zzz"], "month": 1}));
        assert!(!out.success);
        assert!(!turn.is_dirty());
    }

    #[test]
    fn clear_month_keeps_protected_days() {
        let mut list = items(4);
        persisted(&mut list[0], "2026-04-01");
        let mut ws = Workspace::new(list, 2026);
        ws.move_assignment(None, Some("2026-04-02"), Some(1));
        ws.move_assignment(None, Some("2026-04-03"), Some(2));
        ws.move_assignment(None, Some("2026-05-01"), Some(3));

        let mut turn = ws.begin_turn();
        let out = ClearMonthTool::new().call(&mut turn, json!({"month": 4}));
        assert!(out.success);
        assert_eq!(out.get("removed_count"), Some(&json!(2)));
        assert_eq!(out.get("protected_count"), Some(&json!(1)));
        assert_eq!(turn.session().len(), 1);
        assert!(turn.session().contains_key(&parse_date("2026-05-01").unwrap()));
    }

    #[test]
    fn clear_month_with_only_protected_days_fails() {
        let mut list = items(1);
        persisted(&mut list[0], "2026-04-01");
        let mut turn = Workspace::new(list, 2026).begin_turn();
        let out = ClearMonthTool::new().call(&mut turn, json!({"month": 4}));
        assert!(!out.success);
        assert_eq!(out.reason, Some(ErrorKind::Protected));

        let empty = ClearMonthTool::new().call(&mut turn, json!({"month": 6}));
        assert!(empty.success);
        assert!(!turn.is_dirty());
    }

    #[test]
    fn summarize_year_counts_layers() {
        let mut list = items(3);
        persisted(&mut list[0], "2026-01-15");
        let mut ws = Workspace::new(list, 2026);
        ws.move_assignment(None, Some("2026-01-16"), Some(1));
        ws.set_theme(MonthKey::new(2026, 1).unwrap(), "Reds", "").unwrap();

        let mut turn = ws.begin_turn();
        let out = SummarizeYearTool::new().call(&mut turn, Value::Null);
        assert_eq!(out.get("total_days_in_year"), Some(&json!(365)));
        assert_eq!(out.get("total_assigned_days"), Some(&json!(2)));
        let january = &out.get("monthly_summary").unwrap()[0];
        assert_eq!(january["persisted_assignments"], 1);
        assert_eq!(january["session_assignments"], 1);
        assert_eq!(january["theme"], "Reds");
        assert!(out.get("monthly_summary").unwrap()[1].get("theme").is_none());
    }
}
