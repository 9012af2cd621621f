//! Built-in tools, grouped by what they touch.

mod assign;
mod items;
mod month;
mod themes;

pub use assign::{AssignByNameTool, UnassignByDateTool};
pub use items::{CandidateStatus, FindCandidatesTool, ListItemsTool, SearchItemsTool};
pub use month::{BulkAssignMonthTool, ClearMonthTool, GetMonthAssignmentsTool, SummarizeYearTool};
pub use themes::{ClearMonthThemeTool, GetMonthThemeTool, SetMonthThemeTool};

use serde::Deserialize;

/// Parameters shared by every month-scoped tool.
#[derive(Debug, Deserialize)]
struct MonthParams {
    month: i64,
    #[serde(default)]
    year: Option<i32>,
}

const SESSION_NOTE: &str = "Session changes are not persisted until the session is saved.";
