//! Collection browsing: `list_items`, `search_items` and
//! `find_candidates_for_theme`.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::model::{Item, ItemIndex, format_date};
use crate::store::{self, ItemInfo, SearchFilter};
use crate::tools::trait_def::Tool;
use crate::tools::types::{PropertySchema, ToolDefinition, ToolInputSchema, ToolOutput};
use crate::tools::{parse_params, require_items, try_output};
use crate::workspace::TurnSnapshot;

// ---------------------------------------------------------------------------
// list_items
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct NoParams {}

pub struct ListItemsTool {
    definition: ToolDefinition,
}

impl ListItemsTool {
    pub fn new() -> Self {
        Self {
            definition: ToolDefinition {
                name: "list_items".to_string(),
                description: "List every item in the collection with its brand, name, color \
                              tags and whether it is already assigned this year."
                    .to_string(),
                input_schema: ToolInputSchema::object(),
            },
        }
    }
}

impl Default for ListItemsTool {
    fn default() -> Self {
        Self::new()
    }
}

impl Tool for ListItemsTool {
    fn name(&self) -> &str {
        &self.definition.name
    }

    fn definition(&self) -> ToolDefinition {
        self.definition.clone()
    }

    fn call(&self, turn: &mut TurnSnapshot, params: Value) -> ToolOutput {
        let _: NoParams = try_output!(parse_params(params));
        try_output!(require_items(turn));
        let items = store::search(turn.items(), &turn.merged(), &SearchFilter::default());
        ToolOutput::success(format!("{} items in the collection", items.len()))
            .with("total_items", items.len())
            .with("items", items)
    }
}

// ---------------------------------------------------------------------------
// search_items
// ---------------------------------------------------------------------------

pub struct SearchItemsTool {
    definition: ToolDefinition,
}

impl SearchItemsTool {
    pub fn new() -> Self {
        Self {
            definition: ToolDefinition {
                name: "search_items".to_string(),
                description: "Search the collection by name, color tag or brand. All given \
                              filters must match. Returns item indices and assignment status."
                    .to_string(),
                input_schema: ToolInputSchema::object()
                    .property("query", PropertySchema::string("Text to find in the item name"))
                    .property(
                        "color",
                        PropertySchema::string("Color tag to filter by, e.g. \"blue\""),
                    )
                    .property("brand", PropertySchema::string("Brand name to filter by")),
            },
        }
    }
}

impl Default for SearchItemsTool {
    fn default() -> Self {
        Self::new()
    }
}

impl Tool for SearchItemsTool {
    fn name(&self) -> &str {
        &self.definition.name
    }

    fn definition(&self) -> ToolDefinition {
        self.definition.clone()
    }

    fn call(&self, turn: &mut TurnSnapshot, params: Value) -> ToolOutput {
        let filter: SearchFilter = try_output!(parse_params(params));
        try_output!(require_items(turn));
        let matches = store::search(turn.items(), &turn.merged(), &filter);
        ToolOutput::success(format!("{} matching items", matches.len()))
            .with("matches_found", matches.len())
            .with("matches", matches)
    }
}

// ---------------------------------------------------------------------------
// find_candidates_for_theme
// ---------------------------------------------------------------------------

const DEFAULT_CANDIDATE_LIMIT: usize = 20;

/// Where a candidate currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateStatus {
    /// Not bound anywhere; ready to assign.
    Unassigned,
    /// Bound in the session; may be moved.
    SessionAssigned,
}

#[derive(Debug, Serialize)]
struct Candidate {
    #[serde(flatten)]
    info: ItemInfo,
    status: CandidateStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    current_date: Option<String>,
}

#[derive(Debug, Default, Serialize)]
struct CollectionSummary {
    total_items: usize,
    unassigned: usize,
    session_assigned: usize,
    persisted_immovable: usize,
}

#[derive(Debug, Deserialize)]
struct CandidateParams {
    #[serde(default)]
    query: Option<String>,
    #[serde(default)]
    color: Option<String>,
    #[serde(default)]
    brand: Option<String>,
    #[serde(default = "default_true")]
    include_session_assigned: bool,
    #[serde(default = "default_limit")]
    limit: usize,
}

fn default_true() -> bool {
    true
}

fn default_limit() -> usize {
    DEFAULT_CANDIDATE_LIMIT
}

impl CandidateParams {
    /// Broader than [`SearchFilter`]: the query also looks at tags and the
    /// private comment, and color is a tag substring.
    fn matches(&self, item: &Item) -> bool {
        let lower = |s: &Option<String>| {
            s.as_deref()
                .filter(|v| !v.is_empty())
                .map(str::to_lowercase)
        };
        let tag_contains = |needle: &str| item.tags.iter().any(|t| t.to_lowercase().contains(needle));

        if let Some(query) = lower(&self.query) {
            let hit = item.name.to_lowercase().contains(&query)
                || item.brand.to_lowercase().contains(&query)
                || tag_contains(&query)
                || item.private_comment.to_lowercase().contains(&query);
            if !hit {
                return false;
            }
        }
        if let Some(color) = lower(&self.color) {
            if !tag_contains(&color) {
                return false;
            }
        }
        if let Some(brand) = lower(&self.brand) {
            if !item.brand.to_lowercase().contains(&brand) {
                return false;
            }
        }
        true
    }
}

pub struct FindCandidatesTool {
    definition: ToolDefinition,
}

impl FindCandidatesTool {
    pub fn new() -> Self {
        Self {
            definition: ToolDefinition {
                name: "find_candidates_for_theme".to_string(),
                description: "Find items that could fill empty days or be reshuffled. Returns \
                              unassigned items and, unless excluded, session-assigned items \
                              (which can be moved). Persisted items are never returned."
                    .to_string(),
                input_schema: ToolInputSchema::object()
                    .property(
                        "query",
                        PropertySchema::string(
                            "Text to find in the name, brand, tags or notes, e.g. \"shimmer\"",
                        ),
                    )
                    .property("color", PropertySchema::string("Color tag to filter by"))
                    .property("brand", PropertySchema::string("Brand name to filter by"))
                    .property(
                        "include_session_assigned",
                        PropertySchema::boolean(
                            "Include items already assigned this session (default true)",
                        )
                        .with_default(json!(true)),
                    )
                    .property(
                        "limit",
                        PropertySchema::integer("Maximum number of results (default 20)")
                            .with_default(json!(DEFAULT_CANDIDATE_LIMIT)),
                    ),
            },
        }
    }
}

impl Default for FindCandidatesTool {
    fn default() -> Self {
        Self::new()
    }
}

impl Tool for FindCandidatesTool {
    fn name(&self) -> &str {
        &self.definition.name
    }

    fn definition(&self) -> ToolDefinition {
        self.definition.clone()
    }

    fn call(&self, turn: &mut TurnSnapshot, params: Value) -> ToolOutput {
        let params: CandidateParams = try_output!(parse_params(params));
        try_output!(require_items(turn));

        let persisted: HashSet<ItemIndex> = turn.persisted().values().copied().collect();
        let session_dates: HashMap<ItemIndex, String> = turn
            .session()
            .iter()
            .map(|(date, index)| (*index, format_date(*date)))
            .collect();

        let mut summary = CollectionSummary {
            total_items: turn.items().len(),
            ..Default::default()
        };
        let mut candidates = Vec::new();

        for (index, item) in turn.items().iter().enumerate() {
            let (status, current_date) = if persisted.contains(&index) {
                summary.persisted_immovable += 1;
                continue;
            } else if let Some(date) = session_dates.get(&index) {
                summary.session_assigned += 1;
                (CandidateStatus::SessionAssigned, Some(date.clone()))
            } else {
                summary.unassigned += 1;
                (CandidateStatus::Unassigned, None)
            };

            if status == CandidateStatus::SessionAssigned && !params.include_session_assigned {
                continue;
            }
            if candidates.len() >= params.limit || !params.matches(item) {
                continue;
            }
            candidates.push(Candidate {
                info: ItemInfo::new(index, item, status == CandidateStatus::SessionAssigned),
                status,
                current_date,
            });
        }

        ToolOutput::success(format!("{} candidate items", candidates.len()))
            .with("collection_summary", summary)
            .with("matches_returned", candidates.len())
            .with(
                "filters_applied",
                json!({
                    "query": params.query,
                    "color": params.color,
                    "brand": params.brand,
                    "include_session_assigned": params.include_session_assigned,
                    "limit": params.limit,
                }),
            )
            .with("candidates", candidates)
            .with(
                "hint",
                "Unassigned items can be assigned directly. Session-assigned items can be moved \
                 if that improves the schedule.",
            )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ErrorKind;
    use crate::workspace::Workspace;

    fn ink(brand: &str, name: &str, tags: &[&str]) -> Item {
        Item {
            tags: tags.iter().map(|t| t.to_string()).collect(),
            ..Item::new(brand, name)
        }
    }

    fn workspace() -> Workspace {
        let mut persisted = ink("Diamine", "Oxblood", &["red"]);
        persisted.private_comment = r#"{"swatch2026":{"date":"2026-01-01"}}"#.into();
        let mut ws = Workspace::new(
            vec![
                persisted,
                ink("Sailor", "Yama-dori", &["teal", "blue"]),
                ink("Pilot", "Kon-peki", &["blue"]),
                ink("Robert Oster", "Fire & Ice", &["blue-black"]),
            ],
            2026,
        );
        ws.move_assignment(None, Some("2026-01-02"), Some(1));
        ws
    }

    #[test]
    fn list_items_flags_assigned() {
        let mut turn = workspace().begin_turn();
        let out = ListItemsTool::new().call(&mut turn, Value::Null);
        assert!(out.success);
        assert_eq!(out.get("total_items"), Some(&json!(4)));
        let items = out.get("items").unwrap().as_array().unwrap();
        assert_eq!(items[0]["already_assigned"], true);
        assert_eq!(items[1]["already_assigned"], true);
        assert_eq!(items[2]["already_assigned"], false);
    }

    #[test]
    fn list_items_on_empty_collection_fails() {
        let mut turn = Workspace::new(Vec::new(), 2026).begin_turn();
        let out = ListItemsTool::new().call(&mut turn, Value::Null);
        assert!(!out.success);
        assert_eq!(out.reason, Some(ErrorKind::NotFound));
    }

    #[test]
    fn search_items_uses_exact_color_tag() {
        let mut turn = workspace().begin_turn();
        let out = SearchItemsTool::new().call(&mut turn, json!({"color": "blue"}));
        assert_eq!(out.get("matches_found"), Some(&json!(2)));
    }

    #[test]
    fn search_items_rejects_bad_params() {
        let mut turn = workspace().begin_turn();
        let out = SearchItemsTool::new().call(&mut turn, json!({"query": 7}));
        assert_eq!(out.reason, Some(ErrorKind::InvalidArgument));
    }

    #[test]
    fn candidates_classify_every_item() {
        let mut turn = workspace().begin_turn();
        let out = FindCandidatesTool::new().call(&mut turn, json!({"color": "blue"}));
        assert_eq!(
            out.get("collection_summary"),
            Some(&json!({
                "total_items": 4,
                "unassigned": 2,
                "session_assigned": 1,
                "persisted_immovable": 1
            }))
        );
        let candidates = out.get("candidates").unwrap().as_array().unwrap();
        let names: Vec<_> = candidates.iter().map(|c| c["name"].as_str().unwrap()).collect();
        assert_eq!(names, vec!["Yama-dori", "Kon-peki", "Fire & Ice"]);
        assert_eq!(candidates[0]["status"], "session_assigned");
        assert_eq!(candidates[0]["current_date"], "2026-01-02");
        assert_eq!(candidates[1]["status"], "unassigned");
    }

    #[test]
    fn candidates_can_exclude_session_items_and_limit() {
        let mut turn = workspace().begin_turn();
        let out = FindCandidatesTool::new().call(
            &mut turn,
            json!({"include_session_assigned": false, "limit": 1}),
        );
        let candidates = out.get("candidates").unwrap().as_array().unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0]["name"], "Kon-peki");
        assert_eq!(out.get("collection_summary").unwrap()["unassigned"], 2);
    }

    #[test]
    fn candidate_query_searches_private_comment() {
        let mut ws = workspace();
        let mut items = ws.items().to_vec();
        items[2].private_comment = "lovely shimmer".into();
        ws.set_items(items);
        let mut turn = ws.begin_turn();
        let out = FindCandidatesTool::new().call(&mut turn, json!({"query": "SHIMMER"}));
        assert_eq!(out.get("matches_returned"), Some(&json!(1)));
    }
}
