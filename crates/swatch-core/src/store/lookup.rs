//! Free-text item lookup and filtered search.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::model::{Assignments, Item, ItemIndex};

/// Standard view of an item as exposed to tools and the CLI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemInfo {
    pub index: ItemIndex,
    pub brand: String,
    pub name: String,
    pub color: String,
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub comment: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    pub already_assigned: bool,
}

impl ItemInfo {
    pub fn new(index: ItemIndex, item: &Item, already_assigned: bool) -> Self {
        let extra_str = |key: &str| {
            item.extra
                .get(key)
                .and_then(|v| v.as_str())
                .filter(|s| !s.is_empty())
                .map(str::to_owned)
        };
        Self {
            index,
            brand: item.display_brand().to_owned(),
            name: item.display_name().to_owned(),
            color: item.color.clone(),
            tags: item.tags.clone(),
            comment: item.comment.clone(),
            line_name: extra_str("line_name"),
            kind: extra_str("kind"),
            already_assigned,
        }
    }
}

/// Optional, ANDed search criteria. All matching is case-insensitive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchFilter {
    /// Substring of `"<brand> <name>"`.
    #[serde(default)]
    pub query: Option<String>,
    /// Exact tag match.
    #[serde(default)]
    pub color: Option<String>,
    /// Substring of the brand.
    #[serde(default)]
    pub brand: Option<String>,
}

impl SearchFilter {
    fn matches(&self, item: &Item) -> bool {
        if let Some(query) = non_blank(&self.query) {
            if !item.full_name().to_lowercase().contains(&query) {
                return false;
            }
        }
        if let Some(color) = non_blank(&self.color) {
            if !item.tags.iter().any(|t| t.to_lowercase() == color) {
                return false;
            }
        }
        if let Some(brand) = non_blank(&self.brand) {
            if !item.brand.to_lowercase().contains(&brand) {
                return false;
            }
        }
        true
    }
}

fn non_blank(s: &Option<String>) -> Option<String> {
    s.as_deref()
        .filter(|v| !v.is_empty())
        .map(str::to_lowercase)
}

/// Resolve free text to a single item.
///
/// 1. Exact, case-insensitive match on the name or on `"<brand> <name>"`;
///    first in list order wins.
/// 2. Otherwise substring match on either; a single hit wins, several hits
///    resolve to the shortest name (earliest on ties).
pub fn find_by_name<'a>(query: &str, items: &'a [Item]) -> Option<(ItemIndex, &'a Item)> {
    let needle = query.to_lowercase();

    let lowered = |item: &Item| {
        let name = item.name.to_lowercase();
        let full = format!("{} {}", item.brand.to_lowercase(), name);
        (name, full)
    };

    let exact = items.iter().enumerate().find(|(_, item)| {
        let (name, full) = lowered(item);
        needle == name || needle == full
    });
    if exact.is_some() {
        return exact;
    }

    items
        .iter()
        .enumerate()
        .filter(|(_, item)| {
            let (name, full) = lowered(item);
            name.contains(&needle) || full.contains(&needle)
        })
        .min_by_key(|(index, item)| (item.name.chars().count(), *index))
}

/// Items matching `filter`, annotated with whether the merged view already
/// binds them.
pub fn search(items: &[Item], merged: &Assignments, filter: &SearchFilter) -> Vec<ItemInfo> {
    let bound: HashSet<ItemIndex> = merged.values().copied().collect();
    items
        .iter()
        .enumerate()
        .filter(|(_, item)| filter.matches(item))
        .map(|(index, item)| ItemInfo::new(index, item, bound.contains(&index)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::parse_date;

    fn ink(brand: &str, name: &str, tags: &[&str]) -> Item {
        Item {
            tags: tags.iter().map(|t| t.to_string()).collect(),
            ..Item::new(brand, name)
        }
    }

    fn collection() -> Vec<Item> {
        vec![
            ink("Diamine", "Blue Velvet", &["blue"]),
            ink("Diamine", "Oxblood", &["red"]),
            ink("Pilot", "Iroshizuku Kon-peki", &["blue", "turquoise"]),
            ink("Sailor", "Blue", &["Blue"]),
        ]
    }

    #[test]
    fn exact_name_beats_substring() {
        let items = collection();
        let (idx, item) = find_by_name("blue", &items).unwrap();
        assert_eq!(idx, 3);
        assert_eq!(item.brand, "Sailor");
    }

    #[test]
    fn exact_full_name_matches() {
        let items = collection();
        let (idx, _) = find_by_name("DIAMINE OXBLOOD", &items).unwrap();
        assert_eq!(idx, 1);
    }

    #[test]
    fn single_substring_hit() {
        let items = collection();
        let (idx, _) = find_by_name("kon-peki", &items).unwrap();
        assert_eq!(idx, 2);
    }

    #[test]
    fn multiple_substring_hits_pick_shortest_name() {
        let items = collection();
        // "diamine" hits indices 0 and 1; "Oxblood" is shorter.
        let (idx, _) = find_by_name("diamine", &items).unwrap();
        assert_eq!(idx, 1);
    }

    #[test]
    fn shortest_name_ties_keep_list_order() {
        let items = vec![ink("X", "Aaa", &[]), ink("X", "Bbb", &[])];
        let (idx, _) = find_by_name("x", &items).unwrap();
        assert_eq!(idx, 0);
    }

    #[test]
    fn no_match_is_none() {
        assert!(find_by_name("nonexistent", &collection()).is_none());
    }

    #[test]
    fn search_filters_are_anded() {
        let items = collection();
        let merged = Assignments::new();

        let blue = search(&items, &merged, &SearchFilter { color: Some("BLUE".into()), ..Default::default() });
        assert_eq!(blue.iter().map(|i| i.index).collect::<Vec<_>>(), vec![0, 2, 3]);

        let diamine_blue = search(
            &items,
            &merged,
            &SearchFilter {
                color: Some("blue".into()),
                brand: Some("diam".into()),
                ..Default::default()
            },
        );
        assert_eq!(diamine_blue.len(), 1);
        assert_eq!(diamine_blue[0].name, "Blue Velvet");

        let query = search(&items, &merged, &SearchFilter { query: Some("pilot iro".into()), ..Default::default() });
        assert_eq!(query.len(), 1);
        assert_eq!(query[0].index, 2);
    }

    #[test]
    fn color_filter_is_exact_tag_match() {
        let items = collection();
        let hits = search(&items, &Assignments::new(), &SearchFilter { color: Some("turq".into()), ..Default::default() });
        assert!(hits.is_empty());
    }

    #[test]
    fn search_annotates_from_merged_view() {
        let items = collection();
        let merged = Assignments::from([(parse_date("2026-01-01").unwrap(), 2)]);
        let all = search(&items, &merged, &SearchFilter::default());
        assert_eq!(all.len(), 4);
        assert!(all[2].already_assigned);
        assert!(!all[0].already_assigned);
    }
}
