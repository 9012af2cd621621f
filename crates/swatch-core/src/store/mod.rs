//! Read side of the assignment layers.
//!
//! Derives the persisted layer from item metadata and answers the queries
//! the engine, the tool facade and the CLI share. Nothing here mutates.

pub mod calendar;
pub mod lookup;

use std::collections::HashSet;

use tracing::warn;

use crate::codec;
use crate::model::{Assignments, Item, ItemIndex, MonthKey};

pub use calendar::{DayCell, days_in_month, month_cells, month_dates};
pub use lookup::{ItemInfo, SearchFilter, find_by_name, search};

/// Derive the persisted layer for `year` from the items' embedded metadata.
///
/// Items are scanned in list order; when two items claim the same date the
/// earlier one keeps it and the later claim is dropped with a warning.
pub fn derive_protected(items: &[Item], year: i32) -> Assignments {
    let mut layer = Assignments::new();
    let mut claimed = HashSet::new();

    for (index, item) in items.iter().enumerate() {
        let Some(date) = codec::extract_date(&item.private_comment, year) else {
            continue;
        };
        if !claimed.insert(date) {
            warn!(
                %date,
                kept = layer.get(&date).copied().unwrap_or_default(),
                dropped = index,
                "duplicate persisted swatch date; keeping the earlier item"
            );
            continue;
        }
        layer.insert(date, index);
    }

    layer
}

/// Session overlaid by persisted; persisted wins on the same date.
pub fn merged_view(session: &Assignments, persisted: &Assignments) -> Assignments {
    let mut merged = session.clone();
    merged.extend(persisted.iter().map(|(d, i)| (*d, *i)));
    merged
}

/// Drop session entries that would bind a date or an item twice.
///
/// A session entry goes when its date is persisted, when its item is
/// persisted on another date, or when the same item already holds an
/// earlier session date. Each dropped entry is logged.
pub fn prune_session(session: &Assignments, persisted: &Assignments) -> Assignments {
    let mut bound: HashSet<ItemIndex> = persisted.values().copied().collect();
    let mut kept = Assignments::new();

    for (date, index) in session {
        if let Some(owner) = persisted.get(date) {
            warn!(%date, index, owner, "dropping session entry on a persisted date");
            continue;
        }
        if !bound.insert(*index) {
            warn!(%date, index, "dropping session entry for an item already bound");
            continue;
        }
        kept.insert(*date, *index);
    }

    kept
}

/// Item indices bound to any day of `year`/`month`. Order is unspecified.
pub fn summarize_month(assignments: &Assignments, year: i32, month: u32) -> Vec<ItemIndex> {
    let Some(key) = MonthKey::new(year, month) else {
        return Vec::new();
    };
    assignments
        .iter()
        .filter(|(date, _)| key.contains(**date))
        .map(|(_, index)| *index)
        .collect()
}

/// Whether the item's metadata carries a record with a date for `year`.
pub fn has_assignment(item: &Item, year: i32) -> bool {
    codec::get_swatch(&item.private_comment, year).is_some_and(|r| !r.date.is_empty())
}

/// The date `index` is bound to in `layer`, if any.
pub fn date_of(layer: &Assignments, index: ItemIndex) -> Option<chrono::NaiveDate> {
    layer
        .iter()
        .find_map(|(date, bound)| (*bound == index).then_some(*date))
}
