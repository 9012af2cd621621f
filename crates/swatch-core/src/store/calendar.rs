//! Calendar helpers and the per-day month read model.

use chrono::NaiveDate;
use serde::Serialize;

use crate::model::{Assignments, Item, ItemRef, MonthKey, format_date};

/// Number of days in `key`'s month.
pub fn days_in_month(key: MonthKey) -> u32 {
    let first = key.first_day();
    let next = if key.month() == 12 {
        NaiveDate::from_ymd_opt(key.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(key.year(), key.month() + 1, 1)
    };
    // Only December of chrono's last year has no successor month.
    next.map(|n| (n - first).num_days() as u32).unwrap_or(31)
}

/// Every date of `key`'s month, in order.
pub fn month_dates(key: MonthKey) -> Vec<NaiveDate> {
    key.first_day()
        .iter_days()
        .take(days_in_month(key) as usize)
        .collect()
}

/// One day of a month as shown to a renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayCell {
    pub date: String,
    pub day: u32,
    /// The bound item, if the merged view has one in range.
    pub item: Option<ItemRef>,
    /// Bound in the session layer only, so it may be moved or removed.
    pub editable: bool,
    /// Bound in the persisted layer.
    pub protected: bool,
}

/// Build one [`DayCell`] per day of `key`'s month.
pub fn month_cells(
    key: MonthKey,
    items: &[Item],
    session: &Assignments,
    persisted: &Assignments,
) -> Vec<DayCell> {
    month_dates(key)
        .into_iter()
        .enumerate()
        .map(|(offset, date)| {
            let bound = persisted.get(&date).or_else(|| session.get(&date));
            let item = bound.and_then(|index| ItemRef::lookup(items, *index));
            let protected = item.is_some() && persisted.contains_key(&date);
            DayCell {
                date: format_date(date),
                day: offset as u32 + 1,
                editable: item.is_some() && !protected && session.contains_key(&date),
                protected,
                item,
            }
        })
        .collect()
}
