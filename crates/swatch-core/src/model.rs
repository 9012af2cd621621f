//! Core domain types shared by every layer: items, assignment layers,
//! month keys and date validation.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// Position of an item in the collection list.
pub type ItemIndex = usize;

/// A date → item binding layer (persisted, session, or a merged view).
///
/// Keys are calendar dates; `BTreeMap` keeps iteration chronological.
pub type Assignments = BTreeMap<NaiveDate, ItemIndex>;

/// The canonical on-the-wire date format.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

// ---------------------------------------------------------------------------
// Dates
// ---------------------------------------------------------------------------

/// Parse a canonical `YYYY-MM-DD` date.
///
/// Rejects anything chrono would accept loosely (single-digit month or day,
/// signed or five-digit years) by re-formatting and comparing.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let date = NaiveDate::parse_from_str(s, DATE_FORMAT).ok()?;
    (date.format(DATE_FORMAT).to_string() == s).then_some(date)
}

/// Format a date as `YYYY-MM-DD`.
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

// ---------------------------------------------------------------------------
// Month keys
// ---------------------------------------------------------------------------

/// A `YYYY-MM` month key, used for theme maps and month queries.
///
/// Only months whose first day chrono can represent are constructible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey {
    first: NaiveDate,
}

impl MonthKey {
    /// Build a key, returning `None` unless `month` is within 1..=12 and
    /// `year` is a representable calendar year.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(|first| Self { first })
    }

    /// The month containing `date`.
    pub fn of(date: NaiveDate) -> Self {
        Self {
            first: date.with_day(1).unwrap_or(date),
        }
    }

    pub fn year(&self) -> i32 {
        self.first.year()
    }

    pub fn month(&self) -> u32 {
        self.first.month()
    }

    /// Whether `date` falls inside this month.
    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year() && date.month() == self.month()
    }

    /// The first day of the month.
    pub fn first_day(&self) -> NaiveDate {
        self.first
    }

    /// English month name (`"January"` .. `"December"`).
    pub fn month_name(&self) -> &'static str {
        const NAMES: [&str; 12] = [
            "January",
            "February",
            "March",
            "April",
            "May",
            "June",
            "July",
            "August",
            "September",
            "October",
            "November",
            "December",
        ];
        NAMES[self.first.month0() as usize]
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month())
    }
}

impl FromStr for MonthKey {
    type Err = MonthKeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || MonthKeyParseError(s.to_owned());
        let (y, m) = s.split_once('-').ok_or_else(err)?;
        if y.len() != 4 || m.len() != 2 {
            return Err(err());
        }
        let year = y.parse::<i32>().map_err(|_| err())?;
        let month = m.parse::<u32>().map_err(|_| err())?;
        Self::new(year, month).ok_or_else(err)
    }
}

/// Error returned when parsing an invalid [`MonthKey`] string.
#[derive(Debug, Clone, thiserror::Error)]
#[error("invalid month key: {0:?} (expected YYYY-MM)")]
pub struct MonthKeyParseError(pub String);

impl Serialize for MonthKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MonthKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Items
// ---------------------------------------------------------------------------

/// One ink in the collection.
///
/// Field names follow the remote collection's JSON. Anything this crate does
/// not model is kept in `extra` so a load/save cycle is lossless.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Item {
    #[serde(rename = "brand_name", default)]
    pub brand: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub color: String,
    #[serde(rename = "cluster_tags", default)]
    pub tags: Vec<String>,
    /// Public free-text comment.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub comment: String,
    /// Private comment; carries the embedded swatch metadata.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub private_comment: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Item {
    pub fn new(brand: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            brand: brand.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    /// `"<brand> <name>"`, the form users usually type.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.brand, self.name)
    }

    /// Brand for display, `"Unknown"` when blank.
    pub fn display_brand(&self) -> &str {
        if self.brand.is_empty() { "Unknown" } else { &self.brand }
    }

    /// Name for display, `"Unknown"` when blank.
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() { "Unknown" } else { &self.name }
    }
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Compact reference to an item, embedded in results and tool output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRef {
    pub index: ItemIndex,
    pub brand: String,
    pub name: String,
}

impl ItemRef {
    /// Resolve `index` against `items`, or `None` if out of range.
    pub fn lookup(items: &[Item], index: ItemIndex) -> Option<Self> {
        items.get(index).map(|item| Self {
            index,
            brand: item.display_brand().to_owned(),
            name: item.display_name().to_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_date_accepts_canonical() {
        let d = parse_date("2026-03-01").unwrap();
        assert_eq!(format_date(d), "2026-03-01");
    }

    #[test]
    fn parse_date_rejects_loose_forms() {
        assert!(parse_date("2026-3-1").is_none());
        assert!(parse_date("2026/03/01").is_none());
        assert!(parse_date("2026-02-30").is_none());
        assert!(parse_date("").is_none());
        assert!(parse_date("+2026-03-01").is_none());
    }

    #[test]
    fn month_key_roundtrip() {
        let key: MonthKey = "2026-02".parse().unwrap();
        assert_eq!(key.year(), 2026);
        assert_eq!(key.month(), 2);
        assert_eq!(key.to_string(), "2026-02");
        assert_eq!(key.month_name(), "February");
    }

    #[test]
    fn month_key_rejects_bad_input() {
        assert!("2026-13".parse::<MonthKey>().is_err());
        assert!("2026-2".parse::<MonthKey>().is_err());
        assert!("nope".parse::<MonthKey>().is_err());
        assert!(MonthKey::new(2026, 0).is_none());
        assert!(MonthKey::new(300_000, 3).is_none());
        assert!(MonthKey::new(i32::MIN, 1).is_none());
    }

    #[test]
    fn month_key_of_date_and_first_day() {
        let key = MonthKey::of(parse_date("2024-02-29").unwrap());
        assert_eq!(key, MonthKey::new(2024, 2).unwrap());
        assert_eq!(format_date(key.first_day()), "2024-02-01");
    }

    #[test]
    fn month_key_contains() {
        let key = MonthKey::new(2026, 1).unwrap();
        assert!(key.contains(parse_date("2026-01-31").unwrap()));
        assert!(!key.contains(parse_date("2026-02-01").unwrap()));
        assert!(!key.contains(parse_date("2025-01-15").unwrap()));
    }

    #[test]
    fn item_deserializes_remote_shape_and_keeps_extras() {
        let json = r##"{
            "brand_name": "Diamine",
            "name": "Blue Velvet",
            "color": "#1d2f6f",
            "cluster_tags": ["blue"],
            "private_comment": null,
            "kind": "bottle"
        }"##;
        let item: Item = serde_json::from_str(json).unwrap();
        assert_eq!(item.brand, "Diamine");
        assert_eq!(item.tags, vec!["blue"]);
        assert_eq!(item.private_comment, "");
        assert_eq!(item.extra.get("kind"), Some(&Value::from("bottle")));

        let back = serde_json::to_value(&item).unwrap();
        assert_eq!(back["kind"], "bottle");
        assert_eq!(back["brand_name"], "Diamine");
    }

    #[test]
    fn item_ref_lookup_out_of_range() {
        let items = vec![Item::new("", "")];
        let r = ItemRef::lookup(&items, 0).unwrap();
        assert_eq!(r.brand, "Unknown");
        assert!(ItemRef::lookup(&items, 1).is_none());
    }
}
