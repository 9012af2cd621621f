//! Swatch metadata embedded in an item's private comment.
//!
//! The comment holds a JSON object. Each year owns one reserved key,
//! `swatch<year>`, whose value is either a [`SwatchRecord`] object or, in
//! older data, a bare `YYYY-MM-DD` string. Every other key belongs to
//! someone else and is carried through writes untouched and in order.
//!
//! Malformed comments are treated as empty objects; nothing here fails.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::model::parse_date;

/// The per-year record stored under `swatch<year>`.
///
/// Writes use `description`; older records may carry `theme_description`
/// instead, or both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawRecord")]
pub struct SwatchRecord {
    /// `YYYY-MM-DD`. Kept as text: stored data is not guaranteed valid.
    pub date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Read shape of a [`SwatchRecord`], with both description keys.
#[derive(Deserialize)]
struct RawRecord {
    #[serde(default)]
    date: String,
    #[serde(default)]
    theme: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    theme_description: Option<String>,
}

impl From<RawRecord> for SwatchRecord {
    fn from(raw: RawRecord) -> Self {
        // A non-empty `description` wins over the legacy key.
        let description = match raw.description {
            Some(d) if !d.is_empty() => Some(d),
            other => raw.theme_description.or(other),
        };
        Self {
            date: raw.date,
            theme: raw.theme,
            description,
        }
    }
}

/// Theme text carried by a [`SwatchRecord`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbeddedTheme {
    pub theme: String,
    pub description: String,
}

/// The reserved key for `year`.
pub fn swatch_key(year: i32) -> String {
    format!("swatch{year}")
}

/// Parse a comment as a JSON object.
///
/// Empty text, invalid JSON and non-object JSON all yield an empty map.
pub fn parse(text: &str) -> Map<String, Value> {
    if text.trim().is_empty() {
        return Map::new();
    }
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    }
}

/// The object-form record for `year`, if present.
///
/// A legacy bare-string value is not a record and yields `None`; use
/// [`extract_date`] to read dates from either form.
pub fn get_swatch(text: &str, year: i32) -> Option<SwatchRecord> {
    let data = parse(text);
    match data.get(&swatch_key(year))? {
        value @ Value::Object(_) => serde_json::from_value(value.clone()).ok(),
        _ => None,
    }
}

/// The assigned date for `year`, in either the legacy or current form.
///
/// Dates that are malformed or belong to a different year are ignored.
pub fn extract_date(text: &str, year: i32) -> Option<NaiveDate> {
    let data = parse(text);
    let raw = match data.get(&swatch_key(year))? {
        Value::String(s) => s.as_str(),
        Value::Object(obj) => obj.get("date")?.as_str()?,
        _ => return None,
    };
    parse_date(raw).filter(|d| d.year() == year)
}

/// Theme text for `year`, present only when theme or description is
/// non-empty.
pub fn extract_theme(text: &str, year: i32) -> Option<EmbeddedTheme> {
    let record = get_swatch(text, year)?;
    let theme = record.theme.unwrap_or_default();
    let description = record.description.unwrap_or_default();
    if theme.is_empty() && description.is_empty() {
        return None;
    }
    Some(EmbeddedTheme { theme, description })
}

/// The record a save for `year` would overwrite, if it carries a date.
pub fn existing_record(text: &str, year: i32) -> Option<SwatchRecord> {
    get_swatch(text, year).filter(|r| !r.date.is_empty())
}

/// Write the record for `year` into `existing`, returning the new comment.
///
/// Empty theme or description values are omitted from the record.
pub fn build(
    existing: &str,
    year: i32,
    date: &str,
    theme: Option<&str>,
    description: Option<&str>,
) -> String {
    let mut data = parse(existing);
    let record = SwatchRecord {
        date: date.to_owned(),
        theme: non_empty(theme),
        description: non_empty(description),
    };
    // Serializing a struct of strings cannot fail.
    let value = serde_json::to_value(&record).unwrap_or(Value::Null);
    data.insert(swatch_key(year), value);
    Value::Object(data).to_string()
}

/// Drop the record for `year`, returning the new comment (`"{}"` when
/// nothing else remains).
pub fn remove(existing: &str, year: i32) -> String {
    let mut data = parse(existing);
    data.shift_remove(&swatch_key(year));
    if data.is_empty() {
        "{}".to_owned()
    } else {
        Value::Object(data).to_string()
    }
}

fn non_empty(s: Option<&str>) -> Option<String> {
    s.filter(|v| !v.is_empty()).map(str::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_tolerates_garbage() {
        assert!(parse("").is_empty());
        assert!(parse("   ").is_empty());
        assert!(parse("not json").is_empty());
        assert!(parse("[1,2,3]").is_empty());
        assert!(parse("\"swatch2026\"").is_empty());
        assert_eq!(parse(r#"{"a":1}"#).len(), 1);
    }

    #[test]
    fn build_from_empty_matches_expected_shape() {
        let text = build("", 2026, "2026-03-01", Some("Spring"), Some(""));
        assert_eq!(text, r#"{"swatch2026":{"date":"2026-03-01","theme":"Spring"}}"#);
    }

    #[test]
    fn build_preserves_other_keys_and_years() {
        let existing = r#"{"note":"keep me","swatch2025":{"date":"2025-07-04"},"swatch2026":"2026-01-01"}"#;
        let text = build(existing, 2026, "2026-02-02", None, Some("Cool tones"));
        let value: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["note"], "keep me");
        assert_eq!(value["swatch2025"], json!({"date": "2025-07-04"}));
        assert_eq!(
            value["swatch2026"],
            json!({"date": "2026-02-02", "description": "Cool tones"})
        );
        // Key order is preserved.
        let keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["note", "swatch2025", "swatch2026"]);
    }

    #[test]
    fn extract_date_reads_both_forms() {
        let legacy = r#"{"swatch2026":"2026-04-10"}"#;
        let current = r#"{"swatch2026":{"date":"2026-04-11"}}"#;
        assert_eq!(extract_date(legacy, 2026), parse_date("2026-04-10"));
        assert_eq!(extract_date(current, 2026), parse_date("2026-04-11"));
    }

    #[test]
    fn extract_date_rejects_wrong_year_and_bad_dates() {
        assert_eq!(extract_date(r#"{"swatch2026":{"date":"2025-04-11"}}"#, 2026), None);
        assert_eq!(extract_date(r#"{"swatch2026":{"date":"2026-13-01"}}"#, 2026), None);
        assert_eq!(extract_date(r#"{"swatch2026":{"theme":"x"}}"#, 2026), None);
        assert_eq!(extract_date(r#"{"swatch2026":42}"#, 2026), None);
        assert_eq!(extract_date("garbage", 2026), None);
    }

    #[test]
    fn get_swatch_ignores_legacy_strings() {
        assert_eq!(get_swatch(r#"{"swatch2026":"2026-04-10"}"#, 2026), None);
        let record = get_swatch(r#"{"swatch2026":{"date":"2026-04-10","theme":"T"}}"#, 2026).unwrap();
        assert_eq!(record.theme.as_deref(), Some("T"));
    }

    #[test]
    fn extract_theme_requires_some_text() {
        assert_eq!(extract_theme(r#"{"swatch2026":{"date":"2026-01-01"}}"#, 2026), None);
        assert_eq!(
            extract_theme(r#"{"swatch2026":{"date":"2026-01-01","theme":"","description":""}}"#, 2026),
            None
        );
        let t = extract_theme(r#"{"swatch2026":{"date":"2026-01-01","description":"d"}}"#, 2026).unwrap();
        assert_eq!(t, EmbeddedTheme { theme: String::new(), description: "d".into() });
    }

    #[test]
    fn extract_theme_accepts_long_description_key() {
        let text = r#"{"swatch2026":{"date":"2026-01-01","theme":"Blues","theme_description":"Cool"}}"#;
        let t = extract_theme(text, 2026).unwrap();
        assert_eq!(t.theme, "Blues");
        assert_eq!(t.description, "Cool");
    }

    #[test]
    fn record_with_both_description_keys_still_reads() {
        let text = r#"{"swatch2026":{"date":"2026-02-01","theme":"Blues","description":"Cool","theme_description":"Old"}}"#;
        let t = extract_theme(text, 2026).unwrap();
        assert_eq!(t.theme, "Blues");
        assert_eq!(t.description, "Cool");

        let r = existing_record(text, 2026).unwrap();
        assert_eq!(r.date, "2026-02-01");
        assert_eq!(r.description.as_deref(), Some("Cool"));

        let legacy_only = r#"{"swatch2026":{"date":"2026-02-01","description":"","theme_description":"Old"}}"#;
        let r = get_swatch(legacy_only, 2026).unwrap();
        assert_eq!(r.description.as_deref(), Some("Old"));
    }

    #[test]
    fn rebuilt_record_writes_only_description() {
        let existing = r#"{"swatch2026":{"date":"2026-02-01","theme_description":"Old"}}"#;
        let old = existing_record(existing, 2026).unwrap();
        let text = build(existing, 2026, "2026-02-03", old.theme.as_deref(), old.description.as_deref());
        assert_eq!(text, r#"{"swatch2026":{"date":"2026-02-03","description":"Old"}}"#);
    }

    #[test]
    fn round_trip_date_and_theme() {
        let text = build("", 2027, "2027-12-31", Some("Holiday"), Some("Reds and greens"));
        assert_eq!(extract_date(&text, 2027), parse_date("2027-12-31"));
        let theme = extract_theme(&text, 2027).unwrap();
        assert_eq!(theme.theme, "Holiday");
        assert_eq!(theme.description, "Reds and greens");
    }

    #[test]
    fn remove_keeps_other_data() {
        let existing = r#"{"swatch2025":{"date":"2025-01-01"},"swatch2026":{"date":"2026-01-01"}}"#;
        let text = remove(existing, 2026);
        assert_eq!(text, r#"{"swatch2025":{"date":"2025-01-01"}}"#);
    }

    #[test]
    fn remove_last_key_yields_empty_object() {
        assert_eq!(remove(r#"{"swatch2026":{"date":"2026-01-01"}}"#, 2026), "{}");
        assert_eq!(remove("", 2026), "{}");
        assert_eq!(remove("not json", 2026), "{}");
    }

    #[test]
    fn existing_record_requires_date() {
        assert!(existing_record(r#"{"swatch2026":{"theme":"x"}}"#, 2026).is_none());
        let r = existing_record(r#"{"swatch2026":{"date":"2026-05-05"}}"#, 2026).unwrap();
        assert_eq!(r.date, "2026-05-05");
    }
}
