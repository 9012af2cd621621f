//! Session file: the saved form of the session layer and its themes.
//!
//! Current format:
//!
//! ```json
//! {
//!   "assignments": { "2026-02-01": 18 },
//!   "themes": { "2026-02": { "theme": "Blues", "description": "Cool tones" } }
//! }
//! ```
//!
//! Older files are a flat `{ date: index }` map; they load as assignments
//! with no themes. Files are always written in the current format.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

use crate::model::{Assignments, ItemIndex, parse_date};
use crate::theme::ThemeStore;

#[derive(Debug, Error)]
pub enum SessionFileError {
    #[error("failed to read session file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write session file {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid session JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("session file must be a JSON object")]
    NotAnObject,
}

/// The persisted form of a session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionFile {
    #[serde(default)]
    pub assignments: Assignments,
    #[serde(default)]
    pub themes: ThemeStore,
}

impl SessionFile {
    pub fn new(assignments: Assignments, themes: ThemeStore) -> Self {
        Self {
            assignments,
            themes,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty() && self.themes.is_empty()
    }

    /// Parse either format.
    ///
    /// In the legacy flat form, entries whose key is not a canonical date or
    /// whose value is not an index are skipped with a warning.
    pub fn from_json(text: &str) -> Result<Self, SessionFileError> {
        let value: Value = serde_json::from_str(text)?;
        let Value::Object(map) = value else {
            return Err(SessionFileError::NotAnObject);
        };

        if map.contains_key("assignments") {
            return Ok(serde_json::from_value(Value::Object(map))?);
        }

        let mut assignments = BTreeMap::new();
        for (key, value) in map {
            let date = parse_date(&key);
            let index = value.as_u64().map(|i| i as ItemIndex);
            match (date, index) {
                (Some(date), Some(index)) => {
                    assignments.insert(date, index);
                }
                _ => warn!(key, %value, "skipping malformed legacy session entry"),
            }
        }
        Ok(Self::new(assignments, ThemeStore::new()))
    }

    pub fn to_json(&self) -> Result<String, SessionFileError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn load(path: &Path) -> Result<Self, SessionFileError> {
        let text = std::fs::read_to_string(path).map_err(|source| SessionFileError::Read {
            path: path.to_owned(),
            source,
        })?;
        let session = Self::from_json(&text)?;
        info!(
            path = %path.display(),
            assignments = session.assignments.len(),
            themes = session.themes.len(),
            "session loaded"
        );
        Ok(session)
    }

    /// Load `path`, or an empty session if the file does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, SessionFileError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load(path)
    }

    pub fn save(&self, path: &Path) -> Result<(), SessionFileError> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).map_err(|source| SessionFileError::Write {
                path: path.to_owned(),
                source,
            })?;
        }
        std::fs::write(path, self.to_json()?).map_err(|source| SessionFileError::Write {
            path: path.to_owned(),
            source,
        })?;
        info!(path = %path.display(), assignments = self.assignments.len(), "session saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MonthKey;

    #[test]
    fn parses_current_format() {
        let text = r#"{
            "assignments": {"2026-02-01": 18, "2026-02-02": 3},
            "themes": {"2026-02": {"theme": "Blues", "description": "Cool"}}
        }"#;
        let s = SessionFile::from_json(text).unwrap();
        assert_eq!(s.assignments.len(), 2);
        assert_eq!(s.assignments[&parse_date("2026-02-01").unwrap()], 18);
        let key = MonthKey::new(2026, 2).unwrap();
        assert_eq!(s.themes.get(key).unwrap().theme, "Blues");
    }

    #[test]
    fn parses_current_format_without_themes() {
        let s = SessionFile::from_json(r#"{"assignments": {}}"#).unwrap();
        assert!(s.is_empty());
    }

    #[test]
    fn parses_legacy_flat_format() {
        let s = SessionFile::from_json(r#"{"2026-01-01": 0, "2026-01-02": 5}"#).unwrap();
        assert_eq!(s.assignments.len(), 2);
        assert!(s.themes.is_empty());
    }

    #[test]
    fn legacy_format_skips_malformed_entries() {
        let s = SessionFile::from_json(r#"{"2026-01-01": 0, "junk": 1, "2026-01-03": "x"}"#).unwrap();
        assert_eq!(s.assignments.len(), 1);
    }

    #[test]
    fn rejects_non_object_and_bad_json() {
        assert!(matches!(SessionFile::from_json("[]"), Err(SessionFileError::NotAnObject)));
        assert!(matches!(SessionFile::from_json("{"), Err(SessionFileError::Json(_))));
    }

    #[test]
    fn file_roundtrip_uses_current_format() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("nested").join("session.json");

        let mut themes = ThemeStore::new();
        themes.set(MonthKey::new(2026, 3).unwrap(), "Spring", "Pastels ✿").unwrap();
        let original = SessionFile::new(
            Assignments::from([(parse_date("2026-03-01").unwrap(), 7)]),
            themes,
        );
        original.save(&path).unwrap();

        let raw: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["assignments"]["2026-03-01"], 7);
        assert_eq!(raw["themes"]["2026-03"]["description"], "Pastels ✿");

        assert_eq!(SessionFile::load(&path).unwrap(), original);
    }

    #[test]
    fn load_or_default_for_missing_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let s = SessionFile::load_or_default(&tmp.path().join("absent.json")).unwrap();
        assert!(s.is_empty());
    }
}
