//! Month themes.
//!
//! Themes live in their own `YYYY-MM` map, independent of either
//! assignment layer. When a month has no session theme, the theme saved in
//! the metadata of the item persisted on day 1 stands in.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::codec;
use crate::model::{Assignments, Item, MonthKey};

/// A theme name with its longer description.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeRecord {
    pub theme: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ThemeError {
    #[error("theme name cannot be empty")]
    EmptyTheme,
}

/// Where a resolved theme came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThemeSource {
    Session,
    Persisted,
}

impl fmt::Display for ThemeSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Session => "session",
            Self::Persisted => "persisted",
        })
    }
}

/// The effective theme of a month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedTheme {
    pub theme: String,
    pub description: String,
    pub source: ThemeSource,
}

/// Session themes keyed by month.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThemeStore {
    themes: BTreeMap<MonthKey, ThemeRecord>,
}

impl ThemeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the theme for `key`, trimming both fields.
    pub fn set(
        &mut self,
        key: MonthKey,
        theme: &str,
        description: &str,
    ) -> Result<&ThemeRecord, ThemeError> {
        let theme = theme.trim();
        if theme.is_empty() {
            return Err(ThemeError::EmptyTheme);
        }
        let record = ThemeRecord {
            theme: theme.to_owned(),
            description: description.trim().to_owned(),
        };
        self.themes.insert(key, record);
        Ok(&self.themes[&key])
    }

    pub fn get(&self, key: MonthKey) -> Option<&ThemeRecord> {
        self.themes.get(&key)
    }

    /// Remove the theme for `key`, returning it if one was set.
    pub fn clear(&mut self, key: MonthKey) -> Option<ThemeRecord> {
        self.themes.remove(&key)
    }

    pub fn len(&self) -> usize {
        self.themes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.themes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&MonthKey, &ThemeRecord)> {
        self.themes.iter()
    }

    /// The effective theme for `key`.
    ///
    /// Session theme first (when its name is non-empty), then the theme
    /// embedded in the item persisted on the first day of the month.
    pub fn resolve(
        &self,
        key: MonthKey,
        items: &[Item],
        persisted: &Assignments,
    ) -> Option<ResolvedTheme> {
        if let Some(record) = self.get(key).filter(|r| !r.theme.is_empty()) {
            return Some(ResolvedTheme {
                theme: record.theme.clone(),
                description: record.description.clone(),
                source: ThemeSource::Session,
            });
        }

        let index = persisted.get(&key.first_day())?;
        let item = items.get(*index)?;
        let embedded = codec::extract_theme(&item.private_comment, key.year())?;
        Some(ResolvedTheme {
            theme: embedded.theme,
            description: embedded.description,
            source: ThemeSource::Persisted,
        })
    }
}
