//! Collection file: the item source.
//!
//! Accepts either a bare JSON array of items or the cache envelope written
//! by the collection fetcher:
//!
//! ```json
//! { "timestamp": "2026-01-02T10:00:00", "ink_count": 2, "inks": [ ... ] }
//! ```
//!
//! Saving preserves whichever shape was loaded, along with any envelope or
//! item fields this crate does not model.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::info;

use crate::model::Item;

#[derive(Debug, Error)]
pub enum CollectionError {
    #[error("failed to read collection file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write collection file {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("collection file {path} is not a list of items or a cache envelope: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("failed to serialize collection: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum CollectionShape {
    Envelope {
        inks: Vec<Item>,
        #[serde(flatten)]
        rest: Map<String, Value>,
    },
    Bare(Vec<Item>),
}

/// A loaded collection and the file shape it came from.
#[derive(Debug, Clone)]
pub struct Collection {
    pub items: Vec<Item>,
    /// Envelope fields other than the item list; `None` for a bare array.
    envelope: Option<Map<String, Value>>,
}

impl Collection {
    /// A bare-array collection.
    pub fn new(items: Vec<Item>) -> Self {
        Self {
            items,
            envelope: None,
        }
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        Ok(match serde_json::from_str::<CollectionShape>(text)? {
            CollectionShape::Envelope { inks, rest } => Self {
                items: inks,
                envelope: Some(rest),
            },
            CollectionShape::Bare(items) => Self::new(items),
        })
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        match &self.envelope {
            Some(rest) => {
                let mut rest = rest.clone();
                if rest.contains_key("ink_count") {
                    rest.insert("ink_count".to_owned(), Value::from(self.items.len()));
                }
                serde_json::to_string_pretty(&CollectionShape::Envelope {
                    inks: self.items.clone(),
                    rest,
                })
            }
            None => serde_json::to_string_pretty(&self.items),
        }
    }

    pub fn load(path: &Path) -> Result<Self, CollectionError> {
        let text = std::fs::read_to_string(path).map_err(|source| CollectionError::Read {
            path: path.to_owned(),
            source,
        })?;
        let collection = Self::from_json(&text).map_err(|source| CollectionError::Parse {
            path: path.to_owned(),
            source,
        })?;
        info!(path = %path.display(), items = collection.items.len(), "collection loaded");
        Ok(collection)
    }

    pub fn save(&self, path: &Path) -> Result<(), CollectionError> {
        let text = self.to_json()?;
        std::fs::write(path, text).map_err(|source| CollectionError::Write {
            path: path.to_owned(),
            source,
        })?;
        info!(path = %path.display(), items = self.items.len(), "collection saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_bare_array() {
        let c = Collection::from_json(r#"[{"brand_name":"A","name":"One"}]"#).unwrap();
        assert_eq!(c.items.len(), 1);
        assert!(c.envelope.is_none());
        assert!(c.to_json().unwrap().trim_start().starts_with('['));
    }

    #[test]
    fn loads_cache_envelope_and_keeps_metadata() {
        let text = r#"{"timestamp":"2026-01-02T10:00:00","ink_count":1,"inks":[{"brand_name":"A","name":"One"}]}"#;
        let mut c = Collection::from_json(text).unwrap();
        assert_eq!(c.items[0].name, "One");

        c.items.push(Item::new("B", "Two"));
        let back: Value = serde_json::from_str(&c.to_json().unwrap()).unwrap();
        assert_eq!(back["timestamp"], "2026-01-02T10:00:00");
        assert_eq!(back["ink_count"], 2);
        assert_eq!(back["inks"][1]["brand_name"], "B");
    }

    #[test]
    fn rejects_unrelated_json() {
        assert!(Collection::from_json(r#"{"nothing":"here"}"#).is_err());
        assert!(Collection::from_json("not json").is_err());
    }

    #[test]
    fn load_and_save_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("inks.json");
        std::fs::write(&path, r#"[{"brand_name":"A","name":"One","kind":"bottle"}]"#).unwrap();

        let mut c = Collection::load(&path).unwrap();
        c.items[0].private_comment = "{}".into();
        c.save(&path).unwrap();

        let reloaded = Collection::load(&path).unwrap();
        assert_eq!(reloaded.items[0].private_comment, "{}");
        assert_eq!(reloaded.items[0].extra["kind"], "bottle");
    }

    #[test]
    fn load_missing_file_reports_path() {
        let err = Collection::load(Path::new("/nonexistent/inks.json")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/inks.json"));
    }
}
