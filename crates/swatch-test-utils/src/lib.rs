//! Shared fixtures for swatchbook integration tests.
//!
//! Builders for items and assignment layers, a small sample collection,
//! and a temporary directory holding collection and session files.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tempfile::TempDir;

use swatch_core::collection::Collection;
use swatch_core::model::{Assignments, Item, ItemIndex, parse_date};

/// Parse a canonical date, panicking on bad test input.
pub fn d(s: &str) -> NaiveDate {
    parse_date(s).unwrap_or_else(|| panic!("bad test date {s:?}"))
}

/// Build an assignment layer from `(date, index)` pairs.
pub fn layer(entries: &[(&str, ItemIndex)]) -> Assignments {
    entries.iter().map(|(date, index)| (d(date), *index)).collect()
}

/// An item with color tags.
pub fn ink(brand: &str, name: &str, tags: &[&str]) -> Item {
    Item {
        tags: tags.iter().map(|t| t.to_string()).collect(),
        ..Item::new(brand, name)
    }
}

/// An item whose metadata persists it on `date` (for `date`'s year).
pub fn dated_ink(brand: &str, name: &str, date: &str) -> Item {
    let year = &date[..4];
    Item {
        private_comment: format!(r#"{{"swatch{year}":{{"date":"{date}"}}}}"#),
        ..Item::new(brand, name)
    }
}

/// `n` plain items named `Ink 00`, `Ink 01`, ...
pub fn numbered_inks(n: usize) -> Vec<Item> {
    (0..n)
        .map(|i| Item::new("Brand", format!("Ink {i:02}")))
        .collect()
}

/// A small collection for 2026.
///
/// Index 0 is persisted on 2026-01-01 with a January theme, index 3 on
/// 2026-01-10; everything else is free.
pub fn sample_collection() -> Vec<Item> {
    let mut oxblood = ink("Diamine", "Oxblood", &["red", "burgundy"]);
    oxblood.private_comment =
        r#"{"note":"keep","swatch2026":{"date":"2026-01-01","theme":"Deep Reds","description":"Wine and garnet"}}"#
            .to_string();

    let mut kon_peki = dated_ink("Pilot", "Kon-peki", "2026-01-10");
    kon_peki.tags = vec!["blue".to_string()];

    vec![
        oxblood,
        ink("Sailor", "Yama-dori", &["teal", "blue"]),
        ink("Robert Oster", "Fire & Ice", &["blue-black", "shimmer"]),
        kon_peki,
        ink("Diamine", "Earl Grey", &["grey"]),
        ink("Pilot", "Tsuki-yo", &["teal"]),
        ink("Sailor", "Yama-budo", &["purple"]),
        ink("Colorverse", "Hayabusa", &["grey", "shimmer"]),
    ]
}

/// A temporary directory with a collection file and a session path.
pub struct TempFiles {
    dir: TempDir,
    pub collection: PathBuf,
    pub session: PathBuf,
}

impl TempFiles {
    /// Write `items` as a bare-array collection.
    pub fn with_items(items: Vec<Item>) -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        let collection = dir.path().join("ink_cache.json");
        let session = dir.path().join("session.json");
        Collection::new(items)
            .save(&collection)
            .expect("failed to write collection fixture");
        Self {
            dir,
            collection,
            session,
        }
    }

    /// [`sample_collection`] on disk.
    pub fn sample() -> Self {
        Self::with_items(sample_collection())
    }

    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    pub fn read_collection(&self) -> Vec<Item> {
        Collection::load(&self.collection)
            .expect("failed to read collection fixture")
            .items
    }

    pub fn read_session_json(&self) -> serde_json::Value {
        let text = std::fs::read_to_string(&self.session).expect("failed to read session file");
        serde_json::from_str(&text).expect("session file is not JSON")
    }
}
