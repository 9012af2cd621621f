//! Configuration file management for swatch.
//!
//! Provides a TOML-based config file at `~/.config/swatchbook/config.toml`
//! and a resolution chain per setting: CLI flag > env var > config file >
//! default.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Datelike;
use serde::{Deserialize, Serialize};

pub const COLLECTION_ENV: &str = "SWATCHBOOK_COLLECTION";
pub const SESSION_ENV: &str = "SWATCHBOOK_SESSION";
pub const YEAR_ENV: &str = "SWATCHBOOK_YEAR";

pub const DEFAULT_COLLECTION: &str = "ink_cache.json";
pub const DEFAULT_SESSION: &str = "session_default.json";

// -----------------------------------------------------------------------
// Config file types
// -----------------------------------------------------------------------

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub collection: CollectionSection,
    #[serde(default)]
    pub session: SessionSection,
    #[serde(default)]
    pub calendar: CalendarSection,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct CollectionSection {
    /// Collection JSON (bare item array or cache envelope).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct SessionSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct CalendarSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
}

// -----------------------------------------------------------------------
// Paths
// -----------------------------------------------------------------------

/// Return the swatchbook config directory.
///
/// Always uses XDG layout: `$XDG_CONFIG_HOME/swatchbook` or
/// `~/.config/swatchbook`, on every platform.
pub fn config_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join("swatchbook");
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("swatchbook")
}

pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

// -----------------------------------------------------------------------
// Read / write
// -----------------------------------------------------------------------

/// Load and parse the config file at `path`.
pub fn load_config_from(path: &Path) -> Result<ConfigFile> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file at {}", path.display()))?;
    toml::from_str(&contents)
        .with_context(|| format!("failed to parse config file at {}", path.display()))
}

/// Load the config file if one exists. A file that exists but does not
/// parse is an error.
pub fn load_config() -> Result<Option<ConfigFile>> {
    let path = config_path();
    if !path.exists() {
        return Ok(None);
    }
    load_config_from(&path).map(Some)
}

/// Serialize and write the config file, creating parent dirs as needed.
pub fn save_config(config: &ConfigFile) -> Result<PathBuf> {
    let path = config_path();
    let dir = config_dir();
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create config directory {}", dir.display()))?;

    let contents = toml::to_string_pretty(config).context("failed to serialize config")?;
    std::fs::write(&path, &contents)
        .with_context(|| format!("failed to write config file at {}", path.display()))?;
    Ok(path)
}

// -----------------------------------------------------------------------
// Resolved config
// -----------------------------------------------------------------------

/// Values given on the command line; each wins over every other source.
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub collection: Option<PathBuf>,
    pub session: Option<PathBuf>,
    pub year: Option<i32>,
}

/// Fully resolved configuration, ready for use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwatchConfig {
    pub collection_path: PathBuf,
    pub session_path: PathBuf,
    pub year: i32,
}

impl SwatchConfig {
    /// Resolve configuration using the chain: CLI flag > env var > config file > default.
    ///
    /// - Collection: `--collection` > `SWATCHBOOK_COLLECTION` > `[collection].path` > `ink_cache.json`
    /// - Session: `--session` > `SWATCHBOOK_SESSION` > `[session].path` > `session_default.json`
    /// - Year: `--year` > `SWATCHBOOK_YEAR` > `[calendar].year` > the current year
    pub fn resolve(cli: &CliOverrides) -> Result<Self> {
        let file = load_config()?.unwrap_or_default();
        Self::resolve_with(cli, &file)
    }

    pub fn resolve_with(cli: &CliOverrides, file: &ConfigFile) -> Result<Self> {
        let collection_path = cli
            .collection
            .clone()
            .or_else(|| env_path(COLLECTION_ENV))
            .or_else(|| file.collection.path.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_COLLECTION));

        let session_path = cli
            .session
            .clone()
            .or_else(|| env_path(SESSION_ENV))
            .or_else(|| file.session.path.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SESSION));

        let year = match cli.year {
            Some(year) => year,
            None => match std::env::var(YEAR_ENV) {
                Ok(raw) => raw
                    .trim()
                    .parse()
                    .with_context(|| format!("{YEAR_ENV} is not a valid year: {raw:?}"))?,
                Err(_) => file
                    .calendar
                    .year
                    .unwrap_or_else(|| chrono::Local::now().year()),
            },
        };

        Ok(Self {
            collection_path,
            session_path,
            year,
        })
    }
}

fn env_path(var: &str) -> Option<PathBuf> {
    std::env::var_os(var)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

// -----------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn lock_env() -> std::sync::MutexGuard<'static, ()> {
        crate::test_util::lock_env()
    }

    fn clear_env() {
        unsafe { std::env::remove_var(COLLECTION_ENV) };
        unsafe { std::env::remove_var(SESSION_ENV) };
        unsafe { std::env::remove_var(YEAR_ENV) };
    }

    fn file_with(collection: &str, session: &str, year: i32) -> ConfigFile {
        ConfigFile {
            collection: CollectionSection {
                path: Some(collection.into()),
            },
            session: SessionSection {
                path: Some(session.into()),
            },
            calendar: CalendarSection { year: Some(year) },
        }
    }

    #[test]
    fn config_file_roundtrip() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");

        let original = file_with("/data/inks.json", "/data/session.json", 2026);
        std::fs::write(&path, toml::to_string_pretty(&original).unwrap()).unwrap();

        let loaded = load_config_from(&path).unwrap();
        assert_eq!(loaded.collection.path, original.collection.path);
        assert_eq!(loaded.session.path, original.session.path);
        assert_eq!(loaded.calendar.year, Some(2026));
    }

    #[test]
    fn config_file_sections_are_optional() {
        let loaded: ConfigFile = toml::from_str("[calendar]\nyear = 2025\n").unwrap();
        assert!(loaded.collection.path.is_none());
        assert!(loaded.session.path.is_none());
        assert_eq!(loaded.calendar.year, Some(2025));
    }

    #[test]
    fn load_config_from_reports_bad_toml() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "[calendar\nyear = ").unwrap();
        let err = load_config_from(&path).unwrap_err();
        assert!(format!("{err:#}").contains("failed to parse config file"));
    }

    #[test]
    fn resolve_with_cli_flag_overrides_all() {
        let _lock = lock_env();
        unsafe { std::env::set_var(COLLECTION_ENV, "/env/inks.json") };
        unsafe { std::env::set_var(YEAR_ENV, "2030") };

        let cli = CliOverrides {
            collection: Some("/cli/inks.json".into()),
            session: None,
            year: Some(2024),
        };
        let config =
            SwatchConfig::resolve_with(&cli, &file_with("/file/inks.json", "/file/s.json", 2025))
                .unwrap();
        assert_eq!(config.collection_path, PathBuf::from("/cli/inks.json"));
        assert_eq!(config.session_path, PathBuf::from("/file/s.json"));
        assert_eq!(config.year, 2024);

        clear_env();
    }

    #[test]
    fn resolve_with_env_var_overrides_config_file() {
        let _lock = lock_env();
        unsafe { std::env::set_var(SESSION_ENV, "/env/session.json") };
        unsafe { std::env::set_var(YEAR_ENV, "2030") };

        let config = SwatchConfig::resolve_with(
            &CliOverrides::default(),
            &file_with("/file/inks.json", "/file/s.json", 2025),
        )
        .unwrap();
        assert_eq!(config.collection_path, PathBuf::from("/file/inks.json"));
        assert_eq!(config.session_path, PathBuf::from("/env/session.json"));
        assert_eq!(config.year, 2030);

        clear_env();
    }

    #[test]
    fn resolve_defaults_when_nothing_set() {
        let _lock = lock_env();
        clear_env();

        let config =
            SwatchConfig::resolve_with(&CliOverrides::default(), &ConfigFile::default()).unwrap();
        assert_eq!(config.collection_path, PathBuf::from(DEFAULT_COLLECTION));
        assert_eq!(config.session_path, PathBuf::from(DEFAULT_SESSION));
        assert_eq!(config.year, chrono::Local::now().year());
    }

    #[test]
    fn resolve_errors_on_bad_year_env() {
        let _lock = lock_env();
        clear_env();
        unsafe { std::env::set_var(YEAR_ENV, "next year") };

        let result = SwatchConfig::resolve_with(&CliOverrides::default(), &ConfigFile::default());
        clear_env();

        let msg = format!("{:#}", result.unwrap_err());
        assert!(msg.contains(YEAR_ENV), "unexpected error: {msg}");
    }

    #[test]
    fn resolve_reads_config_from_xdg_dir() {
        let _lock = lock_env();
        clear_env();

        let tmp = tempfile::TempDir::new().unwrap();
        let orig_xdg = std::env::var("XDG_CONFIG_HOME").ok();
        unsafe { std::env::set_var("XDG_CONFIG_HOME", tmp.path()) };

        let saved = save_config(&file_with("/xdg/inks.json", "/xdg/s.json", 2027));
        let result = SwatchConfig::resolve(&CliOverrides::default());

        // Restore env before asserting, to avoid poisoning the mutex on failure.
        match orig_xdg {
            Some(x) => unsafe { std::env::set_var("XDG_CONFIG_HOME", x) },
            None => unsafe { std::env::remove_var("XDG_CONFIG_HOME") },
        }

        let saved = saved.unwrap();
        assert!(saved.starts_with(tmp.path()));
        let config = result.unwrap();
        assert_eq!(config.collection_path, PathBuf::from("/xdg/inks.json"));
        assert_eq!(config.year, 2027);
    }

    #[test]
    fn config_path_ends_with_expected_filename() {
        let path = config_path();
        assert!(
            path.ends_with("swatchbook/config.toml"),
            "unexpected config path: {}",
            path.display()
        );
    }
}
