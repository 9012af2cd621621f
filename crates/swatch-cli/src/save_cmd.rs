//! `swatch save`: persist session bindings into the collection.
//!
//! Each saved date writes a dated record (plus the month's session theme)
//! into the item's private comment. The binding then becomes protected and
//! leaves the session.

use anyhow::{Result, bail};
use serde::Serialize;
use tracing::info;

use swatch_core::model::format_date;
use swatch_core::workspace::SavePlan;

use crate::app::App;
use crate::output;

#[derive(Debug, Serialize)]
struct SavedDate {
    date: String,
    item_index: usize,
    /// Date of the record this save replaced, if the item had one.
    #[serde(skip_serializing_if = "Option::is_none")]
    replaced_date: Option<String>,
}

pub fn run_save(app: &mut App, dates: &[String], all: bool, dry_run: bool, json: bool) -> Result<()> {
    let dates: Vec<String> = if all {
        app.workspace.session().keys().map(|d| format_date(*d)).collect()
    } else {
        dates.to_vec()
    };
    if dates.is_empty() {
        bail!("nothing to save: give one or more dates, or --all");
    }

    // Plan everything first so a bad date leaves both files untouched.
    let plans = dates
        .iter()
        .map(|date| app.workspace.prepare_save(date))
        .collect::<Result<Vec<SavePlan>, _>>()?;

    let saved: Vec<SavedDate> = plans
        .iter()
        .map(|plan| SavedDate {
            date: format_date(plan.date),
            item_index: plan.index,
            replaced_date: plan.overwrites.as_ref().map(|r| r.date.clone()),
        })
        .collect();

    if !dry_run {
        for plan in plans {
            app.workspace
                .confirm_saved(plan.index, plan.comment, plan.date)?;
        }
        app.save_collection()?;
        app.save_session()?;
        info!(count = saved.len(), "session bindings saved to collection");
    }

    if json {
        return output::print_json(&serde_json::json!({
            "success": true,
            "dry_run": dry_run,
            "saved": saved,
        }));
    }

    let verb = if dry_run { "Would save" } else { "Saved" };
    for entry in &saved {
        let name = app
            .workspace
            .items()
            .get(entry.item_index)
            .map(|i| i.full_name())
            .unwrap_or_default();
        match &entry.replaced_date {
            Some(old) => println!("{verb} {} -> {name} (replaces {old})", entry.date),
            None => println!("{verb} {} -> {name}", entry.date),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SwatchConfig;
    use swatch_core::codec;
    use swatch_test_utils::TempFiles;

    fn open(files: &TempFiles) -> App {
        App::open(SwatchConfig {
            collection_path: files.collection.clone(),
            session_path: files.session.clone(),
            year: 2026,
        })
        .unwrap()
    }

    #[test]
    fn save_writes_comment_and_drops_session_entry() {
        let files = TempFiles::sample();
        let mut app = open(&files);
        app.workspace.move_assignment(None, Some("2026-03-01"), Some(2));
        app.workspace.set_theme(swatch_core::MonthKey::new(2026, 3).unwrap(), "Spring", "").unwrap();

        run_save(&mut app, &["2026-03-01".into()], false, false, true).unwrap();

        let items = files.read_collection();
        let record = codec::get_swatch(&items[2].private_comment, 2026).unwrap();
        assert_eq!(record.date, "2026-03-01");
        assert_eq!(record.theme.as_deref(), Some("Spring"));

        let session = files.read_session_json();
        assert!(session["assignments"].as_object().unwrap().is_empty());

        let reopened = open(&files);
        assert_eq!(reopened.workspace.persisted().len(), 3);
    }

    #[test]
    fn dry_run_touches_nothing() {
        let files = TempFiles::sample();
        let before = std::fs::read_to_string(&files.collection).unwrap();
        let mut app = open(&files);
        app.workspace.move_assignment(None, Some("2026-03-01"), Some(2));

        run_save(&mut app, &[], true, true, false).unwrap();

        assert_eq!(std::fs::read_to_string(&files.collection).unwrap(), before);
        assert!(!files.session.exists());
        assert_eq!(app.workspace.session().len(), 1);
    }

    #[test]
    fn unknown_date_aborts_before_writing() {
        let files = TempFiles::sample();
        let mut app = open(&files);
        app.workspace.move_assignment(None, Some("2026-03-01"), Some(2));

        let err = run_save(
            &mut app,
            &["2026-03-01".into(), "2026-03-02".into()],
            false,
            false,
            true,
        )
        .unwrap_err();
        assert!(err.to_string().contains("2026-03-02"));
        assert_eq!(app.workspace.session().len(), 1);
        assert!(!files.session.exists());
    }

    #[test]
    fn nothing_to_save_is_an_error() {
        let files = TempFiles::sample();
        let mut app = open(&files);
        assert!(run_save(&mut app, &[], true, false, true).is_err());
    }
}
