//! Integration tests for the workspace: file round trips and the save flow.

use swatch_core::codec;
use swatch_core::collection::Collection;
use swatch_core::model::MonthKey;
use swatch_core::session_file::SessionFile;
use swatch_core::workspace::Workspace;
use swatch_test_utils::{TempFiles, d, sample_collection};

fn open(files: &TempFiles) -> Workspace {
    let items = Collection::load(&files.collection).unwrap().items;
    let session = SessionFile::load_or_default(&files.session).unwrap();
    Workspace::new(items, 2026).with_session(session)
}

#[test]
fn session_survives_save_and_reload() {
    let files = TempFiles::with_items(sample_collection());

    let mut ws = open(&files);
    assert!(ws.move_assignment(None, Some("2026-02-01"), Some(1)).success);
    ws.set_theme(MonthKey::new(2026, 2).unwrap(), "Teals", "Sea and sky")
        .unwrap();
    ws.session_file().save(&files.session).unwrap();

    let raw = files.read_session_json();
    assert_eq!(raw["assignments"]["2026-02-01"], 1);
    assert_eq!(raw["themes"]["2026-02"]["theme"], "Teals");

    let reopened = open(&files);
    assert_eq!(reopened.session(), ws.session());
    assert_eq!(reopened.themes(), ws.themes());
}

#[test]
fn legacy_session_file_loads_as_assignments() {
    let files = TempFiles::with_items(sample_collection());
    std::fs::write(&files.session, r#"{"2026-04-01": 2, "2026-04-02": 5}"#).unwrap();

    let ws = open(&files);
    assert_eq!(ws.session().len(), 2);
    assert!(ws.themes().is_empty());
}

#[test]
fn saving_a_binding_persists_it_with_the_month_theme() {
    let files = TempFiles::with_items(sample_collection());
    let mut ws = open(&files);
    ws.move_assignment(None, Some("2026-02-01"), Some(2));
    ws.set_theme(MonthKey::new(2026, 2).unwrap(), "Cold", "").unwrap();

    let plan = ws.prepare_save("2026-02-01").unwrap();
    assert_eq!(plan.index, 2);
    ws.confirm_saved(plan.index, plan.comment.clone(), plan.date)
        .unwrap();

    assert!(ws.session().is_empty());
    assert_eq!(ws.persisted().get(&d("2026-02-01")), Some(&2));
    assert_eq!(
        codec::extract_theme(&ws.items()[2].private_comment, 2026).unwrap().theme,
        "Cold"
    );

    // The saved binding is now protected.
    let refused = ws.move_assignment(Some("2026-02-01"), None, None);
    assert!(!refused.success);

    Collection::new(ws.items().to_vec())
        .save(&files.collection)
        .unwrap();
    let reloaded = Workspace::new(files.read_collection(), 2026);
    assert_eq!(reloaded.persisted(), ws.persisted());
}

#[test]
fn saving_over_an_existing_record_reports_it() {
    let files = TempFiles::with_items(sample_collection());
    let mut ws = open(&files);

    // An unparseable date leaves Oxblood unbound but still carrying a record.
    let mut items = ws.items().to_vec();
    items[0].private_comment = codec::remove(&items[0].private_comment, 2026);
    items[0].private_comment =
        codec::build(&items[0].private_comment, 2026, "2026-13-01", None, None);
    ws.set_items(items);
    assert!(ws.move_assignment(None, Some("2026-06-01"), Some(0)).success);

    let plan = ws.prepare_save("2026-06-01").unwrap();
    assert_eq!(plan.overwrites.unwrap().date, "2026-13-01");
    // Other keys in the comment survive.
    assert!(plan.comment.contains(r#""note":"keep""#));
}

#[test]
fn year_change_rederives_persisted() {
    let mut items = sample_collection();
    items[4].private_comment = r#"{"swatch2027":{"date":"2027-07-07"}}"#.to_string();
    let mut ws = Workspace::new(items, 2026);
    ws.move_assignment(None, Some("2026-07-07"), Some(5));

    ws.set_year(2027);
    assert_eq!(ws.persisted().len(), 1);
    assert_eq!(ws.persisted().get(&d("2027-07-07")), Some(&4));
    assert!(ws.session().is_empty());
}
