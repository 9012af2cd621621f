//! Live calendar state and the agent turn snapshot.
//!
//! The [`Workspace`] owns the item list, the selected year and the three
//! maps derived from or layered over it (persisted, session, themes). It
//! holds state and dispatches to the pure [`MutationEngine`]; it does not
//! implement any rule itself.
//!
//! An agent turn works on a [`TurnSnapshot`] taken by
//! [`Workspace::begin_turn`]. Tools read and write only the snapshot, and
//! [`Workspace::commit_turn`] writes its session and theme changes back
//! through the same setters interactive edits use.

use chrono::{Datelike, NaiveDate};
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::codec::{self, SwatchRecord};
use crate::engine::{Layers, MutationEngine, MutationResult, Operation};
use crate::model::{Assignments, Item, ItemIndex, MonthKey, format_date, parse_date};
use crate::session_file::SessionFile;
use crate::store::{self, DayCell};
use crate::theme::{ResolvedTheme, ThemeError, ThemeRecord, ThemeStore};

// -----------------------------------------------------------------------
// Save flow
// -----------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SaveError {
    #[error("invalid date '{0}': expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("date {0} has no session assignment to save")]
    NotInSession(NaiveDate),

    #[error("item index {0} is out of range")]
    UnknownItem(ItemIndex),

    #[error("date {date} is outside the selected year {year}; switch years to save it")]
    WrongYear { date: NaiveDate, year: i32 },
}

/// The comment write needed to persist one session binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavePlan {
    pub index: ItemIndex,
    pub date: NaiveDate,
    /// The item's new private comment.
    pub comment: String,
    /// The dated record for this year that the write replaces, if any.
    pub overwrites: Option<SwatchRecord>,
}

// -----------------------------------------------------------------------
// Workspace
// -----------------------------------------------------------------------

/// The single active calendar session.
#[derive(Debug, Clone)]
pub struct Workspace {
    items: Vec<Item>,
    year: i32,
    persisted: Assignments,
    session: Assignments,
    themes: ThemeStore,
}

impl Workspace {
    pub fn new(items: Vec<Item>, year: i32) -> Self {
        let persisted = store::derive_protected(&items, year);
        info!(year, items = items.len(), persisted = persisted.len(), "workspace opened");
        Self {
            items,
            year,
            persisted,
            session: Assignments::new(),
            themes: ThemeStore::new(),
        }
    }

    /// Replace session assignments and themes with a loaded session file.
    pub fn with_session(mut self, file: SessionFile) -> Self {
        self.load_session(file);
        self
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn persisted(&self) -> &Assignments {
        &self.persisted
    }

    pub fn session(&self) -> &Assignments {
        &self.session
    }

    pub fn themes(&self) -> &ThemeStore {
        &self.themes
    }

    pub fn merged(&self) -> Assignments {
        store::merged_view(&self.session, &self.persisted)
    }

    pub fn layers(&self) -> Layers<'_> {
        Layers::new(&self.session, &self.persisted).with_items(&self.items)
    }

    /// Replace the item list and re-derive the persisted layer.
    pub fn set_items(&mut self, items: Vec<Item>) {
        self.items = items;
        self.persisted = store::derive_protected(&self.items, self.year);
        self.replace_session(self.session.clone());
        info!(items = self.items.len(), persisted = self.persisted.len(), "items replaced");
    }

    /// Switch the selected year.
    ///
    /// Session assignments and themes belong to the previous year and are
    /// discarded.
    pub fn set_year(&mut self, year: i32) {
        if year == self.year {
            return;
        }
        self.year = year;
        self.persisted = store::derive_protected(&self.items, year);
        self.session.clear();
        self.themes = ThemeStore::new();
        info!(year, persisted = self.persisted.len(), "year changed; session cleared");
    }

    /// The only write path for the session layer.
    ///
    /// Entries that clash with the live persisted layer are dropped, so an
    /// item or date is never bound in both layers.
    pub fn replace_session(&mut self, session: Assignments) {
        let session = store::prune_session(&session, &self.persisted);
        debug!(entries = session.len(), "session replaced");
        self.session = session;
    }

    /// The only write path for session themes.
    pub fn set_themes(&mut self, themes: ThemeStore) {
        debug!(entries = themes.len(), "themes replaced");
        self.themes = themes;
    }

    pub fn load_session(&mut self, file: SessionFile) {
        self.replace_session(file.assignments);
        self.set_themes(file.themes);
    }

    pub fn session_file(&self) -> SessionFile {
        SessionFile::new(self.session.clone(), self.themes.clone())
    }

    // -- interactive edits ----------------------------------------------

    /// Apply an operation to the live session.
    pub fn apply(&mut self, op: Operation) -> MutationResult {
        let mutation = MutationEngine::apply(&self.layers(), op);
        if mutation.succeeded() {
            self.replace_session(mutation.session);
        }
        mutation.result
    }

    /// Assign, unassign or move by date strings; see
    /// [`MutationEngine::move_assignment`].
    pub fn move_assignment(
        &mut self,
        from_date: Option<&str>,
        to_date: Option<&str>,
        item: Option<ItemIndex>,
    ) -> MutationResult {
        let mutation = MutationEngine::move_assignment(&self.layers(), from_date, to_date, item);
        if mutation.succeeded() {
            self.replace_session(mutation.session);
        }
        mutation.result
    }

    pub fn swap(&mut self, date1: &str, date2: &str) -> MutationResult {
        let mutation = MutationEngine::swap_assignments(&self.layers(), date1, date2);
        if mutation.succeeded() {
            self.replace_session(mutation.session);
        }
        mutation.result
    }

    pub fn set_theme(
        &mut self,
        key: MonthKey,
        theme: &str,
        description: &str,
    ) -> Result<ThemeRecord, ThemeError> {
        let mut themes = self.themes.clone();
        let record = themes.set(key, theme, description)?.clone();
        self.set_themes(themes);
        Ok(record)
    }

    pub fn clear_theme(&mut self, key: MonthKey) -> Option<ThemeRecord> {
        let mut themes = self.themes.clone();
        let removed = themes.clear(key);
        if removed.is_some() {
            self.set_themes(themes);
        }
        removed
    }

    pub fn resolve_theme(&self, key: MonthKey) -> Option<ResolvedTheme> {
        self.themes.resolve(key, &self.items, &self.persisted)
    }

    pub fn month_cells(&self, key: MonthKey) -> Vec<DayCell> {
        store::month_cells(key, &self.items, &self.session, &self.persisted)
    }

    // -- agent turns ----------------------------------------------------

    /// Freeze the current state for one agent turn.
    pub fn begin_turn(&self) -> TurnSnapshot {
        let snapshot = TurnSnapshot {
            id: Uuid::new_v4(),
            items: self.items.clone(),
            year: self.year,
            persisted: self.persisted.clone(),
            session: self.session.clone(),
            themes: self.themes.clone(),
            session_dirty: false,
            themes_dirty: false,
        };
        debug!(turn = %snapshot.id, "turn started");
        snapshot
    }

    /// Write a finished turn's changes back to live state.
    ///
    /// A turn taken against a different year is discarded; its session and
    /// themes no longer describe the live calendar.
    pub fn commit_turn(&mut self, snapshot: TurnSnapshot) -> TurnCommit {
        if snapshot.year != self.year {
            warn!(
                turn = %snapshot.id,
                turn_year = snapshot.year,
                live_year = self.year,
                "discarding turn taken against another year"
            );
            return TurnCommit::Discarded;
        }
        if !snapshot.is_dirty() {
            debug!(turn = %snapshot.id, "turn made no changes");
            return TurnCommit::Unchanged;
        }

        let session = snapshot.session_dirty;
        let themes = snapshot.themes_dirty;
        if session {
            self.replace_session(snapshot.session);
        }
        if themes {
            self.set_themes(snapshot.themes);
        }
        info!(turn = %snapshot.id, session, themes, "turn committed");
        TurnCommit::Applied { session, themes }
    }

    // -- saving ---------------------------------------------------------

    /// Build the comment write that persists the session binding on `date`.
    ///
    /// The record carries the month's session theme, if one is set.
    pub fn prepare_save(&self, date: &str) -> Result<SavePlan, SaveError> {
        let day = parse_date(date).ok_or_else(|| SaveError::InvalidDate(date.to_owned()))?;
        if day.year() != self.year {
            return Err(SaveError::WrongYear {
                date: day,
                year: self.year,
            });
        }
        let index = *self.session.get(&day).ok_or(SaveError::NotInSession(day))?;
        let item = self.items.get(index).ok_or(SaveError::UnknownItem(index))?;

        let theme = self.themes.get(MonthKey::of(day));
        let comment = codec::build(
            &item.private_comment,
            self.year,
            &format_date(day),
            theme.map(|t| t.theme.as_str()),
            theme.map(|t| t.description.as_str()),
        );
        let overwrites = codec::existing_record(&item.private_comment, self.year);
        if let Some(old) = &overwrites {
            warn!(index, old_date = %old.date, new_date = %day, "save replaces an existing record");
        }

        Ok(SavePlan {
            index,
            date: day,
            comment,
            overwrites,
        })
    }

    /// Record a completed save: the item takes its new comment, the
    /// persisted layer is re-derived and the date leaves the session.
    pub fn confirm_saved(
        &mut self,
        index: ItemIndex,
        comment: String,
        date: NaiveDate,
    ) -> Result<(), SaveError> {
        let item = self.items.get_mut(index).ok_or(SaveError::UnknownItem(index))?;
        item.private_comment = comment;
        self.persisted = store::derive_protected(&self.items, self.year);

        let mut session = self.session.clone();
        session.remove(&date);
        self.replace_session(session);
        info!(index, %date, "assignment persisted");
        Ok(())
    }
}

// -----------------------------------------------------------------------
// Turn snapshot
// -----------------------------------------------------------------------

/// Outcome of [`Workspace::commit_turn`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnCommit {
    Unchanged,
    Applied { session: bool, themes: bool },
    Discarded,
}

/// A frozen copy of workspace state owned by one agent turn.
#[derive(Debug, Clone)]
pub struct TurnSnapshot {
    id: Uuid,
    items: Vec<Item>,
    year: i32,
    persisted: Assignments,
    session: Assignments,
    themes: ThemeStore,
    session_dirty: bool,
    themes_dirty: bool,
}

impl TurnSnapshot {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn persisted(&self) -> &Assignments {
        &self.persisted
    }

    pub fn session(&self) -> &Assignments {
        &self.session
    }

    pub fn themes(&self) -> &ThemeStore {
        &self.themes
    }

    pub fn merged(&self) -> Assignments {
        store::merged_view(&self.session, &self.persisted)
    }

    pub fn layers(&self) -> Layers<'_> {
        Layers::new(&self.session, &self.persisted).with_items(&self.items)
    }

    pub fn is_dirty(&self) -> bool {
        self.session_dirty || self.themes_dirty
    }

    /// Apply an operation to the snapshot session.
    pub fn apply(&mut self, op: Operation) -> MutationResult {
        let mutation = MutationEngine::apply(&self.layers(), op);
        if mutation.succeeded() {
            self.replace_session(mutation.session);
        }
        mutation.result
    }

    pub fn move_assignment(
        &mut self,
        from_date: Option<&str>,
        to_date: Option<&str>,
        item: Option<ItemIndex>,
    ) -> MutationResult {
        let mutation = MutationEngine::move_assignment(&self.layers(), from_date, to_date, item);
        if mutation.succeeded() {
            self.replace_session(mutation.session);
        }
        mutation.result
    }

    pub fn replace_session(&mut self, session: Assignments) {
        self.session = session;
        self.session_dirty = true;
    }

    pub fn set_theme(
        &mut self,
        key: MonthKey,
        theme: &str,
        description: &str,
    ) -> Result<ThemeRecord, ThemeError> {
        let record = self.themes.set(key, theme, description)?.clone();
        self.themes_dirty = true;
        Ok(record)
    }

    pub fn clear_theme(&mut self, key: MonthKey) -> Option<ThemeRecord> {
        let removed = self.themes.clear(key);
        if removed.is_some() {
            self.themes_dirty = true;
        }
        removed
    }

    pub fn resolve_theme(&self, key: MonthKey) -> Option<ResolvedTheme> {
        self.themes.resolve(key, &self.items, &self.persisted)
    }
}
