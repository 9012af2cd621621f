//! Session mutation engine.
//!
//! A pure reducer over the two assignment layers: it takes the current
//! session, the read-only persisted layer and an [`Operation`], and returns
//! the next session together with a [`MutationResult`]. Inputs are never
//! modified; a refused operation hands back an unchanged copy of the
//! session.
//!
//! ```text
//! from_date  to_date   operation
//! --------   -------   ---------
//! absent     present   assign    (item index required)
//! present    absent    unassign  (item index derived from the session)
//! present    present   move      (item index derived from the session)
//! date1      date2     swap      (separate entry point)
//! ```

pub mod dispatch;
pub mod result;

use chrono::NaiveDate;
use tracing::debug;

use crate::model::{Assignments, Item, ItemIndex, ItemRef, format_date, parse_date};
use crate::store::{date_of, merged_view};

pub use result::{ErrorKind, MutationDetails, MutationError, MutationResult, OperationKind};

/// A validated mutation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Assign {
        to: NaiveDate,
        item: ItemIndex,
    },
    Unassign {
        from: NaiveDate,
        item: Option<ItemIndex>,
    },
    Move {
        from: NaiveDate,
        to: NaiveDate,
        item: Option<ItemIndex>,
    },
    Swap {
        date1: NaiveDate,
        date2: NaiveDate,
    },
}

impl Operation {
    /// Select an operation from which dates are present.
    ///
    /// Checks, in order: at least one date given, each given date is
    /// canonical `YYYY-MM-DD`, and an assign carries an item index.
    pub fn from_dates(
        from_date: Option<&str>,
        to_date: Option<&str>,
        item: Option<ItemIndex>,
    ) -> Result<Self, MutationError> {
        if from_date.is_none() && to_date.is_none() {
            return Err(MutationError::MissingDates);
        }
        let from = from_date.map(|s| validate_date("from_date", s)).transpose()?;
        let to = to_date.map(|s| validate_date("to_date", s)).transpose()?;

        match (from, to) {
            (None, Some(to)) => Ok(Self::Assign {
                to,
                item: item.ok_or(MutationError::MissingItem)?,
            }),
            (Some(from), None) => Ok(Self::Unassign { from, item }),
            (Some(from), Some(to)) => Ok(Self::Move { from, to, item }),
            (None, None) => Err(MutationError::MissingDates),
        }
    }

    /// Build a swap between two dates, in either order.
    pub fn swap(date1: &str, date2: &str) -> Result<Self, MutationError> {
        Ok(Self::Swap {
            date1: validate_date("date1", date1)?,
            date2: validate_date("date2", date2)?,
        })
    }

    pub fn kind(&self) -> OperationKind {
        match self {
            Self::Assign { .. } => OperationKind::Assign,
            Self::Unassign { .. } => OperationKind::Unassign,
            Self::Move { .. } => OperationKind::Move,
            Self::Swap { .. } => OperationKind::Swap,
        }
    }

    /// Request metadata echoed back in every result.
    fn details(&self) -> MutationDetails {
        match *self {
            Self::Assign { to, item } => MutationDetails {
                to_date: Some(format_date(to)),
                item_index: Some(item),
                ..Default::default()
            },
            Self::Unassign { from, item } => MutationDetails {
                from_date: Some(format_date(from)),
                item_index: item,
                ..Default::default()
            },
            Self::Move { from, to, item } => MutationDetails {
                from_date: Some(format_date(from)),
                to_date: Some(format_date(to)),
                item_index: item,
                ..Default::default()
            },
            Self::Swap { date1, date2 } => MutationDetails {
                date1: Some(format_date(date1)),
                date2: Some(format_date(date2)),
                ..Default::default()
            },
        }
    }
}

fn validate_date(field: &'static str, value: &str) -> Result<NaiveDate, MutationError> {
    parse_date(value).ok_or_else(|| MutationError::InvalidDate {
        field,
        value: value.to_owned(),
    })
}

/// The state a mutation reads: both layers plus, optionally, the item list
/// used to enrich results with brand and name.
#[derive(Debug, Clone, Copy)]
pub struct Layers<'a> {
    pub session: &'a Assignments,
    pub persisted: &'a Assignments,
    pub items: Option<&'a [Item]>,
}

impl<'a> Layers<'a> {
    pub fn new(session: &'a Assignments, persisted: &'a Assignments) -> Self {
        Self {
            session,
            persisted,
            items: None,
        }
    }

    pub fn with_items(mut self, items: &'a [Item]) -> Self {
        self.items = Some(items);
        self
    }

    fn item_ref(&self, index: ItemIndex) -> Option<ItemRef> {
        self.items.and_then(|items| ItemRef::lookup(items, index))
    }

    fn label(&self, index: ItemIndex) -> String {
        match self.item_ref(index) {
            Some(r) => format!("{} {}", r.brand, r.name),
            None => format!("item {index}"),
        }
    }
}

/// The next session plus the outcome that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mutation {
    pub session: Assignments,
    pub result: MutationResult,
}

impl Mutation {
    pub fn succeeded(&self) -> bool {
        self.result.success
    }
}

/// The session reducer.
///
/// Enforces, for every successful mutation:
///
/// - persisted dates are never written or cleared,
/// - an item index appears at most once across persisted ∪ session,
/// - a supplied item index matches the bound one.
pub struct MutationEngine;

impl MutationEngine {
    /// Apply a validated operation.
    pub fn apply(layers: &Layers<'_>, op: Operation) -> Mutation {
        let outcome = match op {
            Operation::Assign { to, item } => Self::assign(layers, to, item),
            Operation::Unassign { from, item } => Self::unassign(layers, from, item),
            Operation::Move { from, to, item } => Self::relocate(layers, from, to, item),
            Operation::Swap { date1, date2 } => Self::swap(layers, date1, date2),
        };

        match outcome {
            Ok(mutation) => {
                debug!(op = %op.kind(), "session mutation applied");
                mutation
            }
            Err((error, details)) => {
                debug!(op = %op.kind(), reason = %error.kind(), %error, "session mutation refused");
                Mutation {
                    session: layers.session.clone(),
                    result: MutationResult::failure(&error, details),
                }
            }
        }
    }

    /// Assign, unassign or move, selected by which dates are present.
    pub fn move_assignment(
        layers: &Layers<'_>,
        from_date: Option<&str>,
        to_date: Option<&str>,
        item: Option<ItemIndex>,
    ) -> Mutation {
        match Operation::from_dates(from_date, to_date, item) {
            Ok(op) => Self::apply(layers, op),
            Err(error) => Self::rejected(
                layers,
                &error,
                MutationDetails {
                    from_date: from_date.map(str::to_owned),
                    to_date: to_date.map(str::to_owned),
                    item_index: item,
                    ..Default::default()
                },
            ),
        }
    }

    /// Exchange the bindings of two dates.
    pub fn swap_assignments(layers: &Layers<'_>, date1: &str, date2: &str) -> Mutation {
        match Operation::swap(date1, date2) {
            Ok(op) => Self::apply(layers, op),
            Err(error) => Self::rejected(
                layers,
                &error,
                MutationDetails {
                    date1: Some(date1.to_owned()),
                    date2: Some(date2.to_owned()),
                    ..Default::default()
                },
            ),
        }
    }

    fn rejected(layers: &Layers<'_>, error: &MutationError, details: MutationDetails) -> Mutation {
        debug!(reason = %error.kind(), %error, "session mutation request rejected");
        Mutation {
            session: layers.session.clone(),
            result: MutationResult::failure(error, details),
        }
    }

    fn assign(
        layers: &Layers<'_>,
        to: NaiveDate,
        item: ItemIndex,
    ) -> Result<Mutation, (MutationError, MutationDetails)> {
        let mut details = Operation::Assign { to, item }.details();
        details.item = layers.item_ref(item);

        if layers.persisted.contains_key(&to) {
            return Err((MutationError::Protected { date: to }, details));
        }

        let merged = merged_view(layers.session, layers.persisted);
        if let Some(date) = date_of(&merged, item) {
            return Err((MutationError::AlreadyAssigned { index: item, date }, details));
        }

        let mut session = layers.session.clone();
        details.displaced = session.insert(to, item);

        let message = format!("Assigned {} to {}", layers.label(item), to);
        Ok(Mutation {
            session,
            result: MutationResult::success(OperationKind::Assign, message, details),
        })
    }

    /// Checks shared by unassign and move on the source date; returns the
    /// bound item index.
    fn check_source(
        layers: &Layers<'_>,
        from: NaiveDate,
        supplied: Option<ItemIndex>,
    ) -> Result<ItemIndex, MutationError> {
        if layers.persisted.contains_key(&from) {
            return Err(MutationError::Protected { date: from });
        }
        let bound = *layers
            .session
            .get(&from)
            .ok_or(MutationError::NoSessionEntry { date: from })?;
        match supplied {
            Some(index) if index != bound => Err(MutationError::Mismatch {
                date: from,
                expected: bound,
                supplied: index,
            }),
            _ => Ok(bound),
        }
    }

    fn unassign(
        layers: &Layers<'_>,
        from: NaiveDate,
        supplied: Option<ItemIndex>,
    ) -> Result<Mutation, (MutationError, MutationDetails)> {
        let mut details = Operation::Unassign {
            from,
            item: supplied,
        }
        .details();

        let item = Self::check_source(layers, from, supplied).map_err(|e| (e, details.clone()))?;
        details.item_index = Some(item);
        details.item = layers.item_ref(item);

        let mut session = layers.session.clone();
        session.remove(&from);

        let message = format!("Removed {} from {}", layers.label(item), from);
        Ok(Mutation {
            session,
            result: MutationResult::success(OperationKind::Unassign, message, details),
        })
    }

    fn relocate(
        layers: &Layers<'_>,
        from: NaiveDate,
        to: NaiveDate,
        supplied: Option<ItemIndex>,
    ) -> Result<Mutation, (MutationError, MutationDetails)> {
        let mut details = Operation::Move {
            from,
            to,
            item: supplied,
        }
        .details();

        let item = Self::check_source(layers, from, supplied).map_err(|e| (e, details.clone()))?;
        details.item_index = Some(item);
        details.item = layers.item_ref(item);

        if layers.persisted.contains_key(&to) {
            return Err((MutationError::ProtectedDestination { date: to }, details));
        }

        let mut session = layers.session.clone();
        session.remove(&from);
        // Moving onto its own date displaces nothing.
        details.displaced = session.insert(to, item);

        let message = format!("Moved {} from {} to {}", layers.label(item), from, to);
        Ok(Mutation {
            session,
            result: MutationResult::success(OperationKind::Move, message, details),
        })
    }

    fn swap(
        layers: &Layers<'_>,
        date1: NaiveDate,
        date2: NaiveDate,
    ) -> Result<Mutation, (MutationError, MutationDetails)> {
        let mut details = Operation::Swap { date1, date2 }.details();

        let merged = merged_view(layers.session, layers.persisted);
        let Some(&first) = merged.get(&date1) else {
            return Err((MutationError::NoAssignment { date: date1 }, details));
        };
        let Some(&second) = merged.get(&date2) else {
            return Err((MutationError::NoAssignment { date: date2 }, details));
        };
        details.item_index = Some(first);
        details.item = layers.item_ref(first);
        details.other_index = Some(second);
        details.other_item = layers.item_ref(second);

        for date in [date1, date2] {
            if layers.persisted.contains_key(&date) {
                return Err((MutationError::Protected { date }, details));
            }
        }

        let mut session = layers.session.clone();
        session.insert(date1, second);
        session.insert(date2, first);

        let message = format!("Swapped items between {date1} and {date2}");
        Ok(Mutation {
            session,
            result: MutationResult::success(OperationKind::Swap, message, details),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        parse_date(s).unwrap()
    }

    fn layer(entries: &[(&str, ItemIndex)]) -> Assignments {
        entries.iter().map(|(date, i)| (d(date), *i)).collect()
    }

    #[test]
    fn from_dates_selects_operation() {
        assert!(matches!(
            Operation::from_dates(None, Some("2026-01-01"), Some(1)),
            Ok(Operation::Assign { item: 1, .. })
        ));
        assert!(matches!(
            Operation::from_dates(Some("2026-01-01"), None, None),
            Ok(Operation::Unassign { item: None, .. })
        ));
        assert!(matches!(
            Operation::from_dates(Some("2026-01-01"), Some("2026-01-02"), None),
            Ok(Operation::Move { .. })
        ));
    }

    #[test]
    fn from_dates_validation_order() {
        assert_eq!(
            Operation::from_dates(None, None, Some(1)),
            Err(MutationError::MissingDates)
        );
        // Format is checked before the missing-index rule.
        assert!(matches!(
            Operation::from_dates(None, Some("2026-1-1"), None),
            Err(MutationError::InvalidDate { field: "to_date", .. })
        ));
        assert_eq!(
            Operation::from_dates(None, Some("2026-01-01"), None),
            Err(MutationError::MissingItem)
        );
    }

    #[test]
    fn assign_reports_displaced_session_item() {
        let session = layer(&[("2026-01-05", 3)]);
        let persisted = Assignments::new();
        let m = MutationEngine::apply(
            &Layers::new(&session, &persisted),
            Operation::Assign { to: d("2026-01-05"), item: 4 },
        );
        assert!(m.succeeded());
        assert_eq!(m.session, layer(&[("2026-01-05", 4)]));
        assert_eq!(m.result.details.displaced, Some(3));
    }

    #[test]
    fn move_onto_itself_is_a_noop_success() {
        let session = layer(&[("2026-01-05", 3)]);
        let persisted = Assignments::new();
        let m = MutationEngine::move_assignment(
            &Layers::new(&session, &persisted),
            Some("2026-01-05"),
            Some("2026-01-05"),
            None,
        );
        assert!(m.succeeded());
        assert_eq!(m.session, session);
        assert_eq!(m.result.details.displaced, None);
    }

    #[test]
    fn results_are_enriched_with_item_names() {
        let items = vec![Item::new("Diamine", "Oxblood")];
        let session = Assignments::new();
        let persisted = Assignments::new();
        let layers = Layers::new(&session, &persisted).with_items(&items);
        let m = MutationEngine::move_assignment(&layers, None, Some("2026-02-01"), Some(0));
        assert_eq!(m.result.message, "Assigned Diamine Oxblood to 2026-02-01");
        assert_eq!(m.result.details.item.as_ref().unwrap().name, "Oxblood");
    }
}
