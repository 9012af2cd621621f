//! Convenience wrappers that call [`super::MutationEngine`] with semantic
//! names.

use crate::model::ItemIndex;

use super::{Layers, Mutation, MutationEngine};

/// Bind `item` to `to_date` in the session.
///
/// Refused if the date is persisted or the item is bound anywhere already.
pub fn assign(layers: &Layers<'_>, item: ItemIndex, to_date: &str) -> Mutation {
    MutationEngine::move_assignment(layers, None, Some(to_date), Some(item))
}

/// Remove the session binding on `from_date`.
pub fn unassign(layers: &Layers<'_>, from_date: &str) -> Mutation {
    MutationEngine::move_assignment(layers, Some(from_date), None, None)
}

/// Move the session binding on `from_date` to `to_date`.
pub fn relocate(layers: &Layers<'_>, from_date: &str, to_date: &str) -> Mutation {
    MutationEngine::move_assignment(layers, Some(from_date), Some(to_date), None)
}

/// Exchange the session bindings on two dates.
pub fn swap(layers: &Layers<'_>, date1: &str, date2: &str) -> Mutation {
    MutationEngine::swap_assignments(layers, date1, date2)
}
