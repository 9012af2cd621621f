//! Outcome types for session mutations.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{ItemIndex, ItemRef, format_date};

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Which mutation a result describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Assign,
    Unassign,
    Move,
    Swap,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Assign => "assign",
            Self::Unassign => "unassign",
            Self::Move => "move",
            Self::Swap => "swap",
        };
        f.write_str(s)
    }
}

impl FromStr for OperationKind {
    type Err = OperationKindParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "assign" => Ok(Self::Assign),
            "unassign" => Ok(Self::Unassign),
            "move" => Ok(Self::Move),
            "swap" => Ok(Self::Swap),
            other => Err(OperationKindParseError(other.to_owned())),
        }
    }
}

/// Error returned when parsing an invalid [`OperationKind`] string.
#[derive(Debug, Clone, Error)]
#[error("invalid operation: {0:?}")]
pub struct OperationKindParseError(pub String);

// ---------------------------------------------------------------------------

/// Failure taxonomy shared by the engine and the tool facade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Bad date format or a missing required field.
    InvalidArgument,
    /// The target date is bound in the persisted layer.
    Protected,
    /// There is no binding to act on.
    NotFound,
    /// The item is already bound to another date.
    Conflict,
    /// A supplied item index disagrees with the bound one.
    Mismatch,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::InvalidArgument => "invalid_argument",
            Self::Protected => "protected",
            Self::NotFound => "not_found",
            Self::Conflict => "conflict",
            Self::Mismatch => "mismatch",
        };
        f.write_str(s)
    }
}

impl FromStr for ErrorKind {
    type Err = ErrorKindParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "invalid_argument" => Ok(Self::InvalidArgument),
            "protected" => Ok(Self::Protected),
            "not_found" => Ok(Self::NotFound),
            "conflict" => Ok(Self::Conflict),
            "mismatch" => Ok(Self::Mismatch),
            other => Err(ErrorKindParseError(other.to_owned())),
        }
    }
}

/// Error returned when parsing an invalid [`ErrorKind`] string.
#[derive(Debug, Clone, Error)]
#[error("invalid error kind: {0:?}")]
pub struct ErrorKindParseError(pub String);

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Why a mutation was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MutationError {
    #[error("must specify from_date or to_date")]
    MissingDates,

    #[error("invalid {field} format: {value:?}; use YYYY-MM-DD")]
    InvalidDate { field: &'static str, value: String },

    #[error("an item index is required for assign operations")]
    MissingItem,

    #[error("date {date} has a protected assignment and cannot be modified")]
    Protected { date: NaiveDate },

    #[error("date {date} has a protected assignment and cannot be used as a destination")]
    ProtectedDestination { date: NaiveDate },

    #[error("no session assignment found for {date}")]
    NoSessionEntry { date: NaiveDate },

    #[error("no assignment found for {date}")]
    NoAssignment { date: NaiveDate },

    #[error("item {index} is already assigned to {date}")]
    AlreadyAssigned { index: ItemIndex, date: NaiveDate },

    #[error("item index mismatch on {date}: expected {expected}, got {supplied}")]
    Mismatch {
        date: NaiveDate,
        expected: ItemIndex,
        supplied: ItemIndex,
    },
}

impl MutationError {
    /// The taxonomy bucket for this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingDates | Self::InvalidDate { .. } | Self::MissingItem => {
                ErrorKind::InvalidArgument
            }
            Self::Protected { .. } | Self::ProtectedDestination { .. } => ErrorKind::Protected,
            Self::NoSessionEntry { .. } | Self::NoAssignment { .. } => ErrorKind::NotFound,
            Self::AlreadyAssigned { .. } => ErrorKind::Conflict,
            Self::Mismatch { .. } => ErrorKind::Mismatch,
        }
    }
}

// ---------------------------------------------------------------------------
// Result
// ---------------------------------------------------------------------------

/// Optional metadata attached to a [`MutationResult`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date2: Option<String>,
    /// The item being acted on (for a swap: the one that started on `date1`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_index: Option<ItemIndex>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item: Option<ItemRef>,
    /// For a swap: the item that started on `date2`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub other_index: Option<ItemIndex>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub other_item: Option<ItemRef>,
    /// Session item that previously occupied the destination.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub displaced: Option<ItemIndex>,
    /// Where a conflicting item is already bound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_date: Option<String>,
    /// The persisted date that blocked the mutation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protected_date: Option<String>,
}

/// Tagged outcome of one mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation: Option<OperationKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<ErrorKind>,
    pub message: String,
    #[serde(flatten)]
    pub details: MutationDetails,
}

impl MutationResult {
    pub fn success(operation: OperationKind, message: String, details: MutationDetails) -> Self {
        Self {
            success: true,
            operation: Some(operation),
            reason: None,
            message,
            details,
        }
    }

    /// Fold an error into a failed result, adding error-specific metadata.
    pub fn failure(error: &MutationError, mut details: MutationDetails) -> Self {
        match error {
            MutationError::Protected { date } | MutationError::ProtectedDestination { date } => {
                details.protected_date = Some(format_date(*date));
            }
            MutationError::AlreadyAssigned { index, date } => {
                details.item_index = Some(*index);
                details.assigned_date = Some(format_date(*date));
            }
            _ => {}
        }
        Self {
            success: false,
            operation: None,
            reason: Some(error.kind()),
            message: capitalize(&error.to_string()),
            details,
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
