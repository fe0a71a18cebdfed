//! Diff records and errors for keyed tree comparison.
//!
//! This module defines the types used to represent differences between two sources:
//! - [`Action`]: The classification of a single keyed difference
//! - [`DiffRecord`]: One classified difference for one composite key
//! - [`DiffError`]: Fatal errors that abort a diff before any matching happens

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::ConfigError;
use crate::error_codes;
use crate::key::CompositeKey;
use crate::source::Side;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Action {
    /// Key present only in the right source.
    Add,
    /// Key present only in the left source.
    Delete,
    /// Key present on both sides with at least one differing field.
    Update,
    /// Key present on both sides, fields equal, sibling order changed.
    Move,
}

impl Action {
    pub const ALL: [Action; 4] = [Action::Add, Action::Delete, Action::Update, Action::Move];

    pub fn name(self) -> &'static str {
        match self {
            Action::Add => "Add",
            Action::Delete => "Delete",
            Action::Update => "Update",
            Action::Move => "Move",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown action '{0}' (expected one of Add, Delete, Update, Move)")]
pub struct ParseActionError(pub String);

impl FromStr for Action {
    type Err = ParseActionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Action::ALL
            .into_iter()
            .find(|action| action.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ParseActionError(s.to_string()))
    }
}

/// A single field whose value differs between the matched rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldChange {
    pub field: String,
    pub old: String,
    pub new: String,
}

/// Sibling positions of a matched key before and after.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionChange {
    pub from: usize,
    pub to: usize,
}

/// Snapshot of a source row referenced by a [`DiffRecord`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordRow {
    pub line: usize,
    pub sibling_position: usize,
    pub values: Vec<String>,
}

/// Classified difference for one composite key.
///
/// Invariants (maintained by the matcher, not by the type system):
/// - `Add` has only `right`, `Delete` has only `left`; both have no `changes`.
/// - `Update` has non-empty `changes` and may also carry a `position_change`.
/// - `Move` has a `position_change` and empty `changes`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffRecord {
    pub key: CompositeKey,
    pub action: Action,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub left: Option<RecordRow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub right: Option<RecordRow>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub changes: Vec<FieldChange>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position_change: Option<PositionChange>,
}

impl DiffRecord {
    pub fn change(&self, field: &str) -> Option<&FieldChange> {
        self.changes.iter().find(|c| c.field == field)
    }
}

/// Errors produced by diffing APIs. Any of these aborts the diff before a
/// [`crate::DiffSet`] is produced.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DiffError {
    #[error("[TDIFF_DIFF_001] key field '{field}' is not present in the {side} source. Suggestion: check the key field names against the header row.")]
    MissingKeyField { side: Side, field: String },

    #[error("[TDIFF_DIFF_002] key schema is empty. Suggestion: name at least one key field.")]
    EmptyKeySchema { side: Side },

    #[error("[TDIFF_DIFF_003] the {side} source has no fields. Suggestion: check that the input has a header row.")]
    EmptyFieldSchema { side: Side },

    #[error("[TDIFF_DIFF_004] field '{field}' appears more than once in the {side} source. Suggestion: rename the duplicate column.")]
    DuplicateFieldName { side: Side, field: String },

    #[error("[TDIFF_DIFF_005] filter field '{field}' is not present in the {side} source. Suggestion: check include/exclude field names.")]
    UnknownFilterField { side: Side, field: String },

    #[error("[TDIFF_DIFF_006] invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),
}

impl DiffError {
    pub fn code(&self) -> &'static str {
        match self {
            DiffError::MissingKeyField { .. } => error_codes::DIFF_MISSING_KEY_FIELD,
            DiffError::EmptyKeySchema { .. } => error_codes::DIFF_EMPTY_KEY_SCHEMA,
            DiffError::EmptyFieldSchema { .. } => error_codes::DIFF_EMPTY_FIELD_SCHEMA,
            DiffError::DuplicateFieldName { .. } => error_codes::DIFF_DUPLICATE_FIELD_NAME,
            DiffError::UnknownFilterField { .. } => error_codes::DIFF_UNKNOWN_FILTER_FIELD,
            DiffError::InvalidConfig(_) => error_codes::DIFF_INVALID_CONFIG,
        }
    }
}
