//! Matching and classification of keyed rows.
//!
//! Takes both sides' [`RowIndex`]es and the diffable field set and produces one
//! [`DiffRecord`] per composite key that differs. Records come out in left
//! input order, followed by right-only keys in right input order.

use tracing::debug;

use crate::config::{DiffConfig, MoveDetection};
use crate::diff::{Action, DiffRecord, FieldChange, PositionChange};
use crate::field_set::DiffField;
use crate::index::{IndexedRow, RowIndex};
use crate::key::Normalization;
use crate::sibling_order::moved_keys;

/// Classification precedence: field changes win over a position change, and
/// a matched row with neither produces no record.
pub fn classify(has_changes: bool, position_changed: bool) -> Option<Action> {
    match (has_changes, position_changed) {
        (true, _) => Some(Action::Update),
        (false, true) => Some(Action::Move),
        (false, false) => None,
    }
}

pub fn compare_fields(
    left: &IndexedRow<'_>,
    right: &IndexedRow<'_>,
    fields: &[DiffField],
    norm: &Normalization,
) -> Vec<FieldChange> {
    fields
        .iter()
        .filter_map(|field| {
            let old = left.row.get(field.left_idx).unwrap_or("");
            let new = right.row.get(field.right_idx).unwrap_or("");
            if norm.values_equal(old, new) {
                None
            } else {
                Some(FieldChange {
                    field: field.name.clone(),
                    old: old.to_string(),
                    new: new.to_string(),
                })
            }
        })
        .collect()
}

/// Produces the unsuppressed diff records for two fully built indexes.
pub fn match_rows(
    left: &RowIndex<'_>,
    right: &RowIndex<'_>,
    fields: &[DiffField],
    norm: &Normalization,
    move_detection: MoveDetection,
) -> Vec<DiffRecord> {
    let moved = moved_keys(left, right, move_detection);
    let mut records = Vec::new();

    for key in left.keys() {
        let Some(old) = left.get(key) else {
            continue;
        };

        let Some(new) = right.get(key) else {
            records.push(DiffRecord {
                key: key.clone(),
                action: Action::Delete,
                left: Some(old.snapshot()),
                right: None,
                changes: Vec::new(),
                position_change: None,
            });
            continue;
        };

        let changes = compare_fields(old, new, fields, norm);
        let position_change = moved.contains(key).then(|| PositionChange {
            from: old.sibling_position,
            to: new.sibling_position,
        });

        if let Some(action) = classify(!changes.is_empty(), position_change.is_some()) {
            records.push(DiffRecord {
                key: key.clone(),
                action,
                left: Some(old.snapshot()),
                right: Some(new.snapshot()),
                changes,
                position_change,
            });
        }
    }

    for key in right.keys() {
        if left.contains(key) {
            continue;
        }
        if let Some(new) = right.get(key) {
            records.push(DiffRecord {
                key: key.clone(),
                action: Action::Add,
                left: None,
                right: Some(new.snapshot()),
                changes: Vec::new(),
                position_change: None,
            });
        }
    }

    debug!(
        records = records.len(),
        moved = moved.len(),
        "classified keyed rows"
    );

    records
}

/// Drops records whose final action is suppressed. Warnings are unaffected.
pub fn apply_suppression(records: &mut Vec<DiffRecord>, config: &DiffConfig) {
    records.retain(|record| !config.is_suppressed(record.action));
}
