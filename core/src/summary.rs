use std::collections::BTreeMap;

use serde::{Serialize, Serializer};

use crate::diff::Action;
use crate::diff_set::DiffSet;

/// Per-action record counts for one diff run.
///
/// Only actions that occur are listed; `Warning` is listed only when the run
/// produced warnings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffSummary {
    counts: BTreeMap<Action, usize>,
    warnings: usize,
}

impl DiffSummary {
    pub fn from_diffs(diffs: &DiffSet, warning_count: usize) -> DiffSummary {
        let mut counts = BTreeMap::new();
        for record in diffs {
            *counts.entry(record.action).or_insert(0) += 1;
        }
        DiffSummary {
            counts,
            warnings: warning_count,
        }
    }

    pub fn count(&self, action: Action) -> usize {
        self.counts.get(&action).copied().unwrap_or(0)
    }

    pub fn warning_count(&self) -> Option<usize> {
        (self.warnings > 0).then_some(self.warnings)
    }

    /// Number of diff records (warnings excluded).
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    /// Action name -> count, plus `"Warning"` when warnings exist.
    pub fn to_map(&self) -> BTreeMap<String, usize> {
        let mut map: BTreeMap<String, usize> = self
            .counts
            .iter()
            .map(|(action, count)| (action.name().to_string(), *count))
            .collect();
        if let Some(warnings) = self.warning_count() {
            map.insert("Warning".to_string(), warnings);
        }
        map
    }
}

impl Serialize for DiffSummary {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_map().serialize(serializer)
    }
}
