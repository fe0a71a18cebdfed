use std::sync::OnceLock;

use crate::config::DiffConfig;
use crate::diff::{DiffError, DiffRecord};
use crate::diff_set::DiffSet;
use crate::engine::diff_sources;
use crate::summary::DiffSummary;
use crate::source::Source;

/// Holds both ingested sources so the diff can be re-run with different
/// options without re-reading input.
#[derive(Debug, Clone)]
pub struct TreeDiff {
    left: Source,
    right: Source,
}

impl TreeDiff {
    pub fn new(left: Source, right: Source) -> Self {
        Self { left, right }
    }

    pub fn left(&self) -> &Source {
        &self.left
    }

    pub fn right(&self) -> &Source {
        &self.right
    }

    /// Computes a fresh [`DiffOutcome`]. Nothing is shared with outcomes of
    /// earlier runs.
    pub fn diff(&self, config: &DiffConfig) -> Result<DiffOutcome, DiffError> {
        diff_sources(&self.left, &self.right, config)
    }
}

/// Result of one diff run: the diff set, the compared fields and every warning
/// (ingestion warnings of both sides first, then diff-time warnings).
#[derive(Debug)]
pub struct DiffOutcome {
    diffs: DiffSet,
    diff_fields: Vec<String>,
    warnings: Vec<String>,
    summary: OnceLock<DiffSummary>,
}

impl DiffOutcome {
    pub(crate) fn new(diffs: DiffSet, diff_fields: Vec<String>, warnings: Vec<String>) -> Self {
        Self {
            diffs,
            diff_fields,
            warnings,
            summary: OnceLock::new(),
        }
    }

    pub fn diffs(&self) -> &DiffSet {
        &self.diffs
    }

    pub fn diff_fields(&self) -> &[String] {
        &self.diff_fields
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn is_empty(&self) -> bool {
        self.diffs.is_empty()
    }

    /// Computed on first use; the outcome is immutable so the value never goes stale.
    pub fn summary(&self) -> &DiffSummary {
        self.summary
            .get_or_init(|| DiffSummary::from_diffs(&self.diffs, self.warnings.len()))
    }

    pub fn adds(&self) -> Vec<&DiffRecord> {
        self.diffs.adds()
    }

    pub fn deletes(&self) -> Vec<&DiffRecord> {
        self.diffs.deletes()
    }

    pub fn updates(&self) -> Vec<&DiffRecord> {
        self.diffs.updates()
    }

    pub fn moves(&self) -> Vec<&DiffRecord> {
        self.diffs.moves()
    }
}
