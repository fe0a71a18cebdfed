use serde::Serialize;

use crate::diff_set::DiffSet;
use crate::session::DiffOutcome;
use crate::summary::DiffSummary;

pub const OUTPUT_SCHEMA_VERSION: &str = "1";

/// Serialized shape of a [`DiffOutcome`].
#[derive(Debug, Serialize)]
pub struct OutcomeEnvelope<'a> {
    pub version: &'static str,
    pub summary: &'a DiffSummary,
    pub diff_fields: &'a [String],
    pub warnings: &'a [String],
    pub records: &'a DiffSet,
}

impl<'a> OutcomeEnvelope<'a> {
    pub fn new(outcome: &'a DiffOutcome) -> Self {
        Self {
            version: OUTPUT_SCHEMA_VERSION,
            summary: outcome.summary(),
            diff_fields: outcome.diff_fields(),
            warnings: outcome.warnings(),
            records: outcome.diffs(),
        }
    }
}

pub fn serialize_outcome(outcome: &DiffOutcome) -> serde_json::Result<String> {
    serde_json::to_string(&OutcomeEnvelope::new(outcome))
}

pub fn serialize_outcome_pretty(outcome: &DiffOutcome) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&OutcomeEnvelope::new(outcome))
}
