//! Diff orchestration.
//!
//! Validates configuration and schemas, indexes both sides, resolves the
//! diffable field set and runs the matcher. Every fatal condition is checked
//! before any matching starts, so an error never leaves a partial result.

use tracing::info;

use crate::config::DiffConfig;
use crate::diff::DiffError;
use crate::diff_set::DiffSet;
use crate::field_set::resolve_diffable_fields;
use crate::index::{RowFilter, RowIndex};
use crate::key::{KeySpec, Normalization};
use crate::matcher::{apply_suppression, match_rows};
use crate::session::DiffOutcome;
use crate::source::{Side, Source};

struct Prepared {
    spec: KeySpec,
    filter: RowFilter,
}

fn prepare(source: &Source, side: Side, config: &DiffConfig) -> Result<Prepared, DiffError> {
    source.schema.validate(side)?;
    let spec = KeySpec::resolve(&source.key_schema, &source.schema, side)?;
    let filter = RowFilter::resolve(config, source, side)?;
    Ok(Prepared { spec, filter })
}

pub fn diff_sources(
    left: &Source,
    right: &Source,
    config: &DiffConfig,
) -> Result<DiffOutcome, DiffError> {
    config.validate()?;
    let left_prep = prepare(left, Side::Left, config)?;
    let right_prep = prepare(right, Side::Right, config)?;

    let norm = Normalization {
        case_sensitive: config.case_sensitive,
        trim_whitespace: config.trim_whitespace,
    };

    let field_set = resolve_diffable_fields(&left.schema, &right.schema, &config.ignore_fields);

    let (mut left_index, mut right_index) =
        build_indexes(left, right, &left_prep, &right_prep, &norm);

    let mut records = match_rows(
        &left_index,
        &right_index,
        &field_set.fields,
        &norm,
        config.move_detection,
    );
    apply_suppression(&mut records, config);

    let mut warnings = Vec::new();
    warnings.extend(left.warnings.iter().cloned());
    warnings.extend(right.warnings.iter().cloned());
    warnings.extend(field_set.warnings.iter().cloned());
    warnings.extend(left_index.take_warnings());
    warnings.extend(right_index.take_warnings());

    let outcome = DiffOutcome::new(DiffSet::new(records), field_set.names(), warnings);
    info!(
        left = %left.label,
        right = %right.label,
        summary = ?outcome.summary().to_map(),
        "diff complete"
    );
    Ok(outcome)
}

#[cfg(feature = "parallel")]
fn build_indexes<'a>(
    left: &'a Source,
    right: &'a Source,
    left_prep: &Prepared,
    right_prep: &Prepared,
    norm: &Normalization,
) -> (RowIndex<'a>, RowIndex<'a>) {
    rayon::join(
        || RowIndex::build(left, Side::Left, &left_prep.spec, &left_prep.filter, norm),
        || RowIndex::build(right, Side::Right, &right_prep.spec, &right_prep.filter, norm),
    )
}

#[cfg(not(feature = "parallel"))]
fn build_indexes<'a>(
    left: &'a Source,
    right: &'a Source,
    left_prep: &Prepared,
    right_prep: &Prepared,
    norm: &Normalization,
) -> (RowIndex<'a>, RowIndex<'a>) {
    (
        RowIndex::build(left, Side::Left, &left_prep.spec, &left_prep.filter, norm),
        RowIndex::build(right, Side::Right, &right_prep.spec, &right_prep.filter, norm),
    )
}
