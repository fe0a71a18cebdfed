//! Per-source row index.
//!
//! One linear pass over a source's rows builds a lookup from [`CompositeKey`]
//! to row plus, per [`ParentKey`], the ordered sibling list used for move
//! detection. Rows rejected by the include/exclude filters never enter the
//! index and so never take a sibling position.

use regex::Regex;
use rustc_hash::FxHashMap;
use tracing::{debug, warn};

use crate::config::{compile_pattern, DiffConfig};
use crate::diff::{DiffError, RecordRow};
use crate::key::{CompositeKey, KeySpec, Normalization, ParentKey};
use crate::source::{Row, Side, Source};

/// Row filters resolved against one source's schema.
#[derive(Debug, Clone, Default)]
pub struct RowFilter {
    include: Vec<(usize, Regex)>,
    exclude: Vec<(usize, Regex)>,
}

impl RowFilter {
    pub fn resolve(config: &DiffConfig, source: &Source, side: Side) -> Result<RowFilter, DiffError> {
        let resolve_all = |filters: &std::collections::BTreeMap<String, String>| {
            filters
                .iter()
                .map(|(field, pattern)| -> Result<(usize, Regex), DiffError> {
                    let col = source.schema.position(field).ok_or_else(|| {
                        DiffError::UnknownFilterField {
                            side,
                            field: field.clone(),
                        }
                    })?;
                    Ok((col, compile_pattern(field, pattern)?))
                })
                .collect::<Result<Vec<_>, _>>()
        };

        Ok(RowFilter {
            include: resolve_all(&config.include)?,
            exclude: resolve_all(&config.exclude)?,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.include.is_empty() && self.exclude.is_empty()
    }

    pub fn accepts(&self, row: &Row) -> bool {
        let value = |col: usize| row.get(col).unwrap_or("");
        self.include.iter().all(|(col, re)| re.is_match(value(*col)))
            && !self.exclude.iter().any(|(col, re)| re.is_match(value(*col)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexedRow<'a> {
    pub row: &'a Row,
    pub sibling_position: usize,
}

impl IndexedRow<'_> {
    pub fn snapshot(&self) -> RecordRow {
        RecordRow {
            line: self.row.line,
            sibling_position: self.sibling_position,
            values: self.row.values.clone(),
        }
    }
}

#[derive(Debug, Default)]
pub struct RowIndex<'a> {
    rows: FxHashMap<CompositeKey, IndexedRow<'a>>,
    order: Vec<CompositeKey>,
    groups: FxHashMap<ParentKey, Vec<CompositeKey>>,
    group_order: Vec<ParentKey>,
    warnings: Vec<String>,
}

#[derive(Debug)]
struct Slot<'a> {
    row: &'a Row,
    order_slot: usize,
    group_slot: usize,
}

impl<'a> RowIndex<'a> {
    pub fn build(
        source: &'a Source,
        side: Side,
        spec: &KeySpec,
        filter: &RowFilter,
        norm: &Normalization,
    ) -> RowIndex<'a> {
        let width = source.schema.len();
        let mut warnings = Vec::new();
        let mut live: FxHashMap<CompositeKey, Slot<'a>> = FxHashMap::default();
        let mut order: Vec<Option<CompositeKey>> = Vec::with_capacity(source.rows.len());
        let mut groups: FxHashMap<ParentKey, Vec<Option<CompositeKey>>> = FxHashMap::default();
        let mut group_order: Vec<ParentKey> = Vec::new();
        let mut filtered = 0usize;

        for row in &source.rows {
            if row.values.len() != width {
                push_warning(
                    &mut warnings,
                    format!(
                        "Row at line {} of {} source has {} fields, expected {}; row skipped",
                        row.line,
                        side,
                        row.values.len(),
                        width
                    ),
                );
                continue;
            }

            if !filter.accepts(row) {
                filtered += 1;
                continue;
            }

            let key = spec.key(row, norm);
            let parent = key.parent();

            if let Some(previous) = live.remove(&key) {
                push_warning(
                    &mut warnings,
                    format!(
                        "Duplicate key '{}' in {} source: line {} replaces line {}",
                        key, side, row.line, previous.row.line
                    ),
                );
                order[previous.order_slot] = None;
                if let Some(siblings) = groups.get_mut(&parent) {
                    siblings[previous.group_slot] = None;
                }
            }

            let siblings = groups.entry(parent.clone()).or_insert_with(|| {
                group_order.push(parent);
                Vec::new()
            });
            let slot = Slot {
                row,
                order_slot: order.len(),
                group_slot: siblings.len(),
            };
            siblings.push(Some(key.clone()));
            order.push(Some(key.clone()));
            live.insert(key, slot);
        }

        let groups: FxHashMap<ParentKey, Vec<CompositeKey>> = groups
            .into_iter()
            .map(|(parent, siblings)| (parent, siblings.into_iter().flatten().collect()))
            .collect();

        let mut rows = FxHashMap::default();
        rows.reserve(live.len());
        for siblings in groups.values() {
            for (position, key) in siblings.iter().enumerate() {
                if let Some(slot) = live.get(key) {
                    rows.insert(
                        key.clone(),
                        IndexedRow {
                            row: slot.row,
                            sibling_position: position,
                        },
                    );
                }
            }
        }

        debug!(
            side = %side,
            source = %source.label,
            rows = source.rows.len(),
            indexed = rows.len(),
            filtered,
            groups = group_order.len(),
            warnings = warnings.len(),
            "indexed source"
        );

        RowIndex {
            rows,
            order: order.into_iter().flatten().collect(),
            groups,
            group_order,
            warnings,
        }
    }

    pub fn get(&self, key: &CompositeKey) -> Option<&IndexedRow<'a>> {
        self.rows.get(key)
    }

    pub fn contains(&self, key: &CompositeKey) -> bool {
        self.rows.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Indexed keys in input order.
    pub fn keys(&self) -> impl Iterator<Item = &CompositeKey> {
        self.order.iter()
    }

    /// Parent groups in order of first appearance.
    pub fn parents(&self) -> impl Iterator<Item = &ParentKey> {
        self.group_order.iter()
    }

    pub fn siblings(&self, parent: &ParentKey) -> &[CompositeKey] {
        self.groups.get(parent).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn take_warnings(&mut self) -> Vec<String> {
        std::mem::take(&mut self.warnings)
    }
}

fn push_warning(warnings: &mut Vec<String>, warning: String) {
    warn!("{}", warning);
    warnings.push(warning);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::KeySchema;

    fn source(rows: Vec<Vec<&str>>) -> Source {
        Source::from_rows(
            "test",
            &["parent", "child", "val"],
            rows,
            KeySchema::new(["parent", "child"]),
        )
    }

    fn build<'a>(source: &'a Source, config: &DiffConfig) -> RowIndex<'a> {
        let spec = KeySpec::resolve(&source.key_schema, &source.schema, Side::Left)
            .expect("resolve key");
        let filter = RowFilter::resolve(config, source, Side::Left).expect("resolve filter");
        let norm = Normalization {
            case_sensitive: config.case_sensitive,
            trim_whitespace: config.trim_whitespace,
        };
        RowIndex::build(source, Side::Left, &spec, &filter, &norm)
    }

    fn key(parts: &[&str]) -> CompositeKey {
        CompositeKey::new(parts.iter().map(|p| p.to_string()).collect())
    }

    #[test]
    fn sibling_positions_are_per_parent() {
        let src = source(vec![
            vec!["A", "1", "x"],
            vec!["B", "1", "y"],
            vec!["A", "2", "z"],
        ]);
        let index = build(&src, &DiffConfig::default());

        assert_eq!(index.len(), 3);
        assert_eq!(index.get(&key(&["A", "1"])).unwrap().sibling_position, 0);
        assert_eq!(index.get(&key(&["A", "2"])).unwrap().sibling_position, 1);
        assert_eq!(index.get(&key(&["B", "1"])).unwrap().sibling_position, 0);

        let parents: Vec<String> = index.parents().map(|p| p.to_string()).collect();
        assert_eq!(parents, vec!["A", "B"]);
        assert!(index.warnings().is_empty());
    }

    #[test]
    fn duplicate_key_last_row_wins_with_warning() {
        let src = source(vec![
            vec!["A", "1", "first"],
            vec!["A", "2", "y"],
            vec!["A", "1", "second"],
        ]);
        let index = build(&src, &DiffConfig::default());

        assert_eq!(index.len(), 2);
        let winner = index.get(&key(&["A", "1"])).unwrap();
        assert_eq!(winner.row.get(2), Some("second"));
        assert_eq!(winner.row.line, 4);
        // The replaced row gives up its slot; the winner sits where it was read.
        assert_eq!(winner.sibling_position, 1);
        assert_eq!(index.get(&key(&["A", "2"])).unwrap().sibling_position, 0);

        let keys: Vec<String> = index.keys().map(|k| k.to_string()).collect();
        assert_eq!(keys, vec!["A~2", "A~1"]);

        assert_eq!(index.warnings().len(), 1);
        assert!(index.warnings()[0].contains("Duplicate key 'A~1'"));
        assert!(index.warnings()[0].contains("line 4 replaces line 2"));
    }

    #[test]
    fn short_rows_are_skipped_with_warning() {
        let src = source(vec![vec!["A", "1", "x"], vec!["A", "2"], vec!["A", "3", "z"]]);
        let index = build(&src, &DiffConfig::default());

        assert_eq!(index.len(), 2);
        assert!(!index.contains(&key(&["A", "2"])));
        assert_eq!(index.get(&key(&["A", "3"])).unwrap().sibling_position, 1);
        assert_eq!(index.warnings().len(), 1);
        assert!(index.warnings()[0].contains("line 3"));
        assert!(index.warnings()[0].contains("has 2 fields, expected 3"));
    }

    #[test]
    fn filtered_rows_take_no_sibling_position() {
        let src = source(vec![
            vec!["A", "1", "keep"],
            vec!["A", "2", "drop"],
            vec!["A", "3", "keep"],
        ]);
        let config = DiffConfig::builder()
            .exclude("val", "^drop$")
            .build()
            .expect("valid config");
        let index = build(&src, &config);

        assert_eq!(index.len(), 2);
        assert_eq!(index.get(&key(&["A", "3"])).unwrap().sibling_position, 1);
        assert!(index.warnings().is_empty());
    }

    #[test]
    fn include_filter_requires_every_pattern() {
        let src = source(vec![vec!["A", "1", "x"], vec!["B", "1", "x"], vec!["A", "2", "y"]]);
        let config = DiffConfig::builder()
            .include("parent", "^A$")
            .include("val", "x")
            .build()
            .expect("valid config");
        let index = build(&src, &config);

        let keys: Vec<String> = index.keys().map(|k| k.to_string()).collect();
        assert_eq!(keys, vec!["A~1"]);
    }

    #[test]
    fn unknown_filter_field_is_fatal() {
        let src = source(vec![vec!["A", "1", "x"]]);
        let config = DiffConfig::builder()
            .include("missing", ".*")
            .build()
            .expect("valid config");
        let err = RowFilter::resolve(&config, &src, Side::Right).expect_err("unknown field");
        assert!(matches!(err, DiffError::UnknownFilterField { side: Side::Right, .. }));
    }
}
