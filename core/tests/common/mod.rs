//! Common test utilities shared across integration tests.

#![allow(dead_code)]

use tree_diff::{DiffConfig, DiffOutcome, KeySchema, Source, TreeDiff};

pub const TREE_FIELDS: &[&str] = &["parent", "child", "val"];

pub fn tree_keys() -> KeySchema {
    KeySchema::from_parent_child(["parent"], "child")
}

pub fn tree_source(label: &str, rows: &[&[&str]]) -> Source {
    source_with_fields(label, TREE_FIELDS, rows, tree_keys())
}

pub fn source_with_fields(
    label: &str,
    fields: &[&str],
    rows: &[&[&str]],
    keys: KeySchema,
) -> Source {
    Source::from_rows(label, fields, rows.iter().map(|r| r.to_vec()), keys)
}

pub fn diff(left: Source, right: Source, config: &DiffConfig) -> DiffOutcome {
    TreeDiff::new(left, right)
        .diff(config)
        .unwrap_or_else(|e| panic!("diff failed: {e}"))
}

pub fn keys_of(records: &[&tree_diff::DiffRecord]) -> Vec<String> {
    let mut keys: Vec<String> = records.iter().map(|r| r.key.to_string()).collect();
    keys.sort();
    keys
}
