//! Ingested tabular sources.
//!
//! A [`Source`] is everything the engine needs from one side of the comparison:
//! the field schema, the rows in input order, the resolved key schema and any
//! warnings raised while the rows were read. Reading files is the caller's job.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::diff::DiffError;
use crate::key::KeySchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Left,
    Right,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Left => f.write_str("left"),
            Side::Right => f.write_str("right"),
        }
    }
}

/// Ordered field names of one source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldSchema {
    names: Vec<String>,
}

impl FieldSchema {
    pub fn new<I, S>(names: I) -> FieldSchema
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FieldSchema {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn name(&self, idx: usize) -> Option<&str> {
        self.names.get(idx).map(String::as_str)
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    /// Checks the schema invariants: non-empty and unique names.
    pub fn validate(&self, side: Side) -> Result<(), DiffError> {
        if self.names.is_empty() {
            return Err(DiffError::EmptyFieldSchema { side });
        }
        for (idx, name) in self.names.iter().enumerate() {
            if self.names[..idx].contains(name) {
                return Err(DiffError::DuplicateFieldName {
                    side,
                    field: name.clone(),
                });
            }
        }
        Ok(())
    }
}

/// One record of a source. `line` is the 1-based record number in the input
/// (the header, when present, is line 1).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    pub values: Vec<String>,
    pub line: usize,
}

impl Row {
    pub fn new(values: Vec<String>, line: usize) -> Row {
        Row { values, line }
    }

    pub fn get(&self, idx: usize) -> Option<&str> {
        self.values.get(idx).map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    pub label: String,
    pub schema: FieldSchema,
    pub rows: Vec<Row>,
    pub key_schema: KeySchema,
    pub warnings: Vec<String>,
}

impl Source {
    pub fn new(
        label: impl Into<String>,
        schema: FieldSchema,
        rows: Vec<Row>,
        key_schema: KeySchema,
    ) -> Source {
        Source {
            label: label.into(),
            schema,
            rows,
            key_schema,
            warnings: Vec::new(),
        }
    }

    /// Builds a source from in-memory arrays. Rows are numbered from line 2,
    /// as if `field_names` had been read from a header line.
    pub fn from_rows<I, R, S>(
        label: impl Into<String>,
        field_names: &[&str],
        rows: I,
        key_schema: KeySchema,
    ) -> Source
    where
        I: IntoIterator<Item = R>,
        R: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let rows = rows
            .into_iter()
            .enumerate()
            .map(|(idx, values)| Row::new(values.into_iter().map(Into::into).collect(), idx + 2))
            .collect();
        Source::new(label, FieldSchema::new(field_names.iter().copied()), rows, key_schema)
    }

    pub fn with_warnings(mut self, warnings: Vec<String>) -> Source {
        self.warnings.extend(warnings);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_rows_numbers_lines_after_header() {
        let source = Source::from_rows(
            "left",
            &["parent", "child"],
            vec![vec!["A", "1"], vec!["A", "2"]],
            KeySchema::new(["parent", "child"]),
        );
        assert_eq!(source.schema.len(), 2);
        assert_eq!(source.rows[0].line, 2);
        assert_eq!(source.rows[1].line, 3);
        assert_eq!(source.rows[1].get(1), Some("2"));
    }

    #[test]
    fn validate_rejects_empty_schema() {
        let schema = FieldSchema::default();
        assert!(matches!(
            schema.validate(Side::Left),
            Err(DiffError::EmptyFieldSchema { side: Side::Left })
        ));
    }

    #[test]
    fn validate_rejects_duplicate_names() {
        let schema = FieldSchema::new(["id", "name", "id"]);
        match schema.validate(Side::Right) {
            Err(DiffError::DuplicateFieldName { side, field }) => {
                assert_eq!(side, Side::Right);
                assert_eq!(field, "id");
            }
            other => panic!("expected duplicate field error, got {other:?}"),
        }
    }
}
