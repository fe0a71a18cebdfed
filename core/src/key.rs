//! Composite and parent-group keys.
//!
//! A [`KeySchema`] names the key fields of a source: every field but the last
//! identifies the parent context, the last one the child within it. A
//! [`KeySpec`] is that schema resolved to field positions for one source, and
//! builds [`CompositeKey`]s and [`ParentKey`]s from rows.

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::diff::DiffError;
use crate::source::{FieldSchema, Row, Side};

const KEY_SEPARATOR: &str = "~";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeySchema {
    fields: Vec<String>,
}

impl KeySchema {
    pub fn new<I, S>(fields: I) -> KeySchema
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        KeySchema {
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    pub fn from_parent_child<I, S>(parents: I, child: impl Into<String>) -> KeySchema
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut fields: Vec<String> = parents.into_iter().map(Into::into).collect();
        fields.push(child.into());
        KeySchema { fields }
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn parent_fields(&self) -> &[String] {
        match self.fields.split_last() {
            Some((_, parents)) => parents,
            None => &[],
        }
    }

    pub fn child_field(&self) -> Option<&str> {
        self.fields.last().map(String::as_str)
    }
}

/// Key identity of a row within one source: the key field values in schema order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompositeKey(Vec<String>);

impl CompositeKey {
    pub fn new(components: Vec<String>) -> CompositeKey {
        CompositeKey(components)
    }

    pub fn components(&self) -> &[String] {
        &self.0
    }

    /// The parent-group prefix of this key.
    pub fn parent(&self) -> ParentKey {
        match self.0.split_last() {
            Some((_, parents)) => ParentKey(parents.to_vec()),
            None => ParentKey(Vec::new()),
        }
    }
}

impl fmt::Display for CompositeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(KEY_SEPARATOR))
    }
}

/// Key of a sibling group: the composite key without its child component.
/// Child-only key schemas put every row in the single empty group.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParentKey(Vec<String>);

impl ParentKey {
    pub fn components(&self) -> &[String] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ParentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(KEY_SEPARATOR))
    }
}

/// Value folding applied before keys are built and fields compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Normalization {
    pub case_sensitive: bool,
    pub trim_whitespace: bool,
}

impl Default for Normalization {
    fn default() -> Self {
        Normalization {
            case_sensitive: true,
            trim_whitespace: false,
        }
    }
}

impl Normalization {
    pub fn apply<'a>(&self, value: &'a str) -> Cow<'a, str> {
        let value = if self.trim_whitespace {
            value.trim()
        } else {
            value
        };
        if self.case_sensitive {
            Cow::Borrowed(value)
        } else {
            Cow::Owned(value.to_lowercase())
        }
    }

    pub fn values_equal(&self, a: &str, b: &str) -> bool {
        a == b || self.apply(a) == self.apply(b)
    }
}

/// A [`KeySchema`] resolved against one source's [`FieldSchema`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeySpec {
    columns: Vec<usize>,
}

impl KeySpec {
    /// Resolves key field names to positions. A key field missing from the
    /// schema means the configuration itself is wrong, so it is fatal.
    pub fn resolve(
        key_schema: &KeySchema,
        schema: &FieldSchema,
        side: Side,
    ) -> Result<KeySpec, DiffError> {
        if key_schema.is_empty() {
            return Err(DiffError::EmptyKeySchema { side });
        }

        let columns = key_schema
            .fields()
            .iter()
            .map(|field| {
                schema
                    .position(field)
                    .ok_or_else(|| DiffError::MissingKeyField {
                        side,
                        field: field.clone(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(KeySpec { columns })
    }

    pub fn columns(&self) -> &[usize] {
        &self.columns
    }

    pub fn is_key_column(&self, col: usize) -> bool {
        self.columns.contains(&col)
    }

    /// Callers must have checked the row width against the schema.
    pub fn key(&self, row: &Row, norm: &Normalization) -> CompositeKey {
        CompositeKey(self.extract(&self.columns, row, norm))
    }

    pub fn parent_key(&self, row: &Row, norm: &Normalization) -> ParentKey {
        let parents = &self.columns[..self.columns.len().saturating_sub(1)];
        ParentKey(self.extract(parents, row, norm))
    }

    fn extract(&self, columns: &[usize], row: &Row, norm: &Normalization) -> Vec<String> {
        columns
            .iter()
            .map(|&col| norm.apply(row.get(col).unwrap_or("")).into_owned())
            .collect()
    }
}
