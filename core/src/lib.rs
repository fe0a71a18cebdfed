//! Tree Diff: keyed structural diff for hierarchical tabular data.
//!
//! Rows exported from a tree (parent fields followed by a child field, in
//! depth-first order) are matched across two versions by composite key. The
//! crate provides:
//! - Row indexing by composite key with per-parent sibling positions
//! - Field-level change detection over the fields both sides share
//! - Sibling re-order detection that ignores unrelated adds and deletes
//! - Per-action filtered views, summaries and JSON serialization
//!
//! # Quick Start
//!
//! ```
//! use tree_diff::{Action, DiffConfig, KeySchema, Source, TreeDiff};
//!
//! let keys = KeySchema::from_parent_child(["parent"], "child");
//! let left = Source::from_rows(
//!     "left",
//!     &["parent", "child", "val"],
//!     vec![vec!["A", "1", "x"], vec!["A", "2", "y"]],
//!     keys.clone(),
//! );
//! let right = Source::from_rows(
//!     "right",
//!     &["parent", "child", "val"],
//!     vec![vec!["A", "2", "y"], vec!["A", "1", "x"]],
//!     keys,
//! );
//!
//! let outcome = TreeDiff::new(left, right).diff(&DiffConfig::default())?;
//! assert_eq!(outcome.summary().count(Action::Move), 2);
//! # Ok::<(), tree_diff::DiffError>(())
//! ```

mod config;
mod diff;
mod diff_set;
mod engine;
mod error_codes;
mod field_set;
mod index;
mod key;
mod matcher;
mod output;
mod session;
mod sibling_order;
mod source;
mod summary;

pub use config::{ConfigError, DiffConfig, DiffConfigBuilder, FieldSelector, MoveDetection};
pub use diff::{
    Action, DiffError, DiffRecord, FieldChange, ParseActionError, PositionChange, RecordRow,
};
pub use diff_set::DiffSet;
pub use engine::diff_sources;
pub use field_set::{DiffField, FieldSet, resolve_diffable_fields};
pub use index::{IndexedRow, RowFilter, RowIndex};
pub use key::{CompositeKey, KeySchema, KeySpec, Normalization, ParentKey};
pub use matcher::{apply_suppression, classify, compare_fields, match_rows};
pub use output::json::{
    OUTPUT_SCHEMA_VERSION, OutcomeEnvelope, serialize_outcome, serialize_outcome_pretty,
};
pub use session::{DiffOutcome, TreeDiff};
pub use sibling_order::moved_keys;
pub use source::{FieldSchema, Row, Side, Source};
pub use summary::DiffSummary;
