//! Configuration for the diff engine.
//!
//! `DiffConfig` carries every option the engine consumes once key fields and
//! field names have been resolved by the caller: the ignore list for compared
//! fields, the four action suppression flags, value normalisation, row filters
//! and the move detection strategy.

use std::collections::BTreeMap;
use std::fmt;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::diff::Action;
use crate::error_codes;

/// Selects a field either by name or by its position in the right-hand schema.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldSelector {
    Index(usize),
    Name(String),
}

impl FieldSelector {
    /// Parses a command line style selector: all-digit text is an index,
    /// anything else a field name.
    pub fn parse(text: &str) -> FieldSelector {
        let trimmed = text.trim();
        match trimmed.parse::<usize>() {
            Ok(idx) => FieldSelector::Index(idx),
            Err(_) => FieldSelector::Name(trimmed.to_string()),
        }
    }
}

impl From<&str> for FieldSelector {
    fn from(name: &str) -> Self {
        FieldSelector::Name(name.to_string())
    }
}

impl From<usize> for FieldSelector {
    fn from(idx: usize) -> Self {
        FieldSelector::Index(idx)
    }
}

impl fmt::Display for FieldSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldSelector::Index(idx) => write!(f, "#{idx}"),
            FieldSelector::Name(name) => f.write_str(name),
        }
    }
}

/// How sibling re-ordering is turned into `Move` records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveDetection {
    /// A key moved when its rank among the siblings common to both sides changed.
    #[default]
    Rank,
    /// Only keys outside the longest order-preserving run of common siblings moved.
    Minimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffConfig {
    pub ignore_fields: Vec<FieldSelector>,
    pub ignore_adds: bool,
    pub ignore_deletes: bool,
    pub ignore_updates: bool,
    pub ignore_moves: bool,
    #[serde(alias = "case_sensitive_compare")]
    pub case_sensitive: bool,
    #[serde(alias = "trim")]
    pub trim_whitespace: bool,
    /// Field name -> pattern; a row is kept only if every pattern matches.
    pub include: BTreeMap<String, String>,
    /// Field name -> pattern; a row is dropped if any pattern matches.
    pub exclude: BTreeMap<String, String>,
    pub move_detection: MoveDetection,
}

impl Default for DiffConfig {
    fn default() -> Self {
        Self {
            ignore_fields: Vec::new(),
            ignore_adds: false,
            ignore_deletes: false,
            ignore_updates: false,
            ignore_moves: false,
            case_sensitive: true,
            trim_whitespace: false,
            include: BTreeMap::new(),
            exclude: BTreeMap::new(),
            move_detection: MoveDetection::Rank,
        }
    }
}

impl DiffConfig {
    pub fn builder() -> DiffConfigBuilder {
        DiffConfigBuilder {
            inner: DiffConfig::default(),
        }
    }

    /// Whether records classified as `action` are removed from the final diff set.
    pub fn is_suppressed(&self, action: Action) -> bool {
        match action {
            Action::Add => self.ignore_adds,
            Action::Delete => self.ignore_deletes,
            Action::Update => self.ignore_updates,
            Action::Move => self.ignore_moves,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for selector in &self.ignore_fields {
            if let FieldSelector::Name(name) = selector {
                ensure_field_name(name, "ignore_fields")?;
            }
        }

        for (option, filters) in [("include", &self.include), ("exclude", &self.exclude)] {
            for (field, pattern) in filters {
                ensure_field_name(field, option)?;
                compile_pattern(field, pattern)?;
            }
        }

        Ok(())
    }
}

pub(crate) fn compile_pattern(field: &str, pattern: &str) -> Result<Regex, ConfigError> {
    Regex::new(pattern).map_err(|e| ConfigError::InvalidPattern {
        field: field.to_string(),
        message: e.to_string(),
    })
}

fn ensure_field_name(name: &str, option: &'static str) -> Result<(), ConfigError> {
    if name.trim().is_empty() {
        return Err(ConfigError::EmptyFieldName { option });
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("[TDIFF_CONFIG_001] filter pattern for field '{field}' is invalid: {message}. Suggestion: check the regular expression syntax.")]
    InvalidPattern { field: String, message: String },
    #[error("[TDIFF_CONFIG_002] `{option}` contains an empty field name. Suggestion: remove the empty entry.")]
    EmptyFieldName { option: &'static str },
}

impl ConfigError {
    pub fn code(&self) -> &'static str {
        match self {
            ConfigError::InvalidPattern { .. } => error_codes::CONFIG_INVALID_PATTERN,
            ConfigError::EmptyFieldName { .. } => error_codes::CONFIG_EMPTY_FIELD_NAME,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DiffConfigBuilder {
    inner: DiffConfig,
}

impl Default for DiffConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DiffConfigBuilder {
    pub fn new() -> Self {
        DiffConfig::builder()
    }

    pub fn ignore_field(mut self, selector: impl Into<FieldSelector>) -> Self {
        self.inner.ignore_fields.push(selector.into());
        self
    }

    pub fn ignore_fields<I, S>(mut self, selectors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<FieldSelector>,
    {
        self.inner
            .ignore_fields
            .extend(selectors.into_iter().map(Into::into));
        self
    }

    pub fn ignore_adds(mut self, value: bool) -> Self {
        self.inner.ignore_adds = value;
        self
    }

    pub fn ignore_deletes(mut self, value: bool) -> Self {
        self.inner.ignore_deletes = value;
        self
    }

    pub fn ignore_updates(mut self, value: bool) -> Self {
        self.inner.ignore_updates = value;
        self
    }

    pub fn ignore_moves(mut self, value: bool) -> Self {
        self.inner.ignore_moves = value;
        self
    }

    pub fn case_sensitive(mut self, value: bool) -> Self {
        self.inner.case_sensitive = value;
        self
    }

    pub fn trim_whitespace(mut self, value: bool) -> Self {
        self.inner.trim_whitespace = value;
        self
    }

    pub fn include(mut self, field: impl Into<String>, pattern: impl Into<String>) -> Self {
        self.inner.include.insert(field.into(), pattern.into());
        self
    }

    pub fn exclude(mut self, field: impl Into<String>, pattern: impl Into<String>) -> Self {
        self.inner.exclude.insert(field.into(), pattern.into());
        self
    }

    pub fn move_detection(mut self, value: MoveDetection) -> Self {
        self.inner.move_detection = value;
        self
    }

    pub fn build(self) -> Result<DiffConfig, ConfigError> {
        self.inner.validate()?;
        Ok(self.inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_compare_everything() {
        let cfg = DiffConfig::default();
        assert!(cfg.ignore_fields.is_empty());
        assert!(cfg.case_sensitive);
        assert!(!cfg.trim_whitespace);
        assert_eq!(cfg.move_detection, MoveDetection::Rank);
        for action in Action::ALL {
            assert!(!cfg.is_suppressed(action));
        }
    }

    #[test]
    fn serde_roundtrip_preserves_defaults() {
        let cfg = DiffConfig::default();
        let json = serde_json::to_string(&cfg).expect("serialize default config");
        let parsed: DiffConfig = serde_json::from_str(&json).expect("deserialize default config");
        assert_eq!(cfg, parsed);
    }

    #[test]
    fn selectors_deserialize_as_names_or_indices() {
        let json = r#"{ "ignore_fields": ["Comment", 3], "trim": true }"#;
        let cfg: DiffConfig = serde_json::from_str(json).expect("deserialize selectors");
        assert_eq!(
            cfg.ignore_fields,
            vec![FieldSelector::Name("Comment".into()), FieldSelector::Index(3)]
        );
        assert!(cfg.trim_whitespace);
    }

    #[test]
    fn selector_parse_distinguishes_indices() {
        assert_eq!(FieldSelector::parse("2"), FieldSelector::Index(2));
        assert_eq!(
            FieldSelector::parse(" Notes "),
            FieldSelector::Name("Notes".into())
        );
    }

    #[test]
    fn suppression_flags_map_to_actions() {
        let cfg = DiffConfig::builder()
            .ignore_moves(true)
            .ignore_adds(true)
            .build()
            .expect("valid config");
        assert!(cfg.is_suppressed(Action::Move));
        assert!(cfg.is_suppressed(Action::Add));
        assert!(!cfg.is_suppressed(Action::Delete));
        assert!(!cfg.is_suppressed(Action::Update));
    }

    #[test]
    fn builder_rejects_invalid_pattern() {
        let err = DiffConfig::builder()
            .include("Type", "(unclosed")
            .build()
            .expect_err("builder should reject invalid regex");
        assert!(matches!(err, ConfigError::InvalidPattern { ref field, .. } if field == "Type"));
        assert_eq!(err.code(), error_codes::CONFIG_INVALID_PATTERN);
    }

    #[test]
    fn builder_rejects_empty_ignore_name() {
        let err = DiffConfig::builder()
            .ignore_field(" ")
            .build()
            .expect_err("empty names are rejected");
        assert_eq!(
            err,
            ConfigError::EmptyFieldName {
                option: "ignore_fields"
            }
        );
    }
}
