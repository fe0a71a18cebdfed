//! Diffable field set resolution.
//!
//! The fields compared for matched rows are those of the right schema that the
//! left schema also has, minus anything explicitly ignored. Right-only fields
//! are reported once as warnings; left-only fields are silently not compared.

use tracing::warn;

use crate::config::FieldSelector;
use crate::source::FieldSchema;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffField {
    pub name: String,
    pub left_idx: usize,
    pub right_idx: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldSet {
    pub fields: Vec<DiffField>,
    pub warnings: Vec<String>,
}

impl FieldSet {
    pub fn names(&self) -> Vec<String> {
        self.fields.iter().map(|f| f.name.clone()).collect()
    }
}

/// Resolves the diffable fields in right-schema order. Index selectors are
/// positions in `right`.
pub fn resolve_diffable_fields(
    left: &FieldSchema,
    right: &FieldSchema,
    ignore: &[FieldSelector],
) -> FieldSet {
    let is_ignored = |idx: usize, name: &str| {
        ignore.iter().any(|selector| match selector {
            FieldSelector::Index(i) => *i == idx,
            FieldSelector::Name(n) => n == name,
        })
    };

    let mut set = FieldSet::default();
    for (right_idx, name) in right.names().iter().enumerate() {
        if is_ignored(right_idx, name) {
            continue;
        }
        match left.position(name) {
            Some(left_idx) => set.fields.push(DiffField {
                name: name.clone(),
                left_idx,
                right_idx,
            }),
            None => {
                let warning = format!(
                    "Field '{name}' is present in the right source but not the left; it will not be compared"
                );
                warn!("{}", warning);
                set.warnings.push(warning);
            }
        }
    }
    set
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn common_fields_in_right_order() {
        let left = FieldSchema::new(["id", "name", "price"]);
        let right = FieldSchema::new(["price", "id", "name"]);
        let set = resolve_diffable_fields(&left, &right, &[]);

        assert_eq!(set.names(), vec!["price", "id", "name"]);
        assert_eq!(
            set.fields[0],
            DiffField {
                name: "price".into(),
                left_idx: 2,
                right_idx: 0
            }
        );
        assert!(set.warnings.is_empty());
    }

    #[test]
    fn right_only_field_warns_once_and_is_dropped() {
        let left = FieldSchema::new(["id", "name"]);
        let right = FieldSchema::new(["id", "name", "colour"]);
        let set = resolve_diffable_fields(&left, &right, &[]);

        assert_eq!(set.names(), vec!["id", "name"]);
        assert_eq!(set.warnings.len(), 1);
        assert!(set.warnings[0].contains("'colour'"));
    }

    #[test]
    fn left_only_field_is_silent() {
        let left = FieldSchema::new(["id", "name", "legacy"]);
        let right = FieldSchema::new(["id", "name"]);
        let set = resolve_diffable_fields(&left, &right, &[]);

        assert_eq!(set.names(), vec!["id", "name"]);
        assert!(set.warnings.is_empty());
    }

    #[test]
    fn ignored_fields_by_name_and_right_index_are_never_warned() {
        let left = FieldSchema::new(["id", "name", "price"]);
        let right = FieldSchema::new(["id", "name", "price", "audit"]);
        let ignore = vec![FieldSelector::Name("price".into()), FieldSelector::Index(3)];
        let set = resolve_diffable_fields(&left, &right, &ignore);

        assert_eq!(set.names(), vec!["id", "name"]);
        assert!(set.warnings.is_empty());
    }
}
