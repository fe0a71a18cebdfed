use rustc_hash::FxHashMap;
use serde::{Serialize, Serializer};

use crate::diff::{Action, DiffRecord, ParseActionError};
use crate::key::CompositeKey;

/// Classified records keyed by composite key, in deterministic traversal order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffSet {
    records: Vec<DiffRecord>,
    lookup: FxHashMap<CompositeKey, usize>,
}

impl DiffSet {
    pub fn new(records: Vec<DiffRecord>) -> DiffSet {
        let lookup = records
            .iter()
            .enumerate()
            .map(|(idx, record)| (record.key.clone(), idx))
            .collect();
        DiffSet { records, lookup }
    }

    pub fn get(&self, key: &CompositeKey) -> Option<&DiffRecord> {
        self.lookup.get(key).map(|&idx| &self.records[idx])
    }

    pub fn contains_key(&self, key: &CompositeKey) -> bool {
        self.lookup.contains_key(key)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DiffRecord> {
        self.records.iter()
    }

    pub fn records(&self) -> &[DiffRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn filter_by_action(&self, action: Action) -> Vec<&DiffRecord> {
        self.records.iter().filter(|r| r.action == action).collect()
    }

    /// Like [`DiffSet::filter_by_action`], matching the action name without regard to case.
    pub fn filter_by_action_name(&self, name: &str) -> Result<Vec<&DiffRecord>, ParseActionError> {
        Ok(self.filter_by_action(name.parse()?))
    }

    pub fn adds(&self) -> Vec<&DiffRecord> {
        self.filter_by_action(Action::Add)
    }

    pub fn deletes(&self) -> Vec<&DiffRecord> {
        self.filter_by_action(Action::Delete)
    }

    pub fn updates(&self) -> Vec<&DiffRecord> {
        self.filter_by_action(Action::Update)
    }

    pub fn moves(&self) -> Vec<&DiffRecord> {
        self.filter_by_action(Action::Move)
    }
}

impl<'a> IntoIterator for &'a DiffSet {
    type Item = &'a DiffRecord;
    type IntoIter = std::slice::Iter<'a, DiffRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

impl Serialize for DiffSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.records.serialize(serializer)
    }
}
