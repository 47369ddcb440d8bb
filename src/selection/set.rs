//! Defines the in-memory selection set.

use std::collections::HashSet;

use crate::TransactionId;

/// The transactions the user has marked for a bulk action.
///
/// IDs keep the order they were first added in and are never duplicated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet {
    ids: Vec<TransactionId>,
    members: HashSet<TransactionId>,
    select_all: bool,
}

impl SelectionSet {
    /// Create an empty selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `id` to the selection. Returns `false` if it was already selected.
    pub fn insert(&mut self, id: TransactionId) -> bool {
        if self.members.insert(id.clone()) {
            self.ids.push(id);
            true
        } else {
            false
        }
    }

    /// Remove `id` from the selection. Returns `false` if it was not selected.
    pub fn remove(&mut self, id: &TransactionId) -> bool {
        if self.members.remove(id) {
            self.ids.retain(|selected| selected != id);
            true
        } else {
            false
        }
    }

    /// Whether `id` is selected.
    pub fn contains(&self, id: &TransactionId) -> bool {
        self.members.contains(id)
    }

    /// The number of selected transactions.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether no transactions are selected.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// The selected IDs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &TransactionId> {
        self.ids.iter()
    }

    /// Whether the user asked for every transaction matching the active
    /// filter rather than an explicit list.
    pub fn is_select_all(&self) -> bool {
        self.select_all
    }

    /// Set the "select all matching filter" flag.
    pub fn set_select_all(&mut self, select_all: bool) {
        self.select_all = select_all;
    }

    /// Remove every ID and reset the "select all" flag.
    pub fn clear(&mut self) {
        self.ids.clear();
        self.members.clear();
        self.select_all = false;
    }

    /// The selected IDs joined with commas, the format the bulk action
    /// endpoint expects.
    pub fn to_comma_separated(&self) -> String {
        self.ids
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<&str>>()
            .join(",")
    }
}

impl FromIterator<TransactionId> for SelectionSet {
    fn from_iter<T: IntoIterator<Item = TransactionId>>(iter: T) -> Self {
        let mut selection = SelectionSet::new();
        selection.extend(iter);
        selection
    }
}

impl Extend<TransactionId> for SelectionSet {
    fn extend<T: IntoIterator<Item = TransactionId>>(&mut self, iter: T) {
        for id in iter {
            self.insert(id);
        }
    }
}
