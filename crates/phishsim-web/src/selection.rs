//! Set-based multi-select

use serde::Serialize;
use std::collections::BTreeSet;

/// Members chosen by identity. Ordered so the submitted list is stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Selection<K: Ord> {
    members: BTreeSet<K>,
}

impl<K: Ord + Clone> Selection<K> {
    /// Empty selection
    pub fn new() -> Self {
        Self {
            members: BTreeSet::new(),
        }
    }

    /// Selection containing every given id
    pub fn all_of(ids: impl IntoIterator<Item = K>) -> Self {
        Self {
            members: ids.into_iter().collect(),
        }
    }

    /// Flip membership of `id`; returns whether it is now selected
    pub fn toggle(&mut self, id: K) -> bool {
        if self.members.remove(&id) {
            false
        } else {
            self.members.insert(id);
            true
        }
    }

    pub fn contains(&self, id: &K) -> bool {
        self.members.contains(id)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Drop members that no longer satisfy `keep`
    pub fn retain(&mut self, keep: impl FnMut(&K) -> bool) {
        self.members.retain(keep);
    }

    /// Confirmation needs at least one member
    pub fn can_confirm(&self) -> bool {
        !self.is_empty()
    }

    /// Selected ids in ascending order
    pub fn ids(&self) -> Vec<K> {
        self.members.iter().cloned().collect()
    }
}
