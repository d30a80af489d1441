//! Append-only secondary index.

use std::collections::{HashMap, HashSet};

use parking_lot::RwLock;

/// Group name to the keys recorded under it, in insertion order.
#[derive(Debug, Default)]
pub(crate) struct KeyLog {
    groups: RwLock<HashMap<String, Vec<String>>>,
}

impl KeyLog {
    pub(crate) fn append(&self, group: &str, key: String) {
        self.groups
            .write()
            .entry(group.to_string())
            .or_default()
            .push(key);
    }

    /// Distinct keys logged under `group`, newest first.
    pub(crate) fn keys_newest_first(&self, group: &str) -> Vec<String> {
        let groups = self.groups.read();
        let Some(keys) = groups.get(group) else {
            return Vec::new();
        };
        let mut seen = HashSet::new();
        keys.iter()
            .rev()
            .filter(|key| seen.insert(key.as_str()))
            .cloned()
            .collect()
    }

    /// Total logged keys, duplicates and evicted keys included.
    pub(crate) fn len(&self) -> usize {
        self.groups.read().values().map(Vec::len).sum()
    }
}
