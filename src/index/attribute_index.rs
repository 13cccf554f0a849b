//! Ordered value index for a single node attribute
//!
//! Keys are stored lower-cased; each key maps to the ordered set of nodes
//! currently holding that value.

use crate::graph::NodeId;
use std::collections::{BTreeMap, BTreeSet};

/// Index for one attribute (skill, sector or location)
#[derive(Debug, Clone, Default)]
pub struct AttributeIndex {
    /// lower-cased value -> set of NodeIds
    index: BTreeMap<String, BTreeSet<NodeId>>,
}

/// Normalised index key
pub fn index_key(value: &str) -> String {
    value.to_lowercase()
}

impl AttributeIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, value: &str, node_id: NodeId) {
        self.index.entry(index_key(value)).or_default().insert(node_id);
    }

    pub fn remove(&mut self, value: &str, node_id: &NodeId) {
        let key = index_key(value);
        if let Some(nodes) = self.index.get_mut(&key) {
            nodes.remove(node_id);
            if nodes.is_empty() {
                self.index.remove(&key);
            }
        }
    }

    /// Exact (case-insensitive) lookup
    pub fn get(&self, value: &str) -> Option<&BTreeSet<NodeId>> {
        self.index.get(&index_key(value))
    }

    pub fn contains(&self, value: &str, node_id: &NodeId) -> bool {
        self.get(value).is_some_and(|nodes| nodes.contains(node_id))
    }

    /// Union of every bucket whose key contains `fragment` (case-insensitive).
    /// Scans the keys rather than doing an exact lookup.
    pub fn containing(&self, fragment: &str) -> BTreeSet<NodeId> {
        let fragment = index_key(fragment);
        self.index
            .iter()
            .filter(|(key, _)| key.contains(&fragment))
            .flat_map(|(_, nodes)| nodes.iter().cloned())
            .collect()
    }

    /// Union of the buckets for each of `values`
    pub fn any_of<'a, I>(&self, values: I) -> BTreeSet<NodeId>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut result = BTreeSet::new();
        for value in values {
            if let Some(nodes) = self.get(value) {
                result.extend(nodes.iter().cloned());
            }
        }
        result
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.index.keys().map(String::as_str)
    }

    /// Number of distinct values
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn clear(&mut self) {
        self.index.clear();
    }
}
