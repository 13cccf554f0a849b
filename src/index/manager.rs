//! Manager for the attribute indices
//!
//! Owns the by-type, by-skill, by-sector and by-location indices and keeps
//! them in step with node records. Every change is expressed as a delta
//! between two [`IndexedAttributes`] snapshots, so add, update and remove
//! all share one code path.

use super::attribute_index::{index_key, AttributeIndex};
use crate::graph::{Node, NodeId, NodeType};
use std::collections::{BTreeSet, HashMap};

/// The indexed attribute values of one node, already normalised
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexedAttributes {
    pub skills: BTreeSet<String>,
    pub sector: Option<String>,
    pub location: Option<String>,
}

impl IndexedAttributes {
    pub fn of(node: &Node) -> Self {
        IndexedAttributes {
            skills: node
                .skills()
                .iter()
                .filter(|s| !s.is_empty())
                .map(|s| index_key(s))
                .collect(),
            sector: node.sector().filter(|s| !s.is_empty()).map(index_key),
            location: node.location().filter(|s| !s.is_empty()).map(index_key),
        }
    }
}

/// All attribute indices of a graph store
#[derive(Debug, Default)]
pub struct IndexManager {
    by_type: HashMap<NodeType, BTreeSet<NodeId>>,
    by_skill: AttributeIndex,
    by_sector: AttributeIndex,
    by_location: AttributeIndex,
}

impl IndexManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a node that was just inserted
    pub fn index_node(&mut self, node: &Node) {
        self.by_type.entry(node.node_type()).or_default().insert(node.id.clone());
        self.apply_delta(&node.id, &IndexedAttributes::default(), &IndexedAttributes::of(node));
    }

    /// Drop every entry held for a node that is being removed
    pub fn unindex_node(&mut self, node: &Node) {
        let node_type = node.node_type();
        if let Some(ids) = self.by_type.get_mut(&node_type) {
            ids.remove(&node.id);
            if ids.is_empty() {
                self.by_type.remove(&node_type);
            }
        }
        self.apply_delta(&node.id, &IndexedAttributes::of(node), &IndexedAttributes::default());
    }

    /// Apply only the difference between the old and new attribute values.
    pub fn apply_delta(&mut self, node_id: &NodeId, old: &IndexedAttributes, new: &IndexedAttributes) {
        for skill in old.skills.difference(&new.skills) {
            self.by_skill.remove(skill, node_id);
        }
        for skill in new.skills.difference(&old.skills) {
            self.by_skill.insert(skill, node_id.clone());
        }

        if old.sector != new.sector {
            if let Some(sector) = &old.sector {
                self.by_sector.remove(sector, node_id);
            }
            if let Some(sector) = &new.sector {
                self.by_sector.insert(sector, node_id.clone());
            }
        }

        if old.location != new.location {
            if let Some(location) = &old.location {
                self.by_location.remove(location, node_id);
            }
            if let Some(location) = &new.location {
                self.by_location.insert(location, node_id.clone());
            }
        }
    }

    /// Ordered ids of every node with the given type
    pub fn nodes_of_type(&self, node_type: NodeType) -> impl Iterator<Item = &NodeId> {
        self.by_type.get(&node_type).into_iter().flatten()
    }

    pub fn type_count(&self, node_type: NodeType) -> usize {
        self.by_type.get(&node_type).map_or(0, BTreeSet::len)
    }

    pub fn by_skill(&self) -> &AttributeIndex {
        &self.by_skill
    }

    pub fn by_sector(&self) -> &AttributeIndex {
        &self.by_sector
    }

    pub fn by_location(&self) -> &AttributeIndex {
        &self.by_location
    }

    pub fn clear(&mut self) {
        self.by_type.clear();
        self.by_skill.clear();
        self.by_sector.clear();
        self.by_location.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{IndividualAttrs, NodePayload};

    fn individual(id: &str, skills: &[&str], sector: &str, location: &str) -> Node {
        let mut attrs = IndividualAttrs::with_skills(skills.iter().copied());
        attrs.sector = Some(sector.to_string());
        attrs.location = Some(location.to_string());
        Node::new(id, id, NodePayload::Individual(attrs))
    }

    #[test]
    fn test_index_and_unindex() {
        let mut manager = IndexManager::new();
        let node = individual("ada", &["Rust", "Go"], "Fintech", "Berlin");
        manager.index_node(&node);

        assert_eq!(manager.type_count(NodeType::Individual), 1);
        assert!(manager.by_skill().contains("rust", &node.id));
        assert!(manager.by_sector().contains("FINTECH", &node.id));
        assert!(manager.by_location().contains("berlin", &node.id));

        manager.unindex_node(&node);
        assert_eq!(manager.type_count(NodeType::Individual), 0);
        assert!(manager.by_skill().is_empty());
        assert!(manager.by_sector().is_empty());
        assert!(manager.by_location().is_empty());
    }

    #[test]
    fn test_apply_delta_touches_only_changes() {
        let mut manager = IndexManager::new();
        let before = individual("ada", &["Rust", "Go"], "Fintech", "Berlin");
        manager.index_node(&before);

        let after = individual("ada", &["Go", "SQL"], "Fintech", "Paris");
        manager.apply_delta(&before.id, &IndexedAttributes::of(&before), &IndexedAttributes::of(&after));

        assert!(!manager.by_skill().contains("rust", &before.id));
        assert!(manager.by_skill().contains("go", &before.id));
        assert!(manager.by_skill().contains("sql", &before.id));
        assert!(manager.by_sector().contains("fintech", &before.id));
        assert!(manager.by_location().get("berlin").is_none());
        assert!(manager.by_location().contains("paris", &before.id));
    }

    #[test]
    fn test_case_variants_collapse() {
        let node = individual("lin", &["Go", "go", ""], "", "Oslo");
        let attrs = IndexedAttributes::of(&node);
        assert_eq!(attrs.skills.len(), 1);
        assert_eq!(attrs.sector, None);
        assert_eq!(attrs.location.as_deref(), Some("oslo"));
    }
}
