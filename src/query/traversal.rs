//! Bounded breadth-first traversal over the undirected adjacency

use crate::graph::{GraphStore, NodeId};
use rustc_hash::FxHashSet;
use std::collections::BTreeSet;

/// Every node within `max_depth` hops of `center`, the center included.
///
/// An unknown center yields an empty set.
pub fn bounded_bfs(store: &GraphStore, center: &NodeId, max_depth: usize) -> BTreeSet<NodeId> {
    if !store.has_node(center) {
        return BTreeSet::new();
    }

    let mut visited: FxHashSet<&NodeId> = FxHashSet::default();
    visited.insert(center);
    let mut frontier: Vec<&NodeId> = vec![center];

    for _ in 0..max_depth {
        let mut next = Vec::new();
        for node in frontier {
            for neighbor in store.neighbors(node) {
                if visited.insert(neighbor) {
                    next.push(neighbor);
                }
            }
        }
        if next.is_empty() {
            break;
        }
        frontier = next;
    }

    visited.into_iter().cloned().collect()
}

/// Sorted, deduplicated neighbours of a node
pub(crate) fn sorted_neighbors<'a>(store: &'a GraphStore, id: &'a NodeId) -> Vec<&'a NodeId> {
    let mut neighbors: Vec<&NodeId> = store.neighbors(id).collect();
    neighbors.sort();
    neighbors.dedup();
    neighbors
}
