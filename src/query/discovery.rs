//! Relationship discovery
//!
//! Breadth-first exploration from a source node that records the shortest
//! path to every node it reaches. BFS order is shortest-path order; among
//! nodes at the same depth, neighbours of one node are visited in ascending
//! id order so results are reproducible.

use super::traversal::{bounded_bfs, sorted_neighbors};
use super::viewport::MAX_TRAVERSAL_DEPTH;
use crate::graph::{EdgeType, GraphError, GraphResult, GraphStore, Node, NodeId};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscoveryRequest {
    pub node_id: NodeId,
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
    #[serde(default = "default_limit")]
    pub limit: usize,
    /// Empty means every relationship type
    #[serde(default)]
    pub relationship_types: Vec<EdgeType>,
}

fn default_max_depth() -> usize {
    2
}

fn default_limit() -> usize {
    20
}

impl DiscoveryRequest {
    pub fn new(node_id: impl Into<NodeId>) -> Self {
        DiscoveryRequest {
            node_id: node_id.into(),
            max_depth: default_max_depth(),
            limit: default_limit(),
            relationship_types: Vec::new(),
        }
    }

    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn relationship_types(mut self, types: impl IntoIterator<Item = EdgeType>) -> Self {
        self.relationship_types = types.into_iter().collect();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscoveryResult {
    pub source_node: Node,
    pub related_nodes: Vec<Node>,
    /// `paths[i]` leads from the source to `related_nodes[i]`, both ends included
    pub paths: Vec<Vec<NodeId>>,
}

/// Explore outward from `request.node_id`.
pub fn discover(store: &GraphStore, request: &DiscoveryRequest) -> GraphResult<DiscoveryResult> {
    let source = store
        .get_node(&request.node_id)
        .ok_or_else(|| GraphError::NodeNotFound(request.node_id.clone()))?;

    let mut related_nodes = Vec::new();
    let mut paths = Vec::new();

    let mut visited: FxHashSet<&NodeId> = FxHashSet::default();
    visited.insert(&source.id);
    let mut queue: VecDeque<Vec<&NodeId>> = VecDeque::new();
    queue.push_back(vec![&source.id]);

    'search: while let Some(path) = queue.pop_front() {
        // path holds hops + 1 ids
        if path.len() > request.max_depth {
            continue;
        }
        let Some(&current) = path.last() else {
            continue;
        };

        for neighbor in sorted_neighbors(store, current) {
            if related_nodes.len() >= request.limit {
                break 'search;
            }
            if visited.contains(neighbor) || !passes_filter(store, current, neighbor, &request.relationship_types) {
                continue;
            }
            visited.insert(neighbor);

            let mut next = path.clone();
            next.push(neighbor);
            if let Some(node) = store.get_node(neighbor) {
                related_nodes.push(node.clone());
                paths.push(next.iter().map(|id| (*id).clone()).collect());
            }
            queue.push_back(next);
        }
    }

    Ok(DiscoveryResult {
        source_node: source.clone(),
        related_nodes,
        paths,
    })
}

/// True when no filter is set or some edge between the two nodes has an
/// accepted type.
fn passes_filter(store: &GraphStore, a: &NodeId, b: &NodeId, types: &[EdgeType]) -> bool {
    types.is_empty() || store.edges_between(a, b).any(|e| types.contains(&e.edge_type))
}

/// Nodes within `depth` hops (clamped to `1..=3`), the center included,
/// sorted by id.
pub fn neighborhood(store: &GraphStore, center: &NodeId, depth: usize) -> GraphResult<Vec<Node>> {
    if !store.has_node(center) {
        return Err(GraphError::NodeNotFound(center.clone()));
    }
    let depth = depth.clamp(1, MAX_TRAVERSAL_DEPTH);
    Ok(bounded_bfs(store, center, depth)
        .iter()
        .filter_map(|id| store.get_node(id))
        .cloned()
        .collect())
}
