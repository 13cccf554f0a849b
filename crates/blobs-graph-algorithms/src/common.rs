//! Shared utilities for graph algorithms
//!
//! Provides a read-only, optimized view of the graph topology for algorithm execution.

use std::collections::HashMap;
use std::hash::Hash;

/// A dense, integer-indexed, undirected view of the graph topology using
/// Compressed Sparse Row (CSR) format.
///
/// Every edge `(u, v)` is stored in both rows, so `neighbors(u)` contains `v`
/// and `neighbors(v)` contains `u`. A self-loop is stored once.
#[derive(Debug, Clone)]
pub struct GraphView<N> {
    /// Number of nodes
    pub node_count: usize,
    /// Mapping from dense index (0..N) back to the caller's node key
    pub index_to_node: Vec<N>,
    /// Mapping from node key to dense index
    pub node_to_index: HashMap<N, usize>,

    /// Offsets into `targets`. Size = node_count + 1
    pub offsets: Vec<usize>,
    /// Contiguous array of neighbour indices
    pub targets: Vec<usize>,
    /// Edge weights, aligned with `targets`
    pub weights: Vec<f64>,
}

impl<N: Clone + Eq + Hash> GraphView<N> {
    /// Build a view from a node list and weighted edges expressed as node keys.
    ///
    /// Edges whose endpoints are not in `nodes` are skipped, which makes it
    /// cheap to project an induced subgraph.
    pub fn from_edges<'a, I>(nodes: Vec<N>, edges: I) -> Self
    where
        N: 'a,
        I: IntoIterator<Item = (&'a N, &'a N, f64)>,
    {
        let node_count = nodes.len();
        let node_to_index: HashMap<N, usize> = nodes
            .iter()
            .enumerate()
            .map(|(idx, id)| (id.clone(), idx))
            .collect();

        let mut adjacency: Vec<Vec<(usize, f64)>> = vec![Vec::new(); node_count];
        for (source, target, weight) in edges {
            let (Some(&u), Some(&v)) = (node_to_index.get(source), node_to_index.get(target)) else {
                continue;
            };
            adjacency[u].push((v, weight));
            if u != v {
                adjacency[v].push((u, weight));
            }
        }

        Self::from_adjacency_list(nodes, node_to_index, adjacency)
    }

    /// Helper to create a GraphView from per-node adjacency lists
    pub fn from_adjacency_list(
        index_to_node: Vec<N>,
        node_to_index: HashMap<N, usize>,
        adjacency: Vec<Vec<(usize, f64)>>,
    ) -> Self {
        let node_count = index_to_node.len();
        let mut offsets = Vec::with_capacity(node_count + 1);
        let mut targets = Vec::new();
        let mut weights = Vec::new();

        offsets.push(0);
        for row in adjacency {
            for (target, weight) in row {
                targets.push(target);
                weights.push(weight);
            }
            offsets.push(targets.len());
        }

        GraphView {
            node_count,
            index_to_node,
            node_to_index,
            offsets,
            targets,
            weights,
        }
    }
}

impl<N> GraphView<N> {
    /// Get the degree of a node (by index)
    pub fn degree(&self, idx: usize) -> usize {
        self.offsets[idx + 1] - self.offsets[idx]
    }

    /// Get neighbours of a node
    pub fn neighbors(&self, idx: usize) -> &[usize] {
        &self.targets[self.offsets[idx]..self.offsets[idx + 1]]
    }

    /// Get weights aligned with `neighbors(idx)`
    pub fn weights(&self, idx: usize) -> &[f64] {
        &self.weights[self.offsets[idx]..self.offsets[idx + 1]]
    }

    /// Total number of undirected edges (self-loops count once)
    pub fn edge_count(&self) -> usize {
        let mut loops = 0;
        for idx in 0..self.node_count {
            loops += self.neighbors(idx).iter().filter(|&&t| t == idx).count();
        }
        (self.targets.len() - loops) / 2 + loops
    }
}
