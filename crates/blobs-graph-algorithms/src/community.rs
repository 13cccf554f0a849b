//! Connected component detection over the undirected view

use super::common::GraphView;
use std::collections::HashMap;
use std::hash::Hash;

/// Result of the connected components pass
pub struct WccResult<N> {
    /// Map of Component ID -> List of node keys
    pub components: HashMap<usize, Vec<N>>,
    /// Map of node key -> Component ID
    pub node_component: HashMap<N, usize>,
}

impl<N> WccResult<N> {
    /// Number of disjoint components
    pub fn component_count(&self) -> usize {
        self.components.len()
    }
}

/// Union-Find data structure
struct UnionFind {
    parent: Vec<usize>,
    rank: Vec<usize>,
}

impl UnionFind {
    fn new(size: usize) -> Self {
        UnionFind {
            parent: (0..size).collect(),
            rank: vec![0; size],
        }
    }

    fn find(&mut self, i: usize) -> usize {
        let mut root = i;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        // Path compression
        let mut cur = i;
        while self.parent[cur] != root {
            let next = self.parent[cur];
            self.parent[cur] = root;
            cur = next;
        }
        root
    }

    fn union(&mut self, i: usize, j: usize) {
        let root_i = self.find(i);
        let root_j = self.find(j);

        if root_i != root_j {
            if self.rank[root_i] < self.rank[root_j] {
                self.parent[root_i] = root_j;
            } else if self.rank[root_i] > self.rank[root_j] {
                self.parent[root_j] = root_i;
            } else {
                self.parent[root_j] = root_i;
                self.rank[root_i] += 1;
            }
        }
    }
}

/// Weakly Connected Components (WCC)
///
/// Finds all disjoint subgraphs in the graph. Isolated nodes form their own
/// component.
pub fn weakly_connected_components<N: Clone + Eq + Hash>(view: &GraphView<N>) -> WccResult<N> {
    let n = view.node_count;
    let mut uf = UnionFind::new(n);

    for u_idx in 0..n {
        for &v_idx in view.neighbors(u_idx) {
            uf.union(u_idx, v_idx);
        }
    }

    let mut components: HashMap<usize, Vec<N>> = HashMap::new();
    let mut node_component = HashMap::with_capacity(n);

    for i in 0..n {
        let root = uf.find(i);
        let node = view.index_to_node[i].clone();

        components.entry(root).or_default().push(node.clone());
        node_component.insert(node, root);
    }

    WccResult {
        components,
        node_component,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wcc() {
        // Nodes: 1..=6
        // Edges: 1-2, 3-4-5, 6 (isolated)
        let nodes: Vec<u64> = vec![1, 2, 3, 4, 5, 6];
        let edges = [(1u64, 2u64, 1.0), (3, 4, 1.0), (4, 5, 1.0)];
        let view = GraphView::from_edges(nodes, edges.iter().map(|(s, t, w)| (s, t, *w)));

        let result = weakly_connected_components(&view);

        assert_eq!(result.component_count(), 3);

        let c1 = result.node_component[&1];
        let c2 = result.node_component[&2];
        assert_eq!(c1, c2);

        let c3 = result.node_component[&3];
        let c4 = result.node_component[&4];
        let c5 = result.node_component[&5];
        assert_eq!(c3, c4);
        assert_eq!(c4, c5);
        assert_ne!(c1, c3);
        assert_ne!(result.node_component[&6], c1);
    }

    #[test]
    fn test_wcc_empty() {
        let view: GraphView<u64> = GraphView::from_edges(Vec::new(), std::iter::empty::<(&u64, &u64, f64)>());
        assert_eq!(weakly_connected_components(&view).component_count(), 0);
    }
}
