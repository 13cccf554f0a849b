//! Graph algorithms module
//!
//! Algorithms are implemented in the `blobs-graph-algorithms` crate over a
//! dense CSR view. This module provides the integration/adapter layer:
//! projecting the store into a view and mapping results back to node ids.

use crate::graph::{GraphStore, NodeId, NodeType, Position};
use blobs_graph_algorithms::GraphView;
use std::collections::HashMap;

// Re-export algorithms
pub use blobs_graph_algorithms::{
    spring_layout, weakly_connected_components, LayoutConfig, WccResult, LARGE_GRAPH_THRESHOLD,
};

/// Build an undirected view of the whole store, nodes in insertion order.
pub fn build_view(store: &GraphStore) -> GraphView<NodeId> {
    let nodes: Vec<NodeId> = store.nodes().map(|n| n.id.clone()).collect();
    GraphView::from_edges(
        nodes,
        store.edges().map(|e| (&e.source, &e.target, e.weight)),
    )
}

/// Build the view induced by the nodes of the given types.
pub fn build_view_of_types(store: &GraphStore, types: &[NodeType]) -> GraphView<NodeId> {
    let nodes: Vec<NodeId> = store
        .nodes()
        .filter(|n| types.contains(&n.node_type()))
        .map(|n| n.id.clone())
        .collect();
    build_view_of(store, nodes)
}

/// Build the view induced by an explicit node set. Edges with an endpoint
/// outside the set are dropped.
fn build_view_of(store: &GraphStore, nodes: Vec<NodeId>) -> GraphView<NodeId> {
    GraphView::from_edges(
        nodes,
        store.edges().map(|e| (&e.source, &e.target, e.weight)),
    )
}

/// Run the spring layout over a view and key the result by node id.
pub fn layout_positions(view: &GraphView<NodeId>, config: &LayoutConfig) -> HashMap<NodeId, Position> {
    spring_layout(view, config)
        .into_iter()
        .zip(view.index_to_node.iter())
        .map(|([x, y], id)| (id.clone(), Position::new(x, y)))
        .collect()
}

/// Weakly connected components of the whole graph
pub fn connected_components(store: &GraphStore) -> WccResult<NodeId> {
    weakly_connected_components(&build_view(store))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{BlobAttrs, BlobKind, Edge, EdgeType, IndividualAttrs, Node, NodePayload};

    fn sample_store() -> GraphStore {
        let mut store = GraphStore::new();
        for id in ["a", "b", "c"] {
            store
                .add_node(Node::new(id, id, NodePayload::Individual(IndividualAttrs::default())))
                .unwrap();
        }
        store
            .add_node(Node::new("team", "Team", NodePayload::Blob(BlobAttrs::new(BlobKind::Internal))))
            .unwrap();
        store.add_edge(Edge::new("e1", "a", "team", EdgeType::MemberOf)).unwrap();
        store.add_edge(Edge::new("e2", "b", "team", EdgeType::MemberOf)).unwrap();
        store
    }

    #[test]
    fn test_build_view() {
        let store = sample_store();
        let view = build_view(&store);
        assert_eq!(view.node_count, 4);
        // Undirected: each edge appears in both rows
        assert_eq!(view.targets.len(), 4);
        assert_eq!(view.edge_count(), 2);

        let team = view.node_to_index[&NodeId::new("team")];
        assert_eq!(view.degree(team), 2);
    }

    #[test]
    fn test_view_of_types_is_induced() {
        let store = sample_store();
        let view = build_view_of_types(&store, &[NodeType::Blob]);
        assert_eq!(view.node_count, 1);
        assert_eq!(view.edge_count(), 0);
    }

    #[test]
    fn test_connected_components() {
        let store = sample_store();
        let wcc = connected_components(&store);
        assert_eq!(wcc.component_count(), 2);
        assert_eq!(
            wcc.node_component[&NodeId::new("a")],
            wcc.node_component[&NodeId::new("team")]
        );
        assert_ne!(
            wcc.node_component[&NodeId::new("a")],
            wcc.node_component[&NodeId::new("c")]
        );
    }

    #[test]
    fn test_layout_positions_cover_every_node() {
        let store = sample_store();
        let view = build_view(&store);
        let config = LayoutConfig::for_node_count(view.node_count, 1000.0, 7);
        let positions = layout_positions(&view, &config);
        assert_eq!(positions.len(), 4);
        for p in positions.values() {
            assert!((0.0..=1000.0).contains(&p.x));
            assert!((0.0..=1000.0).contains(&p.y));
        }
    }
}
