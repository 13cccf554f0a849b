use blobs_graph::graph::{AggregatedAttrs, BlobAttrs, IndividualAttrs};
use blobs_graph::{algo, BlobKind, Edge, EdgeType, GraphStore, Node, NodeId, NodePayload, NodeType};

fn store_with_two_islands() -> GraphStore {
    let mut store = GraphStore::new();
    store
        .add_node(Node::new("acme", "Acme", NodePayload::Aggregated(AggregatedAttrs::default())))
        .unwrap();
    for id in ["infra", "pay"] {
        store
            .add_node(Node::new(id, id, NodePayload::Blob(BlobAttrs::new(BlobKind::Internal))))
            .unwrap();
    }
    for id in ["ada", "lin", "solo"] {
        store
            .add_node(Node::new(id, id, NodePayload::Individual(IndividualAttrs::default())))
            .unwrap();
    }
    store.add_edge(Edge::new("c1", "acme", "infra", EdgeType::Contains)).unwrap();
    store.add_edge(Edge::new("m1", "ada", "infra", EdgeType::MemberOf)).unwrap();
    store.add_edge(Edge::new("p1", "ada", "lin", EdgeType::Peer)).unwrap();
    store
}

#[test]
fn test_connected_components() {
    let store = store_with_two_islands();
    let result = algo::connected_components(&store);

    // {acme, infra, ada, lin}, {pay}, {solo}
    assert_eq!(result.component_count(), 3);
    let ada = result.node_component[&NodeId::new("ada")];
    assert_eq!(result.node_component[&NodeId::new("acme")], ada);
    assert_ne!(result.node_component[&NodeId::new("solo")], ada);
}

#[test]
fn test_coarse_view_keeps_only_organisational_edges() {
    let store = store_with_two_islands();
    let view = algo::build_view_of_types(&store, &NodeType::COARSE);

    assert_eq!(view.node_count, 3);
    assert_eq!(view.edge_count(), 1);
}

#[test]
fn test_layout_covers_every_node_once() {
    let store = store_with_two_islands();
    let view = algo::build_view(&store);
    let config = algo::LayoutConfig::for_node_count(view.node_count, 500.0, 1);
    let positions = algo::layout_positions(&view, &config);

    assert_eq!(positions.len(), store.node_count());
    for position in positions.values() {
        assert!(position.x.is_finite() && position.y.is_finite());
        assert!(position.x >= -1e-6 && position.x <= 500.0 + 1e-6);
    }
}
