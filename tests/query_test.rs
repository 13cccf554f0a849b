use blobs_graph::graph::{AggregatedAttrs, BlobAttrs, IndividualAttrs, ProjectAttrs, SkillAttrs};
use blobs_graph::query::{self, DETAIL_TIER_NODE_CAP, MEDIUM_TIER_INDIVIDUAL_CAP};
use blobs_graph::{
    BlobKind, DiscoveryRequest, Edge, EdgeType, GraphStore, Node, NodeId, NodePayload, NodeType, Position,
    ProjectKind, SearchQuery, ViewportRequest,
};

fn person(id: &str, skills: &[&str]) -> Node {
    Node::new(id, id, NodePayload::Individual(IndividualAttrs::with_skills(skills.iter().copied())))
}

/// A hub team with `members` individuals, plus one node of every other type.
fn organisation(members: usize) -> GraphStore {
    let mut store = GraphStore::new();
    store
        .add_node(Node::new("acme", "Acme", NodePayload::Aggregated(AggregatedAttrs::default())))
        .unwrap();
    store
        .add_node(Node::new("hub", "Hub", NodePayload::Blob(BlobAttrs::new(BlobKind::Internal))))
        .unwrap();
    store
        .add_node(Node::new("proj", "Atlas", NodePayload::Project(ProjectAttrs::new(ProjectKind::Mission))))
        .unwrap();
    store
        .add_node(Node::new("rust", "Rust", NodePayload::Skill(SkillAttrs::default())))
        .unwrap();
    store.add_edge(Edge::new("c", "acme", "hub", EdgeType::Contains)).unwrap();
    store.add_edge(Edge::new("x", "hub", "proj", EdgeType::Executes)).unwrap();

    for i in 0..members {
        let id = format!("p{i:04}");
        store.add_node(person(&id, &["Rust"])).unwrap();
        store
            .add_edge(Edge::new(format!("m{i:04}"), id.as_str(), "hub", EdgeType::MemberOf))
            .unwrap();
        store
            .add_edge(Edge::new(format!("h{i:04}"), id.as_str(), "rust", EdgeType::HasSkill))
            .unwrap();
    }
    store
}

#[test]
fn test_coarse_tier_excludes_people_and_skills() {
    let store = organisation(10);
    let request = ViewportRequest::new(500.0, 500.0, 1000.0, 1000.0, 0).centered_on("p0001");
    let data = query::viewport_graph(&store, &request);

    assert_eq!(data.viewport_nodes, 3);
    assert!(data
        .nodes
        .iter()
        .all(|n| !matches!(n.node_type(), NodeType::Individual | NodeType::Skill)));
    assert_eq!(data.edges.len(), 2);
    assert_eq!(data.total_nodes, 14);
}

#[test]
fn test_medium_tier_caps_individuals() {
    let store = organisation(250);
    let request = ViewportRequest::new(0.0, 0.0, 10.0, 10.0, 1).centered_on("hub");
    let data = query::viewport_graph(&store, &request);

    let individuals: Vec<&str> = data
        .nodes
        .iter()
        .filter(|n| n.node_type() == NodeType::Individual)
        .map(|n| n.id.as_str())
        .collect();
    assert_eq!(individuals.len(), MEDIUM_TIER_INDIVIDUAL_CAP);
    assert_eq!(individuals.first(), Some(&"p0000"));
    assert_eq!(individuals.last(), Some(&"p0199"));
    assert_eq!(data.viewport_nodes, 3 + MEDIUM_TIER_INDIVIDUAL_CAP);
}

#[test]
fn test_detail_rectangle_is_capped() {
    let mut store = GraphStore::new();
    for i in 0..DETAIL_TIER_NODE_CAP + 100 {
        let node = person(&format!("n{i:05}"), &[]).with_position(Position::new(100.0, 100.0));
        store.add_node(node).unwrap();
    }
    store
        .add_node(person("far", &[]).with_position(Position::new(900.0, 900.0)))
        .unwrap();

    let data = query::viewport_graph(&store, &ViewportRequest::new(100.0, 100.0, 50.0, 50.0, 2));
    assert_eq!(data.nodes.len(), DETAIL_TIER_NODE_CAP);
    assert!(data.nodes.iter().all(|n| n.id.as_str() != "far"));
    assert_eq!(data.nodes.last().map(|n| n.id.as_str()), Some("n01999"));
}

#[test]
fn test_detail_bfs_depth_is_clamped() {
    let mut store = GraphStore::new();
    for i in 0..6 {
        store.add_node(person(&format!("c{i}"), &[])).unwrap();
    }
    for i in 0..5 {
        store
            .add_edge(Edge::new(format!("e{i}"), format!("c{i}"), format!("c{}", i + 1), EdgeType::Peer))
            .unwrap();
    }
    let request = ViewportRequest::new(0.0, 0.0, 1.0, 1.0, 3).centered_on("c0").with_depth(10);
    let data = query::viewport_graph(&store, &request);
    let ids: Vec<&str> = data.nodes.iter().map(|n| n.id.as_str()).collect();
    assert_eq!(ids, vec!["c0", "c1", "c2", "c3"]);
    assert_eq!(data.edges.len(), 3);
}

#[test]
fn test_discovery_paths_respect_depth() {
    let store = organisation(5);
    let request = DiscoveryRequest::new("p0000").max_depth(2).limit(100);
    let result = query::discover(&store, &request).unwrap();

    assert_eq!(result.source_node.id.as_str(), "p0000");
    assert_eq!(result.related_nodes.len(), result.paths.len());
    for path in &result.paths {
        assert!(path.len() <= 3);
        assert_eq!(path.first(), Some(&NodeId::new("p0000")));
    }
    let related: Vec<&str> = result.related_nodes.iter().map(|n| n.id.as_str()).collect();
    assert!(related.contains(&"hub"));
    assert!(related.contains(&"p0001"));
}

#[test]
fn test_discovery_relationship_filter() {
    let store = organisation(3);
    let request = DiscoveryRequest::new("p0000")
        .max_depth(3)
        .relationship_types([EdgeType::MemberOf]);
    let result = query::discover(&store, &request).unwrap();

    assert!(result
        .related_nodes
        .iter()
        .all(|n| n.id.as_str() != "rust" && n.id.as_str() != "proj"));
    assert!(query::discover(&store, &DiscoveryRequest::new("ghost")).unwrap_err().is_not_found());
}

#[test]
fn test_search_by_skill_is_case_insensitive() {
    let mut store = organisation(0);
    store.add_node(person("ada", &["Python", "Rust"])).unwrap();
    store.add_node(person("lin", &["PYTHON"])).unwrap();
    store.add_node(person("kim", &["Go"])).unwrap();

    let hits = query::search(&store, &SearchQuery::new().skills(["Python"]));
    let ids: Vec<&str> = hits.iter().map(|n| n.id.as_str()).collect();
    assert_eq!(ids, vec!["ada", "lin"]);
    for node in &hits {
        assert!(node.skills().iter().any(|s| s.eq_ignore_ascii_case("python")));
    }
}

#[test]
fn test_similarity_of_individuals() {
    let mut store = organisation(0);
    store.add_node(person("ada", &["Rust", "Go"])).unwrap();
    store.add_node(person("lin", &["Go", "SQL"])).unwrap();
    store.add_node(person("kim", &["Haskell"])).unwrap();

    let ranked = query::similar_nodes(&store, &NodeId::new("ada"), 10);
    assert_eq!(ranked.len(), 1);
    assert_eq!(ranked[0].node.id.as_str(), "lin");
    assert_eq!(ranked[0].score, 2.0);

    let ranked = query::similar_nodes(&store, &NodeId::new("hub"), 10);
    assert!(ranked.iter().all(|s| s.node.id.as_str() != "hub"));
    assert!(ranked.iter().all(|s| s.node.node_type() == NodeType::Blob));
}
