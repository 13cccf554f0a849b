//! Zoom-aware viewport queries
//!
//! Selects a bounded subgraph for a camera state. The caps below bound the
//! cost of a query independently of the total graph size:
//!
//! | tier | visible set |
//! |------|-------------|
//! | 0 | Aggregated, Blob, Project |
//! | 1 | tier 0 + up to 200 Individuals within 2 hops of the center node |
//! | ≥2 | BFS from the center node (≤ 3 hops), else the viewport rectangle (≤ 2000 nodes) |

use super::traversal::bounded_bfs;
use crate::graph::{Bounds, Edge, GraphStore, Node, NodeId, NodeType};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Hard ceiling on the traversal depth, whatever the request says
pub const MAX_TRAVERSAL_DEPTH: usize = 3;
/// BFS depth used to pick Individuals at the medium tier
pub const MEDIUM_TIER_BFS_DEPTH: usize = 2;
/// Individuals added at the medium tier
pub const MEDIUM_TIER_INDIVIDUAL_CAP: usize = 200;
/// Nodes returned by a detail-tier rectangle query
pub const DETAIL_TIER_NODE_CAP: usize = 2000;
/// Tier whose cached layout supplies node positions
pub const DETAIL_TIER: u8 = 2;
/// Upper bound for `full_graph` limits
pub const FULL_GRAPH_MAX_LIMIT: usize = 5000;

/// Discrete level of visual detail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ZoomTier {
    Coarse,
    Medium,
    Detail,
}

impl ZoomTier {
    /// Any level of 2 or above is the detail tier
    pub fn from_level(level: u8) -> Self {
        match level {
            0 => ZoomTier::Coarse,
            1 => ZoomTier::Medium,
            _ => ZoomTier::Detail,
        }
    }
}

/// Camera state sent by a client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewportRequest {
    pub center_x: f64,
    pub center_y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default = "default_zoom_level")]
    pub zoom_level: u8,
    #[serde(default)]
    pub center_node_id: Option<NodeId>,
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

fn default_zoom_level() -> u8 {
    1
}

fn default_max_depth() -> usize {
    MAX_TRAVERSAL_DEPTH
}

impl ViewportRequest {
    pub fn new(center_x: f64, center_y: f64, width: f64, height: f64, zoom_level: u8) -> Self {
        ViewportRequest {
            center_x,
            center_y,
            width,
            height,
            zoom_level,
            center_node_id: None,
            max_depth: MAX_TRAVERSAL_DEPTH,
        }
    }

    pub fn centered_on(mut self, node_id: impl Into<NodeId>) -> Self {
        self.center_node_id = Some(node_id.into());
        self
    }

    pub fn with_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Requested depth after applying the server-side ceiling
    pub fn effective_depth(&self) -> usize {
        self.max_depth.min(MAX_TRAVERSAL_DEPTH)
    }

    /// The camera rectangle
    pub fn rect(&self) -> Bounds {
        Bounds::around(self.center_x, self.center_y, self.width, self.height)
    }
}

/// A bounded subgraph plus counts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphData {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub total_nodes: usize,
    pub total_edges: usize,
    pub viewport_nodes: usize,
    pub zoom_level: u8,
}

/// Select the nodes and edges visible for `request`.
pub fn viewport_graph(store: &GraphStore, request: &ViewportRequest) -> GraphData {
    let visible = visible_nodes(store, request);

    let mut seen_pairs: FxHashSet<(&NodeId, &NodeId)> = FxHashSet::default();
    let edges: Vec<Edge> = store
        .edges()
        .filter(|e| visible.contains(&e.source) && visible.contains(&e.target))
        .filter(|e| seen_pairs.insert(e.unordered_pair()))
        .cloned()
        .collect();

    let detail_layout = store.layout(DETAIL_TIER);
    let nodes: Vec<Node> = visible
        .iter()
        .filter_map(|id| store.get_node(id))
        .map(|node| {
            let mut node = node.clone();
            if let Some(position) = detail_layout.and_then(|layout| layout.get(&node.id)) {
                node.position = *position;
            }
            node
        })
        .collect();

    GraphData {
        viewport_nodes: visible.len(),
        nodes,
        edges,
        total_nodes: store.node_count(),
        total_edges: store.edge_count(),
        zoom_level: request.zoom_level,
    }
}

fn coarse_nodes(store: &GraphStore) -> BTreeSet<NodeId> {
    NodeType::COARSE
        .iter()
        .flat_map(|&t| store.nodes_of_type(t))
        .cloned()
        .collect()
}

fn visible_nodes(store: &GraphStore, request: &ViewportRequest) -> BTreeSet<NodeId> {
    match ZoomTier::from_level(request.zoom_level) {
        ZoomTier::Coarse => coarse_nodes(store),
        ZoomTier::Medium => {
            let mut visible = coarse_nodes(store);
            if let Some(center) = &request.center_node_id {
                let nearby = bounded_bfs(store, center, MEDIUM_TIER_BFS_DEPTH);
                let individuals = nearby
                    .into_iter()
                    .filter(|id| store.get_node(id).map(Node::node_type) == Some(NodeType::Individual))
                    .take(MEDIUM_TIER_INDIVIDUAL_CAP);
                visible.extend(individuals);
            }
            visible
        }
        ZoomTier::Detail => match &request.center_node_id {
            Some(center) => bounded_bfs(store, center, request.effective_depth()),
            None => {
                let rect = request.rect();
                let mut inside: Vec<&NodeId> = store
                    .nodes()
                    .filter(|n| rect.contains(&n.position))
                    .map(|n| &n.id)
                    .collect();
                inside.sort();
                inside.into_iter().take(DETAIL_TIER_NODE_CAP).cloned().collect()
            }
        },
    }
}

/// Unfiltered graph dump up to `limit` nodes.
///
/// Tier 0 lists Aggregated, then Blob, then Project nodes (ids ascending);
/// other tiers list every node in insertion order. Every edge whose two
/// endpoints were returned is included.
pub fn full_graph(store: &GraphStore, zoom_level: u8, limit: usize) -> GraphData {
    let limit = limit.clamp(1, FULL_GRAPH_MAX_LIMIT);

    let nodes: Vec<Node> = match ZoomTier::from_level(zoom_level) {
        ZoomTier::Coarse => NodeType::COARSE
            .iter()
            .flat_map(|&t| store.nodes_of_type(t))
            .filter_map(|id| store.get_node(id))
            .take(limit)
            .cloned()
            .collect(),
        ZoomTier::Medium | ZoomTier::Detail => store.nodes().take(limit).cloned().collect(),
    };

    let returned: FxHashSet<&NodeId> = nodes.iter().map(|n| &n.id).collect();
    let edges: Vec<Edge> = store
        .edges()
        .filter(|e| returned.contains(&e.source) && returned.contains(&e.target))
        .cloned()
        .collect();

    GraphData {
        viewport_nodes: nodes.len(),
        total_nodes: store.node_count(),
        total_edges: store.edge_count(),
        zoom_level,
        edges,
        nodes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{
        BlobAttrs, BlobKind, EdgeType, IndividualAttrs, NodePayload, Position, ProjectAttrs, ProjectKind,
        SkillAttrs,
    };

    fn add(store: &mut GraphStore, node: Node) {
        store.add_node(node).unwrap();
    }

    fn individual(id: &str, x: f64, y: f64) -> Node {
        Node::new(id, id, NodePayload::Individual(IndividualAttrs::default())).with_position(Position::new(x, y))
    }

    fn sample() -> GraphStore {
        let mut store = GraphStore::new();
        add(&mut store, Node::new("blob", "Blob", NodePayload::Blob(BlobAttrs::new(BlobKind::Internal))));
        add(&mut store, Node::new("proj", "Proj", NodePayload::Project(ProjectAttrs::new(ProjectKind::Mission))));
        add(&mut store, Node::new("rust", "Rust", NodePayload::Skill(SkillAttrs::default())));
        add(&mut store, individual("ada", 10.0, 10.0));
        add(&mut store, individual("lin", 20.0, 20.0));
        add(&mut store, individual("far", 900.0, 900.0));
        store.add_edge(Edge::new("m1", "ada", "blob", EdgeType::MemberOf)).unwrap();
        store.add_edge(Edge::new("m2", "lin", "blob", EdgeType::MemberOf)).unwrap();
        store.add_edge(Edge::new("p1", "ada", "lin", EdgeType::Peer)).unwrap();
        store.add_edge(Edge::new("p2", "lin", "ada", EdgeType::Peer)).unwrap();
        store.add_edge(Edge::new("h1", "ada", "rust", EdgeType::HasSkill)).unwrap();
        store.add_edge(Edge::new("x1", "blob", "proj", EdgeType::Executes)).unwrap();
        store
    }

    fn node_ids(data: &GraphData) -> Vec<&str> {
        data.nodes.iter().map(|n| n.id.as_str()).collect()
    }

    #[test]
    fn test_coarse_tier_only_organisations() {
        let store = sample();
        let data = viewport_graph(&store, &ViewportRequest::new(0.0, 0.0, 10.0, 10.0, 0));
        assert_eq!(node_ids(&data), vec!["blob", "proj"]);
        assert_eq!(data.edges.len(), 1);
        assert_eq!(data.total_nodes, 6);
        assert_eq!(data.total_edges, 6);
        assert_eq!(data.viewport_nodes, 2);
    }

    #[test]
    fn test_medium_tier_adds_nearby_individuals() {
        let store = sample();
        let request = ViewportRequest::new(0.0, 0.0, 10.0, 10.0, 1).centered_on("proj");
        let data = viewport_graph(&store, &request);
        // proj -> blob -> {ada, lin} within two hops; "far" is isolated
        assert_eq!(node_ids(&data), vec!["ada", "blob", "lin", "proj"]);
        assert!(data.nodes.iter().all(|n| n.node_type() != NodeType::Skill));
    }

    #[test]
    fn test_detail_tier_rectangle() {
        let store = sample();
        let data = viewport_graph(&store, &ViewportRequest::new(15.0, 15.0, 20.0, 20.0, 2));
        // blob, proj and rust sit at the origin, outside [5, 25]
        assert_eq!(node_ids(&data), vec!["ada", "lin"]);
        // the two peer edges collapse into one visible edge, first seen wins
        assert_eq!(data.edges.len(), 1);
        assert_eq!(data.edges[0].id.as_str(), "p1");
    }

    #[test]
    fn test_detail_tier_bfs_depth_is_clamped() {
        let mut store = GraphStore::new();
        let ids: Vec<String> = (0..8).map(|i| format!("n{i}")).collect();
        for id in &ids {
            add(&mut store, individual(id, 0.0, 0.0));
        }
        for (i, pair) in ids.windows(2).enumerate() {
            store
                .add_edge(Edge::new(format!("e{i}"), pair[0].as_str(), pair[1].as_str(), EdgeType::Peer))
                .unwrap();
        }

        let request = ViewportRequest::new(0.0, 0.0, 1.0, 1.0, 2).centered_on("n0").with_depth(10);
        assert_eq!(request.effective_depth(), MAX_TRAVERSAL_DEPTH);
        let data = viewport_graph(&store, &request);
        assert_eq!(node_ids(&data), vec!["n0", "n1", "n2", "n3"]);
    }

    #[test]
    fn test_detail_tier_rectangle_cap() {
        let mut store = GraphStore::new();
        for i in 0..(DETAIL_TIER_NODE_CAP + 25) {
            add(&mut store, individual(&format!("n{i:05}"), 1.0, 1.0));
        }
        let data = viewport_graph(&store, &ViewportRequest::new(0.0, 0.0, 10.0, 10.0, 2));
        assert_eq!(data.nodes.len(), DETAIL_TIER_NODE_CAP);
        assert_eq!(data.nodes[0].id.as_str(), "n00000");
        assert_eq!(data.nodes.last().unwrap().id.as_str(), "n01999");
    }

    #[test]
    fn test_positions_come_from_detail_layout() {
        let mut store = sample();
        let mut positions = std::collections::HashMap::new();
        positions.insert(NodeId::new("blob"), Position::new(5.0, 6.0));
        store.cache_layout(DETAIL_TIER, positions);

        let data = viewport_graph(&store, &ViewportRequest::new(0.0, 0.0, 1.0, 1.0, 0));
        let blob = data.nodes.iter().find(|n| n.id.as_str() == "blob").unwrap();
        assert_eq!(blob.position, Position::new(5.0, 6.0));
        // the stored record is untouched
        assert_eq!(store.get_node(&NodeId::new("blob")).unwrap().position, Position::default());
    }

    #[test]
    fn test_full_graph() {
        let store = sample();
        let coarse = full_graph(&store, 0, 1000);
        assert_eq!(node_ids(&coarse), vec!["blob", "proj"]);

        let detail = full_graph(&store, 2, 3);
        assert_eq!(node_ids(&detail), vec!["blob", "proj", "rust"]);
        assert_eq!(detail.edges.len(), 1);

        assert_eq!(full_graph(&store, 1, 0).nodes.len(), 1);
        // both peer edges are kept, unlike viewport queries
        assert_eq!(full_graph(&store, 1, 100).edges.len(), 6);
    }
}
