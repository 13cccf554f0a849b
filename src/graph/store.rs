//! In-memory graph storage implementation
//!
//! The store is the single source of truth for node and edge records. It
//! keeps the incidence lists, the attribute indices, the derived
//! relationship fields and the cached layouts in step with every mutation.
//! Each mutation validates first and only then touches state, so a failed
//! call leaves the store unchanged.

use super::edge::Edge;
use super::node::{BlobAttrs, Node, NodePayload, NodeUpdate};
use super::types::{Bounds, EdgeId, EdgeType, NodeId, NodeType, Position};
use crate::index::{IndexManager, IndexedAttributes};
use indexmap::IndexMap;
use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, warn};

/// Margin added around the laid-out nodes when recomputing bounds
pub const BOUNDS_MARGIN: f64 = 50.0;

/// Errors that can occur during graph operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    #[error("Node {0} not found")]
    NodeNotFound(NodeId),

    #[error("Edge {0} not found")]
    EdgeNotFound(EdgeId),

    #[error("Edge {0} already exists")]
    EdgeAlreadyExists(EdgeId),

    #[error("Invalid edge: source node {0} does not exist")]
    InvalidEdgeSource(NodeId),

    #[error("Invalid edge: target node {0} does not exist")]
    InvalidEdgeTarget(NodeId),

    #[error("Invalid attribute: {0}")]
    InvalidAttribute(String),
}

impl GraphError {
    /// Whether this error reports an unknown node or edge id
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            GraphError::NodeNotFound(_)
                | GraphError::EdgeNotFound(_)
                | GraphError::InvalidEdgeSource(_)
                | GraphError::InvalidEdgeTarget(_)
        )
    }
}

pub type GraphResult<T> = Result<T, GraphError>;

/// In-memory graph storage
///
/// - nodes: NodeId -> Node (insertion ordered)
/// - edges: EdgeId -> Edge (insertion ordered)
/// - incidence: NodeId -> incident EdgeIds, undirected (a self-loop is listed once)
/// - indices: type/skill/sector/location -> NodeIds
/// - layouts: zoom tier -> NodeId -> Position
#[derive(Debug, Default)]
pub struct GraphStore {
    nodes: IndexMap<NodeId, Node>,

    edges: IndexMap<EdgeId, Edge>,

    incidence: HashMap<NodeId, Vec<EdgeId>>,

    indices: IndexManager,

    layouts: HashMap<u8, HashMap<NodeId, Position>>,

    bounds: Bounds,
}

impl GraphStore {
    /// Create a new empty graph store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store whose bounds start at `bounds`
    pub fn with_bounds(bounds: Bounds) -> Self {
        GraphStore {
            bounds,
            ..Self::default()
        }
    }

    // ============================================================
    // Nodes
    // ============================================================

    /// Insert a node under its caller-supplied id.
    ///
    /// Relationship-derived fields of the record are reset, since they are
    /// owned by edges. If the id already exists with the same type, the
    /// record is replaced: the old index entries are removed, the new ones
    /// inserted, derived fields and incident edges are kept. Reusing an id
    /// for a different type is rejected.
    pub fn add_node(&mut self, mut node: Node) -> GraphResult<NodeId> {
        let id = node.id.clone();

        if let Some(existing) = self.nodes.get(&id) {
            if existing.node_type() != node.node_type() {
                return Err(GraphError::InvalidAttribute(format!(
                    "node {id} already exists as {}",
                    existing.node_type()
                )));
            }
            node.inherit_derived(existing);
            warn!(node_id = %id, "replacing existing node record");

            let old_attrs = IndexedAttributes::of(existing);
            let new_attrs = IndexedAttributes::of(&node);
            self.indices.apply_delta(&id, &old_attrs, &new_attrs);
            self.nodes.insert(id.clone(), node);
            return Ok(id);
        }

        node.clear_derived();
        self.indices.index_node(&node);
        self.incidence.entry(id.clone()).or_default();
        self.nodes.insert(id.clone(), node);
        Ok(id)
    }

    /// Get a node by ID
    pub fn get_node(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Check if a node exists
    pub fn has_node(&self, id: &NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Merge `update` into a node, adjusting indices by the delta only.
    pub fn update_node(&mut self, id: &NodeId, update: NodeUpdate) -> GraphResult<&Node> {
        let node = self.nodes.get_mut(id).ok_or_else(|| GraphError::NodeNotFound(id.clone()))?;
        node.check_update(&update)?;

        let old_attrs = IndexedAttributes::of(node);
        node.apply_update(update);
        let new_attrs = IndexedAttributes::of(node);
        self.indices.apply_delta(id, &old_attrs, &new_attrs);

        Ok(&*node)
    }

    /// Delete a node and every incident edge.
    ///
    /// Returns the number of edges removed, which is the node's degree
    /// immediately before the call.
    pub fn remove_node(&mut self, id: &NodeId) -> GraphResult<usize> {
        if !self.nodes.contains_key(id) {
            return Err(GraphError::NodeNotFound(id.clone()));
        }

        let incident = self.incidence.get(id).cloned().unwrap_or_default();
        let deleted_edges = incident.len();
        for edge_id in &incident {
            self.remove_edge(edge_id)?;
        }

        if let Some(node) = self.nodes.shift_remove(id) {
            self.indices.unindex_node(&node);
        }
        self.incidence.remove(id);
        for layout in self.layouts.values_mut() {
            layout.remove(id);
        }

        debug!(node_id = %id, deleted_edges, "removed node");
        Ok(deleted_edges)
    }

    /// Get total number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// All nodes in insertion order
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Ordered ids of the nodes with the given type
    pub fn nodes_of_type(&self, node_type: NodeType) -> impl Iterator<Item = &NodeId> {
        self.indices.nodes_of_type(node_type)
    }

    // ============================================================
    // Edges
    // ============================================================

    /// Insert an edge after checking that both endpoints exist.
    pub fn add_edge(&mut self, edge: Edge) -> GraphResult<EdgeId> {
        if !self.has_node(&edge.source) {
            return Err(GraphError::InvalidEdgeSource(edge.source));
        }
        if !self.has_node(&edge.target) {
            return Err(GraphError::InvalidEdgeTarget(edge.target));
        }
        if self.edges.contains_key(&edge.id) {
            return Err(GraphError::EdgeAlreadyExists(edge.id));
        }
        self.check_single_parent(&edge)?;

        let id = edge.id.clone();
        self.incidence.entry(edge.source.clone()).or_default().push(id.clone());
        if !edge.is_self_loop() {
            self.incidence.entry(edge.target.clone()).or_default().push(id.clone());
        }
        self.link_relationship(&edge);
        self.edges.insert(id.clone(), edge);
        Ok(id)
    }

    /// Get an edge by ID
    pub fn get_edge(&self, id: &EdgeId) -> Option<&Edge> {
        self.edges.get(id)
    }

    /// Delete an edge
    pub fn remove_edge(&mut self, id: &EdgeId) -> GraphResult<Edge> {
        let edge = self.edges.shift_remove(id).ok_or_else(|| GraphError::EdgeNotFound(id.clone()))?;

        for endpoint in [&edge.source, &edge.target] {
            if let Some(adj) = self.incidence.get_mut(endpoint) {
                adj.retain(|eid| eid != id);
            }
        }
        self.unlink_relationship(&edge);
        Ok(edge)
    }

    /// Get total number of edges
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// All edges in insertion order
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.values()
    }

    /// Edges touching a node, in either orientation
    pub fn incident_edges(&self, id: &NodeId) -> impl Iterator<Item = &Edge> {
        self.incidence
            .get(id)
            .into_iter()
            .flatten()
            .filter_map(|eid| self.edges.get(eid))
    }

    /// Number of incident edges
    pub fn degree(&self, id: &NodeId) -> usize {
        self.incidence.get(id).map_or(0, Vec::len)
    }

    /// Adjacent node ids (undirected); repeats once per parallel edge
    pub fn neighbors<'a>(&'a self, id: &'a NodeId) -> impl Iterator<Item = &'a NodeId> + 'a {
        self.incident_edges(id).filter_map(move |edge| edge.other_end(id))
    }

    /// Edges between `a` and `b` in either orientation
    pub fn edges_between<'a>(&'a self, a: &'a NodeId, b: &'a NodeId) -> impl Iterator<Item = &'a Edge> + 'a {
        self.incident_edges(a).filter(move |edge| edge.connects(a, b))
    }

    // ============================================================
    // Indices and layout
    // ============================================================

    pub fn indices(&self) -> &IndexManager {
        &self.indices
    }

    /// Current global bounding box
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Cached layout for a zoom tier
    pub fn layout(&self, tier: u8) -> Option<&HashMap<NodeId, Position>> {
        self.layouts.get(&tier)
    }

    /// Publish a full-graph layout: every listed node that still exists is
    /// moved, the bounds are recomputed from all node positions, and the
    /// layout is cached under each of `tiers`. Returns the number of nodes
    /// moved.
    pub fn publish_layout(&mut self, positions: HashMap<NodeId, Position>, tiers: &[u8]) -> usize {
        let mut published = HashMap::with_capacity(positions.len());
        for (id, position) in positions {
            if let Some(node) = self.nodes.get_mut(&id) {
                node.position = position;
                published.insert(id, position);
            }
        }

        if let Some(bounds) = Bounds::enclosing(self.nodes.values().map(|n| &n.position), BOUNDS_MARGIN) {
            self.bounds = bounds;
        }

        let moved = published.len();
        for &tier in tiers {
            self.layouts.insert(tier, published.clone());
        }
        moved
    }

    /// Cache a layout for one tier without moving nodes (sub-graph layouts)
    pub fn cache_layout(&mut self, tier: u8, positions: HashMap<NodeId, Position>) {
        let positions = positions
            .into_iter()
            .filter(|(id, _)| self.nodes.contains_key(id))
            .collect();
        self.layouts.insert(tier, positions);
    }

    /// Clear all data from the graph
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.edges.clear();
        self.incidence.clear();
        self.indices.clear();
        self.layouts.clear();
        self.bounds = Bounds::default();
    }

    // ============================================================
    // Relationship bookkeeping
    // ============================================================

    fn link_relationship(&mut self, edge: &Edge) {
        self.adjust_relationship(edge, true);
    }

    fn unlink_relationship(&mut self, edge: &Edge) {
        self.adjust_relationship(edge, false);
    }

    /// Endpoints of `edge` as `(first, second)` where `first` has type `a`
    /// and `second` has type `b`, in whichever orientation matches.
    fn typed_endpoints(&self, edge: &Edge, a: NodeType, b: NodeType) -> Option<(NodeId, NodeId)> {
        let type_of = |id: &NodeId| self.nodes.get(id).map(Node::node_type);
        let (s, t) = (type_of(&edge.source)?, type_of(&edge.target)?);
        if s == a && t == b {
            Some((edge.source.clone(), edge.target.clone()))
        } else if s == b && t == a {
            Some((edge.target.clone(), edge.source.clone()))
        } else {
            None
        }
    }

    /// A Blob belongs to at most one Aggregated node.
    fn check_single_parent(&self, edge: &Edge) -> GraphResult<()> {
        if edge.edge_type != EdgeType::Contains {
            return Ok(());
        }
        let Some((aggregated, blob)) = self.typed_endpoints(edge, NodeType::Aggregated, NodeType::Blob) else {
            return Ok(());
        };
        match self.nodes.get(&blob).map(|n| &n.payload) {
            Some(NodePayload::Blob(BlobAttrs {
                parent_aggregated_id: Some(parent),
                ..
            })) if *parent != aggregated => Err(GraphError::InvalidAttribute(format!(
                "blob {blob} already belongs to {parent}"
            ))),
            _ => Ok(()),
        }
    }

    /// Nodes whose relationship-derived fields change when `edge` is added
    /// or removed. Call before removing the edge.
    pub fn relationship_dependents(&self, edge: &Edge) -> Vec<NodeId> {
        match edge.edge_type {
            EdgeType::MemberOf => self
                .typed_endpoints(edge, NodeType::Individual, NodeType::Blob)
                .map(|(individual, blob)| {
                    let parent = match self.nodes.get(&blob).map(|n| &n.payload) {
                        Some(NodePayload::Blob(a)) => a.parent_aggregated_id.clone(),
                        _ => None,
                    };
                    let mut ids = vec![individual, blob];
                    ids.extend(parent);
                    ids
                })
                .unwrap_or_default(),
            EdgeType::Contains => self
                .typed_endpoints(edge, NodeType::Aggregated, NodeType::Blob)
                .map(|(aggregated, blob)| vec![aggregated, blob])
                .unwrap_or_default(),
            EdgeType::WorksOn => self
                .typed_endpoints(edge, NodeType::Individual, NodeType::Project)
                .map(|(_, project)| vec![project])
                .unwrap_or_default(),
            EdgeType::Executes => self
                .typed_endpoints(edge, NodeType::Blob, NodeType::Project)
                .map(|(_, project)| vec![project])
                .unwrap_or_default(),
            EdgeType::HasSkill => self
                .typed_endpoints(edge, NodeType::Individual, NodeType::Skill)
                .map(|(_, skill)| vec![skill])
                .unwrap_or_default(),
            EdgeType::Requires | EdgeType::Collaborates | EdgeType::InSector | EdgeType::Peer => Vec::new(),
        }
    }

    fn adjust_relationship(&mut self, edge: &Edge, linked: bool) {
        match edge.edge_type {
            EdgeType::MemberOf => {
                let Some((individual, blob)) = self.typed_endpoints(edge, NodeType::Individual, NodeType::Blob) else {
                    return;
                };
                if let Some(NodePayload::Individual(a)) = self.payload_mut(&individual) {
                    toggle_entry(&mut a.blob_memberships, &blob, linked);
                }
                let mut parent = None;
                if let Some(NodePayload::Blob(a)) = self.payload_mut(&blob) {
                    a.member_count = step_count(a.member_count, linked);
                    parent = a.parent_aggregated_id.clone();
                }
                if let Some(parent) = parent {
                    self.recompute_total(&parent);
                }
            }
            EdgeType::Contains => {
                let Some((aggregated, blob)) = self.typed_endpoints(edge, NodeType::Aggregated, NodeType::Blob) else {
                    return;
                };
                // A parallel contains edge keeps the link alive
                let still_linked = linked
                    || self
                        .edges_between(&aggregated, &blob)
                        .any(|e| e.edge_type == EdgeType::Contains);
                if let Some(NodePayload::Aggregated(a)) = self.payload_mut(&aggregated) {
                    if still_linked {
                        if !a.child_blob_ids.contains(&blob) {
                            a.child_blob_ids.push(blob.clone());
                        }
                    } else {
                        a.child_blob_ids.retain(|id| id != &blob);
                    }
                }
                if let Some(NodePayload::Blob(a)) = self.payload_mut(&blob) {
                    if still_linked {
                        a.parent_aggregated_id = Some(aggregated.clone());
                    } else if a.parent_aggregated_id.as_ref() == Some(&aggregated) {
                        a.parent_aggregated_id = None;
                    }
                }
                self.recompute_total(&aggregated);
            }
            EdgeType::WorksOn => {
                let Some((individual, project)) = self.typed_endpoints(edge, NodeType::Individual, NodeType::Project) else {
                    return;
                };
                if let Some(NodePayload::Project(a)) = self.payload_mut(&project) {
                    toggle_entry(&mut a.assigned_individual_ids, &individual, linked);
                }
            }
            EdgeType::Executes => {
                let Some((blob, project)) = self.typed_endpoints(edge, NodeType::Blob, NodeType::Project) else {
                    return;
                };
                if let Some(NodePayload::Project(a)) = self.payload_mut(&project) {
                    toggle_entry(&mut a.assigned_blob_ids, &blob, linked);
                }
            }
            EdgeType::HasSkill => {
                let Some((_, skill)) = self.typed_endpoints(edge, NodeType::Individual, NodeType::Skill) else {
                    return;
                };
                if let Some(NodePayload::Skill(a)) = self.payload_mut(&skill) {
                    a.individual_count = step_count(a.individual_count, linked);
                }
            }
            EdgeType::Requires
            | EdgeType::Collaborates
            | EdgeType::InSector
            | EdgeType::Peer => {}
        }
    }

    /// Re-derive `total_member_count` of an Aggregated node from its children
    fn recompute_total(&mut self, aggregated: &NodeId) {
        let Some(NodePayload::Aggregated(attrs)) = self.nodes.get(aggregated).map(|n| &n.payload) else {
            return;
        };
        let total: u32 = attrs
            .child_blob_ids
            .iter()
            .filter_map(|id| self.nodes.get(id).and_then(Node::size))
            .sum();
        if let Some(NodePayload::Aggregated(attrs)) = self.payload_mut(aggregated) {
            attrs.total_member_count = total;
        }
    }

    fn payload_mut(&mut self, id: &NodeId) -> Option<&mut NodePayload> {
        self.nodes.get_mut(id).map(|n| &mut n.payload)
    }
}

fn step_count(count: u32, up: bool) -> u32 {
    if up {
        count.saturating_add(1)
    } else {
        count.saturating_sub(1)
    }
}

/// One list entry per edge: push on link, remove one occurrence on unlink
fn toggle_entry(list: &mut Vec<NodeId>, id: &NodeId, linked: bool) {
    if linked {
        list.push(id.clone());
    } else if let Some(pos) = list.iter().position(|x| x == id) {
        list.remove(pos);
    }
}
