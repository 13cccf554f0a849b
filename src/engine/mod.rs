//! Graph engine context
//!
//! [`GraphEngine`] is the one object a process builds at start-up and hands
//! to whatever serves requests. It owns the shared store, the event bus and
//! the configuration, and exposes every mutation and query with timing
//! metadata.
//!
//! Locking: mutations hold the write lock for the whole record, index and
//! adjacency update; queries hold the read lock. Layout snapshots the
//! topology under a read lock, computes without any lock and publishes under
//! a short write lock. Events go out after the lock is released. Every
//! locked section is synchronous and short, so the store sits behind
//! `std::sync::RwLock` rather than an async lock.
//!
//! An edge mutation that changes derived fields (member counts, totals,
//! assignment lists) also emits `NodeUpdated` for each affected node.

pub mod input;

pub use input::{
    AggregatedInput, BlobInput, EdgeInput, IndividualInput, ProjectInput, SectorInput, SkillInput,
};

use crate::algo::{self, LayoutConfig};
use crate::config::EngineConfig;
use crate::graph::{
    Bounds, Edge, EdgeId, EdgeType, EventBus, GraphError, GraphEvent, GraphResult, GraphStore, Node, NodeId,
    NodePayload, NodeType, NodeUpdate, Position,
};
use crate::query::{
    self, DiscoveryRequest, DiscoveryResult, GraphData, ScoredNode, SearchQuery, ViewportRequest, DETAIL_TIER,
};
use rustc_hash::FxHasher;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::hash::{Hash, Hasher};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Instant;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Tiers that share the full-graph layout
const FULL_LAYOUT_TIERS: [u8; 2] = [1, DETAIL_TIER];
/// Tier holding the layout of the organisation-level subgraph
const COARSE_TIER: u8 = 0;
/// New nodes are placed within this distance of the bounds centre
const SEED_SPREAD: u64 = 100;

/// A query result with its wall-clock cost
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timed<T> {
    #[serde(flatten)]
    pub data: T,
    pub query_time_ms: f64,
}

impl<T> Timed<T> {
    fn measure(start: Instant, data: T) -> Self {
        Timed {
            data,
            query_time_ms: start.elapsed().as_secs_f64() * 1000.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub nodes: Vec<Node>,
    pub total_count: usize,
    pub query_time_ms: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphStats {
    pub total_nodes: usize,
    pub total_edges: usize,
    pub nodes_by_type: BTreeMap<NodeType, usize>,
    pub bounds: Bounds,
    pub connected_components: usize,
}

/// Shared, cloneable handle to one graph
#[derive(Debug, Clone)]
pub struct GraphEngine {
    store: Arc<RwLock<GraphStore>>,
    events: EventBus,
    config: Arc<EngineConfig>,
}

impl Default for GraphEngine {
    fn default() -> Self {
        GraphEngine::new(EngineConfig::default())
    }
}

impl GraphEngine {
    /// Create an engine with an empty store
    pub fn new(config: EngineConfig) -> Self {
        let store = GraphStore::with_bounds(config.initial_bounds);
        GraphEngine {
            store: Arc::new(RwLock::new(store)),
            events: EventBus::new(config.events.capacity),
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Shared handle to the underlying store
    pub fn store(&self) -> Arc<RwLock<GraphStore>> {
        Arc::clone(&self.store)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<GraphEvent> {
        self.events.subscribe()
    }

    /// A panicking writer cannot leave the store half-updated, since every
    /// mutation validates before it writes, so a poisoned lock is recovered.
    fn read(&self) -> RwLockReadGuard<'_, GraphStore> {
        self.store.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, GraphStore> {
        self.store.write().unwrap_or_else(PoisonError::into_inner)
    }

    // ============================================================
    // Node mutations
    // ============================================================

    pub fn create_individual(&self, input: IndividualInput) -> GraphResult<Node> {
        let (name, payload) = input.into_parts()?;
        self.create(name, payload)
    }

    /// Create a blob; a parent Aggregated is linked with a `contains` edge.
    pub fn create_blob(&self, input: BlobInput) -> GraphResult<Node> {
        let parent = input.parent_aggregated_id.clone();
        let (name, payload) = input.into_parts()?;

        let Some(parent) = parent else {
            return self.create(name, payload);
        };

        let (node, edge, updated) = {
            let mut store = self.write();
            match store.get_node(&parent).map(Node::node_type) {
                None => return Err(GraphError::NodeNotFound(parent)),
                Some(NodeType::Aggregated) => {}
                Some(other) => {
                    return Err(GraphError::InvalidAttribute(format!(
                        "parent {parent} is a {other} node, expected Aggregated"
                    )))
                }
            }
            let id = Self::insert_generated(&mut store, name, payload)?;
            let edge = Edge::new(EdgeId::generate(), parent, id.clone(), EdgeType::Contains);
            store.add_edge(edge.clone())?;
            let dependents = store.relationship_dependents(&edge);
            let updated = Self::snapshots(&store, dependents.into_iter().filter(|d| *d != id));
            (Self::snapshot(&store, &id)?, edge, updated)
        };

        self.events.publish(GraphEvent::NodeCreated { node: node.clone() });
        self.events.publish(GraphEvent::EdgeCreated { edge });
        self.publish_updates(updated);
        Ok(node)
    }

    pub fn create_aggregated(&self, input: AggregatedInput) -> GraphResult<Node> {
        let (name, payload) = input.into_parts()?;
        self.create(name, payload)
    }

    pub fn create_project(&self, input: ProjectInput) -> GraphResult<Node> {
        let (name, payload) = input.into_parts()?;
        self.create(name, payload)
    }

    pub fn create_skill(&self, input: SkillInput) -> GraphResult<Node> {
        let (name, payload) = input.into_parts()?;
        self.create(name, payload)
    }

    pub fn create_sector(&self, input: SectorInput) -> GraphResult<Node> {
        let (name, payload) = input.into_parts()?;
        self.create(name, payload)
    }

    fn create(&self, name: String, payload: NodePayload) -> GraphResult<Node> {
        let node = {
            let mut store = self.write();
            let id = Self::insert_generated(&mut store, name, payload)?;
            Self::snapshot(&store, &id)?
        };
        debug!(node_id = %node.id, node_type = %node.node_type(), "created node");
        self.events.publish(GraphEvent::NodeCreated { node: node.clone() });
        Ok(node)
    }

    fn insert_generated(store: &mut GraphStore, name: String, payload: NodePayload) -> GraphResult<NodeId> {
        let id = NodeId::generate();
        let position = seed_position(&id, &store.bounds());
        store.add_node(Node::new(id, name, payload).with_position(position))
    }

    fn snapshot(store: &GraphStore, id: &NodeId) -> GraphResult<Node> {
        store
            .get_node(id)
            .cloned()
            .ok_or_else(|| GraphError::NodeNotFound(id.clone()))
    }

    /// Current copies of the surviving nodes among `ids`, each once
    fn snapshots(store: &GraphStore, ids: impl IntoIterator<Item = NodeId>) -> Vec<Node> {
        let mut seen: Vec<NodeId> = Vec::new();
        let mut nodes = Vec::new();
        for id in ids {
            if seen.contains(&id) {
                continue;
            }
            if let Some(node) = store.get_node(&id) {
                nodes.push(node.clone());
            }
            seen.push(id);
        }
        nodes
    }

    fn publish_updates(&self, nodes: Vec<Node>) {
        for node in nodes {
            self.events.publish(GraphEvent::NodeUpdated { node });
        }
    }

    /// Insert a fully formed node under its own id (bulk population).
    pub fn add_node(&self, node: Node) -> GraphResult<NodeId> {
        let node = {
            let mut store = self.write();
            let id = store.add_node(node)?;
            Self::snapshot(&store, &id)?
        };
        let id = node.id.clone();
        self.events.publish(GraphEvent::NodeCreated { node });
        Ok(id)
    }

    pub fn get_node(&self, id: &NodeId) -> Option<Node> {
        self.read().get_node(id).cloned()
    }

    pub fn update_node(&self, id: &NodeId, update: NodeUpdate) -> GraphResult<Node> {
        let node = self.write().update_node(id, update)?.clone();
        self.events.publish(GraphEvent::NodeUpdated { node: node.clone() });
        Ok(node)
    }

    /// Delete a node and its edges; returns the number of edges removed.
    pub fn delete_node(&self, id: &NodeId) -> GraphResult<usize> {
        let (deleted_edges, updated) = {
            let mut store = self.write();
            let dependents: Vec<NodeId> = store
                .incident_edges(id)
                .flat_map(|edge| store.relationship_dependents(edge))
                .filter(|d| d != id)
                .collect();
            let deleted_edges = store.remove_node(id)?;
            (deleted_edges, Self::snapshots(&store, dependents))
        };
        debug!(node_id = %id, deleted_edges, updated = updated.len(), "deleted node");
        self.events.publish(GraphEvent::NodeDeleted {
            node_id: id.clone(),
            deleted_edges,
        });
        self.publish_updates(updated);
        Ok(deleted_edges)
    }

    // ============================================================
    // Edge mutations
    // ============================================================

    pub fn create_edge(&self, input: EdgeInput) -> GraphResult<Edge> {
        input.check()?;
        let edge = Edge::new(EdgeId::generate(), input.source, input.target, input.edge_type)
            .with_weight(input.weight);
        let updated = {
            let mut store = self.write();
            store.add_edge(edge.clone())?;
            let dependents = store.relationship_dependents(&edge);
            Self::snapshots(&store, dependents)
        };
        self.events.publish(GraphEvent::EdgeCreated { edge: edge.clone() });
        self.publish_updates(updated);
        Ok(edge)
    }

    pub fn delete_edge(&self, id: &EdgeId) -> GraphResult<Edge> {
        let (edge, updated) = {
            let mut store = self.write();
            // Dependents are resolved while the edge still links them
            let dependents = store
                .get_edge(id)
                .map(|edge| store.relationship_dependents(edge))
                .unwrap_or_default();
            let edge = store.remove_edge(id)?;
            (edge, Self::snapshots(&store, dependents))
        };
        self.events.publish(GraphEvent::EdgeDeleted { edge_id: id.clone() });
        self.publish_updates(updated);
        Ok(edge)
    }

    // ============================================================
    // Queries
    // ============================================================

    pub fn viewport(&self, request: &ViewportRequest) -> Timed<GraphData> {
        let start = Instant::now();
        let data = query::viewport_graph(&self.read(), request);
        let timed = Timed::measure(start, data);
        debug!(
            zoom_level = request.zoom_level,
            viewport_nodes = timed.data.viewport_nodes,
            query_time_ms = timed.query_time_ms,
            "viewport query"
        );
        timed
    }

    pub fn full_graph(&self, zoom_level: u8, limit: usize) -> Timed<GraphData> {
        let start = Instant::now();
        let data = query::full_graph(&self.read(), zoom_level, limit);
        Timed::measure(start, data)
    }

    pub fn search(&self, search: &SearchQuery) -> SearchResult {
        let start = Instant::now();
        let nodes = query::search(&self.read(), search);
        let timed = Timed::measure(start, nodes);
        SearchResult {
            total_count: timed.data.len(),
            nodes: timed.data,
            query_time_ms: timed.query_time_ms,
        }
    }

    pub fn quick_search(&self, text: &str, limit: usize) -> SearchResult {
        let start = Instant::now();
        let nodes = query::quick_search(&self.read(), text, limit);
        let timed = Timed::measure(start, nodes);
        SearchResult {
            total_count: timed.data.len(),
            nodes: timed.data,
            query_time_ms: timed.query_time_ms,
        }
    }

    pub fn discover(&self, request: &DiscoveryRequest) -> GraphResult<DiscoveryResult> {
        query::discover(&self.read(), request)
    }

    /// Ranked same-type nodes; an unknown id is an error rather than an empty list.
    pub fn similar(&self, id: &NodeId, limit: usize) -> GraphResult<Vec<ScoredNode>> {
        let store = self.read();
        if !store.has_node(id) {
            return Err(GraphError::NodeNotFound(id.clone()));
        }
        Ok(query::similar_nodes(&store, id, limit))
    }

    pub fn neighbors(&self, id: &NodeId, depth: usize) -> GraphResult<Vec<Node>> {
        query::neighborhood(&self.read(), id, depth)
    }

    pub fn bounds(&self) -> Bounds {
        self.read().bounds()
    }

    pub fn node_count(&self) -> usize {
        self.read().node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.read().edge_count()
    }

    pub fn stats(&self) -> GraphStats {
        let store = self.read();
        let nodes_by_type = NodeType::ALL
            .iter()
            .map(|&t| (t, store.indices().type_count(t)))
            .collect();
        let connected_components = algo::connected_components(&store).component_count();
        GraphStats {
            total_nodes: store.node_count(),
            total_edges: store.edge_count(),
            nodes_by_type,
            bounds: store.bounds(),
            connected_components,
        }
    }

    // ============================================================
    // Layout
    // ============================================================

    /// Lay out the whole graph into `[0, scale]²`, move every node, update
    /// the bounds and cache the result for the medium and detail tiers.
    pub fn compute_layout(&self, scale: f64) -> HashMap<NodeId, Position> {
        let start = Instant::now();
        let view = algo::build_view(&self.read());
        if view.node_count == 0 {
            return HashMap::new();
        }

        info!(nodes = view.node_count, edges = view.edge_count(), "computing layout");
        let config = LayoutConfig::for_node_count(view.node_count, scale, self.config.layout.seed);
        let positions = algo::layout_positions(&view, &config);

        let (moved, bounds) = {
            let mut store = self.write();
            let moved = store.publish_layout(positions.clone(), &FULL_LAYOUT_TIERS);
            (moved, store.bounds())
        };
        info!(
            nodes = moved,
            elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
            "layout computation complete"
        );

        self.events.publish(GraphEvent::LayoutComputed {
            node_count: moved,
            bounds,
        });
        positions
    }

    /// Full layout for tiers 1 and 2 plus a separate layout of the
    /// Aggregated/Blob/Project subgraph for tier 0. Returns the tier 0 layout.
    pub fn compute_hierarchical_layouts(&self) -> HashMap<NodeId, Position> {
        self.compute_layout(self.config.layout.scale);

        let view = algo::build_view_of_types(&self.read(), &NodeType::COARSE);
        if view.node_count == 0 {
            return HashMap::new();
        }
        let config = LayoutConfig {
            scale: self.config.layout.coarse_scale,
            seed: self.config.layout.seed,
            ..LayoutConfig::default()
        };
        let positions = algo::layout_positions(&view, &config);
        self.write().cache_layout(COARSE_TIER, positions.clone());
        debug!(nodes = positions.len(), "coarse layout cached");
        positions
    }

    /// Run [`GraphEngine::compute_layout`] on the blocking thread pool.
    pub fn compute_layout_in_background(&self, scale: f64) -> JoinHandle<HashMap<NodeId, Position>> {
        let engine = self.clone();
        tokio::task::spawn_blocking(move || engine.compute_layout(scale))
    }

    /// Cached layout for a tier
    pub fn layout(&self, tier: u8) -> Option<HashMap<NodeId, Position>> {
        self.read().layout(tier).cloned()
    }
}

/// Starting point for a new node: the bounds centre shifted by an
/// id-derived offset in `[-50, 50)` on both axes.
fn seed_position(id: &NodeId, bounds: &Bounds) -> Position {
    let mut hasher = FxHasher::default();
    id.hash(&mut hasher);
    let offset = (hasher.finish() % SEED_SPREAD) as f64 - (SEED_SPREAD / 2) as f64;
    let center = bounds.center();
    Position::new(center.x + offset, center.y + offset)
}
