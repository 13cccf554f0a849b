//! Graph change events
//!
//! Every mutation made through the engine is announced on an [`EventBus`]
//! so that external consumers (a push channel, a cache, a logger) can follow
//! the graph. Delivery is fire-and-forget: a bus with no subscribers, or a
//! slow subscriber that lags behind, never blocks or fails a mutation.

use super::edge::Edge;
use super::node::Node;
use super::types::{Bounds, EdgeId, NodeId};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// A change that has already been applied to the graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GraphEvent {
    NodeCreated {
        node: Node,
    },
    NodeUpdated {
        node: Node,
    },
    NodeDeleted {
        node_id: NodeId,
        /// Number of incident edges removed with the node
        deleted_edges: usize,
    },
    EdgeCreated {
        edge: Edge,
    },
    EdgeDeleted {
        edge_id: EdgeId,
    },
    LayoutComputed {
        node_count: usize,
        bounds: Bounds,
    },
}

impl GraphEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            GraphEvent::NodeCreated { .. } => "node_created",
            GraphEvent::NodeUpdated { .. } => "node_updated",
            GraphEvent::NodeDeleted { .. } => "node_deleted",
            GraphEvent::EdgeCreated { .. } => "edge_created",
            GraphEvent::EdgeDeleted { .. } => "edge_deleted",
            GraphEvent::LayoutComputed { .. } => "layout_computed",
        }
    }

    /// JSON message as pushed to clients
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Broadcast channel for [`GraphEvent`]s
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<GraphEvent>,
}

impl EventBus {
    /// Create a bus that buffers up to `capacity` events per subscriber
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        EventBus { sender }
    }

    /// Announce an event. Returns the number of subscribers reached.
    pub fn publish(&self, event: GraphEvent) -> usize {
        let kind = event.kind();
        match self.sender.send(event) {
            Ok(receivers) => receivers,
            Err(_) => {
                tracing::trace!(event = kind, "no subscribers for graph event");
                0
            }
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<GraphEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        EventBus::new(1024)
    }
}
