//! Edge records
//!
//! Edges carry a source/target orientation, but the adjacency used for
//! traversal treats them as undirected.

use super::types::{EdgeId, EdgeType, NodeId};
use serde::{Deserialize, Serialize};

/// Default weight for a new edge
pub const DEFAULT_WEIGHT: f64 = 1.0;

/// A typed, weighted relationship between two nodes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    /// Unique identifier for this edge
    pub id: EdgeId,

    pub source: NodeId,

    pub target: NodeId,

    pub edge_type: EdgeType,

    #[serde(default = "default_weight")]
    pub weight: f64,

    /// Creation timestamp (Unix milliseconds)
    pub created_at: i64,
}

fn default_weight() -> f64 {
    DEFAULT_WEIGHT
}

impl Edge {
    /// Create a new edge with the default weight
    pub fn new(
        id: impl Into<EdgeId>,
        source: impl Into<NodeId>,
        target: impl Into<NodeId>,
        edge_type: EdgeType,
    ) -> Self {
        Edge {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            edge_type,
            weight: DEFAULT_WEIGHT,
            created_at: chrono::Utc::now().timestamp_millis(),
        }
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    /// Whether this edge links `a` and `b`, in either orientation
    pub fn connects(&self, a: &NodeId, b: &NodeId) -> bool {
        (&self.source == a && &self.target == b) || (&self.source == b && &self.target == a)
    }

    /// The endpoint opposite to `node`, if `node` is an endpoint
    pub fn other_end(&self, node: &NodeId) -> Option<&NodeId> {
        if &self.source == node {
            Some(&self.target)
        } else if &self.target == node {
            Some(&self.source)
        } else {
            None
        }
    }

    pub fn is_self_loop(&self) -> bool {
        self.source == self.target
    }

    /// Endpoints ordered so that `(a, b)` and `(b, a)` yield the same pair
    pub fn unordered_pair(&self) -> (&NodeId, &NodeId) {
        if self.source <= self.target {
            (&self.source, &self.target)
        } else {
            (&self.target, &self.source)
        }
    }
}
