//! Core graph model
//!
//! This module implements the typed entity graph:
//! - Nodes with a closed set of types and type-specific attributes
//! - Typed, weighted edges traversed as undirected
//! - In-memory storage with attribute indices and derived relationship fields
//! - Change events for external consumers

pub mod edge;
pub mod event;
pub mod node;
pub mod store;
pub mod types;

// Re-export main types
pub use edge::Edge;
pub use event::{EventBus, GraphEvent};
pub use node::{
    AggregatedAttrs, BlobAttrs, IndividualAttrs, Node, NodePayload, NodeUpdate, ProjectAttrs,
    SectorAttrs, SkillAttrs, DEFAULT_SKILL_LEVEL,
};
pub use store::{GraphError, GraphResult, GraphStore, BOUNDS_MARGIN};
pub use types::{
    BlobKind, Bounds, EdgeId, EdgeType, NodeId, NodeType, Position, ProjectKind, ProjectStatus,
};
