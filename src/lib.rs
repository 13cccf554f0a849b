//! Blobs Graph Engine
//!
//! An in-memory graph of professional-network entities (individuals, teams,
//! organisations, projects, skills and sectors) with zoom-aware viewport
//! queries, relationship discovery, similarity ranking, attribute search and
//! force-directed layout.
//!
//! # Architecture
//!
//! - [`graph`]: typed node and edge records, the [`GraphStore`] that keeps
//!   records, incidence lists, indices and relationship-derived fields
//!   consistent, and the [`EventBus`] for change notifications
//! - [`index`]: secondary indices by type, skill, sector and location
//! - [`algo`]: bridges the store to the `blobs-graph-algorithms` crate
//!   (spring layout, connected components)
//! - [`query`]: viewport, discovery, similarity and search over a store
//! - [`engine`]: [`GraphEngine`], the shared concurrent context with timing
//!   metadata and background layout
//! - [`config`]: YAML + environment configuration
//!
//! ## Example Usage
//!
//! ```rust
//! use blobs_graph::engine::{BlobInput, EdgeInput, IndividualInput};
//! use blobs_graph::{BlobKind, EdgeType, GraphEngine, SearchQuery};
//!
//! let engine = GraphEngine::default();
//!
//! let ada = engine.create_individual(IndividualInput::new("Ada", ["Rust", "Python"])).unwrap();
//! let team = engine.create_blob(BlobInput::new("Core Infra", BlobKind::Internal)).unwrap();
//! engine.create_edge(EdgeInput::new(ada.id.clone(), team.id.clone(), EdgeType::MemberOf)).unwrap();
//!
//! let hits = engine.search(&SearchQuery::new().skills(["python"]));
//! assert_eq!(hits.total_count, 1);
//!
//! let team = engine.get_node(&team.id).unwrap();
//! assert_eq!(team.size(), Some(1));
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]

pub mod algo;
pub mod config;
pub mod engine;
pub mod graph;
pub mod index;
pub mod query;

// Re-export main types for convenience
pub use graph::{
    BlobKind, Bounds, Edge, EdgeId, EdgeType, EventBus, GraphError, GraphEvent, GraphResult, GraphStore, Node,
    NodeId, NodePayload, NodeType, NodeUpdate, Position, ProjectKind, ProjectStatus,
};

pub use query::{
    DiscoveryRequest, DiscoveryResult, GraphData, ScoredNode, SearchQuery, ViewportRequest, ZoomTier,
};

pub use engine::{GraphEngine, GraphStats, SearchResult, Timed};

pub use config::{ConfigError, EngineConfig};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get version string
pub fn version() -> &'static str {
    VERSION
}
