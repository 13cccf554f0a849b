//! Query processing module
//!
//! Read-only queries over a [`GraphStore`](crate::graph::GraphStore):
//! - Zoom-aware viewport selection and full-graph dumps
//! - Relationship discovery with shortest paths
//! - Same-type similarity ranking
//! - Multi-criteria search backed by the attribute indices
//!
//! Every query is bounded: traversal depth, result limits and per-tier caps
//! keep the cost independent of the total graph size. Truncation always
//! happens over a deterministic order.

pub mod discovery;
pub mod search;
pub mod similarity;
pub mod traversal;
pub mod viewport;

// Re-export main types
pub use discovery::{discover, neighborhood, DiscoveryRequest, DiscoveryResult};
pub use search::{quick_search, search, SearchQuery, DEFAULT_SEARCH_LIMIT, QUICK_SEARCH_DEFAULT_LIMIT};
pub use similarity::{similar_nodes, similarity_score, ScoredNode};
pub use traversal::bounded_bfs;
pub use viewport::{
    full_graph, viewport_graph, GraphData, ViewportRequest, ZoomTier, DETAIL_TIER, DETAIL_TIER_NODE_CAP,
    MAX_TRAVERSAL_DEPTH, MEDIUM_TIER_INDIVIDUAL_CAP,
};
