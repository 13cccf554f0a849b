//! Multi-criteria search
//!
//! Two stages: the attribute indices narrow the candidate set, then every
//! remaining candidate is checked against the filters that have no index
//! (free text, availability, size). Candidates are scanned in ascending id
//! order, so truncation at `limit` is reproducible.

use crate::graph::{GraphStore, Node, NodeId, NodeType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub const DEFAULT_SEARCH_LIMIT: usize = 50;
pub const QUICK_SEARCH_DEFAULT_LIMIT: usize = 20;
pub const QUICK_SEARCH_MAX_LIMIT: usize = 100;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchQuery {
    /// Case-insensitive substring over name, description, bio and skills
    pub query: Option<String>,
    /// Any of these types; empty means every type
    pub node_types: Vec<NodeType>,
    /// Any of these skills; empty means no skill filter
    pub skills: Vec<String>,
    /// Applies to Individuals only
    pub availability: Option<bool>,
    /// Substring of the location
    pub location: Option<String>,
    /// Exact sector, case-insensitive
    pub sector: Option<String>,
    pub min_size: Option<u32>,
    pub max_size: Option<u32>,
    pub limit: usize,
}

impl Default for SearchQuery {
    fn default() -> Self {
        SearchQuery {
            query: None,
            node_types: Vec::new(),
            skills: Vec::new(),
            availability: None,
            location: None,
            sector: None,
            min_size: None,
            max_size: None,
            limit: DEFAULT_SEARCH_LIMIT,
        }
    }
}

impl SearchQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Text-only query
    pub fn text(query: impl Into<String>) -> Self {
        SearchQuery {
            query: Some(query.into()),
            ..Self::default()
        }
    }

    pub fn node_types(mut self, types: impl IntoIterator<Item = NodeType>) -> Self {
        self.node_types = types.into_iter().collect();
        self
    }

    pub fn skills<I, S>(mut self, skills: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.skills = skills.into_iter().map(Into::into).collect();
        self
    }

    pub fn availability(mut self, availability: bool) -> Self {
        self.availability = Some(availability);
        self
    }

    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn sector(mut self, sector: impl Into<String>) -> Self {
        self.sector = Some(sector.into());
        self
    }

    pub fn size_range(mut self, min_size: Option<u32>, max_size: Option<u32>) -> Self {
        self.min_size = min_size;
        self.max_size = max_size;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }
}

/// Intersect `acc` with `set`; `None` stands for "every node"
fn narrow(acc: Option<BTreeSet<NodeId>>, set: BTreeSet<NodeId>) -> Option<BTreeSet<NodeId>> {
    Some(match acc {
        None => set,
        Some(acc) => acc.intersection(&set).cloned().collect(),
    })
}

/// Stage 1: candidate ids from the indices, ascending
fn index_candidates(store: &GraphStore, query: &SearchQuery) -> BTreeSet<NodeId> {
    let indices = store.indices();
    let mut candidates: Option<BTreeSet<NodeId>> = None;

    if !query.node_types.is_empty() {
        let by_type = query
            .node_types
            .iter()
            .flat_map(|&t| indices.nodes_of_type(t))
            .cloned()
            .collect();
        candidates = narrow(candidates, by_type);
    }
    if !query.skills.is_empty() {
        let by_skill = indices.by_skill().any_of(query.skills.iter().map(String::as_str));
        candidates = narrow(candidates, by_skill);
    }
    if let Some(sector) = query.sector.as_deref().filter(|s| !s.is_empty()) {
        let by_sector = indices.by_sector().get(sector).cloned().unwrap_or_default();
        candidates = narrow(candidates, by_sector);
    }
    if let Some(location) = query.location.as_deref().filter(|s| !s.is_empty()) {
        candidates = narrow(candidates, indices.by_location().containing(location));
    }

    candidates.unwrap_or_else(|| store.nodes().map(|n| n.id.clone()).collect())
}

/// Stage 2: the filters with no backing index
fn matches_record(node: &Node, query: &SearchQuery, text: Option<&str>) -> bool {
    if let Some(text) = text {
        if !node.searchable_text().contains(text) {
            return false;
        }
    }
    if let (Some(wanted), Some(available)) = (query.availability, node.availability()) {
        if wanted != available {
            return false;
        }
    }
    let size = node.size().unwrap_or(0);
    if query.min_size.is_some_and(|min| size < min) {
        return false;
    }
    if query.max_size.is_some_and(|max| size > max) {
        return false;
    }
    true
}

/// Run a search; at most `query.limit` records are returned.
pub fn search(store: &GraphStore, query: &SearchQuery) -> Vec<Node> {
    if query.limit == 0 {
        return Vec::new();
    }
    let text = query
        .query
        .as_deref()
        .filter(|q| !q.is_empty())
        .map(str::to_lowercase);

    index_candidates(store, query)
        .iter()
        .filter_map(|id| store.get_node(id))
        .filter(|node| matches_record(node, query, text.as_deref()))
        .take(query.limit)
        .cloned()
        .collect()
}

/// Text-only search with the limit clamped to `1..=100`
pub fn quick_search(store: &GraphStore, text: &str, limit: usize) -> Vec<Node> {
    let query = SearchQuery::text(text).limit(limit.clamp(1, QUICK_SEARCH_MAX_LIMIT));
    search(store, &query)
}
