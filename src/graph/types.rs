//! Core type definitions for the graph engine

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a node
///
/// Ids are caller-supplied strings (uuid v4 when the engine generates them)
/// and are unique across every node type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        NodeId(id.into())
    }

    /// Fresh random (v4) identifier
    pub fn generate() -> Self {
        NodeId(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for NodeId {
    fn from(id: String) -> Self {
        NodeId(id)
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        NodeId(id.to_string())
    }
}

/// Unique identifier for an edge
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(transparent)]
pub struct EdgeId(String);

impl EdgeId {
    pub fn new(id: impl Into<String>) -> Self {
        EdgeId(id.into())
    }

    pub fn generate() -> Self {
        EdgeId(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for EdgeId {
    fn from(id: String) -> Self {
        EdgeId(id)
    }
}

impl From<&str> for EdgeId {
    fn from(id: &str) -> Self {
        EdgeId(id.to_string())
    }
}

/// Closed set of node type tags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub enum NodeType {
    Individual,
    Project,
    Blob,
    Aggregated,
    Skill,
    Sector,
}

impl NodeType {
    pub const ALL: [NodeType; 6] = [
        NodeType::Individual,
        NodeType::Project,
        NodeType::Blob,
        NodeType::Aggregated,
        NodeType::Skill,
        NodeType::Sector,
    ];

    /// Organisation-level types shown at the coarse zoom tier
    pub const COARSE: [NodeType; 3] = [NodeType::Aggregated, NodeType::Blob, NodeType::Project];

    pub fn as_str(&self) -> &'static str {
        match self {
            NodeType::Individual => "Individual",
            NodeType::Project => "Project",
            NodeType::Blob => "Blob",
            NodeType::Aggregated => "Aggregated",
            NodeType::Skill => "Skill",
            NodeType::Sector => "Sector",
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Relationship type carried by an edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum EdgeType {
    /// Individual -> Blob
    MemberOf,
    /// Individual -> Project
    WorksOn,
    /// Individual -> Skill
    HasSkill,
    /// Blob -> Project
    Executes,
    /// Project -> Skill
    Requires,
    /// Blob <-> Blob
    Collaborates,
    /// Aggregated -> Blob
    Contains,
    /// Blob/Individual -> Sector
    InSector,
    /// Individual <-> Individual
    Peer,
}

impl EdgeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeType::MemberOf => "member_of",
            EdgeType::WorksOn => "works_on",
            EdgeType::HasSkill => "has_skill",
            EdgeType::Executes => "executes",
            EdgeType::Requires => "requires",
            EdgeType::Collaborates => "collaborates",
            EdgeType::Contains => "contains",
            EdgeType::InSector => "in_sector",
            EdgeType::Peer => "peer",
        }
    }
}

impl fmt::Display for EdgeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of organisational unit a Blob represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlobKind {
    Company,
    Internal,
    Independent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    #[default]
    Idea,
    InProgress,
    Finished,
    Abandoned,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectKind {
    Mission,
    #[serde(rename = "r&d")]
    ResearchAndDevelopment,
    Recruitment,
    Exploration,
}

/// A point in the layout plane
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Position { x, y }
    }
}

/// Axis-aligned rectangle in the layout plane
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl Bounds {
    pub fn new(min_x: f64, max_x: f64, min_y: f64, max_y: f64) -> Self {
        Bounds { min_x, max_x, min_y, max_y }
    }

    /// Rectangle of size `width × height` centred on `(center_x, center_y)`
    pub fn around(center_x: f64, center_y: f64, width: f64, height: f64) -> Self {
        Bounds {
            min_x: center_x - width / 2.0,
            max_x: center_x + width / 2.0,
            min_y: center_y - height / 2.0,
            max_y: center_y + height / 2.0,
        }
    }

    /// Smallest rectangle enclosing every position, padded by `margin` on
    /// each side. `None` when there are no positions.
    pub fn enclosing<'a, I>(positions: I, margin: f64) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Position>,
    {
        let mut iter = positions.into_iter();
        let first = iter.next()?;
        let mut bounds = Bounds::new(first.x, first.x, first.y, first.y);
        for p in iter {
            bounds.min_x = bounds.min_x.min(p.x);
            bounds.max_x = bounds.max_x.max(p.x);
            bounds.min_y = bounds.min_y.min(p.y);
            bounds.max_y = bounds.max_y.max(p.y);
        }
        bounds.min_x -= margin;
        bounds.max_x += margin;
        bounds.min_y -= margin;
        bounds.max_y += margin;
        Some(bounds)
    }

    /// Inclusive containment test
    pub fn contains(&self, p: &Position) -> bool {
        self.min_x <= p.x && p.x <= self.max_x && self.min_y <= p.y && p.y <= self.max_y
    }

    pub fn center(&self) -> Position {
        Position::new((self.min_x + self.max_x) / 2.0, (self.min_y + self.max_y) / 2.0)
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Bounds::new(0.0, 1000.0, 0.0, 1000.0)
    }
}
