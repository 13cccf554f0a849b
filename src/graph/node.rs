//! Node records and their type-specific attribute payloads
//!
//! A node carries the attributes common to every entity (id, display name,
//! position, creation time) plus a [`NodePayload`] variant holding only the
//! fields that make sense for its type. Fields describing relationships
//! (member counts, membership lists, assignments) are derived from edges and
//! maintained by the [`GraphStore`](super::GraphStore), never set directly.

use super::store::{GraphError, GraphResult};
use super::types::{BlobKind, NodeId, NodeType, Position, ProjectKind, ProjectStatus};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Proficiency assigned to a skill when none is given
pub const DEFAULT_SKILL_LEVEL: u8 = 3;

const MIN_SKILL_LEVEL: u8 = 1;
const MAX_SKILL_LEVEL: u8 = 5;

/// A typed entity in the graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Unique identifier for this node
    pub id: NodeId,

    /// Display name
    pub name: String,

    /// Current layout position
    #[serde(flatten)]
    pub position: Position,

    /// Creation timestamp (Unix milliseconds)
    pub created_at: i64,

    /// Type tag and type-specific attributes
    #[serde(flatten)]
    pub payload: NodePayload,
}

/// Type-specific attributes, tagged by `node_type` on the wire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "node_type")]
pub enum NodePayload {
    Individual(IndividualAttrs),
    Project(ProjectAttrs),
    Blob(BlobAttrs),
    Aggregated(AggregatedAttrs),
    Skill(SkillAttrs),
    Sector(SectorAttrs),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndividualAttrs {
    pub skills: Vec<String>,
    /// skill -> proficiency (1..=5)
    pub skill_levels: BTreeMap<String, u8>,
    pub availability: bool,
    pub location: Option<String>,
    pub sector: Option<String>,
    pub bio: Option<String>,
    /// Blobs this individual is a member of (derived from `member_of` edges)
    pub blob_memberships: Vec<NodeId>,
}

impl Default for IndividualAttrs {
    fn default() -> Self {
        IndividualAttrs {
            skills: Vec::new(),
            skill_levels: BTreeMap::new(),
            availability: true,
            location: None,
            sector: None,
            bio: None,
            blob_memberships: Vec::new(),
        }
    }
}

impl IndividualAttrs {
    /// Attributes with the given skills, each at the default level
    pub fn with_skills<I, S>(skills: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let skills: Vec<String> = skills.into_iter().map(Into::into).collect();
        let skill_levels = skills
            .iter()
            .map(|s| (s.clone(), DEFAULT_SKILL_LEVEL))
            .collect();
        IndividualAttrs {
            skills,
            skill_levels,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlobAttrs {
    #[serde(rename = "blob_type")]
    pub blob_kind: BlobKind,
    #[serde(default)]
    pub sector: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    /// Number of `member_of` edges pointing at this blob
    #[serde(default)]
    pub member_count: u32,
    #[serde(default)]
    pub parent_aggregated_id: Option<NodeId>,
}

impl BlobAttrs {
    pub fn new(blob_kind: BlobKind) -> Self {
        BlobAttrs {
            blob_kind,
            sector: None,
            description: None,
            location: None,
            member_count: 0,
            parent_aggregated_id: None,
        }
    }
}

/// A large organisation made of several Blob sub-units
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregatedAttrs {
    pub description: Option<String>,
    pub sector: Option<String>,
    pub location: Option<String>,
    /// Blobs linked by `contains` edges
    pub child_blob_ids: Vec<NodeId>,
    /// Sum of `member_count` over `child_blob_ids`
    pub total_member_count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectAttrs {
    #[serde(rename = "project_type")]
    pub project_kind: ProjectKind,
    #[serde(default)]
    pub status: ProjectStatus,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub required_skills: Vec<String>,
    #[serde(default)]
    pub sector: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub assigned_blob_ids: Vec<NodeId>,
    #[serde(default)]
    pub assigned_individual_ids: Vec<NodeId>,
}

impl ProjectAttrs {
    pub fn new(project_kind: ProjectKind) -> Self {
        ProjectAttrs {
            project_kind,
            status: ProjectStatus::default(),
            description: None,
            required_skills: Vec::new(),
            sector: None,
            location: None,
            assigned_blob_ids: Vec::new(),
            assigned_individual_ids: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SkillAttrs {
    pub category: Option<String>,
    /// Number of `has_skill` edges pointing at this skill
    pub individual_count: u32,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SectorAttrs {
    pub description: Option<String>,
}

impl NodePayload {
    pub fn node_type(&self) -> NodeType {
        match self {
            NodePayload::Individual(_) => NodeType::Individual,
            NodePayload::Project(_) => NodeType::Project,
            NodePayload::Blob(_) => NodeType::Blob,
            NodePayload::Aggregated(_) => NodeType::Aggregated,
            NodePayload::Skill(_) => NodeType::Skill,
            NodePayload::Sector(_) => NodeType::Sector,
        }
    }
}

impl Node {
    /// Create a node at the origin, stamped with the current time
    pub fn new(id: impl Into<NodeId>, name: impl Into<String>, payload: NodePayload) -> Self {
        Node {
            id: id.into(),
            name: name.into(),
            position: Position::default(),
            created_at: chrono::Utc::now().timestamp_millis(),
            payload,
        }
    }

    pub fn with_position(mut self, position: Position) -> Self {
        self.position = position;
        self
    }

    pub fn node_type(&self) -> NodeType {
        self.payload.node_type()
    }

    /// Skills held (Individual) or required (Project); empty otherwise
    pub fn skills(&self) -> &[String] {
        match &self.payload {
            NodePayload::Individual(a) => &a.skills,
            NodePayload::Project(a) => &a.required_skills,
            _ => &[],
        }
    }

    pub fn sector(&self) -> Option<&str> {
        match &self.payload {
            NodePayload::Individual(a) => a.sector.as_deref(),
            NodePayload::Blob(a) => a.sector.as_deref(),
            NodePayload::Aggregated(a) => a.sector.as_deref(),
            NodePayload::Project(a) => a.sector.as_deref(),
            NodePayload::Skill(_) | NodePayload::Sector(_) => None,
        }
    }

    pub fn location(&self) -> Option<&str> {
        match &self.payload {
            NodePayload::Individual(a) => a.location.as_deref(),
            NodePayload::Blob(a) => a.location.as_deref(),
            NodePayload::Aggregated(a) => a.location.as_deref(),
            NodePayload::Project(a) => a.location.as_deref(),
            NodePayload::Skill(_) | NodePayload::Sector(_) => None,
        }
    }

    pub fn description(&self) -> Option<&str> {
        match &self.payload {
            NodePayload::Blob(a) => a.description.as_deref(),
            NodePayload::Aggregated(a) => a.description.as_deref(),
            NodePayload::Project(a) => a.description.as_deref(),
            NodePayload::Sector(a) => a.description.as_deref(),
            NodePayload::Individual(_) | NodePayload::Skill(_) => None,
        }
    }

    pub fn bio(&self) -> Option<&str> {
        match &self.payload {
            NodePayload::Individual(a) => a.bio.as_deref(),
            _ => None,
        }
    }

    /// Availability flag; only Individuals carry one
    pub fn availability(&self) -> Option<bool> {
        match &self.payload {
            NodePayload::Individual(a) => Some(a.availability),
            _ => None,
        }
    }

    /// Headcount: `member_count` for Blobs, `total_member_count` for Aggregated
    pub fn size(&self) -> Option<u32> {
        match &self.payload {
            NodePayload::Blob(a) => Some(a.member_count),
            NodePayload::Aggregated(a) => Some(a.total_member_count),
            _ => None,
        }
    }

    /// Lower-cased name, description, bio and skills joined by spaces
    pub fn searchable_text(&self) -> String {
        let mut parts: Vec<&str> = vec![
            self.name.as_str(),
            self.description().unwrap_or(""),
            self.bio().unwrap_or(""),
        ];
        parts.extend(self.skills().iter().map(String::as_str));
        parts.join(" ").to_lowercase()
    }

    /// Reset relationship-derived fields; a freshly inserted node has no edges yet.
    pub(crate) fn clear_derived(&mut self) {
        match &mut self.payload {
            NodePayload::Individual(a) => a.blob_memberships.clear(),
            NodePayload::Blob(a) => {
                a.member_count = 0;
                a.parent_aggregated_id = None;
            }
            NodePayload::Aggregated(a) => {
                a.child_blob_ids.clear();
                a.total_member_count = 0;
            }
            NodePayload::Project(a) => {
                a.assigned_blob_ids.clear();
                a.assigned_individual_ids.clear();
            }
            NodePayload::Skill(a) => a.individual_count = 0,
            NodePayload::Sector(_) => {}
        }
    }

    /// Copy relationship-derived fields from the record this one replaces.
    /// Both records must have the same type.
    pub(crate) fn inherit_derived(&mut self, previous: &Node) {
        match (&mut self.payload, &previous.payload) {
            (NodePayload::Individual(a), NodePayload::Individual(p)) => {
                a.blob_memberships = p.blob_memberships.clone();
            }
            (NodePayload::Blob(a), NodePayload::Blob(p)) => {
                a.member_count = p.member_count;
                a.parent_aggregated_id = p.parent_aggregated_id.clone();
            }
            (NodePayload::Aggregated(a), NodePayload::Aggregated(p)) => {
                a.child_blob_ids = p.child_blob_ids.clone();
                a.total_member_count = p.total_member_count;
            }
            (NodePayload::Project(a), NodePayload::Project(p)) => {
                a.assigned_blob_ids = p.assigned_blob_ids.clone();
                a.assigned_individual_ids = p.assigned_individual_ids.clone();
            }
            (NodePayload::Skill(a), NodePayload::Skill(p)) => {
                a.individual_count = p.individual_count;
            }
            _ => {}
        }
    }

    /// Validate that every supplied field exists on this node's type.
    pub fn check_update(&self, update: &NodeUpdate) -> GraphResult<()> {
        let node_type = self.node_type();
        let invalid = |field: &str| {
            Err(GraphError::InvalidAttribute(format!(
                "{field} does not apply to {node_type} nodes"
            )))
        };

        if matches!(&update.name, Some(name) if name.trim().is_empty()) {
            return Err(GraphError::InvalidAttribute("name must not be empty".to_string()));
        }
        if update.skills.is_some() && !matches!(node_type, NodeType::Individual | NodeType::Project) {
            return invalid("skills");
        }
        if let Some(levels) = &update.skill_levels {
            if node_type != NodeType::Individual {
                return invalid("skill_levels");
            }
            validate_skill_levels(levels)?;
        }
        if update.availability.is_some() && node_type != NodeType::Individual {
            return invalid("availability");
        }
        if update.bio.is_some() && node_type != NodeType::Individual {
            return invalid("bio");
        }
        let placed = !matches!(node_type, NodeType::Skill | NodeType::Sector);
        if update.location.is_some() && !placed {
            return invalid("location");
        }
        if update.sector.is_some() && !placed {
            return invalid("sector");
        }
        if update.description.is_some()
            && matches!(node_type, NodeType::Individual | NodeType::Skill)
        {
            return invalid("description");
        }
        if update.status.is_some() && node_type != NodeType::Project {
            return invalid("status");
        }
        if update.category.is_some() && node_type != NodeType::Skill {
            return invalid("category");
        }
        Ok(())
    }

    /// Merge the supplied fields. Call [`Node::check_update`] first; fields
    /// that do not apply to this type are ignored here.
    pub(crate) fn apply_update(&mut self, update: NodeUpdate) {
        if let Some(name) = update.name {
            self.name = name;
        }

        match &mut self.payload {
            NodePayload::Individual(a) => {
                if let Some(skills) = update.skills {
                    a.skill_levels.retain(|skill, _| skills.contains(skill));
                    for skill in &skills {
                        a.skill_levels.entry(skill.clone()).or_insert(DEFAULT_SKILL_LEVEL);
                    }
                    a.skills = skills;
                }
                if let Some(levels) = update.skill_levels {
                    a.skill_levels.extend(levels);
                }
                if let Some(availability) = update.availability {
                    a.availability = availability;
                }
                merge(&mut a.location, update.location);
                merge(&mut a.sector, update.sector);
                merge(&mut a.bio, update.bio);
            }
            NodePayload::Blob(a) => {
                merge(&mut a.location, update.location);
                merge(&mut a.sector, update.sector);
                merge(&mut a.description, update.description);
            }
            NodePayload::Aggregated(a) => {
                merge(&mut a.location, update.location);
                merge(&mut a.sector, update.sector);
                merge(&mut a.description, update.description);
            }
            NodePayload::Project(a) => {
                if let Some(skills) = update.skills {
                    a.required_skills = skills;
                }
                if let Some(status) = update.status {
                    a.status = status;
                }
                merge(&mut a.location, update.location);
                merge(&mut a.sector, update.sector);
                merge(&mut a.description, update.description);
            }
            NodePayload::Skill(a) => merge(&mut a.category, update.category),
            NodePayload::Sector(a) => merge(&mut a.description, update.description),
        }
    }
}

fn merge(slot: &mut Option<String>, value: Option<Option<String>>) {
    if let Some(value) = value {
        *slot = value;
    }
}

pub(crate) fn validate_skill_levels(levels: &BTreeMap<String, u8>) -> GraphResult<()> {
    for (skill, level) in levels {
        if !(MIN_SKILL_LEVEL..=MAX_SKILL_LEVEL).contains(level) {
            return Err(GraphError::InvalidAttribute(format!(
                "skill level for {skill} must be between {MIN_SKILL_LEVEL} and {MAX_SKILL_LEVEL}, got {level}"
            )));
        }
    }
    Ok(())
}

/// Partial update with merge semantics: `None` leaves a field untouched.
///
/// Optional text fields are doubly optional so they can be cleared:
/// `Some(None)` (JSON `null`) removes the value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeUpdate {
    pub name: Option<String>,
    pub skills: Option<Vec<String>>,
    pub skill_levels: Option<BTreeMap<String, u8>>,
    pub availability: Option<bool>,
    #[serde(deserialize_with = "present")]
    pub location: Option<Option<String>>,
    #[serde(deserialize_with = "present")]
    pub sector: Option<Option<String>>,
    #[serde(deserialize_with = "present")]
    pub bio: Option<Option<String>>,
    #[serde(deserialize_with = "present")]
    pub description: Option<Option<String>>,
    pub status: Option<ProjectStatus>,
    #[serde(deserialize_with = "present")]
    pub category: Option<Option<String>>,
}

/// A field that is present on the wire is `Some`, even when its value is null.
fn present<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

impl NodeUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn skills<I, S>(mut self, skills: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.skills = Some(skills.into_iter().map(Into::into).collect());
        self
    }

    pub fn availability(mut self, availability: bool) -> Self {
        self.availability = Some(availability);
        self
    }

    pub fn location(mut self, location: Option<&str>) -> Self {
        self.location = Some(location.map(str::to_string));
        self
    }

    pub fn sector(mut self, sector: Option<&str>) -> Self {
        self.sector = Some(sector.map(str::to_string));
        self
    }

    pub fn description(mut self, description: Option<&str>) -> Self {
        self.description = Some(description.map(str::to_string));
        self
    }

    pub fn status(mut self, status: ProjectStatus) -> Self {
        self.status = Some(status);
        self
    }
}
