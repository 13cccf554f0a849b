//! Creation payloads accepted by the engine
//!
//! Inputs carry only caller-settable fields. Ids, timestamps, positions and
//! relationship-derived fields are filled in by the engine.

use crate::graph::node::validate_skill_levels;
use crate::graph::{
    AggregatedAttrs, BlobAttrs, BlobKind, EdgeType, GraphError, GraphResult, IndividualAttrs, NodeId,
    NodePayload, ProjectAttrs, ProjectKind, ProjectStatus, SectorAttrs, SkillAttrs, DEFAULT_SKILL_LEVEL,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

fn default_true() -> bool {
    true
}

fn default_weight() -> f64 {
    crate::graph::edge::DEFAULT_WEIGHT
}

fn check_name(name: &str) -> GraphResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(GraphError::InvalidAttribute("name must not be empty".to_string()));
    }
    Ok(name.to_string())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndividualInput {
    pub name: String,
    #[serde(default)]
    pub skills: Vec<String>,
    /// Levels for some of `skills`; the rest default to 3
    #[serde(default)]
    pub skill_levels: BTreeMap<String, u8>,
    #[serde(default = "default_true")]
    pub availability: bool,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub sector: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
}

impl IndividualInput {
    pub fn new<I, S>(name: impl Into<String>, skills: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        IndividualInput {
            name: name.into(),
            skills: skills.into_iter().map(Into::into).collect(),
            skill_levels: BTreeMap::new(),
            availability: true,
            location: None,
            sector: None,
            bio: None,
        }
    }

    pub(crate) fn into_parts(self) -> GraphResult<(String, NodePayload)> {
        let name = check_name(&self.name)?;
        validate_skill_levels(&self.skill_levels)?;
        if let Some(skill) = self.skill_levels.keys().find(|s| !self.skills.contains(*s)) {
            return Err(GraphError::InvalidAttribute(format!(
                "skill level given for {skill}, which is not in skills"
            )));
        }

        let skill_levels = self
            .skills
            .iter()
            .map(|s| (s.clone(), self.skill_levels.get(s).copied().unwrap_or(DEFAULT_SKILL_LEVEL)))
            .collect();
        let attrs = IndividualAttrs {
            skills: self.skills,
            skill_levels,
            availability: self.availability,
            location: self.location,
            sector: self.sector,
            bio: self.bio,
            blob_memberships: Vec::new(),
        };
        Ok((name, NodePayload::Individual(attrs)))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlobInput {
    pub name: String,
    #[serde(rename = "blob_type")]
    pub blob_kind: BlobKind,
    #[serde(default)]
    pub sector: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    /// Aggregated organisation this blob belongs to; linked with a `contains` edge
    #[serde(default)]
    pub parent_aggregated_id: Option<NodeId>,
}

impl BlobInput {
    pub fn new(name: impl Into<String>, blob_kind: BlobKind) -> Self {
        BlobInput {
            name: name.into(),
            blob_kind,
            sector: None,
            description: None,
            location: None,
            parent_aggregated_id: None,
        }
    }

    pub(crate) fn into_parts(self) -> GraphResult<(String, NodePayload)> {
        let name = check_name(&self.name)?;
        let attrs = BlobAttrs {
            blob_kind: self.blob_kind,
            sector: self.sector,
            description: self.description,
            location: self.location,
            member_count: 0,
            parent_aggregated_id: None,
        };
        Ok((name, NodePayload::Blob(attrs)))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedInput {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub sector: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

impl AggregatedInput {
    pub fn new(name: impl Into<String>) -> Self {
        AggregatedInput {
            name: name.into(),
            description: None,
            sector: None,
            location: None,
        }
    }

    pub(crate) fn into_parts(self) -> GraphResult<(String, NodePayload)> {
        let name = check_name(&self.name)?;
        let attrs = AggregatedAttrs {
            description: self.description,
            sector: self.sector,
            location: self.location,
            ..AggregatedAttrs::default()
        };
        Ok((name, NodePayload::Aggregated(attrs)))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectInput {
    pub name: String,
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
}

impl ProjectInput {
    pub fn new(name: impl Into<String>, project_kind: ProjectKind) -> Self {
        ProjectInput {
            name: name.into(),
            project_kind,
            status: ProjectStatus::default(),
            description: None,
            required_skills: Vec::new(),
            sector: None,
            location: None,
        }
    }

    pub(crate) fn into_parts(self) -> GraphResult<(String, NodePayload)> {
        let name = check_name(&self.name)?;
        let attrs = ProjectAttrs {
            status: self.status,
            description: self.description,
            required_skills: self.required_skills,
            sector: self.sector,
            location: self.location,
            ..ProjectAttrs::new(self.project_kind)
        };
        Ok((name, NodePayload::Project(attrs)))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillInput {
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
}

impl SkillInput {
    pub fn new(name: impl Into<String>) -> Self {
        SkillInput {
            name: name.into(),
            category: None,
        }
    }

    pub(crate) fn into_parts(self) -> GraphResult<(String, NodePayload)> {
        let name = check_name(&self.name)?;
        let attrs = SkillAttrs {
            category: self.category,
            individual_count: 0,
        };
        Ok((name, NodePayload::Skill(attrs)))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectorInput {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl SectorInput {
    pub fn new(name: impl Into<String>) -> Self {
        SectorInput {
            name: name.into(),
            description: None,
        }
    }

    pub(crate) fn into_parts(self) -> GraphResult<(String, NodePayload)> {
        let name = check_name(&self.name)?;
        Ok((name, NodePayload::Sector(SectorAttrs { description: self.description })))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeInput {
    pub source: NodeId,
    pub target: NodeId,
    pub edge_type: EdgeType,
    #[serde(default = "default_weight")]
    pub weight: f64,
}

impl EdgeInput {
    pub fn new(source: impl Into<NodeId>, target: impl Into<NodeId>, edge_type: EdgeType) -> Self {
        EdgeInput {
            source: source.into(),
            target: target.into(),
            edge_type,
            weight: default_weight(),
        }
    }

    pub fn weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    pub(crate) fn check(&self) -> GraphResult<()> {
        if !self.weight.is_finite() || self.weight < 0.0 {
            return Err(GraphError::InvalidAttribute(format!(
                "edge weight must be a non-negative number, got {}",
                self.weight
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_individual_levels_default() {
        let mut input = IndividualInput::new("Ada", ["Rust", "Go"]);
        input.skill_levels.insert("Rust".to_string(), 5);
        let (name, payload) = input.into_parts().unwrap();
        assert_eq!(name, "Ada");
        let NodePayload::Individual(attrs) = payload else {
            panic!("expected an individual");
        };
        assert_eq!(attrs.skill_levels.get("Rust"), Some(&5));
        assert_eq!(attrs.skill_levels.get("Go"), Some(&DEFAULT_SKILL_LEVEL));
    }

    #[test]
    fn test_validation() {
        assert!(IndividualInput::new("   ", ["Rust"]).into_parts().is_err());

        let mut input = IndividualInput::new("Ada", ["Rust"]);
        input.skill_levels.insert("Rust".to_string(), 0);
        assert!(matches!(input.into_parts(), Err(GraphError::InvalidAttribute(_))));

        let mut input = IndividualInput::new("Ada", ["Rust"]);
        input.skill_levels.insert("Go".to_string(), 2);
        assert!(input.into_parts().is_err());

        assert!(EdgeInput::new("a", "b", EdgeType::Peer).weight(f64::NAN).check().is_err());
        assert!(EdgeInput::new("a", "b", EdgeType::Peer).check().is_ok());
    }

    #[test]
    fn test_wire_names() {
        let input: ProjectInput =
            serde_json::from_str(r#"{"name":"Atlas","project_type":"r&d","required_skills":["ML"]}"#).unwrap();
        assert_eq!(input.project_kind, ProjectKind::ResearchAndDevelopment);
        assert_eq!(input.status, ProjectStatus::Idea);

        let input: BlobInput = serde_json::from_str(r#"{"name":"Core","blob_type":"Internal"}"#).unwrap();
        assert_eq!(input.blob_kind, BlobKind::Internal);

        let input: IndividualInput = serde_json::from_str(r#"{"name":"Lin"}"#).unwrap();
        assert!(input.availability);
    }
}
