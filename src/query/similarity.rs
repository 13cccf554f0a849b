//! Attribute-overlap similarity among nodes of the same type

use crate::graph::{GraphStore, Node, NodeId};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeSet;

const SHARED_SKILL_SCORE: f64 = 2.0;
const SAME_SECTOR_SCORE: f64 = 3.0;
const SAME_LOCATION_SCORE: f64 = 1.0;

/// A candidate together with its similarity score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredNode {
    pub node: Node,
    pub score: f64,
}

/// Similarity of `candidate` to `source`:
/// 2 per shared skill, 3 for an identical sector, 1 for an identical location.
/// Values are compared exactly as stored.
pub fn similarity_score(source: &Node, candidate: &Node) -> f64 {
    let source_skills: BTreeSet<&str> = source.skills().iter().map(String::as_str).collect();
    let shared = candidate
        .skills()
        .iter()
        .map(String::as_str)
        .collect::<BTreeSet<_>>()
        .intersection(&source_skills)
        .count();

    let mut score = shared as f64 * SHARED_SKILL_SCORE;
    if matches!(source.sector(), Some(s) if !s.is_empty() && candidate.sector() == Some(s)) {
        score += SAME_SECTOR_SCORE;
    }
    if matches!(source.location(), Some(l) if !l.is_empty() && candidate.location() == Some(l)) {
        score += SAME_LOCATION_SCORE;
    }
    score
}

/// Up to `limit` nodes of the same type as `node_id`, best first; ties are
/// ordered by id. An unknown source yields an empty list.
pub fn similar_nodes(store: &GraphStore, node_id: &NodeId, limit: usize) -> Vec<ScoredNode> {
    let Some(source) = store.get_node(node_id) else {
        return Vec::new();
    };

    let mut scored: Vec<(f64, &Node)> = store
        .nodes_of_type(source.node_type())
        .filter(|id| *id != node_id)
        .filter_map(|id| store.get_node(id))
        .map(|candidate| (similarity_score(source, candidate), candidate))
        .filter(|(score, _)| *score > 0.0)
        .collect();

    scored.sort_by(|(sa, a), (sb, b)| {
        sb.partial_cmp(sa)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.id.cmp(&b.id))
    });

    scored
        .into_iter()
        .take(limit)
        .map(|(score, node)| ScoredNode {
            node: node.clone(),
            score,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{IndividualAttrs, NodePayload, ProjectAttrs, ProjectKind};

    fn person(id: &str, skills: &[&str], sector: Option<&str>, location: Option<&str>) -> Node {
        let mut attrs = IndividualAttrs::with_skills(skills.iter().copied());
        attrs.sector = sector.map(str::to_string);
        attrs.location = location.map(str::to_string);
        Node::new(id, id, NodePayload::Individual(attrs))
    }

    #[test]
    fn test_one_shared_skill_scores_two() {
        let mut store = GraphStore::new();
        store.add_node(person("ada", &["Rust", "Go"], None, None)).unwrap();
        store.add_node(person("lin", &["Go", "SQL"], None, None)).unwrap();

        let similar = similar_nodes(&store, &NodeId::new("ada"), 10);
        assert_eq!(similar.len(), 1);
        assert_eq!(similar[0].node.id.as_str(), "lin");
        assert_eq!(similar[0].score, 2.0);
    }

    #[test]
    fn test_excludes_self_other_types_and_zero_scores() {
        let mut store = GraphStore::new();
        store.add_node(person("ada", &["Rust"], Some("Fintech"), Some("Berlin"))).unwrap();
        store.add_node(person("bob", &["Cobol"], None, None)).unwrap();
        let mut project = ProjectAttrs::new(ProjectKind::Mission);
        project.required_skills = vec!["Rust".to_string()];
        project.sector = Some("Fintech".to_string());
        store.add_node(Node::new("proj", "Proj", NodePayload::Project(project))).unwrap();

        assert!(similar_nodes(&store, &NodeId::new("ada"), 10).is_empty());
        assert!(similar_nodes(&store, &NodeId::new("ghost"), 10).is_empty());
    }

    #[test]
    fn test_ranking_and_tie_break() {
        let mut store = GraphStore::new();
        store.add_node(person("ada", &["Rust"], Some("Fintech"), Some("Berlin"))).unwrap();
        store.add_node(person("zed", &["Rust"], None, None)).unwrap();
        store.add_node(person("bea", &["Rust"], None, None)).unwrap();
        store.add_node(person("max", &[], Some("Fintech"), Some("Berlin"))).unwrap();
        store.add_node(person("low", &[], Some("fintech"), Some("Berlin"))).unwrap();

        let similar = similar_nodes(&store, &NodeId::new("ada"), 10);
        let ranked: Vec<(&str, f64)> = similar.iter().map(|s| (s.node.id.as_str(), s.score)).collect();
        assert_eq!(
            ranked,
            vec![("max", 4.0), ("bea", 2.0), ("zed", 2.0), ("low", 1.0)]
        );

        assert_eq!(similar_nodes(&store, &NodeId::new("ada"), 2).len(), 2);
    }
}
