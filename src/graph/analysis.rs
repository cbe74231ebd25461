//! Structural analysis over the current graph snapshot.
//!
//! Every function here is pure: it reads the graph and returns a report.
//! Relationships with a missing endpoint are ignored throughout.
//!
//! # Modes
//!
//! - **Connectivity**: undirected connected components
//! - **Centrality**: degree centrality (bidirectional edges count twice)
//! - **Component summary**: per-component type histogram, dominant type and
//!   mean internal strength. This is what callers call "community
//!   detection"; it is connected components with labels, not modularity
//!   clustering.
//! - **Dependencies**: `depends_on`/`references` edges, critical edges and
//!   two-node cycles. Cycles of three or more nodes are not detected.

use super::WorkflowGraph;
use crate::models::graph::UnionFind;
use crate::models::{EntityType, Relationship};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Strength above which a dependency is considered critical.
pub const CRITICAL_STRENGTH: f64 = 0.7;

/// Number of entities reported by centrality analysis.
pub const TOP_CENTRAL: usize = 5;

/// Which analysis to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisMode {
    Connectivity,
    Centrality,
    Communities,
    Dependencies,
}

impl std::str::FromStr for AnalysisMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "connectivity" | "components" => Ok(AnalysisMode::Connectivity),
            "centrality" => Ok(AnalysisMode::Centrality),
            "communities" | "community" => Ok(AnalysisMode::Communities),
            "dependencies" | "dependency" => Ok(AnalysisMode::Dependencies),
            _ => Err(format!("Unknown analysis mode: {}", s)),
        }
    }
}

/// Result of one analysis mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum StructuralAnalysis {
    Connectivity(ConnectivityReport),
    Centrality(CentralityReport),
    Communities(CommunityReport),
    Dependencies(DependencyReport),
}

/// Run one analysis mode.
pub fn analyze_structure(graph: &WorkflowGraph, mode: AnalysisMode) -> StructuralAnalysis {
    tracing::debug!(?mode, entities = graph.statistics().entity_count, "structural analysis");
    match mode {
        AnalysisMode::Connectivity => StructuralAnalysis::Connectivity(connectivity(graph)),
        AnalysisMode::Centrality => StructuralAnalysis::Centrality(centrality(graph)),
        AnalysisMode::Communities => StructuralAnalysis::Communities(communities(graph)),
        AnalysisMode::Dependencies => StructuralAnalysis::Dependencies(dependencies(graph)),
    }
}

/// Relationships whose endpoints both exist.
fn live_relationships(graph: &WorkflowGraph) -> impl Iterator<Item = &Relationship> {
    graph
        .relationships()
        .filter(|rel| graph.contains(&rel.source_id) && graph.contains(&rel.target_id))
}

/// Connected components, largest first (ties keep ID order).
fn components(graph: &WorkflowGraph) -> Vec<Vec<String>> {
    let mut uf = UnionFind::from_ids(graph.entities().map(|e| e.id.clone()));
    for rel in live_relationships(graph) {
        uf.union(&rel.source_id, &rel.target_id);
    }
    let mut components = uf.components();
    components.sort_by(|a, b| b.len().cmp(&a.len()));
    components
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectivityReport {
    pub component_count: usize,
    /// Component sizes, descending
    pub component_sizes: Vec<usize>,
    pub components: Vec<Vec<String>>,
    /// True iff there is exactly one component
    pub is_connected: bool,
}

pub fn connectivity(graph: &WorkflowGraph) -> ConnectivityReport {
    let components = components(graph);
    ConnectivityReport {
        component_count: components.len(),
        component_sizes: components.iter().map(Vec::len).collect(),
        is_connected: components.len() == 1,
        components,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CentralityScore {
    pub entity_id: String,
    pub score: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CentralityReport {
    /// Highest-scoring entities (score descending, then ID)
    pub top: Vec<CentralityScore>,
    pub mean: f64,
    pub scores: BTreeMap<String, f64>,
}

/// Degree centrality. A directed edge adds 1 to each endpoint, a
/// bidirectional edge adds 2.
pub fn centrality(graph: &WorkflowGraph) -> CentralityReport {
    let mut scores: BTreeMap<String, f64> =
        graph.entities().map(|e| (e.id.clone(), 0.0)).collect();

    for rel in live_relationships(graph) {
        let weight = if rel.bidirectional { 2.0 } else { 1.0 };
        for endpoint in [&rel.source_id, &rel.target_id] {
            if let Some(score) = scores.get_mut(endpoint) {
                *score += weight;
            }
        }
    }

    let mean = if scores.is_empty() {
        0.0
    } else {
        scores.values().sum::<f64>() / scores.len() as f64
    };

    let mut ranked: Vec<CentralityScore> = scores
        .iter()
        .map(|(id, &score)| CentralityScore {
            entity_id: id.clone(),
            score,
        })
        .collect();
    // BTreeMap iteration is already ID-ordered, so a stable sort keeps ties by ID
    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
    ranked.truncate(TOP_CENTRAL);

    CentralityReport {
        top: ranked,
        mean,
        scores,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentSummary {
    pub entity_ids: Vec<String>,
    pub size: usize,
    /// Plurality entity type; ties go to the first type in name order
    pub dominant_type: Option<EntityType>,
    pub type_histogram: BTreeMap<EntityType, usize>,
    /// Mean strength of relationships with both ends inside the component
    pub average_strength: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommunityReport {
    pub community_count: usize,
    pub communities: Vec<ComponentSummary>,
}

/// Component summaries ("communities").
pub fn communities(graph: &WorkflowGraph) -> CommunityReport {
    let components = components(graph);

    let mut slot_of: HashMap<&str, usize> = HashMap::new();
    for (slot, members) in components.iter().enumerate() {
        for id in members {
            slot_of.insert(id.as_str(), slot);
        }
    }

    let mut strength_sums = vec![(0.0_f64, 0_usize); components.len()];
    for rel in live_relationships(graph) {
        let (Some(&a), Some(&b)) = (
            slot_of.get(rel.source_id.as_str()),
            slot_of.get(rel.target_id.as_str()),
        ) else {
            continue;
        };
        if a == b {
            strength_sums[a].0 += rel.strength;
            strength_sums[a].1 += 1;
        }
    }

    let communities: Vec<ComponentSummary> = components
        .iter()
        .zip(strength_sums)
        .map(|(members, (sum, count))| {
            let mut histogram: BTreeMap<EntityType, usize> = BTreeMap::new();
            for id in members {
                if let Some(entity) = graph.find_entity(id) {
                    *histogram.entry(entity.entity_type).or_default() += 1;
                }
            }
            let dominant_type = histogram
                .iter()
                .max_by(|(ta, na), (tb, nb)| {
                    na.cmp(nb).then_with(|| tb.as_str().cmp(ta.as_str()))
                })
                .map(|(t, _)| *t);

            ComponentSummary {
                entity_ids: members.clone(),
                size: members.len(),
                dominant_type,
                type_histogram: histogram,
                average_strength: if count > 0 { sum / count as f64 } else { 0.0 },
            }
        })
        .collect();

    CommunityReport {
        community_count: communities.len(),
        communities,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DependencyEdge {
    pub relationship_id: String,
    pub from: String,
    pub to: String,
    pub strength: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DependencyReport {
    pub dependencies: Vec<DependencyEdge>,
    /// Dependencies with strength above the critical threshold
    pub critical: Vec<DependencyEdge>,
    /// Two-node cycles, each pair listed once in ID order
    pub circular: Vec<[String; 2]>,
    pub has_circular_dependencies: bool,
}

/// Dependency edges, critical dependencies and two-node cycles.
pub fn dependencies(graph: &WorkflowGraph) -> DependencyReport {
    dependencies_with_threshold(graph, CRITICAL_STRENGTH)
}

/// Like [`dependencies`], with a caller-chosen critical strength.
pub fn dependencies_with_threshold(graph: &WorkflowGraph, critical_strength: f64) -> DependencyReport {
    let dependencies: Vec<DependencyEdge> = live_relationships(graph)
        .filter(|rel| rel.relationship_type.is_dependency())
        .map(|rel| DependencyEdge {
            relationship_id: rel.id.clone(),
            from: rel.source_id.clone(),
            to: rel.target_id.clone(),
            strength: rel.strength,
        })
        .collect();

    let critical = dependencies
        .iter()
        .filter(|d| d.strength > critical_strength)
        .cloned()
        .collect();

    let pairs: BTreeSet<(&str, &str)> = dependencies
        .iter()
        .map(|d| (d.from.as_str(), d.to.as_str()))
        .collect();
    let circular: Vec<[String; 2]> = pairs
        .iter()
        .filter(|(a, b)| a < b && pairs.contains(&(*b, *a)))
        .map(|(a, b)| [a.to_string(), b.to_string()])
        .collect();

    DependencyReport {
        dependencies,
        critical,
        has_circular_dependencies: !circular.is_empty(),
        circular,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Entity, Relationship, RelationshipType};

    fn graph(nodes: &[(&str, EntityType)]) -> WorkflowGraph {
        let mut g = WorkflowGraph::new();
        for (id, t) in nodes {
            g.add_entity(Entity::new(*id, *t, *id));
        }
        g
    }

    #[test]
    fn test_connectivity_empty() {
        let report = connectivity(&WorkflowGraph::new());
        assert_eq!(report.component_count, 0);
        assert!(!report.is_connected);
    }

    #[test]
    fn test_connectivity_counts_either_direction() {
        let mut g = graph(&[
            ("a", EntityType::Task),
            ("b", EntityType::Task),
            ("c", EntityType::Note),
        ]);
        g.add_relationship(Relationship::new("r1", "b", "a", RelationshipType::DependsOn));

        let report = connectivity(&g);
        assert_eq!(report.component_count, 2);
        assert_eq!(report.component_sizes, vec![2, 1]);
        assert!(!report.is_connected);

        g.add_relationship(Relationship::new("r2", "c", "b", RelationshipType::Mentions));
        assert!(connectivity(&g).is_connected);
    }

    #[test]
    fn test_centrality_bidirectional_counts_twice() {
        let mut g = graph(&[
            ("a", EntityType::Task),
            ("b", EntityType::Task),
            ("c", EntityType::Task),
        ]);
        g.add_relationship(Relationship::new("r1", "a", "b", RelationshipType::DependsOn));
        g.add_relationship(
            Relationship::new("r2", "a", "c", RelationshipType::RelatedTo).bidirectional(),
        );

        let report = centrality(&g);
        assert_eq!(report.scores["a"], 3.0);
        assert_eq!(report.scores["b"], 1.0);
        assert_eq!(report.scores["c"], 2.0);
        assert_eq!(report.top[0].entity_id, "a");
        assert!((report.mean - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_centrality_top_is_capped() {
        let ids: Vec<String> = (0..8).map(|i| format!("n{}", i)).collect();
        let mut g = WorkflowGraph::new();
        for id in &ids {
            g.add_entity(Entity::new(id.clone(), EntityType::Note, id.clone()));
        }
        let report = centrality(&g);
        assert_eq!(report.top.len(), TOP_CENTRAL);
        assert_eq!(report.top[0].entity_id, "n0");
    }

    #[test]
    fn test_communities_dominant_type_and_strength() {
        let mut g = graph(&[
            ("t1", EntityType::Task),
            ("t2", EntityType::Task),
            ("d1", EntityType::Document),
            ("n1", EntityType::Note),
        ]);
        g.add_relationship(
            Relationship::new("r1", "t1", "t2", RelationshipType::DependsOn).with_strength(0.8),
        );
        g.add_relationship(
            Relationship::new("r2", "d1", "t1", RelationshipType::Documents).with_strength(0.4),
        );

        let report = communities(&g);
        assert_eq!(report.community_count, 2);

        let big = &report.communities[0];
        assert_eq!(big.size, 3);
        assert_eq!(big.dominant_type, Some(EntityType::Task));
        assert!((big.average_strength - 0.6).abs() < 1e-9);

        let lone = &report.communities[1];
        assert_eq!(lone.dominant_type, Some(EntityType::Note));
        assert_eq!(lone.average_strength, 0.0);
    }

    #[test]
    fn test_communities_tie_goes_to_first_type_name() {
        let mut g = graph(&[("t", EntityType::Task), ("d", EntityType::Document)]);
        g.add_relationship(Relationship::new("r", "t", "d", RelationshipType::Documents));
        let report = communities(&g);
        assert_eq!(report.communities[0].dominant_type, Some(EntityType::Document));
    }

    #[test]
    fn test_dependencies_two_cycle() {
        let mut g = graph(&[("a", EntityType::Task), ("b", EntityType::Task)]);
        g.add_relationship(Relationship::new("r1", "a", "b", RelationshipType::DependsOn));
        g.add_relationship(Relationship::new("r2", "b", "a", RelationshipType::DependsOn));

        let report = dependencies(&g);
        assert!(report.has_circular_dependencies);
        assert_eq!(report.circular, vec![["a".to_string(), "b".to_string()]]);
    }

    #[test]
    fn test_dependencies_three_cycle_not_detected() {
        let mut g = graph(&[
            ("a", EntityType::Task),
            ("b", EntityType::Task),
            ("c", EntityType::Task),
        ]);
        g.add_relationship(Relationship::new("r1", "a", "b", RelationshipType::DependsOn));
        g.add_relationship(Relationship::new("r2", "b", "c", RelationshipType::DependsOn));
        g.add_relationship(Relationship::new("r3", "c", "a", RelationshipType::DependsOn));

        let report = dependencies(&g);
        assert_eq!(report.dependencies.len(), 3);
        assert!(!report.has_circular_dependencies);
    }

    #[test]
    fn test_dependencies_critical_and_filtering() {
        let mut g = graph(&[("a", EntityType::Task), ("b", EntityType::Document)]);
        g.add_relationship(
            Relationship::new("r1", "a", "b", RelationshipType::References).with_strength(0.9),
        );
        g.add_relationship(
            Relationship::new("r2", "a", "b", RelationshipType::DependsOn).with_strength(0.7),
        );
        g.add_relationship(Relationship::new("r3", "a", "b", RelationshipType::Supports));
        g.add_relationship(Relationship::new("r4", "a", "ghost", RelationshipType::DependsOn));

        let report = dependencies(&g);
        assert_eq!(report.dependencies.len(), 2);
        assert_eq!(report.critical.len(), 1);
        assert_eq!(report.critical[0].relationship_id, "r1");
    }

    #[test]
    fn test_analyze_structure_dispatch() {
        let g = graph(&[("a", EntityType::Task)]);
        match analyze_structure(&g, AnalysisMode::Connectivity) {
            StructuralAnalysis::Connectivity(report) => assert!(report.is_connected),
            other => panic!("unexpected report: {:?}", other),
        }
        assert_eq!(
            "components".parse::<AnalysisMode>().unwrap(),
            AnalysisMode::Connectivity
        );
    }
}
