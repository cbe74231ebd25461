//! Library-level checks of the graph store's structural guarantees.
//!
//! These tests build graphs through the public API and verify that:
//! - Removing an entity leaves no relationship or child reference to it
//! - Traversal never exceeds its hop bound and visits each entity once
//! - Breadth-first and depth-first walks reach the same set
//! - Snapshots survive a JSON round trip bit for bit, with statistics recomputed
//! - Statistics always agree with the stored entities and relationships, and
//!   a single component means an undirected walk reaches every entity

use std::collections::HashSet;
use workflow_graph::graph::WorkflowGraph;
use workflow_graph::graph::analysis::{connectivity, dependencies};
use workflow_graph::graph::traversal::{Algorithm, Direction, TraversalOptions, traverse};
use workflow_graph::models::{Entity, EntityType, Relationship, RelationshipType};
use workflow_graph::reasoning::{AnalysisRequest, AnalysisScope, Reasoner};

/// Deterministic graph: a grid-like mix of dependency and reference links.
fn sample_graph(size: usize) -> WorkflowGraph {
    let mut graph = WorkflowGraph::new();
    let types = [
        EntityType::Task,
        EntityType::Document,
        EntityType::Note,
        EntityType::Project,
    ];
    for i in 0..size {
        let id = format!("e{:02}", i);
        graph.add_entity(Entity::new(id.clone(), types[i % types.len()], id));
    }

    let mut seed: u64 = 7;
    for i in 0..size * 2 {
        seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        let a = (seed >> 33) as usize % size;
        let b = (seed >> 17) as usize % size;
        let rel_type = if i % 3 == 0 {
            RelationshipType::References
        } else {
            RelationshipType::DependsOn
        };
        let mut rel = Relationship::new(
            format!("r{:02}", i),
            format!("e{:02}", a),
            format!("e{:02}", b),
            rel_type,
        )
        .with_strength((i % 10) as f64 / 10.0);
        if i % 7 == 0 {
            rel = rel.bidirectional();
        }
        graph.add_relationship(rel);
    }
    graph
}

fn options(direction: Direction, algorithm: Algorithm, max_depth: usize) -> TraversalOptions {
    TraversalOptions {
        direction,
        algorithm,
        max_depth,
        ..Default::default()
    }
}

#[test]
fn test_remove_entity_cascades() {
    let mut graph = sample_graph(12);
    let mut parent = Entity::new("parent", EntityType::Project, "Parent");
    parent.child_ids.push("e03".to_string());
    graph.add_entity(parent);

    assert!(graph.remove_entity("e03"));

    assert!(graph.find_entity("e03").is_none());
    assert!(graph.relationships().all(|rel| !rel.touches("e03")));
    assert!(
        graph
            .entities()
            .all(|e| !e.child_ids.iter().any(|c| c == "e03"))
    );
    assert!(!graph.root_ids().iter().any(|id| id == "e03"));
    assert!(!graph.remove_entity("e03"));
}

#[test]
fn test_ids_stay_unique_on_replace() {
    let mut graph = sample_graph(6);
    let before = graph.statistics().entity_count;
    graph.add_entity(Entity::new("e01", EntityType::Email, "Replaced"));

    assert_eq!(graph.statistics().entity_count, before);
    assert_eq!(graph.find_entity("e01").unwrap().title, "Replaced");
    let ids: HashSet<&str> = graph.entities().map(|e| e.id.as_str()).collect();
    assert_eq!(ids.len(), before);
}

#[test]
fn test_traversal_respects_depth_bound() {
    let graph = sample_graph(20);

    for depth in 0..4 {
        let shallow = traverse(
            &graph,
            "e00",
            &options(Direction::Forward, Algorithm::BreadthFirst, depth),
        );
        let deeper = traverse(
            &graph,
            "e00",
            &options(Direction::Forward, Algorithm::BreadthFirst, depth + 1),
        );

        let unique: HashSet<&String> = shallow.path.iter().collect();
        assert_eq!(unique.len(), shallow.path.len(), "entity visited twice");
        assert_eq!(shallow.path.first().map(String::as_str), Some("e00"));

        let deeper_ids: HashSet<&String> = deeper.path.iter().collect();
        assert!(unique.is_subset(&deeper_ids));
    }

    let start_only = traverse(
        &graph,
        "e00",
        &options(Direction::Bidirectional, Algorithm::DepthFirst, 0),
    );
    assert_eq!(start_only.path, vec!["e00"]);
    assert!(start_only.relationships.is_empty());
}

#[test]
fn test_bfs_and_dfs_reach_same_set() {
    let graph = sample_graph(20);

    for direction in [Direction::Forward, Direction::Backward, Direction::Bidirectional] {
        for depth in [1, 2, 3, 6] {
            for start in ["e00", "e05", "e13"] {
                let bfs = traverse(
                    &graph,
                    start,
                    &options(direction, Algorithm::BreadthFirst, depth),
                );
                let dfs = traverse(
                    &graph,
                    start,
                    &options(direction, Algorithm::DepthFirst, depth),
                );
                let bfs_ids: HashSet<&String> = bfs.path.iter().collect();
                let dfs_ids: HashSet<&String> = dfs.path.iter().collect();
                assert_eq!(
                    bfs_ids, dfs_ids,
                    "{:?} depth {} from {}",
                    direction, depth, start
                );
            }
        }
    }
}

#[test]
fn test_traverse_missing_start_is_empty() {
    let graph = sample_graph(5);
    let result = traverse(&graph, "ghost", &TraversalOptions::default());
    assert!(result.is_empty());
}

#[test]
fn test_snapshot_round_trip_keeps_exact_scores() {
    let mut graph = sample_graph(8);
    let mut seed: u64 = 0x2545_f491_4f6c_dd1d;
    let mut next_unit = || {
        seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        (seed >> 11) as f64 / (1u64 << 53) as f64
    };
    for i in 0..200 {
        graph.add_relationship(
            Relationship::new(
                format!("f{:03}", i),
                format!("e{:02}", i % 8),
                format!("e{:02}", (i * 3 + 1) % 8),
                RelationshipType::RelatedTo,
            )
            .with_strength(next_unit())
            .with_confidence(next_unit()),
        );
    }

    let restored = WorkflowGraph::from_json(&graph.to_json().unwrap()).unwrap();
    for rel in graph.relationships() {
        let back = restored.find_relationship(&rel.id).unwrap();
        assert_eq!(back.strength.to_bits(), rel.strength.to_bits(), "{}", rel.id);
        assert_eq!(back.confidence.to_bits(), rel.confidence.to_bits(), "{}", rel.id);
    }
    assert_eq!(restored, graph);
}

#[test]
fn test_snapshot_round_trip() {
    let graph = sample_graph(15);

    let json = graph.to_json().unwrap();
    let restored = WorkflowGraph::from_json(&json).unwrap();

    assert_eq!(restored, graph);
    assert_eq!(restored.statistics(), graph.statistics());
}

/// Check every derived statistic against the stored graph.
fn assert_statistics_consistent(graph: &WorkflowGraph) {
    let stats = graph.statistics();
    let v = graph.entities().count();
    let e = graph.relationships().count();
    assert_eq!(stats.entity_count, v);
    assert_eq!(stats.relationship_count, e);
    assert_eq!(stats.connected_components, connectivity(graph).component_count);

    let expected_degree = if v > 0 { 2.0 * e as f64 / v as f64 } else { 0.0 };
    assert!((stats.average_degree - expected_degree).abs() < 1e-9);

    let expected_density = if v > 1 {
        e as f64 / (v * (v - 1)) as f64
    } else {
        0.0
    };
    assert!((stats.density - expected_density).abs() < 1e-12);
}

/// Components == 1 exactly when an undirected walk from any entity reaches
/// every entity.
fn assert_connectivity_matches_walk(graph: &WorkflowGraph) {
    let v = graph.entities().count();
    let start = graph.entities().next().map(|e| e.id.clone()).unwrap();
    let walk = traverse(
        graph,
        &start,
        &options(Direction::Bidirectional, Algorithm::BreadthFirst, v),
    );
    assert_eq!(
        graph.statistics().connected_components == 1,
        walk.path.len() == v
    );
}

#[test]
fn test_statistics_consistent_after_mutations() {
    let mut graph = sample_graph(15);
    assert_statistics_consistent(&graph);

    graph.remove_entity("e04");
    assert_statistics_consistent(&graph);

    graph.remove_relationship("r01");
    assert_statistics_consistent(&graph);

    graph.add_entity(Entity::new("late", EntityType::Calendar, "Late addition"));
    assert_statistics_consistent(&graph);

    graph.add_relationship(Relationship::new("extra", "late", "e00", RelationshipType::Mentions));
    assert_statistics_consistent(&graph);
}

#[test]
fn test_single_component_iff_walk_reaches_everything() {
    let mut chain = WorkflowGraph::new();
    for i in 0..6 {
        chain.add_entity(Entity::new(format!("c{}", i), EntityType::Task, "chain"));
    }
    for i in 0..5 {
        chain.add_relationship(Relationship::new(
            format!("r{}", i),
            format!("c{}", i + 1),
            format!("c{}", i),
            RelationshipType::DependsOn,
        ));
    }
    assert_eq!(chain.statistics().connected_components, 1);
    assert_connectivity_matches_walk(&chain);

    let mut split = chain.clone();
    split.add_entity(Entity::new("island", EntityType::Note, "island"));
    assert_eq!(split.statistics().connected_components, 2);
    assert_connectivity_matches_walk(&split);

    assert_connectivity_matches_walk(&sample_graph(15));
}

#[test]
fn test_two_cycle_always_reported_once() {
    let mut graph = sample_graph(10);
    graph.add_relationship(Relationship::new("fwd", "e01", "e02", RelationshipType::DependsOn));
    graph.add_relationship(Relationship::new("back", "e02", "e01", RelationshipType::DependsOn));

    let report = dependencies(&graph);
    assert!(report.has_circular_dependencies);
    let pair = ["e01".to_string(), "e02".to_string()];
    assert_eq!(report.circular.iter().filter(|c| **c == pair).count(), 1);
    assert!(report.circular.iter().all(|[a, b]| a < b));
}

#[test]
fn test_reasoning_is_deterministic() {
    let graph = sample_graph(16);
    let now = chrono::Utc::now();
    let request = AnalysisRequest::workflow().as_of(now);

    let first = Reasoner::default().analyze(&graph, &request).unwrap();
    let second = Reasoner::default().analyze(&graph, &request).unwrap();
    assert_eq!(first, second);

    let neighborhood = AnalysisRequest::new(vec!["e00".to_string()], AnalysisScope::Neighborhood)
        .with_depth(1)
        .as_of(now);
    let local = Reasoner::default().analyze(&graph, &neighborhood).unwrap();
    assert!(local.entity_ids.len() <= first.entity_ids.len());
    assert!(local.entity_ids.contains(&"e00".to_string()));
}
