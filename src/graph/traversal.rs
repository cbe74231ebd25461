//! Bounded breadth-first and depth-first walks over a `WorkflowGraph`.
//!
//! Type filters narrow the *output* only: an edge or node that does not match
//! still carries the walk onward, so "documents within three hops of this
//! task, even through notes" works.
//!
//! A node is (re)scheduled only when it is first discovered or discovered at
//! a strictly smaller depth. Depths are bounded by `max_depth`, so every walk
//! terminates, and breadth-first and depth-first runs visit the same set of
//! nodes; only the order of `path` differs.

use super::WorkflowGraph;
use crate::models::{Entity, EntityType, Relationship, RelationshipType};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};

/// Which edges to follow from the current node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Edges leaving the node, plus bidirectional edges entering it
    #[default]
    Forward,
    /// Edges entering the node, plus bidirectional edges leaving it
    Backward,
    /// Every incident edge
    Bidirectional,
}

impl std::str::FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "forward" => Ok(Direction::Forward),
            "backward" => Ok(Direction::Backward),
            "bidirectional" | "both" => Ok(Direction::Bidirectional),
            _ => Err(format!("Unknown direction: {}", s)),
        }
    }
}

/// Frontier discipline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Algorithm {
    /// FIFO frontier
    #[default]
    BreadthFirst,
    /// LIFO frontier
    DepthFirst,
}

impl std::str::FromStr for Algorithm {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "breadth_first" | "bfs" => Ok(Algorithm::BreadthFirst),
            "depth_first" | "dfs" => Ok(Algorithm::DepthFirst),
            _ => Err(format!("Unknown traversal algorithm: {}", s)),
        }
    }
}

/// Options for `traverse`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraversalOptions {
    pub direction: Direction,
    pub algorithm: Algorithm,
    /// Hop bound; 0 returns only the start node
    pub max_depth: usize,
    /// Only report entities of these types
    #[serde(default)]
    pub entity_types: Option<Vec<EntityType>>,
    /// Only report relationships of these types
    #[serde(default)]
    pub relationship_types: Option<Vec<RelationshipType>>,
}

impl Default for TraversalOptions {
    fn default() -> Self {
        Self {
            direction: Direction::Forward,
            algorithm: Algorithm::BreadthFirst,
            max_depth: 3,
            entity_types: None,
            relationship_types: None,
        }
    }
}

impl TraversalOptions {
    fn keeps_entity(&self, entity: &Entity) -> bool {
        self.entity_types
            .as_ref()
            .is_none_or(|types| types.contains(&entity.entity_type))
    }

    fn keeps_relationship(&self, rel: &Relationship) -> bool {
        self.relationship_types
            .as_ref()
            .is_none_or(|types| types.contains(&rel.relationship_type))
    }
}

/// Output of a traversal.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TraversalResult {
    /// Every visited entity ID in first-visit order, unfiltered
    pub path: Vec<String>,
    /// Visited entities that pass the entity-type filter
    pub entities: Vec<Entity>,
    /// Traversed relationships that pass the relationship-type filter
    pub relationships: Vec<Relationship>,
}

impl TraversalResult {
    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
    }
}

/// Neighbors of `current` reachable in one hop under `direction`, paired with
/// the edge used. Dangling endpoints are skipped.
///
/// Scans every relationship per expanded node, so a walk is O(V * E). There is
/// no adjacency index; fine for graphs of a few hundred nodes.
fn neighbors<'g>(
    graph: &'g WorkflowGraph,
    current: &str,
    direction: Direction,
) -> Vec<(&'g str, &'g Relationship)> {
    graph
        .relationships()
        .filter_map(|rel| {
            let next: Option<&str> = if rel.source_id == current {
                match direction {
                    Direction::Forward | Direction::Bidirectional => Some(rel.target_id.as_str()),
                    Direction::Backward if rel.bidirectional => Some(rel.target_id.as_str()),
                    Direction::Backward => None,
                }
            } else if rel.target_id == current {
                match direction {
                    Direction::Backward | Direction::Bidirectional => Some(rel.source_id.as_str()),
                    Direction::Forward if rel.bidirectional => Some(rel.source_id.as_str()),
                    Direction::Forward => None,
                }
            } else {
                None
            };
            let next = next?;
            graph.contains(next).then_some((next, rel))
        })
        .collect()
}

/// Walk the graph from `start`.
///
/// A missing start entity yields an empty result rather than an error.
pub fn traverse(graph: &WorkflowGraph, start: &str, options: &TraversalOptions) -> TraversalResult {
    if !graph.contains(start) {
        tracing::debug!(start, "traversal start not found");
        return TraversalResult::default();
    }

    let mut best_depth: HashMap<&str, usize> = HashMap::new();
    let mut path: Vec<&str> = Vec::new();
    let mut edges_seen: HashSet<&str> = HashSet::new();
    let mut edges: Vec<&Relationship> = Vec::new();
    let mut frontier: VecDeque<(&str, usize)> = VecDeque::new();

    best_depth.insert(start, 0);
    path.push(start);
    frontier.push_back((start, 0));

    loop {
        let next = match options.algorithm {
            Algorithm::BreadthFirst => frontier.pop_front(),
            Algorithm::DepthFirst => frontier.pop_back(),
        };
        let Some((current, depth)) = next else {
            break;
        };

        // A shallower rediscovery superseded this entry
        if best_depth.get(current).is_some_and(|&d| d < depth) {
            continue;
        }
        if depth >= options.max_depth {
            continue;
        }

        for (neighbor, rel) in neighbors(graph, current, options.direction) {
            if edges_seen.insert(rel.id.as_str()) {
                edges.push(rel);
            }

            let next_depth = depth + 1;
            match best_depth.get(neighbor).copied() {
                Some(known) if known <= next_depth => {}
                Some(_) => {
                    best_depth.insert(neighbor, next_depth);
                    frontier.push_back((neighbor, next_depth));
                }
                None => {
                    best_depth.insert(neighbor, next_depth);
                    path.push(neighbor);
                    frontier.push_back((neighbor, next_depth));
                }
            }
        }
    }

    let entities = path
        .iter()
        .filter_map(|id| graph.find_entity(id))
        .filter(|e| options.keeps_entity(e))
        .cloned()
        .collect();
    let relationships = edges
        .into_iter()
        .filter(|rel| options.keeps_relationship(rel))
        .cloned()
        .collect();

    tracing::debug!(
        start,
        visited = path.len(),
        max_depth = options.max_depth,
        "traversal finished"
    );

    TraversalResult {
        path: path.into_iter().map(str::to_string).collect(),
        entities,
        relationships,
    }
}
