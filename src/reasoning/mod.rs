//! Rule-based reasoning over a set of workflow entities.
//!
//! A run gathers an entity set from the graph according to an
//! [`AnalysisScope`], runs every detector over it, and folds their output
//! into one [`AnalysisResult`].

mod assessment;
mod detectors;
pub mod types;

pub use detectors::ReasoningContext;
pub use types::*;

use crate::config::Thresholds;
use crate::graph::WorkflowGraph;
use crate::graph::traversal::{Direction, TraversalOptions, traverse};
use crate::models::Entity;
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};

/// What to analyze.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    /// Starting entities. Unknown IDs are ignored.
    pub entity_ids: Vec<String>,
    pub scope: AnalysisScope,
    /// Hop bound for neighborhood and project expansion
    pub depth: usize,
    /// Reference time for due dates and staleness (defaults to now)
    #[serde(default)]
    pub as_of: Option<DateTime<Utc>>,
}

impl AnalysisRequest {
    pub fn new(entity_ids: Vec<String>, scope: AnalysisScope) -> Self {
        Self {
            entity_ids,
            scope,
            depth: 2,
            as_of: None,
        }
    }

    /// Analyze every entity in the graph.
    pub fn workflow() -> Self {
        Self::new(Vec::new(), AnalysisScope::Workflow)
    }

    pub fn with_depth(mut self, depth: usize) -> Self {
        self.depth = depth;
        self
    }

    pub fn as_of(mut self, time: DateTime<Utc>) -> Self {
        self.as_of = Some(time);
        self
    }
}

/// Children of `root` following `child_ids`, up to `depth` levels.
fn descendants<'g>(graph: &'g WorkflowGraph, root: &str, depth: usize) -> Vec<&'g Entity> {
    let mut out = Vec::new();
    let mut seen: BTreeSet<&str> = BTreeSet::new();
    let mut queue: VecDeque<(&str, usize)> = VecDeque::from([(root, 0)]);

    while let Some((id, level)) = queue.pop_front() {
        if level >= depth {
            continue;
        }
        for child in graph.children_of(id) {
            if seen.insert(child.id.as_str()) {
                out.push(child);
                queue.push_back((child.id.as_str(), level + 1));
            }
        }
    }
    out
}

/// Resolve the entity set a request covers.
///
/// Returns an empty set for an empty non-workflow request, and
/// `Error::NoValidEntities` when IDs were given but none of them exist.
pub fn gather_entities<'g>(
    graph: &'g WorkflowGraph,
    request: &AnalysisRequest,
) -> Result<Vec<&'g Entity>> {
    if request.scope == AnalysisScope::Workflow && request.entity_ids.is_empty() {
        return Ok(graph.entities().collect());
    }

    let requested: Vec<&Entity> = request
        .entity_ids
        .iter()
        .filter_map(|id| graph.find_entity(id))
        .collect();

    if requested.is_empty() {
        if request.entity_ids.is_empty() {
            return Ok(Vec::new());
        }
        return Err(Error::NoValidEntities);
    }

    let mut gathered: BTreeMap<&str, &Entity> = BTreeMap::new();
    match request.scope {
        AnalysisScope::Selected => {
            gathered.extend(requested.iter().map(|&e| (e.id.as_str(), e)));
        }
        AnalysisScope::Neighborhood => {
            let options = TraversalOptions {
                direction: Direction::Bidirectional,
                max_depth: request.depth,
                ..Default::default()
            };
            for entity in requested.iter().copied() {
                for id in traverse(graph, &entity.id, &options).path {
                    if let Some(found) = graph.find_entity(&id) {
                        gathered.insert(found.id.as_str(), found);
                    }
                }
            }
        }
        AnalysisScope::Project => {
            for entity in requested.iter().copied() {
                gathered.insert(entity.id.as_str(), entity);
                let project_id = entity.project_id.as_deref().unwrap_or(&entity.id);
                if let Some(project) = graph.find_entity(project_id) {
                    gathered.insert(project.id.as_str(), project);
                }
                for member in graph.project_members(project_id) {
                    gathered.insert(member.id.as_str(), member);
                }
                for child in descendants(graph, &entity.id, request.depth) {
                    gathered.insert(child.id.as_str(), child);
                }
            }
        }
        AnalysisScope::Workflow => {
            gathered.extend(graph.entities().map(|e| (e.id.as_str(), e)));
        }
    }

    Ok(gathered.into_values().collect())
}

/// Run every detector over an explicit entity set.
///
/// Pure: the same graph, entities, thresholds and `now` always give the same
/// result.
pub fn analyze_entities(
    graph: &WorkflowGraph,
    entities: &[&Entity],
    thresholds: &Thresholds,
    now: DateTime<Utc>,
) -> AnalysisResult {
    let ctx = ReasoningContext::new(graph, entities.to_vec(), thresholds, now);

    let relationships: BTreeMap<String, Vec<String>> = ctx
        .entities
        .iter()
        .map(|entity| {
            let ids: Vec<String> = ctx
                .relationships_of(&entity.id)
                .map(|rel| rel.id.clone())
                .collect();
            (entity.id.clone(), ids)
        })
        .collect();

    let issues = detectors::detect_issues(&ctx);
    let opportunities = detectors::detect_opportunities(&ctx);
    let patterns = detectors::detect_patterns(&ctx);
    let bottlenecks = detectors::detect_bottlenecks(&ctx);
    let efficiencies = detectors::detect_efficiencies(&ctx);
    let risks = detectors::detect_risks(&ctx);
    let predictions = detectors::predict(&ctx);

    let insights = assessment::insights(&ctx, &patterns, &risks);
    let recommendations =
        assessment::recommendations(&issues, &opportunities, &bottlenecks, &risks);
    let assessment = assessment::assess(&ctx, &issues, &bottlenecks, &efficiencies, &risks);

    AnalysisResult {
        scope: AnalysisScope::Selected,
        depth: 0,
        entity_ids: ctx.entities.iter().map(|e| e.id.clone()).collect(),
        summaries: detectors::summarize(&ctx),
        relationships,
        issues,
        opportunities,
        patterns,
        bottlenecks,
        efficiencies,
        risks,
        insights,
        recommendations,
        predictions,
        assessment,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    scope: AnalysisScope,
    depth: usize,
    entity_ids: Vec<String>,
    as_of: Option<DateTime<Utc>>,
}

impl CacheKey {
    fn of(request: &AnalysisRequest) -> Self {
        let mut entity_ids = request.entity_ids.clone();
        entity_ids.sort();
        entity_ids.dedup();
        Self {
            scope: request.scope,
            depth: request.depth,
            entity_ids,
            as_of: request.as_of,
        }
    }
}

/// Runs analyses against a graph and caches results until the graph changes.
#[derive(Debug, Default)]
pub struct Reasoner {
    thresholds: Thresholds,
    cache: HashMap<CacheKey, AnalysisResult>,
    cached_revision: Option<u64>,
}

impl Reasoner {
    pub fn new(thresholds: Thresholds) -> Self {
        Self {
            thresholds,
            cache: HashMap::new(),
            cached_revision: None,
        }
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    /// Analyze the entity set described by `request`.
    pub fn analyze(
        &mut self,
        graph: &WorkflowGraph,
        request: &AnalysisRequest,
    ) -> Result<AnalysisResult> {
        if self.cached_revision != Some(graph.revision()) {
            self.cache.clear();
            self.cached_revision = Some(graph.revision());
        }

        let key = CacheKey::of(request);
        if self.thresholds.cache_results {
            if let Some(hit) = self.cache.get(&key) {
                tracing::trace!(scope = ?request.scope, "analysis cache hit");
                return Ok(hit.clone());
            }
        }

        let entities = gather_entities(graph, request)?;
        let now = request.as_of.unwrap_or_else(Utc::now);
        let mut result = analyze_entities(graph, &entities, &self.thresholds, now);
        result.scope = request.scope;
        result.depth = request.depth;

        tracing::info!(
            scope = ?request.scope,
            entities = result.entity_ids.len(),
            issues = result.issues.len(),
            health = result.assessment.health_score,
            "analysis complete"
        );

        if self.thresholds.cache_results {
            self.cache.insert(key, result.clone());
        }
        Ok(result)
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
        self.cached_revision = None;
    }

    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }
}
