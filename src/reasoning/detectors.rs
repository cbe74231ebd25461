//! Independent rule-based detectors.
//!
//! Each detector reads a `ReasoningContext` and returns its own findings;
//! none of them consumes another detector's output, so they can run in any
//! order.

use super::types::{
    Bottleneck, Efficiency, EntitySummary, Issue, IssueKind, Opportunity, OpportunityKind, Pattern,
    PatternKind, Prediction, PredictionKind, Risk, RiskKind, Severity, StatusAssessment,
};
use crate::config::Thresholds;
use crate::graph::WorkflowGraph;
use crate::models::{Entity, EntityType, Relationship, RelationshipType};
use chrono::{DateTime, Duration, Utc};
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// Keyword that marks a task as a candidate for automation.
const AUTOMATION_KEYWORD: &str = "manual";

/// The entity set under analysis and everything the detectors need to read.
pub struct ReasoningContext<'a> {
    pub graph: &'a WorkflowGraph,
    /// Entities under analysis, in ID order
    pub entities: Vec<&'a Entity>,
    /// Relationships touching at least one entity under analysis
    pub relationships: Vec<&'a Relationship>,
    pub thresholds: &'a Thresholds,
    pub now: DateTime<Utc>,
    members: HashSet<&'a str>,
}

impl<'a> ReasoningContext<'a> {
    pub fn new(
        graph: &'a WorkflowGraph,
        mut entities: Vec<&'a Entity>,
        thresholds: &'a Thresholds,
        now: DateTime<Utc>,
    ) -> Self {
        entities.sort_by(|a, b| a.id.cmp(&b.id));
        entities.dedup_by(|a, b| a.id == b.id);

        let members: HashSet<&str> = entities.iter().map(|e| e.id.as_str()).collect();
        let relationships = graph
            .relationships()
            .filter(|rel| {
                members.contains(rel.source_id.as_str()) || members.contains(rel.target_id.as_str())
            })
            .collect();

        Self {
            graph,
            entities,
            relationships,
            thresholds,
            now,
            members,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.members.contains(id)
    }

    /// Relationships touching the entity.
    pub fn relationships_of(&self, id: &str) -> impl Iterator<Item = &'a Relationship> {
        self.relationships.iter().copied().filter(move |rel| rel.touches(id))
    }

    pub fn relationship_count(&self, id: &str) -> usize {
        self.relationships_of(id).count()
    }

    /// Distinct sources of `depends_on` edges pointing at the entity.
    pub fn dependents(&self, id: &str) -> BTreeSet<&'a str> {
        self.relationships
            .iter()
            .copied()
            .filter(|rel| rel.relationship_type == RelationshipType::DependsOn)
            .filter(|rel| rel.target_id == id && rel.source_id != id)
            .map(|rel| rel.source_id.as_str())
            .collect()
    }

    /// Distinct targets of `depends_on` edges leaving the entity.
    pub fn dependencies(&self, id: &str) -> BTreeSet<&'a str> {
        self.relationships
            .iter()
            .copied()
            .filter(|rel| rel.relationship_type == RelationshipType::DependsOn)
            .filter(|rel| rel.source_id == id && rel.target_id != id)
            .map(|rel| rel.target_id.as_str())
            .collect()
    }

    fn due_soon(&self, entity: &Entity) -> bool {
        // A horizon past the end of representable time covers every due date
        let horizon = Duration::try_days(self.thresholds.due_soon_days)
            .and_then(|window| self.now.checked_add_signed(window));
        !entity.is_completed()
            && entity
                .due_date
                .is_some_and(|due| due >= self.now && horizon.is_none_or(|h| due <= h))
    }
}

fn capped(value: f64, cap: f64) -> f64 {
    (value / cap).min(1.0)
}

fn status_assessment(ctx: &ReasoningContext<'_>, entity: &Entity) -> StatusAssessment {
    if entity.is_completed() {
        StatusAssessment::Healthy
    } else if entity.is_overdue(ctx.now) {
        StatusAssessment::Critical
    } else if ctx.due_soon(entity) {
        StatusAssessment::Warning
    } else if entity.due_date.is_some() || !entity.status.is_empty() {
        StatusAssessment::Healthy
    } else {
        StatusAssessment::Unknown
    }
}

fn complexity(entity: &Entity) -> f64 {
    0.4 * capped(entity.content_len() as f64, 1000.0)
        + 0.3 * capped(entity.child_ids.len() as f64, 10.0)
        + 0.3 * capped(entity.tags.len() as f64, 5.0)
}

fn importance(entity: &Entity, relationship_count: usize) -> f64 {
    let priority = entity
        .priority
        .map(|p| 0.5 * f64::from(6 - p.clamp(1, 5)) / 5.0)
        .unwrap_or(0.0);
    let connected = 0.3 * capped(relationship_count as f64, 10.0);
    let project = if entity.entity_type == EntityType::Project {
        0.2
    } else {
        0.0
    };
    (priority + connected + project).clamp(0.0, 1.0)
}

fn key_attributes(entity: &Entity) -> BTreeMap<String, String> {
    let mut attrs = BTreeMap::new();
    if !entity.status.is_empty() {
        attrs.insert("status".to_string(), entity.status.clone());
    }
    if let Some(priority) = entity.priority {
        attrs.insert("priority".to_string(), priority.to_string());
    }
    if let Some(due) = entity.due_date {
        attrs.insert("due_date".to_string(), due.to_rfc3339());
    }
    if let Some(project) = &entity.project_id {
        attrs.insert("project".to_string(), project.clone());
    }
    if !entity.child_ids.is_empty() {
        attrs.insert("children".to_string(), entity.child_ids.len().to_string());
    }
    if !entity.tags.is_empty() {
        let tags: Vec<&str> = entity.tags.iter().map(String::as_str).collect();
        attrs.insert("tags".to_string(), tags.join(","));
    }
    attrs
}

/// One summary per entity under analysis.
pub fn summarize(ctx: &ReasoningContext<'_>) -> Vec<EntitySummary> {
    ctx.entities
        .iter()
        .map(|entity| {
            let relationship_count = ctx.relationship_count(&entity.id);
            EntitySummary {
                entity_id: entity.id.clone(),
                entity_type: entity.entity_type,
                title: entity.title.clone(),
                key_attributes: key_attributes(entity),
                status: status_assessment(ctx, entity),
                complexity: complexity(entity),
                importance: importance(entity, relationship_count),
                relationship_count,
            }
        })
        .collect()
}

fn issue(
    entity: &Entity,
    kind: IssueKind,
    severity: Severity,
    description: String,
    suggested_fix: &str,
) -> Issue {
    Issue {
        entity_id: entity.id.clone(),
        kind,
        severity,
        description,
        suggested_fix: suggested_fix.to_string(),
        priority: severity.rank(),
    }
}

/// Missing information, staleness and orphaned entities, most severe first.
pub fn detect_issues(ctx: &ReasoningContext<'_>) -> Vec<Issue> {
    let mut issues = Vec::new();
    // Out-of-range staleness windows never expire
    let stale_after = Duration::try_days(ctx.thresholds.stale_days);
    let multi_entity = ctx.entities.len() > 1;

    for entity in &ctx.entities {
        let high_priority = entity
            .priority
            .is_some_and(|p| p <= ctx.thresholds.high_priority_max);
        if entity.entity_type == EntityType::Task && high_priority && entity.due_date.is_none() {
            issues.push(issue(
                entity,
                IssueKind::MissingInformation,
                Severity::Medium,
                format!("High-priority task '{}' has no due date", entity.title),
                "Set a due date so the task can be scheduled",
            ));
        }

        let idle = ctx.now - entity.updated_at;
        if stale_after.is_some_and(|limit| idle > limit) {
            issues.push(issue(
                entity,
                IssueKind::Outdated,
                Severity::Low,
                format!(
                    "'{}' has not been updated in {} days",
                    entity.title,
                    idle.num_days()
                ),
                "Review the item and update or archive it",
            ));
        }

        if multi_entity && ctx.relationship_count(&entity.id) == 0 {
            issues.push(issue(
                entity,
                IssueKind::Orphaned,
                Severity::Low,
                format!("'{}' is not linked to anything", entity.title),
                "Link it to a related project, task or document",
            ));
        }
    }

    issues.sort_by(|a, b| {
        b.priority
            .cmp(&a.priority)
            .then_with(|| a.entity_id.cmp(&b.entity_id))
            .then_with(|| a.kind.cmp(&b.kind))
    });
    issues
}

/// Keyword and size triggered improvement opportunities.
pub fn detect_opportunities(ctx: &ReasoningContext<'_>) -> Vec<Opportunity> {
    let mut opportunities = Vec::new();

    for entity in &ctx.entities {
        match entity.entity_type {
            EntityType::Task => {
                let manual = entity
                    .content
                    .as_deref()
                    .is_some_and(|c| c.to_lowercase().contains(AUTOMATION_KEYWORD));
                if manual {
                    opportunities.push(Opportunity {
                        entity_id: entity.id.clone(),
                        kind: OpportunityKind::Automation,
                        description: format!(
                            "Task '{}' describes manual work that could be automated",
                            entity.title
                        ),
                        estimated_impact: 0.6,
                    });
                }
            }
            EntityType::Document => {
                if entity.content_len() < ctx.thresholds.short_document_chars {
                    opportunities.push(Opportunity {
                        entity_id: entity.id.clone(),
                        kind: OpportunityKind::Enhancement,
                        description: format!(
                            "Document '{}' is only {} characters long",
                            entity.title,
                            entity.content_len()
                        ),
                        estimated_impact: 0.3,
                    });
                }
            }
            _ => {}
        }
    }

    opportunities
}

// Only dependencies with both ends inside the set form chains.
fn inner_dependencies<'a>(ctx: &ReasoningContext<'a>, id: &str) -> Vec<&'a str> {
    ctx.dependencies(id)
        .into_iter()
        .filter(|target| ctx.contains(target))
        .collect()
}

fn inner_dependents<'a>(ctx: &ReasoningContext<'a>, id: &str) -> Vec<&'a str> {
    ctx.dependents(id)
        .into_iter()
        .filter(|source| ctx.contains(source))
        .collect()
}

/// The single successor of `id` in a chain, when the link is one-to-one.
fn linear_next<'a>(ctx: &ReasoningContext<'a>, id: &str) -> Option<&'a str> {
    match inner_dependencies(ctx, id).as_slice() {
        [next] if inner_dependents(ctx, next).len() == 1 => Some(*next),
        _ => None,
    }
}

/// Linear `depends_on` chains (three or more entities) and parent/child
/// hierarchies among the entities under analysis.
pub fn detect_patterns(ctx: &ReasoningContext<'_>) -> Vec<Pattern> {
    let mut patterns = Vec::new();

    let mut claimed: HashSet<&str> = HashSet::new();
    for entity in &ctx.entities {
        let id = entity.id.as_str();
        if claimed.contains(id) || linear_next(ctx, id).is_none() {
            continue;
        }
        // Interior nodes are reached from their predecessor's walk
        let has_linear_predecessor = match inner_dependents(ctx, id).as_slice() {
            [prev] => linear_next(ctx, prev) == Some(id),
            _ => false,
        };
        if has_linear_predecessor {
            continue;
        }

        let mut chain = vec![id];
        let mut seen: HashSet<&str> = HashSet::from([id]);
        let mut current = id;
        while let Some(next) = linear_next(ctx, current) {
            if !seen.insert(next) {
                break;
            }
            chain.push(next);
            current = next;
        }

        if chain.len() >= 3 {
            claimed.extend(chain.iter().copied());
            patterns.push(Pattern {
                kind: PatternKind::LinearDependencyChain,
                description: format!(
                    "Linear dependency chain of {} items: {}",
                    chain.len(),
                    chain.join(" -> ")
                ),
                entity_ids: chain.into_iter().map(str::to_string).collect(),
            });
        }
    }

    for entity in &ctx.entities {
        let children: Vec<&str> = ctx
            .graph
            .children_of(&entity.id)
            .into_iter()
            .map(|c| c.id.as_str())
            .filter(|c| ctx.contains(c))
            .collect();
        if children.len() >= 2 {
            let mut ids = vec![entity.id.clone()];
            ids.extend(children.iter().map(|c| c.to_string()));
            patterns.push(Pattern {
                kind: PatternKind::Hierarchy,
                description: format!(
                    "'{}' organizes {} child items",
                    entity.title,
                    children.len()
                ),
                entity_ids: ids,
            });
        }
    }

    patterns
}

/// Entities with more incoming `depends_on` edges than the threshold.
pub fn detect_bottlenecks(ctx: &ReasoningContext<'_>) -> Vec<Bottleneck> {
    ctx.entities
        .iter()
        .filter_map(|entity| {
            let dependents = ctx.dependents(&entity.id);
            (dependents.len() > ctx.thresholds.bottleneck_threshold).then(|| Bottleneck {
                entity_id: entity.id.clone(),
                description: format!(
                    "{} items depend on '{}'",
                    dependents.len(),
                    entity.title
                ),
                dependent_ids: dependents.into_iter().map(str::to_string).collect(),
            })
        })
        .collect()
}

/// Projects with many children, none of which is isolated.
pub fn detect_efficiencies(ctx: &ReasoningContext<'_>) -> Vec<Efficiency> {
    ctx.entities
        .iter()
        .filter(|entity| entity.entity_type == EntityType::Project)
        .filter_map(|project| {
            let children = ctx.graph.children_of(&project.id);
            if children.len() <= ctx.thresholds.efficient_project_children {
                return None;
            }
            let none_isolated = children
                .iter()
                .all(|child| !ctx.graph.find_entity_relationships(&child.id).is_empty());
            none_isolated.then(|| Efficiency {
                entity_id: project.id.clone(),
                child_count: children.len(),
                description: format!(
                    "Project '{}' keeps all {} child items connected",
                    project.title,
                    children.len()
                ),
            })
        })
        .collect()
}

/// Single points of failure and overdue work.
pub fn detect_risks(ctx: &ReasoningContext<'_>) -> Vec<Risk> {
    let mut risks = Vec::new();

    for entity in &ctx.entities {
        let dependencies = ctx.dependencies(&entity.id);
        if dependencies.len() > ctx.thresholds.fan_out_threshold {
            risks.push(Risk {
                kind: RiskKind::SinglePointOfFailure,
                entity_ids: vec![entity.id.clone()],
                severity: Severity::High,
                description: format!(
                    "'{}' depends on {} other items; a delay in any of them stalls it",
                    entity.title,
                    dependencies.len()
                ),
                mitigation: "Split the item or reduce its dependencies".to_string(),
            });
        }
    }

    let overdue: Vec<String> = ctx
        .entities
        .iter()
        .filter(|e| e.is_overdue(ctx.now))
        .map(|e| e.id.clone())
        .collect();
    if !overdue.is_empty() {
        let severity = if overdue.len() > 3 {
            Severity::High
        } else {
            Severity::Medium
        };
        risks.push(Risk {
            kind: RiskKind::OverdueWork,
            description: format!("{} items are past their due date", overdue.len()),
            entity_ids: overdue,
            severity,
            mitigation: "Reschedule or re-prioritize overdue items".to_string(),
        });
    }

    risks
}

/// Deadline-miss forecasts per entity and a workflow completion forecast.
pub fn predict(ctx: &ReasoningContext<'_>) -> Vec<Prediction> {
    let mut predictions = Vec::new();

    for entity in &ctx.entities {
        let probability = if entity.is_overdue(ctx.now) {
            1.0
        } else if ctx.due_soon(entity) {
            let blocked = ctx.dependencies(&entity.id).iter().any(|dep| {
                ctx.graph
                    .find_entity(dep)
                    .is_some_and(|d| !d.is_completed())
            });
            if blocked { 0.7 } else { 0.4 }
        } else {
            continue;
        };

        predictions.push(Prediction {
            entity_id: Some(entity.id.clone()),
            kind: PredictionKind::DeadlineMiss,
            description: format!("'{}' is at risk of missing its due date", entity.title),
            probability,
        });
    }

    let tasks: Vec<&&Entity> = ctx
        .entities
        .iter()
        .filter(|e| e.entity_type == EntityType::Task)
        .collect();
    if !tasks.is_empty() {
        let done = tasks.iter().filter(|t| t.is_completed()).count();
        predictions.push(Prediction {
            entity_id: None,
            kind: PredictionKind::CompletionForecast,
            description: format!("{} of {} tasks are complete", done, tasks.len()),
            probability: done as f64 / tasks.len() as f64,
        });
    }

    predictions
}
