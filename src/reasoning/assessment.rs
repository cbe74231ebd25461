//! Whole-set scoring: health, maturity, confidence, and the prose insights
//! and recommendations derived from the detector output.

use super::detectors::ReasoningContext;
use super::types::{
    Assessment, Bottleneck, Efficiency, Issue, IssueKind, MaturityLevel, Opportunity,
    OpportunityKind, Pattern, PatternKind, Risk, RiskKind,
};
use crate::models::EntityType;

/// Counts over the entity set that the scoring rules read.
#[derive(Debug, Clone, Copy, Default)]
struct Profile {
    total: usize,
    tasks: usize,
    documents: usize,
    completed: usize,
    with_due_date: usize,
    linked: usize,
    relationships: usize,
    hierarchical: bool,
}

impl Profile {
    fn of(ctx: &ReasoningContext<'_>) -> Self {
        let mut profile = Profile {
            total: ctx.entities.len(),
            relationships: ctx.relationships.len(),
            ..Default::default()
        };
        for entity in &ctx.entities {
            match entity.entity_type {
                EntityType::Task => profile.tasks += 1,
                EntityType::Document => profile.documents += 1,
                _ => {}
            }
            if entity.is_completed() {
                profile.completed += 1;
            }
            if entity.due_date.is_some() {
                profile.with_due_date += 1;
            }
            if ctx.relationship_count(&entity.id) > 0 {
                profile.linked += 1;
            }
            if entity.parent_id.is_some() || !entity.child_ids.is_empty() {
                profile.hierarchical = true;
            }
        }
        profile
    }

    fn fraction(&self, count: usize) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            count as f64 / self.total as f64
        }
    }
}

/// Overall health on a 0-100 scale.
pub fn health_score(ctx: &ReasoningContext<'_>) -> f64 {
    let p = Profile::of(ctx);
    if p.total == 0 {
        return 0.0;
    }
    let mut score = 50.0 + 30.0 * p.fraction(p.completed) + 10.0 * p.fraction(p.with_due_date);
    if p.relationships > 0 {
        score += 10.0;
    }
    if p.tasks > 0 || p.documents > 0 {
        score += 10.0;
    }
    score.clamp(0.0, 100.0)
}

/// First matching rule wins.
pub fn maturity_level(ctx: &ReasoningContext<'_>) -> MaturityLevel {
    let p = Profile::of(ctx);
    let tasks = p.tasks > 0;
    let documents = p.documents > 0;
    let due_dates = p.with_due_date > 0;
    let relationships = p.relationships > 0;

    if p.total == 0 {
        MaturityLevel::Initial
    } else if tasks && documents && due_dates && relationships && p.hierarchical {
        MaturityLevel::Optimizing
    } else if tasks && due_dates && relationships {
        MaturityLevel::Managed
    } else if tasks && (documents || relationships) {
        MaturityLevel::Defined
    } else if tasks || documents {
        MaturityLevel::Developing
    } else {
        MaturityLevel::Initial
    }
}

/// How much the result can be trusted: grows with set size and with the
/// share of linked entities.
pub fn confidence(ctx: &ReasoningContext<'_>) -> f64 {
    let p = Profile::of(ctx);
    if p.total == 0 {
        return 0.0;
    }
    let size = (p.total as f64 / 20.0).min(1.0);
    (0.4 + 0.4 * size + 0.2 * p.fraction(p.linked)).clamp(0.0, 1.0)
}

fn strengths(ctx: &ReasoningContext<'_>, efficiencies: &[Efficiency]) -> Vec<String> {
    let p = Profile::of(ctx);
    let mut out = Vec::new();
    if p.total == 0 {
        return out;
    }
    if p.fraction(p.completed) >= 0.5 {
        out.push(format!(
            "{} of {} items are complete",
            p.completed, p.total
        ));
    }
    if p.fraction(p.with_due_date) >= 0.5 {
        out.push("Most items have due dates".to_string());
    }
    if p.fraction(p.linked) >= 0.8 {
        out.push("Items are well connected".to_string());
    }
    if p.hierarchical {
        out.push("Work is organized hierarchically".to_string());
    }
    if !efficiencies.is_empty() {
        out.push(format!(
            "{} well-structured project(s)",
            efficiencies.len()
        ));
    }
    out
}

fn weaknesses(
    ctx: &ReasoningContext<'_>,
    issues: &[Issue],
    bottlenecks: &[Bottleneck],
    risks: &[Risk],
) -> Vec<String> {
    let mut out = Vec::new();
    let orphaned = issues
        .iter()
        .filter(|i| i.kind == IssueKind::Orphaned)
        .count();
    if orphaned > 0 {
        out.push(format!("{} items are not linked to anything", orphaned));
    }
    let outdated = issues
        .iter()
        .filter(|i| i.kind == IssueKind::Outdated)
        .count();
    if outdated > 0 {
        out.push(format!("{} items look outdated", outdated));
    }
    if !bottlenecks.is_empty() {
        out.push(format!("{} dependency bottleneck(s)", bottlenecks.len()));
    }
    if risks.iter().any(|r| r.kind == RiskKind::OverdueWork) {
        out.push("Overdue work".to_string());
    }
    let p = Profile::of(ctx);
    if p.total > 0 && p.with_due_date == 0 && p.tasks > 0 {
        out.push("No task has a due date".to_string());
    }
    out
}

/// Combine the scores and detector output into the overall assessment.
pub fn assess(
    ctx: &ReasoningContext<'_>,
    issues: &[Issue],
    bottlenecks: &[Bottleneck],
    efficiencies: &[Efficiency],
    risks: &[Risk],
) -> Assessment {
    Assessment {
        health_score: health_score(ctx),
        maturity: maturity_level(ctx),
        strengths: strengths(ctx, efficiencies),
        weaknesses: weaknesses(ctx, issues, bottlenecks, risks),
        confidence: confidence(ctx),
    }
}

/// Short observations about the set as a whole.
pub fn insights(ctx: &ReasoningContext<'_>, patterns: &[Pattern], risks: &[Risk]) -> Vec<String> {
    let p = Profile::of(ctx);
    let mut out = Vec::new();
    if p.total == 0 {
        return out;
    }

    if p.tasks > 0 {
        let done = ctx
            .entities
            .iter()
            .filter(|e| e.entity_type == EntityType::Task && e.is_completed())
            .count();
        out.push(format!(
            "{:.0}% of tasks are complete",
            100.0 * done as f64 / p.tasks as f64
        ));
    }

    let chains = patterns
        .iter()
        .filter(|pat| pat.kind == PatternKind::LinearDependencyChain)
        .count();
    if chains > 0 {
        out.push(format!(
            "{} linear dependency chain(s) serialize the work",
            chains
        ));
    }

    let overdue: usize = risks
        .iter()
        .filter(|r| r.kind == RiskKind::OverdueWork)
        .map(|r| r.entity_ids.len())
        .sum();
    if overdue > 0 {
        out.push(format!("{} item(s) are overdue", overdue));
    }

    if p.relationships == 0 && p.total > 1 {
        out.push("No relationships connect the analyzed items".to_string());
    }

    out
}

/// Actionable next steps, most pressing first.
pub fn recommendations(
    issues: &[Issue],
    opportunities: &[Opportunity],
    bottlenecks: &[Bottleneck],
    risks: &[Risk],
) -> Vec<String> {
    let mut out = Vec::new();

    if risks.iter().any(|r| r.kind == RiskKind::OverdueWork) {
        out.push("Reschedule or re-prioritize overdue items".to_string());
    }
    for bottleneck in bottlenecks {
        out.push(format!(
            "Reduce the load on {}: {} items depend on it",
            bottleneck.entity_id,
            bottleneck.dependent_ids.len()
        ));
    }
    if risks.iter().any(|r| r.kind == RiskKind::SinglePointOfFailure) {
        out.push("Split items with many dependencies into smaller pieces".to_string());
    }
    if issues.iter().any(|i| i.kind == IssueKind::MissingInformation) {
        out.push("Add due dates to high-priority tasks".to_string());
    }
    if issues.iter().any(|i| i.kind == IssueKind::Orphaned) {
        out.push("Link isolated items to their projects or related work".to_string());
    }
    if issues.iter().any(|i| i.kind == IssueKind::Outdated) {
        out.push("Review items that have not been updated recently".to_string());
    }
    if opportunities
        .iter()
        .any(|o| o.kind == OpportunityKind::Automation)
    {
        out.push("Automate recurring manual tasks".to_string());
    }
    if opportunities
        .iter()
        .any(|o| o.kind == OpportunityKind::Enhancement)
    {
        out.push("Expand short documents".to_string());
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Thresholds;
    use crate::graph::WorkflowGraph;
    use crate::models::{Entity, Relationship, RelationshipType};
    use crate::reasoning::types::Severity;
    use chrono::{Duration, Utc};

    fn ctx<'a>(graph: &'a WorkflowGraph, thresholds: &'a Thresholds) -> ReasoningContext<'a> {
        ReasoningContext::new(graph, graph.entities().collect(), thresholds, Utc::now())
    }

    #[test]
    fn test_empty_set_scores_zero() {
        let graph = WorkflowGraph::new();
        let thresholds = Thresholds::default();
        let ctx = ReasoningContext::new(&graph, Vec::new(), &thresholds, Utc::now());
        assert_eq!(health_score(&ctx), 0.0);
        assert_eq!(maturity_level(&ctx), MaturityLevel::Initial);
        assert_eq!(confidence(&ctx), 0.0);
        assert!(insights(&ctx, &[], &[]).is_empty());
    }

    #[test]
    fn test_health_score_formula() {
        let mut graph = WorkflowGraph::new();
        let mut done = Entity::new("a", EntityType::Task, "A");
        done.status = "completed".to_string();
        done.due_date = Some(Utc::now() + Duration::days(30));
        graph.add_entity(done);
        graph.add_entity(Entity::new("b", EntityType::Note, "B"));
        graph.add_relationship(Relationship::new("r", "a", "b", RelationshipType::References));

        let thresholds = Thresholds::default();
        // 50 + 30 * 0.5 + 10 * 0.5 + 10 + 10
        assert!((health_score(&ctx(&graph, &thresholds)) - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_notes_only_baseline_health() {
        let mut graph = WorkflowGraph::new();
        graph.add_entity(Entity::new("n", EntityType::Note, "N"));
        let thresholds = Thresholds::default();
        let ctx = ctx(&graph, &thresholds);
        assert_eq!(health_score(&ctx), 50.0);
        assert_eq!(maturity_level(&ctx), MaturityLevel::Initial);
    }

    #[test]
    fn test_maturity_ladder() {
        let thresholds = Thresholds::default();
        let mut graph = WorkflowGraph::new();

        graph.add_entity(Entity::new("doc", EntityType::Document, "Doc"));
        assert_eq!(
            maturity_level(&ctx(&graph, &thresholds)),
            MaturityLevel::Developing
        );

        graph.add_entity(Entity::new("t", EntityType::Task, "T"));
        assert_eq!(
            maturity_level(&ctx(&graph, &thresholds)),
            MaturityLevel::Defined
        );

        graph.remove_entity("doc");
        let mut due = Entity::new("t", EntityType::Task, "T");
        due.due_date = Some(Utc::now() + Duration::days(3));
        graph.add_entity(due);
        graph.add_entity(Entity::new("n", EntityType::Note, "N"));
        graph.add_relationship(Relationship::new("r", "t", "n", RelationshipType::Mentions));
        assert_eq!(
            maturity_level(&ctx(&graph, &thresholds)),
            MaturityLevel::Managed
        );

        let mut doc = Entity::new("doc", EntityType::Document, "Doc");
        doc.parent_id = Some("t".to_string());
        graph.add_entity(doc);
        assert_eq!(
            maturity_level(&ctx(&graph, &thresholds)),
            MaturityLevel::Optimizing
        );
    }

    #[test]
    fn test_confidence_grows_with_links() {
        let thresholds = Thresholds::default();
        let mut graph = WorkflowGraph::new();
        graph.add_entity(Entity::new("a", EntityType::Note, "A"));
        graph.add_entity(Entity::new("b", EntityType::Note, "B"));
        let unlinked = confidence(&ctx(&graph, &thresholds));

        graph.add_relationship(Relationship::new("r", "a", "b", RelationshipType::RelatedTo));
        let linked = confidence(&ctx(&graph, &thresholds));

        assert!((unlinked - 0.44).abs() < 1e-9);
        assert!((linked - 0.64).abs() < 1e-9);
    }

    #[test]
    fn test_recommendations_follow_findings() {
        let issue = Issue {
            entity_id: "a".to_string(),
            kind: IssueKind::Orphaned,
            severity: Severity::Low,
            description: String::new(),
            suggested_fix: String::new(),
            priority: 1,
        };
        let recs = recommendations(&[issue], &[], &[], &[]);
        assert_eq!(recs.len(), 1);
        assert!(recs[0].contains("Link isolated items"));
        assert!(recommendations(&[], &[], &[], &[]).is_empty());
    }
}
