//! Command implementations for the wfg CLI.
//!
//! Each command loads the snapshot, does its work through the library API,
//! saves if it mutated anything, and returns a value implementing
//! [`CommandResult`]:
//! - `init` - Create an empty snapshot
//! - `entity_*` / `link_*` - Graph store CRUD
//! - `traverse` - Walk from an entity
//! - `graph_*` - Structural analysis
//! - `analyze` - Reasoning pass
//! - `merge` - Merge another snapshot
//! - `config_show` - Resolved reasoning config

use crate::cli::EntityFields;
use crate::config::{Thresholds, resolve_config};
use crate::graph::analysis::{
    AnalysisMode, StructuralAnalysis, analyze_structure, dependencies_with_threshold,
};
use crate::graph::traversal::{TraversalOptions, TraversalResult, traverse as walk};
use crate::graph::{
    EntityUpdate, GraphStatistics, MergePolicy, MergeReport, RelationshipUpdate, WorkflowGraph,
    validate_id,
};
use crate::models::{
    Entity, EntityType, Metadata, Relationship, RelationshipType, clamp_unit,
};
use crate::reasoning::{AnalysisRequest, AnalysisResult, AnalysisScope, Reasoner};
use crate::storage::{SnapshotFile, generate_id};
use crate::{Error, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::path::Path;

/// Command results that can be serialized to JSON or formatted for humans.
pub trait CommandResult {
    /// Serialize to JSON string.
    fn to_json(&self) -> String;

    /// Format for human-readable output.
    fn to_human(&self) -> String;
}

fn json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|e| format!(r#"{{"error": "{}"}}"#, e))
}

/// Parse an RFC 3339 timestamp or a bare `YYYY-MM-DD` date (midnight UTC).
pub fn parse_date(input: &str) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .ok_or_else(|| {
            Error::InvalidInput(format!(
                "Invalid date (expected RFC 3339 or YYYY-MM-DD): {}",
                input
            ))
        })
}

/// Parse `key=value` pairs. Values that are valid JSON keep their type,
/// anything else is stored as a string.
pub fn parse_metadata(entries: &[String]) -> Result<Metadata> {
    let mut metadata = Metadata::new();
    for entry in entries {
        let Some((key, value)) = entry.split_once('=') else {
            return Err(Error::InvalidInput(format!(
                "Metadata must be key=value, got: {}",
                entry
            )));
        };
        let key = key.trim();
        if key.is_empty() {
            return Err(Error::InvalidInput(format!("Empty metadata key: {}", entry)));
        }
        let value = serde_json::from_str(value)
            .unwrap_or_else(|_| serde_json::Value::String(value.to_string()));
        metadata.insert(key.to_string(), value);
    }
    Ok(metadata)
}

fn check_unit(name: &str, value: Option<f64>) -> Result<Option<f64>> {
    match value {
        Some(v) if !(0.0..=1.0).contains(&v) => Err(Error::InvalidInput(format!(
            "{} must be between 0 and 1, got {}",
            name, v
        ))),
        other => Ok(other.map(clamp_unit)),
    }
}

/// Pick a generated ID not already used by `taken`.
fn fresh_id(prefix: &str, seed: &str, taken: impl Fn(&str) -> bool) -> String {
    let mut id = generate_id(prefix, seed);
    let mut attempt = 0u32;
    while taken(&id) {
        attempt += 1;
        id = generate_id(prefix, &format!("{}#{}", seed, attempt));
    }
    id
}

// === Shared result types ===

/// A single create/update/remove.
#[derive(Debug, Serialize)]
pub struct Mutation {
    pub id: String,
    pub kind: &'static str,
    pub action: &'static str,
}

impl Mutation {
    fn new(id: impl Into<String>, kind: &'static str, action: &'static str) -> Self {
        Self {
            id: id.into(),
            kind,
            action,
        }
    }
}

impl CommandResult for Mutation {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        let mut verb = self.action.to_string();
        if let Some(first) = verb.get_mut(0..1) {
            first.make_ascii_uppercase();
        }
        format!("{} {} {}", verb, self.kind, self.id)
    }
}

// === Init ===

#[derive(Debug, Serialize)]
pub struct InitResult {
    pub path: String,
    pub initialized: bool,
}

impl CommandResult for InitResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        format!("Initialized empty workflow graph at {}", self.path)
    }
}

/// Write an empty snapshot.
pub fn init(file: &SnapshotFile, force: bool) -> Result<InitResult> {
    file.init(force)?;
    Ok(InitResult {
        path: file.path().display().to_string(),
        initialized: true,
    })
}

// === Entity commands ===

/// Create a new entity. A `--parent` that exists gets the new entity appended
/// to its child list.
pub fn entity_add(
    file: &SnapshotFile,
    title: String,
    entity_type: EntityType,
    id: Option<String>,
    fields: EntityFields,
) -> Result<Mutation> {
    let mut graph = file.load()?;

    let id = match id {
        Some(id) => {
            validate_id(&id)?;
            if graph.contains(&id) {
                return Err(Error::InvalidInput(format!("Entity already exists: {}", id)));
            }
            id
        }
        None => fresh_id(entity_type.as_str(), &title, |candidate| {
            graph.contains(candidate)
        }),
    };

    let mut entity = Entity::new(id.clone(), entity_type, title);
    entity.content = fields.content;
    entity.due_date = fields.due.as_deref().map(parse_date).transpose()?;
    entity.priority = fields.priority;
    if let Some(status) = fields.status {
        entity.status = status;
    }
    entity.project_id = fields.project;
    entity.parent_id = fields.parent.clone();
    entity.tags = fields.tags.into_iter().collect();
    entity.metadata = parse_metadata(&fields.metadata)?;
    graph.add_entity(entity);

    if let Some(parent_id) = fields.parent {
        attach_child(&mut graph, &parent_id, &id);
    }

    file.save(&graph)?;
    Ok(Mutation::new(id, "entity", "added"))
}

/// Append `child_id` to the child list of `parent_id`, if that entity exists.
fn attach_child(graph: &mut WorkflowGraph, parent_id: &str, child_id: &str) {
    let children = graph.find_entity(parent_id).and_then(|parent| {
        (!parent.child_ids.iter().any(|c| c == child_id)).then(|| {
            let mut children = parent.child_ids.clone();
            children.push(child_id.to_string());
            children
        })
    });
    if let Some(children) = children {
        graph.update_entity(
            parent_id,
            EntityUpdate {
                child_ids: Some(children),
                ..Default::default()
            },
        );
    }
}

/// Drop `child_id` from the child list of `parent_id`, if listed there.
fn detach_child(graph: &mut WorkflowGraph, parent_id: &str, child_id: &str) {
    let children = graph.find_entity(parent_id).and_then(|parent| {
        parent.child_ids.iter().any(|c| c == child_id).then(|| {
            parent
                .child_ids
                .iter()
                .filter(|c| *c != child_id)
                .cloned()
                .collect::<Vec<String>>()
        })
    });
    if let Some(children) = children {
        graph.update_entity(
            parent_id,
            EntityUpdate {
                child_ids: Some(children),
                ..Default::default()
            },
        );
    }
}

/// Merge the given fields into an existing entity. A new `--parent` moves
/// the entity from its old parent's child list to the new one.
pub fn entity_update(
    file: &SnapshotFile,
    id: &str,
    title: Option<String>,
    fields: EntityFields,
) -> Result<Mutation> {
    let mut graph = file.load()?;

    let update = EntityUpdate {
        title,
        content: fields.content,
        due_date: fields.due.as_deref().map(parse_date).transpose()?,
        priority: fields.priority,
        status: fields.status,
        project_id: fields.project,
        parent_id: fields.parent,
        tags: (!fields.tags.is_empty()).then_some(fields.tags),
        metadata: parse_metadata(&fields.metadata)?,
        ..Default::default()
    };
    if update.is_empty() {
        return Err(Error::InvalidInput("No fields to update".to_string()));
    }
    if update.parent_id.as_deref() == Some(id) {
        return Err(Error::InvalidInput(format!(
            "Entity cannot be its own parent: {}",
            id
        )));
    }

    let old_parent = graph
        .find_entity(id)
        .ok_or_else(|| Error::NotFound(format!("entity {}", id)))?
        .parent_id
        .clone();
    let new_parent = update.parent_id.clone();
    graph.update_entity(id, update);

    if let Some(new_parent) = new_parent.filter(|p| old_parent.as_ref() != Some(p)) {
        if let Some(old_parent) = &old_parent {
            detach_child(&mut graph, old_parent, id);
        }
        attach_child(&mut graph, &new_parent, id);
    }

    file.save(&graph)?;
    Ok(Mutation::new(id, "entity", "updated"))
}

pub fn entity_remove(file: &SnapshotFile, id: &str) -> Result<Mutation> {
    let mut graph = file.load()?;
    if !graph.remove_entity(id) {
        return Err(Error::NotFound(format!("entity {}", id)));
    }
    file.save(&graph)?;
    Ok(Mutation::new(id, "entity", "removed"))
}

#[derive(Debug, Serialize)]
pub struct EntityShow {
    pub entity: Entity,
    pub relationships: Vec<Relationship>,
}

impl CommandResult for EntityShow {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        let e = &self.entity;
        let mut lines = vec![
            format!("{} [{}] {}", e.id, e.entity_type, e.title),
            format!("  Status: {}", e.status),
        ];
        if let Some(priority) = e.priority {
            lines.push(format!("  Priority: {}", priority));
        }
        if let Some(due) = e.due_date {
            lines.push(format!("  Due: {}", due.format("%Y-%m-%d %H:%M")));
        }
        if let Some(project) = &e.project_id {
            lines.push(format!("  Project: {}", project));
        }
        if let Some(parent) = &e.parent_id {
            lines.push(format!("  Parent: {}", parent));
        }
        if !e.child_ids.is_empty() {
            lines.push(format!("  Children: {}", e.child_ids.join(", ")));
        }
        if !e.tags.is_empty() {
            let tags: Vec<&str> = e.tags.iter().map(String::as_str).collect();
            lines.push(format!("  Tags: {}", tags.join(", ")));
        }
        if let Some(content) = &e.content {
            lines.push(String::new());
            lines.push(format!("  {}", content));
        }
        if !self.relationships.is_empty() {
            lines.push(String::new());
            lines.push(format!("  Links ({}):", self.relationships.len()));
            for rel in &self.relationships {
                lines.push(format!("    {}", format_relationship(rel)));
            }
        }
        lines.join("\n")
    }
}

pub fn entity_show(file: &SnapshotFile, id: &str) -> Result<EntityShow> {
    let graph = file.load()?;
    let entity = graph
        .find_entity(id)
        .cloned()
        .ok_or_else(|| Error::NotFound(format!("entity {}", id)))?;
    let relationships = graph
        .find_entity_relationships(id)
        .into_iter()
        .cloned()
        .collect();
    Ok(EntityShow {
        entity,
        relationships,
    })
}

#[derive(Debug, Serialize)]
pub struct EntityList {
    pub entities: Vec<Entity>,
    pub count: usize,
}

impl CommandResult for EntityList {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        if self.entities.is_empty() {
            return "No entities found.".to_string();
        }
        let mut lines = vec![format!("{} entities:", self.count)];
        for e in &self.entities {
            lines.push(format!("  {} [{}] {} ({})", e.id, e.entity_type, e.title, e.status));
        }
        lines.join("\n")
    }
}

pub fn entity_list(file: &SnapshotFile, entity_type: Option<EntityType>) -> Result<EntityList> {
    let graph = file.load()?;
    let entities: Vec<Entity> = match entity_type {
        Some(t) => graph.find_entities_by_type(t).into_iter().cloned().collect(),
        None => graph.entities().cloned().collect(),
    };
    Ok(EntityList {
        count: entities.len(),
        entities,
    })
}

// === Link commands ===

fn format_relationship(rel: &Relationship) -> String {
    let arrow = if rel.bidirectional { "<->" } else { "->" };
    format!(
        "{}: {} {} {} ({}, strength {:.2})",
        rel.id, rel.source_id, arrow, rel.target_id, rel.relationship_type, rel.strength
    )
}

/// Parameters for `link_add`.
#[derive(Debug, Clone)]
pub struct NewLink {
    pub source: String,
    pub target: String,
    pub relationship_type: RelationshipType,
    pub id: Option<String>,
    pub strength: Option<f64>,
    pub confidence: Option<f64>,
    pub bidirectional: bool,
    pub evidence: Vec<String>,
}

/// Create a relationship between two existing entities.
pub fn link_add(file: &SnapshotFile, link: NewLink) -> Result<Mutation> {
    let mut graph = file.load()?;

    for endpoint in [&link.source, &link.target] {
        if !graph.contains(endpoint) {
            return Err(Error::NotFound(format!("entity {}", endpoint)));
        }
    }

    let id = match link.id {
        Some(id) => {
            validate_id(&id)?;
            if graph.find_relationship(&id).is_some() {
                return Err(Error::InvalidInput(format!("Link already exists: {}", id)));
            }
            id
        }
        None => {
            let seed = format!("{}:{}:{}", link.source, link.relationship_type, link.target);
            fresh_id("rel", &seed, |candidate| {
                graph.find_relationship(candidate).is_some()
            })
        }
    };

    let mut rel = Relationship::new(id.clone(), link.source, link.target, link.relationship_type);
    if let Some(strength) = check_unit("strength", link.strength)? {
        rel = rel.with_strength(strength);
    }
    if let Some(confidence) = check_unit("confidence", link.confidence)? {
        rel = rel.with_confidence(confidence);
    }
    if link.bidirectional {
        rel = rel.bidirectional();
    }
    rel.evidence = link.evidence;
    graph.add_relationship(rel);

    file.save(&graph)?;
    Ok(Mutation::new(id, "link", "added"))
}

pub fn link_update(
    file: &SnapshotFile,
    id: &str,
    relationship_type: Option<RelationshipType>,
    strength: Option<f64>,
    confidence: Option<f64>,
    bidirectional: Option<bool>,
    evidence: Vec<String>,
) -> Result<Mutation> {
    let mut graph = file.load()?;
    let nothing_to_do = relationship_type.is_none()
        && strength.is_none()
        && confidence.is_none()
        && bidirectional.is_none()
        && evidence.is_empty();
    if nothing_to_do {
        return Err(Error::InvalidInput("No fields to update".to_string()));
    }

    let update = RelationshipUpdate {
        relationship_type,
        strength: check_unit("strength", strength)?,
        confidence: check_unit("confidence", confidence)?,
        bidirectional,
        evidence,
        ..Default::default()
    };
    if !graph.update_relationship(id, update) {
        return Err(Error::NotFound(format!("link {}", id)));
    }

    file.save(&graph)?;
    Ok(Mutation::new(id, "link", "updated"))
}

pub fn link_remove(file: &SnapshotFile, id: &str) -> Result<Mutation> {
    let mut graph = file.load()?;
    if !graph.remove_relationship(id) {
        return Err(Error::NotFound(format!("link {}", id)));
    }
    file.save(&graph)?;
    Ok(Mutation::new(id, "link", "removed"))
}

#[derive(Debug, Serialize)]
pub struct LinkList {
    pub relationships: Vec<Relationship>,
    pub count: usize,
}

impl CommandResult for LinkList {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        if self.relationships.is_empty() {
            return "No links found.".to_string();
        }
        let mut lines = vec![format!("{} links:", self.count)];
        for rel in &self.relationships {
            lines.push(format!("  {}", format_relationship(rel)));
        }
        lines.join("\n")
    }
}

impl LinkList {
    fn from_refs(refs: Vec<&Relationship>) -> Self {
        let relationships: Vec<Relationship> = refs.into_iter().cloned().collect();
        Self {
            count: relationships.len(),
            relationships,
        }
    }
}

/// Links from `source` to `target`, including bidirectional links stored the
/// other way round.
pub fn link_between(
    file: &SnapshotFile,
    source: &str,
    target: &str,
    relationship_type: Option<RelationshipType>,
) -> Result<LinkList> {
    let graph = file.load()?;
    Ok(LinkList::from_refs(graph.find_relationships_between(
        source,
        target,
        relationship_type,
    )))
}

pub fn link_list(file: &SnapshotFile, entity: Option<&str>) -> Result<LinkList> {
    let graph = file.load()?;
    let refs = match entity {
        Some(id) => {
            if !graph.contains(id) {
                return Err(Error::NotFound(format!("entity {}", id)));
            }
            graph.find_entity_relationships(id)
        }
        None => graph.relationships().collect(),
    };
    Ok(LinkList::from_refs(refs))
}

// === Traversal ===

impl CommandResult for TraversalResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        let mut lines = vec![format!("Visited {} entities:", self.path.len())];
        lines.push(format!("  {}", self.path.join(" -> ")));
        if !self.entities.is_empty() {
            lines.push(String::new());
            for e in &self.entities {
                lines.push(format!("  {} [{}] {}", e.id, e.entity_type, e.title));
            }
        }
        if !self.relationships.is_empty() {
            lines.push(String::new());
            lines.push(format!("  Links traversed ({}):", self.relationships.len()));
            for rel in &self.relationships {
                lines.push(format!("    {}", format_relationship(rel)));
            }
        }
        lines.join("\n")
    }
}

/// Walk the graph from `start`. A missing start entity is reported as an error
/// here rather than as an empty walk.
pub fn traverse(
    file: &SnapshotFile,
    start: &str,
    options: &TraversalOptions,
) -> Result<TraversalResult> {
    let graph = file.load()?;
    if !graph.contains(start) {
        return Err(Error::NotFound(format!("entity {}", start)));
    }
    Ok(walk(&graph, start, options))
}

// === Graph analysis ===

impl CommandResult for GraphStatistics {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        [
            format!("Entities: {}", self.entity_count),
            format!("Relationships: {}", self.relationship_count),
            format!("Average degree: {:.2}", self.average_degree),
            format!("Density: {:.4}", self.density),
            format!("Connected components: {}", self.connected_components),
        ]
        .join("\n")
    }
}

pub fn graph_stats(file: &SnapshotFile) -> Result<GraphStatistics> {
    let graph = file.load()?;
    Ok(graph.statistics().clone())
}

impl CommandResult for StructuralAnalysis {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        let mut lines = Vec::new();
        match self {
            StructuralAnalysis::Connectivity(report) => {
                if report.is_connected {
                    lines.push("Graph is fully connected.".to_string());
                } else {
                    lines.push(format!("{} components:", report.component_count));
                }
                for (i, members) in report.components.iter().enumerate() {
                    lines.push(format!(
                        "  #{} ({}): {}",
                        i + 1,
                        members.len(),
                        members.join(", ")
                    ));
                }
            }
            StructuralAnalysis::Centrality(report) => {
                lines.push(format!("Mean degree: {:.2}", report.mean));
                lines.push("Most connected:".to_string());
                for score in &report.top {
                    lines.push(format!("  {} ({:.0})", score.entity_id, score.score));
                }
            }
            StructuralAnalysis::Communities(report) => {
                lines.push(format!("{} communities:", report.community_count));
                for (i, c) in report.communities.iter().enumerate() {
                    let dominant = c
                        .dominant_type
                        .map(|t| t.to_string())
                        .unwrap_or_else(|| "-".to_string());
                    lines.push(format!(
                        "  #{} size {} mostly {} (avg strength {:.2})",
                        i + 1,
                        c.size,
                        dominant,
                        c.average_strength
                    ));
                }
            }
            StructuralAnalysis::Dependencies(report) => {
                lines.push(format!(
                    "{} dependencies, {} critical",
                    report.dependencies.len(),
                    report.critical.len()
                ));
                for dep in &report.critical {
                    lines.push(format!(
                        "  critical: {} -> {} ({:.2})",
                        dep.from, dep.to, dep.strength
                    ));
                }
                for [a, b] in &report.circular {
                    lines.push(format!("  circular: {} <-> {}", a, b));
                }
            }
        }
        lines.join("\n")
    }
}

/// Run one structural analysis mode. Dependency analysis uses the configured
/// critical strength.
pub fn graph_analysis(
    file: &SnapshotFile,
    mode: AnalysisMode,
    thresholds: &Thresholds,
) -> Result<StructuralAnalysis> {
    let graph = file.load()?;
    Ok(match mode {
        AnalysisMode::Dependencies => StructuralAnalysis::Dependencies(
            dependencies_with_threshold(&graph, thresholds.critical_strength),
        ),
        other => analyze_structure(&graph, other),
    })
}

// === Reasoning ===

impl CommandResult for AnalysisResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        let a = &self.assessment;
        let mut lines = vec![
            format!(
                "Analyzed {} entities ({:?} scope)",
                self.entity_ids.len(),
                self.scope
            ),
            format!(
                "Health: {:.0}/100  Maturity: {}  Confidence: {:.2}",
                a.health_score, a.maturity, a.confidence
            ),
        ];

        let mut section = |title: &str, items: Vec<String>| {
            if !items.is_empty() {
                lines.push(String::new());
                lines.push(format!("{}:", title));
                lines.extend(items.into_iter().map(|item| format!("  - {}", item)));
            }
        };
        section("Strengths", a.strengths.clone());
        section("Weaknesses", a.weaknesses.clone());
        section(
            "Issues",
            self.issues
                .iter()
                .map(|i| format!("[{}] {}: {}", i.severity, i.entity_id, i.description))
                .collect(),
        );
        section(
            "Bottlenecks",
            self.bottlenecks.iter().map(|b| b.description.clone()).collect(),
        );
        section(
            "Risks",
            self.risks
                .iter()
                .map(|r| format!("[{}] {}", r.severity, r.description))
                .collect(),
        );
        section(
            "Patterns",
            self.patterns.iter().map(|p| p.description.clone()).collect(),
        );
        section(
            "Opportunities",
            self.opportunities
                .iter()
                .map(|o| o.description.clone())
                .collect(),
        );
        section("Insights", self.insights.clone());
        section("Recommendations", self.recommendations.clone());

        lines.join("\n")
    }
}

/// Run the reasoning pass. With no IDs and no explicit scope the whole graph
/// is analyzed.
pub fn analyze(
    file: &SnapshotFile,
    thresholds: Thresholds,
    ids: Vec<String>,
    scope: Option<AnalysisScope>,
    depth: usize,
    as_of: Option<&str>,
) -> Result<AnalysisResult> {
    let graph = file.load()?;
    let scope = scope.unwrap_or(if ids.is_empty() {
        AnalysisScope::Workflow
    } else {
        AnalysisScope::Selected
    });
    let mut request = AnalysisRequest::new(ids, scope).with_depth(depth);
    if let Some(as_of) = as_of {
        request = request.as_of(parse_date(as_of)?);
    }
    Reasoner::new(thresholds).analyze(&graph, &request)
}

// === Merge ===

impl CommandResult for MergeReport {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        format!(
            "Merged: {} entities added, {} updated; {} links added, {} updated",
            self.entities_added,
            self.entities_updated,
            self.relationships_added,
            self.relationships_updated
        )
    }
}

/// Merge the snapshot at `other` into this graph.
pub fn merge(file: &SnapshotFile, other: &Path, policy: MergePolicy) -> Result<MergeReport> {
    let mut graph = file.load_or_default()?;
    let incoming: WorkflowGraph = SnapshotFile::new(other).load()?;
    let report = graph.merge_graph(&incoming, policy);
    file.save(&graph)?;
    Ok(report)
}

// === Config ===

#[derive(Debug, Serialize)]
pub struct ConfigShow {
    pub source: String,
    pub thresholds: Thresholds,
}

impl CommandResult for ConfigShow {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        let t = &self.thresholds;
        [
            format!("Source: {}", self.source),
            format!("stale-days {}", t.stale_days),
            format!("bottleneck-threshold {}", t.bottleneck_threshold),
            format!("fan-out-threshold {}", t.fan_out_threshold),
            format!("efficient-project-children {}", t.efficient_project_children),
            format!("critical-strength {}", t.critical_strength),
            format!("short-document-chars {}", t.short_document_chars),
            format!("high-priority-max {}", t.high_priority_max),
            format!("due-soon-days {}", t.due_soon_days),
            format!("cache-results {}", t.cache_results),
        ]
        .join("\n")
    }
}

pub fn config_show(cli_path: Option<&Path>) -> Result<ConfigShow> {
    let resolved = resolve_config(cli_path)?;
    Ok(ConfigShow {
        source: resolved.source.to_string(),
        thresholds: resolved.value,
    })
}
