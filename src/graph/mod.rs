//! In-memory workflow graph store.
//!
//! `WorkflowGraph` owns every entity and relationship, keeps the structural
//! invariants (unique IDs, child-list and relationship cleanup on removal,
//! clamped scores) and recomputes its summary statistics after every
//! mutation. There is no incremental bookkeeping: a full O(V+E) sweep per
//! write is fine for graphs of a few hundred nodes.
//!
//! Not-found conditions on update/remove are reported as `false`; dangling
//! `parent_id`/`project_id`/endpoint references are tolerated and simply
//! skipped by lookups.

pub mod analysis;
pub mod traversal;

use crate::models::graph::UnionFind;
use crate::models::{Entity, EntityType, Metadata, Relationship, RelationshipType, clamp_unit};
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Derived summary statistics. Never authoritative; always recomputed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphStatistics {
    pub entity_count: usize,
    pub relationship_count: usize,
    /// Mean number of relationship endpoints per entity (2E / V)
    pub average_degree: f64,
    /// E / (V * (V - 1)), or 0 for fewer than two entities
    pub density: f64,
    pub connected_components: usize,
}

impl GraphStatistics {
    /// Compute statistics from scratch.
    pub fn compute(
        entities: &BTreeMap<String, Entity>,
        relationships: &BTreeMap<String, Relationship>,
    ) -> Self {
        let entity_count = entities.len();
        let relationship_count = relationships.len();

        let average_degree = if entity_count > 0 {
            (2 * relationship_count) as f64 / entity_count as f64
        } else {
            0.0
        };

        let density = if entity_count > 1 {
            relationship_count as f64 / (entity_count * (entity_count - 1)) as f64
        } else {
            0.0
        };

        let mut uf = UnionFind::from_ids(entities.keys().cloned());
        for rel in relationships.values() {
            uf.union(&rel.source_id, &rel.target_id);
        }

        Self {
            entity_count,
            relationship_count,
            average_degree,
            density,
            connected_components: uf.num_components(),
        }
    }
}

/// Fields to merge into an existing entity. `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct EntityUpdate {
    pub title: Option<String>,
    pub content: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub priority: Option<u8>,
    pub status: Option<String>,
    pub project_id: Option<String>,
    pub parent_id: Option<String>,
    pub child_ids: Option<Vec<String>>,
    /// Replaces the tag set
    pub tags: Option<Vec<String>>,
    /// Keys are inserted or overwritten; other keys are kept
    pub metadata: Metadata,
}

impl EntityUpdate {
    /// Returns true if no field would change.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.content.is_none()
            && self.due_date.is_none()
            && self.completed_at.is_none()
            && self.priority.is_none()
            && self.status.is_none()
            && self.project_id.is_none()
            && self.parent_id.is_none()
            && self.child_ids.is_none()
            && self.tags.is_none()
            && self.metadata.is_empty()
    }

    fn apply(self, entity: &mut Entity) {
        if let Some(title) = self.title {
            entity.title = title;
        }
        if let Some(content) = self.content {
            entity.content = Some(content);
        }
        if let Some(due) = self.due_date {
            entity.due_date = Some(due);
        }
        if let Some(completed) = self.completed_at {
            entity.completed_at = Some(completed);
        }
        if let Some(priority) = self.priority {
            entity.priority = Some(priority);
        }
        if let Some(status) = self.status {
            entity.status = status;
        }
        if let Some(project) = self.project_id {
            entity.project_id = Some(project);
        }
        if let Some(parent) = self.parent_id {
            entity.parent_id = Some(parent);
        }
        if let Some(children) = self.child_ids {
            entity.child_ids = children;
        }
        if let Some(tags) = self.tags {
            entity.tags = tags.into_iter().collect();
        }
        entity.metadata.extend(self.metadata);
    }
}

/// Fields to merge into an existing relationship.
#[derive(Debug, Clone, Default)]
pub struct RelationshipUpdate {
    pub relationship_type: Option<RelationshipType>,
    pub strength: Option<f64>,
    pub confidence: Option<f64>,
    pub bidirectional: Option<bool>,
    /// Appended to the existing evidence list
    pub evidence: Vec<String>,
    pub metadata: Metadata,
}

impl RelationshipUpdate {
    fn apply(self, rel: &mut Relationship) {
        if let Some(t) = self.relationship_type {
            rel.relationship_type = t;
        }
        if let Some(strength) = self.strength {
            rel.strength = clamp_unit(strength);
        }
        if let Some(confidence) = self.confidence {
            rel.confidence = clamp_unit(confidence);
        }
        if let Some(bidirectional) = self.bidirectional {
            rel.bidirectional = bidirectional;
        }
        rel.evidence.extend(self.evidence);
        rel.metadata.extend(self.metadata);
    }
}

/// How `merge_graph` resolves ID collisions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergePolicy {
    /// Keep the record already in this graph
    #[default]
    PreferExisting,
    /// Overwrite with the incoming record
    PreferNew,
    /// Shallow-merge both records; the later `updated_at` wins
    Merge,
}

impl std::str::FromStr for MergePolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "prefer_existing" | "prefer-existing" => Ok(MergePolicy::PreferExisting),
            "prefer_new" | "prefer-new" => Ok(MergePolicy::PreferNew),
            "merge" => Ok(MergePolicy::Merge),
            _ => Err(format!("Unknown merge policy: {}", s)),
        }
    }
}

/// Counts reported by `merge_graph`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeReport {
    pub entities_added: usize,
    pub entities_updated: usize,
    pub relationships_added: usize,
    pub relationships_updated: usize,
}

/// The serialized form of a graph. This is the only persistence format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub entities: Vec<Entity>,
    pub relationships: Vec<Relationship>,
    #[serde(default)]
    pub root_ids: Vec<String>,
    #[serde(default)]
    pub statistics: GraphStatistics,
    pub exported_at: DateTime<Utc>,
}

/// Owned aggregate of entities, relationships and derived statistics.
#[derive(Debug, Clone, Default)]
pub struct WorkflowGraph {
    entities: BTreeMap<String, Entity>,
    relationships: BTreeMap<String, Relationship>,
    root_ids: Vec<String>,
    statistics: GraphStatistics,
    /// Bumped on every mutation; lets readers detect a changed snapshot
    revision: u64,
}

impl PartialEq for WorkflowGraph {
    fn eq(&self, other: &Self) -> bool {
        self.entities == other.entities
            && self.relationships == other.relationships
            && self.root_ids == other.root_ids
            && self.statistics == other.statistics
    }
}

impl WorkflowGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    fn touch(&mut self) {
        self.statistics = GraphStatistics::compute(&self.entities, &self.relationships);
        self.revision = self.revision.wrapping_add(1);
    }

    fn sync_root(&mut self, id: &str, is_root: bool) {
        let present = self.root_ids.iter().any(|r| r == id);
        if is_root && !present {
            self.root_ids.push(id.to_string());
        } else if !is_root && present {
            self.root_ids.retain(|r| r != id);
        }
    }

    /// Insert or replace an entity.
    pub fn add_entity(&mut self, entity: Entity) {
        let id = entity.id.clone();
        let is_root = entity.parent_id.is_none();
        let replaced = self.entities.insert(id.clone(), entity).is_some();
        self.sync_root(&id, is_root);
        self.touch();
        tracing::debug!(entity_id = %id, replaced, "entity added");
    }

    /// Merge fields into an existing entity and stamp its update time.
    ///
    /// Returns `false` if the entity does not exist.
    pub fn update_entity(&mut self, id: &str, update: EntityUpdate) -> bool {
        let Some(entity) = self.entities.get_mut(id) else {
            tracing::debug!(entity_id = %id, "update skipped: entity not found");
            return false;
        };
        update.apply(entity);
        entity.updated_at = Utc::now();
        let is_root = entity.parent_id.is_none();
        self.sync_root(id, is_root);
        self.touch();
        tracing::debug!(entity_id = %id, "entity updated");
        true
    }

    /// Remove an entity, every relationship touching it, and every child
    /// reference to it. Children themselves are kept (orphaned).
    ///
    /// Returns `false` if the entity does not exist.
    pub fn remove_entity(&mut self, id: &str) -> bool {
        if self.entities.remove(id).is_none() {
            tracing::debug!(entity_id = %id, "remove skipped: entity not found");
            return false;
        }

        let before = self.relationships.len();
        self.relationships.retain(|_, rel| !rel.touches(id));
        let dropped = before - self.relationships.len();

        for entity in self.entities.values_mut() {
            entity.child_ids.retain(|child| child != id);
        }
        self.root_ids.retain(|r| r != id);

        self.touch();
        tracing::debug!(entity_id = %id, dropped_relationships = dropped, "entity removed");
        true
    }

    /// Insert or replace a relationship. Scores are clamped into [0, 1].
    pub fn add_relationship(&mut self, mut relationship: Relationship) {
        relationship.normalize();
        let id = relationship.id.clone();
        let replaced = self.relationships.insert(id.clone(), relationship).is_some();
        self.touch();
        tracing::debug!(relationship_id = %id, replaced, "relationship added");
    }

    /// Merge fields into an existing relationship.
    ///
    /// Returns `false` if the relationship does not exist.
    pub fn update_relationship(&mut self, id: &str, update: RelationshipUpdate) -> bool {
        let Some(rel) = self.relationships.get_mut(id) else {
            return false;
        };
        update.apply(rel);
        self.touch();
        tracing::debug!(relationship_id = %id, "relationship updated");
        true
    }

    /// Remove a relationship. Returns `false` if it does not exist.
    pub fn remove_relationship(&mut self, id: &str) -> bool {
        if self.relationships.remove(id).is_none() {
            return false;
        }
        self.touch();
        tracing::debug!(relationship_id = %id, "relationship removed");
        true
    }

    pub fn find_entity(&self, id: &str) -> Option<&Entity> {
        self.entities.get(id)
    }

    pub fn find_relationship(&self, id: &str) -> Option<&Relationship> {
        self.relationships.get(id)
    }

    /// All entities of the given type, in ID order.
    pub fn find_entities_by_type(&self, entity_type: EntityType) -> Vec<&Entity> {
        self.entities
            .values()
            .filter(|e| e.entity_type == entity_type)
            .collect()
    }

    /// Every relationship with the entity as source or target.
    pub fn find_entity_relationships(&self, id: &str) -> Vec<&Relationship> {
        self.relationships
            .values()
            .filter(|rel| rel.touches(id))
            .collect()
    }

    /// Relationships leading from `a` to `b`, including bidirectional edges
    /// stored as `b -> a`, optionally restricted to one type.
    pub fn find_relationships_between(
        &self,
        a: &str,
        b: &str,
        relationship_type: Option<RelationshipType>,
    ) -> Vec<&Relationship> {
        self.relationships
            .values()
            .filter(|rel| rel.connects(a, b))
            .filter(|rel| relationship_type.is_none_or(|t| rel.relationship_type == t))
            .collect()
    }

    /// Existing children of an entity, in `child_ids` order.
    pub fn children_of(&self, id: &str) -> Vec<&Entity> {
        self.entities
            .get(id)
            .map(|parent| {
                parent
                    .child_ids
                    .iter()
                    .filter_map(|child| self.entities.get(child))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Entities whose `project_id` names the given project.
    pub fn project_members(&self, project_id: &str) -> Vec<&Entity> {
        self.entities
            .values()
            .filter(|e| e.project_id.as_deref() == Some(project_id))
            .collect()
    }

    /// Returns true if the entity exists.
    pub fn contains(&self, id: &str) -> bool {
        self.entities.contains_key(id)
    }

    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    pub fn relationships(&self) -> impl Iterator<Item = &Relationship> {
        self.relationships.values()
    }

    pub fn root_ids(&self) -> &[String] {
        &self.root_ids
    }

    pub fn statistics(&self) -> &GraphStatistics {
        &self.statistics
    }

    /// Mutation counter. Changes whenever the graph does.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Export a full structural copy of the graph.
    pub fn export_snapshot(&self) -> GraphSnapshot {
        GraphSnapshot {
            entities: self.entities.values().cloned().collect(),
            relationships: self.relationships.values().cloned().collect(),
            root_ids: self.root_ids.clone(),
            statistics: self.statistics.clone(),
            exported_at: Utc::now(),
        }
    }

    /// Rebuild a graph from a snapshot. Statistics are recomputed rather than
    /// trusted, and scores are re-clamped.
    pub fn import_snapshot(snapshot: GraphSnapshot) -> Self {
        let mut graph = Self::new();
        for entity in snapshot.entities {
            graph.entities.insert(entity.id.clone(), entity);
        }
        for mut rel in snapshot.relationships {
            rel.normalize();
            graph.relationships.insert(rel.id.clone(), rel);
        }

        graph.root_ids = snapshot
            .root_ids
            .into_iter()
            .filter(|id| graph.entities.contains_key(id))
            .collect();
        // Older snapshots may lack root IDs
        if graph.root_ids.is_empty() {
            graph.root_ids = graph
                .entities
                .values()
                .filter(|e| e.parent_id.is_none())
                .map(|e| e.id.clone())
                .collect();
        }

        graph.touch();
        tracing::info!(
            entities = graph.statistics.entity_count,
            relationships = graph.statistics.relationship_count,
            "snapshot imported"
        );
        graph
    }

    /// Serialize the snapshot as pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.export_snapshot())?)
    }

    /// Parse a JSON snapshot.
    pub fn from_json(json: &str) -> Result<Self> {
        let snapshot: GraphSnapshot = serde_json::from_str(json)?;
        Ok(Self::import_snapshot(snapshot))
    }

    /// Union another graph into this one under the given collision policy.
    pub fn merge_graph(&mut self, other: &WorkflowGraph, policy: MergePolicy) -> MergeReport {
        let mut report = MergeReport::default();

        for incoming in other.entities.values() {
            match self.entities.get_mut(&incoming.id) {
                None => {
                    self.entities.insert(incoming.id.clone(), incoming.clone());
                    report.entities_added += 1;
                }
                Some(existing) => match policy {
                    MergePolicy::PreferExisting => {}
                    MergePolicy::PreferNew => {
                        *existing = incoming.clone();
                        report.entities_updated += 1;
                    }
                    MergePolicy::Merge => {
                        merge_entity(existing, incoming);
                        report.entities_updated += 1;
                    }
                },
            }
        }

        for incoming in other.relationships.values() {
            let mut incoming = incoming.clone();
            incoming.normalize();
            match self.relationships.get_mut(&incoming.id) {
                None => {
                    self.relationships.insert(incoming.id.clone(), incoming);
                    report.relationships_added += 1;
                }
                Some(existing) => match policy {
                    MergePolicy::PreferExisting => {}
                    MergePolicy::PreferNew => {
                        *existing = incoming;
                        report.relationships_updated += 1;
                    }
                    MergePolicy::Merge => {
                        merge_relationship(existing, incoming);
                        report.relationships_updated += 1;
                    }
                },
            }
        }

        let roots: Vec<(String, bool)> = self
            .entities
            .values()
            .map(|e| (e.id.clone(), e.parent_id.is_none()))
            .collect();
        for (id, is_root) in roots {
            self.sync_root(&id, is_root);
        }

        self.touch();
        tracing::info!(?policy, ?report, "graph merged");
        report
    }
}

/// Shallow merge: incoming set fields win, collections are unioned, and the
/// later update time is kept.
fn merge_entity(existing: &mut Entity, incoming: &Entity) {
    existing.entity_type = incoming.entity_type;
    existing.title = incoming.title.clone();
    if incoming.content.is_some() {
        existing.content = incoming.content.clone();
    }
    if incoming.due_date.is_some() {
        existing.due_date = incoming.due_date;
    }
    if incoming.completed_at.is_some() {
        existing.completed_at = incoming.completed_at;
    }
    if incoming.priority.is_some() {
        existing.priority = incoming.priority;
    }
    if !incoming.status.is_empty() {
        existing.status = incoming.status.clone();
    }
    if incoming.project_id.is_some() {
        existing.project_id = incoming.project_id.clone();
    }
    if incoming.parent_id.is_some() {
        existing.parent_id = incoming.parent_id.clone();
    }
    for child in &incoming.child_ids {
        if !existing.child_ids.contains(child) {
            existing.child_ids.push(child.clone());
        }
    }
    existing.tags.extend(incoming.tags.iter().cloned());
    existing
        .metadata
        .extend(incoming.metadata.iter().map(|(k, v)| (k.clone(), v.clone())));
    existing.created_at = existing.created_at.min(incoming.created_at);
    existing.updated_at = existing.updated_at.max(incoming.updated_at);
}

fn merge_relationship(existing: &mut Relationship, incoming: Relationship) {
    existing.source_id = incoming.source_id;
    existing.target_id = incoming.target_id;
    existing.relationship_type = incoming.relationship_type;
    existing.strength = incoming.strength;
    existing.confidence = incoming.confidence;
    existing.bidirectional = existing.bidirectional || incoming.bidirectional;
    for evidence in incoming.evidence {
        if !existing.evidence.contains(&evidence) {
            existing.evidence.push(evidence);
        }
    }
    existing.metadata.extend(incoming.metadata);
    existing.created_at = existing.created_at.min(incoming.created_at);
}

/// Reject IDs that cannot be used as map keys on the command line.
pub fn validate_id(id: &str) -> Result<()> {
    if id.trim().is_empty() {
        return Err(Error::InvalidInput("ID must not be empty".to_string()));
    }
    if id.chars().any(char::is_whitespace) {
        return Err(Error::InvalidInput(format!(
            "ID must not contain whitespace: {:?}",
            id
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EntityType;

    fn entity(id: &str, t: EntityType) -> Entity {
        Entity::new(id, t, format!("Title {}", id))
    }

    fn rel(id: &str, s: &str, t: &str, rt: RelationshipType) -> Relationship {
        Relationship::new(id, s, t, rt)
    }

    #[test]
    fn test_add_entity_replaces_on_same_id() {
        let mut graph = WorkflowGraph::new();
        graph.add_entity(entity("a", EntityType::Task));
        let mut replacement = entity("a", EntityType::Note);
        replacement.title = "Replaced".to_string();
        graph.add_entity(replacement);

        assert_eq!(graph.statistics().entity_count, 1);
        assert_eq!(graph.find_entity("a").unwrap().title, "Replaced");
        assert_eq!(graph.root_ids(), ["a"]);
    }

    #[test]
    fn test_root_ids_track_parent() {
        let mut graph = WorkflowGraph::new();
        graph.add_entity(entity("p", EntityType::Project));
        let mut child = entity("c", EntityType::Task);
        child.parent_id = Some("p".to_string());
        graph.add_entity(child);
        assert_eq!(graph.root_ids(), ["p"]);

        graph.add_entity(entity("c", EntityType::Task));
        assert_eq!(graph.root_ids(), ["p", "c"]);
    }

    #[test]
    fn test_update_entity_missing_returns_false() {
        let mut graph = WorkflowGraph::new();
        assert!(!graph.update_entity("ghost", EntityUpdate::default()));
    }

    #[test]
    fn test_update_entity_merges_and_stamps() {
        let mut graph = WorkflowGraph::new();
        let mut e = entity("a", EntityType::Task);
        e.updated_at = e.updated_at - chrono::Duration::days(3);
        e.metadata.insert("keep".to_string(), serde_json::json!(1));
        let before = e.updated_at;
        graph.add_entity(e);

        let mut update = EntityUpdate {
            status: Some("done".to_string()),
            priority: Some(1),
            ..Default::default()
        };
        update
            .metadata
            .insert("added".to_string(), serde_json::json!(true));
        assert!(graph.update_entity("a", update));

        let updated = graph.find_entity("a").unwrap();
        assert_eq!(updated.status, "done");
        assert_eq!(updated.priority, Some(1));
        assert_eq!(updated.title, "Title a");
        assert!(updated.updated_at > before);
        assert_eq!(updated.metadata.len(), 2);
    }

    #[test]
    fn test_remove_entity_cascades() {
        let mut graph = WorkflowGraph::new();
        let mut parent = entity("p", EntityType::Project);
        parent.child_ids = vec!["c".to_string(), "d".to_string()];
        graph.add_entity(parent);
        let mut child = entity("c", EntityType::Task);
        child.parent_id = Some("p".to_string());
        graph.add_entity(child);
        graph.add_entity(entity("d", EntityType::Task));
        graph.add_relationship(rel("r1", "c", "d", RelationshipType::DependsOn));
        graph.add_relationship(rel("r2", "p", "c", RelationshipType::Contains));
        graph.add_relationship(rel("r3", "p", "d", RelationshipType::Contains));

        assert!(graph.remove_entity("c"));
        assert!(graph.find_entity_relationships("c").is_empty());
        assert_eq!(graph.find_entity("p").unwrap().child_ids, vec!["d"]);
        assert_eq!(graph.statistics().relationship_count, 1);
        assert!(!graph.remove_entity("c"));
    }

    #[test]
    fn test_remove_parent_orphans_children() {
        let mut graph = WorkflowGraph::new();
        let mut parent = entity("p", EntityType::Project);
        parent.child_ids = vec!["c".to_string()];
        graph.add_entity(parent);
        let mut child = entity("c", EntityType::Task);
        child.parent_id = Some("p".to_string());
        graph.add_entity(child);

        assert!(graph.remove_entity("p"));
        let orphan = graph.find_entity("c").unwrap();
        assert_eq!(orphan.parent_id.as_deref(), Some("p"));
        assert!(graph.children_of("p").is_empty());
    }

    #[test]
    fn test_add_relationship_clamps_scores() {
        let mut graph = WorkflowGraph::new();
        let mut r = rel("r", "a", "b", RelationshipType::Supports);
        r.strength = 3.0;
        r.confidence = -1.0;
        graph.add_relationship(r);

        let stored = graph.find_relationship("r").unwrap();
        assert_eq!(stored.strength, 1.0);
        assert_eq!(stored.confidence, 0.0);
    }

    #[test]
    fn test_update_relationship() {
        let mut graph = WorkflowGraph::new();
        graph.add_relationship(rel("r", "a", "b", RelationshipType::RelatedTo));

        let update = RelationshipUpdate {
            strength: Some(2.0),
            bidirectional: Some(true),
            evidence: vec!["same thread".to_string()],
            ..Default::default()
        };
        assert!(graph.update_relationship("r", update));
        assert!(!graph.update_relationship("missing", RelationshipUpdate::default()));

        let stored = graph.find_relationship("r").unwrap();
        assert_eq!(stored.strength, 1.0);
        assert!(stored.bidirectional);
        assert_eq!(stored.evidence, vec!["same thread"]);
    }

    #[test]
    fn test_find_relationships_between_matches_reverse_bidirectional() {
        let mut graph = WorkflowGraph::new();
        graph.add_relationship(rel("r1", "a", "b", RelationshipType::DependsOn));
        graph.add_relationship(rel("r2", "b", "a", RelationshipType::RelatedTo).bidirectional());
        graph.add_relationship(rel("r3", "b", "a", RelationshipType::Follows));

        let ids: Vec<&str> = graph
            .find_relationships_between("a", "b", None)
            .iter()
            .map(|r| r.id.as_str())
            .collect();
        assert_eq!(ids, vec!["r1", "r2"]);

        let typed = graph.find_relationships_between("a", "b", Some(RelationshipType::RelatedTo));
        assert_eq!(typed.len(), 1);
        assert_eq!(typed[0].id, "r2");
    }

    #[test]
    fn test_find_entities_by_type() {
        let mut graph = WorkflowGraph::new();
        graph.add_entity(entity("t1", EntityType::Task));
        graph.add_entity(entity("n1", EntityType::Note));
        graph.add_entity(entity("t2", EntityType::Task));

        let tasks = graph.find_entities_by_type(EntityType::Task);
        assert_eq!(tasks.len(), 2);
        assert!(graph.find_entities_by_type(EntityType::Email).is_empty());
    }

    #[test]
    fn test_statistics_recomputed() {
        let mut graph = WorkflowGraph::new();
        assert_eq!(graph.statistics().density, 0.0);

        graph.add_entity(entity("a", EntityType::Task));
        graph.add_entity(entity("b", EntityType::Task));
        graph.add_entity(entity("c", EntityType::Task));
        assert_eq!(graph.statistics().connected_components, 3);

        graph.add_relationship(rel("r1", "a", "b", RelationshipType::DependsOn));
        graph.add_relationship(rel("r2", "b", "c", RelationshipType::DependsOn));
        let stats = graph.statistics();
        assert_eq!(stats.connected_components, 1);
        assert!((stats.density - 2.0 / 6.0).abs() < 1e-9);
        assert!((stats.average_degree - 4.0 / 3.0).abs() < 1e-9);

        graph.remove_relationship("r2");
        assert_eq!(graph.statistics().connected_components, 2);
    }

    #[test]
    fn test_dangling_relationship_does_not_join_components() {
        let mut graph = WorkflowGraph::new();
        graph.add_entity(entity("a", EntityType::Note));
        graph.add_relationship(rel("r", "a", "ghost", RelationshipType::References));
        assert_eq!(graph.statistics().connected_components, 1);
        assert_eq!(graph.statistics().relationship_count, 1);
    }

    #[test]
    fn test_revision_changes_on_mutation() {
        let mut graph = WorkflowGraph::new();
        let r0 = graph.revision();
        graph.add_entity(entity("a", EntityType::Note));
        assert_ne!(graph.revision(), r0);
        let r1 = graph.revision();
        assert!(!graph.remove_entity("ghost"));
        assert_eq!(graph.revision(), r1);
    }

    #[test]
    fn test_snapshot_roundtrip() {
        let mut graph = WorkflowGraph::new();
        let mut e = entity("a", EntityType::Document);
        e.content = Some("body".to_string());
        e.due_date = Some(Utc::now());
        graph.add_entity(e);
        graph.add_entity(entity("b", EntityType::Media));
        graph.add_relationship(rel("r", "a", "b", RelationshipType::Documents).with_strength(0.9));

        let json = graph.to_json().unwrap();
        let restored = WorkflowGraph::from_json(&json).unwrap();
        assert_eq!(graph, restored);
    }

    #[test]
    fn test_merge_prefer_existing() {
        let mut base = WorkflowGraph::new();
        base.add_entity(entity("a", EntityType::Task));

        let mut other = WorkflowGraph::new();
        let mut a = entity("a", EntityType::Task);
        a.title = "Other".to_string();
        other.add_entity(a);
        other.add_entity(entity("b", EntityType::Task));
        other.add_relationship(rel("r", "a", "b", RelationshipType::DependsOn));

        let report = base.merge_graph(&other, MergePolicy::PreferExisting);
        assert_eq!(report.entities_added, 1);
        assert_eq!(report.entities_updated, 0);
        assert_eq!(report.relationships_added, 1);
        assert_eq!(base.find_entity("a").unwrap().title, "Title a");
        assert_eq!(base.statistics().connected_components, 1);
    }

    #[test]
    fn test_merge_prefer_new() {
        let mut base = WorkflowGraph::new();
        base.add_entity(entity("a", EntityType::Task));

        let mut other = WorkflowGraph::new();
        let mut a = entity("a", EntityType::Note);
        a.title = "Other".to_string();
        other.add_entity(a);

        let report = base.merge_graph(&other, MergePolicy::PreferNew);
        assert_eq!(report.entities_updated, 1);
        let merged = base.find_entity("a").unwrap();
        assert_eq!(merged.title, "Other");
        assert_eq!(merged.entity_type, EntityType::Note);
    }

    #[test]
    fn test_merge_shallow_merge() {
        let mut base = WorkflowGraph::new();
        let mut a = entity("a", EntityType::Task);
        a.priority = Some(2);
        a.tags.insert("old".to_string());
        a.child_ids = vec!["x".to_string()];
        base.add_entity(a);

        let mut other = WorkflowGraph::new();
        let mut incoming = entity("a", EntityType::Task);
        incoming.title = "Newer".to_string();
        incoming.tags.insert("new".to_string());
        incoming.child_ids = vec!["y".to_string()];
        incoming.updated_at = Utc::now() + chrono::Duration::hours(1);
        let newest = incoming.updated_at;
        other.add_entity(incoming);

        let report = base.merge_graph(&other, MergePolicy::Merge);
        assert_eq!(report.entities_updated, 1);

        let merged = base.find_entity("a").unwrap();
        assert_eq!(merged.title, "Newer");
        assert_eq!(merged.priority, Some(2));
        assert_eq!(merged.tags.len(), 2);
        assert_eq!(merged.child_ids, vec!["x", "y"]);
        assert_eq!(merged.updated_at, newest);
    }

    #[test]
    fn test_merge_policy_from_str() {
        assert_eq!("merge".parse::<MergePolicy>().unwrap(), MergePolicy::Merge);
        assert_eq!(
            "prefer-new".parse::<MergePolicy>().unwrap(),
            MergePolicy::PreferNew
        );
        assert!("overwrite".parse::<MergePolicy>().is_err());
    }

    #[test]
    fn test_validate_id() {
        assert!(validate_id("task-1").is_ok());
        assert!(validate_id("").is_err());
        assert!(validate_id("has space").is_err());
    }
}
