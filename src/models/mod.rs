//! Data models for workflow graph entities.
//!
//! This module defines the core data structures:
//! - `Entity` - Notes, tasks, documents, media and the other workflow items
//! - `Relationship` - Typed, optionally bidirectional edges between entities
//! - `Metadata` - Open, string-keyed bag of JSON values carried by both

pub mod graph;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Arbitrary extra data attached to entities and relationships.
pub type Metadata = BTreeMap<String, serde_json::Value>;

/// Statuses that mark an entity as finished.
const COMPLETED_STATUSES: &[&str] = &["completed", "done"];

/// Kind of workflow item an entity represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Note,
    Task,
    Document,
    Media,
    Project,
    Conversation,
    Email,
    Calendar,
    Reference,
}

impl EntityType {
    /// Get all entity types.
    pub fn all() -> &'static [EntityType] {
        &[
            EntityType::Note,
            EntityType::Task,
            EntityType::Document,
            EntityType::Media,
            EntityType::Project,
            EntityType::Conversation,
            EntityType::Email,
            EntityType::Calendar,
            EntityType::Reference,
        ]
    }

    /// Snake-case name used in snapshots and on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Note => "note",
            EntityType::Task => "task",
            EntityType::Document => "document",
            EntityType::Media => "media",
            EntityType::Project => "project",
            EntityType::Conversation => "conversation",
            EntityType::Email => "email",
            EntityType::Calendar => "calendar",
            EntityType::Reference => "reference",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for EntityType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        EntityType::all()
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("Unknown entity type: {}", s))
    }
}

/// A node in the workflow graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Unique identifier, immutable once created
    pub id: String,

    /// Kind of item
    #[serde(rename = "type")]
    pub entity_type: EntityType,

    /// Display title
    pub title: String,

    /// Free-text body
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,

    /// Due date, if scheduled
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,

    /// Completion timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,

    /// Priority level (conventionally 1-5, lower is more urgent)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<u8>,

    /// Free-form status ("pending", "completed", "done", ...)
    #[serde(default)]
    pub status: String,

    /// Owning project entity
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,

    /// Parent entity for hierarchical organization
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,

    /// Child entity IDs
    #[serde(default)]
    pub child_ids: Vec<String>,

    /// Tags for categorization
    #[serde(default)]
    pub tags: BTreeSet<String>,

    /// Arbitrary extra data
    #[serde(default)]
    pub metadata: Metadata,
}

impl Entity {
    /// Create a new pending entity with the given ID, type and title.
    pub fn new(id: impl Into<String>, entity_type: EntityType, title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            entity_type,
            title: title.into(),
            content: None,
            created_at: now,
            updated_at: now,
            due_date: None,
            completed_at: None,
            priority: None,
            status: "pending".to_string(),
            project_id: None,
            parent_id: None,
            child_ids: Vec::new(),
            tags: BTreeSet::new(),
            metadata: Metadata::new(),
        }
    }

    /// Returns true if the status marks this entity as finished.
    pub fn is_completed(&self) -> bool {
        let status = self.status.to_lowercase();
        COMPLETED_STATUSES.contains(&status.as_str())
    }

    /// Returns true if the entity has a due date in the past and is not finished.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        !self.is_completed() && self.due_date.is_some_and(|due| due < now)
    }

    /// Length of the content in characters (0 when absent).
    pub fn content_len(&self) -> usize {
        self.content.as_deref().map_or(0, |c| c.chars().count())
    }
}

/// Type of relationship between entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipType {
    /// Source cannot finish before target
    DependsOn,
    /// Source cites target
    References,
    /// Informational link
    RelatedTo,
    /// Source produced target
    Generates,
    /// Source documents target
    Documents,
    /// Containment (project or folder style)
    Contains,
    /// Source builds on target
    Extends,
    /// Source backs up target
    Supports,
    /// Source is a report about target
    ReportsOn,
    /// Source suggests target
    Recommends,
    /// Source comes after target in a sequence
    Follows,
    /// Source prevents target from progressing
    Blocks,
    /// Source mentions target in passing
    Mentions,
}

impl RelationshipType {
    /// Get all relationship types.
    pub fn all() -> &'static [RelationshipType] {
        &[
            RelationshipType::DependsOn,
            RelationshipType::References,
            RelationshipType::RelatedTo,
            RelationshipType::Generates,
            RelationshipType::Documents,
            RelationshipType::Contains,
            RelationshipType::Extends,
            RelationshipType::Supports,
            RelationshipType::ReportsOn,
            RelationshipType::Recommends,
            RelationshipType::Follows,
            RelationshipType::Blocks,
            RelationshipType::Mentions,
        ]
    }

    /// Snake-case name used in snapshots and on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationshipType::DependsOn => "depends_on",
            RelationshipType::References => "references",
            RelationshipType::RelatedTo => "related_to",
            RelationshipType::Generates => "generates",
            RelationshipType::Documents => "documents",
            RelationshipType::Contains => "contains",
            RelationshipType::Extends => "extends",
            RelationshipType::Supports => "supports",
            RelationshipType::ReportsOn => "reports_on",
            RelationshipType::Recommends => "recommends",
            RelationshipType::Follows => "follows",
            RelationshipType::Blocks => "blocks",
            RelationshipType::Mentions => "mentions",
        }
    }

    /// Returns true if this type takes part in dependency analysis.
    pub fn is_dependency(&self) -> bool {
        matches!(self, RelationshipType::DependsOn | RelationshipType::References)
    }
}

impl fmt::Display for RelationshipType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for RelationshipType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        RelationshipType::all()
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("Unknown relationship type: {}", s))
    }
}

/// A typed edge between two entities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    /// Unique identifier
    pub id: String,

    /// Source entity ID
    pub source_id: String,

    /// Target entity ID
    pub target_id: String,

    /// Type of relationship
    #[serde(rename = "type")]
    pub relationship_type: RelationshipType,

    /// How strong the link is, in [0, 1]
    #[serde(default = "default_strength")]
    pub strength: f64,

    /// Whether the edge can be walked target-to-source as well
    #[serde(default)]
    pub bidirectional: bool,

    /// When the edge was created
    pub created_at: DateTime<Utc>,

    /// How sure the producer was about the link, in [0, 1]
    #[serde(default = "default_confidence")]
    pub confidence: f64,

    /// Supporting snippets for the link
    #[serde(default)]
    pub evidence: Vec<String>,

    /// Arbitrary extra data
    #[serde(default)]
    pub metadata: Metadata,
}

fn default_strength() -> f64 {
    0.5
}

fn default_confidence() -> f64 {
    1.0
}

/// Clamp a score into [0, 1]. NaN collapses to 0.
pub fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

impl Relationship {
    /// Create a new directed relationship with default strength and confidence.
    pub fn new(
        id: impl Into<String>,
        source_id: impl Into<String>,
        target_id: impl Into<String>,
        relationship_type: RelationshipType,
    ) -> Self {
        Self {
            id: id.into(),
            source_id: source_id.into(),
            target_id: target_id.into(),
            relationship_type,
            strength: default_strength(),
            bidirectional: false,
            created_at: Utc::now(),
            confidence: default_confidence(),
            evidence: Vec::new(),
            metadata: Metadata::new(),
        }
    }

    /// Set the strength, clamped into [0, 1].
    pub fn with_strength(mut self, strength: f64) -> Self {
        self.strength = clamp_unit(strength);
        self
    }

    /// Set the confidence, clamped into [0, 1].
    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = clamp_unit(confidence);
        self
    }

    /// Mark the edge as walkable in both directions.
    pub fn bidirectional(mut self) -> Self {
        self.bidirectional = true;
        self
    }

    /// Re-apply the [0, 1] bounds on strength and confidence.
    pub fn normalize(&mut self) {
        self.strength = clamp_unit(self.strength);
        self.confidence = clamp_unit(self.confidence);
    }

    /// Returns true if the edge touches the given entity.
    pub fn touches(&self, entity_id: &str) -> bool {
        self.source_id == entity_id || self.target_id == entity_id
    }

    /// The endpoint opposite `entity_id`, if the edge touches it.
    pub fn other_end(&self, entity_id: &str) -> Option<&str> {
        if self.source_id == entity_id {
            Some(&self.target_id)
        } else if self.target_id == entity_id {
            Some(&self.source_id)
        } else {
            None
        }
    }

    /// Returns true if the edge connects `a` to `b`, honoring the bidirectional flag.
    pub fn connects(&self, a: &str, b: &str) -> bool {
        (self.source_id == a && self.target_id == b)
            || (self.bidirectional && self.source_id == b && self.target_id == a)
    }
}
