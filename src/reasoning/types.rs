//! Value types produced by the reasoning pass.

use crate::models::EntityType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// How the entity set for an analysis is gathered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisScope {
    /// Exactly the requested entities
    #[default]
    Selected,
    /// Requested entities plus everything within `depth` hops, either direction
    Neighborhood,
    /// Requested entities plus their project members and descendants
    Project,
    /// Every entity in the graph
    Workflow,
}

impl std::str::FromStr for AnalysisScope {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "selected" | "entity" => Ok(AnalysisScope::Selected),
            "neighborhood" => Ok(AnalysisScope::Neighborhood),
            "project" => Ok(AnalysisScope::Project),
            "workflow" | "all" => Ok(AnalysisScope::Workflow),
            _ => Err(format!("Unknown analysis scope: {}", s)),
        }
    }
}

/// Coarse health of a single entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusAssessment {
    Healthy,
    Warning,
    Critical,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitySummary {
    pub entity_id: String,
    pub entity_type: EntityType,
    pub title: String,
    pub key_attributes: BTreeMap<String, String>,
    pub status: StatusAssessment,
    /// Content size, child count and tag count, weighted into [0, 1]
    pub complexity: f64,
    /// Priority, connectedness and project bonus, weighted into [0, 1]
    pub importance: f64,
    pub relationship_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// Sort key for issue lists; higher sorts first.
    pub fn rank(&self) -> u8 {
        match self {
            Severity::Low => 1,
            Severity::Medium => 2,
            Severity::High => 3,
            Severity::Critical => 4,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IssueKind {
    MissingInformation,
    Outdated,
    Orphaned,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub entity_id: String,
    pub kind: IssueKind,
    pub severity: Severity,
    pub description: String,
    pub suggested_fix: String,
    /// Only used for ordering
    pub priority: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpportunityKind {
    Automation,
    Enhancement,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Opportunity {
    pub entity_id: String,
    pub kind: OpportunityKind,
    pub description: String,
    pub estimated_impact: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternKind {
    LinearDependencyChain,
    Hierarchy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pattern {
    pub kind: PatternKind,
    pub entity_ids: Vec<String>,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bottleneck {
    pub entity_id: String,
    /// Entities that depend on this one
    pub dependent_ids: Vec<String>,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Efficiency {
    pub entity_id: String,
    pub child_count: usize,
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskKind {
    SinglePointOfFailure,
    OverdueWork,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Risk {
    pub kind: RiskKind,
    pub entity_ids: Vec<String>,
    pub severity: Severity,
    pub description: String,
    pub mitigation: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredictionKind {
    DeadlineMiss,
    CompletionForecast,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// `None` for workflow-level forecasts
    pub entity_id: Option<String>,
    pub kind: PredictionKind,
    pub description: String,
    pub probability: f64,
}

/// Five-stage classification of how structured a workflow is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaturityLevel {
    #[default]
    Initial,
    Developing,
    Defined,
    Managed,
    Optimizing,
}

impl fmt::Display for MaturityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MaturityLevel::Initial => "initial",
            MaturityLevel::Developing => "developing",
            MaturityLevel::Defined => "defined",
            MaturityLevel::Managed => "managed",
            MaturityLevel::Optimizing => "optimizing",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Assessment {
    /// 0-100
    pub health_score: f64,
    pub maturity: MaturityLevel,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    /// 0-1
    pub confidence: f64,
}

/// Everything one reasoning run produces.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub scope: AnalysisScope,
    pub depth: usize,
    /// Entities that were analyzed, in ID order
    pub entity_ids: Vec<String>,
    pub summaries: Vec<EntitySummary>,
    /// Entity ID -> IDs of the relationships touching it
    pub relationships: BTreeMap<String, Vec<String>>,
    pub issues: Vec<Issue>,
    pub opportunities: Vec<Opportunity>,
    pub patterns: Vec<Pattern>,
    pub bottlenecks: Vec<Bottleneck>,
    pub efficiencies: Vec<Efficiency>,
    pub risks: Vec<Risk>,
    pub insights: Vec<String>,
    pub recommendations: Vec<String>,
    pub predictions: Vec<Prediction>,
    pub assessment: Assessment,
}
