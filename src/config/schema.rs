//! KDL schema for config.kdl.
//!
//! This module provides:
//! - `ReasoningConfig`, the sparse on-disk form (every value optional)
//! - `Thresholds`, the fully-populated form the reasoning pass consumes
//! - Serialization to and from KDL, validation and layer merging

use kdl::{KdlDocument, KdlEntry, KdlNode, KdlValue};
use serde::{Deserialize, Serialize};

/// Concrete thresholds used by the reasoning pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    /// Days without an update before an entity counts as outdated
    pub stale_days: i64,
    /// Incoming `depends_on` edges above which an entity is a bottleneck
    pub bottleneck_threshold: usize,
    /// Outgoing `depends_on` edges above which an entity is a single point of failure
    pub fan_out_threshold: usize,
    /// Children above which a project can be reported as efficient
    pub efficient_project_children: usize,
    /// Strength above which a dependency is critical
    pub critical_strength: f64,
    /// Documents shorter than this many characters get an enhancement opportunity
    pub short_document_chars: usize,
    /// Priorities at or below this value count as high priority
    pub high_priority_max: u8,
    /// A due date this many days out or closer puts an entity in "warning"
    pub due_soon_days: i64,
    /// Whether the reasoner caches results per request
    pub cache_results: bool,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            stale_days: 90,
            bottleneck_threshold: 3,
            fan_out_threshold: 5,
            efficient_project_children: 5,
            critical_strength: 0.7,
            short_document_chars: 200,
            high_priority_max: 2,
            due_soon_days: 7,
            cache_results: true,
        }
    }
}

/// Reasoning preferences stored in config.kdl.
///
/// # KDL Schema
///
/// ```kdl
/// stale-days 90
/// bottleneck-threshold 3
/// fan-out-threshold 5
/// efficient-project-children 5
/// critical-strength 0.7
/// short-document-chars 200
/// high-priority-max 2
/// due-soon-days 7
/// cache-results #true
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReasoningConfig {
    pub stale_days: Option<i64>,
    pub bottleneck_threshold: Option<usize>,
    pub fan_out_threshold: Option<usize>,
    pub efficient_project_children: Option<usize>,
    pub critical_strength: Option<f64>,
    pub short_document_chars: Option<usize>,
    pub high_priority_max: Option<u8>,
    pub due_soon_days: Option<i64>,
    pub cache_results: Option<bool>,
}

/// Upper bound for day-valued settings (about a century).
pub const MAX_DAYS: i64 = 36_500;

fn first_value<'a>(doc: &'a KdlDocument, name: &str) -> Option<&'a KdlValue> {
    doc.get(name)
        .and_then(|node| node.entries().first())
        .map(|entry| entry.value())
}

fn integer(doc: &KdlDocument, name: &str) -> Option<i128> {
    first_value(doc, name).and_then(|v| v.as_integer())
}

fn push_node(doc: &mut KdlDocument, name: &str, value: KdlValue) {
    let mut node = KdlNode::new(name);
    node.push(KdlEntry::new(value));
    doc.nodes_mut().push(node);
}

impl ReasoningConfig {
    /// Create an empty config with no values set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the config values.
    ///
    /// Returns an error message if any value is invalid.
    pub fn validate(&self) -> Result<(), String> {
        if let Some(days) = self.stale_days {
            if !(1..=MAX_DAYS).contains(&days) {
                return Err(format!(
                    "stale-days must be between 1 and {}, got {}",
                    MAX_DAYS, days
                ));
            }
        }
        if let Some(days) = self.due_soon_days {
            if !(0..=MAX_DAYS).contains(&days) {
                return Err(format!(
                    "due-soon-days must be between 0 and {}, got {}",
                    MAX_DAYS, days
                ));
            }
        }
        if let Some(strength) = self.critical_strength {
            if !(0.0..=1.0).contains(&strength) {
                return Err(format!(
                    "critical-strength must be between 0 and 1, got {}",
                    strength
                ));
            }
        }
        if let Some(priority) = self.high_priority_max {
            if !(1..=5).contains(&priority) {
                return Err(format!("high-priority-max must be 1-5, got {}", priority));
            }
        }
        Ok(())
    }

    /// Parse config from a KDL document. Unknown nodes and values of the
    /// wrong type are ignored.
    pub fn from_kdl(doc: &KdlDocument) -> Self {
        Self {
            stale_days: integer(doc, "stale-days").and_then(|i| i64::try_from(i).ok()),
            bottleneck_threshold: integer(doc, "bottleneck-threshold")
                .and_then(|i| usize::try_from(i).ok()),
            fan_out_threshold: integer(doc, "fan-out-threshold")
                .and_then(|i| usize::try_from(i).ok()),
            efficient_project_children: integer(doc, "efficient-project-children")
                .and_then(|i| usize::try_from(i).ok()),
            critical_strength: first_value(doc, "critical-strength").and_then(|v| {
                v.as_float()
                    .or_else(|| v.as_integer().map(|i| i as f64))
            }),
            short_document_chars: integer(doc, "short-document-chars")
                .and_then(|i| usize::try_from(i).ok()),
            high_priority_max: integer(doc, "high-priority-max")
                .and_then(|i| u8::try_from(i).ok()),
            due_soon_days: integer(doc, "due-soon-days").and_then(|i| i64::try_from(i).ok()),
            cache_results: first_value(doc, "cache-results").and_then(|v| v.as_bool()),
        }
    }

    /// Convert config to a KDL document.
    pub fn to_kdl(&self) -> KdlDocument {
        let mut doc = KdlDocument::new();

        if let Some(days) = self.stale_days {
            push_node(&mut doc, "stale-days", KdlValue::Integer(days as i128));
        }
        if let Some(n) = self.bottleneck_threshold {
            push_node(&mut doc, "bottleneck-threshold", KdlValue::Integer(n as i128));
        }
        if let Some(n) = self.fan_out_threshold {
            push_node(&mut doc, "fan-out-threshold", KdlValue::Integer(n as i128));
        }
        if let Some(n) = self.efficient_project_children {
            push_node(
                &mut doc,
                "efficient-project-children",
                KdlValue::Integer(n as i128),
            );
        }
        if let Some(strength) = self.critical_strength {
            push_node(&mut doc, "critical-strength", KdlValue::Float(strength));
        }
        if let Some(n) = self.short_document_chars {
            push_node(&mut doc, "short-document-chars", KdlValue::Integer(n as i128));
        }
        if let Some(p) = self.high_priority_max {
            push_node(&mut doc, "high-priority-max", KdlValue::Integer(p as i128));
        }
        if let Some(days) = self.due_soon_days {
            push_node(&mut doc, "due-soon-days", KdlValue::Integer(days as i128));
        }
        if let Some(cache) = self.cache_results {
            push_node(&mut doc, "cache-results", KdlValue::Bool(cache));
        }

        doc
    }

    /// Merge another config into this one.
    /// Values from `other` override values in `self` if they are Some.
    pub fn merge(&mut self, other: &ReasoningConfig) {
        if other.stale_days.is_some() {
            self.stale_days = other.stale_days;
        }
        if other.bottleneck_threshold.is_some() {
            self.bottleneck_threshold = other.bottleneck_threshold;
        }
        if other.fan_out_threshold.is_some() {
            self.fan_out_threshold = other.fan_out_threshold;
        }
        if other.efficient_project_children.is_some() {
            self.efficient_project_children = other.efficient_project_children;
        }
        if other.critical_strength.is_some() {
            self.critical_strength = other.critical_strength;
        }
        if other.short_document_chars.is_some() {
            self.short_document_chars = other.short_document_chars;
        }
        if other.high_priority_max.is_some() {
            self.high_priority_max = other.high_priority_max;
        }
        if other.due_soon_days.is_some() {
            self.due_soon_days = other.due_soon_days;
        }
        if other.cache_results.is_some() {
            self.cache_results = other.cache_results;
        }
    }

    /// Fill unset values from the built-in defaults.
    pub fn thresholds(&self) -> Thresholds {
        let d = Thresholds::default();
        Thresholds {
            stale_days: self.stale_days.unwrap_or(d.stale_days),
            bottleneck_threshold: self.bottleneck_threshold.unwrap_or(d.bottleneck_threshold),
            fan_out_threshold: self.fan_out_threshold.unwrap_or(d.fan_out_threshold),
            efficient_project_children: self
                .efficient_project_children
                .unwrap_or(d.efficient_project_children),
            critical_strength: self.critical_strength.unwrap_or(d.critical_strength),
            short_document_chars: self.short_document_chars.unwrap_or(d.short_document_chars),
            high_priority_max: self.high_priority_max.unwrap_or(d.high_priority_max),
            due_soon_days: self.due_soon_days.unwrap_or(d.due_soon_days),
            cache_results: self.cache_results.unwrap_or(d.cache_results),
        }
    }
}
