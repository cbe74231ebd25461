//! Workflow Graph - a typed graph of notes, tasks, documents and projects,
//! with traversal, structural analysis and a rule-based reasoning pass.
//!
//! This library provides the core functionality for the `wfg` CLI tool.

pub mod cli;
pub mod commands;
pub mod config;
pub mod graph;
pub mod models;
pub mod reasoning;
pub mod storage;

/// Library-level error type for workflow graph operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("None of the requested entities exist")]
    NoValidEntities,

    #[error("{0}")]
    Other(String),
}

/// Result type alias for workflow graph operations.
pub type Result<T> = std::result::Result<T, Error>;
