//! Configuration for the reasoning pass.
//!
//! Thresholds live in a KDL file, `config.kdl`:
//!
//! - System: `~/.config/workflow-graph/config.kdl`
//! - Explicit: `--config <path>` or the `WFG_CONFIG` environment variable
//!
//! Use the [`resolver`] module for precedence resolution.

pub mod resolver;
pub mod schema;

pub use resolver::{
    CONFIG_PATH_ENV, Resolved, ValueSource, load_config_file, resolve_config,
    resolve_config_with, system_config_path,
};
pub use schema::{ReasoningConfig, Thresholds};
