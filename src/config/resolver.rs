//! Precedence resolution for config.kdl.
//!
//! ## Precedence (highest to lowest)
//!
//! 1. `--config <path>` CLI flag
//! 2. `WFG_CONFIG` environment variable
//! 3. System config.kdl (`~/.config/workflow-graph/config.kdl`)
//! 4. Built-in defaults
//!
//! Layers are merged: a value set in a higher layer overrides the same value
//! from a lower one, and unset values fall through.

use super::schema::{ReasoningConfig, Thresholds};
use crate::{Error, Result};
use kdl::KdlDocument;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable naming an explicit config file.
pub const CONFIG_PATH_ENV: &str = "WFG_CONFIG";

/// Tracks where the resolved config came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueSource {
    /// Path from the CLI flag
    CliFlag(PathBuf),
    /// Path from the environment variable
    EnvVar(PathBuf),
    /// System-level config.kdl
    System(PathBuf),
    /// Built-in default value
    Default,
}

impl std::fmt::Display for ValueSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueSource::CliFlag(path) => write!(f, "cli:{}", path.display()),
            ValueSource::EnvVar(path) => write!(f, "env:{}", path.display()),
            ValueSource::System(path) => write!(f, "system:{}", path.display()),
            ValueSource::Default => write!(f, "default"),
        }
    }
}

/// A resolved value with its source.
#[derive(Debug, Clone)]
pub struct Resolved<T> {
    /// The resolved value
    pub value: T,
    /// Where the value came from (the highest layer that contributed)
    pub source: ValueSource,
}

impl<T> Resolved<T> {
    /// Create a new resolved value.
    pub fn new(value: T, source: ValueSource) -> Self {
        Self { value, source }
    }
}

/// Location of the system-level config file, if a config directory exists.
pub fn system_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("workflow-graph").join("config.kdl"))
}

/// Read, parse and validate one config.kdl.
pub fn load_config_file(path: &Path) -> Result<ReasoningConfig> {
    let content = fs::read_to_string(path)?;
    let doc: KdlDocument = content
        .parse()
        .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
    let config = ReasoningConfig::from_kdl(&doc);
    config
        .validate()
        .map_err(|msg| Error::Config(format!("{}: {}", path.display(), msg)))?;
    Ok(config)
}

/// Resolve thresholds from all layers.
///
/// A missing system file is not an error; a missing file named explicitly
/// (flag or env var) is.
pub fn resolve_config(cli_path: Option<&Path>) -> Result<Resolved<Thresholds>> {
    let env_path = std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from);
    resolve_config_with(cli_path, env_path.as_deref(), system_config_path().as_deref())
}

/// Resolve with every layer location passed in explicitly.
pub fn resolve_config_with(
    cli_path: Option<&Path>,
    env_path: Option<&Path>,
    system_path: Option<&Path>,
) -> Result<Resolved<Thresholds>> {
    let mut merged = ReasoningConfig::new();
    let mut source = ValueSource::Default;

    if let Some(path) = system_path.filter(|p| p.exists()) {
        merged.merge(&load_config_file(path)?);
        source = ValueSource::System(path.to_path_buf());
    }

    if let Some(path) = env_path {
        merged.merge(&load_config_file(path)?);
        source = ValueSource::EnvVar(path.to_path_buf());
    }

    if let Some(path) = cli_path {
        merged.merge(&load_config_file(path)?);
        source = ValueSource::CliFlag(path.to_path_buf());
    }

    tracing::debug!(%source, "reasoning config resolved");
    Ok(Resolved::new(merged.thresholds(), source))
}
