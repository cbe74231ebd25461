//! Persistence for workflow graphs.
//!
//! A graph is stored as one snapshot JSON file. Saves go through a temporary
//! file in the same directory and are renamed into place, so a crash never
//! leaves a half-written snapshot behind.

use crate::graph::{GraphSnapshot, WorkflowGraph};
use crate::{Error, Result};
use sha2::{Digest, Sha256};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Default snapshot file name, relative to the working directory.
pub const DEFAULT_GRAPH_FILE: &str = "workflow-graph.json";

/// A snapshot file on disk.
#[derive(Debug, Clone)]
pub struct SnapshotFile {
    path: PathBuf,
}

impl SnapshotFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Write an empty graph. Fails if a snapshot already exists unless `force`.
    pub fn init(&self, force: bool) -> Result<WorkflowGraph> {
        if self.exists() && !force {
            return Err(Error::InvalidInput(format!(
                "{} already exists (use --force to overwrite)",
                self.path.display()
            )));
        }
        let graph = WorkflowGraph::new();
        self.save(&graph)?;
        Ok(graph)
    }

    /// Load the graph. A missing file is reported as `NotFound`.
    pub fn load(&self) -> Result<WorkflowGraph> {
        if !self.exists() {
            return Err(Error::NotFound(format!(
                "{} (run `wfg init` first)",
                self.path.display()
            )));
        }
        let content = fs::read_to_string(&self.path)?;
        let snapshot: GraphSnapshot = serde_json::from_str(&content)?;
        let graph = WorkflowGraph::import_snapshot(snapshot);
        tracing::debug!(
            path = %self.path.display(),
            entities = graph.statistics().entity_count,
            "snapshot loaded"
        );
        Ok(graph)
    }

    /// Load the graph, or start an empty one if no snapshot exists yet.
    pub fn load_or_default(&self) -> Result<WorkflowGraph> {
        if self.exists() {
            self.load()
        } else {
            Ok(WorkflowGraph::new())
        }
    }

    /// Atomically replace the snapshot with the given graph.
    pub fn save(&self, graph: &WorkflowGraph) -> Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)?;

        let json = serde_json::to_string_pretty(&graph.export_snapshot())?;
        let mut tmp = NamedTempFile::new_in(&dir)?;
        tmp.write_all(json.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| Error::Io(e.error))?;

        tracing::debug!(path = %self.path.display(), "snapshot saved");
        Ok(())
    }
}

/// Generate a short ID from a hash of the seed and the current time.
pub fn generate_id(prefix: &str, seed: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(seed.as_bytes());
    hasher.update(
        chrono::Utc::now()
            .timestamp_nanos_opt()
            .unwrap_or(0)
            .to_le_bytes(),
    );
    let hash = hasher.finalize();
    let hash_hex = format!("{:x}", hash);
    format!("{}-{}", prefix, &hash_hex[..4])
}
