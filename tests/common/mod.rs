//! Common test utilities for wfg integration tests.
//!
//! Provides `TestEnv` for isolated test environments that never touch a
//! snapshot or config file outside a temporary directory.

#![allow(dead_code)]

use assert_cmd::Command;
use std::path::PathBuf;
pub use tempfile::TempDir;

/// A test environment with its own working directory.
///
/// The `wfg()` method returns a `Command` that points `WFG_GRAPH` at a
/// snapshot inside the temp directory, unsets `WFG_CONFIG` and moves the
/// system config directory into the temp directory, making tests
/// parallel-safe and independent of the user's config.
pub struct TestEnv {
    pub dir: TempDir,
}

impl TestEnv {
    /// Create a new test environment with an isolated directory.
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    /// Create a new test environment with an empty graph.
    pub fn init() -> Self {
        let env = Self::new();
        env.wfg().arg("init").assert().success();
        env
    }

    /// Get a Command for the wfg binary bound to this environment's graph.
    pub fn wfg(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_wfg"));
        cmd.current_dir(self.dir.path());
        cmd.env("WFG_GRAPH", self.graph_path());
        cmd.env("XDG_CONFIG_HOME", self.dir.path());
        cmd.env_remove("WFG_CONFIG");
        cmd.env_remove("WFG_LOG");
        cmd
    }

    /// Path of the snapshot file.
    pub fn graph_path(&self) -> PathBuf {
        self.dir.path().join("workflow-graph.json")
    }

    /// Path for an extra file inside the environment.
    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Add an entity with an explicit ID.
    pub fn add_entity(&self, id: &str, entity_type: &str, title: &str) {
        self.wfg()
            .args(["entity", "add", title, "--id", id, "-t", entity_type])
            .assert()
            .success();
    }

    /// Add a link with an explicit ID.
    pub fn add_link(&self, id: &str, source: &str, target: &str, rel_type: &str) {
        self.wfg()
            .args(["link", "add", source, target, "-t", rel_type, "--id", id])
            .assert()
            .success();
    }

    /// Run a command and parse its JSON stdout.
    pub fn json(&self, args: &[&str]) -> serde_json::Value {
        let output = self.wfg().args(args).output().unwrap();
        assert!(
            output.status.success(),
            "command {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
        serde_json::from_slice(&output.stdout).unwrap()
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}
