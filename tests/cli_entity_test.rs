//! Integration tests for entity commands via CLI.
//!
//! These tests verify that:
//! - `wfg init` creates and protects the snapshot
//! - `wfg entity add/update/remove/show/list` round-trip through the snapshot
//! - Errors are reported as JSON (or plain text with -H) with exit code 1

mod common;

use common::TestEnv;
use predicates::prelude::*;

// === Init Tests ===

#[test]
fn test_init_creates_snapshot() {
    let env = TestEnv::new();

    env.wfg()
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"initialized\":true"));

    assert!(env.graph_path().exists());
}

#[test]
fn test_init_refuses_existing_without_force() {
    let env = TestEnv::init();

    env.wfg()
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    env.wfg().args(["init", "--force"]).assert().success();
}

#[test]
fn test_commands_require_init() {
    let env = TestEnv::new();

    env.wfg()
        .args(["entity", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("\"error\""))
        .stderr(predicate::str::contains("wfg init"));
}

// === Entity Add Tests ===

#[test]
fn test_entity_add_generates_id() {
    let env = TestEnv::init();

    env.wfg()
        .args(["entity", "add", "Draft proposal", "-t", "task"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"id\":\"task-"))
        .stdout(predicate::str::contains("\"action\":\"added\""));
}

#[test]
fn test_entity_add_with_fields() {
    let env = TestEnv::init();

    env.wfg()
        .args([
            "entity",
            "add",
            "Quarterly report",
            "--id",
            "rep",
            "-t",
            "document",
            "--content",
            "Numbers for Q3",
            "--due",
            "2026-12-01",
            "-p",
            "2",
            "--tag",
            "finance",
            "--tag",
            "q3",
            "--meta",
            "pages=12",
        ])
        .assert()
        .success();

    let shown = env.json(&["entity", "show", "rep"]);
    let entity = &shown["entity"];
    assert_eq!(entity["type"], "document");
    assert_eq!(entity["title"], "Quarterly report");
    assert_eq!(entity["priority"], 2);
    assert_eq!(entity["status"], "pending");
    assert_eq!(entity["tags"], serde_json::json!(["finance", "q3"]));
    assert_eq!(entity["metadata"]["pages"], 12);
    assert!(
        entity["due_date"]
            .as_str()
            .unwrap()
            .starts_with("2026-12-01T00:00:00")
    );
}

#[test]
fn test_entity_add_invalid_type_rejected() {
    let env = TestEnv::init();

    env.wfg()
        .args(["entity", "add", "Thing", "-t", "spaceship"])
        .assert()
        .failure();
}

#[test]
fn test_entity_add_duplicate_id_rejected() {
    let env = TestEnv::init();
    env.add_entity("a", "note", "First");

    env.wfg()
        .args(["entity", "add", "Second", "--id", "a"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_entity_add_with_parent_links_child() {
    let env = TestEnv::init();
    env.add_entity("proj", "project", "Launch");

    env.wfg()
        .args(["entity", "add", "Design", "--id", "design", "-t", "task", "--parent", "proj"])
        .assert()
        .success();

    let shown = env.json(&["entity", "show", "proj"]);
    assert_eq!(shown["entity"]["child_ids"], serde_json::json!(["design"]));
}

// === Entity Update Tests ===

#[test]
fn test_entity_update_parent_moves_child() {
    let env = TestEnv::init();
    env.add_entity("p1", "project", "Old home");
    env.add_entity("p2", "project", "New home");
    env.wfg()
        .args(["entity", "add", "Task", "--id", "t", "-t", "task", "--parent", "p1"])
        .assert()
        .success();

    env.wfg()
        .args(["entity", "update", "t", "--parent", "p2"])
        .assert()
        .success();

    let old_parent = env.json(&["entity", "show", "p1"]);
    assert_eq!(old_parent["entity"]["child_ids"], serde_json::json!([]));
    let new_parent = env.json(&["entity", "show", "p2"]);
    assert_eq!(new_parent["entity"]["child_ids"], serde_json::json!(["t"]));
    let child = env.json(&["entity", "show", "t"]);
    assert_eq!(child["entity"]["parent_id"], "p2");
}

#[test]
fn test_entity_update_own_parent_rejected() {
    let env = TestEnv::init();
    env.add_entity("t", "task", "Task");

    env.wfg()
        .args(["entity", "update", "t", "--parent", "t"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("own parent"));
}

#[test]
fn test_entity_update_fields() {
    let env = TestEnv::init();
    env.add_entity("t", "task", "Old title");

    env.wfg()
        .args(["entity", "update", "t", "--title", "New title", "--status", "done"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"action\":\"updated\""));

    let shown = env.json(&["entity", "show", "t"]);
    assert_eq!(shown["entity"]["title"], "New title");
    assert_eq!(shown["entity"]["status"], "done");
}

#[test]
fn test_entity_update_nothing_rejected() {
    let env = TestEnv::init();
    env.add_entity("t", "task", "Task");

    env.wfg()
        .args(["entity", "update", "t"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No fields to update"));
}

#[test]
fn test_entity_update_missing_not_found() {
    let env = TestEnv::init();

    env.wfg()
        .args(["entity", "update", "ghost", "--title", "x"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not found"));
}

// === Entity Remove Tests ===

#[test]
fn test_entity_remove_cascades_links() {
    let env = TestEnv::init();
    env.add_entity("a", "task", "A");
    env.add_entity("b", "task", "B");
    env.add_link("r1", "a", "b", "depends_on");

    env.wfg()
        .args(["entity", "remove", "b"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"action\":\"removed\""));

    let links = env.json(&["link", "list"]);
    assert_eq!(links["count"], 0);

    env.wfg().args(["entity", "show", "b"]).assert().failure();
}

#[test]
fn test_entity_remove_missing_not_found() {
    let env = TestEnv::init();

    env.wfg()
        .args(["entity", "rm", "ghost"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not found"));
}

// === Entity List Tests ===

#[test]
fn test_entity_list_by_type() {
    let env = TestEnv::init();
    env.add_entity("n1", "note", "Note");
    env.add_entity("t1", "task", "Task one");
    env.add_entity("t2", "task", "Task two");

    let all = env.json(&["entity", "list"]);
    assert_eq!(all["count"], 3);

    let tasks = env.json(&["entity", "list", "-t", "task"]);
    assert_eq!(tasks["count"], 2);
    assert_eq!(tasks["entities"][0]["id"], "t1");
}

#[test]
fn test_entity_list_human() {
    let env = TestEnv::init();

    env.wfg()
        .args(["-H", "entity", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No entities found."));

    env.add_entity("t1", "task", "Ship it");
    env.wfg()
        .args(["-H", "entity", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("t1 [task] Ship it (pending)"));
}

#[test]
fn test_human_error_format() {
    let env = TestEnv::init();

    env.wfg()
        .args(["-H", "entity", "show", "ghost"])
        .assert()
        .failure()
        .stderr(predicate::str::starts_with("Error: "));
}
