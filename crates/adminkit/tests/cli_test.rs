//! Integration tests for the `adminkit` CLI binary.
//!
//! Every test works on its own temporary data file and points the config
//! lookup at a path that does not exist, so the user's real configuration
//! is never read.
#![allow(clippy::unwrap_used)]

use std::path::{Path, PathBuf};

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::{Value, json};
use tempfile::TempDir;

// ── Helpers ─────────────────────────────────────────────────────────

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    fn with_data(records: &Value) -> Self {
        let ws = Self::new();
        std::fs::write(ws.data(), serde_json::to_string_pretty(records).unwrap()).unwrap();
        ws
    }

    fn data(&self) -> PathBuf {
        self.dir.path().join("data.json")
    }

    fn config(&self) -> PathBuf {
        self.dir.path().join("adminkit.toml")
    }

    fn records(&self) -> Value {
        serde_json::from_str(&std::fs::read_to_string(self.data()).unwrap()).unwrap()
    }

    /// `adminkit` bound to this workspace's data and config files.
    fn cmd(&self) -> assert_cmd::Command {
        let mut cmd = bare_cmd(self.dir.path());
        cmd.arg("--data")
            .arg(self.data())
            .arg("--config")
            .arg(self.config());
        cmd
    }
}

/// `adminkit` with env isolation and no data file.
fn bare_cmd(home: &Path) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("adminkit");
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home)
        .env("NO_COLOR", "1")
        .env_remove("ADMINKIT_DATA")
        .env_remove("ADMINKIT_SCREEN")
        .env_remove("ADMINKIT_CONFIG")
        .env_remove("ADMINKIT_OUTPUT")
        .env_remove("RUST_LOG");
    cmd
}

fn users() -> Value {
    json!([
        {"id": "1", "name": "alice", "role": "admin"},
        {"id": "2", "name": "bob", "role": "editor"},
        {"id": "3", "name": "carol", "role": "viewer"}
    ])
}

fn menus() -> Value {
    json!([
        {"id": "A", "name": "System", "children": [
            {"id": "B", "name": "Users", "children": [
                {"id": "C", "name": "Roles"}
            ]},
            {"id": "D", "name": "Logs"}
        ]},
        {"id": "E", "name": "Reports"}
    ])
}

fn stdout_of(cmd: &mut assert_cmd::Command) -> String {
    let output = cmd.output().unwrap();
    assert!(output.status.success(), "command failed: {output:?}");
    String::from_utf8(output.stdout).unwrap()
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let home = tempfile::tempdir().unwrap();
    let output = bare_cmd(home.path()).output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    let text = format!(
        "{}{}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_lists_commands() {
    let home = tempfile::tempdir().unwrap();
    bare_cmd(home.path()).arg("--help").assert().success().stdout(
        predicate::str::contains("list")
            .and(predicate::str::contains("tree"))
            .and(predicate::str::contains("delete")),
    );
}

#[test]
fn test_completions_bash() {
    let home = tempfile::tempdir().unwrap();
    bare_cmd(home.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_missing_data_flag_is_usage_error() {
    let home = tempfile::tempdir().unwrap();
    bare_cmd(home.path())
        .arg("list")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("No data file"));
}

// ── list ────────────────────────────────────────────────────────────

#[test]
fn test_list_table_has_footer() {
    let ws = Workspace::with_data(&users());
    ws.cmd().arg("list").assert().success().stdout(
        predicate::str::contains("alice")
            .and(predicate::str::contains("role=admin"))
            .and(predicate::str::contains("Page 1 of 1 (3 items)")),
    );
}

#[test]
fn test_list_paging() {
    let ws = Workspace::with_data(&users());
    let out = stdout_of(ws.cmd().args(["-o", "plain", "list", "--page-size", "2", "--page", "2"]));
    assert_eq!(out.trim(), "3");
}

#[test]
fn test_list_page_out_of_range() {
    let ws = Workspace::with_data(&users());
    ws.cmd()
        .args(["list", "--page", "5"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("past the last page"));
}

#[test]
fn test_list_search() {
    let ws = Workspace::with_data(&users());
    let out = stdout_of(ws.cmd().args(["-o", "plain", "list", "--search", "EDIT"]));
    assert_eq!(out.trim(), "2");
}

#[test]
fn test_list_of_missing_file_is_empty() {
    let ws = Workspace::new();
    let out = stdout_of(ws.cmd().args(["-o", "json", "list"]));
    assert_eq!(out.trim(), "[]");
}

#[test]
fn test_corrupt_data_file_fails_load() {
    let ws = Workspace::new();
    std::fs::write(ws.data(), "{ not json").unwrap();
    ws.cmd()
        .arg("list")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Could not load records"));
}

// ── tree ────────────────────────────────────────────────────────────

#[test]
fn test_tree_shows_nesting() {
    let ws = Workspace::with_data(&menus());
    ws.cmd().arg("tree").assert().success().stdout(
        predicate::str::contains("▾ System")
            .and(predicate::str::contains("    • Roles"))
            .and(predicate::str::contains("• Reports")),
    );
}

#[test]
fn test_tree_collapse_hides_children() {
    let ws = Workspace::with_data(&menus());
    let out = stdout_of(ws.cmd().args(["-o", "plain", "tree", "--collapse", "B"]));
    let ids: Vec<&str> = out.lines().collect();
    assert_eq!(ids, ["A", "B", "D", "E"]);

    let out = stdout_of(ws.cmd().args(["-o", "plain", "tree", "--collapse-all"]));
    let ids: Vec<&str> = out.lines().collect();
    assert_eq!(ids, ["A", "E"]);
}

#[test]
fn test_tree_collapse_unknown_id() {
    let ws = Workspace::with_data(&menus());
    ws.cmd()
        .args(["tree", "--collapse", "Z"])
        .assert()
        .code(4);
}

// ── create / update ─────────────────────────────────────────────────

#[test]
fn test_create_writes_record_and_notifies() {
    let ws = Workspace::with_data(&users());
    ws.cmd()
        .args(["-o", "json", "create", "--json", r#"{"id": "4", "name": "dave"}"#])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"dave\""))
        .stderr(predicate::str::contains("Item created"));

    assert_eq!(ws.records().as_array().unwrap().len(), 4);
}

#[test]
fn test_create_nested_under_parent() {
    let ws = Workspace::with_data(&menus());
    ws.cmd()
        .args(["create", "--json", r#"{"id": "F", "name": "Audit", "parent": "D"}"#])
        .assert()
        .success();

    let records = ws.records();
    assert_eq!(records[0]["children"][1]["children"][0]["id"], "F");
}

#[test]
fn test_create_rejects_non_object() {
    let ws = Workspace::with_data(&users());
    ws.cmd()
        .args(["create", "--json", "[1]"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("expected a JSON object"));
}

#[test]
fn test_update_changes_fields() {
    let ws = Workspace::with_data(&users());
    ws.cmd()
        .args(["update", "2", "--json", r#"{"role": null, "name": "robert"}"#])
        .assert()
        .success()
        .stderr(predicate::str::contains("Item updated"));

    let records = ws.records();
    assert_eq!(records[1]["name"], "robert");
    assert!(records[1].get("role").is_none());
}

#[test]
fn test_update_missing_record() {
    let ws = Workspace::with_data(&users());
    ws.cmd()
        .args(["update", "99", "--json", "{}"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("not found"));
}

// ── delete ──────────────────────────────────────────────────────────

#[test]
fn test_delete_requires_yes_when_not_interactive() {
    let ws = Workspace::with_data(&users());
    ws.cmd()
        .args(["delete", "1"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("requires confirmation"));
    assert_eq!(ws.records().as_array().unwrap().len(), 3);
}

#[test]
fn test_delete_single_with_yes() {
    let ws = Workspace::with_data(&users());
    ws.cmd()
        .args(["-y", "delete", "2"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Item deleted").and(predicate::str::contains("\"bob\"")));

    let records = ws.records();
    let ids: Vec<&str> = records
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, ["1", "3"]);
}

#[test]
fn test_delete_batch() {
    let ws = Workspace::with_data(&users());
    ws.cmd().args(["-y", "delete", "1", "3"]).assert().success();
    assert_eq!(ws.records(), json!([{"id": "2", "name": "bob", "role": "editor"}]));
}

#[test]
fn test_delete_unknown_id_touches_nothing() {
    let ws = Workspace::with_data(&users());
    ws.cmd()
        .args(["-y", "delete", "1", "nope"])
        .assert()
        .code(4);
    assert_eq!(ws.records().as_array().unwrap().len(), 3);
}

#[test]
fn test_delete_batch_partial_failure() {
    // Deleting A removes its subtree, so the later delete of B fails.
    let ws = Workspace::with_data(&menus());
    ws.cmd()
        .args(["-y", "delete", "A", "B"])
        .assert()
        .code(9)
        .stdout(predicate::str::contains("B"))
        .stderr(predicate::str::contains("Deleted 1 of 2 records"));

    let ids: Vec<String> = ws
        .records()
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["id"].as_str().unwrap().to_owned())
        .collect();
    assert_eq!(ids, ["E"]);
}

// ── select ──────────────────────────────────────────────────────────

#[test]
fn test_select_with_propagation() {
    let ws = Workspace::with_data(&menus());
    let out = stdout_of(ws.cmd().args(["-o", "plain", "select", "--propagate", "C"]));
    let ids: Vec<&str> = out.lines().collect();
    assert_eq!(ids, ["C", "A", "B"]);
}

#[test]
fn test_select_descendant_before_ancestor_keeps_both() {
    let ws = Workspace::with_data(&menus());
    let out = stdout_of(ws.cmd().args(["-o", "plain", "select", "--propagate", "C", "A"]));
    let ids: Vec<&str> = out.lines().collect();
    assert_eq!(ids, ["C", "A", "B"]);
}

#[test]
fn test_select_without_propagation() {
    let ws = Workspace::with_data(&menus());
    let out = stdout_of(ws.cmd().args(["-o", "plain", "select", "C", "E"]));
    let ids: Vec<&str> = out.lines().collect();
    assert_eq!(ids, ["C", "E"]);
}

#[test]
fn test_select_all_is_preorder() {
    let ws = Workspace::with_data(&menus());
    let out = stdout_of(ws.cmd().args(["-o", "plain", "select", "--all"]));
    let ids: Vec<&str> = out.lines().collect();
    assert_eq!(ids, ["A", "B", "C", "D", "E"]);
}

// ── config ──────────────────────────────────────────────────────────

#[test]
fn test_screen_config_applies() {
    let ws = Workspace::with_data(&users());
    std::fs::write(
        ws.config(),
        "[screens.users]\nitem_type = \"user\"\npage_size = 25\n",
    )
    .unwrap();

    ws.cmd()
        .args(["--screen", "users", "-o", "json", "config"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("\"item_type\": \"user\"")
                .and(predicate::str::contains("\"page_size\": 25")),
        );

    ws.cmd()
        .args(["--screen", "users", "-y", "delete", "1"])
        .assert()
        .success()
        .stderr(predicate::str::contains("User deleted"));
}

#[test]
fn test_invalid_screen_config_is_reported() {
    let ws = Workspace::with_data(&users());
    std::fs::write(ws.config(), "[defaults]\npage_size = 7\n").unwrap();
    ws.cmd()
        .arg("list")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("page_size"));
}
