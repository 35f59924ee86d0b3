//! Integration tests for the `bw` commands.
//!
//! Each test writes a parameter document into a temp project, runs the
//! binary against it and checks both the output and the saved document.

mod integration;

use assert_fs::prelude::*;
use predicates::prelude::*;
use serde_json::{json, Value};

use integration::{loop_graph, param_document, typed_loop_document, Project};

fn stdout_of(output: &std::process::Output) -> String {
    String::from_utf8(output.stdout.clone()).unwrap()
}

fn branch(doc: &Value, station: &str, side: &str) -> Value {
    doc["stn_list"][station]["branch"][side].clone()
}

// =============================================================================
// Read-only commands
// =============================================================================

mod show {
    use super::*;

    #[test]
    fn renders_station() {
        let project = Project::new(&typed_loop_document());
        let output = project.bw().args(["show", "a"]).output().unwrap();
        assert!(output.status.success());

        insta::assert_snapshot!(stdout_of(&output).trim_end(), @r"
a
  parents:  linestart
  children: b, c
  left:     -
  right:    through via c
");
    }

    #[test]
    fn json_output() {
        let project = Project::new(&typed_loop_document());
        let output = project.bw().args(["--json", "show", "d"]).output().unwrap();
        assert!(output.status.success());

        let value: Value = serde_json::from_str(&stdout_of(&output)).unwrap();
        assert_eq!(value["id"], "d");
        assert_eq!(value["parents"], json!(["b", "e"]));
        assert_eq!(value["branch"]["left"], json!(["through", "e"]));
        assert_eq!(value["branch"]["right"], json!([]));
    }

    #[test]
    fn unknown_station_fails() {
        let project = Project::new(&typed_loop_document());
        project
            .bw()
            .args(["show", "zz"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("station not found: zz"));
    }

    #[test]
    fn missing_document_fails() {
        let project = Project::new(&typed_loop_document());
        project
            .bw()
            .args(["-f", "nope.json", "show", "a"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Failed to read document 'nope.json'"));
    }
}

mod endpoint {
    use super::*;

    #[test]
    fn follows_branch_first() {
        let project = Project::new(&typed_loop_document());
        project
            .bw()
            .args(["endpoint", "a", "right"])
            .assert()
            .success()
            .stdout(predicate::str::contains("endpoint: d"))
            .stdout(predicate::str::contains("route:    a -> c -> e -> d"))
            .stdout(predicate::str::contains("paired:   d via e"));
    }

    #[test]
    fn from_other_neighbour() {
        let project = Project::new(&typed_loop_document());
        project
            .bw()
            .args(["endpoint", "d", "left", "--from", "b"])
            .assert()
            .success()
            .stdout(predicate::str::contains("route:    d -> b -> a"))
            .stdout(predicate::str::contains("paired:   a via b"));
    }

    #[test]
    fn rejects_non_neighbour_start() {
        let project = Project::new(&typed_loop_document());
        project
            .bw()
            .args(["endpoint", "a", "right", "--from", "e"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("e is not a right neighbour of a"));
    }
}

mod verify {
    use super::*;

    #[test]
    fn consistent_document_passes() {
        let project = Project::new(&typed_loop_document());
        project
            .bw()
            .arg("verify")
            .assert()
            .success()
            .stdout(predicate::str::contains("ok: 8 stations verified"));
    }

    #[test]
    fn one_sided_branch_fails() {
        let mut doc = param_document(&loop_graph());
        doc["stn_list"]["a"]["branch"]["right"] = json!(["through", "b"]);
        let project = Project::new(&doc);

        project
            .bw()
            .arg("verify")
            .assert()
            .failure()
            .stdout(predicate::str::contains("a right branch has no paired entry at d"))
            .stderr(predicate::str::contains("1 violation(s) found"));
    }

    #[test]
    fn json_report() {
        let project = Project::new(&typed_loop_document());
        let output = project.bw().args(["verify", "--json"]).output().unwrap();
        assert!(output.status.success());

        let value: Value = serde_json::from_str(&stdout_of(&output)).unwrap();
        assert_eq!(value["ok"], true);
        assert_eq!(value["stations"], 8);
        assert!(value["fingerprint"].as_str().unwrap().starts_with("sha256:"));
    }
}

mod config {
    use super::*;

    #[test]
    fn defaults() {
        let project = Project::new(&typed_loop_document());
        project
            .bw()
            .arg("config")
            .assert()
            .success()
            .stdout(predicate::str::contains("style = mtr"))
            .stdout(predicate::str::contains("branch.allow_clear = true"))
            .stdout(predicate::str::contains("# project: (none)"));
    }

    #[test]
    fn project_config_overrides() {
        let project = Project::new(&typed_loop_document())
            .with_config("style = \"gzmtr\"\n\n[engine]\nhistory_limit = 8\n");
        project
            .bw()
            .arg("config")
            .assert()
            .success()
            .stdout(predicate::str::contains("style = gzmtr"))
            .stdout(predicate::str::contains("engine.history_limit = 8"));
    }

    #[test]
    fn missing_env_config_warns() {
        let project = Project::new(&typed_loop_document());
        project
            .bw()
            .env("BRANCHWORK_CONFIG", project.path().join("missing.toml"))
            .arg("config")
            .assert()
            .success()
            .stdout(predicate::str::contains("# global: (none)"))
            .stderr(predicate::str::contains("BRANCHWORK_CONFIG points to missing file"));
    }

    #[test]
    fn invalid_config_fails() {
        let project = Project::new(&typed_loop_document()).with_config("[engine]\nhistory_limit = 0\n");
        project
            .bw()
            .arg("config")
            .assert()
            .failure()
            .stderr(predicate::str::contains("history_limit must be at least 1"));
    }
}

// =============================================================================
// Edits
// =============================================================================

mod branch_type {
    use super::*;

    #[test]
    fn sets_both_endpoints() {
        let project = Project::new(&param_document(&loop_graph()));
        project
            .bw()
            .args(["branch-type", "a", "right", "through"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Applied UPDATE_STATION_BRANCH_TYPE: a, d"));

        let doc = project.read();
        assert_eq!(branch(&doc, "a", "right"), json!(["through", "b"]));
        assert_eq!(branch(&doc, "d", "left"), json!(["through", "b"]));
    }

    #[test]
    fn keeps_unknown_fields() {
        let project = Project::new(&param_document(&loop_graph()));
        project
            .bw()
            .args(["branch-type", "d", "left", "nonthrough"])
            .assert()
            .success();

        let doc = project.read();
        assert_eq!(doc["line_name"], json!(["荃灣綫", "Tsuen Wan Line"]));
        assert_eq!(doc["svgWidth"]["runin"], 1200);
        assert_eq!(doc["stn_list"]["d"]["name"], json!(["D", "d"]));
        assert_eq!(branch(&doc, "a", "right"), json!(["nonthrough", "b"]));
    }

    #[test]
    fn same_type_is_unchanged() {
        let project = Project::new(&typed_loop_document());
        let before = project.read_raw();

        project
            .bw()
            .args(["branch-type", "d", "left", "through"])
            .assert()
            .success()
            .stdout(predicate::str::contains("No changes."));

        assert_eq!(project.read_raw(), before);
    }

    #[test]
    fn clear_removes_both_endpoints() {
        let project = Project::new(&typed_loop_document());
        project
            .bw()
            .args(["branch-type", "a", "right", "none"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Applied CLEAR_STATION_BRANCH_TYPE: a, d"));

        let doc = project.read();
        assert_eq!(branch(&doc, "a", "right"), json!([]));
        assert_eq!(branch(&doc, "d", "left"), json!([]));
    }

    #[test]
    fn clear_can_be_disabled() {
        let project = Project::new(&typed_loop_document()).with_config("[branch]\nallow_clear = false\n");
        let before = project.read_raw();

        project
            .bw()
            .args(["branch-type", "a", "right", "none"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("clearing branch types is disabled"));

        assert_eq!(project.read_raw(), before);
    }

    #[test]
    fn rejects_side_without_two_neighbours() {
        let project = Project::new(&param_document(&loop_graph()));
        project
            .bw()
            .args(["branch-type", "a", "left", "through"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("invalid branch state at a (left)"));
    }

    #[test]
    fn dry_run_prints_plan_without_writing() {
        let project = Project::new(&typed_loop_document());
        let before = project.read_raw();

        project
            .bw()
            .args(["branch-type", "a", "right", "nonthrough", "--dry-run"])
            .assert()
            .success()
            .stdout(predicate::str::contains("UPDATE_STATION_BRANCH_TYPE (2 steps)"))
            .stdout(predicate::str::contains("1. Set right branch of a to nonthrough via c"))
            .stdout(predicate::str::contains("2. Set left branch of d to nonthrough via e"));

        assert_eq!(project.read_raw(), before);
    }

    #[test]
    fn json_result() {
        let project = Project::new(&param_document(&loop_graph()));
        let output = project
            .bw()
            .args(["--json", "branch-type", "a", "right", "through"])
            .output()
            .unwrap();
        assert!(output.status.success());

        let value: Value = serde_json::from_str(&stdout_of(&output)).unwrap();
        assert_eq!(value["status"], "applied");
        assert_eq!(value["command"], "UPDATE_STATION_BRANCH_TYPE");
        assert_eq!(value["touched"], json!(["a", "d"]));
    }
}

mod branch_first {
    use super::*;

    #[test]
    fn mirrors_at_far_endpoint() {
        let project = Project::new(&typed_loop_document());
        project
            .bw()
            .args(["branch-first", "a", "right", "b"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Applied UPDATE_STATION_BRANCH_FIRST: a, d"));

        let doc = project.read();
        assert_eq!(branch(&doc, "a", "right"), json!(["through", "b"]));
        assert_eq!(branch(&doc, "d", "left"), json!(["through", "b"]));
    }

    #[test]
    fn requires_branch_type() {
        let project = Project::new(&param_document(&loop_graph()));
        project
            .bw()
            .args(["branch-first", "a", "right", "c"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("no branch type is set"));
    }
}

mod branch_pos {
    use super::*;

    #[test]
    fn swaps_both_endpoints() {
        let project = Project::new(&typed_loop_document());
        project
            .bw()
            .args(["branch-pos", "a", "right", "upper"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Applied UPDATE_STATION_BRANCH_POS: a, d"));

        let doc = project.read();
        assert_eq!(doc["stn_list"]["a"]["children"], json!(["c", "b"]));
        assert_eq!(doc["stn_list"]["d"]["parents"], json!(["e", "b"]));
        assert_eq!(branch(&doc, "a", "right"), json!(["through", "c"]));
        assert_eq!(branch(&doc, "d", "left"), json!(["through", "e"]));

        project.bw().arg("verify").assert().success();
    }

    #[test]
    fn current_slot_is_unchanged() {
        let project = Project::new(&typed_loop_document());
        project
            .bw()
            .args(["branch-pos", "d", "left", "lower"])
            .assert()
            .success()
            .stdout(predicate::str::contains("No changes."));
    }

    #[test]
    fn unsupported_in_shmetro() {
        let project = Project::new(&typed_loop_document()).with_config("style = \"shmetro\"\n");
        let before = project.read_raw();

        project
            .bw()
            .args(["branch-pos", "a", "right", "upper"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("cannot be changed in shmetro diagrams"));

        assert_eq!(project.read_raw(), before);
    }
}

mod apply {
    use super::*;

    #[test]
    fn raw_command_from_file() {
        let project = Project::new(&typed_loop_document());
        project
            .dir
            .child("cmd.json")
            .write_str(r#"{"type": "UPDATE_STATION_BRANCH_POS", "left": "d", "right": "a"}"#)
            .unwrap();

        project
            .bw()
            .args(["apply", "cmd.json"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Applied UPDATE_STATION_BRANCH_POS: a, d"));

        let doc = project.read();
        assert_eq!(doc["stn_list"]["a"]["children"], json!(["c", "b"]));
        assert_eq!(doc["stn_list"]["d"]["parents"], json!(["e", "b"]));
    }

    #[test]
    fn raw_command_from_stdin() {
        let project = Project::new(&param_document(&loop_graph()));
        project
            .bw()
            .args(["apply", "-"])
            .write_stdin(r#"{"type": "UPDATE_STATION_BRANCH_TYPE", "stnId": "a", "direction": "right", "branchType": "nonthrough"}"#)
            .assert()
            .success();

        let doc = project.read();
        assert_eq!(branch(&doc, "a", "right"), json!(["nonthrough", "b"]));
        assert_eq!(branch(&doc, "d", "left"), json!(["nonthrough", "b"]));
    }

    #[test]
    fn inconsistent_first_is_rolled_back() {
        let project = Project::new(&typed_loop_document());
        let before = project.read_raw();
        let command = json!({
            "type": "UPDATE_STATION_BRANCH_FIRST",
            "branches": [
                { "stnId": "a", "direction": "right", "first": "b" },
                { "stnId": "d", "direction": "left", "first": "e" },
            ],
        });

        project
            .bw()
            .args(["apply", "-"])
            .write_stdin(command.to_string())
            .assert()
            .failure()
            .stderr(predicate::str::contains("UPDATE_STATION_BRANCH_FIRST failed"))
            .stderr(predicate::str::contains("verification failed"));

        assert_eq!(project.read_raw(), before);
    }

    #[test]
    fn malformed_command_fails() {
        let project = Project::new(&typed_loop_document());
        project
            .bw()
            .args(["apply", "-"])
            .write_stdin(r#"{"type": "UPDATE_STATION_BRANCH_COLOUR"}"#)
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid command"));
    }
}
