//! Shared fixtures for branchwork integration tests.
//!
//! Graph builders produce well-formed lines: a trunk from `linestart` to
//! `lineend` with disjoint loops that split at `s{i}` and rejoin at `m{i}`.
//! Document builders wrap a graph in a parameter object the way the
//! diagram editor saves it.

#![allow(dead_code)]

use std::path::Path;

use assert_cmd::Command;
use assert_fs::prelude::*;
use assert_fs::TempDir;
use serde_json::{json, Value};

use branchwork::core::graph::StationGraph;
use branchwork::core::types::StationId;

pub fn id(s: &str) -> StationId {
    StationId::new(s).unwrap()
}

/// `linestart -> a`, loop `a -> {b, c -> e} -> d`, `d -> f -> lineend`.
pub fn loop_graph() -> StationGraph {
    let mut graph = StationGraph::new();
    for (parent, child) in [
        ("linestart", "a"),
        ("a", "b"),
        ("a", "c"),
        ("c", "e"),
        ("b", "d"),
        ("e", "d"),
        ("d", "f"),
        ("f", "lineend"),
    ] {
        graph.connect(&id(parent), &id(child));
    }
    graph
}

/// Split station of loop `i`.
pub fn split(i: usize) -> StationId {
    id(&format!("s{i}"))
}

/// Merge station of loop `i`.
pub fn merge(i: usize) -> StationId {
    id(&format!("m{i}"))
}

/// A line with one loop per `(upper, lower)` pair of arm lengths.
///
/// The upper arm may be empty (a direct `s{i} -> m{i}` track); the lower arm
/// must have at least one station. Upper neighbours are listed first on
/// both ends of every loop.
pub fn line_with_loops(arms: &[(usize, usize)]) -> StationGraph {
    let mut graph = StationGraph::new();
    let mut prev = id("linestart");

    for (i, &(upper, lower)) in arms.iter().enumerate() {
        assert!(lower > 0, "lower arm must not be empty");
        let (s, m) = (split(i), merge(i));
        graph.connect(&prev, &s);

        let upper_ids: Vec<StationId> = (0..upper).map(|j| id(&format!("u{i}x{j}"))).collect();
        let lower_ids: Vec<StationId> = (0..lower).map(|j| id(&format!("l{i}x{j}"))).collect();

        graph.connect(&s, upper_ids.first().unwrap_or(&m));
        graph.connect(&s, &lower_ids[0]);
        for pair in upper_ids.windows(2).chain(lower_ids.windows(2)) {
            graph.connect(&pair[0], &pair[1]);
        }
        if let Some(last) = upper_ids.last() {
            graph.connect(last, &m);
        }
        graph.connect(lower_ids.last().unwrap(), &m);

        prev = m;
    }

    graph.connect(&prev, &id("lineend"));
    graph
}

/// Wrap a graph in a full parameter object. Every station gets a display
/// name so tests can check unknown fields survive an edit.
pub fn param_document(graph: &StationGraph) -> Value {
    let mut stations = serde_json::to_value(graph).unwrap();
    for (key, station) in stations.as_object_mut().unwrap() {
        station["name"] = json!([key.to_uppercase(), key.clone()]);
    }
    json!({
        "svgWidth": { "destination": 1200, "runin": 1200 },
        "style": "mtr",
        "theme": ["hongkong", "twl", "#E2231A", "#fff"],
        "line_name": ["荃灣綫", "Tsuen Wan Line"],
        "stn_list": stations,
    })
}

/// The loop line with a through branch from `a` (via `c`) to `d` (via `e`).
pub fn typed_loop_document() -> Value {
    let mut doc = param_document(&loop_graph());
    doc["stn_list"]["a"]["branch"]["right"] = json!(["through", "c"]);
    doc["stn_list"]["d"]["branch"]["left"] = json!(["through", "e"]);
    doc
}

/// A temp project directory holding `rmg.json`.
pub struct Project {
    pub dir: TempDir,
}

impl Project {
    pub fn new(document: &Value) -> Self {
        let dir = TempDir::new().unwrap();
        dir.child("rmg.json")
            .write_str(&serde_json::to_string_pretty(document).unwrap())
            .unwrap();
        Self { dir }
    }

    /// Write `.branchwork/config.toml` next to the document.
    pub fn with_config(self, toml: &str) -> Self {
        self.dir.child(".branchwork/config.toml").write_str(toml).unwrap();
        self
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn read_raw(&self) -> String {
        std::fs::read_to_string(self.dir.child("rmg.json").path()).unwrap()
    }

    pub fn read(&self) -> Value {
        serde_json::from_str(&self.read_raw()).unwrap()
    }

    /// `bw` run inside the project, isolated from the user's global config.
    pub fn bw(&self) -> Command {
        let mut cmd = Command::cargo_bin("bw").unwrap();
        cmd.current_dir(self.path())
            .env("HOME", self.path().join("home"))
            .env("XDG_CONFIG_HOME", self.path().join("xdg"))
            .env_remove("BRANCHWORK_CONFIG")
            .env_remove("RUST_LOG");
        cmd
    }
}
