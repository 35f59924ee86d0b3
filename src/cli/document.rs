//! cli::document
//!
//! Parameter document I/O.
//!
//! A parameter document is either the full diagram parameter object, whose
//! `stn_list` field holds the stations, or a bare station map. Only the
//! station map is parsed into a [`StationGraph`]; every other field is kept
//! as raw JSON and written back unchanged.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context as _, Result};
use serde::Deserialize;
use serde_json::Value;

use crate::core::graph::StationGraph;

/// Key of the station map inside a full parameter object.
pub const STATION_LIST_KEY: &str = "stn_list";

/// Directory a document at `path` lives in.
pub fn project_dir_of(path: &Path) -> PathBuf {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Layout of a loaded document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// Full parameter object with a `stn_list` field.
    Param,
    /// The station map itself.
    StationList,
}

/// A loaded parameter document.
#[derive(Debug, Clone)]
pub struct ParamDocument {
    path: PathBuf,
    root: Value,
    shape: Shape,
}

impl ParamDocument {
    /// Read and parse a document.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read document '{}'", path.display()))?;
        let root: Value = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse document '{}'", path.display()))?;
        Self::from_value(path, root)
    }

    /// Wrap already-parsed JSON.
    pub fn from_value(path: impl Into<PathBuf>, root: Value) -> Result<Self> {
        let Some(object) = root.as_object() else {
            bail!("Document must be a JSON object");
        };
        let shape = match object.get(STATION_LIST_KEY) {
            Some(Value::Object(_)) => Shape::Param,
            Some(_) => bail!("'{}' must be an object of stations", STATION_LIST_KEY),
            None => Shape::StationList,
        };
        Ok(Self {
            path: path.into(),
            root,
            shape,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    /// Directory holding the document, used for project configuration.
    pub fn project_dir(&self) -> PathBuf {
        project_dir_of(&self.path)
    }

    fn stations(&self) -> &Value {
        match self.shape {
            Shape::Param => &self.root[STATION_LIST_KEY],
            Shape::StationList => &self.root,
        }
    }

    /// Parse the station map.
    pub fn graph(&self) -> Result<StationGraph> {
        StationGraph::deserialize(self.stations())
            .with_context(|| format!("Invalid station list in '{}'", self.path.display()))
    }

    /// Replace the station map with `graph`.
    pub fn replace_graph(&mut self, graph: &StationGraph) -> Result<()> {
        let stations = serde_json::to_value(graph).context("Failed to serialize stations")?;
        match self.shape {
            Shape::Param => self.root[STATION_LIST_KEY] = stations,
            Shape::StationList => self.root = stations,
        }
        Ok(())
    }

    /// Document as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        let mut json = serde_json::to_string_pretty(&self.root).context("Failed to serialize document")?;
        json.push('\n');
        Ok(json)
    }

    /// Write the document back to its path.
    pub fn save(&self) -> Result<()> {
        fs::write(&self.path, self.to_json()?)
            .with_context(|| format!("Failed to write document '{}'", self.path.display()))
    }
}
