//! core::graph
//!
//! Station graph representation and primitive operations.
//!
//! # Architecture
//!
//! The station graph is an arena keyed by [`StationId`]:
//! - Nodes are station records
//! - Adjacency is stored on both ends (ordered `parents` and `children`)
//! - Neighbour references are identifiers, never embedded references
//!
//! # Invariants
//!
//! - Parent/child symmetry: `b ∈ a.children` iff `a ∈ b.parents`
//! - A non-empty branch entry only sits on a side with exactly two neighbours
//! - A branch entry's first neighbour belongs to that side's neighbour list
//!
//! The graph does not enforce these itself. [`super::verify`] checks them and
//! the engine's executor is the only code that writes branch data.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use super::types::{BranchEntry, Direction, Fingerprint, Side, StationId};

/// Errors from graph lookups.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("station not found: {0}")]
    NotFound(StationId),
}

/// Branch annotations for both sides of a station.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchRecord {
    #[serde(default)]
    pub left: BranchEntry,
    #[serde(default)]
    pub right: BranchEntry,
}

impl BranchRecord {
    pub fn get(&self, direction: Direction) -> &BranchEntry {
        match direction {
            Direction::Left => &self.left,
            Direction::Right => &self.right,
        }
    }

    fn get_mut(&mut self, direction: Direction) -> &mut BranchEntry {
        match direction {
            Direction::Left => &mut self.left,
            Direction::Right => &mut self.right,
        }
    }
}

/// A station record.
///
/// Display fields (`name`, `num`, interchange data, ...) belong to the
/// renderer. They are kept verbatim in `extra` so a document round-trips
/// through the graph unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Station {
    #[serde(default)]
    parents: Vec<StationId>,
    #[serde(default)]
    children: Vec<StationId>,
    #[serde(default)]
    branch: BranchRecord,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl Station {
    /// Create a station with no neighbours and no branch annotations.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a branch entry while authoring a station.
    pub fn with_branch(mut self, direction: Direction, entry: BranchEntry) -> Self {
        *self.branch.get_mut(direction) = entry;
        self
    }

    /// Attach an opaque display field.
    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    pub fn parents(&self) -> &[StationId] {
        &self.parents
    }

    pub fn children(&self) -> &[StationId] {
        &self.children
    }

    /// Ordered neighbours on the side `direction` looks at.
    pub fn neighbours(&self, direction: Direction) -> &[StationId] {
        match direction.side() {
            Side::Parents => &self.parents,
            Side::Children => &self.children,
        }
    }

    fn neighbours_mut(&mut self, direction: Direction) -> &mut Vec<StationId> {
        match direction.side() {
            Side::Parents => &mut self.parents,
            Side::Children => &mut self.children,
        }
    }

    pub fn branch(&self, direction: Direction) -> &BranchEntry {
        self.branch.get(direction)
    }

    pub fn branches(&self) -> &BranchRecord {
        &self.branch
    }

    /// Display fields carried for the renderer.
    pub fn extra(&self) -> &Map<String, Value> {
        &self.extra
    }

    /// Position of `neighbour` in the neighbour list for `direction`.
    pub fn index_of(&self, direction: Direction, neighbour: &StationId) -> Option<usize> {
        self.neighbours(direction).iter().position(|n| n == neighbour)
    }

    /// Whether this side is a branch point (exactly two neighbours).
    pub fn is_branch_point(&self, direction: Direction) -> bool {
        self.neighbours(direction).len() == 2
    }
}

/// The station graph.
///
/// Stations are stored in identifier order so iteration, fingerprints and
/// verification reports are deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<StationId, Station>",
    into = "BTreeMap<StationId, Station>"
)]
pub struct StationGraph {
    stations: BTreeMap<StationId, Station>,
    /// Bumped by every primitive write.
    revision: u64,
}

impl From<BTreeMap<StationId, Station>> for StationGraph {
    fn from(stations: BTreeMap<StationId, Station>) -> Self {
        Self {
            stations,
            revision: 0,
        }
    }
}

impl From<StationGraph> for BTreeMap<StationId, Station> {
    fn from(graph: StationGraph) -> Self {
        graph.stations
    }
}

impl StationGraph {
    /// Create an empty station graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a station record.
    pub fn insert_station(&mut self, id: StationId, station: Station) {
        self.stations.insert(id, station);
    }

    /// Connect `parent -> child`, updating both adjacency lists.
    ///
    /// Missing stations are created. Repeated calls append duplicate
    /// entries, so authoring code connects each pair once.
    ///
    /// # Example
    ///
    /// ```
    /// use branchwork::core::graph::StationGraph;
    /// use branchwork::core::types::{Direction, StationId};
    ///
    /// let a = StationId::new("a").unwrap();
    /// let b = StationId::new("b").unwrap();
    ///
    /// let mut graph = StationGraph::new();
    /// graph.connect(&a, &b);
    ///
    /// assert_eq!(graph.neighbours(&a, Direction::Right).unwrap(), &[b.clone()]);
    /// assert_eq!(graph.neighbours(&b, Direction::Left).unwrap(), &[a]);
    /// ```
    pub fn connect(&mut self, parent: &StationId, child: &StationId) {
        self.stations
            .entry(parent.clone())
            .or_default()
            .children
            .push(child.clone());
        self.stations
            .entry(child.clone())
            .or_default()
            .parents
            .push(parent.clone());
    }

    /// Look up a station.
    ///
    /// # Errors
    ///
    /// Returns `GraphError::NotFound` if the id is absent.
    pub fn get(&self, id: &StationId) -> Result<&Station, GraphError> {
        self.stations
            .get(id)
            .ok_or_else(|| GraphError::NotFound(id.clone()))
    }

    pub fn contains(&self, id: &StationId) -> bool {
        self.stations.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    /// All stations in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = (&StationId, &Station)> {
        self.stations.iter()
    }

    /// Ordered neighbours of `id` on `direction`'s side.
    pub fn neighbours(&self, id: &StationId, direction: Direction) -> Result<&[StationId], GraphError> {
        Ok(self.get(id)?.neighbours(direction))
    }

    pub fn branch_entry(&self, id: &StationId, direction: Direction) -> Result<&BranchEntry, GraphError> {
        Ok(self.get(id)?.branch(direction))
    }

    /// Replace a branch entry in place, returning the previous entry.
    ///
    /// This is the primitive branch write. It performs no validation.
    pub(crate) fn set_branch_entry(
        &mut self,
        id: &StationId,
        direction: Direction,
        entry: BranchEntry,
    ) -> Result<BranchEntry, GraphError> {
        let station = self
            .stations
            .get_mut(id)
            .ok_or_else(|| GraphError::NotFound(id.clone()))?;
        let previous = std::mem::replace(station.branch.get_mut(direction), entry);
        self.revision += 1;
        Ok(previous)
    }

    /// Reverse the neighbour list on `direction`'s side.
    ///
    /// Applied to a two-entry list this swaps the upper and lower slots.
    /// Membership is unchanged, so adjacency symmetry is preserved. It is
    /// its own inverse.
    pub(crate) fn swap_neighbours(&mut self, id: &StationId, direction: Direction) -> Result<(), GraphError> {
        let station = self
            .stations
            .get_mut(id)
            .ok_or_else(|| GraphError::NotFound(id.clone()))?;
        station.neighbours_mut(direction).reverse();
        self.revision += 1;
        Ok(())
    }

    /// Number of primitive writes applied since the graph was built.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Reset the revision after a rolled-back operation.
    pub(crate) fn restore_revision(&mut self, revision: u64) {
        self.revision = revision;
    }

    /// Fingerprint of topology and branch data.
    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint::compute(self.stations.iter().map(|(id, s)| {
            (
                id,
                s.parents.as_slice(),
                s.children.as_slice(),
                &s.branch.left,
                &s.branch.right,
            )
        }))
    }
}
