//! engine::plan
//!
//! Deterministic plan representation.
//!
//! # Architecture
//!
//! Plans are the sole intermediate representation between a validated
//! command and graph mutation. They are:
//! - **Deterministic**: Same graph and command always produce the same steps
//! - **Previewable**: `bw --dry-run` prints them without executing
//! - **Typed**: Each step names the station and side it writes
//!
//! # Invariants
//!
//! - Planning does not mutate the graph
//! - Plans are pure data structures
//! - A plan that writes one endpoint of a branch pair also writes the other
//!
//! # Example
//!
//! ```
//! use branchwork::core::ops::journal::OpId;
//! use branchwork::core::types::{BranchEntry, BranchType, Direction, StationId};
//! use branchwork::engine::plan::{Plan, PlanStep};
//!
//! let a = StationId::new("a").unwrap();
//! let c = StationId::new("c").unwrap();
//!
//! let plan = Plan::new(OpId::new(), "UPDATE_STATION_BRANCH_TYPE").with_step(
//!     PlanStep::SetBranchEntry {
//!         station: a,
//!         direction: Direction::Right,
//!         entry: BranchEntry::new(BranchType::Through, c),
//!     },
//! );
//!
//! assert!(!plan.is_empty());
//! assert_eq!(plan.steps.len(), 1);
//! ```

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::core::config::DiagramStyle;
use crate::core::graph::{GraphError, StationGraph};
use crate::core::ops::journal::OpId;
use crate::core::traverse::TraverseError;
use crate::core::types::{BranchEntry, Direction, StationId};

/// Errors from planning.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PlanError {
    /// A referenced station does not exist.
    #[error("station not found: {0}")]
    NotFound(StationId),

    /// The station's neighbours or branch data do not support the edit.
    #[error("invalid branch state at {station} ({direction}): {reason}")]
    InvalidBranchState {
        station: StationId,
        direction: Direction,
        reason: String,
    },

    /// A branch run loops instead of reaching an endpoint.
    #[error("malformed branch chain: {0}")]
    MalformedChain(String),

    /// The diagram style has no upper/lower slot choice.
    #[error("branch position cannot be changed in {style} diagrams")]
    PositionUnsupported { style: DiagramStyle },

    /// Clearing branch types is turned off in configuration.
    #[error("clearing branch types is disabled (branch.allow_clear = false)")]
    ClearDisabled,
}

impl PlanError {
    pub(crate) fn invalid(station: &StationId, direction: Direction, reason: impl Into<String>) -> Self {
        PlanError::InvalidBranchState {
            station: station.clone(),
            direction,
            reason: reason.into(),
        }
    }
}

impl From<GraphError> for PlanError {
    fn from(err: GraphError) -> Self {
        match err {
            GraphError::NotFound(id) => PlanError::NotFound(id),
        }
    }
}

impl From<TraverseError> for PlanError {
    fn from(err: TraverseError) -> Self {
        match err {
            TraverseError::Graph(e) => e.into(),
            e @ TraverseError::MalformedChain { .. } => PlanError::MalformedChain(e.to_string()),
            TraverseError::NotANeighbour {
                station,
                direction,
                neighbour,
            } => PlanError::InvalidBranchState {
                reason: format!("{} is not a {} neighbour", neighbour, direction),
                station,
                direction,
            },
            TraverseError::Unpaired {
                station,
                direction,
                count,
            } => PlanError::InvalidBranchState {
                reason: format!(
                    "branch run ends at a station with {} {} neighbours, so it has no paired endpoint",
                    count, direction
                ),
                station,
                direction,
            },
        }
    }
}

/// A typed plan step.
///
/// Each step is one primitive graph write the executor will apply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PlanStep {
    /// Replace a branch entry.
    SetBranchEntry {
        station: StationId,
        direction: Direction,
        entry: BranchEntry,
    },

    /// Swap the two entries of a neighbour list.
    SwapNeighbours {
        station: StationId,
        direction: Direction,
    },
}

impl PlanStep {
    /// A branch write, or `None` when the station already holds `entry`.
    pub(crate) fn branch_write(
        graph: &StationGraph,
        station: &StationId,
        direction: Direction,
        entry: BranchEntry,
    ) -> Result<Option<PlanStep>, PlanError> {
        if graph.branch_entry(station, direction)? == &entry {
            return Ok(None);
        }
        Ok(Some(PlanStep::SetBranchEntry {
            station: station.clone(),
            direction,
            entry,
        }))
    }

    pub fn station(&self) -> &StationId {
        match self {
            PlanStep::SetBranchEntry { station, .. } | PlanStep::SwapNeighbours { station, .. } => {
                station
            }
        }
    }

    /// Human-readable description of the step.
    pub fn description(&self) -> String {
        match self {
            PlanStep::SetBranchEntry {
                station,
                direction,
                entry: BranchEntry::Empty,
            } => format!("Clear {} branch of {}", direction, station),
            PlanStep::SetBranchEntry {
                station,
                direction,
                entry,
            } => format!("Set {} branch of {} to {}", direction, station, entry),
            PlanStep::SwapNeighbours { station, direction } => {
                format!("Swap {} neighbours of {}", direction, station)
            }
        }
    }
}

/// A complete execution plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    /// Operation ID for journal and ledger correlation.
    pub op_id: OpId,
    /// Command that generated this plan.
    pub command: String,
    /// Ordered steps to execute.
    pub steps: Vec<PlanStep>,
}

impl Plan {
    /// Create a new empty plan.
    pub fn new(op_id: OpId, command: impl Into<String>) -> Self {
        Self {
            op_id,
            command: command.into(),
            steps: vec![],
        }
    }

    /// Add a step to the plan (builder pattern).
    pub fn with_step(mut self, step: PlanStep) -> Self {
        self.steps.push(step);
        self
    }

    /// Add multiple steps.
    pub fn with_steps(mut self, steps: impl IntoIterator<Item = PlanStep>) -> Self {
        self.steps.extend(steps);
        self
    }

    /// Compute a digest of the plan.
    ///
    /// SHA-256 of the canonical JSON serialization.
    pub fn digest(&self) -> String {
        let json = serde_json::to_string(&self).unwrap_or_default();
        let mut hasher = Sha256::new();
        hasher.update(json.as_bytes());
        format!("sha256:{}", hex::encode(hasher.finalize()))
    }

    /// Check if the plan is empty (no-op).
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Stations the plan writes, deduplicated and sorted.
    pub fn touched_stations(&self) -> BTreeSet<StationId> {
        self.steps.iter().map(|s| s.station().clone()).collect()
    }

    /// Multi-line preview of the plan.
    pub fn preview(&self) -> String {
        let mut out = format!("{} ({} steps)", self.command, self.steps.len());
        for (i, step) in self.steps.iter().enumerate() {
            out.push_str(&format!("\n  {}. {}", i + 1, step.description()));
        }
        out
    }
}
