//! engine::command
//!
//! The mutation commands accepted by the dispatcher.
//!
//! # Wire format
//!
//! Commands serialize with a `type` tag and camelCase fields, matching what
//! the diagram editor sends:
//!
//! ```json
//! {"type": "UPDATE_STATION_BRANCH_TYPE", "stnId": "a", "direction": "right", "branchType": "through"}
//! {"type": "UPDATE_STATION_BRANCH_FIRST", "branches": [
//!     {"stnId": "a", "direction": "right", "first": "c"},
//!     {"stnId": "d", "direction": "left", "first": "e"}]}
//! {"type": "UPDATE_STATION_BRANCH_POS", "left": "d", "right": "a"}
//! {"type": "CLEAR_STATION_BRANCH_TYPE", "stnId": "a", "direction": "right"}
//! ```
//!
//! # Invariants
//!
//! - `plan()` is pure: it reads the graph and never writes it
//! - Steps that would rewrite a value already present are dropped, so a
//!   command that changes nothing plans to an empty plan

use serde::{Deserialize, Serialize};

use super::classify;
use super::plan::{Plan, PlanError};
use super::reconcile;
use super::EditorSettings;
use crate::core::graph::StationGraph;
use crate::core::ops::journal::OpId;
use crate::core::types::{BranchType, Direction, StationId};

/// One side of an `UPDATE_STATION_BRANCH_FIRST` command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchFirstTarget {
    #[serde(rename = "stnId")]
    pub stn_id: StationId,
    pub direction: Direction,
    pub first: StationId,
}

/// A graph mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Mutation {
    /// Set the branch type at a station side and at its paired endpoint.
    #[serde(rename_all = "camelCase")]
    UpdateStationBranchType {
        stn_id: StationId,
        direction: Direction,
        branch_type: BranchType,
    },

    /// Set the first neighbour at both endpoints of a branch.
    UpdateStationBranchFirst { branches: [BranchFirstTarget; 2] },

    /// Swap the upper and lower slots of a branch.
    ///
    /// `right` is the split station (branch on its right side), `left` the
    /// merge station (branch on its left side).
    UpdateStationBranchPos { left: StationId, right: StationId },

    /// Clear the branch type at a station side and at its paired endpoint.
    #[serde(rename_all = "camelCase")]
    ClearStationBranchType {
        stn_id: StationId,
        direction: Direction,
    },
}

impl Mutation {
    /// The command tag, as it appears on the wire.
    pub fn name(&self) -> &'static str {
        match self {
            Mutation::UpdateStationBranchType { .. } => "UPDATE_STATION_BRANCH_TYPE",
            Mutation::UpdateStationBranchFirst { .. } => "UPDATE_STATION_BRANCH_FIRST",
            Mutation::UpdateStationBranchPos { .. } => "UPDATE_STATION_BRANCH_POS",
            Mutation::ClearStationBranchType { .. } => "CLEAR_STATION_BRANCH_TYPE",
        }
    }

    /// Build the plan that applies this command to `graph`.
    ///
    /// # Errors
    ///
    /// Returns a [`PlanError`] when the graph does not support the edit;
    /// the graph is untouched in that case.
    pub fn plan(&self, graph: &StationGraph, settings: &EditorSettings) -> Result<Plan, PlanError> {
        let steps = match self {
            Mutation::UpdateStationBranchType {
                stn_id,
                direction,
                branch_type,
            } => classify::plan_branch_type(graph, stn_id, *direction, *branch_type)?,
            Mutation::ClearStationBranchType { stn_id, direction } => {
                classify::plan_clear(graph, settings, stn_id, *direction)?
            }
            Mutation::UpdateStationBranchFirst { branches } => {
                reconcile::plan_branch_first(graph, branches)?
            }
            Mutation::UpdateStationBranchPos { left, right } => {
                reconcile::plan_branch_pos(graph, settings, left, right)?
            }
        };

        let plan = Plan::new(OpId::new(), self.name()).with_steps(steps);
        tracing::debug!(command = self.name(), steps = plan.steps.len(), "planned mutation");
        Ok(plan)
    }
}
