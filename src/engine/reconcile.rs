//! engine::reconcile
//!
//! Branch endpoint reconciliation.
//!
//! Changing which neighbour starts a branch, or which slot it occupies, is
//! resolved at the near endpoint and then mirrored at the far endpoint of the
//! branch run. Correspondence between the two ends is positional: the far
//! first neighbour sits at the same index in the far (mirrored) neighbour list
//! as the near first neighbour does in the near list.
//!
//! # Slot swaps
//!
//! Moving a branch between the upper and lower slot reverses the two-entry
//! neighbour list at both ends. First-neighbour identifiers are unchanged, so
//! the same physical branch keeps its designation and the index pairing holds.

use super::classify::require_branch_point;
use super::command::{BranchFirstTarget, Mutation};
use super::plan::{PlanError, PlanStep};
use super::EditorSettings;
use crate::core::graph::StationGraph;
use crate::core::traverse::{find_branch_endpoint, resolve_pair};
use crate::core::types::{BranchEntry, BranchSlot, Direction, StationId};

/// Request that the branch at `station`'s `direction` side start at `new_first`.
///
/// Returns `None` when `new_first` is already the first neighbour.
///
/// # Errors
///
/// - `NotFound` if a station is absent
/// - `InvalidBranchState` if the side has no branch type, `new_first` is not
///   a neighbour on that side, or the far endpoint is not a branch point
/// - `MalformedChain` if the branch run loops
pub fn set_branch_first(
    graph: &StationGraph,
    station: &StationId,
    direction: Direction,
    new_first: &StationId,
) -> Result<Option<Mutation>, PlanError> {
    let entry = graph.branch_entry(station, direction)?;
    if entry.first() == Some(new_first) {
        return Ok(None);
    }
    if entry.is_empty() {
        return Err(PlanError::invalid(station, direction, "no branch type is set"));
    }
    require_branch_point(graph, station, direction)?;

    let pair = resolve_pair(graph, station, direction, new_first)?;
    tracing::debug!(%station, %direction, %new_first, far = %pair.station, far_first = %pair.first, "reconciled first neighbour");

    Ok(Some(Mutation::UpdateStationBranchFirst {
        branches: [
            BranchFirstTarget {
                stn_id: station.clone(),
                direction,
                first: new_first.clone(),
            },
            BranchFirstTarget {
                stn_id: pair.station,
                direction: direction.mirror(),
                first: pair.first,
            },
        ],
    }))
}

/// Request that the branch at `station`'s `direction` side move to `slot`.
///
/// Returns `None` when its first neighbour already sits at `slot`.
///
/// # Errors
///
/// - `NotFound` if a station is absent
/// - `InvalidBranchState` if the side has no branch or the run is unpaired
/// - `PositionUnsupported` if the diagram style has no slot choice
/// - `MalformedChain` if the branch run loops
pub fn set_branch_pos(
    graph: &StationGraph,
    settings: &EditorSettings,
    station: &StationId,
    direction: Direction,
    slot: BranchSlot,
) -> Result<Option<Mutation>, PlanError> {
    let entry = graph.branch_entry(station, direction)?;
    let Some(first) = entry.first() else {
        return Err(PlanError::invalid(station, direction, "no branch type is set"));
    };
    let neighbours = require_branch_point(graph, station, direction)?;
    let index = neighbours
        .iter()
        .position(|n| n == first)
        .ok_or_else(|| PlanError::invalid(station, direction, format!("first neighbour {} is not a neighbour", first)))?;

    if BranchSlot::from_index(index) == slot {
        return Ok(None);
    }
    if !settings.style.supports_branch_position() {
        return Err(PlanError::PositionUnsupported {
            style: settings.style,
        });
    }

    let pair = resolve_pair(graph, station, direction, first)?;
    let (left, right) = match direction {
        Direction::Right => (pair.station, station.clone()),
        Direction::Left => (station.clone(), pair.station),
    };
    tracing::debug!(%left, %right, %slot, "reconciled branch position");

    Ok(Some(Mutation::UpdateStationBranchPos { left, right }))
}

/// Plan `UPDATE_STATION_BRANCH_FIRST`.
///
/// Each target keeps its own branch type. A target without one takes the
/// other target's type.
pub(crate) fn plan_branch_first(
    graph: &StationGraph,
    branches: &[BranchFirstTarget; 2],
) -> Result<Vec<PlanStep>, PlanError> {
    let [near, far] = branches;
    if near.stn_id == far.stn_id && near.direction == far.direction {
        return Err(PlanError::invalid(
            &near.stn_id,
            near.direction,
            "both targets name the same side",
        ));
    }

    let near_type = graph.branch_entry(&near.stn_id, near.direction)?.branch_type();
    let far_type = graph.branch_entry(&far.stn_id, far.direction)?.branch_type();

    let mut steps = Vec::with_capacity(2);
    for (target, own, other) in [(near, near_type, far_type), (far, far_type, near_type)] {
        let branch_type = own.or(other).ok_or_else(|| {
            PlanError::invalid(&target.stn_id, target.direction, "neither endpoint has a branch type")
        })?;

        let neighbours = require_branch_point(graph, &target.stn_id, target.direction)?;
        if !neighbours.contains(&target.first) {
            return Err(PlanError::invalid(
                &target.stn_id,
                target.direction,
                format!("{} is not a {} neighbour", target.first, target.direction),
            ));
        }

        steps.extend(PlanStep::branch_write(
            graph,
            &target.stn_id,
            target.direction,
            BranchEntry::new(branch_type, target.first.clone()),
        )?);
    }
    Ok(steps)
}

/// Plan `UPDATE_STATION_BRANCH_POS`.
///
/// `right` must split into two children, one of whose runs rejoins at
/// `left`, which must merge two parents.
pub(crate) fn plan_branch_pos(
    graph: &StationGraph,
    settings: &EditorSettings,
    left: &StationId,
    right: &StationId,
) -> Result<Vec<PlanStep>, PlanError> {
    if !settings.style.supports_branch_position() {
        return Err(PlanError::PositionUnsupported {
            style: settings.style,
        });
    }

    let children = require_branch_point(graph, right, Direction::Right)?;
    require_branch_point(graph, left, Direction::Left)?;

    let mut rejoins = false;
    for child in children {
        if &find_branch_endpoint(graph, child, Direction::Right)? == left {
            rejoins = true;
            break;
        }
    }
    if !rejoins {
        return Err(PlanError::invalid(
            right,
            Direction::Right,
            format!("no branch run rejoins at {}", left),
        ));
    }

    Ok(vec![
        PlanStep::SwapNeighbours {
            station: right.clone(),
            direction: Direction::Right,
        },
        PlanStep::SwapNeighbours {
            station: left.clone(),
            direction: Direction::Left,
        },
    ])
}
