//! engine::classify
//!
//! Branch classification: assigning and clearing the branch type at a
//! branch point.
//!
//! A branch point carries its type on both endpoints of the branch run.
//! Setting or clearing it at one end plans the matching write at the other,
//! so the pair never disagrees after a dispatch.

use super::command::Mutation;
use super::plan::{PlanError, PlanStep};
use super::EditorSettings;
use crate::core::graph::StationGraph;
use crate::core::traverse::resolve_pair;
use crate::core::types::{BranchEntry, BranchType, Direction, StationId};

/// Request a branch type at `station`'s `direction` side.
///
/// Returns `None` when the side already has this type.
///
/// # Errors
///
/// - `NotFound` if the station is absent
/// - `InvalidBranchState` if the side does not have exactly two neighbours
pub fn set_branch_type(
    graph: &StationGraph,
    station: &StationId,
    direction: Direction,
    branch_type: BranchType,
) -> Result<Option<Mutation>, PlanError> {
    let current = graph.get(station)?;
    if current.branch(direction).branch_type() == Some(branch_type) {
        return Ok(None);
    }
    require_branch_point(graph, station, direction)?;

    Ok(Some(Mutation::UpdateStationBranchType {
        stn_id: station.clone(),
        direction,
        branch_type,
    }))
}

/// Request that the branch type at `station`'s `direction` side be cleared.
///
/// Returns `None` when the side has no branch type.
///
/// # Errors
///
/// - `NotFound` if the station is absent
/// - `ClearDisabled` if configuration forbids clearing
pub fn clear_branch_type(
    graph: &StationGraph,
    settings: &EditorSettings,
    station: &StationId,
    direction: Direction,
) -> Result<Option<Mutation>, PlanError> {
    if graph.branch_entry(station, direction)?.is_empty() {
        return Ok(None);
    }
    if !settings.allow_clear {
        return Err(PlanError::ClearDisabled);
    }
    Ok(Some(Mutation::ClearStationBranchType {
        stn_id: station.clone(),
        direction,
    }))
}

/// Plan `UPDATE_STATION_BRANCH_TYPE`.
///
/// The near entry keeps its first neighbour if it has a valid one and
/// otherwise starts at index 0. The far entry gets the same type and the
/// index-corresponding first neighbour.
pub(crate) fn plan_branch_type(
    graph: &StationGraph,
    station: &StationId,
    direction: Direction,
    branch_type: BranchType,
) -> Result<Vec<PlanStep>, PlanError> {
    let neighbours = require_branch_point(graph, station, direction)?;
    let first = match graph.branch_entry(station, direction)?.first() {
        Some(first) if neighbours.contains(first) => first.clone(),
        _ => neighbours[0].clone(),
    };

    let pair = resolve_pair(graph, station, direction, &first)?;
    tracing::debug!(%station, %direction, %first, far = %pair.station, "classifying branch");

    let steps = [
        PlanStep::branch_write(graph, station, direction, BranchEntry::new(branch_type, first))?,
        PlanStep::branch_write(
            graph,
            &pair.station,
            direction.mirror(),
            BranchEntry::new(branch_type, pair.first),
        )?,
    ];
    Ok(steps.into_iter().flatten().collect())
}

/// Plan `CLEAR_STATION_BRANCH_TYPE`.
///
/// The far entry is cleared only when the run still resolves to it and it
/// holds a branch; a run that no longer resolves clears the near entry alone.
pub(crate) fn plan_clear(
    graph: &StationGraph,
    settings: &EditorSettings,
    station: &StationId,
    direction: Direction,
) -> Result<Vec<PlanStep>, PlanError> {
    if !settings.allow_clear {
        return Err(PlanError::ClearDisabled);
    }

    let entry = graph.branch_entry(station, direction)?;
    let mut steps: Vec<PlanStep> = PlanStep::branch_write(graph, station, direction, BranchEntry::Empty)?
        .into_iter()
        .collect();

    if let Some(first) = entry.first() {
        match resolve_pair(graph, station, direction, first) {
            Ok(pair) => steps.extend(PlanStep::branch_write(
                graph,
                &pair.station,
                direction.mirror(),
                BranchEntry::Empty,
            )?),
            Err(e) => {
                tracing::warn!(%station, %direction, error = %e, "paired endpoint not resolved, clearing near side only");
            }
        }
    }
    Ok(steps)
}

/// The side's neighbours, if it is a two-neighbour branch point.
pub(crate) fn require_branch_point<'g>(
    graph: &'g StationGraph,
    station: &StationId,
    direction: Direction,
) -> Result<&'g [StationId], PlanError> {
    let neighbours = graph.neighbours(station, direction)?;
    if neighbours.len() != 2 {
        return Err(PlanError::invalid(
            station,
            direction,
            format!("a branch needs exactly 2 {} neighbours, found {}", direction, neighbours.len()),
        ));
    }
    Ok(neighbours)
}
