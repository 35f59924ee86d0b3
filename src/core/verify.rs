//! core::verify
//!
//! Topology verification.
//!
//! # Modes
//!
//! - **Fast verify** over the whole graph: used by `bw verify` and after
//!   loading a document.
//! - **Scoped verify** over a set of stations: run by the executor after
//!   each mutation on the stations the plan touched.
//!
//! # Checks
//!
//! - Every neighbour reference resolves to a station
//! - Parent/child symmetry
//! - Branch entries only at two-neighbour sides
//! - A branch entry's first neighbour is on its side
//! - Every branch entry has a paired entry at the far end of its run, with
//!   the same type and the index-corresponding first neighbour
//!
//! # Invariants
//!
//! - Never mutates the graph
//! - Deterministic: stations are visited in identifier order

use thiserror::Error;

use super::graph::{Station, StationGraph};
use super::traverse::{resolve_pair, TraverseError};
use super::types::{BranchType, Direction, StationId};

/// Invariant violations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VerifyError {
    #[error("{station} lists missing {direction} neighbour {neighbour}")]
    DanglingNeighbour {
        station: StationId,
        direction: Direction,
        neighbour: StationId,
    },

    #[error("adjacency {parent} -> {child} is not recorded on both stations")]
    AsymmetricAdjacency { parent: StationId, child: StationId },

    #[error("{station} has a {direction} branch but {count} {direction} neighbours")]
    BranchAtNonBranchPoint {
        station: StationId,
        direction: Direction,
        count: usize,
    },

    #[error("{station} {direction} branch starts at {first}, which is not a {direction} neighbour")]
    FirstNotNeighbour {
        station: StationId,
        direction: Direction,
        first: StationId,
    },

    #[error("{station} {direction} branch cannot be followed: {reason}")]
    BrokenRun {
        station: StationId,
        direction: Direction,
        reason: String,
    },

    #[error("{station} {direction} branch has no paired entry at {far}")]
    UnpairedBranch {
        station: StationId,
        direction: Direction,
        far: StationId,
    },

    #[error("{station} {direction} branch pairs with {far}, expected first {expected}, found {found}")]
    PairMismatch {
        station: StationId,
        direction: Direction,
        far: StationId,
        expected: StationId,
        found: StationId,
    },

    #[error("{station} {direction} branch is {near_type} but its pair at {far} is {far_type}")]
    TypeMismatch {
        station: StationId,
        direction: Direction,
        far: StationId,
        near_type: BranchType,
        far_type: BranchType,
    },
}

/// Result of verification.
#[derive(Debug)]
pub struct VerifyResult {
    /// Whether verification passed
    pub ok: bool,
    /// Errors found during verification
    pub errors: Vec<VerifyError>,
}

impl VerifyResult {
    /// Create a successful result.
    pub fn success() -> Self {
        Self {
            ok: true,
            errors: vec![],
        }
    }

    /// Create a failed result with errors.
    pub fn failure(errors: Vec<VerifyError>) -> Self {
        Self { ok: false, errors }
    }

    fn from_errors(errors: Vec<VerifyError>) -> Self {
        if errors.is_empty() {
            Self::success()
        } else {
            Self::failure(errors)
        }
    }

    /// One line per violation.
    pub fn summary(&self) -> String {
        self.errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Verify every station in the graph.
pub fn fast_verify(graph: &StationGraph) -> VerifyResult {
    let mut errors = Vec::new();
    for (id, station) in graph.iter() {
        check_station(graph, id, station, &mut errors);
    }
    VerifyResult::from_errors(errors)
}

/// Verify only the given stations.
///
/// Unknown ids are skipped; the caller already failed on them if they mattered.
pub fn verify_stations<'a, I>(graph: &StationGraph, ids: I) -> VerifyResult
where
    I: IntoIterator<Item = &'a StationId>,
{
    let mut errors = Vec::new();
    for id in ids {
        if let Ok(station) = graph.get(id) {
            check_station(graph, id, station, &mut errors);
        }
    }
    VerifyResult::from_errors(errors)
}

fn check_station(graph: &StationGraph, id: &StationId, station: &Station, errors: &mut Vec<VerifyError>) {
    check_adjacency(graph, id, station, errors);
    for direction in Direction::ALL {
        check_branch(graph, id, station, direction, errors);
    }
}

fn check_adjacency(graph: &StationGraph, id: &StationId, station: &Station, errors: &mut Vec<VerifyError>) {
    for direction in Direction::ALL {
        for neighbour in station.neighbours(direction) {
            let Ok(other) = graph.get(neighbour) else {
                errors.push(VerifyError::DanglingNeighbour {
                    station: id.clone(),
                    direction,
                    neighbour: neighbour.clone(),
                });
                continue;
            };
            if !other.neighbours(direction.mirror()).contains(id) {
                let (parent, child) = match direction {
                    Direction::Left => (neighbour.clone(), id.clone()),
                    Direction::Right => (id.clone(), neighbour.clone()),
                };
                errors.push(VerifyError::AsymmetricAdjacency { parent, child });
            }
        }
    }
}

fn check_branch(
    graph: &StationGraph,
    id: &StationId,
    station: &Station,
    direction: Direction,
    errors: &mut Vec<VerifyError>,
) {
    let entry = station.branch(direction);
    let (Some(near_type), Some(first)) = (entry.branch_type(), entry.first()) else {
        return;
    };

    let count = station.neighbours(direction).len();
    if count != 2 {
        errors.push(VerifyError::BranchAtNonBranchPoint {
            station: id.clone(),
            direction,
            count,
        });
        return;
    }

    let pair = match resolve_pair(graph, id, direction, first) {
        Ok(pair) => pair,
        Err(TraverseError::NotANeighbour { .. }) => {
            errors.push(VerifyError::FirstNotNeighbour {
                station: id.clone(),
                direction,
                first: first.clone(),
            });
            return;
        }
        Err(e) => {
            errors.push(VerifyError::BrokenRun {
                station: id.clone(),
                direction,
                reason: e.to_string(),
            });
            return;
        }
    };

    let far_entry = match graph.branch_entry(&pair.station, direction.mirror()) {
        Ok(entry) => entry,
        Err(e) => {
            errors.push(VerifyError::BrokenRun {
                station: id.clone(),
                direction,
                reason: e.to_string(),
            });
            return;
        }
    };

    let (Some(far_type), Some(far_first)) = (far_entry.branch_type(), far_entry.first()) else {
        errors.push(VerifyError::UnpairedBranch {
            station: id.clone(),
            direction,
            far: pair.station,
        });
        return;
    };

    if far_first != &pair.first {
        errors.push(VerifyError::PairMismatch {
            station: id.clone(),
            direction,
            far: pair.station.clone(),
            expected: pair.first.clone(),
            found: far_first.clone(),
        });
    }
    if far_type != near_type {
        errors.push(VerifyError::TypeMismatch {
            station: id.clone(),
            direction,
            far: pair.station,
            near_type,
            far_type,
        });
    }
}
