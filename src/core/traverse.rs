//! core::traverse
//!
//! Branch-run traversal.
//!
//! A branch run is the chain of stations between a split point and the
//! merge point it rejoins (or between a merge point and the split it came
//! from when walking left). Walking starts at a neighbour of the near
//! endpoint and keeps moving along the direction while each station was
//! entered from a single-neighbour side. The first station entered from a
//! side with two or more neighbours is the paired endpoint.
//!
//! # Index alignment
//!
//! The neighbour that continues a branch at the far endpoint is found by
//! position, not identity: the entry at the same index in the far
//! endpoint's mirrored neighbour list that the near neighbour occupies in
//! the near list.
//!
//! # Termination
//!
//! A walk never takes more steps than the graph has stations. Exceeding that
//! means the chain loops back on itself, reported as
//! [`TraverseError::MalformedChain`].

use thiserror::Error;

use super::graph::{GraphError, StationGraph};
use super::types::{Direction, StationId};

/// Errors from traversal.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TraverseError {
    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error("branch run from {start} going {direction} does not terminate within {limit} steps")]
    MalformedChain {
        start: StationId,
        direction: Direction,
        limit: usize,
    },

    #[error("{neighbour} is not a {direction} neighbour of {station}")]
    NotANeighbour {
        station: StationId,
        direction: Direction,
        neighbour: StationId,
    },

    #[error("{station} has {count} {direction} neighbours, expected 2 at a paired branch point")]
    Unpaired {
        station: StationId,
        direction: Direction,
        count: usize,
    },
}

/// Result of walking a branch run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchRun {
    /// Station the walk started from.
    pub start: StationId,
    /// Stations passed through before reaching the endpoint, in walk order.
    pub path: Vec<StationId>,
    /// The paired endpoint.
    pub endpoint: StationId,
}

impl BranchRun {
    /// Number of moves taken.
    pub fn steps(&self) -> usize {
        self.path.len()
    }
}

/// Walk from `start` along `direction` to the end of its branch run.
///
/// # Errors
///
/// - `Graph` if a station on the way is missing
/// - `MalformedChain` if the walk exceeds the number of stations
pub fn walk_branch_run(
    graph: &StationGraph,
    start: &StationId,
    direction: Direction,
) -> Result<BranchRun, TraverseError> {
    let limit = graph.len();
    let back = direction.mirror();
    let mut current = start.clone();
    let mut path = Vec::new();

    loop {
        let station = graph.get(&current)?;
        if station.neighbours(back).len() != 1 {
            break;
        }
        let Some(next) = station.neighbours(direction).first() else {
            break;
        };
        if path.len() >= limit {
            return Err(TraverseError::MalformedChain {
                start: start.clone(),
                direction,
                limit,
            });
        }
        let next = next.clone();
        path.push(std::mem::replace(&mut current, next));
    }

    tracing::trace!(%start, %direction, endpoint = %current, steps = path.len(), "walked branch run");

    Ok(BranchRun {
        start: start.clone(),
        path,
        endpoint: current,
    })
}

/// Find the paired endpoint reached by walking from `start` along `direction`.
///
/// # Example
///
/// ```
/// use branchwork::core::graph::StationGraph;
/// use branchwork::core::traverse::find_branch_endpoint;
/// use branchwork::core::types::{Direction, StationId};
///
/// let id = |s: &str| StationId::new(s).unwrap();
/// let mut graph = StationGraph::new();
/// // a splits into b and c, which rejoin at d
/// graph.connect(&id("a"), &id("b"));
/// graph.connect(&id("a"), &id("c"));
/// graph.connect(&id("b"), &id("d"));
/// graph.connect(&id("c"), &id("d"));
///
/// assert_eq!(find_branch_endpoint(&graph, &id("c"), Direction::Right).unwrap(), id("d"));
/// assert_eq!(find_branch_endpoint(&graph, &id("b"), Direction::Left).unwrap(), id("a"));
/// ```
pub fn find_branch_endpoint(
    graph: &StationGraph,
    start: &StationId,
    direction: Direction,
) -> Result<StationId, TraverseError> {
    walk_branch_run(graph, start, direction).map(|run| run.endpoint)
}

/// The far end of a branch, seen from one of its endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairedEndpoint {
    /// Far endpoint station.
    pub station: StationId,
    /// Neighbour at the far endpoint (on the mirrored side) that corresponds
    /// by index to the near neighbour.
    pub first: StationId,
    /// Index shared by both neighbours.
    pub index: usize,
}

/// Resolve the far endpoint of the branch that leaves `near` through `neighbour`.
///
/// # Errors
///
/// - `NotANeighbour` if `neighbour` is not on `near`'s `direction` side
/// - `Unpaired` if either endpoint is not a two-neighbour branch point
/// - any traversal error from the walk
pub fn resolve_pair(
    graph: &StationGraph,
    near: &StationId,
    direction: Direction,
    neighbour: &StationId,
) -> Result<PairedEndpoint, TraverseError> {
    let station = graph.get(near)?;
    let index = station
        .index_of(direction, neighbour)
        .ok_or_else(|| TraverseError::NotANeighbour {
            station: near.clone(),
            direction,
            neighbour: neighbour.clone(),
        })?;
    let count = station.neighbours(direction).len();
    if count != 2 {
        return Err(TraverseError::Unpaired {
            station: near.clone(),
            direction,
            count,
        });
    }

    let endpoint = find_branch_endpoint(graph, neighbour, direction)?;
    let mirror = direction.mirror();
    let far_neighbours = graph.neighbours(&endpoint, mirror)?;
    if far_neighbours.len() != 2 {
        return Err(TraverseError::Unpaired {
            station: endpoint,
            direction: mirror,
            count: far_neighbours.len(),
        });
    }

    let Some(first) = far_neighbours.get(index) else {
        return Err(TraverseError::Unpaired {
            station: endpoint,
            direction: mirror,
            count: far_neighbours.len(),
        });
    };

    Ok(PairedEndpoint {
        first: first.clone(),
        station: endpoint,
        index,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> StationId {
        StationId::new(s).unwrap()
    }

    fn connect_all(graph: &mut StationGraph, edges: &[(&str, &str)]) {
        for (p, c) in edges {
            graph.connect(&id(p), &id(c));
        }
    }

    /// a splits into b and c; c continues through e; both rejoin at d.
    fn loop_graph() -> StationGraph {
        let mut graph = StationGraph::new();
        connect_all(
            &mut graph,
            &[
                ("linestart", "a"),
                ("a", "b"),
                ("a", "c"),
                ("c", "e"),
                ("b", "d"),
                ("e", "d"),
                ("d", "f"),
                ("f", "lineend"),
            ],
        );
        graph
    }

    mod walk {
        use super::*;

        #[test]
        fn short_arm_reaches_merge() {
            let graph = loop_graph();
            let run = walk_branch_run(&graph, &id("b"), Direction::Right).unwrap();
            assert_eq!(run.endpoint, id("d"));
            assert_eq!(run.path, vec![id("b")]);
            assert_eq!(run.steps(), 1);
        }

        #[test]
        fn long_arm_reaches_merge() {
            let graph = loop_graph();
            let run = walk_branch_run(&graph, &id("c"), Direction::Right).unwrap();
            assert_eq!(run.endpoint, id("d"));
            assert_eq!(run.path, vec![id("c"), id("e")]);
        }

        #[test]
        fn walking_left_reaches_split() {
            let graph = loop_graph();
            assert_eq!(find_branch_endpoint(&graph, &id("e"), Direction::Left).unwrap(), id("a"));
            assert_eq!(find_branch_endpoint(&graph, &id("b"), Direction::Left).unwrap(), id("a"));
        }

        #[test]
        fn start_at_merge_stops_immediately() {
            let mut graph = StationGraph::new();
            connect_all(&mut graph, &[("a", "b"), ("a", "d"), ("b", "d")]);
            let run = walk_branch_run(&graph, &id("d"), Direction::Right).unwrap();
            assert_eq!(run.endpoint, id("d"));
            assert_eq!(run.steps(), 0);
        }

        #[test]
        fn dead_end_stops() {
            let mut graph = StationGraph::new();
            connect_all(&mut graph, &[("a", "b"), ("b", "c")]);
            assert_eq!(find_branch_endpoint(&graph, &id("b"), Direction::Right).unwrap(), id("c"));
        }

        #[test]
        fn cycle_is_malformed() {
            let mut graph = StationGraph::new();
            connect_all(&mut graph, &[("a", "b"), ("b", "c"), ("c", "a")]);
            let err = walk_branch_run(&graph, &id("a"), Direction::Right).unwrap_err();
            assert!(matches!(err, TraverseError::MalformedChain { limit: 3, .. }));
        }

        #[test]
        fn missing_station_is_not_found() {
            let graph = loop_graph();
            let err = walk_branch_run(&graph, &id("nowhere"), Direction::Right).unwrap_err();
            assert_eq!(err, TraverseError::Graph(GraphError::NotFound(id("nowhere"))));
        }
    }

    mod pairing {
        use super::*;

        #[test]
        fn index_aligned_far_neighbour() {
            let graph = loop_graph();
            let pair = resolve_pair(&graph, &id("a"), Direction::Right, &id("c")).unwrap();
            assert_eq!(pair.station, id("d"));
            assert_eq!(pair.index, 1);
            assert_eq!(pair.first, id("e"));
        }

        #[test]
        fn mirrored_from_merge_side() {
            let graph = loop_graph();
            let pair = resolve_pair(&graph, &id("d"), Direction::Left, &id("b")).unwrap();
            assert_eq!(pair.station, id("a"));
            assert_eq!(pair.first, id("b"));
        }

        #[test]
        fn correspondence_is_positional() {
            // The far end lists its arms in the opposite order; pairing still
            // goes by index.
            let mut graph = StationGraph::new();
            connect_all(
                &mut graph,
                &[("a", "b"), ("a", "c"), ("c", "d"), ("b", "d")],
            );
            assert_eq!(graph.neighbours(&id("d"), Direction::Left).unwrap(), &[id("c"), id("b")]);

            let pair = resolve_pair(&graph, &id("a"), Direction::Right, &id("b")).unwrap();
            assert_eq!(pair.first, id("c"));
        }

        #[test]
        fn rejects_non_neighbour() {
            let graph = loop_graph();
            let err = resolve_pair(&graph, &id("a"), Direction::Right, &id("f")).unwrap_err();
            assert!(matches!(err, TraverseError::NotANeighbour { .. }));
        }

        #[test]
        fn rejects_unpaired_far_end() {
            // a splits but the arms never rejoin.
            let mut graph = StationGraph::new();
            connect_all(&mut graph, &[("a", "b"), ("a", "c"), ("b", "x"), ("c", "y")]);
            let err = resolve_pair(&graph, &id("a"), Direction::Right, &id("b")).unwrap_err();
            assert_eq!(
                err,
                TraverseError::Unpaired {
                    station: id("x"),
                    direction: Direction::Left,
                    count: 1,
                }
            );
        }

        #[test]
        fn rejects_three_way_near_side() {
            // x is the third child of a and rejoins at d with b.
            let mut graph = StationGraph::new();
            connect_all(
                &mut graph,
                &[("a", "b"), ("a", "c"), ("a", "x"), ("b", "d"), ("x", "d"), ("c", "e")],
            );
            let err = resolve_pair(&graph, &id("a"), Direction::Right, &id("x")).unwrap_err();
            assert_eq!(
                err,
                TraverseError::Unpaired {
                    station: id("a"),
                    direction: Direction::Right,
                    count: 3,
                }
            );
        }
    }
}
