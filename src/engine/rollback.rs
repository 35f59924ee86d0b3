//! Rollback logic for restoring the graph to its pre-operation state.
//!
//! Used by the `Executor` when a step fails or post-verification finds a
//! violation the operation introduced.
//!
//! # Rollback Order
//!
//! Records are undone in reverse journal order. The journal records writes
//! in execution order, so reversing gives the correct undo order.
//!
//! Branch writes restore the entry stored in the record. Neighbour swaps are
//! their own inverse and are simply applied again.

use thiserror::Error;

use crate::core::graph::{GraphError, StationGraph};
use crate::core::ops::journal::{Journal, JournalRecord};
use crate::core::types::StationId;

/// Errors from rollback operations.
#[derive(Debug, Error)]
pub enum RollbackError {
    /// The station a record names is gone.
    #[error("cannot restore {station}: {source}")]
    CannotRestore {
        station: StationId,
        #[source]
        source: GraphError,
    },
}

/// Result of a rollback attempt.
#[derive(Debug)]
pub struct RollbackResult {
    /// Records that were undone, as station ids in undo order.
    pub rolled_back: Vec<StationId>,
    /// Records that failed to undo.
    pub failed: Vec<RollbackError>,
    /// Whether every record was undone.
    pub complete: bool,
}

impl Default for RollbackResult {
    fn default() -> Self {
        Self::new()
    }
}

impl RollbackResult {
    /// Create a new empty rollback result.
    pub fn new() -> Self {
        Self {
            rolled_back: vec![],
            failed: vec![],
            complete: true,
        }
    }

    fn record_success(&mut self, station: StationId) {
        self.rolled_back.push(station);
    }

    fn record_failure(&mut self, error: RollbackError) {
        self.failed.push(error);
        self.complete = false;
    }

    /// Get a summary string for display.
    pub fn summary(&self) -> String {
        if self.complete {
            format!("Rolled back {} writes", self.rolled_back.len())
        } else {
            format!(
                "Partial rollback: {} succeeded, {} failed",
                self.rolled_back.len(),
                self.failed.len()
            )
        }
    }
}

/// Undo every record in `journal`, newest first, and mark it rolled back.
///
/// A record that cannot be undone is reported and the rest are still
/// attempted.
pub fn rollback_journal(graph: &mut StationGraph, journal: &mut Journal) -> RollbackResult {
    let mut result = RollbackResult::new();

    for record in journal.records().iter().rev() {
        let undo = match record {
            JournalRecord::BranchEntryWritten {
                station,
                direction,
                previous,
                ..
            } => graph
                .set_branch_entry(station, *direction, previous.clone())
                .map(|_| ()),
            JournalRecord::NeighboursSwapped { station, direction } => {
                graph.swap_neighbours(station, *direction)
            }
        };

        match undo {
            Ok(()) => {
                tracing::debug!(station = %record.station(), "rolled back write");
                result.record_success(record.station().clone());
            }
            Err(source) => {
                tracing::error!(station = %record.station(), error = %source, "rollback failed");
                result.record_failure(RollbackError::CannotRestore {
                    station: record.station().clone(),
                    source,
                });
            }
        }
    }

    journal.rollback();
    result
}
