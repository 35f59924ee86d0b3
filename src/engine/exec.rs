//! engine::exec
//!
//! The single transactional executor.
//!
//! # Architecture
//!
//! The Executor is the ONLY component allowed to write the station graph.
//! All branch edits flow through this module.
//!
//! # Executor Contract
//!
//! The executor MUST:
//! 1. Record a baseline verification of the stations the plan touches
//! 2. Apply each step as one primitive write and journal it
//! 3. If a step fails: roll back every journaled write, newest first
//! 4. After the last step: verify the touched stations again
//! 5. If verification finds a violation absent from the baseline: roll back
//! 6. Otherwise commit the journal
//!
//! Violations that were already present before the operation do not fail
//! it. An edit is judged on what it breaks, not on the state it found.
//!
//! # Invariants
//!
//! - Only the Executor writes the graph
//! - All writes are journaled
//! - A failed execution leaves the graph fingerprint unchanged
//!
//! # Example
//!
//! ```
//! use branchwork::core::graph::StationGraph;
//! use branchwork::core::ops::journal::OpId;
//! use branchwork::core::types::{Direction, StationId};
//! use branchwork::engine::exec::Executor;
//! use branchwork::engine::plan::{Plan, PlanStep};
//!
//! let id = |s: &str| StationId::new(s).unwrap();
//! let mut graph = StationGraph::new();
//! graph.connect(&id("a"), &id("b"));
//! graph.connect(&id("a"), &id("c"));
//! graph.connect(&id("b"), &id("d"));
//! graph.connect(&id("c"), &id("d"));
//!
//! let plan = Plan::new(OpId::new(), "UPDATE_STATION_BRANCH_POS").with_steps([
//!     PlanStep::SwapNeighbours { station: id("a"), direction: Direction::Right },
//!     PlanStep::SwapNeighbours { station: id("d"), direction: Direction::Left },
//! ]);
//!
//! let result = Executor::new(&mut graph).execute(&plan).unwrap();
//! assert_eq!(result.journal.records().len(), 2);
//! assert_eq!(graph.neighbours(&id("a"), Direction::Right).unwrap(), &[id("c"), id("b")]);
//! ```

use thiserror::Error;

use super::plan::{Plan, PlanStep};
use super::rollback::{rollback_journal, RollbackResult};
use crate::core::graph::{GraphError, StationGraph};
use crate::core::ops::journal::Journal;
use crate::core::types::Fingerprint;
use crate::core::verify::{verify_stations, VerifyError};

/// Errors from execution.
///
/// Every variant is returned after the graph has been rolled back.
#[derive(Debug, Error)]
pub enum ExecuteError {
    /// A primitive write failed.
    #[error("step {index} ({description}) failed: {source}; {rollback}")]
    StepFailed {
        /// 1-based step number
        index: usize,
        description: String,
        #[source]
        source: GraphError,
        /// Rollback summary
        rollback: String,
    },

    /// The operation left the graph violating an invariant.
    #[error("verification failed after {command}: {}", summarize(.violations))]
    Verification {
        command: String,
        /// Violations the operation introduced
        violations: Vec<VerifyError>,
    },
}

fn summarize(violations: &[VerifyError]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result of a successful execution.
#[derive(Debug)]
pub struct ExecuteResult {
    /// The committed journal.
    pub journal: Journal,
    /// Fingerprint before the first write.
    pub fingerprint_before: Fingerprint,
    /// Fingerprint after the last write.
    pub fingerprint_after: Fingerprint,
    /// Graph revision after the last write.
    pub revision: u64,
}

/// The executor.
///
/// Applies plans to the graph with transactional semantics.
pub struct Executor<'a> {
    graph: &'a mut StationGraph,
    verify: bool,
}

impl<'a> Executor<'a> {
    /// Create a new executor. Post-verification is on.
    pub fn new(graph: &'a mut StationGraph) -> Self {
        Self { graph, verify: true }
    }

    /// Turn post-verification on or off.
    pub fn verify_mutations(mut self, verify: bool) -> Self {
        self.verify = verify;
        self
    }

    /// Execute a plan.
    ///
    /// # Errors
    ///
    /// - `StepFailed` if a write names a missing station
    /// - `Verification` if the result violates an invariant the graph did
    ///   not already violate
    pub fn execute(&mut self, plan: &Plan) -> Result<ExecuteResult, ExecuteError> {
        let fingerprint_before = self.graph.fingerprint();
        let revision_before = self.graph.revision();
        let mut journal = Journal::with_op_id(plan.op_id.clone(), &plan.command);

        if plan.is_empty() {
            tracing::debug!(op_id = %plan.op_id, "empty plan, nothing to execute");
            journal.commit();
            return Ok(ExecuteResult {
                journal,
                fingerprint_after: fingerprint_before.clone(),
                fingerprint_before,
                revision: self.graph.revision(),
            });
        }

        let touched = plan.touched_stations();
        let baseline = if self.verify {
            verify_stations(self.graph, &touched).errors
        } else {
            Vec::new()
        };

        for (i, step) in plan.steps.iter().enumerate() {
            tracing::debug!(op_id = %plan.op_id, step = i + 1, "{}", step.description());

            if let Err(source) = self.apply_step(step, &mut journal) {
                let rollback = self.rollback(&mut journal, revision_before);
                return Err(ExecuteError::StepFailed {
                    index: i + 1,
                    description: step.description(),
                    source,
                    rollback: rollback.summary(),
                });
            }
        }

        if self.verify {
            let violations: Vec<VerifyError> = verify_stations(self.graph, &touched)
                .errors
                .into_iter()
                .filter(|e| !baseline.contains(e))
                .collect();
            if !violations.is_empty() {
                tracing::warn!(op_id = %plan.op_id, count = violations.len(), "post-verification failed");
                self.rollback(&mut journal, revision_before);
                return Err(ExecuteError::Verification {
                    command: plan.command.clone(),
                    violations,
                });
            }
        }

        journal.commit();
        Ok(ExecuteResult {
            journal,
            fingerprint_before,
            fingerprint_after: self.graph.fingerprint(),
            revision: self.graph.revision(),
        })
    }

    fn apply_step(&mut self, step: &PlanStep, journal: &mut Journal) -> Result<(), GraphError> {
        match step {
            PlanStep::SetBranchEntry {
                station,
                direction,
                entry,
            } => {
                let previous = self.graph.set_branch_entry(station, *direction, entry.clone())?;
                journal.record_branch_write(station.clone(), *direction, previous, entry.clone());
            }
            PlanStep::SwapNeighbours { station, direction } => {
                self.graph.swap_neighbours(station, *direction)?;
                journal.record_swap(station.clone(), *direction);
            }
        }
        Ok(())
    }

    /// Undo the journal. A complete rollback also restores the revision.
    fn rollback(&mut self, journal: &mut Journal, revision: u64) -> RollbackResult {
        let result = rollback_journal(self.graph, journal);
        if result.complete {
            self.graph.restore_revision(revision);
        }
        tracing::debug!(op_id = %journal.op_id, "{}", result.summary());
        result
    }
}
