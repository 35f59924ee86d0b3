//! engine
//!
//! Orchestrates the mutation lifecycle: Request -> Plan -> Execute -> Verify -> Record.
//!
//! # Architecture
//!
//! The engine is the central coordinator for all branch edits. An [`Editor`]
//! owns the station graph and is the only way to change it:
//!
//! 1. **Request**: Classification or reconciliation turns a user edit into a
//!    [`Mutation`] command, or into nothing when the edit changes nothing
//! 2. **Plan**: The command is planned against the current graph (pure)
//! 3. **Execute**: The plan runs through the single transactional executor
//! 4. **Verify**: Touched stations are re-verified; new violations roll back
//! 5. **Record**: A ledger event is appended and observers are notified
//!
//! # Lifecycle
//!
//! ```text
//! edit -> [classify | reconcile] -> Mutation -> plan -> execute -> verify -> event
//! ```
//!
//! # Invariants
//!
//! - The graph is only written by [`exec::Executor`]
//! - A dispatch either applies completely (both endpoints) or not at all
//! - No-op edits produce no command, no event and no revision change
//! - Reads borrow the graph; writes need `&mut Editor`
//!
//! # Example
//!
//! ```
//! use branchwork::core::graph::StationGraph;
//! use branchwork::core::types::{BranchType, Direction, StationId};
//! use branchwork::engine::{Editor, Outcome};
//!
//! let id = |s: &str| StationId::new(s).unwrap();
//! let mut graph = StationGraph::new();
//! graph.connect(&id("a"), &id("b"));
//! graph.connect(&id("a"), &id("c"));
//! graph.connect(&id("b"), &id("d"));
//! graph.connect(&id("c"), &id("d"));
//!
//! let mut editor = Editor::new(graph);
//! let outcome = editor.set_branch_type(&id("a"), Direction::Right, BranchType::Through).unwrap();
//! assert!(matches!(outcome, Outcome::Applied { .. }));
//!
//! // The paired endpoint was written too.
//! let far = editor.station(&id("d")).unwrap().branch(Direction::Left);
//! assert_eq!(far.branch_type(), Some(BranchType::Through));
//! ```

pub mod classify;
pub mod command;
pub mod exec;
pub mod ledger;
pub mod plan;
pub mod reconcile;
pub mod rollback;

// Re-exports for convenience
pub use command::{BranchFirstTarget, Mutation};
pub use exec::{ExecuteError, ExecuteResult, Executor};
pub use ledger::{Event, EventLedger, GraphObserver};
pub use plan::{Plan, PlanError, PlanStep};
pub use rollback::{rollback_journal, RollbackError, RollbackResult};

use thiserror::Error;

use crate::core::config::{Config, DiagramStyle, DEFAULT_HISTORY_LIMIT};
use crate::core::graph::{GraphError, Station, StationGraph};
use crate::core::ops::journal::OpId;
use crate::core::types::{BranchSlot, BranchType, Direction, Fingerprint, StationId};

/// Errors from the editor.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A read named an absent station.
    #[error(transparent)]
    Graph(#[from] GraphError),

    /// The edit was rejected before any write.
    #[error(transparent)]
    Plan(#[from] PlanError),

    /// The edit was rolled back.
    #[error(transparent)]
    Execute(#[from] ExecuteError),
}

/// Settings that shape editing behavior.
#[derive(Debug, Clone, PartialEq)]
pub struct EditorSettings {
    /// Diagram style being edited.
    pub style: DiagramStyle,
    /// Whether a branch type may be cleared.
    pub allow_clear: bool,
    /// Verify touched stations after each mutation.
    pub verify_mutations: bool,
    /// Ledger capacity.
    pub history_limit: usize,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            style: DiagramStyle::default(),
            allow_clear: true,
            verify_mutations: true,
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

impl EditorSettings {
    /// Settings from merged configuration.
    pub fn from_config(config: &Config) -> Self {
        Self {
            style: config.style(),
            allow_clear: config.allow_clear(),
            verify_mutations: config.verify_mutations(),
            history_limit: config.history_limit(),
        }
    }
}

/// What a dispatch did.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The edit changed nothing and was not dispatched.
    Unchanged,
    /// The edit was applied.
    Applied {
        op_id: OpId,
        command: &'static str,
        /// Stations written, sorted.
        touched: Vec<StationId>,
        fingerprint: Fingerprint,
    },
}

impl Outcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Outcome::Applied { .. })
    }
}

/// The branch editor.
///
/// Owns the station graph, the event ledger and the observers.
pub struct Editor {
    graph: StationGraph,
    settings: EditorSettings,
    ledger: EventLedger,
    observers: Vec<Box<dyn GraphObserver>>,
}

impl std::fmt::Debug for Editor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Editor")
            .field("stations", &self.graph.len())
            .field("revision", &self.graph.revision())
            .field("settings", &self.settings)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl Editor {
    /// Create an editor with default settings.
    pub fn new(graph: StationGraph) -> Self {
        Self::with_settings(graph, EditorSettings::default())
    }

    /// Create an editor with explicit settings.
    pub fn with_settings(graph: StationGraph, settings: EditorSettings) -> Self {
        Self {
            graph,
            ledger: EventLedger::new(settings.history_limit),
            settings,
            observers: Vec::new(),
        }
    }

    pub fn graph(&self) -> &StationGraph {
        &self.graph
    }

    /// Give up the editor and keep the graph.
    pub fn into_graph(self) -> StationGraph {
        self.graph
    }

    pub fn station(&self, id: &StationId) -> Result<&Station, EngineError> {
        Ok(self.graph.get(id)?)
    }

    pub fn neighbours(&self, id: &StationId, direction: Direction) -> Result<&[StationId], EngineError> {
        Ok(self.graph.neighbours(id, direction)?)
    }

    pub fn settings(&self) -> &EditorSettings {
        &self.settings
    }

    pub fn ledger(&self) -> &EventLedger {
        &self.ledger
    }

    /// Register an observer. It sees every event from now on.
    pub fn subscribe(&mut self, observer: impl GraphObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Set the branch type at a side and at its paired endpoint.
    pub fn set_branch_type(
        &mut self,
        station: &StationId,
        direction: Direction,
        branch_type: BranchType,
    ) -> Result<Outcome, EngineError> {
        let request = classify::set_branch_type(&self.graph, station, direction, branch_type)?;
        self.dispatch_request(request)
    }

    /// Clear the branch type at a side and at its paired endpoint.
    pub fn clear_branch_type(&mut self, station: &StationId, direction: Direction) -> Result<Outcome, EngineError> {
        let request = classify::clear_branch_type(&self.graph, &self.settings, station, direction)?;
        self.dispatch_request(request)
    }

    /// Choose the neighbour a branch starts at, mirrored at the far endpoint.
    pub fn set_branch_first(
        &mut self,
        station: &StationId,
        direction: Direction,
        new_first: &StationId,
    ) -> Result<Outcome, EngineError> {
        let request = reconcile::set_branch_first(&self.graph, station, direction, new_first)?;
        self.dispatch_request(request)
    }

    /// Move a branch to the upper or lower slot at both endpoints.
    pub fn set_branch_pos(
        &mut self,
        station: &StationId,
        direction: Direction,
        slot: BranchSlot,
    ) -> Result<Outcome, EngineError> {
        let request = reconcile::set_branch_pos(&self.graph, &self.settings, station, direction, slot)?;
        self.dispatch_request(request)
    }

    /// Plan a command without executing it.
    pub fn preview(&self, mutation: &Mutation) -> Result<Plan, EngineError> {
        Ok(mutation.plan(&self.graph, &self.settings)?)
    }

    /// Apply a command.
    ///
    /// A command whose plan is empty returns [`Outcome::Unchanged`] without
    /// an event.
    ///
    /// # Errors
    ///
    /// - `Plan` if the command does not fit the graph (nothing written)
    /// - `Execute` if execution was rolled back (an `Aborted` event is
    ///   recorded)
    pub fn dispatch(&mut self, mutation: Mutation) -> Result<Outcome, EngineError> {
        let plan = mutation.plan(&self.graph, &self.settings)?;
        if plan.is_empty() {
            tracing::debug!(command = mutation.name(), "no changes, skipping dispatch");
            return Ok(Outcome::Unchanged);
        }

        let executed = Executor::new(&mut self.graph)
            .verify_mutations(self.settings.verify_mutations)
            .execute(&plan);

        match executed {
            Ok(result) => {
                let touched: Vec<StationId> = result.journal.touched_stations().into_iter().collect();
                tracing::info!(
                    op_id = %plan.op_id,
                    command = mutation.name(),
                    touched = touched.len(),
                    revision = result.revision,
                    "committed"
                );
                self.record(Event::committed(
                    plan.op_id.as_str(),
                    mutation.name(),
                    touched.clone(),
                    result.fingerprint_before.as_str(),
                    result.fingerprint_after.as_str(),
                    result.revision,
                ));
                Ok(Outcome::Applied {
                    op_id: plan.op_id,
                    command: mutation.name(),
                    touched,
                    fingerprint: result.fingerprint_after,
                })
            }
            Err(e) => {
                tracing::warn!(op_id = %plan.op_id, command = mutation.name(), error = %e, "aborted");
                self.record(Event::aborted(plan.op_id.as_str(), mutation.name(), e.to_string()));
                Err(e.into())
            }
        }
    }

    fn dispatch_request(&mut self, request: Option<Mutation>) -> Result<Outcome, EngineError> {
        match request {
            Some(mutation) => self.dispatch(mutation),
            None => Ok(Outcome::Unchanged),
        }
    }

    fn record(&mut self, event: Event) {
        for observer in &mut self.observers {
            observer.notify(&event);
        }
        self.ledger.append(event);
    }
}
