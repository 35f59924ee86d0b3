//! core::ops::journal
//!
//! Operation journaling for atomic mutations.
//!
//! A journal lives for the duration of one dispatched command. Each
//! primitive write the executor applies is appended together with the value
//! it replaced, so a failed operation can be undone exactly by replaying the
//! records in reverse.
//!
//! # Invariants
//!
//! - A record is appended only after its write succeeded
//! - Records are kept in application order
//! - A journal leaves `InProgress` exactly once

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::types::{BranchEntry, Direction, StationId};

/// Unique identifier for an operation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OpId(String);

impl OpId {
    /// Generate a new unique operation id.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Create an OpId from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the string representation.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for OpId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for OpId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle phase of a journaled operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpPhase {
    InProgress,
    Committed,
    RolledBack,
}

/// One applied primitive write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum JournalRecord {
    /// A branch entry was replaced.
    BranchEntryWritten {
        station: StationId,
        direction: Direction,
        previous: BranchEntry,
        written: BranchEntry,
    },

    /// A neighbour list was reversed.
    NeighboursSwapped {
        station: StationId,
        direction: Direction,
    },
}

impl JournalRecord {
    pub fn station(&self) -> &StationId {
        match self {
            JournalRecord::BranchEntryWritten { station, .. }
            | JournalRecord::NeighboursSwapped { station, .. } => station,
        }
    }
}

/// Journal of one operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Journal {
    pub op_id: OpId,
    pub command: String,
    pub started_at: DateTime<Utc>,
    pub phase: OpPhase,
    records: Vec<JournalRecord>,
}

impl Journal {
    /// Start a journal for `command` with a fresh op id.
    pub fn new(command: impl Into<String>) -> Self {
        Self::with_op_id(OpId::new(), command)
    }

    /// Start a journal under an existing op id.
    pub fn with_op_id(op_id: OpId, command: impl Into<String>) -> Self {
        Self {
            op_id,
            command: command.into(),
            started_at: Utc::now(),
            phase: OpPhase::InProgress,
            records: Vec::new(),
        }
    }

    pub fn record_branch_write(
        &mut self,
        station: StationId,
        direction: Direction,
        previous: BranchEntry,
        written: BranchEntry,
    ) {
        self.records.push(JournalRecord::BranchEntryWritten {
            station,
            direction,
            previous,
            written,
        });
    }

    pub fn record_swap(&mut self, station: StationId, direction: Direction) {
        self.records
            .push(JournalRecord::NeighboursSwapped { station, direction });
    }

    /// Records in application order.
    pub fn records(&self) -> &[JournalRecord] {
        &self.records
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Stations written by this operation, deduplicated and sorted.
    pub fn touched_stations(&self) -> BTreeSet<StationId> {
        self.records.iter().map(|r| r.station().clone()).collect()
    }

    pub fn commit(&mut self) {
        self.phase = OpPhase::Committed;
    }

    pub fn rollback(&mut self) {
        self.phase = OpPhase::RolledBack;
    }
}
