//! engine::ledger
//!
//! Event ledger and observer notification.
//!
//! # Architecture
//!
//! Every dispatched mutation that reaches the executor produces exactly one
//! event: `Committed` when it applied, `Aborted` when it was rolled back.
//! No-op edits never reach the executor and produce none.
//!
//! Events go to two places:
//! - the editor's bounded in-memory [`EventLedger`] (most recent first out)
//! - every subscribed [`GraphObserver`], synchronously, before dispatch
//!   returns
//!
//! **Important:** The ledger is an audit trail for this session only. It is
//! not an undo history.
//!
//! # Example
//!
//! ```
//! use branchwork::engine::ledger::{Event, EventLedger};
//!
//! let mut ledger = EventLedger::new(2);
//! ledger.append(Event::aborted("op-1", "UPDATE_STATION_BRANCH_POS", "no pair"));
//! ledger.append(Event::aborted("op-2", "UPDATE_STATION_BRANCH_POS", "no pair"));
//! ledger.append(Event::aborted("op-3", "UPDATE_STATION_BRANCH_POS", "no pair"));
//!
//! assert_eq!(ledger.len(), 2);
//! assert_eq!(ledger.latest().and_then(|e| e.op_id()), Some("op-3"));
//! ```

use std::collections::VecDeque;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::core::types::StationId;

/// An event in the ledger.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// Operation completed and verified.
    Committed {
        /// Operation ID (matches journal).
        op_id: String,
        /// Command that was applied.
        command: String,
        /// Stations written, sorted.
        touched: Vec<StationId>,
        /// Fingerprint before operation.
        fingerprint_before: String,
        /// Fingerprint after operation.
        fingerprint_after: String,
        /// Graph revision after operation.
        revision: u64,
        /// Timestamp.
        timestamp: String,
    },

    /// Operation was rolled back.
    Aborted {
        /// Operation ID.
        op_id: String,
        /// Command that failed.
        command: String,
        /// Reason for abort.
        reason: String,
        /// Timestamp.
        timestamp: String,
    },
}

fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

impl Event {
    /// Create a Committed event.
    pub fn committed(
        op_id: impl Into<String>,
        command: impl Into<String>,
        touched: Vec<StationId>,
        fingerprint_before: impl Into<String>,
        fingerprint_after: impl Into<String>,
        revision: u64,
    ) -> Self {
        Event::Committed {
            op_id: op_id.into(),
            command: command.into(),
            touched,
            fingerprint_before: fingerprint_before.into(),
            fingerprint_after: fingerprint_after.into(),
            revision,
            timestamp: now(),
        }
    }

    /// Create an Aborted event.
    pub fn aborted(op_id: impl Into<String>, command: impl Into<String>, reason: impl Into<String>) -> Self {
        Event::Aborted {
            op_id: op_id.into(),
            command: command.into(),
            reason: reason.into(),
            timestamp: now(),
        }
    }

    pub fn op_id(&self) -> Option<&str> {
        match self {
            Event::Committed { op_id, .. } | Event::Aborted { op_id, .. } => Some(op_id),
        }
    }

    pub fn command(&self) -> &str {
        match self {
            Event::Committed { command, .. } | Event::Aborted { command, .. } => command,
        }
    }

    /// Get the post-operation fingerprint, if this event carries one.
    pub fn fingerprint_after(&self) -> Option<&str> {
        match self {
            Event::Committed {
                fingerprint_after, ..
            } => Some(fingerprint_after),
            Event::Aborted { .. } => None,
        }
    }

    pub fn is_committed(&self) -> bool {
        matches!(self, Event::Committed { .. })
    }

    /// Serialize to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Receives events as mutations are applied or aborted.
///
/// Any `FnMut(&Event)` closure is an observer.
pub trait GraphObserver {
    fn notify(&mut self, event: &Event);
}

impl<F> GraphObserver for F
where
    F: FnMut(&Event),
{
    fn notify(&mut self, event: &Event) {
        self(event)
    }
}

/// Bounded in-memory event ledger.
///
/// Holds at most `limit` events; appending past the limit drops the oldest.
#[derive(Debug, Clone)]
pub struct EventLedger {
    events: VecDeque<Event>,
    limit: usize,
}

impl EventLedger {
    /// Create a ledger holding at most `limit` events (at least one).
    pub fn new(limit: usize) -> Self {
        let limit = limit.max(1);
        Self {
            events: VecDeque::with_capacity(limit.min(64)),
            limit,
        }
    }

    /// Append an event, evicting the oldest if the ledger is full.
    pub fn append(&mut self, event: Event) {
        if self.events.len() == self.limit {
            self.events.pop_front();
        }
        self.events.push_back(event);
    }

    /// Most recent event.
    pub fn latest(&self) -> Option<&Event> {
        self.events.back()
    }

    /// Up to `count` most recent events, newest first.
    pub fn recent(&self, count: usize) -> impl Iterator<Item = &Event> {
        self.events.iter().rev().take(count)
    }

    /// All retained events, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Event> {
        self.events.iter()
    }

    /// Fingerprint recorded by the most recent Committed event.
    pub fn last_committed_fingerprint(&self) -> Option<&str> {
        self.events.iter().rev().find_map(Event::fingerprint_after)
    }

    /// Retained events belonging to `op_id`.
    pub fn events_for_op<'a>(&'a self, op_id: &'a str) -> impl Iterator<Item = &'a Event> + 'a {
        self.events.iter().filter(move |e| e.op_id() == Some(op_id))
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }
}
