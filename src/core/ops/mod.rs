//! core::ops
//!
//! Operation journaling.
//!
//! # Modules
//!
//! - [`journal`] - Per-operation record of primitive graph writes
//!
//! # Architecture
//!
//! Every mutation applied by the executor:
//! 1. Creates an operation journal before the first write
//! 2. Records each primitive write with the value it replaced
//! 3. On success: marks the journal committed
//! 4. On failure: replays the journal backwards to restore the graph

pub mod journal;

pub use journal::{Journal, JournalRecord, OpId, OpPhase};
