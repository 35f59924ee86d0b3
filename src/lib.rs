//! branchwork - Station branch topology model for transit-line diagrams
//!
//! A line diagram is a trunk of stations with branches that diverge at one
//! station and rejoin at another. branchwork keeps the branch annotations on
//! both ends of every branch consistent while the user edits them:
//! classifying a branch point, choosing which neighbour starts a branch, and
//! moving a branch between the upper and lower slot.
//!
//! # Architecture
//!
//! The codebase follows a strict layered architecture:
//!
//! - [`cli`] - Command-line interface layer (parses args, delegates to engine)
//! - [`engine`] - Orchestrates Request → Plan → Execute → Verify → Record
//! - [`core`] - Domain types, station graph, traversal, verification, config
//! - [`ui`] - User-facing output
//!
//! # Correctness Invariants
//!
//! branchwork maintains the following invariants:
//!
//! 1. Every branch entry has a paired entry at the far end of its run
//! 2. All graph writes flow through a single transactional executor
//! 3. A failed edit leaves the graph exactly as it was
//! 4. Edits that change nothing are never dispatched

pub mod cli;
pub mod core;
pub mod engine;
pub mod ui;
