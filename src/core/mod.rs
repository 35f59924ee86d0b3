//! core
//!
//! Core domain types, the station graph, and its read-side algorithms.
//!
//! # Modules
//!
//! - [`types`] - Strong types: StationId, Direction, BranchEntry, etc.
//! - [`graph`] - Station arena and primitive writes
//! - [`traverse`] - Branch-run walking and endpoint pairing
//! - [`verify`] - Topology invariant checks
//! - [`ops`] - Operation journaling
//! - [`config`] - Configuration schema and loading
//!
//! # Design Principles
//!
//! - Strong typing prevents invalid states at compile time
//! - Neighbours are identifiers into the arena, never references
//! - All verification is deterministic

pub mod config;
pub mod graph;
pub mod ops;
pub mod traverse;
pub mod types;
pub mod verify;
