//! ui
//!
//! User interaction utilities.
//!
//! # Modules
//!
//! - [`output`] - Output formatting and display
//!
//! # Design
//!
//! All user-facing output goes through this module so quiet, debug and
//! JSON modes behave the same in every command. Diagnostic logging goes
//! through `tracing` instead and never reaches stdout.

pub mod output;
