//! ui::output
//!
//! Output formatting and display.
//!
//! # Design
//!
//! Output is formatted consistently and respects the quiet flag.
//! When `--json` is enabled, output is machine-readable JSON.

use std::fmt::Display;

use serde::Serialize;

use crate::core::graph::Station;
use crate::core::types::{Direction, StationId};

/// Output verbosity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    /// Quiet mode - minimal output
    Quiet,
    /// Normal mode - standard output
    Normal,
    /// Debug mode - verbose output
    Debug,
}

impl Verbosity {
    /// Create verbosity from flags.
    pub fn from_flags(quiet: bool, debug: bool) -> Self {
        if quiet {
            Verbosity::Quiet
        } else if debug {
            Verbosity::Debug
        } else {
            Verbosity::Normal
        }
    }
}

/// Print a message (respects quiet mode).
pub fn print(message: impl Display, verbosity: Verbosity) {
    if verbosity != Verbosity::Quiet {
        println!("{}", message);
    }
}

/// Print a debug message (only in debug mode).
pub fn debug(message: impl Display, verbosity: Verbosity) {
    if verbosity == Verbosity::Debug {
        eprintln!("[debug] {}", message);
    }
}

/// Print an error message (always shown).
pub fn error(message: impl Display) {
    eprintln!("error: {}", message);
}

/// Print a warning message (respects quiet mode).
pub fn warn(message: impl Display, verbosity: Verbosity) {
    if verbosity != Verbosity::Quiet {
        eprintln!("warning: {}", message);
    }
}

/// Print a value as pretty JSON (always shown; `--json` output is data).
pub fn json<T: Serialize>(value: &T) -> serde_json::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Format a list of items.
pub fn format_list<T: Display>(items: &[T], prefix: &str) -> String {
    items
        .iter()
        .map(|item| format!("{}{}", prefix, item))
        .collect::<Vec<_>>()
        .join("\n")
}

fn join_ids(ids: &[StationId]) -> String {
    if ids.is_empty() {
        "-".to_string()
    } else {
        ids.iter().map(StationId::as_str).collect::<Vec<_>>().join(", ")
    }
}

/// Format a station's neighbours and branch entries.
///
/// ```text
/// a
///   parents:  linestart
///   children: b, c
///   left:     -
///   right:    through via c
/// ```
pub fn format_station(id: &StationId, station: &Station) -> String {
    let mut out = format!(
        "{}\n  parents:  {}\n  children: {}",
        id,
        join_ids(station.parents()),
        join_ids(station.children())
    );
    for direction in Direction::ALL {
        out.push_str(&format!(
            "\n  {:<9} {}",
            format!("{}:", direction),
            station.branch(direction)
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::graph::StationGraph;
    use crate::core::types::{BranchEntry, BranchType};

    #[test]
    fn verbosity_from_flags() {
        assert_eq!(Verbosity::from_flags(true, true), Verbosity::Quiet);
        assert_eq!(Verbosity::from_flags(false, true), Verbosity::Debug);
        assert_eq!(Verbosity::from_flags(false, false), Verbosity::Normal);
    }

    #[test]
    fn format_list_prefixes() {
        assert_eq!(format_list(&["a", "b"], "- "), "- a\n- b");
    }

    #[test]
    fn formats_station() {
        let id = |s: &str| StationId::new(s).unwrap();
        let mut graph = StationGraph::new();
        graph.connect(&id("linestart"), &id("a"));
        graph.connect(&id("a"), &id("b"));
        graph.connect(&id("a"), &id("c"));
        graph
            .set_branch_entry(&id("a"), Direction::Right, BranchEntry::new(BranchType::Through, id("c")))
            .unwrap();

        let text = format_station(&id("a"), graph.get(&id("a")).unwrap());
        assert_eq!(
            text,
            "a\n  parents:  linestart\n  children: b, c\n  left:     -\n  right:    through via c"
        );
    }
}
