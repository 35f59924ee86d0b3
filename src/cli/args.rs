//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--file <path>` / `-f`: Parameter document to edit
//! - `--debug`: Enable debug logging
//! - `--quiet` / `-q`: Minimal output
//! - `--json`: Machine-readable output
//! - `--dry-run`: Print the plan instead of applying it

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::core::types::{BranchSlot, BranchType, Direction, StationId};

/// Default parameter document name.
pub const DEFAULT_DOCUMENT: &str = "rmg.json";

/// branchwork - Edit branch topology in transit-line diagram documents
#[derive(Parser, Debug)]
#[command(name = "bw")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Parameter document to read and write
    #[arg(short, long, global = true, default_value = DEFAULT_DOCUMENT)]
    pub file: PathBuf,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Print machine-readable JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Show what would be done without writing the document
    #[arg(long, global = true)]
    pub dry_run: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

/// Branch type as accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BranchTypeArg {
    Through,
    Nonthrough,
    /// Clear the branch type
    None,
}

impl BranchTypeArg {
    /// The branch type to set, or `None` to clear.
    pub fn branch_type(self) -> Option<BranchType> {
        match self {
            BranchTypeArg::Through => Some(BranchType::Through),
            BranchTypeArg::Nonthrough => Some(BranchType::NonThrough),
            BranchTypeArg::None => None,
        }
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show a station's neighbours and branch entries
    #[command(
        name = "show",
        after_help = "\
EXAMPLES:
    # Inspect the split station of a loop
    bw show a

    # Same, as JSON
    bw --json show a"
    )]
    Show {
        /// Station id
        station: StationId,
    },

    /// Walk a branch run to its paired endpoint
    #[command(
        name = "endpoint",
        long_about = "Walk a branch run to its paired endpoint.\n\n\
            Starts at the station's branch first neighbour on the given side (or its \
            first listed neighbour when no branch is set) and follows the run until \
            it reaches the station where it rejoins the line."
    )]
    Endpoint {
        /// Station id
        station: StationId,

        /// Side to walk from
        direction: Direction,

        /// Start from this neighbour instead
        #[arg(long)]
        from: Option<StationId>,
    },

    /// Set or clear the branch type at a branch point
    #[command(
        name = "branch-type",
        long_about = "Set or clear the branch type at a branch point.\n\n\
            The paired endpoint at the other end of the branch run is updated \
            in the same operation. Use `none` to clear both ends.",
        after_help = "\
EXAMPLES:
    # Mark the branch leaving station a to the right as a through branch
    bw branch-type a right through

    # Remove it again
    bw branch-type a right none"
    )]
    BranchType {
        /// Station id
        station: StationId,

        /// Side of the station
        direction: Direction,

        /// New branch type
        #[arg(value_enum)]
        branch_type: BranchTypeArg,
    },

    /// Choose which neighbour starts a branch
    #[command(name = "branch-first")]
    BranchFirst {
        /// Station id
        station: StationId,

        /// Side of the station
        direction: Direction,

        /// Neighbour the branch starts at
        neighbour: StationId,
    },

    /// Move a branch to the upper or lower slot
    #[command(name = "branch-pos")]
    BranchPos {
        /// Station id
        station: StationId,

        /// Side of the station
        direction: Direction,

        /// Target slot (upper or lower)
        slot: BranchSlot,
    },

    /// Dispatch a raw mutation command from a JSON file
    #[command(
        name = "apply",
        after_help = "\
EXAMPLES:
    # cmd.json: {\"type\": \"UPDATE_STATION_BRANCH_POS\", \"left\": \"d\", \"right\": \"a\"}
    bw apply cmd.json

    # Read the command from stdin
    bw apply -"
    )]
    Apply {
        /// Command file, or `-` for stdin
        command: PathBuf,
    },

    /// Verify branch topology invariants across the whole document
    #[command(name = "verify")]
    Verify,

    /// Print the effective configuration
    #[command(name = "config")]
    Config,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_branch_type() {
        let cli = Cli::try_parse_from(["bw", "-f", "line.json", "branch-type", "a", "right", "none"]).unwrap();
        assert_eq!(cli.file, PathBuf::from("line.json"));
        let Command::BranchType {
            station,
            direction,
            branch_type,
        } = cli.command
        else {
            panic!("wrong command");
        };
        assert_eq!(station.as_str(), "a");
        assert_eq!(direction, Direction::Right);
        assert_eq!(branch_type.branch_type(), None);
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["bw", "branch-pos", "a", "left", "upper", "--dry-run", "--json"]).unwrap();
        assert!(cli.dry_run);
        assert!(cli.json);
        assert_eq!(cli.file, PathBuf::from(DEFAULT_DOCUMENT));
    }

    #[test]
    fn rejects_bad_direction() {
        assert!(Cli::try_parse_from(["bw", "endpoint", "a", "up"]).is_err());
    }
}
