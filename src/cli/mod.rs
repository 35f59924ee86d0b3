//! cli
//!
//! Command-line interface layer for branchwork.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Install the diagnostic log subscriber
//! - Delegate to command handlers
//! - Does NOT write the station graph directly
//!
//! # Architecture
//!
//! The CLI layer is thin. It parses arguments via clap, loads the parameter
//! document and configuration, and hands edits to the [`crate::engine`]
//! editor. All station graph changes flow through the engine's executor.

pub mod args;
pub mod commands;
pub mod document;

pub use args::Cli;

use std::path::PathBuf;

use anyhow::Result;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::ui::output::Verbosity;

/// Execution context for commands.
///
/// Contains global settings derived from CLI flags that affect command behavior.
#[derive(Debug, Clone)]
pub struct Context {
    /// Parameter document path.
    pub file: PathBuf,
    /// Debug logging enabled.
    pub debug: bool,
    /// Quiet mode (minimal output).
    pub quiet: bool,
    /// JSON output.
    pub json: bool,
    /// Plan only, never write the document.
    pub dry_run: bool,
}

impl Context {
    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.quiet, self.debug)
    }
}

/// Install the stderr log subscriber.
///
/// `RUST_LOG` wins when set; otherwise `--debug` turns on this crate's
/// debug events and everything else stays at warnings.
fn init_logging(debug: bool) {
    let default = if debug { "warn,branchwork=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .try_init();
}

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub fn run() -> Result<()> {
    let cli = Cli::parse_args();
    init_logging(cli.debug);

    let ctx = Context {
        file: cli.file.clone(),
        debug: cli.debug,
        quiet: cli.quiet,
        json: cli.json,
        dry_run: cli.dry_run,
    };

    // Dispatch to command handler
    commands::dispatch(cli.command, &ctx)
}
