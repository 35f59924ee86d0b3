//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each command handler:
//! 1. Loads the parameter document and configuration
//! 2. Turns its arguments into an engine request
//! 3. Dispatches (or previews, under `--dry-run`) and saves the document
//! 4. Formats and displays output
//!
//! Handlers do NOT write the station graph directly.

mod config_cmd;
mod edit;
mod endpoint;
mod show;
mod verify_cmd;

// Re-export command functions for testing and direct invocation
pub use config_cmd::config;
pub use edit::{apply, branch_first, branch_pos, branch_type};
pub use endpoint::endpoint;
pub use show::show;
pub use verify_cmd::verify;

use anyhow::{Context as _, Result};
use serde_json::json;

use super::document::ParamDocument;
use super::Context;
use crate::cli::args::Command;
use crate::core::config::Config;
use crate::engine::{Editor, EditorSettings, Mutation, Outcome};
use crate::ui::output;

/// Dispatch a command to its handler.
pub fn dispatch(command: Command, ctx: &Context) -> Result<()> {
    match command {
        Command::Show { station } => show(ctx, &station),
        Command::Endpoint {
            station,
            direction,
            from,
        } => endpoint(ctx, &station, direction, from.as_ref()),
        Command::BranchType {
            station,
            direction,
            branch_type: kind,
        } => branch_type(ctx, &station, direction, kind),
        Command::BranchFirst {
            station,
            direction,
            neighbour,
        } => branch_first(ctx, &station, direction, &neighbour),
        Command::BranchPos {
            station,
            direction,
            slot,
        } => branch_pos(ctx, &station, direction, slot),
        Command::Apply { command } => apply(ctx, &command),
        Command::Verify => verify(ctx),
        Command::Config => config(ctx),
    }
}

/// Load configuration for the document's directory, reporting warnings.
pub(crate) fn load_config(ctx: &Context) -> Result<Config> {
    let project_dir = super::document::project_dir_of(&ctx.file);
    let result = Config::load(Some(&project_dir)).context("Failed to load config")?;
    for warning in &result.warnings {
        output::warn(&warning.message, ctx.verbosity());
    }
    Ok(result.config)
}

/// A loaded document with an editor over its stations.
pub(crate) struct Session {
    pub doc: ParamDocument,
    pub editor: Editor,
}

impl Session {
    pub fn open(ctx: &Context) -> Result<Self> {
        let doc = ParamDocument::load(&ctx.file)?;
        let config = load_config(ctx)?;
        let settings = EditorSettings::from_config(&config);
        output::debug(format!("style = {}", settings.style), ctx.verbosity());

        let editor = Editor::with_settings(doc.graph()?, settings);
        Ok(Self { doc, editor })
    }

    /// Dispatch `request` (or preview it under `--dry-run`) and save.
    pub fn apply(mut self, ctx: &Context, request: Option<Mutation>) -> Result<()> {
        let Some(mutation) = request else {
            return report_unchanged(ctx);
        };

        if ctx.dry_run {
            let plan = self.editor.preview(&mutation)?;
            if ctx.json {
                output::json(&plan)?;
            } else {
                output::print(plan.preview(), ctx.verbosity());
            }
            return Ok(());
        }

        let command = mutation.name();
        let outcome = self
            .editor
            .dispatch(mutation)
            .with_context(|| format!("{} failed", command))?;

        match outcome {
            Outcome::Unchanged => report_unchanged(ctx),
            Outcome::Applied {
                op_id,
                command,
                touched,
                fingerprint,
            } => {
                self.doc.replace_graph(self.editor.graph())?;
                self.doc.save()?;

                if ctx.json {
                    output::json(&json!({
                        "status": "applied",
                        "op_id": op_id.as_str(),
                        "command": command,
                        "touched": touched,
                        "fingerprint": fingerprint.as_str(),
                    }))?;
                } else {
                    let touched: Vec<&str> = touched.iter().map(|s| s.as_str()).collect();
                    output::print(format!("Applied {}: {}", command, touched.join(", ")), ctx.verbosity());
                }
                Ok(())
            }
        }
    }
}

fn report_unchanged(ctx: &Context) -> Result<()> {
    if ctx.json {
        output::json(&json!({ "status": "unchanged" }))?;
    } else {
        output::print("No changes.", ctx.verbosity());
    }
    Ok(())
}
