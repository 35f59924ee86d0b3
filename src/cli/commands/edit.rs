//! Branch edit commands: branch-type, branch-first, branch-pos, apply.

use std::io::Read;
use std::path::Path;

use anyhow::{Context as _, Result};

use super::Session;
use crate::cli::args::BranchTypeArg;
use crate::cli::Context;
use crate::core::types::{BranchSlot, Direction, StationId};
use crate::engine::{classify, reconcile, Mutation};

/// Set or clear the branch type at a side.
pub fn branch_type(ctx: &Context, station: &StationId, direction: Direction, branch_type: BranchTypeArg) -> Result<()> {
    let session = Session::open(ctx)?;
    let graph = session.editor.graph();
    let request = match branch_type.branch_type() {
        Some(t) => classify::set_branch_type(graph, station, direction, t)?,
        None => classify::clear_branch_type(graph, session.editor.settings(), station, direction)?,
    };
    session.apply(ctx, request)
}

/// Choose the first neighbour of a branch.
pub fn branch_first(ctx: &Context, station: &StationId, direction: Direction, neighbour: &StationId) -> Result<()> {
    let session = Session::open(ctx)?;
    let request = reconcile::set_branch_first(session.editor.graph(), station, direction, neighbour)?;
    session.apply(ctx, request)
}

/// Move a branch to the upper or lower slot.
pub fn branch_pos(ctx: &Context, station: &StationId, direction: Direction, slot: BranchSlot) -> Result<()> {
    let session = Session::open(ctx)?;
    let request = reconcile::set_branch_pos(
        session.editor.graph(),
        session.editor.settings(),
        station,
        direction,
        slot,
    )?;
    session.apply(ctx, request)
}

/// Dispatch a raw command read from `path` (`-` for stdin).
pub fn apply(ctx: &Context, path: &Path) -> Result<()> {
    let raw = if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read command from stdin")?;
        buf
    } else {
        std::fs::read_to_string(path).with_context(|| format!("Failed to read command file '{}'", path.display()))?
    };
    let mutation: Mutation = serde_json::from_str(&raw).context("Invalid command")?;

    let session = Session::open(ctx)?;
    session.apply(ctx, Some(mutation))
}
