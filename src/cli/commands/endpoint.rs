//! endpoint command - Walk a branch run to its paired endpoint

use anyhow::{bail, Result};
use serde_json::json;

use crate::cli::document::ParamDocument;
use crate::cli::Context;
use crate::core::traverse::{resolve_pair, walk_branch_run};
use crate::core::types::{Direction, StationId};
use crate::ui::output;

/// Walk from a neighbour of `station` to the end of its branch run.
///
/// Without `--from` the walk starts at the side's branch first neighbour,
/// or at its first listed neighbour when no branch is set.
pub fn endpoint(ctx: &Context, station: &StationId, direction: Direction, from: Option<&StationId>) -> Result<()> {
    let doc = ParamDocument::load(&ctx.file)?;
    let graph = doc.graph()?;
    let near = graph.get(station)?;

    let start = match from {
        Some(id) => {
            if near.index_of(direction, id).is_none() {
                bail!("{} is not a {} neighbour of {}", id, direction, station);
            }
            id.clone()
        }
        None => match near.branch(direction).first().or_else(|| near.neighbours(direction).first()) {
            Some(id) => id.clone(),
            None => bail!("{} has no {} neighbours", station, direction),
        },
    };

    let run = walk_branch_run(&graph, &start, direction)?;
    // Only a two-neighbour side has a paired first neighbour.
    let pair = if near.is_branch_point(direction) {
        resolve_pair(&graph, station, direction, &start).ok()
    } else {
        None
    };
    output::debug(format!("walked {} steps from {}", run.steps(), start), ctx.verbosity());

    if ctx.json {
        output::json(&json!({
            "station": station,
            "direction": direction,
            "start": run.start,
            "path": run.path,
            "endpoint": run.endpoint,
            "far_first": pair.as_ref().map(|p| &p.first),
        }))?;
        return Ok(());
    }

    let mut route: Vec<&str> = vec![station.as_str()];
    route.extend(run.path.iter().map(StationId::as_str));
    route.push(run.endpoint.as_str());
    output::print(format!("endpoint: {}", run.endpoint), ctx.verbosity());
    output::print(format!("route:    {}", route.join(" -> ")), ctx.verbosity());
    if let Some(pair) = pair {
        output::print(format!("paired:   {} via {}", pair.station, pair.first), ctx.verbosity());
    }
    Ok(())
}
