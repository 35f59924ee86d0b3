//! show command - Display a station's neighbours and branch entries

use anyhow::Result;
use serde_json::json;

use crate::cli::document::ParamDocument;
use crate::cli::Context;
use crate::core::types::StationId;
use crate::ui::output;

/// Show one station.
pub fn show(ctx: &Context, id: &StationId) -> Result<()> {
    let doc = ParamDocument::load(&ctx.file)?;
    let graph = doc.graph()?;
    let station = graph.get(id)?;

    if ctx.json {
        output::json(&json!({
            "id": id,
            "parents": station.parents(),
            "children": station.children(),
            "branch": station.branches(),
        }))?;
    } else {
        output::print(output::format_station(id, station), ctx.verbosity());
    }
    Ok(())
}
