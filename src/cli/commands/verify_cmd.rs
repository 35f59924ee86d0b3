//! verify command - Check branch topology invariants

use anyhow::{bail, Result};
use serde_json::json;

use crate::cli::document::ParamDocument;
use crate::cli::Context;
use crate::core::verify::fast_verify;
use crate::ui::output;

/// Verify the whole document. Fails when any invariant is violated.
pub fn verify(ctx: &Context) -> Result<()> {
    let doc = ParamDocument::load(&ctx.file)?;
    let graph = doc.graph()?;
    let result = fast_verify(&graph);

    if ctx.json {
        let errors: Vec<String> = result.errors.iter().map(ToString::to_string).collect();
        output::json(&json!({
            "ok": result.ok,
            "stations": graph.len(),
            "fingerprint": graph.fingerprint().as_str(),
            "errors": errors,
        }))?;
    } else if result.ok {
        output::print(format!("ok: {} stations verified", graph.len()), ctx.verbosity());
    } else {
        println!("{}", output::format_list(&result.errors, "  - "));
    }

    if !result.ok {
        bail!("{} violation(s) found", result.errors.len());
    }
    Ok(())
}
