//! config command - Print the effective configuration

use anyhow::Result;
use serde_json::json;

use super::load_config;
use crate::cli::Context;
use crate::ui::output;

/// Print every setting with precedence applied, plus where it came from.
pub fn config(ctx: &Context) -> Result<()> {
    let config = load_config(ctx)?;
    let global = config.global_config_loaded_from().map(|p| p.display().to_string());
    let project = config.project_config_loaded_from().map(|p| p.display().to_string());

    if ctx.json {
        output::json(&json!({
            "style": config.style(),
            "branch": { "allow_clear": config.allow_clear() },
            "engine": {
                "verify_mutations": config.verify_mutations(),
                "history_limit": config.history_limit(),
            },
            "sources": { "global": global, "project": project },
        }))?;
        return Ok(());
    }

    // Config values are data: print them even under --quiet.
    println!("style = {}", config.style());
    println!("branch.allow_clear = {}", config.allow_clear());
    println!("engine.verify_mutations = {}", config.verify_mutations());
    println!("engine.history_limit = {}", config.history_limit());
    output::print(
        format!("# global: {}", global.as_deref().unwrap_or("(none)")),
        ctx.verbosity(),
    );
    output::print(
        format!("# project: {}", project.as_deref().unwrap_or("(none)")),
        ctx.verbosity(),
    );
    Ok(())
}
