//! scripts command - Patch the packaging scripts for a renamed unit

use anyhow::{bail, Result};

use super::{unit_name, Workspace};
use crate::core::process::SystemRunner;
use crate::core::scripts::{self, RunOutcome};
use crate::engine::Context;
use crate::ui::output;

/// Patch both packaging scripts from `old` to `new`, then run the platform
/// script unless `no_run` is set or config disables it.
///
/// A failed run is only a warning; a failed patch is an error.
pub fn scripts(ctx: &Context, old: &str, new: &str, no_run: bool) -> Result<()> {
    let ws = Workspace::open(ctx)?;
    let old = unit_name(old)?;
    let new = unit_name(new)?;
    let _lock = ws.lock()?;

    let run = !no_run && ws.config.run_scripts();
    let report = scripts::patch_and_run(&SystemRunner, &ws.paths, &old, &new, run);

    if ctx.json {
        output::json(&report)?;
    }
    if !report.patched {
        bail!(
            "Failed to patch packaging scripts: {}",
            report.error.as_deref().unwrap_or("unknown error")
        );
    }

    output::success(format!("Patched packaging scripts: {} -> {}", old, new), ws.verbosity);
    match report.run {
        RunOutcome::Failed { code } => output::warn(
            format!(
                "packaging script exited with status {}; check permissions",
                code.map_or_else(|| "unknown".to_string(), |c| c.to_string())
            ),
            ws.verbosity,
        ),
        RunOutcome::Unavailable { message } => output::warn(
            format!("packaging script could not be run ({}); check permissions", message),
            ws.verbosity,
        ),
        RunOutcome::Succeeded | RunOutcome::Skipped => {}
    }
    Ok(())
}
