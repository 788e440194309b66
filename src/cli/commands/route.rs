//! route command - Change or remove a unit's route

use anyhow::{Context as _, Result};

use super::{unit_name, Workspace};
use crate::core::declaration::DeleteOutcome;
use crate::core::process::SystemRunner;
use crate::engine::{Context, Propagator};
use crate::ui::output;

/// Point the route of `name` at `path`.
pub fn route_rename(ctx: &Context, name: &str, path: &str) -> Result<()> {
    let ws = Workspace::open(ctx)?;
    let name = unit_name(name)?;
    let _lock = ws.lock()?;

    let report = Propagator::new(&ws.paths, &SystemRunner)
        .rename_route(&name, path)
        .with_context(|| format!("Failed to update route for '{}'", name))?;

    if report.from_template {
        output::warn(
            format!(
                "route for '{}' was generated from the built-in template; review its HTTP methods",
                name
            ),
            ws.verbosity,
        );
    }

    if ctx.json {
        output::json(&report)
    } else {
        output::success(format!("Route for '{}' now at {}", name, report.path), ws.verbosity);
        Ok(())
    }
}

/// Delete the route declaration of `name`.
pub fn route_delete(ctx: &Context, name: &str) -> Result<()> {
    let ws = Workspace::open(ctx)?;
    let name = unit_name(name)?;
    let _lock = ws.lock()?;

    let outcome = Propagator::new(&ws.paths, &SystemRunner)
        .delete_route(&name)
        .with_context(|| format!("Failed to delete route for '{}'", name))?;

    if ctx.json {
        return output::json(&outcome);
    }
    match outcome {
        DeleteOutcome::Deleted => {
            output::success(format!("Deleted route for '{}'", name), ws.verbosity)
        }
        DeleteOutcome::Absent => output::print(format!("No route for '{}'", name), ws.verbosity),
    }
    Ok(())
}
