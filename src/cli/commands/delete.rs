//! delete command - Delete a unit's declarations and folder
//!
//! Removes `function-<name>.yaml`, `route-<name>.yaml` and
//! `package-<name>.yaml`, then the unit folder. Anything already gone is
//! skipped, so running the command twice succeeds both times.
//!
//! # Integrity Contract
//!
//! - Every removal is attempted even when an earlier one fails
//! - The command fails only if something that exists could not be removed

use anyhow::{bail, Result};

use super::{display_path, unit_name, Workspace};
use crate::core::process::SystemRunner;
use crate::engine::{Context, Propagator, Removal};
use crate::ui::{output, prompts};

/// Delete a unit.
///
/// # Arguments
///
/// * `ctx` - Execution context
/// * `name` - Unit to delete
/// * `force` - Skip confirmation prompts
pub fn delete(ctx: &Context, name: &str, force: bool) -> Result<()> {
    let ws = Workspace::open(ctx)?;
    let verbosity = ws.verbosity;
    let name = unit_name(name)?;

    // Confirm unless --force (interactive confirmation before taking the lock)
    if !force && ctx.interactive {
        let message = format!("Delete unit '{}' (3 declarations and folder {}/)?", name, name);
        if !prompts::confirm(&message, false, true)? {
            output::print("Aborted.", verbosity);
            return Ok(());
        }
    }

    let _lock = ws.lock()?;
    let report = Propagator::new(&ws.paths, &SystemRunner).delete_unit(&name);

    if ctx.json {
        output::json(&report)?;
    } else {
        for file in &report.files {
            let shown = display_path(&ws.paths, &file.path);
            match &file.removal {
                Removal::Removed => output::print(format!("Deleted {}", shown), verbosity),
                Removal::Absent => output::debug(format!("{} already absent", shown), verbosity),
                Removal::Failed { message } => output::error(message),
            }
        }
        match &report.folder {
            Removal::Removed => output::print(format!("Deleted folder {}/", name), verbosity),
            Removal::Absent => output::debug(format!("no folder {}/", name), verbosity),
            Removal::Failed { message } => output::error(message),
        }
    }

    if !report.succeeded() {
        bail!("Failed to delete unit '{}' completely", name);
    }
    output::success(format!("Deleted unit '{}'", name), verbosity);
    Ok(())
}
