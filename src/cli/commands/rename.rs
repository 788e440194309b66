//! rename command - Rename a unit and everything that refers to it
//!
//! # Steps
//!
//! 1. Check the rename is possible (names differ, target unit absent)
//! 2. Move the unit folder `<old>/` to `<new>/`
//! 3. Patch both packaging scripts and run the platform one
//! 4. Run the engine's five declaration phases
//!
//! Steps 2 and 3 are optional. A failed script run is a warning; every
//! other failure stops the command and is reported with the steps that
//! already happened.

use anyhow::{Context as _, Result};
use serde::Serialize;

use super::{display_path, unit_name, Workspace};
use crate::core::process::SystemRunner;
use crate::core::scripts::{self, RunOutcome, ScriptReport};
use crate::engine::{Context, Propagator, RenameReport, RenameRequest, RoutePolicy};
use crate::ui::output;

/// Options for [`rename`].
#[derive(Debug, Clone, Default)]
pub struct RenameOptions {
    /// Explicit route path (`--route`).
    pub route: Option<String>,
    /// Keep the current route path (`--keep-route`).
    pub keep_route: bool,
    /// Move the unit folder.
    pub folder: bool,
    /// Patch the packaging scripts.
    pub scripts: bool,
    /// Run the packaging script after patching; `None` uses the config.
    pub run: Option<bool>,
}

impl RenameOptions {
    /// Folder move, script patch and run all enabled.
    pub fn all() -> Self {
        Self {
            folder: true,
            scripts: true,
            ..Self::default()
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
enum FolderStep {
    Skipped,
    Moved,
    Absent,
}

#[derive(Debug, Serialize)]
struct RenameSummary {
    folder: FolderStep,
    #[serde(skip_serializing_if = "Option::is_none")]
    scripts: Option<ScriptReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    declarations: Option<RenameReport>,
}

/// Rename unit `old` to `new`.
///
/// # Arguments
///
/// * `ctx` - Execution context
/// * `old` - Current unit name
/// * `new` - New unit name
/// * `options` - Route policy and which optional steps to run
pub fn rename(ctx: &Context, old: &str, new: &str, options: &RenameOptions) -> Result<()> {
    let ws = Workspace::open(ctx)?;
    let verbosity = ws.verbosity;
    let old = unit_name(old)?;
    let new = unit_name(new)?;

    let _lock = ws.lock()?;
    let propagator = Propagator::new(&ws.paths, &SystemRunner);
    propagator.check_rename(&old, &new)?;

    let mut summary = RenameSummary {
        folder: FolderStep::Skipped,
        scripts: None,
        declarations: None,
    };

    if options.folder {
        let moved = propagator
            .rename_folder(&old, &new)
            .with_context(|| format!("Failed to move folder '{}' to '{}'", old, new))?;
        if moved {
            summary.folder = FolderStep::Moved;
            output::success(format!("Moved folder {}/ -> {}/", old, new), verbosity);
        } else {
            summary.folder = FolderStep::Absent;
            output::warn(format!("no folder named '{}'; skipping folder move", old), verbosity);
        }
    }

    if options.scripts {
        let run = options.run.unwrap_or_else(|| ws.config.run_scripts());
        output::debug(format!("patching packaging scripts (run: {})", run), verbosity);
        let report = scripts::patch_and_run(&SystemRunner, &ws.paths, &old, &new, run);
        report_scripts(&ws, &report);
        summary.scripts = Some(report);
    }

    let route = match (&options.route, options.keep_route) {
        (Some(path), _) => RoutePolicy::Explicit(path.clone()),
        (None, true) => RoutePolicy::Preserve,
        (None, false) => ws.config.route_on_rename().into(),
    };
    let request = RenameRequest::new(old.clone(), new.clone())
        .with_route(route)
        .with_build_cmd(ws.config.build_cmd())
        .with_packager(ws.config.packager());
    output::debug(format!("rename request: {:?}", request), verbosity);

    let result = propagator.rename(&request);
    if let Ok(report) = &result {
        if report.route_from_template {
            output::warn(
                format!(
                    "route for '{}' was generated from the built-in template; review its HTTP methods",
                    new
                ),
                verbosity,
            );
        }
        output::success(
            format!(
                "Renamed {} -> {} (environment {}, route {})",
                old, new, report.environment, report.route_path
            ),
            verbosity,
        );
    }

    summary.declarations = result.as_ref().ok().cloned();
    if ctx.json {
        output::json(&summary)?;
    }

    result.map(|_| ()).map_err(|e| -> anyhow::Error {
        if matches!(summary.folder, FolderStep::Moved) {
            output::warn(format!("folder was already moved to {}/", new), verbosity);
        }
        if summary.scripts.as_ref().is_some_and(|s| s.patched) {
            output::warn("packaging scripts were already patched for the new name", verbosity);
        }
        e.into()
    })
}

fn report_scripts(ws: &Workspace, report: &ScriptReport) {
    let verbosity = ws.verbosity;
    if !report.patched {
        output::warn(
            format!(
                "packaging scripts were not patched: {}",
                report.error.as_deref().unwrap_or("unknown error")
            ),
            verbosity,
        );
        return;
    }

    output::success(
        format!(
            "Patched {} and {}",
            display_path(&ws.paths, &ws.paths.shell_script),
            display_path(&ws.paths, &ws.paths.batch_script)
        ),
        verbosity,
    );

    match &report.run {
        RunOutcome::Skipped => {}
        RunOutcome::Succeeded => output::print("Packaging script finished", verbosity),
        RunOutcome::Failed { code } => output::warn(
            format!(
                "packaging script exited with status {}; check its permissions and output",
                code.map_or_else(|| "unknown".to_string(), |c| c.to_string())
            ),
            verbosity,
        ),
        RunOutcome::Unavailable { message } => output::warn(
            format!("packaging script could not be run ({}); check permissions", message),
            verbosity,
        ),
    }
}
