//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each command handler:
//! 1. Opens the workspace (project root, config, paths)
//! 2. Validates unit names
//! 3. Takes the workspace lock if it mutates anything
//! 4. Calls the engine and formats its report
//!
//! Handlers do NOT edit declarations directly.

mod completion;
mod config_cmd;
mod delete;
mod list;
mod rename;
mod route;
mod scripts;

// Re-export command functions for testing and direct invocation
pub use completion::completion;
pub use config_cmd::{list as config_list, set as config_set};
pub use delete::delete;
pub use list::list;
pub use rename::{rename, RenameOptions};
pub use route::{route_delete, route_rename};
pub use scripts::scripts;

use std::path::PathBuf;

use anyhow::{Context as _, Result};

use crate::cli::args::{Command, ConfigAction, RouteAction};
use crate::core::config::Config;
use crate::core::declaration::StoreError;
use crate::core::ops::WorkspaceLock;
use crate::core::paths::FizzPaths;
use crate::core::types::UnitName;
use crate::engine::Context;
use crate::ui::output::{self, Verbosity};

/// Dispatch a parsed command to its handler.
pub fn dispatch(command: Command, ctx: &Context) -> Result<()> {
    match command {
        Command::List => list::list(ctx),
        Command::Rename {
            old,
            new,
            route,
            keep_route,
            no_folder,
            no_scripts,
            no_run,
        } => {
            let options = RenameOptions {
                route,
                keep_route,
                folder: !no_folder,
                scripts: !no_scripts,
                run: if no_run { Some(false) } else { None },
            };
            rename::rename(ctx, &old, &new, &options)
        }
        Command::Delete { name, force } => delete::delete(ctx, &name, force),
        Command::Route { action } => match action {
            RouteAction::Rename { name, path } => route::route_rename(ctx, &name, &path),
            RouteAction::Delete { name } => route::route_delete(ctx, &name),
        },
        Command::Scripts { old, new, no_run } => scripts::scripts(ctx, &old, &new, no_run),
        Command::Config { action } => match action {
            ConfigAction::Set { key, value } => config_cmd::set(ctx, &key, &value),
            ConfigAction::List => config_cmd::list(ctx),
        },
        Command::Completion { shell } => completion::completion(shell),
    }
}

/// A project opened for a command: merged config and the paths built from it.
pub(crate) struct Workspace {
    pub config: Config,
    pub paths: FizzPaths,
    pub verbosity: Verbosity,
}

impl Workspace {
    /// Open the project at `--cwd` or the current directory.
    ///
    /// Fails if the specs directory does not exist there.
    pub(crate) fn open(ctx: &Context) -> Result<Self> {
        let root = project_root(ctx)?;
        let verbosity = verbosity(ctx);

        let config = Config::load(Some(&root)).context("Failed to load config")?;
        let paths = FizzPaths::from_config(root, &config);
        output::debug(format!("project root: {}", paths.root.display()), verbosity);
        if !paths.has_specs_dir() {
            return Err(StoreError::SpecsDirMissing(paths.specs_dir.clone()).into());
        }

        Ok(Self {
            config,
            paths,
            verbosity,
        })
    }

    /// Take the workspace lock for a mutating command.
    pub(crate) fn lock(&self) -> Result<WorkspaceLock> {
        let lock = WorkspaceLock::acquire(&self.paths).context("Failed to lock workspace")?;
        output::debug(format!("holding {}", lock.path().display()), self.verbosity);
        Ok(lock)
    }
}

pub(crate) fn project_root(ctx: &Context) -> Result<PathBuf> {
    match &ctx.cwd {
        Some(cwd) => Ok(cwd.clone()),
        None => std::env::current_dir().context("Failed to determine current directory"),
    }
}

pub(crate) fn verbosity(ctx: &Context) -> Verbosity {
    Verbosity::from_flags(ctx.quiet, ctx.debug, ctx.json)
}

pub(crate) fn unit_name(name: &str) -> Result<UnitName> {
    UnitName::new(name).with_context(|| format!("Invalid unit name '{}'", name))
}

/// Project-relative form of `path` for messages.
pub(crate) fn display_path(paths: &FizzPaths, path: &std::path::Path) -> String {
    path.strip_prefix(&paths.root)
        .unwrap_or(path)
        .display()
        .to_string()
}
