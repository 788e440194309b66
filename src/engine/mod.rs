//! engine
//!
//! Consistency propagation across a unit's declarations.
//!
//! # Architecture
//!
//! The engine is the only layer that changes more than one declaration in
//! a single operation. It sits between the CLI and the core modules:
//!
//! - [`rename`] - Five-phase rename of a unit (package, function, route)
//! - [`delete`] - Removal of a unit's declarations and folder
//! - [`route`] - Route path changes without a rename
//!
//! Every operation borrows a [`Propagator`], which bundles the project
//! paths with the [`ProcessRunner`] used for the packaging tool. Tests
//! substitute a fake runner; the CLI passes [`SystemRunner`].
//!
//! # Invariants
//!
//! - Preconditions are checked before the first mutation
//! - There is no rollback: a failed phase leaves earlier phases applied,
//!   and the error names both
//! - Every operation returns a serializable report
//!
//! # Example
//!
//! ```ignore
//! use fizzkit::core::process::SystemRunner;
//! use fizzkit::engine::{Propagator, RenameRequest};
//!
//! let propagator = Propagator::new(&paths, &SystemRunner);
//! let report = propagator.rename(&RenameRequest::new(old, new))?;
//! println!("route now at {}", report.route_path);
//! ```
//!
//! [`SystemRunner`]: crate::core::process::SystemRunner

pub mod delete;
pub mod rename;
pub mod route;

pub use delete::{DeleteReport, FileRemoval, Removal};
pub use rename::{Phase, PhaseError, RenameError, RenameReport, RenameRequest, RoutePolicy};
pub use route::{RouteError, RouteReport};

use std::path::PathBuf;

use crate::core::declaration::DeclarationStore;
use crate::core::paths::FizzPaths;
use crate::core::process::ProcessRunner;

/// Execution context for commands.
///
/// Contains global settings derived from CLI flags that affect command behavior.
#[derive(Debug, Clone)]
pub struct Context {
    /// Working directory override.
    pub cwd: Option<PathBuf>,
    /// Debug logging enabled.
    pub debug: bool,
    /// Quiet mode (minimal output).
    pub quiet: bool,
    /// Print reports as JSON instead of text.
    pub json: bool,
    /// Interactive mode enabled.
    pub interactive: bool,
}

impl Default for Context {
    fn default() -> Self {
        Self {
            cwd: None,
            debug: false,
            quiet: false,
            json: false,
            interactive: true,
        }
    }
}

/// Propagates changes across a project's declarations.
#[derive(Clone, Copy)]
pub struct Propagator<'a> {
    paths: &'a FizzPaths,
    runner: &'a dyn ProcessRunner,
}

impl<'a> Propagator<'a> {
    /// Create a propagator for `paths` that runs external tools with `runner`.
    pub fn new(paths: &'a FizzPaths, runner: &'a dyn ProcessRunner) -> Self {
        Self { paths, runner }
    }

    /// The project paths.
    pub fn paths(&self) -> &'a FizzPaths {
        self.paths
    }

    /// The declaration store for this project.
    pub fn store(&self) -> DeclarationStore<'a> {
        DeclarationStore::new(self.paths)
    }

    pub(crate) fn runner(&self) -> &'a dyn ProcessRunner {
        self.runner
    }
}

impl std::fmt::Debug for Propagator<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Propagator")
            .field("root", &self.paths.root)
            .finish_non_exhaustive()
    }
}
