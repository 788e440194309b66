//! core::paths
//!
//! Centralized path routing for a Fission project.
//!
//! # Architecture
//!
//! Every location the propagation engine touches is computed here from a
//! project root and the loaded [`Config`]. Core operations receive a
//! `FizzPaths` value instead of reading global constants, so tests can point
//! the whole engine at a temporary directory.
//!
//! # Layout
//!
//! - `<root>/<specs_dir>/<kind>-<name>.yaml` - Declarations
//! - `<root>/<name>/` - Unit folder with build sources
//! - `<root>/lin-package.sh`, `<root>/win-package.bat` - Shared packaging scripts
//! - `<root>/.fizz/config.toml` - Project configuration
//! - `<root>/.fizz/lock` - Advisory workspace lock
//!
//! # Example
//!
//! ```
//! use fizzkit::core::paths::FizzPaths;
//! use fizzkit::core::types::{DeclarationKind, UnitName};
//! use std::path::PathBuf;
//!
//! let paths = FizzPaths::with_defaults(PathBuf::from("/proj"));
//! let name = UnitName::new("hello").unwrap();
//!
//! assert_eq!(
//!     paths.declaration_path(DeclarationKind::Function, &name),
//!     PathBuf::from("/proj/specs/function-hello.yaml")
//! );
//! ```

use std::path::{Path, PathBuf};

use crate::core::config::Config;
use crate::core::types::{DeclarationKind, UnitName};

/// Centralized path routing for a project.
///
/// # Invariants
///
/// - All paths are rooted at `root`
/// - No code outside this module joins `specs_dir` or script names by hand
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FizzPaths {
    /// Project root (the directory containing the specs folder).
    pub root: PathBuf,
    /// Directory holding declaration files.
    pub specs_dir: PathBuf,
    /// POSIX packaging script.
    pub shell_script: PathBuf,
    /// Windows packaging script.
    pub batch_script: PathBuf,
}

impl FizzPaths {
    /// Create paths for `root` using the locations from `config`.
    pub fn from_config(root: PathBuf, config: &Config) -> Self {
        Self {
            specs_dir: root.join(config.specs_dir()),
            shell_script: root.join(config.shell_script()),
            batch_script: root.join(config.batch_script()),
            root,
        }
    }

    /// Create paths for `root` using the default layout.
    pub fn with_defaults(root: PathBuf) -> Self {
        Self::from_config(root, &Config::default())
    }

    // =========================================================================
    // Declarations and unit folders
    // =========================================================================

    /// Path of the `kind` declaration for `name`.
    pub fn declaration_path(&self, kind: DeclarationKind, name: &UnitName) -> PathBuf {
        self.specs_dir.join(kind.file_name(name))
    }

    /// Path of the unit folder for `name`.
    pub fn unit_dir(&self, name: &UnitName) -> PathBuf {
        self.root.join(name.as_str())
    }

    // =========================================================================
    // Fizz-owned state
    // =========================================================================

    /// Directory holding fizz's own files: `<root>/.fizz`.
    pub fn fizz_dir(&self) -> PathBuf {
        self.root.join(".fizz")
    }

    /// Path to the advisory lock file: `<root>/.fizz/lock`.
    pub fn lock_path(&self) -> PathBuf {
        self.fizz_dir().join("lock")
    }

    /// Get the root as a Path reference.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Check whether the specs directory exists.
    pub fn has_specs_dir(&self) -> bool {
        self.specs_dir.is_dir()
    }
}
