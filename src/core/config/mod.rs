//! core::config
//!
//! Configuration schema and loading.
//!
//! # Overview
//!
//! Fizz has two configuration scopes:
//! - **Global**: User-level settings
//! - **Project**: Settings for one Fission project root
//!
//! # Precedence
//!
//! Configuration values are resolved in this order (later overrides earlier):
//! 1. Default values
//! 2. Global config file
//! 3. Project config file
//! 4. CLI flags (not handled here)
//!
//! # Global Config Locations
//!
//! Searched in order:
//! 1. `$FIZZ_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/fizz/config.toml`
//! 3. `~/.fizz/config.toml` (canonical write location)
//!
//! # Project Config Location
//!
//! `<root>/.fizz/config.toml`
//!
//! # Example
//!
//! ```no_run
//! use fizzkit::core::config::Config;
//! use std::path::Path;
//!
//! let config = Config::load(Some(Path::new("/path/to/project"))).unwrap();
//!
//! println!("Specs: {}", config.specs_dir());
//! println!("Packager: {}", config.packager());
//! ```

pub mod schema;

pub use schema::{GlobalConfig, ProjectConfig, RouteOnRename};

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default directory holding declaration files.
pub const DEFAULT_SPECS_DIR: &str = "specs";
/// Default POSIX packaging script.
pub const DEFAULT_SHELL_SCRIPT: &str = "lin-package.sh";
/// Default Windows packaging script.
pub const DEFAULT_BATCH_SCRIPT: &str = "win-package.bat";
/// Default build command handed to the packager.
pub const DEFAULT_BUILD_CMD: &str = "./build.sh";
/// Default packaging tool.
pub const DEFAULT_PACKAGER: &str = "fission";

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{}': {source}", .path.display())]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{}': {message}", .path.display())]
    ParseError { path: PathBuf, message: String },

    #[error("failed to write config file '{}': {source}", .path.display())]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config value: {0}")]
    InvalidValue(String),

    #[error("home directory not found")]
    NoHomeDir,
}

/// Merged configuration from all sources.
///
/// Accessors apply precedence automatically: project config overrides
/// global config, which overrides built-in defaults.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Global configuration
    pub global: GlobalConfig,
    /// Project configuration (if one was found)
    pub project: Option<ProjectConfig>,
    global_path: Option<PathBuf>,
    project_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from default locations.
    ///
    /// If `project_root` is provided, also loads project-specific config.
    ///
    /// # Errors
    ///
    /// Returns an error if config files exist but cannot be parsed.
    /// Missing config files are not an error (defaults are used).
    pub fn load(project_root: Option<&Path>) -> Result<Config, ConfigError> {
        let (global, global_path) = Self::load_global()?;

        let (project, project_path) = match project_root {
            Some(root) => Self::load_project(root)?,
            None => (None, None),
        };

        global.validate()?;
        if let Some(ref p) = project {
            p.validate()?;
        }

        Ok(Config {
            global,
            project,
            global_path,
            project_path,
        })
    }

    /// Build a config from already-parsed parts.
    pub fn from_parts(global: GlobalConfig, project: Option<ProjectConfig>) -> Self {
        Self {
            global,
            project,
            global_path: None,
            project_path: None,
        }
    }

    fn load_global() -> Result<(GlobalConfig, Option<PathBuf>), ConfigError> {
        if let Ok(path) = std::env::var("FIZZ_CONFIG") {
            let path = PathBuf::from(path);
            if path.exists() {
                let config = Self::read_toml(&path)?;
                return Ok((config, Some(path)));
            }
        }

        if let Ok(xdg_home) = std::env::var("XDG_CONFIG_HOME") {
            let path = PathBuf::from(xdg_home).join("fizz/config.toml");
            if path.exists() {
                let config = Self::read_toml(&path)?;
                return Ok((config, Some(path)));
            }
        }

        if let Some(home) = dirs::home_dir() {
            let path = home.join(".fizz/config.toml");
            if path.exists() {
                let config = Self::read_toml(&path)?;
                return Ok((config, Some(path)));
            }
        }

        Ok((GlobalConfig::default(), None))
    }

    fn load_project(
        root: &Path,
    ) -> Result<(Option<ProjectConfig>, Option<PathBuf>), ConfigError> {
        let path = Self::project_config_path(root);
        if !path.exists() {
            return Ok((None, None));
        }
        let config = Self::read_toml(&path)?;
        Ok((Some(config), Some(path)))
    }

    fn read_toml<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Get the canonical path for global config.
    ///
    /// Returns `~/.fizz/config.toml`.
    pub fn global_config_path() -> Result<PathBuf, ConfigError> {
        let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
        Ok(home.join(".fizz/config.toml"))
    }

    /// Get the canonical path for project config.
    pub fn project_config_path(root: &Path) -> PathBuf {
        root.join(".fizz/config.toml")
    }

    /// Write project config atomically.
    ///
    /// Creates parent directories if needed.
    pub fn write_project(root: &Path, config: &ProjectConfig) -> Result<PathBuf, ConfigError> {
        config.validate()?;
        let path = Self::project_config_path(root);
        Self::write_config_atomic(&path, config)?;
        Ok(path)
    }

    fn write_config_atomic<T: serde::Serialize>(
        path: &Path,
        config: &T,
    ) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::WriteError {
                path: path.to_path_buf(),
                source: e,
            })?;
        }

        let contents =
            toml::to_string_pretty(config).map_err(|e| ConfigError::InvalidValue(e.to_string()))?;

        // Write to temp file in same directory (for atomic rename)
        let temp_path = path.with_extension("toml.tmp");
        let mut file = fs::File::create(&temp_path).map_err(|e| ConfigError::WriteError {
            path: temp_path.clone(),
            source: e,
        })?;

        file.write_all(contents.as_bytes())
            .map_err(|e| ConfigError::WriteError {
                path: temp_path.clone(),
                source: e,
            })?;

        file.sync_all().map_err(|e| ConfigError::WriteError {
            path: temp_path.clone(),
            source: e,
        })?;

        fs::rename(&temp_path, path).map_err(|e| ConfigError::WriteError {
            path: path.to_path_buf(),
            source: e,
        })?;

        Ok(())
    }

    // =========================================================================
    // Accessor methods with precedence
    // =========================================================================

    /// Directory holding declaration files, relative to the project root.
    ///
    /// Defaults to `specs`.
    pub fn specs_dir(&self) -> &str {
        self.project
            .as_ref()
            .and_then(|p| p.specs_dir.as_deref())
            .unwrap_or(DEFAULT_SPECS_DIR)
    }

    /// POSIX packaging script. Defaults to `lin-package.sh`.
    pub fn shell_script(&self) -> &str {
        self.project
            .as_ref()
            .and_then(|p| p.shell_script.as_deref())
            .unwrap_or(DEFAULT_SHELL_SCRIPT)
    }

    /// Windows packaging script. Defaults to `win-package.bat`.
    pub fn batch_script(&self) -> &str {
        self.project
            .as_ref()
            .and_then(|p| p.batch_script.as_deref())
            .unwrap_or(DEFAULT_BATCH_SCRIPT)
    }

    /// Build command handed to the packager. Defaults to `./build.sh`.
    pub fn build_cmd(&self) -> &str {
        self.project
            .as_ref()
            .and_then(|p| p.build_cmd.as_deref())
            .unwrap_or(DEFAULT_BUILD_CMD)
    }

    /// Packaging tool. Project overrides global; defaults to `fission`.
    pub fn packager(&self) -> &str {
        self.project
            .as_ref()
            .and_then(|p| p.packager.as_deref())
            .or(self.global.packager.as_deref())
            .unwrap_or(DEFAULT_PACKAGER)
    }

    /// Route handling on rename. Defaults to following the new name.
    pub fn route_on_rename(&self) -> RouteOnRename {
        self.project
            .as_ref()
            .and_then(|p| p.route_on_rename)
            .unwrap_or_default()
    }

    /// Whether the packaging script runs after it is patched.
    ///
    /// Defaults to `true`.
    pub fn run_scripts(&self) -> bool {
        self.project
            .as_ref()
            .and_then(|p| p.run_scripts)
            .or(self.global.run_scripts)
            .unwrap_or(true)
    }

    /// Get the path to the loaded global config file.
    pub fn global_config_loaded_from(&self) -> Option<&Path> {
        self.global_path.as_deref()
    }

    /// Get the path to the loaded project config file.
    pub fn project_config_loaded_from(&self) -> Option<&Path> {
        self.project_path.as_deref()
    }
}
