//! core::config::schema
//!
//! Configuration schema types.
//!
//! # Global Config
//!
//! Located at (in order of precedence):
//! 1. `$FIZZ_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/fizz/config.toml`
//! 3. `~/.fizz/config.toml` (canonical write location)
//!
//! # Project Config
//!
//! Located at `<root>/.fizz/config.toml` (canonical).
//!
//! # Validation
//!
//! Config values are validated after parsing so that an empty script name
//! or packager is reported at load time rather than mid-rename.

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Global configuration (user scope).
///
/// # Example
///
/// ```toml
/// packager = "fission"
/// run_scripts = true
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct GlobalConfig {
    /// Program invoked to regenerate package declarations
    pub packager: Option<String>,

    /// Run the packaging script after patching it
    pub run_scripts: Option<bool>,
}

impl GlobalConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        non_empty("packager", self.packager.as_deref())
    }
}

/// Project configuration.
///
/// # Example
///
/// ```toml
/// specs_dir = "specs"
/// shell_script = "lin-package.sh"
/// batch_script = "win-package.bat"
/// build_cmd = "./build.sh"
/// route_on_rename = "follow-name"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ProjectConfig {
    /// Directory holding the declaration files, relative to the root
    pub specs_dir: Option<String>,

    /// POSIX packaging script, relative to the root
    pub shell_script: Option<String>,

    /// Windows packaging script, relative to the root
    pub batch_script: Option<String>,

    /// Build command handed to the packager
    pub build_cmd: Option<String>,

    /// Program invoked to regenerate package declarations
    pub packager: Option<String>,

    /// What happens to the route path when a unit is renamed
    pub route_on_rename: Option<RouteOnRename>,

    /// Run the packaging script after patching it
    pub run_scripts: Option<bool>,
}

impl ProjectConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        non_empty("specs_dir", self.specs_dir.as_deref())?;
        non_empty("shell_script", self.shell_script.as_deref())?;
        non_empty("batch_script", self.batch_script.as_deref())?;
        non_empty("build_cmd", self.build_cmd.as_deref())?;
        non_empty("packager", self.packager.as_deref())?;
        Ok(())
    }
}

/// Route handling during a unit rename.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum RouteOnRename {
    /// Point the route at `/<new-name>`
    #[default]
    FollowName,
    /// Keep the existing route path
    Preserve,
}

impl std::str::FromStr for RouteOnRename {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "follow-name" => Ok(RouteOnRename::FollowName),
            "preserve" => Ok(RouteOnRename::Preserve),
            other => Err(ConfigError::InvalidValue(format!(
                "invalid route_on_rename '{}', must be one of: follow-name, preserve",
                other
            ))),
        }
    }
}

fn non_empty(key: &str, value: Option<&str>) -> Result<(), ConfigError> {
    match value {
        Some(v) if v.trim().is_empty() => Err(ConfigError::InvalidValue(format!(
            "{} cannot be empty",
            key
        ))),
        _ => Ok(()),
    }
}
