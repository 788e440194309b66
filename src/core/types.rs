//! core::types
//!
//! Strong types for core domain concepts.
//!
//! # Types
//!
//! - [`UnitName`] - Validated name of a serverless unit
//! - [`DeclarationKind`] - The three declaration kinds stored per unit
//!
//! # Validation
//!
//! Unit names end up in file names (`function-<name>.yaml`), folder names
//! and shell script text, so they are validated once at construction time.
//!
//! # Examples
//!
//! ```
//! use fizzkit::core::types::{DeclarationKind, UnitName};
//!
//! let name = UnitName::new("hello-py").unwrap();
//! assert_eq!(DeclarationKind::Route.file_name(&name), "route-hello-py.yaml");
//!
//! assert!(UnitName::new("").is_err());
//! assert!(UnitName::new("a/b").is_err());
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from type validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid unit name: {0}")]
    InvalidUnitName(String),
}

/// A validated unit name.
///
/// Unit names must:
/// - Not be empty
/// - Not be `.` or `..`
/// - Not contain whitespace, `/` or `\`
///
/// # Example
///
/// ```
/// use fizzkit::core::types::UnitName;
///
/// let name = UnitName::new("orders_api").unwrap();
/// assert_eq!(name.as_str(), "orders_api");
///
/// assert!(UnitName::new("has space").is_err());
/// assert!(UnitName::new("..").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UnitName(String);

impl UnitName {
    /// Create a new validated unit name.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidUnitName` if the name cannot be used as a
    /// file name segment.
    pub fn new(name: impl Into<String>) -> Result<Self, TypeError> {
        let name = name.into();
        Self::validate(&name)?;
        Ok(Self(name))
    }

    fn validate(name: &str) -> Result<(), TypeError> {
        if name.is_empty() {
            return Err(TypeError::InvalidUnitName(
                "unit name cannot be empty".into(),
            ));
        }

        if name == "." || name == ".." {
            return Err(TypeError::InvalidUnitName(format!(
                "unit name cannot be '{}'",
                name
            )));
        }

        if name.chars().any(char::is_whitespace) {
            return Err(TypeError::InvalidUnitName(format!(
                "unit name '{}' cannot contain whitespace",
                name
            )));
        }

        if name.contains('/') || name.contains('\\') {
            return Err(TypeError::InvalidUnitName(format!(
                "unit name '{}' cannot contain path separators",
                name
            )));
        }

        Ok(())
    }

    /// Get the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Name of the source archive the packaging tool consumes.
    pub fn archive_name(&self) -> String {
        format!("{}.zip", self.0)
    }
}

impl fmt::Display for UnitName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for UnitName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for UnitName {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<UnitName> for String {
    fn from(name: UnitName) -> Self {
        name.0
    }
}

/// The kind of a declaration file.
///
/// Each unit owns exactly one declaration of each kind, stored as
/// `<specs-dir>/<prefix>-<name>.yaml`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeclarationKind {
    /// Invocation binding (`function-<name>.yaml`).
    Function,
    /// HTTP trigger (`route-<name>.yaml`).
    Route,
    /// Source archive and build settings (`package-<name>.yaml`).
    Package,
}

impl DeclarationKind {
    /// All kinds, in the order they are deleted.
    pub const ALL: [DeclarationKind; 3] = [
        DeclarationKind::Function,
        DeclarationKind::Route,
        DeclarationKind::Package,
    ];

    /// File name prefix for this kind.
    pub fn prefix(self) -> &'static str {
        match self {
            DeclarationKind::Function => "function",
            DeclarationKind::Route => "route",
            DeclarationKind::Package => "package",
        }
    }

    /// File name of this kind's declaration for `name`.
    pub fn file_name(self, name: &UnitName) -> String {
        format!("{}-{}.yaml", self.prefix(), name)
    }
}

impl fmt::Display for DeclarationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_unit_names() {
        assert!(UnitName::new("foo").is_ok());
        assert!(UnitName::new("hello-world").is_ok());
        assert!(UnitName::new("fn_2").is_ok());
        assert!(UnitName::new("v1.2").is_ok());
    }

    #[test]
    fn invalid_unit_names() {
        assert!(UnitName::new("").is_err());
        assert!(UnitName::new(".").is_err());
        assert!(UnitName::new("..").is_err());
        assert!(UnitName::new("a b").is_err());
        assert!(UnitName::new("a\tb").is_err());
        assert!(UnitName::new("a/b").is_err());
        assert!(UnitName::new("a\\b").is_err());
    }

    #[test]
    fn archive_name_appends_zip() {
        let name = UnitName::new("foo").unwrap();
        assert_eq!(name.archive_name(), "foo.zip");
    }

    #[test]
    fn unit_name_serde_rejects_invalid() {
        let ok: UnitName = serde_json::from_str("\"foo\"").unwrap();
        assert_eq!(ok.as_str(), "foo");
        assert!(serde_json::from_str::<UnitName>("\"a/b\"").is_err());
    }

    #[test]
    fn declaration_file_names() {
        let name = UnitName::new("foo").unwrap();
        assert_eq!(DeclarationKind::Function.file_name(&name), "function-foo.yaml");
        assert_eq!(DeclarationKind::Route.file_name(&name), "route-foo.yaml");
        assert_eq!(DeclarationKind::Package.file_name(&name), "package-foo.yaml");
    }

    #[test]
    fn error_display_formatting() {
        let err = UnitName::new("").unwrap_err();
        assert!(err.to_string().contains("invalid unit name"));
    }
}
