//! engine::delete
//!
//! Remove a unit: its three declarations and its folder.
//!
//! Every removal is attempted even if an earlier one failed, and each is
//! reported separately. Something that is already gone counts as removed,
//! so deleting the same unit twice reports success both times.

use std::fs;
use std::io;
use std::path::PathBuf;

use serde::Serialize;

use super::Propagator;
use crate::core::declaration::DeleteOutcome;
use crate::core::types::{DeclarationKind, UnitName};

/// Outcome of removing one file or folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Removal {
    Removed,
    Absent,
    Failed { message: String },
}

impl Removal {
    pub fn is_failure(&self) -> bool {
        matches!(self, Removal::Failed { .. })
    }
}

impl From<DeleteOutcome> for Removal {
    fn from(outcome: DeleteOutcome) -> Self {
        match outcome {
            DeleteOutcome::Deleted => Removal::Removed,
            DeleteOutcome::Absent => Removal::Absent,
        }
    }
}

/// One declaration file and what happened to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileRemoval {
    pub kind: DeclarationKind,
    pub path: PathBuf,
    #[serde(flatten)]
    pub removal: Removal,
}

/// Result of [`Propagator::delete_unit`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeleteReport {
    pub name: UnitName,
    pub files: Vec<FileRemoval>,
    pub folder: Removal,
}

impl DeleteReport {
    /// True when nothing failed to be removed.
    pub fn succeeded(&self) -> bool {
        !self.folder.is_failure() && self.files.iter().all(|f| !f.removal.is_failure())
    }
}

impl Propagator<'_> {
    /// Delete the function, route and package declarations of `name`, then
    /// the unit folder.
    pub fn delete_unit(&self, name: &UnitName) -> DeleteReport {
        let store = self.store();

        let files = DeclarationKind::ALL
            .iter()
            .map(|&kind| {
                let path = store.path(kind, name);
                let removal = match store.delete(&path) {
                    Ok(outcome) => outcome.into(),
                    Err(e) => Removal::Failed {
                        message: e.to_string(),
                    },
                };
                FileRemoval { kind, path, removal }
            })
            .collect();

        let dir = self.paths().unit_dir(name);
        let folder = match fs::remove_dir_all(&dir) {
            Ok(()) => Removal::Removed,
            Err(e) if e.kind() == io::ErrorKind::NotFound => Removal::Absent,
            Err(e) => Removal::Failed {
                message: format!("{}: {}", dir.display(), e),
            },
        };

        DeleteReport {
            name: name.clone(),
            files,
            folder,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::paths::FizzPaths;
    use crate::core::process::SystemRunner;
    use tempfile::TempDir;

    fn name(s: &str) -> UnitName {
        UnitName::new(s).unwrap()
    }

    #[test]
    fn deletes_everything_then_reports_absent() {
        let dir = TempDir::new().unwrap();
        let paths = FizzPaths::with_defaults(dir.path().to_path_buf());
        fs::create_dir_all(&paths.specs_dir).unwrap();
        for kind in DeclarationKind::ALL {
            fs::write(paths.declaration_path(kind, &name("foo")), "spec: {}\n").unwrap();
        }
        fs::create_dir_all(paths.unit_dir(&name("foo")).join("src")).unwrap();
        fs::write(paths.unit_dir(&name("foo")).join("src/main.py"), "").unwrap();

        let propagator = Propagator::new(&paths, &SystemRunner);

        let first = propagator.delete_unit(&name("foo"));
        assert!(first.succeeded());
        assert_eq!(first.folder, Removal::Removed);
        assert!(first.files.iter().all(|f| f.removal == Removal::Removed));
        assert!(!paths.unit_dir(&name("foo")).exists());

        let second = propagator.delete_unit(&name("foo"));
        assert!(second.succeeded());
        assert_eq!(second.folder, Removal::Absent);
        assert!(second.files.iter().all(|f| f.removal == Removal::Absent));
    }

    #[test]
    fn partial_unit_is_deleted() {
        let dir = TempDir::new().unwrap();
        let paths = FizzPaths::with_defaults(dir.path().to_path_buf());
        fs::create_dir_all(&paths.specs_dir).unwrap();
        fs::write(paths.declaration_path(DeclarationKind::Route, &name("foo")), "{}\n").unwrap();

        let report = Propagator::new(&paths, &SystemRunner).delete_unit(&name("foo"));
        assert!(report.succeeded());
        let removed: Vec<_> = report
            .files
            .iter()
            .filter(|f| f.removal == Removal::Removed)
            .map(|f| f.kind)
            .collect();
        assert_eq!(removed, vec![DeclarationKind::Route]);
    }

    #[test]
    fn report_serializes_status() {
        let report = DeleteReport {
            name: name("foo"),
            files: vec![],
            folder: Removal::Failed {
                message: "denied".to_string(),
            },
        };
        assert!(!report.succeeded());

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["folder"]["status"], "failed");
        assert_eq!(json["name"], "foo");
    }
}
