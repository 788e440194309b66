//! core::declaration::store
//!
//! Declaration storage in the specs directory.
//!
//! # Architecture
//!
//! Each declaration lives at `<specs-dir>/<kind>-<name>.yaml`. The store
//! maps `(kind, name)` keys to those files and is the only code that reads
//! or writes them.
//!
//! # Outcomes instead of swallowed errors
//!
//! Single-document loads return a [`Loaded`] value that separates "file
//! absent" from "parse error" from "permission denied". Callers that only
//! care whether a usable document came back use [`Loaded::found`] and
//! [`Loaded::into_document`]; callers that must not clobber an unreadable
//! file can match on the variant.
//!
//! # Example
//!
//! ```ignore
//! use fizzkit::core::declaration::{DeclarationStore, Loaded};
//! use fizzkit::core::types::{DeclarationKind, UnitName};
//!
//! let store = DeclarationStore::new(&paths);
//! let name = UnitName::new("hello")?;
//!
//! if let Loaded::Found(mut doc) = store.load(DeclarationKind::Function, &name) {
//!     // edit doc ...
//!     store.save(DeclarationKind::Function, &name, &doc)?;
//! }
//! ```

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

use super::document::{self, Document};
use crate::core::paths::FizzPaths;
use crate::core::types::{DeclarationKind, UnitName};

/// Errors from declaration storage operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The declaration file does not exist.
    #[error("declaration not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The specs directory does not exist.
    #[error("specs directory not found: {} (run fizz from the folder that contains it)", .0.display())]
    SpecsDirMissing(PathBuf),

    /// The file exists but is not valid YAML.
    #[error("failed to parse '{}': {message}", .path.display())]
    ParseError { path: PathBuf, message: String },

    /// A document could not be rendered as YAML.
    #[error("failed to serialize '{}': {message}", .path.display())]
    SerializeError { path: PathBuf, message: String },

    /// Any other filesystem failure.
    #[error("i/o error on '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl StoreError {
    fn io(path: &Path, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::NotFound {
            StoreError::NotFound(path.to_path_buf())
        } else {
            StoreError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    }
}

/// Result of loading a single declaration.
#[derive(Debug, Clone, PartialEq)]
pub enum Loaded {
    /// The file was read and parsed.
    Found(Document),
    /// The file does not exist.
    Missing,
    /// The file exists but is not valid YAML.
    Malformed { message: String },
    /// The file exists but could not be read.
    Unreadable { message: String },
}

impl Loaded {
    /// Whether a document was loaded.
    pub fn found(&self) -> bool {
        matches!(self, Loaded::Found(_))
    }

    /// The loaded document, or an empty mapping when none was loaded.
    pub fn into_document(self) -> Document {
        match self {
            Loaded::Found(doc) => doc,
            _ => document::empty(),
        }
    }
}

/// Result of an idempotent delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeleteOutcome {
    /// The path existed and was removed.
    Deleted,
    /// The path did not exist; nothing to do.
    Absent,
}

/// Declaration store rooted at a project's specs directory.
#[derive(Debug, Clone, Copy)]
pub struct DeclarationStore<'a> {
    paths: &'a FizzPaths,
}

impl<'a> DeclarationStore<'a> {
    /// Create a store for the given project paths.
    pub fn new(paths: &'a FizzPaths) -> Self {
        Self { paths }
    }

    /// Path of the `kind` declaration for `name`.
    pub fn path(&self, kind: DeclarationKind, name: &UnitName) -> PathBuf {
        self.paths.declaration_path(kind, name)
    }

    /// Load a single-document declaration.
    ///
    /// Never fails: every failure is folded into a [`Loaded`] variant.
    pub fn load(&self, kind: DeclarationKind, name: &UnitName) -> Loaded {
        let path = self.path(kind, name);
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Loaded::Missing,
            Err(e) => {
                return Loaded::Unreadable {
                    message: e.to_string(),
                }
            }
        };

        match serde_yaml::from_str::<Document>(&text) {
            Ok(doc) => Loaded::Found(doc),
            Err(e) => Loaded::Malformed {
                message: e.to_string(),
            },
        }
    }

    /// Load every document of a multi-document declaration, in file order.
    ///
    /// # Errors
    ///
    /// - [`StoreError::NotFound`] if the file does not exist
    /// - [`StoreError::ParseError`] if any document is invalid YAML
    pub fn load_multi(
        &self,
        kind: DeclarationKind,
        name: &UnitName,
    ) -> Result<Vec<Document>, StoreError> {
        let path = self.path(kind, name);
        let text = fs::read_to_string(&path).map_err(|e| StoreError::io(&path, e))?;

        document::parse_stream(&text).map_err(|e| StoreError::ParseError {
            path,
            message: e.to_string(),
        })
    }

    /// Save a single-document declaration, keeping key order.
    pub fn save(
        &self,
        kind: DeclarationKind,
        name: &UnitName,
        doc: &Document,
    ) -> Result<(), StoreError> {
        let path = self.path(kind, name);
        let text = serde_yaml::to_string(doc).map_err(|e| StoreError::SerializeError {
            path: path.clone(),
            message: e.to_string(),
        })?;
        write_atomic(&path, &text)
    }

    /// Save a multi-document declaration, keeping document and key order.
    pub fn save_multi(
        &self,
        kind: DeclarationKind,
        name: &UnitName,
        docs: &[Document],
    ) -> Result<(), StoreError> {
        let path = self.path(kind, name);
        let text = document::render_stream(docs).map_err(|e| StoreError::SerializeError {
            path: path.clone(),
            message: e.to_string(),
        })?;
        write_atomic(&path, &text)
    }

    /// Rename `<kind>-<old>.yaml` to `<kind>-<new>.yaml`.
    ///
    /// Returns `Ok(false)` if the source file does not exist.
    pub fn rename_file(
        &self,
        kind: DeclarationKind,
        old: &UnitName,
        new: &UnitName,
    ) -> Result<bool, StoreError> {
        let from = self.path(kind, old);
        if !from.exists() {
            return Ok(false);
        }
        let to = self.path(kind, new);
        fs::rename(&from, &to).map_err(|e| StoreError::io(&from, e))?;
        Ok(true)
    }

    /// Check whether a path exists.
    pub fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    /// Delete a file, treating an absent file as already deleted.
    pub fn delete(&self, path: &Path) -> Result<DeleteOutcome, StoreError> {
        match fs::remove_file(path) {
            Ok(()) => Ok(DeleteOutcome::Deleted),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(DeleteOutcome::Absent),
            Err(e) => Err(StoreError::io(path, e)),
        }
    }

    /// Delete the `kind` declaration for `name`.
    pub fn delete_declaration(
        &self,
        kind: DeclarationKind,
        name: &UnitName,
    ) -> Result<DeleteOutcome, StoreError> {
        self.delete(&self.path(kind, name))
    }

    /// List unit names, derived from `function-*.yaml` files, sorted.
    ///
    /// File names whose middle segment is not a valid [`UnitName`] are
    /// skipped.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::SpecsDirMissing`] if the specs directory does
    /// not exist.
    pub fn list_units(&self) -> Result<Vec<UnitName>, StoreError> {
        let dir = &self.paths.specs_dir;
        if !dir.is_dir() {
            return Err(StoreError::SpecsDirMissing(dir.clone()));
        }

        let prefix = format!("{}-", DeclarationKind::Function.prefix());
        let entries = fs::read_dir(dir).map_err(|e| StoreError::io(dir, e))?;

        let mut units = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| StoreError::io(dir, e))?;
            let file_name = entry.file_name();
            let Some(file_name) = file_name.to_str() else {
                continue;
            };
            let middle = file_name
                .strip_prefix(&prefix)
                .and_then(|rest| rest.strip_suffix(".yaml"));
            if let Some(name) = middle.and_then(|m| UnitName::new(m).ok()) {
                units.push(name);
            }
        }

        units.sort();
        Ok(units)
    }

    /// Move the unit folder `<root>/<old>` to `<root>/<new>`.
    ///
    /// Returns `Ok(false)` if the source folder does not exist.
    pub fn rename_folder(&self, old: &UnitName, new: &UnitName) -> Result<bool, StoreError> {
        let from = self.paths.unit_dir(old);
        if !from.is_dir() {
            return Ok(false);
        }
        let to = self.paths.unit_dir(new);
        fs::rename(&from, &to).map_err(|e| StoreError::io(&from, e))?;
        Ok(true)
    }
}

/// Write a file atomically (temp file in the same directory, then rename).
fn write_atomic(path: &Path, contents: &str) -> Result<(), StoreError> {
    let temp_path = path.with_extension("yaml.tmp");
    let written = fs::File::create(&temp_path).and_then(|mut file| {
        file.write_all(contents.as_bytes())?;
        file.sync_all()
    });
    if let Err(e) = written {
        let _ = fs::remove_file(&temp_path);
        return Err(StoreError::io(&temp_path, e));
    }

    fs::rename(&temp_path, path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        StoreError::io(path, e)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    struct Fixture {
        _dir: TempDir,
        paths: FizzPaths,
    }

    impl Fixture {
        fn new() -> Self {
            let dir = TempDir::new().expect("create temp dir");
            let paths = FizzPaths::with_defaults(dir.path().to_path_buf());
            fs::create_dir_all(&paths.specs_dir).unwrap();
            Self { _dir: dir, paths }
        }

        fn store(&self) -> DeclarationStore<'_> {
            DeclarationStore::new(&self.paths)
        }

        fn write(&self, file: &str, contents: &str) {
            fs::write(self.paths.specs_dir.join(file), contents).unwrap();
        }
    }

    fn name(s: &str) -> UnitName {
        UnitName::new(s).unwrap()
    }

    #[test]
    fn load_found() {
        let fx = Fixture::new();
        fx.write("function-foo.yaml", "metadata:\n  name: foo\n");

        let loaded = fx.store().load(DeclarationKind::Function, &name("foo"));
        assert!(loaded.found());
        let doc = loaded.into_document();
        assert_eq!(document::get_str(&doc, &["metadata", "name"]), Some("foo"));
    }

    #[test]
    fn load_missing_is_not_found() {
        let fx = Fixture::new();
        let loaded = fx.store().load(DeclarationKind::Route, &name("nope"));
        assert_eq!(loaded, Loaded::Missing);
        assert!(document::is_empty(&loaded.into_document()));
    }

    #[test]
    fn load_malformed_is_distinguished() {
        let fx = Fixture::new();
        fx.write("route-bad.yaml", "spec: [unclosed\n");

        let loaded = fx.store().load(DeclarationKind::Route, &name("bad"));
        assert!(matches!(loaded, Loaded::Malformed { .. }));
        assert!(!loaded.found());
    }

    #[test]
    fn load_multi_reads_in_order() {
        let fx = Fixture::new();
        fx.write("package-foo.yaml", "kind: Meta\n---\nspec:\n  buildcmd: x\n");

        let docs = fx
            .store()
            .load_multi(DeclarationKind::Package, &name("foo"))
            .unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(document::get_str(&docs[0], &["kind"]), Some("Meta"));
        assert_eq!(document::get_str(&docs[1], &["spec", "buildcmd"]), Some("x"));
    }

    #[test]
    fn load_multi_missing_fails() {
        let fx = Fixture::new();
        let result = fx.store().load_multi(DeclarationKind::Package, &name("foo"));
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    #[test]
    fn save_keeps_key_order() {
        let fx = Fixture::new();
        let doc: Document = serde_yaml::from_str("zeta: 1\nalpha: 2\n").unwrap();

        fx.store()
            .save(DeclarationKind::Function, &name("foo"), &doc)
            .unwrap();

        let text = fs::read_to_string(fx.paths.specs_dir.join("function-foo.yaml")).unwrap();
        assert_eq!(text, "zeta: 1\nalpha: 2\n");
        assert!(!fx.paths.specs_dir.join("function-foo.yaml.tmp").exists());
    }

    #[test]
    fn failed_save_leaves_no_temp_file() {
        let fx = Fixture::new();
        let target = fx.paths.specs_dir.join("function-foo.yaml");
        fs::create_dir_all(target.join("occupied")).unwrap();
        let doc: Document = serde_yaml::from_str("a: 1\n").unwrap();

        let result = fx.store().save(DeclarationKind::Function, &name("foo"), &doc);

        assert!(result.is_err());
        assert!(target.is_dir());
        assert!(!fx.paths.specs_dir.join("function-foo.yaml.tmp").exists());
    }

    #[test]
    fn save_multi_writes_stream() {
        let fx = Fixture::new();
        let docs = document::parse_stream("a: 1\n---\nb: 2\n").unwrap();

        fx.store()
            .save_multi(DeclarationKind::Package, &name("foo"), &docs)
            .unwrap();

        let text = fs::read_to_string(fx.paths.specs_dir.join("package-foo.yaml")).unwrap();
        assert_eq!(text, "a: 1\n---\nb: 2\n");
    }

    #[test]
    fn rename_file_moves_declaration() {
        let fx = Fixture::new();
        fx.write("route-foo.yaml", "a: 1\n");

        let renamed = fx
            .store()
            .rename_file(DeclarationKind::Route, &name("foo"), &name("bar"))
            .unwrap();

        assert!(renamed);
        assert!(!fx.paths.specs_dir.join("route-foo.yaml").exists());
        assert!(fx.paths.specs_dir.join("route-bar.yaml").exists());
    }

    #[test]
    fn rename_file_missing_source_is_false() {
        let fx = Fixture::new();
        let renamed = fx
            .store()
            .rename_file(DeclarationKind::Route, &name("foo"), &name("bar"))
            .unwrap();
        assert!(!renamed);
    }

    #[test]
    fn delete_is_idempotent() {
        let fx = Fixture::new();
        fx.write("function-foo.yaml", "a: 1\n");
        let store = fx.store();

        assert_eq!(
            store
                .delete_declaration(DeclarationKind::Function, &name("foo"))
                .unwrap(),
            DeleteOutcome::Deleted
        );
        assert_eq!(
            store
                .delete_declaration(DeclarationKind::Function, &name("foo"))
                .unwrap(),
            DeleteOutcome::Absent
        );
    }

    #[test]
    fn list_units_sorted_from_function_files() {
        let fx = Fixture::new();
        fx.write("function-zeta.yaml", "");
        fx.write("function-alpha.yaml", "");
        fx.write("route-beta.yaml", "");
        fx.write("function-mid.yaml.tmp", "");
        fx.write("package-alpha.yaml", "");

        let units = fx.store().list_units().unwrap();
        let names: Vec<_> = units.iter().map(UnitName::as_str).collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
    }

    #[test]
    fn list_units_without_specs_dir_fails() {
        let dir = TempDir::new().unwrap();
        let paths = FizzPaths::with_defaults(dir.path().to_path_buf());

        let result = DeclarationStore::new(&paths).list_units();
        assert!(matches!(result, Err(StoreError::SpecsDirMissing(_))));
    }

    #[test]
    fn rename_folder_moves_unit_dir() {
        let fx = Fixture::new();
        let store = fx.store();
        fs::create_dir_all(fx.paths.unit_dir(&name("foo"))).unwrap();
        fs::write(fx.paths.unit_dir(&name("foo")).join("build.sh"), "echo").unwrap();

        assert!(store.rename_folder(&name("foo"), &name("bar")).unwrap());
        assert!(fx.paths.unit_dir(&name("bar")).join("build.sh").exists());
        assert!(!store.rename_folder(&name("foo"), &name("baz")).unwrap());
    }
}
