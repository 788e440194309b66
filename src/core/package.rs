//! core::package
//!
//! Package declaration regeneration and post-processing.
//!
//! # Lifecycle
//!
//! A package declaration is never edited into a new name. During a rename
//! the old file is deleted and the Fission CLI writes a fresh one:
//!
//! ```text
//! fission package create --sourcearchive <new>.zip --env <env> \
//!     --buildcmd ./build.sh --name <new> --spec
//! ```
//!
//! The fresh file is then post-processed: `buildcmd` is dropped from the
//! spec document and replaced by an init container that runs the unit's
//! `build.sh`.
//!
//! # Document layout
//!
//! The stream holds two documents. Document 0 is fixed metadata and is
//! carried through untouched; document 1 holds `spec`.

use serde_yaml::{Mapping, Value};
use thiserror::Error;

use crate::core::declaration::document::{self, Document};
use crate::core::declaration::{DeclarationStore, StoreError};
use crate::core::process::{Invocation, ProcessRunner};
use crate::core::types::{DeclarationKind, UnitName};

/// Commands the injected init container runs, in order.
pub const INIT_COMMANDS: [&str; 2] = ["chmod +x build.sh", "./build.sh"];

/// Index of the spec document in a package stream.
const SPEC_DOC: usize = 1;

/// Errors from the packaging tool.
#[derive(Debug, Error)]
pub enum PackagerError {
    /// The packaging tool could not be started.
    #[error("failed to run '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The packaging tool exited unsuccessfully.
    #[error("'{command}' exited with status {}", code.map_or_else(|| "unknown".to_string(), |c| c.to_string()))]
    Failed { command: String, code: Option<i32> },

    /// The packaging tool exited successfully but wrote no declaration.
    #[error("'{command}' did not write {}", .expected.display())]
    NoOutput {
        command: String,
        expected: std::path::PathBuf,
    },
}

/// Inputs for regenerating a package declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageRequest {
    /// Name of the package (and unit).
    pub name: UnitName,
    /// Source archive, relative to the project root.
    pub source_archive: String,
    /// Fission environment the package builds in.
    pub environment: String,
    /// Build command recorded by the packaging tool.
    pub build_cmd: String,
}

impl PackageRequest {
    /// Request a package for `name` built from `<name>.zip`.
    pub fn new(name: UnitName, environment: impl Into<String>, build_cmd: impl Into<String>) -> Self {
        Self {
            source_archive: name.archive_name(),
            name,
            environment: environment.into(),
            build_cmd: build_cmd.into(),
        }
    }

    /// The packaging tool invocation for this request.
    pub fn invocation(&self, program: &str, root: &std::path::Path) -> Invocation {
        Invocation::new(program, root).args([
            "package",
            "create",
            "--sourcearchive",
            &self.source_archive,
            "--env",
            &self.environment,
            "--buildcmd",
            &self.build_cmd,
            "--name",
            self.name.as_str(),
            "--spec",
        ])
    }
}

/// Run the packaging tool for `request`.
///
/// # Errors
///
/// Any failure to start or a non-zero exit is a [`PackagerError`]; this is
/// a hard failure for the rename that asked for it.
pub fn regenerate(
    runner: &dyn ProcessRunner,
    store: &DeclarationStore<'_>,
    program: &str,
    root: &std::path::Path,
    request: &PackageRequest,
) -> Result<(), PackagerError> {
    let invocation = request.invocation(program, root);
    let status = runner
        .run(&invocation)
        .map_err(|source| PackagerError::Spawn {
            program: program.to_string(),
            source,
        })?;

    if !status.success {
        return Err(PackagerError::Failed {
            command: invocation.to_string(),
            code: status.code,
        });
    }

    let expected = store.path(DeclarationKind::Package, &request.name);
    if !store.exists(&expected) {
        return Err(PackagerError::NoOutput {
            command: invocation.to_string(),
            expected,
        });
    }

    Ok(())
}

/// Read `spec.environment.name` from a package stream.
pub fn environment_name(docs: &[Document]) -> Option<&str> {
    docs.get(SPEC_DOC)
        .and_then(|doc| document::get_str(doc, &["spec", "environment", "name"]))
}

/// Replace `buildcmd` with the build-script init container.
///
/// Returns `false` (leaving `doc` untouched) if it has no `spec` mapping.
pub fn inject_init_containers(doc: &mut Document) -> bool {
    let Some(spec) = document::get_mut(doc, "spec").filter(|s| s.is_mapping()) else {
        return false;
    };

    document::remove(spec, "buildcmd");
    document::remove(spec, "initcontainers");

    let mut container = Mapping::new();
    container.insert(
        "command".into(),
        Value::Sequence(INIT_COMMANDS.iter().map(|c| Value::from(*c)).collect()),
    );
    // spec was checked to be a mapping above.
    let _ = document::set(
        spec,
        "initContainers",
        Value::Sequence(vec![Value::Mapping(container)]),
    );
    true
}

/// Post-process the package declaration for `name` in place.
///
/// Returns whether the spec document was rewritten. A stream without a
/// spec document is saved back unchanged.
///
/// # Errors
///
/// Fails if the package declaration cannot be read, parsed or written.
pub fn post_process(store: &DeclarationStore<'_>, name: &UnitName) -> Result<bool, StoreError> {
    let mut docs = store.load_multi(DeclarationKind::Package, name)?;

    let rewritten = docs
        .get_mut(SPEC_DOC)
        .is_some_and(inject_init_containers);

    store.save_multi(DeclarationKind::Package, name, &docs)?;
    Ok(rewritten)
}
