//! engine::rename
//!
//! Rename a unit across its three declarations.
//!
//! # Phases
//!
//! A rename runs five phases in order and stops at the first failure:
//!
//! 1. [`Phase::CaptureEnvironment`] - read `spec.environment.name` from the
//!    old package declaration
//! 2. [`Phase::RegeneratePackage`] - delete the old package declaration and
//!    have the packaging tool write one under the new name
//! 3. [`Phase::PostProcessPackage`] - swap `buildcmd` for the build-script
//!    init container
//! 4. [`Phase::RewriteFunction`] - rename the function declaration and its
//!    package reference
//! 5. [`Phase::RewriteRoute`] - rename the route declaration, its function
//!    reference and (per [`RoutePolicy`]) its path
//!
//! Nothing is rolled back. A [`RenameError::Phase`] carries the phases that
//! did complete so the caller can say exactly what state the project is in.
//!
//! The unit folder and the packaging scripts are not touched here; the CLI
//! handles them before the phases run.

use std::fmt;
use std::io;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use super::route::{bind_to, load_route, RouteError};
use super::Propagator;
use crate::core::config::{RouteOnRename, DEFAULT_BUILD_CMD, DEFAULT_PACKAGER};
use crate::core::declaration::document::{self, Document, DocumentError};
use crate::core::declaration::{DeclarationStore, Loaded, StoreError};
use crate::core::package::{self, PackageRequest, PackagerError};
use crate::core::route;
use crate::core::types::{DeclarationKind, UnitName};

/// One step of a rename.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    CaptureEnvironment,
    RegeneratePackage,
    PostProcessPackage,
    RewriteFunction,
    RewriteRoute,
}

impl Phase {
    /// All phases, in execution order.
    pub const ALL: [Phase; 5] = [
        Phase::CaptureEnvironment,
        Phase::RegeneratePackage,
        Phase::PostProcessPackage,
        Phase::RewriteFunction,
        Phase::RewriteRoute,
    ];
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Phase::CaptureEnvironment => "capture environment",
            Phase::RegeneratePackage => "regenerate package",
            Phase::PostProcessPackage => "post-process package",
            Phase::RewriteFunction => "rewrite function",
            Phase::RewriteRoute => "rewrite route",
        };
        write!(f, "{}", s)
    }
}

/// Where the route should point after a rename.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RoutePolicy {
    /// `/<new-name>`
    #[default]
    FollowName,
    /// Keep the current path. A route rebuilt from the template has no
    /// current path and gets `/<new-name>`.
    Preserve,
    /// A caller-chosen path.
    Explicit(String),
}

impl RoutePolicy {
    fn target_path(&self, current: Option<&str>, new: &UnitName) -> String {
        match self {
            RoutePolicy::FollowName => new.to_string(),
            RoutePolicy::Preserve => current.map_or_else(|| new.to_string(), str::to_string),
            RoutePolicy::Explicit(path) => path.clone(),
        }
    }
}

impl From<RouteOnRename> for RoutePolicy {
    fn from(setting: RouteOnRename) -> Self {
        match setting {
            RouteOnRename::FollowName => RoutePolicy::FollowName,
            RouteOnRename::Preserve => RoutePolicy::Preserve,
        }
    }
}

/// What to rename and how.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameRequest {
    pub old: UnitName,
    pub new: UnitName,
    pub route: RoutePolicy,
    /// Build command handed to the packaging tool.
    pub build_cmd: String,
    /// Packaging tool program.
    pub packager: String,
}

impl RenameRequest {
    /// A request with the default route policy, build command and packager.
    pub fn new(old: UnitName, new: UnitName) -> Self {
        Self {
            old,
            new,
            route: RoutePolicy::default(),
            build_cmd: DEFAULT_BUILD_CMD.to_string(),
            packager: DEFAULT_PACKAGER.to_string(),
        }
    }

    pub fn with_route(mut self, route: RoutePolicy) -> Self {
        self.route = route;
        self
    }

    pub fn with_build_cmd(mut self, build_cmd: impl Into<String>) -> Self {
        self.build_cmd = build_cmd.into();
        self
    }

    pub fn with_packager(mut self, packager: impl Into<String>) -> Self {
        self.packager = packager.into();
        self
    }
}

/// Result of a completed rename.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenameReport {
    pub old: UnitName,
    pub new: UnitName,
    /// Environment carried over from the old package.
    pub environment: String,
    /// Whether the regenerated package had a spec document to post-process.
    pub package_post_processed: bool,
    /// Path the route now points at.
    pub route_path: String,
    /// The route was rebuilt from the built-in template.
    pub route_from_template: bool,
    pub completed: Vec<Phase>,
}

/// Why a single phase failed.
#[derive(Debug, Error)]
pub enum PhaseError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Packager(#[from] PackagerError),

    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error(transparent)]
    Route(#[from] RouteError),

    /// The package declaration names no environment.
    #[error("no spec.environment.name in '{}'", .0.display())]
    MissingEnvironment(PathBuf),
}

/// Errors from [`Propagator::rename`].
#[derive(Debug, Error)]
pub enum RenameError {
    /// Old and new names are the same.
    #[error("'{0}' is already the unit's name")]
    SameName(UnitName),

    /// A unit with the new name already exists.
    #[error("a unit named '{name}' already exists ({})", .path.display())]
    TargetExists { name: UnitName, path: PathBuf },

    /// A phase failed; earlier phases stay applied.
    #[error("rename failed during {phase} (completed: {})", phase_list(.completed))]
    Phase {
        phase: Phase,
        completed: Vec<Phase>,
        #[source]
        source: PhaseError,
    },
}

impl RenameError {
    /// Phases applied before the failure.
    pub fn completed(&self) -> &[Phase] {
        match self {
            RenameError::Phase { completed, .. } => completed,
            _ => &[],
        }
    }
}

fn phase_list(phases: &[Phase]) -> String {
    if phases.is_empty() {
        return "none".to_string();
    }
    phases
        .iter()
        .map(Phase::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Run `f` as `phase`, recording it in `completed` on success.
fn run_phase<T>(
    phase: Phase,
    completed: &mut Vec<Phase>,
    f: impl FnOnce() -> Result<T, PhaseError>,
) -> Result<T, RenameError> {
    match f() {
        Ok(value) => {
            completed.push(phase);
            Ok(value)
        }
        Err(source) => Err(RenameError::Phase {
            phase,
            completed: completed.clone(),
            source,
        }),
    }
}

/// Turn a non-`Found` load into the matching store error.
fn require(store: &DeclarationStore<'_>, kind: DeclarationKind, name: &UnitName) -> Result<Document, StoreError> {
    let path = store.path(kind, name);
    match store.load(kind, name) {
        Loaded::Found(doc) => Ok(doc),
        Loaded::Missing => Err(StoreError::NotFound(path)),
        Loaded::Malformed { message } => Err(StoreError::ParseError { path, message }),
        Loaded::Unreadable { message } => Err(StoreError::Io {
            path,
            source: io::Error::other(message),
        }),
    }
}

impl Propagator<'_> {
    /// Rename a unit's declarations from `request.old` to `request.new`.
    ///
    /// # Errors
    ///
    /// - [`RenameError::SameName`] / [`RenameError::TargetExists`] before
    ///   anything is touched
    /// - [`RenameError::Phase`] naming the failed phase and those that
    ///   completed
    pub fn rename(&self, request: &RenameRequest) -> Result<RenameReport, RenameError> {
        self.check_rename(&request.old, &request.new)?;

        let RenameRequest { old, new, .. } = request;
        let store = self.store();
        let mut completed = Vec::with_capacity(Phase::ALL.len());

        let environment = run_phase(Phase::CaptureEnvironment, &mut completed, || {
            self.capture_environment(&store, old)
        })?;

        run_phase(Phase::RegeneratePackage, &mut completed, || {
            store.delete_declaration(DeclarationKind::Package, old)?;
            let package = PackageRequest::new(new.clone(), environment.as_str(), request.build_cmd.as_str());
            package::regenerate(
                self.runner(),
                &store,
                &request.packager,
                self.paths().root(),
                &package,
            )?;
            Ok(())
        })?;

        let package_post_processed = run_phase(Phase::PostProcessPackage, &mut completed, || {
            Ok(package::post_process(&store, new)?)
        })?;

        run_phase(Phase::RewriteFunction, &mut completed, || {
            let mut doc = require(&store, DeclarationKind::Function, old)?;
            document::set_str(&mut doc, &["metadata", "name"], new.as_str())?;
            document::set_str(&mut doc, &["spec", "package", "packageref", "name"], new.as_str())?;
            store.save(DeclarationKind::Function, old, &doc)?;
            store.rename_file(DeclarationKind::Function, old, new)?;
            Ok(())
        })?;

        let rewrite = run_phase(Phase::RewriteRoute, &mut completed, || {
            let doc = load_route(&store, old)?;
            let current = route::current_path(&doc).map(str::to_string);
            let target = request.route.target_path(current.as_deref(), new);

            let mut rewrite = route::set_route_path(doc, &target);
            bind_to(&mut rewrite.document, new)?;
            store.save(DeclarationKind::Route, old, &rewrite.document)?;
            store.rename_file(DeclarationKind::Route, old, new)?;
            Ok(rewrite)
        })?;

        Ok(RenameReport {
            old: old.clone(),
            new: new.clone(),
            environment,
            package_post_processed,
            route_path: rewrite.path,
            route_from_template: rewrite.from_template,
            completed,
        })
    }

    /// Check that `old` can be renamed to `new` without touching anything.
    ///
    /// The CLI calls this before moving the unit folder.
    pub fn check_rename(&self, old: &UnitName, new: &UnitName) -> Result<(), RenameError> {
        if old == new {
            return Err(RenameError::SameName(new.clone()));
        }

        let store = self.store();
        for kind in DeclarationKind::ALL {
            let target = store.path(kind, new);
            if store.exists(&target) {
                return Err(RenameError::TargetExists {
                    name: new.clone(),
                    path: target,
                });
            }
        }
        Ok(())
    }

    fn capture_environment(
        &self,
        store: &DeclarationStore<'_>,
        old: &UnitName,
    ) -> Result<String, PhaseError> {
        let docs = store.load_multi(DeclarationKind::Package, old)?;
        package::environment_name(&docs)
            .map(str::to_string)
            .ok_or_else(|| PhaseError::MissingEnvironment(store.path(DeclarationKind::Package, old)))
    }

    /// Move the unit folder from `old` to `new`.
    ///
    /// Returns `Ok(false)` if there is no folder named `old`.
    ///
    /// # Errors
    ///
    /// Refuses to move onto an existing path, and reports filesystem
    /// failures.
    pub fn rename_folder(&self, old: &UnitName, new: &UnitName) -> Result<bool, StoreError> {
        let target = self.paths().unit_dir(new);
        if target.exists() {
            return Err(StoreError::Io {
                path: target,
                source: io::Error::new(io::ErrorKind::AlreadyExists, "destination already exists"),
            });
        }
        self.store().rename_folder(old, new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::paths::FizzPaths;
    use crate::core::process::{Invocation, ProcessRunner, RunStatus};
    use std::cell::RefCell;
    use std::fs;
    use tempfile::TempDir;

    const PACKAGE: &str = "\
kind: ArchiveUploadSpec
name: foo-zip
---
apiVersion: fission.io/v1
kind: Package
metadata:
  name: foo
spec:
  buildcmd: ./build.sh
  environment:
    name: python
    namespace: ''
";

    const FUNCTION: &str = "\
apiVersion: fission.io/v1
kind: Function
metadata:
  name: foo
spec:
  package:
    functionName: main.main
    packageref:
      name: foo
";

    const ROUTE: &str = "\
apiVersion: fission.io/v1
kind: HTTPTrigger
metadata:
  name: foo
spec:
  functionref:
    name: foo
    type: name
  ingressconfig:
    host: '*'
    path: /custom
  methods:
  - POST
";

    /// Writes a fresh package declaration the way `fission package create
    /// --spec` does.
    struct FakePackager {
        specs_dir: PathBuf,
        exit: RunStatus,
        calls: RefCell<Vec<Invocation>>,
    }

    impl ProcessRunner for FakePackager {
        fn run(&self, invocation: &Invocation) -> std::io::Result<RunStatus> {
            self.calls.borrow_mut().push(invocation.clone());
            if self.exit.success {
                let name_at = invocation.args.iter().position(|a| a == "--name").unwrap() + 1;
                let name = &invocation.args[name_at];
                fs::write(
                    self.specs_dir.join(format!("package-{}.yaml", name)),
                    format!(
                        "kind: ArchiveUploadSpec\nname: {name}-zip\n---\nkind: Package\nmetadata:\n  name: {name}\nspec:\n  buildcmd: ./build.sh\n  environment:\n    name: python\n"
                    ),
                )?;
            }
            Ok(self.exit)
        }
    }

    struct Project {
        _dir: TempDir,
        paths: FizzPaths,
    }

    impl Project {
        fn new() -> Self {
            let dir = TempDir::new().unwrap();
            let paths = FizzPaths::with_defaults(dir.path().to_path_buf());
            fs::create_dir_all(&paths.specs_dir).unwrap();
            fs::write(paths.specs_dir.join("package-foo.yaml"), PACKAGE).unwrap();
            fs::write(paths.specs_dir.join("function-foo.yaml"), FUNCTION).unwrap();
            fs::write(paths.specs_dir.join("route-foo.yaml"), ROUTE).unwrap();
            Self { _dir: dir, paths }
        }

        fn packager(&self, exit: RunStatus) -> FakePackager {
            FakePackager {
                specs_dir: self.paths.specs_dir.clone(),
                exit,
                calls: RefCell::new(Vec::new()),
            }
        }

        fn spec(&self, file: &str) -> PathBuf {
            self.paths.specs_dir.join(file)
        }
    }

    fn name(s: &str) -> UnitName {
        UnitName::new(s).unwrap()
    }

    #[test]
    fn rename_follows_name_by_default() {
        let project = Project::new();
        let packager = project.packager(RunStatus::ok());
        let propagator = Propagator::new(&project.paths, &packager);

        let report = propagator
            .rename(&RenameRequest::new(name("foo"), name("bar")))
            .unwrap();

        assert_eq!(report.environment, "python");
        assert_eq!(report.route_path, "/bar");
        assert!(!report.route_from_template);
        assert!(report.package_post_processed);
        assert_eq!(report.completed, Phase::ALL.to_vec());

        for kind in ["function", "route", "package"] {
            assert!(!project.spec(&format!("{kind}-foo.yaml")).exists());
            assert!(project.spec(&format!("{kind}-bar.yaml")).exists());
        }

        let store = propagator.store();
        let function = store.load(DeclarationKind::Function, &name("bar")).into_document();
        assert_eq!(document::get_str(&function, &["metadata", "name"]), Some("bar"));
        assert_eq!(
            document::get_str(&function, &["spec", "package", "packageRef", "name"]),
            Some("bar")
        );
        assert_eq!(
            document::get_str(&function, &["spec", "package", "functionName"]),
            Some("main.main")
        );

        let route = store.load(DeclarationKind::Route, &name("bar")).into_document();
        assert_eq!(document::get_str(&route, &["spec", "functionRef", "name"]), Some("bar"));
        assert_eq!(route::current_path(&route), Some("/bar"));

        let package = store.load_multi(DeclarationKind::Package, &name("bar")).unwrap();
        assert!(document::get_path(&package[1], &["spec", "buildcmd"]).is_none());
        assert!(document::get_path(&package[1], &["spec", "initContainers"]).is_some());

        let call = &packager.calls.borrow()[0];
        assert_eq!(call.program, "fission");
        assert!(call.args.windows(2).any(|w| w == ["--env", "python"]));
        assert!(call.args.windows(2).any(|w| w == ["--sourcearchive", "bar.zip"]));
    }

    #[test]
    fn preserve_policy_keeps_custom_path() {
        let project = Project::new();
        let packager = project.packager(RunStatus::ok());
        let propagator = Propagator::new(&project.paths, &packager);

        let request = RenameRequest::new(name("foo"), name("bar")).with_route(RoutePolicy::Preserve);
        let report = propagator.rename(&request).unwrap();
        assert_eq!(report.route_path, "/custom");
    }

    #[test]
    fn explicit_policy_sets_path() {
        let project = Project::new();
        let packager = project.packager(RunStatus::ok());
        let propagator = Propagator::new(&project.paths, &packager);

        let request = RenameRequest::new(name("foo"), name("bar"))
            .with_route(RoutePolicy::Explicit("api/bar".to_string()));
        assert_eq!(propagator.rename(&request).unwrap().route_path, "/api/bar");
    }

    #[test]
    fn missing_route_uses_template() {
        let project = Project::new();
        fs::remove_file(project.spec("route-foo.yaml")).unwrap();
        let packager = project.packager(RunStatus::ok());
        let propagator = Propagator::new(&project.paths, &packager);

        let report = propagator
            .rename(&RenameRequest::new(name("foo"), name("bar")))
            .unwrap();
        assert!(report.route_from_template);

        let route = propagator.store().load(DeclarationKind::Route, &name("bar")).into_document();
        assert_eq!(document::get_str(&route, &["metadata", "name"]), Some("bar"));
    }

    #[test]
    fn same_name_is_rejected() {
        let project = Project::new();
        let packager = project.packager(RunStatus::ok());
        let propagator = Propagator::new(&project.paths, &packager);

        let err = propagator
            .rename(&RenameRequest::new(name("foo"), name("foo")))
            .unwrap_err();
        assert!(matches!(err, RenameError::SameName(_)));
        assert!(packager.calls.borrow().is_empty());
    }

    #[test]
    fn existing_target_is_rejected_before_mutation() {
        let project = Project::new();
        fs::write(project.spec("function-bar.yaml"), FUNCTION).unwrap();
        let packager = project.packager(RunStatus::ok());
        let propagator = Propagator::new(&project.paths, &packager);

        let err = propagator
            .rename(&RenameRequest::new(name("foo"), name("bar")))
            .unwrap_err();
        assert!(matches!(err, RenameError::TargetExists { .. }));
        assert!(project.spec("package-foo.yaml").exists());
    }

    #[test]
    fn existing_route_or_package_under_new_name_is_kept() {
        for file in ["route-bar.yaml", "package-bar.yaml"] {
            let project = Project::new();
            let precious = "metadata:\n  name: bar-precious\nspec:\n  relativeurl: /precious\n";
            fs::write(project.spec(file), precious).unwrap();
            let packager = project.packager(RunStatus::ok());
            let propagator = Propagator::new(&project.paths, &packager);

            let err = propagator
                .rename(&RenameRequest::new(name("foo"), name("bar")))
                .unwrap_err();
            match err {
                RenameError::TargetExists { path, .. } => assert_eq!(path, project.spec(file)),
                other => panic!("unexpected error: {other}"),
            }
            assert_eq!(fs::read_to_string(project.spec(file)).unwrap(), precious);
            assert!(project.spec("function-foo.yaml").exists());
            assert!(project.spec("route-foo.yaml").exists());
            assert!(project.spec("package-foo.yaml").exists());
        }
    }

    #[test]
    fn missing_package_fails_first_phase() {
        let project = Project::new();
        fs::remove_file(project.spec("package-foo.yaml")).unwrap();
        let packager = project.packager(RunStatus::ok());
        let propagator = Propagator::new(&project.paths, &packager);

        let err = propagator
            .rename(&RenameRequest::new(name("foo"), name("bar")))
            .unwrap_err();
        match err {
            RenameError::Phase { phase, completed, .. } => {
                assert_eq!(phase, Phase::CaptureEnvironment);
                assert!(completed.is_empty());
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(project.spec("function-foo.yaml").exists());
    }

    #[test]
    fn packager_failure_reports_completed_phases() {
        let project = Project::new();
        let packager = project.packager(RunStatus::failed(1));
        let propagator = Propagator::new(&project.paths, &packager);

        let err = propagator
            .rename(&RenameRequest::new(name("foo"), name("bar")))
            .unwrap_err();
        assert_eq!(err.completed(), &[Phase::CaptureEnvironment]);
        assert!(err.to_string().contains("regenerate package"));
        assert!(project.spec("function-foo.yaml").exists());
        assert!(project.spec("route-foo.yaml").exists());
    }

    #[test]
    fn missing_function_fails_fourth_phase() {
        let project = Project::new();
        fs::remove_file(project.spec("function-foo.yaml")).unwrap();
        let packager = project.packager(RunStatus::ok());
        let propagator = Propagator::new(&project.paths, &packager);

        let err = propagator
            .rename(&RenameRequest::new(name("foo"), name("bar")))
            .unwrap_err();
        assert!(matches!(
            err,
            RenameError::Phase {
                phase: Phase::RewriteFunction,
                ..
            }
        ));
        assert_eq!(err.completed().len(), 3);
    }

    #[test]
    fn folder_rename() {
        let project = Project::new();
        fs::create_dir(project.paths.root.join("foo")).unwrap();
        let packager = project.packager(RunStatus::ok());
        let propagator = Propagator::new(&project.paths, &packager);

        assert!(propagator.rename_folder(&name("foo"), &name("bar")).unwrap());
        assert!(project.paths.root.join("bar").is_dir());
        assert!(!propagator.rename_folder(&name("foo"), &name("baz")).unwrap());

        fs::create_dir(project.paths.root.join("qux")).unwrap();
        assert!(propagator.rename_folder(&name("bar"), &name("qux")).is_err());
        assert!(project.paths.root.join("bar").is_dir());
    }
}
