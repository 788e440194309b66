//! core::scripts
//!
//! Packaging script patching and execution.
//!
//! A project carries two packaging scripts at its root, one POSIX shell
//! script and one Windows batch script. Both name every unit twice: once
//! as `pushd <name>` to enter the unit folder, and once as `<name>.zip`
//! for the archive it produces. A rename rewrites both references in both
//! scripts, then runs the script for the current platform so the archive
//! under the new name exists before the packaging tool is asked for it.
//!
//! Matching is scoped by word boundaries (`pushd api\b` and `\bapi\.zip`
//! when renaming `api`): `pushd apiary` and `myapi.zip` are left alone.
//! `-` is a boundary, so `pushd api-v2` still matches.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use regex::{NoExpand, Regex};
use serde::Serialize;
use thiserror::Error;

use crate::core::paths::FizzPaths;
use crate::core::process::{Invocation, ProcessRunner};
use crate::core::types::UnitName;

/// Errors from reading or writing a packaging script.
#[derive(Debug, Error)]
pub enum ScriptError {
    /// The script could not be read.
    #[error("failed to read script '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The script could not be written back.
    #[error("failed to write script '{}': {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The rewrite pattern could not be built.
    #[error("invalid script pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Platform whose packaging script should run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Windows,
    Unix,
}

impl Platform {
    /// The platform this binary was built for.
    pub fn current() -> Self {
        if cfg!(windows) {
            Platform::Windows
        } else {
            Platform::Unix
        }
    }
}

/// Outcome of the script run step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunOutcome {
    /// The run step was not requested, or patching failed first.
    Skipped,
    /// The script exited successfully.
    Succeeded,
    /// The script ran and exited unsuccessfully.
    Failed { code: Option<i32> },
    /// The script could not be started.
    Unavailable { message: String },
}

impl RunOutcome {
    /// Whether the outcome deserves a warning.
    pub fn is_warning(&self) -> bool {
        matches!(self, RunOutcome::Failed { .. } | RunOutcome::Unavailable { .. })
    }
}

/// Result of [`patch_and_run`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScriptReport {
    /// Both scripts were rewritten and saved.
    pub patched: bool,
    /// Why patching failed, if it did.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// What happened when the platform script ran.
    pub run: RunOutcome,
}

/// Rewrite unit references in script `text` from `old` to `new`.
///
/// # Errors
///
/// Fails only if the escaped name produces an invalid pattern.
pub fn patch_text(text: &str, old: &UnitName, new: &UnitName) -> Result<String, regex::Error> {
    let escaped = regex::escape(old.as_str());
    let pushd = Regex::new(&format!(r"pushd {}\b", escaped))?;
    let archive = Regex::new(&format!(r"\b{}\.zip", escaped))?;

    let pushd_new = format!("pushd {}", new);
    let archive_new = new.archive_name();

    let text = pushd.replace_all(text, NoExpand(&pushd_new));
    let text = archive.replace_all(&text, NoExpand(&archive_new));
    Ok(text.into_owned())
}

/// Rewrite both packaging scripts in place.
///
/// Both scripts are read and rewritten in memory before either is written,
/// so a missing script leaves the other one untouched.
///
/// # Errors
///
/// Returns the first read, pattern or write failure.
pub fn patch_scripts(paths: &FizzPaths, old: &UnitName, new: &UnitName) -> Result<(), ScriptError> {
    let targets = [&paths.shell_script, &paths.batch_script];

    let mut rewritten = Vec::with_capacity(targets.len());
    for path in targets {
        let text = read_script(path)?;
        rewritten.push((path, patch_text(&text, old, new)?));
    }

    for (path, text) in rewritten {
        fs::write(path, text).map_err(|source| ScriptError::Write {
            path: path.clone(),
            source,
        })?;
    }
    Ok(())
}

fn read_script(path: &Path) -> Result<String, ScriptError> {
    fs::read_to_string(path).map_err(|source| ScriptError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// The invocation that runs the packaging script for `platform`.
pub fn script_invocation(paths: &FizzPaths, platform: Platform) -> Invocation {
    match platform {
        Platform::Windows => Invocation::new("cmd", paths.root())
            .args(["/C".to_string(), paths.batch_script.display().to_string()]),
        Platform::Unix => Invocation::new(paths.shell_script.display().to_string(), paths.root()),
    }
}

/// Run the packaging script for `platform`, blocking until it exits.
pub fn run_packaging_script(
    runner: &dyn ProcessRunner,
    paths: &FizzPaths,
    platform: Platform,
) -> RunOutcome {
    match runner.run(&script_invocation(paths, platform)) {
        Ok(status) if status.success => RunOutcome::Succeeded,
        Ok(status) => RunOutcome::Failed { code: status.code },
        Err(e) => RunOutcome::Unavailable {
            message: e.to_string(),
        },
    }
}

/// Patch both scripts, then optionally run the platform script.
///
/// The run step is attempted only when patching succeeded. A failed run is
/// reported in [`ScriptReport::run`] and does not clear `patched`.
pub fn patch_and_run(
    runner: &dyn ProcessRunner,
    paths: &FizzPaths,
    old: &UnitName,
    new: &UnitName,
    run: bool,
) -> ScriptReport {
    if let Err(e) = patch_scripts(paths, old, new) {
        return ScriptReport {
            patched: false,
            error: Some(e.to_string()),
            run: RunOutcome::Skipped,
        };
    }

    let run = if run {
        run_packaging_script(runner, paths, Platform::current())
    } else {
        RunOutcome::Skipped
    };

    ScriptReport {
        patched: true,
        error: None,
        run,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::process::RunStatus;
    use std::cell::RefCell;
    use tempfile::TempDir;

    fn name(s: &str) -> UnitName {
        UnitName::new(s).unwrap()
    }

    #[test]
    fn patch_rewrites_pushd_and_archive() {
        let text = "pushd myfn\nzip -r ../myfn.zip .\npopd\n";
        let out = patch_text(text, &name("myfn"), &name("newfn")).unwrap();
        assert_eq!(out, "pushd newfn\nzip -r ../newfn.zip .\npopd\n");
    }

    #[test]
    fn patch_respects_word_boundaries() {
        let text = "pushd myfnx\npushd myfn\nother-myfn-thing\nbigmyfn.zip\n";
        let out = patch_text(text, &name("myfn"), &name("bar")).unwrap();
        assert_eq!(out, "pushd myfnx\npushd bar\nother-myfn-thing\nbigmyfn.zip\n");
    }

    #[test]
    fn patch_escapes_name() {
        let text = "pushd a.b\nzip ../a.b.zip\nzip ../axb.zip\n";
        let out = patch_text(text, &name("a.b"), &name("c")).unwrap();
        assert_eq!(out, "pushd c\nzip ../c.zip\nzip ../axb.zip\n");
    }

    #[test]
    fn replacement_is_literal() {
        let out = patch_text("pushd old\n", &name("old"), &name("$1x")).unwrap();
        assert_eq!(out, "pushd $1x\n");
    }

    struct Fixture {
        _dir: TempDir,
        paths: FizzPaths,
    }

    fn fixture(with_batch: bool) -> Fixture {
        let dir = TempDir::new().unwrap();
        let paths = FizzPaths::with_defaults(dir.path().to_path_buf());
        fs::write(&paths.shell_script, "pushd foo\nzip -r ../foo.zip .\npopd\n").unwrap();
        if with_batch {
            fs::write(&paths.batch_script, "pushd foo\r\ntar -a -cf ..\\foo.zip *\r\n").unwrap();
        }
        Fixture { _dir: dir, paths }
    }

    #[test]
    fn patch_scripts_writes_both_files() {
        let fx = fixture(true);
        patch_scripts(&fx.paths, &name("foo"), &name("bar")).unwrap();

        let sh = fs::read_to_string(&fx.paths.shell_script).unwrap();
        let bat = fs::read_to_string(&fx.paths.batch_script).unwrap();
        assert!(sh.contains("pushd bar") && sh.contains("../bar.zip"));
        assert!(bat.contains("pushd bar") && bat.contains("..\\bar.zip"));
    }

    #[test]
    fn missing_script_leaves_other_untouched() {
        let fx = fixture(false);
        let err = patch_scripts(&fx.paths, &name("foo"), &name("bar")).unwrap_err();
        assert!(matches!(err, ScriptError::Read { .. }));

        let sh = fs::read_to_string(&fx.paths.shell_script).unwrap();
        assert!(sh.contains("pushd foo"));
    }

    struct Recorder {
        status: std::io::Result<RunStatus>,
        calls: RefCell<Vec<Invocation>>,
    }

    impl ProcessRunner for Recorder {
        fn run(&self, invocation: &Invocation) -> std::io::Result<RunStatus> {
            self.calls.borrow_mut().push(invocation.clone());
            match &self.status {
                Ok(status) => Ok(*status),
                Err(e) => Err(std::io::Error::new(e.kind(), e.to_string())),
            }
        }
    }

    #[test]
    fn run_failure_is_downgraded() {
        let fx = fixture(true);
        let runner = Recorder {
            status: Ok(RunStatus::failed(2)),
            calls: RefCell::new(Vec::new()),
        };

        let report = patch_and_run(&runner, &fx.paths, &name("foo"), &name("bar"), true);
        assert!(report.patched);
        assert_eq!(report.run, RunOutcome::Failed { code: Some(2) });
        assert!(report.run.is_warning());
        assert_eq!(runner.calls.borrow().len(), 1);
    }

    #[test]
    fn patch_failure_skips_run() {
        let fx = fixture(false);
        let runner = Recorder {
            status: Ok(RunStatus::ok()),
            calls: RefCell::new(Vec::new()),
        };

        let report = patch_and_run(&runner, &fx.paths, &name("foo"), &name("bar"), true);
        assert!(!report.patched);
        assert!(report.error.is_some());
        assert_eq!(report.run, RunOutcome::Skipped);
        assert!(runner.calls.borrow().is_empty());
    }

    #[test]
    fn spawn_error_is_unavailable() {
        let fx = fixture(true);
        let runner = Recorder {
            status: Err(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "permission denied",
            )),
            calls: RefCell::new(Vec::new()),
        };

        let outcome = run_packaging_script(&runner, &fx.paths, Platform::Unix);
        assert!(matches!(outcome, RunOutcome::Unavailable { .. }));
    }

    #[test]
    fn invocation_per_platform() {
        let paths = FizzPaths::with_defaults(PathBuf::from("/proj"));

        let unix = script_invocation(&paths, Platform::Unix);
        assert_eq!(unix.program, paths.shell_script.display().to_string());
        assert!(unix.args.is_empty());

        let windows = script_invocation(&paths, Platform::Windows);
        assert_eq!(windows.program, "cmd");
        assert_eq!(windows.args[0], "/C");
        assert_eq!(windows.cwd, PathBuf::from("/proj"));
    }
}
