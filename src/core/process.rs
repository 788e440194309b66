//! core::process
//!
//! Blocking execution of external programs.
//!
//! # Architecture
//!
//! Two collaborators live outside this crate: the Fission CLI (which
//! regenerates package declarations) and the project's packaging scripts.
//! Both are reached through the [`ProcessRunner`] trait so the engine can
//! be driven by a fake runner in tests.
//!
//! Execution is synchronous with inherited stdio: output streams straight
//! to the user's terminal and nothing is captured. There is no timeout.

use std::fmt;
use std::io;
use std::path::PathBuf;
use std::process::{Command, Stdio};

/// A program invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Program to run (resolved through `PATH` unless it contains a separator).
    pub program: String,
    /// Arguments, passed without shell interpretation.
    pub args: Vec<String>,
    /// Working directory.
    pub cwd: PathBuf,
}

impl Invocation {
    /// Create an invocation with no arguments.
    pub fn new(program: impl Into<String>, cwd: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: cwd.into(),
        }
    }

    /// Append an argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// How a finished process exited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunStatus {
    /// Whether the process exited successfully.
    pub success: bool,
    /// Exit code, if the process exited normally.
    pub code: Option<i32>,
}

impl RunStatus {
    /// A successful exit.
    pub fn ok() -> Self {
        Self {
            success: true,
            code: Some(0),
        }
    }

    /// A failed exit with the given code.
    pub fn failed(code: i32) -> Self {
        Self {
            success: false,
            code: Some(code),
        }
    }
}

/// Runs external programs to completion.
pub trait ProcessRunner {
    /// Run `invocation`, blocking until it exits.
    ///
    /// # Errors
    ///
    /// Returns the spawn error if the program could not be started
    /// (missing binary, missing execute permission).
    fn run(&self, invocation: &Invocation) -> io::Result<RunStatus>;
}

/// Runs programs with `std::process::Command`, inheriting stdio.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    fn run(&self, invocation: &Invocation) -> io::Result<RunStatus> {
        let status = Command::new(&invocation.program)
            .args(&invocation.args)
            .current_dir(&invocation.cwd)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()?;

        Ok(RunStatus {
            success: status.success(),
            code: status.code(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invocation_display() {
        let inv = Invocation::new("fission", "/proj")
            .args(["package", "create"])
            .arg("--spec");
        assert_eq!(inv.to_string(), "fission package create --spec");
    }

    #[test]
    fn system_runner_reports_spawn_failure() {
        let dir = tempfile::TempDir::new().unwrap();
        let inv = Invocation::new("definitely-not-a-real-program-fizz", dir.path());
        assert!(SystemRunner.run(&inv).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn system_runner_reports_exit_code() {
        let dir = tempfile::TempDir::new().unwrap();
        let inv = Invocation::new("sh", dir.path()).args(["-c", "exit 3"]);
        let status = SystemRunner.run(&inv).unwrap();
        assert_eq!(status, RunStatus::failed(3));
    }
}
