//! Structured subprocess invocation.
//!
//! Commands are described as a program plus an argument vector and run
//! directly through `std::process::Command`; nothing is ever handed to a
//! shell. All execution goes through the [`CommandRunner`] trait so the
//! deployer can be driven by a recording runner in tests.

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::error::{Result, TfopsError};

/// A single external invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }
}

impl fmt::Display for CommandSpec {
    /// Human-readable rendering for logs only; never executed.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                write!(f, " '{arg}'")?;
            } else {
                write!(f, " {arg}")?;
            }
        }
        Ok(())
    }
}

/// Whether stdout/stderr are captured or streamed to the operator's terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capture {
    Inherit,
    Piped,
}

/// Result of a command that ran to completion (any exit status).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// Turn a non-zero exit into `TfopsError::CommandFailed`.
    pub fn check(self, spec: &CommandSpec) -> Result<CommandOutput> {
        if self.success() {
            return Ok(self);
        }
        Err(TfopsError::CommandFailed {
            command: spec.to_string(),
            code: self.code,
            stderr: self.stderr,
        })
    }
}

pub trait CommandRunner {
    /// Run `spec` to completion. Spawn failures are errors; a non-zero exit
    /// is not, callers decide with [`CommandOutput::check`].
    fn run(&self, spec: &CommandSpec, capture: Capture) -> Result<CommandOutput>;
}

/// Runs commands on the host.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, spec: &CommandSpec, capture: Capture) -> Result<CommandOutput> {
        let program = resolve_program(&spec.program).ok_or_else(|| TfopsError::SpawnFailed {
            program: spec.program.clone(),
            reason: "not found on PATH".to_string(),
        })?;

        let mut cmd = Command::new(&program);
        cmd.args(&spec.args);
        if let Some(dir) = &spec.cwd {
            cmd.current_dir(dir);
        }
        cmd.stdin(Stdio::inherit());
        match capture {
            Capture::Inherit => {
                cmd.stdout(Stdio::inherit());
                cmd.stderr(Stdio::inherit());
            }
            Capture::Piped => {
                cmd.stdin(Stdio::null());
                cmd.stdout(Stdio::piped());
                cmd.stderr(Stdio::piped());
            }
        }

        tracing::debug!(command = %spec, ?capture, "spawning");
        let output = cmd.output().map_err(|e| TfopsError::SpawnFailed {
            program: spec.program.clone(),
            reason: e.to_string(),
        })?;
        let result = CommandOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };
        tracing::debug!(command = %spec, code = ?result.code, "exited");
        Ok(result)
    }
}

/// Bare names are looked up on PATH; anything with a separator is used as-is.
fn resolve_program(program: &str) -> Option<PathBuf> {
    let as_path = Path::new(program);
    if as_path.components().count() > 1 {
        return std::fs::canonicalize(as_path).ok();
    }
    which::which(program).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_quotes_only_when_needed() {
        let spec = CommandSpec::new("terraform")
            .args(["plan", "-var-file=terraform.tfvars"])
            .arg("-out=my plan");
        assert_eq!(
            spec.to_string(),
            "terraform plan -var-file=terraform.tfvars '-out=my plan'"
        );
    }

    #[test]
    fn check_maps_non_zero_exit_to_error() {
        let spec = CommandSpec::new("terraform").arg("validate");
        let out = CommandOutput {
            code: Some(1),
            stdout: String::new(),
            stderr: "boom".into(),
        };
        match out.check(&spec) {
            Err(TfopsError::CommandFailed {
                command,
                code,
                stderr,
            }) => {
                assert_eq!(command, "terraform validate");
                assert_eq!(code, Some(1));
                assert_eq!(stderr, "boom");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn missing_program_is_a_spawn_failure() {
        let spec = CommandSpec::new("tfops-definitely-not-a-real-binary").arg("version");
        match SystemRunner.run(&spec, Capture::Piped) {
            Err(TfopsError::SpawnFailed { program, .. }) => {
                assert_eq!(program, "tfops-definitely-not-a-real-binary")
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn system_runner_captures_output_and_status() {
        let dir = tempfile::TempDir::new().unwrap();
        let spec = CommandSpec::new("sh")
            .args(["-c", "pwd; echo oops >&2; exit 3"])
            .current_dir(dir.path());
        let out = SystemRunner.run(&spec, Capture::Piped).unwrap();
        assert_eq!(out.code, Some(3));
        assert!(!out.success());
        assert_eq!(out.stderr.trim(), "oops");
        let reported = std::fs::canonicalize(out.stdout.trim()).unwrap();
        assert_eq!(reported, std::fs::canonicalize(dir.path()).unwrap());
    }
}
