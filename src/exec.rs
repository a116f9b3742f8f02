//! Subprocess execution boundary
//!
//! Every external command (git, lint runner, message validator) goes through
//! the [`CommandRunner`] trait so tests can substitute deterministic fixtures
//! for the real binaries.

use crate::error::{Error, Result};
use std::path::PathBuf;
use std::process::{Command, Stdio};

/// How a command's stdout should be captured
///
/// `Raw` and `Lines` capture the same bytes; `Lines` marks call sites whose
/// consumers read the output through [`CommandOutput::lines`]. The mode is
/// part of each call's contract so test doubles know what shape to script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capture {
    /// Capture stdout as a single trimmed string
    Raw,
    /// Capture stdout to be consumed as non-empty lines
    Lines,
    /// Inherit stdio (interactive commands, e.g. the editor)
    Inherit,
}

/// Options for a single command invocation
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Working directory for the child process
    pub cwd: Option<PathBuf>,
    /// stdout capture mode
    pub capture: Capture,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            cwd: None,
            capture: Capture::Raw,
        }
    }
}

impl RunOptions {
    /// Capture stdout as split lines
    pub fn lines() -> Self {
        Self {
            cwd: None,
            capture: Capture::Lines,
        }
    }

    /// Inherit stdio (no capture)
    pub fn inherit() -> Self {
        Self {
            cwd: None,
            capture: Capture::Inherit,
        }
    }

    /// Run in the given directory
    pub fn in_dir(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }
}

/// Captured result of a command invocation
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    /// Trimmed stdout (empty when capture mode is `Inherit`)
    pub stdout: String,
    /// stderr, kept for diagnostics on failure
    pub stderr: String,
    /// Process exit code (None if killed by signal)
    pub exit_code: Option<i32>,
}

impl CommandOutput {
    /// Whether the command exited zero
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// stdout split into non-empty trimmed lines
    pub fn lines(&self) -> Vec<String> {
        self.stdout
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(String::from)
            .collect()
    }
}

/// Trait for running external commands
///
/// The engine never checks exit codes implicitly; callers decide whether a
/// nonzero exit is fatal, recoverable, or (for validators) offerable.
pub trait CommandRunner: Send + Sync {
    /// Run `program` with `args`, capturing output per `options`
    fn run(&self, program: &str, args: &[&str], options: &RunOptions) -> Result<CommandOutput>;
}

/// Runner backed by real subprocesses
#[derive(Debug, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, program: &str, args: &[&str], options: &RunOptions) -> Result<CommandOutput> {
        tracing::debug!(program, ?args, "running command");

        let mut cmd = Command::new(program);
        cmd.args(args);
        if let Some(ref cwd) = options.cwd {
            cmd.current_dir(cwd);
        }

        let output = match options.capture {
            Capture::Inherit => {
                let status = cmd
                    .stdin(Stdio::inherit())
                    .stdout(Stdio::inherit())
                    .stderr(Stdio::inherit())
                    .status()
                    .map_err(|e| Error::Internal(format!("failed to run {program}: {e}")))?;
                CommandOutput {
                    stdout: String::new(),
                    stderr: String::new(),
                    exit_code: status.code(),
                }
            }
            Capture::Raw | Capture::Lines => {
                let out = cmd
                    .output()
                    .map_err(|e| Error::Internal(format!("failed to run {program}: {e}")))?;
                CommandOutput {
                    stdout: String::from_utf8_lossy(&out.stdout).trim().to_string(),
                    stderr: String::from_utf8_lossy(&out.stderr).trim().to_string(),
                    exit_code: out.status.code(),
                }
            }
        };

        tracing::debug!(program, exit = ?output.exit_code, "command finished");
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lines_splits_and_trims() {
        let out = CommandOutput {
            stdout: "aaa\n  bbb  \n\nccc".to_string(),
            stderr: String::new(),
            exit_code: Some(0),
        };
        assert_eq!(out.lines(), vec!["aaa", "bbb", "ccc"]);
    }

    #[test]
    fn success_requires_zero_exit() {
        let ok = CommandOutput {
            exit_code: Some(0),
            ..Default::default()
        };
        let signal = CommandOutput {
            exit_code: None,
            ..Default::default()
        };
        assert!(ok.success());
        assert!(!signal.success());
    }
}
