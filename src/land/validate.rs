//! Final validation and landed-range reporting
//!
//! Runs the configured external lint runner and message validator, and
//! computes the landed commit range for reporting. The validator is opaque:
//! exit 0 passes, a distinguished exit code means "message failed validation
//! rules" and may be overridden by the operator, anything else is fatal.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::exec::{CommandRunner, RunOptions};
use crate::prompt::Prompter;
use crate::sync::SyncChecker;
use crate::types::LandedRange;
use std::path::PathBuf;

/// Exit code the validator uses for rule failures (offerable override)
const VALIDATION_FAILED_EXIT: i32 = 1;

/// Runs external validation and reports the landed range
pub struct LandValidator<'a> {
    runner: &'a dyn CommandRunner,
    config: &'a Config,
    root: PathBuf,
}

impl<'a> LandValidator<'a> {
    /// Create a validator running commands at `root`
    pub fn new(runner: &'a dyn CommandRunner, config: &'a Config, root: impl Into<PathBuf>) -> Self {
        Self {
            runner,
            config,
            root: root.into(),
        }
    }

    /// Run the configured lint command, if any
    ///
    /// Skipped entirely when disabled or on an unsupported platform. A
    /// failure halts the landing; lint problems are never auto-repaired.
    pub fn run_lint(&self) -> Result<()> {
        let Some(ref lint) = self.config.lint else {
            return Ok(());
        };
        if !lint.enabled {
            tracing::debug!("lint disabled by configuration");
            return Ok(());
        }
        if !cfg!(unix) {
            tracing::debug!("lint skipped on unsupported platform");
            return Ok(());
        }

        let mut parts = lint.command.split_whitespace();
        let Some(program) = parts.next() else {
            return Ok(());
        };
        let args: Vec<&str> = parts.collect();

        let out = self
            .runner
            .run(program, &args, &RunOptions::default().in_dir(&self.root))?;
        if out.success() {
            Ok(())
        } else {
            Err(Error::Lint(format!(
                "'{}' exited with {:?}; fix the problems and land again",
                lint.command, out.exit_code
            )))
        }
    }

    /// Run the configured message validator against `sha`
    ///
    /// Exit 0 passes. Exit 1 offers the operator a forced override (default:
    /// decline). Any other nonzero exit is fatal and not offerable.
    pub fn validate_commit(&self, sha: &str, prompter: &dyn Prompter) -> Result<()> {
        let Some(ref validator) = self.config.validator else {
            tracing::debug!("no message validator configured");
            return Ok(());
        };

        let mut parts = validator.split_whitespace();
        let Some(program) = parts.next() else {
            return Ok(());
        };
        let mut args: Vec<&str> = parts.collect();
        args.push(sha);

        let out = self
            .runner
            .run(program, &args, &RunOptions::default().in_dir(&self.root))?;

        match out.exit_code {
            Some(0) => Ok(()),
            Some(VALIDATION_FAILED_EXIT) => {
                let question = format!(
                    "'{validator}' reported commit message problems on {sha}. Land anyway?"
                );
                if prompter.confirm(&question, false)? {
                    tracing::warn!(sha, "landing with failed message validation (forced)");
                    Ok(())
                } else {
                    Err(Error::Validation(format!(
                        "commit {sha} failed '{validator}'"
                    )))
                }
            }
            code => Err(Error::Validation(format!(
                "'{validator}' exited with {code:?} on {sha}"
            ))),
        }
    }

    /// Validate the landed commit and report the final range
    ///
    /// Exactly one stray commit may remain from this landing; more is fatal
    /// because this engine lands one logical commit per pull request.
    pub fn finalize(&self, sync: &SyncChecker<'_>, prompter: &dyn Prompter) -> Result<LandedRange> {
        let strays = sync.stray_commits("HEAD")?;
        match strays.as_slice() {
            [] => Err(Error::Internal(
                "no stray commit found after landing; nothing to finalize".to_string(),
            )),
            [sha] => {
                self.validate_commit(sha, prompter)?;
                Ok(LandedRange::Single(sha.clone()))
            }
            more => Err(Error::MultipleStrayCommits(more.len())),
        }
    }
}

/// Describe strays as a landed range, for diagnostics
///
/// One stray reports as its sha; several report as
/// `upstream_head...last_stray` so the operator sees the whole span.
pub fn landed_range(upstream_head: &str, strays: &[String]) -> Option<LandedRange> {
    match strays {
        [] => None,
        [sha] => Some(LandedRange::Single(sha.clone())),
        more => Some(LandedRange::Range {
            upstream_head: upstream_head.to_string(),
            last: more.last().cloned().unwrap_or_default(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn landed_range_single_and_span() {
        assert_eq!(landed_range("up", &[]), None);
        assert_eq!(
            landed_range("up", &["aaa".to_string()]),
            Some(LandedRange::Single("aaa".to_string()))
        );
        assert_eq!(
            landed_range("up", &["aaa".to_string(), "bbb".to_string()]),
            Some(LandedRange::Range {
                upstream_head: "up".to_string(),
                last: "bbb".to_string(),
            })
        );
    }
}
