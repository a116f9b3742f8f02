//! Upstream sync checking
//!
//! Compares the local branch against its upstream tracking ref and lists
//! "stray" commits (present locally, absent upstream). Resyncing discards
//! local work, so it only ever happens with explicit operator consent.

use crate::error::Result;
use crate::git::GitClient;
use crate::prompt::Prompter;

/// Outcome of a sync attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Local branch already matches upstream
    InSync,
    /// Local branch was hard-reset to upstream
    Resynced,
    /// Stray commits exist but the operator declined the reset
    Declined,
}

/// Read-only queries plus an opt-in resync against upstream
pub struct SyncChecker<'a> {
    git: &'a GitClient,
    upstream: String,
    branch: String,
}

impl<'a> SyncChecker<'a> {
    /// Create a checker for `upstream`/`branch`
    pub fn new(git: &'a GitClient, upstream: impl Into<String>, branch: impl Into<String>) -> Self {
        Self {
            git,
            upstream: upstream.into(),
            branch: branch.into(),
        }
    }

    /// Sha of the current HEAD
    pub fn current_revision(&self) -> Result<String> {
        self.git.rev_parse("HEAD")
    }

    /// Name of the currently checked out branch
    pub fn current_branch_name(&self) -> Result<String> {
        self.git.current_branch()
    }

    /// Sha of the upstream tracking ref
    pub fn upstream_head(&self) -> Result<String> {
        self.git
            .rev_parse(&format!("{}/{}", self.upstream, self.branch))
    }

    /// Commits reachable from `ref_name` but not from upstream, oldest first
    pub fn stray_commits(&self, ref_name: &str) -> Result<Vec<String>> {
        let range = format!("{}/{}..{}", self.upstream, self.branch, ref_name);
        self.git.rev_list_oldest_first(&range)
    }

    /// Fetch upstream and, with consent, hard-reset the local branch onto it
    ///
    /// Declining leaves the branch untouched; that is an escape hatch for
    /// operators who know their strays are wanted, not an error.
    pub fn try_sync(&self, prompter: &dyn Prompter) -> Result<SyncOutcome> {
        self.git.fetch(&self.upstream, &self.branch)?;

        let strays = self.stray_commits("HEAD")?;
        if strays.is_empty() {
            tracing::debug!("local branch matches upstream");
            return Ok(SyncOutcome::InSync);
        }

        tracing::warn!(count = strays.len(), "local branch has stray commits");
        let question = format!(
            "Local branch has {} commit(s) not on {}/{}:\n{}\nReset local branch to {}/{}?",
            strays.len(),
            self.upstream,
            self.branch,
            strays
                .iter()
                .map(|s| format!("  {s}"))
                .collect::<Vec<_>>()
                .join("\n"),
            self.upstream,
            self.branch,
        );
        if !prompter.confirm(&question, true)? {
            return Ok(SyncOutcome::Declined);
        }

        let target = format!("{}/{}", self.upstream, self.branch);
        self.git.reset_hard(&target)?;
        Ok(SyncOutcome::Resynced)
    }
}
