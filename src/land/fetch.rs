//! Patch fetching and commit-set verification
//!
//! Fetches the pull request's merge ref and checks that the commits it
//! carries are exactly the ones the provider says it should. Verification
//! precedes mutation, always: nothing here touches the working tree, and a
//! mismatch fails before any component that does.

use crate::error::{Error, Result};
use crate::git::GitClient;
use crate::types::CommitRange;
use std::collections::HashSet;

/// Fetches and verifies the staged commit range for a pull request
pub struct PatchFetcher<'a> {
    git: &'a GitClient,
    upstream: String,
}

impl<'a> PatchFetcher<'a> {
    /// Create a fetcher pulling merge refs from `upstream`
    pub fn new(git: &'a GitClient, upstream: impl Into<String>) -> Self {
        Self {
            git,
            upstream: upstream.into(),
        }
    }

    /// Fetch the merge ref for `pr_id` and verify its commit set
    ///
    /// The merge ref is the hypothetical result of merging the pull request;
    /// its first parent is the base, its second parent the head. The actual
    /// `base..head` commit list must equal `expected` as a set, or the whole
    /// landing fails with every discrepancy listed - no working-tree
    /// mutation has happened at that point.
    pub fn fetch_and_verify(&self, pr_id: u64, expected: &[String]) -> Result<CommitRange> {
        let refspec = format!("pull/{pr_id}/merge");
        self.git.fetch(&self.upstream, &refspec)?;

        let merge_ref = self.git.rev_parse("FETCH_HEAD")?;
        let base = self.git.parent(&merge_ref, 1)?;
        let head = self.git.parent(&merge_ref, 2)?;

        let range = format!("{base}..{head}");
        let actual = self.git.rev_list_oldest_first(&range)?;

        let expected_set: HashSet<&str> = expected.iter().map(String::as_str).collect();
        let actual_set: HashSet<&str> = actual.iter().map(String::as_str).collect();

        let missing: Vec<String> = expected
            .iter()
            .filter(|sha| !actual_set.contains(sha.as_str()))
            .cloned()
            .collect();
        let unexpected: Vec<String> = actual
            .iter()
            .filter(|sha| !expected_set.contains(sha.as_str()))
            .cloned()
            .collect();

        if !missing.is_empty() || !unexpected.is_empty() {
            return Err(Error::Verification {
                missing,
                unexpected,
            });
        }

        tracing::debug!(pr_id, commits = actual.len(), "commit set verified");
        Ok(CommitRange {
            base,
            head,
            shas: actual,
        })
    }
}
