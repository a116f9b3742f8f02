//! Cherry-picking and commit folding - effectful working-tree mutation
//!
//! Both operations here leave the tree in a definite state: `apply` either
//! advances HEAD by the full range or restores it exactly, and `fold` only
//! moves the branch pointer with explicit operator consent.

use crate::error::{Error, Result};
use crate::git::GitClient;
use crate::prompt::Prompter;
use crate::session::{SessionPatch, SessionState, SessionStore};
use crate::types::CommitRange;

/// Applies a verified commit range onto the current branch
pub struct CherryPicker<'a> {
    git: &'a GitClient,
}

impl<'a> CherryPicker<'a> {
    /// Create a picker for the given client
    pub const fn new(git: &'a GitClient) -> Self {
        Self { git }
    }

    /// Cherry-pick `range.base..range.head` onto HEAD, all-or-nothing
    ///
    /// On any failure mid-range the in-progress pick is aborted and the
    /// branch is reset to its pre-operation HEAD, so the net mutation is
    /// zero. The original failure is what gets surfaced.
    pub fn apply(&self, range: &CommitRange) -> Result<()> {
        let pre_head = self.git.rev_parse("HEAD")?;

        if let Err(apply_err) = self.git.cherry_pick_range(&range.base, &range.head) {
            tracing::warn!(%apply_err, "cherry-pick failed; rolling back");
            if let Err(abort_err) = self.git.cherry_pick_abort() {
                // No pick may be in progress (e.g. the failure was pre-flight)
                tracing::debug!(%abort_err, "cherry-pick --abort failed");
            }
            self.git.reset_hard(&pre_head)?;
            return Err(apply_err);
        }

        tracing::debug!(commits = range.shas.len(), "range applied");
        Ok(())
    }
}

/// Apply a verified range with a session checkpoint
///
/// The session advances to `Applying` (recording how many commits this
/// landing owns) before the pick, so a process killed mid-pick resumes
/// there. When the pick fails outright the tree is already restored by
/// [`CherryPicker::apply`], and the session checkpoint is rolled back with
/// it - a failed apply must not leave a session claiming the range landed.
pub fn apply_with_checkpoint(
    git: &GitClient,
    store: &SessionStore,
    range: &CommitRange,
) -> Result<()> {
    store.update(SessionPatch {
        state: Some(SessionState::Applying),
        applied_count: Some(range.shas.len()),
        config: None,
    })?;

    if let Err(apply_err) = CherryPicker::new(git).apply(range) {
        store.update(SessionPatch::state(SessionState::Started))?;
        return Err(apply_err);
    }
    Ok(())
}

/// Folds a multi-commit range into a single commit
pub struct Squasher<'a> {
    git: &'a GitClient,
}

impl<'a> Squasher<'a> {
    /// Create a squasher for the given client
    pub const fn new(git: &'a GitClient) -> Self {
        Self { git }
    }

    /// Fold the applied commits into one, if there is more than one
    ///
    /// A single commit is a no-op. For more, the operator must consent;
    /// declining is fatal for this landing attempt - landing a multi-commit
    /// range unfolded is not supported and will not be approximated. On
    /// consent the branch pointer moves back by `len - 1` commits (soft, the
    /// tree is untouched) and the result is amended into one commit that
    /// keeps the first commit's message as its base.
    ///
    /// Returns whether a fold happened.
    pub fn fold_if_needed(&self, shas: &[String], prompter: &dyn Prompter) -> Result<bool> {
        if shas.len() <= 1 {
            return Ok(false);
        }

        let question = format!("Fold {} commits into the first one?", shas.len());
        if !prompter.confirm(&question, true)? {
            return Err(Error::Aborted(format!(
                "landing {} commits requires folding them into one; \
                 split the pull request or fold manually and retry",
                shas.len()
            )));
        }

        self.git.reset_soft_back(shas.len() - 1)?;
        self.git.amend_no_edit()?;
        tracing::debug!(folded = shas.len(), "commits folded");
        Ok(true)
    }

    /// Fold a resumed landing's own commits, leaving earlier strays alone
    ///
    /// `strays` is every commit ahead of upstream, oldest first; `applied`
    /// is the count this landing recorded at apply time. Only the trailing
    /// `applied` commits belong to the landing - anything older is
    /// pre-existing local work the operator chose to keep, and folding it
    /// in would corrupt it. A branch that no longer carries the recorded
    /// commits means the resumed session does not describe this tree, and
    /// the landing refuses to touch HEAD.
    pub fn fold_resumed(
        &self,
        strays: &[String],
        applied: usize,
        prompter: &dyn Prompter,
    ) -> Result<bool> {
        if strays.is_empty() {
            return Err(Error::Session(
                "resumed session expects applied commits but the branch has none \
                 ahead of upstream; discard the session with --abort and land again"
                    .to_string(),
            ));
        }
        if applied == 0 || applied > strays.len() {
            return Err(Error::Session(format!(
                "resumed session records {applied} applied commit(s) but the branch \
                 carries {}; discard the session with --abort and land again",
                strays.len()
            )));
        }

        self.fold_if_needed(&strays[strays.len() - applied..], prompter)
    }
}
