//! Land command - land a pull request onto the local release branch

use crate::cli::context::CommandContext;
use crate::cli::style::{Stylize, check, link, spinner_style};
use anstream::println;
use indicatif::ProgressBar;
use landr::config::ConfigSnapshot;
use landr::error::{Error, Result};
use landr::land::{
    LandValidator, PatchFetcher, Squasher, amend_with_consent, apply_with_checkpoint,
    reconcile_trailers, save_message_file,
};
use landr::prompt::{DefaultAnswerPrompter, Prompter, TerminalPrompter};
use landr::session::{SessionPatch, SessionState, SessionStore};
use landr::sync::{SyncChecker, SyncOutcome};
use landr::types::PrMetadata;
use std::path::Path;
use std::time::Duration;

/// Options for the land command
#[derive(Debug, Clone, Default)]
pub struct LandOptions {
    /// Answer every prompt with its default (headless runs)
    pub yes: bool,
    /// Emit Backport-PR-URL instead of PR-URL for this pull request
    pub backport: bool,
    /// Discard the session and scratch files instead of landing
    pub abort: bool,
}

/// Run the land command
#[allow(clippy::too_many_lines)]
pub async fn run_land(path: &Path, pr_id: u64, options: LandOptions) -> Result<()> {
    let ctx = CommandContext::new(path)?;
    let store = SessionStore::new(&ctx.workspace_root, pr_id);
    let prompter: Box<dyn Prompter> = if options.yes {
        Box::new(DefaultAnswerPrompter)
    } else {
        Box::new(TerminalPrompter)
    };

    if options.abort {
        store.cleanup()?;
        println!("{} Session for PR #{pr_id} discarded", check());
        return Ok(());
    }

    // A session left behind by a different pull request must never leak into
    // this one; it is discarded with consent, not merged.
    if let Some(other) = store.stale_session_id()? {
        let question = format!("A session for PR #{other} exists. Discard it and continue?");
        if !prompter.confirm(&question, false)? {
            return Err(Error::Session(format!(
                "session for PR #{other} still occupies this working tree; \
                 finish it or run 'landr land {other} --abort'"
            )));
        }
        store.discard_stale()?;
        println!("{}", format!("Discarded stale session for PR #{other}").muted());
    }

    // =========================================================================
    // Phase 1: GATHER - session, sync state, and provider metadata
    // =========================================================================

    let session = match store.restore()? {
        Some(session) => {
            println!(
                "{} {}",
                "Resuming session for".emphasis(),
                format!("PR #{pr_id} ({})", session.state).accent()
            );
            session
        }
        None => store.start(ConfigSnapshot::from(&ctx.config))?,
    };

    let sync = SyncChecker::new(&ctx.git, &session.config.upstream, &session.config.branch);

    let branch = sync.current_branch_name()?;
    if branch != session.config.branch {
        return Err(Error::GitOperation(format!(
            "on branch '{branch}' but landing targets '{}'; check out the right branch first",
            session.config.branch
        )));
    }

    // A resumed session reuses the metadata cached at the first attempt, so a
    // restart after conflict resolution works without network access.
    let cached = if session.state == SessionState::Started {
        None
    } else {
        store.load_metadata()?
    };
    let metadata = match cached {
        Some(metadata) => {
            println!(
                "{} {}",
                check(),
                format!("Using cached metadata for PR #{pr_id}: {}", metadata.title).muted()
            );
            metadata
        }
        None => {
            let provider = ctx.provider()?;

            let spinner = ProgressBar::new_spinner();
            spinner.set_style(spinner_style());
            spinner.set_message(format!("Fetching metadata for PR #{pr_id}..."));
            spinner.enable_steady_tick(Duration::from_millis(80));

            let metadata = provider.pr_metadata(pr_id, options.backport).await?;

            spinner.finish_with_message(format!(
                "{} {}",
                check(),
                link(&format!("PR #{pr_id}: {}", metadata.title), &metadata.html_url)
            ));

            store.save_metadata(&metadata)?;
            metadata
        }
    };

    // =========================================================================
    // Phase 2: APPLY - verify the commit set, then mutate the tree
    // =========================================================================

    if session.state == SessionState::Started {
        match sync.try_sync(prompter.as_ref())? {
            SyncOutcome::InSync => {}
            SyncOutcome::Resynced => {
                println!(
                    "{} Reset {} to {}/{}",
                    check(),
                    branch.accent(),
                    session.config.upstream,
                    session.config.branch
                );
            }
            SyncOutcome::Declined => {
                println!("{}", "Keeping local commits; continuing without resync".warn());
            }
        }

        // Verification precedes mutation, always
        let fetcher = PatchFetcher::new(&ctx.git, &session.config.upstream);
        let range = fetcher.fetch_and_verify(pr_id, &metadata.expected_shas)?;
        println!(
            "{} Verified {} commit(s) in {}",
            check(),
            range.shas.len().accent(),
            range.notation().muted()
        );

        apply_with_checkpoint(&ctx.git, &store, &range)?;
        println!("{} Applied {}", check(), range.notation().accent());

        Squasher::new(&ctx.git).fold_if_needed(&range.shas, prompter.as_ref())?;
        store.update(SessionPatch::state(SessionState::Amending))?;
    } else {
        // Resuming after a restart: the branch must still carry this
        // landing's commits (the operator finished any interrupted pick
        // manually). A branch with nothing ahead of upstream means the
        // session does not describe this tree, and amending HEAD would
        // rewrite an unrelated upstream commit.
        let strays = sync.stray_commits("HEAD")?;
        if strays.is_empty() {
            return Err(Error::Session(format!(
                "session for PR #{pr_id} is in state '{}' but the branch has no \
                 commits ahead of {}/{}; discard it with 'landr land {pr_id} --abort' \
                 and land again",
                session.state, session.config.upstream, session.config.branch
            )));
        }
        println!(
            "{}",
            "Tree assumed up to date; continuing with message amendment".muted()
        );
        if session.state == SessionState::Applying {
            let applied = session.applied_count.unwrap_or(strays.len());
            Squasher::new(&ctx.git).fold_resumed(&strays, applied, prompter.as_ref())?;
            store.update(SessionPatch::state(SessionState::Amending))?;
        }
    }

    // =========================================================================
    // Phase 3: AMEND - reconcile trailers and rewrite the message
    // =========================================================================

    amend_message(&ctx, &store, &metadata, prompter.as_ref())?;

    // =========================================================================
    // Phase 4: FINALIZE - lint, validate, report
    // =========================================================================

    let validator = LandValidator::new(ctx.runner.as_ref(), &ctx.config, &ctx.workspace_root);
    validator.run_lint()?;
    let landed = validator.finalize(&sync, prompter.as_ref())?;

    store.cleanup()?;

    println!();
    println!(
        "{} {} {}",
        format!("{} Landed", check()).success(),
        landed.to_string().accent(),
        format!("({})", metadata.html_url).muted()
    );
    println!(
        "{}",
        format!(
            "Push when ready: git push {} {}",
            ctx.config.upstream, ctx.config.branch
        )
        .muted()
    );
    Ok(())
}

/// Reconcile metadata trailers into HEAD's message and amend with consent
fn amend_message(
    ctx: &CommandContext,
    store: &SessionStore,
    metadata: &PrMetadata,
    prompter: &dyn Prompter,
) -> Result<()> {
    let original = ctx.git.head_message()?;
    let has_trailers = ctx.git.message_has_trailers(&original)?;

    let reconciled = reconcile_trailers(&original, &metadata.trailer_lines, has_trailers)?;
    for line in &reconciled.skipped {
        println!("{}", format!("⚠ already applied: {line}").warn());
    }

    println!();
    println!("{}:", "Amended commit message".emphasis());
    for line in &reconciled.lines {
        println!("  {line}");
    }
    println!();

    let scratch = store.ensure_scratch_dir()?;
    let message_file = save_message_file(&ctx.git, &scratch, &reconciled.text())?;

    amend_with_consent(
        &ctx.git,
        ctx.runner.as_ref(),
        &message_file,
        ctx.config.editor.as_deref(),
        prompter,
    )
}
