//! Sync command - resync the local branch with upstream

use crate::cli::context::CommandContext;
use crate::cli::style::{Stylize, check};
use anstream::println;
use landr::error::Result;
use landr::prompt::{DefaultAnswerPrompter, Prompter, TerminalPrompter};
use landr::sync::{SyncChecker, SyncOutcome};
use std::path::Path;

/// Run the sync command
pub fn run_sync(path: &Path, yes: bool) -> Result<()> {
    let ctx = CommandContext::new(path)?;
    let prompter: Box<dyn Prompter> = if yes {
        Box::new(DefaultAnswerPrompter)
    } else {
        Box::new(TerminalPrompter)
    };

    let sync = SyncChecker::new(&ctx.git, &ctx.config.upstream, &ctx.config.branch);

    println!(
        "{}",
        format!("Checking {}/{}...", ctx.config.upstream, ctx.config.branch).muted()
    );

    match sync.try_sync(prompter.as_ref())? {
        SyncOutcome::InSync => {
            println!(
                "{} Already in sync with {}/{}",
                check(),
                ctx.config.upstream,
                ctx.config.branch
            );
        }
        SyncOutcome::Resynced => {
            println!(
                "{} Reset {} to {}/{}",
                check(),
                sync.current_branch_name()?.accent(),
                ctx.config.upstream,
                ctx.config.branch
            );
        }
        SyncOutcome::Declined => {
            println!("{}", "Left local commits in place".warn());
        }
    }

    Ok(())
}
