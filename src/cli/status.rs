//! Status command - report session and branch state

use crate::cli::context::CommandContext;
use crate::cli::style::{Stylize, check};
use anstream::println;
use landr::error::Result;
use landr::land::landed_range;
use landr::session::SessionStore;
use landr::sync::SyncChecker;
use std::path::Path;

/// Run the status command
pub fn run_status(path: &Path) -> Result<()> {
    let ctx = CommandContext::new(path)?;

    match SessionStore::peek(&ctx.workspace_root)? {
        Some(session) => {
            println!(
                "{} {}",
                "Session:".emphasis(),
                format!("PR #{} ({})", session.pull_request_id, session.state).accent()
            );
            println!(
                "  {}",
                format!(
                    "target {}/{}, started by {}",
                    session.config.upstream, session.config.branch, session.config.username
                )
                .muted()
            );
        }
        None => println!("{} No session in progress", check()),
    }

    let sync = SyncChecker::new(&ctx.git, &ctx.config.upstream, &ctx.config.branch);
    let branch = sync.current_branch_name()?;
    let strays = sync.stray_commits("HEAD")?;

    println!("{} {}", "Branch:".emphasis(), branch.accent());
    if strays.is_empty() {
        println!(
            "  {}",
            format!("in sync with {}/{}", ctx.config.upstream, ctx.config.branch).muted()
        );
        return Ok(());
    }

    println!(
        "  {} commit(s) not on {}/{}:",
        strays.len().accent(),
        ctx.config.upstream,
        ctx.config.branch
    );
    for sha in &strays {
        println!("    {}", sha.muted());
    }
    if let Some(range) = landed_range(&sync.upstream_head()?, &strays) {
        println!("  {} {}", "Range:".emphasis(), range.to_string().accent());
    }

    Ok(())
}
