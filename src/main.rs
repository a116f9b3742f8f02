//! landr binary entry point

mod cli;

use anstream::eprintln;
use clap::{Parser, Subcommand};
use cli::LandOptions;
use landr::error::Result;
use owo_colors::OwoColorize;
use std::path::PathBuf;
use std::process::ExitCode;

/// Land pull requests onto a release branch with verified commit sets and
/// reconciled metadata trailers
#[derive(Parser)]
#[command(name = "landr", version, about)]
struct Cli {
    /// Working tree to operate on (defaults to the current directory)
    #[arg(long, global = true, default_value = ".")]
    path: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Land a pull request onto the local release branch
    Land {
        /// Pull request number
        pr: u64,
        /// Answer every prompt with its default
        #[arg(long)]
        yes: bool,
        /// This PR is a backport; emit Backport-PR-URL instead of PR-URL
        #[arg(long)]
        backport: bool,
        /// Discard the in-progress session instead of landing
        #[arg(long)]
        abort: bool,
    },
    /// Show session and branch state
    Status,
    /// Resync the local branch with upstream
    Sync {
        /// Answer every prompt with its default
        #[arg(long)]
        yes: bool,
    },
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Land {
            pr,
            yes,
            backport,
            abort,
        } => {
            cli::run_land(
                &cli.path,
                pr,
                LandOptions {
                    yes,
                    backport,
                    abort,
                },
            )
            .await
        }
        Command::Status => cli::run_status(&cli.path),
        Command::Sync { yes } => cli::run_sync(&cli.path, yes),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {e}", "error:".red().bold());
            ExitCode::FAILURE
        }
    }
}
