//! Shared command context for CLI commands
//!
//! Extracts the common setup shared by land, status, and sync: loading
//! config and building the git client. Metadata provider detection is
//! deferred to the one command that talks to a provider.

use landr::config::{Config, load_config};
use landr::error::Result;
use landr::exec::{CommandRunner, SystemRunner};
use landr::git::GitClient;
use landr::provider::{GitHubProvider, MetadataProvider, parse_repo_info};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Shared context for CLI commands
///
/// Note: does NOT hold a session store; sessions are scoped to one pull
/// request, which only the land command knows.
pub struct CommandContext {
    /// Root of the working tree being operated on
    pub workspace_root: PathBuf,
    /// Resolved configuration (global + repo-local)
    pub config: Config,
    /// Subprocess runner shared by all components
    pub runner: Arc<dyn CommandRunner>,
    /// Git client for the working tree
    pub git: GitClient,
}

impl CommandContext {
    /// Create a new command context for the working tree at `path`
    ///
    /// Config gates everything: identity and remote settings must be
    /// present before any session is created.
    pub fn new(path: &Path) -> Result<Self> {
        let workspace_root = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());

        let config = load_config(&workspace_root)?;

        let runner: Arc<dyn CommandRunner> = Arc::new(SystemRunner);
        let git = GitClient::new(Arc::clone(&runner), &workspace_root);

        Ok(Self {
            workspace_root,
            config,
            runner,
            git,
        })
    }

    /// Detect the metadata provider from the upstream remote URL
    ///
    /// Built on demand: status and sync never talk to a provider, and a
    /// resumed landing with cached metadata skips the lookup entirely.
    pub fn provider(&self) -> Result<Box<dyn MetadataProvider>> {
        let remote = self.git.remote_url(&self.config.upstream)?;
        let repo_info = parse_repo_info(&remote.url)?;
        let token = std::env::var("GITHUB_TOKEN").ok();
        Ok(Box::new(GitHubProvider::new(repo_info, token)?))
    }
}
