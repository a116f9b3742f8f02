//! Pull request metadata providers
//!
//! A provider supplies, for one pull request, the ordered expected commit
//! set and the pre-formatted metadata trailer lines. It is a black box
//! returning structured data; the engine never re-derives either.

mod detection;
mod github;

pub use detection::parse_repo_info;
pub use github::GitHubProvider;

use crate::error::Result;
use crate::types::PrMetadata;
use async_trait::async_trait;

/// Source of expected commits and provenance trailers for a pull request
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Fetch metadata for `pr_id`
    ///
    /// With `backport` set, the distinguished `Backport-PR-URL` line is
    /// emitted instead of `PR-URL`, carrying this pull request's URL; the
    /// original `PR-URL` is expected to already live in the cherry-picked
    /// commit's message.
    async fn pr_metadata(&self, pr_id: u64, backport: bool) -> Result<PrMetadata>;
}
