//! Core types for landr

use serde::{Deserialize, Serialize};

/// The ordered commit range staged for landing
///
/// Produced by the patch fetcher after the fetched commit set has been
/// verified against the provider's expected set. Transient - recomputed per
/// operation, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRange {
    /// Base commit (first parent of the fetched merge ref)
    pub base: String,
    /// Head commit (second parent of the fetched merge ref)
    pub head: String,
    /// Commits in `base..head`, oldest first
    pub shas: Vec<String>,
}

impl CommitRange {
    /// Git range notation for the staged commits
    pub fn notation(&self) -> String {
        format!("{}..{}", self.base, self.head)
    }
}

/// Provenance metadata for a pull request, as supplied by the provider
///
/// `trailer_lines` are pre-formatted `Key: value` lines (e.g. `PR-URL: ...`,
/// `Reviewed-By: ...`) ready to merge into the commit message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrMetadata {
    /// PR number
    pub number: u64,
    /// PR title (for display)
    pub title: String,
    /// Web URL for the PR
    pub html_url: String,
    /// Expected commit ids, in the order the provider reports them
    pub expected_shas: Vec<String>,
    /// Pre-formatted metadata trailer lines, in insertion order
    pub trailer_lines: Vec<String>,
}

/// A git remote
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitRemote {
    /// Remote name (e.g., "upstream")
    pub name: String,
    /// Remote URL
    pub url: String,
}

/// Repository coordinates parsed from the upstream remote URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoInfo {
    /// Repository owner (user or organization)
    pub owner: String,
    /// Repository name
    pub repo: String,
    /// Custom host (None for github.com)
    pub host: Option<String>,
}

/// Outcome of a completed landing, for reporting
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LandedRange {
    /// Exactly one commit landed
    Single(String),
    /// More than one stray commit legitimately remains upstream-relative
    Range {
        /// Upstream head at finalization time
        upstream_head: String,
        /// Last stray commit sha
        last: String,
    },
}

impl std::fmt::Display for LandedRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Single(sha) => write!(f, "{sha}"),
            Self::Range {
                upstream_head,
                last,
            } => write!(f, "{upstream_head}...{last}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_notation() {
        let range = CommitRange {
            base: "aaa".to_string(),
            head: "bbb".to_string(),
            shas: vec!["ccc".to_string()],
        };
        assert_eq!(range.notation(), "aaa..bbb");
    }

    #[test]
    fn landed_range_display() {
        assert_eq!(
            LandedRange::Single("abc123".to_string()).to_string(),
            "abc123"
        );
        let range = LandedRange::Range {
            upstream_head: "aaa".to_string(),
            last: "bbb".to_string(),
        };
        assert_eq!(range.to_string(), "aaa...bbb");
    }
}
