//! Error types for landr

use thiserror::Error;

/// Result type alias using our error type
pub type Result<T> = std::result::Result<T, Error>;

/// All errors that can occur in landr
#[derive(Debug, Error)]
pub enum Error {
    /// Required configuration is missing or invalid
    #[error("Configuration error: {0}")]
    Config(String),

    /// The fetched commit set does not match the expected set
    #[error("Commit set mismatch:\n{details}", details = format_verification(.missing, .unexpected))]
    Verification {
        /// Commits expected but not present in the fetched range
        missing: Vec<String>,
        /// Commits present in the fetched range but not expected
        unexpected: Vec<String>,
    },

    /// A git subprocess failed
    #[error("Git operation failed: {0}")]
    GitOperation(String),

    /// The external lint runner reported failures
    #[error("Lint failed: {0}")]
    Lint(String),

    /// A generated trailer collides with unclassifiable message text
    #[error("Trailer conflict: {0}")]
    TrailerConflict(String),

    /// The external message validator rejected the landed commit
    #[error("Commit message validation failed: {0}")]
    Validation(String),

    /// More than one stray commit remains; this engine lands exactly one
    #[error("Found {0} stray commits; refusing to land more than one logical commit")]
    MultipleStrayCommits(usize),

    /// Session persistence failed or the session is unusable
    #[error("Session error: {0}")]
    Session(String),

    /// The PR metadata provider failed
    #[error("Provider error: {0}")]
    Provider(String),

    /// Editor invocation or message re-read failed
    #[error("Editor error: {0}")]
    Editor(String),

    /// No usable upstream remote was found
    #[error("Remote not found: {0}")]
    RemoteNotFound(String),

    /// The operator declined a step the landing cannot proceed without
    #[error("Aborted: {0}")]
    Aborted(String),

    /// Internal error (prompt I/O, bad invariants)
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Render one line per discrepancy so the operator sees every sha.
fn format_verification(missing: &[String], unexpected: &[String]) -> String {
    let mut lines = Vec::with_capacity(missing.len() + unexpected.len());
    for sha in missing {
        lines.push(format!("  missing: {sha}"));
    }
    for sha in unexpected {
        lines.push(format!("  unexpected: {sha}"));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verification_error_lists_every_discrepancy() {
        let err = Error::Verification {
            missing: vec!["aaa111".to_string()],
            unexpected: vec!["bbb222".to_string(), "ccc333".to_string()],
        };
        let msg = err.to_string();
        assert!(msg.contains("missing: aaa111"));
        assert!(msg.contains("unexpected: bbb222"));
        assert!(msg.contains("unexpected: ccc333"));
    }

    #[test]
    fn multiple_stray_commits_names_the_count() {
        let err = Error::MultipleStrayCommits(3);
        assert!(err.to_string().contains('3'));
    }
}
