//! Resumable landing sessions
//!
//! One session per working tree, persisted so a half-finished landing
//! survives a process restart. The persisted state always reflects the last
//! successfully completed transition, never an in-progress one. A session
//! recorded for a different pull request is stale: it is never adopted, only
//! discarded through explicit cleanup.
//!
//! Concurrent invocations against the same working tree are out of scope;
//! the session file is the concurrency boundary but carries no cross-process
//! lock.

mod storage;

pub use storage::SessionStore;

use crate::config::ConfigSnapshot;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Session format version, bumped on incompatible changes
pub const SESSION_VERSION: u32 = 1;

/// Where a landing currently stands
///
/// Transitions are strictly forward: `Started` -> `Applying` -> `Amending`,
/// then the session file is removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// Session created, no working-tree mutation yet
    Started,
    /// Cherry-pick of the verified range is underway or done
    Applying,
    /// Message amendment (squash/trailer reconciliation) is underway
    Amending,
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Started => write!(f, "started"),
            Self::Applying => write!(f, "applying"),
            Self::Amending => write!(f, "amending"),
        }
    }
}

/// A persisted landing session
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Session {
    /// Format version
    pub version: u32,
    /// Pull request this session belongs to
    pub pull_request_id: u64,
    /// Last successfully completed state transition
    pub state: SessionState,
    /// Config captured at start, reused on resume
    pub config: ConfigSnapshot,
    /// How many commits this landing applied, recorded at apply time
    ///
    /// On resume this bounds the fold to the landing's own commits, leaving
    /// any pre-existing stray commits alone.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub applied_count: Option<usize>,
    /// When the session was last written
    pub updated_at: DateTime<Utc>,
}

impl Session {
    /// Create a fresh session in the `Started` state
    pub fn new(pull_request_id: u64, config: ConfigSnapshot) -> Self {
        Self {
            version: SESSION_VERSION,
            pull_request_id,
            state: SessionState::Started,
            config,
            applied_count: None,
            updated_at: Utc::now(),
        }
    }
}

/// Partial update applied to a persisted session
///
/// Fields left `None` are preserved as-is; this is a merge, not a replace.
#[derive(Debug, Clone, Default)]
pub struct SessionPatch {
    /// New state, if the landing advanced
    pub state: Option<SessionState>,
    /// Number of commits this landing applied
    pub applied_count: Option<usize>,
    /// New config snapshot, if it needs refreshing
    pub config: Option<ConfigSnapshot>,
}

impl SessionPatch {
    /// Patch that only advances the state
    pub const fn state(state: SessionState) -> Self {
        Self {
            state: Some(state),
            applied_count: None,
            config: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> ConfigSnapshot {
        ConfigSnapshot {
            username: "alice".to_string(),
            upstream: "upstream".to_string(),
            branch: "main".to_string(),
        }
    }

    #[test]
    fn new_session_starts_in_started() {
        let session = Session::new(42, snapshot());
        assert_eq!(session.state, SessionState::Started);
        assert_eq!(session.pull_request_id, 42);
        assert_eq!(session.version, SESSION_VERSION);
    }

    #[test]
    fn state_display() {
        assert_eq!(SessionState::Applying.to_string(), "applying");
    }
}
