//! landr - patch-landing reconciliation engine
//!
//! Given a pull request, landr fetches the exact commit set the request is
//! supposed to contain, applies it onto a local release branch, and rewrites
//! the resulting commit's message to merge machine-generated provenance
//! trailers into whatever human-authored trailers already exist - without
//! duplicating, corrupting, or silently dropping either. A resumable session
//! survives process restarts and keeps a stale session from one pull request
//! out of work on another.
//!
//! Known limitation: the session file is the concurrency boundary, but there
//! is no cross-process lock on it. Concurrent invocations against the same
//! working tree are out of scope.

pub mod config;
pub mod editor;
pub mod error;
pub mod exec;
pub mod git;
pub mod land;
pub mod prompt;
pub mod provider;
pub mod session;
pub mod sync;
pub mod types;
