//! Persistence for landing sessions in `<gitdir>/landr/`.

use super::{SESSION_VERSION, Session, SessionPatch};
use crate::config::ConfigSnapshot;
use crate::error::{Error, Result};
use crate::types::PrMetadata;
use chrono::Utc;
use std::fs;
use std::path::{Path, PathBuf};

/// Directory name for landr metadata within the git dir.
const LANDR_DIR: &str = "landr";

/// Filename for session state.
const SESSION_FILE: &str = "session.toml";

/// Filename for cached PR metadata within the scratch directory.
const METADATA_FILE: &str = "metadata.json";

/// Resolve the `.git` path, handling worktree indirection.
///
/// In linked worktrees (created via `git worktree add`), `.git` in the
/// working tree is a plain text file of the form `gitdir: <path>` pointing
/// at the real metadata directory. We must read this file and use its
/// target as the actual git dir.
///
/// Falls back to the original path if resolution fails.
pub(super) fn resolve_git_dir(workspace_root: &Path) -> PathBuf {
    let git_path = workspace_root.join(".git");

    if git_path.is_file() {
        if let Ok(contents) = fs::read_to_string(&git_path) {
            if let Some(target) = contents.trim().strip_prefix("gitdir:") {
                let target = PathBuf::from(target.trim());
                let target = if target.is_absolute() {
                    target
                } else {
                    workspace_root.join(target)
                };
                if target.is_dir() {
                    return fs::canonicalize(&target).unwrap_or(target);
                }
            }
        }
        // Pointer file exists but is invalid/unreadable - return as-is to surface error
        return git_path;
    }

    git_path
}

/// Store for the single resumable session of one working tree
///
/// The store is bound to the pull request currently being operated on; a
/// persisted session for any other pull request is treated as stale and
/// never adopted.
pub struct SessionStore {
    landr_dir: PathBuf,
    pull_request_id: u64,
}

impl SessionStore {
    /// Create a store for `pull_request_id` scoped to `workspace_root`
    pub fn new(workspace_root: &Path, pull_request_id: u64) -> Self {
        Self {
            landr_dir: resolve_git_dir(workspace_root).join(LANDR_DIR),
            pull_request_id,
        }
    }

    /// Path of the session file
    pub fn session_path(&self) -> PathBuf {
        self.landr_dir.join(SESSION_FILE)
    }

    /// Scratch directory for this pull request's saved message files
    pub fn scratch_dir(&self) -> PathBuf {
        self.landr_dir.join(self.pull_request_id.to_string())
    }

    /// Read whatever session is on disk, regardless of pull request id
    ///
    /// For diagnostics only; landing paths go through [`Self::restore`].
    pub fn peek(workspace_root: &Path) -> Result<Option<Session>> {
        Self::new(workspace_root, 0).read_any()
    }

    /// Read whatever session is on disk, regardless of pull request id
    fn read_any(&self) -> Result<Option<Session>> {
        let path = self.session_path();
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path)
            .map_err(|e| Error::Session(format!("failed to read {}: {e}", path.display())))?;
        let session: Session = toml::from_str(&content)
            .map_err(|e| Error::Session(format!("failed to parse {}: {e}", path.display())))?;
        Ok(Some(session))
    }

    /// Atomically persist `session` (temp file + rename)
    fn write(&self, session: &Session) -> Result<()> {
        if !self.landr_dir.exists() {
            fs::create_dir_all(&self.landr_dir).map_err(|e| {
                Error::Session(format!("failed to create {}: {e}", self.landr_dir.display()))
            })?;
        }

        let mut session = session.clone();
        session.version = SESSION_VERSION;
        session.updated_at = Utc::now();

        let content = toml::to_string_pretty(&session)
            .map_err(|e| Error::Session(format!("failed to serialize session: {e}")))?;
        let content = format!(
            "# landr session state\n# Auto-generated - manual edits may be overwritten\n\n{content}"
        );

        let path = self.session_path();
        let tmp = self.landr_dir.join(format!("{SESSION_FILE}.tmp"));
        fs::write(&tmp, content)
            .map_err(|e| Error::Session(format!("failed to write {}: {e}", tmp.display())))?;
        fs::rename(&tmp, &path)
            .map_err(|e| Error::Session(format!("failed to replace {}: {e}", path.display())))?;
        Ok(())
    }

    /// Begin a new session in the `Started` state
    ///
    /// Fails if a session for a different pull request already occupies the
    /// path; that session must be discarded through [`Self::discard_stale`]
    /// first, never silently overwritten.
    pub fn start(&self, config: ConfigSnapshot) -> Result<Session> {
        if let Some(other) = self.stale_session_id()? {
            return Err(Error::Session(format!(
                "a session for PR #{other} already exists; \
                 finish it or discard it before landing PR #{}",
                self.pull_request_id
            )));
        }
        let session = Session::new(self.pull_request_id, config);
        self.write(&session)?;
        Ok(session)
    }

    /// Load the persisted session if it belongs to this pull request
    ///
    /// A session recorded for a different pull request is treated as absent.
    pub fn restore(&self) -> Result<Option<Session>> {
        match self.read_any()? {
            Some(s) if s.pull_request_id == self.pull_request_id => Ok(Some(s)),
            Some(s) => {
                tracing::warn!(
                    found = s.pull_request_id,
                    current = self.pull_request_id,
                    "ignoring stale session for a different pull request"
                );
                Ok(None)
            }
            None => Ok(None),
        }
    }

    /// True iff a persisted session exists for this pull request
    pub fn has_started(&self) -> Result<bool> {
        Ok(self.restore()?.is_some())
    }

    /// Id of a persisted session belonging to a *different* pull request
    pub fn stale_session_id(&self) -> Result<Option<u64>> {
        match self.read_any()? {
            Some(s) if s.pull_request_id != self.pull_request_id => Ok(Some(s.pull_request_id)),
            _ => Ok(None),
        }
    }

    /// Merge `patch` into the persisted session, preserving other fields
    pub fn update(&self, patch: SessionPatch) -> Result<Session> {
        let mut session = self.restore()?.ok_or_else(|| {
            Error::Session(format!(
                "no session for PR #{} to update",
                self.pull_request_id
            ))
        })?;
        if let Some(state) = patch.state {
            session.state = state;
        }
        if let Some(count) = patch.applied_count {
            session.applied_count = Some(count);
        }
        if let Some(config) = patch.config {
            session.config = config;
        }
        self.write(&session)?;
        Ok(session)
    }

    /// Remove the session and, when it belongs to this pull request, its
    /// scratch directory
    ///
    /// If the session file is unreadable or corrupt, cleanup degrades to
    /// unconditional removal of the session file alone.
    pub fn cleanup(&self) -> Result<()> {
        let owns_scratch = matches!(
            self.read_any(),
            Ok(Some(ref s)) if s.pull_request_id == self.pull_request_id
        );

        if owns_scratch {
            let scratch = self.scratch_dir();
            if scratch.exists() {
                fs::remove_dir_all(&scratch).map_err(|e| {
                    Error::Session(format!("failed to remove {}: {e}", scratch.display()))
                })?;
            }
        }

        let path = self.session_path();
        if path.exists() {
            fs::remove_file(&path)
                .map_err(|e| Error::Session(format!("failed to remove {}: {e}", path.display())))?;
        }
        Ok(())
    }

    /// Discard a stale session left behind by a different pull request
    ///
    /// Scratch files of the stale pull request are kept; they may still be
    /// wanted for manual recovery.
    pub fn discard_stale(&self) -> Result<()> {
        let path = self.session_path();
        if path.exists() {
            fs::remove_file(&path)
                .map_err(|e| Error::Session(format!("failed to remove {}: {e}", path.display())))?;
        }
        Ok(())
    }

    /// Ensure the scratch directory exists and return its path
    pub fn ensure_scratch_dir(&self) -> Result<PathBuf> {
        let dir = self.scratch_dir();
        fs::create_dir_all(&dir)
            .map_err(|e| Error::Session(format!("failed to create {}: {e}", dir.display())))?;
        Ok(dir)
    }

    /// Cache the provider's metadata so a resume can proceed offline
    pub fn save_metadata(&self, metadata: &PrMetadata) -> Result<()> {
        let path = self.ensure_scratch_dir()?.join(METADATA_FILE);
        let content = serde_json::to_string_pretty(metadata)
            .map_err(|e| Error::Session(format!("failed to serialize metadata: {e}")))?;
        fs::write(&path, content)
            .map_err(|e| Error::Session(format!("failed to write {}: {e}", path.display())))?;
        Ok(())
    }

    /// Load cached metadata, if any
    ///
    /// A missing or unreadable cache is not an error; the caller falls back
    /// to the provider.
    pub fn load_metadata(&self) -> Result<Option<PrMetadata>> {
        let path = self.scratch_dir().join(METADATA_FILE);
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path)
            .map_err(|e| Error::Session(format!("failed to read {}: {e}", path.display())))?;
        match serde_json::from_str(&content) {
            Ok(metadata) => Ok(Some(metadata)),
            Err(e) => {
                tracing::warn!(%e, "ignoring corrupt metadata cache");
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionState;
    use tempfile::TempDir;

    fn setup_fake_git_workspace() -> TempDir {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join(".git")).unwrap();
        temp
    }

    fn snapshot() -> ConfigSnapshot {
        ConfigSnapshot {
            username: "alice".to_string(),
            upstream: "upstream".to_string(),
            branch: "main".to_string(),
        }
    }

    #[test]
    fn test_session_path() {
        let temp = setup_fake_git_workspace();
        let store = SessionStore::new(temp.path(), 42);
        assert!(store.session_path().ends_with(".git/landr/session.toml"));
        assert!(store.scratch_dir().ends_with(".git/landr/42"));
    }

    #[test]
    fn test_start_restore_roundtrip() {
        let temp = setup_fake_git_workspace();
        let store = SessionStore::new(temp.path(), 42);

        assert!(!store.has_started().unwrap());
        store.start(snapshot()).unwrap();

        let restored = store.restore().unwrap().unwrap();
        assert_eq!(restored.pull_request_id, 42);
        assert_eq!(restored.state, SessionState::Started);
        assert_eq!(restored.config.username, "alice");
        assert!(store.has_started().unwrap());
    }

    #[test]
    fn test_stale_session_treated_absent() {
        let temp = setup_fake_git_workspace();
        SessionStore::new(temp.path(), 100)
            .start(snapshot())
            .unwrap();

        let store = SessionStore::new(temp.path(), 200);
        assert!(store.restore().unwrap().is_none());
        assert!(!store.has_started().unwrap());
        assert_eq!(store.stale_session_id().unwrap(), Some(100));
    }

    #[test]
    fn test_start_refuses_to_overwrite_stale_session() {
        let temp = setup_fake_git_workspace();
        SessionStore::new(temp.path(), 100)
            .start(snapshot())
            .unwrap();

        let store = SessionStore::new(temp.path(), 200);
        let err = store.start(snapshot()).unwrap_err();
        assert!(matches!(err, Error::Session(_)));
        assert!(err.to_string().contains("100"));

        // Explicit discard makes room
        store.discard_stale().unwrap();
        store.start(snapshot()).unwrap();
        assert!(store.has_started().unwrap());
    }

    #[test]
    fn test_update_is_partial_merge() {
        let temp = setup_fake_git_workspace();
        let store = SessionStore::new(temp.path(), 42);
        store.start(snapshot()).unwrap();

        store
            .update(SessionPatch {
                state: Some(SessionState::Applying),
                applied_count: Some(3),
                config: None,
            })
            .unwrap();
        store
            .update(SessionPatch::state(SessionState::Amending))
            .unwrap();

        let session = store.restore().unwrap().unwrap();
        assert_eq!(session.state, SessionState::Amending);
        // Untouched fields preserved across the second update
        assert_eq!(session.pull_request_id, 42);
        assert_eq!(session.config.branch, "main");
        assert_eq!(session.applied_count, Some(3));
    }

    #[test]
    fn test_cleanup_removes_session_and_scratch() {
        let temp = setup_fake_git_workspace();
        let store = SessionStore::new(temp.path(), 42);
        store.start(snapshot()).unwrap();
        let scratch = store.ensure_scratch_dir().unwrap();
        fs::write(scratch.join("abc123"), "saved message").unwrap();

        store.cleanup().unwrap();
        assert!(!store.session_path().exists());
        assert!(!scratch.exists());
    }

    #[test]
    fn test_cleanup_of_corrupt_file_removes_file_only() {
        let temp = setup_fake_git_workspace();
        let store = SessionStore::new(temp.path(), 42);
        let scratch = store.ensure_scratch_dir().unwrap();
        fs::create_dir_all(store.session_path().parent().unwrap()).unwrap();
        fs::write(store.session_path(), "not valid toml [[[").unwrap();

        store.cleanup().unwrap();
        assert!(!store.session_path().exists());
        // Scratch ownership is unknowable, so it is left alone
        assert!(scratch.exists());
    }

    #[test]
    fn test_cleanup_for_other_pr_keeps_its_scratch() {
        let temp = setup_fake_git_workspace();
        let owner = SessionStore::new(temp.path(), 100);
        owner.start(snapshot()).unwrap();
        let scratch_100 = owner.ensure_scratch_dir().unwrap();

        // PR 200's cleanup removes the session file only
        SessionStore::new(temp.path(), 200).cleanup().unwrap();
        assert!(!owner.session_path().exists());
        assert!(scratch_100.exists());
    }

    #[test]
    fn test_resolve_git_dir_regular_directory() {
        let temp = setup_fake_git_workspace();
        let resolved = resolve_git_dir(temp.path());
        assert!(resolved.ends_with(".git"));
        assert!(resolved.exists());
    }

    #[test]
    fn test_resolve_git_dir_worktree_pointer_file() {
        // Simulate a linked worktree:
        //   main/.git/worktrees/wt  (real directory)
        //   wt/.git                 (file "gitdir: <path>")
        let temp = TempDir::new().unwrap();
        let real = temp.path().join("main").join(".git").join("worktrees").join("wt");
        fs::create_dir_all(&real).unwrap();

        let wt = temp.path().join("wt");
        fs::create_dir_all(&wt).unwrap();
        fs::write(
            wt.join(".git"),
            format!("gitdir: {}", real.to_string_lossy()),
        )
        .unwrap();

        let resolved = resolve_git_dir(&wt);
        assert_eq!(resolved, fs::canonicalize(&real).unwrap());
    }

    #[test]
    fn test_file_contains_header_comment() {
        let temp = setup_fake_git_workspace();
        let store = SessionStore::new(temp.path(), 42);
        store.start(snapshot()).unwrap();

        let content = fs::read_to_string(store.session_path()).unwrap();
        assert!(content.starts_with("# landr session state"));
        assert!(content.contains("Auto-generated"));
    }

    #[test]
    fn test_metadata_cache_roundtrip() {
        let temp = setup_fake_git_workspace();
        let store = SessionStore::new(temp.path(), 42);

        assert!(store.load_metadata().unwrap().is_none());

        let metadata = PrMetadata {
            number: 42,
            title: "fix: quiet the spurious warning".to_string(),
            html_url: "https://github.com/acme/widget/pull/42".to_string(),
            expected_shas: vec!["abc123".to_string()],
            trailer_lines: vec!["PR-URL: https://github.com/acme/widget/pull/42".to_string()],
        };
        store.save_metadata(&metadata).unwrap();

        let loaded = store.load_metadata().unwrap().unwrap();
        assert_eq!(loaded.number, 42);
        assert_eq!(loaded.expected_shas, metadata.expected_shas);
        assert_eq!(loaded.trailer_lines, metadata.trailer_lines);
    }

    #[test]
    fn test_corrupt_metadata_cache_is_ignored() {
        let temp = setup_fake_git_workspace();
        let store = SessionStore::new(temp.path(), 42);

        let dir = store.ensure_scratch_dir().unwrap();
        fs::write(dir.join(METADATA_FILE), "not json {{").unwrap();

        assert!(store.load_metadata().unwrap().is_none());
    }
}
