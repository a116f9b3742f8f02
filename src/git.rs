//! Git subprocess client
//!
//! Thin, typed wrappers over the git commands the engine needs. All calls go
//! through [`CommandRunner`] so tests never need a real repository. Exit
//! codes other than zero are failures; stdout capture mode (raw vs.
//! line-split) is chosen per call.

use crate::error::{Error, Result};
use crate::exec::{CommandOutput, CommandRunner, RunOptions};
use crate::types::GitRemote;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Typed git client scoped to one working tree
#[derive(Clone)]
pub struct GitClient {
    runner: Arc<dyn CommandRunner>,
    root: PathBuf,
}

impl GitClient {
    /// Create a client for the working tree at `root`
    pub fn new(runner: Arc<dyn CommandRunner>, root: impl Into<PathBuf>) -> Self {
        Self {
            runner,
            root: root.into(),
        }
    }

    /// Root of the working tree this client operates on
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn git(&self, args: &[&str], options: RunOptions) -> Result<CommandOutput> {
        let options = options.in_dir(&self.root);
        let out = self.runner.run("git", args, &options)?;
        if out.success() {
            Ok(out)
        } else {
            Err(Error::GitOperation(format!(
                "git {} exited with {:?}: {}",
                args.join(" "),
                out.exit_code,
                if out.stderr.is_empty() {
                    &out.stdout
                } else {
                    &out.stderr
                }
            )))
        }
    }

    /// Resolve a revision to a full sha
    pub fn rev_parse(&self, rev: &str) -> Result<String> {
        Ok(self.git(&["rev-parse", rev], RunOptions::default())?.stdout)
    }

    /// Short form of HEAD's sha (for scratch file names)
    pub fn short_head(&self) -> Result<String> {
        Ok(self
            .git(&["rev-parse", "--short", "HEAD"], RunOptions::default())?
            .stdout)
    }

    /// Name of the currently checked out branch
    pub fn current_branch(&self) -> Result<String> {
        Ok(self
            .git(&["rev-parse", "--abbrev-ref", "HEAD"], RunOptions::default())?
            .stdout)
    }

    /// Fetch `refspec` from `remote`
    pub fn fetch(&self, remote: &str, refspec: &str) -> Result<()> {
        self.git(&["fetch", remote, refspec], RunOptions::default())?;
        Ok(())
    }

    /// Commits in `range`, oldest first
    pub fn rev_list_oldest_first(&self, range: &str) -> Result<Vec<String>> {
        Ok(self
            .git(&["rev-list", "--reverse", range], RunOptions::lines())?
            .lines())
    }

    /// Parent sha of `rev` by 1-based index (`rev^1`, `rev^2`, ...)
    pub fn parent(&self, rev: &str, index: u8) -> Result<String> {
        let spec = format!("{rev}^{index}");
        self.rev_parse(&spec)
    }

    /// Cherry-pick the commits in `base..head` onto HEAD
    pub fn cherry_pick_range(&self, base: &str, head: &str) -> Result<()> {
        let range = format!("{base}..{head}");
        self.git(&["cherry-pick", &range], RunOptions::default())?;
        Ok(())
    }

    /// Abort an in-progress cherry-pick
    pub fn cherry_pick_abort(&self) -> Result<()> {
        self.git(&["cherry-pick", "--abort"], RunOptions::default())?;
        Ok(())
    }

    /// Hard-reset the current branch to `rev`
    pub fn reset_hard(&self, rev: &str) -> Result<()> {
        self.git(&["reset", "--hard", rev], RunOptions::default())?;
        Ok(())
    }

    /// Soft-reset the branch pointer back by `count` commits, tree untouched
    pub fn reset_soft_back(&self, count: usize) -> Result<()> {
        let rev = format!("HEAD~{count}");
        self.git(&["reset", "--soft", &rev], RunOptions::default())?;
        Ok(())
    }

    /// Amend HEAD keeping its current message
    pub fn amend_no_edit(&self) -> Result<()> {
        self.git(&["commit", "--amend", "--no-edit"], RunOptions::default())?;
        Ok(())
    }

    /// Amend HEAD with the message stored in `file`
    pub fn amend_from_file(&self, file: &Path) -> Result<()> {
        let path = file.to_string_lossy();
        self.git(&["commit", "--amend", "-F", &path], RunOptions::default())?;
        Ok(())
    }

    /// Full message of HEAD
    pub fn head_message(&self) -> Result<String> {
        Ok(self
            .git(&["log", "-1", "--format=%B"], RunOptions::default())?
            .stdout)
    }

    /// Whether `message` contains a recognized trailer block
    ///
    /// Delegated to `git interpret-trailers --parse`. Trailer syntax has
    /// subtle rules the engine deliberately does not own.
    pub fn message_has_trailers(&self, message: &str) -> Result<bool> {
        let mut file = tempfile::NamedTempFile::new()
            .map_err(|e| Error::Internal(format!("failed to create temp file: {e}")))?;
        file.write_all(message.as_bytes())
            .map_err(|e| Error::Internal(format!("failed to write temp file: {e}")))?;
        let path = file.path().to_string_lossy().to_string();
        let out = self.git(
            &["interpret-trailers", "--parse", &path],
            RunOptions::default(),
        )?;
        Ok(!out.stdout.is_empty())
    }

    /// URL configured for `remote`
    pub fn remote_url(&self, remote: &str) -> Result<GitRemote> {
        let url = self
            .git(&["remote", "get-url", remote], RunOptions::default())?
            .stdout;
        if url.is_empty() {
            return Err(Error::RemoteNotFound(remote.to_string()));
        }
        Ok(GitRemote {
            name: remote.to_string(),
            url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::Capture;
    use std::sync::Mutex;

    /// Minimal scripted runner: pops responses in order, records calls.
    struct ScriptRunner {
        responses: Mutex<Vec<CommandOutput>>,
        calls: Mutex<Vec<String>>,
    }

    impl ScriptRunner {
        fn new(responses: Vec<CommandOutput>) -> Self {
            let mut responses = responses;
            responses.reverse();
            Self {
                responses: Mutex::new(responses),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn ok(stdout: &str) -> CommandOutput {
            CommandOutput {
                stdout: stdout.to_string(),
                stderr: String::new(),
                exit_code: Some(0),
            }
        }
    }

    impl CommandRunner for ScriptRunner {
        fn run(
            &self,
            program: &str,
            args: &[&str],
            _options: &RunOptions,
        ) -> crate::error::Result<CommandOutput> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("{program} {}", args.join(" ")));
            Ok(self
                .responses
                .lock()
                .unwrap()
                .pop()
                .expect("unscripted command"))
        }
    }

    #[test]
    fn rev_list_is_line_split_oldest_first() {
        let runner = Arc::new(ScriptRunner::new(vec![ScriptRunner::ok("aaa\nbbb\nccc")]));
        let git = GitClient::new(runner.clone(), "/tmp/repo");
        let shas = git.rev_list_oldest_first("base..head").unwrap();
        assert_eq!(shas, vec!["aaa", "bbb", "ccc"]);
        assert_eq!(
            runner.calls.lock().unwrap()[0],
            "git rev-list --reverse base..head"
        );
    }

    #[test]
    fn nonzero_exit_is_git_operation_error() {
        let runner = Arc::new(ScriptRunner::new(vec![CommandOutput {
            stdout: String::new(),
            stderr: "fatal: bad revision".to_string(),
            exit_code: Some(128),
        }]));
        let git = GitClient::new(runner, "/tmp/repo");
        let err = git.rev_parse("nope").unwrap_err();
        assert!(matches!(err, Error::GitOperation(_)));
        assert!(err.to_string().contains("bad revision"));
    }

    #[test]
    fn run_options_capture_modes_exist() {
        // Pin the per-call capture contract: raw by default, lines for lists.
        assert_eq!(RunOptions::default().capture, Capture::Raw);
        assert_eq!(RunOptions::lines().capture, Capture::Lines);
    }
}
