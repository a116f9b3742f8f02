//! Message acceptance and amendment
//!
//! After reconciliation the operator either accepts the amended message
//! verbatim or edits it in an external editor; the edited file is re-read by
//! the amend. The message file lives in the session's scratch directory so a
//! failed or declined amend leaves an inspectable starting point on disk.

use crate::editor;
use crate::error::{Error, Result};
use crate::exec::CommandRunner;
use crate::git::GitClient;
use crate::prompt::Prompter;
use std::fs;
use std::path::{Path, PathBuf};

/// Write `message` to the scratch dir, named by HEAD's abbreviated sha
pub fn save_message_file(git: &GitClient, scratch_dir: &Path, message: &str) -> Result<PathBuf> {
    let short = git.short_head()?;
    let path = scratch_dir.join(short);
    fs::write(&path, format!("{message}\n"))
        .map_err(|e| Error::Session(format!("failed to write {}: {e}", path.display())))?;
    Ok(path)
}

/// Amend HEAD with the reconciled message, with operator consent
///
/// Accepting uses the saved file verbatim. Declining opens the configured
/// editor on it and re-reads the result; with no editor configured the
/// landing fails and the operator is pointed at the saved file to finish
/// manually - the one path where partial state is deliberately left on disk.
pub fn amend_with_consent(
    git: &GitClient,
    runner: &dyn CommandRunner,
    message_file: &Path,
    editor_command: Option<&str>,
    prompter: &dyn Prompter,
) -> Result<()> {
    if prompter.confirm("Use this commit message?", true)? {
        return git.amend_from_file(message_file);
    }

    let Some(command) = editor::resolve_editor(editor_command) else {
        return Err(Error::Editor(format!(
            "no editor configured and the message was declined; \
             edit {} and finish with: git commit --amend -F {}",
            message_file.display(),
            message_file.display()
        )));
    };

    editor::open_editor(runner, &command, message_file)?;
    git.amend_from_file(message_file).map_err(|e| {
        Error::Editor(format!(
            "amend after editing failed ({e}); \
             finish manually with: git commit --amend -F {}",
            message_file.display()
        ))
    })
}
