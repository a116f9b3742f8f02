//! External editor invocation

use crate::error::{Error, Result};
use crate::exec::{CommandRunner, RunOptions};
use std::path::Path;

/// Pick the editor command: explicit config first, then `$EDITOR`
///
/// A configured blank string disables the editor outright; only an absent
/// setting falls back to the environment.
pub fn resolve_editor(configured: Option<&str>) -> Option<String> {
    match configured {
        Some(command) => {
            let command = command.trim();
            (!command.is_empty()).then(|| command.to_string())
        }
        None => std::env::var("EDITOR")
            .ok()
            .filter(|c| !c.trim().is_empty()),
    }
}

/// Open `command` on `file`, inheriting the terminal, and wait for it
pub fn open_editor(runner: &dyn CommandRunner, command: &str, file: &Path) -> Result<()> {
    let mut parts = command.split_whitespace();
    let program = parts
        .next()
        .ok_or_else(|| Error::Editor("empty editor command".to_string()))?;
    let mut args: Vec<&str> = parts.collect();
    let path = file.to_string_lossy();
    args.push(&path);

    let out = runner.run(program, &args, &RunOptions::inherit())?;
    if out.success() {
        Ok(())
    } else {
        Err(Error::Editor(format!(
            "editor '{command}' exited with {:?}; edit {} and finish with: \
             git commit --amend -F {}",
            out.exit_code,
            file.display(),
            file.display()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configured_editor_wins_over_env() {
        assert_eq!(
            resolve_editor(Some("code --wait")),
            Some("code --wait".to_string())
        );
    }

    #[test]
    fn blank_configured_editor_disables_the_editor() {
        assert_eq!(resolve_editor(Some("  ")), None);
    }
}
