//! Configuration loading
//!
//! Settings come from two TOML layers: a global file at
//! `~/.config/landr/config.toml` and a per-repo `.landr.toml` at the working
//! tree root, with the repo layer winning field by field. Identity and
//! remote settings are required before any session is created.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Default upstream remote name
pub const DEFAULT_UPSTREAM: &str = "upstream";

/// Default target branch
pub const DEFAULT_BRANCH: &str = "main";

/// Raw, partially-specified configuration as read from one TOML file
#[derive(Debug, Clone, Default, Deserialize)]
struct RawConfig {
    username: Option<String>,
    upstream: Option<String>,
    branch: Option<String>,
    editor: Option<String>,
    lint: Option<LintConfig>,
    validator: Option<String>,
}

/// Lint runner settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LintConfig {
    /// Command to run (e.g. "make lint")
    pub command: String,
    /// Whether linting is enabled at all
    #[serde(default = "default_true")]
    pub enabled: bool,
}

const fn default_true() -> bool {
    true
}

/// Fully-resolved configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    /// Operator's username (required, goes into provenance reporting)
    pub username: String,
    /// Upstream remote name
    pub upstream: String,
    /// Target branch on the upstream remote
    pub branch: String,
    /// Editor command for message editing (None falls back to $EDITOR)
    pub editor: Option<String>,
    /// Lint runner, if configured
    pub lint: Option<LintConfig>,
    /// External message validator command, if configured
    pub validator: Option<String>,
}

/// The subset of config persisted inside a session
///
/// Recorded so a resume after a process restart operates on the same refs
/// the landing started with, even if the live config changed in between.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConfigSnapshot {
    /// Operator's username
    pub username: String,
    /// Upstream remote name
    pub upstream: String,
    /// Target branch
    pub branch: String,
}

impl From<&Config> for ConfigSnapshot {
    fn from(config: &Config) -> Self {
        Self {
            username: config.username.clone(),
            upstream: config.upstream.clone(),
            branch: config.branch.clone(),
        }
    }
}

impl RawConfig {
    fn merge(self, overlay: Self) -> Self {
        Self {
            username: overlay.username.or(self.username),
            upstream: overlay.upstream.or(self.upstream),
            branch: overlay.branch.or(self.branch),
            editor: overlay.editor.or(self.editor),
            lint: overlay.lint.or(self.lint),
            validator: overlay.validator.or(self.validator),
        }
    }

    fn resolve(self) -> Result<Config> {
        let username = self
            .username
            .ok_or_else(|| Error::Config("missing 'username' (set it in config.toml)".into()))?;
        Ok(Config {
            username,
            upstream: self.upstream.unwrap_or_else(|| DEFAULT_UPSTREAM.into()),
            branch: self.branch.unwrap_or_else(|| DEFAULT_BRANCH.into()),
            editor: self.editor,
            lint: self.lint,
            validator: self.validator,
        })
    }
}

fn read_layer(path: &Path) -> Result<RawConfig> {
    if !path.exists() {
        return Ok(RawConfig::default());
    }
    let content = fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("failed to read {}: {e}", path.display())))?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("failed to parse {}: {e}", path.display())))
}

/// Load configuration for the working tree at `workspace_root`
///
/// Global layer first, then the repo-local `.landr.toml` overlay.
pub fn load_config(workspace_root: &Path) -> Result<Config> {
    let global = dirs::config_dir()
        .map(|d| d.join("landr").join("config.toml"))
        .map_or_else(|| Ok(RawConfig::default()), |p| read_layer(&p))?;
    let local = read_layer(&workspace_root.join(".landr.toml"))?;
    global.merge(local).resolve()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn local_layer_overrides_global_fields() {
        let global = toml::from_str::<RawConfig>(
            "username = \"alice\"\nbranch = \"main\"",
        )
        .unwrap();
        let local = toml::from_str::<RawConfig>("branch = \"v20.x\"").unwrap();

        let config = global.merge(local).resolve().unwrap();
        assert_eq!(config.username, "alice");
        assert_eq!(config.branch, "v20.x");
        assert_eq!(config.upstream, DEFAULT_UPSTREAM);
    }

    #[test]
    fn missing_identity_is_config_error() {
        let raw = toml::from_str::<RawConfig>("branch = \"main\"").unwrap();
        let err = raw.resolve().unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().contains("username"));
    }

    #[test]
    fn repo_local_file_is_read() {
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join(".landr.toml"),
            "username = \"bob\"\n\n[lint]\ncommand = \"make lint\"\n",
        )
        .unwrap();

        let config = load_config(temp.path()).unwrap();
        assert_eq!(config.username, "bob");
        let lint = config.lint.unwrap();
        assert_eq!(lint.command, "make lint");
        assert!(lint.enabled);
    }
}
