//! Operator confirmation prompts
//!
//! Every irreversible decision point (resync, fold, message acceptance,
//! forced landing) asks a yes/no question with a stated default. The
//! capability is a trait so tests and `--yes` runs stay headless.

use crate::error::{Error, Result};
use dialoguer::Confirm;

/// Injectable yes/no confirmation capability
pub trait Prompter: Send + Sync {
    /// Ask `question`, returning the operator's answer
    ///
    /// `default` is both the suggested answer and the one used by
    /// non-interactive implementations.
    fn confirm(&self, question: &str, default: bool) -> Result<bool>;
}

/// Interactive prompter backed by the terminal
#[derive(Debug, Default)]
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn confirm(&self, question: &str, default: bool) -> Result<bool> {
        Confirm::new()
            .with_prompt(question)
            .default(default)
            .interact()
            .map_err(|e| Error::Internal(format!("Failed to read confirmation: {e}")))
    }
}

/// Prompter that answers every question with its stated default
///
/// Used for `--yes`-style runs where the operator pre-approved the defaults.
#[derive(Debug, Default)]
pub struct DefaultAnswerPrompter;

impl Prompter for DefaultAnswerPrompter {
    fn confirm(&self, question: &str, default: bool) -> Result<bool> {
        tracing::debug!(question, default, "answering prompt with default");
        Ok(default)
    }
}
