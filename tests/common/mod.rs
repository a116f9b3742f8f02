//! Shared test doubles for landr
//!
//! These are test utilities - not all may be used in every test file but are
//! available for future test development.

#![allow(dead_code)]

use async_trait::async_trait;
use landr::error::Result;
use landr::exec::{CommandOutput, CommandRunner, RunOptions};
use landr::provider::MetadataProvider;
use landr::types::PrMetadata;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

/// Scripted subprocess runner
///
/// Responses are keyed by the full command line (`"git rev-parse HEAD"`).
/// Multiple responses for the same key are consumed in order; the last one
/// sticks. Every call is recorded for verification, and an unscripted
/// command panics so tests fail loudly instead of drifting.
pub struct MockRunner {
    responses: Mutex<HashMap<String, VecDeque<CommandOutput>>>,
    calls: Mutex<Vec<String>>,
}

impl MockRunner {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Script a successful invocation with the given stdout
    pub fn ok(&self, command: &str, stdout: &str) -> &Self {
        self.push(
            command,
            CommandOutput {
                stdout: stdout.to_string(),
                stderr: String::new(),
                exit_code: Some(0),
            },
        );
        self
    }

    /// Script a failing invocation
    pub fn fail(&self, command: &str, exit_code: i32, stderr: &str) -> &Self {
        self.push(
            command,
            CommandOutput {
                stdout: String::new(),
                stderr: stderr.to_string(),
                exit_code: Some(exit_code),
            },
        );
        self
    }

    fn push(&self, command: &str, output: CommandOutput) {
        self.responses
            .lock()
            .unwrap()
            .entry(command.to_string())
            .or_default()
            .push_back(output);
    }

    /// Every command line run so far, in order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Whether any recorded call starts with `prefix`
    pub fn called(&self, prefix: &str) -> bool {
        self.calls().iter().any(|c| c.starts_with(prefix))
    }
}

impl CommandRunner for MockRunner {
    fn run(&self, program: &str, args: &[&str], _options: &RunOptions) -> Result<CommandOutput> {
        let key = format!("{program} {}", args.join(" "));
        self.calls.lock().unwrap().push(key.clone());

        let mut responses = self.responses.lock().unwrap();
        let queue = responses
            .get_mut(&key)
            .unwrap_or_else(|| panic!("unscripted command: {key}"));
        if queue.len() > 1 {
            Ok(queue.pop_front().unwrap())
        } else {
            Ok(queue.front().cloned().unwrap_or_else(|| {
                panic!("unscripted command: {key}");
            }))
        }
    }
}

/// Prompter that answers from a fixed script and records every question
pub struct ScriptedPrompter {
    answers: Mutex<VecDeque<bool>>,
    questions: Mutex<Vec<String>>,
}

impl ScriptedPrompter {
    pub fn new(answers: &[bool]) -> Self {
        Self {
            answers: Mutex::new(answers.iter().copied().collect()),
            questions: Mutex::new(Vec::new()),
        }
    }

    /// Questions asked so far
    pub fn questions(&self) -> Vec<String> {
        self.questions.lock().unwrap().clone()
    }

    /// Whether any question was asked at all
    pub fn was_asked(&self) -> bool {
        !self.questions().is_empty()
    }
}

impl landr::prompt::Prompter for ScriptedPrompter {
    fn confirm(&self, question: &str, default: bool) -> Result<bool> {
        self.questions.lock().unwrap().push(question.to_string());
        Ok(self.answers.lock().unwrap().pop_front().unwrap_or(default))
    }
}

/// Call record for `pr_metadata`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataCall {
    pub pr_id: u64,
    pub backport: bool,
}

/// Mock metadata provider with a fixed response and call tracking
pub struct MockProvider {
    metadata: PrMetadata,
    calls: Mutex<Vec<MetadataCall>>,
    error: Mutex<Option<String>>,
}

impl MockProvider {
    pub fn with_metadata(metadata: PrMetadata) -> Self {
        Self {
            metadata,
            calls: Mutex::new(Vec::new()),
            error: Mutex::new(None),
        }
    }

    /// Make `pr_metadata` return an error
    pub fn fail(&self, msg: &str) {
        *self.error.lock().unwrap() = Some(msg.to_string());
    }

    pub fn calls(&self) -> Vec<MetadataCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl MetadataProvider for MockProvider {
    async fn pr_metadata(&self, pr_id: u64, backport: bool) -> Result<PrMetadata> {
        self.calls.lock().unwrap().push(MetadataCall { pr_id, backport });
        if let Some(msg) = self.error.lock().unwrap().clone() {
            return Err(landr::error::Error::Provider(msg));
        }
        Ok(self.metadata.clone())
    }
}

/// Fixture metadata for a simple two-commit PR
pub fn make_metadata(pr_id: u64, shas: &[&str]) -> PrMetadata {
    PrMetadata {
        number: pr_id,
        title: format!("Fixture PR #{pr_id}"),
        html_url: format!("https://github.com/acme/widget/pull/{pr_id}"),
        expected_shas: shas.iter().map(ToString::to_string).collect(),
        trailer_lines: vec![
            format!("PR-URL: https://github.com/acme/widget/pull/{pr_id}"),
            "Reviewed-By: Alice Reviewer <alice@example.org>".to_string(),
        ],
    }
}
