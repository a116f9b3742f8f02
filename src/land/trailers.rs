//! Trailer reconciliation - pure functions for merging metadata lines
//!
//! This module contains the pure, testable logic for folding generated
//! provenance trailers (PR-URL, Reviewed-By, Backport-PR-URL) into a
//! human-authored commit message. No I/O happens here - the caller supplies
//! the message, the generated lines, and the `has_trailers` answer from git.

use crate::error::{Error, Result};
use regex::Regex;
use std::sync::LazyLock;

static PR_URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^PR-URL:\s*\S+").expect("valid regex"));

static REVIEWED_BY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Reviewed-By:\s*\S+").expect("valid regex"));

static BACKPORT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Backport-PR-URL:\s*\S+").expect("valid regex"));

/// Result of reconciling generated trailers into a message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconciledMessage {
    /// The amended message lines
    pub lines: Vec<String>,
    /// Generated lines skipped because they were already applied
    pub skipped: Vec<String>,
}

impl ReconciledMessage {
    /// The amended message as a single string
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }
}

/// Merge `generated` metadata lines into `original`, idempotently
///
/// `has_trailers` must come from version-control trailer parsing
/// (`git interpret-trailers`), not from local guessing - trailer syntax has
/// subtle rules this engine deliberately does not own.
///
/// Per generated line, in order:
/// 1. A line already present verbatim is skipped when the message has a
///    recognized trailer block (idempotent re-run), and is a
///    [`Error::TrailerConflict`] when it does not - text that looks like a
///    trailer but is not recognized as one cannot be merged safely.
/// 2. `Backport-PR-URL` lines go immediately after an existing `PR-URL`
///    line; with no `PR-URL` anchor they go immediately before the first
///    `Reviewed-By` line; with neither anchor they go at the end. Origin
///    trailers precede approval trailers.
/// 3. Any other line is appended at the end.
///
/// When `has_trailers` is false, exactly one blank line is appended before
/// the first insertion so downstream trailer parsers recognize the new
/// block. The blank line is a formatting precondition, not a trailer.
pub fn reconcile_trailers(
    original: &str,
    generated: &[String],
    has_trailers: bool,
) -> Result<ReconciledMessage> {
    let original_lines: Vec<&str> = original.lines().collect();
    let mut amended: Vec<String> = original_lines.iter().map(ToString::to_string).collect();
    let mut skipped = Vec::new();
    let mut separator_added = has_trailers;

    for line in generated {
        if original_lines.contains(&line.as_str()) {
            if has_trailers {
                tracing::warn!(line, "metadata line already applied; skipping");
                skipped.push(line.clone());
                continue;
            }
            return Err(Error::TrailerConflict(format!(
                "message already contains '{line}' but has no recognized trailer block; \
                 refusing to guess how to merge it"
            )));
        }

        if !separator_added {
            amended.push(String::new());
            separator_added = true;
        }

        if BACKPORT_RE.is_match(line) {
            if let Some(idx) = amended.iter().position(|l| PR_URL_RE.is_match(l)) {
                amended.insert(idx + 1, line.clone());
            } else if let Some(idx) = amended.iter().position(|l| REVIEWED_BY_RE.is_match(l)) {
                amended.insert(idx, line.clone());
            } else {
                amended.push(line.clone());
            }
        } else {
            amended.push(line.clone());
        }
    }

    Ok(ReconciledMessage {
        lines: amended,
        skipped,
    })
}
