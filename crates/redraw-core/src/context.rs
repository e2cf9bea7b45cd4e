//! Context compaction.
//!
//! Builds a token-bounded natural-language digest of recent history and
//! current state for the external drafter. Bounding token cost is the
//! explicit purpose: the digest never includes iteration records beyond the
//! configured window, quotes prompts truncated, and limits modification tags
//! per entry.

use crate::config::EngineConfig;
use crate::session::Session;
use std::fmt::Write;

const RULE: &str = "==================================================";

/// Builds bounded session digests for drafter consumption.
#[derive(Debug, Clone)]
pub struct ContextCompactor {
    window: usize,
    snippet_chars: usize,
    tag_limit: usize,
    max_iterations: u32,
}

impl ContextCompactor {
    /// Creates a compactor from engine configuration, clamping the history
    /// window to its supported 3..=10 range.
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            window: config.clamped_history_window(),
            snippet_chars: config.prompt_snippet_chars,
            tag_limit: config.modification_tag_limit,
            max_iterations: config.max_iterations,
        }
    }

    /// Produces the digest for a session.
    ///
    /// Contains: the last `window` iteration records (truncated prompt, up to
    /// `tag_limit` modification tags each), the currently-present component
    /// names, the verbatim current code, and a directive that the shown code
    /// is the CURRENT ground truth and must not be reverted.
    ///
    /// Returns an empty string for a session with no history.
    pub fn compact(&self, session: &Session) -> String {
        if !session.has_history() {
            return String::new();
        }

        let mut digest = String::new();
        let _ = writeln!(digest, "\n{RULE}");
        let _ = writeln!(
            digest,
            "SESSION CONTEXT (Step {}/{}):",
            session.iteration, self.max_iterations
        );
        let _ = writeln!(digest, "{RULE}");

        let skip = session.history.len().saturating_sub(self.window);
        for record in session.history.iter().skip(skip) {
            let _ = writeln!(
                digest,
                "Step {}: {}",
                record.step,
                truncate_chars(&record.prompt, self.snippet_chars)
            );
            if !record.modifications.is_empty() {
                let tags: Vec<&str> = record
                    .modifications
                    .iter()
                    .take(self.tag_limit)
                    .map(String::as_str)
                    .collect();
                let _ = writeln!(digest, "  Changes: {}", tags.join(", "));
            }
        }

        let active = session.active_components();
        if !active.is_empty() {
            let _ = writeln!(digest, "\nCURRENT COMPONENTS: {}", active.join(", "));
        }

        if let Some(code) = session.current_code.as_deref() {
            let _ = writeln!(digest, "\nCURRENT CODE (ground truth):");
            let _ = writeln!(digest, "```\n{code}\n```");
        }

        let _ = writeln!(
            digest,
            "\nThe code block above is the CURRENT ground truth. Base every edit on it; do not revert it or regenerate from scratch."
        );
        let _ = writeln!(digest, "{RULE}");

        digest
    }
}

/// Truncates at a character boundary, never mid-codepoint.
fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
