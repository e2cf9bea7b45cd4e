//! Engine configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Tunable limits for the iterative drafting engine.
///
/// Every field carries a default so configuration files may omit any subset
/// of them; unknown future fields are likewise tolerated on load.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Hard cap on successful iterations per session.
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,

    /// How many recent iteration records the context digest includes.
    /// Clamped to 3..=10 at the point of use.
    #[serde(default = "default_recent_history_window")]
    pub recent_history_window: usize,

    /// Character cap applied to each prompt quoted in the digest.
    #[serde(default = "default_prompt_snippet_chars")]
    pub prompt_snippet_chars: usize,

    /// Maximum modification tags quoted per digest entry.
    #[serde(default = "default_modification_tag_limit")]
    pub modification_tag_limit: usize,

    /// Wall-clock budget for one external drafter call, in seconds. A
    /// drafter that never signals completion is walked away from after this.
    #[serde(default = "default_draft_timeout_secs")]
    pub draft_timeout_secs: u64,

    /// Fixed retry count for the bounded artifact wait.
    #[serde(default = "default_artifact_poll_retries")]
    pub artifact_poll_retries: u32,

    /// Fixed sleep interval between artifact polls, in milliseconds.
    #[serde(default = "default_artifact_poll_interval_ms")]
    pub artifact_poll_interval_ms: u64,

    /// Directory where the drafter persists its output assets. When set, the
    /// orchestrator waits (bounded) for the dialect-specific source file to
    /// appear there after each generation.
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
}

fn default_max_iterations() -> u32 {
    10
}

fn default_recent_history_window() -> usize {
    3
}

fn default_prompt_snippet_chars() -> usize {
    100
}

fn default_modification_tag_limit() -> usize {
    3
}

fn default_draft_timeout_secs() -> u64 {
    120
}

fn default_artifact_poll_retries() -> u32 {
    10
}

fn default_artifact_poll_interval_ms() -> u64 {
    1000
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            recent_history_window: default_recent_history_window(),
            prompt_snippet_chars: default_prompt_snippet_chars(),
            modification_tag_limit: default_modification_tag_limit(),
            draft_timeout_secs: default_draft_timeout_secs(),
            artifact_poll_retries: default_artifact_poll_retries(),
            artifact_poll_interval_ms: default_artifact_poll_interval_ms(),
            output_dir: None,
        }
    }
}

impl EngineConfig {
    /// The recent-history window clamped to its supported 3..=10 range.
    pub fn clamped_history_window(&self) -> usize {
        self.recent_history_window.clamp(3, 10)
    }
}
