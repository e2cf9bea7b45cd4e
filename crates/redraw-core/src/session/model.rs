//! Session domain model.
//!
//! This module contains the core Session entity that represents one
//! iterative drafting conversation in the engine's domain layer.

use crate::error::{RedrawError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// The diagram dialect a session is locked to.
///
/// The dialect is resolved on the first successful iteration and is
/// write-once for the rest of the session's lifetime: every later turn
/// reuses the stored dialect, regardless of what keyword scoring would infer
/// from its text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DiagramDialect {
    /// Cloud architecture diagrams (Python Diagrams-style `name = Node(...)` source).
    Cloud,
    /// Mermaid diagrams (flowchart, sequence, ER, ...).
    Mermaid,
    /// D2 declarative diagrams.
    D2,
    /// Not yet resolved; the session has no successful iteration.
    #[default]
    Unset,
}

impl DiagramDialect {
    /// Returns true if the dialect has not been resolved yet.
    pub fn is_unset(&self) -> bool {
        matches!(self, Self::Unset)
    }

    /// The file extension the external drafter persists its source under.
    ///
    /// Returns `None` for `Unset`.
    pub fn artifact_extension(&self) -> Option<&'static str> {
        match self {
            Self::Cloud => Some("dot"),
            Self::Mermaid => Some("mmd"),
            Self::D2 => Some("d2"),
            Self::Unset => None,
        }
    }

    /// Stable lowercase name used in persisted records and payloads.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cloud => "cloud",
            Self::Mermaid => "mermaid",
            Self::D2 => "d2",
            Self::Unset => "unset",
        }
    }
}

impl std::fmt::Display for DiagramDialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One completed generation step, appended to the session history.
///
/// Records are audit data: they snapshot what the extractor saw at that step
/// but are never used to re-derive `component_state`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IterationRecord {
    /// 1-based sequence number; equals the session's `iteration` at creation.
    pub step: u32,
    /// The raw user request text for this step.
    pub prompt: String,
    /// Component names extracted from the generated code at this step.
    #[serde(default)]
    pub components: Vec<String>,
    /// Short human-readable tags describing what changed.
    #[serde(default)]
    pub modifications: Vec<String>,
    /// Timestamp of the step (RFC 3339 format).
    pub timestamp: String,
}

/// Represents one iterative drafting session in the domain layer.
///
/// A session contains:
/// - The resolved diagram dialect (write-once)
/// - A bounded, append-only history of iteration records
/// - The most recent generated source blob (the sole ground truth for edits)
/// - The current component presence map, recomputed every iteration
/// - A stable filename stem shared by all rendered assets
///
/// This is the "pure" domain model that business logic operates on,
/// independent of any specific storage format or version.
///
/// # Invariants
///
/// - `iteration` never exceeds the configured cap; an over-cap add is a hard
///   `IterationLimitExceeded` error, not a silent truncation.
/// - `history.len() == iteration` after every successful
///   [`record_iteration`](Session::record_iteration).
/// - `dialect` transitions only from `Unset` to a concrete value.
/// - `base_filename` is assigned at most once.
/// - `current_code` always reflects the last successfully completed
///   iteration; a failed attempt never touches it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Unique session identifier. Immutable after creation.
    pub id: String,
    /// Resolved diagram dialect; `Unset` until the first successful iteration.
    #[serde(default)]
    pub dialect: DiagramDialect,
    /// Successful generation count, bounded by the engine's iteration cap.
    #[serde(default)]
    pub iteration: u32,
    /// Ordered iteration records, insertion order = chronological, append-only.
    #[serde(default)]
    pub history: Vec<IterationRecord>,
    /// The most recent generated source blob (opaque text).
    #[serde(default)]
    pub current_code: Option<String>,
    /// Component name -> presence flag, derived from `current_code`.
    #[serde(default)]
    pub component_state: BTreeMap<String, bool>,
    /// Filename stem assigned on the first iteration, stable for the
    /// session's lifetime.
    #[serde(default)]
    pub base_filename: Option<String>,
    /// Timestamp when the session was created (RFC 3339 format). Immutable.
    pub created_at: String,
}

impl Session {
    /// Creates an empty session with the given identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            dialect: DiagramDialect::Unset,
            iteration: 0,
            history: Vec::new(),
            current_code: None,
            component_state: BTreeMap::new(),
            base_filename: None,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Assigns the stable filename stem, once.
    ///
    /// Returns the stem in effect afterwards: the existing one if already
    /// assigned, otherwise the provided candidate.
    pub fn assign_base_filename(&mut self, candidate: impl Into<String>) -> &str {
        self.base_filename.get_or_insert_with(|| candidate.into())
    }

    /// Records a successfully completed generation step.
    ///
    /// Advances `iteration` by exactly 1, resolves the dialect on the first
    /// call, replaces `current_code`, recomputes `component_state` from the
    /// provided extraction (full replacement, never a merge), and appends an
    /// [`IterationRecord`].
    ///
    /// # Arguments
    ///
    /// * `prompt` - The raw user request for this step
    /// * `code` - The generated source blob
    /// * `dialect` - The dialect this step was generated in
    /// * `modifications` - Short tags describing what changed
    /// * `components` - Component names extracted from `code`
    /// * `max_iterations` - The per-session iteration cap
    ///
    /// # Errors
    ///
    /// - `IterationLimitExceeded` if the session is already at the cap.
    /// - `InvalidState` if `dialect` conflicts with an already-resolved
    ///   session dialect (write-once violation).
    pub fn record_iteration(
        &mut self,
        prompt: impl Into<String>,
        code: impl Into<String>,
        dialect: DiagramDialect,
        modifications: Vec<String>,
        components: BTreeSet<String>,
        max_iterations: u32,
    ) -> Result<u32> {
        if self.iteration >= max_iterations {
            return Err(RedrawError::iteration_limit(max_iterations));
        }
        if !self.dialect.is_unset() && dialect != self.dialect {
            return Err(RedrawError::invalid_state(format!(
                "session {} is locked to dialect '{}', cannot record '{}'",
                self.id, self.dialect, dialect
            )));
        }

        self.iteration += 1;
        if self.dialect.is_unset() {
            self.dialect = dialect;
        }

        let component_list: Vec<String> = components.iter().cloned().collect();
        self.current_code = Some(code.into());
        self.component_state = components.into_iter().map(|name| (name, true)).collect();

        self.history.push(IterationRecord {
            step: self.iteration,
            prompt: prompt.into(),
            components: component_list,
            modifications,
            timestamp: chrono::Utc::now().to_rfc3339(),
        });

        Ok(self.iteration)
    }

    /// Returns the names of components currently present in the code.
    pub fn active_components(&self) -> Vec<&str> {
        self.component_state
            .iter()
            .filter(|(_, present)| **present)
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// Returns true if the session has at least one completed iteration.
    pub fn has_history(&self) -> bool {
        !self.history.is_empty()
    }
}
