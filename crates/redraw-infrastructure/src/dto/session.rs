//! Session DTOs
//!
//! V1 is the only schema version so far. Forward tolerance comes from serde
//! defaults: a file written by a newer minor revision with extra fields, or
//! an older one missing optional fields, still loads.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use redraw_core::session::{DiagramDialect, IterationRecord, Session};

/// One persisted iteration record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IterationRecordV1 {
    /// 1-based step number
    pub step: u32,
    /// Raw user request text for this step
    pub prompt: String,
    /// Component names extracted at this step
    #[serde(default)]
    pub components: Vec<String>,
    /// Short human-readable change tags
    #[serde(default)]
    pub modifications: Vec<String>,
    /// Timestamp of the step (ISO 8601 format)
    pub timestamp: String,
}

/// Represents V1 of the session data schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionV1 {
    /// Unique session identifier
    pub session_id: String,
    /// Resolved diagram dialect; `null` means not yet resolved
    #[serde(default)]
    pub diagram_type: Option<String>,
    /// Successful generation count
    #[serde(default)]
    pub iteration: u32,
    /// Ordered iteration records, oldest first
    #[serde(default)]
    pub history: Vec<IterationRecordV1>,
    /// The most recent generated source blob
    #[serde(default)]
    pub current_code: Option<String>,
    /// Component name -> presence flag derived from current_code
    #[serde(default)]
    pub component_state: BTreeMap<String, bool>,
    /// Stable filename stem shared by all rendered assets
    #[serde(default)]
    pub base_filename: Option<String>,
    /// Timestamp when the session was created (ISO 8601 format)
    pub created_at: String,
}

fn dialect_to_storage(dialect: DiagramDialect) -> Option<String> {
    match dialect {
        DiagramDialect::Unset => None,
        other => Some(other.as_str().to_string()),
    }
}

fn dialect_from_storage(value: Option<&str>) -> DiagramDialect {
    match value {
        Some("cloud") => DiagramDialect::Cloud,
        Some("mermaid") => DiagramDialect::Mermaid,
        Some("d2") => DiagramDialect::D2,
        // Unknown or absent dialects load as unresolved rather than failing.
        _ => DiagramDialect::Unset,
    }
}

impl From<&Session> for SessionV1 {
    fn from(session: &Session) -> Self {
        Self {
            session_id: session.id.clone(),
            diagram_type: dialect_to_storage(session.dialect),
            iteration: session.iteration,
            history: session
                .history
                .iter()
                .map(|record| IterationRecordV1 {
                    step: record.step,
                    prompt: record.prompt.clone(),
                    components: record.components.clone(),
                    modifications: record.modifications.clone(),
                    timestamp: record.timestamp.clone(),
                })
                .collect(),
            current_code: session.current_code.clone(),
            component_state: session.component_state.clone(),
            base_filename: session.base_filename.clone(),
            created_at: session.created_at.clone(),
        }
    }
}

impl SessionV1 {
    /// Converts the DTO into the domain model.
    pub fn into_domain(self) -> Session {
        Session {
            id: self.session_id,
            dialect: dialect_from_storage(self.diagram_type.as_deref()),
            iteration: self.iteration,
            history: self
                .history
                .into_iter()
                .map(|record| IterationRecord {
                    step: record.step,
                    prompt: record.prompt,
                    components: record.components,
                    modifications: record.modifications,
                    timestamp: record.timestamp,
                })
                .collect(),
            current_code: self.current_code,
            component_state: self.component_state,
            base_filename: self.base_filename,
            created_at: self.created_at,
        }
    }
}
