//! Error types for the Redraw engine.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A shared error type for the entire Redraw engine.
///
/// This provides typed, structured error variants with automatic conversion
/// from common error types via the `From` trait. Every variant is
/// distinguishable by the caller; none are retried or swallowed internally.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum RedrawError {
    /// A continuation was requested for a session that has no persisted record.
    #[error("Session not found: '{id}'")]
    SessionNotFound { id: String },

    /// The session has reached its iteration cap. Fatal for the session;
    /// the caller must start a new one. Never silently truncated.
    #[error("Maximum iterations ({limit}) reached. Start a new session.")]
    IterationLimitExceeded { limit: u32 },

    /// The external drafter returned no usable code, errored, or timed out.
    /// Session state is left untouched; retry is caller-driven.
    #[error("Generation failed: {0}")]
    GenerationFailed(String),

    /// An expected output asset did not appear within the bounded wait.
    /// Treated identically to `GenerationFailed` for state mutation.
    #[error("Artifact did not appear within the bounded wait: {path}")]
    ArtifactTimeout { path: String },

    /// Data access error on the durable store (repository/storage layer).
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "JSON", "TOML", etc.
        message: String,
    },

    /// Internal invariant breach (should not happen in normal operation)
    #[error("Invalid state: {0}")]
    InvalidState(String),
}

impl RedrawError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a SessionNotFound error
    pub fn session_not_found(id: impl Into<String>) -> Self {
        Self::SessionNotFound { id: id.into() }
    }

    /// Creates an IterationLimitExceeded error
    pub fn iteration_limit(limit: u32) -> Self {
        Self::IterationLimitExceeded { limit }
    }

    /// Creates a GenerationFailed error
    pub fn generation_failed(message: impl Into<String>) -> Self {
        Self::GenerationFailed(message.into())
    }

    /// Creates an ArtifactTimeout error
    pub fn artifact_timeout(path: impl Into<String>) -> Self {
        Self::ArtifactTimeout { path: path.into() }
    }

    /// Creates a Persistence error
    pub fn persistence(message: impl Into<String>) -> Self {
        Self::Persistence(message.into())
    }

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates an InvalidState error
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is a SessionNotFound error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::SessionNotFound { .. })
    }

    /// Check if this is an IterationLimitExceeded error
    pub fn is_iteration_limit(&self) -> bool {
        matches!(self, Self::IterationLimitExceeded { .. })
    }

    /// Check if this error came from the external drafter path.
    ///
    /// Returns true for both `GenerationFailed` and `ArtifactTimeout`, which
    /// share the same state-mutation contract: the session record is left
    /// exactly as it was before the call.
    pub fn is_generation_failure(&self) -> bool {
        matches!(self, Self::GenerationFailed(_) | Self::ArtifactTimeout { .. })
    }

    /// Check if this is a persistence-layer error
    pub fn is_persistence(&self) -> bool {
        matches!(
            self,
            Self::Persistence(_) | Self::Io { .. } | Self::Serialization { .. }
        )
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for RedrawError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for RedrawError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for RedrawError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for RedrawError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, RedrawError>`.
pub type Result<T> = std::result::Result<T, RedrawError>;
