//! JSON-based SessionRepository implementation

use crate::dto::SessionV1;
use async_trait::async_trait;
use redraw_core::error::{RedrawError, Result};
use redraw_core::session::{Session, SessionRepository};
use std::path::{Path, PathBuf};
use tokio::fs;

/// A repository implementation for storing session data in JSON files.
///
/// - Uses DTOs (SessionV1) for persistence
/// - Converts between DTOs and domain models
/// - Stores sessions as individual JSON files in a sessions directory
/// - Saves are full-record overwrites; partial updates do not exist
pub struct JsonSessionRepository {
    base_dir: PathBuf,
}

impl JsonSessionRepository {
    /// Creates a new `JsonSessionRepository` with the specified base directory.
    ///
    /// The directory structure will be created if it doesn't exist:
    /// ```text
    /// base_dir/
    /// └── sessions/
    ///     ├── session-id-1.json
    ///     └── session-id-2.json
    /// ```
    ///
    /// # Errors
    ///
    /// Returns an error if the directory structure cannot be created.
    pub async fn new(base_dir: impl AsRef<Path>) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();

        let sessions_dir = base_dir.join("sessions");
        fs::create_dir_all(&sessions_dir).await.map_err(|e| {
            RedrawError::persistence(format!(
                "Failed to create sessions directory {sessions_dir:?}: {e}"
            ))
        })?;

        Ok(Self { base_dir })
    }

    /// Creates a `JsonSessionRepository` instance at the default location (~/.redraw).
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined or if
    /// the directory structure cannot be created.
    pub async fn default_location() -> Result<Self> {
        let home_dir = dirs::home_dir()
            .ok_or_else(|| RedrawError::persistence("Failed to get home directory"))?;
        Self::new(home_dir.join(".redraw")).await
    }

    /// Returns the file path for a given session ID.
    fn session_file_path(&self, session_id: &str) -> PathBuf {
        self.base_dir
            .join("sessions")
            .join(format!("{session_id}.json"))
    }

    /// Loads a session from a specific file path.
    async fn load_session_from_path(&self, path: &Path) -> Result<Session> {
        let json_content = fs::read_to_string(path).await.map_err(|e| {
            RedrawError::persistence(format!("Failed to read session file {path:?}: {e}"))
        })?;

        let dto: SessionV1 = serde_json::from_str(&json_content)?;
        Ok(dto.into_domain())
    }
}

#[async_trait]
impl SessionRepository for JsonSessionRepository {
    async fn find_by_id(&self, session_id: &str) -> Result<Option<Session>> {
        let file_path = self.session_file_path(session_id);

        if !file_path.exists() {
            return Ok(None);
        }

        self.load_session_from_path(&file_path).await.map(Some)
    }

    async fn save(&self, session: &Session) -> Result<()> {
        let file_path = self.session_file_path(&session.id);

        let dto = SessionV1::from(session);
        let json_content = serde_json::to_string_pretty(&dto)?;

        fs::write(&file_path, json_content).await.map_err(|e| {
            RedrawError::persistence(format!("Failed to write session file {file_path:?}: {e}"))
        })?;

        tracing::debug!("[JsonSessionRepository] Saved session: {}", session.id);
        Ok(())
    }

    async fn delete(&self, session_id: &str) -> Result<()> {
        let file_path = self.session_file_path(session_id);

        // Deleting an absent session is a no-op.
        if file_path.exists() {
            fs::remove_file(&file_path).await.map_err(|e| {
                RedrawError::persistence(format!(
                    "Failed to delete session file {file_path:?}: {e}"
                ))
            })?;
        }

        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<Session>> {
        let sessions_dir = self.base_dir.join("sessions");
        let mut sessions = Vec::new();

        let mut entries = fs::read_dir(&sessions_dir).await.map_err(|e| {
            RedrawError::persistence(format!(
                "Failed to read sessions directory {sessions_dir:?}: {e}"
            ))
        })?;

        while let Some(entry) = entries.next_entry().await.map_err(|e| {
            RedrawError::persistence(format!("Failed to read directory entry: {e}"))
        })? {
            let path = entry.path();
            if path.extension().and_then(|s| s.to_str()) == Some("json") {
                // A single unreadable file must not hide the rest.
                match self.load_session_from_path(&path).await {
                    Ok(session) => sessions.push(session),
                    Err(e) => {
                        tracing::warn!(
                            "[JsonSessionRepository] Skipping unreadable session file {:?}: {}",
                            path,
                            e
                        );
                    }
                }
            }
        }

        // Sort by created_at descending (most recent first)
        sessions.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(sessions)
    }
}
