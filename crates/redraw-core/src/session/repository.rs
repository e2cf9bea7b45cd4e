//! Session repository trait.
//!
//! Defines the interface for session persistence operations.

use super::model::Session;
use crate::error::Result;
use async_trait::async_trait;

/// An abstract repository for managing session persistence.
///
/// This trait defines the contract for persisting and retrieving sessions,
/// decoupling the engine's core logic from the specific storage mechanism
/// (e.g., JSON files, database, remote API).
///
/// # Implementation Notes
///
/// Writes are full-record overwrites; no partial updates. No concurrent-writer
/// protection is required: a session is driven by one interactive user at a
/// time, and concurrent edits to one session are an accepted last-write-wins
/// hazard.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Finds a session by its ID.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(Session))`: Session found
    /// - `Ok(None)`: Session not found
    /// - `Err(_)`: Error occurred during retrieval
    async fn find_by_id(&self, session_id: &str) -> Result<Option<Session>>;

    /// Saves a session to storage as a full-record overwrite.
    ///
    /// # Errors
    ///
    /// Persistence failures must propagate, never be swallowed; a swallowed
    /// write risks divergence between in-memory and durable truth.
    async fn save(&self, session: &Session) -> Result<()>;

    /// Deletes a session from storage.
    ///
    /// Idempotent: deleting a session that does not exist is `Ok(())`.
    async fn delete(&self, session_id: &str) -> Result<()>;

    /// Lists all stored sessions, most recently created first.
    async fn list_all(&self) -> Result<Vec<Session>>;
}
