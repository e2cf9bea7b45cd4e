//! Session domain module.
//!
//! This module contains all session-related domain models and the repository
//! interface.
//!
//! # Module Structure
//!
//! - `model`: Core session domain model (`Session`, `IterationRecord`,
//!   `DiagramDialect`)
//! - `repository`: Repository trait for session persistence

mod model;
mod repository;

// Re-export public API
pub use model::{DiagramDialect, IterationRecord, Session};
pub use repository::SessionRepository;
