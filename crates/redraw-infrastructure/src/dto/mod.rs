//! Data Transfer Objects for persistence
//!
//! DTOs isolate the on-disk schema from the domain model. Field names here
//! are a stable storage contract; renaming a domain field must not change
//! the persisted format.

pub mod session;

pub use session::{IterationRecordV1, SessionV1};
