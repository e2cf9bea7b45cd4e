pub mod classify;
pub mod config;
pub mod context;
pub mod drafter;
pub mod error;
pub mod extract;
pub mod instruction;
pub mod session;

// Re-export common error type
pub use error::{RedrawError, Result};
