pub mod artifacts;
pub mod config_loader;
pub mod dto;
pub mod json_session_repository;

pub use crate::artifacts::wait_for_artifact;
pub use crate::config_loader::{default_config_path, load_config};
pub use crate::json_session_repository::JsonSessionRepository;
