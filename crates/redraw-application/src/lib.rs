//! Application layer for Redraw.
//!
//! This crate provides use case implementations that coordinate between
//! domain and infrastructure layers to implement application-level business logic.

pub mod generate_usecase;
pub mod share;

pub use generate_usecase::{GenerateOutcome, GenerateUseCase};
pub use share::terrastruct_play_link;
