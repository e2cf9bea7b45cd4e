//! Drafter abstraction.
//!
//! The engine never talks to a concrete code generator; it hands a fully
//! assembled payload to this trait and receives generated diagram source
//! back. Implementations wrap whatever external system produces the code
//! (an LLM agent, a subprocess, a remote service).

use crate::error::Result;
use crate::session::DiagramDialect;
use async_trait::async_trait;

/// Everything a drafter needs for one generation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftRequest {
    /// The session this request belongs to.
    pub session_id: String,
    /// The dialect the output must be written in. `Unset` on the first
    /// iteration of a session, where the drafter may choose.
    pub dialect: DiagramDialect,
    /// The stable filename stem all output assets must share.
    pub base_filename: String,
    /// The fully assembled prompt payload (context digest, edit
    /// instructions, task text).
    pub payload: String,
}

/// An external diagram-code generator.
///
/// The contract is strict: on success the returned string is the complete
/// new diagram source. On any failure the implementation returns an error
/// and the caller leaves session state untouched.
#[async_trait]
pub trait DiagramDrafter: Send + Sync {
    /// Generates diagram source for the given request.
    async fn draft(&self, request: &DraftRequest) -> Result<String>;
}
