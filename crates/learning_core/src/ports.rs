//! crates/learning_core/src/ports.rs
//!
//! Defines the service contracts (traits) at the edge of the core.
//! The generative text service is treated as an opaque capability: a prompt plus
//! an output schema goes in, structured JSON or a failure comes out.

use async_trait::async_trait;
use serde_json::Value;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (network, provider SDK).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
    #[error("The service returned an unusable response: {0}")]
    InvalidResponse(String),
    #[error("The service did not answer within {0} seconds")]
    Timeout(u64),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// A request for schema-constrained output.
#[derive(Debug, Clone, PartialEq)]
pub struct StructuredRequest {
    /// Short identifier for the schema, e.g. `"quiz_questions"`.
    pub name: String,
    pub prompt: String,
    /// JSON schema the returned payload must conform to.
    pub schema: Value,
}

#[async_trait]
pub trait StructuredGenerationService: Send + Sync {
    /// Sends the prompt and schema upstream and returns the decoded JSON payload.
    ///
    /// Conformance to `request.schema` is claimed by the provider, not guaranteed;
    /// callers validate the payload themselves.
    async fn generate_structured(&self, request: StructuredRequest) -> PortResult<Value>;
}
