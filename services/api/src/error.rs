//! services/api/src/error.rs
//!
//! Startup failures of the portal binary. Request-level failures are mapped to
//! status codes inside the handlers and never reach this type.

use crate::config::ConfigError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The configured CORS origin is not a valid header value.
    #[error("Invalid CORS origin '{origin}': {reason}")]
    CorsOrigin { origin: String, reason: String },

    /// Binding the listener or serving connections failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
