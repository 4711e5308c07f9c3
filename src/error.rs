//! Error types for the omnisearch crate.
//!
//! All errors use stable string messages suitable for display to users
//! and programmatic handling. Per-endpoint failures never surface as
//! errors from a dispatch — they are absorbed into Error-status records
//! at the loop boundary; only caller-level violations reach the caller.

/// Errors that can occur while dispatching a query to search endpoints.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// A registry template is missing its query marker. Registry
    /// validation prevents this; the URL builder checks it defensively.
    #[error("template error: {0}")]
    Template(String),

    /// An endpoint request exceeded the configured deadline.
    #[error("request timed out: {0}")]
    Timeout(String),

    /// DNS, connection, or HTTP-status failure talking to an endpoint.
    #[error("transport error: {0}")]
    Transport(String),

    /// Response parsing or any uncategorized failure.
    #[error("unexpected error: {0}")]
    Unexpected(String),

    /// The registry file could not be loaded or failed validation.
    #[error("registry error: {0}")]
    Registry(String),

    /// A dispatch (or registry edit) was rejected because another
    /// operation is already in flight on this dispatcher instance.
    #[error("dispatch rejected: {0}")]
    ConcurrentDispatch(String),

    /// Invalid dispatch configuration.
    #[error("config error: {0}")]
    Config(String),
}

/// Convenience type alias for omnisearch results.
pub type Result<T> = std::result::Result<T, DispatchError>;
