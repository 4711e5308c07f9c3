//! Dispatch configuration with sensible defaults.
//!
//! [`DispatchConfig`] controls the per-request timeout, the pacing delay
//! between endpoint fetches, and the identification header. The defaults
//! are tuned for polite sequential scraping of public search endpoints.

use crate::error::DispatchError;

/// Configuration for a dispatch operation.
///
/// Use [`Default::default()`] for sensible defaults, or construct with
/// field overrides for custom behaviour.
#[derive(Debug, Clone)]
pub struct DispatchConfig {
    /// Per-endpoint HTTP request timeout in seconds. The same deadline
    /// applies to every endpoint in a batch.
    pub timeout_seconds: u64,
    /// Fixed delay in milliseconds inserted between successive endpoint
    /// fetches within one batch. Deliberate throttling to reduce the
    /// chance of endpoint-side blocking; set to 0 in tests.
    pub pacing_ms: u64,
    /// Custom User-Agent string. If `None`, rotates through a built-in
    /// list of realistic browser User-Agents.
    pub user_agent: Option<String>,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 12,
            pacing_ms: 500,
            user_agent: None,
        }
    }
}

impl DispatchConfig {
    /// Validates this configuration, returning an error if any field is invalid.
    ///
    /// Checks:
    /// - `timeout_seconds` must be greater than 0
    ///
    /// `pacing_ms` may be 0 (no throttling, used by tests).
    pub fn validate(&self) -> Result<(), DispatchError> {
        if self.timeout_seconds == 0 {
            return Err(DispatchError::Config(
                "timeout_seconds must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}
