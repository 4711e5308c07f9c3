//! Core types for dispatch outcomes and endpoint selection.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome status of one endpoint within a dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordStatus {
    /// The endpoint was fetched and extracted (possibly with zero results).
    Success,
    /// The endpoint failed; `ResultRecord::message` carries the reason.
    Error,
}

impl fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Success => "Success",
            Self::Error => "Error",
        })
    }
}

/// One outcome record per endpoint per dispatch.
///
/// Immutable once created; owned by the caller after the batch returns.
/// Result URLs preserve document order and never exceed
/// [`crate::extract::MAX_RESULT_URLS`] entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultRecord {
    /// Identifier of the endpoint this record belongs to.
    pub endpoint: String,
    /// Whether the endpoint was fetched and extracted successfully.
    pub status: RecordStatus,
    /// Human-readable outcome summary (result count, or failure reason).
    pub message: String,
    /// Absolute result URLs in document order. Empty on error, and
    /// possibly empty on success (no matching anchors is not an error).
    pub results: Vec<String>,
}

impl ResultRecord {
    /// Build a success record from extracted result URLs.
    pub fn success(endpoint: impl Into<String>, results: Vec<String>) -> Self {
        let message = format!("{} result(s)", results.len());
        Self {
            endpoint: endpoint.into(),
            status: RecordStatus::Success,
            message,
            results,
        }
    }

    /// Build an error record carrying the failure reason; results are empty.
    pub fn error(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            status: RecordStatus::Error,
            message: message.into(),
            results: Vec::new(),
        }
    }
}

/// Ordered outcome records for one dispatch, in dispatch order.
pub type DispatchBatch = Vec<ResultRecord>;

/// Which endpoints a dispatch should visit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EndpointSelection {
    /// Every registered endpoint, in registry order.
    All,
    /// A single endpoint by identifier.
    One(String),
}
