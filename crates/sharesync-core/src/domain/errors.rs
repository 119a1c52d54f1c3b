//! Domain error types
//!
//! [`OrchestrationError`] covers every failure returned synchronously to a
//! caller of the orchestration engine. [`JobExecutionError`] describes a
//! failed background mirror run; it is recorded on the job rather than
//! returned, because `start` has already returned by the time it occurs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::endpoint::SlotKind;

/// Errors returned by connection and job-control operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OrchestrationError {
    /// The connector rejected the config or failed to establish a session
    #[error("{kind} connection failed: {cause}")]
    Connection {
        /// Slot that failed to connect
        kind: SlotKind,
        /// Collaborator-provided cause
        cause: String,
    },

    /// The operation needs an established connection
    #[error("{kind} is not connected")]
    NotConnected {
        /// Slot that was expected to be connected
        kind: SlotKind,
    },

    /// A sync job is already running or stopping
    #[error("Sync is already in progress")]
    AlreadyRunning,

    /// Start was requested before both endpoints were connected
    #[error("Both endpoints must be connected; missing: {}", format_missing(.missing))]
    Precondition {
        /// Slots that are not connected
        missing: Vec<SlotKind>,
    },

    /// Start was called with no Tokio runtime to host the worker
    #[error("Sync can only be started from within a Tokio runtime")]
    NoRuntime,

    /// Slot name could not be parsed
    #[error("Unknown endpoint slot: {0}")]
    UnknownSlot(String),
}

fn format_missing(missing: &[SlotKind]) -> String {
    missing
        .iter()
        .map(SlotKind::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Failure of a background mirror run
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("Sync failed: {cause}")]
pub struct JobExecutionError {
    /// Short description of what failed
    pub cause: String,
    /// Diagnostic output captured from the mirror tool, if any
    pub diagnostics: String,
    /// When the failure was recorded
    pub occurred_at: DateTime<Utc>,
}

impl JobExecutionError {
    /// Creates a new error stamped with the current time
    pub fn new(cause: impl Into<String>, diagnostics: impl Into<String>) -> Self {
        Self {
            cause: cause.into(),
            diagnostics: diagnostics.into(),
            occurred_at: Utc::now(),
        }
    }
}
