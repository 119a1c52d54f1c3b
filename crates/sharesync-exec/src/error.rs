//! Error types for the system adapters

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the adapters before or while invoking a tool
#[derive(Debug, Error)]
pub enum AdapterError {
    /// A required connection parameter is absent or empty
    #[error("missing connection parameter: {0}")]
    MissingField(&'static str),

    /// A connection parameter has an unusable value
    #[error("invalid {field}: {value} ({reason})")]
    InvalidValue {
        field: &'static str,
        value: String,
        reason: String,
    },

    /// The transfer protocol is not one lftp is driven with here
    #[error("unsupported protocol: {0} (expected ftp or sftp)")]
    UnsupportedProtocol(String),

    /// The share mount point is missing or not a directory
    #[error("mount point is not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    /// The external tool could not be started
    #[error("failed to launch {tool}: {source}")]
    Launch {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    /// The external tool exited unsuccessfully
    #[error("{tool} exited with {status}: {stderr}")]
    ToolFailed {
        tool: String,
        status: String,
        stderr: String,
    },

    /// Both sides of a mirror pass belong to the same slot
    #[error("mirror pass needs one share side and one transfer side")]
    MismatchedEndpoints,
}
