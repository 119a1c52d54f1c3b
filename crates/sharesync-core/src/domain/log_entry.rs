//! Audit log entries
//!
//! A [`LogEntry`] is an immutable, timestamped record of something the
//! orchestrator did, shown to users alongside the job status.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Severity of a log entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    /// Progress information
    Info,
    /// An operation completed successfully
    Success,
    /// Something unexpected but harmless happened
    Warning,
    /// An operation failed
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            LogLevel::Info => "info",
            LogLevel::Success => "success",
            LogLevel::Warning => "warning",
            LogLevel::Error => "error",
        };
        write!(f, "{}", s)
    }
}

/// A single audit record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// When the entry was appended
    timestamp: DateTime<Utc>,
    /// Human-readable description
    message: String,
    /// Severity
    level: LogLevel,
}

impl LogEntry {
    /// Creates a new entry stamped with the current time
    pub fn new(message: impl Into<String>, level: LogLevel) -> Self {
        Self::with_timestamp(message, level, Utc::now())
    }

    /// Creates an entry with a specific timestamp
    pub fn with_timestamp(
        message: impl Into<String>,
        level: LogLevel,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            timestamp,
            message: message.into(),
            level,
        }
    }

    /// Returns when the entry was appended
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Returns the message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the severity
    pub fn level(&self) -> LogLevel {
        self.level
    }
}

impl std::fmt::Display for LogEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S"),
            self.level,
            self.message
        )
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_display_format() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 5).unwrap();
        let entry = LogEntry::with_timestamp("Share connected", LogLevel::Success, ts);
        assert_eq!(
            entry.to_string(),
            "[2024-03-01 12:30:05] success: Share connected"
        );
    }

    #[test]
    fn test_level_serializes_lowercase() {
        let json = serde_json::to_string(&LogLevel::Warning).unwrap();
        assert_eq!(json, "\"warning\"");
    }
}
