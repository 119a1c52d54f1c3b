//! ShareSync Audit - Bounded in-memory audit trail
//!
//! Provides:
//! - `LogBuffer`: thread-safe ring of timestamped [`LogEntry`] records
//!   shared by every orchestration component
//!
//! Entries are mirrored to `tracing` as they are appended, so operators see
//! the same events in the process log that users see in status reports.
//!
//! [`LogEntry`]: sharesync_core::domain::LogEntry

pub mod buffer;

pub use buffer::LogBuffer;
