//! Domain entities and business rules
//!
//! This module contains the core domain types for ShareSync:
//! - Endpoint slots and their opaque connection parameters
//! - The single reusable sync job and its options
//! - Audit log entries
//! - Orchestration error taxonomy

pub mod endpoint;
pub mod errors;
pub mod job;
pub mod log_entry;
pub mod options;

// Re-export commonly used types
pub use endpoint::{Credential, EndpointConfig, SlotKind};
pub use errors::{JobExecutionError, OrchestrationError};
pub use job::{JobState, JobStatus, RunId, StopOutcome, SyncJob};
pub use log_entry::{LogEntry, LogLevel};
pub use options::{Direction, MirrorFlags, SyncOptions, SyncOptionsPatch};
