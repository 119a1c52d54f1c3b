//! ShareSync Sync - Session and job orchestration engine
//!
//! Provides:
//! - Connection lifecycle tracking for the share and transfer endpoints
//! - Single-flight execution of the background mirror job
//! - Consistent status snapshots for concurrent readers
//!
//! ## Modules
//!
//! - [`registry`] - Per-slot connection state with transition guards
//! - [`controller`] - Start/stop/status of the single sync job
//! - [`procedure`] - The supervised mirror passes run by the job worker
//! - [`reporter`] - Read-only snapshots of registry, job and log
//! - [`orchestrator`] - Owned bundle of all of the above

pub mod controller;
pub mod orchestrator;
pub mod procedure;
pub mod registry;
pub mod reporter;

pub use controller::SyncJobController;
pub use orchestrator::{Collaborators, Orchestrator};
pub use registry::{ConnectionRegistry, SlotView};
pub use reporter::{ConnectionReport, StatusReporter, StatusSnapshot};
