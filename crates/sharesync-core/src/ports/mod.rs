//! Port definitions (hexagonal architecture interfaces)
//!
//! This module defines the port traits that form the boundaries of the
//! orchestration core. The core sequences and supervises calls through
//! these traits; implementations live in adapter crates.
//!
//! ## Ports Overview
//!
//! - [`IEndpointConnector`] - Connect, disconnect and list one remote endpoint
//! - [`IMirrorExecutor`] - Run the external mirroring tool for one pass
//! - [`ICapabilityProbe`] - Check for required system tools (diagnostics only)

pub mod capability_probe;
pub mod endpoint_connector;
pub mod mirror_executor;

pub use capability_probe::{requirement_report, ICapabilityProbe};
pub use endpoint_connector::{IEndpointConnector, RemoteEntry};
pub use mirror_executor::{IMirrorExecutor, MirrorEndpoint, MirrorOutcome};
