//! Endpoint connector port (driven/secondary port)
//!
//! One trait covers both slots. The share connector and the transfer
//! connector (with its FTP and SFTP variants) expose the same capability
//! set, so the registry can treat them uniformly.
//!
//! ## Design Notes
//!
//! - Uses `anyhow::Result` because errors at port boundaries are
//!   adapter-specific; the registry converts them into
//!   `OrchestrationError::Connection`.
//! - Every call receives the full [`EndpointConfig`], including its
//!   credential, so adapters never need to cache secrets between calls.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::endpoint::EndpointConfig;

/// A single directory entry reported by a connector
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteEntry {
    /// Entry name (no path components)
    pub name: String,
    /// Whether the entry is a directory
    pub is_directory: bool,
    /// Size in bytes (0 for directories)
    pub size: u64,
    /// Last modification time, if the endpoint reports one
    pub modified_at: Option<DateTime<Utc>>,
}

/// Port trait for remote endpoint connectivity
#[async_trait]
pub trait IEndpointConnector: Send + Sync {
    /// Checks that `config` carries everything this connector needs
    ///
    /// Runs before any I/O so malformed configs fail fast.
    fn validate(&self, config: &EndpointConfig) -> anyhow::Result<()>;

    /// Establishes (or verifies) a session with the endpoint
    async fn connect(&self, config: &EndpointConfig) -> anyhow::Result<()>;

    /// Tears down the session established by [`connect`](Self::connect)
    async fn disconnect(&self, config: &EndpointConfig) -> anyhow::Result<()>;

    /// Lists the entries at the endpoint's root
    async fn list_entries(&self, config: &EndpointConfig) -> anyhow::Result<Vec<RemoteEntry>>;
}
