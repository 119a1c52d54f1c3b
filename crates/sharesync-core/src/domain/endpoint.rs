//! Endpoint slots and connection parameters
//!
//! ShareSync tracks exactly two remote endpoints, each occupying a fixed
//! [`SlotKind`]. The parameters used to reach an endpoint are carried in an
//! [`EndpointConfig`], whose keys are defined by the connector adapter and
//! never interpreted by the orchestration core.

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::errors::OrchestrationError;

/// The two independent remote-endpoint roles
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotKind {
    /// Network share (SMB/CIFS), reached through a local mount point
    Share,
    /// FTP-family endpoint (FTP or SFTP)
    Transfer,
}

impl SlotKind {
    /// Both slots, in the order the orchestrator reports them
    pub const ALL: [SlotKind; 2] = [SlotKind::Share, SlotKind::Transfer];

    /// Returns the lowercase name used in logs and CLI arguments
    pub fn as_str(&self) -> &'static str {
        match self {
            SlotKind::Share => "share",
            SlotKind::Transfer => "transfer",
        }
    }
}

impl std::fmt::Display for SlotKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SlotKind {
    type Err = OrchestrationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "share" | "smb" => Ok(SlotKind::Share),
            "transfer" | "ftp" => Ok(SlotKind::Transfer),
            other => Err(OrchestrationError::UnknownSlot(other.to_string())),
        }
    }
}

/// Login credential threaded through every collaborator call
///
/// The password is never serialized and is redacted from `Debug` output,
/// so status snapshots and logs can carry the surrounding config safely.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    /// Account name presented to the remote endpoint
    pub username: String,
    /// Secret presented to the remote endpoint
    #[serde(default, skip_serializing)]
    pub password: String,
}

impl Credential {
    /// Creates a new credential
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Opaque mapping of connection parameters for one endpoint
///
/// Typical keys are `server`, `port`, `protocol` and `mount_point`, but the
/// set is owned by whichever connector adapter consumes it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// Explicit credential, if the endpoint requires one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    credential: Option<Credential>,
    /// Connector-defined parameters
    #[serde(flatten)]
    params: BTreeMap<String, Value>,
}

impl EndpointConfig {
    /// Creates an empty config
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a parameter, returning the updated config
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Attaches a credential, returning the updated config
    pub fn with_credential(mut self, credential: Credential) -> Self {
        self.credential = Some(credential);
        self
    }

    /// Inserts or replaces a parameter in place
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.params.insert(key.into(), value.into());
    }

    /// Returns the raw parameter value
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.params.get(key)
    }

    /// Returns a parameter as a non-empty string
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.params
            .get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }

    /// Returns a parameter as an unsigned integer
    ///
    /// Accepts both JSON numbers and numeric strings, since form-style
    /// inputs usually deliver ports as text.
    pub fn get_u64(&self, key: &str) -> Option<u64> {
        match self.params.get(key)? {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Returns the attached credential
    pub fn credential(&self) -> Option<&Credential> {
        self.credential.as_ref()
    }

    /// Returns true if no parameters are set
    ///
    /// A credential on its own does not make a config usable.
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Iterates over the parameters in key order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.params.iter()
    }
}
