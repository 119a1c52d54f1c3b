//! Mirror executor port
//!
//! The mirroring algorithm itself belongs to an external tool. The core
//! invokes it once per directional pass and only interprets the exit
//! status.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::{
    endpoint::{EndpointConfig, SlotKind},
    options::MirrorFlags,
};

/// One side of a mirror pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MirrorEndpoint {
    /// Which slot this side belongs to
    pub kind: SlotKind,
    /// Connection parameters captured when the run started
    pub config: EndpointConfig,
}

/// Result of a single executor invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MirrorOutcome {
    /// Process exit code (`None` if terminated by a signal)
    pub exit_code: Option<i32>,
    /// Captured diagnostic output
    pub diagnostics: String,
}

impl MirrorOutcome {
    /// Creates a successful outcome
    pub fn success(diagnostics: impl Into<String>) -> Self {
        Self {
            exit_code: Some(0),
            diagnostics: diagnostics.into(),
        }
    }

    /// Creates an outcome with the given exit code
    pub fn exited(code: i32, diagnostics: impl Into<String>) -> Self {
        Self {
            exit_code: Some(code),
            diagnostics: diagnostics.into(),
        }
    }

    /// Returns true if the tool exited with status zero
    pub fn is_success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Port trait for the external mirroring tool
#[async_trait]
pub trait IMirrorExecutor: Send + Sync {
    /// Mirrors `source` onto `destination` according to `flags`
    ///
    /// A non-zero exit is reported through [`MirrorOutcome`]; `Err` is
    /// reserved for failures to launch or supervise the tool.
    async fn run(
        &self,
        source: &MirrorEndpoint,
        destination: &MirrorEndpoint,
        flags: &MirrorFlags,
    ) -> anyhow::Result<MirrorOutcome>;
}
