//! Shared port doubles for the orchestration integration tests

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::anyhow;
use async_trait::async_trait;
use sharesync_core::{
    config::Config,
    domain::{Direction, EndpointConfig, MirrorFlags},
    ports::{ICapabilityProbe, IEndpointConnector, IMirrorExecutor, MirrorEndpoint, MirrorOutcome, RemoteEntry},
};
use sharesync_sync::{Collaborators, Orchestrator};
use tokio::sync::Semaphore;

/// Connector whose handshake and teardown can be made to fail
#[derive(Default)]
pub struct MockConnector {
    pub fail_connect: bool,
    pub fail_disconnect: bool,
    pub connects: AtomicUsize,
    pub disconnects: AtomicUsize,
}

impl MockConnector {
    pub fn failing_disconnect() -> Self {
        Self {
            fail_disconnect: true,
            ..Self::default()
        }
    }

    pub fn failing_connect() -> Self {
        Self {
            fail_connect: true,
            ..Self::default()
        }
    }
}

#[async_trait]
impl IEndpointConnector for MockConnector {
    fn validate(&self, config: &EndpointConfig) -> anyhow::Result<()> {
        config
            .get_str("server")
            .map(|_| ())
            .ok_or_else(|| anyhow!("server is required"))
    }

    async fn connect(&self, _config: &EndpointConfig) -> anyhow::Result<()> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        if self.fail_connect {
            return Err(anyhow!("connection refused"));
        }
        Ok(())
    }

    async fn disconnect(&self, _config: &EndpointConfig) -> anyhow::Result<()> {
        self.disconnects.fetch_add(1, Ordering::SeqCst);
        if self.fail_disconnect {
            return Err(anyhow!("session already closed by peer"));
        }
        Ok(())
    }

    async fn list_entries(&self, _config: &EndpointConfig) -> anyhow::Result<Vec<RemoteEntry>> {
        Ok(vec![RemoteEntry {
            name: "reports".into(),
            is_directory: true,
            size: 0,
            modified_at: None,
        }])
    }
}

/// Executor that parks every pass until released and records directions
pub struct MockExecutor {
    pub release: Semaphore,
    pub exit_codes: Mutex<Vec<i32>>,
    pub directions: Mutex<Vec<Direction>>,
    pub calls: AtomicUsize,
}

impl MockExecutor {
    /// Passes complete immediately with the given exit codes, then with 0
    pub fn immediate(exit_codes: Vec<i32>) -> Self {
        Self {
            release: Semaphore::new(Semaphore::MAX_PERMITS),
            exit_codes: Mutex::new(exit_codes),
            directions: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Passes block until `release` gets a permit
    pub fn gated() -> Self {
        Self {
            release: Semaphore::new(0),
            ..Self::immediate(Vec::new())
        }
    }

    pub fn directions(&self) -> Vec<Direction> {
        self.directions.lock().unwrap().clone()
    }
}

#[async_trait]
impl IMirrorExecutor for MockExecutor {
    async fn run(
        &self,
        _source: &MirrorEndpoint,
        _destination: &MirrorEndpoint,
        flags: &MirrorFlags,
    ) -> anyhow::Result<MirrorOutcome> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.directions.lock().unwrap().push(flags.direction);
        self.release.acquire().await?.forget();
        let code = {
            let mut codes = self.exit_codes.lock().unwrap();
            if codes.is_empty() {
                0
            } else {
                codes.remove(0)
            }
        };
        Ok(MirrorOutcome::exited(code, format!("mirror exited with {code}")))
    }
}

pub struct AllTools;

impl ICapabilityProbe for AllTools {
    fn has(&self, _tool: &str) -> bool {
        true
    }
}

pub fn orchestrator(
    share: Arc<MockConnector>,
    transfer: Arc<MockConnector>,
    executor: Arc<MockExecutor>,
) -> Orchestrator {
    Orchestrator::new(
        &Config::default(),
        Collaborators {
            share,
            transfer,
            executor,
            probe: Arc::new(AllTools),
        },
    )
}

pub fn share_config() -> EndpointConfig {
    EndpointConfig::new().with("server", "10.0.0.5/share")
}

pub fn transfer_config() -> EndpointConfig {
    EndpointConfig::new()
        .with("server", "ftp.example.com")
        .with("protocol", "ftp")
}
