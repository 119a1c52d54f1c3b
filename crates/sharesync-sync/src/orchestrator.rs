//! Orchestrator - the owned bundle of registry, controller and reporter
//!
//! Replaces any process-wide singleton: callers build one `Orchestrator`
//! from a [`Config`] and the adapters, then share it (usually in an `Arc`).

use std::sync::Arc;
use std::time::Duration;

use sharesync_audit::LogBuffer;
use sharesync_core::{
    config::Config,
    domain::{
        EndpointConfig, JobStatus, OrchestrationError, RunId, SlotKind, StopOutcome,
        SyncOptionsPatch,
    },
    ports::{ICapabilityProbe, IEndpointConnector, IMirrorExecutor, RemoteEntry},
};
use tracing::debug;

use crate::controller::SyncJobController;
use crate::registry::ConnectionRegistry;
use crate::reporter::{ConnectionReport, StatusReporter, StatusSnapshot};

/// Adapters the orchestrator drives
pub struct Collaborators {
    pub share: Arc<dyn IEndpointConnector>,
    pub transfer: Arc<dyn IEndpointConnector>,
    pub executor: Arc<dyn IMirrorExecutor>,
    pub probe: Arc<dyn ICapabilityProbe>,
}

pub struct Orchestrator {
    log: Arc<LogBuffer>,
    registry: Arc<ConnectionRegistry>,
    controller: SyncJobController,
    reporter: StatusReporter,
}

impl Orchestrator {
    pub fn new(config: &Config, collaborators: Collaborators) -> Self {
        let Collaborators {
            share,
            transfer,
            executor,
            probe,
        } = collaborators;

        let log = Arc::new(LogBuffer::new(config.logging.buffer_capacity));
        let registry = Arc::new(ConnectionRegistry::new(
            share,
            transfer,
            Arc::clone(&log),
            Duration::from_secs(config.connect.timeout_secs),
        ));
        let controller = SyncJobController::new(
            Arc::clone(&registry),
            executor,
            Arc::clone(&log),
            config.sync,
        );
        let reporter = StatusReporter::new(
            Arc::clone(&registry),
            controller.clone(),
            Arc::clone(&log),
            probe,
            config.mirror.requirements.clone(),
            config.logging.tail_default,
        );

        debug!(
            log_capacity = log.capacity(),
            connect_timeout_secs = config.connect.timeout_secs,
            "Orchestrator assembled"
        );

        Self {
            log,
            registry,
            controller,
            reporter,
        }
    }

    pub fn log(&self) -> &Arc<LogBuffer> {
        &self.log
    }

    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.registry
    }

    pub fn controller(&self) -> &SyncJobController {
        &self.controller
    }

    pub fn reporter(&self) -> &StatusReporter {
        &self.reporter
    }

    pub async fn connect(
        &self,
        kind: SlotKind,
        config: EndpointConfig,
    ) -> Result<(), OrchestrationError> {
        self.registry.connect(kind, config).await
    }

    pub async fn disconnect(&self, kind: SlotKind) -> Result<(), OrchestrationError> {
        self.registry.disconnect(kind).await
    }

    pub async fn list_entries(&self, kind: SlotKind) -> Result<Vec<RemoteEntry>, OrchestrationError> {
        self.registry.list_entries(kind).await
    }

    pub fn start(&self, patch: &SyncOptionsPatch) -> Result<RunId, OrchestrationError> {
        self.controller.start(patch)
    }

    pub fn stop(&self) -> StopOutcome {
        self.controller.stop()
    }

    pub fn status(&self) -> JobStatus {
        self.controller.status()
    }

    pub fn snapshot(&self) -> StatusSnapshot {
        self.reporter.snapshot()
    }

    pub fn connection_report(&self) -> ConnectionReport {
        self.reporter.connection_report()
    }
}
