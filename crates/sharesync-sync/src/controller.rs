//! SyncJobController - single-flight control of the background sync job
//!
//! The controller owns the one [`SyncJob`] and the cancellation token of
//! its current run. Every transition happens under one short
//! `std::sync::Mutex` critical section that never spans an `.await`.
//!
//! ## Single-flight
//!
//! `start` checks the job state and the registry, moves the job to Running
//! and spawns the worker inside the same critical section, so two callers
//! can never both observe an idle job and both launch a run.
//!
//! ```text
//! start() ──lock──→ [active? → AlreadyRunning] → [missing? → Precondition]
//!                   → [no runtime? → NoRuntime] → begin() → log "Sync started"
//!                   → spawn(supervisor(worker)) ──unlock──→ Ok(run_id)
//!
//! supervisor: worker.execute().await ──lock──→ finish()/finish_cancelled()
//! ```

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use sharesync_audit::LogBuffer;
use sharesync_core::{
    domain::{
        JobExecutionError, JobState, JobStatus, OrchestrationError, RunId, SlotKind, StopOutcome,
        SyncJob, SyncOptions, SyncOptionsPatch,
    },
    ports::{IMirrorExecutor, MirrorEndpoint},
};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::procedure::{MirrorRun, RunOutcome};
use crate::registry::ConnectionRegistry;

struct JobCell {
    job: SyncJob,
    /// Token of the current run; `None` while no worker is alive
    cancel: Option<CancellationToken>,
}

struct ControllerInner {
    cell: Mutex<JobCell>,
    /// Publishes every state transition for `wait_until_inactive`
    state_tx: watch::Sender<JobState>,
    registry: Arc<ConnectionRegistry>,
    executor: Arc<dyn IMirrorExecutor>,
    log: Arc<LogBuffer>,
    defaults: SyncOptions,
}

impl ControllerInner {
    fn lock(&self) -> MutexGuard<'_, JobCell> {
        self.cell.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Records a finished run and leaves the active states
    fn complete(&self, run_id: RunId, outcome: RunOutcome) {
        let mut cell = self.lock();
        let resulting = match outcome {
            RunOutcome::Completed => cell.job.finish(run_id, Ok(())),
            RunOutcome::Failed(err) => cell.job.finish(run_id, Err(err)),
            RunOutcome::Cancelled => cell.job.finish_cancelled(run_id),
        };

        let Some(state) = resulting else {
            warn!(run_id = %run_id, "Ignoring outcome of a superseded run");
            return;
        };
        cell.cancel = None;

        match state {
            JobState::Succeeded => {
                info!(run_id = %run_id, "Sync run succeeded");
                self.log.success("Sync completed");
            }
            JobState::Failed => {
                let (cause, diagnostics) = cell
                    .job
                    .last_error()
                    .map(|e| (e.cause.clone(), e.diagnostics.clone()))
                    .unwrap_or_default();
                error!(run_id = %run_id, cause = %cause, "Sync run failed");
                if diagnostics.trim().is_empty() {
                    self.log.error(format!("Sync failed: {cause}"));
                } else {
                    self.log
                        .error(format!("Sync failed: {cause}\n{}", diagnostics.trim_end()));
                }
            }
            _ => {
                info!(run_id = %run_id, "Sync run stopped");
                self.log.warning("Sync stopped before completion");
            }
        }
        self.state_tx.send_replace(state);
    }
}

/// Owns the single sync job and enforces single-flight execution
///
/// Cheap to clone; clones share the same job.
#[derive(Clone)]
pub struct SyncJobController {
    inner: Arc<ControllerInner>,
}

impl SyncJobController {
    /// Creates a controller with an idle job
    ///
    /// # Arguments
    /// * `registry` - Connection registry consulted (never mutated) by `start`
    /// * `executor` - Mirror tool invoked by the worker
    /// * `log` - Shared audit log
    /// * `defaults` - Options that start requests are merged over
    pub fn new(
        registry: Arc<ConnectionRegistry>,
        executor: Arc<dyn IMirrorExecutor>,
        log: Arc<LogBuffer>,
        defaults: SyncOptions,
    ) -> Self {
        let (state_tx, _) = watch::channel(JobState::Idle);
        Self {
            inner: Arc::new(ControllerInner {
                cell: Mutex::new(JobCell {
                    job: SyncJob::new(defaults),
                    cancel: None,
                }),
                state_tx,
                registry,
                executor,
                log,
                defaults,
            }),
        }
    }

    /// Starts a sync run in the background
    ///
    /// Returns as soon as the worker is spawned; the outcome is observed
    /// later through [`status`](Self::status). Must be called from within a
    /// Tokio runtime.
    ///
    /// # Errors
    /// * [`OrchestrationError::AlreadyRunning`] if a run is Running or Stopping
    /// * [`OrchestrationError::Precondition`] if either endpoint is not connected
    /// * [`OrchestrationError::NoRuntime`] if called outside a Tokio runtime
    pub fn start(&self, patch: &SyncOptionsPatch) -> Result<RunId, OrchestrationError> {
        let inner = &self.inner;
        let mut cell = inner.lock();

        if cell.job.state().is_active() {
            warn!("Start rejected: sync already in progress");
            return Err(OrchestrationError::AlreadyRunning);
        }

        let share = inner.registry.view(SlotKind::Share);
        let transfer = inner.registry.view(SlotKind::Transfer);
        let (share_config, transfer_config) = match (
            share.connected.then_some(share.config).flatten(),
            transfer.connected.then_some(transfer.config).flatten(),
        ) {
            (Some(share), Some(transfer)) => (share, transfer),
            (share, transfer) => {
                let mut missing = Vec::new();
                if share.is_none() {
                    missing.push(SlotKind::Share);
                }
                if transfer.is_none() {
                    missing.push(SlotKind::Transfer);
                }
                warn!(?missing, "Start rejected: endpoints not connected");
                return Err(OrchestrationError::Precondition { missing });
            }
        };

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            error!("Start rejected: no Tokio runtime to run the sync worker");
            return Err(OrchestrationError::NoRuntime);
        };

        let options = inner.defaults.merged(patch);
        let run_id = cell.job.begin(options)?;
        let cancel = CancellationToken::new();
        cell.cancel = Some(cancel.clone());
        inner.state_tx.send_replace(JobState::Running);

        let run = MirrorRun::new(
            run_id,
            MirrorEndpoint {
                kind: SlotKind::Share,
                config: share_config,
            },
            MirrorEndpoint {
                kind: SlotKind::Transfer,
                config: transfer_config,
            },
            options.passes(),
            Arc::clone(&inner.executor),
            Arc::clone(&inner.log),
            cancel,
        );

        info!(run_id = %run_id, ?options, "Sync run started");
        inner.log.info("Sync started");

        let supervisor = Arc::clone(inner);
        runtime.spawn(async move {
            // The worker runs in its own task so a panic inside the
            // executor surfaces here as a JoinError instead of killing
            // the supervisor before it can leave the Running state.
            let outcome = match tokio::spawn(async move { run.execute().await }).await {
                Ok(outcome) => outcome,
                Err(join_err) => RunOutcome::Failed(JobExecutionError::new(
                    format!("sync worker aborted: {join_err}"),
                    String::new(),
                )),
            };
            supervisor.complete(run_id, outcome);
        });

        Ok(run_id)
    }

    /// Requests that the current run stop
    ///
    /// Never blocks and never fails. Stopping an idle job is a no-op that
    /// logs a warning; stopping a finished job clears its result.
    pub fn stop(&self) -> StopOutcome {
        let inner = &self.inner;
        let mut cell = inner.lock();
        let outcome = cell.job.request_stop();

        match outcome {
            StopOutcome::NothingToStop => {
                inner.log.warning("Stop requested but no sync is running");
            }
            StopOutcome::AlreadyStopping => {
                inner.log.warning("Stop already requested; waiting for sync to unwind");
            }
            StopOutcome::Stopping(run_id) => {
                if let Some(cancel) = &cell.cancel {
                    cancel.cancel();
                }
                inner.state_tx.send_replace(JobState::Stopping);
                info!(run_id = %run_id, "Stop signalled to sync worker");
                inner.log.warning("Sync stop requested");
            }
            StopOutcome::Reset(previous) => {
                inner.state_tx.send_replace(JobState::Idle);
                inner
                    .log
                    .warning(format!("Stop requested; cleared {previous} sync result"));
            }
        }
        outcome
    }

    /// Returns a snapshot of the job
    pub fn status(&self) -> JobStatus {
        self.inner.lock().job.status()
    }

    /// Returns the options requests are merged over
    pub fn defaults(&self) -> SyncOptions {
        self.inner.defaults
    }

    /// Waits until no run is Running or Stopping, then returns the status
    pub async fn wait_until_inactive(&self) -> JobStatus {
        let mut rx = self.inner.state_tx.subscribe();
        // The sender lives in `inner`, which `self` keeps alive
        let _ = rx.wait_for(|state| !state.is_active()).await;
        self.status()
    }
}
