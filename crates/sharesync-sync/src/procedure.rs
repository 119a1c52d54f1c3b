//! Mirror procedure executed by the sync job worker
//!
//! A [`MirrorRun`] holds everything one run needs, captured when the run
//! started: the endpoint configs of both slots, the resolved passes, and
//! the run's cancellation token. It never touches the registry or the job
//! state; the controller records the returned [`RunOutcome`].
//!
//! Cancellation is polled at checkpoints before and after every pass, and
//! the executor call itself is raced against the token.

use std::sync::Arc;

use sharesync_audit::LogBuffer;
use sharesync_core::{
    domain::{Direction, JobExecutionError, MirrorFlags, RunId},
    ports::{IMirrorExecutor, MirrorEndpoint},
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// How a run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every pass exited successfully
    Completed,
    /// A pass failed; remaining passes were skipped
    Failed(JobExecutionError),
    /// Cancellation was observed at a checkpoint
    Cancelled,
}

/// One supervised execution of the mirror passes
pub struct MirrorRun {
    run_id: RunId,
    share: MirrorEndpoint,
    transfer: MirrorEndpoint,
    passes: Vec<MirrorFlags>,
    executor: Arc<dyn IMirrorExecutor>,
    log: Arc<LogBuffer>,
    cancel: CancellationToken,
}

impl MirrorRun {
    pub fn new(
        run_id: RunId,
        share: MirrorEndpoint,
        transfer: MirrorEndpoint,
        passes: Vec<MirrorFlags>,
        executor: Arc<dyn IMirrorExecutor>,
        log: Arc<LogBuffer>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            run_id,
            share,
            transfer,
            passes,
            executor,
            log,
            cancel,
        }
    }

    fn endpoints(&self, direction: Direction) -> (&MirrorEndpoint, &MirrorEndpoint) {
        match direction {
            Direction::ShareToTransfer => (&self.share, &self.transfer),
            Direction::TransferToShare => (&self.transfer, &self.share),
        }
    }

    /// Runs every pass in order and reports how the run ended
    pub async fn execute(&self) -> RunOutcome {
        let total = self.passes.len();
        info!(run_id = %self.run_id, passes = total, "Mirror run starting");

        for (index, flags) in self.passes.iter().enumerate() {
            if self.cancel.is_cancelled() {
                return self.cancelled_at(index);
            }

            let (source, destination) = self.endpoints(flags.direction);
            self.log.info(format!(
                "Mirroring {} (pass {}/{})",
                flags.direction,
                index + 1,
                total
            ));

            let result = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return self.cancelled_at(index),
                result = self.executor.run(source, destination, flags) => result,
            };

            match result {
                Ok(outcome) if outcome.is_success() => {
                    debug!(
                        run_id = %self.run_id,
                        direction = %flags.direction,
                        output_len = outcome.diagnostics.len(),
                        "Mirror pass succeeded"
                    );
                }
                Ok(outcome) => {
                    let status = outcome
                        .exit_code
                        .map(|code| format!("exit status {code}"))
                        .unwrap_or_else(|| "termination by signal".to_string());
                    return RunOutcome::Failed(JobExecutionError::new(
                        format!("mirror {} ended with {status}", flags.direction),
                        outcome.diagnostics,
                    ));
                }
                Err(e) => {
                    return RunOutcome::Failed(JobExecutionError::new(
                        format!("mirror {} could not run: {e:#}", flags.direction),
                        String::new(),
                    ));
                }
            }
        }

        if self.cancel.is_cancelled() {
            return self.cancelled_at(total);
        }
        RunOutcome::Completed
    }

    fn cancelled_at(&self, completed_passes: usize) -> RunOutcome {
        warn!(
            run_id = %self.run_id,
            completed_passes,
            "Cancellation observed; mirror run unwinding"
        );
        RunOutcome::Cancelled
    }
}
