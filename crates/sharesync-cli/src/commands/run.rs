//! Run command - connect both endpoints and sync them once
//!
//! Provides the `sharesync run` CLI command which:
//! 1. Connects the share and the transfer endpoint from the config file
//! 2. Starts the sync job and waits for it to leave the running states
//! 3. On Ctrl-C, requests a stop and waits for the worker to unwind
//! 4. Disconnects both endpoints and prints the final status and log tail

use anyhow::{bail, Result};
use clap::Args;
use sharesync_core::{
    config::Config,
    domain::{JobState, SlotKind},
};
use sharesync_sync::Orchestrator;
use tracing::{info, warn};

use super::{build_orchestrator, endpoint_for, SyncFlags};
use crate::output::{get_formatter, print_log_entries, OutputFormat, OutputFormatter};

#[derive(Debug, Args)]
pub struct RunCommand {
    #[command(flatten)]
    pub flags: SyncFlags,

    /// Number of log entries to print after the run
    #[arg(long)]
    pub tail: Option<usize>,
}

impl RunCommand {
    pub async fn execute(&self, config: &Config, format: OutputFormat) -> Result<()> {
        let formatter = get_formatter(format);

        let errors = config.validate();
        if !errors.is_empty() {
            for error in &errors {
                formatter.error(&error.to_string());
            }
            bail!("Configuration has {} error(s)", errors.len());
        }

        let share = endpoint_for(config, SlotKind::Share)?;
        let transfer = endpoint_for(config, SlotKind::Transfer)?;
        let orchestrator = build_orchestrator(config);

        let connected = match orchestrator.connect(SlotKind::Share, share).await {
            Ok(()) => orchestrator.connect(SlotKind::Transfer, transfer).await,
            Err(e) => Err(e),
        };
        if let Err(e) = connected {
            formatter.error(&e.to_string());
            disconnect_all(&orchestrator).await;
            self.report(&orchestrator, format, &*formatter);
            bail!("Could not connect both endpoints");
        }

        let run_id = match orchestrator.start(&self.flags.to_patch()) {
            Ok(run_id) => run_id,
            Err(e) => {
                disconnect_all(&orchestrator).await;
                bail!("Could not start sync: {e}");
            }
        };
        info!(run_id = %run_id, "Sync started; waiting for completion");
        formatter.info("Sync running; press Ctrl-C to stop");

        let controller = orchestrator.controller();
        let status = tokio::select! {
            status = controller.wait_until_inactive() => status,
            _ = tokio::signal::ctrl_c() => {
                formatter.warn("Interrupted; stopping sync");
                orchestrator.stop();
                controller.wait_until_inactive().await
            }
        };

        disconnect_all(&orchestrator).await;
        self.report(&orchestrator, format, &*formatter);

        match status.state {
            JobState::Failed => bail!(
                "{}",
                status
                    .last_error
                    .map(|e| e.to_string())
                    .unwrap_or_else(|| "Sync failed".to_string())
            ),
            _ => Ok(()),
        }
    }

    fn report(&self, orchestrator: &Orchestrator, format: OutputFormat, formatter: &dyn OutputFormatter) {
        let reporter = orchestrator.reporter();
        let snapshot = match self.tail {
            Some(n) => reporter.snapshot_with_tail(n),
            None => reporter.snapshot(),
        };

        if matches!(format, OutputFormat::Json) {
            match serde_json::to_value(&snapshot) {
                Ok(json) => formatter.print_json(&json),
                Err(e) => formatter.error(&format!("Failed to encode status: {e}")),
            }
            return;
        }

        let job = &snapshot.job;
        formatter.info("");
        match job.state {
            JobState::Succeeded => formatter.success("Sync succeeded"),
            JobState::Failed => formatter.error("Sync failed"),
            state => formatter.warn(&format!("Sync ended {state}")),
        }
        if let Some(started) = job.started_at {
            formatter.info(&format!("Started: {}", started.format("%Y-%m-%d %H:%M:%S UTC")));
        }
        if let Some(ended) = job.ended_at {
            formatter.info(&format!("Ended:   {}", ended.format("%Y-%m-%d %H:%M:%S UTC")));
        }
        if let Some(error) = &job.last_error {
            formatter.info(&format!("Cause:   {}", error.cause));
        }

        formatter.info("");
        formatter.info("Log:");
        print_log_entries(formatter, &snapshot.log_tail);
    }
}

/// Disconnects every connected slot; failures are only logged
async fn disconnect_all(orchestrator: &Orchestrator) {
    for kind in SlotKind::ALL {
        if !orchestrator.registry().is_connected(kind) {
            continue;
        }
        if let Err(e) = orchestrator.disconnect(kind).await {
            warn!(slot = %kind, error = %e, "Disconnect failed");
        }
    }
}
