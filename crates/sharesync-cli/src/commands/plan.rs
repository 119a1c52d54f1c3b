//! Plan command - show the mirror passes a run would perform
//!
//! Resolves the sync options and prints one lftp script per pass. Nothing
//! is connected or executed, and passwords never appear in the scripts.

use anyhow::{Context, Result};
use clap::Args;
use sharesync_core::{
    config::Config,
    domain::{Direction, SlotKind},
    ports::MirrorEndpoint,
};
use sharesync_exec::LftpMirrorExecutor;

use super::{endpoint_for, SyncFlags};
use crate::output::{get_formatter, OutputFormat};

#[derive(Debug, Args)]
pub struct PlanCommand {
    #[command(flatten)]
    pub flags: SyncFlags,
}

impl PlanCommand {
    pub async fn execute(&self, config: &Config, format: OutputFormat) -> Result<()> {
        let formatter = get_formatter(format);

        let share = MirrorEndpoint {
            kind: SlotKind::Share,
            config: endpoint_for(config, SlotKind::Share)?,
        };
        let transfer = MirrorEndpoint {
            kind: SlotKind::Transfer,
            config: endpoint_for(config, SlotKind::Transfer)?,
        };
        let executor =
            LftpMirrorExecutor::new(config.mirror.lftp_binary.clone(), config.mirror.remote_root.clone());
        let options = config.sync.merged(&self.flags.to_patch());

        let mut passes = Vec::new();
        for flags in options.passes() {
            let (source, destination) = match flags.direction {
                Direction::ShareToTransfer => (&share, &transfer),
                Direction::TransferToShare => (&transfer, &share),
            };
            let (script, _) = executor
                .script_for(source, destination, &flags)
                .with_context(|| format!("Cannot plan pass {}", flags.direction))?;
            passes.push((flags.direction, script));
        }

        if matches!(format, OutputFormat::Json) {
            let json = serde_json::json!({
                "options": options,
                "passes": passes
                    .iter()
                    .map(|(direction, script)| serde_json::json!({
                        "direction": direction,
                        "script": script.lines(),
                    }))
                    .collect::<Vec<_>>(),
            });
            formatter.print_json(&json);
            return Ok(());
        }

        formatter.success(&format!("{} mirror pass(es) planned", passes.len()));
        for (index, (direction, script)) in passes.iter().enumerate() {
            formatter.info("");
            formatter.info(&format!("Pass {}: {direction}", index + 1));
            for line in script.lines() {
                formatter.info(&format!("  {line}"));
            }
        }
        Ok(())
    }
}
