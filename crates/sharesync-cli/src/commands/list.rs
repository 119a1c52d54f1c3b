//! List command - connect one endpoint and list its entries

use anyhow::{Context, Result};
use clap::Args;
use sharesync_core::{config::Config, domain::SlotKind};
use tracing::warn;

use super::{build_orchestrator, endpoint_for};
use crate::output::{get_formatter, human_size, OutputFormat};

#[derive(Debug, Args)]
pub struct ListCommand {
    /// Endpoint to list: share or transfer
    pub slot: SlotKind,
}

impl ListCommand {
    pub async fn execute(&self, config: &Config, format: OutputFormat) -> Result<()> {
        let formatter = get_formatter(format);
        let kind = self.slot;
        let endpoint = endpoint_for(config, kind)?;
        let orchestrator = build_orchestrator(config);

        orchestrator
            .connect(kind, endpoint)
            .await
            .with_context(|| format!("Failed to connect {kind}"))?;
        let listing = orchestrator.list_entries(kind).await;
        if let Err(e) = orchestrator.disconnect(kind).await {
            warn!(slot = %kind, error = %e, "Disconnect after listing failed");
        }
        let entries = listing.with_context(|| format!("Failed to list {kind}"))?;

        if matches!(format, OutputFormat::Json) {
            formatter.print_json(&serde_json::json!({ "slot": kind, "entries": entries }));
            return Ok(());
        }

        formatter.success(&format!("{} entries on {kind}", entries.len()));
        for entry in &entries {
            let size = if entry.is_directory {
                "<dir>".to_string()
            } else {
                human_size(entry.size)
            };
            let modified = entry
                .modified_at
                .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_default();
            let suffix = if entry.is_directory { "/" } else { "" };
            formatter.info(&format!("{size:>10}  {modified:16}  {}{suffix}", entry.name));
        }
        Ok(())
    }
}
