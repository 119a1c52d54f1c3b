//! Probe command - report which required system tools are installed

use anyhow::Result;
use clap::Args;
use sharesync_core::{config::Config, ports::requirement_report};
use sharesync_exec::PathCapabilityProbe;
use tracing::debug;

use crate::output::{get_formatter, OutputFormat};

#[derive(Debug, Args)]
pub struct ProbeCommand {}

impl ProbeCommand {
    pub async fn execute(&self, config: &Config, format: OutputFormat) -> Result<()> {
        let formatter = get_formatter(format);
        let report = requirement_report(&PathCapabilityProbe::new(), &config.mirror.requirements);
        debug!(tools = report.len(), "Probed system requirements");

        if matches!(format, OutputFormat::Json) {
            formatter.print_json(&serde_json::json!({ "system_requirements": report }));
            return Ok(());
        }

        formatter.info("System requirements:");
        for (tool, present) in &report {
            if *present {
                formatter.success(tool);
            } else {
                formatter.warn(&format!("{tool} not found"));
            }
        }
        Ok(())
    }
}
