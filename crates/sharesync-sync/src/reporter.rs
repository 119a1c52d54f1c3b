//! StatusReporter - read-only views over the orchestration state
//!
//! Reads the registry, the controller and the log buffer without holding
//! any of their locks across another, so a snapshot never blocks a running
//! job. The fields of one snapshot are read one after another and may
//! straddle a concurrent transition.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use sharesync_audit::LogBuffer;
use sharesync_core::{
    domain::{JobStatus, LogEntry, SlotKind},
    ports::{requirement_report, ICapabilityProbe},
};

use crate::controller::SyncJobController;
use crate::registry::{ConnectionRegistry, SlotView};

/// Full status of the orchestrator at one moment
#[derive(Debug, Clone, Serialize)]
pub struct StatusSnapshot {
    pub share: SlotView,
    pub transfer: SlotView,
    pub job: JobStatus,
    pub log_tail: Vec<LogEntry>,
    pub system_requirements: BTreeMap<String, bool>,
    pub generated_at: DateTime<Utc>,
}

/// Connection state of both slots plus tool availability
#[derive(Debug, Clone, Serialize)]
pub struct ConnectionReport {
    pub share: SlotView,
    pub transfer: SlotView,
    pub system_requirements: BTreeMap<String, bool>,
}

pub struct StatusReporter {
    registry: Arc<ConnectionRegistry>,
    controller: SyncJobController,
    log: Arc<LogBuffer>,
    probe: Arc<dyn ICapabilityProbe>,
    requirements: Vec<String>,
    tail_default: usize,
}

impl StatusReporter {
    pub fn new(
        registry: Arc<ConnectionRegistry>,
        controller: SyncJobController,
        log: Arc<LogBuffer>,
        probe: Arc<dyn ICapabilityProbe>,
        requirements: Vec<String>,
        tail_default: usize,
    ) -> Self {
        Self {
            registry,
            controller,
            log,
            probe,
            requirements,
            tail_default,
        }
    }

    /// Snapshot with the default log tail length
    pub fn snapshot(&self) -> StatusSnapshot {
        self.snapshot_with_tail(self.tail_default)
    }

    /// Snapshot including the most recent `tail` log entries
    pub fn snapshot_with_tail(&self, tail: usize) -> StatusSnapshot {
        StatusSnapshot {
            share: self.registry.view(SlotKind::Share),
            transfer: self.registry.view(SlotKind::Transfer),
            job: self.controller.status(),
            log_tail: self.log.tail(tail),
            system_requirements: self.system_requirements(),
            generated_at: Utc::now(),
        }
    }

    pub fn connection_report(&self) -> ConnectionReport {
        ConnectionReport {
            share: self.registry.view(SlotKind::Share),
            transfer: self.registry.view(SlotKind::Transfer),
            system_requirements: self.system_requirements(),
        }
    }

    /// Most recent log entries; `None` uses the configured default
    pub fn log_tail(&self, n: Option<usize>) -> Vec<LogEntry> {
        self.log.tail(n.unwrap_or(self.tail_default))
    }

    pub fn system_requirements(&self) -> BTreeMap<String, bool> {
        requirement_report(self.probe.as_ref(), &self.requirements)
    }
}
