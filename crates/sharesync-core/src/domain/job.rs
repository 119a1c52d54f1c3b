//! SyncJob domain entity
//!
//! There is exactly one [`SyncJob`] per orchestrator. It is created Idle and
//! reused for every run; the transition methods here encode the
//! single-flight rule, while the controller in `sharesync-sync` makes each
//! transition atomic with respect to concurrent callers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::{JobExecutionError, OrchestrationError};
use super::options::SyncOptions;

/// Identifier of a single run of the sync job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(Uuid);

impl RunId {
    /// Generates a new random run ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle state of the sync job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    /// No run in progress and no result pending
    #[default]
    Idle,
    /// A worker is executing the mirror passes
    Running,
    /// Stop was requested; the worker has not unwound yet
    Stopping,
    /// The last run completed every pass
    Succeeded,
    /// The last run failed; see `last_error`
    Failed,
}

impl JobState {
    /// Returns true while a worker owns the job
    pub fn is_active(&self) -> bool {
        matches!(self, JobState::Running | JobState::Stopping)
    }

    /// Returns true for the resting states a finished run leaves behind
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Succeeded | JobState::Failed)
    }
}

impl std::fmt::Display for JobState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            JobState::Idle => "idle",
            JobState::Running => "running",
            JobState::Stopping => "stopping",
            JobState::Succeeded => "succeeded",
            JobState::Failed => "failed",
        };
        write!(f, "{}", s)
    }
}

/// What a stop request did to the job
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    /// The job was idle; nothing to stop
    NothingToStop,
    /// A stop was already pending
    AlreadyStopping,
    /// The running job moved to Stopping; its worker must be signalled
    Stopping(RunId),
    /// A finished job was reset to Idle
    Reset(JobState),
}

/// Read-only snapshot of the job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobStatus {
    pub run_id: Option<RunId>,
    pub state: JobState,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
    pub options: SyncOptions,
    pub last_error: Option<JobExecutionError>,
}

/// The single, reusable sync job
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncJob {
    run_id: Option<RunId>,
    state: JobState,
    started_at: Option<DateTime<Utc>>,
    ended_at: Option<DateTime<Utc>>,
    options: SyncOptions,
    last_error: Option<JobExecutionError>,
}

impl SyncJob {
    /// Creates an idle job carrying the default options
    pub fn new(options: SyncOptions) -> Self {
        Self {
            run_id: None,
            state: JobState::Idle,
            started_at: None,
            ended_at: None,
            options,
            last_error: None,
        }
    }

    pub fn state(&self) -> JobState {
        self.state
    }

    pub fn run_id(&self) -> Option<RunId> {
        self.run_id
    }

    pub fn options(&self) -> &SyncOptions {
        &self.options
    }

    pub fn last_error(&self) -> Option<&JobExecutionError> {
        self.last_error.as_ref()
    }

    /// Moves the job to Running for a new run
    ///
    /// Fails with [`OrchestrationError::AlreadyRunning`] while another run
    /// owns the job. Clears the previous run's end time and error.
    pub fn begin(&mut self, options: SyncOptions) -> Result<RunId, OrchestrationError> {
        if self.state.is_active() {
            return Err(OrchestrationError::AlreadyRunning);
        }
        let run_id = RunId::new();
        self.run_id = Some(run_id);
        self.state = JobState::Running;
        self.started_at = Some(Utc::now());
        self.ended_at = None;
        self.options = options;
        self.last_error = None;
        Ok(run_id)
    }

    /// Applies a stop request
    pub fn request_stop(&mut self) -> StopOutcome {
        match self.state {
            JobState::Idle => StopOutcome::NothingToStop,
            JobState::Stopping => StopOutcome::AlreadyStopping,
            JobState::Running => {
                self.state = JobState::Stopping;
                // begin() always assigns a run ID before entering Running
                match self.run_id {
                    Some(run_id) => StopOutcome::Stopping(run_id),
                    None => StopOutcome::AlreadyStopping,
                }
            }
            previous @ (JobState::Succeeded | JobState::Failed) => {
                self.state = JobState::Idle;
                StopOutcome::Reset(previous)
            }
        }
    }

    /// Records the outcome of a run and leaves the active states
    ///
    /// A pending stop takes precedence over the outcome: the job returns
    /// to Idle. Outcomes for a run other than the current one are ignored
    /// and `None` is returned; otherwise the resulting state is returned.
    pub fn finish(
        &mut self,
        run_id: RunId,
        outcome: Result<(), JobExecutionError>,
    ) -> Option<JobState> {
        if self.run_id != Some(run_id) || !self.state.is_active() {
            return None;
        }
        self.ended_at = Some(Utc::now());
        self.state = match (self.state, outcome) {
            (JobState::Stopping, _) => JobState::Idle,
            (_, Ok(())) => JobState::Succeeded,
            (_, Err(err)) => {
                self.last_error = Some(err);
                JobState::Failed
            }
        };
        Some(self.state)
    }

    /// Records that the worker observed cancellation and unwound
    pub fn finish_cancelled(&mut self, run_id: RunId) -> Option<JobState> {
        if self.run_id != Some(run_id) || !self.state.is_active() {
            return None;
        }
        self.ended_at = Some(Utc::now());
        self.state = JobState::Idle;
        Some(self.state)
    }

    /// Returns a snapshot of the job
    pub fn status(&self) -> JobStatus {
        JobStatus {
            run_id: self.run_id,
            state: self.state,
            started_at: self.started_at,
            ended_at: self.ended_at,
            options: self.options,
            last_error: self.last_error.clone(),
        }
    }
}

impl Default for SyncJob {
    fn default() -> Self {
        Self::new(SyncOptions::default())
    }
}
