//! Job run domain types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type JobId = u64;
pub type RunId = u64;

/// Identifies one execution attempt of a job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobRunIdentity {
    pub job_id: JobId,
    pub run_id: RunId,
}

impl JobRunIdentity {
    pub fn new(job_id: JobId, run_id: RunId) -> Self {
        Self { job_id, run_id }
    }
}

impl std::fmt::Display for JobRunIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "job {} run {}", self.job_id, self.run_id)
    }
}

/// Run execution state as reported by the platform
///
/// The platform may introduce states this client does not know about;
/// those are kept verbatim in `Other` and treated as non-terminal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RunState {
    Queued,
    Running,
    Succeeded,
    Failed,
    Cancelled,
    Other(String),
}

impl RunState {
    /// Whether no further transition can occur from this state
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RunState::Succeeded | RunState::Failed | RunState::Cancelled
        )
    }

    pub fn as_str(&self) -> &str {
        match self {
            RunState::Queued => "queued",
            RunState::Running => "running",
            RunState::Succeeded => "succeeded",
            RunState::Failed => "failed",
            RunState::Cancelled => "cancelled",
            RunState::Other(state) => state,
        }
    }
}

impl From<&str> for RunState {
    fn from(state: &str) -> Self {
        match state {
            "queued" => RunState::Queued,
            "running" => RunState::Running,
            "succeeded" | "success" => RunState::Succeeded,
            "failed" => RunState::Failed,
            "cancelled" => RunState::Cancelled,
            other => RunState::Other(other.to_string()),
        }
    }
}

impl From<String> for RunState {
    fn from(state: String) -> Self {
        RunState::from(state.as_str())
    }
}

impl From<RunState> for String {
    fn from(state: RunState) -> Self {
        state.as_str().to_string()
    }
}

impl std::fmt::Display for RunState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status of a job run, as returned by the platform API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunStatus {
    pub id: RunId,
    pub state: RunState,
    /// Failure detail reported by the platform
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub finished_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_cancel_requested: bool,
}

impl RunStatus {
    /// Creates a bare status with only an id and a state
    pub fn new(id: RunId, state: RunState) -> Self {
        Self {
            id,
            state,
            error: None,
            started_at: None,
            finished_at: None,
            is_cancel_requested: false,
        }
    }

    /// Attaches a failure detail
    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }
}
