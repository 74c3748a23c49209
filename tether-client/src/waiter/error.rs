//! Outcomes a waiter can surface instead of a finished run

use tether_core::domain::run::{JobId, JobRunIdentity, RunId};
use thiserror::Error;

/// A run that finished in the `failed` state
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Job {job_id} run {run_id} failed: {detail}")]
pub struct JobFailure {
    pub job_id: JobId,
    pub run_id: RunId,
    /// Failure detail reported by the platform
    pub detail: String,
}

impl JobFailure {
    pub fn new(identity: JobRunIdentity, detail: impl Into<String>) -> Self {
        Self {
            job_id: identity.job_id,
            run_id: identity.run_id,
            detail: detail.into(),
        }
    }

    pub fn identity(&self) -> JobRunIdentity {
        JobRunIdentity::new(self.job_id, self.run_id)
    }
}

/// Errors returned when asking a waiter for its result
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WaitError {
    /// The run finished and failed
    #[error(transparent)]
    Failed(#[from] JobFailure),

    /// The run was cancelled before finishing
    #[error("Job {job_id} run {run_id} was cancelled")]
    Cancelled { job_id: JobId, run_id: RunId },

    /// Polling for the run status kept failing
    #[error("Gave up polling {identity}: {message}")]
    Polling {
        identity: JobRunIdentity,
        message: String,
    },

    /// The waiter went away before the run finished
    #[error("Stopped waiting for {0}")]
    Abandoned(JobRunIdentity),
}

impl WaitError {
    /// The job/run pair this error is about
    pub fn identity(&self) -> JobRunIdentity {
        match self {
            WaitError::Failed(failure) => failure.identity(),
            WaitError::Cancelled { job_id, run_id } => JobRunIdentity::new(*job_id, *run_id),
            WaitError::Polling { identity, .. } => *identity,
            WaitError::Abandoned(identity) => *identity,
        }
    }
}
