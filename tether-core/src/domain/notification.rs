//! Pushed notification types
//!
//! Messages published by the platform on the notification channel whenever
//! a run changes state. They are read-only from the client's point of view.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::run::{JobId, JobRunIdentity, RunId, RunState};

/// Payload of a run state change notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationMessage {
    pub object: NotifiedObject,
    pub run: NotifiedRun,
}

/// The job the notification is about
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotifiedObject {
    pub id: JobId,
}

/// The run the notification is about, with its new state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotifiedRun {
    pub id: RunId,
    pub state: RunState,
}

impl NotificationMessage {
    pub fn new(job_id: JobId, run_id: RunId, state: RunState) -> Self {
        Self {
            object: NotifiedObject { id: job_id },
            run: NotifiedRun { id: run_id, state },
        }
    }

    /// The job/run pair this message refers to
    pub fn identity(&self) -> JobRunIdentity {
        JobRunIdentity::new(self.object.id, self.run.id)
    }
}

/// A notification as handed to listeners by a transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub message: NotificationMessage,
    pub published_at: Option<DateTime<Utc>>,
}

impl From<NotificationMessage> for Delivery {
    fn from(message: NotificationMessage) -> Self {
        Self {
            message,
            published_at: None,
        }
    }
}
