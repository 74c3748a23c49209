//! Matching of pushed notifications against a single run

use tether_core::domain::notification::NotificationMessage;
use tether_core::domain::run::JobRunIdentity;

/// Decides whether a notification announces that a given run has finished
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageFilter {
    identity: JobRunIdentity,
}

impl MessageFilter {
    pub fn new(identity: JobRunIdentity) -> Self {
        Self { identity }
    }

    pub fn identity(&self) -> JobRunIdentity {
        self.identity
    }

    /// True iff the message is about this job and run and its state is terminal
    pub fn matches(&self, message: &NotificationMessage) -> bool {
        message.object.id == self.identity.job_id
            && message.run.id == self.identity.run_id
            && message.run.state.is_terminal()
    }
}
