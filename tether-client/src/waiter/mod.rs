//! Waiting on the result of a job run
//!
//! A [`ResultWaiter`] resolves once its run reaches a terminal state. The
//! terminal state can be observed in two ways:
//! - a pushed notification, matched by a [`MessageFilter`] and forwarded by
//!   a [`NotificationListener`], which makes the waiter fetch the final status
//! - a [`RunPoller`] asking the API for the status on an interval
//!
//! Whichever path observes a terminal state first wins; anything arriving
//! afterwards is ignored.

mod error;
mod filter;
mod listener;
mod poller;
#[cfg(test)]
pub(crate) mod testing;

pub use error::{JobFailure, WaitError};
pub use filter::MessageFilter;
pub use listener::NotificationListener;
pub use poller::RunPoller;

use std::sync::{Arc, Mutex, PoisonError, Weak};

use async_trait::async_trait;
use tether_core::domain::run::{JobRunIdentity, RunState, RunStatus};
use tether_core::dto::channel::ChannelConfig;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::transport::{NotificationTransport, Subscription};

/// Source of run status, normally the platform API
#[async_trait]
pub trait StatusSource: Send + Sync {
    /// Fetch the current status of a run
    async fn run_status(&self, run: JobRunIdentity) -> Result<RunStatus>;
}

/// Final outcome of a run as seen by a waiter
pub type Outcome = std::result::Result<RunStatus, WaitError>;

/// Resolution state of a waiter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaiterState {
    Pending,
    Finished,
}

/// Handle on the eventual outcome of one job run
pub struct ResultWaiter {
    identity: JobRunIdentity,
    source: Arc<dyn StatusSource>,
    /// `None` while pending; written exactly once
    outcome: watch::Sender<Option<Outcome>>,
    subscription: Mutex<Option<Box<dyn Subscription>>>,
}

impl ResultWaiter {
    /// Creates a pending waiter that fetches status from `source`
    pub fn new(identity: JobRunIdentity, source: Arc<dyn StatusSource>) -> Arc<Self> {
        let (outcome, _) = watch::channel(None);
        Arc::new(Self {
            identity,
            source,
            outcome,
            subscription: Mutex::new(None),
        })
    }

    pub fn identity(&self) -> JobRunIdentity {
        self.identity
    }

    pub fn state(&self) -> WaiterState {
        if self.outcome.borrow().is_some() {
            WaiterState::Finished
        } else {
            WaiterState::Pending
        }
    }

    pub fn is_finished(&self) -> bool {
        self.state() == WaiterState::Finished
    }

    /// Whether a notification subscription is currently active
    pub fn is_subscribed(&self) -> bool {
        self.subscription
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|subscription| subscription.is_active())
    }

    /// The outcome, if the run already finished
    pub fn try_result(&self) -> Option<Outcome> {
        self.outcome.borrow().clone()
    }

    /// Block the current thread until the run finishes
    ///
    /// Must not be called from inside an async task; use [`ResultWaiter::result`]
    /// there instead.
    pub fn wait_for_result(&self) -> Outcome {
        futures::executor::block_on(self.result())
    }

    /// Wait until the run finishes
    ///
    /// Returns the final status of a successful run, or a [`WaitError`]
    /// describing which run failed and why.
    pub async fn result(&self) -> Outcome {
        let mut finished = self.outcome.subscribe();
        let outcome = finished
            .wait_for(Option::is_some)
            .await
            .ok()
            .and_then(|outcome| outcome.clone());

        outcome.unwrap_or(Err(WaitError::Abandoned(self.identity)))
    }

    /// Record a run status, fetching it from the source when none is given
    ///
    /// Any active subscription is torn down once a status is known, whether
    /// or not that status is terminal. The waiter finishes only when the
    /// status is terminal. A failed fetch changes nothing.
    pub(crate) async fn set_api_result(&self, explicit: Option<RunStatus>) -> Result<WaiterState> {
        let status = match explicit {
            Some(status) => status,
            None => self.source.run_status(self.identity).await?,
        };

        self.unsubscribe();
        self.apply(status);
        Ok(self.state())
    }

    /// Fetch the current status and record it only if it is terminal
    ///
    /// Unlike [`ResultWaiter::set_api_result`] this leaves the subscription
    /// alone while the run is still going.
    pub(crate) async fn refresh(&self) -> Result<WaiterState> {
        let status = self.source.run_status(self.identity).await?;

        if status.state.is_terminal() {
            return self.set_api_result(Some(status)).await;
        }

        debug!("{} is still {}", self.identity, status.state);
        Ok(self.state())
    }

    /// Resolve the waiter with a polling failure
    pub(crate) fn fail_polling(&self, message: impl Into<String>) -> bool {
        self.finish(Err(WaitError::Polling {
            identity: self.identity,
            message: message.into(),
        }))
    }

    fn apply(&self, status: RunStatus) {
        if !status.state.is_terminal() {
            debug!("{} is {}, not finished yet", self.identity, status.state);
            return;
        }

        let outcome = match status.state {
            RunState::Failed => {
                let detail = status
                    .error
                    .unwrap_or_else(|| "no error detail reported".to_string());
                Err(JobFailure::new(self.identity, detail).into())
            }
            RunState::Cancelled => Err(WaitError::Cancelled {
                job_id: self.identity.job_id,
                run_id: self.identity.run_id,
            }),
            _ => Ok(status),
        };

        self.finish(outcome);
    }

    /// Apply the terminal transition; returns false if already finished
    fn finish(&self, outcome: Outcome) -> bool {
        let description = match &outcome {
            Ok(status) => status.state.to_string(),
            Err(e) => e.to_string(),
        };

        let applied = self.outcome.send_if_modified(|current| {
            if current.is_some() {
                return false;
            }
            *current = Some(outcome);
            true
        });

        if applied {
            info!("{} finished: {}", self.identity, description);
            // A subscription stored concurrently with resolution is dropped here
            self.unsubscribe();
        } else {
            debug!("{} already finished, ignoring late result", self.identity);
        }

        applied
    }

    /// Tear down the active subscription, if any
    pub(crate) fn unsubscribe(&self) {
        let subscription = self
            .subscription
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        if let Some(subscription) = subscription {
            debug!("Unsubscribing from notifications for {}", self.identity);
            subscription.unsubscribe_all();
        }
    }

    /// Listen for notifications announcing that this run finished
    ///
    /// Returns whether a subscription is active afterwards. Transport
    /// failures are logged and swallowed; polling still resolves the waiter.
    pub async fn subscribe(
        self: &Arc<Self>,
        transport: &dyn NotificationTransport,
        channels: &ChannelConfig,
    ) -> bool {
        let Ok(runtime) = Handle::try_current() else {
            warn!(
                "No tokio runtime, not subscribing to notifications for {}",
                self.identity
            );
            return false;
        };

        let listener = Arc::new(NotificationListener::for_filter(
            MessageFilter::new(self.identity),
            Self::resolver(Arc::downgrade(self), runtime),
        ));

        let subscription = match transport.subscribe(channels, listener).await {
            Ok(subscription) => subscription,
            Err(e) => {
                warn!(
                    "Could not subscribe to notifications for {}, falling back to polling: {}",
                    self.identity, e
                );
                return false;
            }
        };

        let previous = self
            .subscription
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(subscription);
        if let Some(previous) = previous {
            previous.unsubscribe_all();
        }

        if self.is_finished() {
            self.unsubscribe();
            return false;
        }

        info!("Subscribed to notifications for {}", self.identity);
        true
    }

    /// Callback run by the listener on a matching notification
    fn resolver(waiter: Weak<Self>, runtime: Handle) -> impl Fn() + Send + Sync + 'static {
        move || {
            let Some(waiter) = waiter.upgrade() else {
                return;
            };
            if waiter.is_finished() {
                return;
            }

            runtime.spawn(async move {
                if let Err(e) = waiter.set_api_result(None).await {
                    warn!(
                        "Failed to fetch status of {} after notification: {}",
                        waiter.identity, e
                    );
                }
            });
        }
    }

    pub(crate) fn outcome_receiver(&self) -> watch::Receiver<Option<Outcome>> {
        self.outcome.subscribe()
    }
}

impl std::fmt::Debug for ResultWaiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResultWaiter")
            .field("identity", &self.identity)
            .field("state", &self.state())
            .field("subscribed", &self.is_subscribed())
            .finish()
    }
}
