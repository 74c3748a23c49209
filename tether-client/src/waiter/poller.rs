//! Run status poller
//!
//! Polls the status source on an interval until the waiter finishes. While a
//! notification subscription is live the poller backs off to a slower
//! interval, since a pushed message will normally wake the waiter first.

use std::sync::{Arc, Weak};

use tether_core::domain::run::JobRunIdentity;
use tokio::sync::watch;
use tokio::time::{self, Duration};
use tracing::{debug, info, warn};

use super::{Outcome, ResultWaiter, WaiterState};
use crate::config::WaitConfig;

/// Polls the platform for the status of one run
pub struct RunPoller {
    waiter: Weak<ResultWaiter>,
    identity: JobRunIdentity,
    finished: watch::Receiver<Option<Outcome>>,
    config: WaitConfig,
}

impl RunPoller {
    /// Creates a poller for `waiter`
    ///
    /// The poller does not keep the waiter alive; dropping every handle to
    /// the waiter stops it.
    pub fn new(waiter: &Arc<ResultWaiter>, config: WaitConfig) -> Self {
        Self {
            waiter: Arc::downgrade(waiter),
            identity: waiter.identity(),
            finished: waiter.outcome_receiver(),
            config,
        }
    }

    /// Runs the polling loop on a background task
    pub fn spawn(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// Polls until the waiter finishes or is dropped
    pub async fn run(mut self) {
        info!(
            "Polling {} (interval: {:?}, while subscribed: {:?})",
            self.identity, self.config.poll_interval, self.config.subscribed_poll_interval
        );

        let mut consecutive_errors = 0u32;

        loop {
            let Some(waiter) = self.waiter.upgrade() else {
                debug!("Waiter for {} dropped", self.identity);
                break;
            };
            if waiter.is_finished() {
                break;
            }

            match waiter.refresh().await {
                Ok(WaiterState::Finished) => break,
                Ok(WaiterState::Pending) => consecutive_errors = 0,
                Err(e) => {
                    consecutive_errors += 1;
                    warn!(
                        "Failed to poll {} ({} consecutive failure(s)): {}",
                        self.identity, consecutive_errors, e
                    );

                    if self
                        .config
                        .max_poll_errors
                        .is_some_and(|max| consecutive_errors >= max)
                    {
                        waiter.fail_polling(e.to_string());
                        break;
                    }
                }
            }

            let delay = self.next_delay(&waiter);
            drop(waiter);

            tokio::select! {
                _ = time::sleep(delay) => {}
                // Fires on resolution, or once the waiter is dropped
                _ = self.finished.changed() => {}
            }
        }

        debug!("Stopped polling {}", self.identity);
    }

    fn next_delay(&self, waiter: &ResultWaiter) -> Duration {
        if waiter.is_subscribed() {
            self.config.subscribed_poll_interval
        } else {
            self.config.poll_interval
        }
    }
}
