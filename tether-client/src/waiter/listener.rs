//! Adapter between a notification transport and a waiter
//!
//! Transports call [`NotificationListener::message`] from whatever task or
//! thread they deliver on. The listener holds no state of its own, so it can
//! be invoked concurrently and after its subscription was torn down.

use tether_core::domain::notification::{Delivery, NotificationMessage};
use tracing::trace;

use super::filter::MessageFilter;

type Matcher = Box<dyn Fn(&NotificationMessage) -> bool + Send + Sync>;
type Callback = Box<dyn Fn() + Send + Sync>;

/// Invokes a callback for every delivered message accepted by a predicate
pub struct NotificationListener {
    matcher: Matcher,
    callback: Callback,
}

impl NotificationListener {
    pub fn new<M, C>(matcher: M, callback: C) -> Self
    where
        M: Fn(&NotificationMessage) -> bool + Send + Sync + 'static,
        C: Fn() + Send + Sync + 'static,
    {
        Self {
            matcher: Box::new(matcher),
            callback: Box::new(callback),
        }
    }

    /// Listener that fires when `filter` accepts a message
    pub fn for_filter<C>(filter: MessageFilter, callback: C) -> Self
    where
        C: Fn() + Send + Sync + 'static,
    {
        Self::new(move |message| filter.matches(message), callback)
    }

    /// Handle one delivered message
    ///
    /// Returns whether the message matched and the callback was invoked.
    pub fn message(&self, channel: &str, delivery: &Delivery) -> bool {
        if !(self.matcher)(&delivery.message) {
            trace!(
                "Ignoring notification on {} for {}",
                channel,
                delivery.message.identity()
            );
            return false;
        }

        (self.callback)();
        true
    }
}

impl std::fmt::Debug for NotificationListener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationListener").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use tether_core::domain::run::{JobRunIdentity, RunState};

    fn delivery(job_id: u64, run_id: u64, state: RunState) -> Delivery {
        NotificationMessage::new(job_id, run_id, state).into()
    }

    #[test]
    fn test_calls_callback_when_message_matches() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let calls = Arc::new(AtomicUsize::new(0));

        let listener = {
            let seen = Arc::clone(&seen);
            let calls = Arc::clone(&calls);
            NotificationListener::new(
                move |message: &NotificationMessage| {
                    seen.lock().unwrap().push(message.clone());
                    true
                },
                move || {
                    calls.fetch_add(1, Ordering::SeqCst);
                },
            )
        };

        let delivered = delivery(1, 2, RunState::Running);
        assert!(listener.message("run:1", &delivered));

        assert_eq!(*seen.lock().unwrap(), vec![delivered.message]);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_does_not_call_callback() {
        let calls = Arc::new(AtomicUsize::new(0));
        let listener = {
            let calls = Arc::clone(&calls);
            NotificationListener::new(
                |_: &NotificationMessage| false,
                move || {
                    calls.fetch_add(1, Ordering::SeqCst);
                },
            )
        };

        assert!(!listener.message("run:1", &delivery(1, 2, RunState::Succeeded)));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_filter_listener_fires_once_per_matching_message() {
        let calls = Arc::new(AtomicUsize::new(0));
        let listener = {
            let calls = Arc::clone(&calls);
            NotificationListener::for_filter(
                MessageFilter::new(JobRunIdentity::new(1, 20)),
                move || {
                    calls.fetch_add(1, Ordering::SeqCst);
                },
            )
        };

        listener.message("run:1", &delivery(1, 20, RunState::Running));
        listener.message("run:1", &delivery(1, 21, RunState::Succeeded));
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        listener.message("run:1", &delivery(1, 20, RunState::Succeeded));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
