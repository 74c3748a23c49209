//! Test doubles for the status source and notification transport

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tether_core::domain::run::{JobRunIdentity, RunState, RunStatus};
use tether_core::dto::channel::{Channel, ChannelConfig};

use super::{NotificationListener, StatusSource};
use crate::error::{ClientError, Result};
use crate::transport::{NotificationTransport, Subscription, TransportError};

/// Status source replaying queued responses, then reporting `running`
pub(crate) struct ScriptedSource {
    responses: Mutex<VecDeque<Result<RunStatus>>>,
    calls: Mutex<Vec<JobRunIdentity>>,
}

impl ScriptedSource {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub(crate) fn push_status(&self, status: RunStatus) {
        self.responses.lock().unwrap().push_back(Ok(status));
    }

    pub(crate) fn push_error(&self, error: ClientError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    pub(crate) fn calls(&self) -> Vec<JobRunIdentity> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl StatusSource for ScriptedSource {
    async fn run_status(&self, run: JobRunIdentity) -> Result<RunStatus> {
        self.calls.lock().unwrap().push(run);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(RunStatus::new(run.run_id, RunState::Running)))
    }
}

struct CountingSubscription {
    unsubscribes: Arc<AtomicUsize>,
}

impl Subscription for CountingSubscription {
    fn unsubscribe_all(&self) {
        self.unsubscribes.fetch_add(1, Ordering::SeqCst);
    }
}

/// Transport that keeps the registered listener for the test to drive
pub(crate) struct RecordingTransport {
    fail: bool,
    listener: Mutex<Option<Arc<NotificationListener>>>,
    unsubscribes: Arc<AtomicUsize>,
}

impl RecordingTransport {
    pub(crate) fn new() -> Self {
        Self {
            fail: false,
            listener: Mutex::new(None),
            unsubscribes: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub(crate) fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    pub(crate) fn listener(&self) -> Option<Arc<NotificationListener>> {
        self.listener.lock().unwrap().clone()
    }

    pub(crate) fn unsubscribe_count(&self) -> usize {
        self.unsubscribes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NotificationTransport for RecordingTransport {
    async fn subscribe(
        &self,
        _channels: &ChannelConfig,
        listener: Arc<NotificationListener>,
    ) -> std::result::Result<Box<dyn Subscription>, TransportError> {
        if self.fail {
            return Err(TransportError::Connection("connection refused".to_string()));
        }

        *self.listener.lock().unwrap() = Some(listener);
        Ok(Box::new(CountingSubscription {
            unsubscribes: Arc::clone(&self.unsubscribes),
        }))
    }
}

pub(crate) fn channel_config() -> ChannelConfig {
    ChannelConfig {
        endpoint: "ws://localhost:9000/subscribe".to_string(),
        auth_key: None,
        channels: vec![Channel {
            name: "runs".to_string(),
        }],
    }
}
