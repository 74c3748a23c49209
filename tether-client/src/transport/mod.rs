//! Notification transports
//!
//! A transport connects to the platform's notification service and hands
//! every delivered message to a [`NotificationListener`]. The waiter only
//! relies on this narrow interface, so it works the same whether push
//! notifications are available or not.
//!
//! Implementations:
//! - [`NoopTransport`]: notifications unavailable, waiters rely on polling
//! - `WebSocketTransport` (feature `websocket`): JSON frames over a WebSocket

#[cfg(feature = "websocket")]
mod websocket;

#[cfg(feature = "websocket")]
pub use websocket::WebSocketTransport;

use std::sync::Arc;

use async_trait::async_trait;
use tether_core::dto::channel::ChannelConfig;
use thiserror::Error;

use crate::waiter::NotificationListener;

/// Errors raised while establishing a subscription
#[derive(Debug, Error)]
pub enum TransportError {
    /// No transport is available in this build
    #[error("Notification transport unavailable: {0}")]
    Unavailable(String),

    /// Failed to reach the notification service
    #[error("Connection error: {0}")]
    Connection(String),

    /// The notification service rejected the subscription
    #[error("Protocol error: {0}")]
    Protocol(String),
}

/// An active subscription to one or more notification channels
pub trait Subscription: Send + Sync {
    /// Stop delivering messages
    ///
    /// Calling this more than once is a no-op.
    fn unsubscribe_all(&self);

    /// Whether messages may still be delivered
    fn is_active(&self) -> bool {
        true
    }
}

/// Capability to subscribe to the platform's notification channels
#[async_trait]
pub trait NotificationTransport: Send + Sync {
    /// Subscribe to every channel in `channels`, delivering to `listener`
    async fn subscribe(
        &self,
        channels: &ChannelConfig,
        listener: Arc<NotificationListener>,
    ) -> Result<Box<dyn Subscription>, TransportError>;
}

/// Transport used when push notifications are not available
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTransport;

#[async_trait]
impl NotificationTransport for NoopTransport {
    async fn subscribe(
        &self,
        _channels: &ChannelConfig,
        _listener: Arc<NotificationListener>,
    ) -> Result<Box<dyn Subscription>, TransportError> {
        Err(TransportError::Unavailable(
            "built without a notification transport".to_string(),
        ))
    }
}

/// The best transport compiled into this build
pub fn default_transport() -> Box<dyn NotificationTransport> {
    #[cfg(feature = "websocket")]
    {
        Box::new(WebSocketTransport::new())
    }

    #[cfg(not(feature = "websocket"))]
    {
        Box::new(NoopTransport)
    }
}
