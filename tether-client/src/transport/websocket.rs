//! WebSocket notification transport
//!
//! Connects to the notification endpoint with the channel list in the query
//! string, then reads JSON text frames of the form
//! `{"channel": "...", "message": {...}, "publishedAt": "..."}` on a
//! background task and hands each decoded message to the listener.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::StreamExt;
use reqwest::Url;
use serde::Deserialize;
use tether_core::domain::notification::{Delivery, NotificationMessage};
use tether_core::dto::channel::ChannelConfig;
use tokio::task::AbortHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, info, warn};

use super::{NotificationTransport, Subscription, TransportError};
use crate::waiter::NotificationListener;

type Stream = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

/// Notification transport over a WebSocket connection
#[derive(Debug, Clone, Default)]
pub struct WebSocketTransport;

impl WebSocketTransport {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl NotificationTransport for WebSocketTransport {
    async fn subscribe(
        &self,
        channels: &ChannelConfig,
        listener: Arc<NotificationListener>,
    ) -> Result<Box<dyn Subscription>, TransportError> {
        let client_id = uuid::Uuid::new_v4().to_string();
        let url = subscribe_url(channels, &client_id)?;

        let (stream, _response) = connect_async(url.as_str()).await.map_err(|e| {
            TransportError::Connection(format!(
                "Failed to connect to {}: {}",
                channels.endpoint, e
            ))
        })?;

        info!(
            client_id = %client_id,
            "Connected to notification service at {}",
            channels.endpoint
        );

        let active = Arc::new(AtomicBool::new(true));
        let task = tokio::spawn(pump(stream, listener, Arc::clone(&active)));

        Ok(Box::new(WebSocketSubscription {
            task: task.abort_handle(),
            active,
        }))
    }
}

struct WebSocketSubscription {
    task: AbortHandle,
    active: Arc<AtomicBool>,
}

impl Subscription for WebSocketSubscription {
    fn unsubscribe_all(&self) {
        if self.active.swap(false, Ordering::SeqCst) {
            debug!("Closing notification stream");
        }
        self.task.abort();
    }

    fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }
}

impl Drop for WebSocketSubscription {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// One text frame received from the notification service
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Frame {
    channel: String,
    message: NotificationMessage,
    #[serde(default)]
    published_at: Option<DateTime<Utc>>,
}

fn subscribe_url(channels: &ChannelConfig, client_id: &str) -> Result<Url, TransportError> {
    if channels.channels.is_empty() {
        return Err(TransportError::Protocol(
            "no notification channels to subscribe to".to_string(),
        ));
    }

    let mut url = Url::parse(&channels.endpoint).map_err(|e| {
        TransportError::Protocol(format!("Invalid endpoint {}: {}", channels.endpoint, e))
    })?;

    {
        let mut query = url.query_pairs_mut();
        query.append_pair("channels", &channels.channel_names().join(","));
        query.append_pair("clientId", client_id);
        if let Some(auth_key) = &channels.auth_key {
            query.append_pair("auth", auth_key);
        }
    }

    Ok(url)
}

/// Reads frames until the stream closes or the task is aborted
async fn pump(mut stream: Stream, listener: Arc<NotificationListener>, active: Arc<AtomicBool>) {
    while let Some(frame) = stream.next().await {
        match frame {
            Ok(Message::Text(text)) => {
                deliver(&listener, &text);
            }
            Ok(Message::Close(frame)) => {
                info!(?frame, "Notification stream closed");
                break;
            }
            // Ping/pong are answered by tungstenite
            Ok(_) => {}
            Err(e) => {
                warn!("Notification stream error: {}", e);
                break;
            }
        }
    }

    active.store(false, Ordering::SeqCst);
}

/// Decode one text frame and pass it to the listener
fn deliver(listener: &NotificationListener, text: &str) -> bool {
    match serde_json::from_str::<Frame>(text) {
        Ok(frame) => {
            let delivery = Delivery {
                message: frame.message,
                published_at: frame.published_at,
            };
            listener.message(&frame.channel, &delivery)
        }
        Err(e) => {
            debug!("Skipping undecodable notification frame: {}", e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::waiter::MessageFilter;
    use std::sync::atomic::AtomicUsize;
    use tether_core::domain::run::JobRunIdentity;
    use tether_core::dto::channel::Channel;

    fn counting_listener() -> (NotificationListener, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let listener = {
            let calls = Arc::clone(&calls);
            NotificationListener::for_filter(MessageFilter::new(JobRunIdentity::new(1, 20)), move || {
                calls.fetch_add(1, Ordering::SeqCst);
            })
        };
        (listener, calls)
    }

    #[test]
    fn test_deliver_matching_frame() {
        let (listener, calls) = counting_listener();
        let text = r#"{
            "channel": "runs",
            "message": {"object": {"id": 1}, "run": {"id": 20, "state": "succeeded"}},
            "publishedAt": "2026-01-01T10:00:00Z"
        }"#;

        assert!(deliver(&listener, text));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_deliver_skips_garbage() {
        let (listener, calls) = counting_listener();

        assert!(!deliver(&listener, "not json"));
        assert!(!deliver(&listener, r#"{"channel": "runs", "message": {}}"#));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_subscribe_url() {
        let config = ChannelConfig {
            endpoint: "wss://push.example.com/subscribe".to_string(),
            auth_key: Some("k&y".to_string()),
            channels: vec![
                Channel {
                    name: "jobs:1".to_string(),
                },
                Channel {
                    name: "runs:1".to_string(),
                },
            ],
        };

        let url = subscribe_url(&config, "abc").unwrap();
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![
                ("channels".to_string(), "jobs:1,runs:1".to_string()),
                ("clientId".to_string(), "abc".to_string()),
                ("auth".to_string(), "k&y".to_string()),
            ]
        );
    }

    #[test]
    fn test_subscribe_url_requires_channels() {
        let config = ChannelConfig {
            endpoint: "wss://push.example.com/subscribe".to_string(),
            auth_key: None,
            channels: vec![],
        };

        assert!(matches!(
            subscribe_url(&config, "abc"),
            Err(TransportError::Protocol(_))
        ));
    }
}
