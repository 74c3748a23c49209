//! Waiter configuration
//!
//! Defines how often runs are polled and whether push notifications are
//! used to wake waiters early.

use std::time::Duration;

/// Waiter configuration
///
/// All intervals are configurable to allow tuning for different
/// deployments (short CI jobs vs. overnight batch runs).
#[derive(Debug, Clone)]
pub struct WaitConfig {
    /// How often to poll the run status when no subscription is active
    pub poll_interval: Duration,

    /// How often to poll while a notification subscription is active
    pub subscribed_poll_interval: Duration,

    /// Give up after this many consecutive failed polls (unbounded if `None`)
    pub max_poll_errors: Option<u32>,

    /// Whether to subscribe to push notifications at all
    pub notifications: bool,
}

impl WaitConfig {
    /// Creates a new configuration with defaults
    pub fn new() -> Self {
        Self {
            poll_interval: Duration::from_secs(5),
            subscribed_poll_interval: Duration::from_secs(60),
            max_poll_errors: None,
            notifications: true,
        }
    }

    /// Creates configuration from environment variables
    ///
    /// Expected environment variables:
    /// - TETHER_POLL_INTERVAL (optional, seconds, default: 5)
    /// - TETHER_SUBSCRIBED_POLL_INTERVAL (optional, seconds, default: 60)
    /// - TETHER_MAX_POLL_ERRORS (optional, default: unbounded)
    /// - TETHER_NOTIFICATIONS (optional, "false" or "0" disables, default: enabled)
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Self::new();

        let poll_interval = std::env::var("TETHER_POLL_INTERVAL")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.poll_interval);

        let subscribed_poll_interval = std::env::var("TETHER_SUBSCRIBED_POLL_INTERVAL")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.subscribed_poll_interval);

        let max_poll_errors = match std::env::var("TETHER_MAX_POLL_ERRORS") {
            Ok(s) => Some(s.parse::<u32>().map_err(|_| {
                anyhow::anyhow!("TETHER_MAX_POLL_ERRORS must be a positive integer, got {:?}", s)
            })?),
            Err(_) => defaults.max_poll_errors,
        };

        let notifications = std::env::var("TETHER_NOTIFICATIONS")
            .map(|s| !matches!(s.as_str(), "0" | "false" | "no" | "off"))
            .unwrap_or(defaults.notifications);

        let config = Self {
            poll_interval,
            subscribed_poll_interval,
            max_poll_errors,
            notifications,
        };
        config.validate()?;
        Ok(config)
    }

    /// Overrides the fallback poll interval
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Disables push notifications, leaving only polling
    pub fn without_notifications(mut self) -> Self {
        self.notifications = false;
        self
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.poll_interval.is_zero() {
            anyhow::bail!("poll_interval must be greater than 0");
        }

        if self.subscribed_poll_interval < self.poll_interval {
            anyhow::bail!("subscribed_poll_interval must not be shorter than poll_interval");
        }

        if self.max_poll_errors == Some(0) {
            anyhow::bail!("max_poll_errors must be greater than 0");
        }

        Ok(())
    }
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self::new()
    }
}
