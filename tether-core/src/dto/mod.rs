//! Data Transfer Objects for the platform API
//!
//! Payloads returned by the REST API that are not domain entities on their
//! own, such as the notification channel configuration.

pub mod channel;
