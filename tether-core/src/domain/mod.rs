//! Core domain types
//!
//! This module contains the domain structures used across Tether crates.
//! They mirror what the platform reports about a job run, either through
//! the REST API or through the notification channel.

pub mod notification;
pub mod run;
