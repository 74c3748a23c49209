//! Tether Core
//!
//! Core types shared by the Tether client library and CLI.
//!
//! This crate contains:
//! - Domain types: job run identities, run status and pushed notifications
//! - DTOs: payloads exchanged with the platform API

pub mod domain;
pub mod dto;
