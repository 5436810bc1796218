//! Business logic and port definitions for profchat.
//!
//! This crate owns the transcript store and the streaming reconciliation
//! loop that merges a chat reply into it. It defines the "ports"
//! (`ChatTransport`, `AnalyticsSource`) that the infrastructure layer
//! implements, and depends only on `profchat-types` -- never on
//! `profchat-infra` or any HTTP crate.

pub mod analytics;
pub mod chat;
pub mod transcript;
