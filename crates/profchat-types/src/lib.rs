//! Shared domain types for profchat.
//!
//! This crate contains the types used across the profchat workspace:
//! transcript turns, change notifications, professor analytics results,
//! client configuration, and their associated error types.
//!
//! Zero infrastructure dependencies -- only serde, uuid, thiserror.

pub mod analytics;
pub mod chat;
pub mod config;
pub mod error;
pub mod event;
