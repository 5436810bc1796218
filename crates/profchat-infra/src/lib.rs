//! Infrastructure layer for profchat.
//!
//! Contains the implementations of the ports defined in `profchat-core`:
//! the streaming HTTP chat transport and the analytics HTTP client, plus
//! the `config.toml` loader.

pub mod config;
pub mod http;
