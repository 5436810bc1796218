//! Observability for profchat: tracing subscriber setup and span names.

pub mod attrs;
pub mod tracing_setup;

pub use tracing_setup::{init_tracing, shutdown_tracing, verbosity_filter};
