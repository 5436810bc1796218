//! Professor analytics lookups.
//!
//! Side lookups that are independent of the chat transcript: aggregated
//! review sentiment and rating trends for one professor name.

pub mod service;
pub mod source;

pub use service::AnalyticsService;
pub use source::AnalyticsSource;
