//! HTTP implementations of the core ports.
//!
//! Both clients share one `reqwest::Client` so connection pooling and the
//! connect timeout apply to chat and analytics alike.

pub mod analytics;
pub mod chat;

pub use analytics::HttpAnalyticsClient;
pub use chat::HttpChatTransport;

use profchat_types::config::HttpConfig;

/// Build the shared HTTP client.
///
/// Only the connect phase is bounded here. Reading a streamed reply can
/// legitimately take minutes; stalls are caught by the chat idle timeout.
pub fn build_client(config: &HttpConfig) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .connect_timeout(config.connect_timeout())
        .build()
}
