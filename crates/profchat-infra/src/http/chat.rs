//! HttpChatTransport: concrete [`ChatTransport`] for the streaming chat endpoint.
//!
//! POSTs the turn history as a JSON array and hands back the response body
//! as a raw byte-chunk stream. The endpoint answers with plain incremental
//! text, so no framing is parsed here; decoding happens in profchat-core.

use futures_util::StreamExt;
use tracing::debug;

use profchat_core::chat::transport::{ByteStream, ChatTransport};
use profchat_types::chat::Turn;
use profchat_types::error::ChatError;

/// Streaming chat over HTTP.
pub struct HttpChatTransport {
    client: reqwest::Client,
    url: String,
}

impl HttpChatTransport {
    /// Create a transport for `url` using an existing client.
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl ChatTransport for HttpChatTransport {
    fn name(&self) -> &str {
        "http"
    }

    async fn open(&self, turns: Vec<Turn>) -> Result<ByteStream, ChatError> {
        debug!(url = %self.url, turns = turns.len(), "Opening chat stream");

        let response = self
            .client
            .post(&self.url)
            .json(&turns)
            .send()
            .await
            .map_err(|e| ChatError::transport(format!("HTTP request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(ChatError::transport(format!("HTTP {status}: {error_body}")));
        }

        let body = response.bytes_stream().map(|chunk| {
            chunk
                .map(|bytes| bytes.to_vec())
                .map_err(|e| ChatError::transport(format!("response body read: {e}")))
        });
        Ok(Box::pin(body))
    }
}
