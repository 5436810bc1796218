//! ChatTransport trait definition.
//!
//! The port through which an exchange reaches the chat endpoint. Uses
//! RPITIT for `open`; the response body is a boxed stream of raw byte
//! chunks so implementations can hand back whatever their HTTP client
//! produces.

use std::future::Future;
use std::pin::Pin;

use futures_util::Stream;

use profchat_types::chat::Turn;
use profchat_types::error::ChatError;

/// Raw response body: byte chunks in arrival order.
///
/// A chunk may be empty and need not end on a character boundary. Any
/// transport failure mid-body is an `Err` item, after which the stream ends.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Vec<u8>, ChatError>> + Send + 'static>>;

/// Transport for the streaming chat endpoint.
///
/// Implementations live in profchat-infra (e.g., `HttpChatTransport`).
pub trait ChatTransport: Send + Sync {
    /// Short name for logs (e.g., "http").
    fn name(&self) -> &str;

    /// Send the full turn history and return the streaming response body.
    ///
    /// Resolves once the response headers have arrived. A non-success
    /// status is reported as [`ChatError::Transport`].
    fn open(&self, turns: Vec<Turn>) -> impl Future<Output = Result<ByteStream, ChatError>> + Send;
}
