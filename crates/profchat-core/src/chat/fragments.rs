//! Byte-chunk stream to text-fragment stream adapter.
//!
//! `fragments` turns a [`ByteStream`] into a lazy, finite, non-restartable
//! stream of decoded text. Decoding state is carried across chunks, so a
//! character split between two chunks comes out whole in a later fragment.

use std::pin::Pin;
use std::time::Duration;

use futures_util::{Stream, StreamExt};
use tracing::debug;

use profchat_types::error::ChatError;

use super::decoder::Utf8StreamDecoder;
use super::transport::ByteStream;

/// Decoded text fragments in arrival order.
pub type FragmentStream = Pin<Box<dyn Stream<Item = Result<String, ChatError>> + Send + 'static>>;

/// Decode a byte-chunk stream into text fragments.
///
/// - Each chunk that completes at least one character yields one fragment;
///   chunks that decode to nothing (empty, or only part of a character)
///   yield nothing.
/// - At end of stream the decoder is flushed and a non-empty tail yielded.
/// - A transport error ends the stream after being yielded.
/// - With `idle_timeout`, waiting longer than that for the next chunk
///   yields [`ChatError::Transport`] and ends the stream.
pub fn fragments(chunks: ByteStream, idle_timeout: Option<Duration>) -> FragmentStream {
    Box::pin(async_stream::try_stream! {
        let mut chunks = chunks;
        let mut decoder = Utf8StreamDecoder::new();

        loop {
            let next = match idle_timeout {
                Some(limit) => tokio::time::timeout(limit, chunks.next())
                    .await
                    .map_err(|_| {
                        ChatError::transport(format!(
                            "no data received for {:.1}s",
                            limit.as_secs_f64()
                        ))
                    })?,
                None => chunks.next().await,
            };

            let Some(chunk) = next else {
                break;
            };
            let chunk = chunk?;

            let text = decoder.decode(&chunk);
            if !text.is_empty() {
                yield text;
            }
        }

        if decoder.has_pending() {
            debug!("Reply ended inside a multi-byte character");
        }
        let tail = decoder.finish();
        if !tail.is_empty() {
            yield tail;
        }
    })
}
