//! Streaming chat exchanges.
//!
//! One exchange = one user submission: the request goes out through a
//! [`ChatTransport`](transport::ChatTransport), the reply comes back as raw
//! byte chunks, [`fragments`](fragments::fragments) decodes them into text,
//! and [`ChatService`](service::ChatService) merges each fragment into the
//! transcript's open turn.

pub mod decoder;
pub mod fragments;
pub mod service;
pub mod transport;

pub use decoder::Utf8StreamDecoder;
pub use service::{ChatService, ExchangeOutcome};
pub use transport::{ByteStream, ChatTransport};
