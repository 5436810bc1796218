//! Span names and attribute keys shared across profchat.
//!
//! Span names are usable as the name argument of `tracing::info_span!`.
//! Field keys are listed for exporters and log queries; `tracing` macros
//! need them spelled inline.

/// Instrumentation scope reported to OpenTelemetry.
pub const TRACER_NAME: &str = "profchat";

// --- Span names ---

/// One user submission and its streamed reply (profchat-core).
pub const SPAN_CHAT_EXCHANGE: &str = "chat.exchange";

/// Both analytics lookups for one professor (profchat-core).
pub const SPAN_ANALYTICS_LOOKUP: &str = "analytics.lookup";

/// Interactive chat session (`profchat chat`).
pub const SPAN_CHAT_SESSION: &str = "cli.chat_session";

/// Single-shot question (`profchat ask`).
pub const SPAN_ASK: &str = "cli.ask";

/// Analytics command (`profchat insights`).
pub const SPAN_INSIGHTS: &str = "cli.insights";

// --- Field keys ---

/// Name of the chat transport (e.g., "http").
pub const CHAT_TRANSPORT: &str = "chat.transport";

/// UUIDv7 of the exchange that opened the assistant turn.
pub const CHAT_EXCHANGE_ID: &str = "chat.exchange_id";

/// Transcript index of the assistant turn being streamed.
pub const CHAT_TURN_INDEX: &str = "chat.turn_index";

/// Number of turns sent ahead of the new user turn.
pub const CHAT_HISTORY_LEN: &str = "chat.history_len";

/// Professor name passed to the analytics endpoints.
pub const ANALYTICS_PROFESSOR: &str = "analytics.professor";
