//! Interactive chat session for profchat.
//!
//! Streams assistant replies as they arrive, handles slash commands, and lets
//! the user cancel a reply mid-stream. Entry point: `loop_runner::run_chat_loop`.

pub mod banner;
pub mod commands;
pub mod input;
pub mod loop_runner;
pub mod renderer;
