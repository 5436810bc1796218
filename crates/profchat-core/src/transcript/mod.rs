//! Transcript state and change notifications.
//!
//! `TranscriptStore` owns the ordered turns and enforces the single
//! open-turn invariant; `TranscriptBus` fans its changes out to observers.

pub mod bus;
pub mod store;

pub use bus::TranscriptBus;
pub use store::TranscriptStore;
