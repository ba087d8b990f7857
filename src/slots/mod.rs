//! Voice slot management.
//!
//! Accounts hold a limited number of voices. [`VoiceSlotManager`] treats the
//! account as an LRU cache over the shared voice library: requested voices are
//! added on demand and the least recently used one is evicted when the account
//! is full. Usage times are tracked in process memory only.

pub mod backend;
pub mod manager;
pub mod tracker;

pub use backend::VoiceSlotBackend;
pub use manager::{SlotStatus, VoiceSlotManager};
pub use tracker::UsageTracker;
