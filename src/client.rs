//! The client entry point.
//!
//! Construct one [`ElevenClient`] at the application's composition root and pass
//! it (or clones of it) to whatever needs API access.

pub mod builder;
pub mod core;

pub use builder::ElevenClientBuilder;
pub use self::core::ElevenClient;
