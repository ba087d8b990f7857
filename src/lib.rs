//! # eleven-rs
//!
//! Async client for the ElevenLabs text-to-speech API.
//!
//! ## Overview
//!
//! The crate wraps the HTTP API in typed resource accessors (voices, models,
//! text-to-speech, the shared voice library, user/subscription, sound effects,
//! music) over a single transport that retries rate-limited and server errors
//! with linear backoff and classifies every failure into a typed [`Error`].
//!
//! On top sits the [voice slot manager](slots::VoiceSlotManager): accounts hold
//! a bounded number of voices, and the manager keeps requested library voices
//! present by evicting the least recently used one when the account is full.
//!
//! ## Key Features
//!
//! - **Retrying transport**: `retry-after` honored, otherwise `retry_delay * attempt`
//! - **Typed errors**: one variant per failure class, carrying status, body, and error code
//! - **Event callbacks**: request/response/retry/rate-limit/error and domain events via [`Callbacks`]
//! - **Structured logging**: `tracing` spans per request, optionally routed to a dedicated `Dispatch`
//! - **Streaming**: audio chunks delivered to a sink as they arrive
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use eleven_rs::{ElevenClient, TtsOptions};
//!
//! #[tokio::main]
//! async fn main() -> eleven_rs::Result<()> {
//!     let client = ElevenClient::builder().api_key("your-api-key").build()?;
//!
//!     let audio = client
//!         .generate_speech("Hello world", "21m00Tcm4TlvDq8ikWAM", &TtsOptions::new())
//!         .await?;
//!     audio.save_to_file("hello.mp3").await?;
//!
//!     // Keep a library voice in the account, evicting the LRU voice if full.
//!     let voice = client
//!         .voice_slots()
//!         .ensure_available("owner-id", "library-voice-id", "Narrator")
//!         .await?;
//!     println!("ready: {}", voice.voice_id);
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`client`] | Client entry point and builder |
//! | [`config`] | Client configuration |
//! | [`transport`] | HTTP transport, retry, and error classification |
//! | [`resources`] | Typed accessors per API area |
//! | [`types`] | Response records |
//! | [`slots`] | Voice slot management with LRU eviction |
//! | [`callbacks`] | Event hooks |
//! | [`adapter`] | Provider-neutral records |

pub mod adapter;
pub mod callbacks;
pub mod client;
pub mod config;
pub mod error;
pub mod resources;
pub mod slots;
pub mod transport;
pub mod types;

pub use adapter::TtsAdapter;
pub use callbacks::{Callbacks, HandlerResult};
pub use client::{ElevenClient, ElevenClientBuilder};
pub use config::ClientConfig;
pub use error::{Error, ErrorDetails};
pub use resources::{
    LibrarySearch, MusicInput, MusicOptions, SoundEffectOptions, TtsOptions, VoiceCreate,
    VoiceUpdate,
};
pub use slots::{SlotStatus, UsageTracker, VoiceSlotBackend, VoiceSlotManager};
pub use transport::{FilePart, MultipartBody};
pub use types::{
    Audio, CostInfo, LibraryVoice, LibraryVoicePage, LibraryVoiceRef, Model, Subscription,
    UserInfo, Voice, VoiceCollection, VoiceSettings,
};

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;
