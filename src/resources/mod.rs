//! Typed accessors for each API area.
//!
//! Every accessor is a thin borrowed view over the client's [`HttpTransport`];
//! obtain them from [`ElevenClient`](crate::ElevenClient).

pub mod models;
pub mod music;
pub mod sound_effects;
pub mod text_to_speech;
pub mod user;
pub mod voice_library;
pub mod voices;

pub use models::Models;
pub use music::{Music, MusicInput, MusicOptions};
pub use sound_effects::{SoundEffectOptions, SoundEffects};
pub use text_to_speech::{TextToSpeech, TimestampedAudio, TtsOptions};
pub use user::User;
pub use voice_library::{LibrarySearch, VoiceLibrary};
pub use voices::{VoiceCreate, VoiceUpdate, Voices};

use serde_json::Value;

use crate::{Error, Result};

pub const DEFAULT_OUTPUT_FORMAT: &str = "mp3_44100_128";

/// Reject empty or whitespace-only caller input before any request.
pub(crate) fn validate_presence(value: &str, name: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::validation(format!("{} cannot be blank", name)));
    }
    Ok(())
}

pub(crate) fn output_format_query(format: &str) -> Vec<(String, String)> {
    vec![("output_format".to_string(), format.to_string())]
}

/// `true` when a mutation response reports `"status": "ok"`.
pub(crate) fn status_ok(response: &Value) -> bool {
    response.get("status").and_then(Value::as_str) == Some("ok")
}
