//! Typed records for API responses.
//!
//! Each record names the fields it models and keeps anything else the server
//! sends in a flattened `extra` map, so no response data is lost.

pub mod account;
pub mod audio;
pub mod model;
pub mod voice;

pub use account::{CharacterUsage, Subscription, UserInfo};
pub use audio::{Audio, CostInfo};
pub use model::{Model, ModelLanguage};
pub use voice::{
    LibraryVoice, LibraryVoicePage, LibraryVoiceRef, Voice, VoiceCollection, VoiceSettings,
};
