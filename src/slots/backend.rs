use async_trait::async_trait;

use crate::client::ElevenClient;
use crate::types::{Voice, VoiceCollection};
use crate::Result;

/// The remote operations slot management needs.
///
/// `ElevenClient` implements it against the live API; tests substitute an
/// in-memory account.
#[async_trait]
pub trait VoiceSlotBackend: Send + Sync {
    /// Voices currently in the account, in listing order.
    async fn list_voices(&self) -> Result<VoiceCollection>;
    /// Delete an account voice. `true` when the remote confirms.
    async fn remove_voice(&self, voice_id: &str) -> Result<bool>;
    /// Copy a shared-library voice into the account.
    async fn add_library_voice(&self, public_user_id: &str, voice_id: &str, name: &str) -> Result<Voice>;
    /// Account voice capacity; `None` when the plan reports no limit.
    async fn voice_limit(&self) -> Result<Option<u32>>;
}

#[async_trait]
impl VoiceSlotBackend for ElevenClient {
    async fn list_voices(&self) -> Result<VoiceCollection> {
        self.voices().list().await
    }

    async fn remove_voice(&self, voice_id: &str) -> Result<bool> {
        self.voices().delete(voice_id).await
    }

    async fn add_library_voice(&self, public_user_id: &str, voice_id: &str, name: &str) -> Result<Voice> {
        self.voice_library().add(public_user_id, voice_id, name).await
    }

    async fn voice_limit(&self) -> Result<Option<u32>> {
        Ok(self.user().subscription().await?.voice_limit)
    }
}
