use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::Mutex;

use crate::adapter::TtsAdapter;
use crate::config::ClientConfig;
use crate::resources::{
    Models, Music, MusicInput, MusicOptions, SoundEffectOptions, SoundEffects, TextToSpeech,
    TtsOptions, User, VoiceLibrary, Voices,
};
use crate::slots::{UsageTracker, VoiceSlotManager};
use crate::transport::HttpTransport;
use crate::types::Audio;
use crate::Result;

struct ClientInner {
    transport: HttpTransport,
    usage: Arc<UsageTracker>,
    slot_guard: Arc<Mutex<()>>,
}

/// Client for the ElevenLabs API.
///
/// Cheap to clone; clones share one connection pool, one configuration, and one
/// voice usage tracker. There is no global instance.
#[derive(Clone)]
pub struct ElevenClient {
    inner: Arc<ClientInner>,
}

impl ElevenClient {
    /// Build a client from `config`.
    ///
    /// A missing API key is not an error here; it surfaces as
    /// [`Error::Configuration`](crate::Error::Configuration) on the first request.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let transport = HttpTransport::new(config)?;
        Ok(Self {
            inner: Arc::new(ClientInner {
                transport,
                usage: Arc::new(UsageTracker::new()),
                slot_guard: Arc::new(Mutex::new(())),
            }),
        })
    }

    /// Defaults, with the API key read from `ELEVENLABS_API_KEY`.
    pub fn from_env() -> Result<Self> {
        Self::new(ClientConfig::from_env())
    }

    pub fn builder() -> super::ElevenClientBuilder {
        super::ElevenClientBuilder::new()
    }

    pub fn config(&self) -> &ClientConfig {
        self.inner.transport.config()
    }

    pub fn is_configured(&self) -> bool {
        self.config().is_configured()
    }

    pub fn transport(&self) -> &HttpTransport {
        &self.inner.transport
    }

    pub fn voices(&self) -> Voices<'_> {
        Voices::new(&self.inner.transport)
    }

    pub fn tts(&self) -> TextToSpeech<'_> {
        TextToSpeech::new(&self.inner.transport)
    }

    pub fn voice_library(&self) -> VoiceLibrary<'_> {
        VoiceLibrary::new(&self.inner.transport)
    }

    pub fn models(&self) -> Models<'_> {
        Models::new(&self.inner.transport)
    }

    pub fn user(&self) -> User<'_> {
        User::new(&self.inner.transport)
    }

    pub fn sound_effects(&self) -> SoundEffects<'_> {
        SoundEffects::new(&self.inner.transport)
    }

    pub fn music(&self) -> Music<'_> {
        Music::new(&self.inner.transport)
    }

    /// Slot manager over this account. Every manager from this client (and its
    /// clones) shares one usage history and one write lock.
    pub fn voice_slots(&self) -> VoiceSlotManager<ElevenClient> {
        VoiceSlotManager::with_state(
            self.clone(),
            self.inner.usage.clone(),
            self.inner.slot_guard.clone(),
        )
    }

    pub fn adapter(&self) -> TtsAdapter {
        TtsAdapter::new(self.clone())
    }

    pub async fn generate_speech(&self, text: &str, voice_id: &str, options: &TtsOptions) -> Result<Audio> {
        self.tts().generate(text, voice_id, options).await
    }

    pub async fn stream_speech<F>(&self, text: &str, voice_id: &str, options: &TtsOptions, sink: F) -> Result<()>
    where
        F: FnMut(Bytes) + Send,
    {
        self.tts().stream(text, voice_id, options, sink).await
    }

    pub async fn generate_sound_effect(&self, text: &str, options: &SoundEffectOptions) -> Result<Audio> {
        self.sound_effects().generate(text, options).await
    }

    pub async fn generate_music(&self, input: &MusicInput, options: &MusicOptions) -> Result<Audio> {
        self.music().generate(input, options).await
    }
}

impl std::fmt::Debug for ElevenClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElevenClient")
            .field("config", self.config())
            .field("tracked_voices", &self.inner.usage.len())
            .finish()
    }
}
