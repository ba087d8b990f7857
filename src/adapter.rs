//! Provider-neutral view of the client.
//!
//! Applications juggling several TTS providers can work against these plain
//! serializable records instead of provider-specific types.

use std::time::{SystemTime, UNIX_EPOCH};

use bytes::Bytes;
use serde::Serialize;
use serde_json::Value;

use crate::client::ElevenClient;
use crate::resources::{LibrarySearch, TtsOptions};
use crate::types::Audio;
use crate::Result;

pub const PROVIDER: &str = "elevenlabs";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProviderVoice {
    pub provider: &'static str,
    pub voice_id: String,
    pub name: Option<String>,
    pub gender: Option<String>,
    pub language: Option<String>,
    pub accent: Option<String>,
    pub category: Option<String>,
    pub preview_url: Option<String>,
    pub metadata: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProviderLibraryVoice {
    pub provider: &'static str,
    pub voice_id: String,
    pub public_owner_id: String,
    pub name: Option<String>,
    pub gender: Option<String>,
    pub language: Option<String>,
    pub accent: Option<String>,
    pub metadata: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProviderModel {
    pub provider: &'static str,
    pub model_id: String,
    pub name: Option<String>,
    pub multilingual: bool,
    pub languages: Vec<String>,
    pub metadata: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Quota {
    pub provider: &'static str,
    pub tier: Option<String>,
    pub characters_used: Option<u64>,
    pub characters_limit: Option<u64>,
    pub characters_remaining: i64,
    /// Unix seconds.
    pub resets_at: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProvisionedVoice {
    pub provider: &'static str,
    pub voice_id: String,
    pub name: Option<String>,
    pub metadata: Value,
}

/// Adapter exposing the client through provider-neutral records.
#[derive(Debug, Clone)]
pub struct TtsAdapter {
    client: ElevenClient,
}

impl TtsAdapter {
    pub fn new(client: ElevenClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ElevenClient {
        &self.client
    }

    pub fn provider_name(&self) -> &'static str {
        PROVIDER
    }

    pub fn supports_streaming(&self) -> bool {
        true
    }

    pub async fn list_voices(&self) -> Result<Vec<ProviderVoice>> {
        let voices = self.client.voices().list().await?;
        voices
            .into_iter()
            .map(|v| -> Result<ProviderVoice> {
                Ok(ProviderVoice {
                    provider: PROVIDER,
                    gender: v.gender().map(str::to_string),
                    language: v.language().map(str::to_string),
                    accent: v.accent().map(str::to_string),
                    metadata: serde_json::to_value(&v)?,
                    voice_id: v.voice_id,
                    name: v.name,
                    category: v.category,
                    preview_url: v.preview_url,
                })
            })
            .collect()
    }

    pub async fn generate(&self, text: &str, voice_id: &str, options: &TtsOptions) -> Result<Audio> {
        self.client.tts().generate(text, voice_id, options).await
    }

    pub async fn stream<F>(&self, text: &str, voice_id: &str, options: &TtsOptions, sink: F) -> Result<()>
    where
        F: FnMut(Bytes) + Send,
    {
        self.client.tts().stream(text, voice_id, options, sink).await
    }

    pub async fn list_models(&self) -> Result<Vec<ProviderModel>> {
        let models = self.client.models().list().await?;
        models
            .into_iter()
            .map(|m| -> Result<ProviderModel> {
                Ok(ProviderModel {
                    provider: PROVIDER,
                    multilingual: m.is_multilingual(),
                    languages: m
                        .supported_language_codes()
                        .into_iter()
                        .map(str::to_string)
                        .collect(),
                    metadata: serde_json::to_value(&m)?,
                    model_id: m.model_id,
                    name: m.name,
                })
            })
            .collect()
    }

    pub async fn quota(&self) -> Result<Quota> {
        let sub = self.client.user().subscription().await?;
        Ok(Quota {
            provider: PROVIDER,
            characters_remaining: sub.characters_remaining(),
            resets_at: sub
                .next_reset_at()
                .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
                .map(|d| d.as_secs()),
            tier: sub.tier,
            characters_used: sub.character_count,
            characters_limit: sub.character_limit,
        })
    }

    pub async fn search_voices(&self, search: &LibrarySearch) -> Result<Vec<ProviderLibraryVoice>> {
        let page = self.client.voice_library().search(search).await?;
        page.voices
            .into_iter()
            .map(|v| -> Result<ProviderLibraryVoice> {
                Ok(ProviderLibraryVoice {
                    provider: PROVIDER,
                    metadata: serde_json::to_value(&v)?,
                    voice_id: v.voice_id,
                    public_owner_id: v.public_owner_id,
                    name: v.name,
                    gender: v.gender,
                    language: v.language,
                    accent: v.accent,
                })
            })
            .collect()
    }

    /// Provision a library voice through the client's slot manager.
    pub async fn ensure_voice_available(
        &self,
        public_user_id: &str,
        voice_id: &str,
        name: &str,
    ) -> Result<ProvisionedVoice> {
        let voice = self
            .client
            .voice_slots()
            .ensure_available(public_user_id, voice_id, name)
            .await?;
        Ok(ProvisionedVoice {
            provider: PROVIDER,
            metadata: serde_json::to_value(&voice)?,
            voice_id: voice.voice_id,
            name: voice.name,
        })
    }
}

impl Quota {
    pub fn resets_at_time(&self) -> Option<SystemTime> {
        self.resets_at
            .map(|secs| UNIX_EPOCH + std::time::Duration::from_secs(secs))
    }
}
