//! Text-to-speech (`/text-to-speech/{voice_id}`).

use base64::Engine as _;
use bytes::Bytes;
use serde::Serialize;
use serde_json::Value;

use super::{output_format_query, validate_presence, DEFAULT_OUTPUT_FORMAT};
use crate::callbacks::AudioGeneratedEvent;
use crate::transport::HttpTransport;
use crate::types::{Audio, CostInfo, VoiceSettings};
use crate::{Error, Result};

pub const DEFAULT_MODEL: &str = "eleven_multilingual_v2";
pub const MAX_TEXT_LENGTH: usize = 5000;

pub const OUTPUT_FORMATS: &[&str] = &[
    "mp3_44100_128",
    "mp3_44100_192",
    "pcm_16000",
    "pcm_22050",
    "pcm_24000",
    "pcm_44100",
    "ulaw_8000",
];

/// Per-request generation options. Unset fields use the defaults.
#[derive(Debug, Clone, Default)]
pub struct TtsOptions {
    pub model_id: Option<String>,
    /// Overrides merged onto [`VoiceSettings::defaults`].
    pub voice_settings: VoiceSettings,
    pub output_format: Option<String>,
}

impl TtsOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn model_id(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = Some(model_id.into());
        self
    }

    pub fn voice_settings(mut self, settings: VoiceSettings) -> Self {
        self.voice_settings = settings;
        self
    }

    pub fn output_format(mut self, format: impl Into<String>) -> Self {
        self.output_format = Some(format.into());
        self
    }

    fn model(&self) -> &str {
        self.model_id.as_deref().unwrap_or(DEFAULT_MODEL)
    }

    fn format(&self) -> &str {
        self.output_format.as_deref().unwrap_or(DEFAULT_OUTPUT_FORMAT)
    }
}

#[derive(Debug, Serialize)]
struct SpeechRequest<'a> {
    text: &'a str,
    model_id: &'a str,
    voice_settings: VoiceSettings,
}

/// Audio plus per-character timing from `/with-timestamps`.
#[derive(Debug, Clone)]
pub struct TimestampedAudio {
    pub audio: Option<Audio>,
    pub alignment: Option<Value>,
}

#[derive(Debug, Clone, Copy)]
pub struct TextToSpeech<'a> {
    transport: &'a HttpTransport,
}

impl<'a> TextToSpeech<'a> {
    pub(crate) fn new(transport: &'a HttpTransport) -> Self {
        Self { transport }
    }

    /// Synthesize `text` with `voice_id` and return the complete audio.
    pub async fn generate(&self, text: &str, voice_id: &str, options: &TtsOptions) -> Result<Audio> {
        let body = prepare(text, voice_id, options)?;
        let data = self
            .transport
            .post_binary(
                &format!("/text-to-speech/{}", voice_id),
                body,
                output_format_query(options.format()),
            )
            .await?;

        let audio = Audio::new(data, options.format())
            .with_voice_id(voice_id)
            .with_text(text)
            .with_model_id(options.model());
        self.announce(Some(&audio), voice_id, text, options.model());
        Ok(audio)
    }

    /// Synthesize `text`, handing audio chunks to `sink` as they arrive.
    pub async fn stream<F>(&self, text: &str, voice_id: &str, options: &TtsOptions, sink: F) -> Result<()>
    where
        F: FnMut(Bytes) + Send,
    {
        let body = prepare(text, voice_id, options)?;
        self.transport
            .post_stream(
                &format!("/text-to-speech/{}/stream", voice_id),
                body,
                output_format_query(options.format()),
                sink,
            )
            .await?;
        self.announce(None, voice_id, text, options.model());
        Ok(())
    }

    /// Synthesize with character-level alignment data.
    pub async fn generate_with_timestamps(
        &self,
        text: &str,
        voice_id: &str,
        options: &TtsOptions,
    ) -> Result<TimestampedAudio> {
        let body = prepare(text, voice_id, options)?;
        let mut response = self
            .transport
            .post_json_with_query(
                &format!("/text-to-speech/{}/with-timestamps", voice_id),
                body,
                output_format_query(options.format()),
            )
            .await?;

        let audio = match response.get("audio_base64").and_then(Value::as_str) {
            Some(encoded) => {
                let data = base64::engine::general_purpose::STANDARD
                    .decode(encoded)
                    .map_err(|e| Error::api(format!("invalid audio_base64 in response: {}", e)))?;
                Some(
                    Audio::new(data, options.format())
                        .with_voice_id(voice_id)
                        .with_text(text)
                        .with_model_id(options.model()),
                )
            }
            None => None,
        };
        let alignment = response.get_mut("alignment").map(Value::take);
        Ok(TimestampedAudio { audio, alignment })
    }

    fn announce(&self, audio: Option<&Audio>, voice_id: &str, text: &str, model_id: &str) {
        let cost_info = CostInfo::new(text, Some(voice_id), Some(model_id));
        self.transport
            .config()
            .callbacks
            .emit_audio_generated(&AudioGeneratedEvent {
                audio,
                voice_id: Some(voice_id),
                text: Some(text),
                cost_info: &cost_info,
            });
    }
}

fn validate_text(text: &str) -> Result<()> {
    validate_presence(text, "text")?;
    let len = text.chars().count();
    if len > MAX_TEXT_LENGTH {
        return Err(Error::validation(format!(
            "text exceeds maximum length of {} characters (got {})",
            MAX_TEXT_LENGTH, len
        )));
    }
    Ok(())
}

fn prepare(text: &str, voice_id: &str, options: &TtsOptions) -> Result<Value> {
    validate_text(text)?;
    validate_presence(voice_id, "voice_id")?;
    Ok(serde_json::to_value(SpeechRequest {
        text,
        model_id: options.model(),
        voice_settings: VoiceSettings::with_defaults(&options.voice_settings),
    })?)
}
