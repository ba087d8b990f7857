//! Sound effect generation (`/sound-generation`).

use serde::Serialize;

use super::{output_format_query, validate_presence, DEFAULT_OUTPUT_FORMAT};
use crate::callbacks::AudioGeneratedEvent;
use crate::transport::HttpTransport;
use crate::types::{Audio, CostInfo};
use crate::Result;

pub const DEFAULT_MODEL: &str = "eleven_text_to_sound_v2";

#[derive(Debug, Clone, Default)]
pub struct SoundEffectOptions {
    pub model_id: Option<String>,
    pub duration_seconds: Option<f64>,
    /// 0.0 to 1.0; how literally the prompt is followed.
    pub prompt_influence: Option<f64>,
    pub looping: Option<bool>,
    pub output_format: Option<String>,
}

impl SoundEffectOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn model_id(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = Some(model_id.into());
        self
    }

    pub fn duration_seconds(mut self, secs: f64) -> Self {
        self.duration_seconds = Some(secs);
        self
    }

    pub fn prompt_influence(mut self, influence: f64) -> Self {
        self.prompt_influence = Some(influence);
        self
    }

    pub fn looping(mut self, looping: bool) -> Self {
        self.looping = Some(looping);
        self
    }

    pub fn output_format(mut self, format: impl Into<String>) -> Self {
        self.output_format = Some(format.into());
        self
    }
}

#[derive(Debug, Serialize)]
struct SoundRequest<'a> {
    text: &'a str,
    model_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration_seconds: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    prompt_influence: Option<f64>,
    #[serde(rename = "loop", skip_serializing_if = "Option::is_none")]
    looping: Option<bool>,
}

#[derive(Debug, Clone, Copy)]
pub struct SoundEffects<'a> {
    transport: &'a HttpTransport,
}

impl<'a> SoundEffects<'a> {
    pub(crate) fn new(transport: &'a HttpTransport) -> Self {
        Self { transport }
    }

    pub async fn generate(&self, text: &str, options: &SoundEffectOptions) -> Result<Audio> {
        validate_presence(text, "text")?;
        let model_id = options.model_id.as_deref().unwrap_or(DEFAULT_MODEL);
        let format = options.output_format.as_deref().unwrap_or(DEFAULT_OUTPUT_FORMAT);
        let body = serde_json::to_value(SoundRequest {
            text,
            model_id,
            duration_seconds: options.duration_seconds,
            prompt_influence: options.prompt_influence,
            looping: options.looping,
        })?;

        let data = self
            .transport
            .post_binary("/sound-generation", body, output_format_query(format))
            .await?;
        let audio = Audio::new(data, format)
            .with_text(text)
            .with_model_id(model_id);

        let cost_info = CostInfo::new(text, Some("sound_effect"), Some(model_id));
        self.transport
            .config()
            .callbacks
            .emit_audio_generated(&AudioGeneratedEvent {
                audio: Some(&audio),
                voice_id: None,
                text: Some(text),
                cost_info: &cost_info,
            });
        Ok(audio)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_renames_loop_and_skips_unset() {
        let body = serde_json::to_value(SoundRequest {
            text: "door creak",
            model_id: DEFAULT_MODEL,
            duration_seconds: None,
            prompt_influence: Some(0.3),
            looping: Some(true),
        })
        .unwrap();
        assert_eq!(
            body,
            json!({
                "text": "door creak",
                "model_id": "eleven_text_to_sound_v2",
                "prompt_influence": 0.3,
                "loop": true
            })
        );
    }
}
