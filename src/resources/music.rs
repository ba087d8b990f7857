//! Music generation (`/music`).

use bytes::Bytes;
use serde::Serialize;
use serde_json::{Map, Value};

use super::{output_format_query, validate_presence, DEFAULT_OUTPUT_FORMAT};
use crate::callbacks::AudioGeneratedEvent;
use crate::transport::HttpTransport;
use crate::types::{Audio, CostInfo};
use crate::{Error, Result};

pub const DEFAULT_MODEL: &str = "music_v1";

/// What to compose from: a text prompt or a composition plan.
#[derive(Debug, Clone, PartialEq)]
pub enum MusicInput {
    Prompt(String),
    /// A plan as returned by [`Music::create_plan`].
    Plan(Value),
}

impl MusicInput {
    pub fn prompt(prompt: impl Into<String>) -> Self {
        MusicInput::Prompt(prompt.into())
    }

    fn validate(&self) -> Result<()> {
        match self {
            MusicInput::Prompt(p) => validate_presence(p, "prompt"),
            MusicInput::Plan(Value::Null) => {
                Err(Error::validation("composition_plan cannot be blank"))
            }
            MusicInput::Plan(_) => Ok(()),
        }
    }

    fn text(&self) -> Option<&str> {
        match self {
            MusicInput::Prompt(p) => Some(p),
            MusicInput::Plan(_) => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MusicOptions {
    pub model_id: Option<String>,
    /// Prompt input only.
    pub music_length_ms: Option<u64>,
    /// Prompt input only.
    pub force_instrumental: Option<bool>,
    pub respect_sections_durations: Option<bool>,
    pub output_format: Option<String>,
}

impl MusicOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn model_id(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = Some(model_id.into());
        self
    }

    pub fn music_length_ms(mut self, ms: u64) -> Self {
        self.music_length_ms = Some(ms);
        self
    }

    pub fn force_instrumental(mut self, force: bool) -> Self {
        self.force_instrumental = Some(force);
        self
    }

    pub fn respect_sections_durations(mut self, respect: bool) -> Self {
        self.respect_sections_durations = Some(respect);
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
struct PlanRequest<'a> {
    prompt: &'a str,
    model_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    music_length_ms: Option<u64>,
}

#[derive(Debug, Clone, Copy)]
pub struct Music<'a> {
    transport: &'a HttpTransport,
}

impl<'a> Music<'a> {
    pub(crate) fn new(transport: &'a HttpTransport) -> Self {
        Self { transport }
    }

    pub async fn generate(&self, input: &MusicInput, options: &MusicOptions) -> Result<Audio> {
        input.validate()?;
        let body = build_body(input, options, true);
        let data = self
            .transport
            .post_binary("/music", body, output_format_query(options.format()))
            .await?;

        let mut audio = Audio::new(data, options.format()).with_model_id(options.model());
        audio.text = input.text().map(str::to_string);
        self.announce(Some(&audio), input, options);
        Ok(audio)
    }

    pub async fn stream<F>(&self, input: &MusicInput, options: &MusicOptions, sink: F) -> Result<()>
    where
        F: FnMut(Bytes) + Send,
    {
        input.validate()?;
        let body = build_body(input, options, false);
        self.transport
            .post_stream("/music/stream", body, output_format_query(options.format()), sink)
            .await?;
        self.announce(None, input, options);
        Ok(())
    }

    /// Ask the service to draft a composition plan from a prompt.
    pub async fn create_plan(
        &self,
        prompt: &str,
        music_length_ms: Option<u64>,
        model_id: Option<&str>,
    ) -> Result<Value> {
        validate_presence(prompt, "prompt")?;
        let body = serde_json::to_value(PlanRequest {
            prompt,
            model_id: model_id.unwrap_or(DEFAULT_MODEL),
            music_length_ms,
        })?;
        self.transport.post_json("/music/plan", body).await
    }

    fn announce(&self, audio: Option<&Audio>, input: &MusicInput, options: &MusicOptions) {
        let text = input.text();
        let cost_info = CostInfo::new(text.unwrap_or_default(), Some("music"), Some(options.model()));
        self.transport
            .config()
            .callbacks
            .emit_audio_generated(&AudioGeneratedEvent {
                audio,
                voice_id: None,
                text,
                cost_info: &cost_info,
            });
    }
}

fn build_body(input: &MusicInput, options: &MusicOptions, with_sections: bool) -> Value {
    let mut body = Map::new();
    body.insert("model_id".into(), Value::from(options.model()));
    match input {
        MusicInput::Prompt(prompt) => {
            body.insert("prompt".into(), Value::from(prompt.as_str()));
            if let Some(ms) = options.music_length_ms {
                body.insert("music_length_ms".into(), Value::from(ms));
            }
            if let Some(force) = options.force_instrumental {
                body.insert("force_instrumental".into(), Value::from(force));
            }
        }
        MusicInput::Plan(plan) => {
            body.insert("composition_plan".into(), plan.clone());
        }
    }
    if with_sections {
        if let Some(respect) = options.respect_sections_durations {
            body.insert("respect_sections_durations".into(), Value::from(respect));
        }
    }
    Value::Object(body)
}
