//! Generated audio and its cost estimate.

use std::fmt;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use serde::Serialize;

use crate::Result;

/// Raw audio returned by a generation endpoint.
#[derive(Clone, PartialEq)]
pub struct Audio {
    pub data: Bytes,
    /// Output format the audio was requested in, e.g. `mp3_44100_128`.
    pub format: String,
    pub voice_id: Option<String>,
    pub text: Option<String>,
    pub model_id: Option<String>,
}

impl Audio {
    pub fn new(data: impl Into<Bytes>, format: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            format: format.into(),
            voice_id: None,
            text: None,
            model_id: None,
        }
    }

    pub fn with_voice_id(mut self, voice_id: impl Into<String>) -> Self {
        self.voice_id = Some(voice_id.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_model_id(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = Some(model_id.into());
        self
    }

    pub fn bytes(&self) -> usize {
        self.data.len()
    }

    pub fn kilobytes(&self) -> f64 {
        self.data.len() as f64 / 1024.0
    }

    pub fn content_type(&self) -> &'static str {
        match self.codec() {
            Some("mp3") => "audio/mpeg",
            Some("pcm") => "audio/pcm",
            Some("ogg") => "audio/ogg",
            Some("wav") => "audio/wav",
            Some("flac") => "audio/flac",
            _ => "application/octet-stream",
        }
    }

    pub fn extension(&self) -> &'static str {
        self.codec().unwrap_or("bin")
    }

    fn codec(&self) -> Option<&'static str> {
        ["mp3", "pcm", "ogg", "wav", "flac"]
            .into_iter()
            .find(|c| self.format.contains(c))
    }

    /// Characters in the source text (zero when there was none).
    pub fn character_count(&self) -> usize {
        self.text.as_deref().map_or(0, |t| t.chars().count())
    }

    pub fn is_present(&self) -> bool {
        !self.data.is_empty()
    }

    /// Write the audio to `path`, returning the path written.
    pub async fn save_to_file(&self, path: impl AsRef<Path>) -> Result<PathBuf> {
        let path = path.as_ref();
        tokio::fs::write(path, &self.data).await?;
        Ok(path.to_path_buf())
    }
}

impl fmt::Debug for Audio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Audio")
            .field("format", &self.format)
            .field("bytes", &self.bytes())
            .field("voice_id", &self.voice_id)
            .finish()
    }
}

/// Approximate USD price per 1000 characters by model.
const COST_PER_1K_CHARS: &[(&str, f64)] = &[
    ("eleven_monolingual_v1", 0.30),
    ("eleven_multilingual_v1", 0.30),
    ("eleven_multilingual_v2", 0.30),
    ("eleven_turbo_v2", 0.18),
    ("eleven_turbo_v2_5", 0.18),
    ("eleven_english_sts_v2", 0.30),
    ("eleven_flash_v2", 0.10),
    ("eleven_flash_v2_5", 0.10),
];

pub const DEFAULT_COST_PER_1K: f64 = 0.30;

/// Estimated cost of one generation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostInfo {
    pub character_count: usize,
    pub voice_id: Option<String>,
    pub model_id: Option<String>,
    pub estimated_cost: f64,
    pub cost_per_character: f64,
}

impl CostInfo {
    pub fn new(text: &str, voice_id: Option<&str>, model_id: Option<&str>) -> Self {
        let character_count = text.chars().count();
        let rate = rate_for(model_id);
        let estimated_cost = (character_count as f64 / 1000.0 * rate * 10_000.0).round() / 10_000.0;
        Self {
            character_count,
            voice_id: voice_id.map(str::to_string),
            model_id: model_id.map(str::to_string),
            estimated_cost,
            cost_per_character: rate / 1000.0,
        }
    }

    /// Turbo and flash models bill at a reduced rate.
    pub fn is_turbo_model(&self) -> bool {
        self.model_id
            .as_deref()
            .is_some_and(|m| m.contains("turbo") || m.contains("flash"))
    }
}

fn rate_for(model_id: Option<&str>) -> f64 {
    model_id
        .and_then(|m| COST_PER_1K_CHARS.iter().find(|(id, _)| *id == m))
        .map_or(DEFAULT_COST_PER_1K, |(_, rate)| *rate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn audio_metadata_follows_format() {
        let audio = Audio::new(Bytes::from_static(b"audio data"), "mp3_44100_128")
            .with_voice_id("voice123")
            .with_text("Hello world");
        assert_eq!(audio.bytes(), 10);
        assert_eq!(audio.content_type(), "audio/mpeg");
        assert_eq!(audio.extension(), "mp3");
        assert_eq!(audio.character_count(), 11);
        assert!(audio.is_present());

        let raw = Audio::new(Bytes::new(), "ulaw_8000");
        assert_eq!(raw.content_type(), "application/octet-stream");
        assert_eq!(raw.extension(), "bin");
        assert!(!raw.is_present());
    }

    #[test]
    fn cost_uses_model_rate_or_default() {
        let turbo = CostInfo::new(&"a".repeat(1500), Some("v"), Some("eleven_turbo_v2_5"));
        assert_eq!(turbo.estimated_cost, 0.27);
        assert!(turbo.is_turbo_model());

        let unknown = CostInfo::new("abc", None, Some("mystery"));
        assert_eq!(unknown.estimated_cost, 0.0009);
        assert!(!unknown.is_turbo_model());
        assert_eq!(unknown.cost_per_character, 0.0003);
    }

    #[tokio::test]
    async fn save_to_file_writes_bytes() {
        let dir = std::env::temp_dir().join(format!("eleven-rs-{}", uuid::Uuid::new_v4()));
        tokio::fs::create_dir_all(&dir).await.unwrap();
        let path = dir.join("out.mp3");
        let audio = Audio::new(Bytes::from_static(b"xyz"), "mp3_44100_128");
        let written = audio.save_to_file(&path).await.unwrap();
        assert_eq!(tokio::fs::read(&written).await.unwrap(), b"xyz");
        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }
}
