//! Account voices (`/voices`).

use serde::Serialize;
use serde_json::{Map, Value};

use super::{status_ok, validate_presence};
use crate::callbacks::{VoiceAddedEvent, VoiceDeletedEvent};
use crate::transport::{FilePart, HttpTransport, MultipartBody};
use crate::types::{Voice, VoiceCollection, VoiceSettings};
use crate::{Error, Result};

/// Parameters for cloning a new voice from audio samples.
#[derive(Debug, Clone, Default)]
pub struct VoiceCreate {
    pub name: String,
    pub samples: Vec<FilePart>,
    pub description: Option<String>,
    pub labels: Map<String, Value>,
}

impl VoiceCreate {
    pub fn new(name: impl Into<String>, samples: Vec<FilePart>) -> Self {
        Self {
            name: name.into(),
            samples,
            ..Self::default()
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), Value::String(value.into()));
        self
    }
}

/// Fields to change on an existing voice. Unset fields are left alone.
#[derive(Debug, Clone, Default, Serialize)]
pub struct VoiceUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "labels_as_json")]
    pub labels: Option<Map<String, Value>>,
    #[serde(skip)]
    pub samples: Option<Vec<FilePart>>,
}

// The API takes labels as a JSON-encoded string in both body kinds.
fn labels_as_json<S: serde::Serializer>(
    labels: &Option<Map<String, Value>>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    match labels {
        Some(map) => serializer.serialize_str(&Value::Object(map.clone()).to_string()),
        None => serializer.serialize_none(),
    }
}

impl VoiceUpdate {
    fn to_multipart(&self, samples: &[FilePart]) -> MultipartBody {
        MultipartBody::new()
            .text_opt("name", self.name.clone())
            .text_opt("description", self.description.clone())
            .text_opt(
                "labels",
                self.labels.as_ref().map(|l| Value::Object(l.clone()).to_string()),
            )
            .files(samples.iter().cloned())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Voices<'a> {
    transport: &'a HttpTransport,
}

impl<'a> Voices<'a> {
    pub(crate) fn new(transport: &'a HttpTransport) -> Self {
        Self { transport }
    }

    pub async fn list(&self) -> Result<VoiceCollection> {
        let response = self.transport.get("/voices", Vec::new()).await?;
        VoiceCollection::from_value(response)
    }

    pub async fn get(&self, voice_id: &str) -> Result<Voice> {
        validate_presence(voice_id, "voice_id")?;
        let response = self
            .transport
            .get(&format!("/voices/{}", voice_id), Vec::new())
            .await?;
        Ok(serde_json::from_value(response)?)
    }

    /// Delete a voice from the account. `true` when the server confirms.
    pub async fn delete(&self, voice_id: &str) -> Result<bool> {
        validate_presence(voice_id, "voice_id")?;
        let response = self.transport.delete(&format!("/voices/{}", voice_id)).await?;
        self.transport
            .config()
            .callbacks
            .emit_voice_deleted(&VoiceDeletedEvent { voice_id });
        Ok(status_ok(&response))
    }

    /// Clone a voice from one or more audio samples.
    pub async fn create(&self, params: VoiceCreate) -> Result<Voice> {
        validate_presence(&params.name, "name")?;
        if params.samples.is_empty() {
            return Err(Error::validation("samples must contain at least one file"));
        }

        let mut body = MultipartBody::new()
            .text("name", params.name.clone())
            .text_opt("description", params.description.clone())
            .files(params.samples);
        if !params.labels.is_empty() {
            body = body.text("labels", Value::Object(params.labels).to_string());
        }

        let response = self.transport.post_multipart("/voices/add", body).await?;
        self.transport
            .config()
            .callbacks
            .emit_voice_added(&VoiceAddedEvent {
                voice_id: response.get("voice_id").and_then(Value::as_str),
                name: &params.name,
            });

        let mut voice: Voice = serde_json::from_value(response)?;
        if voice.name.is_none() {
            voice.name = Some(params.name);
        }
        Ok(voice)
    }

    /// Edit a voice. Sends multipart only when new samples are attached.
    pub async fn update(&self, voice_id: &str, update: VoiceUpdate) -> Result<Voice> {
        validate_presence(voice_id, "voice_id")?;
        let path = format!("/voices/{}/edit", voice_id);
        let response = match &update.samples {
            Some(samples) => {
                self.transport
                    .post_multipart(&path, update.to_multipart(samples))
                    .await?
            }
            None => {
                self.transport
                    .post_json(&path, serde_json::to_value(&update)?)
                    .await?
            }
        };
        Ok(serde_json::from_value(response)?)
    }

    pub async fn default_settings(&self) -> Result<VoiceSettings> {
        let response = self
            .transport
            .get("/voices/settings/default", Vec::new())
            .await?;
        Ok(serde_json::from_value(response)?)
    }

    pub async fn settings(&self, voice_id: &str) -> Result<VoiceSettings> {
        validate_presence(voice_id, "voice_id")?;
        let response = self
            .transport
            .get(&format!("/voices/{}/settings", voice_id), Vec::new())
            .await?;
        Ok(serde_json::from_value(response)?)
    }

    pub async fn update_settings(&self, voice_id: &str, settings: &VoiceSettings) -> Result<bool> {
        validate_presence(voice_id, "voice_id")?;
        let response = self
            .transport
            .post_json(
                &format!("/voices/{}/settings/edit", voice_id),
                serde_json::to_value(settings)?,
            )
            .await?;
        Ok(status_ok(&response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn update_body_omits_unset_fields_and_encodes_labels() {
        let mut labels = Map::new();
        labels.insert("accent".into(), json!("irish"));
        let update = VoiceUpdate {
            name: Some("New".into()),
            labels: Some(labels),
            ..VoiceUpdate::default()
        };
        assert_eq!(
            serde_json::to_value(&update).unwrap(),
            json!({"name": "New", "labels": "{\"accent\":\"irish\"}"})
        );
    }

    #[test]
    fn update_multipart_carries_indexed_samples() {
        let update = VoiceUpdate {
            description: Some("calm".into()),
            ..VoiceUpdate::default()
        };
        let body = update.to_multipart(&[FilePart::new("s.mp3", &b"1"[..])]);
        assert_eq!(body.field_names(), vec!["description", "files[0]"]);
    }
}
