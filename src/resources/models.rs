//! Available models (`/models`).

use serde_json::Value;

use crate::transport::HttpTransport;
use crate::types::Model;
use crate::Result;

use super::text_to_speech::DEFAULT_MODEL;

#[derive(Debug, Clone, Copy)]
pub struct Models<'a> {
    transport: &'a HttpTransport,
}

impl<'a> Models<'a> {
    pub(crate) fn new(transport: &'a HttpTransport) -> Self {
        Self { transport }
    }

    pub async fn list(&self) -> Result<Vec<Model>> {
        let response = self.transport.get("/models", Vec::new()).await?;
        match response {
            Value::Array(_) => Ok(serde_json::from_value(response)?),
            // An empty body parses to `{}`.
            _ => Ok(Vec::new()),
        }
    }

    /// Look a model up by id. There is no per-model endpoint, so this lists.
    pub async fn get(&self, model_id: &str) -> Result<Option<Model>> {
        Ok(self.list().await?.into_iter().find(|m| m.model_id == model_id))
    }

    pub async fn multilingual(&self) -> Result<Vec<Model>> {
        self.filtered(Model::is_multilingual).await
    }

    pub async fn turbo(&self) -> Result<Vec<Model>> {
        self.filtered(Model::is_turbo).await
    }

    pub async fn tts_capable(&self) -> Result<Vec<Model>> {
        self.filtered(|m| m.can_do_text_to_speech).await
    }

    /// `eleven_multilingual_v2` when offered, else the first TTS-capable model.
    pub async fn default_model(&self) -> Result<Option<Model>> {
        let models = self.list().await?;
        let preferred = models.iter().position(|m| m.model_id == DEFAULT_MODEL);
        let fallback = models.iter().position(|m| m.can_do_text_to_speech);
        Ok(preferred.or(fallback).map(|i| models[i].clone()))
    }

    pub async fn ids(&self) -> Result<Vec<String>> {
        Ok(self.list().await?.into_iter().map(|m| m.model_id).collect())
    }

    async fn filtered(&self, pred: impl Fn(&Model) -> bool) -> Result<Vec<Model>> {
        Ok(self.list().await?.into_iter().filter(|m| pred(m)).collect())
    }
}
