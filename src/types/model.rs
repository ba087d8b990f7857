use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A language a model can speak.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelLanguage {
    pub language_id: String,
    pub name: Option<String>,
}

/// A generation model offered by the service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Model {
    pub model_id: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub can_be_finetuned: bool,
    pub can_do_text_to_speech: bool,
    pub can_do_voice_conversion: bool,
    pub can_use_style: bool,
    pub can_use_speaker_boost: bool,
    pub serves_pro_voices: bool,
    pub token_cost_factor: Option<f64>,
    pub languages: Vec<ModelLanguage>,
    pub max_characters_request_free_user: Option<u64>,
    pub max_characters_request_subscribed_user: Option<u64>,
    pub concurrency_group: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Model {
    pub fn supports_language(&self, language_code: &str) -> bool {
        self.languages.iter().any(|l| l.language_id == language_code)
    }

    pub fn supported_language_codes(&self) -> Vec<&str> {
        self.languages.iter().map(|l| l.language_id.as_str()).collect()
    }

    /// Named multilingual, or speaking more than one language.
    pub fn is_multilingual(&self) -> bool {
        self.name_contains("multilingual") || self.languages.len() > 1
    }

    pub fn is_turbo(&self) -> bool {
        self.name_contains("turbo") || self.model_id.contains("turbo")
    }

    fn name_contains(&self, needle: &str) -> bool {
        self.name
            .as_deref()
            .is_some_and(|n| n.to_lowercase().contains(needle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn language_helpers() {
        let model: Model = serde_json::from_value(json!({
            "model_id": "eleven_turbo_v2_5",
            "name": "Turbo v2.5",
            "can_do_text_to_speech": true,
            "languages": [{"language_id": "en", "name": "English"}, {"language_id": "de"}]
        }))
        .unwrap();
        assert!(model.supports_language("de"));
        assert!(!model.supports_language("fr"));
        assert_eq!(model.supported_language_codes(), vec!["en", "de"]);
        assert!(model.is_multilingual());
        assert!(model.is_turbo());
    }

    #[test]
    fn missing_fields_default() {
        let model: Model = serde_json::from_value(json!({"model_id": "m"})).unwrap();
        assert!(!model.can_do_text_to_speech);
        assert!(!model.is_multilingual());
        assert!(model.supported_language_codes().is_empty());
    }
}
