//! Voice records: account voices, shared-library voices, and voice settings.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::Result;

/// Generation settings for a voice.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stability: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub similarity_boost: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_speaker_boost: Option<bool>,
}

impl VoiceSettings {
    /// Settings applied to text-to-speech requests when the caller sets nothing.
    pub fn defaults() -> Self {
        Self {
            stability: Some(0.5),
            similarity_boost: Some(0.75),
            style: Some(0.0),
            use_speaker_boost: Some(true),
        }
    }

    /// Defaults overridden by every field `overrides` sets.
    pub fn with_defaults(overrides: &VoiceSettings) -> Self {
        let d = Self::defaults();
        Self {
            stability: overrides.stability.or(d.stability),
            similarity_boost: overrides.similarity_boost.or(d.similarity_boost),
            style: overrides.style.or(d.style),
            use_speaker_boost: overrides.use_speaker_boost.or(d.use_speaker_boost),
        }
    }

    pub fn stability(mut self, v: f64) -> Self {
        self.stability = Some(v);
        self
    }

    pub fn similarity_boost(mut self, v: f64) -> Self {
        self.similarity_boost = Some(v);
        self
    }

    pub fn style(mut self, v: f64) -> Self {
        self.style = Some(v);
        self
    }

    pub fn use_speaker_boost(mut self, v: bool) -> Self {
        self.use_speaker_boost = Some(v);
        self
    }
}

/// A voice provisioned in the account.
///
/// A snapshot of server state at fetch time; changes only flow back through the
/// explicit add/remove operations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Voice {
    pub voice_id: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub preview_url: Option<String>,
    pub labels: Option<Map<String, Value>>,
    pub settings: Option<VoiceSettings>,
    pub samples: Option<Value>,
    pub sharing: Option<Value>,
    pub high_quality_base_model_ids: Option<Vec<String>>,
    pub safety_control: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Voice {
    /// Minimal record for a voice known only by id and name.
    pub fn new(voice_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            voice_id: voice_id.into(),
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn label(&self, key: &str) -> Option<&str> {
        self.labels.as_ref()?.get(key)?.as_str()
    }

    pub fn gender(&self) -> Option<&str> {
        self.label("gender")
    }

    pub fn accent(&self) -> Option<&str> {
        self.label("accent")
    }

    pub fn language(&self) -> Option<&str> {
        self.label("language")
    }

    pub fn age(&self) -> Option<&str> {
        self.label("age")
    }

    pub fn use_case(&self) -> Option<&str> {
        self.label("use_case")
    }

    pub fn is_banned(&self) -> bool {
        self.safety_control.as_deref() == Some("BAN")
    }

    /// `"Name (gender) - accent"`, omitting whatever is unknown.
    pub fn display_name(&self) -> String {
        display_name(
            self.name.as_deref(),
            self.gender(),
            self.accent().or(self.language()),
        )
    }
}

fn display_name(name: Option<&str>, gender: Option<&str>, region: Option<&str>) -> String {
    let mut parts = vec![name.unwrap_or_default().to_string()];
    if let Some(g) = gender {
        parts.push(format!("({})", g));
    }
    if let Some(r) = region {
        parts.push(format!("- {}", r));
    }
    parts.join(" ")
}

/// Voices in the account, in the order the server listed them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VoiceCollection {
    voices: Vec<Voice>,
}

impl VoiceCollection {
    pub fn new(voices: Vec<Voice>) -> Self {
        Self { voices }
    }

    /// Parse either `{"voices": [...]}` or a bare array.
    pub fn from_value(value: Value) -> Result<Self> {
        let list = match value {
            Value::Object(mut obj) => obj.remove("voices").unwrap_or(Value::Array(Vec::new())),
            Value::Null => Value::Array(Vec::new()),
            other => other,
        };
        Ok(Self::new(serde_json::from_value(list)?))
    }

    pub fn len(&self) -> usize {
        self.voices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.voices.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Voice> {
        self.voices.iter()
    }

    pub fn first(&self) -> Option<&Voice> {
        self.voices.first()
    }

    pub fn find_by_id(&self, voice_id: &str) -> Option<&Voice> {
        self.voices.iter().find(|v| v.voice_id == voice_id)
    }

    /// Case-insensitive name lookup.
    pub fn find_by_name(&self, name: &str) -> Option<&Voice> {
        self.voices
            .iter()
            .find(|v| v.name.as_deref().is_some_and(|n| n.eq_ignore_ascii_case(name)))
    }

    pub fn by_gender(&self, gender: &str) -> Vec<&Voice> {
        self.filter(|v| v.gender().is_some_and(|g| g.eq_ignore_ascii_case(gender)))
    }

    pub fn by_language(&self, language: &str) -> Vec<&Voice> {
        self.filter(|v| v.language().is_some_and(|l| l.eq_ignore_ascii_case(language)))
    }

    /// Substring match, case-insensitive.
    pub fn by_accent(&self, accent: &str) -> Vec<&Voice> {
        let needle = accent.to_lowercase();
        self.filter(|v| v.accent().is_some_and(|a| a.to_lowercase().contains(&needle)))
    }

    pub fn by_category(&self, category: &str) -> Vec<&Voice> {
        self.filter(|v| {
            v.category
                .as_deref()
                .is_some_and(|c| c.eq_ignore_ascii_case(category))
        })
    }

    pub fn voice_ids(&self) -> Vec<&str> {
        self.voices.iter().map(|v| v.voice_id.as_str()).collect()
    }

    pub fn contains_voice(&self, voice_id: &str) -> bool {
        self.find_by_id(voice_id).is_some()
    }

    pub fn into_vec(self) -> Vec<Voice> {
        self.voices
    }

    fn filter(&self, pred: impl Fn(&Voice) -> bool) -> Vec<&Voice> {
        self.voices.iter().filter(|v| pred(v)).collect()
    }
}

impl IntoIterator for VoiceCollection {
    type Item = Voice;
    type IntoIter = std::vec::IntoIter<Voice>;

    fn into_iter(self) -> Self::IntoIter {
        self.voices.into_iter()
    }
}

impl<'a> IntoIterator for &'a VoiceCollection {
    type Item = &'a Voice;
    type IntoIter = std::slice::Iter<'a, Voice>;

    fn into_iter(self) -> Self::IntoIter {
        self.voices.iter()
    }
}

/// What it takes to copy a shared-library voice into the account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryVoiceRef {
    pub public_user_id: String,
    pub voice_id: String,
    pub name: String,
}

impl LibraryVoiceRef {
    pub fn new(
        public_user_id: impl Into<String>,
        voice_id: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            public_user_id: public_user_id.into(),
            voice_id: voice_id.into(),
            name: name.into(),
        }
    }
}

/// A voice in the shared library.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LibraryVoice {
    pub voice_id: String,
    pub public_owner_id: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub preview_url: Option<String>,
    pub gender: Option<String>,
    pub age: Option<String>,
    pub accent: Option<String>,
    pub language: Option<String>,
    pub locale: Option<String>,
    pub use_cases: Option<Value>,
    pub notice_period: Option<i64>,
    pub rate: Option<f64>,
    pub cloned_by_count: Option<u64>,
    pub usage_character_count_1d: Option<u64>,
    pub usage_character_count_7d: Option<u64>,
    pub usage_character_count_30d: Option<u64>,
    pub free_users_allowed: Option<bool>,
    pub live_moderation_enabled: Option<bool>,
    pub verified: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Usage threshold above which a library voice counts as popular.
pub const POPULAR_THRESHOLD: u64 = 10_000;

impl LibraryVoice {
    /// Parameters for adding this voice to the account under its library name.
    pub fn add_ref(&self) -> LibraryVoiceRef {
        LibraryVoiceRef::new(
            self.public_owner_id.clone(),
            self.voice_id.clone(),
            self.name.clone().unwrap_or_default(),
        )
    }

    pub fn display_name(&self) -> String {
        display_name(
            self.name.as_deref(),
            self.gender.as_deref(),
            self.accent.as_deref().or(self.language.as_deref()),
        )
    }

    pub fn is_popular(&self, threshold: u64) -> bool {
        self.usage_character_count_30d.unwrap_or(0) >= threshold
    }

    /// Unknown counts as allowed.
    pub fn available_for_free(&self) -> bool {
        self.free_users_allowed != Some(false)
    }

    pub fn is_verified(&self) -> bool {
        self.verified.unwrap_or(false)
    }
}

/// One page of shared-library search results.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct LibraryVoicePage {
    pub voices: Vec<LibraryVoice>,
    pub has_more: bool,
    pub last_sort_id: Option<String>,
}

impl LibraryVoicePage {
    pub fn from_value(value: Value) -> Result<Self> {
        if value.is_null() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_value(value)?)
    }

    /// Cursor for the following page.
    pub fn next_cursor(&self) -> Option<&str> {
        self.last_sort_id.as_deref()
    }

    pub fn len(&self) -> usize {
        self.voices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.voices.is_empty()
    }

    pub fn find_by_id(&self, voice_id: &str) -> Option<&LibraryVoice> {
        self.voices.iter().find(|v| v.voice_id == voice_id)
    }

    pub fn find_by_name(&self, name: &str) -> Option<&LibraryVoice> {
        self.voices
            .iter()
            .find(|v| v.name.as_deref().is_some_and(|n| n.eq_ignore_ascii_case(name)))
    }

    pub fn by_gender(&self, gender: &str) -> Vec<&LibraryVoice> {
        self.voices
            .iter()
            .filter(|v| v.gender.as_deref().is_some_and(|g| g.eq_ignore_ascii_case(gender)))
            .collect()
    }

    pub fn by_language(&self, language: &str) -> Vec<&LibraryVoice> {
        self.voices
            .iter()
            .filter(|v| {
                v.language
                    .as_deref()
                    .is_some_and(|l| l.eq_ignore_ascii_case(language))
            })
            .collect()
    }

    pub fn by_accent(&self, accent: &str) -> Vec<&LibraryVoice> {
        let needle = accent.to_lowercase();
        self.voices
            .iter()
            .filter(|v| {
                v.accent
                    .as_deref()
                    .is_some_and(|a| a.to_lowercase().contains(&needle))
            })
            .collect()
    }

    pub fn popular(&self, threshold: u64) -> Vec<&LibraryVoice> {
        self.voices.iter().filter(|v| v.is_popular(threshold)).collect()
    }

    pub fn free_tier(&self) -> Vec<&LibraryVoice> {
        self.voices.iter().filter(|v| v.available_for_free()).collect()
    }

    pub fn verified(&self) -> Vec<&LibraryVoice> {
        self.voices.iter().filter(|v| v.is_verified()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn voice_labels_drive_accessors() {
        let voice: Voice = serde_json::from_value(json!({
            "voice_id": "v1",
            "name": "Rachel",
            "labels": {"gender": "female", "accent": "american", "age": "young"},
            "safety_control": "BAN",
            "fine_tuning": {"state": "done"}
        }))
        .unwrap();
        assert_eq!(voice.gender(), Some("female"));
        assert_eq!(voice.age(), Some("young"));
        assert_eq!(voice.language(), None);
        assert!(voice.is_banned());
        assert_eq!(voice.display_name(), "Rachel (female) - american");
        assert!(voice.extra.contains_key("fine_tuning"));
    }

    #[test]
    fn collection_accepts_wrapped_or_bare_lists() {
        let wrapped = VoiceCollection::from_value(json!({"voices": [{"voice_id": "a"}]})).unwrap();
        let bare = VoiceCollection::from_value(json!([{"voice_id": "a"}, {"voice_id": "b"}])).unwrap();
        assert_eq!(wrapped.voice_ids(), vec!["a"]);
        assert_eq!(bare.len(), 2);
        assert!(bare.contains_voice("b"));
        assert!(VoiceCollection::from_value(json!({})).unwrap().is_empty());
    }

    #[test]
    fn collection_filters_are_case_insensitive() {
        let voices = VoiceCollection::from_value(json!([
            {"voice_id": "a", "name": "Ana", "category": "premade", "labels": {"accent": "British English"}},
            {"voice_id": "b", "name": "Ben", "category": "cloned", "labels": {"language": "es"}}
        ]))
        .unwrap();
        assert_eq!(voices.find_by_name("ana").map(|v| v.voice_id.as_str()), Some("a"));
        assert_eq!(voices.by_accent("british").len(), 1);
        assert_eq!(voices.by_language("ES").len(), 1);
        assert_eq!(voices.by_category("Cloned")[0].voice_id, "b");
    }

    #[test]
    fn settings_overrides_merge_onto_defaults() {
        let merged = VoiceSettings::with_defaults(&VoiceSettings::default().stability(0.9));
        assert_eq!(merged.stability, Some(0.9));
        assert_eq!(merged.similarity_boost, Some(0.75));
        assert_eq!(merged.use_speaker_boost, Some(true));
        let body = serde_json::to_value(VoiceSettings::default().style(0.2)).unwrap();
        assert_eq!(body, json!({"style": 0.2}));
    }

    #[test]
    fn library_page_exposes_cursor_and_filters() {
        let page = LibraryVoicePage::from_value(json!({
            "voices": [
                {"voice_id": "x", "public_owner_id": "o1", "name": "Xi", "usage_character_count_30d": 20000, "verified": true},
                {"voice_id": "y", "public_owner_id": "o2", "name": "Yo", "free_users_allowed": false}
            ],
            "has_more": true,
            "last_sort_id": "cursor-2"
        }))
        .unwrap();
        assert!(page.has_more);
        assert_eq!(page.next_cursor(), Some("cursor-2"));
        assert_eq!(page.popular(POPULAR_THRESHOLD).len(), 1);
        assert_eq!(page.free_tier().len(), 1);
        assert_eq!(page.verified()[0].voice_id, "x");
        assert_eq!(
            page.voices[0].add_ref(),
            LibraryVoiceRef::new("o1", "x", "Xi")
        );
    }
}
