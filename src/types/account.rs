//! Account records: subscription and user profile.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Subscription {
    pub tier: Option<String>,
    pub character_count: Option<u64>,
    pub character_limit: Option<u64>,
    pub voice_limit: Option<u32>,
    pub professional_voice_limit: Option<u32>,
    pub can_extend_character_limit: bool,
    pub allowed_to_extend_character_limit: bool,
    pub next_character_count_reset_unix: Option<u64>,
    pub can_extend_voice_limit: bool,
    pub can_use_instant_voice_cloning: bool,
    pub can_use_professional_voice_cloning: bool,
    pub currency: Option<String>,
    pub status: Option<String>,
    /// Voices currently in the account. Not returned by the API; filled in by
    /// callers that counted them separately.
    #[serde(skip)]
    pub voice_slots_used: Option<u32>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Subscription {
    pub fn with_voice_slots_used(mut self, used: u32) -> Self {
        self.voice_slots_used = Some(used);
        self
    }

    /// `None` until both the limit and the used count are known.
    pub fn voice_slots_available(&self) -> Option<i64> {
        Some(i64::from(self.voice_limit?) - i64::from(self.voice_slots_used?))
    }

    pub fn voice_slots_full(&self) -> bool {
        self.voice_slots_available().is_some_and(|n| n <= 0)
    }

    pub fn characters_remaining(&self) -> i64 {
        match (self.character_limit, self.character_count) {
            (Some(limit), Some(count)) => limit as i64 - count as i64,
            _ => 0,
        }
    }

    /// Percentage of the character quota used, to one decimal place.
    pub fn characters_used_percentage(&self) -> f64 {
        match self.character_limit {
            Some(limit) if limit > 0 => {
                let pct = self.character_count.unwrap_or(0) as f64 / limit as f64 * 100.0;
                (pct * 10.0).round() / 10.0
            }
            _ => 0.0,
        }
    }

    pub fn next_reset_at(&self) -> Option<SystemTime> {
        self.next_character_count_reset_unix
            .map(|secs| UNIX_EPOCH + Duration::from_secs(secs))
    }

    pub fn is_active(&self) -> bool {
        self.status.as_deref() == Some("active")
    }

    pub fn is_free(&self) -> bool {
        self.tier
            .as_deref()
            .is_some_and(|t| t.eq_ignore_ascii_case("free"))
    }

    pub fn character_usage(&self) -> CharacterUsage {
        CharacterUsage {
            used: self.character_count,
            limit: self.character_limit,
            remaining: self.characters_remaining(),
            percentage: self.characters_used_percentage(),
            resets_at_unix: self.next_character_count_reset_unix,
        }
    }
}

/// Character quota summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CharacterUsage {
    pub used: Option<u64>,
    pub limit: Option<u64>,
    pub remaining: i64,
    pub percentage: f64,
    pub resets_at_unix: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserInfo {
    pub user_id: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub is_new_user: bool,
    pub xi_api_key: Option<String>,
    pub can_use_delayed_payment_methods: bool,
    pub is_onboarding_completed: bool,
    pub is_onboarding_checklist_completed: bool,
    pub subscription: Option<Subscription>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UserInfo {
    /// First name, else the local part of the email, else `"User"`.
    pub fn display_name(&self) -> String {
        self.first_name
            .clone()
            .or_else(|| {
                self.email
                    .as_deref()
                    .and_then(|e| e.split('@').next())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| "User".to_string())
    }
}
