//! In-process last-used timestamps for account voices.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::types::Voice;

/// Voice id to last-used time.
///
/// Lives only in memory and starts empty in every process. Voices that were
/// never tracked sort as if last used at the Unix epoch.
#[derive(Debug, Default)]
pub struct UsageTracker {
    entries: Mutex<HashMap<String, SystemTime>>,
}

impl UsageTracker {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, SystemTime>> {
        // Entries are plain timestamps; a panic mid-write cannot leave them torn.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record `voice_id` as used now.
    pub fn track(&self, voice_id: &str) -> SystemTime {
        let now = SystemTime::now();
        self.track_at(voice_id, now);
        now
    }

    pub fn track_at(&self, voice_id: &str, at: SystemTime) {
        self.lock().insert(voice_id.to_string(), at);
    }

    pub fn last_used(&self, voice_id: &str) -> Option<SystemTime> {
        self.lock().get(voice_id).copied()
    }

    /// Drop the entry for `voice_id`. `true` if one existed.
    pub fn forget(&self, voice_id: &str) -> bool {
        self.lock().remove(voice_id).is_some()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn contains(&self, voice_id: &str) -> bool {
        self.lock().contains_key(voice_id)
    }

    /// Copy of all entries, e.g. for persisting outside the process.
    pub fn snapshot(&self) -> HashMap<String, SystemTime> {
        self.lock().clone()
    }

    /// Oldest first. Equal timestamps keep their input order.
    pub fn sort_by_usage(&self, mut voices: Vec<Voice>) -> Vec<Voice> {
        let entries = self.lock();
        voices.sort_by_key(|v| entries.get(&v.voice_id).copied().unwrap_or(UNIX_EPOCH));
        voices
    }
}
