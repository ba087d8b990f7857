use std::sync::Arc;
use std::time::SystemTime;

use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::backend::VoiceSlotBackend;
use super::tracker::UsageTracker;
use crate::types::{LibraryVoiceRef, Voice, VoiceCollection};
use crate::{Error, Result};

/// Slot occupancy at the moment it was read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SlotStatus {
    pub used: usize,
    pub limit: Option<u32>,
    /// `limit - used`, treating an unknown limit as 0. Negative when over capacity.
    pub available: i64,
    /// Never true without a known limit.
    pub full: bool,
}

impl SlotStatus {
    pub fn new(used: usize, limit: Option<u32>) -> Self {
        let limit_n = i64::from(limit.unwrap_or(0));
        Self {
            used,
            limit,
            available: limit_n - used as i64,
            full: limit.map_or(false, |l| used as i64 >= i64::from(l)),
        }
    }
}

/// Keeps requested library voices present in a capacity-limited account,
/// evicting the least recently used voice when the account is full.
///
/// Add and remove are billable remote writes. `ensure_available` is not
/// transactional: if the add fails after an eviction, the slot stays empty.
///
/// Mutating operations hold a per-manager lock, so concurrent tasks sharing a
/// manager (or clones of it) cannot double-evict. Separate managers against the
/// same account are not coordinated.
pub struct VoiceSlotManager<B> {
    backend: B,
    tracker: Arc<UsageTracker>,
    write_guard: Arc<Mutex<()>>,
}

impl<B: Clone> Clone for VoiceSlotManager<B> {
    fn clone(&self) -> Self {
        Self {
            backend: self.backend.clone(),
            tracker: self.tracker.clone(),
            write_guard: self.write_guard.clone(),
        }
    }
}

impl<B: VoiceSlotBackend> VoiceSlotManager<B> {
    pub fn new(backend: B) -> Self {
        Self::with_state(backend, Arc::new(UsageTracker::new()), Arc::new(Mutex::new(())))
    }

    pub(crate) fn with_state(backend: B, tracker: Arc<UsageTracker>, write_guard: Arc<Mutex<()>>) -> Self {
        Self {
            backend,
            tracker,
            write_guard,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn tracker(&self) -> &UsageTracker {
        &self.tracker
    }

    /// Make sure `voice_id` is in the account, adding it from the library if not.
    ///
    /// A voice already present is only marked used; no write is issued.
    pub async fn ensure_available(&self, public_user_id: &str, voice_id: &str, name: &str) -> Result<Voice> {
        let _guard = self.write_guard.lock().await;

        let voices = self.backend.list_voices().await?;
        if let Some(existing) = voices.find_by_id(voice_id) {
            self.tracker.track(&existing.voice_id);
            debug!(voice_id, "voice already in account");
            return Ok(existing.clone());
        }

        let status = SlotStatus::new(voices.len(), self.backend.voice_limit().await?);
        if status.full {
            debug!(used = status.used, limit = ?status.limit, "account full, evicting");
            self.evict_lru(voices).await?;
        }

        let voice = self
            .backend
            .add_library_voice(public_user_id, voice_id, name)
            .await?;
        self.tracker.track(&voice.voice_id);
        info!(voice_id = %voice.voice_id, "voice added to account");
        Ok(voice)
    }

    /// Run [`ensure_available`](Self::ensure_available) for each entry in order,
    /// stopping at the first failure. Earlier entries are not rolled back.
    pub async fn prepare_voices(&self, voices: &[LibraryVoiceRef]) -> Result<Vec<Voice>> {
        let mut prepared = Vec::with_capacity(voices.len());
        for v in voices {
            prepared.push(
                self.ensure_available(&v.public_user_id, &v.voice_id, &v.name)
                    .await?,
            );
        }
        Ok(prepared)
    }

    pub async fn status(&self) -> Result<SlotStatus> {
        let used = self.backend.list_voices().await?.len();
        let limit = self.backend.voice_limit().await?;
        Ok(SlotStatus::new(used, limit))
    }

    pub async fn current_count(&self) -> Result<usize> {
        Ok(self.backend.list_voices().await?.len())
    }

    pub async fn available_slots(&self) -> Result<i64> {
        Ok(self.status().await?.available)
    }

    pub async fn is_full(&self) -> Result<bool> {
        Ok(self.status().await?.full)
    }

    pub fn track_usage(&self, voice_id: &str) -> SystemTime {
        self.tracker.track(voice_id)
    }

    pub fn track_usage_at(&self, voice_id: &str, at: SystemTime) {
        self.tracker.track_at(voice_id, at)
    }

    pub fn last_used(&self, voice_id: &str) -> Option<SystemTime> {
        self.tracker.last_used(voice_id)
    }

    pub fn reset_tracking(&self) {
        self.tracker.clear()
    }

    /// Account voices, least recently used first.
    pub async fn voices_by_usage(&self) -> Result<Vec<Voice>> {
        let voices = self.backend.list_voices().await?;
        Ok(self.tracker.sort_by_usage(voices.into_vec()))
    }

    pub async fn least_recently_used(&self) -> Result<Option<Voice>> {
        Ok(self.voices_by_usage().await?.into_iter().next())
    }

    /// Evict the least recently used voice and return it.
    pub async fn remove_lru(&self) -> Result<Voice> {
        let _guard = self.write_guard.lock().await;
        let voices = self.backend.list_voices().await?;
        self.evict_lru(voices).await
    }

    /// Remove a voice. Its tracking entry is dropped only if the remote confirms.
    pub async fn remove(&self, voice_id: &str) -> Result<bool> {
        let _guard = self.write_guard.lock().await;
        let removed = self.backend.remove_voice(voice_id).await?;
        if removed {
            self.tracker.forget(voice_id);
        }
        Ok(removed)
    }

    pub async fn in_account(&self, voice_id: &str) -> Result<bool> {
        Ok(self.backend.list_voices().await?.contains_voice(voice_id))
    }

    pub async fn find_in_account(&self, voice_id: &str) -> Result<Option<Voice>> {
        Ok(self.backend.list_voices().await?.find_by_id(voice_id).cloned())
    }

    // Caller holds the write guard.
    async fn evict_lru(&self, voices: VoiceCollection) -> Result<Voice> {
        let lru = self
            .tracker
            .sort_by_usage(voices.into_vec())
            .into_iter()
            .next()
            .ok_or_else(|| Error::voice_slot_limit("No voices available to remove"))?;

        self.backend.remove_voice(&lru.voice_id).await?;
        self.tracker.forget(&lru.voice_id);
        info!(voice_id = %lru.voice_id, "evicted least recently used voice");
        Ok(lru)
    }
}
