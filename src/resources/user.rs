use crate::transport::HttpTransport;
use crate::types::{CharacterUsage, Subscription, UserInfo};
use crate::Result;

/// Account and subscription reads (`/user`).
#[derive(Debug, Clone, Copy)]
pub struct User<'a> {
    transport: &'a HttpTransport,
}

impl<'a> User<'a> {
    pub(crate) fn new(transport: &'a HttpTransport) -> Self {
        Self { transport }
    }

    pub async fn subscription(&self) -> Result<Subscription> {
        let response = self.transport.get("/user/subscription", Vec::new()).await?;
        Ok(serde_json::from_value(response)?)
    }

    pub async fn info(&self) -> Result<UserInfo> {
        let response = self.transport.get("/user", Vec::new()).await?;
        Ok(serde_json::from_value(response)?)
    }

    /// Subscription with `voice_slots_used` filled in from a count the caller made.
    pub async fn subscription_with_voice_count(&self, voices_count: u32) -> Result<Subscription> {
        Ok(self.subscription().await?.with_voice_slots_used(voices_count))
    }

    /// `true` when there is no voice limit or `current_voice_count` is below it.
    pub async fn can_add_voice(&self, current_voice_count: u32) -> Result<bool> {
        let sub = self.subscription().await?;
        Ok(sub.voice_limit.map_or(true, |limit| current_voice_count < limit))
    }

    pub async fn character_usage(&self) -> Result<CharacterUsage> {
        Ok(self.subscription().await?.character_usage())
    }
}
