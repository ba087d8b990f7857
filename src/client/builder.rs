use std::time::Duration;

use crate::callbacks::Callbacks;
use crate::client::core::ElevenClient;
use crate::config::ClientConfig;
use crate::Result;

/// Builder for [`ElevenClient`].
///
/// Starts from [`ClientConfig::from_env`], so the API key falls back to
/// `ELEVENLABS_API_KEY` when not set explicitly.
#[derive(Debug, Clone)]
pub struct ElevenClientBuilder {
    config: ClientConfig,
}

impl Default for ElevenClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ElevenClientBuilder {
    pub fn new() -> Self {
        Self {
            config: ClientConfig::from_env(),
        }
    }

    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.config = self.config.with_api_key(api_key);
        self
    }

    /// Override the API base URL (mock servers in tests, proxies).
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config = self.config.with_base_url(base_url);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config = self.config.with_timeout(timeout);
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config = self.config.with_connect_timeout(timeout);
        self
    }

    pub fn max_retries(mut self, n: u32) -> Self {
        self.config = self.config.with_max_retries(n);
        self
    }

    pub fn retry_delay(mut self, delay: Duration) -> Self {
        self.config = self.config.with_retry_delay(delay);
        self
    }

    pub fn retry_statuses(mut self, statuses: impl IntoIterator<Item = u16>) -> Self {
        self.config = self.config.with_retry_statuses(statuses);
        self
    }

    /// Route this client's request logging to `dispatch`.
    pub fn logger(mut self, dispatch: tracing::Dispatch) -> Self {
        self.config = self.config.with_logger(dispatch);
        self
    }

    pub fn callbacks(mut self, callbacks: Callbacks) -> Self {
        self.config = self.config.with_callbacks(callbacks);
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn build(self) -> Result<ElevenClient> {
        ElevenClient::new(self.config)
    }
}
