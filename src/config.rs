//! Client configuration.

use std::collections::BTreeSet;
use std::fmt;
use std::time::Duration;

use serde::Serialize;

use crate::callbacks::Callbacks;
use crate::{Error, Result};

pub const DEFAULT_BASE_URL: &str = "https://api.elevenlabs.io/v1";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);
pub const DEFAULT_RETRY_STATUSES: [u16; 5] = [429, 500, 502, 503, 504];

/// Environment variable consulted by [`ClientConfig::from_env`].
pub const API_KEY_ENV: &str = "ELEVENLABS_API_KEY";

/// Immutable client settings.
///
/// Build it with the `with_*` setters, then hand it to
/// [`ElevenClient::new`](crate::ElevenClient::new). The API key is checked
/// lazily: a client without one can be built, but every request fails fast with
/// [`Error::Configuration`] before touching the network.
#[derive(Clone)]
pub struct ClientConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub max_retries: u32,
    /// Base backoff; attempt `k` waits `retry_delay * k` unless the server sent `retry-after`.
    pub retry_delay: Duration,
    pub retry_statuses: BTreeSet<u16>,
    /// Subscriber that request logging is routed to instead of the global one.
    pub logger: Option<tracing::Dispatch>,
    pub callbacks: Callbacks,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay: DEFAULT_RETRY_DELAY,
            retry_statuses: DEFAULT_RETRY_STATUSES.into_iter().collect(),
            logger: None,
            callbacks: Callbacks::default(),
        }
    }
}

impl ClientConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::default().with_api_key(api_key)
    }

    /// Defaults with the API key taken from `ELEVENLABS_API_KEY`, if set.
    pub fn from_env() -> Self {
        Self {
            api_key: std::env::var(API_KEY_ENV).ok(),
            ..Self::default()
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    pub fn with_retry_statuses(mut self, statuses: impl IntoIterator<Item = u16>) -> Self {
        self.retry_statuses = statuses.into_iter().collect();
        self
    }

    pub fn with_logger(mut self, dispatch: tracing::Dispatch) -> Self {
        self.logger = Some(dispatch);
        self
    }

    pub fn with_callbacks(mut self, callbacks: Callbacks) -> Self {
        self.callbacks = callbacks;
        self
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.is_empty())
    }

    /// Check that the configuration can be used for network calls.
    pub fn validate(&self) -> Result<()> {
        if !self.is_configured() {
            return Err(Error::configuration(format!(
                "API key is required. Set it via ClientConfig::with_api_key or the {} environment variable.",
                API_KEY_ENV
            )));
        }
        url::Url::parse(&self.base_url).map_err(|e| {
            Error::configuration(format!("Invalid base URL '{}': {}", self.base_url, e))
        })?;
        Ok(())
    }

    pub(crate) fn api_key_str(&self) -> &str {
        self.api_key.as_deref().unwrap_or_default()
    }

    /// Serializable view of the settings with the API key redacted.
    pub fn summary(&self) -> ConfigSummary {
        ConfigSummary {
            api_key: self.api_key.as_ref().map(|_| "[REDACTED]"),
            base_url: self.base_url.clone(),
            timeout_secs: self.timeout.as_secs_f64(),
            connect_timeout_secs: self.connect_timeout.as_secs_f64(),
            max_retries: self.max_retries,
            retry_delay_secs: self.retry_delay.as_secs_f64(),
        }
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("connect_timeout", &self.connect_timeout)
            .field("max_retries", &self.max_retries)
            .field("retry_delay", &self.retry_delay)
            .field("retry_statuses", &self.retry_statuses)
            .field("logger", &self.logger.is_some())
            .field("callbacks", &self.callbacks)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfigSummary {
    pub api_key: Option<&'static str>,
    pub base_url: String,
    pub timeout_secs: f64,
    pub connect_timeout_secs: f64,
    pub max_retries: u32,
    pub retry_delay_secs: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_public_api() {
        let config = ClientConfig::new("test-key");
        assert_eq!(config.base_url, "https://api.elevenlabs.io/v1");
        assert_eq!(config.timeout, Duration::from_secs(120));
        assert_eq!(config.connect_timeout, Duration::from_secs(10));
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.retry_delay, Duration::from_secs(1));
        assert_eq!(
            config.retry_statuses.iter().copied().collect::<Vec<_>>(),
            vec![429, 500, 502, 503, 504]
        );
    }

    #[test]
    fn validate_rejects_missing_and_empty_keys() {
        let missing = ClientConfig::default();
        assert!(matches!(missing.validate(), Err(Error::Configuration { .. })));
        assert!(!missing.is_configured());

        let empty = ClientConfig::new("");
        assert!(matches!(empty.validate(), Err(Error::Configuration { .. })));

        let ok = ClientConfig::new("test-key");
        assert!(ok.validate().is_ok());
        assert!(ok.is_configured());
    }

    #[test]
    fn validate_rejects_unparsable_base_url() {
        let config = ClientConfig::new("k").with_base_url("not a url");
        let err = config.validate().unwrap_err();
        assert!(err.message().contains("Invalid base URL"));
    }

    #[test]
    fn summary_and_debug_redact_the_key() {
        let config = ClientConfig::new("secret-key").with_max_retries(5);
        let summary = config.summary();
        assert_eq!(summary.api_key, Some("[REDACTED]"));
        assert_eq!(summary.max_retries, 5);
        assert!(!format!("{:?}", config).contains("secret-key"));
    }
}
