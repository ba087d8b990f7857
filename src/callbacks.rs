//! Event hooks.
//!
//! A fixed set of optional handlers, bound on [`ClientConfig`](crate::ClientConfig)
//! at construction. Dispatch calls zero or one handler per event and never lets a
//! handler failure reach the caller: an `Err` or a panic is logged as a warning and
//! dropped.

use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::warn;

use crate::types::{Audio, CostInfo};
use crate::Error;

/// Return type of every event handler.
pub type HandlerResult = std::result::Result<(), Box<dyn std::error::Error + Send + Sync>>;

type RequestHandler = Arc<dyn Fn(&RequestEvent<'_>) -> HandlerResult + Send + Sync>;
type ResponseHandler = Arc<dyn Fn(&ResponseEvent<'_>) -> HandlerResult + Send + Sync>;
type ErrorHandler = Arc<dyn Fn(&ErrorEvent<'_>) -> HandlerResult + Send + Sync>;
type AudioGeneratedHandler = Arc<dyn Fn(&AudioGeneratedEvent<'_>) -> HandlerResult + Send + Sync>;
type RetryHandler = Arc<dyn Fn(&RetryEvent<'_>) -> HandlerResult + Send + Sync>;
type RateLimitHandler = Arc<dyn Fn(&RateLimitEvent<'_>) -> HandlerResult + Send + Sync>;
type VoiceAddedHandler = Arc<dyn Fn(&VoiceAddedEvent<'_>) -> HandlerResult + Send + Sync>;
type VoiceDeletedHandler = Arc<dyn Fn(&VoiceDeletedEvent<'_>) -> HandlerResult + Send + Sync>;

/// Emitted before each HTTP attempt.
#[derive(Debug)]
pub struct RequestEvent<'a> {
    pub request_id: &'a str,
    pub method: &'a str,
    pub path: &'a str,
    /// Request body with file payloads replaced by placeholders.
    pub body: Option<&'a Value>,
    pub attempt: u32,
}

/// Emitted for every HTTP response received, whatever its status.
#[derive(Debug)]
pub struct ResponseEvent<'a> {
    pub method: &'a str,
    pub path: &'a str,
    pub status: u16,
    pub duration_ms: f64,
}

/// Emitted when a request fails without being retried.
#[derive(Debug)]
pub struct ErrorEvent<'a> {
    pub error: &'a Error,
    pub method: &'a str,
    pub path: &'a str,
    pub body: Option<&'a Value>,
}

/// Emitted before sleeping ahead of a retry.
#[derive(Debug)]
pub struct RetryEvent<'a> {
    pub error: &'a Error,
    pub attempt: u32,
    pub max_attempts: u32,
    pub delay: Duration,
}

#[derive(Debug)]
pub struct RateLimitEvent<'a> {
    pub retry_after: Option<u64>,
    pub error: &'a Error,
}

/// Emitted after audio generation. `audio` is `None` for streamed output.
#[derive(Debug)]
pub struct AudioGeneratedEvent<'a> {
    pub audio: Option<&'a Audio>,
    pub voice_id: Option<&'a str>,
    pub text: Option<&'a str>,
    pub cost_info: &'a CostInfo,
}

#[derive(Debug)]
pub struct VoiceAddedEvent<'a> {
    pub voice_id: Option<&'a str>,
    pub name: &'a str,
}

#[derive(Debug)]
pub struct VoiceDeletedEvent<'a> {
    pub voice_id: &'a str,
}

/// The full set of optional event handlers.
#[derive(Clone, Default)]
pub struct Callbacks {
    on_request: Option<RequestHandler>,
    on_response: Option<ResponseHandler>,
    on_error: Option<ErrorHandler>,
    on_audio_generated: Option<AudioGeneratedHandler>,
    on_retry: Option<RetryHandler>,
    on_rate_limit: Option<RateLimitHandler>,
    on_voice_added: Option<VoiceAddedHandler>,
    on_voice_deleted: Option<VoiceDeletedHandler>,
}

impl Callbacks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_request<F>(mut self, f: F) -> Self
    where
        F: Fn(&RequestEvent<'_>) -> HandlerResult + Send + Sync + 'static,
    {
        self.on_request = Some(Arc::new(f));
        self
    }

    pub fn on_response<F>(mut self, f: F) -> Self
    where
        F: Fn(&ResponseEvent<'_>) -> HandlerResult + Send + Sync + 'static,
    {
        self.on_response = Some(Arc::new(f));
        self
    }

    pub fn on_error<F>(mut self, f: F) -> Self
    where
        F: Fn(&ErrorEvent<'_>) -> HandlerResult + Send + Sync + 'static,
    {
        self.on_error = Some(Arc::new(f));
        self
    }

    pub fn on_audio_generated<F>(mut self, f: F) -> Self
    where
        F: Fn(&AudioGeneratedEvent<'_>) -> HandlerResult + Send + Sync + 'static,
    {
        self.on_audio_generated = Some(Arc::new(f));
        self
    }

    pub fn on_retry<F>(mut self, f: F) -> Self
    where
        F: Fn(&RetryEvent<'_>) -> HandlerResult + Send + Sync + 'static,
    {
        self.on_retry = Some(Arc::new(f));
        self
    }

    pub fn on_rate_limit<F>(mut self, f: F) -> Self
    where
        F: Fn(&RateLimitEvent<'_>) -> HandlerResult + Send + Sync + 'static,
    {
        self.on_rate_limit = Some(Arc::new(f));
        self
    }

    pub fn on_voice_added<F>(mut self, f: F) -> Self
    where
        F: Fn(&VoiceAddedEvent<'_>) -> HandlerResult + Send + Sync + 'static,
    {
        self.on_voice_added = Some(Arc::new(f));
        self
    }

    pub fn on_voice_deleted<F>(mut self, f: F) -> Self
    where
        F: Fn(&VoiceDeletedEvent<'_>) -> HandlerResult + Send + Sync + 'static,
    {
        self.on_voice_deleted = Some(Arc::new(f));
        self
    }

    pub(crate) fn emit_request(&self, event: &RequestEvent<'_>) {
        if let Some(h) = &self.on_request {
            invoke("on_request", || h(event));
        }
    }

    pub(crate) fn emit_response(&self, event: &ResponseEvent<'_>) {
        if let Some(h) = &self.on_response {
            invoke("on_response", || h(event));
        }
    }

    pub(crate) fn emit_error(&self, event: &ErrorEvent<'_>) {
        if let Some(h) = &self.on_error {
            invoke("on_error", || h(event));
        }
    }

    pub(crate) fn emit_audio_generated(&self, event: &AudioGeneratedEvent<'_>) {
        if let Some(h) = &self.on_audio_generated {
            invoke("on_audio_generated", || h(event));
        }
    }

    pub(crate) fn emit_retry(&self, event: &RetryEvent<'_>) {
        if let Some(h) = &self.on_retry {
            invoke("on_retry", || h(event));
        }
    }

    pub(crate) fn emit_rate_limit(&self, event: &RateLimitEvent<'_>) {
        if let Some(h) = &self.on_rate_limit {
            invoke("on_rate_limit", || h(event));
        }
    }

    pub(crate) fn emit_voice_added(&self, event: &VoiceAddedEvent<'_>) {
        if let Some(h) = &self.on_voice_added {
            invoke("on_voice_added", || h(event));
        }
    }

    pub(crate) fn emit_voice_deleted(&self, event: &VoiceDeletedEvent<'_>) {
        if let Some(h) = &self.on_voice_deleted {
            invoke("on_voice_deleted", || h(event));
        }
    }

    /// Names of the handlers that are bound.
    pub fn registered(&self) -> Vec<&'static str> {
        [
            ("on_request", self.on_request.is_some()),
            ("on_response", self.on_response.is_some()),
            ("on_error", self.on_error.is_some()),
            ("on_audio_generated", self.on_audio_generated.is_some()),
            ("on_retry", self.on_retry.is_some()),
            ("on_rate_limit", self.on_rate_limit.is_some()),
            ("on_voice_added", self.on_voice_added.is_some()),
            ("on_voice_deleted", self.on_voice_deleted.is_some()),
        ]
        .into_iter()
        .filter_map(|(name, set)| set.then_some(name))
        .collect()
    }
}

impl fmt::Debug for Callbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callbacks")
            .field("registered", &self.registered())
            .finish()
    }
}

fn invoke(name: &'static str, call: impl FnOnce() -> HandlerResult) {
    match catch_unwind(AssertUnwindSafe(call)) {
        Ok(Ok(())) => {}
        Ok(Err(e)) => warn!(callback = name, error = %e, "callback error ignored"),
        Err(payload) => {
            let reason = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            warn!(callback = name, panic = %reason, "callback panicked");
        }
    }
}
