use std::time::Instant;

use bytes::Bytes;
use futures::StreamExt;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::Method;
use serde_json::Value;
use tracing::instrument::WithSubscriber;
use tracing::{debug, info, warn, Instrument};

use super::body::{MultipartBody, RequestBody};
use super::classify;
use super::retry::{Decision, RetryPolicy};
use crate::callbacks::{ErrorEvent, RateLimitEvent, RequestEvent, ResponseEvent, RetryEvent};
use crate::config::ClientConfig;
use crate::{Error, Result};

/// Query string pairs, in send order.
pub type Query = Vec<(String, String)>;

/// Receives streamed audio chunks in arrival order.
pub type ChunkSink<'s> = &'s mut (dyn FnMut(Bytes) + Send);

/// How a successful response body is consumed.
pub enum ResponseKind<'s> {
    Json,
    Binary,
    /// Chunks are handed to the sink as they arrive; nothing is returned.
    Stream(ChunkSink<'s>),
}

/// Successful result of [`HttpTransport::execute`].
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Json(Value),
    Binary(Bytes),
    Streamed,
}

/// Everything about a request except its method and path.
#[derive(Default)]
pub struct RequestOptions<'s> {
    pub query: Query,
    pub body: Option<RequestBody>,
    pub kind: Option<ResponseKind<'s>>,
}

/// Result of one attempt. `delivered` is true once a stream sink saw bytes.
struct Attempt {
    result: Result<Payload>,
    delivered: bool,
}

/// HTTP transport with retry, error classification, and lifecycle events.
///
/// One `reqwest::Client` is built per transport and reused for every call.
pub struct HttpTransport {
    client: reqwest::Client,
    config: ClientConfig,
    policy: RetryPolicy,
}

impl HttpTransport {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| Error::configuration(format!("failed to build HTTP client: {}", e)))?;
        let policy = RetryPolicy::from_config(&config);
        Ok(Self {
            client,
            config,
            policy,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub async fn get(&self, path: &str, query: Query) -> Result<Value> {
        let opts = RequestOptions {
            query,
            ..Default::default()
        };
        self.execute(Method::GET, path, opts).await.and_then(into_json)
    }

    pub async fn post_json(&self, path: &str, body: Value) -> Result<Value> {
        self.post_json_with_query(path, body, Vec::new()).await
    }

    pub async fn post_json_with_query(&self, path: &str, body: Value, query: Query) -> Result<Value> {
        let opts = RequestOptions {
            query,
            body: Some(RequestBody::Json(body)),
            ..Default::default()
        };
        self.execute(Method::POST, path, opts).await.and_then(into_json)
    }

    pub async fn post_binary(&self, path: &str, body: Value, query: Query) -> Result<Bytes> {
        let opts = RequestOptions {
            query,
            body: Some(RequestBody::Json(body)),
            kind: Some(ResponseKind::Binary),
        };
        self.execute(Method::POST, path, opts).await.and_then(into_binary)
    }

    pub async fn delete(&self, path: &str) -> Result<Value> {
        self.execute(Method::DELETE, path, RequestOptions::default())
            .await
            .and_then(into_json)
    }

    pub async fn post_multipart(&self, path: &str, body: MultipartBody) -> Result<Value> {
        let opts = RequestOptions {
            body: Some(RequestBody::Multipart(body)),
            ..Default::default()
        };
        self.execute(Method::POST, path, opts).await.and_then(into_json)
    }

    pub async fn post_stream<F>(&self, path: &str, body: Value, query: Query, mut sink: F) -> Result<()>
    where
        F: FnMut(Bytes) + Send,
    {
        let opts = RequestOptions {
            query,
            body: Some(RequestBody::Json(body)),
            kind: Some(ResponseKind::Stream(&mut sink)),
        };
        self.execute(Method::POST, path, opts).await.map(|_| ())
    }

    /// Run one logical request through the retry state machine.
    ///
    /// Fails with [`Error::Configuration`] before any I/O when the
    /// configuration is unusable.
    pub async fn execute(&self, method: Method, path: &str, opts: RequestOptions<'_>) -> Result<Payload> {
        self.config.validate()?;

        let request_id = uuid::Uuid::new_v4().to_string();
        // The span must be opened under the dispatch that will record it.
        let fut = async {
            let span = tracing::debug_span!(
                "eleven_request",
                request_id = %request_id,
                method = %method,
                path = %path
            );
            self.run(&request_id, method, path, opts).instrument(span).await
        };
        match &self.config.logger {
            Some(dispatch) => fut.with_subscriber(dispatch.clone()).await,
            None => fut.await,
        }
    }

    async fn run(&self, request_id: &str, method: Method, path: &str, opts: RequestOptions<'_>) -> Result<Payload> {
        let RequestOptions { query, body, kind } = opts;
        let mut kind = kind.unwrap_or(ResponseKind::Json);
        let sanitized = body.as_ref().map(RequestBody::sanitized);
        let callbacks = &self.config.callbacks;
        let mut attempt: u32 = 1;

        loop {
            callbacks.emit_request(&RequestEvent {
                request_id,
                method: method.as_str(),
                path,
                body: sanitized.as_ref(),
                attempt,
            });
            debug!(attempt, "sending request");

            let Attempt { result, delivered } = self
                .attempt(&method, path, &query, body.as_ref(), &mut kind)
                .await;

            let err = match result {
                Ok(payload) => return Ok(payload),
                Err(err) => err,
            };

            if let Error::RateLimit { retry_after, .. } = &err {
                warn!(retry_after = ?retry_after, "rate limited");
                callbacks.emit_rate_limit(&RateLimitEvent {
                    retry_after: *retry_after,
                    error: &err,
                });
            }

            // A partially delivered stream cannot be replayed.
            if err.is_retryable_kind() && !delivered {
                if let Decision::Retry { delay } = self.policy.decide(&err, attempt) {
                    info!(
                        attempt,
                        max_attempts = self.policy.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "retrying request"
                    );
                    callbacks.emit_retry(&RetryEvent {
                        error: &err,
                        attempt,
                        max_attempts: self.policy.max_retries,
                        delay,
                    });
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                    continue;
                }
                // Exhausted or not in the retry set: surfaced without an error event.
                return Err(err);
            }

            debug!(error = %err, class = err.class(), "request failed");
            callbacks.emit_error(&ErrorEvent {
                error: &err,
                method: method.as_str(),
                path,
                body: sanitized.as_ref(),
            });
            return Err(err);
        }
    }

    async fn attempt(
        &self,
        method: &Method,
        path: &str,
        query: &Query,
        body: Option<&RequestBody>,
        kind: &mut ResponseKind<'_>,
    ) -> Attempt {
        let started = Instant::now();
        let request = match self.build(method, path, query, body) {
            Ok(r) => r,
            Err(e) => return Attempt { result: Err(e), delivered: false },
        };
        let response = match request.send().await {
            Ok(r) => r,
            Err(e) => {
                return Attempt {
                    result: Err(classify::from_reqwest(e)),
                    delivered: false,
                }
            }
        };

        let status = response.status();
        let duration_ms = (started.elapsed().as_secs_f64() * 100_000.0).round() / 100.0;
        debug!(status = status.as_u16(), duration_ms, "received response");
        self.config.callbacks.emit_response(&ResponseEvent {
            method: method.as_str(),
            path,
            status: status.as_u16(),
            duration_ms,
        });

        if !status.is_success() {
            let headers = response.headers().clone();
            let raw = response.bytes().await.unwrap_or_default();
            return Attempt {
                result: Err(classify::from_status(
                    status.as_u16(),
                    classify::parse_json(&raw),
                    &headers,
                )),
                delivered: false,
            };
        }

        match kind {
            ResponseKind::Json => Attempt {
                result: response
                    .bytes()
                    .await
                    .map(|raw| Payload::Json(classify::parse_json(&raw)))
                    .map_err(classify::from_reqwest),
                delivered: false,
            },
            ResponseKind::Binary => Attempt {
                result: response
                    .bytes()
                    .await
                    .map(Payload::Binary)
                    .map_err(classify::from_reqwest),
                delivered: false,
            },
            ResponseKind::Stream(sink) => {
                let mut delivered = false;
                let mut stream = response.bytes_stream();
                while let Some(chunk) = stream.next().await {
                    match chunk {
                        Ok(bytes) => {
                            delivered = true;
                            (*sink)(bytes);
                        }
                        Err(e) => {
                            return Attempt {
                                result: Err(classify::from_reqwest(e)),
                                delivered,
                            }
                        }
                    }
                }
                Attempt {
                    result: Ok(Payload::Streamed),
                    delivered,
                }
            }
        }
    }

    fn build(
        &self,
        method: &Method,
        path: &str,
        query: &Query,
        body: Option<&RequestBody>,
    ) -> Result<reqwest::RequestBuilder> {
        let url = format!("{}{}", self.config.base_url.trim_end_matches('/'), path);
        let multipart = body.is_some_and(RequestBody::is_multipart);
        let mut request = self
            .client
            .request(method.clone(), url)
            .headers(self.headers(multipart)?);

        if !query.is_empty() {
            request = request.query(query);
        }

        match body {
            Some(b) if !b.is_empty() => match b {
                RequestBody::Json(value) => {
                    request = request.body(serde_json::to_vec(value)?);
                }
                RequestBody::Multipart(form) => {
                    request = request.multipart(form.to_form()?);
                }
            },
            _ => {}
        }
        Ok(request)
    }

    fn headers(&self, multipart: bool) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        let key = HeaderValue::from_str(self.config.api_key_str())
            .map_err(|_| Error::configuration("API key contains characters not allowed in a header"))?;
        headers.insert("xi-api-key", key);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if !multipart {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }
        Ok(headers)
    }
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("config", &self.config)
            .finish()
    }
}

fn into_json(payload: Payload) -> Result<Value> {
    match payload {
        Payload::Json(v) => Ok(v),
        _ => Err(Error::api("unexpected non-JSON payload")),
    }
}

fn into_binary(payload: Payload) -> Result<Bytes> {
    match payload {
        Payload::Binary(bytes) => Ok(bytes),
        _ => Err(Error::api("unexpected non-binary payload")),
    }
}
