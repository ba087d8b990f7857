use serde_json::Value;
use thiserror::Error;

/// Structured details attached to every error that came back from (or never
/// reached) the remote API.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ErrorDetails {
    /// HTTP status of the failed response, if one was received.
    pub http_status: Option<u16>,
    /// Parsed response body (an empty object when the body was not JSON).
    pub response_body: Option<Value>,
    /// Provider error code (`error_code` in the body), if present.
    pub error_code: Option<String>,
}

impl ErrorDetails {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.http_status = Some(status);
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.response_body = Some(body);
        self
    }

    pub fn with_error_code(mut self, code: impl Into<String>) -> Self {
        self.error_code = Some(code.into());
        self
    }
}

/// Unified error type for the client.
///
/// Variants mirror the remote failure classes one-to-one so callers can match
/// on the kind without parsing the response body themselves.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// HTTP 400, or malformed caller input rejected before any request.
    #[error("Validation error: {message}{}", format_details(.details))]
    Validation {
        message: String,
        details: ErrorDetails,
    },

    /// HTTP 401
    #[error("Authentication failed: {message}{}", format_details(.details))]
    Authentication {
        message: String,
        details: ErrorDetails,
    },

    /// HTTP 403
    #[error("Forbidden: {message}{}", format_details(.details))]
    Forbidden {
        message: String,
        details: ErrorDetails,
    },

    /// HTTP 404
    #[error("Not found: {message}{}", format_details(.details))]
    NotFound {
        message: String,
        details: ErrorDetails,
    },

    /// HTTP 422
    #[error("Unprocessable entity: {message}{}", format_details(.details))]
    Unprocessable {
        message: String,
        details: ErrorDetails,
    },

    /// HTTP 429. `retry_after` is the server's `retry-after` hint in seconds.
    #[error("Rate limited: {message}{}", format_details(.details))]
    RateLimit {
        message: String,
        details: ErrorDetails,
        retry_after: Option<u64>,
    },

    /// HTTP 5xx
    #[error("Server error: {message}{}", format_details(.details))]
    Server {
        message: String,
        details: ErrorDetails,
    },

    /// Any status without a dedicated kind, and unclassified transport failures.
    #[error("API error: {message}{}", format_details(.details))]
    Api {
        message: String,
        details: ErrorDetails,
    },

    #[error("Connection error: {message}")]
    Connection {
        message: String,
        details: ErrorDetails,
    },

    /// A connection error caused by a request or connect timeout.
    #[error("Timeout: {message}")]
    Timeout {
        message: String,
        details: ErrorDetails,
    },

    #[error("Voice slot limit: {message}")]
    VoiceSlotLimit { message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

fn format_details(details: &ErrorDetails) -> String {
    let mut parts = Vec::new();
    if let Some(status) = details.http_status {
        parts.push(format!("HTTP {}", status));
    }
    if let Some(ref code) = details.error_code {
        parts.push(format!("code: {}", code));
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!(" ({})", parts.join(", "))
    }
}

impl Error {
    pub fn configuration(msg: impl Into<String>) -> Self {
        Error::Configuration {
            message: msg.into(),
        }
    }

    /// Caller-input validation failure raised before any request is sent.
    pub fn validation(msg: impl Into<String>) -> Self {
        Error::Validation {
            message: msg.into(),
            details: ErrorDetails::new(),
        }
    }

    pub fn voice_slot_limit(msg: impl Into<String>) -> Self {
        Error::VoiceSlotLimit {
            message: msg.into(),
        }
    }

    pub fn connection(msg: impl Into<String>) -> Self {
        Error::Connection {
            message: msg.into(),
            details: ErrorDetails::new(),
        }
    }

    pub fn timeout(msg: impl Into<String>) -> Self {
        Error::Timeout {
            message: msg.into(),
            details: ErrorDetails::new(),
        }
    }

    pub fn api(msg: impl Into<String>) -> Self {
        Error::Api {
            message: msg.into(),
            details: ErrorDetails::new(),
        }
    }

    /// Human-readable message without the kind prefix.
    pub fn message(&self) -> String {
        match self {
            Error::Configuration { message }
            | Error::VoiceSlotLimit { message }
            | Error::Validation { message, .. }
            | Error::Authentication { message, .. }
            | Error::Forbidden { message, .. }
            | Error::NotFound { message, .. }
            | Error::Unprocessable { message, .. }
            | Error::RateLimit { message, .. }
            | Error::Server { message, .. }
            | Error::Api { message, .. }
            | Error::Connection { message, .. }
            | Error::Timeout { message, .. } => message.clone(),
            Error::Io(e) => e.to_string(),
            Error::Serialization(e) => e.to_string(),
        }
    }

    pub fn details(&self) -> Option<&ErrorDetails> {
        match self {
            Error::Validation { details, .. }
            | Error::Authentication { details, .. }
            | Error::Forbidden { details, .. }
            | Error::NotFound { details, .. }
            | Error::Unprocessable { details, .. }
            | Error::RateLimit { details, .. }
            | Error::Server { details, .. }
            | Error::Api { details, .. }
            | Error::Connection { details, .. }
            | Error::Timeout { details, .. } => Some(details),
            _ => None,
        }
    }

    pub fn http_status(&self) -> Option<u16> {
        self.details().and_then(|d| d.http_status)
    }

    pub fn response_body(&self) -> Option<&Value> {
        self.details().and_then(|d| d.response_body.as_ref())
    }

    pub fn error_code(&self) -> Option<&str> {
        self.details().and_then(|d| d.error_code.as_deref())
    }

    /// Server-advertised retry delay in seconds (rate-limit errors only).
    pub fn retry_after(&self) -> Option<u64> {
        match self {
            Error::RateLimit { retry_after, .. } => *retry_after,
            _ => None,
        }
    }

    /// Stable snake_case name of the error kind, suitable for log fields.
    pub fn class(&self) -> &'static str {
        match self {
            Error::Configuration { .. } => "configuration",
            Error::Validation { .. } => "validation",
            Error::Authentication { .. } => "authentication",
            Error::Forbidden { .. } => "forbidden",
            Error::NotFound { .. } => "not_found",
            Error::Unprocessable { .. } => "unprocessable",
            Error::RateLimit { .. } => "rate_limited",
            Error::Server { .. } => "server_error",
            Error::Api { .. } => "api_error",
            Error::Connection { .. } => "connection",
            Error::Timeout { .. } => "timeout",
            Error::VoiceSlotLimit { .. } => "voice_slot_limit",
            Error::Io(_) => "io",
            Error::Serialization(_) => "serialization",
        }
    }

    /// True for connection failures, timeouts included.
    pub fn is_connection(&self) -> bool {
        matches!(self, Error::Connection { .. } | Error::Timeout { .. })
    }

    /// Kinds the transport may retry, subject to the configured status set.
    pub fn is_retryable_kind(&self) -> bool {
        matches!(self, Error::RateLimit { .. } | Error::Server { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn display_includes_status_and_code() {
        let err = Error::NotFound {
            message: "Voice not found".to_string(),
            details: ErrorDetails::new()
                .with_status(404)
                .with_error_code("voice_not_found"),
        };
        assert_eq!(
            err.to_string(),
            "Not found: Voice not found (HTTP 404, code: voice_not_found)"
        );
        assert_eq!(err.message(), "Voice not found");
    }

    #[test]
    fn timeout_is_a_connection_error() {
        assert!(Error::timeout("read timed out").is_connection());
        assert!(Error::connection("refused").is_connection());
        assert!(!Error::api("boom").is_connection());
    }

    #[test]
    fn only_rate_limit_and_server_are_retryable_kinds() {
        let rl = Error::RateLimit {
            message: "slow down".into(),
            details: ErrorDetails::new().with_status(429),
            retry_after: Some(7),
        };
        let server = Error::Server {
            message: "oops".into(),
            details: ErrorDetails::new().with_status(503),
        };
        assert!(rl.is_retryable_kind());
        assert!(server.is_retryable_kind());
        assert!(!Error::validation("bad").is_retryable_kind());
        assert_eq!(rl.retry_after(), Some(7));
        assert_eq!(server.retry_after(), None);
    }

    #[test]
    fn accessors_expose_structured_fields() {
        let body = json!({"detail": {"message": "nope"}, "error_code": "quota"});
        let err = Error::Forbidden {
            message: "nope".into(),
            details: ErrorDetails::new()
                .with_status(403)
                .with_body(body.clone())
                .with_error_code("quota"),
        };
        assert_eq!(err.http_status(), Some(403));
        assert_eq!(err.response_body(), Some(&body));
        assert_eq!(err.error_code(), Some("quota"));
        assert_eq!(err.class(), "forbidden");
        assert!(Error::configuration("missing key").details().is_none());
    }
}
