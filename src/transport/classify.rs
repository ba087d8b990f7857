//! Mapping from HTTP failures onto the crate error kinds.

use std::io::ErrorKind;

use reqwest::header::HeaderMap;
use serde_json::{Map, Value};

use crate::error::{Error, ErrorDetails};

/// Parse a response body as JSON. Empty or malformed bodies become `{}`.
pub(crate) fn parse_json(body: &[u8]) -> Value {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Value::Object(Map::new());
    }
    serde_json::from_slice(body).unwrap_or_else(|_| Value::Object(Map::new()))
}

/// Pick the most specific message the error body offers.
///
/// Order: `detail.message`, `detail.status`, the `detail` object itself,
/// `detail` as a string, then top-level `message` or `error`.
pub(crate) fn extract_message(body: &Value) -> String {
    match body.get("detail") {
        Some(Value::Object(detail)) => detail
            .get("message")
            .filter(|v| !v.is_null())
            .or_else(|| detail.get("status").filter(|v| !v.is_null()))
            .map(value_text)
            .unwrap_or_else(|| Value::Object(detail.clone()).to_string()),
        Some(Value::String(detail)) => detail.clone(),
        _ => body
            .get("message")
            .filter(|v| !v.is_null())
            .or_else(|| body.get("error").filter(|v| !v.is_null()))
            .map(value_text)
            .unwrap_or_else(|| "Unknown error".to_string()),
    }
}

fn value_text(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Integer seconds from a `retry-after` header.
pub(crate) fn retry_after(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse::<u64>().ok())
}

/// Build the error for a non-2xx response.
pub(crate) fn from_status(status: u16, body: Value, headers: &HeaderMap) -> Error {
    let message = extract_message(&body);
    let mut details = ErrorDetails::new().with_status(status);
    if let Some(code) = body.get("error_code").and_then(Value::as_str) {
        details = details.with_error_code(code);
    }
    let details = details.with_body(body);

    match status {
        400 => Error::Validation { message, details },
        401 => Error::Authentication { message, details },
        403 => Error::Forbidden { message, details },
        404 => Error::NotFound { message, details },
        422 => Error::Unprocessable { message, details },
        429 => Error::RateLimit {
            message,
            details,
            retry_after: retry_after(headers),
        },
        500..=599 => Error::Server { message, details },
        _ => Error::Api { message, details },
    }
}

/// Wrap a transport-level failure that never produced a status.
pub(crate) fn from_reqwest(err: reqwest::Error) -> Error {
    let message = err.to_string();
    if err.is_timeout() {
        Error::timeout(message)
    } else if err.is_connect() || is_dropped_connection(&err) {
        Error::connection(message)
    } else {
        Error::api(message)
    }
}

/// True when the peer accepted the connection and then reset or closed it.
fn is_dropped_connection(err: &reqwest::Error) -> bool {
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        if let Some(io) = cause.downcast_ref::<std::io::Error>() {
            if matches!(
                io.kind(),
                ErrorKind::ConnectionReset
                    | ErrorKind::ConnectionAborted
                    | ErrorKind::BrokenPipe
                    | ErrorKind::UnexpectedEof
            ) {
                return true;
            }
        }
        if let Some(hyper_err) = cause.downcast_ref::<hyper::Error>() {
            if hyper_err.is_incomplete_message() || hyper_err.is_closed() {
                return true;
            }
        }
        source = cause.source();
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::{HeaderValue, RETRY_AFTER};
    use serde_json::json;

    #[test]
    fn empty_or_invalid_json_is_an_empty_object() {
        assert_eq!(parse_json(b""), json!({}));
        assert_eq!(parse_json(b"  \n"), json!({}));
        assert_eq!(parse_json(b"<html>oops</html>"), json!({}));
        assert_eq!(parse_json(br#"[1,2]"#), json!([1, 2]));
    }

    #[test]
    fn message_priority() {
        assert_eq!(
            extract_message(&json!({"detail": {"message": "m", "status": "s"}})),
            "m"
        );
        assert_eq!(extract_message(&json!({"detail": {"status": "quota_exceeded"}})), "quota_exceeded");
        assert_eq!(extract_message(&json!({"detail": {"loc": 1}})), r#"{"loc":1}"#);
        assert_eq!(extract_message(&json!({"detail": "plain"})), "plain");
        assert_eq!(extract_message(&json!({"message": "top"})), "top");
        assert_eq!(extract_message(&json!({"error": "err"})), "err");
        assert_eq!(extract_message(&json!({})), "Unknown error");
    }

    #[test]
    fn statuses_map_to_kinds() {
        let headers = HeaderMap::new();
        let cases = [
            (400, "validation"),
            (401, "authentication"),
            (403, "forbidden"),
            (404, "not_found"),
            (422, "unprocessable"),
            (429, "rate_limited"),
            (500, "server_error"),
            (503, "server_error"),
            (418, "api_error"),
        ];
        for (status, class) in cases {
            assert_eq!(from_status(status, json!({}), &headers).class(), class, "{}", status);
        }
    }

    #[test]
    fn rate_limit_reads_retry_after_and_error_code() {
        let mut headers = HeaderMap::new();
        headers.insert(RETRY_AFTER, HeaderValue::from_static("7"));
        let err = from_status(
            429,
            json!({"detail": {"message": "slow"}, "error_code": "too_many"}),
            &headers,
        );
        assert_eq!(err.retry_after(), Some(7));
        assert_eq!(err.error_code(), Some("too_many"));
        assert_eq!(err.http_status(), Some(429));
        assert_eq!(err.message(), "slow");
    }

    #[test]
    fn http_date_retry_after_is_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert(RETRY_AFTER, HeaderValue::from_static("Wed, 21 Oct 2015 07:28:00 GMT"));
        assert_eq!(retry_after(&headers), None);
        assert_eq!(from_status(429, json!({}), &headers).retry_after(), None);
    }
}
