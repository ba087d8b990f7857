//! HTTP transport: request building, retry/backoff, and error classification.

pub mod body;
pub(crate) mod classify;
pub mod http;
pub(crate) mod retry;

pub use body::{FilePart, MultipartBody, RequestBody};
pub use http::{ChunkSink, HttpTransport, Payload, Query, RequestOptions, ResponseKind};
