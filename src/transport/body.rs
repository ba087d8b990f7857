//! Reusable request bodies.
//!
//! A body is described once and rendered into a fresh `reqwest` body on every
//! attempt, so a retried request is byte-for-byte the original.

use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use serde_json::{Map, Value};

use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Json(Value),
    Multipart(MultipartBody),
}

impl RequestBody {
    /// JSON bodies that are `null` or an empty object are not sent.
    pub(crate) fn is_empty(&self) -> bool {
        match self {
            RequestBody::Json(Value::Null) => true,
            RequestBody::Json(Value::Object(map)) => map.is_empty(),
            RequestBody::Json(_) => false,
            RequestBody::Multipart(m) => m.is_empty(),
        }
    }

    pub(crate) fn is_multipart(&self) -> bool {
        matches!(self, RequestBody::Multipart(_))
    }

    /// Event/log view of the body. File contents never appear.
    pub fn sanitized(&self) -> Value {
        match self {
            RequestBody::Json(v) => v.clone(),
            RequestBody::Multipart(m) => m.sanitized(),
        }
    }
}

impl From<Value> for RequestBody {
    fn from(value: Value) -> Self {
        RequestBody::Json(value)
    }
}

impl From<MultipartBody> for RequestBody {
    fn from(body: MultipartBody) -> Self {
        RequestBody::Multipart(body)
    }
}

/// An in-memory file upload.
#[derive(Debug, Clone, PartialEq)]
pub struct FilePart {
    pub file_name: String,
    pub data: Bytes,
    pub mime_type: Option<String>,
}

impl FilePart {
    pub fn new(file_name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            data: data.into(),
            mime_type: None,
        }
    }

    pub fn with_mime_type(mut self, mime: impl Into<String>) -> Self {
        self.mime_type = Some(mime.into());
        self
    }

    /// Read a file from disk, naming the part after the file.
    pub async fn from_path(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "file".to_string());
        Ok(Self::new(file_name, data))
    }

    fn to_part(&self) -> Result<Part> {
        let part = Part::bytes(self.data.to_vec()).file_name(self.file_name.clone());
        match &self.mime_type {
            Some(mime) => part
                .mime_str(mime)
                .map_err(|e| Error::validation(format!("invalid mime type '{}': {}", mime, e))),
            None => Ok(part),
        }
    }
}

/// Form fields plus a `files` list, sent as `multipart/form-data`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MultipartBody {
    fields: Vec<(String, String)>,
    files: Vec<FilePart>,
}

impl MultipartBody {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((key.into(), value.into()));
        self
    }

    pub fn text_opt(self, key: impl Into<String>, value: Option<impl Into<String>>) -> Self {
        match value {
            Some(v) => self.text(key, v),
            None => self,
        }
    }

    pub fn file(mut self, file: FilePart) -> Self {
        self.files.push(file);
        self
    }

    pub fn files(mut self, files: impl IntoIterator<Item = FilePart>) -> Self {
        self.files.extend(files);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.files.is_empty()
    }

    /// Form field names in send order; files are indexed `files[0]`, `files[1]`, ...
    pub fn field_names(&self) -> Vec<String> {
        self.fields
            .iter()
            .map(|(k, _)| k.clone())
            .chain((0..self.files.len()).map(|i| format!("files[{}]", i)))
            .collect()
    }

    pub(crate) fn to_form(&self) -> Result<Form> {
        let mut form = Form::new();
        for (key, value) in &self.fields {
            form = form.text(key.clone(), value.clone());
        }
        for (i, file) in self.files.iter().enumerate() {
            form = form.part(format!("files[{}]", i), file.to_part()?);
        }
        Ok(form)
    }

    pub fn sanitized(&self) -> Value {
        let mut map = Map::new();
        for (key, value) in &self.fields {
            map.insert(key.clone(), Value::String(value.clone()));
        }
        if !self.files.is_empty() {
            let files = self
                .files
                .iter()
                .map(|f| Value::String(format!("[FILE: {}]", f.file_name)))
                .collect();
            map.insert("files".to_string(), Value::Array(files));
        }
        Value::Object(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn files_are_indexed_and_redacted() {
        let body = MultipartBody::new()
            .text("name", "Narrator")
            .file(FilePart::new("a.mp3", &b"AAAA"[..]))
            .file(FilePart::new("b.mp3", &b"BBBB"[..]));
        assert_eq!(body.field_names(), vec!["name", "files[0]", "files[1]"]);
        assert_eq!(
            body.sanitized(),
            json!({"name": "Narrator", "files": ["[FILE: a.mp3]", "[FILE: b.mp3]"]})
        );
        assert!(body.to_form().is_ok());
    }

    #[test]
    fn empty_json_bodies_are_not_sent() {
        assert!(RequestBody::Json(json!({})).is_empty());
        assert!(RequestBody::Json(Value::Null).is_empty());
        assert!(!RequestBody::Json(json!({"text": "hi"})).is_empty());
        assert!(RequestBody::from(MultipartBody::new()).is_empty());
    }

    #[test]
    fn bad_mime_type_is_a_validation_error() {
        let body = MultipartBody::new().file(FilePart::new("x", &b"1"[..]).with_mime_type("not a mime"));
        assert!(matches!(body.to_form(), Err(Error::Validation { .. })));
    }
}
