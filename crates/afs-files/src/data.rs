//! Payload representations accepted by [`AFile`](crate::AFile).

use afs_core::{FileRef, Result};
use futures::TryStreamExt;
use futures::stream::BoxStream;
use serde_json::Value;
use std::fmt;

/// A stream of byte chunks, as returned by a lazy producer.
pub type ByteStream = BoxStream<'static, Result<Vec<u8>>>;

/// The read method that triggered data production.
///
/// Passed to lazy producers so they can choose a convenient representation;
/// the usual conversions are applied afterwards either way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataFormat {
    /// `json()`
    Json,
    /// `text()`
    Text,
    /// `bytes()`
    Bytes,
    /// `url()`
    Url,
}

/// Materialized file content.
#[derive(Debug, Clone)]
pub enum Data {
    /// UTF-8 text.
    Text(String),
    /// Raw bytes.
    Binary(Vec<u8>),
    /// A JSON value (never a bare string; those become `Text`).
    Json(Value),
    /// Another file whose reads are delegated.
    File(FileRef),
}

impl Data {
    /// MIME type inferred from the payload shape.
    ///
    /// Text is `text/plain`, JSON arrays and objects are `application/json`,
    /// a nested file reports its own content type, anything else is
    /// `application/binary`.
    #[must_use]
    pub fn inferred_content_type(&self) -> String {
        match self {
            Self::Text(_) => "text/plain".to_string(),
            Self::Json(Value::Array(_) | Value::Object(_)) => "application/json".to_string(),
            Self::File(file) => file
                .metadata()
                .and_then(|m| m.content_type.clone())
                .unwrap_or_else(|| "application/binary".to_string()),
            Self::Json(_) | Self::Binary(_) => "application/binary".to_string(),
        }
    }
}

impl From<String> for Data {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<&str> for Data {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<Vec<u8>> for Data {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Binary(bytes)
    }
}

impl From<&[u8]> for Data {
    fn from(bytes: &[u8]) -> Self {
        Self::Binary(bytes.to_vec())
    }
}

impl From<Value> for Data {
    fn from(value: Value) -> Self {
        match value {
            Value::String(s) => Self::Text(s),
            other => Self::Json(other),
        }
    }
}

impl From<FileRef> for Data {
    fn from(file: FileRef) -> Self {
        Self::File(file)
    }
}

/// What a lazy producer yields.
///
/// Ready data is cached by the owning file; streams are consumed once and
/// the producer is invoked again on the next read.
pub enum Payload {
    /// Data that can be cached.
    Ready(Data),
    /// A one-shot byte stream.
    Stream(ByteStream),
}

impl Payload {
    /// Wraps a byte stream.
    pub fn stream(stream: impl futures::Stream<Item = Result<Vec<u8>>> + Send + 'static) -> Self {
        Self::Stream(Box::pin(stream))
    }
}

impl From<Data> for Payload {
    fn from(data: Data) -> Self {
        Self::Ready(data)
    }
}

impl fmt::Debug for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ready(data) => f.debug_tuple("Ready").field(data).finish(),
            Self::Stream(_) => f.debug_tuple("Stream").field(&"BoxStream{..}").finish(),
        }
    }
}

/// Drains a byte stream into one buffer.
pub(crate) async fn collect(stream: ByteStream) -> Result<Vec<u8>> {
    stream.try_concat().await
}
