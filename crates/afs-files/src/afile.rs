//! Local file wrapper.
//!
//! # Examples
//!
//! ```
//! use afs_core::VFile;
//! use afs_files::{AFile, Data, Payload};
//!
//! # async fn example() -> afs_core::Result<()> {
//! // Deferred computation: the producer runs on the first read only.
//! let report = AFile::lazy("report", |_format| async {
//!     Ok(Payload::Ready(Data::from("expensive result")))
//! })
//! .with_content_type("text/plain");
//!
//! assert_eq!(report.text().await?, "expensive result");
//! assert_eq!(report.url().await?, "data:text/plain;UTF-8,expensive result");
//! # Ok(())
//! # }
//! ```

use crate::data::{Data, DataFormat, Payload};
use crate::lazy::LazyCell;
use afs_core::{Error, FileRef, Metadata, Result, VFile};
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;

/// Wraps locally supplied data behind the [`VFile`] interface.
///
/// The content type comes from explicit metadata when given, otherwise it
/// is inferred from the data (see [`Data::inferred_content_type`]). The
/// per-version metadata always carries the file name and content type.
#[derive(Debug)]
pub struct AFile {
    name: String,
    metadata: Metadata,
    data: LazyCell,
}

impl AFile {
    /// Creates a file holding `data`.
    ///
    /// # Examples
    ///
    /// ```
    /// use afs_files::AFile;
    ///
    /// let file = AFile::new("notes", "hello");
    /// assert_eq!(file.content_type(), "text/plain");
    /// ```
    #[must_use]
    pub fn new(name: impl Into<String>, data: impl Into<Data>) -> Self {
        Self::with_metadata(name, data, Metadata::default())
    }

    /// Creates a file holding `data` with additional metadata.
    ///
    /// A `content_type` in `metadata` overrides inference; the name is
    /// always taken from `name`.
    #[must_use]
    pub fn with_metadata(
        name: impl Into<String>,
        data: impl Into<Data>,
        metadata: Metadata,
    ) -> Self {
        let data = data.into();
        let inferred = data.inferred_content_type();
        Self::assemble(name.into(), LazyCell::ready(data), metadata, inferred)
    }

    /// Creates a file whose data is computed on first read.
    ///
    /// The producer receives the [`DataFormat`] of the read that triggered
    /// it. Ready results are cached; stream results are not, so the
    /// producer runs again on the next read. The content type defaults to
    /// `application/binary`.
    pub fn lazy<F, Fut>(name: impl Into<String>, producer: F) -> Self
    where
        F: Fn(DataFormat) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Payload>> + Send + 'static,
    {
        Self::assemble(
            name.into(),
            LazyCell::lazy(producer),
            Metadata::default(),
            "application/binary".to_string(),
        )
    }

    fn assemble(name: String, data: LazyCell, mut metadata: Metadata, inferred: String) -> Self {
        metadata.name = Some(name.clone());
        if metadata.content_type.is_none() {
            metadata.content_type = Some(inferred);
        }
        Self {
            name,
            metadata,
            data,
        }
    }

    /// Overrides the content type.
    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.metadata.content_type = Some(content_type.into());
        self
    }

    /// Returns the MIME type of the content.
    #[must_use]
    pub fn content_type(&self) -> &str {
        self.metadata
            .content_type
            .as_deref()
            .unwrap_or("application/binary")
    }

    /// Wraps the file in a shared handle for storing in a tree.
    #[must_use]
    pub fn into_ref(self) -> FileRef {
        Arc::new(self)
    }
}

fn decode_error(what: &str, source: impl std::error::Error + Send + Sync + 'static) -> Error {
    Error::DataError {
        message: format!("cannot decode {what}"),
        source: Some(Box::new(source)),
    }
}

#[async_trait]
impl VFile for AFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn metadata(&self) -> Option<&Metadata> {
        Some(&self.metadata)
    }

    async fn json(&self) -> Result<Value> {
        match self.data.get(DataFormat::Json).await? {
            Data::Json(value) => Ok(value),
            Data::Text(text) => Ok(Value::String(text)),
            Data::Binary(bytes) => {
                serde_json::from_slice(&bytes).map_err(|e| decode_error("bytes as JSON", e))
            }
            Data::File(file) => file.json().await,
        }
    }

    async fn text(&self) -> Result<String> {
        match self.data.get(DataFormat::Text).await? {
            Data::Text(text) => Ok(text),
            Data::Binary(bytes) => {
                String::from_utf8(bytes).map_err(|e| decode_error("bytes as UTF-8", e))
            }
            Data::Json(value) => Ok(value.to_string()),
            Data::File(file) => file.text().await,
        }
    }

    async fn bytes(&self) -> Result<Vec<u8>> {
        match self.data.get(DataFormat::Bytes).await? {
            Data::Binary(bytes) => Ok(bytes),
            Data::Text(text) => Ok(text.into_bytes()),
            Data::Json(value) => Ok(value.to_string().into_bytes()),
            Data::File(file) => file.bytes().await,
        }
    }

    async fn url(&self) -> Result<String> {
        let mime = self.content_type();
        match self.data.get(DataFormat::Url).await? {
            Data::Text(text) => Ok(format!("data:{mime};UTF-8,{text}")),
            Data::Binary(bytes) => Ok(format!("data:{mime};base64,{}", STANDARD.encode(bytes))),
            Data::Json(value) => Ok(format!(
                "data:{mime};base64,{}",
                STANDARD.encode(value.to_string())
            )),
            Data::File(file) => file.url().await,
        }
    }
}
