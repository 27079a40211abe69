//! Network-backed files.

use afs_core::{Error, Metadata, RemoteFile, Result, VFile};
use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::OnceCell;

/// A file whose content lives at a URL.
///
/// Reads issue a GET request each time; nothing is cached locally except the
/// header metadata collected by the filesystem's HEAD lookup.
#[derive(Debug)]
pub struct Attachment {
    name: String,
    url: String,
    client: reqwest::Client,
    metadata: Metadata,
    headers: OnceCell<Metadata>,
}

impl Attachment {
    /// Creates an attachment pointing at `url`.
    #[must_use]
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        let name = name.into();
        let url = url.into();
        let mut metadata = Metadata::new(name.clone());
        metadata.url = Some(url.clone());
        Self {
            name,
            url,
            client: reqwest::Client::new(),
            metadata,
            headers: OnceCell::new(),
        }
    }

    /// Uses a preconfigured HTTP client.
    #[must_use]
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    /// Declares the content type up front.
    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.metadata.content_type = Some(content_type.into());
        self
    }

    fn fetch_error(&self, source: reqwest::Error) -> Error {
        Error::FetchFailed {
            url: self.url.clone(),
            source: Box::new(source),
        }
    }

    async fn get(&self) -> Result<reqwest::Response> {
        tracing::debug!(url = %self.url, "fetching attachment");
        self.client
            .get(&self.url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| self.fetch_error(e))
    }
}

#[async_trait]
impl VFile for Attachment {
    fn name(&self) -> &str {
        &self.name
    }

    fn metadata(&self) -> Option<&Metadata> {
        Some(&self.metadata)
    }

    async fn json(&self) -> Result<Value> {
        let bytes = self.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| Error::DataError {
            message: format!("{} is not valid JSON", self.url),
            source: Some(Box::new(e)),
        })
    }

    async fn text(&self) -> Result<String> {
        self.get()
            .await?
            .text()
            .await
            .map_err(|e| self.fetch_error(e))
    }

    async fn bytes(&self) -> Result<Vec<u8>> {
        let body = self
            .get()
            .await?
            .bytes()
            .await
            .map_err(|e| self.fetch_error(e))?;
        Ok(body.to_vec())
    }

    async fn url(&self) -> Result<String> {
        Ok(self.url.clone())
    }

    fn as_remote(&self) -> Option<&dyn RemoteFile> {
        Some(self)
    }
}

impl RemoteFile for Attachment {
    fn remote_url(&self) -> &str {
        &self.url
    }

    fn header_cache(&self) -> &OnceCell<Metadata> {
        &self.headers
    }
}
