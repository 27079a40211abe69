//! Remote header metadata.
//!
//! The filesystem issues one HEAD request per remote file version and keeps
//! the result in the file's own header cache. Only `content-length`,
//! `last-modified`, `etag` and `content-type` are kept.

use afs_core::{Error, FsConfig, Metadata, RemoteFile, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::fmt;

/// Issues HEAD requests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HeaderFetcher: Send + Sync {
    /// Returns the response headers for `url`, names lowercased.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the status is not a success.
    async fn head(&self, url: &str) -> Result<Vec<(String, String)>>;
}

/// [`HeaderFetcher`] backed by `reqwest`.
pub struct HttpHeaderFetcher {
    client: reqwest::Client,
}

impl HttpHeaderFetcher {
    /// Builds a client honouring the configured timeout and user agent.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if the HTTP client cannot be built.
    pub fn new(config: &FsConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.head_timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| Error::InvalidConfig {
                message: format!("cannot build HTTP client: {e}"),
            })?;
        Ok(Self { client })
    }
}

impl fmt::Debug for HttpHeaderFetcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpHeaderFetcher").finish_non_exhaustive()
    }
}

#[async_trait]
impl HeaderFetcher for HttpHeaderFetcher {
    async fn head(&self, url: &str) -> Result<Vec<(String, String)>> {
        let fetch_error = |e: reqwest::Error| Error::FetchFailed {
            url: url.to_string(),
            source: Box::new(e),
        };
        let response = self
            .client
            .head(url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(fetch_error)?;

        Ok(response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect())
    }
}

/// Builds a metadata record from HEAD response headers.
///
/// Unparseable lengths and dates are dropped.
#[must_use]
pub fn metadata_from_headers(name: &str, url: &str, headers: &[(String, String)]) -> Metadata {
    let mut metadata = Metadata::new(name);
    metadata.url = Some(url.to_string());
    for (key, value) in headers {
        match key.to_ascii_lowercase().as_str() {
            "content-length" => metadata.length = value.trim().parse().ok(),
            "last-modified" => {
                metadata.modification_date = DateTime::parse_from_rfc2822(value.trim())
                    .ok()
                    .map(|date| date.with_timezone(&Utc));
            }
            "etag" => metadata.etag = Some(value.clone()),
            "content-type" => metadata.content_type = Some(value.clone()),
            _ => {}
        }
    }
    metadata
}

/// Returns the header metadata of `file`, fetching it on first use.
///
/// # Errors
///
/// Returns the fetcher's error; nothing is cached in that case.
pub async fn cached_metadata(
    fetcher: &dyn HeaderFetcher,
    file: &dyn RemoteFile,
) -> Result<Metadata> {
    file.header_cache()
        .get_or_try_init(|| async {
            let url = file.remote_url();
            let headers = fetcher.head(url).await?;
            tracing::debug!(url, headers = headers.len(), "cached remote metadata");
            Ok(metadata_from_headers(file.name(), url, &headers))
        })
        .await
        .cloned()
}
