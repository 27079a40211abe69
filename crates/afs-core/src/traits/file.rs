//! File read capabilities.

use crate::{Metadata, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Shared handle to a stored file.
///
/// Identity matters: watchers compare handles with [`same_file`], so storing
/// the same handle twice is observably different from storing two equal
/// files.
pub type FileRef = Arc<dyn VFile>;

/// Uniform read interface over heterogeneous payloads.
///
/// Implementations must be `Send + Sync`; every read is asynchronous so that
/// lazily produced or remote data can be awaited.
#[async_trait]
pub trait VFile: Send + Sync + fmt::Debug {
    /// Returns the file's own name.
    fn name(&self) -> &str;

    /// Returns metadata attached to this specific version.
    fn metadata(&self) -> Option<&Metadata> {
        None
    }

    /// Reads the content as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the data cannot be produced or parsed.
    async fn json(&self) -> Result<Value>;

    /// Reads the content as text.
    ///
    /// # Errors
    ///
    /// Returns an error if the data cannot be produced or decoded.
    async fn text(&self) -> Result<String>;

    /// Reads the raw content bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the data cannot be produced.
    async fn bytes(&self) -> Result<Vec<u8>>;

    /// Returns an address the content can be loaded from.
    ///
    /// # Errors
    ///
    /// Returns an error if the data cannot be produced.
    async fn url(&self) -> Result<String>;

    /// Returns the remote view of this file, if it has one.
    fn as_remote(&self) -> Option<&dyn RemoteFile> {
        None
    }
}

/// A file backed by a network-retrievable address.
///
/// The filesystem issues a single HEAD request per remote file and memoizes
/// the resulting metadata in [`RemoteFile::header_cache`].
pub trait RemoteFile: VFile {
    /// The fetchable address of the content.
    fn remote_url(&self) -> &str;

    /// Cell holding metadata retrieved from the remote headers.
    fn header_cache(&self) -> &OnceCell<Metadata>;
}

/// Returns `true` if both handles point at the same file object.
///
/// # Examples
///
/// ```
/// # use afs_core::{FileRef, Result, VFile, same_file};
/// # use async_trait::async_trait;
/// # use serde_json::Value;
/// # use std::sync::Arc;
/// # #[derive(Debug)]
/// # struct Empty;
/// # #[async_trait]
/// # impl VFile for Empty {
/// #     fn name(&self) -> &str { "empty" }
/// #     async fn json(&self) -> Result<Value> { Ok(Value::Null) }
/// #     async fn text(&self) -> Result<String> { Ok(String::new()) }
/// #     async fn bytes(&self) -> Result<Vec<u8>> { Ok(Vec::new()) }
/// #     async fn url(&self) -> Result<String> { Ok(String::new()) }
/// # }
/// let a: FileRef = Arc::new(Empty);
/// let b: FileRef = Arc::new(Empty);
///
/// assert!(same_file(&a, &Arc::clone(&a)));
/// assert!(!same_file(&a, &b));
/// ```
#[must_use]
pub fn same_file(a: &FileRef, b: &FileRef) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}
