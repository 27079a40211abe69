//! Directory nodes and synthesis hooks.
//!
//! A [`Directory`] maps names to child nodes. Each child is either another
//! directory or a [`SlotSequence`]; a name never holds both. A directory may
//! carry a [`FileSynthesizer`] and a [`DirectorySynthesizer`] that are asked
//! to create a missing child the first time a path reaches it. Whatever they
//! return is stored, so each name is synthesized at most once.
//!
//! # Examples
//!
//! ```
//! use afs_vfs::{Directory, SlotSequence};
//!
//! let root = Directory::new()
//!     .with_files("readme", SlotSequence::file("readme", "hello"))
//!     .with_dir(
//!         "data",
//!         Directory::new().with_file_fn(|request| async move {
//!             Ok(Some(SlotSequence::file(&request.name, "generated")))
//!         }),
//!     );
//!
//! assert_eq!(root.len(), 2);
//! ```

use crate::filesystem::AFileSystem;
use crate::slots::SlotSequence;
use crate::version::Version;
use afs_core::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Shared handle to a directory.
pub type DirectoryRef = Arc<RwLock<Directory>>;

/// Shared handle to a version sequence.
pub type SequenceRef = Arc<RwLock<SlotSequence>>;

/// A child of a directory.
#[derive(Debug, Clone)]
pub enum Node {
    /// A nested directory.
    Directory(DirectoryRef),
    /// The versions stored under a name.
    Files(SequenceRef),
}

impl From<Directory> for Node {
    fn from(directory: Directory) -> Self {
        Self::Directory(Arc::new(RwLock::new(directory)))
    }
}

impl From<SlotSequence> for Node {
    fn from(sequence: SlotSequence) -> Self {
        Self::Files(Arc::new(RwLock::new(sequence)))
    }
}

/// Context handed to a [`FileSynthesizer`].
#[derive(Debug, Clone)]
pub struct FileRequest {
    /// The full path being resolved.
    pub path: String,
    /// The missing name.
    pub name: String,
    /// The requested version, if the path had one.
    pub version: Option<Version>,
    /// The directory the name is missing from.
    pub parent: DirectoryRef,
}

/// Context handed to a [`DirectorySynthesizer`].
#[derive(Debug, Clone)]
pub struct DirectoryRequest {
    /// The full path being resolved.
    pub path: String,
    /// The missing name.
    pub name: String,
    /// Segments after `name`, the last one still carrying its version.
    pub rest: Vec<String>,
    /// The directory the name is missing from.
    pub parent: DirectoryRef,
}

/// Creates version sequences for names missing from a directory.
#[async_trait]
pub trait FileSynthesizer: Send + Sync {
    /// Returns a sequence for `request.name`, or `None` to decline.
    ///
    /// # Errors
    ///
    /// Errors abort the traversal and reach the caller.
    async fn synthesize(
        &self,
        fs: &AFileSystem,
        request: FileRequest,
    ) -> Result<Option<SlotSequence>>;
}

/// Creates subdirectories for names missing from a directory.
#[async_trait]
pub trait DirectorySynthesizer: Send + Sync {
    /// Returns a directory for `request.name`, or `None` to decline.
    ///
    /// # Errors
    ///
    /// Errors abort the traversal and reach the caller.
    async fn synthesize(
        &self,
        fs: &AFileSystem,
        request: DirectoryRequest,
    ) -> Result<Option<Directory>>;
}

struct FileFn<F>(F);

#[async_trait]
impl<F, Fut> FileSynthesizer for FileFn<F>
where
    F: Fn(FileRequest) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Option<SlotSequence>>> + Send,
{
    async fn synthesize(
        &self,
        _fs: &AFileSystem,
        request: FileRequest,
    ) -> Result<Option<SlotSequence>> {
        (self.0)(request).await
    }
}

struct DirectoryFn<F>(F);

#[async_trait]
impl<F, Fut> DirectorySynthesizer for DirectoryFn<F>
where
    F: Fn(DirectoryRequest) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Option<Directory>>> + Send,
{
    async fn synthesize(
        &self,
        _fs: &AFileSystem,
        request: DirectoryRequest,
    ) -> Result<Option<Directory>> {
        (self.0)(request).await
    }
}

/// A directory node.
#[derive(Default)]
pub struct Directory {
    entries: HashMap<String, Node>,
    file_synthesizer: Option<Arc<dyn FileSynthesizer>>,
    directory_synthesizer: Option<Arc<dyn DirectorySynthesizer>>,
}

impl Directory {
    /// Creates an empty directory without synthesizers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a subdirectory.
    #[must_use]
    pub fn with_dir(mut self, name: impl Into<String>, directory: Self) -> Self {
        self.entries.insert(name.into(), directory.into());
        self
    }

    /// Adds a version sequence.
    #[must_use]
    pub fn with_files(mut self, name: impl Into<String>, sequence: SlotSequence) -> Self {
        self.entries.insert(name.into(), sequence.into());
        self
    }

    /// Installs a file synthesizer.
    #[must_use]
    pub fn with_file_synthesizer(mut self, synthesizer: Arc<dyn FileSynthesizer>) -> Self {
        self.file_synthesizer = Some(synthesizer);
        self
    }

    /// Installs a closure as the file synthesizer.
    #[must_use]
    pub fn with_file_fn<F, Fut>(self, f: F) -> Self
    where
        F: Fn(FileRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Option<SlotSequence>>> + Send + 'static,
    {
        self.with_file_synthesizer(Arc::new(FileFn(f)))
    }

    /// Installs a directory synthesizer.
    #[must_use]
    pub fn with_directory_synthesizer(
        mut self,
        synthesizer: Arc<dyn DirectorySynthesizer>,
    ) -> Self {
        self.directory_synthesizer = Some(synthesizer);
        self
    }

    /// Installs a closure as the directory synthesizer.
    #[must_use]
    pub fn with_directory_fn<F, Fut>(self, f: F) -> Self
    where
        F: Fn(DirectoryRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Option<Self>>> + Send + 'static,
    {
        self.with_directory_synthesizer(Arc::new(DirectoryFn(f)))
    }

    /// Returns the child stored under `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Node> {
        self.entries.get(name)
    }

    /// Stores `node` under `name` unless the name is already taken.
    ///
    /// Returns the node that ends up stored.
    pub fn get_or_insert(&mut self, name: &str, node: Node) -> Node {
        self.entries
            .entry(name.to_string())
            .or_insert(node)
            .clone()
    }

    /// Iterates over child names.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Number of children.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if there are no children.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn file_synthesizer(&self) -> Option<Arc<dyn FileSynthesizer>> {
        self.file_synthesizer.clone()
    }

    pub(crate) fn directory_synthesizer(&self) -> Option<Arc<dyn DirectorySynthesizer>> {
        self.directory_synthesizer.clone()
    }
}

impl fmt::Debug for Directory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.names().collect();
        names.sort_unstable();
        f.debug_struct("Directory")
            .field("entries", &names)
            .field("file_synthesizer", &self.file_synthesizer.is_some())
            .field("directory_synthesizer", &self.directory_synthesizer.is_some())
            .finish()
    }
}
