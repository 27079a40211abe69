//! The filesystem facade.
//!
//! [`AFileSystem`] owns a root [`Directory`] and exposes lookups, writes and
//! change notification over it. Every public operation wraps its errors in
//! [`Error::Operation`], naming the filesystem and the arguments:
//!
//! ```text
//! FS_1.add("/cow@0", "cow") Cannot set version 0
//! ```
//!
//! # Examples
//!
//! ```
//! use afs_files::AFile;
//! use afs_vfs::{AFileSystem, Directory};
//!
//! # async fn example() -> afs_core::Result<()> {
//! let fs = AFileSystem::new(Directory::new());
//!
//! fs.add("/cow", AFile::new("cow", "1").into_ref()).await?;
//! fs.label("/cow@1", "beef").await?;
//! fs.add("/cow", AFile::new("cow", "2").into_ref()).await?;
//!
//! assert_eq!(fs.find("/cow@beef").await?.text().await?.as_deref(), Some("1"));
//! assert_eq!(fs.find("/cow").await?.text().await?.as_deref(), Some("2"));
//! # Ok(())
//! # }
//! ```

use crate::lookup::Lookup;
use crate::metadata::{HeaderFetcher, HttpHeaderFetcher, cached_metadata};
use crate::regenerator::{Regenerator, Subscription};
use crate::slots::SlotSequence;
use crate::traverse::{FileTarget, Visitor, traverse};
use crate::tree::{Directory, DirectoryRef};
use crate::version::Version;
use afs_core::{Error, FileRef, FsConfig, Metadata, Result, same_file};
use async_trait::async_trait;
use futures::StreamExt;
use futures::stream::{self, BoxStream};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::{OnceCell, RwLock};

static FS_COUNTER: AtomicUsize = AtomicUsize::new(0);

fn next_name() -> String {
    format!("FS_{}", FS_COUNTER.fetch_add(1, Ordering::Relaxed) + 1)
}

/// A versioned, hierarchical namespace of files.
///
/// Paths are `/`-separated; the final segment may carry `@version`, where
/// the version is a signed 1-based index, `latest`, `earliest`, a label,
/// or (for [`AFileSystem::remove`] only) `*`. No suffix means latest.
///
/// Concurrent writes are not serialized beyond the individual node locks:
/// the last write to complete on a slot wins.
pub struct AFileSystem {
    name: String,
    read_only: bool,
    config: FsConfig,
    root: DirectoryRef,
    regenerator: Regenerator,
    fetcher: OnceCell<Arc<dyn HeaderFetcher>>,
}

impl AFileSystem {
    /// Creates a writable filesystem with a generated name.
    #[must_use]
    pub fn new(root: Directory) -> Self {
        Self::assemble(root, FsConfig::default(), None)
    }

    /// Creates a filesystem from a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if the configuration is invalid.
    pub fn with_config(root: Directory, config: FsConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::assemble(root, config, None))
    }

    /// Starts building a filesystem.
    ///
    /// # Examples
    ///
    /// ```
    /// use afs_vfs::{AFileSystem, Directory};
    ///
    /// let fs = AFileSystem::builder()
    ///     .root(Directory::new())
    ///     .name("SUT")
    ///     .read_only(true)
    ///     .build()?;
    ///
    /// assert_eq!(fs.name(), "SUT");
    /// assert!(fs.is_read_only());
    /// # Ok::<(), afs_core::Error>(())
    /// ```
    #[must_use]
    pub fn builder() -> AFileSystemBuilder {
        AFileSystemBuilder::default()
    }

    fn assemble(
        root: Directory,
        config: FsConfig,
        fetcher: Option<Arc<dyn HeaderFetcher>>,
    ) -> Self {
        let name = config.name.clone().unwrap_or_else(next_name);
        Self {
            name,
            read_only: config.read_only,
            config,
            root: Arc::new(RwLock::new(root)),
            regenerator: Regenerator::new(),
            fetcher: OnceCell::new_with(fetcher),
        }
    }

    /// The display name used in error messages.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns `true` if writes are rejected.
    #[must_use]
    pub const fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// The root directory.
    #[must_use]
    pub const fn root(&self) -> &DirectoryRef {
        &self.root
    }

    /// Number of write attempts settled so far, failed ones included.
    #[must_use]
    pub fn update_count(&self) -> u64 {
        self.regenerator.update_count()
    }

    /// Observes writes from now on.
    #[must_use]
    pub fn subscribe(&self) -> Subscription {
        self.regenerator.subscribe()
    }

    /// Looks up the file at `path`.
    ///
    /// Synthesizers installed on directories along the path run, but
    /// nothing else is created.
    ///
    /// # Errors
    ///
    /// Returns an error if the path shape does not match the tree, if the
    /// version is `*`, or if a synthesizer fails.
    pub async fn find(&self, path: &str) -> Result<Lookup> {
        traverse(self, path, &FindVisitor)
            .await
            .map(|file| Lookup::new(path, file))
            .map_err(|e| e.in_operation("find", &self.name, &[path]))
    }

    /// Waits until a file exists at `path` and returns it.
    ///
    /// Resolves immediately if the file is already there; otherwise checks
    /// again after every write. Never times out.
    ///
    /// # Errors
    ///
    /// Returns the first lookup error encountered.
    pub async fn wait_for(&self, path: &str) -> Result<FileRef> {
        let mut subscription = self.subscribe();
        loop {
            if let Some(file) = self.find(path).await?.into_inner() {
                return Ok(file);
            }
            // `self` owns the sender, so this only returns on a new write.
            subscription.changed().await;
        }
    }

    /// Streams the file at `path` as it changes.
    ///
    /// The current value comes first, then a new item after every write
    /// that changes which file the path resolves to. Consecutive items are
    /// never the same file. Absence is skipped unless `emit_absent` is set.
    /// Lookup errors are yielded as items and do not end the stream.
    pub fn watch<'a>(
        &'a self,
        path: &str,
        emit_absent: bool,
    ) -> BoxStream<'a, Result<Option<FileRef>>> {
        let state = WatchState {
            fs: self,
            path: path.to_string(),
            emit_absent,
            subscription: self.subscribe(),
            last: None,
            started: false,
        };
        stream::unfold(state, |mut state| async move {
            loop {
                if state.started {
                    state.subscription.changed().await?;
                }
                state.started = true;

                let current = match state.fs.find(&state.path).await {
                    Ok(lookup) => lookup.into_inner(),
                    Err(e) => return Some((Err(e), state)),
                };
                if current.is_none() && !state.emit_absent {
                    continue;
                }
                if state
                    .last
                    .as_ref()
                    .is_some_and(|last| same_entry(last.as_ref(), current.as_ref()))
                {
                    continue;
                }
                state.last = Some(current.clone());
                return Some((Ok(current), state));
            }
        })
        .boxed()
    }

    /// Returns the merged metadata of the file at `path`.
    ///
    /// Layers are applied in order, later ones winning: the name, the
    /// version's own metadata, the sequence metadata, and for remote files
    /// the headers from a HEAD request (fetched once per version).
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup fails or the HEAD request fails.
    pub async fn metadata(&self, path: &str) -> Result<Option<Metadata>> {
        traverse(self, path, &MetadataVisitor { fs: self })
            .await
            .map_err(|e| e.in_operation("metadata", &self.name, &[path]))
    }

    /// Stores `file` at `path`, creating missing directories.
    ///
    /// Without a version (or with `@latest`) the file becomes a new version;
    /// otherwise it is stored at the given version or label.
    ///
    /// # Errors
    ///
    /// - [`Error::ReadOnly`] on a read-only filesystem
    /// - [`Error::InvalidVersionAssignment`] if the version names no slot
    /// - path shape errors as for [`AFileSystem::find`]
    pub async fn add(&self, path: &str, file: FileRef) -> Result<FileRef> {
        let arguments = [path, file.name()];
        self.store("add", path, Some(Arc::clone(&file)), &arguments).await?;
        Ok(file)
    }

    /// Stores the file currently at `from` under `to`.
    ///
    /// If `from` is absent, the target is cleared: an appended version is a
    /// hole, a numbered version is emptied, a label is removed.
    ///
    /// # Errors
    ///
    /// As for [`AFileSystem::find`] and [`AFileSystem::add`].
    pub async fn copy(&self, from: &str, to: &str) -> Result<Option<FileRef>> {
        let file = self.find(from).await?.into_inner();
        self.store("copy", to, file.clone(), &[from, to]).await?;
        Ok(file)
    }

    /// Labels the file at `path`.
    ///
    /// The label names a copy of the reference, not the version number, so
    /// it keeps pointing at the same file after new versions are added.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IllegalVersion`] for an empty label, otherwise as
    /// for [`AFileSystem::copy`].
    pub async fn label(&self, path: &str, label: &str) -> Result<Option<FileRef>> {
        if label.is_empty() {
            return Err(Error::IllegalVersion {
                version: String::new(),
            }
            .in_operation("label", &self.name, &[path, label]));
        }
        let (prefix, last) = path.rfind('/').map_or(("", path), |i| path.split_at(i + 1));
        let name = last.split_once('@').map_or(last, |(name, _)| name);
        self.copy(path, &format!("{prefix}{name}@{label}")).await
    }

    /// Deletes the version or label at `path`.
    ///
    /// `@*` removes every version and label; no suffix removes the latest
    /// slot, leaving a hole. Missing paths are not an error.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ReadOnly`] on a read-only filesystem, or path shape
    /// errors as for [`AFileSystem::find`].
    pub async fn remove(&self, path: &str) -> Result<()> {
        if self.read_only {
            return Err(Error::ReadOnly.in_operation("remove", &self.name, &[path]));
        }
        let result = traverse(self, path, &RemoveVisitor).await.map(|_| ());
        self.settle("remove", path, &result);
        result.map_err(|e| e.in_operation("remove", &self.name, &[path]))
    }

    async fn store(
        &self,
        operation: &'static str,
        path: &str,
        file: Option<FileRef>,
        arguments: &[&str],
    ) -> Result<()> {
        if self.read_only {
            return Err(Error::ReadOnly.in_operation(operation, &self.name, arguments));
        }
        let result = traverse(self, path, &StoreVisitor { file }).await.map(|_| ());
        self.settle(operation, path, &result);
        result.map_err(|e| e.in_operation(operation, &self.name, arguments))
    }

    fn settle(&self, operation: &str, path: &str, result: &Result<()>) {
        match result {
            Ok(()) => {
                tracing::info!(fs = %self.name, operation, path, "write applied");
                self.regenerator.updated();
            }
            Err(e) => {
                tracing::warn!(fs = %self.name, operation, path, error = %e, "write failed");
                self.regenerator.errored(e.to_string());
            }
        }
    }

    async fn fetcher(&self) -> Result<Arc<dyn HeaderFetcher>> {
        self.fetcher
            .get_or_try_init(|| async {
                let fetcher: Arc<dyn HeaderFetcher> =
                    Arc::new(HttpHeaderFetcher::new(&self.config)?);
                Ok(fetcher)
            })
            .await
            .cloned()
    }
}

impl fmt::Debug for AFileSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AFileSystem")
            .field("name", &self.name)
            .field("read_only", &self.read_only)
            .field("update_count", &self.update_count())
            .finish_non_exhaustive()
    }
}

fn same_entry(a: Option<&FileRef>, b: Option<&FileRef>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => same_file(a, b),
        (None, None) => true,
        _ => false,
    }
}

struct WatchState<'a> {
    fs: &'a AFileSystem,
    path: String,
    emit_absent: bool,
    subscription: Subscription,
    last: Option<Option<FileRef>>,
    started: bool,
}

struct FindVisitor;

#[async_trait]
impl Visitor for FindVisitor {
    type Output = FileRef;

    async fn file(&self, target: FileTarget<'_>) -> Result<Option<FileRef>> {
        target.sequence.read().await.get(target.version.as_ref())
    }
}

struct MetadataVisitor<'a> {
    fs: &'a AFileSystem,
}

#[async_trait]
impl Visitor for MetadataVisitor<'_> {
    type Output = Metadata;

    async fn file(&self, target: FileTarget<'_>) -> Result<Option<Metadata>> {
        let (file, sequence_metadata) = {
            let sequence = target.sequence.read().await;
            (
                sequence.get(target.version.as_ref())?,
                sequence.metadata().cloned(),
            )
        };
        let Some(file) = file else {
            return Ok(None);
        };

        let mut merged = Metadata::new(target.name);
        if let Some(own) = file.metadata() {
            merged.overlay(own);
        }
        if let Some(sequence_metadata) = &sequence_metadata {
            merged.overlay(sequence_metadata);
        }
        if let Some(remote) = file.as_remote() {
            let fetcher = self.fs.fetcher().await?;
            merged.overlay(&cached_metadata(fetcher.as_ref(), remote).await?);
        }
        Ok(Some(merged))
    }
}

struct StoreVisitor {
    file: Option<FileRef>,
}

#[async_trait]
impl Visitor for StoreVisitor {
    type Output = ();

    async fn file(&self, target: FileTarget<'_>) -> Result<Option<()>> {
        let mut sequence = target.sequence.write().await;
        match &target.version {
            None | Some(Version::Latest) => sequence.append(self.file.clone()),
            Some(version) => sequence.set(version, self.file.clone())?,
        }
        Ok(Some(()))
    }

    fn create_files(&self, _name: &str) -> Option<SlotSequence> {
        Some(SlotSequence::new())
    }

    fn create_directory(&self, _name: &str) -> Option<Directory> {
        Some(Directory::new())
    }
}

struct RemoveVisitor;

#[async_trait]
impl Visitor for RemoveVisitor {
    type Output = ();

    async fn file(&self, target: FileTarget<'_>) -> Result<Option<()>> {
        let version = target.version.unwrap_or(Version::Latest);
        target.sequence.write().await.delete(&version);
        Ok(Some(()))
    }
}

/// Builder for [`AFileSystem`].
#[derive(Default)]
pub struct AFileSystemBuilder {
    root: Directory,
    config: FsConfig,
    fetcher: Option<Arc<dyn HeaderFetcher>>,
}

impl AFileSystemBuilder {
    /// Sets the initial tree.
    #[must_use]
    pub fn root(mut self, root: Directory) -> Self {
        self.root = root;
        self
    }

    /// Replaces the whole configuration.
    #[must_use]
    pub fn config(mut self, config: FsConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the display name.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.config.name = Some(name.into());
        self
    }

    /// Rejects every write.
    #[must_use]
    pub const fn read_only(mut self, read_only: bool) -> Self {
        self.config.read_only = read_only;
        self
    }

    /// Uses `fetcher` for remote metadata instead of HTTP.
    #[must_use]
    pub fn header_fetcher(mut self, fetcher: Arc<dyn HeaderFetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    /// Builds the filesystem.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if the configuration is invalid.
    pub fn build(self) -> Result<AFileSystem> {
        self.config.validate()?;
        Ok(AFileSystem::assemble(self.root, self.config, self.fetcher))
    }
}

impl fmt::Debug for AFileSystemBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AFileSystemBuilder")
            .field("root", &self.root)
            .field("config", &self.config)
            .field("fetcher", &self.fetcher.is_some())
            .finish()
    }
}
