//! Path traversal.
//!
//! [`traverse`] walks a slash-separated path from the filesystem root. Every
//! segment but the last must name a directory; the last names a version
//! sequence and may carry an `@version` suffix. What happens at each step is
//! decided by a [`Visitor`]:
//!
//! - `directory` is called for every directory passed through
//! - `file` is called with the sequence named by the final segment
//! - `create_directory` / `create_files` supply missing nodes after the
//!   directory's own synthesizers have declined
//!
//! Created nodes are stored before the walk continues. No lock is held
//! while a synthesizer or hook runs, so concurrent traversals interleave
//! freely; if two of them create the same name, the first store wins.

use crate::filesystem::AFileSystem;
use crate::slots::SlotSequence;
use crate::tree::{Directory, DirectoryRef, DirectoryRequest, FileRequest, Node, SequenceRef};
use crate::version::Version;
use afs_core::{Error, Result};
use async_trait::async_trait;
use std::sync::Arc;

/// The sequence reached by a traversal.
#[derive(Debug, Clone)]
pub struct FileTarget<'a> {
    /// The full path being resolved.
    pub path: &'a str,
    /// The sequence's name.
    pub name: &'a str,
    /// The version suffix, if any.
    pub version: Option<Version>,
    /// The sequence itself.
    pub sequence: SequenceRef,
}

/// Per-operation behaviour plugged into [`traverse`].
#[async_trait]
pub trait Visitor: Send + Sync {
    /// Result of a successful traversal.
    type Output: Send;

    /// Acts on the sequence named by the final segment.
    ///
    /// # Errors
    ///
    /// Errors abort the traversal.
    async fn file(&self, target: FileTarget<'_>) -> Result<Option<Self::Output>>;

    /// Observes a directory the walk passes through.
    ///
    /// # Errors
    ///
    /// Errors abort the traversal.
    async fn directory(&self, _path: &str, _name: &str, _parent: &DirectoryRef) -> Result<()> {
        Ok(())
    }

    /// Supplies a sequence for a missing final name.
    fn create_files(&self, _name: &str) -> Option<SlotSequence> {
        None
    }

    /// Supplies a directory for a missing intermediate name.
    fn create_directory(&self, _name: &str) -> Option<Directory> {
        None
    }
}

/// Splits a final segment into its name and optional version.
///
/// An empty suffix (`name@`) counts as no version.
#[must_use]
pub fn split_version(segment: &str) -> (&str, Option<Version>) {
    match segment.split_once('@') {
        Some((name, "")) => (name, None),
        Some((name, version)) => (name, Some(Version::parse(version))),
        None => (segment, None),
    }
}

fn plain_name(segment: &str) -> &str {
    segment.split_once('@').map_or(segment, |(name, _)| name)
}

/// Walks `path` from the root of `fs`, handing the final sequence to `visitor`.
///
/// Empty segments are skipped, so `/a//b` and `a/b` are the same path.
/// Returns `Ok(None)` when a node is missing and nothing creates it.
///
/// # Errors
///
/// - [`Error::RootAccess`] if the path has no segments
/// - [`Error::NotADirectory`] if an intermediate segment names a sequence
/// - [`Error::NotAFile`] if the final segment names a directory
/// - any error raised by a synthesizer or the visitor
pub async fn traverse<V: Visitor + ?Sized>(
    fs: &AFileSystem,
    path: &str,
    visitor: &V,
) -> Result<Option<V::Output>> {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    let Some((last, parents)) = segments.split_last() else {
        return Err(Error::RootAccess);
    };

    let mut current = Arc::clone(fs.root());
    for (depth, segment) in parents.iter().enumerate() {
        let name = plain_name(segment);
        let existing = current.read().await.get(name).cloned();
        let node = match existing {
            Some(node) => node,
            None => {
                let rest = segments[depth + 1..].iter().map(ToString::to_string).collect();
                match synthesize_directory(fs, path, name, rest, &current, visitor).await? {
                    Some(directory) => current.write().await.get_or_insert(name, directory.into()),
                    None => return Ok(None),
                }
            }
        };
        visitor.directory(path, name, &current).await?;
        current = match node {
            Node::Directory(directory) => directory,
            Node::Files(_) => {
                return Err(Error::NotADirectory {
                    path: format!("/{}", segments[..=depth].join("/")),
                });
            }
        };
    }

    let (name, version) = split_version(last);
    let existing = current.read().await.get(name).cloned();
    let node = match existing {
        Some(node) => node,
        None => match synthesize_files(fs, path, name, version.clone(), &current, visitor).await? {
            Some(sequence) => current.write().await.get_or_insert(name, sequence.into()),
            None => return Ok(None),
        },
    };

    match node {
        Node::Files(sequence) => {
            visitor
                .file(FileTarget {
                    path,
                    name,
                    version,
                    sequence,
                })
                .await
        }
        Node::Directory(_) => Err(Error::NotAFile {
            path: path.to_string(),
        }),
    }
}

async fn synthesize_directory<V: Visitor + ?Sized>(
    fs: &AFileSystem,
    path: &str,
    name: &str,
    rest: Vec<String>,
    parent: &DirectoryRef,
    visitor: &V,
) -> Result<Option<Directory>> {
    let synthesizer = parent.read().await.directory_synthesizer();
    if let Some(synthesizer) = synthesizer {
        let request = DirectoryRequest {
            path: path.to_string(),
            name: name.to_string(),
            rest,
            parent: Arc::clone(parent),
        };
        if let Some(directory) = synthesizer.synthesize(fs, request).await? {
            tracing::debug!(fs = fs.name(), path, name, "synthesized directory");
            return Ok(Some(directory));
        }
    }
    Ok(visitor.create_directory(name))
}

async fn synthesize_files<V: Visitor + ?Sized>(
    fs: &AFileSystem,
    path: &str,
    name: &str,
    version: Option<Version>,
    parent: &DirectoryRef,
    visitor: &V,
) -> Result<Option<SlotSequence>> {
    let synthesizer = parent.read().await.file_synthesizer();
    if let Some(synthesizer) = synthesizer {
        let request = FileRequest {
            path: path.to_string(),
            name: name.to_string(),
            version,
            parent: Arc::clone(parent),
        };
        if let Some(sequence) = synthesizer.synthesize(fs, request).await? {
            tracing::debug!(fs = fs.name(), path, name, "synthesized files");
            return Ok(Some(sequence));
        }
    }
    Ok(visitor.create_files(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Records the path of every sequence and directory it sees.
    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<String>>,
        create: bool,
    }

    #[async_trait]
    impl Visitor for Recorder {
        type Output = usize;

        async fn file(&self, target: FileTarget<'_>) -> Result<Option<usize>> {
            self.seen.lock().unwrap().push(format!("file:{}", target.name));
            Ok(Some(target.sequence.read().await.len()))
        }

        async fn directory(&self, _path: &str, name: &str, _parent: &DirectoryRef) -> Result<()> {
            self.seen.lock().unwrap().push(format!("dir:{name}"));
            Ok(())
        }

        fn create_files(&self, _name: &str) -> Option<SlotSequence> {
            self.create.then(SlotSequence::new)
        }

        fn create_directory(&self, _name: &str) -> Option<Directory> {
            self.create.then(Directory::new)
        }
    }

    fn fs() -> AFileSystem {
        AFileSystem::new(
            Directory::new()
                .with_dir("a", Directory::new().with_files("b", SlotSequence::file("b", "x")))
                .with_files("top", SlotSequence::file("top", "y")),
        )
    }

    #[test]
    fn test_split_version() {
        assert_eq!(split_version("a"), ("a", None));
        assert_eq!(split_version("a@"), ("a", None));
        assert_eq!(split_version("a@2"), ("a", Some(Version::Index(2))));
        assert_eq!(split_version("a@x@y"), ("a", Some(Version::Label("x@y".to_string()))));
    }

    #[tokio::test]
    async fn test_walks_to_file() {
        let fs = fs();
        let visitor = Recorder::default();

        assert_eq!(traverse(&fs, "/a/b@1", &visitor).await.unwrap(), Some(1));
        assert_eq!(*visitor.seen.lock().unwrap(), ["dir:a", "file:b"]);
    }

    #[tokio::test]
    async fn test_empty_segments_are_skipped() {
        let fs = fs();
        let visitor = Recorder::default();

        assert_eq!(traverse(&fs, "a//b", &visitor).await.unwrap(), Some(1));
    }

    #[tokio::test]
    async fn test_root_access() {
        let fs = fs();
        for path in ["", "/", "//"] {
            let err = traverse(&fs, path, &Recorder::default()).await.unwrap_err();
            assert!(err.is_root_access(), "{path:?}");
        }
    }

    #[tokio::test]
    async fn test_shape_mismatches() {
        let fs = fs();

        let err = traverse(&fs, "/top/x", &Recorder::default()).await.unwrap_err();
        assert!(matches!(err, Error::NotADirectory { ref path } if path == "/top"));

        let err = traverse(&fs, "/a", &Recorder::default()).await.unwrap_err();
        assert!(err.is_not_file());
    }

    #[tokio::test]
    async fn test_missing_without_create_is_none() {
        let fs = fs();

        assert_eq!(traverse(&fs, "/x/y", &Recorder::default()).await.unwrap(), None);
        assert_eq!(traverse(&fs, "/a/z", &Recorder::default()).await.unwrap(), None);
        assert!(fs.root().read().await.get("x").is_none());
    }

    #[tokio::test]
    async fn test_create_hooks_memoize() {
        let fs = fs();
        let visitor = Recorder {
            create: true,
            ..Recorder::default()
        };

        assert_eq!(traverse(&fs, "/x/y/z", &visitor).await.unwrap(), Some(0));

        let root = fs.root().read().await;
        let Some(Node::Directory(x)) = root.get("x") else {
            panic!("expected directory x");
        };
        let x = x.read().await;
        assert!(matches!(x.get("y"), Some(Node::Directory(_))));
    }
}
