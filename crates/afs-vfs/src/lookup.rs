//! Result of a path lookup.

use afs_core::{Error, FileRef, Result};
use serde_json::Value;

/// A possibly absent file found at a path.
///
/// The read methods forward to the file and return `Ok(None)` when nothing
/// was found. Use [`Lookup::exists`] to turn absence into an error instead.
///
/// # Examples
///
/// ```
/// use afs_vfs::{AFileSystem, Directory};
///
/// # async fn example() -> afs_core::Result<()> {
/// let fs = AFileSystem::new(Directory::new());
/// let missing = fs.find("/nothing").await?;
///
/// assert_eq!(missing.json().await?, None);
/// assert!(missing.exists().unwrap_err().is_not_found());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Lookup {
    path: String,
    file: Option<FileRef>,
}

impl Lookup {
    pub(crate) fn new(path: impl Into<String>, file: Option<FileRef>) -> Self {
        Self {
            path: path.into(),
            file,
        }
    }

    /// The path that was looked up.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns `true` if a file was found.
    #[must_use]
    pub const fn is_found(&self) -> bool {
        self.file.is_some()
    }

    /// The found file, if any.
    #[must_use]
    pub const fn file(&self) -> Option<&FileRef> {
        self.file.as_ref()
    }

    /// Consumes the lookup, returning the found file.
    #[must_use]
    pub fn into_inner(self) -> Option<FileRef> {
        self.file
    }

    /// Returns the found file or [`Error::NotFound`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if nothing was found.
    pub fn exists(&self) -> Result<FileRef> {
        self.file.clone().ok_or_else(|| Error::NotFound {
            path: self.path.clone(),
        })
    }

    /// The found file's name.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.file.as_deref().map(afs_core::VFile::name)
    }

    /// Reads the file as JSON.
    ///
    /// # Errors
    ///
    /// Returns the file's read error.
    pub async fn json(&self) -> Result<Option<Value>> {
        match &self.file {
            Some(file) => file.json().await.map(Some),
            None => Ok(None),
        }
    }

    /// Reads the file as text.
    ///
    /// # Errors
    ///
    /// Returns the file's read error.
    pub async fn text(&self) -> Result<Option<String>> {
        match &self.file {
            Some(file) => file.text().await.map(Some),
            None => Ok(None),
        }
    }

    /// Reads the file's bytes.
    ///
    /// # Errors
    ///
    /// Returns the file's read error.
    pub async fn bytes(&self) -> Result<Option<Vec<u8>>> {
        match &self.file {
            Some(file) => file.bytes().await.map(Some),
            None => Ok(None),
        }
    }

    /// Returns the file's URL.
    ///
    /// # Errors
    ///
    /// Returns the file's read error.
    pub async fn url(&self) -> Result<Option<String>> {
        match &self.file {
            Some(file) => file.url().await.map(Some),
            None => Ok(None),
        }
    }
}

impl From<Lookup> for Option<FileRef> {
    fn from(lookup: Lookup) -> Self {
        lookup.file
    }
}
