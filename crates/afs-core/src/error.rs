//! Error types for the attachment filesystem.
//!
//! A missing file is not an error: lookups return `Option`. The variants here
//! cover path-shape mismatches, write violations, capability failures, and
//! the context wrapper added by every `AFileSystem` operation.
//!
//! # Examples
//!
//! ```
//! use afs_core::{Error, Result};
//!
//! fn write(read_only: bool) -> Result<()> {
//!     if read_only {
//!         return Err(Error::ReadOnly);
//!     }
//!     Ok(())
//! }
//!
//! let err = write(true).unwrap_err();
//! assert!(err.is_read_only());
//! ```

use thiserror::Error;

/// Main error type for the attachment filesystem.
///
/// All errors in the workspace use this type. Errors raised inside a facade
/// operation arrive wrapped in [`Error::Operation`]; the `is_xxx()` helpers
/// look through that wrapper.
#[derive(Error, Debug)]
pub enum Error {
    /// A path segment that must be a directory names a version sequence.
    #[error("{path} is not a directory")]
    NotADirectory {
        /// The full path being traversed
        path: String,
    },

    /// The final path segment names a directory rather than a file.
    #[error("{path} is a directory")]
    NotAFile {
        /// The full path being traversed
        path: String,
    },

    /// Write attempted against a read-only filesystem.
    #[error("Read only filesystem.")]
    ReadOnly,

    /// The requested version cannot be assigned (for example `@0`, or a
    /// negative index reaching before the first version).
    #[error("Cannot set version {version}")]
    InvalidVersionAssignment {
        /// The version token as written
        version: String,
    },

    /// A version token that is only meaningful in another context, such as
    /// `*` outside a delete.
    #[error("Illegal version: {version}")]
    IllegalVersion {
        /// The version token as written
        version: String,
    },

    /// The path has no final name, so it addresses the root as a file.
    #[error("Accessing root as file.")]
    RootAccess,

    /// An explicit presence check found nothing.
    ///
    /// Only raised by the assert-present adapter; plain lookups report
    /// absence as `None`.
    #[error("Virtual file not found: {path}")]
    NotFound {
        /// The path that was looked up
        path: String,
    },

    /// Retrieving remote data or headers failed.
    #[error("Failed to fetch {url}")]
    FetchFailed {
        /// The address being fetched
        url: String,
        /// Underlying error cause
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// File data could not be produced or converted.
    #[error("Data error: {message}")]
    DataError {
        /// Description of the conversion failure
        message: String,
        /// Optional underlying error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration is invalid.
    #[error("Configuration error: {message}")]
    InvalidConfig {
        /// Description of the configuration problem
        message: String,
    },

    /// An error annotated with the filesystem operation that raised it.
    ///
    /// Rendered as `NAME.op("arg", ...) cause`.
    #[error("{filesystem}.{operation}({arguments}) {source}")]
    Operation {
        /// Operation name (`find`, `add`, ...)
        operation: &'static str,
        /// Display name of the filesystem
        filesystem: String,
        /// JSON-serialized arguments, comma separated
        arguments: String,
        /// The error raised by the operation
        #[source]
        source: Box<Self>,
    },
}

impl Error {
    /// Wraps `self` with operation context.
    ///
    /// Each argument is serialized as a JSON string.
    ///
    /// # Examples
    ///
    /// ```
    /// use afs_core::Error;
    ///
    /// let err = Error::ReadOnly.in_operation("add", "FS_1", &["/cow"]);
    /// assert_eq!(err.to_string(), r#"FS_1.add("/cow") Read only filesystem."#);
    /// assert!(err.is_read_only());
    /// ```
    #[must_use]
    pub fn in_operation(
        self,
        operation: &'static str,
        filesystem: &str,
        arguments: &[&str],
    ) -> Self {
        let arguments = arguments
            .iter()
            .map(|a| serde_json::Value::from(*a).to_string())
            .collect::<Vec<_>>()
            .join(", ");
        Self::Operation {
            operation,
            filesystem: filesystem.to_string(),
            arguments,
            source: Box::new(self),
        }
    }

    /// Returns the innermost error, skipping operation wrappers.
    #[must_use]
    pub fn root_cause(&self) -> &Self {
        match self {
            Self::Operation { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// Returns the name of the outermost operation, if the error is wrapped.
    #[must_use]
    pub const fn operation(&self) -> Option<&'static str> {
        match self {
            Self::Operation { operation, .. } => Some(*operation),
            _ => None,
        }
    }

    /// Returns `true` if a directory was expected but a file sequence found.
    ///
    /// # Examples
    ///
    /// ```
    /// use afs_core::Error;
    ///
    /// let err = Error::NotADirectory { path: "/a/b".to_string() };
    /// assert!(err.is_not_directory());
    /// ```
    #[must_use]
    pub fn is_not_directory(&self) -> bool {
        matches!(self.root_cause(), Self::NotADirectory { .. })
    }

    /// Returns `true` if a file sequence was expected but a directory found.
    #[must_use]
    pub fn is_not_file(&self) -> bool {
        matches!(self.root_cause(), Self::NotAFile { .. })
    }

    /// Returns `true` if this is a read-only violation.
    #[must_use]
    pub fn is_read_only(&self) -> bool {
        matches!(self.root_cause(), Self::ReadOnly)
    }

    /// Returns `true` if a version could not be assigned or is illegal here.
    ///
    /// # Examples
    ///
    /// ```
    /// use afs_core::Error;
    ///
    /// let err = Error::InvalidVersionAssignment { version: "0".to_string() };
    /// assert!(err.is_invalid_version());
    ///
    /// let err = Error::IllegalVersion { version: "*".to_string() };
    /// assert!(err.is_invalid_version());
    /// ```
    #[must_use]
    pub fn is_invalid_version(&self) -> bool {
        matches!(
            self.root_cause(),
            Self::InvalidVersionAssignment { .. } | Self::IllegalVersion { .. }
        )
    }

    /// Returns `true` if the path addressed the root as a file.
    #[must_use]
    pub fn is_root_access(&self) -> bool {
        matches!(self.root_cause(), Self::RootAccess)
    }

    /// Returns `true` if an explicit presence check failed.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self.root_cause(), Self::NotFound { .. })
    }

    /// Returns `true` if remote retrieval failed.
    #[must_use]
    pub fn is_fetch_error(&self) -> bool {
        matches!(self.root_cause(), Self::FetchFailed { .. })
    }

    /// Returns `true` if file data could not be produced or converted.
    #[must_use]
    pub fn is_data_error(&self) -> bool {
        matches!(self.root_cause(), Self::DataError { .. })
    }
}

/// Result type alias for filesystem operations.
pub type Result<T> = std::result::Result<T, Error>;
