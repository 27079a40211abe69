//! Configuration types for an attachment filesystem.
//!
//! # Examples
//!
//! ```
//! use afs_core::FsConfig;
//! use std::time::Duration;
//!
//! // Use default configuration
//! let config = FsConfig::default();
//! assert!(!config.read_only);
//!
//! // Create custom configuration
//! let custom = FsConfig {
//!     name: Some("data".to_string()),
//!     head_timeout: Duration::from_secs(5),
//!     ..Default::default()
//! };
//! assert!(custom.validate().is_ok());
//! ```

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Filesystem configuration.
///
/// Controls the display name used in error messages, whether writes are
/// allowed, and how header metadata is retrieved for remote files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FsConfig {
    /// Display name used in error messages.
    ///
    /// If `None`, a unique `FS_<n>` name is generated.
    /// Default: None
    pub name: Option<String>,

    /// Reject every write operation.
    ///
    /// Default: false
    pub read_only: bool,

    /// Timeout for the HEAD request that retrieves remote metadata.
    ///
    /// Default: 30 seconds
    pub head_timeout: Duration,

    /// User agent sent with metadata requests.
    ///
    /// Default: `afs/<crate version>`
    pub user_agent: String,
}

impl Default for FsConfig {
    fn default() -> Self {
        Self {
            name: None,
            read_only: false,
            head_timeout: Duration::from_secs(30),
            user_agent: concat!("afs/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl FsConfig {
    /// Creates a new configuration builder.
    ///
    /// # Examples
    ///
    /// ```
    /// use afs_core::FsConfig;
    ///
    /// let config = FsConfig::builder().name("SUT").read_only(true).build();
    ///
    /// assert_eq!(config.name.as_deref(), Some("SUT"));
    /// assert!(config.read_only);
    /// ```
    #[must_use]
    pub fn builder() -> FsConfigBuilder {
        FsConfigBuilder::new()
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidConfig` if:
    /// - The HEAD timeout is zero
    /// - The user agent is empty
    /// - An explicit name is empty
    pub fn validate(&self) -> Result<()> {
        if self.head_timeout.is_zero() {
            return Err(Error::InvalidConfig {
                message: "HEAD timeout must be greater than zero".to_string(),
            });
        }

        if self.user_agent.trim().is_empty() {
            return Err(Error::InvalidConfig {
                message: "User agent cannot be empty".to_string(),
            });
        }

        if let Some(name) = &self.name
            && name.is_empty()
        {
            return Err(Error::InvalidConfig {
                message: "Filesystem name cannot be empty".to_string(),
            });
        }

        Ok(())
    }
}

/// Builder for `FsConfig`.
#[derive(Debug)]
pub struct FsConfigBuilder {
    config: FsConfig,
}

impl FsConfigBuilder {
    /// Creates a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: FsConfig::default(),
        }
    }

    /// Sets the display name.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.config.name = Some(name.into());
        self
    }

    /// Makes the filesystem read-only.
    #[must_use]
    pub const fn read_only(mut self, read_only: bool) -> Self {
        self.config.read_only = read_only;
        self
    }

    /// Sets the HEAD request timeout.
    #[must_use]
    pub const fn head_timeout(mut self, timeout: Duration) -> Self {
        self.config.head_timeout = timeout;
        self
    }

    /// Sets the user agent for metadata requests.
    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Builds the configuration.
    #[must_use]
    pub fn build(self) -> FsConfig {
        self.config
    }
}

impl Default for FsConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
