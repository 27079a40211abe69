//! Descriptive metadata for files and version sequences.
//!
//! Metadata can be attached at three levels: to a single version (the file
//! itself), to a whole version sequence, and as a cached record retrieved
//! once from a remote file's headers. Lookups overlay the layers with
//! [`Metadata::overlay`].
//!
//! # Examples
//!
//! ```
//! use afs_core::Metadata;
//!
//! let mut merged = Metadata::new("table1").with_content_type("text/csv");
//! merged.overlay(&Metadata::default().with_extra("owner", "ops"));
//!
//! assert_eq!(merged.name.as_deref(), Some("table1"));
//! assert_eq!(merged.content_type.as_deref(), Some("text/csv"));
//! assert_eq!(merged.extra["owner"], "ops");
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// A metadata record.
///
/// Known keys are typed fields; anything else lives in `extra`. Every field
/// is optional so that partial layers can be overlaid on each other.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    /// Name of the file or sequence.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Address the content can be retrieved from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// MIME type of the content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,

    /// Content length in bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<u64>,

    /// Last modification time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modification_date: Option<DateTime<Utc>>,

    /// Entity tag reported by the server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,

    /// Arbitrary additional keys.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Metadata {
    /// Creates a record carrying only a name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Sets the content type.
    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Adds an extra key.
    #[must_use]
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Overlays `other` onto `self`; every field set in `other` wins.
    pub fn overlay(&mut self, other: &Self) {
        fn take<T: Clone>(slot: &mut Option<T>, value: Option<&T>) {
            if let Some(value) = value {
                *slot = Some(value.clone());
            }
        }

        take(&mut self.name, other.name.as_ref());
        take(&mut self.url, other.url.as_ref());
        take(&mut self.content_type, other.content_type.as_ref());
        take(&mut self.length, other.length.as_ref());
        take(&mut self.modification_date, other.modification_date.as_ref());
        take(&mut self.etag, other.etag.as_ref());
        for (key, value) in &other.extra {
            self.extra.insert(key.clone(), value.clone());
        }
    }

    /// Returns `true` if no field is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}
