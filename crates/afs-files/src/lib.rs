//! File capabilities for the attachment filesystem.
//!
//! Provides the two concrete [`VFile`](afs_core::VFile) implementations
//! that trees are usually built from:
//!
//! - [`AFile`]: wraps locally supplied data (text, bytes, JSON, another
//!   file, or a lazy producer) behind the uniform read interface
//! - [`Attachment`]: a network-backed [`RemoteFile`](afs_core::RemoteFile)
//!   whose metadata can be retrieved with a HEAD request
//!
//! # Examples
//!
//! ```
//! use afs_core::VFile;
//! use afs_files::AFile;
//! use serde_json::json;
//!
//! # async fn example() -> afs_core::Result<()> {
//! let table = AFile::new("table", json!([[1, 5, 3], [2, 6, 4]]));
//! assert_eq!(table.content_type(), "application/json");
//! assert_eq!(table.json().await?, json!([[1, 5, 3], [2, 6, 4]]));
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs, missing_debug_implementations)]

pub mod afile;
pub mod attachment;
pub mod data;
pub mod lazy;

pub use afile::AFile;
pub use attachment::Attachment;
pub use data::{ByteStream, Data, DataFormat, Payload};
pub use lazy::{LazyCell, LazyState};
