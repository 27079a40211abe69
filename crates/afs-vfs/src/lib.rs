//! Versioned virtual filesystem.
//!
//! Files live in version sequences addressed by slash-separated paths such
//! as `/data/table1@2`. Directories can synthesize missing entries on first
//! access, and writes wake every watcher of the filesystem.
//!
//! # Architecture
//!
//! - [`version`]: version tokens and their resolution to slots
//! - [`SlotSequence`]: the versions and labels stored under one name
//! - [`Directory`]: tree nodes with optional synthesizers
//! - [`traverse`](traverse::traverse): the path walk shared by all operations
//! - [`regenerator`]: the change notification channel
//! - [`AFileSystem`]: the public facade
//!
//! # Examples
//!
//! ```
//! use afs_vfs::{AFile, AFileSystem, Directory, SlotSequence};
//! use serde_json::json;
//!
//! # async fn example() -> afs_core::Result<()> {
//! let fs = AFileSystem::new(
//!     Directory::new().with_dir(
//!         "data",
//!         Directory::new().with_files(
//!             "table2",
//!             SlotSequence::file("table2", json!([[1, 5, 3], [2, 6, 4]])),
//!         ),
//!     ),
//! );
//!
//! fs.copy("/data/table2", "/test/table2").await?;
//! let table = fs.find("/test/table2").await?.exists()?;
//! assert_eq!(table.json().await?, json!([[1, 5, 3], [2, 6, 4]]));
//!
//! assert!(!fs.find("/noFile").await?.is_found());
//! fs.add("/notYet", AFile::new("notYet", json!({"some": "data"})).into_ref()).await?;
//! assert!(fs.wait_for("/notYet").await.is_ok());
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs, missing_debug_implementations)]

mod filesystem;
mod lookup;
mod slots;
mod tree;

pub mod metadata;
pub mod regenerator;
pub mod traverse;
pub mod version;

pub use afs_files::{AFile, Attachment};
pub use filesystem::{AFileSystem, AFileSystemBuilder};
pub use lookup::Lookup;
pub use metadata::{HeaderFetcher, HttpHeaderFetcher};
pub use regenerator::{Notification, Outcome, Regenerator, Subscription};
pub use slots::SlotSequence;
pub use tree::{
    Directory, DirectoryRef, DirectoryRequest, DirectorySynthesizer, FileRequest, FileSynthesizer,
    Node, SequenceRef,
};
pub use version::Version;
