//! Core types, traits, and errors for the attachment filesystem.
//!
//! This crate provides the foundational types shared by the file
//! capabilities in `afs-files` and the versioned namespace in `afs-vfs`.
//!
//! # Architecture
//!
//! The core consists of:
//! - The error hierarchy, with operation context for facade calls
//! - The [`Metadata`] record attached to versions and version sequences
//! - The [`VFile`] and [`RemoteFile`] read capabilities
//! - Filesystem configuration ([`FsConfig`])

#![deny(unsafe_code)]
#![warn(missing_docs, missing_debug_implementations)]

mod config;
mod error;
mod metadata;

pub mod traits;

pub use config::{FsConfig, FsConfigBuilder};
pub use error::{Error, Result};
pub use metadata::Metadata;
pub use traits::{FileRef, RemoteFile, VFile, same_file};
