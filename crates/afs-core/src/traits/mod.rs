//! Capability traits for file-like data.
//!
//! The filesystem never inspects payloads. It stores shared references to
//! anything implementing [`VFile`], forwards read calls, and consults
//! [`RemoteFile`] only to retrieve header metadata.
//!
//! # Module Structure
//!
//! - `file` - The `VFile` and `RemoteFile` traits
//!
//! # Examples
//!
//! ```
//! use afs_core::{Result, VFile};
//! use async_trait::async_trait;
//! use serde_json::Value;
//!
//! #[derive(Debug)]
//! struct Constant(&'static str);
//!
//! #[async_trait]
//! impl VFile for Constant {
//!     fn name(&self) -> &str {
//!         "constant"
//!     }
//!
//!     async fn json(&self) -> Result<Value> {
//!         Ok(Value::String(self.0.to_string()))
//!     }
//!
//!     async fn text(&self) -> Result<String> {
//!         Ok(self.0.to_string())
//!     }
//!
//!     async fn bytes(&self) -> Result<Vec<u8>> {
//!         Ok(self.0.as_bytes().to_vec())
//!     }
//!
//!     async fn url(&self) -> Result<String> {
//!         Ok(format!("data:text/plain;UTF-8,{}", self.0))
//!     }
//! }
//! ```

mod file;

pub use file::{FileRef, RemoteFile, VFile, same_file};
