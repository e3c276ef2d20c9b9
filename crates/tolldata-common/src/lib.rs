//! Tolldata Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared types, utilities, and error handling for the tolldata ETL workspace.
//!
//! # Overview
//!
//! - **Error Handling**: the [`EtlError`] taxonomy and its [`ErrorKind`]
//! - **Logging**: `tracing` subscriber setup driven by environment variables
//! - **Checksums**: SHA-256 digests for staged artifacts
//! - **Types**: staging-area artifact names and extract column layouts
//!
//! # Example
//!
//! ```no_run
//! use tolldata_common::checksum::sha256_file;
//! use tolldata_common::Result;
//!
//! fn digest_archive(path: &str) -> Result<()> {
//!     let digest = sha256_file(path)?;
//!     println!("archive sha256: {}", digest);
//!     Ok(())
//! }
//! ```

pub mod checksum;
pub mod error;
pub mod logging;
pub mod types;

// Re-export commonly used types
pub use error::{ErrorKind, EtlError, Result};
pub use types::Artifact;
