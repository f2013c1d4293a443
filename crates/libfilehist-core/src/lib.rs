//! Core library for filehist
//!
//! This crate provides:
//! - The commit/page data model shared by the host and the display surface
//! - Pagination cursors
//! - Repo-independent configuration (`config.toml`)
//! - Language hint detection from file names

pub mod config;
pub mod error;
pub mod language;
pub mod types;

pub use config::{BackendConfig, HistConfig, HostedConfig};
pub use error::HistError;
pub use types::{BackendKind, Commit, CommitMeta, Cursor, Page};

/// Default number of commits per page
pub const DEFAULT_PAGE_SIZE: usize = 15;

/// Default ceiling for the summed content size of one page (10 MiB)
pub const DEFAULT_MAX_PAGE_BYTES: usize = 10 * 1024 * 1024;

/// Default ceiling for a single blob read from a backend (10 MiB)
pub const DEFAULT_MAX_BLOB_BYTES: usize = 10 * 1024 * 1024;

/// Default timeout for one page fetch in milliseconds
pub const DEFAULT_FETCH_TIMEOUT_MS: u64 = 30_000;
