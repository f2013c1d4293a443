//! History backends and the pagination engine for filehist
//!
//! This crate provides:
//! - The `HistoryBackend` capability shared by every history source
//! - A `git` subprocess backend and an in-process libgit2 backend
//! - GitHub and GitLab REST backends
//! - The `Pager`, which validates requests and enforces page limits

mod error;
mod backend;
mod cli;
mod libgit2;
mod hosted;
mod memory;
mod pager;
pub mod window;

pub use error::BackendError;
pub use backend::{open_backend, HistoryBackend};
pub use cli::CliBackend;
pub use libgit2::Libgit2Backend;
pub use hosted::{GitHubBackend, GitLabBackend};
pub use memory::MemoryBackend;
pub use pager::Pager;
