//! filehist host
//!
//! Owns the pagination engine for one tracked file and serves it to a
//! display surface over a newline-delimited JSON byte stream.

pub mod error;
pub mod session;

pub use error::HostError;
pub use session::{Session, SessionEnd, SessionSummary};
