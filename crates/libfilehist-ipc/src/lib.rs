//! Host/display message protocol for filehist
//!
//! This crate provides:
//! - Message types exchanged between the host and a display (DisplayMessage, HostMessage)
//! - Newline-delimited JSON framing over any async byte stream
//! - The host-side session state machine (HostProtocol)
//! - A client that spawns `filehist-host` and talks to it over stdio

pub mod client;
pub mod codec;
pub mod error;
pub mod messages;
pub mod protocol;

pub use client::HostClient;
pub use codec::{MessageReader, MessageWriter};
pub use error::IpcError;
pub use messages::{DisplayMessage, HostMessage};
pub use protocol::{HostAction, HostProtocol, SessionState};

/// Name of the host binary the client launches
pub const HOST_BINARY: &str = "filehist-host";

/// Frame ceiling for display-to-host messages, which are small control messages
pub const MAX_DISPLAY_FRAME_BYTES: usize = 64 * 1024;
