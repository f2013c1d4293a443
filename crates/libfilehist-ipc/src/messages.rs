//! Host/display message types
//!
//! These types define the wire format between the host and a display
//! surface: JSON objects tagged by `type`, with camelCase fields. The
//! encoding is part of the contract and must stay byte-stable.

use libfilehist_core::{Commit, Page};
use serde::{Deserialize, Serialize};

/// Messages sent by a display surface to the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum DisplayMessage {
    /// The display is listening; the host answers with `init`
    Ready,

    /// Request the page strictly before `before` (`null` = newest)
    LoadMore {
        #[serde(default)]
        before: Option<String>,
    },
}

impl DisplayMessage {
    /// Get the message type as it appears on the wire
    pub fn message_type(&self) -> &'static str {
        match self {
            DisplayMessage::Ready => "ready",
            DisplayMessage::LoadMore { .. } => "loadMore",
        }
    }

    pub fn load_more(before: Option<String>) -> Self {
        DisplayMessage::LoadMore { before }
    }
}

/// Messages sent by the host to a display surface
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum HostMessage {
    /// Session metadata, sent once per `ready`
    Init {
        #[serde(rename = "filePath")]
        file_path: String,
        #[serde(rename = "fileName")]
        file_name: String,
    },

    /// One page of history, newest first
    Commits {
        commits: Vec<Commit>,
        #[serde(rename = "hasMore")]
        has_more: bool,
    },

    /// A page failed; nothing from it was delivered
    Error { message: String },
}

impl HostMessage {
    /// Get the message type as it appears on the wire
    pub fn message_type(&self) -> &'static str {
        match self {
            HostMessage::Init { .. } => "init",
            HostMessage::Commits { .. } => "commits",
            HostMessage::Error { .. } => "error",
        }
    }

    /// `init` for a tracked path; the name is its last component
    pub fn init(file_path: impl Into<String>) -> Self {
        let file_path = file_path.into();
        let file_name = std::path::Path::new(&file_path)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| file_path.clone());
        HostMessage::Init {
            file_path,
            file_name,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        HostMessage::Error {
            message: message.into(),
        }
    }
}

impl From<Page> for HostMessage {
    fn from(page: Page) -> Self {
        HostMessage::Commits {
            commits: page.commits,
            has_more: page.has_more,
        }
    }
}
