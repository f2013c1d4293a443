//! Host-side session state machine
//!
//! `HostProtocol` performs no IO. The session feeds it inbound display
//! messages and page results, and executes the returned actions: send a
//! message, or start fetching a page. At most one fetch is outstanding at a
//! time; extra `loadMore` requests wait in arrival order.

use std::collections::VecDeque;
use std::fmt;

use libfilehist_core::Page;
use tracing::{debug, warn};

use crate::error::IpcError;
use crate::messages::{DisplayMessage, HostMessage};

/// Where the host is in the handshake / request cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No transport attached yet
    Uninitialized,
    /// Waiting for the display's `ready`
    AwaitingReady,
    /// Handshake done, nothing outstanding
    Idle,
    /// A page fetch is outstanding
    AwaitingPage,
    /// The last page failed; the next `loadMore` proceeds normally
    Error,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SessionState::Uninitialized => "uninitialized",
            SessionState::AwaitingReady => "awaiting_ready",
            SessionState::Idle => "idle",
            SessionState::AwaitingPage => "awaiting_page",
            SessionState::Error => "error",
        };
        f.write_str(s)
    }
}

/// Work the session must carry out, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostAction {
    Send(HostMessage),
    /// Fetch the page strictly before `before` and report it back through
    /// [`HostProtocol::complete_page`]
    Fetch { before: Option<String> },
}

#[derive(Debug)]
pub struct HostProtocol {
    state: SessionState,
    file_path: String,
    /// `loadMore` cursors not yet started
    queued: VecDeque<Option<String>>,
    /// Cursor of the fetch in progress
    outstanding: Option<Option<String>>,
    violations: u64,
}

impl HostProtocol {
    pub fn new(file_path: impl Into<String>) -> Self {
        Self {
            state: SessionState::Uninitialized,
            file_path: file_path.into(),
            queued: VecDeque::new(),
            outstanding: None,
            violations: 0,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn file_path(&self) -> &str {
        &self.file_path
    }

    /// Number of `loadMore` requests waiting behind the outstanding one
    pub fn queued(&self) -> usize {
        self.queued.len()
    }

    /// Protocol violations seen so far
    pub fn violations(&self) -> u64 {
        self.violations
    }

    /// Cursor of the fetch in progress, if any
    pub fn outstanding(&self) -> Option<&Option<String>> {
        self.outstanding.as_ref()
    }

    /// The transport is attached; start waiting for `ready`
    pub fn attach(&mut self) {
        if self.state == SessionState::Uninitialized {
            self.state = SessionState::AwaitingReady;
        }
    }

    /// Handle one inbound display message
    pub fn on_message(&mut self, message: DisplayMessage) -> Vec<HostAction> {
        match (self.state, message) {
            (SessionState::Uninitialized, message) => {
                self.violation(format!(
                    "{} received before the transport was attached",
                    message.message_type()
                ));
                Vec::new()
            }

            (SessionState::AwaitingReady, DisplayMessage::Ready) => {
                self.state = SessionState::Idle;
                let mut actions = vec![HostAction::Send(HostMessage::init(self.file_path.clone()))];
                actions.extend(self.start_next());
                actions
            }

            (_, DisplayMessage::Ready) => {
                self.violation("duplicate ready".to_string());
                Vec::new()
            }

            (SessionState::AwaitingReady, DisplayMessage::LoadMore { before }) => {
                debug!(before = ?before, "loadMore before ready, deferring");
                self.queued.push_back(before);
                Vec::new()
            }

            (SessionState::AwaitingPage, DisplayMessage::LoadMore { before }) => {
                self.violation(format!(
                    "loadMore {:?} while {:?} is outstanding",
                    before, self.outstanding
                ));
                self.queued.push_back(before);
                Vec::new()
            }

            (SessionState::Idle | SessionState::Error, DisplayMessage::LoadMore { before }) => {
                self.queued.push_back(before);
                self.start_next().into_iter().collect()
            }
        }
    }

    /// Report the outcome of the outstanding fetch
    ///
    /// Returns the response to send, followed by the next queued fetch if any.
    pub fn complete_page(
        &mut self,
        result: Result<Page, String>,
    ) -> Result<Vec<HostAction>, IpcError> {
        if self.state != SessionState::AwaitingPage {
            self.violations += 1;
            return Err(IpcError::ProtocolViolation(format!(
                "page completed with no outstanding loadMore (state {})",
                self.state
            )));
        }
        self.outstanding = None;

        let response = match result {
            Ok(page) => {
                self.state = SessionState::Idle;
                HostMessage::from(page)
            }
            Err(message) => {
                self.state = SessionState::Error;
                HostMessage::error(message)
            }
        };

        let mut actions = vec![HostAction::Send(response)];
        actions.extend(self.start_next());
        Ok(actions)
    }

    fn start_next(&mut self) -> Option<HostAction> {
        let before = self.queued.pop_front()?;
        self.state = SessionState::AwaitingPage;
        self.outstanding = Some(before.clone());
        Some(HostAction::Fetch { before })
    }

    fn violation(&mut self, detail: String) {
        self.violations += 1;
        warn!(state = %self.state, detail = %detail, "protocol violation");
    }
}
