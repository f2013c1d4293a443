//! Host session loop
//!
//! A reader task decodes inbound lines into a channel. The session selects
//! between inbound messages, the single in-flight page task, and shutdown.
//! Closing the transport or shutting down aborts the in-flight task and its
//! result is dropped.

use std::future::Future;

use libfilehist_core::Page;
use libfilehist_git::{BackendError, Pager};
use libfilehist_ipc::{
    DisplayMessage, HostAction, HostMessage, HostProtocol, IpcError, MessageReader, MessageWriter,
    MAX_DISPLAY_FRAME_BYTES,
};
use tokio::io::{AsyncBufRead, AsyncWrite};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::error::HostError;

/// Inbound channel depth; the display rarely has more than a couple in flight
const INBOUND_CAPACITY: usize = 32;

/// What the reader task forwards
enum Inbound {
    Message(DisplayMessage),
    Malformed(IpcError),
}

/// Why a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// The display closed the transport
    Closed,
    /// Shutdown was requested
    Shutdown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    pub session_id: String,
    pub end: SessionEnd,
    pub pages_served: u64,
    pub errors_sent: u64,
    pub violations: u64,
}

pub struct Session {
    id: String,
    pager: Pager,
    protocol: HostProtocol,
    pages_served: u64,
    errors_sent: u64,
    malformed: u64,
}

impl Session {
    pub fn new(pager: Pager) -> Self {
        let protocol = HostProtocol::new(pager.path());
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            pager,
            protocol,
            pages_served: 0,
            errors_sent: 0,
            malformed: 0,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Serve the display on `reader`/`writer` until it disconnects or
    /// `shutdown` completes
    pub async fn run<R, W, S>(
        mut self,
        reader: R,
        writer: W,
        shutdown: S,
    ) -> Result<SessionSummary, HostError>
    where
        R: AsyncBufRead + Unpin + Send + 'static,
        W: AsyncWrite + Unpin,
        S: Future<Output = ()>,
    {
        info!(session = %self.id, path = %self.pager.path(), "session started");

        let (tx, mut rx) = mpsc::channel(INBOUND_CAPACITY);
        let reader_task = tokio::spawn(read_inbound(
            MessageReader::new(reader).with_max_frame(MAX_DISPLAY_FRAME_BYTES),
            tx,
        ));

        let mut writer = MessageWriter::new(writer);
        let mut in_flight: JoinSet<Result<Page, BackendError>> = JoinSet::new();
        tokio::pin!(shutdown);

        self.protocol.attach();

        let end = loop {
            tokio::select! {
                _ = &mut shutdown => break SessionEnd::Shutdown,

                inbound = rx.recv() => match inbound {
                    None => break SessionEnd::Closed,
                    Some(Inbound::Message(message)) => {
                        debug!(session = %self.id, message = message.message_type(), "inbound");
                        let actions = self.protocol.on_message(message);
                        self.execute(actions, &mut writer, &mut in_flight).await?;
                    }
                    Some(Inbound::Malformed(e)) => {
                        self.malformed += 1;
                        warn!(session = %self.id, error = %e, "protocol violation: malformed message");
                    }
                },

                Some(joined) = in_flight.join_next(), if !in_flight.is_empty() => {
                    let result = match joined {
                        Ok(Ok(page)) => Ok(page),
                        Ok(Err(e)) => {
                            warn!(session = %self.id, code = e.error_code(), error = %e, "page failed");
                            Err(e.to_string())
                        }
                        Err(e) => {
                            warn!(session = %self.id, error = %e, "page task failed");
                            Err(format!("page task failed: {}", e))
                        }
                    };
                    match self.protocol.complete_page(result) {
                        Ok(actions) => self.execute(actions, &mut writer, &mut in_flight).await?,
                        Err(e) => warn!(session = %self.id, error = %e, "dropping page result"),
                    }
                }
            }
        };

        if !in_flight.is_empty() {
            debug!(session = %self.id, "aborting in-flight page");
        }
        in_flight.abort_all();
        reader_task.abort();

        let summary = SessionSummary {
            session_id: self.id.clone(),
            end,
            pages_served: self.pages_served,
            errors_sent: self.errors_sent,
            violations: self.protocol.violations() + self.malformed,
        };
        info!(
            session = %summary.session_id,
            end = ?summary.end,
            pages = summary.pages_served,
            errors = summary.errors_sent,
            violations = summary.violations,
            "session ended"
        );
        Ok(summary)
    }

    async fn execute<W: AsyncWrite + Unpin>(
        &mut self,
        actions: Vec<HostAction>,
        writer: &mut MessageWriter<W>,
        in_flight: &mut JoinSet<Result<Page, BackendError>>,
    ) -> Result<(), HostError> {
        for action in actions {
            match action {
                HostAction::Send(message) => {
                    match &message {
                        HostMessage::Commits { commits, has_more } => {
                            self.pages_served += 1;
                            debug!(
                                session = %self.id,
                                commits = commits.len(),
                                has_more = *has_more,
                                "sending page"
                            );
                        }
                        HostMessage::Error { .. } => self.errors_sent += 1,
                        HostMessage::Init { .. } => {
                            debug!(session = %self.id, "sending init");
                        }
                    }
                    writer.send(&message).await?;
                }
                HostAction::Fetch { before } => {
                    let pager = self.pager.clone();
                    in_flight.spawn(async move { pager.load_more(before).await });
                }
            }
        }
        Ok(())
    }
}

async fn read_inbound<R>(mut reader: MessageReader<R>, tx: mpsc::Sender<Inbound>)
where
    R: AsyncBufRead + Unpin,
{
    loop {
        let inbound = match reader.next::<DisplayMessage>().await {
            Ok(Some(message)) => Inbound::Message(message),
            Ok(None) => break,
            Err(e) if e.is_recoverable() => Inbound::Malformed(e),
            Err(e) => {
                debug!(error = %e, "inbound stream failed");
                break;
            }
        };
        if tx.send(inbound).await.is_err() {
            break;
        }
    }
}
