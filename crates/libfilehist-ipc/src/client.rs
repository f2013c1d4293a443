//! Display-side client for a spawned host process

use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};

use tokio::io::BufReader;
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tracing::debug;

use crate::codec::{MessageReader, MessageWriter};
use crate::error::IpcError;
use crate::messages::{DisplayMessage, HostMessage};
use crate::HOST_BINARY;

/// Connection to a `filehist-host` child over its stdio
pub struct HostClient {
    child: Child,
    writer: MessageWriter<ChildStdin>,
    reader: MessageReader<BufReader<ChildStdout>>,
}

impl HostClient {
    /// Launch the host for `file`, passing `extra_args` through
    ///
    /// The host's stderr (its log output) is inherited.
    pub fn spawn(host_bin: &Path, file: &str, extra_args: &[String]) -> Result<Self, IpcError> {
        let mut child = Command::new(host_bin)
            .arg("--file")
            .arg(file)
            .args(extra_args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| IpcError::Launch(format!("{}: {}", host_bin.display(), e)))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| IpcError::Launch("host stdin was not captured".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| IpcError::Launch("host stdout was not captured".to_string()))?;

        debug!(host = %host_bin.display(), file = %file, pid = ?child.id(), "host launched");
        Ok(Self {
            child,
            writer: MessageWriter::new(stdin),
            reader: MessageReader::new(BufReader::new(stdout)),
        })
    }

    pub async fn send(&mut self, message: &DisplayMessage) -> Result<(), IpcError> {
        self.writer.send(message).await
    }

    /// Next host message; `IpcError::Closed` once the host has exited
    pub async fn recv(&mut self) -> Result<HostMessage, IpcError> {
        self.reader.next().await?.ok_or(IpcError::Closed)
    }

    /// Close the host's stdin and wait for it to exit
    pub async fn shutdown(mut self) -> Result<ExitStatus, IpcError> {
        self.writer.shutdown().await?;
        let status = self.child.wait().await?;
        debug!(status = %status, "host exited");
        Ok(status)
    }
}

/// Locate the host binary: next to the current executable, else on `PATH`
pub fn default_host_bin() -> PathBuf {
    let name = format!("{}{}", HOST_BINARY, std::env::consts::EXE_SUFFIX);
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(&name)))
        .filter(|candidate| candidate.is_file())
        .unwrap_or_else(|| PathBuf::from(name))
}
