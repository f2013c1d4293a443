//! Newline-delimited JSON framing
//!
//! One message per line. serde_json never emits raw newlines inside a
//! value, so a line boundary is always a frame boundary. Frames are read as
//! bytes and capped in length; invalid UTF-8 and oversized frames are
//! decode errors, not stream failures.

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::IpcError;

/// Default frame ceiling; large enough for a full page of file contents
pub const DEFAULT_MAX_FRAME_BYTES: usize = 64 * 1024 * 1024;

/// Encode one message as a single line, newline included
pub fn encode<T: Serialize>(message: &T) -> Result<Vec<u8>, IpcError> {
    let mut line = serde_json::to_vec(message)?;
    line.push(b'\n');
    Ok(line)
}

/// Decode one line
pub fn decode<T: DeserializeOwned>(line: &[u8]) -> Result<T, IpcError> {
    let line = line.strip_suffix(b"\r").unwrap_or(line);
    serde_json::from_slice(line).map_err(|e| {
        let preview = String::from_utf8_lossy(line);
        IpcError::Decode(format!("{}: {}", e, truncate(&preview, 120)))
    })
}

fn truncate(line: &str, max: usize) -> &str {
    match line.char_indices().nth(max) {
        Some((i, _)) => &line[..i],
        None => line,
    }
}

/// Reads framed messages from a byte stream
pub struct MessageReader<R> {
    reader: R,
    buf: Vec<u8>,
    max_frame: usize,
}

impl<R: AsyncBufRead + Unpin> MessageReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::new(),
            max_frame: DEFAULT_MAX_FRAME_BYTES,
        }
    }

    /// Cap the length of one frame, newline excluded
    pub fn with_max_frame(mut self, max_frame: usize) -> Self {
        self.max_frame = max_frame;
        self
    }

    /// Next message, or `None` at end of stream
    ///
    /// A malformed or oversized frame yields `IpcError::Decode`; the reader
    /// stays usable and resumes at the next line.
    pub async fn next<T: DeserializeOwned>(&mut self) -> Result<Option<T>, IpcError> {
        loop {
            self.buf.clear();
            let read = (&mut self.reader)
                .take(self.max_frame as u64 + 1)
                .read_until(b'\n', &mut self.buf)
                .await?;
            if read == 0 {
                return Ok(None);
            }

            let terminated = self.buf.last() == Some(&b'\n');
            if !terminated && self.buf.len() > self.max_frame {
                self.skip_line().await?;
                return Err(IpcError::Decode(format!(
                    "frame exceeds {} bytes",
                    self.max_frame
                )));
            }

            let line = self.buf.strip_suffix(b"\n").unwrap_or(&self.buf[..]);
            if line.iter().all(|b| b.is_ascii_whitespace()) {
                continue;
            }
            return decode(line).map(Some);
        }
    }

    /// Discard input up to and including the next newline
    async fn skip_line(&mut self) -> Result<(), IpcError> {
        loop {
            let (found, used) = {
                let available = self.reader.fill_buf().await?;
                if available.is_empty() {
                    return Ok(());
                }
                match available.iter().position(|b| *b == b'\n') {
                    Some(i) => (true, i + 1),
                    None => (false, available.len()),
                }
            };
            self.reader.consume(used);
            if found {
                return Ok(());
            }
        }
    }
}

/// Writes framed messages to a byte stream
pub struct MessageWriter<W> {
    inner: W,
}

impl<W: AsyncWrite + Unpin> MessageWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    /// Write one message and flush it
    pub async fn send<T: Serialize>(&mut self, message: &T) -> Result<(), IpcError> {
        let line = encode(message)?;
        self.inner.write_all(&line).await?;
        self.inner.flush().await?;
        Ok(())
    }

    /// Flush and close the underlying stream
    pub async fn shutdown(&mut self) -> Result<(), IpcError> {
        self.inner.shutdown().await?;
        Ok(())
    }

    pub fn get_mut(&mut self) -> &mut W {
        &mut self.inner
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}
