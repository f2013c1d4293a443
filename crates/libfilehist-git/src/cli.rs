//! `git` subprocess backend
//!
//! Runs `git log` once per page for metadata, then one `git show` per
//! selected revision, concurrently. Commands run from the tracked file's
//! directory so the path is always `./<file name>`.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use futures::future::try_join_all;
use libfilehist_core::{BackendKind, Commit, CommitMeta, Cursor, Page, DEFAULT_MAX_BLOB_BYTES};
use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tracing::debug;

use crate::backend::HistoryBackend;
use crate::window::{request_count, shape_window, strip_cursor};
use crate::BackendError;

/// `--pretty` format: the first three fields are fixed, the subject is last
const LOG_FORMAT: &str = "--pretty=format:%H|%an|%aI|%s";

/// History backend driving the `git` binary
#[derive(Debug, Clone)]
pub struct CliBackend {
    git_bin: PathBuf,
    max_blob_bytes: usize,
}

impl Default for CliBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl CliBackend {
    pub fn new() -> Self {
        Self {
            git_bin: PathBuf::from("git"),
            max_blob_bytes: DEFAULT_MAX_BLOB_BYTES,
        }
    }

    /// Use a specific `git` executable
    pub fn with_git_bin(mut self, git_bin: PathBuf) -> Self {
        self.git_bin = git_bin;
        self
    }

    /// Ceiling for a single `git show` output
    pub fn with_max_blob_bytes(mut self, max_blob_bytes: usize) -> Self {
        self.max_blob_bytes = max_blob_bytes;
        self
    }

    fn command(&self, cwd: &Path) -> Command {
        let mut cmd = Command::new(&self.git_bin);
        cmd.current_dir(cwd)
            .args(["-c", "log.showSignature=false", "-c", "core.quotepath=off"])
            .stdin(Stdio::null())
            .kill_on_drop(true);
        cmd
    }

    /// Read commit metadata for the window
    async fn log(
        &self,
        cwd: &Path,
        file_name: &str,
        count: usize,
        cursor: &Cursor,
    ) -> Result<Vec<CommitMeta>, BackendError> {
        let rev = cursor.before().unwrap_or("HEAD");
        let output = self
            .command(cwd)
            .arg("log")
            .arg(format!("--max-count={}", count))
            .arg(LOG_FORMAT)
            .arg("--end-of-options")
            .arg(rev)
            .arg("--")
            .arg(file_name)
            .output()
            .await
            .map_err(|e| BackendError::Unavailable(format!("failed to run git log: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stderr = stderr.trim();
            // A repository without commits has no history for any path
            if cursor.is_start()
                && (stderr.contains("does not have any commits")
                    || stderr.contains("unknown revision"))
            {
                return Ok(Vec::new());
            }
            return Err(BackendError::Unavailable(format!(
                "git log exited with {}: {}",
                output.status, stderr
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        stdout
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| {
                CommitMeta::parse_log_line(line)
                    .ok_or_else(|| BackendError::Parse(format!("unexpected git log line: {}", line)))
            })
            .collect()
    }

    /// Read the file at one revision
    async fn show(
        &self,
        cwd: &Path,
        file_name: &str,
        meta: CommitMeta,
    ) -> Result<Commit, BackendError> {
        let spec = format!("{}:./{}", meta.hash, file_name);
        let mut child = self
            .command(cwd)
            .arg("show")
            .arg(&spec)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| BackendError::Unavailable(format!("failed to run git show: {}", e)))?;

        let mut stdout = child.stdout.take().ok_or_else(|| {
            BackendError::Unavailable("git show stdout was not captured".to_string())
        })?;
        let mut stderr = child.stderr.take().ok_or_else(|| {
            BackendError::Unavailable("git show stderr was not captured".to_string())
        })?;

        let stderr_task = tokio::spawn(async move {
            let mut buf = Vec::new();
            let _ = stderr.read_to_end(&mut buf).await;
            buf
        });

        // Bounded read: one byte past the ceiling is enough to know it was exceeded
        let mut content = Vec::new();
        (&mut stdout)
            .take(self.max_blob_bytes as u64 + 1)
            .read_to_end(&mut content)
            .await?;

        if content.len() > self.max_blob_bytes {
            let _ = child.kill().await;
            return Err(BackendError::ContentTooLarge {
                limit: self.max_blob_bytes,
                actual: content.len(),
            });
        }

        let status = child.wait().await?;
        let stderr = stderr_task.await.unwrap_or_default();

        if status.success() {
            return Ok(meta.with_content(String::from_utf8_lossy(&content).into_owned()));
        }

        let stderr = String::from_utf8_lossy(&stderr);
        let stderr = stderr.trim();
        if is_missing_path_message(stderr) {
            debug!(hash = %meta.hash, file = %file_name, "path absent at revision");
            return Ok(meta.without_path());
        }

        Err(BackendError::ContentUnavailable {
            hash: meta.hash,
            reason: stderr.to_string(),
        })
    }
}

/// `git show <rev>:<path>` reports these when the path is not in that tree
fn is_missing_path_message(stderr: &str) -> bool {
    stderr.contains("does not exist in") || stderr.contains("exists on disk, but not in")
}

/// Split a file path into the directory to run git from and the file name
fn split_path(path: &str) -> Result<(PathBuf, String), BackendError> {
    let path = Path::new(path);
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| BackendError::PathNotFound(path.display().to_string()))?
        .to_string();
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    Ok((dir, file_name))
}

#[async_trait]
impl HistoryBackend for CliBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Cli
    }

    async fn fetch_window(
        &self,
        path: &str,
        limit: usize,
        cursor: &Cursor,
    ) -> Result<Page, BackendError> {
        if limit == 0 {
            return Err(BackendError::InvalidLimit(limit));
        }
        // The cursor becomes a `git log` argument
        if !cursor.is_object_id() {
            return Err(BackendError::InvalidCursor(cursor.to_string()));
        }
        let (cwd, file_name) = split_path(path)?;

        let mut metas = self
            .log(&cwd, &file_name, request_count(limit, cursor), cursor)
            .await?;
        strip_cursor(&mut metas, cursor, |m| m.hash.as_str());

        if metas.is_empty() && cursor.is_start() {
            return Err(BackendError::PathNotFound(path.to_string()));
        }

        let (selected, has_more) = shape_window(metas, limit);
        debug!(
            path = %path,
            cursor = %cursor,
            selected = selected.len(),
            has_more,
            "git log window"
        );

        let commits = try_join_all(
            selected
                .into_iter()
                .map(|meta| self.show(&cwd, &file_name, meta)),
        )
        .await?;

        Ok(Page::new(commits, has_more))
    }
}
