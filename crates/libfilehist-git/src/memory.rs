//! In-memory backend over a fixed, newest-first commit list
//!
//! Used by tests and demos that need deterministic history without a
//! repository or network.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use libfilehist_core::{BackendKind, Commit, Cursor, Page};

use crate::backend::HistoryBackend;
use crate::window::{request_count, shape_window, strip_cursor};
use crate::BackendError;

#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    commits: Arc<Vec<Commit>>,
    delay: Option<Duration>,
    failing: HashSet<String>,
    fetches: Arc<AtomicUsize>,
}

impl MemoryBackend {
    /// `commits` must be newest first
    pub fn new(commits: Vec<Commit>) -> Self {
        Self {
            commits: Arc::new(commits),
            ..Self::default()
        }
    }

    /// `count` synthetic commits `c{count-1}` (newest) down to `c0`
    pub fn linear(count: usize) -> Self {
        let commits = (0..count)
            .rev()
            .map(|i| {
                Commit::new(
                    format!("c{}", i),
                    "Test Author",
                    format!("2024-01-01T00:00:{:02}Z", i % 60),
                    format!("commit {}", i),
                    format!("line {}\n", i),
                )
            })
            .collect();
        Self::new(commits)
    }

    /// Sleep before answering each fetch
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Fail content retrieval for this revision
    pub fn failing_on(mut self, hash: impl Into<String>) -> Self {
        self.failing.insert(hash.into());
        self
    }

    /// Number of `fetch_window` calls answered so far
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HistoryBackend for MemoryBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Cli
    }

    async fn fetch_window(
        &self,
        path: &str,
        limit: usize,
        cursor: &Cursor,
    ) -> Result<Page, BackendError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.fetches.fetch_add(1, Ordering::SeqCst);

        if limit == 0 {
            return Err(BackendError::InvalidLimit(limit));
        }
        if self.commits.is_empty() {
            return Err(BackendError::PathNotFound(path.to_string()));
        }

        // Behave like a source that starts *at* the cursor revision
        let start = match cursor.before() {
            None => 0,
            Some(hash) => self
                .commits
                .iter()
                .position(|c| c.hash == hash)
                .ok_or_else(|| BackendError::Unavailable(format!("unknown revision {}", hash)))?,
        };
        let mut window: Vec<Commit> = self
            .commits
            .iter()
            .skip(start)
            .take(request_count(limit, cursor))
            .cloned()
            .collect();
        strip_cursor(&mut window, cursor, |c| c.hash.as_str());

        let (selected, has_more) = shape_window(window, limit);
        if let Some(bad) = selected.iter().find(|c| self.failing.contains(&c.hash)) {
            return Err(BackendError::ContentUnavailable {
                hash: bad.hash.clone(),
                reason: "blob missing".to_string(),
            });
        }

        Ok(Page::new(selected, has_more))
    }
}
