//! Pagination engine
//!
//! Owns one backend for one tracked path. Validates the limit and cursor, applies the
//! fetch timeout and the per-page content ceiling, and turns "no history"
//! into an empty page.

use std::sync::Arc;
use std::time::Duration;

use libfilehist_core::{Cursor, HistConfig, Page, DEFAULT_MAX_PAGE_BYTES, DEFAULT_PAGE_SIZE};
use tracing::{debug, warn};

use crate::backend::{open_backend, HistoryBackend};
use crate::BackendError;

/// Cursor-based page fetcher over one backend
#[derive(Clone)]
pub struct Pager {
    backend: Arc<dyn HistoryBackend>,
    path: String,
    page_size: usize,
    max_page_bytes: usize,
    timeout: Option<Duration>,
}

impl std::fmt::Debug for Pager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pager")
            .field("backend", &self.backend.kind())
            .field("path", &self.path)
            .field("page_size", &self.page_size)
            .field("max_page_bytes", &self.max_page_bytes)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Pager {
    pub fn new(backend: Arc<dyn HistoryBackend>, path: impl Into<String>) -> Self {
        Self {
            backend,
            path: path.into(),
            page_size: DEFAULT_PAGE_SIZE,
            max_page_bytes: DEFAULT_MAX_PAGE_BYTES,
            timeout: None,
        }
    }

    /// Open the configured backend and apply the config's limits
    pub fn from_config(config: &HistConfig, path: impl Into<String>) -> Result<Self, BackendError> {
        let backend = open_backend(config)?;
        let timeout = match config.fetch_timeout_ms {
            0 => None,
            ms => Some(Duration::from_millis(ms)),
        };
        Ok(Self::new(backend, path)
            .with_page_size(config.page_size)
            .with_max_page_bytes(config.max_page_bytes)
            .with_timeout(timeout))
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_max_page_bytes(mut self, max_page_bytes: usize) -> Self {
        self.max_page_bytes = max_page_bytes;
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Fetch the page before `before` using the configured page size
    ///
    /// `None` means no cursor yet, i.e. start from the newest revision.
    pub async fn load_more(&self, before: Option<String>) -> Result<Page, BackendError> {
        self.fetch_page(self.page_size, &Cursor::from(before)).await
    }

    /// Fetch up to `limit` commits strictly before `cursor`
    pub async fn fetch_page(&self, limit: usize, cursor: &Cursor) -> Result<Page, BackendError> {
        if limit == 0 {
            return Err(BackendError::InvalidLimit(limit));
        }
        if !cursor.is_well_formed() {
            warn!(path = %self.path, cursor = %cursor, "rejected malformed cursor");
            return Err(BackendError::InvalidCursor(cursor.to_string()));
        }

        let fetch = self.backend.fetch_window(&self.path, limit, cursor);
        let result = match self.timeout {
            Some(timeout) => match tokio::time::timeout(timeout, fetch).await {
                Ok(result) => result,
                Err(_) => {
                    warn!(path = %self.path, cursor = %cursor, "page fetch timed out");
                    return Err(BackendError::Timeout(timeout.as_millis() as u64));
                }
            },
            None => fetch.await,
        };

        let page = match result {
            Ok(page) => page,
            Err(BackendError::PathNotFound(_)) => {
                debug!(path = %self.path, "no history for path");
                return Ok(Page::empty());
            }
            Err(e) => return Err(e),
        };

        let bytes = page.content_bytes();
        if bytes > self.max_page_bytes {
            return Err(BackendError::ContentTooLarge {
                limit: self.max_page_bytes,
                actual: bytes,
            });
        }

        debug!(
            path = %self.path,
            cursor = %cursor,
            commits = page.len(),
            has_more = page.has_more,
            bytes,
            "page fetched"
        );
        Ok(page)
    }
}
