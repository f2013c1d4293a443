//! In-process libgit2 backend
//!
//! Walks history with a revwalk, keeps the commits whose tree entry for the
//! tracked path differs from every parent, and reads blobs directly. libgit2
//! is blocking, so the walk and each blob read run on the blocking pool.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use futures::future::try_join_all;
use git2::{ErrorCode, Oid, Repository, Sort};
use libfilehist_core::{BackendKind, Commit, CommitMeta, Cursor, Page, DEFAULT_MAX_BLOB_BYTES};
use tracing::debug;

use crate::backend::HistoryBackend;
use crate::window::shape_window;
use crate::BackendError;

/// History backend reading the repository through libgit2
#[derive(Debug, Clone)]
pub struct Libgit2Backend {
    max_blob_bytes: usize,
}

impl Default for Libgit2Backend {
    fn default() -> Self {
        Self::new()
    }
}

/// Repository location and the tracked path relative to its work tree
struct Located {
    repo_path: PathBuf,
    rel_path: PathBuf,
}

impl Libgit2Backend {
    pub fn new() -> Self {
        Self {
            max_blob_bytes: DEFAULT_MAX_BLOB_BYTES,
        }
    }

    /// Ceiling for a single blob
    pub fn with_max_blob_bytes(mut self, max_blob_bytes: usize) -> Self {
        self.max_blob_bytes = max_blob_bytes;
        self
    }
}

/// Find the repository containing `path` and the path relative to its work tree
fn locate(path: &str) -> Result<Located, BackendError> {
    let path = Path::new(path);
    let file_name = path
        .file_name()
        .ok_or_else(|| BackendError::PathNotFound(path.display().to_string()))?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let dir = dir.canonicalize().map_err(|e| {
        BackendError::Unavailable(format!("cannot resolve {}: {}", dir.display(), e))
    })?;

    let repo = Repository::discover(&dir)
        .map_err(|e| BackendError::Unavailable(format!("no repository at {}: {}", dir.display(), e)))?;
    let workdir = repo
        .workdir()
        .ok_or_else(|| BackendError::Unavailable("bare repositories are not supported".to_string()))?
        .canonicalize()?;

    let rel_dir = dir.strip_prefix(&workdir).map_err(|_| {
        BackendError::Unavailable(format!(
            "{} is outside the work tree {}",
            dir.display(),
            workdir.display()
        ))
    })?;

    let rel_path = rel_dir.join(file_name);

    Ok(Located {
        repo_path: workdir,
        rel_path,
    })
}

/// Blob id of `rel_path` in a commit's tree, if present
fn entry_at(commit: &git2::Commit<'_>, rel_path: &Path) -> Result<Option<Oid>, BackendError> {
    let tree = commit.tree()?;
    match tree.get_path(rel_path) {
        Ok(entry) => Ok(Some(entry.id())),
        Err(e) if e.code() == ErrorCode::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Walk history and select the commits touching `rel_path`
///
/// Returns at most `count` entries, newest first, excluding the cursor.
fn walk(
    repo_path: &Path,
    rel_path: &Path,
    count: usize,
    cursor: &Cursor,
) -> Result<Vec<CommitMeta>, BackendError> {
    let repo = Repository::open(repo_path)?;

    let start = match cursor.before() {
        Some(hash) => {
            let object = repo.revparse_single(hash).map_err(|e| {
                BackendError::Unavailable(format!("unknown revision {}: {}", hash, e))
            })?;
            object.peel_to_commit()?.id()
        }
        None => match repo.head() {
            Ok(head) => head.peel_to_commit()?.id(),
            Err(e) if e.code() == ErrorCode::UnbornBranch || e.code() == ErrorCode::NotFound => {
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        },
    };

    let mut revwalk = repo.revwalk()?;
    revwalk.set_sorting(Sort::TOPOLOGICAL | Sort::TIME)?;
    revwalk.push(start)?;

    let mut selected = Vec::new();
    for oid in revwalk {
        let oid = oid?;
        if cursor.before().is_some() && oid == start {
            continue;
        }

        let commit = repo.find_commit(oid)?;
        let entry = entry_at(&commit, rel_path)?;

        let touched = if commit.parent_count() == 0 {
            entry.is_some()
        } else {
            let mut differs_from_all = true;
            for parent in commit.parents() {
                if entry_at(&parent, rel_path)? == entry {
                    differs_from_all = false;
                    break;
                }
            }
            differs_from_all
        };
        if !touched {
            continue;
        }

        let author = commit.author();
        selected.push(CommitMeta {
            hash: oid.to_string(),
            author: author.name().unwrap_or("").to_string(),
            date: format_git_time(author.when()),
            message: commit.summary().unwrap_or("").to_string(),
        });

        if selected.len() >= count {
            break;
        }
    }

    Ok(selected)
}

/// Read the tracked file at one revision
fn read_blob(
    repo_path: &Path,
    rel_path: &Path,
    meta: CommitMeta,
    max_blob_bytes: usize,
) -> Result<Commit, BackendError> {
    let unavailable = |hash: &str, e: git2::Error| BackendError::ContentUnavailable {
        hash: hash.to_string(),
        reason: e.message().to_string(),
    };

    let repo = Repository::open(repo_path).map_err(|e| unavailable(&meta.hash, e))?;
    let oid = Oid::from_str(&meta.hash).map_err(|e| unavailable(&meta.hash, e))?;
    let commit = repo.find_commit(oid).map_err(|e| unavailable(&meta.hash, e))?;

    let blob_id = match entry_at(&commit, rel_path)? {
        Some(id) => id,
        None => return Ok(meta.without_path()),
    };
    let blob = repo.find_blob(blob_id).map_err(|e| unavailable(&meta.hash, e))?;

    if blob.size() > max_blob_bytes {
        return Err(BackendError::ContentTooLarge {
            limit: max_blob_bytes,
            actual: blob.size(),
        });
    }

    Ok(meta.with_content(String::from_utf8_lossy(blob.content()).into_owned()))
}

/// ISO-8601 with the author's own offset, like `git log --format=%aI`
fn format_git_time(time: git2::Time) -> String {
    use chrono::{FixedOffset, Offset, TimeZone, Utc};

    let offset = FixedOffset::east_opt(time.offset_minutes() * 60).unwrap_or_else(|| Utc.fix());
    match offset.timestamp_opt(time.seconds(), 0).single() {
        Some(dt) => dt.to_rfc3339(),
        None => time.seconds().to_string(),
    }
}

fn join_error(e: tokio::task::JoinError) -> BackendError {
    BackendError::Unavailable(format!("libgit2 task failed: {}", e))
}

#[async_trait]
impl HistoryBackend for Libgit2Backend {
    fn kind(&self) -> BackendKind {
        BackendKind::Libgit2
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

        let owned_path = path.to_string();
        let walk_cursor = cursor.clone();
        let (located, metas) = tokio::task::spawn_blocking(move || {
            let located = locate(&owned_path)?;
            let metas = walk(&located.repo_path, &located.rel_path, limit + 1, &walk_cursor)?;
            Ok::<_, BackendError>((located, metas))
        })
        .await
        .map_err(join_error)??;

        if metas.is_empty() && cursor.is_start() {
            return Err(BackendError::PathNotFound(path.to_string()));
        }

        let (selected, has_more) = shape_window(metas, limit);
        debug!(
            path = %path,
            cursor = %cursor,
            selected = selected.len(),
            has_more,
            "libgit2 window"
        );

        let max_blob_bytes = self.max_blob_bytes;
        let reads = selected.into_iter().map(|meta| {
            let repo_path = located.repo_path.clone();
            let rel_path = located.rel_path.clone();
            async move {
                tokio::task::spawn_blocking(move || {
                    read_blob(&repo_path, &rel_path, meta, max_blob_bytes)
                })
                .await
                .map_err(join_error)?
            }
        });
        let commits = try_join_all(reads).await?;

        Ok(Page::new(commits, has_more))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_git_time_keeps_offset() {
        let time = git2::Time::new(1_700_000_000, 60);
        assert_eq!(format_git_time(time), "2023-11-14T23:13:20+01:00");

        let time = git2::Time::new(0, 0);
        assert_eq!(format_git_time(time), "1970-01-01T00:00:00+00:00");
    }
}
