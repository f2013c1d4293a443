//! `git` subprocess backend against scratch repositories

mod common;

use std::sync::Arc;

use common::TestRepo;
use libfilehist_core::Cursor;
use libfilehist_git::{BackendError, CliBackend, HistoryBackend, Pager};
use tempfile::tempdir;

const FILE: &str = "src/notes.txt";

/// `count` commits touching FILE, interleaved with unrelated commits
fn repo_with_history(count: usize) -> (TestRepo, Vec<String>) {
    let mut repo = TestRepo::new();
    let mut hashes = Vec::new();
    for i in 0..count {
        hashes.push(repo.commit_file(FILE, &format!("revision {}\n", i), &format!("edit {}", i)));
        if i % 3 == 0 {
            repo.commit_file("README.md", &format!("readme {}\n", i), "docs");
        }
    }
    hashes.reverse();
    (repo, hashes)
}

#[tokio::test]
async fn test_pipe_in_subject_is_preserved() {
    let mut repo = TestRepo::new();
    repo.commit_file(FILE, "one\n", "fix: a|b|c bug");

    let page = CliBackend::new()
        .fetch_window(&repo.file_arg(FILE), 15, &Cursor::Start)
        .await
        .unwrap();

    assert_eq!(page.len(), 1);
    let commit = &page.commits[0];
    assert_eq!(commit.message, "fix: a|b|c bug");
    assert_eq!(commit.author, "Test Author");
    assert_eq!(commit.content, "one\n");
    assert!(!page.has_more);
}

#[tokio::test]
async fn test_twenty_revisions_in_two_pages() {
    let (repo, expected) = repo_with_history(20);
    let backend = CliBackend::new();
    let path = repo.file_arg(FILE);

    let first = backend.fetch_window(&path, 15, &Cursor::Start).await.unwrap();
    assert_eq!(first.len(), 15);
    assert!(first.has_more);

    let cursor = Cursor::Before(first.last_hash().unwrap().to_string());
    let second = backend.fetch_window(&path, 15, &cursor).await.unwrap();
    assert_eq!(second.len(), 5);
    assert!(!second.has_more);

    let hashes: Vec<String> = first
        .commits
        .iter()
        .chain(second.commits.iter())
        .map(|c| c.hash.clone())
        .collect();
    assert_eq!(hashes, expected);

    // Newest first, content matches each revision
    assert_eq!(first.commits[0].content, "revision 19\n");
    assert_eq!(second.commits[4].content, "revision 0\n");
}

#[tokio::test]
async fn test_cursor_at_root_returns_empty_page() {
    let (repo, expected) = repo_with_history(3);
    let root = expected.last().unwrap().clone();

    let page = CliBackend::new()
        .fetch_window(&repo.file_arg(FILE), 15, &Cursor::Before(root))
        .await
        .unwrap();
    assert!(page.is_empty());
    assert!(!page.has_more);
}

#[tokio::test]
async fn test_deleted_path_is_marked_missing() {
    let mut repo = TestRepo::new();
    repo.commit_file(FILE, "first\n", "add notes");
    let deleted = repo.remove_file(FILE, "drop notes");
    repo.commit_file(FILE, "back\n", "restore notes");

    let page = CliBackend::new()
        .fetch_window(&repo.file_arg(FILE), 15, &Cursor::Start)
        .await
        .unwrap();

    assert_eq!(page.len(), 3);
    let missing: Vec<&str> = page
        .commits
        .iter()
        .filter(|c| c.path_missing)
        .map(|c| c.hash.as_str())
        .collect();
    assert_eq!(missing, vec![deleted.as_str()]);
    assert_eq!(page.commits[1].content, "");
    assert_eq!(page.commits[0].content, "back\n");
}

#[tokio::test]
async fn test_blob_ceiling() {
    let mut repo = TestRepo::new();
    repo.commit_file(FILE, &"x".repeat(4096), "big");

    let err = CliBackend::new()
        .with_max_blob_bytes(1024)
        .fetch_window(&repo.file_arg(FILE), 15, &Cursor::Start)
        .await
        .unwrap_err();
    assert!(matches!(err, BackendError::ContentTooLarge { limit: 1024, .. }));
}

#[tokio::test]
async fn test_outside_repository_is_unavailable() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("loose.txt");
    std::fs::write(&file, "x").unwrap();

    let err = CliBackend::new()
        .fetch_window(&file.display().to_string(), 15, &Cursor::Start)
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "backend_unavailable");
}

#[tokio::test]
async fn test_pager_turns_no_history_into_empty_page() {
    // Repository without commits
    let repo = TestRepo::new();
    std::fs::write(repo.root().join("draft.txt"), "x").unwrap();
    let pager = Pager::new(Arc::new(CliBackend::new()), repo.file_arg("draft.txt"));
    let page = pager.load_more(None).await.unwrap();
    assert!(page.is_empty());
    assert!(!page.has_more);

    // Untracked file in a repository with history
    let (repo, _) = repo_with_history(2);
    std::fs::write(repo.root().join("untracked.txt"), "x").unwrap();
    let pager = Pager::new(Arc::new(CliBackend::new()), repo.file_arg("untracked.txt"));
    let page = pager.load_more(None).await.unwrap();
    assert!(page.is_empty());
}

#[tokio::test]
async fn test_option_like_cursor_is_rejected_before_git_runs() {
    let (repo, _) = repo_with_history(3);
    let scratch = tempdir().unwrap();
    let target = scratch.path().join("log.txt");
    let backend = CliBackend::new();
    let path = repo.file_arg(FILE);

    let cursor = Cursor::Before(format!("--output={}", target.display()));
    let err = backend.fetch_window(&path, 5, &cursor).await.unwrap_err();
    assert!(matches!(err, BackendError::InvalidCursor(_)), "{}", err);
    assert!(!target.exists());

    let err = backend
        .fetch_window(&path, 5, &Cursor::Before("zzzz".to_string()))
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "invalid_cursor");

    // The pager rejects it too, whatever the backend
    let pager = Pager::new(Arc::new(CliBackend::new()), path);
    let err = pager
        .load_more(Some(format!("--output={}", target.display())))
        .await
        .unwrap_err();
    assert_eq!(err.exit_code(), 2);
    assert!(!target.exists());
}
