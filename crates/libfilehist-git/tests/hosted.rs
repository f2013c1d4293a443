//! GitHub and GitLab backends against a mock API server

use libfilehist_core::Cursor;
use libfilehist_git::{GitHubBackend, GitLabBackend, HistoryBackend};
use mockito::Matcher;
use serde_json::json;

const MAX_BLOB: usize = 1024 * 1024;

fn github_commit(sha: &str, message: &str) -> serde_json::Value {
    json!({
        "sha": sha,
        "commit": {
            "author": { "name": "Octo Cat", "email": "octo@example.com", "date": "2024-03-01T10:00:00Z" },
            "message": message
        }
    })
}

fn gitlab_commit(id: &str, title: &str) -> serde_json::Value {
    json!({
        "id": id,
        "short_id": &id[..2],
        "title": title,
        "message": format!("{}\n\nbody", title),
        "author_name": "Lab Rat",
        "authored_date": "2024-03-01T10:00:00.000+01:00"
    })
}

#[tokio::test]
async fn test_github_first_page() {
    let mut server = mockito::Server::new_async().await;

    let list = server
        .mock("GET", "/repos/octo/demo/commits")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("path".into(), "src/lib.rs".into()),
            Matcher::UrlEncoded("per_page".into(), "3".into()),
        ]))
        .match_header("authorization", "Bearer secret")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!([
                github_commit("c3", "fix: a|b|c bug\n\nlong body"),
                github_commit("c2", "second"),
                github_commit("c1", "first"),
            ])
            .to_string(),
        )
        .create_async()
        .await;

    let c3 = server
        .mock("GET", "/repos/octo/demo/contents/src/lib.rs")
        .match_query(Matcher::UrlEncoded("ref".into(), "c3".into()))
        .match_header("accept", "application/vnd.github.raw+json")
        .with_body("three\n")
        .create_async()
        .await;
    // Deleted at c2
    let c2 = server
        .mock("GET", "/repos/octo/demo/contents/src/lib.rs")
        .match_query(Matcher::UrlEncoded("ref".into(), "c2".into()))
        .with_status(404)
        .create_async()
        .await;

    let backend = GitHubBackend::new(
        &server.url(),
        "octo/demo",
        None,
        Some("secret".to_string()),
        MAX_BLOB,
    )
    .unwrap();
    let page = backend
        .fetch_window("/src/lib.rs", 2, &Cursor::Start)
        .await
        .unwrap();

    list.assert_async().await;
    c3.assert_async().await;
    c2.assert_async().await;

    assert!(page.has_more);
    assert_eq!(page.len(), 2);
    assert_eq!(page.commits[0].message, "fix: a|b|c bug");
    assert_eq!(page.commits[0].author, "Octo Cat");
    assert_eq!(page.commits[0].content, "three\n");
    assert!(page.commits[1].path_missing);
    assert_eq!(page.commits[1].content, "");
}

#[tokio::test]
async fn test_github_cursor_commit_is_stripped() {
    let mut server = mockito::Server::new_async().await;

    let list = server
        .mock("GET", "/repos/octo/demo/commits")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("sha".into(), "c2".into()),
            Matcher::UrlEncoded("per_page".into(), "4".into()),
        ]))
        .with_body(json!([github_commit("c2", "second"), github_commit("c1", "first")]).to_string())
        .create_async()
        .await;
    let c1 = server
        .mock("GET", "/repos/octo/demo/contents/src/lib.rs")
        .match_query(Matcher::UrlEncoded("ref".into(), "c1".into()))
        .with_body("one\n")
        .create_async()
        .await;

    let backend = GitHubBackend::new(&server.url(), "octo/demo", None, None, MAX_BLOB).unwrap();
    let page = backend
        .fetch_window("src/lib.rs", 2, &Cursor::Before("c2".to_string()))
        .await
        .unwrap();

    list.assert_async().await;
    c1.assert_async().await;
    assert_eq!(page.len(), 1);
    assert_eq!(page.commits[0].hash, "c1");
    assert!(!page.has_more);
}

#[tokio::test]
async fn test_github_error_status_is_unavailable() {
    let mut server = mockito::Server::new_async().await;
    let _list = server
        .mock("GET", "/repos/octo/demo/commits")
        .match_query(Matcher::Any)
        .with_status(403)
        .create_async()
        .await;

    let backend = GitHubBackend::new(&server.url(), "octo/demo", None, None, MAX_BLOB).unwrap();
    let err = backend
        .fetch_window("src/lib.rs", 2, &Cursor::Start)
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "backend_unavailable");
}

#[tokio::test]
async fn test_github_rejects_malformed_repo_and_oversized_limit() {
    assert!(GitHubBackend::new("https://api.github.com", "demo", None, None, MAX_BLOB).is_err());

    let backend =
        GitHubBackend::new("https://api.github.com", "octo/demo", None, None, MAX_BLOB).unwrap();
    let err = backend
        .fetch_window("src/lib.rs", 100, &Cursor::Start)
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "invalid_limit");
}

#[tokio::test]
async fn test_gitlab_page_with_encoded_file_path() {
    let mut server = mockito::Server::new_async().await;

    let list = server
        .mock("GET", "/projects/42/repository/commits")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("path".into(), "src/lib.rs".into()),
            Matcher::UrlEncoded("per_page".into(), "16".into()),
            Matcher::UrlEncoded("ref_name".into(), "main".into()),
        ]))
        .with_body(json!([gitlab_commit("bb22", "second"), gitlab_commit("aa11", "first")]).to_string())
        .create_async()
        .await;
    let raw = server
        .mock("GET", Matcher::Regex(r"^/projects/42/repository/files/src%2Flib\.rs/raw".to_string()))
        .match_query(Matcher::Any)
        .with_body("fn main() {}\n")
        .expect(2)
        .create_async()
        .await;

    let backend = GitLabBackend::new(
        &server.url(),
        "42",
        Some("main".to_string()),
        None,
        MAX_BLOB,
    )
    .unwrap();
    let page = backend
        .fetch_window("src/lib.rs", 15, &Cursor::Start)
        .await
        .unwrap();

    list.assert_async().await;
    raw.assert_async().await;

    assert!(!page.has_more);
    assert_eq!(page.len(), 2);
    assert_eq!(page.commits[0].hash, "bb22");
    assert_eq!(page.commits[0].message, "second");
    assert_eq!(page.commits[1].author, "Lab Rat");
    assert_eq!(page.commits[1].date, "2024-03-01T10:00:00.000+01:00");
}

#[tokio::test]
async fn test_gitlab_empty_listing_is_path_not_found() {
    let mut server = mockito::Server::new_async().await;
    let _list = server
        .mock("GET", "/projects/42/repository/commits")
        .match_query(Matcher::Any)
        .with_body("[]")
        .create_async()
        .await;

    let backend = GitLabBackend::new(&server.url(), "42", None, None, MAX_BLOB).unwrap();
    let err = backend
        .fetch_window("missing.txt", 15, &Cursor::Start)
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "path_not_found");
}
