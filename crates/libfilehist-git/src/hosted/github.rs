use async_trait::async_trait;
use futures::future::try_join_all;
use libfilehist_core::{BackendKind, Commit, CommitMeta, Cursor, HostedConfig, Page};
use reqwest::header;
use serde::Deserialize;
use tracing::debug;

use super::{auth_headers, subject, ApiClient};
use crate::backend::HistoryBackend;
use crate::window::{request_count, shape_window, strip_cursor};
use crate::BackendError;

pub const GITHUB_API: &str = "https://api.github.com";

/// GitHub caps `per_page` at 100
const MAX_PER_PAGE: usize = 100;

#[derive(Debug, Deserialize)]
struct ListedCommit {
    sha: String,
    commit: CommitDetail,
}

#[derive(Debug, Deserialize)]
struct CommitDetail {
    author: Option<Signature>,
    message: String,
}

#[derive(Debug, Deserialize)]
struct Signature {
    name: String,
    date: String,
}

impl From<ListedCommit> for CommitMeta {
    fn from(listed: ListedCommit) -> Self {
        let (author, date) = match listed.commit.author {
            Some(sig) => (sig.name, sig.date),
            None => (String::new(), String::new()),
        };
        CommitMeta {
            hash: listed.sha,
            author,
            date,
            message: subject(&listed.commit.message).to_string(),
        }
    }
}

/// History backend over the GitHub REST API
#[derive(Debug, Clone)]
pub struct GitHubBackend {
    api: ApiClient,
    owner: String,
    name: String,
    git_ref: Option<String>,
}

impl GitHubBackend {
    /// `repo` is `owner/name`
    pub fn new(
        api_base: &str,
        repo: &str,
        git_ref: Option<String>,
        token: Option<String>,
        max_blob_bytes: usize,
    ) -> Result<Self, BackendError> {
        let (owner, name) = repo
            .split_once('/')
            .filter(|(o, n)| !o.is_empty() && !n.is_empty() && !n.contains('/'))
            .ok_or_else(|| {
                BackendError::Unavailable(format!("GitHub repo must be owner/name, got '{}'", repo))
            })?;

        let mut headers = auth_headers(token)?;
        headers.insert(
            "X-GitHub-Api-Version",
            header::HeaderValue::from_static("2022-11-28"),
        );

        Ok(Self {
            api: ApiClient::new(api_base, headers, max_blob_bytes)?,
            owner: owner.to_string(),
            name: name.to_string(),
            git_ref,
        })
    }

    pub fn from_config(config: &HostedConfig, max_blob_bytes: usize) -> Result<Self, BackendError> {
        Self::new(
            config.api_base.as_deref().unwrap_or(GITHUB_API),
            &config.repo,
            config.git_ref.clone(),
            config.token(),
            max_blob_bytes,
        )
    }

    async fn list(
        &self,
        path: &str,
        count: usize,
        cursor: &Cursor,
    ) -> Result<Vec<CommitMeta>, BackendError> {
        let mut url = self.api.url(["repos", self.owner.as_str(), self.name.as_str(), "commits"]);
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("path", path);
            query.append_pair("per_page", &count.to_string());
            if let Some(sha) = cursor.before().or(self.git_ref.as_deref()) {
                query.append_pair("sha", sha);
            }
        }

        let listed: Vec<ListedCommit> = self.api.get_json(url).await?;
        Ok(listed.into_iter().map(CommitMeta::from).collect())
    }

    async fn contents(&self, path: &str, meta: CommitMeta) -> Result<Commit, BackendError> {
        let mut url = self.api.url(
            ["repos", self.owner.as_str(), self.name.as_str(), "contents"]
                .into_iter()
                .chain(path.split('/').filter(|s| !s.is_empty())),
        );
        url.query_pairs_mut().append_pair("ref", &meta.hash);

        match self
            .api
            .get_raw(url, "application/vnd.github.raw+json", &meta.hash)
            .await?
        {
            Some(content) => Ok(meta.with_content(content)),
            None => Ok(meta.without_path()),
        }
    }
}

#[async_trait]
impl HistoryBackend for GitHubBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::GitHub
    }

    async fn fetch_window(
        &self,
        path: &str,
        limit: usize,
        cursor: &Cursor,
    ) -> Result<Page, BackendError> {
        let count = request_count(limit, cursor);
        if limit == 0 || count > MAX_PER_PAGE {
            return Err(BackendError::InvalidLimit(limit));
        }
        let path = path.trim_start_matches('/');

        let mut metas = self.list(path, count, cursor).await?;
        strip_cursor(&mut metas, cursor, |m| m.hash.as_str());

        if metas.is_empty() && cursor.is_start() {
            return Err(BackendError::PathNotFound(path.to_string()));
        }

        let (selected, has_more) = shape_window(metas, limit);
        debug!(
            repo = %format!("{}/{}", self.owner, self.name),
            path = %path,
            cursor = %cursor,
            selected = selected.len(),
            has_more,
            "github window"
        );

        let commits =
            try_join_all(selected.into_iter().map(|meta| self.contents(path, meta))).await?;
        Ok(Page::new(commits, has_more))
    }
}
