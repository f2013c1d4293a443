use async_trait::async_trait;
use futures::future::try_join_all;
use libfilehist_core::{BackendKind, Commit, CommitMeta, Cursor, HostedConfig, Page};
use serde::Deserialize;
use tracing::debug;

use super::{auth_headers, subject, ApiClient};
use crate::backend::HistoryBackend;
use crate::window::{request_count, shape_window, strip_cursor};
use crate::BackendError;

pub const GITLAB_API: &str = "https://gitlab.com/api/v4";

/// GitLab caps `per_page` at 100
const MAX_PER_PAGE: usize = 100;

#[derive(Debug, Deserialize)]
struct ListedCommit {
    id: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    author_name: String,
    #[serde(default)]
    authored_date: String,
}

impl From<ListedCommit> for CommitMeta {
    fn from(listed: ListedCommit) -> Self {
        let message = match (listed.title, listed.message) {
            (Some(title), _) => title,
            (None, Some(message)) => subject(&message).to_string(),
            (None, None) => String::new(),
        };
        CommitMeta {
            hash: listed.id,
            author: listed.author_name,
            date: listed.authored_date,
            message,
        }
    }
}

/// History backend over the GitLab REST API
#[derive(Debug, Clone)]
pub struct GitLabBackend {
    api: ApiClient,
    /// Numeric id or `group/project`, sent as one encoded segment
    project: String,
    git_ref: Option<String>,
}

impl GitLabBackend {
    pub fn new(
        api_base: &str,
        project: &str,
        git_ref: Option<String>,
        token: Option<String>,
        max_blob_bytes: usize,
    ) -> Result<Self, BackendError> {
        if project.trim().is_empty() {
            return Err(BackendError::Unavailable(
                "GitLab project must not be empty".to_string(),
            ));
        }
        Ok(Self {
            api: ApiClient::new(api_base, auth_headers(token)?, max_blob_bytes)?,
            project: project.to_string(),
            git_ref,
        })
    }

    pub fn from_config(config: &HostedConfig, max_blob_bytes: usize) -> Result<Self, BackendError> {
        Self::new(
            config.api_base.as_deref().unwrap_or(GITLAB_API),
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
        let mut url = self
            .api
            .url(["projects", self.project.as_str(), "repository", "commits"]);
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("path", path);
            query.append_pair("per_page", &count.to_string());
            if let Some(rev) = cursor.before().or(self.git_ref.as_deref()) {
                query.append_pair("ref_name", rev);
            }
        }

        let listed: Vec<ListedCommit> = self.api.get_json(url).await?;
        Ok(listed.into_iter().map(CommitMeta::from).collect())
    }

    async fn raw_file(&self, path: &str, meta: CommitMeta) -> Result<Commit, BackendError> {
        let mut url = self.api.url([
            "projects",
            self.project.as_str(),
            "repository",
            "files",
            path,
            "raw",
        ]);
        url.query_pairs_mut().append_pair("ref", &meta.hash);

        match self.api.get_raw(url, "text/plain", &meta.hash).await? {
            Some(content) => Ok(meta.with_content(content)),
            None => Ok(meta.without_path()),
        }
    }
}

#[async_trait]
impl HistoryBackend for GitLabBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::GitLab
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
            project = %self.project,
            path = %path,
            cursor = %cursor,
            selected = selected.len(),
            has_more,
            "gitlab window"
        );

        let commits =
            try_join_all(selected.into_iter().map(|meta| self.raw_file(path, meta))).await?;
        Ok(Page::new(commits, has_more))
    }
}
