//! Hosted-API backends (GitHub, GitLab)
//!
//! Both list commits for a path with one paginated request, then fetch raw
//! file contents per revision concurrently. A 404 on the contents endpoint
//! means the path is absent at that revision.

mod github;
mod gitlab;

pub use github::GitHubBackend;
pub use gitlab::GitLabBackend;

use std::time::Duration;

use reqwest::{header, Client, StatusCode, Url};
use serde::de::DeserializeOwned;

use crate::BackendError;

const USER_AGENT: &str = concat!("filehist/", env!("CARGO_PKG_VERSION"));

/// Connect timeout for hosted APIs; whole-page timeouts are the pager's job
const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Thin wrapper over a reqwest client bound to one API root
#[derive(Debug, Clone)]
pub(crate) struct ApiClient {
    client: Client,
    base: Url,
    max_blob_bytes: usize,
}

impl ApiClient {
    pub(crate) fn new(
        api_base: &str,
        headers: header::HeaderMap,
        max_blob_bytes: usize,
    ) -> Result<Self, BackendError> {
        let base = Url::parse(api_base)
            .map_err(|e| BackendError::Unavailable(format!("invalid api_base {}: {}", api_base, e)))?;
        if base.cannot_be_a_base() {
            return Err(BackendError::Unavailable(format!(
                "api_base {} cannot carry a path",
                api_base
            )));
        }

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base,
            max_blob_bytes,
        })
    }

    /// Build `<base>/<segments...>`; each segment is percent-encoded, `/` included
    pub(crate) fn url<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// GET and decode a JSON body
    pub(crate) async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, BackendError> {
        let response = self
            .client
            .get(url.clone())
            .header(header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| BackendError::Unavailable(format!("GET {}: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::Unavailable(format!("GET {} returned {}", url, status)));
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| BackendError::Parse(format!("{}: {}", url, e)))
    }

    /// GET a raw blob; `Ok(None)` when the API reports 404
    pub(crate) async fn get_raw(
        &self,
        url: Url,
        accept: &str,
        hash: &str,
    ) -> Result<Option<String>, BackendError> {
        let mut response = self
            .client
            .get(url.clone())
            .header(header::ACCEPT, accept)
            .send()
            .await
            .map_err(|e| BackendError::ContentUnavailable {
                hash: hash.to_string(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(BackendError::ContentUnavailable {
                hash: hash.to_string(),
                reason: format!("GET {} returned {}", url, status),
            });
        }

        if let Some(len) = response.content_length() {
            if len as usize > self.max_blob_bytes {
                return Err(BackendError::ContentTooLarge {
                    limit: self.max_blob_bytes,
                    actual: len as usize,
                });
            }
        }

        // Chunked bodies carry no length; count as we go
        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await.map_err(|e| {
            BackendError::ContentUnavailable {
                hash: hash.to_string(),
                reason: e.to_string(),
            }
        })? {
            body.extend_from_slice(&chunk);
            if body.len() > self.max_blob_bytes {
                return Err(BackendError::ContentTooLarge {
                    limit: self.max_blob_bytes,
                    actual: body.len(),
                });
            }
        }

        Ok(Some(String::from_utf8_lossy(&body).into_owned()))
    }
}

/// Bearer authorization header, if a token is configured
pub(crate) fn auth_headers(token: Option<String>) -> Result<header::HeaderMap, BackendError> {
    let mut headers = header::HeaderMap::new();
    if let Some(token) = token {
        let mut value = header::HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|e| BackendError::Unavailable(format!("invalid API token: {}", e)))?;
        value.set_sensitive(true);
        headers.insert(header::AUTHORIZATION, value);
    }
    Ok(headers)
}

/// First line of a commit message
pub(crate) fn subject(message: &str) -> &str {
    message.lines().next().unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_encodes_segments() {
        let client = ApiClient::new("https://gitlab.example.com/api/v4/", header::HeaderMap::new(), 10)
            .unwrap();
        let url = client.url(["projects", "group/project", "repository", "commits"]);
        assert_eq!(
            url.as_str(),
            "https://gitlab.example.com/api/v4/projects/group%2Fproject/repository/commits"
        );
    }

    #[test]
    fn test_invalid_base_rejected() {
        assert!(ApiClient::new("not a url", header::HeaderMap::new(), 10).is_err());
        assert!(ApiClient::new("mailto:me@example.com", header::HeaderMap::new(), 10).is_err());
    }

    #[test]
    fn test_subject() {
        assert_eq!(subject("fix: a|b\n\nlong body"), "fix: a|b");
        assert_eq!(subject(""), "");
    }

    #[test]
    fn test_auth_headers() {
        assert!(auth_headers(None).unwrap().is_empty());
        let headers = auth_headers(Some("t0k".to_string())).unwrap();
        assert_eq!(headers[header::AUTHORIZATION], "Bearer t0k");
    }
}
