use std::sync::Arc;

use async_trait::async_trait;
use libfilehist_core::{BackendKind, Cursor, HistConfig, Page};

use crate::cli::CliBackend;
use crate::hosted::{GitHubBackend, GitLabBackend};
use crate::libgit2::Libgit2Backend;
use crate::BackendError;

/// Uniform access to the history of one path
///
/// Implementations return at most `limit` commits, newest first, starting
/// strictly before `cursor`, each with the file content at that revision.
/// `has_more` is computed by over-fetching one item (see [`crate::window`]).
#[async_trait]
pub trait HistoryBackend: Send + Sync {
    /// Which variant this is
    fn kind(&self) -> BackendKind;

    /// Fetch one window of history for `path`
    async fn fetch_window(
        &self,
        path: &str,
        limit: usize,
        cursor: &Cursor,
    ) -> Result<Page, BackendError>;
}

/// Construct the backend named by the config
pub fn open_backend(config: &HistConfig) -> Result<Arc<dyn HistoryBackend>, BackendError> {
    let backend: Arc<dyn HistoryBackend> = match config.backend.kind {
        BackendKind::Cli => Arc::new(CliBackend::new().with_max_blob_bytes(config.max_blob_bytes)),
        BackendKind::Libgit2 => {
            Arc::new(Libgit2Backend::new().with_max_blob_bytes(config.max_blob_bytes))
        }
        BackendKind::GitHub => {
            let hosted = config.backend.hosted.as_ref().ok_or_else(|| {
                BackendError::Unavailable("github backend requires [backend.hosted]".to_string())
            })?;
            Arc::new(GitHubBackend::from_config(hosted, config.max_blob_bytes)?)
        }
        BackendKind::GitLab => {
            let hosted = config.backend.hosted.as_ref().ok_or_else(|| {
                BackendError::Unavailable("gitlab backend requires [backend.hosted]".to_string())
            })?;
            Arc::new(GitLabBackend::from_config(hosted, config.max_blob_bytes)?)
        }
    };
    Ok(backend)
}

#[cfg(test)]
mod tests {
    use super::*;
    use libfilehist_core::{BackendConfig, HostedConfig};

    #[test]
    fn test_open_backend_by_kind() {
        let config = HistConfig::default();
        assert_eq!(open_backend(&config).unwrap().kind(), BackendKind::Cli);

        let config = HistConfig {
            backend: BackendConfig {
                kind: BackendKind::Libgit2,
                hosted: None,
            },
            ..HistConfig::default()
        };
        assert_eq!(open_backend(&config).unwrap().kind(), BackendKind::Libgit2);

        let config = HistConfig {
            backend: BackendConfig {
                kind: BackendKind::GitLab,
                hosted: Some(HostedConfig {
                    api_base: None,
                    repo: "42".to_string(),
                    git_ref: None,
                    token_env: None,
                }),
            },
            ..HistConfig::default()
        };
        assert_eq!(open_backend(&config).unwrap().kind(), BackendKind::GitLab);
    }

    #[test]
    fn test_hosted_without_section_fails() {
        let config = HistConfig {
            backend: BackendConfig {
                kind: BackendKind::GitHub,
                hosted: None,
            },
            ..HistConfig::default()
        };
        assert!(open_backend(&config).is_err());
    }
}
