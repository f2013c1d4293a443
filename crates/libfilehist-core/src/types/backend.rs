use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::HistError;

/// Which history source a session reads from
///
/// Chosen once when the session is constructed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// `git` subprocess against a local working tree
    #[default]
    Cli,
    /// In-process libgit2 against a local repository
    Libgit2,
    /// GitHub REST API
    #[serde(rename = "github")]
    GitHub,
    /// GitLab REST API
    #[serde(rename = "gitlab")]
    GitLab,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Cli => "cli",
            BackendKind::Libgit2 => "libgit2",
            BackendKind::GitHub => "github",
            BackendKind::GitLab => "gitlab",
        }
    }

    /// Hosted backends talk to a remote API instead of a local repository
    pub fn is_hosted(&self) -> bool {
        matches!(self, BackendKind::GitHub | BackendKind::GitLab)
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = HistError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cli" | "git" => Ok(BackendKind::Cli),
            "libgit2" => Ok(BackendKind::Libgit2),
            "github" => Ok(BackendKind::GitHub),
            "gitlab" => Ok(BackendKind::GitLab),
            other => Err(HistError::InvalidArgs(format!(
                "unknown backend kind '{}' (expected cli, libgit2, github or gitlab)",
                other
            ))),
        }
    }
}
