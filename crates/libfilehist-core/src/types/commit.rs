use serde::{Deserialize, Serialize};

/// One revision of the tracked file
///
/// Field names follow the host/display wire contract (camelCase).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Commit {
    /// Backend-native revision id
    pub hash: String,
    /// Author display name
    pub author: String,
    /// ISO-8601 author date, passed through as the backend reported it
    pub date: String,
    /// Subject line, may contain `|`
    pub message: String,
    /// Full file contents at this revision
    pub content: String,
    /// The tracked path did not exist at this revision; `content` is empty
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub path_missing: bool,
}

impl Commit {
    /// Create a commit whose file content was found
    pub fn new(
        hash: impl Into<String>,
        author: impl Into<String>,
        date: impl Into<String>,
        message: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            hash: hash.into(),
            author: author.into(),
            date: date.into(),
            message: message.into(),
            content: content.into(),
            path_missing: false,
        }
    }

    /// Abbreviated hash for display
    pub fn short_hash(&self) -> &str {
        let end = self
            .hash
            .char_indices()
            .nth(7)
            .map(|(i, _)| i)
            .unwrap_or(self.hash.len());
        &self.hash[..end]
    }
}

/// Commit metadata before its content has been fetched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitMeta {
    pub hash: String,
    pub author: String,
    pub date: String,
    pub message: String,
}

impl CommitMeta {
    /// Parse one `<hash>|<author>|<date>|<subject>` log line
    ///
    /// The first three fields are fixed; everything after the third `|` is
    /// the subject, reassembled verbatim.
    pub fn parse_log_line(line: &str) -> Option<Self> {
        let mut parts = line.splitn(4, '|');
        let hash = parts.next()?.trim();
        let author = parts.next()?;
        let date = parts.next()?;
        let message = parts.next().unwrap_or("");

        if hash.is_empty() {
            return None;
        }

        Some(Self {
            hash: hash.to_string(),
            author: author.to_string(),
            date: date.to_string(),
            message: message.to_string(),
        })
    }

    /// Attach the file content found at this revision
    pub fn with_content(self, content: String) -> Commit {
        Commit {
            hash: self.hash,
            author: self.author,
            date: self.date,
            message: self.message,
            content,
            path_missing: false,
        }
    }

    /// Mark the tracked path as absent at this revision
    pub fn without_path(self) -> Commit {
        Commit {
            hash: self.hash,
            author: self.author,
            date: self.date,
            message: self.message,
            content: String::new(),
            path_missing: true,
        }
    }
}

/// One bounded, atomic batch of commits
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    /// Newest-first commits, at most the requested limit
    pub commits: Vec<Commit>,
    /// Further commits exist before the last one in this page
    pub has_more: bool,
}

impl Page {
    pub fn new(commits: Vec<Commit>, has_more: bool) -> Self {
        Self { commits, has_more }
    }

    /// A page with no commits and nothing further
    pub fn empty() -> Self {
        Self::default()
    }

    /// Hash of the oldest commit in the page, the cursor for the next fetch
    pub fn last_hash(&self) -> Option<&str> {
        self.commits.last().map(|c| c.hash.as_str())
    }

    /// Summed content size in bytes
    pub fn content_bytes(&self) -> usize {
        self.commits.iter().map(|c| c.content.len()).sum()
    }

    pub fn len(&self) -> usize {
        self.commits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commits.is_empty()
    }
}
