//! Shared types passed between the resolver, its adapters and callers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Supported Git hosting providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "Option<serde_json::Value>")]
pub enum Provider {
    /// github.com or GitHub Enterprise
    #[default]
    Github,
    /// gitlab.com or a self-managed GitLab instance
    Gitlab,
}

impl Provider {
    /// Parse a provider tag, returning `None` for unrecognized tags.
    pub fn parse_tag(tag: &str) -> Option<Self> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "github" => Some(Provider::Github),
            "gitlab" => Some(Provider::Gitlab),
            _ => None,
        }
    }

    /// Parse a provider tag permissively.
    ///
    /// Absent and unrecognized tags resolve to [`Provider::Github`].
    pub fn from_tag(tag: Option<&str>) -> Self {
        tag.and_then(Self::parse_tag).unwrap_or_default()
    }

    /// Host used when the caller supplies none.
    pub fn default_host(&self) -> &'static str {
        match self {
            Provider::Github => "github.com",
            Provider::Gitlab => "gitlab.com",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Github => "github",
            Provider::Gitlab => "gitlab",
        }
    }

    /// Human-readable name used in error messages.
    pub fn display_name(&self) -> &'static str {
        match self {
            Provider::Github => "GitHub",
            Provider::Gitlab => "GitLab",
        }
    }
}

/// Null and non-string tags are treated like unrecognized ones.
impl From<Option<serde_json::Value>> for Provider {
    fn from(tag: Option<serde_json::Value>) -> Self {
        match tag {
            Some(serde_json::Value::String(tag)) => Provider::from_tag(Some(&tag)),
            _ => Provider::default(),
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Connection parameters for a single resolver call.
///
/// Empty `host`, `branch` and `token` values are treated as absent.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionParameters {
    #[serde(default)]
    pub provider: Provider,
    #[serde(default)]
    pub host: Option<String>,
    pub owner: String,
    pub repo: String,
    #[serde(default)]
    pub branch: Option<String>,
    #[serde(default, skip_serializing)]
    pub token: Option<String>,
}

impl ConnectionParameters {
    pub fn new(provider: Provider, owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            provider,
            owner: owner.into(),
            repo: repo.into(),
            ..Default::default()
        }
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = Some(branch.into());
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Branch requested by the caller, if any.
    pub fn requested_branch(&self) -> Option<&str> {
        non_empty(self.branch.as_deref())
    }

    /// Token supplied by the caller, if any.
    pub fn token(&self) -> Option<&str> {
        non_empty(self.token.as_deref())
    }
}

impl fmt::Debug for ConnectionParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionParameters")
            .field("provider", &self.provider)
            .field("host", &self.host)
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .field("branch", &self.branch)
            .field("token", &self.token().map(|_| "<redacted>"))
            .finish()
    }
}

/// Markdown files found in a repository tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileListResult {
    /// Branch the listing was taken from (resolved when none was given)
    pub resolved_branch: String,
    /// Repository-relative paths, in provider tree order
    pub files: Vec<String>,
}

/// Raw text of a single file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileContentResult {
    pub content: String,
}

pub(crate) fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}
