//! Provider adapters for remote Git hosting APIs.
//!
//! Each adapter implements [`RepositoryProvider`] against one REST API:
//! - GitHub (github.com and GitHub Enterprise) with default-branch lookup
//!   and a single branch-fallback retry for content fetches
//! - GitLab (gitlab.com and self-managed) with a fixed `main` default

mod github;
mod gitlab;
mod http;

pub use github::GitHubAdapter;
pub use gitlab::GitLabAdapter;

use std::fmt;

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::ResolveError;
use crate::types::{FileContentResult, FileListResult, Provider};

/// Capability interface implemented by each hosting provider.
#[async_trait]
pub trait RepositoryProvider: Send + Sync + fmt::Debug {
    /// Provider this adapter serves.
    fn provider(&self) -> Provider;

    /// List Markdown blobs in the repository tree.
    async fn list_markdown_files(
        &self,
        location: &RepoLocation,
    ) -> Result<FileListResult, ResolveError>;

    /// Fetch the raw text of a single file.
    async fn get_file_content(
        &self,
        location: &RepoLocation,
        path: &str,
    ) -> Result<FileContentResult, ResolveError>;
}

/// A repository on a normalized host, as seen by an adapter.
#[derive(Clone, PartialEq, Eq)]
pub struct RepoLocation {
    /// Normalized host (no scheme, no trailing slash)
    pub host: String,
    pub owner: String,
    pub repo: String,
    /// Branch explicitly requested by the caller
    pub branch: Option<String>,
    pub token: Option<String>,
}

impl RepoLocation {
    pub fn new(host: impl Into<String>, owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            owner: owner.into(),
            repo: repo.into(),
            branch: None,
            token: None,
        }
    }

    pub fn with_branch(mut self, branch: Option<String>) -> Self {
        self.branch = branch;
        self
    }

    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    /// Branch label for log events.
    fn branch_label(&self) -> &str {
        self.branch.as_deref().unwrap_or("(auto)")
    }
}

impl fmt::Debug for RepoLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RepoLocation")
            .field("host", &self.host)
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .field("branch", &self.branch)
            .field("token_present", &self.has_token())
            .finish()
    }
}

/// Entry of a repository tree listing (shared shape of both APIs).
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TreeEntry {
    pub path: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// True for `.md` / `.markdown` paths, ignoring ASCII case.
pub fn is_markdown_path(path: &str) -> bool {
    let lower = path.to_ascii_lowercase();
    lower.ends_with(".md") || lower.ends_with(".markdown")
}

/// Keep Markdown blobs, preserving tree order.
pub(crate) fn markdown_blobs(entries: impl IntoIterator<Item = TreeEntry>) -> Vec<String> {
    entries
        .into_iter()
        .filter(|entry| entry.kind == "blob" && is_markdown_path(&entry.path))
        .map(|entry| entry.path)
        .collect()
}

#[cfg(test)]
mod tests;
