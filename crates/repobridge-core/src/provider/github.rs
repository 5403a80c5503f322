//! GitHub REST adapter.

use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use serde::Deserialize;
use tracing::Span;
use url::Url;

use crate::config::ApiScheme;
use crate::error::{RemoteError, RemoteStage, ResolveError};
use crate::types::{FileContentResult, FileListResult, Provider};

use super::http::{api_url, error_body, read_json, read_text, send};
use super::{RepoLocation, RepositoryProvider, TreeEntry, markdown_blobs};

const PUBLIC_HOST: &str = "github.com";
const PUBLIC_API_HOST: &str = "api.github.com";
const JSON_MEDIA_TYPE: &str = "application/vnd.github+json";
const RAW_MEDIA_TYPE: &str = "application/vnd.github.raw+json";

/// Marker in a 404 body meaning the ref does not exist (as opposed to the path).
pub(crate) const NO_COMMIT_FOR_REF: &str = "No commit found for the ref";

#[derive(Debug, Deserialize)]
struct RepoMetadata {
    default_branch: String,
}

#[derive(Debug, Deserialize)]
struct TreeResponse {
    #[serde(default)]
    tree: Vec<TreeEntry>,
    #[serde(default)]
    truncated: bool,
}

/// Adapter for github.com and GitHub Enterprise.
#[derive(Debug, Clone)]
pub struct GitHubAdapter {
    client: reqwest::Client,
    scheme: ApiScheme,
    span: Span,
}

impl GitHubAdapter {
    /// Create an adapter that logs under `span`.
    pub fn new(client: reqwest::Client, scheme: ApiScheme, span: Span) -> Self {
        Self {
            client,
            scheme,
            span,
        }
    }

    /// github.com is served from api.github.com; Enterprise hosts serve their own API.
    pub fn api_host(host: &str) -> &str {
        if host.is_empty() || host == PUBLIC_HOST {
            PUBLIC_API_HOST
        } else {
            host
        }
    }

    fn repo_url(&self, location: &RepoLocation, tail: &[&str]) -> Result<Url, ResolveError> {
        let mut segments = vec!["repos", location.owner.as_str(), location.repo.as_str()];
        segments.extend_from_slice(tail);
        api_url(self.scheme, Self::api_host(&location.host), &segments)
    }

    fn get(&self, url: &Url, location: &RepoLocation, accept: &str) -> reqwest::RequestBuilder {
        let request = self.client.get(url.clone()).header(ACCEPT, accept);
        match location.token.as_deref() {
            Some(token) => request.header(AUTHORIZATION, format!("Bearer {}", token)),
            None => request,
        }
    }

    /// Look up the repository's declared default branch.
    async fn resolve_default_branch(&self, location: &RepoLocation) -> Result<String, ResolveError> {
        let url = self.repo_url(location, &[])?;
        let response = send(self.get(&url, location, JSON_MEDIA_TYPE), &url).await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RemoteError::new(
                Provider::Github,
                RemoteStage::DefaultBranch,
                status.as_u16(),
                format!(
                    "{} repo not found or no access ({})",
                    Provider::Github.display_name(),
                    status.as_u16()
                ),
            )
            .into());
        }

        let metadata: RepoMetadata = read_json(response, &url).await?;
        tracing::debug!(
            parent: &self.span,
            owner = %location.owner,
            repo = %location.repo,
            default_branch = %metadata.default_branch,
            "Resolved default branch"
        );
        Ok(metadata.default_branch)
    }

    async fn request_contents(
        &self,
        location: &RepoLocation,
        reference: &str,
        path: &str,
    ) -> Result<reqwest::Response, ResolveError> {
        let mut url = self.repo_url(location, &["contents", path])?;
        url.query_pairs_mut().append_pair("ref", reference);
        send(self.get(&url, location, RAW_MEDIA_TYPE), &url).await
    }

    fn contents_error(
        location: &RepoLocation,
        reference: &str,
        path: &str,
        status: u16,
        body: String,
    ) -> RemoteError {
        RemoteError::new(
            Provider::Github,
            RemoteStage::Contents,
            status,
            format!(
                "{} contents error ({}) for {}/{}@{}:{}",
                Provider::Github.display_name(),
                status, location.owner, location.repo, reference, path
            ),
        )
        .with_body(body)
    }
}

#[async_trait]
impl RepositoryProvider for GitHubAdapter {
    fn provider(&self) -> Provider {
        Provider::Github
    }

    async fn list_markdown_files(
        &self,
        location: &RepoLocation,
    ) -> Result<FileListResult, ResolveError> {
        tracing::debug!(
            parent: &self.span,
            owner = %location.owner,
            repo = %location.repo,
            branch = location.branch_label(),
            token_present = location.has_token(),
            "Listing GitHub markdown files"
        );

        let reference = match location.branch.as_deref() {
            Some(branch) => branch.to_string(),
            None => self.resolve_default_branch(location).await?,
        };

        let mut url = self.repo_url(location, &["git", "trees", reference.as_str()])?;
        url.query_pairs_mut().append_pair("recursive", "1");
        let response = send(self.get(&url, location, JSON_MEDIA_TYPE), &url).await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RemoteError::new(
                Provider::Github,
                RemoteStage::Tree,
                status.as_u16(),
                format!(
                    "{} tree error ({})",
                    Provider::Github.display_name(),
                    status.as_u16()
                ),
            )
            .into());
        }

        let tree: TreeResponse = read_json(response, &url).await?;
        if tree.truncated {
            tracing::warn!(
                parent: &self.span,
                owner = %location.owner,
                repo = %location.repo,
                reference = %reference,
                "GitHub truncated the tree listing; some files may be missing"
            );
        }

        let files = markdown_blobs(tree.tree);
        tracing::debug!(
            parent: &self.span,
            count = files.len(),
            "Found {} markdown files on {}/{}@{}",
            files.len(),
            location.owner,
            location.repo,
            reference
        );

        Ok(FileListResult {
            resolved_branch: reference,
            files,
        })
    }

    async fn get_file_content(
        &self,
        location: &RepoLocation,
        path: &str,
    ) -> Result<FileContentResult, ResolveError> {
        tracing::debug!(
            parent: &self.span,
            owner = %location.owner,
            repo = %location.repo,
            branch = location.branch_label(),
            path = %path,
            token_present = location.has_token(),
            "Fetching GitHub file"
        );

        let requested = location.branch.as_deref();
        let reference = match requested {
            Some(branch) => branch.to_string(),
            None => self.resolve_default_branch(location).await?,
        };

        let response = self.request_contents(location, &reference, path).await?;
        let status = response.status();
        if status.is_success() {
            let url = response.url().clone();
            let content = read_text(response, &url).await?;
            return Ok(FileContentResult { content });
        }

        let body = error_body(response).await;

        // Only a missing ref falls back; a missing path on a valid ref must surface.
        if let Some(branch) = requested
            && status.as_u16() == 404
            && body.contains(NO_COMMIT_FOR_REF)
        {
            let default_branch = self.resolve_default_branch(location).await?;
            if default_branch != branch {
                tracing::info!(
                    parent: &self.span,
                    branch = %branch,
                    default_branch = %default_branch,
                    "Branch not found, retrying with default branch"
                );

                let retry = self.request_contents(location, &default_branch, path).await?;
                let retry_status = retry.status();
                if retry_status.is_success() {
                    let url = retry.url().clone();
                    let content = read_text(retry, &url).await?;
                    return Ok(FileContentResult { content });
                }

                let retry_body = error_body(retry).await;
                return Err(Self::contents_error(
                    location,
                    &default_branch,
                    path,
                    retry_status.as_u16(),
                    retry_body,
                )
                .retried(true)
                .into());
            }
        }

        Err(Self::contents_error(location, &reference, path, status.as_u16(), body).into())
    }
}
