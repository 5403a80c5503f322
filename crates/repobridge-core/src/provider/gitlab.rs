//! GitLab REST adapter.

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use tracing::Span;
use url::Url;

use crate::config::ApiScheme;
use crate::error::{RemoteError, RemoteStage, ResolveError};
use crate::types::{FileContentResult, FileListResult, Provider};

use super::http::{api_url, error_body, read_json, read_text, send};
use super::{RepoLocation, RepositoryProvider, TreeEntry, markdown_blobs};

/// Branch used when none is given. GitLab has no default-branch lookup here.
pub const DEFAULT_BRANCH: &str = "main";

const PRIVATE_TOKEN_HEADER: &str = "PRIVATE-TOKEN";
const NEXT_PAGE_HEADER: &str = "x-next-page";
const TREE_PAGE_SIZE: &str = "100";

/// Adapter for gitlab.com and self-managed GitLab instances.
#[derive(Debug, Clone)]
pub struct GitLabAdapter {
    client: reqwest::Client,
    scheme: ApiScheme,
    span: Span,
}

impl GitLabAdapter {
    /// Create an adapter that logs under `span`.
    pub fn new(client: reqwest::Client, scheme: ApiScheme, span: Span) -> Self {
        Self {
            client,
            scheme,
            span,
        }
    }

    /// `/api/v4/projects/{owner%2Frepo}/repository/...`
    fn repository_url(&self, location: &RepoLocation, tail: &[&str]) -> Result<Url, ResolveError> {
        let project = format!("{}/{}", location.owner, location.repo);
        let mut segments = vec!["api", "v4", "projects", project.as_str(), "repository"];
        segments.extend_from_slice(tail);
        api_url(self.scheme, &location.host, &segments)
    }

    fn get(&self, url: &Url, location: &RepoLocation) -> reqwest::RequestBuilder {
        let request = self
            .client
            .get(url.clone())
            .header(ACCEPT, "application/json");
        match location.token.as_deref() {
            Some(token) => request.header(PRIVATE_TOKEN_HEADER, token),
            None => request,
        }
    }

    fn reference(location: &RepoLocation) -> &str {
        location.branch.as_deref().unwrap_or(DEFAULT_BRANCH)
    }
}

/// Page number announced by `X-Next-Page`; empty on the last page.
fn next_page(response: &reqwest::Response) -> Option<u32> {
    response
        .headers()
        .get(NEXT_PAGE_HEADER)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}

#[async_trait]
impl RepositoryProvider for GitLabAdapter {
    fn provider(&self) -> Provider {
        Provider::Gitlab
    }

    async fn list_markdown_files(
        &self,
        location: &RepoLocation,
    ) -> Result<FileListResult, ResolveError> {
        let reference = Self::reference(location);
        tracing::debug!(
            parent: &self.span,
            owner = %location.owner,
            repo = %location.repo,
            branch = %reference,
            token_present = location.has_token(),
            "Listing GitLab markdown files"
        );

        let mut files = Vec::new();
        let mut page: u32 = 1;
        loop {
            let mut url = self.repository_url(location, &["tree"])?;
            url.query_pairs_mut()
                .append_pair("ref", reference)
                .append_pair("recursive", "true")
                .append_pair("per_page", TREE_PAGE_SIZE)
                .append_pair("page", &page.to_string());

            let response = send(self.get(&url, location), &url).await?;
            let status = response.status();
            if !status.is_success() {
                let body = error_body(response).await;
                return Err(RemoteError::new(
                    Provider::Gitlab,
                    RemoteStage::Tree,
                    status.as_u16(),
                    format!(
                        "{} tree error ({})",
                        Provider::Gitlab.display_name(),
                        status.as_u16()
                    ),
                )
                .with_body(body)
                .into());
            }

            let next = next_page(&response);
            let entries: Vec<TreeEntry> = read_json(response, &url).await?;
            files.extend(markdown_blobs(entries));

            match next {
                Some(next) if next > page => page = next,
                _ => break,
            }
        }

        tracing::debug!(
            parent: &self.span,
            count = files.len(),
            pages = page,
            "Found {} markdown files on {}/{}@{}",
            files.len(),
            location.owner,
            location.repo,
            reference
        );

        Ok(FileListResult {
            resolved_branch: reference.to_string(),
            files,
        })
    }

    async fn get_file_content(
        &self,
        location: &RepoLocation,
        path: &str,
    ) -> Result<FileContentResult, ResolveError> {
        let reference = Self::reference(location);
        tracing::debug!(
            parent: &self.span,
            owner = %location.owner,
            repo = %location.repo,
            branch = %reference,
            path = %path,
            token_present = location.has_token(),
            "Fetching GitLab file"
        );

        let mut url = self.repository_url(location, &["files", path, "raw"])?;
        url.query_pairs_mut().append_pair("ref", reference);

        let response = send(self.get(&url, location), &url).await?;
        let status = response.status();
        if !status.is_success() {
            let body = error_body(response).await;
            return Err(RemoteError::new(
                Provider::Gitlab,
                RemoteStage::Contents,
                status.as_u16(),
                format!(
                    "{} file error ({})",
                    Provider::Gitlab.display_name(),
                    status.as_u16()
                ),
            )
            .with_body(body)
            .into());
        }

        let content = read_text(response, &url).await?;
        Ok(FileContentResult { content })
    }
}
