//! Repository resolver facade.
//!
//! Validates connection parameters, normalizes the host against the
//! provider default and dispatches to the adapter registered for the
//! provider. Adapter errors are returned unchanged.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::Span;

use crate::config::ResolverConfig;
use crate::error::ResolveError;
use crate::host::normalize_host;
use crate::provider::{GitHubAdapter, GitLabAdapter, RepoLocation, RepositoryProvider};
use crate::types::{ConnectionParameters, FileContentResult, FileListResult, Provider};

/// Dispatches resolver calls to provider adapters.
#[derive(Debug, Clone, Default)]
pub struct RepositoryResolver {
    adapters: HashMap<Provider, Arc<dyn RepositoryProvider>>,
}

impl RepositoryResolver {
    /// Create a resolver with no adapters registered.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Create a resolver with the GitHub and GitLab adapters.
    pub fn new(config: &ResolverConfig) -> Result<Self, ResolveError> {
        Self::with_parent_span(config, &Span::current())
    }

    /// Create a resolver whose adapters log under children of `parent`.
    pub fn with_parent_span(config: &ResolverConfig, parent: &Span) -> Result<Self, ResolveError> {
        let client = config.build_client().map_err(ResolveError::Client)?;

        let github = GitHubAdapter::new(
            client.clone(),
            config.scheme,
            tracing::debug_span!(parent: parent, "provider", provider = "github"),
        );
        let gitlab = GitLabAdapter::new(
            client,
            config.scheme,
            tracing::debug_span!(parent: parent, "provider", provider = "gitlab"),
        );

        let mut resolver = Self::empty();
        resolver.register(Arc::new(github));
        resolver.register(Arc::new(gitlab));
        Ok(resolver)
    }

    /// Register an adapter, replacing any previous one for its provider.
    pub fn register(&mut self, adapter: Arc<dyn RepositoryProvider>) {
        self.adapters.insert(adapter.provider(), adapter);
    }

    /// Get the adapter for a provider.
    pub fn adapter(&self, provider: Provider) -> Option<&dyn RepositoryProvider> {
        self.adapters.get(&provider).map(|a| a.as_ref())
    }

    /// List Markdown files in the repository.
    pub async fn list_files(
        &self,
        params: &ConnectionParameters,
    ) -> Result<FileListResult, ResolveError> {
        if is_blank(&params.owner) || is_blank(&params.repo) {
            return Err(ResolveError::validation("owner and repo are required"));
        }

        let (adapter, location) = self.locate(params)?;
        tracing::debug!(
            provider = %params.provider,
            host = %location.host,
            token_present = location.has_token(),
            "list-files"
        );
        adapter.list_markdown_files(&location).await
    }

    /// Fetch the raw text of `path`.
    pub async fn get_file(
        &self,
        params: &ConnectionParameters,
        path: &str,
    ) -> Result<FileContentResult, ResolveError> {
        if is_blank(&params.owner) || is_blank(&params.repo) || is_blank(path) {
            return Err(ResolveError::validation(
                "owner, repo, and path are required",
            ));
        }

        let (adapter, location) = self.locate(params)?;
        tracing::debug!(
            provider = %params.provider,
            host = %location.host,
            path = %path,
            token_present = location.has_token(),
            "get-file"
        );
        adapter.get_file_content(&location, path).await
    }

    fn locate(
        &self,
        params: &ConnectionParameters,
    ) -> Result<(&dyn RepositoryProvider, RepoLocation), ResolveError> {
        let adapter = self.adapter(params.provider).ok_or_else(|| {
            ResolveError::validation(format!(
                "No adapter registered for provider '{}'",
                params.provider
            ))
        })?;

        let host = normalize_host(params.host.as_deref(), params.provider.default_host());
        let location = RepoLocation::new(host, params.owner.trim(), params.repo.trim())
            .with_branch(params.requested_branch().map(str::to_string))
            .with_token(params.token().map(str::to_string));

        Ok((adapter, location))
    }
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}
