//! Macro service: resolver calls with per-instance token lookup.

use anyhow::Context;

use crate::error::ResolveError;
use crate::macro_store::{MacroConfig, MacroStore};
use crate::resolver::RepositoryResolver;
use crate::types::{ConnectionParameters, FileContentResult, FileListResult};

/// Serves list/get/render requests for macro instances.
#[derive(Debug, Clone)]
pub struct MacroService {
    resolver: RepositoryResolver,
    store: MacroStore,
}

impl MacroService {
    pub fn new(resolver: RepositoryResolver, store: MacroStore) -> Self {
        Self { resolver, store }
    }

    pub fn resolver(&self) -> &RepositoryResolver {
        &self.resolver
    }

    pub fn store(&self) -> &MacroStore {
        &self.store
    }

    /// List Markdown files, using the stored token of `local_id` when the
    /// params carry none.
    pub async fn list_files(
        &self,
        params: ConnectionParameters,
        local_id: Option<&str>,
    ) -> anyhow::Result<FileListResult> {
        let params = self.with_stored_token(params, local_id)?;
        Ok(self.resolver.list_files(&params).await?)
    }

    /// Fetch a file, using the stored token of `local_id` when the params
    /// carry none.
    pub async fn get_file(
        &self,
        params: ConnectionParameters,
        path: &str,
        local_id: Option<&str>,
    ) -> anyhow::Result<FileContentResult> {
        let params = self.with_stored_token(params, local_id)?;
        Ok(self.resolver.get_file(&params, path).await?)
    }

    /// Fetch the file configured for a macro instance.
    pub async fn render(&self, local_id: &str) -> anyhow::Result<FileContentResult> {
        let config = self
            .store
            .load_config(local_id)?
            .with_context(|| format!("No configuration saved for macro '{}'", local_id))?;

        let path = required_path(&config)?;
        self.get_file(config.to_params(), path, Some(local_id)).await
    }

    fn with_stored_token(
        &self,
        mut params: ConnectionParameters,
        local_id: Option<&str>,
    ) -> anyhow::Result<ConnectionParameters> {
        if params.token().is_some() {
            return Ok(params);
        }

        if let Some(local_id) = local_id.filter(|id| !id.is_empty()) {
            params.token = self.store.load_token(local_id)?;
            tracing::debug!(
                local_id = %local_id,
                token_present = params.token.is_some(),
                "Looked up stored token"
            );
        }
        Ok(params)
    }
}

fn required_path(config: &MacroConfig) -> Result<&str, ResolveError> {
    match config.file_path() {
        Some(path) if !config.owner.is_empty() && !config.repo.is_empty() => Ok(path),
        _ => Err(ResolveError::validation(
            "owner, repo, and path are required",
        )),
    }
}
