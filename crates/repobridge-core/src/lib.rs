//! RepoBridge Core Library
//!
//! Resolves Markdown files from GitHub and GitLab repositories, public or
//! token-authenticated, for display by a document-embedding macro.

pub mod config;
pub mod error;
pub mod host;
pub mod macro_store;
pub mod provider;
pub mod resolver;
pub mod service;
pub mod types;

/// Re-exports of commonly used types
pub mod prelude {
    // Configuration
    pub use crate::config::{ApiScheme, ConfigStore, ResolverConfig};

    // Errors
    pub use crate::error::{RemoteError, RemoteStage, ResolveError};

    // Host
    pub use crate::host::normalize_host;

    // Providers
    pub use crate::provider::{
        GitHubAdapter, GitLabAdapter, RepoLocation, RepositoryProvider,
    };

    // Resolver
    pub use crate::resolver::RepositoryResolver;

    // Macro persistence and orchestration
    pub use crate::macro_store::{MacroConfig, MacroStore};
    pub use crate::service::MacroService;

    // Types
    pub use crate::types::{ConnectionParameters, FileContentResult, FileListResult, Provider};
}
