//! Error types for repository resolution.

use thiserror::Error;

use crate::types::Provider;

/// Failure of a resolver call.
#[derive(Error, Debug)]
pub enum ResolveError {
    /// Required input was missing (owner, repo or path)
    #[error("{0}")]
    Validation(String),

    /// The provider answered with a non-success status
    #[error(transparent)]
    Remote(#[from] RemoteError),

    /// The request never produced a response
    #[error("Request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// A success response carried a body that could not be decoded
    #[error("Failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The HTTP client could not be constructed
    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// The configured host cannot form a request URL
    #[error("Invalid request URL {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

impl ResolveError {
    pub fn validation(message: impl Into<String>) -> Self {
        ResolveError::Validation(message.into())
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, ResolveError::Validation(_))
    }

    /// The remote failure, if this is one.
    pub fn as_remote(&self) -> Option<&RemoteError> {
        match self {
            ResolveError::Remote(remote) => Some(remote),
            _ => None,
        }
    }
}

/// Which remote call failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteStage {
    /// Repository metadata lookup for the default branch
    DefaultBranch,
    /// Recursive tree listing
    Tree,
    /// File content fetch
    Contents,
}

/// Non-success response from a provider API.
///
/// `message` is human-readable and always includes the status code.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct RemoteError {
    pub provider: Provider,
    pub stage: RemoteStage,
    pub status: u16,
    pub message: String,
    pub body: Option<String>,
    /// True when the failure came from the branch-fallback retry
    pub retried: bool,
}

impl RemoteError {
    pub fn new(provider: Provider, stage: RemoteStage, status: u16, message: String) -> Self {
        Self {
            provider,
            stage,
            status,
            message,
            body: None,
            retried: false,
        }
    }

    /// Attach a response body, appending it to the message when non-empty.
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        let body = body.into();
        if !body.is_empty() {
            self.message = format!("{} - {}", self.message, body);
            self.body = Some(body);
        }
        self
    }

    pub fn retried(mut self, retried: bool) -> Self {
        self.retried = retried;
        self
    }

    /// Default-branch lookup failures (repository missing or inaccessible).
    pub fn is_host_resolution(&self) -> bool {
        self.stage == RemoteStage::DefaultBranch
    }

    pub fn is_not_found(&self) -> bool {
        self.status == 404
    }
}
