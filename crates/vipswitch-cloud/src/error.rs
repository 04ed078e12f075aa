//! Cloud provider error types

use crate::resource::ResourceKind;
use thiserror::Error;

/// Cloud provider errors
#[derive(Error, Debug)]
pub enum CloudError {
    #[error("{kind} not found: {name}")]
    NotFound { kind: ResourceKind, name: String },

    #[error("{kind} lookup for '{name}' failed: {source}")]
    Lookup {
        kind: ResourceKind,
        name: String,
        #[source]
        source: Box<CloudError>,
    },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("API error ({code}): {message}")]
    ApiError { code: String, message: String },

    #[error("Action {id} ({command}) failed: {code}: {message}")]
    ActionFailed {
        id: u64,
        command: String,
        code: String,
        message: String,
    },

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Task aborted: {0}")]
    TaskAborted(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl CloudError {
    /// True when the error only reflects a cancelled scope, not a failure of its own.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, CloudError::Cancelled)
    }

    /// Attach lookup identity to an error raised while resolving `name`.
    ///
    /// `NotFound` already carries it and is passed through untouched.
    pub fn for_lookup(self, kind: ResourceKind, name: &str) -> Self {
        match self {
            err @ (CloudError::NotFound { .. } | CloudError::Cancelled) => err,
            other => CloudError::Lookup {
                kind,
                name: name.to_string(),
                source: Box::new(other),
            },
        }
    }
}

impl From<tokio::task::JoinError> for CloudError {
    fn from(err: tokio::task::JoinError) -> Self {
        if err.is_cancelled() {
            CloudError::Cancelled
        } else {
            CloudError::TaskAborted(err.to_string())
        }
    }
}

pub type Result<T> = std::result::Result<T, CloudError>;
