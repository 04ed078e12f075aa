//! Hetzner provider error types

use thiserror::Error;
use vipswitch_cloud::CloudError;

#[derive(Error, Debug)]
pub enum HetznerError {
    #[error("API token is empty")]
    MissingToken,

    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("API error {status} ({code}): {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, HetznerError>;

impl From<HetznerError> for CloudError {
    fn from(err: HetznerError) -> Self {
        match err {
            HetznerError::MissingToken | HetznerError::InvalidEndpoint(_) => {
                CloudError::InvalidConfig(err.to_string())
            }
            HetznerError::Unauthorized(message) => CloudError::AuthenticationFailed(message),
            HetznerError::Api { code, message, .. } => CloudError::ApiError { code, message },
            HetznerError::UnexpectedResponse(message) => CloudError::ApiError {
                code: "unexpected_response".to_string(),
                message,
            },
            HetznerError::JsonError(e) => CloudError::ApiError {
                code: "invalid_response".to_string(),
                message: e.to_string(),
            },
            HetznerError::Http(e) => CloudError::Transport(e.to_string()),
        }
    }
}
