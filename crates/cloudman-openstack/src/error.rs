//! OpenStack binding error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum OpenStackError {
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("no subject token in authentication response")]
    TokenMissing,

    #[error("service catalog has no public {0} endpoint")]
    MissingEndpoint(&'static str),

    #[error("cannot read CA certificate {path}: {source}")]
    CaCert {
        path: String,
        source: std::io::Error,
    },

    #[error("API error: HTTP {status}: {body}")]
    Api { status: u16, body: String },

    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<OpenStackError> for cloudman_gateway::CloudError {
    fn from(err: OpenStackError) -> Self {
        match err {
            OpenStackError::AuthenticationFailed(msg) => {
                cloudman_gateway::CloudError::AuthenticationFailed(msg)
            }
            OpenStackError::TokenMissing => cloudman_gateway::CloudError::AuthenticationFailed(
                "no subject token in authentication response".to_string(),
            ),
            other => cloudman_gateway::CloudError::Api(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, OpenStackError>;
