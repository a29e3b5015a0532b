use thiserror::Error;

/// Jenkins client error types
#[derive(Error, Debug)]
pub enum JenkinsError {
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Request rejected: {0}")]
    BadRequest(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Job not found: {0}")]
    NotFound(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl JenkinsError {
    /// Whether the request may succeed when sent again
    pub fn is_transient(&self) -> bool {
        matches!(self, JenkinsError::NetworkError(_) | JenkinsError::ApiError(_))
    }
}

pub type JenkinsResult<T> = Result<T, JenkinsError>;

impl From<serde_json::Error> for JenkinsError {
    fn from(err: serde_json::Error) -> Self {
        JenkinsError::SerializationError(err.to_string())
    }
}
