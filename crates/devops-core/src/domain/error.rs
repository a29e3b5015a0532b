use devops_codec::CodecError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Unsupported job type: {0}")]
    UnsupportedJobType(String),

    #[error("Invalid pipeline definition: {0}")]
    InvalidDefinition(#[source] CodecError),

    #[error("Unreadable job config: {0}")]
    UnreadableJobConfig(#[source] CodecError),

    #[error("Pipeline not found: {0}")]
    PipelineNotFound(String),

    #[error("Unsupported credential type: {0}")]
    UnsupportedCredentialType(String),

    #[error("Credential not found: {0}")]
    CredentialNotFound(String),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

pub type DomainResult<T> = Result<T, DomainError>;

impl DomainError {
    /// HTTP status an API layer should answer with
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidRequest(_)
            | Self::UnsupportedJobType(_)
            | Self::InvalidDefinition(_)
            | Self::UnsupportedCredentialType(_) => 400,
            Self::AuthenticationFailed(_) => 401,
            Self::PipelineNotFound(_) | Self::CredentialNotFound(_) => 404,
            Self::UnreadableJobConfig(_)
            | Self::ApiError(_)
            | Self::NetworkError(_)
            | Self::InvalidConfig(_)
            | Self::InternalError(_) => 500,
        }
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        DomainError::InternalError(format!("Serialization error: {err}"))
    }
}
