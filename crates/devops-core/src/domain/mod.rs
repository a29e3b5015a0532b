pub mod backend;
pub mod credential;
pub mod error;
pub mod job;
pub mod validation;

pub use backend::{
    AnalysisBackend,
    AnalysisRef,
    CredentialBackend,
    JobBackend,
};
pub use credential::{
    Credential,
    CredentialKind,
    CredentialRequest,
};
pub use error::{
    DomainError,
    DomainResult,
};
pub use job::{
    JobDefinition,
    JobKind,
    JobRequest,
};
pub use validation::{
    validate_credential_id,
    validate_pipeline_id,
    validate_project_id,
};
