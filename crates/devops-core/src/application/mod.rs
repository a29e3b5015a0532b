pub mod credential_service;
pub mod pipeline_service;

pub use credential_service::CredentialService;
pub use pipeline_service::PipelineService;
