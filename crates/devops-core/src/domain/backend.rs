use async_trait::async_trait;
use devops_jenkins::{
    CredentialInfo,
    CredentialPayload,
};
use devops_sonar::SonarStatus;

use super::DomainResult;

/// SonarQube analysis recorded on a Jenkins build
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRef {
    pub task_id: String,
    pub server_url: Option<String>,
}

/// Job storage and lookup in the automation server. Jobs are addressed by
/// their folder (project) and name.
#[async_trait]
pub trait JobBackend: Send + Sync {
    /// `_class` of the job
    async fn job_class(&self, project: &str, name: &str) -> DomainResult<String>;

    async fn get_job_config(&self, project: &str, name: &str) -> DomainResult<String>;

    async fn set_job_config(&self, project: &str, name: &str, config_xml: &str)
        -> DomainResult<()>;

    async fn create_job(&self, project: &str, name: &str, config_xml: &str) -> DomainResult<()>;

    async fn delete_job(&self, project: &str, name: &str) -> DomainResult<()>;

    /// Analyses attached to the job's last build; empty when it never ran
    async fn last_build_analyses(&self, project: &str, name: &str)
        -> DomainResult<Vec<AnalysisRef>>;
}

#[async_trait]
pub trait AnalysisBackend: Send + Sync {
    async fn fetch_analysis(&self, analysis: &AnalysisRef) -> DomainResult<SonarStatus>;
}

/// Per-project credential store. An empty `domain` means the default one.
#[async_trait]
pub trait CredentialBackend: Send + Sync {
    /// Returns the id of the stored credential
    async fn create_credential(
        &self, project: &str, domain: &str, credential: &CredentialPayload,
    ) -> DomainResult<String>;

    async fn update_credential(
        &self, project: &str, domain: &str, credential: &CredentialPayload,
    ) -> DomainResult<String>;

    async fn delete_credential(&self, project: &str, domain: &str, id: &str)
        -> DomainResult<String>;

    async fn get_credential(&self, project: &str, domain: &str, id: &str)
        -> DomainResult<CredentialInfo>;

    async fn list_credentials(&self, project: &str, domain: &str)
        -> DomainResult<Vec<CredentialInfo>>;
}
