//! Pipeline orchestration core for Devops
//!
//! Wires the job-config codec to the Jenkins and SonarQube clients and
//! exposes the pipeline operations of a project folder through
//! [`application::PipelineService`]. Folder credentials are managed by
//! [`application::CredentialService`].

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod logging;

use std::sync::Arc;

use anyhow::Context;
pub use application::{
    CredentialService,
    PipelineService,
};
pub use domain::{
    AnalysisBackend,
    Credential,
    CredentialBackend,
    CredentialKind,
    CredentialRequest,
    DomainError,
    DomainResult,
    JobBackend,
    JobDefinition,
    JobKind,
    JobRequest,
};
use devops_jenkins::JenkinsClient;
use devops_sonar::SonarClient;
pub use infrastructure::config::{
    ConfigLoader,
    DevopsConfig,
};
use infrastructure::{
    JenkinsCredentialBackend,
    JenkinsJobBackend,
    SonarAnalysisBackend,
};

pub struct CoreContext {
    pub config: DevopsConfig,

    pub pipeline_service: Arc<PipelineService>,

    pub credential_service: Arc<CredentialService>,
}

impl CoreContext {
    pub fn new(config: DevopsConfig) -> anyhow::Result<Self> {
        let validation = config.validate();
        for warning in &validation.warnings {
            tracing::warn!("{}", warning);
        }
        if !validation.is_ok() {
            let errors: Vec<String> = validation.errors.iter().map(|e| e.to_string()).collect();
            anyhow::bail!("Invalid configuration: {}", errors.join("; "));
        }

        let jenkins = JenkinsClient::new(
            &config.jenkins.address,
            &config.jenkins.user,
            &config.jenkins.token,
        )
        .context("Failed to create Jenkins client")?;
        let credentials =
            Arc::new(JenkinsCredentialBackend::new(jenkins.clone())) as Arc<dyn CredentialBackend>;
        let jobs = Arc::new(JenkinsJobBackend::new(jenkins)) as Arc<dyn JobBackend>;

        let analysis = match &config.sonar {
            Some(sonar) => {
                let client = SonarClient::new(&sonar.address, &sonar.token)
                    .context("Failed to create SonarQube client")?;
                Some(Arc::new(SonarAnalysisBackend::new(client)) as Arc<dyn AnalysisBackend>)
            }
            None => None,
        };

        tracing::info!(
            jenkins = %config.jenkins.address,
            sonar = analysis.is_some(),
            "Core context initialized"
        );

        Ok(Self {
            pipeline_service: Arc::new(PipelineService::new(jobs, analysis)),
            credential_service: Arc::new(CredentialService::new(credentials)),
            config,
        })
    }

    /// Loads the discovered config file, installs logging at its `[log] level`
    /// and builds the context from it
    pub fn from_default_config() -> anyhow::Result<Self> {
        let config = ConfigLoader::load_default().context("Failed to load configuration")?;
        if !logging::init_from_config(&config.log) {
            tracing::debug!("Tracing subscriber already installed, keeping it");
        }
        Self::new(config)
    }
}
