use async_trait::async_trait;
use devops_jenkins::{
    JenkinsClient,
    JenkinsError,
};

use crate::domain::{
    AnalysisRef,
    DomainError,
    DomainResult,
    JobBackend,
};

/// [`JobBackend`] over the Jenkins remote API. Projects are Jenkins folders.
pub struct JenkinsJobBackend {
    client: JenkinsClient,
}

impl JenkinsJobBackend {
    pub fn new(client: JenkinsClient) -> Self {
        Self { client }
    }

    fn map_error(e: JenkinsError) -> DomainError {
        match e {
            JenkinsError::AuthenticationFailed(msg) => DomainError::AuthenticationFailed(msg),
            JenkinsError::ApiError(msg) => DomainError::ApiError(msg),
            JenkinsError::BadRequest(msg) => DomainError::InvalidRequest(msg),
            JenkinsError::InvalidConfig(msg) => DomainError::InvalidConfig(msg),
            JenkinsError::NotFound(msg) => DomainError::PipelineNotFound(msg),
            JenkinsError::NetworkError(msg) => DomainError::NetworkError(msg),
            JenkinsError::SerializationError(msg) => {
                DomainError::ApiError(format!("Serialization error: {msg}"))
            }
        }
    }
}

fn job_path(project: &str, name: &str) -> String {
    format!("{project}/{name}")
}

#[async_trait]
impl JobBackend for JenkinsJobBackend {
    async fn job_class(&self, project: &str, name: &str) -> DomainResult<String> {
        let job = self
            .client
            .fetch_job(&job_path(project, name))
            .await
            .map_err(Self::map_error)?;
        Ok(job.class)
    }

    async fn get_job_config(&self, project: &str, name: &str) -> DomainResult<String> {
        self.client
            .get_job_config(&job_path(project, name))
            .await
            .map_err(Self::map_error)
    }

    async fn set_job_config(
        &self, project: &str, name: &str, config_xml: &str,
    ) -> DomainResult<()> {
        self.client
            .set_job_config(&job_path(project, name), config_xml)
            .await
            .map_err(Self::map_error)
    }

    async fn create_job(&self, project: &str, name: &str, config_xml: &str) -> DomainResult<()> {
        self.client
            .create_job_in_folder(project, name, config_xml)
            .await
            .map_err(Self::map_error)
    }

    async fn delete_job(&self, project: &str, name: &str) -> DomainResult<()> {
        self.client
            .delete_job(&job_path(project, name))
            .await
            .map_err(Self::map_error)
    }

    async fn last_build_analyses(
        &self, project: &str, name: &str,
    ) -> DomainResult<Vec<AnalysisRef>> {
        let Some(build) = self
            .client
            .fetch_last_build(&job_path(project, name))
            .await
            .map_err(Self::map_error)?
        else {
            return Ok(Vec::new());
        };

        Ok(build
            .sonar_analyses()
            .filter_map(|action| {
                let task_id = action.ce_task_id.clone().filter(|id| !id.is_empty())?;
                Some(AnalysisRef {
                    task_id,
                    server_url: action.server_url.clone(),
                })
            })
            .collect())
    }
}
