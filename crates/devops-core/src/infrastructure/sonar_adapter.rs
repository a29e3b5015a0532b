use async_trait::async_trait;
use devops_sonar::{
    SonarClient,
    SonarError,
    SonarStatus,
};

use crate::domain::{
    AnalysisBackend,
    AnalysisRef,
    DomainError,
    DomainResult,
};

/// [`AnalysisBackend`] over the configured SonarQube server
pub struct SonarAnalysisBackend {
    client: SonarClient,
}

impl SonarAnalysisBackend {
    pub fn new(client: SonarClient) -> Self {
        Self { client }
    }

    fn map_error(e: SonarError) -> DomainError {
        match e {
            SonarError::AuthenticationFailed(msg) => DomainError::AuthenticationFailed(msg),
            SonarError::ApiError(msg) => DomainError::ApiError(msg),
            SonarError::InvalidConfig(msg) => DomainError::InvalidConfig(msg),
            SonarError::NotFound(msg) => DomainError::ApiError(format!("Analysis not found: {msg}")),
            SonarError::NetworkError(msg) => DomainError::NetworkError(msg),
            SonarError::SerializationError(msg) => {
                DomainError::ApiError(format!("Serialization error: {msg}"))
            }
        }
    }
}

#[async_trait]
impl AnalysisBackend for SonarAnalysisBackend {
    async fn fetch_analysis(&self, analysis: &AnalysisRef) -> DomainResult<SonarStatus> {
        // Builds may report a scanner server other than the configured one;
        // the configured server is queried regardless.
        if let Some(server_url) = &analysis.server_url {
            if server_url.trim_end_matches('/') != self.client.server_url() {
                tracing::debug!(
                    task = %analysis.task_id,
                    build_server = %server_url,
                    server = %self.client.server_url(),
                    "Analysis was reported by a different SonarQube server"
                );
            }
        }

        self.client
            .fetch_analysis(&analysis.task_id)
            .await
            .map_err(Self::map_error)
    }
}
