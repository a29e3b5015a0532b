use std::sync::Arc;

use devops_codec::{
    decode_multi_branch_pipeline,
    decode_pipeline,
    decode_scm_summary,
    encode_multi_branch_pipeline,
    encode_pipeline,
    ScmInfo,
};
use devops_sonar::SonarStatus;

use crate::domain::{
    validate_pipeline_id,
    validate_project_id,
    AnalysisBackend,
    DomainError,
    DomainResult,
    JobBackend,
    JobDefinition,
    JobKind,
    JobRequest,
};

/// Pipeline lifecycle inside project folders
pub struct PipelineService {
    jobs: Arc<dyn JobBackend>,
    analysis: Option<Arc<dyn AnalysisBackend>>,
}

impl PipelineService {
    pub fn new(jobs: Arc<dyn JobBackend>, analysis: Option<Arc<dyn AnalysisBackend>>) -> Self {
        Self { jobs, analysis }
    }

    /// Creates the job named by the definition inside the project folder and
    /// returns its name.
    pub async fn create_pipeline(&self, project: &str, request: &JobRequest) -> DomainResult<String> {
        validate_project_id(project)?;
        let definition = request.definition()?;
        let name = definition.name().to_string();
        validate_pipeline_id(&name)?;

        let config_xml = encode_definition(project, &definition)?;
        self.jobs.create_job(project, &name, &config_xml).await?;

        tracing::info!(project, pipeline = %name, kind = %definition.kind(), "Created pipeline");
        Ok(name)
    }

    /// Replaces the job config. The job keeps its id whatever name the
    /// definition carries.
    pub async fn update_pipeline(
        &self, project: &str, pipeline_id: &str, request: &JobRequest,
    ) -> DomainResult<String> {
        validate_project_id(project)?;
        validate_pipeline_id(pipeline_id)?;
        let mut definition = request.definition()?;
        definition.set_name(pipeline_id);

        let config_xml = encode_definition(project, &definition)?;
        self.jobs
            .set_job_config(project, pipeline_id, &config_xml)
            .await?;

        tracing::info!(project, pipeline = pipeline_id, kind = %definition.kind(), "Updated pipeline");
        Ok(pipeline_id.to_string())
    }

    pub async fn get_pipeline(&self, project: &str, pipeline_id: &str) -> DomainResult<JobRequest> {
        validate_project_id(project)?;
        validate_pipeline_id(pipeline_id)?;
        let kind = self.job_kind(project, pipeline_id).await?;

        let config_xml = self.jobs.get_job_config(project, pipeline_id).await?;
        let mut definition = match kind {
            JobKind::Pipeline => JobDefinition::Pipeline(
                decode_pipeline(&config_xml).map_err(DomainError::UnreadableJobConfig)?,
            ),
            JobKind::MultiBranchPipeline => JobDefinition::MultiBranchPipeline(
                decode_multi_branch_pipeline(&config_xml)
                    .map_err(DomainError::UnreadableJobConfig)?,
            ),
        };
        definition.set_name(pipeline_id);

        JobRequest::try_from(definition)
    }

    pub async fn delete_pipeline(&self, project: &str, pipeline_id: &str) -> DomainResult<String> {
        validate_project_id(project)?;
        validate_pipeline_id(pipeline_id)?;
        self.jobs.delete_job(project, pipeline_id).await?;

        tracing::info!(project, pipeline = pipeline_id, "Deleted pipeline");
        Ok(pipeline_id.to_string())
    }

    /// Repository summary of a multi-branch pipeline. `None` for source
    /// kinds without a summary.
    pub async fn get_pipeline_scm(
        &self, project: &str, pipeline_id: &str,
    ) -> DomainResult<Option<ScmInfo>> {
        validate_project_id(project)?;
        validate_pipeline_id(pipeline_id)?;
        match self.job_kind(project, pipeline_id).await? {
            JobKind::MultiBranchPipeline => {
                let config_xml = self.jobs.get_job_config(project, pipeline_id).await?;
                decode_scm_summary(&config_xml).map_err(DomainError::UnreadableJobConfig)
            }
            kind => Err(DomainError::UnsupportedJobType(format!(
                "{kind} jobs have no branch source"
            ))),
        }
    }

    /// Analyses recorded on the last build. Lookups that fail are logged and
    /// left out.
    pub async fn get_pipeline_sonar(
        &self, project: &str, pipeline_id: &str,
    ) -> DomainResult<Vec<SonarStatus>> {
        validate_project_id(project)?;
        validate_pipeline_id(pipeline_id)?;
        // The last-build lookup can not tell a missing job from one that never ran
        self.jobs.job_class(project, pipeline_id).await?;
        let analyses = self
            .jobs
            .last_build_analyses(project, pipeline_id)
            .await?;

        let Some(backend) = &self.analysis else {
            if !analyses.is_empty() {
                tracing::debug!(
                    project,
                    pipeline = pipeline_id,
                    count = analyses.len(),
                    "SonarQube is not configured, skipping analyses"
                );
            }
            return Ok(Vec::new());
        };

        let results =
            futures::future::join_all(analyses.iter().map(|a| backend.fetch_analysis(a))).await;

        let mut statuses = Vec::with_capacity(results.len());
        for (analysis, result) in analyses.iter().zip(results) {
            match result {
                Ok(status) => statuses.push(status),
                Err(e) => tracing::warn!(
                    project,
                    pipeline = pipeline_id,
                    task = %analysis.task_id,
                    error = %e,
                    "Failed to fetch sonar analysis"
                ),
            }
        }
        Ok(statuses)
    }

    async fn job_kind(&self, project: &str, pipeline_id: &str) -> DomainResult<JobKind> {
        let class = self.jobs.job_class(project, pipeline_id).await?;
        JobKind::from_job_class(&class).ok_or(DomainError::UnsupportedJobType(class))
    }
}

fn encode_definition(project: &str, definition: &JobDefinition) -> DomainResult<String> {
    match definition {
        JobDefinition::Pipeline(pipeline) => encode_pipeline(pipeline),
        JobDefinition::MultiBranchPipeline(pipeline) => {
            encode_multi_branch_pipeline(project, pipeline)
        }
    }
    .map_err(DomainError::InvalidDefinition)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use devops_jenkins::{
        MULTI_BRANCH_JOB_CLASS,
        PIPELINE_JOB_CLASS,
    };
    use serde_json::json;

    use super::*;
    use crate::domain::AnalysisRef;

    #[derive(Default)]
    struct FakeJenkins {
        jobs: Mutex<HashMap<(String, String), (String, String)>>,
        analyses: Vec<AnalysisRef>,
    }

    impl FakeJenkins {
        fn with_job(self, project: &str, name: &str, class: &str, config_xml: &str) -> Self {
            self.jobs.lock().unwrap().insert(
                (project.to_string(), name.to_string()),
                (class.to_string(), config_xml.to_string()),
            );
            self
        }

        fn config(&self, project: &str, name: &str) -> Option<String> {
            self.jobs
                .lock()
                .unwrap()
                .get(&(project.to_string(), name.to_string()))
                .map(|(_, xml)| xml.clone())
        }

        fn lookup(&self, project: &str, name: &str) -> DomainResult<(String, String)> {
            self.jobs
                .lock()
                .unwrap()
                .get(&(project.to_string(), name.to_string()))
                .cloned()
                .ok_or_else(|| DomainError::PipelineNotFound(format!("{project}/{name}")))
        }
    }

    #[async_trait]
    impl JobBackend for FakeJenkins {
        async fn job_class(&self, project: &str, name: &str) -> DomainResult<String> {
            Ok(self.lookup(project, name)?.0)
        }

        async fn get_job_config(&self, project: &str, name: &str) -> DomainResult<String> {
            Ok(self.lookup(project, name)?.1)
        }

        async fn set_job_config(
            &self, project: &str, name: &str, config_xml: &str,
        ) -> DomainResult<()> {
            let (class, _) = self.lookup(project, name)?;
            self.jobs.lock().unwrap().insert(
                (project.to_string(), name.to_string()),
                (class, config_xml.to_string()),
            );
            Ok(())
        }

        async fn create_job(&self, project: &str, name: &str, config_xml: &str) -> DomainResult<()> {
            let class = if config_xml.contains("<flow-definition") {
                PIPELINE_JOB_CLASS
            } else {
                MULTI_BRANCH_JOB_CLASS
            };
            let mut jobs = self.jobs.lock().unwrap();
            let key = (project.to_string(), name.to_string());
            if jobs.contains_key(&key) {
                return Err(DomainError::InvalidRequest(format!("{name} already exists")));
            }
            jobs.insert(key, (class.to_string(), config_xml.to_string()));
            Ok(())
        }

        async fn delete_job(&self, project: &str, name: &str) -> DomainResult<()> {
            self.jobs
                .lock()
                .unwrap()
                .remove(&(project.to_string(), name.to_string()))
                .map(|_| ())
                .ok_or_else(|| DomainError::PipelineNotFound(name.to_string()))
        }

        async fn last_build_analyses(
            &self, project: &str, name: &str,
        ) -> DomainResult<Vec<AnalysisRef>> {
            // Jenkins answers 404 for a missing last build and for a missing job alike.
            if self.lookup(project, name).is_err() {
                return Ok(Vec::new());
            }
            Ok(self.analyses.clone())
        }
    }

    struct FakeSonar;

    #[async_trait]
    impl AnalysisBackend for FakeSonar {
        async fn fetch_analysis(&self, analysis: &AnalysisRef) -> DomainResult<SonarStatus> {
            if analysis.task_id == "broken" {
                return Err(DomainError::NetworkError("connection reset".to_string()));
            }
            Ok(SonarStatus {
                measures: Some(json!({"component": {"key": analysis.task_id}})),
                issues: None,
            })
        }
    }

    fn pipeline_request() -> JobRequest {
        serde_json::from_value(json!({
            "type": "pipeline",
            "define": {
                "name": "build",
                "description": "main build",
                "discarder": {"days_to_keep": "7", "num_to_keep": ""},
                "parameters": [
                    {"name": "env", "type": "choice", "default_value": "dev\nprod", "description": ""}
                ],
                "disable_concurrent": true,
                "timer_trigger": {"cron": "H 2 * * *"},
                "jenkinsfile": "pipeline { agent any }"
            }
        }))
        .unwrap()
    }

    fn multi_branch_request() -> JobRequest {
        serde_json::from_value(json!({
            "type": "multi-branch-pipeline",
            "define": {
                "name": "app",
                "description": "",
                "timer_trigger": {"interval": "3600000"},
                "script_path": "ci/Jenkinsfile",
                "source": {
                    "type": "github",
                    "define": {
                        "owner": "acme",
                        "repo": "app",
                        "credential_id": "gh",
                        "discover_branches": 1,
                        "discover_pr_from_origin": 2,
                        "discover_pr_from_forks": {"strategy": 1, "trust": 1},
                        "discover_tags": true
                    }
                }
            }
        }))
        .unwrap()
    }

    fn service(jenkins: Arc<FakeJenkins>) -> PipelineService {
        PipelineService::new(jenkins, Some(Arc::new(FakeSonar)))
    }

    #[tokio::test]
    async fn test_create_then_get_pipeline() {
        let jenkins = Arc::new(FakeJenkins::default());
        let service = service(jenkins.clone());
        let request = pipeline_request();

        let name = service.create_pipeline("demo", &request).await.unwrap();
        assert_eq!(name, "build");
        assert!(jenkins
            .config("demo", "build")
            .unwrap()
            .starts_with("<?xml version='1.1' encoding='UTF-8'?>"));

        let fetched = service.get_pipeline("demo", "build").await.unwrap();
        assert_eq!(fetched, request);
    }

    #[tokio::test]
    async fn test_create_then_get_multi_branch_pipeline() {
        let jenkins = Arc::new(FakeJenkins::default());
        let service = service(jenkins.clone());
        let request = multi_branch_request();

        service.create_pipeline("demo", &request).await.unwrap();
        let stored = jenkins.config("demo", "app").unwrap();
        assert!(stored.contains("<id>demoapp</id>"));

        let fetched = service.get_pipeline("demo", "app").await.unwrap();
        assert_eq!(fetched, request);
    }

    #[tokio::test]
    async fn test_create_rejects_bad_requests() {
        let service = service(Arc::new(FakeJenkins::default()));

        let unsupported = JobRequest {
            job_type: "freestyle".to_string(),
            define: json!({"name": "x"}),
        };
        let err = service
            .create_pipeline("demo", &unsupported)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::UnsupportedJobType(_)));

        let no_source = JobRequest {
            job_type: "multi-branch-pipeline".to_string(),
            define: json!({"name": "app", "script_path": "Jenkinsfile"}),
        };
        let err = service.create_pipeline("demo", &no_source).await.unwrap_err();
        assert!(matches!(err, DomainError::InvalidDefinition(_)));
        assert_eq!(err.status_code(), 400);

        let unnamed = JobRequest {
            job_type: "pipeline".to_string(),
            define: json!({"jenkinsfile": ""}),
        };
        let err = service.create_pipeline("demo", &unnamed).await.unwrap_err();
        assert!(matches!(err, DomainError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn test_update_keeps_pipeline_id() {
        let jenkins = Arc::new(FakeJenkins::default());
        let service = service(jenkins.clone());
        service
            .create_pipeline("demo", &pipeline_request())
            .await
            .unwrap();

        let mut request = pipeline_request();
        request.define["name"] = json!("renamed");
        request.define["description"] = json!("changed");

        let name = service
            .update_pipeline("demo", "build", &request)
            .await
            .unwrap();
        assert_eq!(name, "build");

        let fetched = service.get_pipeline("demo", "build").await.unwrap();
        assert_eq!(fetched.define["name"], "build");
        assert_eq!(fetched.define["description"], "changed");
    }

    #[tokio::test]
    async fn test_get_unsupported_job_class() {
        let jenkins = FakeJenkins::default().with_job(
            "demo",
            "legacy",
            "hudson.model.FreeStyleProject",
            "<project/>",
        );
        let service = service(Arc::new(jenkins));

        let err = service.get_pipeline("demo", "legacy").await.unwrap_err();
        assert!(matches!(err, DomainError::UnsupportedJobType(c) if c == "hudson.model.FreeStyleProject"));
    }

    #[tokio::test]
    async fn test_get_unreadable_config() {
        let jenkins =
            FakeJenkins::default().with_job("demo", "broken", PIPELINE_JOB_CLASS, "<project/>");
        let service = service(Arc::new(jenkins));

        let err = service.get_pipeline("demo", "broken").await.unwrap_err();
        assert!(matches!(err, DomainError::UnreadableJobConfig(_)));
        assert_eq!(err.status_code(), 500);
    }

    #[tokio::test]
    async fn test_delete_pipeline() {
        let jenkins = Arc::new(FakeJenkins::default());
        let service = service(jenkins.clone());
        service
            .create_pipeline("demo", &pipeline_request())
            .await
            .unwrap();

        assert_eq!(service.delete_pipeline("demo", "build").await.unwrap(), "build");
        assert!(jenkins.config("demo", "build").is_none());
        assert!(matches!(
            service.delete_pipeline("demo", "build").await,
            Err(DomainError::PipelineNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_get_pipeline_scm() {
        let jenkins = Arc::new(FakeJenkins::default());
        let service = service(jenkins.clone());
        service
            .create_pipeline("demo", &multi_branch_request())
            .await
            .unwrap();
        service
            .create_pipeline("demo", &pipeline_request())
            .await
            .unwrap();

        let scm = service.get_pipeline_scm("demo", "app").await.unwrap().unwrap();
        assert_eq!(scm.repo, "acme:app");

        assert!(matches!(
            service.get_pipeline_scm("demo", "build").await,
            Err(DomainError::UnsupportedJobType(_))
        ));
    }

    #[tokio::test]
    async fn test_get_pipeline_sonar_skips_failures() {
        let jenkins = FakeJenkins {
            analyses: vec![
                AnalysisRef {
                    task_id: "AXk1".to_string(),
                    server_url: Some("https://sonar.example.com".to_string()),
                },
                AnalysisRef {
                    task_id: "broken".to_string(),
                    server_url: None,
                },
            ],
            ..Default::default()
        }
        .with_job("demo", "build", PIPELINE_JOB_CLASS, "");
        let service = service(Arc::new(jenkins));

        let statuses = service.get_pipeline_sonar("demo", "build").await.unwrap();
        assert_eq!(statuses.len(), 1);
        assert_eq!(
            statuses[0].measures.as_ref().unwrap()["component"]["key"],
            "AXk1"
        );
    }

    #[tokio::test]
    async fn test_get_pipeline_sonar_without_sonar() {
        let jenkins = FakeJenkins {
            analyses: vec![AnalysisRef {
                task_id: "AXk1".to_string(),
                server_url: None,
            }],
            ..Default::default()
        }
        .with_job("demo", "build", PIPELINE_JOB_CLASS, "");
        let service = PipelineService::new(Arc::new(jenkins), None);

        assert!(service
            .get_pipeline_sonar("demo", "build")
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_get_pipeline_sonar_missing_pipeline() {
        let jenkins = FakeJenkins {
            analyses: vec![AnalysisRef {
                task_id: "AXk1".to_string(),
                server_url: None,
            }],
            ..Default::default()
        };
        let service = service(Arc::new(jenkins));

        let err = service
            .get_pipeline_sonar("demo", "does-not-exist")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::PipelineNotFound(_)));
    }

    #[tokio::test]
    async fn test_invalid_ids() {
        let service = service(Arc::new(FakeJenkins::default()));
        assert!(matches!(
            service.get_pipeline("", "build").await,
            Err(DomainError::InvalidRequest(_))
        ));
        assert!(matches!(
            service.delete_pipeline("demo", "a/b").await,
            Err(DomainError::InvalidRequest(_))
        ));
    }
}
