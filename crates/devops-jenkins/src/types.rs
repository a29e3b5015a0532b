//! API response types for the Jenkins remote API

use serde::Deserialize;

/// Class of a single pipeline job
pub const PIPELINE_JOB_CLASS: &str = "org.jenkinsci.plugins.workflow.job.WorkflowJob";

/// Class of a multi-branch pipeline job
pub const MULTI_BRANCH_JOB_CLASS: &str =
    "org.jenkinsci.plugins.workflow.multibranch.WorkflowMultiBranchProject";

/// Build action recorded by the SonarQube scanner step
pub const SONAR_ANALYSIS_ACTION_CLASS: &str = "hudson.plugins.sonar.action.SonarAnalysisAction";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Job {
    pub name: String,
    #[serde(rename = "_class")]
    #[serde(default)]
    pub class: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Build {
    #[serde(default)]
    pub number: i64,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub actions: Vec<BuildAction>,
}

impl Build {
    /// Sonar analyses attached to this build
    pub fn sonar_analyses(&self) -> impl Iterator<Item = &BuildAction> {
        self.actions
            .iter()
            .filter(|action| action.class.as_deref() == Some(SONAR_ANALYSIS_ACTION_CLASS))
    }
}

/// One entry of a build's `actions` list. Jenkins reports actions it can not
/// serialize as empty objects, so every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BuildAction {
    #[serde(rename = "_class")]
    #[serde(default)]
    pub class: Option<String>,
    #[serde(rename = "ceTaskId")]
    #[serde(default)]
    pub ce_task_id: Option<String>,
    #[serde(rename = "serverUrl")]
    #[serde(default)]
    pub server_url: Option<String>,
    #[serde(rename = "sonarqubeDashboardUrl")]
    #[serde(default)]
    pub sonarqube_dashboard_url: Option<String>,
}
