use serde::{
    Deserialize,
    Serialize,
};

/// Metrics requested for every analysed component
pub const METRIC_KEYS: &str = "alert_status,quality_gate_details,bugs,new_bugs,reliability_rating,new_reliability_rating,vulnerabilities,new_vulnerabilities,security_rating,new_security_rating,code_smells,new_code_smells,sqale_rating,new_maintainability_rating,sqale_index,new_technical_debt,coverage,new_coverage,new_lines_to_cover,tests,duplicated_lines_density,new_duplicated_lines_density,duplicated_blocks,ncloc,ncloc_language_distribution,projects,new_lines";

pub const MEASURES_ADDITIONAL_FIELDS: &str = "metrics,periods";

pub const ISSUES_PAGE_SIZE: u32 = 10;

#[derive(Debug, Deserialize)]
pub(crate) struct CeTaskResponse {
    pub task: CeTask,
}

/// Compute-engine task created by a scanner run
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CeTask {
    pub id: String,
    #[serde(default)]
    pub component_key: String,
    #[serde(default)]
    pub status: String,
}

/// Measures and open issues of one analysis. Both are the SonarQube
/// responses passed through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SonarStatus {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub measures: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issues: Option<serde_json::Value>,
}
