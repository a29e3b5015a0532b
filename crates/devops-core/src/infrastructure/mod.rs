pub mod config;
pub mod credential_adapter;
pub mod jenkins_adapter;
pub mod sonar_adapter;

pub use credential_adapter::JenkinsCredentialBackend;
pub use jenkins_adapter::JenkinsJobBackend;
pub use sonar_adapter::SonarAnalysisBackend;
