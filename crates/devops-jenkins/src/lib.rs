//! Jenkins remote API client for Devops
//!
//! Covers the job-config lifecycle the pipeline service needs:
//! - job lookup (`name`, `_class`)
//! - reading and replacing `config.xml`
//! - creating jobs in a folder and deleting them
//! - last-build lookup for attached analysis actions
//! - the folder credentials store (ssh keys, username/password, secret text)
//!
//! Read requests and config updates are retried once on network and server
//! errors.

mod client;
mod config;
pub mod credential;
mod error;
pub mod types;

pub use client::JenkinsClient;
pub use config::encode_job_name;
pub use credential::{
    CredentialInfo,
    CredentialPayload,
    SecretTextCredential,
    SshCredential,
    UsernamePasswordCredential,
    DEFAULT_CREDENTIAL_DOMAIN,
};
pub use error::{
    JenkinsError,
    JenkinsResult,
};
pub use types::{
    Build,
    BuildAction,
    Job,
    MULTI_BRANCH_JOB_CLASS,
    PIPELINE_JOB_CLASS,
    SONAR_ANALYSIS_ACTION_CLASS,
};
