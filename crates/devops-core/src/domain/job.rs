//! `{type, define}` envelope carrying a job definition across the service
//! boundary

use std::fmt;
use std::str::FromStr;

use devops_codec::{
    MultiBranchPipeline,
    Pipeline,
};
use serde::{
    Deserialize,
    Serialize,
};

use super::{
    DomainError,
    DomainResult,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobKind {
    Pipeline,
    MultiBranchPipeline,
}

impl JobKind {
    pub const ALL: [JobKind; 2] = [JobKind::Pipeline, JobKind::MultiBranchPipeline];

    pub fn as_str(self) -> &'static str {
        match self {
            JobKind::Pipeline => "pipeline",
            JobKind::MultiBranchPipeline => "multi-branch-pipeline",
        }
    }

    /// Jenkins `_class` of jobs of this kind
    pub fn job_class(self) -> &'static str {
        match self {
            JobKind::Pipeline => devops_jenkins::PIPELINE_JOB_CLASS,
            JobKind::MultiBranchPipeline => devops_jenkins::MULTI_BRANCH_JOB_CLASS,
        }
    }

    pub fn from_job_class(class: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.job_class() == class)
    }
}

impl FromStr for JobKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| DomainError::UnsupportedJobType(s.to_string()))
    }
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Wire form of a job definition. `define` stays untyped until the kind is
/// known.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRequest {
    #[serde(rename = "type")]
    pub job_type: String,
    #[serde(default)]
    pub define: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobDefinition {
    Pipeline(Pipeline),
    MultiBranchPipeline(MultiBranchPipeline),
}

impl JobDefinition {
    pub fn kind(&self) -> JobKind {
        match self {
            JobDefinition::Pipeline(_) => JobKind::Pipeline,
            JobDefinition::MultiBranchPipeline(_) => JobKind::MultiBranchPipeline,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            JobDefinition::Pipeline(p) => &p.name,
            JobDefinition::MultiBranchPipeline(p) => &p.name,
        }
    }

    pub fn set_name(&mut self, name: &str) {
        match self {
            JobDefinition::Pipeline(p) => p.name = name.to_string(),
            JobDefinition::MultiBranchPipeline(p) => p.name = name.to_string(),
        }
    }
}

impl JobRequest {
    pub fn kind(&self) -> DomainResult<JobKind> {
        self.job_type.parse()
    }

    /// Decodes `define` according to `type`
    pub fn definition(&self) -> DomainResult<JobDefinition> {
        let invalid = |e: serde_json::Error| {
            DomainError::InvalidRequest(format!("Invalid {} definition: {e}", self.job_type))
        };

        Ok(match self.kind()? {
            JobKind::Pipeline => {
                JobDefinition::Pipeline(serde_json::from_value(self.define.clone()).map_err(invalid)?)
            }
            JobKind::MultiBranchPipeline => JobDefinition::MultiBranchPipeline(
                serde_json::from_value(self.define.clone()).map_err(invalid)?,
            ),
        })
    }
}

impl TryFrom<JobDefinition> for JobRequest {
    type Error = DomainError;

    fn try_from(definition: JobDefinition) -> DomainResult<Self> {
        let job_type = definition.kind().as_str().to_string();
        let define = match definition {
            JobDefinition::Pipeline(p) => serde_json::to_value(p)?,
            JobDefinition::MultiBranchPipeline(p) => serde_json::to_value(p)?,
        };
        Ok(Self { job_type, define })
    }
}
