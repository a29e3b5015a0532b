//! Structured job definitions exchanged with API callers

use serde::{
    Deserialize,
    Serialize,
};

use crate::source::Source;

/// A single (non-branching) pipeline job
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pipeline {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discarder: Option<DiscarderProperty>,
    /// Display order on the job page follows this order
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    #[serde(default)]
    pub disable_concurrent: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timer_trigger: Option<TimerTrigger>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_trigger: Option<RemoteTrigger>,
    #[serde(default, rename = "jenkinsfile")]
    pub script: String,
}

/// A multi-branch pipeline job backed by one branch source
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiBranchPipeline {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discarder: Option<DiscarderProperty>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timer_trigger: Option<TimerTrigger>,
    /// Required for encoding. Stored jobs created without a source decode
    /// to `None`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<Source>,
    #[serde(default)]
    pub script_path: String,
}

/// Build retention policy. Both values are decimal strings; an empty string
/// means unbounded and is kept as an empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscarderProperty {
    #[serde(default)]
    pub days_to_keep: String,
    #[serde(default)]
    pub num_to_keep: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    /// Newline-joined option list for choice parameters
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub default_value: String,
    #[serde(rename = "type")]
    pub parameter_type: ParameterType,
    #[serde(default)]
    pub description: String,
}

/// Sentinel default value reported for parameters of unknown kinds
pub const UNKNOWN_PARAMETER_DEFAULT: &str = "unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterKind {
    String,
    Choice,
    Text,
    Boolean,
    File,
    Password,
}

impl ParameterKind {
    pub const ALL: [ParameterKind; 6] = [
        ParameterKind::String,
        ParameterKind::Choice,
        ParameterKind::Text,
        ParameterKind::Boolean,
        ParameterKind::File,
        ParameterKind::Password,
    ];

    /// Name used in API payloads and the Jenkins class that stores it
    fn names(self) -> (&'static str, &'static str) {
        match self {
            ParameterKind::String => ("string", "hudson.model.StringParameterDefinition"),
            ParameterKind::Choice => ("choice", "hudson.model.ChoiceParameterDefinition"),
            ParameterKind::Text => ("text", "hudson.model.TextParameterDefinition"),
            ParameterKind::Boolean => ("boolean", "hudson.model.BooleanParameterDefinition"),
            ParameterKind::File => ("file", "hudson.model.FileParameterDefinition"),
            ParameterKind::Password => ("password", "hudson.model.PasswordParameterDefinition"),
        }
    }

    pub fn as_str(self) -> &'static str {
        self.names().0
    }

    pub fn class_name(self) -> &'static str {
        self.names().1
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == name)
    }

    pub fn from_class_name(class_name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.class_name() == class_name)
    }
}

/// Parameter type as seen by API callers. Parameters of plugin kinds this
/// codec does not model keep their Jenkins class name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ParameterType {
    Known(ParameterKind),
    Unknown(String),
}

impl ParameterType {
    pub fn kind(&self) -> Option<ParameterKind> {
        match self {
            ParameterType::Known(kind) => Some(*kind),
            ParameterType::Unknown(_) => None,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ParameterType::Known(kind) => kind.as_str(),
            ParameterType::Unknown(class_name) => class_name,
        }
    }
}

impl From<ParameterKind> for ParameterType {
    fn from(kind: ParameterKind) -> Self {
        ParameterType::Known(kind)
    }
}

impl From<String> for ParameterType {
    fn from(value: String) -> Self {
        match ParameterKind::from_name(&value) {
            Some(kind) => ParameterType::Known(kind),
            None => ParameterType::Unknown(value),
        }
    }
}

impl From<ParameterType> for String {
    fn from(value: ParameterType) -> Self {
        match value {
            ParameterType::Known(kind) => kind.as_str().to_string(),
            ParameterType::Unknown(class_name) => class_name,
        }
    }
}

/// `cron` is used by single pipelines, `interval` (milliseconds) by
/// multi-branch pipelines.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerTrigger {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub cron: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub interval: String,
}

/// Presence enables remote builds authenticated by `token`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteTrigger {
    pub token: String,
}

/// Read-only SCM summary of a stored multi-branch job
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScmInfo {
    #[serde(rename = "type")]
    pub scm_type: String,
    pub repo: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub api_uri: String,
    pub path: String,
}
