use serde::{
    Deserialize,
    Serialize,
};

use super::validation::{
    ConfigValidator,
    ValidationResult,
};

pub(super) const DEFAULT_LOG_LEVEL: &str = "info";

/// Process configuration, `config.toml`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct DevopsConfig {
    #[serde(default)]
    pub log: LogConfig,

    #[serde(default)]
    pub jenkins: JenkinsConfig,

    /// Sonar lookups are disabled when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sonar: Option<SonarConfig>,
}

impl DevopsConfig {
    pub fn validate(&self) -> ValidationResult {
        ConfigValidator::validate(self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogConfig {
    /// Default verbosity of the devops crates when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JenkinsConfig {
    #[serde(default)]
    pub address: String,

    #[serde(default)]
    pub user: String,

    /// API token of `user`
    #[serde(default)]
    pub token: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SonarConfig {
    #[serde(default)]
    pub address: String,

    #[serde(default)]
    pub token: String,
}
