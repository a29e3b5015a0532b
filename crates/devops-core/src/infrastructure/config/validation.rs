use std::fmt;

use tracing::level_filters::LevelFilter;

use super::schema::{
    DevopsConfig,
    JenkinsConfig,
    SonarConfig,
};

#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigError>,
    pub warnings: Vec<ConfigWarning>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, field: &str, message: impl Into<String>, code: ConfigErrorCode) {
        self.errors.push(ConfigError {
            field: field.to_string(),
            message: message.into(),
            code,
        });
    }

    pub fn add_warning(
        &mut self, field: &str, message: impl Into<String>, code: ConfigWarningCode,
    ) {
        self.warnings.push(ConfigWarning {
            field: field.to_string(),
            message: message.into(),
            code,
        });
    }

    pub fn summary(&self) -> String {
        if self.errors.is_empty() && self.warnings.is_empty() {
            "Configuration is valid".to_string()
        } else {
            format!(
                "{} error(s), {} warning(s)",
                self.errors.len(),
                self.warnings.len()
            )
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConfigError {
    pub field: String,
    pub message: String,
    pub code: ConfigErrorCode,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} ({})", self.field, self.message, self.code)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigErrorCode {
    MissingRequired,
    InvalidValue,
}

impl fmt::Display for ConfigErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingRequired => write!(f, "MISSING_REQUIRED"),
            Self::InvalidValue => write!(f, "INVALID_VALUE"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConfigWarning {
    pub field: String,
    pub message: String,
    pub code: ConfigWarningCode,
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} ({})", self.field, self.message, self.code)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigWarningCode {
    NoTokenConfigured,
    InsecureTransport,
}

impl fmt::Display for ConfigWarningCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoTokenConfigured => write!(f, "NO_TOKEN"),
            Self::InsecureTransport => write!(f, "INSECURE_TRANSPORT"),
        }
    }
}

pub struct ConfigValidator;

impl ConfigValidator {
    pub fn validate(config: &DevopsConfig) -> ValidationResult {
        let mut result = ValidationResult::new();

        if config.log.level.parse::<LevelFilter>().is_err() {
            result.add_error(
                "log.level",
                format!(
                    "Unknown log level '{}'. Valid levels: off, error, warn, info, debug, trace",
                    config.log.level
                ),
                ConfigErrorCode::InvalidValue,
            );
        }

        Self::validate_jenkins(&config.jenkins, &mut result);
        if let Some(sonar) = &config.sonar {
            Self::validate_sonar(sonar, &mut result);
        }

        result
    }

    fn validate_jenkins(jenkins: &JenkinsConfig, result: &mut ValidationResult) {
        Self::validate_address("jenkins.address", &jenkins.address, result);

        if jenkins.token.is_empty() {
            result.add_warning(
                "jenkins.token",
                "No Jenkins API token configured. Requests will be anonymous.",
                ConfigWarningCode::NoTokenConfigured,
            );
        } else if jenkins.user.is_empty() {
            result.add_error(
                "jenkins.user",
                "Jenkins user is required when a token is set",
                ConfigErrorCode::MissingRequired,
            );
        }
    }

    fn validate_sonar(sonar: &SonarConfig, result: &mut ValidationResult) {
        Self::validate_address("sonar.address", &sonar.address, result);

        if sonar.token.is_empty() {
            result.add_warning(
                "sonar.token",
                "No SonarQube token configured. Private projects will not be readable.",
                ConfigWarningCode::NoTokenConfigured,
            );
        }
    }

    fn validate_address(field: &str, address: &str, result: &mut ValidationResult) {
        let address = address.trim();
        if address.is_empty() {
            result.add_error(field, "Server address is required", ConfigErrorCode::MissingRequired);
        } else if address.starts_with("http://") {
            result.add_warning(
                field,
                format!("'{address}' is not using TLS"),
                ConfigWarningCode::InsecureTransport,
            );
        } else if !address.starts_with("https://") {
            result.add_error(
                field,
                format!("'{address}' must start with http:// or https://"),
                ConfigErrorCode::InvalidValue,
            );
        }
    }
}
