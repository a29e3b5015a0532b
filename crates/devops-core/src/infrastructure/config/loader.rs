use std::path::{
    Path,
    PathBuf,
};

use thiserror::Error;

use super::interpolation::{
    interpolate_toml,
    InterpolationError,
};
use super::schema::DevopsConfig;

pub const CONFIG_PATH_ENV: &str = "DEVOPS_CONFIG_PATH";

const SYSTEM_CONFIG_PATH: &str = "/etc/devops/config.toml";

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Failed to serialize TOML: {0}")]
    SerializeError(#[from] toml::ser::Error),

    #[error("Environment variable interpolation failed: {0}")]
    InterpolationError(#[from] InterpolationError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type ConfigLoadResult<T> = Result<T, ConfigLoadError>;

pub struct ConfigLoader;

impl ConfigLoader {
    /// `DEVOPS_CONFIG_PATH`, then the user config dir, then the system path.
    /// The system path is returned even when it does not exist.
    pub fn discover_config_path() -> PathBuf {
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            tracing::debug!("Using config path from {}: {}", CONFIG_PATH_ENV, path);
            return PathBuf::from(path);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let path = config_dir.join("devops").join("config.toml");
            if path.exists() {
                tracing::debug!("Using user config path: {}", path.display());
                return path;
            }
        }

        let path = PathBuf::from(SYSTEM_CONFIG_PATH);
        tracing::debug!("Using system config path: {}", path.display());
        path
    }

    pub fn load_default() -> ConfigLoadResult<DevopsConfig> {
        let path = Self::discover_config_path();
        Self::load(&path)
    }

    pub fn load(path: &Path) -> ConfigLoadResult<DevopsConfig> {
        if !path.exists() {
            return Err(ConfigLoadError::FileNotFound(path.to_path_buf()));
        }

        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parses TOML and expands environment variables in every string value
    pub fn parse(content: &str) -> ConfigLoadResult<DevopsConfig> {
        let mut value: toml::Value = toml::from_str(content)?;

        interpolate_toml(&mut value)?;

        let config: DevopsConfig = value.try_into().map_err(|e| {
            ConfigLoadError::InvalidConfig(format!("Failed to deserialize config: {}", e))
        })?;

        tracing::debug!(
            jenkins = %config.jenkins.address,
            sonar = config.sonar.is_some(),
            "Loaded config"
        );

        Ok(config)
    }

    pub fn to_toml(config: &DevopsConfig) -> ConfigLoadResult<String> {
        Ok(toml::to_string_pretty(config)?)
    }

    pub fn save(config: &DevopsConfig, path: &Path) -> ConfigLoadResult<()> {
        let toml_str = Self::to_toml(config)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, toml_str)?;

        tracing::info!("Saved config to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::infrastructure::config::schema::SonarConfig;

    #[test]
    fn test_parse_full_config() {
        let content = r#"
[log]
level = "debug"

[jenkins]
address = "https://jenkins.example.com"
user = "admin"
token = "11abc"

[sonar]
address = "https://sonar.example.com"
token = "squ_123"
"#;

        let config = ConfigLoader::parse(content).unwrap();
        assert_eq!(config.log.level, "debug");
        assert_eq!(config.jenkins.address, "https://jenkins.example.com");
        assert_eq!(config.jenkins.user, "admin");
        assert_eq!(
            config.sonar,
            Some(SonarConfig {
                address: "https://sonar.example.com".to_string(),
                token: "squ_123".to_string(),
            })
        );
    }

    #[test]
    fn test_parse_defaults() {
        let config = ConfigLoader::parse("[jenkins]\naddress = \"http://localhost:8080\"\n").unwrap();
        assert_eq!(config.log.level, "info");
        assert!(config.jenkins.token.is_empty());
        assert!(config.sonar.is_none());
    }

    #[test]
    fn test_env_var_interpolation() {
        std::env::set_var("DEVOPS_TEST_JENKINS_TOKEN", "from-env");

        let content = r#"
[jenkins]
address = "${DEVOPS_TEST_JENKINS_URL:-http://jenkins:8080}"
user = "admin"
token = "${DEVOPS_TEST_JENKINS_TOKEN}"
"#;

        let config = ConfigLoader::parse(content).unwrap();
        assert_eq!(config.jenkins.address, "http://jenkins:8080");
        assert_eq!(config.jenkins.token, "from-env");

        std::env::remove_var("DEVOPS_TEST_JENKINS_TOKEN");
    }

    #[test]
    fn test_missing_env_var() {
        let content = "[jenkins]\ntoken = \"${DEVOPS_TEST_NEVER_SET}\"\n";
        assert!(matches!(
            ConfigLoader::parse(content),
            Err(ConfigLoadError::InterpolationError(_))
        ));
    }

    #[test]
    fn test_invalid_toml() {
        assert!(matches!(
            ConfigLoader::parse("[jenkins\naddress ="),
            Err(ConfigLoadError::ParseError(_))
        ));
        assert!(matches!(
            ConfigLoader::parse("[jenkins]\naddress = 42\n"),
            Err(ConfigLoadError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_save_then_load() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nested").join("config.toml");

        let mut config = DevopsConfig::default();
        config.jenkins.address = "https://jenkins.example.com".to_string();
        config.sonar = Some(SonarConfig {
            address: "https://sonar.example.com".to_string(),
            token: String::new(),
        });

        ConfigLoader::save(&config, &config_path).unwrap();
        assert_eq!(ConfigLoader::load(&config_path).unwrap(), config);
    }

    #[test]
    fn test_load_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("absent.toml");
        assert!(matches!(
            ConfigLoader::load(&path),
            Err(ConfigLoadError::FileNotFound(p)) if p == path
        ));
    }

    #[test]
    fn test_to_toml() {
        let toml_str = ConfigLoader::to_toml(&DevopsConfig::default()).unwrap();
        assert!(toml_str.contains("[log]"));
        assert!(toml_str.contains("[jenkins]"));
        assert!(!toml_str.contains("[sonar]"));
    }

    #[test]
    fn test_discover_config_path_env_override() {
        std::env::set_var(CONFIG_PATH_ENV, "/custom/path/config.toml");
        let path = ConfigLoader::discover_config_path();
        assert_eq!(path, PathBuf::from("/custom/path/config.toml"));
        std::env::remove_var(CONFIG_PATH_ENV);
    }
}
