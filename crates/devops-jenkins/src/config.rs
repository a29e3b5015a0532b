use reqwest::header::HeaderValue;

use crate::error::{
    JenkinsError,
    JenkinsResult,
};

/// Turns a `folder/job` path into the `folder/job/job` form Jenkins routes on
pub fn encode_job_name(name: &str) -> String {
    name.replace('/', "/job/")
}

pub(crate) fn normalize_server_url(server_url: &str) -> JenkinsResult<String> {
    let server_url = server_url.trim().trim_end_matches('/');
    if server_url.is_empty() {
        return Err(JenkinsError::InvalidConfig(
            "Missing Jenkins server URL".to_string(),
        ));
    }
    if !server_url.starts_with("http://") && !server_url.starts_with("https://") {
        return Err(JenkinsError::InvalidConfig(format!(
            "Jenkins server URL must start with http:// or https://: {server_url}"
        )));
    }
    Ok(server_url.to_string())
}

pub(crate) fn basic_auth_header(username: &str, token: &str) -> JenkinsResult<HeaderValue> {
    let auth_value = format!("{username}:{token}");
    let auth_header = format!(
        "Basic {}",
        base64::Engine::encode(
            &base64::engine::general_purpose::STANDARD,
            auth_value.as_bytes()
        )
    );

    HeaderValue::from_str(&auth_header)
        .map_err(|e| JenkinsError::InvalidConfig(format!("Invalid auth format: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_job_name() {
        assert_eq!(encode_job_name("folder/job"), "folder/job/job");
        assert_eq!(encode_job_name("simple"), "simple");
        assert_eq!(encode_job_name("a/b/c"), "a/job/b/job/c");
    }

    #[test]
    fn test_normalize_server_url() {
        assert_eq!(
            normalize_server_url("https://jenkins.example.com/").unwrap(),
            "https://jenkins.example.com"
        );
        assert!(matches!(
            normalize_server_url("  "),
            Err(JenkinsError::InvalidConfig(_))
        ));
        assert!(matches!(
            normalize_server_url("jenkins.example.com"),
            Err(JenkinsError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_basic_auth_header() {
        let header = basic_auth_header("admin", "secret").unwrap();
        assert_eq!(header.to_str().unwrap(), "Basic YWRtaW46c2VjcmV0");
        assert!(basic_auth_header("admin", "bad\ntoken").is_err());
    }
}
