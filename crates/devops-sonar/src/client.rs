//! SonarQube web API client

use std::time::Duration;

use reqwest::header::{
    HeaderMap,
    HeaderValue,
    AUTHORIZATION,
};
use reqwest::{
    Client,
    Response,
};

use crate::error::{
    SonarError,
    SonarResult,
};
use crate::types::{
    CeTask,
    CeTaskResponse,
    SonarStatus,
    ISSUES_PAGE_SIZE,
    MEASURES_ADDITIONAL_FIELDS,
    METRIC_KEYS,
};

#[derive(Clone)]
pub struct SonarClient {
    client: Client,
    server_url: String,
}

impl SonarClient {
    /// Builds a client for `server_url`. SonarQube takes user tokens as the
    /// basic-auth login with an empty password.
    pub fn new(server_url: &str, token: &str) -> SonarResult<Self> {
        let server_url = server_url.trim().trim_end_matches('/').to_string();
        if server_url.is_empty() {
            return Err(SonarError::InvalidConfig(
                "Missing SonarQube server URL".to_string(),
            ));
        }

        let mut headers = HeaderMap::new();
        if !token.is_empty() {
            let auth_header = format!(
                "Basic {}",
                base64::Engine::encode(
                    &base64::engine::general_purpose::STANDARD,
                    format!("{token}:").as_bytes()
                )
            );
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&auth_header)
                    .map_err(|e| SonarError::InvalidConfig(format!("Invalid token format: {e}")))?,
            );
        }

        let _ = rustls::crypto::ring::default_provider().install_default();
        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| SonarError::InvalidConfig(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self { client, server_url })
    }

    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path_and_query: &str) -> SonarResult<T> {
        let url = format!("{}{path_and_query}", self.server_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| SonarError::NetworkError(format!("Request to {url} failed: {e}")))?;
        let response = check_status(response, path_and_query).await?;

        response
            .json::<T>()
            .await
            .map_err(|e| SonarError::SerializationError(format!("Failed to parse {url}: {e}")))
    }

    pub async fn ce_task(&self, task_id: &str) -> SonarResult<CeTask> {
        let response: CeTaskResponse = self
            .get_json(&format!("/api/ce/task?id={}", urlencoding::encode(task_id)))
            .await?;
        Ok(response.task)
    }

    pub async fn measures_component(&self, component: &str) -> SonarResult<serde_json::Value> {
        self.get_json(&format!(
            "/api/measures/component?component={}&additionalFields={MEASURES_ADDITIONAL_FIELDS}&metricKeys={METRIC_KEYS}",
            urlencoding::encode(component)
        ))
        .await
    }

    /// First page of unresolved issues, ordered by file and line
    pub async fn issues_search(&self, component: &str) -> SonarResult<serde_json::Value> {
        self.get_json(&format!(
            "/api/issues/search?componentKeys={}&additionalFields=_all&resolved=false&ps={ISSUES_PAGE_SIZE}&s=FILE_LINE",
            urlencoding::encode(component)
        ))
        .await
    }

    /// Resolves a scanner task to its component and loads measures and
    /// issues. An issue search failure leaves `issues` empty instead of
    /// failing the analysis.
    pub async fn fetch_analysis(&self, task_id: &str) -> SonarResult<SonarStatus> {
        let task = self.ce_task(task_id).await?;
        if task.component_key.is_empty() {
            return Err(SonarError::NotFound(format!(
                "Task {task_id} has no component"
            )));
        }

        let (measures, issues) = futures::join!(
            self.measures_component(&task.component_key),
            self.issues_search(&task.component_key)
        );

        let issues = match issues {
            Ok(issues) => Some(issues),
            Err(e) => {
                tracing::warn!(component = %task.component_key, error = %e, "Failed to search sonar issues");
                None
            }
        };

        Ok(SonarStatus {
            measures: Some(measures?),
            issues,
        })
    }
}

async fn check_status(response: Response, target: &str) -> SonarResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let detail = format!("HTTP {status} for {target}: {body}");
    Err(match status.as_u16() {
        401 | 403 => SonarError::AuthenticationFailed(detail),
        404 => SonarError::NotFound(detail),
        _ => SonarError::ApiError(detail),
    })
}
