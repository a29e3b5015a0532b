//! Jenkins API client and methods

use std::time::Duration;

use reqwest::header::{
    HeaderMap,
    HeaderValue,
    AUTHORIZATION,
    CONTENT_TYPE,
};
use reqwest::{
    Client,
    Response,
};

use crate::config;
use crate::credential::{
    CredentialInfo,
    CredentialList,
    CredentialPayload,
    DEFAULT_CREDENTIAL_DOMAIN,
};
use crate::error::{
    JenkinsError,
    JenkinsResult,
};
use crate::types;

const MAX_ATTEMPTS: u32 = 2;
const INITIAL_RETRY_DELAY: Duration = Duration::from_millis(50);
const ERROR_PREVIEW_LEN: usize = 300;
const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
const CREDENTIAL_TREE: &str =
    "id,typeName,displayName,description,fingerprint[fileName,hash,usage[name,ranges[ranges[start,end]]]]";

/// Jenkins API client with retry logic
#[derive(Clone)]
pub struct JenkinsClient {
    client: Client,
    server_url: String,
}

impl JenkinsClient {
    /// Builds a client authenticating every request with `username` and an
    /// API token.
    pub fn new(server_url: &str, username: &str, token: &str) -> JenkinsResult<Self> {
        let server_url = config::normalize_server_url(server_url)?;

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, config::basic_auth_header(username, token)?);

        let _ = rustls::crypto::ring::default_provider().install_default();
        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| JenkinsError::InvalidConfig(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self { client, server_url })
    }

    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    fn job_url(&self, job_path: &str) -> String {
        format!(
            "{}/job/{}",
            self.server_url,
            config::encode_job_name(job_path)
        )
    }

    fn credential_domain_url(&self, folder: &str, domain: &str) -> String {
        format!(
            "{}/credentials/store/folder/domain/{}",
            self.job_url(folder),
            urlencoding::encode(resolve_domain(domain))
        )
    }

    fn credential_url(&self, folder: &str, domain: &str, id: &str) -> String {
        format!(
            "{}/credential/{}",
            self.credential_domain_url(folder, domain),
            urlencoding::encode(id)
        )
    }

    /// Retries a request operation with exponential backoff
    pub(crate) async fn retry_request<F, Fut, T>(&self, operation: F) -> JenkinsResult<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = JenkinsResult<T>>,
    {
        let mut delay = INITIAL_RETRY_DELAY;
        let mut attempt = 1;

        loop {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) if attempt < MAX_ATTEMPTS && e.is_transient() => {
                    tracing::warn!(attempt, error = %e, "Jenkins request failed, retrying");
                    tokio::time::sleep(delay).await;
                    delay *= 2;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Fetches a job's name and class
    pub async fn fetch_job(&self, job_path: &str) -> JenkinsResult<types::Job> {
        self.retry_request(|| async {
            let url = format!("{}/api/json?tree=name", self.job_url(job_path));
            let response = self.send(self.client.get(&url), job_path).await?;
            response.json::<types::Job>().await.map_err(|e| {
                JenkinsError::SerializationError(format!("Failed to parse job {job_path}: {e}"))
            })
        })
        .await
    }

    /// Fetches the stored `config.xml` of a job
    pub async fn get_job_config(&self, job_path: &str) -> JenkinsResult<String> {
        self.retry_request(|| async {
            let url = format!("{}/config.xml", self.job_url(job_path));
            let response = self.send(self.client.get(&url), job_path).await?;
            response.text().await.map_err(|e| {
                JenkinsError::NetworkError(format!("Failed to read config of {job_path}: {e}"))
            })
        })
        .await
    }

    /// Replaces the `config.xml` of an existing job
    pub async fn set_job_config(&self, job_path: &str, config_xml: &str) -> JenkinsResult<()> {
        self.retry_request(|| async {
            let url = format!("{}/config.xml", self.job_url(job_path));
            let request = self
                .client
                .post(&url)
                .header(CONTENT_TYPE, HeaderValue::from_static("application/xml"))
                .body(config_xml.to_string());
            self.send(request, job_path).await?;
            Ok(())
        })
        .await?;

        tracing::debug!(job = job_path, "Updated Jenkins job config");
        Ok(())
    }

    /// Creates job `name` inside `folder` from a `config.xml` document.
    /// Not retried: a create that timed out may still have succeeded.
    pub async fn create_job_in_folder(
        &self, folder: &str, name: &str, config_xml: &str,
    ) -> JenkinsResult<()> {
        let parent = if folder.is_empty() {
            self.server_url.clone()
        } else {
            self.job_url(folder)
        };
        let url = format!("{parent}/createItem?name={}", urlencoding::encode(name));

        let request = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, HeaderValue::from_static("application/xml"))
            .body(config_xml.to_string());
        self.send(request, &format!("{folder}/{name}")).await?;

        tracing::info!(folder, job = name, "Created Jenkins job");
        Ok(())
    }

    /// Deletes a job and its builds
    pub async fn delete_job(&self, job_path: &str) -> JenkinsResult<()> {
        let url = format!("{}/doDelete", self.job_url(job_path));
        self.send(self.client.post(&url), job_path).await?;

        tracing::info!(job = job_path, "Deleted Jenkins job");
        Ok(())
    }

    /// Fetches the last build of a job, `None` when the job never ran
    pub async fn fetch_last_build(&self, job_path: &str) -> JenkinsResult<Option<types::Build>> {
        let result = self
            .retry_request(|| async {
                let url = format!(
                    "{}/lastBuild/api/json?tree=number,url,actions[_class,ceTaskId,serverUrl,sonarqubeDashboardUrl]",
                    self.job_url(job_path)
                );
                let response = self.send(self.client.get(&url), job_path).await?;
                response.json::<types::Build>().await.map_err(|e| {
                    JenkinsError::SerializationError(format!(
                        "Failed to parse last build of {job_path}: {e}"
                    ))
                })
            })
            .await;

        match result {
            Ok(build) => Ok(Some(build)),
            Err(JenkinsError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Adds a credential to the store of `folder`, returning its id.
    /// Not retried, like job creation.
    pub async fn create_credential_in_folder(
        &self, folder: &str, domain: &str, credential: &CredentialPayload,
    ) -> JenkinsResult<String> {
        let url = format!(
            "{}/createCredentials",
            self.credential_domain_url(folder, domain)
        );
        let body = credential
            .create_form()
            .map_err(|e| JenkinsError::SerializationError(e.to_string()))?;
        let request = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, HeaderValue::from_static(FORM_CONTENT_TYPE))
            .body(body);
        self.send(request, &format!("{folder} credentials")).await?;

        tracing::info!(folder, credential = credential.id(), "Created Jenkins credential");
        Ok(credential.id().to_string())
    }

    /// Replaces the stored credential with the same id
    pub async fn update_credential_in_folder(
        &self, folder: &str, domain: &str, credential: &CredentialPayload,
    ) -> JenkinsResult<String> {
        let url = format!(
            "{}/updateSubmit",
            self.credential_url(folder, domain, credential.id())
        );
        let body = credential
            .update_form()
            .map_err(|e| JenkinsError::SerializationError(e.to_string()))?;
        let target = format!("{folder} credential {}", credential.id());
        self.retry_request(|| async {
            let request = self
                .client
                .post(&url)
                .header(CONTENT_TYPE, HeaderValue::from_static(FORM_CONTENT_TYPE))
                .body(body.clone());
            self.send(request, &target).await?;
            Ok(())
        })
        .await?;

        tracing::debug!(folder, credential = credential.id(), "Updated Jenkins credential");
        Ok(credential.id().to_string())
    }

    pub async fn delete_credential_in_folder(
        &self, folder: &str, domain: &str, id: &str,
    ) -> JenkinsResult<String> {
        let url = format!("{}/doDelete", self.credential_url(folder, domain, id));
        self.send(self.client.post(&url), &format!("{folder} credential {id}"))
            .await?;

        tracing::info!(folder, credential = id, "Deleted Jenkins credential");
        Ok(id.to_string())
    }

    pub async fn get_credential_in_folder(
        &self, folder: &str, domain: &str, id: &str,
    ) -> JenkinsResult<CredentialInfo> {
        let target = format!("{folder} credential {id}");
        let mut credential = self
            .retry_request(|| async {
                let url = format!(
                    "{}/api/json?tree={}",
                    self.credential_url(folder, domain, id),
                    urlencoding::encode(CREDENTIAL_TREE)
                );
                let response = self.send(self.client.get(&url), &target).await?;
                response.json::<CredentialInfo>().await.map_err(|e| {
                    JenkinsError::SerializationError(format!("Failed to parse {target}: {e}"))
                })
            })
            .await?;

        if credential.domain.is_empty() {
            credential.domain = resolve_domain(domain).to_string();
        }
        Ok(credential)
    }

    /// Lists the credentials of one domain of the store of `folder`
    pub async fn get_credentials_in_folder(
        &self, folder: &str, domain: &str,
    ) -> JenkinsResult<Vec<CredentialInfo>> {
        let target = format!("{folder} credentials");
        let list = self
            .retry_request(|| async {
                let url = format!(
                    "{}/api/json?tree={}",
                    self.credential_domain_url(folder, domain),
                    urlencoding::encode(&format!("credentials[{CREDENTIAL_TREE}]"))
                );
                let response = self.send(self.client.get(&url), &target).await?;
                response.json::<CredentialList>().await.map_err(|e| {
                    JenkinsError::SerializationError(format!("Failed to parse {target}: {e}"))
                })
            })
            .await?;

        Ok(list
            .credentials
            .into_iter()
            .map(|mut credential| {
                if credential.domain.is_empty() {
                    credential.domain = resolve_domain(domain).to_string();
                }
                credential
            })
            .collect())
    }

    async fn send(&self, request: reqwest::RequestBuilder, target: &str) -> JenkinsResult<Response> {
        let response = request
            .send()
            .await
            .map_err(|e| JenkinsError::NetworkError(format!("Request for {target} failed: {e}")))?;
        check_status(response, target).await
    }
}

fn resolve_domain(domain: &str) -> &str {
    if domain.is_empty() {
        DEFAULT_CREDENTIAL_DOMAIN
    } else {
        domain
    }
}

async fn check_status(response: Response, target: &str) -> JenkinsResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let detail = if body.contains("<html") || body.contains("<!DOCTYPE html>") {
        format!("HTTP {status} for {target}")
    } else {
        let preview: String = body.chars().take(ERROR_PREVIEW_LEN).collect();
        format!("HTTP {status} for {target}: {preview}")
    };

    Err(match status.as_u16() {
        401 | 403 => JenkinsError::AuthenticationFailed(detail),
        404 => JenkinsError::NotFound(target.to_string()),
        400..=499 => JenkinsError::BadRequest(detail),
        _ => JenkinsError::ApiError(detail),
    })
}
