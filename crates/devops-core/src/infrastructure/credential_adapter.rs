use async_trait::async_trait;
use devops_jenkins::{
    CredentialInfo,
    CredentialPayload,
    JenkinsClient,
    JenkinsError,
};

use crate::domain::{
    CredentialBackend,
    DomainError,
    DomainResult,
};

/// [`CredentialBackend`] over the credentials store of each Jenkins folder
pub struct JenkinsCredentialBackend {
    client: JenkinsClient,
}

impl JenkinsCredentialBackend {
    pub fn new(client: JenkinsClient) -> Self {
        Self { client }
    }

    fn map_error(e: JenkinsError) -> DomainError {
        match e {
            JenkinsError::NotFound(msg) => DomainError::CredentialNotFound(msg),
            JenkinsError::AuthenticationFailed(msg) => DomainError::AuthenticationFailed(msg),
            JenkinsError::ApiError(msg) => DomainError::ApiError(msg),
            JenkinsError::BadRequest(msg) => DomainError::InvalidRequest(msg),
            JenkinsError::InvalidConfig(msg) => DomainError::InvalidConfig(msg),
            JenkinsError::NetworkError(msg) => DomainError::NetworkError(msg),
            JenkinsError::SerializationError(msg) => {
                DomainError::ApiError(format!("Serialization error: {msg}"))
            }
        }
    }
}

#[async_trait]
impl CredentialBackend for JenkinsCredentialBackend {
    async fn create_credential(
        &self, project: &str, domain: &str, credential: &CredentialPayload,
    ) -> DomainResult<String> {
        self.client
            .create_credential_in_folder(project, domain, credential)
            .await
            .map_err(Self::map_error)
    }

    async fn update_credential(
        &self, project: &str, domain: &str, credential: &CredentialPayload,
    ) -> DomainResult<String> {
        self.client
            .update_credential_in_folder(project, domain, credential)
            .await
            .map_err(Self::map_error)
    }

    async fn delete_credential(&self, project: &str, domain: &str, id: &str) -> DomainResult<String> {
        self.client
            .delete_credential_in_folder(project, domain, id)
            .await
            .map_err(Self::map_error)
    }

    async fn get_credential(
        &self, project: &str, domain: &str, id: &str,
    ) -> DomainResult<CredentialInfo> {
        self.client
            .get_credential_in_folder(project, domain, id)
            .await
            .map_err(Self::map_error)
    }

    async fn list_credentials(
        &self, project: &str, domain: &str,
    ) -> DomainResult<Vec<CredentialInfo>> {
        self.client
            .get_credentials_in_folder(project, domain)
            .await
            .map_err(Self::map_error)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use wiremock::matchers::{
        method,
        path,
    };
    use wiremock::{
        Mock,
        MockServer,
        ResponseTemplate,
    };

    use super::*;
    use crate::application::CredentialService;
    use crate::domain::CredentialRequest;

    const STORE: &str = "/job/demo/credentials/store/folder/domain/_";

    fn service(server: &MockServer) -> CredentialService {
        let client = JenkinsClient::new(&server.uri(), "admin", "token").unwrap();
        CredentialService::new(Arc::new(JenkinsCredentialBackend::new(client)))
    }

    #[test]
    fn test_map_error() {
        assert!(matches!(
            JenkinsCredentialBackend::map_error(JenkinsError::NotFound("github".into())),
            DomainError::CredentialNotFound(_)
        ));
        assert!(matches!(
            JenkinsCredentialBackend::map_error(JenkinsError::BadRequest("exists".into())),
            DomainError::InvalidRequest(_)
        ));
    }

    #[tokio::test]
    async fn test_update_credential_through_store() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("{STORE}/credential/sonar-token/api/json")))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "sonar-token",
                "typeName": "Secret text",
                "displayName": "sonar-token"
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(format!("{STORE}/credential/sonar-token/updateSubmit")))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let request: CredentialRequest = serde_json::from_value(serde_json::json!({
            "type": "secret_text",
            "content": {"secret": "squ_2"}
        }))
        .unwrap();
        let id = service(&server)
            .update_credential("demo", "sonar-token", &request)
            .await
            .unwrap();
        assert_eq!(id, "sonar-token");
    }

    #[tokio::test]
    async fn test_get_missing_credential() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = service(&server)
            .get_credential("demo", "gone", "")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::CredentialNotFound(_)));
        assert_eq!(err.status_code(), 404);
    }

    #[tokio::test]
    async fn test_list_credentials_maps_type_names() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("{STORE}/api/json")))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "credentials": [
                    {"id": "deploy-key", "typeName": "SSH Username with private key"},
                    {"id": "cert", "typeName": "Certificate"}
                ]
            })))
            .mount(&server)
            .await;

        let credentials = service(&server).list_credentials("demo", "").await.unwrap();
        assert_eq!(credentials[0].credential_type, "ssh");
        assert_eq!(credentials[1].credential_type, "Certificate");
        assert_eq!(credentials[1].domain, "_");
    }
}
