use std::sync::Arc;

use crate::domain::{
    validate_credential_id,
    validate_project_id,
    Credential,
    CredentialBackend,
    CredentialKind,
    CredentialRequest,
    DomainError,
    DomainResult,
};

/// Credentials stored in a project folder, usable by its pipelines
pub struct CredentialService {
    backend: Arc<dyn CredentialBackend>,
}

impl CredentialService {
    pub fn new(backend: Arc<dyn CredentialBackend>) -> Self {
        Self { backend }
    }

    /// Stores a new credential and returns its id
    pub async fn create_credential(
        &self, project: &str, request: &CredentialRequest,
    ) -> DomainResult<String> {
        validate_project_id(project)?;
        let kind = request.kind()?;
        let payload = request.payload(kind, None)?;
        validate_credential_id(payload.id())?;

        let id = self
            .backend
            .create_credential(project, &request.domain, &payload)
            .await?;

        tracing::info!(project, credential = %id, %kind, "Created credential");
        Ok(id)
    }

    /// Replaces a credential's content. The stored kind wins over the
    /// request's `type`, and the credential keeps its id.
    pub async fn update_credential(
        &self, project: &str, credential_id: &str, request: &CredentialRequest,
    ) -> DomainResult<String> {
        validate_project_id(project)?;
        validate_credential_id(credential_id)?;

        let existing = self
            .backend
            .get_credential(project, &request.domain, credential_id)
            .await?;
        let kind = CredentialKind::from_type_name(&existing.type_name)
            .ok_or_else(|| DomainError::UnsupportedCredentialType(existing.type_name.clone()))?;
        let payload = request.payload(kind, Some(credential_id))?;

        let id = self
            .backend
            .update_credential(project, &request.domain, &payload)
            .await?;

        tracing::info!(project, credential = %id, %kind, "Updated credential");
        Ok(id)
    }

    pub async fn delete_credential(
        &self, project: &str, credential_id: &str, domain: &str,
    ) -> DomainResult<String> {
        validate_project_id(project)?;
        validate_credential_id(credential_id)?;
        let id = self
            .backend
            .delete_credential(project, domain, credential_id)
            .await?;

        tracing::info!(project, credential = %id, "Deleted credential");
        Ok(id)
    }

    pub async fn get_credential(
        &self, project: &str, credential_id: &str, domain: &str,
    ) -> DomainResult<Credential> {
        validate_project_id(project)?;
        validate_credential_id(credential_id)?;
        let info = self
            .backend
            .get_credential(project, domain, credential_id)
            .await?;
        Ok(Credential::from(info))
    }

    pub async fn list_credentials(&self, project: &str, domain: &str) -> DomainResult<Vec<Credential>> {
        validate_project_id(project)?;
        let infos = self.backend.list_credentials(project, domain).await?;
        Ok(infos.into_iter().map(Credential::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use devops_jenkins::{
        CredentialInfo,
        CredentialPayload,
    };
    use serde_json::json;

    use super::*;

    /// Keeps payloads by (project, id); the domain is ignored
    #[derive(Default)]
    struct FakeStore {
        credentials: Mutex<BTreeMap<(String, String), CredentialPayload>>,
    }

    impl FakeStore {
        fn payload(&self, project: &str, id: &str) -> Option<CredentialPayload> {
            self.credentials
                .lock()
                .unwrap()
                .get(&(project.to_string(), id.to_string()))
                .cloned()
        }

        fn info(id: &str, payload: &CredentialPayload) -> CredentialInfo {
            let kind = match payload {
                CredentialPayload::Ssh(_) => CredentialKind::Ssh,
                CredentialPayload::UsernamePassword(_) => CredentialKind::UsernamePassword,
                CredentialPayload::SecretText(_) => CredentialKind::SecretText,
            };
            CredentialInfo {
                id: id.to_string(),
                type_name: kind.type_name().to_string(),
                display_name: id.to_string(),
                domain: "_".to_string(),
                ..Default::default()
            }
        }
    }

    #[async_trait]
    impl CredentialBackend for FakeStore {
        async fn create_credential(
            &self, project: &str, _domain: &str, credential: &CredentialPayload,
        ) -> DomainResult<String> {
            let key = (project.to_string(), credential.id().to_string());
            let mut credentials = self.credentials.lock().unwrap();
            if credentials.contains_key(&key) {
                return Err(DomainError::InvalidRequest(format!(
                    "{} already exists",
                    credential.id()
                )));
            }
            credentials.insert(key, credential.clone());
            Ok(credential.id().to_string())
        }

        async fn update_credential(
            &self, project: &str, _domain: &str, credential: &CredentialPayload,
        ) -> DomainResult<String> {
            self.credentials.lock().unwrap().insert(
                (project.to_string(), credential.id().to_string()),
                credential.clone(),
            );
            Ok(credential.id().to_string())
        }

        async fn delete_credential(
            &self, project: &str, _domain: &str, id: &str,
        ) -> DomainResult<String> {
            self.credentials
                .lock()
                .unwrap()
                .remove(&(project.to_string(), id.to_string()))
                .map(|_| id.to_string())
                .ok_or_else(|| DomainError::CredentialNotFound(id.to_string()))
        }

        async fn get_credential(
            &self, project: &str, _domain: &str, id: &str,
        ) -> DomainResult<CredentialInfo> {
            self.payload(project, id)
                .map(|payload| Self::info(id, &payload))
                .ok_or_else(|| DomainError::CredentialNotFound(id.to_string()))
        }

        async fn list_credentials(
            &self, project: &str, _domain: &str,
        ) -> DomainResult<Vec<CredentialInfo>> {
            Ok(self
                .credentials
                .lock()
                .unwrap()
                .iter()
                .filter(|((p, _), _)| p == project)
                .map(|((_, id), payload)| Self::info(id, payload))
                .collect())
        }
    }

    fn request(value: serde_json::Value) -> CredentialRequest {
        serde_json::from_value(value).unwrap()
    }

    #[tokio::test]
    async fn test_create_then_get_credential() {
        let store = Arc::new(FakeStore::default());
        let service = CredentialService::new(store.clone());

        let id = service
            .create_credential(
                "demo",
                &request(json!({
                    "type": "username_password",
                    "content": {"id": "github", "username": "admin", "password": "pw"}
                })),
            )
            .await
            .unwrap();
        assert_eq!(id, "github");

        let credential = service.get_credential("demo", "github", "").await.unwrap();
        assert_eq!(credential.credential_type, "username_password");
        assert_eq!(credential.domain, "_");

        let Some(CredentialPayload::UsernamePassword(stored)) = store.payload("demo", "github")
        else {
            panic!("expected a username/password credential");
        };
        assert_eq!(stored.password, "pw");
    }

    #[tokio::test]
    async fn test_create_rejects_bad_requests() {
        let service = CredentialService::new(Arc::new(FakeStore::default()));

        assert!(matches!(
            service
                .create_credential("demo", &request(json!({"type": "kubeconfig", "content": {}})))
                .await,
            Err(DomainError::UnsupportedCredentialType(_))
        ));
        assert!(matches!(
            service
                .create_credential("demo", &request(json!({"type": "secret_text", "content": {"secret": "s"}})))
                .await,
            Err(DomainError::InvalidRequest(_))
        ));
        assert!(matches!(
            service
                .create_credential("", &request(json!({"type": "secret_text", "content": {"id": "t"}})))
                .await,
            Err(DomainError::InvalidRequest(_))
        ));
    }

    #[tokio::test]
    async fn test_update_keeps_stored_kind_and_id() {
        let store = Arc::new(FakeStore::default());
        let service = CredentialService::new(store.clone());
        service
            .create_credential(
                "demo",
                &request(json!({"type": "ssh", "content": {"id": "deploy-key", "private_key": "OLD"}})),
            )
            .await
            .unwrap();

        let id = service
            .update_credential(
                "demo",
                "deploy-key",
                &request(json!({
                    "type": "secret_text",
                    "content": {"id": "renamed", "username": "git", "private_key": "NEW"}
                })),
            )
            .await
            .unwrap();
        assert_eq!(id, "deploy-key");

        let Some(CredentialPayload::Ssh(stored)) = store.payload("demo", "deploy-key") else {
            panic!("expected an ssh credential");
        };
        assert_eq!(stored.username, "git");
        assert_eq!(stored.key_source.private_key, "NEW");
        assert!(store.payload("demo", "renamed").is_none());
    }

    #[tokio::test]
    async fn test_update_missing_credential() {
        let service = CredentialService::new(Arc::new(FakeStore::default()));
        let err = service
            .update_credential("demo", "gone", &request(json!({"type": "secret_text"})))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 404);
    }

    #[tokio::test]
    async fn test_list_and_delete_credentials() {
        let service = CredentialService::new(Arc::new(FakeStore::default()));
        for id in ["a-token", "b-token"] {
            service
                .create_credential(
                    "demo",
                    &request(json!({"type": "secret_text", "content": {"id": id, "secret": "s"}})),
                )
                .await
                .unwrap();
        }

        let credentials = service.list_credentials("demo", "").await.unwrap();
        let ids: Vec<_> = credentials.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, ["a-token", "b-token"]);
        assert!(credentials.iter().all(|c| c.credential_type == "secret_text"));

        assert_eq!(
            service.delete_credential("demo", "a-token", "").await.unwrap(),
            "a-token"
        );
        assert_eq!(service.list_credentials("demo", "").await.unwrap().len(), 1);
        assert!(matches!(
            service.delete_credential("demo", "a-token", "").await,
            Err(DomainError::CredentialNotFound(_))
        ));
    }
}
