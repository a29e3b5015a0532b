//! Payloads of the folder credentials store

use serde::{
    Deserialize,
    Serialize,
};

pub const SSH_CREDENTIAL_CLASS: &str =
    "com.cloudbees.jenkins.plugins.sshcredentials.impl.BasicSSHUserPrivateKey";
pub const DIRECT_PRIVATE_KEY_SOURCE_CLASS: &str =
    "com.cloudbees.jenkins.plugins.sshcredentials.impl.BasicSSHUserPrivateKey$DirectEntryPrivateKeySource";
pub const USERNAME_PASSWORD_CREDENTIAL_CLASS: &str =
    "com.cloudbees.plugins.credentials.impl.UsernamePasswordCredentialsImpl";
pub const SECRET_TEXT_CREDENTIAL_CLASS: &str =
    "org.jenkinsci.plugins.plaincredentials.impl.StringCredentialsImpl";

/// Credential domain used when none is given
pub const DEFAULT_CREDENTIAL_DOMAIN: &str = "_";

const GLOBAL_SCOPE: &str = "GLOBAL";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SshCredential {
    pub scope: String,
    pub id: String,
    pub username: String,
    pub passphrase: String,
    #[serde(rename = "privateKeySource")]
    pub key_source: PrivateKeySource,
    pub description: String,
    #[serde(rename = "stapler-class")]
    pub stapler_class: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrivateKeySource {
    #[serde(rename = "stapler-class")]
    pub stapler_class: String,
    #[serde(rename = "privateKey")]
    pub private_key: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UsernamePasswordCredential {
    pub scope: String,
    pub id: String,
    pub username: String,
    pub password: String,
    pub description: String,
    #[serde(rename = "stapler-class")]
    pub stapler_class: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SecretTextCredential {
    pub scope: String,
    pub id: String,
    pub secret: String,
    pub description: String,
    #[serde(rename = "stapler-class")]
    pub stapler_class: String,
}

impl SshCredential {
    pub fn new(
        id: &str, username: &str, passphrase: &str, private_key: &str, description: &str,
    ) -> Self {
        Self {
            scope: GLOBAL_SCOPE.to_string(),
            id: id.to_string(),
            username: username.to_string(),
            passphrase: passphrase.to_string(),
            key_source: PrivateKeySource {
                stapler_class: DIRECT_PRIVATE_KEY_SOURCE_CLASS.to_string(),
                private_key: private_key.to_string(),
            },
            description: description.to_string(),
            stapler_class: SSH_CREDENTIAL_CLASS.to_string(),
        }
    }
}

impl UsernamePasswordCredential {
    pub fn new(id: &str, username: &str, password: &str, description: &str) -> Self {
        Self {
            scope: GLOBAL_SCOPE.to_string(),
            id: id.to_string(),
            username: username.to_string(),
            password: password.to_string(),
            description: description.to_string(),
            stapler_class: USERNAME_PASSWORD_CREDENTIAL_CLASS.to_string(),
        }
    }
}

impl SecretTextCredential {
    pub fn new(id: &str, secret: &str, description: &str) -> Self {
        Self {
            scope: GLOBAL_SCOPE.to_string(),
            id: id.to_string(),
            secret: secret.to_string(),
            description: description.to_string(),
            stapler_class: SECRET_TEXT_CREDENTIAL_CLASS.to_string(),
        }
    }
}

/// A credential as submitted to the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum CredentialPayload {
    Ssh(SshCredential),
    UsernamePassword(UsernamePasswordCredential),
    SecretText(SecretTextCredential),
}

impl CredentialPayload {
    pub fn id(&self) -> &str {
        match self {
            Self::Ssh(credential) => &credential.id,
            Self::UsernamePassword(credential) => &credential.id,
            Self::SecretText(credential) => &credential.id,
        }
    }

    /// Form body of `createCredentials`, which wants the credential wrapped
    /// in a `credentials` object
    pub fn create_form(&self) -> serde_json::Result<String> {
        let json = serde_json::to_string(&serde_json::json!({ "credentials": self }))?;
        Ok(form_body(&json))
    }

    /// Form body of `updateSubmit`
    pub fn update_form(&self) -> serde_json::Result<String> {
        Ok(form_body(&serde_json::to_string(self)?))
    }
}

fn form_body(json: &str) -> String {
    format!("json={}", urlencoding::encode(json))
}

/// A stored credential as reported by the store's `api/json`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialInfo {
    #[serde(default)]
    pub id: String,
    #[serde(rename(deserialize = "typeName"), default)]
    pub type_name: String,
    #[serde(rename(deserialize = "displayName"), default)]
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<Fingerprint>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub domain: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fingerprint {
    #[serde(rename(deserialize = "fileName"), default, skip_serializing_if = "String::is_empty")]
    pub file_name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub hash: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub usage: Vec<FingerprintUsage>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FingerprintUsage {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default)]
    pub ranges: RangeSet,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeSet {
    #[serde(default)]
    pub ranges: Vec<BuildRange>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildRange {
    pub start: i64,
    pub end: i64,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct CredentialList {
    #[serde(default)]
    pub credentials: Vec<CredentialInfo>,
}
