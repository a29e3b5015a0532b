use std::fmt;
use std::str::FromStr;

use devops_jenkins::credential::Fingerprint;
use devops_jenkins::{
    CredentialInfo,
    CredentialPayload,
    SecretTextCredential,
    SshCredential,
    UsernamePasswordCredential,
};
use serde::{
    Deserialize,
    Serialize,
};
use serde_json::Value;

use super::{
    DomainError,
    DomainResult,
};

/// Kinds of credential a project can store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialKind {
    Ssh,
    UsernamePassword,
    SecretText,
}

impl CredentialKind {
    pub const ALL: [CredentialKind; 3] = [Self::Ssh, Self::UsernamePassword, Self::SecretText];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ssh => "ssh",
            Self::UsernamePassword => "username_password",
            Self::SecretText => "secret_text",
        }
    }

    /// The `typeName` Jenkins reports for this kind
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Ssh => "SSH Username with private key",
            Self::UsernamePassword => "Username with password",
            Self::SecretText => "Secret text",
        }
    }

    pub fn from_type_name(type_name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.type_name() == type_name)
    }
}

impl FromStr for CredentialKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| DomainError::UnsupportedCredentialType(s.to_string()))
    }
}

impl fmt::Display for CredentialKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body of a create or update request: `{"type", "domain", "content"}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CredentialRequest {
    #[serde(rename = "type", default)]
    pub credential_type: String,
    #[serde(default)]
    pub domain: String,
    #[serde(default)]
    pub content: Value,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SshContent {
    id: String,
    username: String,
    passphrase: String,
    private_key: String,
    description: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct UsernamePasswordContent {
    id: String,
    username: String,
    password: String,
    description: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SecretTextContent {
    id: String,
    secret: String,
    description: String,
}

impl CredentialRequest {
    pub fn kind(&self) -> DomainResult<CredentialKind> {
        self.credential_type.parse()
    }

    /// Builds the store payload for `kind`. `id` replaces the content's id
    /// when given.
    pub fn payload(&self, kind: CredentialKind, id: Option<&str>) -> DomainResult<CredentialPayload> {
        let content = if self.content.is_null() {
            Value::Object(Default::default())
        } else {
            self.content.clone()
        };
        let invalid =
            |e: serde_json::Error| DomainError::InvalidRequest(format!("Invalid {kind} content: {e}"));

        let payload = match kind {
            CredentialKind::Ssh => {
                let c: SshContent = serde_json::from_value(content).map_err(invalid)?;
                CredentialPayload::Ssh(SshCredential::new(
                    id.unwrap_or(c.id.as_str()),
                    &c.username,
                    &c.passphrase,
                    &c.private_key,
                    &c.description,
                ))
            }
            CredentialKind::UsernamePassword => {
                let c: UsernamePasswordContent = serde_json::from_value(content).map_err(invalid)?;
                CredentialPayload::UsernamePassword(UsernamePasswordCredential::new(
                    id.unwrap_or(c.id.as_str()),
                    &c.username,
                    &c.password,
                    &c.description,
                ))
            }
            CredentialKind::SecretText => {
                let c: SecretTextContent = serde_json::from_value(content).map_err(invalid)?;
                CredentialPayload::SecretText(SecretTextCredential::new(
                    id.unwrap_or(c.id.as_str()),
                    &c.secret,
                    &c.description,
                ))
            }
        };
        Ok(payload)
    }
}

/// A stored credential. Secrets are never part of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Credential {
    pub id: String,
    /// `ssh`, `username_password`, `secret_text`, or Jenkins' own type name
    /// for kinds this service does not manage
    #[serde(rename = "type")]
    pub credential_type: String,
    pub display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<Fingerprint>,
    pub description: String,
    pub domain: String,
}

impl From<CredentialInfo> for Credential {
    fn from(info: CredentialInfo) -> Self {
        let credential_type = CredentialKind::from_type_name(&info.type_name)
            .map(|kind| kind.as_str().to_string())
            .unwrap_or(info.type_name);
        Self {
            id: info.id,
            credential_type,
            display_name: info.display_name,
            fingerprint: info.fingerprint.filter(|f| !f.hash.is_empty()),
            description: info.description,
            domain: info.domain,
        }
    }
}
