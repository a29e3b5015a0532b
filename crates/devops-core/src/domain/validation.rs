use super::{
    DomainError,
    DomainResult,
};

const MAX_PROJECT_ID_LENGTH: usize = 256;

const MAX_PIPELINE_ID_LENGTH: usize = 256;

const MAX_CREDENTIAL_ID_LENGTH: usize = 256;

/// Characters Jenkins refuses in item names
const UNSAFE_NAME_CHARS: &[char] = &[
    '/', '\\', ':', '?', '#', '[', ']', '!', '$', '&', '\'', '"', '*', ';', '<', '>', '|', '%',
    '@', '^',
];

pub fn validate_project_id(project_id: &str) -> DomainResult<()> {
    validate_item_name("Project id", project_id, MAX_PROJECT_ID_LENGTH)
}

pub fn validate_pipeline_id(pipeline_id: &str) -> DomainResult<()> {
    validate_item_name("Pipeline id", pipeline_id, MAX_PIPELINE_ID_LENGTH)
}

/// Credential ids end up in store URLs, so they follow item-name rules
pub fn validate_credential_id(credential_id: &str) -> DomainResult<()> {
    validate_item_name("Credential id", credential_id, MAX_CREDENTIAL_ID_LENGTH)
}

fn validate_item_name(label: &str, name: &str, max_length: usize) -> DomainResult<()> {
    if name.trim().is_empty() {
        return Err(DomainError::InvalidRequest(format!("{label} cannot be empty")));
    }

    if name.len() > max_length {
        return Err(DomainError::InvalidRequest(format!(
            "{label} exceeds maximum length of {max_length} characters"
        )));
    }

    if name == "." || name == ".." {
        return Err(DomainError::InvalidRequest(format!(
            "{label} '{name}' is reserved"
        )));
    }

    if let Some(c) = name
        .chars()
        .find(|c| c.is_control() || UNSAFE_NAME_CHARS.contains(c))
    {
        return Err(DomainError::InvalidRequest(format!(
            "{label} '{name}' contains unsafe character {c:?}"
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_pipeline_id_valid() {
        assert!(validate_pipeline_id("build").is_ok());
        assert!(validate_pipeline_id("nightly-release_2").is_ok());
        assert!(validate_pipeline_id("app.deploy").is_ok());
    }

    #[test]
    fn test_validate_pipeline_id_empty() {
        assert!(validate_pipeline_id("").is_err());
        assert!(validate_pipeline_id("   ").is_err());
    }

    #[test]
    fn test_validate_pipeline_id_too_long() {
        assert!(validate_pipeline_id(&"a".repeat(300)).is_err());
    }

    #[test]
    fn test_validate_pipeline_id_unsafe() {
        assert!(validate_pipeline_id("a/b").is_err());
        assert!(validate_pipeline_id("..").is_err());
        assert!(validate_pipeline_id("x?y").is_err());
        assert!(validate_pipeline_id("line\nbreak").is_err());
    }

    #[test]
    fn test_validate_credential_id() {
        assert!(validate_credential_id("github-token").is_ok());
        assert!(validate_credential_id("a/b").is_err());
        assert!(validate_credential_id("").is_err());
    }

    #[test]
    fn test_validate_project_id() {
        assert!(validate_project_id("demo-project").is_ok());
        assert!(matches!(
            validate_project_id(""),
            Err(DomainError::InvalidRequest(_))
        ));
    }
}
