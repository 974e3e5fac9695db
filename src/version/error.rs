use thiserror::Error;

#[derive(Debug, Error)]
pub enum VersionError {
    #[error("Invalid regexp: {0}")]
    Pattern(#[from] regex::Error),

    #[error("version number was not valid: '{text}': {reason}")]
    InvalidVersion { text: String, reason: String },
}

impl VersionError {
    pub(crate) fn invalid(text: &str, reason: impl Into<String>) -> Self {
        VersionError::InvalidVersion {
            text: text.to_string(),
            reason: reason.into(),
        }
    }
}
