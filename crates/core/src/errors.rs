use issue_prompt_developer_platforms::errors::Error as PlatformError;
use thiserror::Error;

/// Errors raised while fetching or rendering an issue
#[derive(Error, Debug)]
pub enum IssuePromptError {
    /// The platform request or the validation of its response failed
    #[error(transparent)]
    Platform(#[from] PlatformError),

    /// The issue data could not be written as JSON
    #[error("Failed to serialize issue data: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl IssuePromptError {
    /// The raw response body returned by the platform, if there was one.
    pub fn response_body(&self) -> Option<&str> {
        match self {
            IssuePromptError::Platform(e) => e.response_body(),
            IssuePromptError::Serialization(_) => None,
        }
    }
}
