use issue_prompt_core::errors::IssuePromptError;
use issue_prompt_developer_platforms::errors::Error as PlatformError;
use std::process::ExitCode;
use thiserror::Error;

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Authentication error
    #[error("{message}")]
    AuthError {
        /// Description of the failure
        message: String,

        /// The response body returned by GitLab, if any
        response: Option<String>,
    },

    /// Network error
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Invalid arguments
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// A GitLab response did not have the expected shape
    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    /// GitLab returned an error or an unreadable response
    #[error("{message}")]
    ApiError {
        /// Description of the failure
        message: String,

        /// The response body returned by GitLab, if any
        response: Option<String>,
    },

    /// The issue or the project does not exist
    #[error("{message}")]
    NotFound {
        /// Description of the failure
        message: String,

        /// The response body returned by GitLab, if any
        response: Option<String>,
    },

    /// The program that should receive the prompt could not be run
    #[error("Hand-off failed: {0}")]
    HandoffFailed(String),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

impl CliError {
    /// Creates an authentication error that did not come from a response.
    pub fn auth(message: impl Into<String>) -> Self {
        CliError::AuthError {
            message: message.into(),
            response: None,
        }
    }

    /// The response body returned by GitLab, if the error came from a response.
    pub fn response(&self) -> Option<&str> {
        match self {
            CliError::AuthError { response, .. }
            | CliError::ApiError { response, .. }
            | CliError::NotFound { response, .. } => response.as_deref(),
            _ => None,
        }
    }

    /// The process exit code for the error.
    pub fn exit_code(&self) -> u8 {
        match self {
            CliError::ValidationFailed(_) => 1,
            CliError::ApiError { .. } => 1,
            CliError::ConfigError(_) => 2,
            CliError::AuthError { .. } => 3,
            CliError::NetworkError(_) => 4,
            CliError::InvalidArguments(_) => 5,
            CliError::NotFound { .. } => 6,
            CliError::HandoffFailed(_) => 7,
            CliError::Other(_) => 1,
        }
    }
}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        CliError::Other(err.to_string())
    }
}

impl From<PlatformError> for CliError {
    fn from(err: PlatformError) -> Self {
        let message = err.to_string();
        let response = err.response_body().map(str::to_string);

        match err {
            PlatformError::Unauthorized { .. } | PlatformError::Forbidden { .. } => {
                CliError::AuthError { message, response }
            }
            PlatformError::NotFound { .. } => CliError::NotFound { message, response },
            PlatformError::Transport(_) => CliError::NetworkError(message),
            PlatformError::SchemaValidation(e) => CliError::ValidationFailed(e.to_string()),
            PlatformError::InvalidConfiguration(m) => CliError::ConfigError(m),
            PlatformError::UpstreamError { .. }
            | PlatformError::InvalidResponseBody(_)
            | PlatformError::InvalidPaginationHeader { .. } => {
                CliError::ApiError { message, response }
            }
        }
    }
}

impl From<IssuePromptError> for CliError {
    fn from(err: IssuePromptError) -> Self {
        match err {
            IssuePromptError::Platform(e) => e.into(),
            IssuePromptError::Serialization(e) => {
                CliError::Other(format!("Failed to serialize issue data: {}", e))
            }
        }
    }
}

impl std::process::Termination for CliError {
    fn report(self) -> ExitCode {
        eprintln!("Error: {}", self);
        if let Some(response) = self.response() {
            eprintln!("Response: {}", response);
        }

        ExitCode::from(self.exit_code())
    }
}
