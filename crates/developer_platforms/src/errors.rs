use reqwest::StatusCode;

use crate::validation::SchemaValidationError;

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;

/// Error types for developer platform operations.
///
/// This enum represents all possible errors that can occur when reading issues
/// from a developer platform. HTTP failures are classified by status code so
/// that callers can tell a bad credential from a missing issue without looking
/// at the raw response.
///
/// None of these errors are retried by the provider; they are reported to the
/// caller as soon as they happen.
///
/// # Examples
///
/// ```rust
/// use issue_prompt_developer_platforms::errors::Error;
///
/// let not_found = Error::NotFound {
///     body: r#"{"message":"404 Not found"}"#.to_string(),
/// };
/// assert_eq!(
///     not_found.to_string(),
///     "Issue or project not found. Check the project ID and issue IID."
/// );
/// assert_eq!(not_found.response_body(), Some(r#"{"message":"404 Not found"}"#));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The platform rejected the credential (HTTP 401).
    ///
    /// The token is invalid, expired or revoked. Credentials are never
    /// refreshed, so this is terminal for the invocation.
    #[error("Authentication failed. Check your GitLab token.")]
    Unauthorized {
        /// The raw response body
        body: String,
    },

    /// The credential is valid but lacks the required scope (HTTP 403).
    #[error("Access forbidden. Your token may not have sufficient permissions.")]
    Forbidden {
        /// The raw response body
        body: String,
    },

    /// The issue or the project does not exist, or the token cannot see it (HTTP 404).
    #[error("Issue or project not found. Check the project ID and issue IID.")]
    NotFound {
        /// The raw response body
        body: String,
    },

    /// Any other non-success response.
    #[error("GitLab API error: {status}")]
    UpstreamError {
        /// The status code of the response
        status: StatusCode,

        /// The raw response body
        body: String,
    },

    /// The request could not be sent or the response could not be read.
    #[error("Request to GitLab failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response body did not match the expected schema.
    #[error(transparent)]
    SchemaValidation(#[from] SchemaValidationError),

    /// The response body could not be decoded as JSON.
    #[error("Response body was not valid JSON: {0}")]
    InvalidResponseBody(String),

    /// A pagination header had a value that is not a page number.
    #[error("Invalid value '{value}' for the {header} response header")]
    InvalidPaginationHeader {
        /// The name of the header
        header: &'static str,

        /// The value of the header
        value: String,
    },

    /// The provider could not be created from the given settings.
    #[error("Invalid GitLab client configuration: {0}")]
    InvalidConfiguration(String),
}

impl Error {
    /// Classifies a non-success response by its status code.
    pub fn from_status(status: StatusCode, body: String) -> Self {
        match status {
            StatusCode::UNAUTHORIZED => Error::Unauthorized { body },
            StatusCode::FORBIDDEN => Error::Forbidden { body },
            StatusCode::NOT_FOUND => Error::NotFound { body },
            _ => Error::UpstreamError { status, body },
        }
    }

    /// Returns the raw response body for errors caused by an HTTP response.
    ///
    /// Empty bodies are reported as `None`.
    pub fn response_body(&self) -> Option<&str> {
        let body = match self {
            Error::Unauthorized { body }
            | Error::Forbidden { body }
            | Error::NotFound { body }
            | Error::UpstreamError { body, .. } => body,
            _ => return None,
        };

        if body.trim().is_empty() {
            None
        } else {
            Some(body)
        }
    }

    /// Returns the HTTP status code for errors caused by an HTTP response.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::Unauthorized { .. } => Some(StatusCode::UNAUTHORIZED),
            Error::Forbidden { .. } => Some(StatusCode::FORBIDDEN),
            Error::NotFound { .. } => Some(StatusCode::NOT_FOUND),
            Error::UpstreamError { status, .. } => Some(*status),
            Error::Transport(e) => e.status(),
            _ => None,
        }
    }
}
