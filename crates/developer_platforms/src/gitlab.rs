use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, Response, Url};
use serde_json::Value;
use tracing::{debug, error, info, instrument, warn};

use crate::{
    errors::Error,
    models::{Issue, Note},
    validation::{validate_issue, validate_notes},
    IssueProvider,
};

#[cfg(test)]
#[path = "gitlab_tests.rs"]
mod tests;

/// The number of notes requested per page.
pub const NOTES_PAGE_SIZE: u32 = 100;

/// Header that carries the personal, project or group access token.
const TOKEN_HEADER: HeaderName = HeaderName::from_static("private-token");

/// Header with the total number of pages of a paginated response.
const TOTAL_PAGES_HEADER: &str = "x-total-pages";

/// Header with the number of the next page, empty on the last page.
const NEXT_PAGE_HEADER: &str = "x-next-page";

/// Reads issues from the GitLab REST API (v4).
///
/// Every request carries the access token in the `PRIVATE-TOKEN` header. The
/// token is fixed for the lifetime of the provider.
///
/// # Examples
///
/// ```rust,no_run
/// use issue_prompt_developer_platforms::gitlab::GitLabProvider;
/// use issue_prompt_developer_platforms::{IssueDataOptions, IssueProvider};
///
/// # async fn example() -> Result<(), issue_prompt_developer_platforms::errors::Error> {
/// let provider = GitLabProvider::new("https://gitlab.example.com", "glpat-xxxx")?;
/// let data = provider
///     .get_issue_data("group/project", 42, IssueDataOptions::default())
///     .await?;
/// println!("{} has {} notes", data.issue.title, data.notes.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct GitLabProvider {
    client: Client,
    base_url: String,
}

impl GitLabProvider {
    /// Creates a provider for the GitLab instance at `base_url`.
    ///
    /// # Arguments
    ///
    /// * `base_url` - The root of the instance, e.g. `https://gitlab.com`
    /// * `token` - An access token with at least the `read_api` scope
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if the URL is not an http(s) URL,
    /// if the token cannot be sent as a header value, or if the HTTP client
    /// cannot be created.
    #[instrument(skip(token))]
    pub fn new(base_url: &str, token: &str) -> Result<Self, Error> {
        let base_url = normalize_base_url(base_url)?;

        let mut token_value = HeaderValue::from_str(token).map_err(|_| {
            Error::InvalidConfiguration(
                "The access token contains characters that are not allowed in an HTTP header"
                    .to_string(),
            )
        })?;
        token_value.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(TOKEN_HEADER, token_value);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .default_headers(headers)
            .user_agent(concat!("issue-prompt/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                Error::InvalidConfiguration(format!("Failed to create the HTTP client: {}", e))
            })?;

        debug!(base_url = %base_url, "Created GitLab provider");

        Ok(Self { client, base_url })
    }

    /// The base URL of the instance, without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn issue_url(&self, project_id: &str, issue_iid: u64) -> String {
        format!(
            "{}/api/v4/projects/{}/issues/{}",
            self.base_url,
            encode_project_id(project_id),
            issue_iid
        )
    }

    fn notes_url(&self, project_id: &str, issue_iid: u64) -> String {
        format!("{}/notes", self.issue_url(project_id, issue_iid))
    }

    /// Sends a GET request and turns any non-success response into an error.
    async fn get(&self, url: &str, query: &[(&str, String)]) -> Result<Response, Error> {
        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| {
                error!(url = url, error = %e, "Failed to send request to GitLab");
                Error::Transport(e)
            })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        error!(
            url = url,
            status = status.as_u16(),
            "GitLab returned an error response"
        );

        Err(Error::from_status(status, body))
    }
}

#[async_trait]
impl IssueProvider for GitLabProvider {
    #[instrument(skip(self))]
    async fn get_issue(&self, project_id: &str, issue_iid: u64) -> Result<Issue, Error> {
        let url = self.issue_url(project_id, issue_iid);
        let response = self.get(&url, &[]).await?;
        let payload = read_json(response).await?;

        let issue = validate_issue(&payload).map_err(|e| {
            error!(
                project = project_id,
                issue_iid,
                violations = e.violations.len(),
                "Issue payload failed validation"
            );
            Error::SchemaValidation(e)
        })?;

        info!(project = project_id, issue_iid, "Fetched issue");
        Ok(issue)
    }

    #[instrument(skip(self))]
    async fn list_issue_notes(
        &self,
        project_id: &str,
        issue_iid: u64,
        only_user_comments: bool,
    ) -> Result<Vec<Note>, Error> {
        let url = self.notes_url(project_id, issue_iid);

        let mut base_query = vec![
            ("sort", "asc".to_string()),
            ("order_by", "created_at".to_string()),
        ];
        if only_user_comments {
            base_query.push(("activity_filter", "only_comments".to_string()));
        }

        let mut notes = Vec::new();
        let mut page: u32 = 1;
        loop {
            let mut query = base_query.clone();
            query.push(("page", page.to_string()));
            query.push(("per_page", NOTES_PAGE_SIZE.to_string()));

            let response = self.get(&url, &query).await?;
            let next = next_page(response.headers(), page)?;
            let payload = read_json(response).await?;

            let page_notes = validate_notes(&payload).map_err(|e| {
                error!(
                    project = project_id,
                    issue_iid,
                    page,
                    violations = e.violations.len(),
                    "Notes payload failed validation"
                );
                Error::SchemaValidation(e)
            })?;

            debug!(
                project = project_id,
                issue_iid,
                page,
                count = page_notes.len(),
                "Fetched page of notes"
            );
            notes.extend(page_notes);

            match next {
                Some(n) => page = n,
                None => break,
            }
        }

        info!(
            project = project_id,
            issue_iid,
            pages = page,
            count = notes.len(),
            "Fetched notes"
        );
        Ok(notes)
    }
}

/// Works out which page to request after `current`.
///
/// `X-Total-Pages` is authoritative when present. GitLab leaves it out for
/// very large collections, in which case `X-Next-Page` is followed instead.
/// When both are missing the response is treated as the only page.
fn next_page(headers: &HeaderMap, current: u32) -> Result<Option<u32>, Error> {
    if let Some(total) = header_str(headers, TOTAL_PAGES_HEADER) {
        let total = parse_page_header(TOTAL_PAGES_HEADER, total)?;
        return Ok(if current < total {
            Some(current + 1)
        } else {
            None
        });
    }

    match header_str(headers, NEXT_PAGE_HEADER) {
        Some("") => Ok(None),
        Some(next) => {
            parse_page_header(NEXT_PAGE_HEADER, next)?;
            Ok(Some(current + 1))
        }
        None => {
            warn!(
                page = current,
                "Response has no pagination headers, assuming it is the last page"
            );
            Ok(None)
        }
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .map(|v| v.to_str().unwrap_or("\u{fffd}").trim())
}

fn parse_page_header(header: &'static str, value: &str) -> Result<u32, Error> {
    value
        .parse::<u32>()
        .map_err(|_| Error::InvalidPaginationHeader {
            header,
            value: value.to_string(),
        })
}

async fn read_json(response: Response) -> Result<Value, Error> {
    let text = response.text().await?;
    serde_json::from_str(&text).map_err(|e| Error::InvalidResponseBody(e.to_string()))
}

/// Percent-encodes a project ID or path for use as a single path segment.
///
/// IDs that are already encoded (`group%2Fproject`) are decoded first so they
/// are not encoded twice.
pub fn encode_project_id(project_id: &str) -> String {
    let decoded = urlencoding::decode(project_id)
        .map(|d| d.into_owned())
        .unwrap_or_else(|_| project_id.to_string());
    urlencoding::encode(&decoded).into_owned()
}

/// Checks that a base URL uses http or https and removes any trailing slash.
pub fn normalize_base_url(base_url: &str) -> Result<String, Error> {
    let trimmed = base_url.trim().trim_end_matches('/');
    let parsed = Url::parse(trimmed).map_err(|e| {
        Error::InvalidConfiguration(format!("'{}' is not a valid URL: {}", base_url, e))
    })?;

    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(Error::InvalidConfiguration(format!(
            "'{}' must use http or https",
            base_url
        )));
    }

    Ok(trimmed.to_string())
}
