use async_trait::async_trait;
use tracing::{debug, warn};

pub mod errors;

pub mod gitlab;

pub mod models;

pub mod validation;

use errors::Error;
use models::{Issue, IssueData, Note};

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;

#[cfg(test)]
mod test_fixtures;

/// Options that control which parts of the discussion thread are fetched.
///
/// # Examples
///
/// ```
/// use issue_prompt_developer_platforms::IssueDataOptions;
///
/// let options = IssueDataOptions::default();
/// assert!(options.include_comments);
/// assert!(!options.only_user_comments);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IssueDataOptions {
    /// Fetch the notes of the issue. When `false` no notes request is made.
    pub include_comments: bool,

    /// Drop notes that were generated by the platform.
    pub only_user_comments: bool,
}

impl Default for IssueDataOptions {
    fn default() -> Self {
        Self {
            include_comments: true,
            only_user_comments: false,
        }
    }
}

/// Trait for reading issues from developer platforms (e.g., GitLab).
///
/// Implementations perform authenticated requests, validate every payload and
/// classify failures into [`Error`]. Implementations must not retry failed
/// requests and must not keep state between calls.
///
/// # Example Implementation
///
/// ```rust,no_run
/// use issue_prompt_developer_platforms::{IssueProvider, errors::Error, models::{Issue, Note}};
/// use async_trait::async_trait;
///
/// #[derive(Debug)]
/// struct SnapshotProvider {
///     issue: Issue,
///     notes: Vec<Note>,
/// }
///
/// #[async_trait]
/// impl IssueProvider for SnapshotProvider {
///     async fn get_issue(&self, _project_id: &str, _issue_iid: u64) -> Result<Issue, Error> {
///         Ok(self.issue.clone())
///     }
///
///     async fn list_issue_notes(
///         &self,
///         _project_id: &str,
///         _issue_iid: u64,
///         _only_user_comments: bool,
///     ) -> Result<Vec<Note>, Error> {
///         Ok(self.notes.clone())
///     }
/// }
/// ```
#[async_trait]
pub trait IssueProvider: Send + Sync {
    /// Retrieves a single issue.
    ///
    /// # Arguments
    ///
    /// * `project_id` - The numeric project ID or the full path of the project
    /// * `issue_iid` - The project scoped sequence number of the issue
    ///
    /// # Returns
    ///
    /// A `Result` containing the validated issue
    ///
    /// # Errors
    ///
    /// * [`Error::NotFound`] if the issue or project does not exist, or is not visible
    /// * [`Error::Unauthorized`] if the credential was rejected
    /// * [`Error::Forbidden`] if the credential lacks the required scope
    /// * [`Error::UpstreamError`] for any other failed response
    /// * [`Error::SchemaValidation`] if the response is not a valid issue
    async fn get_issue(&self, project_id: &str, issue_iid: u64) -> Result<Issue, Error>;

    /// Retrieves every note on an issue, oldest first.
    ///
    /// All pages are fetched before this returns.
    ///
    /// # Arguments
    ///
    /// * `project_id` - The numeric project ID or the full path of the project
    /// * `issue_iid` - The project scoped sequence number of the issue
    /// * `only_user_comments` - Ask the platform to leave out system notes
    ///
    /// # Returns
    ///
    /// A `Result` containing the notes in the order the platform returned them
    async fn list_issue_notes(
        &self,
        project_id: &str,
        issue_iid: u64,
        only_user_comments: bool,
    ) -> Result<Vec<Note>, Error>;

    /// Retrieves an issue together with its notes.
    ///
    /// When `options.include_comments` is `false` the notes are not requested
    /// at all.
    ///
    /// When `options.only_user_comments` is set, system notes are filtered
    /// twice: the platform is asked to leave them out, and whatever comes back
    /// is filtered again here. The platform filter does not catch every kind of
    /// system note, so the local filter must stay even though it usually has
    /// nothing to do.
    ///
    /// # Arguments
    ///
    /// * `project_id` - The numeric project ID or the full path of the project
    /// * `issue_iid` - The project scoped sequence number of the issue
    /// * `options` - Which notes to include
    ///
    /// # Returns
    ///
    /// A `Result` containing the issue and its notes
    async fn get_issue_data(
        &self,
        project_id: &str,
        issue_iid: u64,
        options: IssueDataOptions,
    ) -> Result<IssueData, Error> {
        let issue = self.get_issue(project_id, issue_iid).await?;

        let notes = if options.include_comments {
            let notes = self
                .list_issue_notes(project_id, issue_iid, options.only_user_comments)
                .await?;

            if options.only_user_comments {
                filter_user_comments(notes)
            } else {
                notes
            }
        } else {
            debug!(
                project = project_id,
                issue_iid, "Comments not requested, skipping notes"
            );
            Vec::new()
        };

        check_note_ownership(&issue, &notes);

        Ok(IssueData { issue, notes })
    }
}

/// Removes system notes, keeping the order of the remaining notes.
pub fn filter_user_comments(notes: Vec<Note>) -> Vec<Note> {
    let before = notes.len();
    let notes: Vec<Note> = notes.into_iter().filter(|n| n.is_user_comment()).collect();

    if notes.len() != before {
        debug!(
            removed = before - notes.len(),
            "Removed system notes that the platform filter let through"
        );
    }

    notes
}

fn check_note_ownership(issue: &Issue, notes: &[Note]) {
    for note in notes.iter().filter(|n| !n.belongs_to(issue)) {
        warn!(
            note = note.id,
            noteable_id = note.noteable_id,
            issue_id = issue.id,
            issue_iid = issue.iid,
            "Note does not reference the issue it was fetched for"
        );
    }
}
