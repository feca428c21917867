//! Branch, commit and merge request conventions for working on an issue.

use issue_prompt_developer_platforms::models::Issue;

use crate::config::{
    BRANCH_PREFIX_FEATURE, BRANCH_PREFIX_FIX, FIX_ISSUE_TYPES, ISSUE_PATH_SUFFIX_REGEX,
    NEW_MERGE_REQUEST_PATH,
};

#[cfg(test)]
#[path = "workflow_tests.rs"]
mod tests;

/// The git workflow suggested for resolving an issue.
///
/// # Examples
///
/// ```
/// use issue_prompt_core::workflow::WorkflowPlan;
///
/// let plan = WorkflowPlan::new(
///     "bug",
///     42,
///     "https://example.com/group/proj/-/issues/42",
/// );
/// assert_eq!(plan.branch_name, "fix/42");
/// assert_eq!(plan.commit_template, "fix: <description> #42");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowPlan {
    /// `fix` or `feat`
    pub branch_prefix: &'static str,

    /// The branch to create, `{prefix}/{iid}`
    pub branch_name: String,

    /// The format for commit messages on the branch
    pub commit_template: String,

    /// Link that opens a new merge request for the branch
    pub merge_request_url: String,
}

impl WorkflowPlan {
    /// Derives the workflow for an issue.
    pub fn for_issue(issue: &Issue) -> Self {
        Self::new(issue.issue_kind(), issue.iid, &issue.web_url)
    }

    /// Derives the workflow from the issue type, iid and web location.
    pub fn new(issue_kind: &str, iid: u64, issue_url: &str) -> Self {
        let branch_prefix = branch_prefix(issue_kind);
        let branch_name = format!("{}/{}", branch_prefix, iid);
        let commit_template = format!("{}: <description> #{}", branch_prefix, iid);
        let merge_request_url = format!(
            "{}{}{}",
            project_url(issue_url),
            NEW_MERGE_REQUEST_PATH,
            branch_name
        );

        Self {
            branch_prefix,
            branch_name,
            commit_template,
            merge_request_url,
        }
    }
}

/// Returns the branch prefix for an issue type. Comparison ignores case.
pub fn branch_prefix(issue_kind: &str) -> &'static str {
    if FIX_ISSUE_TYPES
        .iter()
        .any(|t| t.eq_ignore_ascii_case(issue_kind))
    {
        BRANCH_PREFIX_FIX
    } else {
        BRANCH_PREFIX_FEATURE
    }
}

/// Strips the `/-/issues/{n}` suffix from an issue URL.
///
/// URLs that do not end in an issue path are returned unchanged.
pub fn project_url(issue_url: &str) -> &str {
    match ISSUE_PATH_SUFFIX_REGEX.find(issue_url) {
        Some(m) => &issue_url[..m.start()],
        None => issue_url,
    }
}
