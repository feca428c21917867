//! Configuration settings for the issue prompt core functionality.
//!
//! This module centralizes the fixed text and patterns used by the formatters,
//! together with the options a caller can change.
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;

/// Branch prefix for issues that describe a defect
pub const BRANCH_PREFIX_FIX: &str = "fix";

/// Branch prefix for every other kind of issue
pub const BRANCH_PREFIX_FEATURE: &str = "feat";

/// Issue types that are worked on as fixes
pub const FIX_ISSUE_TYPES: [&str; 2] = ["bug", "incident"];

/// Text shown when an issue has no description
pub const NO_DESCRIPTION_PLACEHOLDER: &str = "_No description provided._";

/// Text shown when an issue has no notes
pub const NO_COMMENTS_PLACEHOLDER: &str = "_No comments._";

/// Text shown for empty assignee and label lists
pub const NONE_PLACEHOLDER: &str = "None";

/// Query string that pre-fills the source branch of a new merge request
pub const NEW_MERGE_REQUEST_PATH: &str = "/-/merge_requests/new?merge_request%5Bsource_branch%5D=";

/// Display format for timestamps, always in UTC
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

lazy_static! {
    /// Matches the issue part at the end of an issue web URL
    pub static ref ISSUE_PATH_SUFFIX_REGEX: Regex = Regex::new(r"/-/issues/\d+/?$")
        .expect("Failed to compile issue path suffix regex");
}

/// Options for the markdown issue prompt.
///
/// # Examples
///
/// ```
/// use issue_prompt_core::config::PromptOptions;
///
/// let options = PromptOptions {
///     preamble: Some("ultrathink".to_string()),
///     projects_root: Some("~/projects/".to_string()),
/// };
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptOptions {
    /// A line placed before the title, e.g. an instruction for the agent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preamble: Option<String>,

    /// The directory that holds local checkouts of the projects
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub projects_root: Option<String>,
}
