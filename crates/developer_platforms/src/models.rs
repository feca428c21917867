//! # Models
//!
//! This module contains the validated domain model for a single issue and its
//! discussion thread.
//!
//! Values in this module are only ever built by the schema validator in
//! [`crate::validation`]; they are serializable so that they can be emitted as
//! raw output, but they deliberately do not implement `Deserialize`. Untyped
//! payloads must go through the validator before they become domain values.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Serialize, Serializer};
use std::fmt;

#[cfg(test)]
#[path = "models_tests.rs"]
mod tests;

/// Presence of an optional field in a source payload.
///
/// GitLab omits some fields entirely depending on the instance version and the
/// licence tier, and sends others as an explicit `null`. Renderers need to tell
/// these cases apart, so optional fields are modelled with three states rather
/// than a plain `Option`.
///
/// # Examples
///
/// ```
/// use issue_prompt_developer_platforms::models::Field;
///
/// let weight: Field<u64> = Field::Present(3);
/// assert_eq!(weight.value(), Some(&3));
///
/// let unknown: Field<u64> = Field::Absent;
/// assert!(unknown.is_absent());
/// assert_eq!(unknown.value(), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Field<T> {
    /// The field was not part of the payload.
    #[default]
    Absent,

    /// The field was part of the payload with an explicit `null` value.
    Null,

    /// The field was part of the payload with a value.
    Present(T),
}

impl<T> Field<T> {
    /// Returns `true` if the field was not part of the payload.
    pub fn is_absent(&self) -> bool {
        matches!(self, Field::Absent)
    }

    /// Returns `true` if the field was part of the payload with a value.
    pub fn is_present(&self) -> bool {
        matches!(self, Field::Present(_))
    }

    /// Returns the value if there is one, collapsing `Absent` and `Null`.
    pub fn value(&self) -> Option<&T> {
        match self {
            Field::Present(v) => Some(v),
            Field::Absent | Field::Null => None,
        }
    }
}

impl<T> From<Option<T>> for Field<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Field::Present(v),
            None => Field::Null,
        }
    }
}

// `Absent` fields are skipped with `skip_serializing_if`, so reaching the
// serializer with `Absent` only happens for fields nested in a sequence.
impl<T: Serialize> Serialize for Field<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Field::Present(v) => v.serialize(serializer),
            Field::Absent | Field::Null => serializer.serialize_none(),
        }
    }
}

/// An RFC 3339 timestamp as sent by the platform.
///
/// The original text is kept so that raw output reproduces the payload
/// verbatim, while the parsed instant is used for display.
#[derive(Debug, Clone)]
pub struct Timestamp {
    raw: String,
    instant: DateTime<Utc>,
}

impl Timestamp {
    /// Parses an RFC 3339 timestamp, e.g. `2024-01-15T10:30:00.000Z`.
    ///
    /// # Examples
    ///
    /// ```
    /// use issue_prompt_developer_platforms::models::Timestamp;
    ///
    /// let ts = Timestamp::parse("2024-01-15T12:30:00.000+02:00").unwrap();
    /// assert_eq!(ts.as_str(), "2024-01-15T12:30:00.000+02:00");
    /// assert_eq!(ts.instant().to_rfc3339(), "2024-01-15T10:30:00+00:00");
    /// ```
    pub fn parse(raw: &str) -> Result<Self, chrono::ParseError> {
        let parsed = DateTime::parse_from_rfc3339(raw)?;
        Ok(Self {
            raw: raw.to_string(),
            instant: parsed.with_timezone(&Utc),
        })
    }

    /// The timestamp exactly as it appeared in the payload.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// The timestamp converted to UTC.
    pub fn instant(&self) -> DateTime<Utc> {
        self.instant
    }
}

impl PartialEq for Timestamp {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl Eq for Timestamp {}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}

/// A calendar date in `YYYY-MM-DD` form, such as an issue due date.
#[derive(Debug, Clone)]
pub struct CalendarDate {
    raw: String,
    date: NaiveDate,
}

impl CalendarDate {
    /// Parses a `YYYY-MM-DD` date.
    pub fn parse(raw: &str) -> Result<Self, chrono::ParseError> {
        let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")?;
        Ok(Self {
            raw: raw.to_string(),
            date,
        })
    }

    /// The date exactly as it appeared in the payload.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// The parsed date.
    pub fn date(&self) -> NaiveDate {
        self.date
    }
}

impl PartialEq for CalendarDate {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl Eq for CalendarDate {}

impl fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl Serialize for CalendarDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}

/// Represents a user account on the platform.
///
/// Users are attached to issues and notes by value; they are snapshots taken at
/// fetch time and are never shared or updated.
///
/// # Examples
///
/// ```
/// use issue_prompt_developer_platforms::models::User;
///
/// let user = User {
///     id: 7,
///     username: "jdoe".to_string(),
///     name: "Jane Doe".to_string(),
///     state: "active".to_string(),
///     avatar_url: None,
///     web_url: "https://gitlab.example.com/jdoe".to_string(),
/// };
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    /// The unique identifier of the user
    pub id: u64,

    /// The login name of the user
    pub username: String,

    /// The display name of the user
    pub name: String,

    /// The account state, e.g. `active` or `blocked`
    pub state: String,

    /// The avatar image location, if the user has one
    pub avatar_url: Option<String>,

    /// The profile page of the user
    pub web_url: String,
}

/// A project or group milestone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Milestone {
    pub id: u64,
    pub iid: u64,
    #[serde(skip_serializing_if = "Field::is_absent")]
    pub project_id: Field<u64>,
    pub title: String,
    pub description: Option<String>,
    pub state: String,
    pub due_date: Option<CalendarDate>,
    #[serde(skip_serializing_if = "Field::is_absent")]
    pub start_date: Field<CalendarDate>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    #[serde(skip_serializing_if = "Field::is_absent")]
    pub web_url: Field<String>,
}

/// Time tracking information for an issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimeStats {
    /// The estimate in seconds
    pub time_estimate: u64,

    /// The time spent in seconds
    pub total_time_spent: u64,

    /// The estimate in a human readable form, e.g. `3h 30m`
    pub human_time_estimate: Option<String>,

    /// The time spent in a human readable form
    pub human_total_time_spent: Option<String>,
}

/// Progress of the task list in an issue description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskCompletionStatus {
    /// The number of tasks in the description
    pub count: u64,

    /// The number of tasks that are checked off
    pub completed_count: u64,
}

/// The different ways an issue can be referenced from markdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssueReferences {
    pub short: String,
    pub relative: String,
    pub full: String,
}

/// API links related to an issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssueLinks {
    #[serde(rename = "self")]
    pub self_link: String,
    pub notes: String,
    pub award_emoji: String,
    pub project: String,
    #[serde(skip_serializing_if = "Field::is_absent")]
    pub closed_as_duplicate_of: Field<String>,
}

/// Represents an issue in a project.
///
/// Field names and their order follow the platform payload so that the raw
/// serialization of an issue reads like the response it was built from.
///
/// The `iid` is the project scoped sequence number that people use to refer
/// to the issue, and `web_url` always ends in `/-/issues/{iid}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    /// The globally unique identifier of the issue
    pub id: u64,

    /// The project scoped sequence number of the issue
    pub iid: u64,

    /// The project the issue belongs to
    pub project_id: u64,

    /// The title of the issue
    pub title: String,

    /// The description of the issue, if any
    pub description: Option<String>,

    /// The lifecycle state, `opened` or `closed`
    pub state: String,

    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub closed_at: Option<Timestamp>,

    /// The user who closed the issue
    #[serde(skip_serializing_if = "Field::is_absent")]
    pub closed_by: Field<User>,

    pub labels: Vec<String>,
    pub milestone: Option<Milestone>,
    pub assignees: Vec<User>,

    /// Single assignee field kept by the platform for older clients
    #[serde(skip_serializing_if = "Field::is_absent")]
    pub assignee: Field<User>,

    pub author: User,

    /// The work item type in upper case, e.g. `ISSUE`
    #[serde(rename = "type", skip_serializing_if = "Field::is_absent")]
    pub kind: Field<String>,

    pub user_notes_count: u64,
    pub merge_requests_count: u64,
    pub upvotes: u64,
    pub downvotes: u64,
    pub due_date: Option<CalendarDate>,
    pub confidential: bool,
    pub discussion_locked: Option<bool>,

    /// The issue type in lower case, e.g. `issue`, `incident` or `bug`
    #[serde(skip_serializing_if = "Field::is_absent")]
    pub issue_type: Field<String>,

    #[serde(skip_serializing_if = "Field::is_absent")]
    pub severity: Field<String>,

    /// The canonical web location of the issue
    pub web_url: String,

    #[serde(skip_serializing_if = "Field::is_absent")]
    pub time_stats: Field<TimeStats>,

    #[serde(skip_serializing_if = "Field::is_absent")]
    pub task_completion_status: Field<TaskCompletionStatus>,

    #[serde(skip_serializing_if = "Field::is_absent")]
    pub weight: Field<u64>,

    #[serde(skip_serializing_if = "Field::is_absent")]
    pub has_tasks: Field<bool>,

    #[serde(skip_serializing_if = "Field::is_absent")]
    pub references: Field<IssueReferences>,

    #[serde(rename = "_links", skip_serializing_if = "Field::is_absent")]
    pub links: Field<IssueLinks>,
}

/// Issue type used when the payload carries neither `issue_type` nor `type`.
pub const DEFAULT_ISSUE_TYPE: &str = "issue";

impl Issue {
    /// Returns the type of the issue.
    ///
    /// `issue_type` is preferred over `type`; empty values are skipped, and if
    /// neither is available the issue is reported as a plain `issue`.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use issue_prompt_developer_platforms::models::Issue;
    /// # fn example(issue: &Issue) {
    /// println!("This is an {}", issue.issue_kind());
    /// # }
    /// ```
    pub fn issue_kind(&self) -> &str {
        non_empty(&self.issue_type)
            .or_else(|| non_empty(&self.kind))
            .unwrap_or(DEFAULT_ISSUE_TYPE)
    }
}

fn non_empty(field: &Field<String>) -> Option<&str> {
    field.value().map(String::as_str).filter(|v| !v.is_empty())
}

/// A single entry in the discussion thread of an issue.
///
/// Notes are either written by people or generated by the platform to record
/// activity (label changes, assignments and so on). The latter have `system`
/// set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Note {
    pub id: u64,
    pub body: String,
    pub author: User,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,

    /// Whether the note was generated by the platform
    pub system: bool,

    /// The identifier of the issue the note belongs to
    pub noteable_id: u64,
    pub noteable_type: String,

    #[serde(skip_serializing_if = "Field::is_absent")]
    pub project_id: Field<u64>,

    /// The sequence number of the issue the note belongs to
    #[serde(skip_serializing_if = "Field::is_absent")]
    pub noteable_iid: Field<u64>,

    pub resolvable: bool,

    #[serde(skip_serializing_if = "Field::is_absent")]
    pub confidential: Field<bool>,

    #[serde(skip_serializing_if = "Field::is_absent")]
    pub internal: Field<bool>,

    #[serde(skip_serializing_if = "Field::is_absent")]
    pub imported: Field<bool>,

    #[serde(skip_serializing_if = "Field::is_absent")]
    pub imported_from: Field<String>,
}

impl Note {
    /// Returns `true` if the note was written by a person.
    pub fn is_user_comment(&self) -> bool {
        !self.system
    }

    /// Returns `true` if the note is only visible to project members.
    pub fn is_internal(&self) -> bool {
        self.confidential.value().copied().unwrap_or(false)
            || self.internal.value().copied().unwrap_or(false)
    }

    /// Returns `true` if the back-reference of the note points at `issue`.
    pub fn belongs_to(&self, issue: &Issue) -> bool {
        let iid_matches = match self.noteable_iid.value() {
            Some(iid) => *iid == issue.iid,
            None => true,
        };

        self.noteable_id == issue.id && iid_matches
    }
}

/// An issue together with its discussion thread.
///
/// Notes are kept in ascending creation order, exactly as the platform
/// returned them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssueData {
    /// The issue
    pub issue: Issue,

    /// The notes on the issue, oldest first
    pub notes: Vec<Note>,
}

impl IssueData {
    /// The number of notes that were written by people.
    pub fn user_comment_count(&self) -> usize {
        self.notes.iter().filter(|n| n.is_user_comment()).count()
    }
}
