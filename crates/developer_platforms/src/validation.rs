//! # Validation
//!
//! Declarative shape checks that narrow untyped JSON payloads into the domain
//! model.
//!
//! Every payload that crosses the API boundary goes through [`validate`]
//! before it is used. Validation does not stop at the first problem: it walks
//! the whole document and reports every field that is missing, has the wrong
//! type or has an invalid format, so that a single failed request tells the
//! whole story.
//!
//! Unknown fields are ignored. Optional fields may be missing or `null`; the
//! difference is kept in [`Field`].

use serde_json::{Map, Value};
use std::fmt;

use crate::models::{
    CalendarDate, Field, Issue, IssueData, IssueLinks, IssueReferences, Milestone, Note,
    TaskCompletionStatus, TimeStats, Timestamp, User,
};

#[cfg(test)]
#[path = "validation_tests.rs"]
mod tests;

/// The reason a single field failed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViolationKind {
    /// A required field was not part of the payload.
    Missing,

    /// A required, non-nullable field was `null`.
    UnexpectedNull,

    /// The field had a different JSON type than expected.
    WrongType {
        expected: &'static str,
        found: &'static str,
    },

    /// The field had the right JSON type but its content could not be parsed.
    InvalidFormat {
        expected: &'static str,
        value: String,
    },
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViolationKind::Missing => write!(f, "required field is missing"),
            ViolationKind::UnexpectedNull => write!(f, "field must not be null"),
            ViolationKind::WrongType { expected, found } => {
                write!(f, "expected {}, found {}", expected, found)
            }
            ViolationKind::InvalidFormat { expected, value } => {
                write!(f, "expected {}, found '{}'", expected, value)
            }
        }
    }
}

/// A single field that failed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldViolation {
    /// The location of the field, e.g. `issue.author.username` or `notes[2].body`
    pub path: String,

    /// What was wrong with the field
    pub kind: ViolationKind,
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.kind)
    }
}

/// A payload did not match the expected shape.
///
/// Lists every violation that was found, in document order.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Response did not match the expected {entity} schema: {}", join_violations(.violations))]
pub struct SchemaValidationError {
    /// The entity that was being validated
    pub entity: String,

    /// Every field that failed validation
    pub violations: Vec<FieldViolation>,
}

impl SchemaValidationError {
    /// Returns the paths of all fields that failed validation.
    pub fn paths(&self) -> Vec<&str> {
        self.violations.iter().map(|v| v.path.as_str()).collect()
    }
}

fn join_violations(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// A type that can be narrowed from an untyped JSON value.
///
/// Implementations record a [`FieldViolation`] for every problem they find and
/// return `None` if the value could not be narrowed. Returning `None` without
/// recording a violation is a bug.
pub trait Schema: Sized {
    /// Narrows `value`, found at `path`, into `Self`.
    fn narrow(value: &Value, path: &str, violations: &mut Vec<FieldViolation>) -> Option<Self>;
}

/// Validates `value` as a `T`, using `root` as the prefix for violation paths.
///
/// # Examples
///
/// ```
/// use issue_prompt_developer_platforms::models::User;
/// use issue_prompt_developer_platforms::validation::validate;
/// use serde_json::json;
///
/// let payload = json!({
///     "id": 1,
///     "username": "jdoe",
///     "name": "Jane Doe",
///     "state": "active",
///     "avatar_url": null,
///     "web_url": "https://gitlab.example.com/jdoe"
/// });
/// let user: User = validate(&payload, "user").unwrap();
/// assert_eq!(user.username, "jdoe");
///
/// let err = validate::<User>(&json!({ "id": "one" }), "user").unwrap_err();
/// assert!(err.paths().contains(&"user.id"));
/// assert!(err.paths().contains(&"user.username"));
/// ```
pub fn validate<T: Schema>(value: &Value, root: &str) -> Result<T, SchemaValidationError> {
    let mut violations = Vec::new();
    match T::narrow(value, root, &mut violations) {
        Some(result) if violations.is_empty() => Ok(result),
        _ => Err(SchemaValidationError {
            entity: if root.is_empty() {
                "payload".to_string()
            } else {
                root.to_string()
            },
            violations,
        }),
    }
}

/// Validates a single issue payload.
pub fn validate_issue(value: &Value) -> Result<Issue, SchemaValidationError> {
    validate(value, "issue")
}

/// Validates a page of notes.
pub fn validate_notes(value: &Value) -> Result<Vec<Note>, SchemaValidationError> {
    validate(value, "notes")
}

/// Validates a complete issue with its notes, as produced by the raw formatter.
pub fn validate_issue_data(value: &Value) -> Result<IssueData, SchemaValidationError> {
    validate(value, "")
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn child_path(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", parent, key)
    }
}

fn wrong_type(
    value: &Value,
    path: &str,
    expected: &'static str,
    violations: &mut Vec<FieldViolation>,
) {
    violations.push(FieldViolation {
        path: path.to_string(),
        kind: ViolationKind::WrongType {
            expected,
            found: json_kind(value),
        },
    });
}

impl Schema for u64 {
    fn narrow(value: &Value, path: &str, violations: &mut Vec<FieldViolation>) -> Option<Self> {
        let result = value.as_u64();
        if result.is_none() {
            wrong_type(value, path, "unsigned integer", violations);
        }
        result
    }
}

impl Schema for bool {
    fn narrow(value: &Value, path: &str, violations: &mut Vec<FieldViolation>) -> Option<Self> {
        let result = value.as_bool();
        if result.is_none() {
            wrong_type(value, path, "boolean", violations);
        }
        result
    }
}

impl Schema for String {
    fn narrow(value: &Value, path: &str, violations: &mut Vec<FieldViolation>) -> Option<Self> {
        match value.as_str() {
            Some(s) => Some(s.to_string()),
            None => {
                wrong_type(value, path, "string", violations);
                None
            }
        }
    }
}

impl Schema for Timestamp {
    fn narrow(value: &Value, path: &str, violations: &mut Vec<FieldViolation>) -> Option<Self> {
        let raw = String::narrow(value, path, violations)?;
        match Timestamp::parse(&raw) {
            Ok(ts) => Some(ts),
            Err(_) => {
                violations.push(FieldViolation {
                    path: path.to_string(),
                    kind: ViolationKind::InvalidFormat {
                        expected: "RFC 3339 timestamp",
                        value: raw,
                    },
                });
                None
            }
        }
    }
}

impl Schema for CalendarDate {
    fn narrow(value: &Value, path: &str, violations: &mut Vec<FieldViolation>) -> Option<Self> {
        let raw = String::narrow(value, path, violations)?;
        match CalendarDate::parse(&raw) {
            Ok(date) => Some(date),
            Err(_) => {
                violations.push(FieldViolation {
                    path: path.to_string(),
                    kind: ViolationKind::InvalidFormat {
                        expected: "date in YYYY-MM-DD format",
                        value: raw,
                    },
                });
                None
            }
        }
    }
}

impl<T: Schema> Schema for Vec<T> {
    fn narrow(value: &Value, path: &str, violations: &mut Vec<FieldViolation>) -> Option<Self> {
        let Some(items) = value.as_array() else {
            wrong_type(value, path, "array", violations);
            return None;
        };

        // Every element is visited so that all violations are collected.
        let narrowed: Vec<Option<T>> = items
            .iter()
            .enumerate()
            .map(|(i, item)| T::narrow(item, &format!("{}[{}]", path, i), violations))
            .collect();

        narrowed.into_iter().collect()
    }
}

/// Reads the fields of a JSON object, recording violations as it goes.
struct ObjectReader<'a> {
    object: &'a Map<String, Value>,
    path: &'a str,
    violations: &'a mut Vec<FieldViolation>,
}

impl<'a> ObjectReader<'a> {
    fn open(
        value: &'a Value,
        path: &'a str,
        violations: &'a mut Vec<FieldViolation>,
    ) -> Option<Self> {
        match value.as_object() {
            Some(object) => Some(Self {
                object,
                path,
                violations,
            }),
            None => {
                wrong_type(value, path, "object", violations);
                None
            }
        }
    }

    /// A field that must be present and not null.
    fn required<T: Schema>(&mut self, key: &str) -> Option<T> {
        let path = child_path(self.path, key);
        match self.object.get(key) {
            None => {
                self.violations.push(FieldViolation {
                    path,
                    kind: ViolationKind::Missing,
                });
                None
            }
            Some(Value::Null) => {
                self.violations.push(FieldViolation {
                    path,
                    kind: ViolationKind::UnexpectedNull,
                });
                None
            }
            Some(value) => T::narrow(value, &path, self.violations),
        }
    }

    /// A field that must be present but may be null.
    fn nullable<T: Schema>(&mut self, key: &str) -> Option<Option<T>> {
        let path = child_path(self.path, key);
        match self.object.get(key) {
            None => {
                self.violations.push(FieldViolation {
                    path,
                    kind: ViolationKind::Missing,
                });
                None
            }
            Some(Value::Null) => Some(None),
            Some(value) => T::narrow(value, &path, self.violations).map(Some),
        }
    }

    /// A field that may be missing or null.
    fn optional<T: Schema>(&mut self, key: &str) -> Option<Field<T>> {
        let path = child_path(self.path, key);
        match self.object.get(key) {
            None => Some(Field::Absent),
            Some(Value::Null) => Some(Field::Null),
            Some(value) => T::narrow(value, &path, self.violations).map(Field::Present),
        }
    }
}

impl Schema for User {
    fn narrow(value: &Value, path: &str, violations: &mut Vec<FieldViolation>) -> Option<Self> {
        let mut reader = ObjectReader::open(value, path, violations)?;
        let id = reader.required("id");
        let username = reader.required("username");
        let name = reader.required("name");
        let state = reader.required("state");
        let avatar_url = reader.nullable("avatar_url");
        let web_url = reader.required("web_url");

        Some(User {
            id: id?,
            username: username?,
            name: name?,
            state: state?,
            avatar_url: avatar_url?,
            web_url: web_url?,
        })
    }
}

impl Schema for Milestone {
    fn narrow(value: &Value, path: &str, violations: &mut Vec<FieldViolation>) -> Option<Self> {
        let mut reader = ObjectReader::open(value, path, violations)?;
        let id = reader.required("id");
        let iid = reader.required("iid");
        let project_id = reader.optional("project_id");
        let title = reader.required("title");
        let description = reader.nullable("description");
        let state = reader.required("state");
        let due_date = reader.nullable("due_date");
        let start_date = reader.optional("start_date");
        let created_at = reader.required("created_at");
        let updated_at = reader.required("updated_at");
        let web_url = reader.optional("web_url");

        Some(Milestone {
            id: id?,
            iid: iid?,
            project_id: project_id?,
            title: title?,
            description: description?,
            state: state?,
            due_date: due_date?,
            start_date: start_date?,
            created_at: created_at?,
            updated_at: updated_at?,
            web_url: web_url?,
        })
    }
}

impl Schema for TimeStats {
    fn narrow(value: &Value, path: &str, violations: &mut Vec<FieldViolation>) -> Option<Self> {
        let mut reader = ObjectReader::open(value, path, violations)?;
        let time_estimate = reader.required("time_estimate");
        let total_time_spent = reader.required("total_time_spent");
        let human_time_estimate = reader.nullable("human_time_estimate");
        let human_total_time_spent = reader.nullable("human_total_time_spent");

        Some(TimeStats {
            time_estimate: time_estimate?,
            total_time_spent: total_time_spent?,
            human_time_estimate: human_time_estimate?,
            human_total_time_spent: human_total_time_spent?,
        })
    }
}

impl Schema for TaskCompletionStatus {
    fn narrow(value: &Value, path: &str, violations: &mut Vec<FieldViolation>) -> Option<Self> {
        let mut reader = ObjectReader::open(value, path, violations)?;
        let count = reader.required("count");
        let completed_count = reader.required("completed_count");

        Some(TaskCompletionStatus {
            count: count?,
            completed_count: completed_count?,
        })
    }
}

impl Schema for IssueReferences {
    fn narrow(value: &Value, path: &str, violations: &mut Vec<FieldViolation>) -> Option<Self> {
        let mut reader = ObjectReader::open(value, path, violations)?;
        let short = reader.required("short");
        let relative = reader.required("relative");
        let full = reader.required("full");

        Some(IssueReferences {
            short: short?,
            relative: relative?,
            full: full?,
        })
    }
}

impl Schema for IssueLinks {
    fn narrow(value: &Value, path: &str, violations: &mut Vec<FieldViolation>) -> Option<Self> {
        let mut reader = ObjectReader::open(value, path, violations)?;
        let self_link = reader.required("self");
        let notes = reader.required("notes");
        let award_emoji = reader.required("award_emoji");
        let project = reader.required("project");
        let closed_as_duplicate_of = reader.optional("closed_as_duplicate_of");

        Some(IssueLinks {
            self_link: self_link?,
            notes: notes?,
            award_emoji: award_emoji?,
            project: project?,
            closed_as_duplicate_of: closed_as_duplicate_of?,
        })
    }
}

impl Schema for Issue {
    fn narrow(value: &Value, path: &str, violations: &mut Vec<FieldViolation>) -> Option<Self> {
        let mut reader = ObjectReader::open(value, path, violations)?;
        let id = reader.required("id");
        let iid = reader.required("iid");
        let project_id = reader.required("project_id");
        let title = reader.required("title");
        let description = reader.nullable("description");
        let state = reader.required("state");
        let created_at = reader.required("created_at");
        let updated_at = reader.required("updated_at");
        let closed_at = reader.nullable("closed_at");
        let closed_by = reader.optional("closed_by");
        let labels = reader.required("labels");
        let milestone = reader.nullable("milestone");
        let assignees = reader.required("assignees");
        let assignee = reader.optional("assignee");
        let author = reader.required("author");
        let kind = reader.optional("type");
        let user_notes_count = reader.required("user_notes_count");
        let merge_requests_count = reader.required("merge_requests_count");
        let upvotes = reader.required("upvotes");
        let downvotes = reader.required("downvotes");
        let due_date = reader.nullable("due_date");
        let confidential = reader.required("confidential");
        let discussion_locked = reader.nullable("discussion_locked");
        let issue_type = reader.optional("issue_type");
        let severity = reader.optional("severity");
        let web_url = reader.required("web_url");
        let time_stats = reader.optional("time_stats");
        let task_completion_status = reader.optional("task_completion_status");
        let weight = reader.optional("weight");
        let has_tasks = reader.optional("has_tasks");
        let references = reader.optional("references");
        let links = reader.optional("_links");

        Some(Issue {
            id: id?,
            iid: iid?,
            project_id: project_id?,
            title: title?,
            description: description?,
            state: state?,
            created_at: created_at?,
            updated_at: updated_at?,
            closed_at: closed_at?,
            closed_by: closed_by?,
            labels: labels?,
            milestone: milestone?,
            assignees: assignees?,
            assignee: assignee?,
            author: author?,
            kind: kind?,
            user_notes_count: user_notes_count?,
            merge_requests_count: merge_requests_count?,
            upvotes: upvotes?,
            downvotes: downvotes?,
            due_date: due_date?,
            confidential: confidential?,
            discussion_locked: discussion_locked?,
            issue_type: issue_type?,
            severity: severity?,
            web_url: web_url?,
            time_stats: time_stats?,
            task_completion_status: task_completion_status?,
            weight: weight?,
            has_tasks: has_tasks?,
            references: references?,
            links: links?,
        })
    }
}

impl Schema for Note {
    fn narrow(value: &Value, path: &str, violations: &mut Vec<FieldViolation>) -> Option<Self> {
        let mut reader = ObjectReader::open(value, path, violations)?;
        let id = reader.required("id");
        let body = reader.required("body");
        let author = reader.required("author");
        let created_at = reader.required("created_at");
        let updated_at = reader.required("updated_at");
        let system = reader.required("system");
        let noteable_id = reader.required("noteable_id");
        let noteable_type = reader.required("noteable_type");
        let project_id = reader.optional("project_id");
        let noteable_iid = reader.optional("noteable_iid");
        let resolvable = reader.required("resolvable");
        let confidential = reader.optional("confidential");
        let internal = reader.optional("internal");
        let imported = reader.optional("imported");
        let imported_from = reader.optional("imported_from");

        Some(Note {
            id: id?,
            body: body?,
            author: author?,
            created_at: created_at?,
            updated_at: updated_at?,
            system: system?,
            noteable_id: noteable_id?,
            noteable_type: noteable_type?,
            project_id: project_id?,
            noteable_iid: noteable_iid?,
            resolvable: resolvable?,
            confidential: confidential?,
            internal: internal?,
            imported: imported?,
            imported_from: imported_from?,
        })
    }
}

impl Schema for IssueData {
    fn narrow(value: &Value, path: &str, violations: &mut Vec<FieldViolation>) -> Option<Self> {
        let mut reader = ObjectReader::open(value, path, violations)?;
        let issue = reader.required("issue");
        let notes = reader.required("notes");

        Some(IssueData {
            issue: issue?,
            notes: notes?,
        })
    }
}
