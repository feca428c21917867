//! Tests for the provided methods of the `IssueProvider` trait.

use crate::errors::Error;
use crate::models::{Issue, Note};
use crate::test_fixtures::{issue_json, note_json};
use crate::validation::{validate_issue, validate_notes};
use crate::{filter_user_comments, IssueDataOptions, IssueProvider};
use async_trait::async_trait;
use serde_json::json;
use std::sync::Mutex;

/// Mock implementation that records the note requests it receives
#[derive(Debug)]
struct MockIssueProvider {
    issue: Option<Issue>,
    notes: Vec<Note>,
    note_requests: Mutex<Vec<bool>>,
}

impl MockIssueProvider {
    /// Create a new mock provider whose notes include a system note that the
    /// platform filter did not catch
    fn new() -> Self {
        Self {
            issue: Some(validate_issue(&issue_json()).unwrap()),
            notes: validate_notes(&json!([
                note_json(1, false, "first"),
                note_json(2, true, "changed the description"),
                note_json(3, false, "second"),
            ]))
            .unwrap(),
            note_requests: Mutex::new(Vec::new()),
        }
    }

    fn missing_issue() -> Self {
        Self {
            issue: None,
            ..Self::new()
        }
    }

    fn note_requests(&self) -> Vec<bool> {
        self.note_requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl IssueProvider for MockIssueProvider {
    async fn get_issue(&self, _project_id: &str, _issue_iid: u64) -> Result<Issue, Error> {
        self.issue.clone().ok_or(Error::NotFound {
            body: r#"{"message":"404 Not found"}"#.to_string(),
        })
    }

    async fn list_issue_notes(
        &self,
        _project_id: &str,
        _issue_iid: u64,
        only_user_comments: bool,
    ) -> Result<Vec<Note>, Error> {
        self.note_requests.lock().unwrap().push(only_user_comments);
        Ok(self.notes.clone())
    }
}

#[tokio::test]
async fn test_get_issue_data_includes_all_notes_by_default() {
    let provider = MockIssueProvider::new();

    let data = provider
        .get_issue_data("group/project", 42, IssueDataOptions::default())
        .await
        .unwrap();

    assert_eq!(data.issue.iid, 42);
    let ids: Vec<u64> = data.notes.iter().map(|n| n.id).collect();
    assert_eq!(ids, vec![1, 2, 3]);
    assert_eq!(provider.note_requests(), vec![false]);
}

#[tokio::test]
async fn test_get_issue_data_without_comments_skips_notes_request() {
    let provider = MockIssueProvider::new();

    let data = provider
        .get_issue_data(
            "group/project",
            42,
            IssueDataOptions {
                include_comments: false,
                only_user_comments: true,
            },
        )
        .await
        .unwrap();

    assert!(data.notes.is_empty());
    assert!(provider.note_requests().is_empty());
}

#[tokio::test]
async fn test_get_issue_data_filters_system_notes_locally() {
    let provider = MockIssueProvider::new();

    let data = provider
        .get_issue_data(
            "group/project",
            42,
            IssueDataOptions {
                include_comments: true,
                only_user_comments: true,
            },
        )
        .await
        .unwrap();

    // The platform was asked to filter, and the leaked system note was removed anyway
    assert_eq!(provider.note_requests(), vec![true]);
    assert!(data.notes.iter().all(|n| !n.system));
    let ids: Vec<u64> = data.notes.iter().map(|n| n.id).collect();
    assert_eq!(ids, vec![1, 3]);
}

#[tokio::test]
async fn test_get_issue_data_propagates_issue_errors() {
    let provider = MockIssueProvider::missing_issue();

    let result = provider
        .get_issue_data("group/project", 42, IssueDataOptions::default())
        .await;

    assert!(matches!(result, Err(Error::NotFound { .. })));
    assert!(provider.note_requests().is_empty());
}

#[tokio::test]
async fn test_get_issue_data_keeps_notes_for_other_issues() {
    let mut provider = MockIssueProvider::new();
    let mut foreign = note_json(9, false, "moved");
    foreign["noteable_id"] = json!(1);
    provider.notes = validate_notes(&json!([foreign])).unwrap();

    let data = provider
        .get_issue_data("group/project", 42, IssueDataOptions::default())
        .await
        .unwrap();

    assert_eq!(data.notes.len(), 1);
}

#[test]
fn test_filter_user_comments_keeps_order() {
    let notes = validate_notes(&json!([
        note_json(5, true, "s1"),
        note_json(4, false, "u1"),
        note_json(3, true, "s2"),
        note_json(2, false, "u2"),
    ]))
    .unwrap();

    let ids: Vec<u64> = filter_user_comments(notes).iter().map(|n| n.id).collect();
    assert_eq!(ids, vec![4, 2]);
}

#[test]
fn test_default_options() {
    let options = IssueDataOptions::default();
    assert!(options.include_comments);
    assert!(!options.only_user_comments);
}
