//! JSON payloads shaped like GitLab API responses, shared by the unit tests.

use serde_json::{json, Value};

pub fn user_json(id: u64, username: &str) -> Value {
    json!({
        "id": id,
        "username": username,
        "name": format!("User {}", username),
        "state": "active",
        "avatar_url": null,
        "web_url": format!("https://gitlab.example.com/{}", username)
    })
}

/// An issue with every optional field present.
pub fn issue_json() -> Value {
    json!({
        "id": 1042,
        "iid": 42,
        "project_id": 7,
        "title": "Login fails with SSO",
        "description": "Steps to reproduce:\n\n1. Log in",
        "state": "closed",
        "created_at": "2024-01-15T10:30:00.000Z",
        "updated_at": "2024-01-16T08:00:00.000Z",
        "closed_at": "2024-01-17T12:00:00.000Z",
        "closed_by": user_json(3, "closer"),
        "labels": ["bug", "sso"],
        "milestone": {
            "id": 11,
            "iid": 2,
            "project_id": 7,
            "title": "v1.2",
            "description": null,
            "state": "active",
            "due_date": "2024-02-01",
            "start_date": null,
            "created_at": "2024-01-01T00:00:00.000Z",
            "updated_at": "2024-01-02T00:00:00.000Z",
            "web_url": "https://gitlab.example.com/group/project/-/milestones/2"
        },
        "assignees": [user_json(4, "alice"), user_json(5, "bob")],
        "assignee": user_json(4, "alice"),
        "author": user_json(1, "jdoe"),
        "type": "ISSUE",
        "user_notes_count": 2,
        "merge_requests_count": 0,
        "upvotes": 1,
        "downvotes": 0,
        "due_date": "2024-01-31",
        "confidential": true,
        "discussion_locked": null,
        "issue_type": "bug",
        "severity": "UNKNOWN",
        "web_url": "https://gitlab.example.com/group/project/-/issues/42",
        "time_stats": {
            "time_estimate": 12600,
            "total_time_spent": 3600,
            "human_time_estimate": "3h 30m",
            "human_total_time_spent": "1h"
        },
        "task_completion_status": { "count": 4, "completed_count": 1 },
        "weight": 3,
        "has_tasks": true,
        "references": {
            "short": "#42",
            "relative": "#42",
            "full": "group/project#42"
        },
        "_links": {
            "self": "https://gitlab.example.com/api/v4/projects/7/issues/42",
            "notes": "https://gitlab.example.com/api/v4/projects/7/issues/42/notes",
            "award_emoji": "https://gitlab.example.com/api/v4/projects/7/issues/42/award_emoji",
            "project": "https://gitlab.example.com/api/v4/projects/7",
            "closed_as_duplicate_of": null
        },
        "extra_field_from_newer_gitlab": { "ignored": true }
    })
}

/// An open issue that carries only the fields GitLab always sends.
pub fn minimal_issue_json() -> Value {
    json!({
        "id": 1007,
        "iid": 7,
        "project_id": 7,
        "title": "Add dark mode",
        "description": null,
        "state": "opened",
        "created_at": "2024-03-01T09:15:30Z",
        "updated_at": "2024-03-02T09:15:30Z",
        "closed_at": null,
        "labels": [],
        "milestone": null,
        "assignees": [],
        "author": user_json(1, "jdoe"),
        "user_notes_count": 0,
        "merge_requests_count": 0,
        "upvotes": 0,
        "downvotes": 0,
        "due_date": null,
        "confidential": false,
        "discussion_locked": null,
        "web_url": "https://gitlab.example.com/group/project/-/issues/7"
    })
}

pub fn note_json(id: u64, system: bool, body: &str) -> Value {
    json!({
        "id": id,
        "body": body,
        "author": user_json(1, "jdoe"),
        "created_at": "2024-01-15T11:00:00.000Z",
        "updated_at": "2024-01-15T11:00:00.000Z",
        "system": system,
        "noteable_id": 1042,
        "noteable_type": "Issue",
        "project_id": 7,
        "noteable_iid": 42,
        "resolvable": false,
        "confidential": false,
        "internal": false
    })
}
