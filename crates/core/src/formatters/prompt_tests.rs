use super::*;
use crate::test_fixtures::{
    build, issue_data_with_notes, minimal_issue_data, minimal_issue_json, note_json,
};
use indoc::indoc;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

fn options() -> PromptOptions {
    PromptOptions {
        preamble: Some("ultrathink".to_string()),
        projects_root: Some("~/projects/".to_string()),
    }
}

fn metadata_lines(prompt: &str) -> Vec<&str> {
    prompt
        .lines()
        .skip_while(|l| *l != "## Metadata")
        .skip(2)
        .take_while(|l| !l.is_empty())
        .collect()
}

#[test]
fn test_format_issue_prompt_full_document() {
    let data = issue_data_with_notes(vec![
        note_json(1, false, "first"),
        note_json(2, true, "changed the description"),
    ]);

    let prompt = format_issue_prompt(&data, &options());

    let expected = indoc! {"
        ultrathink

        # GitLab Issue #42

        ## Metadata

        - **Title:** Login fails with SSO
        - **State:** closed
        - **Type:** bug
        - **Author:** @jdoe (User jdoe)
        - **Assignees:** @alice, @bob
        - **Labels:** `bug`, `sso`
        - **Milestone:** v1.2
        - **Due Date:** 2024-01-31
        - **Created:** 2024-01-15 10:30:00
        - **Updated:** 2024-01-16 08:00:00
        - **Closed:** 2024-01-17 12:00:00
        - **Closed By:** @closer (User closer)
        - **Confidential:** Yes
        - **Weight:** 3
        - **Time Estimate:** 3h 30m
        - **Time Spent:** 1h
        - **Tasks:** 1/4 completed

        ## Description

        Steps to reproduce:

        1. Log in

        ## Comments (2 total, 1 user comments)

        ### Comment 1 - @jdoe (2024-01-15 11:00:00)

        first

        ### Comment 2 [System] - @jdoe (2024-01-15 11:00:00)

        changed the description

        ---
        **Issue URL:** https://gitlab.example.com/group/project/-/issues/42

        ## Workflow Instructions

        1. **Pull latest changes** before starting work:
           ```bash
           git fetch origin
           git checkout develop || git checkout main || git checkout master
           git pull
           ```

        2. **Create branch:** `fix/42`
           ```bash
           git checkout -b fix/42
           ```

        3. **Commit format:** `fix: <description> #42`

        4. **Push and create MR:**
           ```bash
           git push -u origin fix/42
           ```

        5. **Open MR:** [Create Merge Request](https://gitlab.example.com/group/project/-/merge_requests/new?merge_request%5Bsource_branch%5D=fix/42)

        ## Available Tools & Context

        - **glab CLI:** You can leverage `glab` commands to:
          - Create merge requests: `glab mr create`
          - Look up repositories: `glab repo list`, `glab repo view`
          - Manage issues: `glab issue view`, `glab issue update`

        - **Project Location:** All projects are located in `~/projects/`
        - **Multi-Project Context:** The issue may involve multiple repositories in the `~/projects/` folder
    "};

    assert_eq!(prompt, expected);
}

#[test]
fn test_format_issue_prompt_minimal_issue() {
    let prompt = format_issue_prompt(&minimal_issue_data(), &PromptOptions::default());

    assert!(prompt.starts_with("# GitLab Issue #7\n\n## Metadata\n\n"));
    assert_eq!(
        metadata_lines(&prompt),
        vec![
            "- **Title:** Add dark mode",
            "- **State:** opened",
            "- **Type:** issue",
            "- **Author:** @jdoe (User jdoe)",
            "- **Assignees:** None",
            "- **Labels:** None",
            "- **Created:** 2024-03-01 09:15:30",
            "- **Updated:** 2024-03-02 09:15:30",
        ]
    );
    assert!(prompt.contains("## Description\n\n_No description provided._\n"));
    assert!(prompt.contains("## Comments\n\n_No comments._\n"));
    assert!(!prompt.contains("total,"));
    assert!(prompt.contains("**Create branch:** `feat/7`"));
    assert!(prompt.contains("**Commit format:** `feat: <description> #7`"));
    assert!(!prompt.contains("Project Location"));
    assert!(prompt.ends_with("`glab issue view`, `glab issue update`\n"));
}

#[test]
fn test_format_issue_prompt_ignores_empty_preamble() {
    let options = PromptOptions {
        preamble: Some(String::new()),
        projects_root: None,
    };

    let prompt = format_issue_prompt(&minimal_issue_data(), &options);

    assert!(prompt.starts_with("# GitLab Issue #7"));
}

#[test]
fn test_format_issue_prompt_falls_back_to_type_field() {
    let mut issue = minimal_issue_json();
    issue["type"] = json!("INCIDENT");

    let prompt = format_issue_prompt(&build(issue, vec![]), &PromptOptions::default());

    assert!(metadata_lines(&prompt).contains(&"- **Type:** INCIDENT"));
    assert!(prompt.contains("git checkout -b fix/7"));
}

#[test]
fn test_format_issue_prompt_skips_empty_issue_type() {
    let mut issue = minimal_issue_json();
    issue["issue_type"] = json!("");
    issue["type"] = json!("INCIDENT");

    let prompt = format_issue_prompt(&build(issue, vec![]), &PromptOptions::default());

    assert!(metadata_lines(&prompt).contains(&"- **Type:** INCIDENT"));
    assert!(prompt.contains("git checkout -b fix/7"));
}

#[test]
fn test_format_issue_prompt_converts_timestamps_to_utc() {
    let mut issue = minimal_issue_json();
    issue["created_at"] = json!("2024-03-01T09:15:30.123+02:00");

    let prompt = format_issue_prompt(&build(issue, vec![]), &PromptOptions::default());

    assert!(metadata_lines(&prompt).contains(&"- **Created:** 2024-03-01 07:15:30"));
}

#[test]
fn test_format_issue_prompt_closed_without_closer() {
    let mut issue = minimal_issue_json();
    issue["state"] = json!("closed");
    issue["closed_at"] = json!("2024-03-03T10:00:00Z");
    issue["closed_by"] = Value::Null;

    let prompt = format_issue_prompt(&build(issue, vec![]), &PromptOptions::default());
    let lines = metadata_lines(&prompt);

    assert!(lines.contains(&"- **Closed:** 2024-03-03 10:00:00"));
    assert!(!lines.iter().any(|l| l.starts_with("- **Closed By:**")));
}

#[test]
fn test_format_issue_prompt_skips_empty_optional_values() {
    let mut issue = minimal_issue_json();
    issue["weight"] = Value::Null;
    issue["time_stats"] = json!({
        "time_estimate": 0,
        "total_time_spent": 0,
        "human_time_estimate": null,
        "human_total_time_spent": null
    });
    issue["task_completion_status"] = json!({ "count": 0, "completed_count": 0 });
    issue["description"] = json!("");

    let prompt = format_issue_prompt(&build(issue, vec![]), &PromptOptions::default());
    let lines = metadata_lines(&prompt);

    assert_eq!(lines.len(), 8);
    assert!(prompt.contains("_No description provided._"));
}

#[test]
fn test_format_issue_prompt_marks_internal_notes() {
    let mut internal = note_json(3, false, "internal only");
    internal["internal"] = json!(true);
    let mut confidential = note_json(4, true, "hidden change");
    confidential["confidential"] = json!(true);
    confidential["created_at"] = json!("2024-01-20T23:59:59.999Z");

    let data = issue_data_with_notes(vec![internal, confidential]);
    let prompt = format_issue_prompt(&data, &PromptOptions::default());

    assert!(prompt.contains("## Comments (2 total, 1 user comments)\n\n"));
    assert!(prompt.contains("### Comment 1 [Internal] - @jdoe (2024-01-15 11:00:00)\n\ninternal only"));
    assert!(prompt.contains(
        "### Comment 2 [System] [Internal] - @jdoe (2024-01-20 23:59:59)\n\nhidden change"
    ));
}

#[test]
fn test_format_issue_prompt_keeps_note_bodies_verbatim() {
    let body = "```rust\nfn main() {}\n```\n\n> quoted {braces}";
    let data = issue_data_with_notes(vec![note_json(1, false, body)]);

    let prompt = format_issue_prompt(&data, &PromptOptions::default());

    assert!(prompt.contains(body));
}
