//! Renders issue data as a markdown document for an AI coding agent.

use indoc::formatdoc;
use issue_prompt_developer_platforms::models::{Issue, IssueData, Note, Timestamp, User};

use crate::config::{
    PromptOptions, NONE_PLACEHOLDER, NO_COMMENTS_PLACEHOLDER, NO_DESCRIPTION_PLACEHOLDER,
    TIMESTAMP_FORMAT,
};
use crate::workflow::WorkflowPlan;

#[cfg(test)]
#[path = "prompt_tests.rs"]
mod tests;

/// Renders the issue, its notes and the workflow instructions as markdown.
///
/// The sections always appear in the same order: the optional preamble, the
/// title, metadata, description, comments, the issue link, the workflow
/// instructions and the available tools. Optional fields that are missing or
/// null simply leave out their metadata line.
///
/// # Examples
///
/// ```no_run
/// # use issue_prompt_developer_platforms::models::IssueData;
/// use issue_prompt_core::config::PromptOptions;
/// use issue_prompt_core::formatters::prompt::format_issue_prompt;
///
/// # fn example(data: &IssueData) {
/// let prompt = format_issue_prompt(data, &PromptOptions::default());
/// assert!(prompt.starts_with("# GitLab Issue #"));
/// # }
/// ```
pub fn format_issue_prompt(data: &IssueData, options: &PromptOptions) -> String {
    let issue = &data.issue;

    let preamble = match options.preamble.as_deref() {
        Some(p) if !p.is_empty() => format!("{}\n\n", p),
        _ => String::new(),
    };

    formatdoc!(
        "
        {preamble}# GitLab Issue #{iid}

        {metadata}

        {description}

        {comments}

        ---
        **Issue URL:** {url}

        {workflow}
        ",
        preamble = preamble,
        iid = issue.iid,
        metadata = format_metadata(issue),
        description = format_description(issue),
        comments = format_comments(&data.notes),
        url = issue.web_url,
        workflow = format_workflow_instructions(issue, options),
    )
}

fn format_timestamp(timestamp: &Timestamp) -> String {
    timestamp.instant().format(TIMESTAMP_FORMAT).to_string()
}

fn format_user(user: &User) -> String {
    format!("@{} ({})", user.username, user.name)
}

fn format_assignees(assignees: &[User]) -> String {
    if assignees.is_empty() {
        return NONE_PLACEHOLDER.to_string();
    }

    assignees
        .iter()
        .map(|a| format!("@{}", a.username))
        .collect::<Vec<_>>()
        .join(", ")
}

fn format_labels(labels: &[String]) -> String {
    if labels.is_empty() {
        return NONE_PLACEHOLDER.to_string();
    }

    labels
        .iter()
        .map(|l| format!("`{}`", l))
        .collect::<Vec<_>>()
        .join(", ")
}

fn format_metadata(issue: &Issue) -> String {
    let mut lines = vec![
        format!("- **Title:** {}", issue.title),
        format!("- **State:** {}", issue.state),
        format!("- **Type:** {}", issue.issue_kind()),
        format!("- **Author:** {}", format_user(&issue.author)),
        format!("- **Assignees:** {}", format_assignees(&issue.assignees)),
        format!("- **Labels:** {}", format_labels(&issue.labels)),
    ];

    if let Some(milestone) = &issue.milestone {
        lines.push(format!("- **Milestone:** {}", milestone.title));
    }

    if let Some(due_date) = &issue.due_date {
        lines.push(format!("- **Due Date:** {}", due_date));
    }

    lines.push(format!("- **Created:** {}", format_timestamp(&issue.created_at)));
    lines.push(format!("- **Updated:** {}", format_timestamp(&issue.updated_at)));

    if let Some(closed_at) = &issue.closed_at {
        lines.push(format!("- **Closed:** {}", format_timestamp(closed_at)));
        if let Some(closed_by) = issue.closed_by.value() {
            lines.push(format!("- **Closed By:** {}", format_user(closed_by)));
        }
    }

    if issue.confidential {
        lines.push("- **Confidential:** Yes".to_string());
    }

    if let Some(weight) = issue.weight.value() {
        lines.push(format!("- **Weight:** {}", weight));
    }

    if let Some(time_stats) = issue.time_stats.value() {
        if let Some(estimate) = non_empty(&time_stats.human_time_estimate) {
            lines.push(format!("- **Time Estimate:** {}", estimate));
        }
        if let Some(spent) = non_empty(&time_stats.human_total_time_spent) {
            lines.push(format!("- **Time Spent:** {}", spent));
        }
    }

    if let Some(tasks) = issue.task_completion_status.value() {
        if tasks.count > 0 {
            lines.push(format!(
                "- **Tasks:** {}/{} completed",
                tasks.completed_count, tasks.count
            ));
        }
    }

    format!("## Metadata\n\n{}", lines.join("\n"))
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

fn format_description(issue: &Issue) -> String {
    let content = non_empty(&issue.description).unwrap_or(NO_DESCRIPTION_PLACEHOLDER);
    format!("## Description\n\n{}", content)
}

fn format_note(note: &Note, number: usize) -> String {
    let system_tag = if note.system { " [System]" } else { "" };
    let internal_tag = if note.is_internal() { " [Internal]" } else { "" };

    format!(
        "### Comment {}{}{} - @{} ({})\n\n{}",
        number,
        system_tag,
        internal_tag,
        note.author.username,
        format_timestamp(&note.created_at),
        note.body
    )
}

fn format_comments(notes: &[Note]) -> String {
    if notes.is_empty() {
        return format!("## Comments\n\n{}", NO_COMMENTS_PLACEHOLDER);
    }

    let user_comments = notes.iter().filter(|n| n.is_user_comment()).count();
    let entries = notes
        .iter()
        .enumerate()
        .map(|(index, note)| format_note(note, index + 1))
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "## Comments ({} total, {} user comments)\n\n{}",
        notes.len(),
        user_comments,
        entries
    )
}

fn format_workflow_instructions(issue: &Issue, options: &PromptOptions) -> String {
    let plan = WorkflowPlan::for_issue(issue);

    let mut text = formatdoc!(
        "
        ## Workflow Instructions

        1. **Pull latest changes** before starting work:
           ```bash
           git fetch origin
           git checkout develop || git checkout main || git checkout master
           git pull
           ```

        2. **Create branch:** `{branch}`
           ```bash
           git checkout -b {branch}
           ```

        3. **Commit format:** `{commit}`

        4. **Push and create MR:**
           ```bash
           git push -u origin {branch}
           ```

        5. **Open MR:** [Create Merge Request]({mr_url})

        ## Available Tools & Context

        - **glab CLI:** You can leverage `glab` commands to:
          - Create merge requests: `glab mr create`
          - Look up repositories: `glab repo list`, `glab repo view`
          - Manage issues: `glab issue view`, `glab issue update`",
        branch = plan.branch_name,
        commit = plan.commit_template,
        mr_url = plan.merge_request_url,
    );

    if let Some(root) = options.projects_root.as_deref().filter(|r| !r.is_empty()) {
        text.push_str(&formatdoc!(
            "


            - **Project Location:** All projects are located in `{root}`
            - **Multi-Project Context:** The issue may involve multiple repositories in the `{root}` folder",
            root = root,
        ));
    }

    text
}
