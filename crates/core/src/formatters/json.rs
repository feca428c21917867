use issue_prompt_developer_platforms::models::IssueData;

#[cfg(test)]
#[path = "json_tests.rs"]
mod tests;

/// Renders the issue data as JSON indented by two spaces.
///
/// Field names match the platform payload and fields that were absent from
/// the payload are left out, so the output can be fed back through
/// `validate_issue_data`.
pub fn format_issue_json(data: &IssueData) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(data)
}
