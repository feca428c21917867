//! # Issue Prompt Core
//!
//! Turns a GitLab issue and its discussion thread into text that can be handed
//! to an AI coding agent.
//!
//! The core crate fetches validated issue data through an [`IssueProvider`]
//! and renders it either as a markdown prompt that includes workflow
//! instructions, or as raw JSON.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use issue_prompt_developer_platforms::{IssueDataOptions, IssueProvider};
//! use issue_prompt_core::{IssuePrompt, config::PromptOptions, formatters::OutputFormat};
//! use anyhow::Result;
//!
//! async fn print_prompt<P: IssueProvider + std::fmt::Debug>(provider: P) -> Result<()> {
//!     let issue_prompt = IssuePrompt::new(provider);
//!
//!     let text = issue_prompt
//!         .render(
//!             "group/project",
//!             42,
//!             IssueDataOptions::default(),
//!             OutputFormat::Prompt,
//!         )
//!         .await?;
//!
//!     println!("{}", text);
//!     Ok(())
//! }
//!
//! // With a preamble and the location of local checkouts
//! async fn print_custom_prompt<P: IssueProvider + std::fmt::Debug>(provider: P) -> Result<()> {
//!     let options = PromptOptions {
//!         preamble: Some("ultrathink".to_string()),
//!         projects_root: Some("~/projects/".to_string()),
//!     };
//!
//!     let issue_prompt = IssuePrompt::with_options(provider, options);
//!     let text = issue_prompt
//!         .render("group/project", 42, IssueDataOptions::default(), OutputFormat::Prompt)
//!         .await?;
//!
//!     println!("{}", text);
//!     Ok(())
//! }
//! ```

use issue_prompt_developer_platforms::models::IssueData;
use issue_prompt_developer_platforms::{IssueDataOptions, IssueProvider};
use tracing::{debug, error, info, instrument};

pub mod config;
use config::PromptOptions;

pub mod errors;
use errors::IssuePromptError;

pub mod formatters;
use formatters::{json::format_issue_json, prompt::format_issue_prompt, OutputFormat};

pub mod workflow;

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;

#[cfg(test)]
mod test_fixtures;

/// Fetches issues and renders them in the requested format.
///
/// Nothing is rendered unless every request and every validation step
/// succeeded, so a caller never sees a partial document.
///
/// # Examples
///
/// ```rust,no_run
/// use issue_prompt_developer_platforms::{IssueDataOptions, IssueProvider};
/// use issue_prompt_core::{IssuePrompt, formatters::OutputFormat};
/// use anyhow::Result;
///
/// async fn example<P: IssueProvider + std::fmt::Debug>(provider: P) -> Result<()> {
///     let issue_prompt = IssuePrompt::new(provider);
///
///     let json = issue_prompt
///         .render("123", 7, IssueDataOptions::default(), OutputFormat::Json)
///         .await?;
///
///     println!("{}", json);
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct IssuePrompt<P: IssueProvider + std::fmt::Debug> {
    provider: P,
    options: PromptOptions,
}

impl<P: IssueProvider + std::fmt::Debug> IssuePrompt<P> {
    /// Creates a new `IssuePrompt` with the default prompt options.
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            options: PromptOptions::default(),
        }
    }

    /// Creates a new `IssuePrompt` with custom prompt options.
    pub fn with_options(provider: P, options: PromptOptions) -> Self {
        Self { provider, options }
    }

    /// The prompt options in use.
    pub fn options(&self) -> &PromptOptions {
        &self.options
    }

    /// Fetches the issue and the notes selected by `data_options`.
    #[instrument(skip(self))]
    pub async fn fetch(
        &self,
        project_id: &str,
        issue_iid: u64,
        data_options: IssueDataOptions,
    ) -> Result<IssueData, IssuePromptError> {
        info!(project = project_id, issue_iid, "Fetching issue");

        let data = self
            .provider
            .get_issue_data(project_id, issue_iid, data_options)
            .await
            .map_err(|e| {
                error!(
                    project = project_id,
                    issue_iid,
                    error = %e,
                    "Failed to fetch issue"
                );
                e
            })?;

        debug!(
            project = project_id,
            issue_iid,
            notes = data.notes.len(),
            user_comments = data.user_comment_count(),
            "Fetched issue"
        );

        Ok(data)
    }

    /// Renders issue data in the given format.
    pub fn format(&self, data: &IssueData, format: OutputFormat) -> Result<String, IssuePromptError> {
        let text = match format {
            OutputFormat::Prompt => format_issue_prompt(data, &self.options),
            OutputFormat::Json => format_issue_json(data)?,
        };

        Ok(text)
    }

    /// Fetches an issue and renders it in the given format.
    #[instrument(skip(self))]
    pub async fn render(
        &self,
        project_id: &str,
        issue_iid: u64,
        data_options: IssueDataOptions,
        format: OutputFormat,
    ) -> Result<String, IssuePromptError> {
        let data = self.fetch(project_id, issue_iid, data_options).await?;
        self.format(&data, format)
    }
}
