use clap::Args;
use issue_prompt_core::{formatters::OutputFormat, IssuePrompt};
use issue_prompt_developer_platforms::{gitlab::GitLabProvider, IssueDataOptions};
use tokio::process::Command;
use tracing::{debug, info, instrument};

use crate::commands::auth::stored_token;
use crate::config::{get_config_path, resolve_settings, AppConfig, HandoffConfig, SettingsOverrides};
use crate::errors::CliError;

#[cfg(test)]
#[path = "fetch_tests.rs"]
mod tests;

/// Arguments for fetching an issue
#[derive(Args, Debug, Default)]
pub struct FetchArgs {
    /// The IID (internal ID) of the issue to fetch
    #[arg(value_name = "ISSUE_IID", value_parser = clap::value_parser!(u64).range(1..))]
    pub issue_iid: Option<u64>,

    /// Exclude comments from output
    #[arg(long)]
    pub no_comments: bool,

    /// Only include user comments (exclude system notes)
    #[arg(long)]
    pub comments_only: bool,

    /// Output raw JSON instead of formatted markdown
    #[arg(long)]
    pub json: bool,

    /// Open the prompt directly in opencode
    #[arg(long, conflicts_with = "json")]
    pub opencode: bool,

    /// Project ID or path (e.g., 123 or group/project)
    #[arg(short, long)]
    pub project: Option<String>,

    /// GitLab instance URL (e.g., https://gitlab.com)
    #[arg(long)]
    pub gitlab_url: Option<String>,

    /// Alternate config file
    #[arg(short, long)]
    pub config: Option<String>,
}

impl FetchArgs {
    /// The parts of the discussion thread to fetch
    pub fn data_options(&self) -> IssueDataOptions {
        IssueDataOptions {
            include_comments: !self.no_comments,
            only_user_comments: self.comments_only,
        }
    }

    /// The requested output format
    pub fn output_format(&self) -> OutputFormat {
        if self.json {
            OutputFormat::Json
        } else {
            OutputFormat::Prompt
        }
    }
}

/// Fetch an issue and print it, or hand it to the configured program
#[instrument(skip(args))]
pub async fn execute(args: FetchArgs) -> Result<(), CliError> {
    let issue_iid = args.issue_iid.ok_or_else(|| {
        CliError::InvalidArguments("Issue IID is required, see --help".to_string())
    })?;

    let config_path = get_config_path(args.config.as_deref());
    let config = if args.config.is_some() {
        AppConfig::load(&config_path)?
    } else {
        AppConfig::load_or_default(&config_path)?
    };

    let overrides = SettingsOverrides {
        gitlab_url: args.gitlab_url.as_deref(),
        project_id: args.project.as_deref(),
    };
    let settings = resolve_settings(
        overrides,
        &config,
        |key| std::env::var(key).ok(),
        stored_token,
    )?;

    let provider = GitLabProvider::new(&settings.gitlab_url, &settings.token)?;
    let issue_prompt = IssuePrompt::with_options(provider, config.output.clone());

    let text = issue_prompt
        .render(
            &settings.project_id,
            issue_iid,
            args.data_options(),
            args.output_format(),
        )
        .await?;

    if args.opencode {
        hand_off(&config.handoff, &text).await
    } else {
        println!("{}", text);
        Ok(())
    }
}

/// Run the configured program with the prompt as its last argument
async fn hand_off(handoff: &HandoffConfig, prompt: &str) -> Result<(), CliError> {
    info!(command = %handoff.command, "Handing the prompt off");
    debug!(args = ?handoff.args, prompt_length = prompt.len(), "Hand-off arguments");

    let status = Command::new(&handoff.command)
        .args(&handoff.args)
        .arg(prompt)
        .status()
        .await
        .map_err(|e| {
            CliError::HandoffFailed(format!("Failed to start '{}': {}", handoff.command, e))
        })?;

    if status.success() {
        Ok(())
    } else {
        Err(CliError::HandoffFailed(format!(
            "'{}' exited with {}",
            handoff.command, status
        )))
    }
}
