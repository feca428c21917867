//! # Issue Prompt CLI
//!
//! Command-line interface for turning GitLab issues into prompts for AI coding
//! agents.
//!
//! This binary fetches an issue and its discussion thread from GitLab and
//! prints it as a markdown prompt with workflow instructions, or as raw JSON.
//! It also manages the configuration file and the stored GitLab token.
//!
//! # Commands
//!
//! - `<ISSUE_IID>` - Fetch an issue and print the prompt
//! - `config` - Manage configuration files and settings
//! - `auth` - Store or remove the GitLab token
//!
//! # Examples
//!
//! ```bash
//! # Fetch issue 13001 and copy the prompt to the clipboard
//! issue-prompt 13001 | wl-copy
//!
//! # Fetch without comments, as JSON
//! issue-prompt 13001 --no-comments --json
//!
//! # Store a token in the system keyring
//! issue-prompt auth gitlab
//! ```

#![deny(missing_docs)]
#![deny(clippy::missing_docs_in_private_items)]

use clap::{Parser, Subcommand};
use std::process::{ExitCode, Termination};
use tracing::level_filters::LevelFilter;
use tracing::{debug, info};

/// Command implementations for the CLI.
mod commands;

/// Configuration management for the CLI.
mod config;

/// Error types specific to the CLI.
mod errors;

use commands::{auth::AuthCommands, config_cmd::ConfigCommands, fetch::FetchArgs};
use errors::CliError;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Environment variable holding the log filter
const LOG_ENV_VAR: &str = "ISSUE_PROMPT_LOG";

/// Command-line interface structure for Issue Prompt.
///
/// Without a subcommand the CLI fetches the issue given as the first
/// argument.
#[derive(Parser)]
#[command(
    author,
    version,
    about,
    long_about = None,
    args_conflicts_with_subcommands = true,
    after_help = "Environment Variables:\n  \
        GITLAB_URL         GitLab instance URL (e.g., https://gitlab.com)\n  \
        GITLAB_TOKEN       Personal Access Token with read_api scope\n  \
        GITLAB_PROJECT_ID  Project ID or URL-encoded path (e.g., 123 or group%2Fproject)\n  \
        ISSUE_PROMPT_LOG   Log filter, e.g. debug"
)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// The subcommand to execute
    #[command(subcommand)]
    command: Option<Commands>,

    /// Arguments for fetching an issue
    #[command(flatten)]
    fetch: FetchArgs,
}

/// Available subcommands for the Issue Prompt CLI.
#[derive(Subcommand)]
enum Commands {
    /// Manage configuration
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Manage the stored GitLab token
    #[command(subcommand)]
    Auth(AuthCommands),
}

/// Install the log subscriber. Logs go to stderr so that stdout only carries
/// the rendered issue.
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::builder()
            .with_default_directive(LevelFilter::WARN.into())
            .with_env_var(LOG_ENV_VAR)
            .from_env_lossy()
    };

    tracing_subscriber::registry()
        .with(fmt::layer().pretty().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

/// Dispatch to the command handler selected on the command line.
async fn run(cli: Cli) -> Result<(), CliError> {
    if cli.verbose {
        info!("Verbose mode enabled");
    }

    match cli.command {
        Some(Commands::Config(cmd)) => commands::config_cmd::execute(cmd).await,
        Some(Commands::Auth(cmd)) => commands::auth::execute(cmd).await,
        None => commands::fetch::execute(cli.fetch).await,
    }
}

/// Main entry point for the Issue Prompt CLI.
///
/// Parses the command line, initializes logging and runs the selected
/// command. Failures are reported on stderr and mapped to the exit code of
/// their category.
#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            debug!(error = ?e, exit_code = e.exit_code(), "Command failed");
            e.report()
        }
    }
}
