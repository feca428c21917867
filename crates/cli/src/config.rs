use std::{
    fs,
    path::{Path, PathBuf},
};

use issue_prompt_core::config::PromptOptions;
use issue_prompt_developer_platforms::gitlab::normalize_base_url;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::errors::CliError;

/// Configuration file name looked up in the current directory
pub const DEFAULT_CONFIG_FILENAME: &str = ".issue-prompt.toml";

/// Directory below the user configuration directory
pub const USER_CONFIG_DIRECTORY: &str = "issue-prompt";

/// Configuration file name in the user configuration directory
pub const USER_CONFIG_FILENAME: &str = "config.toml";

/// Environment variable holding the GitLab base URL
pub const ENV_GITLAB_URL: &str = "GITLAB_URL";

/// Environment variable holding the access token
pub const ENV_GITLAB_TOKEN: &str = "GITLAB_TOKEN";

/// Environment variable holding the project ID or path
pub const ENV_GITLAB_PROJECT_ID: &str = "GITLAB_PROJECT_ID";

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;

/// Configuration for the issue prompt CLI
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Where to find the issues
    #[serde(default)]
    pub gitlab: GitLabConfig,

    /// How the prompt is rendered
    #[serde(default)]
    pub output: PromptOptions,

    /// The program that receives the prompt for `--opencode`
    #[serde(default)]
    pub handoff: HandoffConfig,
}

impl AppConfig {
    /// Load configuration from the specified file
    pub fn load(path: &Path) -> Result<Self, CliError> {
        debug!("Loading configuration from {:?}", path);

        if !path.exists() {
            return Err(CliError::ConfigError(format!(
                "Configuration file not found: {:?}",
                path
            )));
        }

        let content = fs::read_to_string(path).map_err(|e| {
            CliError::ConfigError(format!("Failed to read configuration file: {}", e))
        })?;

        let config: AppConfig = toml::from_str(&content).map_err(|e| {
            CliError::ConfigError(format!("Failed to parse configuration file: {}", e))
        })?;

        Ok(config)
    }

    /// Load configuration from the file if it exists, otherwise use the defaults
    pub fn load_or_default(path: &Path) -> Result<Self, CliError> {
        if path.exists() {
            Self::load(path)
        } else {
            debug!("No configuration file at {:?}, using defaults", path);
            Ok(Self::default())
        }
    }

    /// Save configuration to the specified file
    pub fn save(&self, path: &Path) -> Result<(), CliError> {
        debug!("Saving configuration to {:?}", path);

        let content = toml::to_string_pretty(self).map_err(|e| {
            CliError::ConfigError(format!("Failed to serialize configuration: {}", e))
        })?;

        // Create parent directories if they don't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                CliError::ConfigError(format!("Failed to create directory: {}", e))
            })?;
        }

        fs::write(path, content).map_err(|e| {
            CliError::ConfigError(format!("Failed to write configuration file: {}", e))
        })?;

        info!("Configuration saved to {:?}", path);
        Ok(())
    }

    /// Check the values that cannot be checked while parsing
    pub fn validate(&self) -> Result<(), CliError> {
        if let Some(url) = non_empty(self.gitlab.url.as_deref()) {
            normalize_base_url(url)?;
        }

        if self.handoff.command.trim().is_empty() {
            return Err(CliError::ConfigError(
                "handoff.command must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}

/// GitLab connection settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitLabConfig {
    /// The base URL of the GitLab instance
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// The project ID or path, e.g. `123` or `group/project`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
}

/// The external program that receives the rendered prompt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandoffConfig {
    /// The program to run
    #[serde(default = "HandoffConfig::default_command")]
    pub command: String,

    /// Arguments placed before the prompt
    #[serde(default = "HandoffConfig::default_args")]
    pub args: Vec<String>,
}

impl HandoffConfig {
    /// The default program
    fn default_command() -> String {
        "opencode".to_string()
    }

    /// The default arguments
    fn default_args() -> Vec<String> {
        vec!["--prompt".to_string()]
    }
}

impl Default for HandoffConfig {
    fn default() -> Self {
        Self {
            command: HandoffConfig::default_command(),
            args: HandoffConfig::default_args(),
        }
    }
}

/// Settings given on the command line
#[derive(Debug, Clone, Copy, Default)]
pub struct SettingsOverrides<'a> {
    /// Value of `--gitlab-url`
    pub gitlab_url: Option<&'a str>,

    /// Value of `--project`
    pub project_id: Option<&'a str>,
}

/// The settings needed to fetch an issue
#[derive(Clone, PartialEq, Eq)]
pub struct Settings {
    /// The base URL without a trailing slash
    pub gitlab_url: String,

    /// The access token
    pub token: String,

    /// The project ID or path
    pub project_id: String,
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("gitlab_url", &self.gitlab_url)
            .field("token", &"<redacted>")
            .field("project_id", &self.project_id)
            .finish()
    }
}

/// Resolve the connection settings.
///
/// Values on the command line win over environment variables, which win over
/// the configuration file. The token is only read from the environment or,
/// failing that, from `stored_token`. Every missing setting is reported in a
/// single error.
pub fn resolve_settings<E, T>(
    overrides: SettingsOverrides<'_>,
    config: &AppConfig,
    env: E,
    stored_token: T,
) -> Result<Settings, CliError>
where
    E: Fn(&str) -> Option<String>,
    T: FnOnce() -> Result<Option<String>, CliError>,
{
    let gitlab_url = first_of(
        overrides.gitlab_url,
        env(ENV_GITLAB_URL),
        config.gitlab.url.as_deref(),
    );
    let project_id = first_of(
        overrides.project_id,
        env(ENV_GITLAB_PROJECT_ID),
        config.gitlab.project_id.as_deref(),
    );
    let token = match env(ENV_GITLAB_TOKEN).filter(|t| !t.trim().is_empty()) {
        Some(token) => Some(token),
        None => stored_token()?.filter(|t| !t.trim().is_empty()),
    };

    let mut missing = Vec::new();
    if gitlab_url.is_none() {
        missing.push(format!(
            "  - GitLab URL: use --gitlab-url, set {} or set gitlab.url in the configuration file",
            ENV_GITLAB_URL
        ));
    }
    if token.is_none() {
        missing.push(format!(
            "  - GitLab token: set {} or run `issue-prompt auth gitlab`",
            ENV_GITLAB_TOKEN
        ));
    }
    if project_id.is_none() {
        missing.push(format!(
            "  - Project ID: use --project, set {} or set gitlab.project_id in the configuration file",
            ENV_GITLAB_PROJECT_ID
        ));
    }

    match (gitlab_url, token, project_id) {
        (Some(gitlab_url), Some(token), Some(project_id)) => {
            let gitlab_url = normalize_base_url(&gitlab_url)?;
            debug!(
                gitlab_url = %gitlab_url,
                project = %project_id,
                "Resolved settings"
            );

            Ok(Settings {
                gitlab_url,
                token: token.trim().to_string(),
                project_id,
            })
        }
        _ => Err(CliError::ConfigError(format!(
            "Missing required settings:\n{}",
            missing.join("\n")
        ))),
    }
}

/// Get the path to the configuration file
///
/// An explicit path is used as is. Otherwise a configuration file in the
/// current directory is preferred over the one in the user configuration
/// directory.
pub fn get_config_path(config_path: Option<&str>) -> PathBuf {
    if let Some(path) = config_path {
        return PathBuf::from(path);
    }

    // Look for config in current directory
    let current_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let local = current_dir.join(DEFAULT_CONFIG_FILENAME);
    if local.exists() {
        return local;
    }

    match dirs::config_dir() {
        Some(dir) => dir.join(USER_CONFIG_DIRECTORY).join(USER_CONFIG_FILENAME),
        None => local,
    }
}

/// Pick the first non-empty value in order of precedence
fn first_of(flag: Option<&str>, env: Option<String>, file: Option<&str>) -> Option<String> {
    non_empty(flag)
        .map(str::to_string)
        .or_else(|| env.filter(|v| !v.trim().is_empty()))
        .or_else(|| non_empty(file).map(str::to_string))
        .map(|v| v.trim().to_string())
}

/// Treat blank values as missing
fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
