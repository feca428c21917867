use clap::Subcommand;
use tracing::debug;

use crate::config::{get_config_path, AppConfig};
use crate::errors::CliError;

#[cfg(test)]
#[path = "config_cmd_tests.rs"]
mod tests;

/// Subcommands for the config command
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Create initial configuration file
    Init {
        /// Path to save the configuration file
        #[arg(short, long)]
        path: Option<String>,
    },

    /// Check configuration syntax
    Validate {
        /// Path to the configuration file
        #[arg(short, long)]
        path: Option<String>,
    },

    /// Show current configuration
    Get {
        /// Path to the configuration file
        #[arg(short, long)]
        path: Option<String>,

        /// Configuration key to get (e.g., "gitlab.url")
        key: Option<String>,
    },

    /// Update configuration values
    Set {
        /// Path to the configuration file
        #[arg(short, long)]
        path: Option<String>,

        /// Configuration key to set (e.g., "output.preamble")
        key: String,

        /// Value to set, an empty value clears optional settings
        value: String,
    },
}

/// Execute the config command
pub async fn execute(cmd: ConfigCommands) -> Result<(), CliError> {
    match cmd {
        ConfigCommands::Init { path } => init_config(path.as_deref()),
        ConfigCommands::Validate { path } => validate_config(path.as_deref()),
        ConfigCommands::Get { path, key } => get_config(path.as_deref(), key.as_deref()),
        ConfigCommands::Set { path, key, value } => set_config(path.as_deref(), &key, &value),
    }
}

/// Initialize a new configuration file
fn init_config(path: Option<&str>) -> Result<(), CliError> {
    let config_path = get_config_path(path);
    debug!("Initializing configuration at {:?}", config_path);

    if config_path.exists() {
        return Err(CliError::ConfigError(format!(
            "Configuration file already exists at {:?}",
            config_path
        )));
    }

    let config = AppConfig::default();
    config.save(&config_path)?;

    println!("Configuration initialized at {:?}", config_path);
    Ok(())
}

/// Validate a configuration file
fn validate_config(path: Option<&str>) -> Result<(), CliError> {
    let config_path = get_config_path(path);
    debug!("Validating configuration at {:?}", config_path);

    AppConfig::load(&config_path)?.validate()?;

    println!("Configuration is valid");
    Ok(())
}

/// Get a configuration value
fn get_config(path: Option<&str>, key: Option<&str>) -> Result<(), CliError> {
    let config_path = get_config_path(path);
    debug!("Getting configuration from {:?}", config_path);

    let config = AppConfig::load(&config_path)?;

    if let Some(key) = key {
        let value = get_config_value(&config, key)?;
        println!("{}: {}", key, value);
    } else {
        let config_str = toml::to_string_pretty(&config).map_err(|e| {
            CliError::ConfigError(format!("Failed to serialize configuration: {}", e))
        })?;
        println!("{}", config_str);
    }

    Ok(())
}

/// Set a configuration value
fn set_config(path: Option<&str>, key: &str, value: &str) -> Result<(), CliError> {
    let config_path = get_config_path(path);
    debug!("Setting configuration at {:?}", config_path);

    let mut config = AppConfig::load_or_default(&config_path)?;

    set_config_value(&mut config, key, value)?;
    config.validate()?;

    config.save(&config_path)?;

    println!("Configuration updated: {} = {}", key, value);
    Ok(())
}

/// Error for a key that is not a known setting
fn invalid_key(key: &str) -> CliError {
    CliError::InvalidArguments(format!("Invalid configuration key: {}", key))
}

/// Get a value from the configuration by key path
fn get_config_value(config: &AppConfig, key: &str) -> Result<String, CliError> {
    let value = match key.split_once('.') {
        Some(("gitlab", "url")) => config.gitlab.url.clone().unwrap_or_default(),
        Some(("gitlab", "project_id")) => config.gitlab.project_id.clone().unwrap_or_default(),
        Some(("output", "preamble")) => config.output.preamble.clone().unwrap_or_default(),
        Some(("output", "projects_root")) => {
            config.output.projects_root.clone().unwrap_or_default()
        }
        Some(("handoff", "command")) => config.handoff.command.clone(),
        Some(("handoff", "args")) => config.handoff.args.join(" "),
        _ => return Err(invalid_key(key)),
    };

    Ok(value)
}

/// Set a value in the configuration by key path
fn set_config_value(config: &mut AppConfig, key: &str, value: &str) -> Result<(), CliError> {
    let optional = if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    };

    match key.split_once('.') {
        Some(("gitlab", "url")) => config.gitlab.url = optional,
        Some(("gitlab", "project_id")) => config.gitlab.project_id = optional,
        Some(("output", "preamble")) => config.output.preamble = optional,
        Some(("output", "projects_root")) => config.output.projects_root = optional,
        Some(("handoff", "command")) => {
            if value.trim().is_empty() {
                return Err(CliError::InvalidArguments(
                    "handoff.command must not be empty".to_string(),
                ));
            }
            config.handoff.command = value.to_string();
        }
        Some(("handoff", "args")) => {
            config.handoff.args = value.split_whitespace().map(str::to_string).collect();
        }
        _ => return Err(invalid_key(key)),
    }

    Ok(())
}
