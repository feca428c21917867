use clap::Subcommand;
use keyring::Entry;
use tracing::{debug, warn};

use crate::errors::CliError;

/// Keyring service the CLI stores its secrets under
pub const KEY_RING_SERVICE_NAME: &str = "issue_prompt_cli";
/// Keyring entry for the GitLab personal access token
pub const KEY_RING_GITLAB_TOKEN: &str = "gitlab_token";

/// Subcommands for the auth command
#[derive(Subcommand, Debug)]
pub enum AuthCommands {
    /// Store a GitLab personal access token in the system keyring
    #[command(name = "gitlab")]
    GitLab,

    /// Remove the stored GitLab token
    Logout,
}

/// Execute the auth command
pub async fn execute(cmd: AuthCommands) -> Result<(), CliError> {
    match cmd {
        AuthCommands::GitLab => auth_gitlab(),
        AuthCommands::Logout => logout(),
    }
}

/// Read the stored GitLab token, if there is one
pub fn stored_token() -> Result<Option<String>, CliError> {
    let entry = token_entry()?;

    match entry.get_password() {
        Ok(token) => {
            debug!("Using the GitLab token from the keyring");
            Ok(Some(token))
        }
        Err(keyring::Error::NoEntry) => Ok(None),
        Err(e) => Err(CliError::auth(format!(
            "Failed to read the GitLab token from the keyring: {}",
            e
        ))),
    }
}

/// The keyring entry that holds the GitLab token
fn token_entry() -> Result<Entry, CliError> {
    Entry::new(KEY_RING_SERVICE_NAME, KEY_RING_GITLAB_TOKEN).map_err(|e| {
        CliError::auth(format!("Failed to create an entry in the keyring: {}", e))
    })
}

/// Store a GitLab token
fn auth_gitlab() -> Result<(), CliError> {
    debug!("Authenticating with GitLab");

    println!("GitLab Personal Access Token Authentication");
    println!("-------------------------------------------");
    println!("Please provide a GitLab Personal Access Token with the read_api scope:");

    let mut token = String::new();
    std::io::stdin()
        .read_line(&mut token)
        .map_err(|e| CliError::auth(format!("Failed to read input: {}", e)))?;
    let token = token.trim();

    if token.is_empty() {
        return Err(CliError::auth("Token cannot be empty"));
    }

    token_entry()?
        .set_password(token)
        .map_err(|e| CliError::auth(format!("Failed to save token to keyring: {}", e)))?;

    println!("GitLab token stored successfully!");
    Ok(())
}

/// Remove the stored GitLab token
fn logout() -> Result<(), CliError> {
    match token_entry()?.delete_credential() {
        Ok(()) => {
            println!("GitLab token removed from the keyring");
            Ok(())
        }
        Err(keyring::Error::NoEntry) => {
            warn!("No GitLab token was stored in the keyring");
            println!("No GitLab token was stored");
            Ok(())
        }
        Err(e) => Err(CliError::auth(format!(
            "Failed to remove the token from the keyring: {}",
            e
        ))),
    }
}
