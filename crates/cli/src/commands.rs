/// Authentication commands for storing the GitLab token
pub mod auth;
/// Configuration management commands
pub mod config_cmd;
/// Fetching and rendering issues
pub mod fetch;
