use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{ReleaseError, Result};

/// File name looked up in the working directory and the user config directory.
pub const CONFIG_FILE_NAME: &str = "changeset-release.toml";

/// Represents the complete configuration for changeset-release.
///
/// Contains release settings, changeset tool commands, gate defaults, forge access and dev-release options.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub release: ReleaseConfig,

    #[serde(default)]
    pub changeset: ChangesetConfig,

    #[serde(default)]
    pub gates: GatesConfig,

    #[serde(default)]
    pub forge: ForgeConfig,

    #[serde(default)]
    pub dev_release: DevReleaseConfig,
}

fn default_commit_message() -> String {
    "Version packages".to_string()
}

fn default_changelog_file() -> String {
    "CHANGELOG.md".to_string()
}

/// General release settings.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ReleaseConfig {
    #[serde(default = "default_commit_message")]
    pub commit_message: String,

    #[serde(default = "default_changelog_file")]
    pub changelog_file: String,
}

impl Default for ReleaseConfig {
    fn default() -> Self {
        ReleaseConfig {
            commit_message: default_commit_message(),
            changelog_file: default_changelog_file(),
        }
    }
}

fn default_changeset_directory() -> String {
    ".changeset".to_string()
}

fn changeset_command(subcommand: &str) -> Vec<String> {
    vec![
        "pnpm".to_string(),
        "changeset".to_string(),
        subcommand.to_string(),
    ]
}

fn default_status_command() -> Vec<String> {
    changeset_command("status")
}

fn default_version_command() -> Vec<String> {
    changeset_command("version")
}

fn default_tag_command() -> Vec<String> {
    changeset_command("tag")
}

/// Commands used to drive the changeset tool.
///
/// Each command is a program followed by its arguments, run from the workspace root.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ChangesetConfig {
    #[serde(default = "default_changeset_directory")]
    pub directory: String,

    #[serde(default = "default_status_command")]
    pub status: Vec<String>,

    #[serde(default = "default_version_command")]
    pub version: Vec<String>,

    #[serde(default = "default_tag_command")]
    pub tag: Vec<String>,
}

impl Default for ChangesetConfig {
    fn default() -> Self {
        ChangesetConfig {
            directory: default_changeset_directory(),
            status: default_status_command(),
            version: default_version_command(),
            tag: default_tag_command(),
        }
    }
}

fn yes() -> bool {
    true
}

/// Default answers for the confirmation gates.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq)]
pub struct GatesConfig {
    #[serde(default = "yes")]
    pub commit: bool,

    #[serde(default = "yes")]
    pub tag: bool,

    #[serde(default = "yes")]
    pub push: bool,

    #[serde(default)]
    pub publish: bool,
}

impl Default for GatesConfig {
    fn default() -> Self {
        GatesConfig {
            commit: true,
            tag: true,
            push: true,
            publish: false,
        }
    }
}

fn default_token_env() -> String {
    "GITHUB_TOKEN".to_string()
}

/// Forge access settings.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ForgeConfig {
    /// Environment variable holding the API token
    #[serde(default = "default_token_env")]
    pub token_env: String,

    /// Overrides the API endpoint derived from the remote host
    #[serde(default)]
    pub api_url: Option<String>,
}

impl Default for ForgeConfig {
    fn default() -> Self {
        ForgeConfig {
            token_env: default_token_env(),
            api_url: None,
        }
    }
}

fn default_tag_message() -> String {
    "dev-release".to_string()
}

/// Options for the `dev-release` command.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct DevReleaseConfig {
    #[serde(default)]
    pub package: Option<String>,

    #[serde(default = "default_tag_message")]
    pub tag_message: String,
}

impl Default for DevReleaseConfig {
    fn default() -> Self {
        DevReleaseConfig {
            package: None,
            tag_message: default_tag_message(),
        }
    }
}

/// Loads configuration from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `changeset-release.toml` in current directory
/// 3. `changeset-release.toml` in the user config directory
/// 4. Default configuration if no file found
///
/// # Returns
/// * `Ok(Config)` - Loaded or default configuration
/// * `Err` - If file exists but cannot be read or parsed
pub fn load_config(config_path: Option<&str>) -> Result<Config> {
    let config_str = if let Some(path) = config_path {
        fs::read_to_string(path)?
    } else if Path::new(CONFIG_FILE_NAME).exists() {
        fs::read_to_string(CONFIG_FILE_NAME)?
    } else if let Some(config_dir) = dirs::config_dir() {
        let config_path = config_dir.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            fs::read_to_string(config_path)?
        } else {
            return Ok(Config::default());
        }
    } else {
        return Ok(Config::default());
    };

    parse_config(&config_str)
}

/// Parses configuration text, filling every omitted key with its default.
pub fn parse_config(text: &str) -> Result<Config> {
    toml::from_str(text).map_err(|e| ReleaseError::config(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let config = parse_config("[gates]\npublish = true\n").unwrap();
        assert!(config.gates.publish);
        assert!(config.gates.commit);
        assert_eq!(config.release.commit_message, "Version packages");
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = parse_config("[gates\n").unwrap_err();
        assert!(matches!(err, ReleaseError::Config(_)));
    }
}
