use crate::changelog::ChangelogTemplate;
use crate::error::{DeployError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// File name looked up in the working directory and the user config directory
pub const CONFIG_FILE_NAME: &str = "deploy.toml";

/// Represents the complete configuration for git-deploy.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub release: ReleaseConfig,

    #[serde(default)]
    pub changelog: ChangelogConfig,

    #[serde(default)]
    pub publish: PublishConfig,
}

fn default_branches() -> Vec<String> {
    vec!["master".to_string(), "main".to_string()]
}

fn default_remote() -> String {
    "origin".to_string()
}

fn default_tag_prefix() -> String {
    "v".to_string()
}

/// Where releases may be cut from and how tags are named
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ReleaseConfig {
    #[serde(default = "default_branches")]
    pub branches: Vec<String>,

    #[serde(default = "default_remote")]
    pub remote: String,

    #[serde(default = "default_tag_prefix")]
    pub tag_prefix: String,
}

impl Default for ReleaseConfig {
    fn default() -> Self {
        ReleaseConfig {
            branches: default_branches(),
            remote: default_remote(),
            tag_prefix: default_tag_prefix(),
        }
    }
}

fn default_width() -> usize {
    80
}

fn default_heading() -> String {
    ChangelogTemplate::DEFAULT_HEADING.to_string()
}

fn default_entry() -> String {
    ChangelogTemplate::DEFAULT_ENTRY.to_string()
}

fn default_date_format() -> String {
    ChangelogTemplate::DEFAULT_DATE_FORMAT.to_string()
}

/// Changelog layout and terminal rendering width
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ChangelogConfig {
    #[serde(default = "default_width")]
    pub width: usize,

    #[serde(default = "default_heading")]
    pub heading: String,

    #[serde(default = "default_entry")]
    pub entry: String,

    #[serde(default = "default_date_format")]
    pub date_format: String,
}

impl Default for ChangelogConfig {
    fn default() -> Self {
        ChangelogConfig {
            width: default_width(),
            heading: default_heading(),
            entry: default_entry(),
            date_format: default_date_format(),
        }
    }
}

impl ChangelogConfig {
    /// Build the immutable template handed to the changelog generator
    pub fn template(&self) -> Result<ChangelogTemplate> {
        ChangelogTemplate::new(&self.heading, &self.entry, &self.date_format)
    }
}

fn default_publish_enabled() -> bool {
    true
}

fn default_publish_program() -> String {
    "gh".to_string()
}

/// Release record publishing
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct PublishConfig {
    #[serde(default = "default_publish_enabled")]
    pub enabled: bool,

    #[serde(default = "default_publish_program")]
    pub program: String,
}

impl Default for PublishConfig {
    fn default() -> Self {
        PublishConfig {
            enabled: default_publish_enabled(),
            program: default_publish_program(),
        }
    }
}

/// Path of the per-user configuration file, if a config directory exists
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("git-deploy").join(CONFIG_FILE_NAME))
}

/// Loads configuration from file or returns defaults.
///
/// Lookup order:
/// 1. Custom path provided as parameter (must exist)
/// 2. `deploy.toml` in the current directory
/// 3. `<config dir>/git-deploy/deploy.toml`
/// 4. Default configuration
pub fn load_config(config_path: Option<&str>) -> Result<Config> {
    let path = match config_path {
        Some(path) => PathBuf::from(path),
        None => {
            let local = Path::new(".").join(CONFIG_FILE_NAME);
            match user_config_path() {
                _ if local.exists() => local,
                Some(user) if user.exists() => user,
                _ => return Ok(Config::default()),
            }
        }
    };

    let config_str = fs::read_to_string(&path).map_err(|e| {
        DeployError::config(format!("Cannot read {}: {}", path.display(), e))
    })?;
    parse_config(&config_str)
}

/// Parse and validate a TOML configuration document
pub fn parse_config(config_str: &str) -> Result<Config> {
    let config: Config = toml::from_str(config_str)
        .map_err(|e| DeployError::config(format!("Invalid configuration: {}", e)))?;

    if config.release.branches.is_empty() {
        return Err(DeployError::config(
            "release.branches must name at least one branch",
        ));
    }
    if config.changelog.width == 0 {
        return Err(DeployError::config("changelog.width must be positive"));
    }
    config.changelog.template()?;

    Ok(config)
}
