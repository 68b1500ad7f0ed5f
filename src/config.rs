use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{ReleaseTrainError, Result};

/// File name looked up in the working directory
pub const CONFIG_FILE_NAME: &str = "releasetrain.toml";

/// Represents the complete configuration for release-train.
///
/// Contains the remote and manifest to operate on, label mapping, commit identity and messages.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Config {
    #[serde(default = "default_remote")]
    pub remote: String,

    #[serde(default = "default_manifest")]
    pub manifest: PathBuf,

    #[serde(default)]
    pub labels: LabelsConfig,

    #[serde(default)]
    pub git: GitConfig,

    #[serde(default)]
    pub messages: MessagesConfig,
}

fn default_remote() -> String {
    "origin".to_string()
}

fn default_manifest() -> PathBuf {
    PathBuf::from("package.json")
}

fn default_major_labels() -> Vec<String> {
    vec!["major".to_string()]
}

fn default_minor_labels() -> Vec<String> {
    vec!["minor".to_string()]
}

fn default_patch_labels() -> Vec<String> {
    vec!["patch".to_string()]
}

/// Pull request labels that select the release type.
///
/// Each tier accepts several aliases; matching ignores case.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct LabelsConfig {
    #[serde(default = "default_major_labels")]
    pub major: Vec<String>,

    #[serde(default = "default_minor_labels")]
    pub minor: Vec<String>,

    #[serde(default = "default_patch_labels")]
    pub patch: Vec<String>,
}

impl Default for LabelsConfig {
    fn default() -> Self {
        LabelsConfig {
            major: default_major_labels(),
            minor: default_minor_labels(),
            patch: default_patch_labels(),
        }
    }
}

fn default_user_name() -> Option<String> {
    Some("github-actions[bot]".to_string())
}

fn default_user_email() -> Option<String> {
    Some("41898282+github-actions[bot]@users.noreply.github.com".to_string())
}

/// Identity used for the commits the train records.
///
/// Set either field to an empty string to fall back to git's own configuration.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct GitConfig {
    #[serde(default = "default_user_name")]
    pub user_name: Option<String>,

    #[serde(default = "default_user_email")]
    pub user_email: Option<String>,
}

impl Default for GitConfig {
    fn default() -> Self {
        GitConfig {
            user_name: default_user_name(),
            user_email: default_user_email(),
        }
    }
}

impl GitConfig {
    /// The configured identity, if both parts are set
    pub fn identity(&self) -> Option<(String, String)> {
        match (self.user_name.as_deref(), self.user_email.as_deref()) {
            (Some(name), Some(email)) if !name.is_empty() && !email.is_empty() => {
                Some((name.to_string(), email.to_string()))
            }
            _ => None,
        }
    }
}

fn default_bump_message() -> String {
    "chore: bump version to {version} for {branch}".to_string()
}

fn default_sync_message() -> String {
    "chore: sync {from} into {to} ({version})".to_string()
}

fn default_keep_message() -> String {
    "chore: keep {branch} at {version} after syncing {from}".to_string()
}

/// Commit message templates.
///
/// Placeholders: `{version}`, `{branch}`, `{from}`, `{to}`.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct MessagesConfig {
    #[serde(default = "default_bump_message")]
    pub bump: String,

    #[serde(default = "default_sync_message")]
    pub sync: String,

    #[serde(default = "default_keep_message")]
    pub keep: String,
}

impl Default for MessagesConfig {
    fn default() -> Self {
        MessagesConfig {
            bump: default_bump_message(),
            sync: default_sync_message(),
            keep: default_keep_message(),
        }
    }
}

impl MessagesConfig {
    /// Message for the version bump commit on the target branch
    pub fn bump(&self, version: &str, branch: &str) -> String {
        render(&self.bump, &[("version", version), ("branch", branch)])
    }

    /// Message for the merge commit of a propagation edge
    pub fn sync(&self, from: &str, to: &str, version: &str) -> String {
        render(
            &self.sync,
            &[("from", from), ("to", to), ("version", version)],
        )
    }

    /// Message recorded when the neighbor keeps its own version
    pub fn keep(&self, branch: &str, version: &str, from: &str) -> String {
        render(
            &self.keep,
            &[("branch", branch), ("version", version), ("from", from)],
        )
    }
}

fn render(template: &str, values: &[(&str, &str)]) -> String {
    values.iter().fold(template.to_string(), |acc, (key, value)| {
        acc.replace(&format!("{{{}}}", key), value)
    })
}

impl Default for Config {
    fn default() -> Self {
        Config {
            remote: default_remote(),
            manifest: default_manifest(),
            labels: LabelsConfig::default(),
            git: GitConfig::default(),
            messages: MessagesConfig::default(),
        }
    }
}

/// Loads configuration from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `releasetrain.toml` in current directory
/// 3. `.releasetrain.toml` in the user config directory
/// 4. Default configuration if no file found
///
/// # Arguments
/// * `config_path` - Optional path to custom configuration file
///
/// # Returns
/// * `Ok(Config)` - Loaded or default configuration
/// * `Err` - If file exists but cannot be read or parsed
pub fn load_config(config_path: Option<&str>) -> Result<Config> {
    let path = if let Some(path) = config_path {
        PathBuf::from(path)
    } else if Path::new(CONFIG_FILE_NAME).exists() {
        PathBuf::from(CONFIG_FILE_NAME)
    } else if let Some(config_dir) = dirs::config_dir() {
        let user_path = config_dir.join(format!(".{}", CONFIG_FILE_NAME));
        if user_path.exists() {
            user_path
        } else {
            return Ok(Config::default());
        }
    } else {
        return Ok(Config::default());
    };

    let config_str = fs::read_to_string(&path).map_err(|e| {
        ReleaseTrainError::config(format!("Cannot read '{}': {}", path.display(), e))
    })?;

    toml::from_str(&config_str).map_err(|e| {
        ReleaseTrainError::config(format!("Cannot parse '{}': {}", path.display(), e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_rendering() {
        let messages = MessagesConfig::default();
        assert_eq!(
            messages.bump("1.2.4-beta.0", "beta"),
            "chore: bump version to 1.2.4-beta.0 for beta"
        );
        assert_eq!(
            messages.sync("main", "beta", "1.2.4"),
            "chore: sync main into beta (1.2.4)"
        );
        assert_eq!(
            messages.keep("alpha", "1.5.0", "beta"),
            "chore: keep alpha at 1.5.0 after syncing beta"
        );
    }

    #[test]
    fn test_identity_requires_both_parts() {
        let mut git = GitConfig::default();
        assert!(git.identity().is_some());

        git.user_email = Some(String::new());
        assert_eq!(git.identity(), None);
    }
}
