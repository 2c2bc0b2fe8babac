use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{ChangelogError, Result};

/// Represents the complete configuration for git-changelog.
///
/// Covers tag/branch prefix handling, the rolling-release mapping, and the
/// paths of the auxiliary files consulted during version resolution.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Config {
    /// Tag prefixes that mark release tags (e.g. `droidian/`).
    #[serde(default = "default_tag_prefixes")]
    pub tag_prefixes: Vec<String>,

    /// Prefix used for feature branches.
    #[serde(default = "default_branch_prefix")]
    pub branch_prefix: String,

    /// Branch used for rolling releases.
    #[serde(default = "default_rolling_release")]
    pub rolling_release: Option<String>,

    /// Concrete suite substituted when building on the rolling release.
    #[serde(default = "default_rolling_release_replacement")]
    pub rolling_release_replacement: Option<String>,

    /// Comment embedded in the generated version suffix.
    #[serde(default = "default_comment")]
    pub comment: String,

    /// Urgency written in every changelog stanza header.
    #[serde(default = "default_urgency")]
    pub urgency: String,

    /// Repository-relative path of the optional version hint file.
    #[serde(default = "default_version_hint_file")]
    pub version_hint_file: String,

    /// Repository-relative path of the changelog to write (and to read
    /// the legacy starting version from).
    #[serde(default = "default_output")]
    pub output: String,
}

fn default_tag_prefixes() -> Vec<String> {
    vec!["droidian/".to_string(), "hybris-mobian/".to_string()]
}

fn default_branch_prefix() -> String {
    "feature/".to_string()
}

fn default_rolling_release() -> Option<String> {
    Some("droidian".to_string())
}

fn default_rolling_release_replacement() -> Option<String> {
    Some("trixie".to_string())
}

fn default_comment() -> String {
    "release".to_string()
}

fn default_urgency() -> String {
    "medium".to_string()
}

fn default_version_hint_file() -> String {
    "debian/version-hint".to_string()
}

fn default_output() -> String {
    "debian/changelog".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Config {
            tag_prefixes: default_tag_prefixes(),
            branch_prefix: default_branch_prefix(),
            rolling_release: default_rolling_release(),
            rolling_release_replacement: default_rolling_release_replacement(),
            comment: default_comment(),
            urgency: default_urgency(),
            version_hint_file: default_version_hint_file(),
            output: default_output(),
        }
    }
}

/// Loads configuration from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `gitchangelog.toml` in current directory
/// 3. `.gitchangelog.toml` in the user config directory
/// 4. Default configuration if no file found
///
/// # Arguments
/// * `config_path` - Optional path to custom configuration file
///
/// # Returns
/// * `Ok(Config)` - Loaded or default configuration
/// * `Err` - If a file exists but cannot be read or parsed
pub fn load_config(config_path: Option<&str>) -> Result<Config> {
    let config_str = if let Some(path) = config_path {
        fs::read_to_string(path)?
    } else if Path::new("./gitchangelog.toml").exists() {
        fs::read_to_string("./gitchangelog.toml")?
    } else if let Some(config_dir) = dirs::config_dir() {
        let config_path = config_dir.join(".gitchangelog.toml");
        if config_path.exists() {
            fs::read_to_string(config_path)?
        } else {
            return Ok(Config::default());
        }
    } else {
        return Ok(Config::default());
    };

    let config: Config = toml::from_str(&config_str)
        .map_err(|e| ChangelogError::config(format!("invalid configuration file: {}", e)))?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = Config::default();
        assert_eq!(
            config.tag_prefixes,
            vec!["droidian/".to_string(), "hybris-mobian/".to_string()]
        );
        assert_eq!(config.branch_prefix, "feature/");
        assert_eq!(config.rolling_release.as_deref(), Some("droidian"));
        assert_eq!(config.rolling_release_replacement.as_deref(), Some("trixie"));
        assert_eq!(config.comment, "release");
        assert_eq!(config.urgency, "medium");
        assert_eq!(config.output, "debian/changelog");
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
tag_prefixes = ["myproject/"]
comment = "nightly"
"#,
        )
        .unwrap();

        assert_eq!(config.tag_prefixes, vec!["myproject/".to_string()]);
        assert_eq!(config.comment, "nightly");
        // Untouched fields keep their defaults
        assert_eq!(config.branch_prefix, "feature/");
        assert_eq!(config.urgency, "medium");
    }

    #[test]
    fn test_empty_config_is_default() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
    }
}
