//! Merge configuration
//!
//! Defaults, an optional TOML file, and CLI/environment overrides (applied
//! by the binary) are merged into one [`MergeConfig`], which must pass
//! [`MergeConfig::validate`] before any host call is made.

use crate::error::{Error, Result};
use crate::merge::BranchPolicy;
use serde::Deserialize;
use std::fs;
use std::ops::RangeInclusive;
use std::path::Path;
use std::time::Duration;

/// Valid values for `max-retries`
pub const MAX_RETRIES_RANGE: RangeInclusive<u32> = 0..=30;

/// Valid values for `retry-interval-secs`
pub const RETRY_INTERVAL_RANGE: RangeInclusive<u64> = 1..=60;

/// Settings for one merge-gate run
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct MergeConfig {
    /// Trigger word, e.g. `/merge`
    pub command: String,
    /// Prefix of release branches
    pub release_branch_prefix: String,
    /// Prefix of back-merge branches
    pub sync_branch_prefix: String,
    /// Integration branch name
    pub develop_branch: String,
    /// Extra fetches while mergeability is pending
    pub max_retries: u32,
    /// Seconds between those fetches
    pub retry_interval_secs: u64,
}

impl Default for MergeConfig {
    fn default() -> Self {
        let branches = BranchPolicy::default();
        Self {
            command: "/merge".to_string(),
            release_branch_prefix: branches.release_prefix,
            sync_branch_prefix: branches.sync_prefix,
            develop_branch: branches.develop_branch,
            max_retries: 5,
            retry_interval_secs: 5,
        }
    }
}

/// Bounded retry policy for the mergeability wait
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Extra fetches after the first pending one
    pub max_retries: u32,
    /// Sleep between fetches
    pub interval: Duration,
}

impl MergeConfig {
    /// Parse a TOML document; missing keys keep their defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load a TOML config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            Error::config("config", path.display(), format!("a readable TOML file ({e})"))
        })?;
        Self::from_toml_str(&content)
    }

    /// Reject out-of-range or empty values
    pub fn validate(&self) -> Result<()> {
        if !MAX_RETRIES_RANGE.contains(&self.max_retries) {
            return Err(Error::config(
                "max-retries",
                self.max_retries,
                range_text(&MAX_RETRIES_RANGE),
            ));
        }
        if !RETRY_INTERVAL_RANGE.contains(&self.retry_interval_secs) {
            return Err(Error::config(
                "retry-interval-secs",
                self.retry_interval_secs,
                range_text(&RETRY_INTERVAL_RANGE),
            ));
        }
        if !self.command.starts_with('/')
            || self.command.len() < 2
            || self.command.chars().any(char::is_whitespace)
        {
            return Err(Error::config(
                "command",
                format!("{:?}", self.command),
                "a single word starting with '/'",
            ));
        }
        for (field, value) in [
            ("release-branch-prefix", &self.release_branch_prefix),
            ("sync-branch-prefix", &self.sync_branch_prefix),
            ("develop-branch", &self.develop_branch),
        ] {
            if value.trim().is_empty() {
                return Err(Error::config(field, "\"\"", "a non-empty branch name"));
            }
        }
        Ok(())
    }

    /// Retry policy for the merge executor
    pub const fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            interval: Duration::from_secs(self.retry_interval_secs),
        }
    }

    /// Branch conventions for the merge method resolver
    pub fn branch_policy(&self) -> BranchPolicy {
        BranchPolicy {
            release_prefix: self.release_branch_prefix.clone(),
            sync_prefix: self.sync_branch_prefix.clone(),
            develop_branch: self.develop_branch.clone(),
        }
    }
}

/// Values supplied on the command line or through the environment
///
/// Numeric fields stay as text so malformed input is reported with the
/// offending value instead of a generic parse failure.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    /// Trigger word
    pub command: Option<String>,
    /// Release branch prefix
    pub release_branch_prefix: Option<String>,
    /// Back-merge branch prefix
    pub sync_branch_prefix: Option<String>,
    /// Integration branch
    pub develop_branch: Option<String>,
    /// Max retries, unparsed
    pub max_retries: Option<String>,
    /// Retry interval in seconds, unparsed
    pub retry_interval_secs: Option<String>,
}

impl ConfigOverrides {
    /// Apply every present override on top of `config`
    pub fn apply(&self, config: &mut MergeConfig) -> Result<()> {
        let text = |value: &Option<String>| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(String::from)
        };

        if let Some(command) = text(&self.command) {
            config.command = command;
        }
        if let Some(prefix) = text(&self.release_branch_prefix) {
            config.release_branch_prefix = prefix;
        }
        if let Some(prefix) = text(&self.sync_branch_prefix) {
            config.sync_branch_prefix = prefix;
        }
        if let Some(branch) = text(&self.develop_branch) {
            config.develop_branch = branch;
        }
        if let Some(raw) = text(&self.max_retries) {
            config.max_retries = raw
                .parse()
                .map_err(|_| Error::config("max-retries", &raw, range_text(&MAX_RETRIES_RANGE)))?;
        }
        if let Some(raw) = text(&self.retry_interval_secs) {
            config.retry_interval_secs = raw.parse().map_err(|_| {
                Error::config("retry-interval-secs", &raw, range_text(&RETRY_INTERVAL_RANGE))
            })?;
        }
        Ok(())
    }
}

/// Defaults, then the optional TOML file, then overrides; validated
pub fn resolve_config(path: Option<&Path>, overrides: &ConfigOverrides) -> Result<MergeConfig> {
    let mut config = match path {
        Some(path) => MergeConfig::load(path)?,
        None => MergeConfig::default(),
    };
    overrides.apply(&mut config)?;
    config.validate()?;
    Ok(config)
}

fn range_text<T: std::fmt::Display>(range: &RangeInclusive<T>) -> String {
    format!("a value between {} and {}", range.start(), range.end())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_are_valid() {
        let config = MergeConfig::default();
        config.validate().unwrap();
        assert_eq!(config.command, "/merge");
        assert_eq!(config.retry_policy().interval, Duration::from_secs(5));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = MergeConfig::from_toml_str("develop-branch = \"dev\"\nmax-retries = 2\n").unwrap();
        assert_eq!(config.develop_branch, "dev");
        assert_eq!(config.max_retries, 2);
        assert_eq!(config.release_branch_prefix, "release/");
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = MergeConfig::from_toml_str("max-retry = 2").unwrap_err();
        assert!(matches!(err, Error::TomlParse(_)));
    }

    #[test]
    fn test_retries_out_of_range_names_value_and_range() {
        let config = MergeConfig {
            max_retries: 45,
            ..MergeConfig::default()
        };
        let err = config.validate().unwrap_err();
        let text = err.to_string();
        assert!(text.contains("max-retries"), "{text}");
        assert!(text.contains("45"), "{text}");
        assert!(text.contains("between 0 and 30"), "{text}");
    }

    #[test]
    fn test_zero_interval_rejected() {
        let config = MergeConfig {
            retry_interval_secs: 0,
            ..MergeConfig::default()
        };
        match config.validate() {
            Err(Error::Config { field, value, .. }) => {
                assert_eq!(field, "retry-interval-secs");
                assert_eq!(value, "0");
            }
            other => panic!("Expected Config error, got: {other:?}"),
        }
    }

    #[test]
    fn test_command_with_space_rejected() {
        let config = MergeConfig {
            command: "/merge now".to_string(),
            ..MergeConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("merge-gate.toml");
        fs::write(&path, "command = \"/ship\"\nsync-branch-prefix = \"backmerge/\"\n").unwrap();

        let config = MergeConfig::load(&path).unwrap();
        assert_eq!(config.command, "/ship");
        assert_eq!(config.branch_policy().sync_prefix, "backmerge/");
    }

    #[test]
    fn test_overrides_beat_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("merge-gate.toml");
        fs::write(&path, "develop-branch = \"dev\"\nmax-retries = 2\n").unwrap();

        let overrides = ConfigOverrides {
            max_retries: Some("7".to_string()),
            command: Some(String::new()),
            ..ConfigOverrides::default()
        };
        let config = resolve_config(Some(&path), &overrides).unwrap();
        assert_eq!(config.develop_branch, "dev");
        assert_eq!(config.max_retries, 7);
        assert_eq!(config.command, "/merge");
    }

    #[test]
    fn test_negative_override_is_config_error() {
        let overrides = ConfigOverrides {
            max_retries: Some("-3".to_string()),
            ..ConfigOverrides::default()
        };
        let err = resolve_config(None, &overrides).unwrap_err();
        assert!(err.is_config());
        let text = err.to_string();
        assert!(text.contains("-3"), "{text}");
        assert!(text.contains("between 0 and 30"), "{text}");
    }

    #[test]
    fn test_non_numeric_interval_rejected() {
        let overrides = ConfigOverrides {
            retry_interval_secs: Some("soon".to_string()),
            ..ConfigOverrides::default()
        };
        match resolve_config(None, &overrides) {
            Err(Error::Config { field, value, .. }) => {
                assert_eq!(field, "retry-interval-secs");
                assert_eq!(value, "soon");
            }
            other => panic!("Expected Config error, got: {other:?}"),
        }
    }
}
