//! User configuration for envmold
//!
//! The optional configuration file lives in the platform config directory,
//! typically `~/.config/envmold/config.toml` on Linux:
//!
//! ```toml
//! [defaults]
//! template = "mold.yaml"
//! output = "stdout"
//! tags = ["backend"]
//! log_level = "info"
//!
//! [vault]
//! address = "http://127.0.0.1:8200"
//! mount = "secret"
//! timeout_secs = 5
//! ```
//!
//! Command line flags and environment variables take precedence over values
//! from this file.

use crate::Result;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Template path used when neither a flag nor the config file names one.
pub const DEFAULT_TEMPLATE: &str = "mold.yaml";

/// Output used when neither a flag nor the config file names one.
pub const DEFAULT_OUTPUT: &str = "stdout";

/// Global user configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// Default settings for a run
    #[serde(default)]
    pub defaults: Defaults,
    /// Settings for the vault secret manager
    #[serde(default)]
    pub vault: VaultSettings,
}

/// Default settings in the global configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Defaults {
    /// Template path to read when `--template` is not given
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<PathBuf>,
    /// Output (`stdout` or a file path) when `--output` is not given
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    /// Active tags when `--tags` is not given
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    /// Default log level (error, warn, info, debug, trace)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
}

/// Vault connection settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VaultSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mount: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl GlobalConfig {
    /// Get the path to the user's configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the platform configuration directory cannot be determined.
    pub fn path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("", "", "envmold").ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, "Could not find config directory")
        })?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Load the configuration from the default location.
    ///
    /// Returns `Ok(None)` when no configuration file exists.
    pub fn load() -> Result<Option<Self>> {
        Self::load_from(&Self::path()?)
    }

    /// Load the configuration from an explicit path.
    ///
    /// Returns `Ok(None)` when the file does not exist.
    pub fn load_from(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(path)?;
        Ok(Some(toml::from_str(&content)?))
    }

    /// The template path, preferring `flag` over the configured default.
    pub fn template(&self, flag: Option<PathBuf>) -> PathBuf {
        flag.or_else(|| self.defaults.template.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_TEMPLATE))
    }

    /// The output name, preferring `flag` over the configured default.
    pub fn output(&self, flag: Option<String>) -> String {
        flag.or_else(|| self.defaults.output.clone())
            .unwrap_or_else(|| DEFAULT_OUTPUT.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let config = GlobalConfig::load_from(&temp_dir.path().join("config.toml")).unwrap();
        assert!(config.is_none());
    }

    #[test]
    fn test_load_full_config() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
[defaults]
template = "envs/dev.yaml"
output = ".env"
tags = ["backend"]
log_level = "debug"

[vault]
address = "http://vault.internal:8200"
mount = "kv"
timeout_secs = 2
"#,
        )
        .unwrap();

        let config = GlobalConfig::load_from(&path).unwrap().unwrap();
        assert_eq!(config.template(None), PathBuf::from("envs/dev.yaml"));
        assert_eq!(config.output(None), ".env");
        assert_eq!(config.defaults.tags, Some(vec!["backend".to_string()]));
        assert_eq!(config.defaults.log_level.as_deref(), Some("debug"));
        assert_eq!(config.vault.mount.as_deref(), Some("kv"));
        assert_eq!(config.vault.timeout_secs, Some(2));
        assert!(config.vault.token.is_none());
    }

    #[test]
    fn test_flags_take_precedence() {
        let mut config = GlobalConfig::default();
        assert_eq!(config.template(None), PathBuf::from(DEFAULT_TEMPLATE));
        assert_eq!(config.output(None), DEFAULT_OUTPUT);

        config.defaults.output = Some("out.env".to_string());
        assert_eq!(config.output(Some("stdout".to_string())), "stdout");
        assert_eq!(config.output(None), "out.env");
    }

    #[test]
    fn test_invalid_toml() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "[defaults\n").unwrap();

        assert!(matches!(
            GlobalConfig::load_from(&path),
            Err(crate::MoldError::Toml(_))
        ));
    }
}
