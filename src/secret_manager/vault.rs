use super::{SecretManager, reference_key};
use crate::config::{GlobalConfig, VaultSettings};
use crate::{MoldError, Result};
use reqwest::StatusCode;
use reqwest::blocking::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::env;
use std::sync::OnceLock;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Configuration for the vault secret manager.
///
/// Resolution order for each setting: environment (`VAULT_ADDR`,
/// `VAULT_TOKEN`), then the `[vault]` table of the config file, then the
/// defaults below.
#[derive(Debug, Clone)]
pub struct VaultConfig {
    /// Base address of the vault server
    pub address: Url,
    /// Mount point of the KV version 2 engine
    pub mount: String,
    /// Token sent as `X-Vault-Token`
    pub token: Option<String>,
    /// Timeout applied to every request
    pub timeout: Duration,
}

impl VaultConfig {
    pub const DEFAULT_ADDRESS: &'static str = "http://127.0.0.1:8200";
    pub const DEFAULT_MOUNT: &'static str = "secret";
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

    /// Builds the configuration from file settings and environment overrides.
    pub fn from_settings(
        settings: &VaultSettings,
        env_address: Option<String>,
        env_token: Option<String>,
    ) -> Result<Self> {
        let address = env_address
            .or_else(|| settings.address.clone())
            .unwrap_or_else(|| Self::DEFAULT_ADDRESS.to_string());
        let address = Url::parse(&address).map_err(|e| {
            MoldError::SecretManagerFailed(format!("Invalid vault address '{}': {}", address, e))
        })?;

        Ok(Self {
            address,
            mount: settings
                .mount
                .clone()
                .unwrap_or_else(|| Self::DEFAULT_MOUNT.to_string()),
            token: env_token.or_else(|| settings.token.clone()),
            timeout: settings
                .timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(Self::DEFAULT_TIMEOUT),
        })
    }

    /// The KV v2 read endpoint for the secret at `path`.
    fn secret_url(&self, path: &str) -> Result<Url> {
        let endpoint = format!(
            "v1/{}/data/{}",
            self.mount.trim_matches('/'),
            path.trim_start_matches('/')
        );
        self.address.join(&endpoint).map_err(|e| {
            MoldError::SecretManagerFailed(format!("Invalid vault path '{}': {}", path, e))
        })
    }
}

impl TryFrom<&GlobalConfig> for VaultConfig {
    type Error = MoldError;

    fn try_from(config: &GlobalConfig) -> Result<Self> {
        Self::from_settings(
            &config.vault,
            env::var("VAULT_ADDR").ok(),
            env::var("VAULT_TOKEN").ok(),
        )
    }
}

#[derive(Debug, Deserialize)]
struct KvV2Response {
    data: KvV2Data,
}

#[derive(Debug, Deserialize)]
struct KvV2Data {
    data: HashMap<String, serde_json::Value>,
}

/// Splits `path#field` into its parts. Without `#` the key names both.
pub(crate) fn split_key(key: &str) -> (&str, &str) {
    key.split_once('#').unwrap_or((key, key))
}

/// Reads secrets from a HashiCorp Vault KV version 2 engine.
///
/// A reference `vault("app/db#password")` reads the secret `app/db` and
/// returns its `password` field. The HTTP client is created on first use;
/// requests time out after [`VaultConfig::timeout`] and are never retried.
pub struct VaultSecretManager {
    config: VaultConfig,
    client: OnceLock<Client>,
}

crate::register_secret_manager! {
    struct: VaultSecretManager,
    config: VaultConfig,
    identifier: "vault",
    description: "HashiCorp Vault KV version 2",
    examples: ["vault(\"app/database#password\")"],
}

impl VaultSecretManager {
    pub fn new(config: VaultConfig) -> Self {
        Self {
            config,
            client: OnceLock::new(),
        }
    }

    fn client(&self) -> Result<&Client> {
        if let Some(client) = self.client.get() {
            return Ok(client);
        }

        let client = Client::builder()
            .timeout(self.config.timeout)
            .connect_timeout(self.config.timeout)
            .build()
            .map_err(|e| {
                MoldError::SecretManagerFailed(format!("Failed to create HTTP client: {}", e))
            })?;
        Ok(self.client.get_or_init(|| client))
    }
}

impl SecretManager for VaultSecretManager {
    fn get_value(&self, reference: &str) -> Result<String> {
        let key = reference_key(Self::IDENTIFIER, reference);
        let (path, field) = split_key(key);

        let token = self.config.token.as_deref().ok_or_else(|| {
            MoldError::SecretManagerFailed(
                "No vault token available. Set VAULT_TOKEN or [vault] token in the config file"
                    .to_string(),
            )
        })?;
        let url = self.config.secret_url(path)?;

        debug!(path, field, "Reading secret from vault");
        let response = self
            .client()?
            .get(url)
            .header("X-Vault-Token", token)
            .send()
            .map_err(|e| MoldError::SecretManagerFailed(format!("Request to vault failed: {}", e)))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(MoldError::SecretKeyMissing(key.to_string()));
        }

        let body = response.text().map_err(|e| {
            MoldError::SecretManagerFailed(format!("Failed to read vault response: {}", e))
        })?;
        if !status.is_success() {
            return Err(MoldError::SecretManagerFailed(format!(
                "Vault returned {}: {}",
                status,
                body.trim()
            )));
        }

        let secret: KvV2Response = serde_json::from_str(&body)?;
        secret
            .data
            .data
            .get(field)
            .and_then(|value| value.as_str())
            .map(str::to_string)
            .ok_or_else(|| MoldError::SecretKeyMissing(key.to_string()))
    }

    fn identifier(&self) -> &'static str {
        Self::IDENTIFIER
    }
}
