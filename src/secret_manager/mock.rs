use super::{SecretManager, reference_key};
use crate::config::GlobalConfig;
use crate::{MoldError, Result};
use std::collections::HashMap;
use std::sync::OnceLock;

/// Configuration for the mock secret manager.
///
/// The mock backend takes no settings; the type exists so the backend can be
/// registered like every other secret manager.
#[derive(Debug, Clone, Default)]
pub struct MockConfig {}

impl TryFrom<&GlobalConfig> for MockConfig {
    type Error = MoldError;

    fn try_from(_config: &GlobalConfig) -> Result<Self> {
        Ok(Self::default())
    }
}

/// An in-memory secret manager.
///
/// Unless constructed with explicit values, the store is seeded on first use
/// with:
///
/// | key          | value        |
/// |--------------|--------------|
/// | `test/foo`   | `mock_bar`   |
/// | `test/creds` | `mock_creds` |
pub struct MockSecretManager {
    values: OnceLock<HashMap<String, String>>,
}

crate::register_secret_manager! {
    struct: MockSecretManager,
    config: MockConfig,
    identifier: "mock",
    description: "In-memory secrets for tests and demos",
    examples: ["mock(\"test/foo\")"],
}

impl MockSecretManager {
    pub fn new(_config: MockConfig) -> Self {
        Self {
            values: OnceLock::new(),
        }
    }

    /// Creates a mock backend holding exactly `values`.
    pub fn with_values<I, K, V>(values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let values: HashMap<String, String> = values
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            values: OnceLock::from(values),
        }
    }

    fn seed() -> HashMap<String, String> {
        HashMap::from([
            ("test/foo".to_string(), "mock_bar".to_string()),
            ("test/creds".to_string(), "mock_creds".to_string()),
        ])
    }

    fn values(&self) -> &HashMap<String, String> {
        self.values.get_or_init(Self::seed)
    }
}

impl SecretManager for MockSecretManager {
    fn get_value(&self, reference: &str) -> Result<String> {
        let key = reference_key(Self::IDENTIFIER, reference);
        self.values()
            .get(key)
            .cloned()
            .ok_or_else(|| MoldError::SecretKeyMissing(key.to_string()))
    }

    fn identifier(&self) -> &'static str {
        Self::IDENTIFIER
    }
}
