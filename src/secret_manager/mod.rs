//! # Secret managers
//!
//! A template value can point at an external secret instead of carrying a
//! literal. Such a value starts with the identifier of a registered secret
//! manager, optionally followed by a parenthesized and quoted key:
//!
//! ```text
//! mock("test/foo")
//! vault("app/database#password")
//! vault(app/database#password)
//! ```
//!
//! The [`SecretManagerRegistry`] maps identifiers to [`SecretManager`]
//! implementations. It is built once at startup and handed to the resolver;
//! nothing reaches it through global state.
//!
//! ## Available secret managers
//!
//! - [`MockSecretManager`]: in-memory values, for tests and demos
//! - [`VaultSecretManager`]: HashiCorp Vault KV version 2
//!
//! ## Example
//!
//! ```rust,ignore
//! use envmold::secret_manager::SecretManagerRegistry;
//!
//! let registry = SecretManagerRegistry::builtin(&config)?;
//! let value = registry.resolve("mock(\"test/foo\")")?;
//! assert_eq!(value, "mock_bar");
//! ```

use crate::{MoldError, Result};
use crate::config::GlobalConfig;
use std::fmt;

pub mod mock;
pub mod vault;
#[macro_use]
pub mod macros;

#[cfg(test)]
pub(crate) mod tests;

pub use mock::{MockConfig, MockSecretManager};
pub use vault::{VaultConfig, VaultSecretManager};

/// Information about a built-in secret manager.
#[derive(Debug, Clone)]
pub struct SecretManagerInfo {
    /// The identifier a value has to start with (e.g., "mock", "vault").
    pub identifier: &'static str,
    /// A human-readable description of the backend.
    pub description: &'static str,
    /// Example references.
    pub examples: &'static [&'static str],
}

impl SecretManagerInfo {
    /// Formats the information for display, including examples if available.
    pub fn display_with_examples(&self) -> String {
        if self.examples.is_empty() {
            format!("{}: {}", self.identifier, self.description)
        } else {
            format!(
                "{}: {} (e.g., {})",
                self.identifier,
                self.description,
                self.examples.join(", ")
            )
        }
    }
}

pub use macros::{BUILTINS, Builtin};

/// Returns the built-in secret managers with their metadata, sorted by identifier.
pub fn secret_managers() -> Vec<SecretManagerInfo> {
    let mut infos: Vec<SecretManagerInfo> =
        BUILTINS.iter().map(|builtin| builtin.info.clone()).collect();
    infos.sort_by_key(|info| info.identifier);
    infos
}

/// A backend able to turn a secret reference into a value.
///
/// Implementations receive the full reference as written in the template
/// (identifier included) and derive their lookup key with [`reference_key`].
/// Backends may initialize lazily on first use; they are only ever driven from
/// a single resolution pass.
pub trait SecretManager: Send + Sync {
    /// Resolves `reference` to its secret value.
    ///
    /// # Errors
    ///
    /// Returns [`MoldError::SecretKeyMissing`] when the backend has no entry for
    /// the derived key. Other errors (connection failures, bad configuration)
    /// are fatal for the run.
    fn get_value(&self, reference: &str) -> Result<String>;

    /// The identifier this backend is registered under.
    fn identifier(&self) -> &'static str;
}

/// Extracts the backend lookup key from a reference.
///
/// Strips `identifier`, then one pair of surrounding parentheses, then one
/// pair of surrounding double quotes:
///
/// ```rust,ignore
/// assert_eq!(reference_key("mock", "mock(\"test/foo\")"), "test/foo");
/// assert_eq!(reference_key("mock", "mock(test/foo)"), "test/foo");
/// assert_eq!(reference_key("mock", "mocktest/foo"), "test/foo");
/// ```
pub fn reference_key<'a>(identifier: &str, reference: &'a str) -> &'a str {
    let key = reference.strip_prefix(identifier).unwrap_or(reference);
    let key = key
        .strip_prefix('(')
        .and_then(|k| k.strip_suffix(')'))
        .unwrap_or(key);
    key.strip_prefix('"')
        .and_then(|k| k.strip_suffix('"'))
        .unwrap_or(key)
}

/// Maps identifiers to secret manager backends.
///
/// Identifiers should not be prefixes of one another. When they are, the
/// longest matching identifier wins.
#[derive(Default)]
pub struct SecretManagerRegistry {
    managers: Vec<Box<dyn SecretManager>>,
}

impl SecretManagerRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding every built-in secret manager.
    ///
    /// # Errors
    ///
    /// Returns an error if a backend rejects its configuration (for example
    /// an unparsable vault address).
    pub fn builtin(config: &GlobalConfig) -> Result<Self> {
        let mut builtins: Vec<&Builtin> = BUILTINS.iter().collect();
        builtins.sort_by_key(|builtin| builtin.info.identifier);

        let mut registry = Self::new();
        for builtin in builtins {
            registry.register(builtin.build(config)?);
        }
        Ok(registry)
    }

    /// Registers `manager` under its identifier.
    ///
    /// Returns the backend previously registered under the same identifier, if any.
    pub fn register(&mut self, manager: Box<dyn SecretManager>) -> Option<Box<dyn SecretManager>> {
        let identifier = manager.identifier();
        match self
            .managers
            .iter()
            .position(|m| m.identifier() == identifier)
        {
            Some(index) => Some(std::mem::replace(&mut self.managers[index], manager)),
            None => {
                self.managers.push(manager);
                None
            }
        }
    }

    /// Finds the backend whose identifier prefixes `value`.
    ///
    /// # Errors
    ///
    /// Returns [`MoldError::SecretManagerKeyNotFound`] when no identifier matches.
    pub fn lookup(&self, value: &str) -> Result<&dyn SecretManager> {
        self.managers
            .iter()
            .filter(|m| value.starts_with(m.identifier()))
            .max_by_key(|m| m.identifier().len())
            .map(|m| &**m)
            .ok_or_else(|| MoldError::SecretManagerKeyNotFound(value.to_string()))
    }

    /// Looks up the backend for `reference` and resolves it.
    pub fn resolve(&self, reference: &str) -> Result<String> {
        self.lookup(reference)?.get_value(reference)
    }

    /// The registered identifiers, in registration order.
    pub fn identifiers(&self) -> Vec<&'static str> {
        self.managers.iter().map(|m| m.identifier()).collect()
    }

    pub fn len(&self) -> usize {
        self.managers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.managers.is_empty()
    }
}

impl fmt::Debug for SecretManagerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretManagerRegistry")
            .field("identifiers", &self.identifiers())
            .finish()
    }
}
