#[cfg(test)]
mod tests {
    use crate::config::GlobalConfig;
    use crate::secret_manager::{
        MockSecretManager, SecretManager, SecretManagerInfo, SecretManagerRegistry,
        reference_key, secret_managers,
    };
    use crate::{MoldError, Result};

    /// A backend with an identifier that prefixes `mock`.
    struct ShortManager;

    impl SecretManager for ShortManager {
        fn get_value(&self, _reference: &str) -> Result<String> {
            Ok("short".to_string())
        }

        fn identifier(&self) -> &'static str {
            "mo"
        }
    }

    #[test]
    fn test_reference_key_forms() {
        assert_eq!(reference_key("mock", "mock(\"test/foo\")"), "test/foo");
        assert_eq!(reference_key("mock", "mock(test/foo)"), "test/foo");
        assert_eq!(reference_key("mock", "mocktest/foo"), "test/foo");
        assert_eq!(reference_key("vault", "vault(\"a/b#c\")"), "a/b#c");

        // Unbalanced wrappers are left alone
        assert_eq!(reference_key("mock", "mock(test/foo"), "(test/foo");
        assert_eq!(reference_key("mock", "mock(\"test/foo)"), "\"test/foo");
        assert_eq!(reference_key("mock", "mock()"), "");
    }

    #[test]
    fn test_builtin_registry_contains_all_backends() {
        let registry = SecretManagerRegistry::builtin(&GlobalConfig::default()).unwrap();
        assert_eq!(registry.identifiers(), vec!["mock", "vault"]);
        assert_eq!(registry.len(), 2);
        assert!(!registry.is_empty());
    }

    #[test]
    fn test_secret_managers_metadata() {
        let infos = secret_managers();
        let identifiers: Vec<_> = infos.iter().map(|info| info.identifier).collect();
        assert_eq!(identifiers, vec!["mock", "vault"]);
        assert!(infos.iter().all(|info| !info.examples.is_empty()));
    }

    #[test]
    fn test_display_with_examples() {
        let info = SecretManagerInfo {
            identifier: "mock",
            description: "In-memory secrets",
            examples: &["mock(\"a\")", "mock(b)"],
        };
        assert_eq!(
            info.display_with_examples(),
            "mock: In-memory secrets (e.g., mock(\"a\"), mock(b))"
        );

        let info = SecretManagerInfo {
            identifier: "mock",
            description: "In-memory secrets",
            examples: &[],
        };
        assert_eq!(info.display_with_examples(), "mock: In-memory secrets");
    }

    #[test]
    fn test_mock_seeded_values() {
        let registry = SecretManagerRegistry::builtin(&GlobalConfig::default()).unwrap();
        assert_eq!(registry.resolve("mock(\"test/foo\")").unwrap(), "mock_bar");
        assert_eq!(registry.resolve("mock(test/creds)").unwrap(), "mock_creds");

        match registry.resolve("mock(\"test/nope\")") {
            Err(MoldError::SecretKeyMissing(key)) => assert_eq!(key, "test/nope"),
            other => panic!("Expected SecretKeyMissing, got {:?}", other),
        }
    }

    #[test]
    fn test_mock_with_explicit_values() {
        let manager = MockSecretManager::with_values([("k", "v")]);
        assert_eq!(manager.get_value("mock(\"k\")").unwrap(), "v");
        assert!(matches!(
            manager.get_value("mock(\"test/foo\")"),
            Err(MoldError::SecretKeyMissing(_))
        ));
    }

    #[test]
    fn test_lookup_unknown_prefix() {
        let mut registry = SecretManagerRegistry::new();
        registry.register(Box::new(MockSecretManager::with_values([("k", "v")])));

        match registry.lookup("plain value") {
            Err(MoldError::SecretManagerKeyNotFound(value)) => assert_eq!(value, "plain value"),
            Err(e) => panic!("Unexpected error: {}", e),
            Ok(manager) => panic!("Unexpected match: {}", manager.identifier()),
        }

        // Only prefixes count
        assert!(registry.lookup("not mock(\"k\")").is_err());
    }

    #[test]
    fn test_lookup_prefers_longest_identifier() {
        let mut registry = SecretManagerRegistry::new();
        registry.register(Box::new(ShortManager));
        registry.register(Box::new(MockSecretManager::with_values([("k", "v")])));

        assert_eq!(registry.lookup("mock(k)").unwrap().identifier(), "mock");
        assert_eq!(registry.lookup("more").unwrap().identifier(), "mo");
        assert_eq!(registry.resolve("mock(k)").unwrap(), "v");
    }

    #[test]
    fn test_register_replaces_same_identifier() {
        let mut registry = SecretManagerRegistry::new();
        assert!(
            registry
                .register(Box::new(MockSecretManager::with_values([("k", "first")])))
                .is_none()
        );

        let previous =
            registry.register(Box::new(MockSecretManager::with_values([("k", "second")])));
        assert!(previous.is_some());
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.resolve("mock(k)").unwrap(), "second");
    }

    #[test]
    fn test_registry_debug_lists_identifiers() {
        let mut registry = SecretManagerRegistry::new();
        registry.register(Box::new(ShortManager));
        assert_eq!(
            format!("{:?}", registry),
            "SecretManagerRegistry { identifiers: [\"mo\"] }"
        );
    }
}
