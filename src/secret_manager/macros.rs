use super::{SecretManager, SecretManagerInfo};
use crate::Result;
use crate::config::GlobalConfig;

/// A built-in backend: its metadata and how to construct it.
#[doc(hidden)]
pub struct Builtin {
    pub info: SecretManagerInfo,
    pub build: fn(&GlobalConfig) -> Result<Box<dyn SecretManager>>,
}

impl Builtin {
    /// Constructs the backend from the user configuration.
    pub fn build(&self, config: &GlobalConfig) -> Result<Box<dyn SecretManager>> {
        (self.build)(config)
    }
}

/// Every backend declared with [`register_secret_manager!`], gathered at link time.
#[doc(hidden)]
#[linkme::distributed_slice]
pub static BUILTINS: [Builtin];

/// Adds a backend to [`BUILTINS`] and gives it an `IDENTIFIER` constant.
///
/// ```ignore
/// register_secret_manager! {
///     struct: MockSecretManager,
///     config: MockConfig,
///     identifier: "mock",
///     description: "In-memory secrets for tests and demos",
///     examples: ["mock(\"test/foo\")"],
/// }
/// ```
///
/// `config` is built with `TryFrom<&GlobalConfig>` and handed to `new`.
#[doc(hidden)]
#[macro_export]
macro_rules! register_secret_manager {
    (
        struct: $backend:ident,
        config: $config:ty,
        identifier: $identifier:expr,
        description: $description:expr,
        examples: [$($example:expr),* $(,)?] $(,)?
    ) => {
        impl $backend {
            pub const IDENTIFIER: &'static str = $identifier;
        }

        const _: () = {
            #[linkme::distributed_slice($crate::secret_manager::BUILTINS)]
            static BUILTIN: $crate::secret_manager::Builtin = $crate::secret_manager::Builtin {
                info: $crate::secret_manager::SecretManagerInfo {
                    identifier: $identifier,
                    description: $description,
                    examples: &[$($example,)*],
                },
                build: |config| Ok(Box::new(<$backend>::new(<$config>::try_from(config)?))),
            };
        };
    };
}
