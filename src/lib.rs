//! # envmold
//!
//! envmold turns a declarative template of typed variables into shell
//! `export` lines. Each variable takes its value from the template default,
//! from a human at the prompt, or from a secret manager the value references.
//!
//! ## Example
//!
//! ```rust,ignore
//! use envmold::{LinePrompt, Mold, SecretManagerRegistry, StdoutWriter};
//!
//! let registry = SecretManagerRegistry::builtin(&Default::default())?;
//! let mut mold = Mold::from_path("mold.yaml".as_ref(), None)?;
//! mold.generate(&registry, &mut LinePrompt::stdio())?;
//! mold.write_environment(&mut StdoutWriter)?;
//! ```
//!
//! ## Modules
//!
//! - [`mold`]: the variable store
//! - [`resolver`]: per-variable resolution
//! - [`secret_manager`]: secret manager backends and their registry
//! - [`prompt`]: the prompt channel
//! - [`writer`]: `export` line serialization
//! - [`config`]: the user configuration file
//! - [`logging`]: subscriber setup for the binary

pub mod config;
pub mod error;
pub mod logging;
pub mod mold;
pub mod prompt;
pub mod resolver;
pub mod secret_manager;
pub mod writer;

pub use config::GlobalConfig;
pub use error::{MoldError, Result};
pub use mold::Mold;
pub use prompt::{LinePrompt, Prompt};
pub use resolver::{Resolution, Resolver};
pub use secret_manager::{SecretManager, SecretManagerRegistry};
pub use writer::{FileWriter, Output, StdoutWriter, Writer};

// Re-export the variable model for convenience
pub use envmold_core::{DataType, Number, ParseError, TagFilter, Template, Value, Variable};
