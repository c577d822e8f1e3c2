//! Error types for envmold operations

use std::path::PathBuf;
use thiserror::Error;

// Internal use only
use envmold_core::ParseError;

/// The main error type for envmold operations
///
/// Parsing, validation and resolution errors abort a run. Lookups of unknown
/// variables ([`MoldError::EnvironmentVariableDoesNotExist`]) are ordinary
/// results the caller may recover from.
#[derive(Error, Debug)]
pub enum MoldError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("No mold template found at {}", .0.display())]
    NoTemplate(PathBuf),
    #[error("missing environment variable name")]
    MissingVariableName,
    #[error(
        "value of '{name}' does not implement the required type (type={declared}, value is {found})"
    )]
    InvalidDataType {
        name: String,
        declared: String,
        found: String,
    },
    #[error("environment variable '{0}' does not exist")]
    EnvironmentVariableDoesNotExist(String),
    #[error("mold variables are empty")]
    EmptyMold,
    #[error("'{0}' does not reference a registered secret manager")]
    SecretManagerKeyNotFound(String),
    #[error("secret key '{0}' does not exist")]
    SecretKeyMissing(String),
    #[error("Secret manager operation failed: {0}")]
    SecretManagerFailed(String),
    #[error("'{input}' is not a valid number for '{name}'")]
    InvalidNumber { name: String, input: String },
    #[error("'{input}' is not a valid boolean for '{name}'")]
    InvalidBoolean { name: String, input: String },
}

/// A type alias for `Result<T, MoldError>`
pub type Result<T> = std::result::Result<T, MoldError>;

impl From<ParseError> for MoldError {
    fn from(err: ParseError) -> Self {
        match err {
            ParseError::Io(io_err) => MoldError::Io(io_err),
            ParseError::Yaml(yaml_err) => MoldError::Yaml(yaml_err),
            ParseError::MissingVariableName => MoldError::MissingVariableName,
            ParseError::InvalidDataType {
                name,
                declared,
                found,
            } => MoldError::InvalidDataType {
                name,
                declared,
                found,
            },
        }
    }
}
