//! Per-variable value resolution.
//!
//! Each variable goes through the same steps, in template order:
//!
//! 1. A string value that starts with a registered secret manager identifier
//!    is replaced by the secret it references.
//! 2. Optional variables keep their default.
//! 3. Required variables with a non-empty default ask whether to overwrite it;
//!    answering `no` or `n` keeps the default.
//! 4. Otherwise a value is read from the prompt and converted to the declared
//!    type.

use crate::prompt::Prompt;
use crate::secret_manager::SecretManagerRegistry;
use crate::{MoldError, Result};
use envmold_core::{DataType, Number, Value, Variable};
use tracing::debug;

/// How a variable obtained its final value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Replaced by a secret manager lookup
    Secret,
    /// Optional, default left untouched
    Optional,
    /// Required, the user chose to keep the default
    Kept,
    /// Read from the prompt
    Prompted,
}

/// Resolves variables against a secret manager registry and a prompt.
pub struct Resolver<'a> {
    registry: &'a SecretManagerRegistry,
    prompt: &'a mut dyn Prompt,
}

impl<'a> Resolver<'a> {
    pub fn new(registry: &'a SecretManagerRegistry, prompt: &'a mut dyn Prompt) -> Self {
        Self { registry, prompt }
    }

    /// Resolves every variable in order, stopping at the first error.
    pub fn resolve_all<'v, I>(&mut self, variables: I) -> Result<()>
    where
        I: IntoIterator<Item = &'v mut Variable>,
    {
        for variable in variables {
            self.resolve(variable)?;
        }
        Ok(())
    }

    /// Resolves a single variable, storing the result in `variable.value`.
    ///
    /// # Errors
    ///
    /// Secret manager failures other than an unmatched prefix, prompt I/O
    /// errors and unparsable input for number or boolean variables.
    pub fn resolve(&mut self, variable: &mut Variable) -> Result<Resolution> {
        if let Some(secret) = self.lookup_secret(variable)? {
            debug!(name = %variable.name, "Resolved from secret manager");
            variable.value = Value::String(secret);
            return Ok(Resolution::Secret);
        }

        if !variable.required {
            debug!(name = %variable.name, "Optional, keeping default");
            return Ok(Resolution::Optional);
        }

        if !variable.value.is_empty() && !self.confirm_overwrite(variable)? {
            self.prompt.notice("Skipping...")?;
            debug!(name = %variable.name, "Keeping default");
            return Ok(Resolution::Kept);
        }

        self.prompt.write_prompt(&format!(
            "Enter a value for {} (type={}): ",
            variable.name, variable.data_type
        ))?;
        let input = self.prompt.read_line()?.unwrap_or_default();
        variable.value = coerce(&variable.name, variable.data_type, input.trim())?;
        debug!(name = %variable.name, "Read value from prompt");
        Ok(Resolution::Prompted)
    }

    fn lookup_secret(&self, variable: &Variable) -> Result<Option<String>> {
        let Some(reference) = variable.value.as_str() else {
            return Ok(None);
        };

        match self.registry.lookup(reference) {
            Ok(manager) => manager.get_value(reference).map(Some),
            Err(MoldError::SecretManagerKeyNotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn confirm_overwrite(&mut self, variable: &Variable) -> Result<bool> {
        self.prompt.write_prompt(&format!(
            "'{}' is a required field, with the value of '{}'. Would you like to overwrite this value (yes/no)? ",
            variable.name, variable.value
        ))?;
        let answer = self.prompt.read_line()?.unwrap_or_default();
        Ok(!matches!(answer.trim(), "no" | "n"))
    }
}

/// Converts prompt input to a value of the declared type.
pub(crate) fn coerce(name: &str, data_type: DataType, input: &str) -> Result<Value> {
    match data_type {
        DataType::String => Ok(Value::String(input.to_string())),
        DataType::Number => parse_number(input)
            .map(Value::Number)
            .ok_or_else(|| MoldError::InvalidNumber {
                name: name.to_string(),
                input: input.to_string(),
            }),
        DataType::Boolean => parse_bool(input)
            .map(Value::Boolean)
            .ok_or_else(|| MoldError::InvalidBoolean {
                name: name.to_string(),
                input: input.to_string(),
            }),
    }
}

/// Parses plain base-10 text. Text containing `.` becomes a float.
///
/// Exponents, hex and digit separators are rejected.
pub(crate) fn parse_number(input: &str) -> Option<Number> {
    let digits = input.strip_prefix(['+', '-']).unwrap_or(input);
    let plain = digits.chars().any(|c| c.is_ascii_digit())
        && digits.chars().all(|c| c.is_ascii_digit() || c == '.')
        && digits.matches('.').count() <= 1;
    if !plain {
        return None;
    }

    if input.contains('.') {
        input.parse().ok().map(Number::Float)
    } else {
        input.parse().ok().map(Number::Integer)
    }
}

pub(crate) fn parse_bool(input: &str) -> Option<bool> {
    match input {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}
