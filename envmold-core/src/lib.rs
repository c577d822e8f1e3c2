//! # envmold core
//!
//! This crate provides the variable model and the template parser for envmold.
//!
//! A mold template is a YAML sequence of variable declarations. Every declaration
//! names a variable, gives it a type and, optionally, a default value, a required
//! flag and a set of tags:
//!
//! ```yaml
//! - name: database_url
//!   value: mock("test/foo")
//!   type: string
//!   required: false
//!
//! - name: port
//!   value: 5432
//!   type: number
//!   required: true
//!   tags: [backend]
//! ```
//!
//! Parsing validates every declaration (non-empty name, default value matching
//! the declared type) and drops declarations whose tags do not intersect the
//! active [`TagFilter`].

use serde::Deserialize;
use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::fs;
use std::io::{self, Read};
use std::path::Path;
use std::str::FromStr;

/// The declared type of a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    /// Free-form text
    String,
    /// Integer or floating point number
    Number,
    /// `true` or `false`
    Boolean,
}

impl DataType {
    /// Get the string representation of this type, as written in templates.
    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::String => "string",
            DataType::Number => "number",
            DataType::Boolean => "boolean",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "string" => Ok(DataType::String),
            "number" => Ok(DataType::Number),
            "boolean" => Ok(DataType::Boolean),
            _ => Err(format!("Unknown data type: {}", s)),
        }
    }
}

/// A numeric value, keeping track of whether it was written as an integer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Integer(i64),
    Float(f64),
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Integer(n) => write!(f, "{}", n),
            Number::Float(n) => write!(f, "{}", n),
        }
    }
}

/// The value held by a variable.
///
/// `Absent` stands for a declaration without a default (`value` omitted or `~`).
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Absent,
    String(String),
    Number(Number),
    Boolean(bool),
}

impl Value {
    /// The type tag matching this value, or `None` when the value is absent.
    pub fn data_type(&self) -> Option<DataType> {
        match self {
            Value::Absent => None,
            Value::String(_) => Some(DataType::String),
            Value::Number(_) => Some(DataType::Number),
            Value::Boolean(_) => Some(DataType::Boolean),
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Value::Absent)
    }

    /// Returns true for an absent value or an empty string.
    pub fn is_empty(&self) -> bool {
        match self {
            Value::Absent => true,
            Value::String(s) => s.is_empty(),
            _ => false,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Converts a raw YAML scalar into a value.
    ///
    /// Returns the YAML kind name on failure so callers can report it.
    fn from_yaml(value: serde_yaml::Value) -> Result<Self, &'static str> {
        match value {
            serde_yaml::Value::Null => Ok(Value::Absent),
            serde_yaml::Value::Bool(b) => Ok(Value::Boolean(b)),
            serde_yaml::Value::String(s) => Ok(Value::String(s)),
            serde_yaml::Value::Number(n) => match n.as_i64() {
                Some(i) => Ok(Value::Number(Number::Integer(i))),
                None => n
                    .as_f64()
                    .map(|f| Value::Number(Number::Float(f)))
                    .ok_or("number"),
            },
            serde_yaml::Value::Sequence(_) => Err("sequence"),
            serde_yaml::Value::Mapping(_) => Err("mapping"),
            serde_yaml::Value::Tagged(tagged) => Value::from_yaml(tagged.value),
        }
    }

    fn kind(&self) -> &'static str {
        match self.data_type() {
            Some(data_type) => data_type.as_str(),
            None => "absent",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Absent => Ok(()),
            Value::String(s) => f.write_str(s),
            Value::Number(n) => write!(f, "{}", n),
            Value::Boolean(b) => write!(f, "{}", b),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(Number::Integer(n))
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(Number::Float(n))
    }
}

/// A single declared variable.
///
/// Construct variables through [`Variable::new`] or by parsing a [`Template`];
/// both enforce that the name is not empty and that a present value matches the
/// declared type.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    /// The variable name, exported upper-cased
    pub name: String,
    /// The current value: the template default before resolution, the final value after
    pub value: Value,
    /// The declared type
    pub data_type: DataType,
    /// Whether a human has to provide (or confirm) the value
    pub required: bool,
    /// Labels used for tag filtering
    pub tags: BTreeSet<String>,
}

impl Variable {
    /// Create a new optional, untagged variable.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::MissingVariableName`] for an empty name and
    /// [`ParseError::InvalidDataType`] when `value` is present but does not
    /// match `data_type`.
    pub fn new(
        name: impl Into<String>,
        value: impl Into<Value>,
        data_type: DataType,
    ) -> Result<Self, ParseError> {
        let name = name.into();
        if name.is_empty() {
            return Err(ParseError::MissingVariableName);
        }

        let value = value.into();
        check_type(&name, &value, data_type)?;

        Ok(Self {
            name,
            value,
            data_type,
            required: false,
            tags: BTreeSet::new(),
        })
    }

    pub fn with_required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} = {} (type={}, required={})",
            self.name, self.value, self.data_type, self.required
        )
    }
}

fn check_type(name: &str, value: &Value, declared: DataType) -> Result<(), ParseError> {
    match value.data_type() {
        Some(found) if found != declared => Err(ParseError::InvalidDataType {
            name: name.to_string(),
            declared: declared.to_string(),
            found: value.kind().to_string(),
        }),
        _ => Ok(()),
    }
}

/// The set of active tags for a run.
///
/// A variable without tags is always retained. A tagged variable is retained
/// when at least one of its tags is active.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagFilter {
    tags: HashSet<String>,
}

impl TagFilter {
    pub fn new<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tags: tags.into_iter().map(Into::into).collect(),
        }
    }

    /// Parse a comma separated tag list such as `backend,dev`.
    ///
    /// Entries are trimmed and empty entries are ignored, so `","` yields an
    /// empty (but present) filter.
    pub fn parse_list(list: &str) -> Self {
        Self::new(
            list.split(',')
                .map(str::trim)
                .filter(|tag| !tag.is_empty()),
        )
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Whether a variable declaring `tags` participates in the run.
    pub fn retains(&self, tags: &BTreeSet<String>) -> bool {
        tags.is_empty() || tags.iter().any(|tag| self.tags.contains(tag))
    }
}

impl<S: Into<String>> FromIterator<S> for TagFilter {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter)
    }
}

/// One declaration as written in the template, before validation.
#[derive(Debug, Deserialize)]
struct VariableRecord {
    #[serde(default)]
    name: String,
    #[serde(default)]
    value: Option<serde_yaml::Value>,
    #[serde(rename = "type", default)]
    data_type: String,
    #[serde(default)]
    required: bool,
    #[serde(default)]
    tags: Option<Vec<String>>,
}

/// The validated, filtered declarations of a mold template, in source order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Template {
    variables: Vec<Variable>,
}

impl Template {
    /// Parse a template from raw YAML bytes.
    ///
    /// Declarations are processed in order: an empty name fails immediately,
    /// declarations rejected by `tags` are dropped without further checks, and
    /// the remaining ones must carry a default matching their declared type.
    ///
    /// Passing `None` for `tags` disables filtering.
    ///
    /// # Errors
    ///
    /// Returns a `ParseError` for malformed YAML, a missing name or a type mismatch.
    pub fn parse(content: &[u8], tags: Option<&TagFilter>) -> Result<Self, ParseError> {
        let records: Vec<VariableRecord> = if content.iter().all(u8::is_ascii_whitespace) {
            Vec::new()
        } else {
            serde_yaml::from_slice::<Option<Vec<VariableRecord>>>(content)?.unwrap_or_default()
        };

        let mut variables = Vec::with_capacity(records.len());
        for record in records {
            if record.name.is_empty() {
                return Err(ParseError::MissingVariableName);
            }

            let record_tags: BTreeSet<String> =
                record.tags.unwrap_or_default().into_iter().collect();
            if let Some(filter) = tags {
                if !filter.retains(&record_tags) {
                    continue;
                }
            }

            let value = match record.value {
                Some(raw) => Value::from_yaml(raw).map_err(|found| ParseError::InvalidDataType {
                    name: record.name.clone(),
                    declared: record.data_type.clone(),
                    found: found.to_string(),
                })?,
                None => Value::Absent,
            };

            // Without a default there is nothing to check; a missing or
            // unknown type then resolves like a string.
            let data_type = match DataType::from_str(&record.data_type) {
                Ok(data_type) => data_type,
                Err(_) if value.is_absent() => DataType::String,
                Err(_) => {
                    return Err(ParseError::InvalidDataType {
                        name: record.name,
                        declared: record.data_type,
                        found: value.kind().to_string(),
                    });
                }
            };

            let variable = Variable::new(record.name, value, data_type)?
                .with_required(record.required)
                .with_tags(record_tags);
            variables.push(variable);
        }

        Ok(Self { variables })
    }

    /// Read the whole of `reader` and parse it as a template.
    pub fn from_reader<R: Read>(mut reader: R, tags: Option<&TagFilter>) -> Result<Self, ParseError> {
        let mut content = Vec::new();
        reader.read_to_end(&mut content)?;
        Self::parse(&content, tags)
    }

    /// Load a template from a file path.
    pub fn from_path(path: &Path, tags: Option<&TagFilter>) -> Result<Self, ParseError> {
        let content = fs::read(path)?;
        Self::parse(&content, tags)
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn into_variables(self) -> Vec<Variable> {
        self.variables
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }
}

impl FromStr for Template {
    type Err = ParseError;

    /// Parse a template without tag filtering.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s.as_bytes(), None)
    }
}

/// Errors that can occur when parsing mold templates.
#[derive(Debug)]
pub enum ParseError {
    /// I/O error when reading the template
    Io(io::Error),
    /// YAML syntax or structure error
    Yaml(serde_yaml::Error),
    /// A declaration without a name
    MissingVariableName,
    /// A default value that does not match the declared type, or an unknown type
    InvalidDataType {
        name: String,
        declared: String,
        found: String,
    },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Io(e) => write!(f, "I/O error: {}", e),
            ParseError::Yaml(e) => write!(f, "YAML parsing error: {}", e),
            ParseError::MissingVariableName => write!(f, "missing environment variable name"),
            ParseError::InvalidDataType {
                name,
                declared,
                found,
            } => write!(
                f,
                "value of '{}' does not implement the required type (type={}, value is {})",
                name, declared, found
            ),
        }
    }
}

impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ParseError::Io(e) => Some(e),
            ParseError::Yaml(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for ParseError {
    fn from(e: io::Error) -> Self {
        ParseError::Io(e)
    }
}

impl From<serde_yaml::Error> for ParseError {
    fn from(e: serde_yaml::Error) -> Self {
        ParseError::Yaml(e)
    }
}
